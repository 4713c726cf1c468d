//! Network Module
//!
//! TCP listeners, connection workers and shutdown coordination.
//!
//! ## Architecture
//! - Primary acceptor feeding a bounded queue
//! - Fixed pool of worker threads, one connection each at a time
//! - Control acceptor on its own port; `SHUTDOWN` there stops both
//! - Workers reach the control port over loopback, never through a
//!   direct handle on the server

mod shutdown;
mod control;
mod connection;
mod server;

pub use shutdown::ShutdownSignal;
pub use control::{notify_shutdown, ControlServer};
pub use connection::{Connection, ConnectionState};
pub use server::Server;
