//! # lineserve
//!
//! Serves individual lines of a large, immutable text file over TCP:
//! - Paged on-disk offset index (one artifact per page of line offsets)
//! - Bounded in-memory page cache, independent of file size
//! - Line-oriented text protocol (`GET <n>`, `QUIT`, `SHUTDOWN`)
//! - Separate control listener for whole-service shutdown
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────┐     ┌───────────────────────┐
//! │      Request Dispatcher      │     │    Control Channel    │
//! │ (accept loop + worker pool)  │◄────┤  (SHUTDOWN listener)  │
//! └──────────────┬───────────────┘     └───────────▲───────────┘
//!                │ one connection per worker       │ loopback
//!                ▼                                 │
//! ┌──────────────────────────────┐                 │
//! │      Connection Worker       ├─────────────────┘
//! │   (GET / QUIT / SHUTDOWN)    │
//! └──────────────┬───────────────┘
//!                ▼
//! ┌──────────────────────────────┐
//! │ Line Index Engine (LineFile) │
//! │   build gate + page cache    │
//! └──────────────┬───────────────┘
//!                ▼
//! ┌──────────────────────────────┐
//! │         Index Store          │
//! │  index/<sha256>_<page>.idx   │
//! └──────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod index;
pub mod cache;
pub mod engine;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LineError, Result};
pub use config::Config;
pub use engine::{LineFile, Lookup};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of lineserve
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
