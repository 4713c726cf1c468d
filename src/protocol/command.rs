//! Command definitions
//!
//! Represents commands from clients and from the control port.

/// A parsed client command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Look up a line. The argument is kept as text; the engine validates it.
    Get { line: String },

    /// Close this connection
    Quit,

    /// Stop the whole service
    Shutdown,
}

impl Command {
    /// Upper-case keyword for this command
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Get { .. } => "GET",
            Command::Quit => "QUIT",
            Command::Shutdown => "SHUTDOWN",
        }
    }
}

/// A command received on the control port
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    /// Terminate both listeners
    Shutdown,

    /// Anything else (kept for logging)
    Unknown(String),
}
