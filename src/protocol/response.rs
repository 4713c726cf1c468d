//! Response definitions
//!
//! Represents responses to clients.

/// Message sent to clients on internal failures. Details stay in the logs.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again";

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    Invalid,
    Error,
}

/// A response to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `OK\n<line>\n`
    Line(String),

    /// `ERR\n`
    NotFound,

    /// `INVALID COMMAND!\n`
    InvalidCommand,

    /// `Server error: <message>\n`
    ServerError(String),
}

impl Response {
    /// Create an OK response carrying a line
    pub fn line(text: impl Into<String>) -> Self {
        Response::Line(text.into())
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Response::NotFound
    }

    /// Create an INVALID COMMAND response
    pub fn invalid_command() -> Self {
        Response::InvalidCommand
    }

    /// Create a server error response with the generic message
    pub fn server_error() -> Self {
        Response::ServerError(GENERIC_ERROR_MESSAGE.to_string())
    }

    pub fn status(&self) -> Status {
        match self {
            Response::Line(_) => Status::Ok,
            Response::NotFound => Status::NotFound,
            Response::InvalidCommand => Status::Invalid,
            Response::ServerError(_) => Status::Error,
        }
    }
}
