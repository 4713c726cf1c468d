//! Protocol Module
//!
//! Defines the line-oriented text protocol spoken on both listeners.
//!
//! ## Request Format (primary port)
//! One command per line, keyword matched case-insensitively:
//! ```text
//! GET <n>\n      look up line n (1-based)
//! QUIT\n         close the connection
//! SHUTDOWN\n     stop the whole service
//! ```
//!
//! ### Responses
//! - `OK\n<line>\n`            line found
//! - `ERR\n`                   line number out of range
//! - `INVALID COMMAND!\n`      unrecognized input or malformed line number
//! - `Server error: <msg>\n`   internal failure
//!
//! ## Control Format (control port)
//! A single line starting with `SHUTDOWN` (any case). Anything else is ignored.

mod command;
mod response;
mod codec;

pub use command::{Command, ControlCommand};
pub use response::{Response, Status, GENERIC_ERROR_MESSAGE};
pub use codec::{
    decode_command, decode_control_command, encode_command, encode_response,
    read_request_line, read_response, write_response, MAX_REQUEST_LEN,
};
