//! Protocol codec
//!
//! Reading, parsing and writing the newline-terminated text protocol.

use std::io::{BufRead, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{LineError, Result};
use super::{Command, ControlCommand, Response};

/// Maximum bytes consumed by one request read. Longer input is split and
/// the remainder is read as the next request.
pub const MAX_REQUEST_LEN: usize = 1024;

const OK_LINE: &[u8] = b"OK\n";
const ERR_LINE: &[u8] = b"ERR\n";
const INVALID_LINE: &[u8] = b"INVALID COMMAND!\n";
const SERVER_ERROR_PREFIX: &str = "Server error: ";

// =============================================================================
// Requests
// =============================================================================

/// Read one request line (at most `MAX_REQUEST_LEN` bytes)
///
/// Returns `Ok(None)` when the peer has closed the stream. The line
/// terminator is stripped.
pub fn read_request_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let read = reader
        .by_ref()
        .take(MAX_REQUEST_LEN as u64)
        .read_until(b'\n', &mut buf)?;

    if read == 0 {
        return Ok(None);
    }

    Ok(Some(strip_terminator(&buf)))
}

/// Parse a client request line
///
/// Keywords are case-insensitive; `GET` takes its first argument and
/// ignores the rest.
pub fn decode_command(line: &str) -> Result<Command> {
    let mut parts = line.split_whitespace();
    let keyword = parts
        .next()
        .ok_or_else(|| LineError::Protocol("Empty command".to_string()))?
        .to_ascii_uppercase();

    match keyword.as_str() {
        "GET" => match parts.next() {
            Some(arg) => Ok(Command::Get { line: arg.to_string() }),
            None => Err(LineError::Protocol("GET command: missing line number".to_string())),
        },
        "QUIT" => Ok(Command::Quit),
        "SHUTDOWN" => Ok(Command::Shutdown),
        other => Err(LineError::Protocol(format!("Unknown command: {}", other))),
    }
}

/// Encode a client command as a request line
pub fn encode_command(command: &Command) -> String {
    match command {
        Command::Get { line } => format!("GET {}\n", line),
        other => format!("{}\n", other.keyword()),
    }
}

/// Parse the first line received on the control port
pub fn decode_control_command(line: &str) -> ControlCommand {
    if line.trim_start().to_ascii_uppercase().starts_with("SHUTDOWN") {
        ControlCommand::Shutdown
    } else {
        ControlCommand::Unknown(line.to_string())
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Encode a response to its wire bytes
pub fn encode_response(response: &Response) -> Bytes {
    match response {
        Response::Line(text) => {
            let mut buf = BytesMut::with_capacity(OK_LINE.len() + text.len() + 1);
            buf.put_slice(OK_LINE);
            buf.put_slice(text.as_bytes());
            buf.put_u8(b'\n');
            buf.freeze()
        }
        Response::NotFound => Bytes::from_static(ERR_LINE),
        Response::InvalidCommand => Bytes::from_static(INVALID_LINE),
        Response::ServerError(message) => {
            let mut buf = BytesMut::with_capacity(SERVER_ERROR_PREFIX.len() + message.len() + 1);
            buf.put_slice(SERVER_ERROR_PREFIX.as_bytes());
            buf.put_slice(message.as_bytes());
            buf.put_u8(b'\n');
            buf.freeze()
        }
    }
}

/// Write a response and flush it immediately
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}

/// Read one response (client side)
///
/// Returns `Ok(None)` if the server closed the stream.
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Option<Response>> {
    let status = match read_full_line(reader)? {
        Some(line) => line,
        None => return Ok(None),
    };

    if status == "OK" {
        let text = read_full_line(reader)?.ok_or_else(|| {
            LineError::Protocol("OK response: missing line text".to_string())
        })?;
        return Ok(Some(Response::Line(text)));
    }
    if status == "ERR" {
        return Ok(Some(Response::NotFound));
    }
    if status == "INVALID COMMAND!" {
        return Ok(Some(Response::InvalidCommand));
    }
    if let Some(message) = status.strip_prefix(SERVER_ERROR_PREFIX) {
        return Ok(Some(Response::ServerError(message.to_string())));
    }

    Err(LineError::Protocol(format!("Unexpected response: {:?}", status)))
}

// =============================================================================
// Helpers
// =============================================================================

fn read_full_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(strip_terminator(&buf)))
}

fn strip_terminator(buf: &[u8]) -> String {
    let mut end = buf.len();
    if end > 0 && buf[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && buf[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
