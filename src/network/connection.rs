//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use crate::engine::{LineFile, Lookup};
use crate::error::{LineError, Result};
use crate::protocol::{decode_command, read_request_line, write_response, Command, Response};

use super::notify_shutdown;

/// Where a connection is in its command loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Waiting for the next request line
    AwaitingLine,

    /// Executing a command
    Dispatching,

    /// Done; the loop has exited
    Terminated,
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Line lookups
    line_file: Arc<LineFile>,

    /// Control listener to notify on SHUTDOWN
    control_addr: SocketAddr,

    /// Peer address for logging
    peer_addr: String,

    state: ConnectionState,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, line_file: Arc<LineFile>, control_addr: SocketAddr) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            line_file,
            control_addr,
            peer_addr,
            state: ConnectionState::AwaitingLine,
        })
    }

    /// Configure connection timeouts (0 leaves a direction without one)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads commands in a loop and sends responses. Returns when the client
    /// disconnects, sends `QUIT` or `SHUTDOWN`, or the stream fails.
    pub fn handle(&mut self) -> Result<()> {
        tracing::info!("User connection from: {}", self.peer_addr);

        while self.state != ConnectionState::Terminated {
            let line = match read_request_line(&mut self.reader) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    self.state = ConnectionState::Terminated;
                    break;
                }
                Err(LineError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} went away: {}", self.peer_addr, e);
                    self.state = ConnectionState::Terminated;
                    break;
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    self.state = ConnectionState::Terminated;
                    return Err(e);
                }
            };

            tracing::debug!("Message from {}: {:?}", self.peer_addr, line);
            self.state = ConnectionState::Dispatching;

            let response = match decode_command(&line) {
                Ok(Command::Quit) => {
                    self.state = ConnectionState::Terminated;
                    None
                }
                Ok(Command::Shutdown) => {
                    self.request_shutdown();
                    self.state = ConnectionState::Terminated;
                    None
                }
                Ok(Command::Get { line }) => Some(self.lookup(&line)),
                Err(_) => Some(Response::invalid_command()),
            };

            if let Some(response) = response {
                if let Err(e) = write_response(&mut self.writer, &response) {
                    self.state = ConnectionState::Terminated;
                    if let LineError::Io(ref io_err) = e {
                        if is_disconnect(io_err.kind()) {
                            tracing::debug!(
                                "Client {} disconnected before response could be sent: {}",
                                self.peer_addr,
                                e
                            );
                            return Ok(());
                        }
                    }
                    tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                    return Err(e);
                }
                self.state = ConnectionState::AwaitingLine;
            }
        }

        Ok(())
    }

    /// Run a GET and map the outcome to a response
    fn lookup(&self, line_no: &str) -> Response {
        match self.line_file.get_line(line_no) {
            Ok(Lookup::Found(text)) => Response::line(text),
            Ok(Lookup::NotFound) => Response::not_found(),
            Err(LineError::InvalidInput(reason)) => {
                tracing::debug!("Invalid GET from {}: {}", self.peer_addr, reason);
                Response::invalid_command()
            }
            Err(e) => {
                tracing::error!("GET {} failed for {}: {}", line_no, self.peer_addr, e);
                Response::server_error()
            }
        }
    }

    /// Forward SHUTDOWN to the control listener over loopback
    fn request_shutdown(&self) {
        tracing::info!("SHUTDOWN received from {}", self.peer_addr);
        if let Err(e) = notify_shutdown(self.control_addr) {
            tracing::error!(
                "Failed to notify control port {} of shutdown: {}",
                self.control_addr,
                e
            );
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Current state of the command loop
    pub fn state(&self) -> ConnectionState {
        self.state
    }
}

fn is_disconnect(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::WouldBlock
            | std::io::ErrorKind::TimedOut
    )
}
