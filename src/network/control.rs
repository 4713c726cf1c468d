//! Control Channel
//!
//! A second listener that accepts a single administrative command per
//! connection. `SHUTDOWN` stops the request dispatcher and then this
//! listener itself.

use std::io::{BufReader, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use crate::error::{LineError, Result};
use crate::protocol::{decode_control_command, read_request_line, ControlCommand};

use super::ShutdownSignal;

/// Listener for control commands
pub struct ControlServer {
    listener: TcpListener,
    shutdown: ShutdownSignal,
    poll_interval: Duration,
    read_timeout: Option<Duration>,
}

impl ControlServer {
    /// Bind the control listener
    pub fn bind(
        addr: &str,
        shutdown: ShutdownSignal,
        poll_interval: Duration,
        read_timeout_ms: u64,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|e| {
            LineError::Network(format!("Failed to bind control port {}: {}", addr, e))
        })?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            listener,
            shutdown,
            poll_interval,
            read_timeout: (read_timeout_ms > 0).then(|| Duration::from_millis(read_timeout_ms)),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Address a worker should connect to: loopback if bound to any-address
    pub fn notify_addr(&self) -> Result<SocketAddr> {
        Ok(loopback_for(self.local_addr()?))
    }

    /// Accept control connections until shutdown is triggered (blocking)
    ///
    /// Each connection is handled on its own short-lived thread.
    pub fn run(self) -> Result<()> {
        tracing::info!("Control port listening on {}", self.local_addr()?);

        while !self.shutdown.is_triggered() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    let shutdown = self.shutdown.clone();
                    let read_timeout = self.read_timeout;
                    let spawned = thread::Builder::new()
                        .name("line-control".to_string())
                        .spawn(move || {
                            if let Err(e) = handle_control_connection(stream, peer, shutdown, read_timeout) {
                                tracing::error!(
                                    "An error occurred when processing request at control port from {}: {}",
                                    peer,
                                    e
                                );
                            }
                        });
                    if let Err(e) = spawned {
                        tracing::error!("Failed to spawn control handler: {}", e);
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(self.poll_interval);
                }
                Err(e) => {
                    tracing::warn!("Control accept failed: {}", e);
                    thread::sleep(self.poll_interval);
                }
            }
        }

        tracing::info!("Control port is stopped");
        Ok(())
    }
}

/// Read the first line of a control connection and act on it
fn handle_control_connection(
    stream: TcpStream,
    peer: SocketAddr,
    shutdown: ShutdownSignal,
    read_timeout: Option<Duration>,
) -> Result<()> {
    tracing::info!("Control port connection from: {}", peer);

    stream.set_nonblocking(false)?;
    stream.set_read_timeout(read_timeout)?;

    let mut reader = BufReader::new(stream);
    let line = match read_request_line(&mut reader)? {
        Some(line) => line,
        None => return Ok(()),
    };

    match decode_control_command(&line) {
        ControlCommand::Shutdown => {
            if shutdown.trigger() {
                tracing::info!("Shutdown requested via control port by {}", peer);
            }
            Ok(())
        }
        ControlCommand::Unknown(other) => Err(LineError::Protocol(format!(
            "Unknown control command: {:?}",
            other
        ))),
    }
}

/// Ask the service listening on `control_addr` to shut down
pub fn notify_shutdown(control_addr: impl ToSocketAddrs) -> Result<()> {
    let mut stream = TcpStream::connect(control_addr)?;
    stream.write_all(b"SHUTDOWN\n")?;
    stream.flush()?;
    Ok(())
}

/// Replace an unspecified bind IP with the matching loopback address
fn loopback_for(addr: SocketAddr) -> SocketAddr {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, addr.port())
}
