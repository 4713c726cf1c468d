//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam::channel::{self, Receiver, TrySendError};

use crate::config::Config;
use crate::engine::LineFile;
use crate::error::{LineError, Result};

use super::{Connection, ControlServer, ShutdownSignal};

/// Request dispatcher plus control channel for one `LineFile`
///
/// Both listeners are bound in `bind`, so bind failures surface before
/// serving starts and ephemeral ports are known up front.
pub struct Server {
    config: Config,
    line_file: Arc<LineFile>,
    listener: TcpListener,
    control: ControlServer,
    shutdown: ShutdownSignal,
}

impl Server {
    /// Bind the primary and control listeners
    pub fn bind(config: Config, line_file: Arc<LineFile>) -> Result<Self> {
        config.validate()?;

        let addr = config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .map_err(|e| LineError::Network(format!("Failed to bind {}: {}", addr, e)))?;
        listener.set_nonblocking(true)?;

        let shutdown = ShutdownSignal::new();
        let control = ControlServer::bind(
            &config.control_addr(),
            shutdown.clone(),
            config.accept_poll_interval(),
            config.control_read_timeout_ms,
        )?;

        Ok(Self {
            config,
            line_file,
            listener,
            control,
            shutdown,
        })
    }

    /// Address of the primary listener
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Address of the control listener
    pub fn control_addr(&self) -> Result<SocketAddr> {
        self.control.local_addr()
    }

    /// Handle for stopping the server from elsewhere in-process
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Serve until shutdown is requested (blocking)
    ///
    /// After shutdown both listeners are closed, queued connections that no
    /// worker has picked up are dropped, and connections already being
    /// served get up to `shutdown_grace_ms` to finish.
    pub fn run(self) -> Result<()> {
        let Server {
            config,
            line_file,
            listener,
            control,
            shutdown,
        } = self;

        let notify_addr = control.notify_addr()?;
        let control_thread = thread::Builder::new()
            .name("line-control-accept".to_string())
            .spawn(move || control.run())?;

        let (tx, rx) = channel::bounded::<TcpStream>(config.max_pending);
        let active = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::with_capacity(config.max_workers);
        for id in 0..config.max_workers {
            let worker = spawn_worker(
                id,
                rx.clone(),
                Arc::clone(&line_file),
                notify_addr,
                shutdown.clone(),
                Arc::clone(&active),
                &config,
            );
            match worker {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Release the control thread before bailing out
                    shutdown.trigger();
                    return Err(e);
                }
            }
        }
        drop(rx);

        tracing::info!(
            "Serving {} on {} ({} workers, {} pending max)",
            line_file.source_path().display(),
            listener.local_addr()?,
            config.max_workers,
            config.max_pending
        );

        let poll = config.accept_poll_interval();
        while !shutdown.is_triggered() {
            match listener.accept() {
                Ok((stream, peer)) => {
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", peer, e);
                        continue;
                    }
                    match tx.try_send(stream) {
                        Ok(()) => {}
                        Err(TrySendError::Full(stream)) => {
                            tracing::warn!(
                                "Pending queue full ({}), refusing connection from {}",
                                config.max_pending,
                                peer
                            );
                            drop(stream);
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            tracing::error!("All workers have exited, stopping accept loop");
                            break;
                        }
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(poll);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(poll);
                }
            }
        }

        // Stop accepting on both ports
        shutdown.trigger();
        drop(listener);
        drop(tx);

        match control_thread.join() {
            Ok(Err(e)) => tracing::error!("Control port failed: {}", e),
            Err(_) => tracing::error!("Control port thread panicked"),
            Ok(Ok(())) => {}
        }

        let deadline = Instant::now() + config.shutdown_grace();
        while active.load(Ordering::SeqCst) > 0 && Instant::now() < deadline {
            thread::sleep(poll);
        }

        let remaining = active.load(Ordering::SeqCst);
        if remaining == 0 {
            for worker in workers {
                let _ = worker.join();
            }
        } else {
            tracing::warn!(
                "Shutdown grace period elapsed with {} connections still open",
                remaining
            );
        }

        tracing::info!("The server is stopped");
        Ok(())
    }
}

/// Start one pool thread pulling connections off the queue
fn spawn_worker(
    id: usize,
    rx: Receiver<TcpStream>,
    line_file: Arc<LineFile>,
    notify_addr: SocketAddr,
    shutdown: ShutdownSignal,
    active: Arc<AtomicUsize>,
    config: &Config,
) -> Result<JoinHandle<()>> {
    let read_timeout_ms = config.read_timeout_ms;
    let write_timeout_ms = config.write_timeout_ms;

    let handle = thread::Builder::new()
        .name(format!("line-worker-{}", id))
        .spawn(move || {
            for stream in rx.iter() {
                if shutdown.is_triggered() {
                    tracing::debug!("Shutting down, dropping queued connection");
                    continue;
                }

                active.fetch_add(1, Ordering::SeqCst);
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<()> {
                    let mut connection =
                        Connection::new(stream, Arc::clone(&line_file), notify_addr)?;
                    connection.set_timeouts(read_timeout_ms, write_timeout_ms)?;
                    connection.handle()
                }));
                active.fetch_sub(1, Ordering::SeqCst);

                match outcome {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::error!("Connection failed: {}", e),
                    Err(_) => tracing::error!("Connection handler panicked"),
                }
            }
        })?;

    Ok(handle)
}
