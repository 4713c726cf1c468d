//! Configuration for lineserve
//!
//! Centralized configuration with sensible defaults. Resolved once at
//! startup and immutable afterwards.

use std::time::Duration;

use crate::error::{LineError, Result};

/// Main configuration for a line server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Bind host for both the primary and control listeners
    pub host: String,

    /// Primary (client) port. 0 picks an ephemeral port.
    pub port: u16,

    /// Control port. 0 picks an ephemeral port.
    pub control_port: u16,

    /// Max concurrently served client connections (worker threads)
    pub max_workers: usize,

    /// Max accepted connections waiting for a free worker
    pub max_pending: usize,

    /// Client read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Client write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Read timeout on control connections (milliseconds, 0 = none)
    pub control_read_timeout_ms: u64,

    /// How often the accept loops check for shutdown (milliseconds)
    pub accept_poll_ms: u64,

    /// How long `Server::run` waits for in-flight connections on shutdown
    pub shutdown_grace_ms: u64,

    // -------------------------------------------------------------------------
    // Index Configuration
    // -------------------------------------------------------------------------
    /// Number of line offsets per index page
    pub lines_per_page: usize,

    /// Number of index pages kept resident in memory
    pub cached_pages: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10497,
            control_port: 8080,
            max_workers: 50,
            max_pending: 128,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            control_read_timeout_ms: 5000,
            accept_poll_ms: 50,
            shutdown_grace_ms: 5000,
            lines_per_page: 10_000,
            cached_pages: 1,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Primary listen address as `host:port`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Control listen address as `host:port`
    pub fn control_addr(&self) -> String {
        format!("{}:{}", self.host, self.control_port)
    }

    pub fn accept_poll_interval(&self) -> Duration {
        Duration::from_millis(self.accept_poll_ms.max(1))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(LineError::Config("max_workers must be positive".to_string()));
        }
        if self.max_pending == 0 {
            return Err(LineError::Config("max_pending must be positive".to_string()));
        }
        if self.lines_per_page == 0 {
            return Err(LineError::Config("lines_per_page must be positive".to_string()));
        }
        if self.cached_pages == 0 {
            return Err(LineError::Config("cached_pages must be positive".to_string()));
        }
        if self.port != 0 && self.port == self.control_port {
            return Err(LineError::Config(format!(
                "port and control_port must differ (both {})",
                self.port
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the bind host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the primary port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the control port
    pub fn control_port(mut self, port: u16) -> Self {
        self.config.control_port = port;
        self
    }

    /// Set the maximum number of concurrently served connections
    pub fn max_workers(mut self, count: usize) -> Self {
        self.config.max_workers = count;
        self
    }

    /// Set the maximum number of queued connections
    pub fn max_pending(mut self, count: usize) -> Self {
        self.config.max_pending = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the control connection read timeout (in milliseconds)
    pub fn control_read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.control_read_timeout_ms = ms;
        self
    }

    /// Set the accept-loop poll interval (in milliseconds)
    pub fn accept_poll_ms(mut self, ms: u64) -> Self {
        self.config.accept_poll_ms = ms;
        self
    }

    /// Set the shutdown grace period (in milliseconds)
    pub fn shutdown_grace_ms(mut self, ms: u64) -> Self {
        self.config.shutdown_grace_ms = ms;
        self
    }

    /// Set the number of lines per index page
    pub fn lines_per_page(mut self, count: usize) -> Self {
        self.config.lines_per_page = count;
        self
    }

    /// Set the number of resident index pages
    pub fn cached_pages(mut self, count: usize) -> Self {
        self.config.cached_pages = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
