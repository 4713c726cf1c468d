//! lineserve Server Binary
//!
//! Builds the index for a text file and serves its lines over TCP.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use lineserve::network::Server;
use lineserve::{Config, LineFile};
use tracing_subscriber::{fmt, EnvFilter};

/// lineserve Server
#[derive(Parser, Debug)]
#[command(name = "lineserve-server")]
#[command(about = "Serve lines of a large text file over TCP")]
#[command(version)]
struct Args {
    /// Text file to serve
    file: PathBuf,

    /// Bind host for both listeners
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Primary (client) port
    #[arg(short, long, default_value = "10497")]
    port: u16,

    /// Control port (accepts SHUTDOWN)
    #[arg(short, long, default_value = "8080")]
    control_port: u16,

    /// Maximum concurrently served connections
    #[arg(short = 'w', long, default_value = "50")]
    max_workers: usize,

    /// Maximum connections waiting for a worker
    #[arg(long, default_value = "128")]
    max_pending: usize,

    /// Lines per index page
    #[arg(short, long, default_value = "10000")]
    lines_per_page: usize,

    /// Index pages kept in memory
    #[arg(long, default_value = "1")]
    cached_pages: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lineserve=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    if !args.file.is_file() {
        tracing::error!("The file {} doesn't exist!", args.file.display());
        std::process::exit(1);
    }

    tracing::info!("lineserve v{}", lineserve::VERSION);
    tracing::info!("Source file: {}", args.file.display());

    // Build config from args
    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .control_port(args.control_port)
        .max_workers(args.max_workers)
        .max_pending(args.max_pending)
        .lines_per_page(args.lines_per_page)
        .cached_pages(args.cached_pages)
        .build();

    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    // Build the index before serving
    let line_file = match LineFile::with_cache(&args.file, config.lines_per_page, config.cached_pages) {
        Ok(f) => Arc::new(f),
        Err(e) => {
            tracing::error!("Failed to open {}: {}", args.file.display(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = line_file.build_index() {
        tracing::error!("Failed to build index: {}", e);
        std::process::exit(1);
    }

    let server = match Server::bind(config, line_file) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Server starting failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
