//! lineserve CLI Client
//!
//! Command-line interface for fetching lines from a running server.

use std::io::{BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::process;

use clap::{Parser, Subcommand};
use lineserve::protocol::{encode_command, read_response, Command, Response};

/// lineserve CLI
#[derive(Parser, Debug)]
#[command(name = "lineserve-cli")]
#[command(about = "CLI for a lineserve line server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:10497")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch one or more lines (1-based)
    Get {
        /// Line numbers to fetch
        #[arg(required = true)]
        lines: Vec<String>,
    },

    /// Stop the server
    Shutdown,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> lineserve::Result<()> {
    let stream = TcpStream::connect(&args.server)?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);

    match &args.command {
        Commands::Get { lines } => {
            for line in lines {
                let request = encode_command(&Command::Get { line: line.clone() });
                writer.write_all(request.as_bytes())?;
                writer.flush()?;

                match read_response(&mut reader)? {
                    Some(Response::Line(text)) => println!("{}", text),
                    Some(Response::NotFound) => println!("(not found)"),
                    Some(Response::InvalidCommand) => println!("(invalid line number: {})", line),
                    Some(Response::ServerError(message)) => println!("(server error: {})", message),
                    None => {
                        eprintln!("server closed the connection");
                        break;
                    }
                }
            }
            writer.write_all(encode_command(&Command::Quit).as_bytes())?;
            writer.flush()?;
        }
        Commands::Shutdown => {
            writer.write_all(encode_command(&Command::Shutdown).as_bytes())?;
            writer.flush()?;
            println!("shutdown requested");
        }
    }

    Ok(())
}
