//! chunkwave CLI - adaptive chunking and wave processing
//!
//! # Examples
//!
//! ```bash
//! # What kind of content is this?
//! chunkwave detect notes.md --boundaries
//!
//! # Split a file into chunk files
//! chunkwave chunk server.log --max-chunks 8 --output ./chunks
//!
//! # Watch waves and early termination with a simulated model
//! chunkwave simulate --chunks 12 --max-concurrency 5 --confidence 0.9
//!
//! # Show configuration
//! chunkwave show-config
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to change verbosity.

use clap::Parser;
use chunkwave::cli::{run, Cli};
use tracing_subscriber::EnvFilter;

fn init_logging(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chunkwave=info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
