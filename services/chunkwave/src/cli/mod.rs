//! CLI adapter for chunkwave
//!
//! Thin clap layer over `core/`. Commands build a `Services` from the
//! loaded configuration, apply per-command overrides and print either
//! human-readable or JSON output.
//!
//! ```text
//!              +------------------+
//!              |     core/        |
//!              |  (domain logic)  |
//!              +--------+---------+
//!                       |
//!                       v
//!              +------------------+
//!              |      cli/        |
//!              | (clap adapter)   |
//!              +------------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// chunkwave - Adaptive chunking with wave-based processing
///
/// Split large documents along their natural structure and process the
/// chunks in concurrent waves, stopping once enough confident answers
/// have been collected.
#[derive(Parser, Debug)]
#[command(name = "chunkwave")]
#[command(version)]
#[command(about = "Adaptive document chunking and wave processing", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the content type of a file
    Detect(commands::DetectArgs),

    /// Split a file into chunks and write them to disk
    Chunk(commands::ChunkArgs),

    /// Run waves over a file with a simulated answer operation
    Simulate(commands::SimulateArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::xdg::XdgDirs;

    let xdg = XdgDirs::new();
    xdg.log_paths();

    let config = Config::load_with_xdg(&xdg)?;
    config.log_config();

    match cli.command {
        Commands::Detect(args) => commands::detect::execute(args, &config, cli.format).await,
        Commands::Chunk(args) => commands::chunk::execute(args, config, cli.format).await,
        Commands::Simulate(args) => commands::simulate::execute(args, config, cli.format).await,
        Commands::ShowConfig(args) => {
            commands::config::execute(args, &config, &xdg, cli.format).await
        }
    }
}
