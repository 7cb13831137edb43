//! Config command - show current configuration

use crate::cli::output::{print_header, print_json};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print the effective configuration as TOML
    #[arg(long)]
    pub toml: bool,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse<'a> {
    pub config_file: String,
    pub state_dir: String,
    #[serde(flatten)]
    pub config: &'a Config,
}

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    xdg: &XdgDirs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.toml {
        print!("{}", toml::to_string_pretty(config)?);
        return Ok(());
    }

    let response = ConfigResponse {
        config_file: xdg.config_file().display().to_string(),
        state_dir: xdg.state_dir.display().to_string(),
        config,
    };

    match format {
        OutputFormat::Human => {
            let chunking = &config.chunking;
            let waves = &config.waves;

            print_header("Configuration:");
            println!("  config_file: {}", response.config_file);
            println!("  state_dir: {}", response.state_dir);
            println!("  chunking:");
            println!("    initial_chunk_size: {}", chunking.initial_chunk_size);
            println!("    min_chunk_size: {}", chunking.min_chunk_size);
            println!("    max_chunk_size: {}", chunking.max_chunk_size);
            println!("    optimal_duration_ms: {}", chunking.optimal_duration_ms);
            println!("    fast_threshold_ms: {}", chunking.fast_threshold_ms);
            println!("    slow_threshold_ms: {}", chunking.slow_threshold_ms);
            println!("    grow_factor: {}", chunking.grow_factor);
            println!("    shrink_factor: {}", chunking.shrink_factor);
            match chunking.max_chunks {
                Some(max) => println!("    max_chunks: {max}"),
                None => println!("    max_chunks: unlimited"),
            }
            println!("    cache_capacity: {}", chunking.cache_capacity);
            println!("  waves:");
            println!("    max_concurrency: {}", waves.max_concurrency);
            println!("    confidence_threshold: {}", waves.confidence_threshold);
            println!("    min_confident_chunks: {}", waves.min_confident_chunks);
            println!("    call_timeout_sec: {}", waves.call_timeout_sec);
            println!("  output:");
            println!("    chunk_dir: {}", config.output.chunk_dir.display());
            println!("    chunk_prefix: {}", config.output.chunk_prefix);
        }
        OutputFormat::Json => print_json(&response)?,
    }

    Ok(())
}
