//! Detect command - classify a file and list its candidate boundaries

use super::read_input;
use crate::cli::output::{colors, format_chars, print_json};
use crate::cli::OutputFormat;
use crate::core::chunking::AdaptiveChunker;
use crate::core::config::Config;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the detect command
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// File to classify
    pub path: PathBuf,

    /// Also print every boundary offset
    #[arg(long, short = 'b')]
    pub boundaries: bool,
}

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub path: String,
    pub content_type: String,
    pub display_name: String,
    pub chars: usize,
    pub bytes: usize,
    pub boundary_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundaries: Option<Vec<usize>>,
}

/// Execute the detect command
pub async fn execute(
    args: DetectArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_input(&args.path)?;

    let mut chunker = AdaptiveChunker::new(&config.chunking);
    let content_type = chunker.detect_content_type(&text);
    let boundaries = chunker.find_boundaries(&text, content_type);

    let response = DetectResponse {
        path: args.path.display().to_string(),
        content_type: content_type.as_str().to_string(),
        display_name: content_type.display_name().to_string(),
        chars: text.chars().count(),
        bytes: text.len(),
        // 0 and the end offset are not split points
        boundary_count: boundaries.len().saturating_sub(2),
        boundaries: args.boundaries.then_some(boundaries),
    };

    match format {
        OutputFormat::Human => {
            println!(
                "{} {} ({})",
                colors::file_path(&response.path),
                colors::content_type(&response.display_name),
                format_chars(response.chars)
            );
            println!(
                "  {} {}",
                colors::label("Split points:"),
                colors::number(&response.boundary_count.to_string())
            );
            if let Some(offsets) = &response.boundaries {
                let list: Vec<String> = offsets.iter().map(|o| o.to_string()).collect();
                println!("  {}", colors::dim(&list.join(", ")));
            }
        }
        OutputFormat::Json => print_json(&response)?,
    }

    Ok(())
}
