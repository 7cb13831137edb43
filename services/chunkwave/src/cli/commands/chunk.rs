//! Chunk command - split a file and materialize the chunks

use super::read_input;
use crate::cli::output::{colors, format_chars, print_json};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the chunk command
#[derive(Args, Debug)]
pub struct ChunkArgs {
    /// File to split
    pub path: PathBuf,

    /// Directory to write chunk files to (defaults to the configured chunk dir)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Upper bound on the number of chunks
    #[arg(long, short = 'm')]
    pub max_chunks: Option<usize>,

    /// Starting target size in characters
    #[arg(long)]
    pub initial_size: Option<usize>,

    /// File name prefix for chunk files
    #[arg(long, short = 'p')]
    pub prefix: Option<String>,

    /// Only report the chunks, do not write files
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct ChunkSummary {
    pub index: usize,
    pub chars: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChunkResponse {
    pub path: String,
    pub content_type: String,
    pub target_size: usize,
    pub chunk_count: usize,
    pub output_dir: Option<String>,
    pub chunks: Vec<ChunkSummary>,
}

/// Execute the chunk command
pub async fn execute(
    args: ChunkArgs,
    mut config: Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.max_chunks == Some(0) {
        return Err("--max-chunks must be at least 1.".into());
    }

    if let Some(size) = args.initial_size {
        if size < config.chunking.min_chunk_size || size > config.chunking.max_chunk_size {
            return Err(format!(
                "Initial size {} is out of range. Valid range is {}-{} characters.",
                size, config.chunking.min_chunk_size, config.chunking.max_chunk_size
            )
            .into());
        }
        config.chunking.initial_chunk_size = size;
    }
    if let Some(dir) = args.output {
        config.output.chunk_dir = dir;
    }
    if let Some(prefix) = args.prefix {
        config.output.chunk_prefix = prefix;
    }
    config.validate()?;

    let text = read_input(&args.path)?;
    let services = Services::new(config);
    let document = services.chunk_document(&text, args.max_chunks).await;

    let files = if args.dry_run {
        Vec::new()
    } else {
        services.write_chunks(&document)?
    };

    let chunks = document
        .chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| ChunkSummary {
            index: chunk.index,
            chars: chunk.char_length(),
            start_offset: chunk.start_offset,
            end_offset: chunk.end_offset,
            file: files.get(i).map(|p| p.display().to_string()),
        })
        .collect();

    let response = ChunkResponse {
        path: args.path.display().to_string(),
        content_type: document.content_type.as_str().to_string(),
        target_size: document.target_size,
        chunk_count: document.len(),
        output_dir: (!args.dry_run).then(|| services.config.output.chunk_dir.display().to_string()),
        chunks,
    };

    match format {
        OutputFormat::Human => {
            println!(
                "{} {} into {} {} chunks (target {})",
                colors::success("Split"),
                colors::file_path(&response.path),
                colors::number(&response.chunk_count.to_string()),
                colors::content_type(document.content_type.display_name()),
                format_chars(response.target_size)
            );
            for chunk in &response.chunks {
                let location = chunk.file.as_deref().unwrap_or("-");
                println!(
                    "  [{}] {:>14}  {}",
                    colors::number(&format!("{:03}", chunk.index)),
                    format_chars(chunk.chars),
                    colors::dim(location)
                );
            }
        }
        OutputFormat::Json => print_json(&response)?,
    }

    Ok(())
}
