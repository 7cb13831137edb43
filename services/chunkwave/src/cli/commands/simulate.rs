//! Simulate command - run waves against a synthetic answer operation
//!
//! Useful for seeing how concurrency, thresholds and early termination
//! interact without a real model behind the answer operation.

use super::read_input;
use crate::cli::output::{colors, format_millis, print_json, print_warning};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::error::AnswerError;
use crate::core::services::Services;
use crate::core::types::{Chunk, ProcessingSummary};
use crate::core::waves::{AnswerOperation, AnswerRequest};
use async_trait::async_trait;
use clap::Args;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Arguments for the simulate command
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// File to chunk and process (synthetic chunks are used if omitted)
    pub path: Option<PathBuf>,

    /// Query sent with every chunk
    #[arg(long, short = 'q', default_value = "summarize")]
    pub query: String,

    /// Number of synthetic chunks when no file is given
    #[arg(long, short = 'n', default_value = "12")]
    pub chunks: usize,

    /// Chunks per wave (overrides config)
    #[arg(long, short = 'c')]
    pub max_concurrency: Option<usize>,

    /// Confidence reported by every simulated answer
    #[arg(long, default_value = "0.9")]
    pub confidence: f64,

    /// Simulated latency per call in milliseconds
    #[arg(long, default_value = "50")]
    pub latency_ms: u64,

    /// Make every Nth chunk fail (0 disables failures)
    #[arg(long, default_value = "0")]
    pub fail_every: usize,
}

/// Answer operation that sleeps and reports a fixed confidence
struct SimulatedAnswer {
    confidence: f64,
    latency: Duration,
    fail_every: usize,
}

#[async_trait]
impl AnswerOperation for SimulatedAnswer {
    async fn answer(&self, request: AnswerRequest) -> Result<Value, AnswerError> {
        tokio::time::sleep(self.latency).await;

        let position = request.metadata.chunk_index + 1;
        if self.fail_every > 0 && position % self.fail_every == 0 {
            return Err(AnswerError::failed(format!(
                "simulated failure for {}",
                request.metadata.chunk_id
            )));
        }

        Ok(json!({
            "answer": format!("{} words seen", request.content.split_whitespace().count()),
            "confidence": self.confidence,
        }))
    }
}

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub source: String,
    pub summary: ProcessingSummary,
    pub next_target_size: usize,
}

/// Execute the simulate command
pub async fn execute(
    args: SimulateArgs,
    mut config: Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&args.confidence) {
        return Err(format!(
            "Confidence {} is out of range. Valid range is 0.0-1.0.",
            args.confidence
        )
        .into());
    }
    if let Some(width) = args.max_concurrency {
        config.waves.max_concurrency = width;
    }
    config.validate()?;

    let answer: Arc<dyn AnswerOperation> = Arc::new(SimulatedAnswer {
        confidence: args.confidence,
        latency: Duration::from_millis(args.latency_ms),
        fail_every: args.fail_every,
    });
    let services = Services::new(config);

    let (source, summary) = match &args.path {
        Some(path) => {
            let text = read_input(path)?;
            let run = services.answer_document(&text, &args.query, answer).await?;
            (path.display().to_string(), run.summary)
        }
        None => {
            let chunks = synthetic_chunks(args.chunks);
            let summary = services
                .scheduler
                .run_all(&chunks, &args.query, answer)
                .await?;
            summary.metrics().emit();
            (format!("{} synthetic chunks", args.chunks), summary)
        }
    };

    let response = SimulateResponse {
        source,
        next_target_size: services.chunker_stats().await.current_size,
        summary,
    };

    match format {
        OutputFormat::Human => print_human(&response),
        OutputFormat::Json => print_json(&response)?,
    }

    Ok(())
}

fn synthetic_chunks(count: usize) -> Vec<Chunk> {
    let source: String = (0..count)
        .map(|i| format!("Synthetic paragraph {i} with a handful of words.\n\n"))
        .collect();

    let mut chunks = Vec::with_capacity(count);
    let mut start = 0;
    for (index, paragraph) in source.split_inclusive("\n\n").enumerate() {
        let end = start + paragraph.len();
        chunks.push(Chunk::from_source(index, &source, start, end));
        start = end;
    }
    chunks
}

fn print_human(response: &SimulateResponse) {
    let summary = &response.summary;

    println!(
        "{} {}",
        colors::label("Source:"),
        colors::file_path(&response.source)
    );
    for wave in &summary.waves {
        println!(
            "  Wave {}: {}/{} succeeded, {} confident, {}",
            colors::number(&(wave.wave_index + 1).to_string()),
            wave.succeeded,
            wave.chunk_count,
            colors::confidence(&wave.high_confidence.to_string()),
            format_millis(wave.elapsed_ms)
        );
    }

    println!(
        "{} {}/{} waves, {}/{} chunks succeeded, average confidence {}",
        colors::label("Result:"),
        summary.waves_executed,
        summary.total_waves,
        summary.chunks_succeeded,
        summary.chunks_processed,
        colors::confidence(&format!("{:.2}", summary.average_confidence()))
    );

    if summary.early_terminated && !summary.cancelled {
        println!(
            "{}",
            colors::success(&format!(
                "Stopped early after {} confident results",
                summary.high_confidence_count()
            ))
        );
    }
    if summary.is_total_failure() {
        print_warning("every processed chunk failed");
    }
    println!(
        "{} {}",
        colors::label("Next target size:"),
        colors::number(&response.next_target_size.to_string())
    );
}
