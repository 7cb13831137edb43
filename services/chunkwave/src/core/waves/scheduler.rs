//! Wave scheduler with confidence-based early termination.
//!
//! Chunks are dispatched in waves of `max_concurrency`. Every chunk of
//! a wave is spawned into the wave's own `JoinSet` and the wave joins
//! all of them before the next one starts. Dropping a run aborts the
//! calls of its current wave. Once enough confident results have
//! accumulated the remaining waves are skipped.

use super::answer::{AnswerOperation, AnswerRequest, ChunkMetadata};
use super::confidence::extract_confidence;
use crate::core::config::WaveConfig;
use crate::core::error::{AnswerError, ChunkwaveError, Result};
use crate::core::types::{Chunk, ProcessingResult, ProcessingSummary, WaveStats};
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Characters of chunk content sent to the answer operation
pub const ANSWER_CONTENT_LIMIT: usize = 5_000;

#[derive(Debug, Clone, PartialEq)]
pub struct WavePolicy {
    pub max_concurrency: usize,
    pub confidence_threshold: f64,
    pub min_confident_chunks: usize,
    pub call_timeout: Duration,
}

impl Default for WavePolicy {
    fn default() -> Self {
        Self::from(&WaveConfig::default())
    }
}

impl From<&WaveConfig> for WavePolicy {
    fn from(config: &WaveConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency,
            confidence_threshold: config.confidence_threshold,
            min_confident_chunks: config.min_confident_chunks,
            call_timeout: config.call_timeout(),
        }
    }
}

type CallOutcome = (std::result::Result<Value, AnswerError>, u64);

pub struct WaveScheduler {
    policy: WavePolicy,
    chunk_prefix: String,
}

impl WaveScheduler {
    pub fn new(policy: WavePolicy) -> Self {
        Self {
            policy,
            chunk_prefix: "chunk".to_string(),
        }
    }

    /// Prefix used to build the `chunk_id` sent with each request
    pub fn with_chunk_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.chunk_prefix = prefix.into();
        self
    }

    pub fn policy(&self) -> &WavePolicy {
        &self.policy
    }

    /// Process `chunks` against `query` wave by wave, without cancellation.
    ///
    /// Fails only on invalid input (zero concurrency or blank query);
    /// individual chunk failures are recorded in the summary.
    pub async fn run_all(
        &self,
        chunks: &[Chunk],
        query: &str,
        answer: Arc<dyn AnswerOperation>,
    ) -> Result<ProcessingSummary> {
        let never = AtomicBool::new(false);
        self.run_all_with_cancel(chunks, query, answer, &never).await
    }

    /// Like [`run_all`](Self::run_all), but checks `cancel` before each
    /// wave. The flag belongs to this run only; raising it never aborts
    /// calls already in flight.
    pub async fn run_all_with_cancel(
        &self,
        chunks: &[Chunk],
        query: &str,
        answer: Arc<dyn AnswerOperation>,
        cancel: &AtomicBool,
    ) -> Result<ProcessingSummary> {
        let width = self.policy.max_concurrency;
        if width == 0 {
            return Err(ChunkwaveError::ConfigError(
                "max_concurrency must be non-zero".to_string(),
            ));
        }
        if query.trim().is_empty() {
            return Err(ChunkwaveError::InvalidQuery(
                "query must not be empty".to_string(),
            ));
        }

        let total_waves = chunks.len().div_ceil(width);
        let mut summary =
            ProcessingSummary::new(chunks.len(), total_waves, self.policy.confidence_threshold);

        if chunks.is_empty() {
            tracing::info!("No chunks to process");
            summary.finish();
            return Ok(summary);
        }

        tracing::info!(
            "Processing {} chunks in {} waves of up to {}",
            chunks.len(),
            total_waves,
            width
        );

        for (wave_index, wave) in chunks.chunks(width).enumerate() {
            if cancel.load(Ordering::SeqCst) {
                tracing::warn!("Run cancelled before wave {}", wave_index + 1);
                summary.cancelled = true;
                break;
            }

            let (stats, results) = self.run_wave(wave_index, wave, query, &answer).await;
            tracing::info!(
                "Wave {}/{} done: {}/{} succeeded, {} confident in {}ms",
                wave_index + 1,
                total_waves,
                stats.succeeded,
                stats.chunk_count,
                stats.high_confidence,
                stats.elapsed_ms
            );
            summary.record_wave(stats, results);

            let confident = summary.high_confidence_count();
            if confident >= self.policy.min_confident_chunks {
                tracing::info!(
                    "Stopping after wave {}: {} results above {}",
                    wave_index + 1,
                    confident,
                    self.policy.confidence_threshold
                );
                break;
            }
        }

        summary.finish();

        if summary.is_total_failure() {
            tracing::error!(
                "All {} processed chunks failed",
                summary.chunks_processed
            );
        }
        tracing::info!(
            "Run complete: {}/{} waves, {}/{} chunks succeeded, early_terminated={}",
            summary.waves_executed,
            summary.total_waves,
            summary.chunks_succeeded,
            summary.chunks_processed,
            summary.early_terminated
        );

        Ok(summary)
    }

    /// Dispatch one wave and wait for every call in it
    async fn run_wave(
        &self,
        wave_index: usize,
        wave: &[Chunk],
        query: &str,
        answer: &Arc<dyn AnswerOperation>,
    ) -> (WaveStats, Vec<ProcessingResult>) {
        let started = Instant::now();

        let mut tokens = Vec::with_capacity(wave.len());
        let mut calls = JoinSet::new();
        for (slot, chunk) in wave.iter().enumerate() {
            let content = truncate_chars(&chunk.content, ANSWER_CONTENT_LIMIT);
            tokens.push(content.split_whitespace().count());

            let request = AnswerRequest {
                content: content.to_string(),
                query: query.to_string(),
                metadata: ChunkMetadata {
                    chunk_id: chunk.chunk_id(&self.chunk_prefix),
                    chunk_index: chunk.index,
                    full_chunk_size: chunk.char_length(),
                },
            };
            let call = dispatch(Arc::clone(answer), request, self.policy.call_timeout);
            calls.spawn(async move { (slot, call.await) });
        }

        // Each worker fills only its own slot
        let mut slots: Vec<Option<CallOutcome>> = vec![None; wave.len()];
        while let Some(joined) = calls.join_next().await {
            match joined {
                Ok((slot, outcome)) => slots[slot] = Some(outcome),
                Err(e) => tracing::warn!("Wave {} worker lost: {}", wave_index + 1, e),
            }
        }
        let wave_elapsed = started.elapsed().as_millis() as u64;

        let results: Vec<ProcessingResult> = wave
            .iter()
            .zip(slots)
            .zip(tokens)
            .map(|((chunk, slot), tokens)| {
                let chunk_id = chunk.chunk_id(&self.chunk_prefix);
                let (outcome, elapsed_ms) = slot.unwrap_or_else(|| {
                    (
                        Err(AnswerError::WorkerPanicked("worker did not report".to_string())),
                        wave_elapsed,
                    )
                });

                match outcome {
                    Ok(payload) => {
                        let confidence = extract_confidence(&payload);
                        tracing::debug!(
                            "{} answered in {}ms (confidence {:.2})",
                            chunk_id,
                            elapsed_ms,
                            confidence
                        );
                        ProcessingResult::success(
                            chunk.index,
                            chunk_id,
                            wave_index,
                            payload,
                            confidence,
                            elapsed_ms,
                            tokens,
                        )
                    }
                    Err(e) => {
                        tracing::warn!("{} failed after {}ms: {}", chunk_id, elapsed_ms, e);
                        ProcessingResult::failure(
                            chunk.index,
                            chunk_id,
                            wave_index,
                            e.to_string(),
                            elapsed_ms,
                        )
                    }
                }
            })
            .collect();

        let threshold = self.policy.confidence_threshold;
        let stats = WaveStats {
            wave_index,
            chunk_count: wave.len(),
            succeeded: results.iter().filter(|r| r.succeeded).count(),
            high_confidence: results
                .iter()
                .filter(|r| r.succeeded && r.confidence > threshold)
                .count(),
            elapsed_ms: wave_elapsed,
        };

        (stats, results)
    }
}

impl Default for WaveScheduler {
    fn default() -> Self {
        Self::new(WavePolicy::default())
    }
}

/// One bounded call, timed from inside the worker task.
///
/// A panic inside the answer operation is caught here so the worker
/// still reports into its slot.
async fn dispatch(
    answer: Arc<dyn AnswerOperation>,
    request: AnswerRequest,
    timeout: Duration,
) -> CallOutcome {
    let started = Instant::now();
    let call = AssertUnwindSafe(answer.answer(request)).catch_unwind();
    let outcome = match tokio::time::timeout(timeout, call).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(panic)) => Err(AnswerError::WorkerPanicked(panic_message(panic.as_ref()))),
        Err(_) => Err(AnswerError::TimedOut(timeout.as_millis() as u64)),
    };
    (outcome, started.elapsed().as_millis() as u64)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Longest prefix of `text` with at most `limit` characters
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}
