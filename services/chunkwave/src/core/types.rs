//! Core data types for chunkwave.
//!
//! This module defines the data structures shared by the chunking
//! and wave-processing halves of the crate: chunks, per-chunk
//! processing results and the run summary built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A contiguous slice of a source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequential chunk number within the document (0-based)
    pub index: usize,

    /// The actual text content
    pub content: String,

    /// Length of `content` in bytes
    pub byte_length: usize,

    /// Byte offset where chunk starts in the source document
    pub start_offset: usize,

    /// Byte offset where chunk ends in the source document
    pub end_offset: usize,
}

impl Chunk {
    /// Build a chunk from a slice of `source` delimited by byte offsets.
    ///
    /// Both offsets must fall on character boundaries.
    pub fn from_source(index: usize, source: &str, start_offset: usize, end_offset: usize) -> Self {
        let content = source[start_offset..end_offset].to_string();
        Self {
            index,
            byte_length: content.len(),
            content,
            start_offset,
            end_offset,
        }
    }

    /// Length of the chunk in characters
    pub fn char_length(&self) -> usize {
        self.content.chars().count()
    }

    /// Stable identifier: `{prefix}_{index:03}`
    pub fn chunk_id(&self, prefix: &str) -> String {
        format!("{prefix}_{:03}", self.index)
    }
}

/// Outcome of dispatching one chunk to the answer operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Index of the chunk this result belongs to
    pub chunk_index: usize,

    /// Identifier passed to the answer operation
    pub chunk_id: String,

    /// Wave the chunk was dispatched in (0-based)
    pub wave_index: usize,

    pub succeeded: bool,

    /// Raw payload returned by the answer operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Wall-clock duration of the call in milliseconds
    pub elapsed_ms: u64,

    /// Extracted confidence in [0, 1]; always 0 for failures
    pub confidence: f64,

    /// Whitespace-delimited words sent to the answer operation
    pub tokens_processed: usize,

    pub timestamp: DateTime<Utc>,
}

impl ProcessingResult {
    /// Record a successful call
    pub fn success(
        chunk_index: usize,
        chunk_id: String,
        wave_index: usize,
        payload: Value,
        confidence: f64,
        elapsed_ms: u64,
        tokens_processed: usize,
    ) -> Self {
        Self {
            chunk_index,
            chunk_id,
            wave_index,
            succeeded: true,
            payload: Some(payload),
            error_message: None,
            elapsed_ms,
            confidence,
            tokens_processed,
            timestamp: Utc::now(),
        }
    }

    /// Record a failed call (error, timeout or panic)
    pub fn failure(
        chunk_index: usize,
        chunk_id: String,
        wave_index: usize,
        error_message: String,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            chunk_index,
            chunk_id,
            wave_index,
            succeeded: false,
            payload: None,
            error_message: Some(error_message),
            elapsed_ms,
            confidence: 0.0,
            tokens_processed: 0,
            timestamp: Utc::now(),
        }
    }
}

/// Timing and outcome of a single wave
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveStats {
    pub wave_index: usize,
    pub chunk_count: usize,
    pub succeeded: usize,
    /// Results in this wave above the confidence threshold
    pub high_confidence: usize,
    pub elapsed_ms: u64,
}

/// Summary of a full wave run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub total_waves: usize,
    pub waves_executed: usize,
    pub total_chunks: usize,
    pub chunks_processed: usize,
    pub chunks_succeeded: usize,

    /// Results in submission order (by chunk index)
    pub results: Vec<ProcessingResult>,

    /// True iff fewer waves ran than were planned
    pub early_terminated: bool,

    /// True if the run stopped because its cancel flag was raised
    pub cancelled: bool,

    pub confidence_threshold: f64,

    /// Per-wave statistics, in execution order
    pub waves: Vec<WaveStats>,

    pub tokens_processed: usize,
}

impl ProcessingSummary {
    /// Start an empty summary for a planned run
    pub fn new(total_chunks: usize, total_waves: usize, confidence_threshold: f64) -> Self {
        Self {
            total_waves,
            waves_executed: 0,
            total_chunks,
            chunks_processed: 0,
            chunks_succeeded: 0,
            results: Vec::with_capacity(total_chunks),
            early_terminated: false,
            cancelled: false,
            confidence_threshold,
            waves: Vec::with_capacity(total_waves),
            tokens_processed: 0,
        }
    }

    /// Fold a completed wave into the summary
    pub fn record_wave(&mut self, stats: WaveStats, results: Vec<ProcessingResult>) {
        self.waves_executed += 1;
        self.chunks_processed += results.len();
        self.chunks_succeeded += results.iter().filter(|r| r.succeeded).count();
        self.tokens_processed += results.iter().map(|r| r.tokens_processed).sum::<usize>();
        self.results.extend(results);
        self.waves.push(stats);
    }

    /// Finalize once the scheduler stops dispatching
    pub fn finish(&mut self) {
        self.early_terminated = self.waves_executed < self.total_waves;
    }

    /// Successful results whose confidence exceeds the threshold
    pub fn high_confidence_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.succeeded && r.confidence > self.confidence_threshold)
            .count()
    }

    /// Mean confidence over successful results (0 when none succeeded)
    pub fn average_confidence(&self) -> f64 {
        let succeeded: Vec<f64> = self
            .results
            .iter()
            .filter(|r| r.succeeded)
            .map(|r| r.confidence)
            .collect();

        if succeeded.is_empty() {
            0.0
        } else {
            succeeded.iter().sum::<f64>() / succeeded.len() as f64
        }
    }

    /// Work was dispatched but nothing succeeded
    pub fn is_total_failure(&self) -> bool {
        self.chunks_processed > 0 && self.chunks_succeeded == 0
    }

    /// Telemetry view of this summary
    pub fn metrics(&self) -> RunMetrics {
        RunMetrics {
            total_chunks: self.total_chunks,
            processed_chunks: self.chunks_processed,
            succeeded_chunks: self.chunks_succeeded,
            total_waves: self.total_waves,
            waves_executed: self.waves_executed,
            early_terminated: self.early_terminated,
            wave_timings_ms: self.waves.iter().map(|w| w.elapsed_ms).collect(),
            average_confidence: self.average_confidence(),
            tokens_processed: self.tokens_processed,
        }
    }
}

/// Metrics suitable for an external telemetry collector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    pub total_chunks: usize,
    pub processed_chunks: usize,
    pub succeeded_chunks: usize,
    pub total_waves: usize,
    pub waves_executed: usize,
    pub early_terminated: bool,
    pub wave_timings_ms: Vec<u64>,
    pub average_confidence: f64,
    pub tokens_processed: usize,
}

impl RunMetrics {
    /// Emit as a single structured tracing event
    pub fn emit(&self) {
        tracing::info!(
            target: "chunkwave::metrics",
            total_chunks = self.total_chunks,
            processed_chunks = self.processed_chunks,
            succeeded_chunks = self.succeeded_chunks,
            total_waves = self.total_waves,
            waves_executed = self.waves_executed,
            early_terminated = self.early_terminated,
            wave_timings_ms = ?self.wave_timings_ms,
            average_confidence = self.average_confidence,
            tokens_processed = self.tokens_processed,
            "wave run metrics"
        );
    }
}
