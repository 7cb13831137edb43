//! Content-aware adaptive chunking
//!
//! # Pipeline
//!
//! 1. **classifier**: pick a `ContentType` for the whole document
//! 2. **boundary**: candidate split offsets for that type
//! 3. **assembler**: merge/split spans around the current target size
//! 4. **feedback**: adjust the target size from observed call latency
//!
//! `AdaptiveChunker` ties the four together and memoizes steps 1 and 2
//! in a `ClassificationCache`.

pub mod assembler;
pub mod boundary;
pub mod cache;
pub mod classifier;
pub mod feedback;
pub mod materialize;

pub use assembler::assemble;
pub use boundary::find_boundaries;
pub use cache::ClassificationCache;
pub use classifier::{classify, ContentType};
pub use feedback::{ChunkerState, FeedbackPolicy, SizeAdjustment, SizeController, DURATION_HISTORY};
pub use materialize::{chunk_file_name, write_chunks};

use crate::core::config::ChunkingConfig;
use crate::core::types::Chunk;
use serde::Serialize;

/// A document split for one wave run
#[derive(Debug, Clone, Serialize)]
pub struct ChunkedDocument {
    pub content_type: ContentType,
    /// Target size in effect when the document was split
    pub target_size: usize,
    pub chunks: Vec<Chunk>,
}

impl ChunkedDocument {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Snapshot of the chunker's sizing and cache behaviour
#[derive(Debug, Clone, Serialize)]
pub struct ChunkerStats {
    pub current_size: usize,
    pub min_size: usize,
    pub max_size: usize,
    pub optimal_time_ms: u64,
    /// Durations observed so far
    pub adjustments_made: usize,
    pub average_duration_ms: f64,
    /// Observations that moved the target size
    pub size_adjustments: usize,
    pub cache_hit_rate: f64,
}

pub struct AdaptiveChunker {
    controller: SizeController,
    cache: ClassificationCache,
    max_chunks: Option<usize>,
}

impl AdaptiveChunker {
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            controller: SizeController::from_config(config),
            cache: ClassificationCache::new(config.cache_capacity),
            max_chunks: config.max_chunks,
        }
    }

    /// Chunker with default policy and explicit sizes
    pub fn with_sizes(initial: usize, min_size: usize, max_size: usize) -> Self {
        let config = ChunkingConfig {
            initial_chunk_size: initial,
            min_chunk_size: min_size,
            max_chunk_size: max_size,
            ..ChunkingConfig::default()
        };
        Self::new(&config)
    }

    pub fn detect_content_type(&mut self, text: &str) -> ContentType {
        self.cache.content_type(text, || classify(text))
    }

    pub fn find_boundaries(&mut self, text: &str, content_type: ContentType) -> Vec<usize> {
        self.cache
            .boundaries(text, content_type, || find_boundaries(text, content_type))
    }

    /// Split `text` at the current target size.
    ///
    /// `max_chunks` overrides the configured cap for this call.
    pub fn chunk(&mut self, text: &str, max_chunks: Option<usize>) -> ChunkedDocument {
        let content_type = self.detect_content_type(text);
        let boundaries = self.find_boundaries(text, content_type);
        let target_size = self.controller.target_size();
        let chunks = assemble(text, &boundaries, target_size, max_chunks.or(self.max_chunks));

        tracing::debug!(
            "Chunked {} chars of {} into {} chunks (target {})",
            text.chars().count(),
            content_type,
            chunks.len(),
            target_size
        );

        ChunkedDocument {
            content_type,
            target_size,
            chunks,
        }
    }

    /// Feed back one chunk's processing time
    pub fn observe(&mut self, elapsed_ms: u64) -> SizeAdjustment {
        self.controller.observe(elapsed_ms)
    }

    pub fn target_size(&self) -> usize {
        self.controller.target_size()
    }

    pub fn state(&self) -> &ChunkerState {
        self.controller.state()
    }

    pub fn stats(&self) -> ChunkerStats {
        let state = self.controller.state();
        ChunkerStats {
            current_size: state.current_target_size,
            min_size: state.min_size,
            max_size: state.max_size,
            optimal_time_ms: state.optimal_duration_ms,
            adjustments_made: state.observation_count,
            average_duration_ms: self.controller.average_duration_ms(),
            size_adjustments: self.controller.out_of_band_count(),
            cache_hit_rate: self.cache.hit_rate(),
        }
    }
}

impl Default for AdaptiveChunker {
    fn default() -> Self {
        Self::new(&ChunkingConfig::default())
    }
}
