//! chunkwave - Adaptive chunking and wave-based answer processing
//!
//! Splits large documents into content-aware chunks and runs an
//! external "answer this chunk" operation over them in bounded
//! concurrent waves, stopping early once enough confident answers
//! have come back.
//!
//! # Architecture
//!
//! - **core**: Domain logic
//!   - config, error, types, xdg
//!   - chunking (classifier, boundaries, assembler, feedback controller)
//!   - waves (answer boundary, confidence extraction, scheduler)
//!   - services (unified service container)
//!
//! - **cli**: clap adapter (depends on core)
//!
//! # Key Features
//!
//! - UTF-8 safe chunking (character-based, never splits a code point)
//! - Lossless splits: chunks always concatenate back to the input
//! - Chunk size steered by observed call latency
//! - Early termination on confident answers

// Core domain logic
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::chunking::{AdaptiveChunker, ChunkedDocument, ContentType};
pub use core::config::Config;
pub use core::error::{AnswerError, ChunkwaveError, Result};
pub use core::services::{DocumentRun, Services};
pub use core::types::*;
pub use core::waves::{AnswerOperation, AnswerRequest, WaveScheduler};
