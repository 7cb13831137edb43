//! Core domain logic
//!
//! Everything here is independent of the CLI adapter.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Chunks, processing results and run summaries
//! - **xdg**: XDG directory handling
//! - **chunking**: Content classification, boundaries and adaptive sizing
//! - **waves**: Wave scheduling against an external answer operation
//! - **services**: Unified service container

pub mod chunking;
pub mod config;
pub mod error;
pub mod services;
pub mod types;
pub mod waves;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{AnswerError, ChunkwaveError, Result};
pub use services::{DocumentRun, Services};
