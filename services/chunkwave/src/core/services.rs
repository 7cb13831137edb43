//! Unified service container for chunkwave
//!
//! Provides shared access to the chunker and the wave scheduler.

use crate::core::chunking::{self, AdaptiveChunker, ChunkedDocument, ChunkerStats, ContentType};
use crate::core::config::Config;
use crate::core::error::{ChunkwaveError, Result};
use crate::core::types::ProcessingSummary;
use crate::core::waves::{AnswerOperation, WavePolicy, WaveScheduler};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Outcome of answering a query against one document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRun {
    pub content_type: ContentType,
    pub chunk_count: usize,
    /// Target size in effect when the document was split
    pub target_size: usize,
    pub summary: ProcessingSummary,
}

/// Unified services container
///
/// The chunker is shared: feedback from one document's run changes
/// the target size used for the next document.
#[derive(Clone)]
pub struct Services {
    pub chunker: Arc<Mutex<AdaptiveChunker>>,

    pub scheduler: Arc<WaveScheduler>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration
    pub fn new(config: Config) -> Self {
        let chunker = Arc::new(Mutex::new(AdaptiveChunker::new(&config.chunking)));

        let scheduler = Arc::new(
            WaveScheduler::new(WavePolicy::from(&config.waves))
                .with_chunk_prefix(config.output.chunk_prefix.clone()),
        );

        Self {
            chunker,
            scheduler,
            config: Arc::new(config),
        }
    }

    /// Split a document at the chunker's current target size
    pub async fn chunk_document(&self, text: &str, max_chunks: Option<usize>) -> ChunkedDocument {
        self.chunker.lock().await.chunk(text, max_chunks)
    }

    /// Chunk `text`, run every wave against `query`, then feed the
    /// successful call durations back into the chunker.
    pub async fn answer_document(
        &self,
        text: &str,
        query: &str,
        answer: Arc<dyn AnswerOperation>,
    ) -> Result<DocumentRun> {
        if query.trim().is_empty() {
            return Err(ChunkwaveError::InvalidQuery(
                "query must not be empty".to_string(),
            ));
        }

        let document = self.chunk_document(text, None).await;
        tracing::info!(
            "Answering over {} {} chunks (target {} chars)",
            document.len(),
            document.content_type,
            document.target_size
        );

        let summary = self
            .scheduler
            .run_all(&document.chunks, query, answer)
            .await?;

        {
            let mut chunker = self.chunker.lock().await;
            for result in summary.results.iter().filter(|r| r.succeeded) {
                chunker.observe(result.elapsed_ms);
            }
            tracing::debug!("Chunk target size now {}", chunker.target_size());
        }

        summary.metrics().emit();

        Ok(DocumentRun {
            content_type: document.content_type,
            chunk_count: document.len(),
            target_size: document.target_size,
            summary,
        })
    }

    /// Write a chunked document to the configured output directory
    pub fn write_chunks(&self, document: &ChunkedDocument) -> Result<Vec<PathBuf>> {
        chunking::write_chunks(
            &document.chunks,
            &self.config.output.chunk_dir,
            &self.config.output.chunk_prefix,
            document.content_type,
        )
    }

    pub async fn chunker_stats(&self) -> ChunkerStats {
        self.chunker.lock().await.stats()
    }
}
