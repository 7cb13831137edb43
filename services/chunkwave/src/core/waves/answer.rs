//! The external "answer this chunk" boundary.

use crate::core::error::AnswerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Metadata sent alongside every chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub chunk_id: String,
    pub chunk_index: usize,
    /// Size of the untruncated chunk in characters
    pub full_chunk_size: usize,
}

/// One call to the answer operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// Chunk content, truncated to the dispatch limit
    pub content: String,
    pub query: String,
    pub metadata: ChunkMetadata,
}

/// Answers a query against a single chunk.
///
/// Implementations are shared across every worker of a wave, so they
/// must be `Send + Sync`. The returned payload is opaque; only its
/// top-level confidence-like fields are read.
#[async_trait]
pub trait AnswerOperation: Send + Sync {
    async fn answer(&self, request: AnswerRequest) -> Result<Value, AnswerError>;
}

#[async_trait]
impl<T: AnswerOperation + ?Sized> AnswerOperation for Arc<T> {
    async fn answer(&self, request: AnswerRequest) -> Result<Value, AnswerError> {
        (**self).answer(request).await
    }
}

/// Adapter for async closures
pub struct AnswerFn<F> {
    f: F,
}

/// Wrap an async closure as an `AnswerOperation`
pub fn answer_fn<F, Fut>(f: F) -> AnswerFn<F>
where
    F: Fn(AnswerRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, AnswerError>> + Send,
{
    AnswerFn { f }
}

#[async_trait]
impl<F, Fut> AnswerOperation for AnswerFn<F>
where
    F: Fn(AnswerRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, AnswerError>> + Send,
{
    async fn answer(&self, request: AnswerRequest) -> Result<Value, AnswerError> {
        (self.f)(request).await
    }
}

/// Adapter for synchronous closures.
///
/// Each call runs on tokio's blocking pool so a slow closure never
/// stalls the runtime's worker threads.
pub struct BlockingAnswer<F> {
    f: Arc<F>,
}

impl<F> BlockingAnswer<F>
where
    F: Fn(AnswerRequest) -> Result<Value, AnswerError> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }
}

#[async_trait]
impl<F> AnswerOperation for BlockingAnswer<F>
where
    F: Fn(AnswerRequest) -> Result<Value, AnswerError> + Send + Sync + 'static,
{
    async fn answer(&self, request: AnswerRequest) -> Result<Value, AnswerError> {
        let f = Arc::clone(&self.f);
        match tokio::task::spawn_blocking(move || f(request)).await {
            Ok(result) => result,
            Err(e) => Err(AnswerError::WorkerPanicked(e.to_string())),
        }
    }
}
