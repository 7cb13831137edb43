//! Document pipeline integration tests

use crate::common::{assert_lossless, create_test_services, sample, ConstantAnswer, ScriptedAnswer, Step};
use chunkwave::core::chunking::ContentType;
use chunkwave::core::config::Config;
use chunkwave::core::services::Services;
use chunkwave::core::waves::{answer_fn, AnswerOperation, AnswerRequest, BlockingAnswer};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_answer_document_end_to_end() {
    let services = create_test_services();
    let doc = sample(ContentType::Markdown);
    let constant = Arc::new(ConstantAnswer::new(0.3));
    let answer: Arc<dyn AnswerOperation> = constant.clone();

    let run = services
        .answer_document(&doc.text, "which section mentions 3?", answer)
        .await
        .unwrap();

    assert_eq!(run.content_type, ContentType::Markdown);
    assert_eq!(run.summary.total_chunks, run.chunk_count);
    assert_eq!(run.summary.chunks_processed, run.chunk_count);
    assert_eq!(constant.calls(), run.chunk_count);
    assert!(run.summary.tokens_processed > 0);
}

#[tokio::test]
async fn test_fast_answers_grow_next_documents_chunks() {
    let services = create_test_services();
    let doc = sample(ContentType::Text);
    let answer: Arc<dyn AnswerOperation> = Arc::new(ConstantAnswer::new(0.1));

    let first = services
        .answer_document(&doc.text, "q", answer.clone())
        .await
        .unwrap();
    let second = services.answer_document(&doc.text, "q", answer).await.unwrap();

    assert!(second.target_size > first.target_size);
    assert!(second.chunk_count <= first.chunk_count);
}

#[tokio::test]
async fn test_slow_answers_shrink_target() {
    let mut config = Config::default();
    config.chunking.initial_chunk_size = 200;
    config.chunking.min_chunk_size = 20;
    config.chunking.max_chunk_size = 400;
    config.chunking.slow_threshold_ms = 30;
    config.chunking.fast_threshold_ms = 10;
    let services = Services::new(config);

    let slow: Arc<dyn AnswerOperation> = Arc::new(ScriptedAnswer::new(
        (0..50).map(|i| (i, Step::Sleep(Duration::from_millis(60)))),
    ));
    let doc = sample(ContentType::Log);
    services.answer_document(&doc.text, "q", slow).await.unwrap();

    let stats = services.chunker_stats().await;
    assert!(stats.current_size < 200);
    assert!(stats.current_size >= 20);
    assert_eq!(stats.size_adjustments, stats.adjustments_made);
}

#[tokio::test]
async fn test_async_and_blocking_closures_are_answer_operations() {
    let services = create_test_services();
    let doc = sample(ContentType::Json);

    let async_op: Arc<dyn AnswerOperation> = Arc::new(answer_fn(|req: AnswerRequest| async move {
        Ok(json!({ "certainty": if req.content.contains("\"id\": 0,") { 0.99 } else { 0.2 } }))
    }));
    let run = services.answer_document(&doc.text, "q", async_op).await.unwrap();
    assert_eq!(run.summary.high_confidence_count(), 1);

    let blocking_op: Arc<dyn AnswerOperation> = Arc::new(BlockingAnswer::new(|req: AnswerRequest| {
        std::thread::sleep(Duration::from_millis(5));
        Ok(json!({ "score": req.metadata.full_chunk_size as f64 / 1_000_000.0 }))
    }));
    let run = services.answer_document(&doc.text, "q", blocking_op).await.unwrap();
    assert_eq!(run.summary.chunks_succeeded, run.chunk_count);
}

#[tokio::test]
async fn test_chunk_and_write_files() {
    let temp = TempDir::new().unwrap();
    let mut config = Config::default();
    config.chunking.initial_chunk_size = 80;
    config.chunking.min_chunk_size = 40;
    config.output.chunk_dir = temp.path().join("out");
    config.output.chunk_prefix = "log".to_string();
    let services = Services::new(config);

    let doc = sample(ContentType::Log);
    let document = services.chunk_document(&doc.text, Some(4)).await;
    assert!(document.len() <= 4);
    assert_lossless(&document.chunks, &doc.text);

    let paths = services.write_chunks(&document).unwrap();
    assert_eq!(paths.len(), document.len());
    assert!(paths[0].ends_with("log_000.log"));

    let rebuilt: String = paths
        .iter()
        .map(|p| fs::read_to_string(p).unwrap())
        .collect();
    assert_eq!(rebuilt, doc.text);
}

#[tokio::test]
async fn test_empty_document_runs_no_waves() {
    let services = create_test_services();
    let constant = Arc::new(ConstantAnswer::new(0.9));
    let answer: Arc<dyn AnswerOperation> = constant.clone();

    let run = services.answer_document("", "q", answer).await.unwrap();
    assert_eq!(run.chunk_count, 0);
    assert_eq!(run.summary.waves_executed, 0);
    assert!(!run.summary.early_terminated);
    assert_eq!(constant.calls(), 0);
}
