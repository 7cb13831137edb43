//! Wave scheduler integration tests

use crate::common::{make_chunks, ConstantAnswer, TimingAnswer, ScriptedAnswer, Step};
use chunkwave::core::waves::{AnswerOperation, WavePolicy, WaveScheduler};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn scheduler(width: usize, threshold: f64, min_confident: usize) -> WaveScheduler {
    WaveScheduler::new(WavePolicy {
        max_concurrency: width,
        confidence_threshold: threshold,
        min_confident_chunks: min_confident,
        call_timeout: Duration::from_secs(5),
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_twelve_chunks_run_as_three_waves_with_barrier() {
    let timing = Arc::new(TimingAnswer::new(Duration::from_millis(40), 0.1));
    let answer: Arc<dyn AnswerOperation> = timing.clone();

    let summary = scheduler(5, 0.8, 3)
        .run_all(&make_chunks(12), "what happened?", answer)
        .await
        .unwrap();

    assert_eq!(summary.total_waves, 3);
    assert_eq!(summary.waves_executed, 3);
    assert!(!summary.early_terminated);
    let sizes: Vec<usize> = summary.waves.iter().map(|w| w.chunk_count).collect();
    assert_eq!(sizes, vec![5, 5, 2]);
    assert!(timing.peak() <= 5);

    // No call of wave k+1 starts before every call of wave k has returned
    let records = timing.records();
    assert_eq!(records.len(), 12);
    for wave in 0..2 {
        let last_finish = records
            .iter()
            .filter(|r| r.chunk_index / 5 == wave)
            .map(|r| r.finished)
            .max()
            .unwrap();
        let first_start = records
            .iter()
            .filter(|r| r.chunk_index / 5 == wave + 1)
            .map(|r| r.started)
            .min()
            .unwrap();
        assert!(first_start >= last_finish, "wave {} overlapped the next", wave);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_calls_within_a_wave_run_concurrently() {
    let timing = Arc::new(TimingAnswer::new(Duration::from_millis(100), 0.1));
    let answer: Arc<dyn AnswerOperation> = timing.clone();

    let summary = scheduler(5, 0.8, 3)
        .run_all(&make_chunks(5), "q", answer)
        .await
        .unwrap();

    assert_eq!(timing.peak(), 5);
    // Sequential dispatch would take at least 500ms
    assert!(summary.waves[0].elapsed_ms < 400);
}

#[tokio::test]
async fn test_early_termination_after_first_wave() {
    let constant = Arc::new(ConstantAnswer::new(0.9));
    let answer: Arc<dyn AnswerOperation> = constant.clone();

    let summary = scheduler(3, 0.8, 3)
        .run_all(&make_chunks(9), "q", answer)
        .await
        .unwrap();

    assert_eq!(summary.waves_executed, 1);
    assert_eq!(summary.total_waves, 3);
    assert!(summary.early_terminated);
    assert!(!summary.cancelled);
    assert_eq!(summary.chunks_processed, 3);
    assert_eq!(summary.high_confidence_count(), 3);
    assert_eq!(constant.calls(), 3);
}

#[tokio::test]
async fn test_three_confident_of_five_stop_after_first_wave() {
    let steps = (0..12).map(|i| {
        let confidence = if i < 3 { 0.9 } else { 0.5 };
        (i, Step::Confidence(confidence))
    });
    let scripted = Arc::new(ScriptedAnswer::new(steps));
    let answer: Arc<dyn AnswerOperation> = scripted.clone();

    let summary = scheduler(5, 0.8, 3)
        .run_all(&make_chunks(12), "q", answer)
        .await
        .unwrap();

    assert_eq!(summary.waves_executed, 1);
    assert!(summary.early_terminated);
    assert_eq!(summary.results.len(), 5);
    // Nothing beyond wave 1 was dispatched
    assert_eq!(scripted.calls(), 5);
}

#[tokio::test]
async fn test_confident_results_accumulate_across_waves() {
    let scripted = Arc::new(ScriptedAnswer::new([
        (0, Step::Confidence(0.95)),
        (2, Step::Confidence(0.85)),
        (3, Step::Confidence(0.9)),
    ]));
    let answer: Arc<dyn AnswerOperation> = scripted.clone();

    let summary = scheduler(2, 0.8, 3)
        .run_all(&make_chunks(6), "q", answer)
        .await
        .unwrap();

    assert_eq!(summary.waves_executed, 2);
    assert!(summary.early_terminated);
    assert_eq!(scripted.calls(), 4);
    assert_eq!(summary.waves[0].high_confidence, 1);
    assert_eq!(summary.waves[1].high_confidence, 2);
}

#[tokio::test]
async fn test_threshold_is_strict() {
    let answer: Arc<dyn AnswerOperation> = Arc::new(ConstantAnswer::new(0.8));

    let summary = scheduler(2, 0.8, 1)
        .run_all(&make_chunks(4), "q", answer)
        .await
        .unwrap();

    assert_eq!(summary.waves_executed, 2);
    assert!(!summary.early_terminated);
    assert_eq!(summary.high_confidence_count(), 0);
}

#[tokio::test]
async fn test_one_failure_does_not_affect_siblings() {
    let scripted = Arc::new(ScriptedAnswer::new([(2, Step::Fail("model refused".to_string()))]));
    let answer: Arc<dyn AnswerOperation> = scripted.clone();

    let summary = scheduler(5, 0.8, 3)
        .run_all(&make_chunks(5), "q", answer)
        .await
        .unwrap();

    assert_eq!(summary.chunks_processed, 5);
    assert_eq!(summary.chunks_succeeded, 4);
    let failed = &summary.results[2];
    assert!(!failed.succeeded);
    assert_eq!(failed.confidence, 0.0);
    assert!(failed.payload.is_none());
    assert!(failed.error_message.as_deref().unwrap().contains("model refused"));
    assert!(summary
        .results
        .iter()
        .enumerate()
        .all(|(i, r)| i == 2 || r.succeeded));
}

#[tokio::test]
async fn test_panicking_worker_becomes_failed_result() {
    let answer: Arc<dyn AnswerOperation> =
        Arc::new(ScriptedAnswer::new([(1, Step::Panic)]));

    let summary = scheduler(3, 0.8, 3)
        .run_all(&make_chunks(3), "q", answer)
        .await
        .unwrap();

    assert_eq!(summary.chunks_succeeded, 2);
    assert!(!summary.results[1].succeeded);
    assert!(summary.results[1]
        .error_message
        .as_deref()
        .unwrap()
        .contains("panicked"));
}

#[tokio::test]
async fn test_slow_call_times_out_without_blocking_wave() {
    let answer: Arc<dyn AnswerOperation> = Arc::new(ScriptedAnswer::new([(
        0,
        Step::Sleep(Duration::from_secs(10)),
    )]));
    let scheduler = WaveScheduler::new(WavePolicy {
        max_concurrency: 2,
        confidence_threshold: 0.8,
        min_confident_chunks: 3,
        call_timeout: Duration::from_millis(100),
    });

    let summary = scheduler.run_all(&make_chunks(4), "q", answer).await.unwrap();

    assert_eq!(summary.waves_executed, 2);
    assert!(!summary.results[0].succeeded);
    assert!(summary.results[1..].iter().all(|r| r.succeeded));
    assert!(summary.waves[0].elapsed_ms < 5_000);
}

#[tokio::test]
async fn test_empty_input_never_calls_answer() {
    let constant = Arc::new(ConstantAnswer::new(0.9));
    let answer: Arc<dyn AnswerOperation> = constant.clone();

    let summary = scheduler(5, 0.8, 3).run_all(&[], "q", answer).await.unwrap();

    assert_eq!(summary.waves_executed, 0);
    assert_eq!(summary.total_waves, 0);
    assert_eq!(summary.chunks_processed, 0);
    assert!(!summary.early_terminated);
    assert!(summary.results.is_empty());
    assert_eq!(constant.calls(), 0);
}

#[tokio::test]
async fn test_total_failure_still_returns_summary() {
    let answer: Arc<dyn AnswerOperation> = Arc::new(ScriptedAnswer::new(
        (0..4).map(|i| (i, Step::Fail(format!("down {i}")))),
    ));

    let summary = scheduler(2, 0.8, 1)
        .run_all(&make_chunks(4), "q", answer)
        .await
        .unwrap();

    assert!(summary.is_total_failure());
    assert_eq!(summary.waves_executed, 2);
    assert_eq!(summary.chunks_succeeded, 0);
    assert_eq!(summary.average_confidence(), 0.0);
}

#[tokio::test]
async fn test_invalid_input_dispatches_nothing() {
    let constant = Arc::new(ConstantAnswer::new(0.9));

    let err = scheduler(0, 0.8, 3)
        .run_all(&make_chunks(3), "q", constant.clone())
        .await
        .unwrap_err();
    assert!(err.is_config_error());

    let err = scheduler(2, 0.8, 3)
        .run_all(&make_chunks(3), "", constant.clone())
        .await
        .unwrap_err();
    assert!(err.is_bad_request());

    assert_eq!(constant.calls(), 0);
}

#[tokio::test]
async fn test_cancel_flag_stops_between_waves() {
    let scheduler = Arc::new(scheduler(1, 0.8, 10));
    let flag = Arc::new(AtomicBool::new(false));
    let timing = Arc::new(TimingAnswer::new(Duration::from_millis(50), 0.1));
    let answer: Arc<dyn AnswerOperation> = timing.clone();

    let run = {
        let scheduler = Arc::clone(&scheduler);
        let flag = Arc::clone(&flag);
        tokio::spawn(async move {
            scheduler
                .run_all_with_cancel(&make_chunks(20), "q", answer, &flag)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(120)).await;
    flag.store(true, Ordering::SeqCst);

    let summary = run.await.unwrap().unwrap();
    assert!(summary.cancelled);
    assert!(summary.early_terminated);
    assert!(summary.waves_executed < 20);
    // In-flight calls are allowed to finish
    assert_eq!(timing.records().len(), summary.chunks_processed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancelling_one_run_leaves_concurrent_run_alone() {
    let scheduler = Arc::new(scheduler(2, 0.8, 10));
    let answer: Arc<dyn AnswerOperation> =
        Arc::new(TimingAnswer::new(Duration::from_millis(20), 0.1));
    let cancelled = AtomicBool::new(true);
    let live = AtomicBool::new(false);
    let chunks = make_chunks(6);

    let (stopped, finished) = tokio::join!(
        scheduler.run_all_with_cancel(&chunks, "q", Arc::clone(&answer), &cancelled),
        scheduler.run_all_with_cancel(&chunks, "q", Arc::clone(&answer), &live),
    );

    let stopped = stopped.unwrap();
    assert!(stopped.cancelled);
    assert_eq!(stopped.chunks_processed, 0);

    let finished = finished.unwrap();
    assert!(!finished.cancelled);
    assert_eq!(finished.chunks_processed, 6);
    assert_eq!(finished.waves_executed, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_dropped_run_aborts_in_flight_wave() {
    let timing = Arc::new(TimingAnswer::new(Duration::from_millis(300), 0.1));
    let answer: Arc<dyn AnswerOperation> = timing.clone();
    let scheduler = scheduler(5, 0.8, 3);
    let chunks = make_chunks(5);

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        scheduler.run_all(&chunks, "q", answer),
    )
    .await;
    assert!(outcome.is_err(), "run should still be in its first wave");
    assert_eq!(timing.started(), 5);

    // Long enough for every call to have finished had it kept running
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(timing.records().is_empty());
    assert_eq!(timing.started(), 5);
}

#[tokio::test]
async fn test_summary_serializes_to_json() {
    let answer: Arc<dyn AnswerOperation> = Arc::new(ConstantAnswer::new(0.5));
    let summary = scheduler(2, 0.8, 3)
        .run_all(&make_chunks(3), "q", answer)
        .await
        .unwrap();

    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["total_chunks"], 3);
    assert_eq!(value["results"].as_array().unwrap().len(), 3);
    assert_eq!(value["results"][0]["chunk_id"], "chunk_000");
    assert!(value["results"][0].get("error_message").is_none());
}
