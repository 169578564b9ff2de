//! Scoring pipeline tests with mock providers
//!
//! Exercises the degraded paths end to end: provider errors, hangs past
//! the timeout, garbled payloads, and string-typed numerics. Every case
//! must land on a total `FinalJudgment`, never an error.

use std::time::Duration;

use quest_lab::provider::{AdjustmentProvider, JudgmentProvider};
use quest_lab::scoring::{
    FeedbackInput, JudgmentResult, JudgmentStatus, QuestLog, QuestPlan, ScoringPipeline,
};
use quest_lab::trace::{MemoryTraceSink, NoopTraceSink};
use quest_lab::{Error, Result};

struct FixedJudge(serde_json::Value);

impl JudgmentProvider for FixedJudge {
    async fn judge(&self, _plan: &QuestPlan, _log: &QuestLog) -> Result<serde_json::Value> {
        Ok(self.0.clone())
    }
}

struct ErrorJudge;

impl JudgmentProvider for ErrorJudge {
    async fn judge(&self, _plan: &QuestPlan, _log: &QuestLog) -> Result<serde_json::Value> {
        Err(Error::UpstreamUnavailable("model endpoint 503".into()))
    }
}

struct HangingJudge;

impl JudgmentProvider for HangingJudge {
    async fn judge(&self, _plan: &QuestPlan, _log: &QuestLog) -> Result<serde_json::Value> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(serde_json::json!({}))
    }
}

struct FixedAdjuster(serde_json::Value);

impl AdjustmentProvider for FixedAdjuster {
    async fn adjustments(
        &self,
        _base: &JudgmentResult,
        _feedback: &FeedbackInput,
    ) -> Result<serde_json::Value> {
        Ok(self.0.clone())
    }
}

struct HangingAdjuster;

impl AdjustmentProvider for HangingAdjuster {
    async fn adjustments(
        &self,
        _base: &JudgmentResult,
        _feedback: &FeedbackInput,
    ) -> Result<serde_json::Value> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(serde_json::json!({}))
    }
}

fn plan() -> QuestPlan {
    QuestPlan::new("q-1", "morning 5k", 3, 100)
}

fn log() -> QuestLog {
    QuestLog::new("q-1", 1_860_000.0, "legs heavy on the last km")
}

fn feedback() -> FeedbackInput {
    FeedbackInput {
        perceived_exertion: 8,
        anomalies_text: "stopped twice at crossings".into(),
        rpe_actual: 7,
    }
}

#[tokio::test]
async fn test_happy_path_with_adjustment() {
    let pipeline = ScoringPipeline::new(
        FixedJudge(serde_json::json!({
            "integrity_score": 0.8,
            "effort_score": 0.7,
            "safety_score": 0.9,
            "status": "approved"
        })),
        FixedAdjuster(serde_json::json!({
            "integrity_adjustment": 0.1,
            "effort_adjustment": 0.2,
            "safety_adjustment": -0.1
        })),
        NoopTraceSink,
    );

    let result = pipeline.score_trial(&plan(), &log(), Some(&feedback())).await;
    assert_eq!(result.status(), JudgmentStatus::Approved);
    assert!((result.integrity_score() - 0.9).abs() < 1e-12);
    assert!((result.effort_score() - 0.9).abs() < 1e-12);
    assert!((result.safety_score() - 0.8).abs() < 1e-12);
    // floor(100 * (0.9 + 0.9 + 0.8) / 3) = 86
    assert_eq!(result.final_xp(), 86);
    assert!(!result.is_fallback());
}

#[tokio::test]
async fn test_provider_error_yields_rejected_fallback() {
    let pipeline = ScoringPipeline::new(ErrorJudge, FixedAdjuster(serde_json::json!({})), NoopTraceSink);
    let result = pipeline.score_trial(&plan(), &log(), Some(&feedback())).await;

    assert_eq!(result.status(), JudgmentStatus::Rejected);
    assert_eq!(result.final_xp(), 0);
    assert!(result.is_fallback());
}

#[tokio::test]
async fn test_provider_timeout_treated_as_failure() {
    let pipeline = ScoringPipeline::new(
        HangingJudge,
        FixedAdjuster(serde_json::json!({})),
        NoopTraceSink,
    )
    .with_timeout(Duration::from_millis(50));
    let result = pipeline.score_trial(&plan(), &log(), None).await;

    assert_eq!(result.status(), JudgmentStatus::Rejected);
    assert_eq!(result.final_xp(), 0);
    assert!(result.is_fallback());
}

#[tokio::test]
async fn test_garbled_payload_treated_as_failure() {
    let pipeline = ScoringPipeline::new(
        FixedJudge(serde_json::json!("not a verdict")),
        FixedAdjuster(serde_json::json!({})),
        NoopTraceSink,
    );
    let result = pipeline.score_trial(&plan(), &log(), None).await;

    assert_eq!(result.status(), JudgmentStatus::Rejected);
    assert_eq!(result.final_xp(), 0);
    assert!(result.is_fallback());
}

#[tokio::test]
async fn test_string_typed_payload_is_coerced() {
    let pipeline = ScoringPipeline::new(
        FixedJudge(serde_json::json!({
            "integrity_score": "0.6",
            "effort_score": "0.6",
            "safety_score": "0.6",
            "status": "Approved"
        })),
        FixedAdjuster(serde_json::json!({})),
        NoopTraceSink,
    );
    let result = pipeline.score_trial(&plan(), &log(), None).await;

    assert_eq!(result.status(), JudgmentStatus::Approved);
    assert_eq!(result.final_xp(), 60);
}

#[tokio::test]
async fn test_hanging_adjuster_never_blocks_reward() {
    let pipeline = ScoringPipeline::new(
        FixedJudge(serde_json::json!({
            "integrity_score": 0.9,
            "effort_score": 0.9,
            "safety_score": 0.9,
            "status": "approved"
        })),
        HangingAdjuster,
        NoopTraceSink,
    )
    .with_timeout(Duration::from_millis(50));
    let result = pipeline.score_trial(&plan(), &log(), Some(&feedback())).await;

    // Adjustment timed out: scores pass through unchanged
    assert!((result.integrity_score() - 0.9).abs() < f64::EPSILON);
    assert_eq!(result.final_xp(), 90);
    assert!(!result.is_fallback());
}

#[tokio::test]
async fn test_fallback_results_are_tagged_in_traces() {
    let sink = MemoryTraceSink::new();
    let pipeline = ScoringPipeline::new(ErrorJudge, FixedAdjuster(serde_json::json!({})), &sink);
    pipeline.score_trial(&plan(), &log(), None).await;

    let events = sink.events();
    assert!(!events.is_empty());
    let judgment = events.iter().find(|e| e.name == "judgment").unwrap();
    assert!(judgment.tags.contains(&"fallback".to_string()));
    let scored = events.iter().find(|e| e.name == "trial_scored").unwrap();
    assert!(scored.tags.contains(&"fallback".to_string()));
}

#[tokio::test]
async fn test_genuine_results_are_untagged() {
    let sink = MemoryTraceSink::new();
    let pipeline = ScoringPipeline::new(
        FixedJudge(serde_json::json!({
            "integrity_score": 1.0,
            "effort_score": 1.0,
            "safety_score": 1.0,
            "status": "approved"
        })),
        FixedAdjuster(serde_json::json!({})),
        &sink,
    );
    pipeline.score_trial(&plan(), &log(), None).await;

    let events = sink.events();
    assert!(events.iter().all(|e| !e.tags.contains(&"fallback".to_string())));
}
