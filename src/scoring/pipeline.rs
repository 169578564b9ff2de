//! Scoring pipeline - async orchestration of judgment and adjustment
//!
//! The pipeline owns the two provider calls (the only suspension points
//! in the engine), wraps each in a timeout, and guarantees a total
//! outcome: every trial ends in a `FinalJudgment`, either genuine or
//! fallback, never an error and never an indeterminate "never scored"
//! state.

use std::time::Duration;

use tokio::time::timeout;
use tracing::warn;

use crate::provider::{AdjustmentProvider, JudgmentProvider};
use crate::trace::{TraceEvent, TraceSink};

use super::fallback::rejected_judgment;
use super::feedback::{adjust, FeedbackInput, FinalJudgment, ScoreAdjustments};
use super::judgment::{score, JudgmentResult, QuestLog, QuestPlan};

const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Orchestrates provider calls, defensive decoding, feedback adjustment,
/// and per-stage tracing for one trial at a time.
///
/// Construct with explicit dependencies; there is no global state. Both
/// provider calls run under `timeout`, and a timeout is handled exactly
/// like a provider failure.
#[derive(Debug)]
pub struct ScoringPipeline<J, A, S> {
    judge: J,
    adjuster: A,
    sink: S,
    provider_timeout: Duration,
}

impl<J, A, S> ScoringPipeline<J, A, S>
where
    J: JudgmentProvider,
    A: AdjustmentProvider,
    S: TraceSink,
{
    /// Create a pipeline with the default 10s provider timeout.
    pub fn new(judge: J, adjuster: A, sink: S) -> Self {
        Self {
            judge,
            adjuster,
            sink,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Override the provider timeout.
    #[must_use]
    pub fn with_timeout(mut self, provider_timeout: Duration) -> Self {
        self.provider_timeout = provider_timeout;
        self
    }

    /// Score one completed trial end to end.
    ///
    /// Judgment failure or timeout degrades to the rejected fallback;
    /// adjustment failure degrades to zero deltas. The returned judgment
    /// always satisfies `0 <= final_xp <= base_xp`.
    pub async fn score_trial(
        &self,
        plan: &QuestPlan,
        log: &QuestLog,
        feedback: Option<&FeedbackInput>,
    ) -> FinalJudgment {
        let base = self.judged(plan, log).await;

        let adjustments = match (base.is_fallback(), feedback) {
            // A fallback judgment is already zeroed; skip the second call.
            (true, _) | (false, None) => ScoreAdjustments::zero(),
            (false, Some(fb)) => self.adjusted(&base, fb).await,
        };

        let final_judgment = adjust(&base, &adjustments);
        let mut event = TraceEvent::new("trial_scored")
            .input(serde_json::to_value(plan).unwrap_or_default())
            .output(serde_json::to_value(&final_judgment).unwrap_or_default());
        if final_judgment.is_fallback() {
            event = event.tag("fallback");
        }
        self.sink.emit(event);
        final_judgment
    }

    async fn judged(&self, plan: &QuestPlan, log: &QuestLog) -> JudgmentResult {
        let mut event = TraceEvent::new("judgment").input(serde_json::json!({
            "quest_id": plan.id(),
            "duration_ms": log.duration_ms(),
        }));

        let result = match timeout(self.provider_timeout, self.judge.judge(plan, log)).await {
            Ok(Ok(raw)) => match score(plan, log, &raw) {
                Ok(result) => result,
                Err(err) => {
                    warn!(quest_id = plan.id(), %err, "unparseable judgment, falling back");
                    rejected_judgment(plan.base_xp())
                }
            },
            Ok(Err(err)) => {
                warn!(quest_id = plan.id(), %err, "judgment provider failed, falling back");
                rejected_judgment(plan.base_xp())
            }
            Err(_) => {
                warn!(quest_id = plan.id(), "judgment provider timed out, falling back");
                rejected_judgment(plan.base_xp())
            }
        };

        event = event.output(serde_json::to_value(&result).unwrap_or_default());
        if result.is_fallback() {
            event = event.tag("fallback");
        }
        self.sink.emit(event);
        result
    }

    async fn adjusted(&self, base: &JudgmentResult, feedback: &FeedbackInput) -> ScoreAdjustments {
        match timeout(self.provider_timeout, self.adjuster.adjustments(base, feedback)).await {
            Ok(Ok(raw)) => ScoreAdjustments::decode(&raw),
            Ok(Err(err)) => {
                warn!(%err, "adjustment provider failed, passing scores through");
                ScoreAdjustments::zero()
            }
            Err(_) => {
                warn!("adjustment provider timed out, passing scores through");
                ScoreAdjustments::zero()
            }
        }
    }
}
