//! Provider seams - the external judgment/generation collaborators
//!
//! The engine never calls a model directly; it consumes these traits and
//! tolerates their absence or failure. Implementations are constructed
//! and injected by the application (no lazily-initialized globals), so
//! tests substitute local mocks without touching process-wide state.

use std::future::Future;

use crate::error::Result;
use crate::scoring::{FeedbackInput, JudgmentResult, QuestLog, QuestPlan};

/// The automated judge: given a quest plan and a completed log, returns a
/// structured JSON verdict. The payload is treated as untrusted and
/// decoded defensively by [`scoring::score`](crate::scoring::score).
pub trait JudgmentProvider: Send + Sync {
    /// Judge one completed trial.
    fn judge(
        &self,
        plan: &QuestPlan,
        log: &QuestLog,
    ) -> impl Future<Output = Result<serde_json::Value>> + Send;
}

/// The feedback-delta computation: given a base judgment and the
/// subject's self-reported data, returns raw per-factor deltas. Failure
/// here must never block reward computation; callers fall back to zero
/// deltas.
pub trait AdjustmentProvider: Send + Sync {
    /// Compute score adjustments for one trial.
    fn adjustments(
        &self,
        base: &JudgmentResult,
        feedback: &FeedbackInput,
    ) -> impl Future<Output = Result<serde_json::Value>> + Send;
}
