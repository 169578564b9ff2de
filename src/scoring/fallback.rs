//! Fallback policy - deterministic degraded behavior
//!
//! Every constructor here is total and pure: whenever the upstream
//! judgment, generation, or moderation call is unavailable, the system
//! degrades to these values. Results are tagged so telemetry can separate
//! fallback-path outcomes from genuine ones. The degraded defaults are
//! deliberately ungenerous: zero reward and a rejected or needs-review
//! status, never a free pass.

use serde::{Deserialize, Serialize};

use super::judgment::{JudgmentResult, JudgmentStatus, QuestPlan};

/// Moderation outcome for user-visible content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    /// Content is fine.
    Allow,
    /// Content must not be shown.
    Block,
    /// A human moderator has to look.
    NeedsReview,
}

/// A moderation verdict with a confidence level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    /// What to do with the content.
    pub action: ModerationAction,
    /// Provider confidence in [0, 1]; the fallback verdict stays below 0.5.
    pub confidence: f64,
    /// True when this verdict came from the fallback path.
    pub fallback: bool,
}

/// The judgment used when the provider failed or timed out: all scores
/// zero, status Rejected, reward necessarily zero. Tagged as fallback.
#[must_use]
pub fn rejected_judgment(base_xp: u64) -> JudgmentResult {
    JudgmentResult::new(0.0, 0.0, 0.0, JudgmentStatus::Rejected, base_xp).tag_fallback()
}

/// The quest served when generation is unavailable: a fixed,
/// low-difficulty baseline anyone can complete.
#[must_use]
pub fn baseline_quest() -> QuestPlan {
    QuestPlan::new("fallback-baseline", "Take a 20-minute walk", 1, 50)
}

/// The moderation verdict used when the moderation call is unavailable:
/// neutral, low-confidence, routed to a human.
#[must_use]
pub const fn needs_review_verdict() -> ModerationVerdict {
    ModerationVerdict {
        action: ModerationAction::NeedsReview,
        confidence: 0.4,
        fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{adjust, ScoreAdjustments};

    #[test]
    fn test_rejected_judgment_is_zeroed_and_tagged() {
        let j = rejected_judgment(500);
        assert_eq!(j.status(), JudgmentStatus::Rejected);
        assert!((j.integrity_score()).abs() < f64::EPSILON);
        assert!((j.effort_score()).abs() < f64::EPSILON);
        assert!((j.safety_score()).abs() < f64::EPSILON);
        assert_eq!(j.base_xp(), 500);
        assert!(j.is_fallback());
    }

    #[test]
    fn test_rejected_judgment_yields_zero_reward() {
        let f = adjust(&rejected_judgment(500), &ScoreAdjustments::zero());
        assert_eq!(f.final_xp(), 0);
        assert!(f.is_fallback());
    }

    #[test]
    fn test_baseline_quest_is_low_difficulty() {
        let q = baseline_quest();
        assert_eq!(q.difficulty(), 1);
        assert!(q.base_xp() > 0);
    }

    #[test]
    fn test_needs_review_verdict_confidence_below_half() {
        let v = needs_review_verdict();
        assert_eq!(v.action, ModerationAction::NeedsReview);
        assert!(v.confidence < 0.5);
        assert!(v.fallback);
    }
}
