//! Feedback adjustment - bounded human-feedback deltas over the base scores
//!
//! The deltas themselves come from an external process; this module's
//! responsibility is to apply and clamp. A failed delta computation means
//! zero deltas — adjustment failure never blocks reward computation.

use serde::{Deserialize, Serialize};

use super::judgment::{coerce_f64, JudgmentResult, JudgmentStatus};

/// Self-reported data a subject attaches to a completed quest; the input
/// to the external delta computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackInput {
    /// Perceived exertion, 0..=10.
    pub perceived_exertion: u8,
    /// Free-text description of anything unusual during the quest.
    pub anomalies_text: String,
    /// Actual rate of perceived exertion, 1..=10.
    pub rpe_actual: u8,
}

/// Per-factor deltas, each nominally in [-0.5, 0.5].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreAdjustments {
    /// Delta applied to the integrity score.
    pub integrity_adjustment: f64,
    /// Delta applied to the effort score.
    pub effort_adjustment: f64,
    /// Delta applied to the safety score.
    pub safety_adjustment: f64,
}

impl ScoreAdjustments {
    /// The pass-through adjustment (all deltas zero).
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            integrity_adjustment: 0.0,
            effort_adjustment: 0.0,
            safety_adjustment: 0.0,
        }
    }

    /// Decode deltas from a raw provider payload, coercing numeric
    /// strings and clamping each delta into its nominal [-0.5, 0.5]
    /// band. Missing fields and non-object payloads decode to zero —
    /// the safe pass-through.
    #[must_use]
    pub fn decode(raw: &serde_json::Value) -> Self {
        let field = |name: &str| {
            raw.get(name)
                .and_then(coerce_f64)
                .unwrap_or(0.0)
                .clamp(-0.5, 0.5)
        };
        Self {
            integrity_adjustment: field("integrity_adjustment"),
            effort_adjustment: field("effort_adjustment"),
            safety_adjustment: field("safety_adjustment"),
        }
    }
}

/// The final, adjusted judgment for a trial.
///
/// Scores are clamped to [0, 1] after adjustment and
/// `final_xp = floor(base_xp * avg(integrity, effort, safety))`, so
/// `0 <= final_xp <= base_xp` always holds. Deserialization re-checks
/// both invariants, so a stored or attacker-supplied payload cannot
/// smuggle in an inflated reward.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FinalJudgment {
    integrity_score: f64,
    effort_score: f64,
    safety_score: f64,
    status: JudgmentStatus,
    base_xp: u64,
    final_xp: u64,
    adjustment_reasoning: Option<String>,
    fallback: bool,
}

impl FinalJudgment {
    /// Adjusted integrity score in [0, 1].
    #[must_use]
    pub const fn integrity_score(&self) -> f64 {
        self.integrity_score
    }

    /// Adjusted effort score in [0, 1].
    #[must_use]
    pub const fn effort_score(&self) -> f64 {
        self.effort_score
    }

    /// Adjusted safety score in [0, 1].
    #[must_use]
    pub const fn safety_score(&self) -> f64 {
        self.safety_score
    }

    /// Verdict status carried over from the base judgment.
    #[must_use]
    pub const fn status(&self) -> JudgmentStatus {
        self.status
    }

    /// The reward ceiling the multiplier was applied to.
    #[must_use]
    pub const fn base_xp(&self) -> u64 {
        self.base_xp
    }

    /// The awarded XP, `floor(base_xp * avg(scores))`.
    #[must_use]
    pub const fn final_xp(&self) -> u64 {
        self.final_xp
    }

    /// Free-text explanation of the adjustment, if any.
    #[must_use]
    pub fn adjustment_reasoning(&self) -> Option<&str> {
        self.adjustment_reasoning.as_deref()
    }

    /// Whether the underlying judgment came from the fallback path.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Attach the adjustment reasoning.
    #[must_use]
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.adjustment_reasoning = Some(reasoning.into());
        self
    }
}

impl<'de> Deserialize<'de> for FinalJudgment {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            integrity_score: f64,
            effort_score: f64,
            safety_score: f64,
            status: JudgmentStatus,
            base_xp: u64,
            final_xp: u64,
            #[serde(default)]
            adjustment_reasoning: Option<String>,
            #[serde(default)]
            fallback: bool,
        }

        let raw = Raw::deserialize(deserializer)?;
        for (name, value) in [
            ("integrity_score", raw.integrity_score),
            ("effort_score", raw.effort_score),
            ("safety_score", raw.safety_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(serde::de::Error::custom(format!(
                    "{name} out of range: {value}"
                )));
            }
        }
        if raw.final_xp > raw.base_xp {
            return Err(serde::de::Error::custom(format!(
                "final_xp {} exceeds base_xp {}",
                raw.final_xp, raw.base_xp
            )));
        }
        Ok(Self {
            integrity_score: raw.integrity_score,
            effort_score: raw.effort_score,
            safety_score: raw.safety_score,
            status: raw.status,
            base_xp: raw.base_xp,
            final_xp: raw.final_xp,
            adjustment_reasoning: raw.adjustment_reasoning,
            fallback: raw.fallback,
        })
    }
}

/// Apply bounded deltas to a base judgment and compute the final reward.
///
/// Each adjusted score is clamped to [0, 1]; the reward is the floor of
/// the base ceiling times the mean of the three adjusted scores.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn adjust(base: &JudgmentResult, adjustments: &ScoreAdjustments) -> FinalJudgment {
    let integrity = (base.integrity_score() + adjustments.integrity_adjustment).clamp(0.0, 1.0);
    let effort = (base.effort_score() + adjustments.effort_adjustment).clamp(0.0, 1.0);
    let safety = (base.safety_score() + adjustments.safety_adjustment).clamp(0.0, 1.0);

    let multiplier = (integrity + effort + safety) / 3.0;
    let final_xp = (base.base_xp() as f64 * multiplier).floor() as u64;

    FinalJudgment {
        integrity_score: integrity,
        effort_score: effort,
        safety_score: safety,
        status: base.status(),
        base_xp: base.base_xp(),
        final_xp,
        adjustment_reasoning: None,
        fallback: base.is_fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(i: f64, e: f64, s: f64, xp: u64) -> JudgmentResult {
        JudgmentResult::new(i, e, s, JudgmentStatus::Approved, xp)
    }

    #[test]
    fn test_zero_adjustment_passes_through() {
        let b = base(0.9, 0.6, 0.3, 100);
        let f = adjust(&b, &ScoreAdjustments::zero());
        assert!((f.integrity_score() - 0.9).abs() < f64::EPSILON);
        assert!((f.effort_score() - 0.6).abs() < f64::EPSILON);
        assert!((f.safety_score() - 0.3).abs() < f64::EPSILON);
        // floor(100 * 0.6) = 60
        assert_eq!(f.final_xp(), 60);
    }

    #[test]
    fn test_adjustment_clamps_at_one() {
        let b = base(0.9, 0.9, 0.9, 100);
        let adj = ScoreAdjustments {
            integrity_adjustment: 0.5,
            effort_adjustment: 0.5,
            safety_adjustment: 0.5,
        };
        let f = adjust(&b, &adj);
        // 0.9 + 0.5 clamps to exactly 1.0, not 1.4
        assert!((f.integrity_score() - 1.0).abs() < f64::EPSILON);
        assert_eq!(f.final_xp(), 100);
    }

    #[test]
    fn test_adjustment_clamps_at_zero() {
        let b = base(0.2, 0.2, 0.2, 100);
        let adj = ScoreAdjustments {
            integrity_adjustment: -0.5,
            effort_adjustment: -0.5,
            safety_adjustment: -0.5,
        };
        let f = adjust(&b, &adj);
        assert!((f.integrity_score()).abs() < f64::EPSILON);
        assert_eq!(f.final_xp(), 0);
    }

    #[test]
    fn test_final_xp_never_exceeds_base() {
        for xp in [0u64, 1, 50, 100, 10_000] {
            let f = adjust(&base(1.0, 1.0, 1.0, xp), &ScoreAdjustments {
                integrity_adjustment: 0.5,
                effort_adjustment: 0.5,
                safety_adjustment: 0.5,
            });
            assert!(f.final_xp() <= xp);
        }
    }

    #[test]
    fn test_final_xp_floors() {
        // avg(0.5, 0.5, 0.4) = 0.4666..; floor(100 * 0.4666) = 46
        let f = adjust(&base(0.5, 0.5, 0.4, 100), &ScoreAdjustments::zero());
        assert_eq!(f.final_xp(), 46);
    }

    #[test]
    fn test_decode_clamps_deltas_to_band() {
        let raw = serde_json::json!({
            "integrity_adjustment": 0.9,
            "effort_adjustment": "-0.2",
            "safety_adjustment": -3.0
        });
        let adj = ScoreAdjustments::decode(&raw);
        assert!((adj.integrity_adjustment - 0.5).abs() < f64::EPSILON);
        assert!((adj.effort_adjustment + 0.2).abs() < f64::EPSILON);
        assert!((adj.safety_adjustment + 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_decode_garbage_is_pass_through() {
        assert_eq!(
            ScoreAdjustments::decode(&serde_json::json!("oops")),
            ScoreAdjustments::zero()
        );
        assert_eq!(
            ScoreAdjustments::decode(&serde_json::json!({})),
            ScoreAdjustments::zero()
        );
    }

    #[test]
    fn test_deserialize_round_trip() {
        let f = adjust(&base(0.9, 0.6, 0.3, 100), &ScoreAdjustments::zero());
        let json = serde_json::to_string(&f).unwrap();
        let back: FinalJudgment = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
    }

    #[test]
    fn test_deserialize_rejects_inflated_xp() {
        let json = serde_json::json!({
            "integrity_score": 1.0,
            "effort_score": 1.0,
            "safety_score": 1.0,
            "status": "approved",
            "base_xp": 100,
            "final_xp": 9999
        });
        let result: std::result::Result<FinalJudgment, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_score() {
        let json = serde_json::json!({
            "integrity_score": 1.8,
            "effort_score": 0.5,
            "safety_score": 0.5,
            "status": "approved",
            "base_xp": 100,
            "final_xp": 50
        });
        let result: std::result::Result<FinalJudgment, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_reasoning_attachment() {
        let f = adjust(&base(0.5, 0.5, 0.5, 10), &ScoreAdjustments::zero())
            .with_reasoning("user reported higher exertion than logged");
        assert!(f.adjustment_reasoning().is_some());
    }
}
