//! Judgment scoring - defensive decoding of the provider verdict
//!
//! The provider's "intelligence" is external; this module enforces the
//! contract: numeric-looking strings become numbers, out-of-enum statuses
//! normalize to the safe default, scores clamp to [0, 1], and anything
//! unparseable is a `ValidationError` the caller recovers via fallback.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A planned quest: the unit of work a trial executes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestPlan {
    id: String,
    title: String,
    difficulty: u8,
    base_xp: u64,
}

impl QuestPlan {
    /// Create a quest plan.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, difficulty: u8, base_xp: u64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            difficulty,
            base_xp,
        }
    }

    /// Get the quest id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the quest title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the declared difficulty (1 = easiest).
    #[must_use]
    pub const fn difficulty(&self) -> u8 {
        self.difficulty
    }

    /// Get the declared reward ceiling before any multiplier.
    #[must_use]
    pub const fn base_xp(&self) -> u64 {
        self.base_xp
    }
}

/// What the subject reported about executing a quest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestLog {
    quest_id: String,
    duration_ms: f64,
    notes: String,
}

impl QuestLog {
    /// Create a quest log entry.
    #[must_use]
    pub fn new(quest_id: impl Into<String>, duration_ms: f64, notes: impl Into<String>) -> Self {
        Self {
            quest_id: quest_id.into(),
            duration_ms,
            notes: notes.into(),
        }
    }

    /// Get the quest this log belongs to.
    #[must_use]
    pub fn quest_id(&self) -> &str {
        &self.quest_id
    }

    /// Get the reported duration in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Get the free-text notes.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }
}

/// Verdict status, decoded once at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgmentStatus {
    /// The trial passes review.
    Approved,
    /// The trial fails review; reward is withheld.
    Rejected,
    /// The trial needs human review.
    Flagged,
}

impl JudgmentStatus {
    /// Normalize a raw status string. Unknown values land on `Flagged`
    /// (needs review), never on `Approved`.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "approved" | "approve" => Self::Approved,
            "rejected" | "reject" => Self::Rejected,
            _ => Self::Flagged,
        }
    }
}

/// The validated judgment for one trial: three bounded factor scores,
/// a status, and the reward ceiling carried over from the quest plan.
///
/// Immutable once produced; a feedback adjustment turns it into a
/// [`FinalJudgment`](crate::scoring::FinalJudgment) exactly once.
/// Deserialization re-checks the [0, 1] score bounds, so stored
/// payloads cannot bypass the constructor's clamp.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JudgmentResult {
    integrity_score: f64,
    effort_score: f64,
    safety_score: f64,
    status: JudgmentStatus,
    base_xp: u64,
    fallback: bool,
}

impl JudgmentResult {
    /// Create a judgment, clamping each score into [0, 1].
    #[must_use]
    pub fn new(
        integrity_score: f64,
        effort_score: f64,
        safety_score: f64,
        status: JudgmentStatus,
        base_xp: u64,
    ) -> Self {
        Self {
            integrity_score: integrity_score.clamp(0.0, 1.0),
            effort_score: effort_score.clamp(0.0, 1.0),
            safety_score: safety_score.clamp(0.0, 1.0),
            status,
            base_xp,
            fallback: false,
        }
    }

    pub(crate) const fn tag_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }

    /// Integrity factor score in [0, 1].
    #[must_use]
    pub const fn integrity_score(&self) -> f64 {
        self.integrity_score
    }

    /// Effort factor score in [0, 1].
    #[must_use]
    pub const fn effort_score(&self) -> f64 {
        self.effort_score
    }

    /// Safety factor score in [0, 1].
    #[must_use]
    pub const fn safety_score(&self) -> f64 {
        self.safety_score
    }

    /// Verdict status.
    #[must_use]
    pub const fn status(&self) -> JudgmentStatus {
        self.status
    }

    /// Reward ceiling before the multiplier.
    #[must_use]
    pub const fn base_xp(&self) -> u64 {
        self.base_xp
    }

    /// Whether this judgment came from the fallback path, so telemetry
    /// can tell degraded results from genuine ones.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.fallback
    }
}

impl<'de> Deserialize<'de> for JudgmentResult {
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
        Ok(Self {
            integrity_score: raw.integrity_score,
            effort_score: raw.effort_score,
            safety_score: raw.safety_score,
            status: raw.status,
            base_xp: raw.base_xp,
            fallback: raw.fallback,
        })
    }
}

/// Coerce a JSON value that should be a number: accepts numbers and
/// numeric-looking strings, rejects everything else.
pub(crate) fn coerce_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a JSON value that should be a boolean: accepts booleans and
/// boolean-looking strings.
pub(crate) fn coerce_bool(value: &serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Parse a provider's raw text response into JSON.
///
/// The single parse point for provider payloads; callers treat a parse
/// failure the same as an unavailable provider.
///
/// # Errors
///
/// Returns [`Error::Serde`] when the text is not valid JSON.
pub fn parse_raw(text: &str) -> Result<serde_json::Value> {
    Ok(serde_json::from_str(text)?)
}

/// Validate a raw provider verdict into a [`JudgmentResult`].
///
/// This is the single decode point for judgment payloads: missing scores
/// default to 0.0, numeric strings are coerced, out-of-range values are
/// clamped, and an unknown status normalizes to `Flagged`. A payload with
/// no `status` but a boolean-looking `approved` field is honored; with
/// neither, the trial is flagged for review.
///
/// # Errors
///
/// Returns [`Error::ValidationError`] when the payload is not a JSON
/// object at all — callers treat that the same as an unavailable
/// provider and fall back.
pub fn score(plan: &QuestPlan, log: &QuestLog, raw: &serde_json::Value) -> Result<JudgmentResult> {
    let obj = raw.as_object().ok_or_else(|| {
        Error::ValidationError(format!(
            "judgment for quest {:?} is not a JSON object: {raw}",
            log.quest_id()
        ))
    })?;

    let field = |name: &str| obj.get(name).and_then(coerce_f64).unwrap_or(0.0);
    let integrity = field("integrity_score");
    let effort = field("effort_score");
    let safety = field("safety_score");

    let status = obj.get("status").and_then(|v| v.as_str()).map_or_else(
        || match obj.get("approved").and_then(coerce_bool) {
            Some(true) => JudgmentStatus::Approved,
            Some(false) => JudgmentStatus::Rejected,
            None => JudgmentStatus::Flagged,
        },
        JudgmentStatus::normalize,
    );

    Ok(JudgmentResult::new(
        integrity,
        effort,
        safety,
        status,
        plan.base_xp(),
    ))
}
