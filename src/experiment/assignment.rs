//! Variant assignment - deterministic subject-to-variant bucketing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::stable_hash;

use super::Experiment;

/// Map a subject to one of an experiment's variants.
///
/// Pure function of its inputs: `stable_hash(subject_id + "-" +
/// experiment.id) mod k` indexes the variant list, so the same subject
/// always lands on the same arm with no persisted mapping. A cache of
/// [`TrialAssignment`] records may still be kept for audit.
///
/// # Errors
///
/// Returns [`Error::InvalidExperiment`] if the variant list is empty.
/// The ≥2-variant invariant is enforced at build time, not here.
#[allow(clippy::cast_possible_truncation)]
pub fn assign_variant<'a>(subject_id: &str, experiment: &'a Experiment) -> Result<&'a str> {
    let k = experiment.variants().len();
    if k == 0 {
        return Err(Error::InvalidExperiment {
            reason: format!("experiment {:?} has no variants", experiment.id()),
        });
    }
    let h = stable_hash(&format!("{subject_id}-{}", experiment.id()));
    let index = (h % k as u64) as usize;
    Ok(experiment.variants()[index].id())
}

/// Audit record of one assignment decision.
///
/// Not required for correctness (assignment is reproducible); kept so
/// analytics can see who landed where, and when.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrialAssignment {
    subject_id: String,
    experiment_id: String,
    variant_id: String,
    assigned_at: DateTime<Utc>,
}

impl TrialAssignment {
    /// Create an assignment record stamped with the current time.
    #[must_use]
    pub fn new(
        subject_id: impl Into<String>,
        experiment_id: impl Into<String>,
        variant_id: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            experiment_id: experiment_id.into(),
            variant_id: variant_id.into(),
            assigned_at: Utc::now(),
        }
    }

    /// Get the subject id.
    #[must_use]
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Get the experiment id.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the assigned variant id.
    #[must_use]
    pub fn variant_id(&self) -> &str {
        &self.variant_id
    }

    /// Get the assignment timestamp.
    #[must_use]
    pub const fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }
}
