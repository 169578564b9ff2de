//! Experiment definition - variants, lifecycle status, and target metric

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::VariantAggregate;

/// Lifecycle status of an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperimentStatus {
    /// Defined but no trials assigned yet.
    Draft,
    /// Accepting assignments and outcomes.
    Running,
    /// Finalized by an operator; read-only but still evaluable.
    Completed,
    /// Terminal; no further operations.
    Archived,
}

/// The aggregated field that drives the winner decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetMetric {
    /// Fraction of successful trials.
    #[default]
    SuccessRate,
    /// Mean trial score (expected 0..1-bounded).
    AvgScore,
}

/// One arm of an experiment.
///
/// `config` is an opaque payload interpreted by the caller (e.g. which
/// prompt template the arm uses); the engine never inspects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    id: String,
    config: serde_json::Value,
    aggregate: VariantAggregate,
}

impl Variant {
    /// Create a variant with an empty aggregate.
    #[must_use]
    pub fn new(id: impl Into<String>, config: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            config,
            aggregate: VariantAggregate::new(),
        }
    }

    /// Get the variant id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the opaque caller-owned configuration.
    #[must_use]
    pub const fn config(&self) -> &serde_json::Value {
        &self.config
    }

    /// Get the variant's running counters.
    #[must_use]
    pub const fn aggregate(&self) -> &VariantAggregate {
        &self.aggregate
    }

    pub(crate) fn aggregate_mut(&mut self) -> &mut VariantAggregate {
        &mut self.aggregate
    }
}

/// An A/B experiment: an ordered set of variants plus the decision policy.
///
/// Variant order is significant only for display; assignment depends on
/// the hash, not the position. Construct via [`Experiment::builder`],
/// which enforces the ≥2-variants and unique-id invariants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experiment {
    id: String,
    variants: Vec<Variant>,
    status: ExperimentStatus,
    min_sample_size: u64,
    target_metric: TargetMetric,
    created_at: DateTime<Utc>,
}

impl Experiment {
    /// Create a builder for the given experiment id.
    #[must_use]
    pub fn builder(id: impl Into<String>) -> ExperimentBuilder {
        ExperimentBuilder::new(id)
    }

    /// Get the experiment id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the variants in display order.
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Get a variant by id.
    #[must_use]
    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id() == variant_id)
    }

    pub(crate) fn variant_mut(&mut self, variant_id: &str) -> Option<&mut Variant> {
        self.variants.iter_mut().find(|v| v.id() == variant_id)
    }

    /// Get the current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ExperimentStatus {
        self.status
    }

    /// Get the per-variant sample threshold below which significance is
    /// not considered meaningful.
    #[must_use]
    pub const fn min_sample_size(&self) -> u64 {
        self.min_sample_size
    }

    /// Get the metric that drives the winner decision.
    #[must_use]
    pub const fn target_metric(&self) -> TargetMetric {
        self.target_metric
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the experiment still accepts assignments and outcomes.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(
            self.status,
            ExperimentStatus::Draft | ExperimentStatus::Running
        )
    }

    /// The value of `target_metric` for one variant's counters.
    #[must_use]
    pub fn metric_value(&self, aggregate: &VariantAggregate) -> f64 {
        match self.target_metric {
            TargetMetric::SuccessRate => aggregate.success_rate(),
            TargetMetric::AvgScore => aggregate.avg_score(),
        }
    }

    pub(crate) fn mark_running(&mut self) {
        if self.status == ExperimentStatus::Draft {
            self.status = ExperimentStatus::Running;
        }
    }

    pub(crate) fn finalize(&mut self) -> Result<()> {
        if self.status == ExperimentStatus::Archived {
            return Err(Error::InvalidExperiment {
                reason: format!("experiment {:?} is archived, a terminal state", self.id),
            });
        }
        self.status = ExperimentStatus::Completed;
        Ok(())
    }

    pub(crate) fn archive(&mut self) {
        self.status = ExperimentStatus::Archived;
    }
}

/// Builder for [`Experiment`]. Validation happens in [`build`](Self::build):
/// an experiment with fewer than 2 variants or duplicate variant ids is a
/// setup error and fails loudly.
#[derive(Debug)]
pub struct ExperimentBuilder {
    id: String,
    variants: Vec<Variant>,
    min_sample_size: u64,
    target_metric: TargetMetric,
}

impl ExperimentBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            variants: Vec::new(),
            min_sample_size: 30,
            target_metric: TargetMetric::SuccessRate,
        }
    }

    /// Append a variant arm.
    #[must_use]
    pub fn variant(mut self, id: impl Into<String>, config: serde_json::Value) -> Self {
        self.variants.push(Variant::new(id, config));
        self
    }

    /// Set the per-variant sample threshold (default 30).
    #[must_use]
    pub const fn min_sample_size(mut self, n: u64) -> Self {
        self.min_sample_size = n;
        self
    }

    /// Set the winner-decision metric (default success rate).
    #[must_use]
    pub const fn target_metric(mut self, metric: TargetMetric) -> Self {
        self.target_metric = metric;
        self
    }

    /// Validate and build the experiment in `Draft` status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExperiment`] if there are fewer than 2
    /// variants or any variant id repeats.
    pub fn build(self) -> Result<Experiment> {
        if self.variants.len() < 2 {
            return Err(Error::InvalidExperiment {
                reason: format!(
                    "experiment {:?} has {} variant(s), need at least 2",
                    self.id,
                    self.variants.len()
                ),
            });
        }
        for (i, v) in self.variants.iter().enumerate() {
            if self.variants[..i].iter().any(|p| p.id() == v.id()) {
                return Err(Error::InvalidExperiment {
                    reason: format!(
                        "duplicate variant id {:?} in experiment {:?}",
                        v.id(),
                        self.id
                    ),
                });
            }
        }
        Ok(Experiment {
            id: self.id,
            variants: self.variants,
            status: ExperimentStatus::Draft,
            min_sample_size: self.min_sample_size,
            target_metric: self.target_metric,
            created_at: Utc::now(),
        })
    }
}
