//! Experiment evaluator - concurrent registry tying assignment,
//! aggregation, and significance together
//!
//! The registry is a `DashMap`; mutating an experiment (recording an
//! outcome, advancing the lifecycle) holds that entry's write lock, which
//! serializes all aggregate updates for the experiment. Different
//! experiments update fully in parallel.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::{
    assign_variant, compare, Experiment, SignificanceReport, TargetMetric, TrialAssignment,
    TrialOutcome, Winner,
};

/// One pairwise test of a challenger variant against the current best.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairComparison {
    /// The best-performing variant by the experiment's target metric.
    pub baseline_id: String,
    /// The variant compared against the baseline.
    pub challenger_id: String,
    /// The raw z-test result for this pair.
    pub report: SignificanceReport,
    /// Whether both arms cleared the experiment's `min_sample_size`.
    /// When false, `report.is_significant` is forced to false and no
    /// winner is declared.
    pub sufficient_sample: bool,
    /// The winning variant id, if the difference is significant.
    pub winner_id: Option<String>,
}

/// Answer to "which variant is winning, and how confidently."
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationReport {
    /// The evaluated experiment.
    pub experiment_id: String,
    /// The metric that drove the baseline choice.
    pub target_metric: TargetMetric,
    /// The current best variant by target metric.
    pub baseline_id: String,
    /// Each remaining variant, tested against the baseline.
    pub pairs: Vec<PairComparison>,
    /// When the report was computed.
    pub generated_at: DateTime<Utc>,
}

/// Concurrent experiment registry and evaluation façade.
///
/// Owns the experiments, an assignment audit cache, and the glue between
/// the pure assignment/aggregation/significance functions.
#[derive(Debug, Default)]
pub struct ExperimentEvaluator {
    experiments: DashMap<String, Experiment>,
    assignments: DashMap<String, TrialAssignment>,
}

impl ExperimentEvaluator {
    /// Create an empty evaluator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validated experiment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExperiment`] if the id is already taken.
    pub fn create(&self, experiment: Experiment) -> Result<()> {
        if self.experiments.contains_key(experiment.id()) {
            return Err(Error::InvalidExperiment {
                reason: format!("experiment id {:?} already registered", experiment.id()),
            });
        }
        debug!(experiment_id = experiment.id(), "experiment registered");
        self.experiments
            .insert(experiment.id().to_string(), experiment);
        Ok(())
    }

    /// Get a snapshot of an experiment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] on a lookup miss.
    pub fn get(&self, experiment_id: &str) -> Result<Experiment> {
        self.experiments
            .get(experiment_id)
            .map(|e| e.clone())
            .ok_or_else(|| Error::NotFound(experiment_id.to_string()))
    }

    /// Number of registered experiments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// Whether no experiments are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    /// Assign a subject to a variant, transitioning a Draft experiment to
    /// Running on its first trial.
    ///
    /// Idempotent for a fixed (subject, experiment): repeated calls return
    /// the same variant and refresh nothing but the audit timestamp.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] on a missing experiment;
    /// [`Error::InvalidExperiment`] if the experiment is Completed or
    /// Archived.
    pub fn assign_trial(&self, subject_id: &str, experiment_id: &str) -> Result<String> {
        let mut entry = self
            .experiments
            .get_mut(experiment_id)
            .ok_or_else(|| Error::NotFound(experiment_id.to_string()))?;
        if !entry.is_open() {
            return Err(Error::InvalidExperiment {
                reason: format!(
                    "experiment {experiment_id:?} is {:?}, no longer assigning",
                    entry.status()
                ),
            });
        }
        let variant_id = assign_variant(subject_id, &entry)?.to_string();
        entry.mark_running();
        drop(entry);

        debug!(subject_id, experiment_id, variant_id = %variant_id, "trial assigned");
        self.assignments.insert(
            audit_key(subject_id, experiment_id),
            TrialAssignment::new(subject_id, experiment_id, variant_id.as_str()),
        );
        Ok(variant_id)
    }

    /// Look up the audit record of a past assignment, if one was made
    /// through this evaluator.
    #[must_use]
    pub fn assignment(&self, subject_id: &str, experiment_id: &str) -> Option<TrialAssignment> {
        self.assignments
            .get(&audit_key(subject_id, experiment_id))
            .map(|a| a.clone())
    }

    /// Record a completed trial's outcome against its variant.
    ///
    /// The entry write lock serializes concurrent increments on the same
    /// experiment, so no update is lost.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] on a missing experiment,
    /// [`Error::UnknownVariant`] on a missing variant,
    /// [`Error::InvalidExperiment`] if the experiment no longer accepts
    /// outcomes.
    pub fn record_outcome(
        &self,
        experiment_id: &str,
        variant_id: &str,
        outcome: &TrialOutcome,
    ) -> Result<()> {
        let mut entry = self
            .experiments
            .get_mut(experiment_id)
            .ok_or_else(|| Error::NotFound(experiment_id.to_string()))?;
        if !entry.is_open() {
            return Err(Error::InvalidExperiment {
                reason: format!(
                    "experiment {experiment_id:?} is {:?}, no longer recording",
                    entry.status()
                ),
            });
        }
        let variant = entry
            .variant_mut(variant_id)
            .ok_or_else(|| Error::UnknownVariant {
                experiment_id: experiment_id.to_string(),
                variant_id: variant_id.to_string(),
            })?;
        variant.aggregate_mut().record(outcome);
        debug!(experiment_id, variant_id, success = outcome.success, "outcome recorded");
        Ok(())
    }

    /// Compare every variant against the current best by target metric.
    ///
    /// For >2-variant experiments this is the pairwise-vs-best scheme:
    /// the baseline is the arm with the highest target-metric value and
    /// each other arm is z-tested against it. Pairs where either arm has
    /// fewer than `min_sample_size` samples are reported but never
    /// declared significant.
    ///
    /// Note that the z-test itself always runs on success rates; with
    /// [`TargetMetric::AvgScore`] the target metric only picks the
    /// baseline, so a pair's `winner_id` can disagree with the
    /// baseline choice when score and success rate diverge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] on a lookup miss.
    pub fn evaluate(&self, experiment_id: &str) -> Result<EvaluationReport> {
        let experiment = self.get(experiment_id)?;
        let min = experiment.min_sample_size();

        // Baseline: highest metric value; ties resolve to the later arm
        // in display order.
        let baseline = experiment
            .variants()
            .iter()
            .max_by(|x, y| {
                experiment
                    .metric_value(x.aggregate())
                    .partial_cmp(&experiment.metric_value(y.aggregate()))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .ok_or_else(|| Error::InvalidExperiment {
                reason: format!("experiment {experiment_id:?} has no variants"),
            })?;

        let mut pairs = Vec::new();
        for challenger in experiment.variants() {
            if challenger.id() == baseline.id() {
                continue;
            }
            let mut report = compare(baseline.aggregate(), challenger.aggregate());
            let sufficient_sample = baseline.aggregate().sample_size() >= min
                && challenger.aggregate().sample_size() >= min;
            if !sufficient_sample {
                report.is_significant = false;
                report.winner = None;
            }
            let winner_id = report.winner.map(|w| match w {
                Winner::First => baseline.id().to_string(),
                Winner::Second => challenger.id().to_string(),
            });
            pairs.push(PairComparison {
                baseline_id: baseline.id().to_string(),
                challenger_id: challenger.id().to_string(),
                report,
                sufficient_sample,
                winner_id,
            });
        }

        Ok(EvaluationReport {
            experiment_id: experiment_id.to_string(),
            target_metric: experiment.target_metric(),
            baseline_id: baseline.id().to_string(),
            pairs,
            generated_at: Utc::now(),
        })
    }

    /// Operator action: mark an experiment Completed. Experiments never
    /// auto-complete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] on a lookup miss and
    /// [`Error::InvalidExperiment`] when the experiment is Archived —
    /// that state is terminal and cannot be reopened.
    pub fn finalize(&self, experiment_id: &str) -> Result<()> {
        let mut entry = self
            .experiments
            .get_mut(experiment_id)
            .ok_or_else(|| Error::NotFound(experiment_id.to_string()))?;
        entry.finalize()
    }

    /// Operator action: archive an experiment. Terminal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] on a lookup miss.
    pub fn archive(&self, experiment_id: &str) -> Result<()> {
        let mut entry = self
            .experiments
            .get_mut(experiment_id)
            .ok_or_else(|| Error::NotFound(experiment_id.to_string()))?;
        entry.archive();
        Ok(())
    }
}

fn audit_key(subject_id: &str, experiment_id: &str) -> String {
    format!("{subject_id}\u{1f}{experiment_id}")
}
