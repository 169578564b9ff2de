//! Experiment evaluation: variant bucketing, outcome aggregation, and
//! significance testing.
//!
//! ## Schema Overview
//!
//! ```text
//! Experiment (1) ──< Variant (2..N)
//!                        │
//!                        └── VariantAggregate  [append-only counters]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use quest_lab::experiment::{Experiment, ExperimentEvaluator, TrialOutcome};
//!
//! let evaluator = ExperimentEvaluator::new();
//! let experiment = Experiment::builder("exp-001")
//!     .variant("a", serde_json::json!({}))
//!     .variant("b", serde_json::json!({}))
//!     .build()?;
//! evaluator.create(experiment)?;
//!
//! // Same subject, same variant, every time.
//! let v1 = evaluator.assign_trial("athlete-7", "exp-001")?;
//! let v2 = evaluator.assign_trial("athlete-7", "exp-001")?;
//! assert_eq!(v1, v2);
//! # Ok::<(), quest_lab::Error>(())
//! ```

mod aggregate;
mod assignment;
mod definition;
mod evaluator;
mod significance;

pub use aggregate::{TrialOutcome, VariantAggregate};
pub use assignment::{assign_variant, TrialAssignment};
pub use definition::{
    Experiment, ExperimentBuilder, ExperimentStatus, TargetMetric, Variant,
};
pub use evaluator::{EvaluationReport, ExperimentEvaluator, PairComparison};
pub use significance::{compare, normal_cdf, SignificanceReport, Winner};
