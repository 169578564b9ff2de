//! # Quest-Lab: Experiment Evaluation Engine
//!
//! Quest-Lab is the evaluation core of a fitness-gamification product:
//! deterministic A/B variant bucketing, online per-variant outcome
//! aggregation, a two-proportion significance test, and a score-fusion
//! pipeline that turns an automated judgment plus human feedback into a
//! bounded XP reward.
//!
//! ## Design Principles
//!
//! - **Determinism**: variant assignment is a pure function of
//!   (subject, experiment) — reproducible across processes, no stored
//!   mapping required.
//! - **Graceful degradation**: every external-provider failure lands on a
//!   deterministic fallback (zero reward, rejected status), never a crash
//!   and never an unfairly generous default.
//! - **Boundary decoding**: provider JSON is coerced and validated once,
//!   at the edge, into closed enums and clamped scores.
//!
//! ## Example
//!
//! ```rust
//! use quest_lab::experiment::{Experiment, ExperimentEvaluator, TrialOutcome};
//!
//! let evaluator = ExperimentEvaluator::new();
//! let experiment = Experiment::builder("exp-001")
//!     .variant("control", serde_json::json!({}))
//!     .variant("treatment", serde_json::json!({"prompt": "v2"}))
//!     .build()?;
//! evaluator.create(experiment)?;
//!
//! let variant = evaluator.assign_trial("subject-42", "exp-001")?;
//! evaluator.record_outcome("exp-001", &variant, &TrialOutcome::new(true, 0.9, 1200.0))?;
//!
//! let report = evaluator.evaluate("exp-001")?;
//! assert!(!report.pairs.is_empty());
//! # Ok::<(), quest_lab::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod error;
pub mod experiment;
pub mod hash;
pub mod provider;
pub mod scoring;
pub mod trace;

pub use error::{Error, Result};
