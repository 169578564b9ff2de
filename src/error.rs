//! Error types for Quest-Lab
//!
//! Setup errors (malformed experiments, missing lookups) propagate loudly;
//! upstream-provider errors are expected at runtime and are always
//! recovered through the fallback policy.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Quest-Lab error types
#[derive(Error, Debug)]
pub enum Error {
    /// Experiment definition is malformed (fewer than 2 variants,
    /// duplicate variant ids, or a closed lifecycle state)
    #[error("invalid experiment: {reason}")]
    InvalidExperiment {
        /// Why the experiment was rejected
        reason: String,
    },

    /// Lookup miss on an experiment id
    #[error("experiment not found: {0}")]
    NotFound(String),

    /// Lookup miss on a variant id within a known experiment
    #[error("unknown variant {variant_id:?} in experiment {experiment_id:?}")]
    UnknownVariant {
        /// The experiment that was searched
        experiment_id: String,
        /// The variant id that missed
        variant_id: String,
    },

    /// Judgment/generation provider failed or timed out.
    /// Always recovered via the fallback policy, never user-fatal.
    #[error("upstream provider unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Provider payload could not be coerced into a valid judgment.
    /// Recovered by defensive coercion where possible, else treated
    /// the same as `UpstreamUnavailable`.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// JSON (de)serialization error at the provider boundary
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
