//! Variant aggregate - running per-variant outcome counters

use serde::{Deserialize, Serialize};

/// Outcome of a single completed trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    /// Whether the trial counts as a success for its variant.
    pub success: bool,
    /// Trial quality score, expected in [0, 1].
    pub score: f64,
    /// Wall-clock latency of the trial in milliseconds.
    pub latency_ms: f64,
}

impl TrialOutcome {
    /// Create a new trial outcome.
    #[must_use]
    pub const fn new(success: bool, score: f64, latency_ms: f64) -> Self {
        Self {
            success,
            score,
            latency_ms,
        }
    }
}

/// Running counters for one variant.
///
/// Append-only and monotonically growing: `record` is the only writer and
/// no outcome is ever retracted. Means are derived on read, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantAggregate {
    sample_size: u64,
    success_count: u64,
    score_sum: f64,
    latency_sum_ms: f64,
}

impl VariantAggregate {
    /// Create a fresh, empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the counters.
    pub fn record(&mut self, outcome: &TrialOutcome) {
        self.sample_size += 1;
        if outcome.success {
            self.success_count += 1;
        }
        self.score_sum += outcome.score;
        self.latency_sum_ms += outcome.latency_ms;
    }

    /// Number of outcomes recorded.
    #[must_use]
    pub const fn sample_size(&self) -> u64 {
        self.sample_size
    }

    /// Number of successful outcomes.
    #[must_use]
    pub const fn success_count(&self) -> u64 {
        self.success_count
    }

    /// Sum of trial scores.
    #[must_use]
    pub const fn score_sum(&self) -> f64 {
        self.score_sum
    }

    /// Sum of trial latencies in milliseconds.
    #[must_use]
    pub const fn latency_sum_ms(&self) -> f64 {
        self.latency_sum_ms
    }

    /// Fraction of successful outcomes, 0.0 when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.sample_size == 0 {
            0.0
        } else {
            self.success_count as f64 / self.sample_size as f64
        }
    }

    /// Mean trial score, 0.0 when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_score(&self) -> f64 {
        if self.sample_size == 0 {
            0.0
        } else {
            self.score_sum / self.sample_size as f64
        }
    }

    /// Mean trial latency in milliseconds, 0.0 when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_latency_ms(&self) -> f64 {
        if self.sample_size == 0 {
            0.0
        } else {
            self.latency_sum_ms / self.sample_size as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_aggregate_is_zero() {
        let agg = VariantAggregate::new();
        assert_eq!(agg.sample_size(), 0);
        assert_eq!(agg.success_count(), 0);
        assert!((agg.success_rate()).abs() < f64::EPSILON);
        assert!((agg.avg_score()).abs() < f64::EPSILON);
        assert!((agg.avg_latency_ms()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_increments() {
        let mut agg = VariantAggregate::new();
        agg.record(&TrialOutcome::new(true, 0.8, 1500.0));
        agg.record(&TrialOutcome::new(false, 0.4, 500.0));

        assert_eq!(agg.sample_size(), 2);
        assert_eq!(agg.success_count(), 1);
        assert!((agg.success_rate() - 0.5).abs() < f64::EPSILON);
        assert!((agg.avg_score() - 0.6).abs() < 1e-12);
        assert!((agg.avg_latency_ms() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_monotonicity() {
        let mut agg = VariantAggregate::new();
        for i in 0..100 {
            agg.record(&TrialOutcome::new(i % 3 == 0, 0.5, 100.0));
        }
        assert_eq!(agg.sample_size(), 100);
        assert!(agg.success_count() <= agg.sample_size());
    }
}
