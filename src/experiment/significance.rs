//! Two-proportion significance testing
//!
//! Implements the classic two-proportion z-test over two variants'
//! success rates, with a rational-approximation normal CDF. The
//! Abramowitz-Stegun constants are reproduced exactly so results stay
//! bit-compatible with historical comparisons.

use serde::{Deserialize, Serialize};

use super::VariantAggregate;

/// Which comparand won a pairwise test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    /// The first argument to [`compare`] has the higher rate.
    First,
    /// The second argument to [`compare`] has the higher rate.
    Second,
}

/// Result of one pairwise significance test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificanceReport {
    /// The z statistic, signed (positive means the first arm leads).
    pub z_score: f64,
    /// Two-tailed p-value; 1.0 when there is not enough data.
    pub p_value: f64,
    /// `p_value < 0.05`.
    pub is_significant: bool,
    /// Half-width of the 95% confidence interval (`1.96 * se`),
    /// rounded to 3 decimals.
    pub confidence_interval: f64,
    /// Set only when the difference is significant.
    pub winner: Option<Winner>,
}

impl SignificanceReport {
    /// The "not enough data" report: no winner, nothing significant.
    #[must_use]
    pub const fn insufficient_data() -> Self {
        Self {
            z_score: 0.0,
            p_value: 1.0,
            is_significant: false,
            confidence_interval: 0.0,
            winner: None,
        }
    }
}

/// Standard normal CDF via the Abramowitz-Stegun rational approximation
/// (formula 7.1.26, error < 7.5e-8).
///
/// The constants must not be swapped for a different approximation —
/// downstream consumers compare against historically computed p-values.
#[must_use]
pub fn normal_cdf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs() / std::f64::consts::SQRT_2;

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    0.5 * (1.0 + sign * y)
}

/// Two-proportion z-test on success rate.
///
/// Returns the "not enough data" report when either arm is empty; never
/// divides by zero (`se == 0` degrades to `z = 0`). The sign convention
/// is `z > 0` when the first arm's rate is higher.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compare(a: &VariantAggregate, b: &VariantAggregate) -> SignificanceReport {
    let n1 = a.sample_size() as f64;
    let n2 = b.sample_size() as f64;
    if a.sample_size() == 0 || b.sample_size() == 0 {
        return SignificanceReport::insufficient_data();
    }

    let p1 = a.success_rate();
    let p2 = b.success_rate();

    let pooled = (p1 * n1 + p2 * n2) / (n1 + n2);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();

    // se == 0 only when the pooled rate is exactly 0 or 1
    let z = if se > 0.0 { (p1 - p2) / se } else { 0.0 };

    let p_value = 2.0 * (1.0 - normal_cdf(z.abs()));
    let is_significant = p_value < 0.05;
    let confidence_interval = round3(1.96 * se);

    let winner = if is_significant && p1 > p2 {
        Some(Winner::First)
    } else if is_significant && p2 > p1 {
        Some(Winner::Second)
    } else {
        None
    };

    SignificanceReport {
        z_score: z,
        p_value,
        is_significant,
        confidence_interval,
        winner,
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
