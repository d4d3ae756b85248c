//! Concrete streaming indicators.
//!
//! All indicators implement the `Indicator` trait from `crate::indicator`.
//! Each owns its history windows and derives its coefficients once at
//! construction; `reset()` clears history but keeps the coefficients.
//!
//! Families:
//! - two-pole smoothers: `Decycle`, `SuperSmoother`, `HighPassFilter`
//! - FIR + two-pole: `InstantaneousTrend`, `CyberCycle`
//! - dominant-cycle estimators: `CyclePeriod`, `HomodyneCyclePeriod`,
//!   `AutocorrelogramPeriodogram`
//! - auxiliary: `InverseFisherTransform`, `LeastSquaresMovingAverage`,
//!   `WilliamsVixFix`

pub mod autocorrelogram;
pub mod cyber_cycle;
pub mod cycle_period;
pub mod decycle;
pub mod high_pass;
pub mod homodyne;
pub mod instantaneous_trend;
pub mod inverse_fisher;
pub mod lsma;
pub mod super_smoother;
pub mod williams_vix_fix;

pub use autocorrelogram::{AutocorrelogramPeriodogram, PeriodogramConfig};
pub use cyber_cycle::CyberCycle;
pub use cycle_period::{CyclePeriod, CyclePeriodConfig};
pub use decycle::Decycle;
pub use high_pass::HighPassFilter;
pub use homodyne::{HomodyneConfig, HomodyneCyclePeriod};
pub use instantaneous_trend::InstantaneousTrend;
pub use inverse_fisher::InverseFisherTransform;
pub use lsma::LeastSquaresMovingAverage;
pub use super_smoother::SuperSmoother;
pub use williams_vix_fix::WilliamsVixFix;

use std::f64::consts::PI;

/// Single-pole alpha shared by Decycle and HighPassFilter:
/// `(cos(2π/P) + sin(2π/P) - 1) / cos(2π/P)`.
pub(crate) fn decycle_alpha(period: usize) -> f64 {
    let omega = 2.0 * PI / period as f64;
    (omega.cos() + omega.sin() - 1.0) / omega.cos()
}

/// EMA-style alpha `2 / (P + 1)`.
pub(crate) fn ema_alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Timestamp `i` days after 2024-01-02, for tests.
#[cfg(test)]
pub fn t(i: usize) -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(i as i64)
}

/// `10·sin(2π·i/20) + 15` rounded to two decimals, 20 points.
#[cfg(test)]
pub const SINE_20: [f64; 20] = [
    15.0, 18.09, 20.88, 23.09, 24.51, 25.0, 24.51, 23.09, 20.88, 18.09, 15.0, 11.91, 9.12, 6.91,
    5.49, 5.0, 5.49, 6.91, 9.12, 11.91,
];

/// Pure sine of the given period around 100, `n` points.
#[cfg(test)]
pub fn sine(period: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 10.0 * (2.0 * PI * i as f64 / period).sin())
        .collect()
}

/// Feed `values` through `indicator`, collecting outputs.
#[cfg(test)]
pub fn run(indicator: &mut dyn crate::indicator::Indicator, values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| indicator.update(t(i), v))
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Fixtures are published rounded to four decimals.
#[cfg(test)]
pub const FIXTURE_EPSILON: f64 = 1e-4;
