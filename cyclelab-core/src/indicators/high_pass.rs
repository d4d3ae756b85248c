//! Two-pole high-pass filter.
//!
//! Passes cycles shorter than `period`, removes trend:
//!   alpha = (cos(2π/P) + sin(2π/P) - 1) / cos(2π/P)
//!   hp[t] = (1 - alpha/2)² (x[t] - 2x[t-1] + x[t-2])
//!           + 2(1 - alpha) hp[t-1] - (1 - alpha)² hp[t-2]
//! Seed: 0 for the first three observations.
//! Warm-up: period.

use chrono::NaiveDateTime;

use crate::domain::Observation;
use crate::error::{check_period, IndicatorError};
use crate::indicator::Indicator;
use crate::window::RollingWindow;

use super::decycle_alpha;

pub const MIN_PERIOD: usize = 3;

/// Observations with a zero output before the recurrence engages.
const SEED_BARS: usize = 3;

#[derive(Debug, Clone)]
pub struct HighPassFilter {
    period: usize,
    /// (1 - alpha/2)², applied to the second difference of the input.
    c1: f64,
    /// 2(1 - alpha)
    c2: f64,
    /// -(1 - alpha)²
    c3: f64,
    name: String,
    prices: RollingWindow<f64>,
    outputs: RollingWindow<f64>,
    current: Observation,
    samples: usize,
}

impl HighPassFilter {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("high_pass", period, MIN_PERIOD)?;
        let alpha = decycle_alpha(period);
        Ok(Self {
            period,
            c1: (1.0 - alpha / 2.0).powi(2),
            c2: 2.0 * (1.0 - alpha),
            c3: -(1.0 - alpha).powi(2),
            name: format!("high_pass_{period}"),
            prices: RollingWindow::new(3)?,
            outputs: RollingWindow::new(2)?,
            current: Observation::default(),
            samples: 0,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for HighPassFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn warm_up_period(&self) -> usize {
        self.period
    }

    fn update(&mut self, time: NaiveDateTime, value: f64) -> f64 {
        self.prices.push(value);
        self.samples += 1;

        let out = if self.samples <= SEED_BARS {
            0.0
        } else {
            let p = &self.prices;
            let second_diff = value - 2.0 * p.value_or_zero(1) + p.value_or_zero(2);
            self.c1 * second_diff
                + self.c2 * self.outputs.value_or_zero(0)
                + self.c3 * self.outputs.value_or_zero(1)
        };

        self.outputs.push(out);
        self.current = Observation::new(time, out);
        out
    }

    fn current(&self) -> Observation {
        self.current
    }

    fn samples(&self) -> usize {
        self.samples
    }

    fn reset(&mut self) {
        self.prices.reset();
        self.outputs.reset();
        self.samples = 0;
        self.current = Observation::default();
    }
}
