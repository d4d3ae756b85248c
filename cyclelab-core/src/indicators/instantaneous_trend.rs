//! Instantaneous Trendline.
//!
//! Steady state:
//!   it[t] = (a - a²/4) x[t] + a²/2 x[t-1] - (a - 3a²/4) x[t-2]
//!           + 2(1 - a) it[t-1] - (1 - a)² it[t-2]
//! with a = 2/(P + 1) unless given explicitly.
//!
//! Warm-up: the first two outputs are the raw input. From the third
//! observation a bar count starts; while it is <= period the output is the
//! 3-tap FIR (x[t] + 2x[t-1] + x[t-2]) / 4, which gives the recurrence two
//! meaningful prior outputs before it engages.

use chrono::NaiveDateTime;

use crate::domain::Observation;
use crate::error::{check_period, check_unit_weight, IndicatorError};
use crate::indicator::Indicator;
use crate::window::RollingWindow;

use super::ema_alpha;

pub const MIN_PERIOD: usize = 3;

#[derive(Debug, Clone)]
pub struct InstantaneousTrend {
    period: usize,
    alpha: f64,
    name: String,
    prices: RollingWindow<f64>,
    outputs: RollingWindow<f64>,
    /// Observations seen with a full 3-tap price window.
    bar_count: usize,
    current: Observation,
    samples: usize,
}

impl InstantaneousTrend {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Self::with_alpha(period, ema_alpha(period))
    }

    pub fn with_alpha(period: usize, alpha: f64) -> Result<Self, IndicatorError> {
        check_period("instantaneous_trend", period, MIN_PERIOD)?;
        check_unit_weight("instantaneous_trend", "alpha", alpha)?;
        Ok(Self {
            period,
            alpha,
            name: format!("instantaneous_trend_{period}"),
            prices: RollingWindow::new(3)?,
            outputs: RollingWindow::new(2)?,
            bar_count: 0,
            current: Observation::default(),
            samples: 0,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Indicator for InstantaneousTrend {
    fn name(&self) -> &str {
        &self.name
    }

    fn warm_up_period(&self) -> usize {
        self.period
    }

    fn update(&mut self, time: NaiveDateTime, value: f64) -> f64 {
        self.prices.push(value);
        self.samples += 1;

        let out = if !self.prices.is_full() {
            value
        } else {
            self.bar_count += 1;
            let p1 = self.prices.value_or_zero(1);
            let p2 = self.prices.value_or_zero(2);
            if self.bar_count <= self.period {
                (value + 2.0 * p1 + p2) / 4.0
            } else {
                let a = self.alpha;
                let a2 = a * a;
                (a - a2 / 4.0) * value + 0.5 * a2 * p1 - (a - 0.75 * a2) * p2
                    + 2.0 * (1.0 - a) * self.outputs.value_or_zero(0)
                    - (1.0 - a).powi(2) * self.outputs.value_or_zero(1)
            }
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
        self.bar_count = 0;
        self.samples = 0;
        self.current = Observation::default();
    }
}
