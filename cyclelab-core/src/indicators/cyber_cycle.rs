//! Cyber Cycle.
//!
//! Isolates the cycle component of a series:
//!   smooth[t] = (x[t] + 2x[t-1] + 2x[t-2] + x[t-3]) / 6
//!   cycle[t]  = (1 - a/2)² (smooth[t] - 2smooth[t-1] + smooth[t-2])
//!               + 2(1 - a) cycle[t-1] - (1 - a)² cycle[t-2]
//! with a = 2/(P + 1) unless given explicitly.
//! Warm-up (first `period` observations): cycle = (x[t] - 2x[t-1] + x[t-2]) / 4,
//! 0 while fewer than three inputs exist.

use chrono::NaiveDateTime;

use crate::domain::Observation;
use crate::error::{check_period, check_unit_weight, IndicatorError};
use crate::indicator::Indicator;
use crate::window::RollingWindow;

use super::ema_alpha;

pub const MIN_PERIOD: usize = 4;

#[derive(Debug, Clone)]
pub struct CyberCycle {
    period: usize,
    alpha: f64,
    name: String,
    prices: RollingWindow<f64>,
    smooth: RollingWindow<f64>,
    cycle: RollingWindow<f64>,
    current: Observation,
    samples: usize,
}

impl CyberCycle {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Self::with_alpha(period, ema_alpha(period))
    }

    pub fn with_alpha(period: usize, alpha: f64) -> Result<Self, IndicatorError> {
        check_period("cyber_cycle", period, MIN_PERIOD)?;
        check_unit_weight("cyber_cycle", "alpha", alpha)?;
        Ok(Self {
            period,
            alpha,
            name: format!("cyber_cycle_{period}"),
            prices: RollingWindow::new(4)?,
            smooth: RollingWindow::new(3)?,
            cycle: RollingWindow::new(2)?,
            current: Observation::default(),
            samples: 0,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Indicator for CyberCycle {
    fn name(&self) -> &str {
        &self.name
    }

    fn warm_up_period(&self) -> usize {
        self.period
    }

    fn update(&mut self, time: NaiveDateTime, value: f64) -> f64 {
        self.prices.push(value);
        self.samples += 1;

        let p = &self.prices;
        let smooth = if p.is_full() {
            (value + 2.0 * p.value_or_zero(1) + 2.0 * p.value_or_zero(2) + p.value_or_zero(3))
                / 6.0
        } else {
            value
        };
        self.smooth.push(smooth);

        let out = if self.samples < self.period {
            if p.len() >= 3 {
                (value - 2.0 * p.value_or_zero(1) + p.value_or_zero(2)) / 4.0
            } else {
                0.0
            }
        } else {
            let a = self.alpha;
            let s = &self.smooth;
            (1.0 - 0.5 * a).powi(2)
                * (s.value_or_zero(0) - 2.0 * s.value_or_zero(1) + s.value_or_zero(2))
                + 2.0 * (1.0 - a) * self.cycle.value_or_zero(0)
                - (1.0 - a).powi(2) * self.cycle.value_or_zero(1)
        };

        self.cycle.push(out);
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
        self.smooth.reset();
        self.cycle.reset();
        self.samples = 0;
        self.current = Observation::default();
    }
}
