//! Decycler.
//!
//! Removes cycles shorter than `period` with a single-pole IIR:
//!   alpha = (cos(2π/P) + sin(2π/P) - 1) / cos(2π/P)
//!   out[t] = alpha/2 * (x[t] + x[t-1]) + (1 - alpha) * out[t-1]
//! Seed: the first two outputs are the raw input.
//! Warm-up: the period given at construction.
//!
//! `reconfigure` switches the period on a live instance (the adaptive mode):
//! alpha is recomputed, accumulated history and the warm-up are kept.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::Observation;
use crate::error::{check_period, IndicatorError};
use crate::indicator::Indicator;
use crate::window::RollingWindow;

use super::decycle_alpha;

pub const MIN_PERIOD: usize = 3;

#[derive(Debug, Clone)]
pub struct Decycle {
    period: usize,
    warm_up: usize,
    alpha: f64,
    name: String,
    prices: RollingWindow<f64>,
    current: Observation,
    samples: usize,
}

impl Decycle {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("decycle", period, MIN_PERIOD)?;
        Ok(Self {
            period,
            warm_up: period,
            alpha: decycle_alpha(period),
            name: format!("decycle_{period}"),
            prices: RollingWindow::new(2)?,
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

    /// Change the cutoff period without clearing history.
    ///
    /// Unlike `reset`, the next update continues the recursion from the last
    /// output, only with the new coefficient. The warm-up stays at the
    /// construction period, so readiness is unaffected.
    pub fn reconfigure(&mut self, period: usize) -> Result<(), IndicatorError> {
        check_period("decycle", period, MIN_PERIOD)?;
        debug!(from = self.period, to = period, "decycle reconfigured");
        self.period = period;
        self.alpha = decycle_alpha(period);
        self.name = format!("decycle_{period}");
        Ok(())
    }
}

impl Indicator for Decycle {
    fn name(&self) -> &str {
        &self.name
    }

    fn warm_up_period(&self) -> usize {
        self.warm_up
    }

    fn update(&mut self, time: NaiveDateTime, value: f64) -> f64 {
        self.prices.push(value);
        self.samples += 1;

        let out = if self.samples < 3 {
            value
        } else {
            let prev_price = self.prices.value_or_zero(1);
            self.alpha / 2.0 * (value + prev_price) + (1.0 - self.alpha) * self.current.value
        };

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
        self.samples = 0;
        self.current = Observation::default();
    }
}
