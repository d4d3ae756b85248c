//! Two-pole Super Smoother (Butterworth-style low-pass).
//!
//!   a1 = exp(-1.414π / P)
//!   c2 = 2·a1·cos(1.414π / P), c3 = -a1², c1 = 1 - c2 - c3
//!   out[t] = c1 (x[t] + x[t-1]) / 2 + c2 out[t-1] + c3 out[t-2]
//! Seed: the first two outputs are the raw input.
//! Warm-up: period.

use std::f64::consts::PI;

use chrono::NaiveDateTime;

use crate::domain::Observation;
use crate::error::{check_period, IndicatorError};
use crate::indicator::Indicator;
use crate::window::RollingWindow;

pub const MIN_PERIOD: usize = 3;

#[derive(Debug, Clone)]
pub struct SuperSmoother {
    period: usize,
    c1: f64,
    c2: f64,
    c3: f64,
    name: String,
    prices: RollingWindow<f64>,
    outputs: RollingWindow<f64>,
    current: Observation,
    samples: usize,
}

impl SuperSmoother {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("super_smoother", period, MIN_PERIOD)?;
        let arg = 1.414 * PI / period as f64;
        let a1 = (-arg).exp();
        let c2 = 2.0 * a1 * arg.cos();
        let c3 = -a1 * a1;
        Ok(Self {
            period,
            c1: 1.0 - c2 - c3,
            c2,
            c3,
            name: format!("super_smoother_{period}"),
            prices: RollingWindow::new(2)?,
            outputs: RollingWindow::new(2)?,
            current: Observation::default(),
            samples: 0,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for SuperSmoother {
    fn name(&self) -> &str {
        &self.name
    }

    fn warm_up_period(&self) -> usize {
        self.period
    }

    fn update(&mut self, time: NaiveDateTime, value: f64) -> f64 {
        self.prices.push(value);
        self.samples += 1;

        let out = if self.samples < 3 {
            value
        } else {
            self.c1 * (value + self.prices.value_or_zero(1)) / 2.0
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
