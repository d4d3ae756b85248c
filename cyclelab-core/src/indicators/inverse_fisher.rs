//! Inverse Fisher Transform.
//!
//! Normalizes the input against its rolling mean and population standard
//! deviation over `period` values, then squashes into (-1, 1):
//!   x = scale · (value - mean) / stddev
//!   out = (e^(2x) - 1) / (e^(2x) + 1)
//! Output is 0 before the window is full and when stddev is 0. Large
//! z-scores saturate `tanh` to exactly ±1, so the result is pulled back
//! inside the open interval.

use chrono::NaiveDateTime;

use crate::domain::Observation;
use crate::error::{check_period, IndicatorError};
use crate::indicator::Indicator;
use crate::window::RollingWindow;

pub const MIN_PERIOD: usize = 2;
pub const DEFAULT_SCALE: f64 = 4.0;

/// Largest magnitude the transform emits.
const BOUND: f64 = 1.0 - f64::EPSILON;

#[derive(Debug, Clone)]
pub struct InverseFisherTransform {
    period: usize,
    scale: f64,
    name: String,
    values: RollingWindow<f64>,
    current: Observation,
}

impl InverseFisherTransform {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Self::with_scale(period, DEFAULT_SCALE)
    }

    pub fn with_scale(period: usize, scale: f64) -> Result<Self, IndicatorError> {
        check_period("inverse_fisher", period, MIN_PERIOD)?;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(IndicatorError::invalid(
                "inverse_fisher",
                "scale",
                scale,
                "must be finite and > 0",
            ));
        }
        Ok(Self {
            period,
            scale,
            name: format!("inverse_fisher_{period}"),
            values: RollingWindow::new(period)?,
            current: Observation::default(),
        })
    }

    fn std_dev(&self, mean: f64) -> f64 {
        let n = self.values.len() as f64;
        let variance = self.values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        variance.sqrt()
    }
}

impl Indicator for InverseFisherTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn warm_up_period(&self) -> usize {
        self.period
    }

    fn update(&mut self, time: NaiveDateTime, value: f64) -> f64 {
        self.values.push(value);

        let out = if !self.values.is_full() {
            0.0
        } else {
            let mean = self.values.mean();
            let std_dev = self.std_dev(mean);
            if std_dev > 0.0 {
                // tanh(x) == (e^2x - 1) / (e^2x + 1) without overflowing for large x
                (self.scale * (value - mean) / std_dev)
                    .tanh()
                    .clamp(-BOUND, BOUND)
            } else {
                0.0
            }
        };

        self.current = Observation::new(time, out);
        out
    }

    fn current(&self) -> Observation {
        self.current
    }

    fn samples(&self) -> usize {
        self.values.samples()
    }

    fn reset(&mut self) {
        self.values.reset();
        self.current = Observation::default();
    }
}
