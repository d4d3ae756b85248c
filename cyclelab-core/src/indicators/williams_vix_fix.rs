//! Williams VIX Fix — synthetic volatility from the distance to the highest close.
//!
//!   out = (max(close, period) - low) / max(close, period) · 100
//! Computed on every bar; ready once `period` closes are held.
//! A zero highest close yields 0.

use chrono::NaiveDateTime;

use crate::domain::{Bar, Observation};
use crate::error::{check_period, IndicatorError};
use crate::indicator::Indicator;
use crate::window::RollingWindow;

pub const MIN_PERIOD: usize = 1;

#[derive(Debug, Clone)]
pub struct WilliamsVixFix {
    period: usize,
    name: String,
    closes: RollingWindow<f64>,
    current: Observation,
}

impl WilliamsVixFix {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("williams_vix_fix", period, MIN_PERIOD)?;
        Ok(Self {
            period,
            name: format!("williams_vix_fix_{period}"),
            closes: RollingWindow::new(period)?,
            current: Observation::default(),
        })
    }

    pub fn update_close_low(&mut self, time: NaiveDateTime, close: f64, low: f64) -> f64 {
        self.closes.push(close);
        let highest = self.closes.max().unwrap_or(close);
        let out = if highest != 0.0 {
            (highest - low) / highest * 100.0
        } else {
            0.0
        };
        self.current = Observation::new(time, out);
        out
    }
}

impl Indicator for WilliamsVixFix {
    fn name(&self) -> &str {
        &self.name
    }

    fn warm_up_period(&self) -> usize {
        self.period
    }

    /// Scalar streams carry no low: the value serves as both close and low.
    fn update(&mut self, time: NaiveDateTime, value: f64) -> f64 {
        self.update_close_low(time, value, value)
    }

    /// Uses the bar's close and low.
    fn update_bar(&mut self, bar: &Bar) -> f64 {
        self.update_close_low(bar.time, bar.close, bar.low)
    }

    fn current(&self) -> Observation {
        self.current
    }

    fn samples(&self) -> usize {
        self.closes.samples()
    }

    fn reset(&mut self) {
        self.closes.reset();
        self.current = Observation::default();
    }
}
