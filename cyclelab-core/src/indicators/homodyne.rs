//! Homodyne discriminator cycle period.
//!
//! Per update:
//! 1. smooth = (4x + 3x[1] + 2x[2] + x[3]) / 10 (raw until four inputs exist)
//! 2. detrender = H(smooth), Q1 = H(detrender), I1 = detrender[3], where
//!    H(s) = (.0962s + .5769s[2] - .5769s[4] - .0962s[6]) · (.075·period[1] + .54)
//! 3. advance the phases by 90°: jI = H(I1), jQ = H(Q1);
//!    I2 = I1 - jQ, Q2 = Q1 + jI, each averaged over the last `phasor_bars` bars
//! 4. re = I2·I2[1] + Q2·Q2[1], im = I2·Q2[1] - Q2[1]·I2[1]
//! 5. period = 360 / atan°(im / re); kept from the previous bar when re or im is 0
//! 6. clamp to [0.67, 1.5] × previous, then to [6, 50]
//! 7. period = 0.2·period + 0.8·previous (the output)
//!
//! The imaginary part in step 4 is reproduced as the reference formula
//! states it; the textbook discriminator uses I2[1]·Q2 there.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::Observation;
use crate::error::{check_lookback, check_period, check_unit_weight, IndicatorError};
use crate::indicator::Indicator;
use crate::window::RollingWindow;

/// Deepest tap read by the Hilbert transform is s[6].
pub const MIN_PERIOD: usize = 7;

/// Tuning constants, defaulting to the published values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomodyneConfig {
    /// Bars averaged to form the phasor (I2, Q2).
    pub phasor_bars: usize,
    /// Lower bar-to-bar ratio bound on the raw period.
    pub min_change: f64,
    /// Upper bar-to-bar ratio bound on the raw period.
    pub max_change: f64,
    pub min_period: f64,
    pub max_period: f64,
    /// Weight of the clamped raw period in the output EMA.
    pub smoothing: f64,
}

impl Default for HomodyneConfig {
    fn default() -> Self {
        Self {
            phasor_bars: 3,
            min_change: 0.67,
            max_change: 1.5,
            min_period: 6.0,
            max_period: 50.0,
            smoothing: 0.2,
        }
    }
}

impl HomodyneConfig {
    fn validate(&self) -> Result<(), IndicatorError> {
        check_unit_weight("homodyne", "smoothing", self.smoothing)?;
        check_lookback("homodyne", "phasor_bars", self.phasor_bars, 1)?;
        if !(self.min_change > 0.0 && self.min_change <= 1.0 && self.max_change >= 1.0) {
            return Err(IndicatorError::invalid(
                "homodyne",
                "min_change",
                self.min_change,
                format!(
                    "require 0 < min_change <= 1 <= max_change (max_change = {})",
                    self.max_change
                ),
            ));
        }
        if !(self.min_period > 0.0 && self.min_period <= self.max_period) {
            return Err(IndicatorError::invalid(
                "homodyne",
                "min_period",
                self.min_period,
                format!("must be in (0, max_period = {}]", self.max_period),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct HomodyneCyclePeriod {
    period: usize,
    config: HomodyneConfig,
    name: String,
    prices: RollingWindow<f64>,
    smooth: RollingWindow<f64>,
    detrender: RollingWindow<f64>,
    in_phase: RollingWindow<f64>,
    quadrature: RollingWindow<f64>,
    raw_i2: RollingWindow<f64>,
    raw_q2: RollingWindow<f64>,
    /// Averaged phasor (I2, Q2), newest first.
    phasor: RollingWindow<(f64, f64)>,
    current: Observation,
    samples: usize,
}

/// Quadrature taps of the discrete Hilbert transform, scaled by the band factor.
fn hilbert(w: &RollingWindow<f64>, band: f64) -> f64 {
    (0.0962 * w.value_or_zero(0) + 0.5769 * w.value_or_zero(2)
        - 0.5769 * w.value_or_zero(4)
        - 0.0962 * w.value_or_zero(6))
        * band
}

impl HomodyneCyclePeriod {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Self::with_config(period, HomodyneConfig::default())
    }

    pub fn with_config(period: usize, config: HomodyneConfig) -> Result<Self, IndicatorError> {
        check_period("homodyne", period, MIN_PERIOD)?;
        config.validate()?;
        Ok(Self {
            period,
            config,
            name: format!("homodyne_{period}"),
            prices: RollingWindow::new(4)?,
            smooth: RollingWindow::new(7)?,
            detrender: RollingWindow::new(7)?,
            in_phase: RollingWindow::new(7)?,
            quadrature: RollingWindow::new(7)?,
            raw_i2: RollingWindow::new(config.phasor_bars)?,
            raw_q2: RollingWindow::new(config.phasor_bars)?,
            phasor: RollingWindow::new(2)?,
            current: Observation::default(),
            samples: 0,
        })
    }

    pub fn config(&self) -> &HomodyneConfig {
        &self.config
    }

    fn smoothed_price(&self, value: f64) -> f64 {
        let p = &self.prices;
        if !p.is_full() {
            return value;
        }
        (4.0 * value + 3.0 * p.value_or_zero(1) + 2.0 * p.value_or_zero(2) + p.value_or_zero(3))
            / 10.0
    }

    /// Raw period from the discriminator, before clamping.
    fn discriminator_period(&self, previous: f64) -> f64 {
        let (Some((i2, q2)), Some((i2_prev, q2_prev))) = (self.phasor.get(0), self.phasor.get(1))
        else {
            return previous;
        };
        let re = i2 * i2_prev + q2 * q2_prev;
        let im = i2 * q2_prev - q2_prev * i2_prev;
        if re == 0.0 || im == 0.0 {
            trace!(indicator = %self.name, re, im, "degenerate discriminator, keeping period");
            return previous;
        }
        let degrees = (im / re).atan().to_degrees();
        if degrees == 0.0 {
            return previous;
        }
        360.0 / degrees
    }
}

impl Indicator for HomodyneCyclePeriod {
    fn name(&self) -> &str {
        &self.name
    }

    fn warm_up_period(&self) -> usize {
        self.period
    }

    fn update(&mut self, time: NaiveDateTime, value: f64) -> f64 {
        self.prices.push(value);
        self.samples += 1;
        let previous = self.current.value;
        let band = 0.075 * previous + 0.54;

        let smooth = self.smoothed_price(value);
        self.smooth.push(smooth);

        let detrender = hilbert(&self.smooth, band);
        self.detrender.push(detrender);

        let q1 = hilbert(&self.detrender, band);
        self.quadrature.push(q1);
        let i1 = self.detrender.value_or_zero(3);
        self.in_phase.push(i1);

        let j_i = hilbert(&self.in_phase, band);
        let j_q = hilbert(&self.quadrature, band);
        self.raw_i2.push(i1 - j_q);
        self.raw_q2.push(q1 + j_i);
        self.phasor.push((self.raw_i2.mean(), self.raw_q2.mean()));

        let cfg = &self.config;
        let raw = self
            .discriminator_period(previous)
            .min(cfg.max_change * previous)
            .max(cfg.min_change * previous)
            .max(cfg.min_period)
            .min(cfg.max_period);
        let out = cfg.smoothing * raw + (1.0 - cfg.smoothing) * previous;

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
        self.detrender.reset();
        self.in_phase.reset();
        self.quadrature.reset();
        self.raw_i2.reset();
        self.raw_q2.reset();
        self.phasor.reset();
        self.samples = 0;
        self.current = Observation::default();
    }
}
