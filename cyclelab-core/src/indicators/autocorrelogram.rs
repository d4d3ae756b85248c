//! Autocorrelation periodogram — dominant cycle from a correlogram spectrum.
//!
//! Pipeline: input → HighPassFilter(long) → SuperSmoother(short) → window of
//! `long + width` filtered values. Once the window is full, every update:
//! 1. Pearson correlation of the newest `width` values against the `width`
//!    values starting at each lag 1..=long.
//! 2. For each candidate period P in short..=long, project the correlations on
//!    cos(2π·lag/P) and sin(2π·lag/P); power = cos² + sin².
//! 3. Smooth each power bin across updates, track a decaying running maximum,
//!    normalize by it and square.
//! 4. Output the power-weighted mean of the candidate periods.
//!
//! Output is 0 until ready. If the normalized power sums to zero (flat input)
//! the previous dominant cycle is kept.

use std::f64::consts::PI;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::Observation;
use crate::error::{check_lookback, check_unit_weight, IndicatorError};
use crate::indicator::Indicator;
use crate::window::RollingWindow;

use super::{HighPassFilter, SuperSmoother};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodogramConfig {
    /// Shortest candidate period; also the Super Smoother period.
    pub short_period: usize,
    /// Longest candidate period and lag; also the high-pass period.
    pub long_period: usize,
    /// Number of samples in each correlated segment.
    pub correlation_width: usize,
    /// Weight of the new power value in the per-bin EMA.
    pub spectrum_smoothing: f64,
    /// Per-bar decay of the running maximum power.
    pub max_power_decay: f64,
}

impl Default for PeriodogramConfig {
    fn default() -> Self {
        Self {
            short_period: 10,
            long_period: 48,
            correlation_width: 3,
            spectrum_smoothing: 0.8,
            max_power_decay: 0.9995,
        }
    }
}

impl PeriodogramConfig {
    fn validate(&self) -> Result<(), IndicatorError> {
        const NAME: &str = "autocorrelogram_periodogram";
        if self.short_period < super::super_smoother::MIN_PERIOD {
            return Err(IndicatorError::invalid(
                NAME,
                "short_period",
                self.short_period as f64,
                format!("must be >= {}", super::super_smoother::MIN_PERIOD),
            ));
        }
        if self.long_period <= self.short_period {
            return Err(IndicatorError::invalid(
                NAME,
                "long_period",
                self.long_period as f64,
                format!("must be > short_period = {}", self.short_period),
            ));
        }
        check_lookback(NAME, "long_period", self.long_period, self.short_period + 1)?;
        check_lookback(NAME, "correlation_width", self.correlation_width, 2)?;
        check_unit_weight(NAME, "spectrum_smoothing", self.spectrum_smoothing)?;
        check_unit_weight(NAME, "max_power_decay", self.max_power_decay)?;
        Ok(())
    }
}

/// Pearson correlation of `x` and `y`; 0 when either has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len()) as f64;
    let (mut sx, mut sy, mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        sx += a;
        sy += b;
        sxx += a * a;
        syy += b * b;
        sxy += a * b;
    }
    let denominator = (n * sxx - sx * sx) * (n * syy - sy * sy);
    if denominator <= 0.0 {
        return 0.0;
    }
    (n * sxy - sx * sy) / denominator.sqrt()
}

#[derive(Debug, Clone)]
pub struct AutocorrelogramPeriodogram {
    config: PeriodogramConfig,
    name: String,
    high_pass: HighPassFilter,
    smoother: SuperSmoother,
    filtered: RollingWindow<f64>,
    /// Correlation by lag; index 0 unused.
    correlations: Vec<f64>,
    /// Smoothed power per candidate period, index 0 = short_period.
    power: Vec<f64>,
    max_power: f64,
    /// Scratch buffer for the window contents, newest first.
    scratch: Vec<f64>,
    current: Observation,
    samples: usize,
}

impl AutocorrelogramPeriodogram {
    pub fn new(short_period: usize, long_period: usize) -> Result<Self, IndicatorError> {
        Self::with_config(PeriodogramConfig {
            short_period,
            long_period,
            ..PeriodogramConfig::default()
        })
    }

    pub fn with_config(config: PeriodogramConfig) -> Result<Self, IndicatorError> {
        config.validate()?;
        let depth = config
            .long_period
            .checked_add(config.correlation_width)
            .ok_or_else(|| {
                IndicatorError::invalid(
                    "autocorrelogram_periodogram",
                    "correlation_width",
                    config.correlation_width as f64,
                    "long_period + correlation_width overflows",
                )
            })?;
        Ok(Self {
            config,
            name: format!(
                "autocorrelogram_{}_{}_{}",
                config.short_period, config.long_period, config.correlation_width
            ),
            high_pass: HighPassFilter::new(config.long_period)?,
            smoother: SuperSmoother::new(config.short_period)?,
            filtered: RollingWindow::new(depth)?,
            correlations: vec![0.0; config.long_period + 1],
            power: vec![0.0; config.long_period - config.short_period + 1],
            max_power: 0.0,
            scratch: Vec::with_capacity(depth),
            current: Observation::default(),
            samples: 0,
        })
    }

    pub fn config(&self) -> &PeriodogramConfig {
        &self.config
    }

    /// Correlation at each lag from the latest update; index 0 is unused.
    pub fn correlations(&self) -> &[f64] {
        &self.correlations
    }

    /// Smoothed power per candidate period, starting at `short_period`.
    pub fn spectrum(&self) -> &[f64] {
        &self.power
    }

    fn update_correlations(&mut self) {
        let width = self.config.correlation_width;
        self.scratch.clear();
        self.scratch.extend(self.filtered.iter());
        let recent = &self.scratch[..width];
        for lag in 1..=self.config.long_period {
            self.correlations[lag] = pearson(recent, &self.scratch[lag..lag + width]);
        }
    }

    fn update_spectrum(&mut self) {
        let weight = self.config.spectrum_smoothing;
        let lags = self.config.long_period;
        for (bin, candidate) in (self.config.short_period..=lags).enumerate() {
            let (mut cosine, mut sine) = (0.0, 0.0);
            for lag in 1..=lags {
                let angle = 2.0 * PI * lag as f64 / candidate as f64;
                cosine += self.correlations[lag] * angle.cos();
                sine += self.correlations[lag] * angle.sin();
            }
            let raw = cosine * cosine + sine * sine;
            self.power[bin] = weight * raw + (1.0 - weight) * self.power[bin];
        }
        let peak = self.power.iter().copied().fold(0.0, f64::max);
        self.max_power = (self.max_power * self.config.max_power_decay).max(peak);
    }

    fn dominant_cycle(&self) -> Option<f64> {
        if self.max_power <= 0.0 {
            return None;
        }
        let (mut weighted, mut total) = (0.0, 0.0);
        for (bin, &power) in self.power.iter().enumerate() {
            let normalized = (power / self.max_power).powi(2);
            weighted += (self.config.short_period + bin) as f64 * normalized;
            total += normalized;
        }
        (total > 0.0).then(|| weighted / total)
    }
}

impl Indicator for AutocorrelogramPeriodogram {
    fn name(&self) -> &str {
        &self.name
    }

    fn warm_up_period(&self) -> usize {
        self.filtered.capacity()
    }

    fn update(&mut self, time: NaiveDateTime, value: f64) -> f64 {
        let high_passed = self.high_pass.update(time, value);
        let filtered = self.smoother.update(time, high_passed);
        self.filtered.push(filtered);
        self.samples += 1;

        let mut out = self.current.value;
        if self.filtered.is_full() {
            self.update_correlations();
            self.update_spectrum();
            match self.dominant_cycle() {
                Some(cycle) => out = cycle,
                None => trace!(indicator = %self.name, "empty spectrum, keeping dominant cycle"),
            }
        }

        self.current = Observation::new(time, out);
        out
    }

    fn current(&self) -> Observation {
        self.current
    }

    fn samples(&self) -> usize {
        self.samples
    }

    fn is_ready(&self) -> bool {
        self.filtered.is_full()
    }

    fn reset(&mut self) {
        self.high_pass.reset();
        self.smoother.reset();
        self.filtered.reset();
        self.correlations.iter_mut().for_each(|c| *c = 0.0);
        self.power.iter_mut().for_each(|p| *p = 0.0);
        self.max_power = 0.0;
        self.samples = 0;
        self.current = Observation::default();
    }
}
