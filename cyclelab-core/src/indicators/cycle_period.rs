//! Cycle Period — dominant cycle length from the phase rate of the Cyber Cycle.
//!
//! Per update:
//! 1. smooth = (x + 2x[1] + 2x[2] + x[3]) / 6; the fourth tap is the value
//!    evicted from the 3-slot price window, raw input until it exists.
//! 2. cycle: (x - 2x[1] + x[2]) / 4 during warm-up, then the two-pole
//!    recurrence over smooth.
//! 3. quadrature Q1 = (.0962c + .5769c[2] - .5769c[4] - .0962c[6]) · (.5 + .08·inst[1]),
//!    in-phase I1 = c[3].
//! 4. phase delta between successive (I1, Q1) pairs, clamped to the band.
//! 5. median of the last `median_length` deltas.
//! 6. dc = 2π / median + 0.5, or `fallback_period` when the median is 0.
//! 7. two cascaded EMAs: instantaneous period, then period (the output).
//!
//! Zero quadrature or a zero ratio denominator carries the previous phase
//! delta forward. The clamp is applied on every bar, and `min_delta_phase`
//! must be positive, so the median never reaches 0 in practice: the
//! `fallback_period` branch of step 6 is a guard only.

use std::f64::consts::PI;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::Observation;
use crate::error::{check_lookback, check_period, check_unit_weight, IndicatorError};
use crate::indicator::Indicator;
use crate::window::RollingWindow;

/// Deepest cycle tap read by the quadrature filter is c[6].
pub const MIN_PERIOD: usize = 7;

/// Tuning constants, defaulting to the published values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CyclePeriodConfig {
    /// Cycle filter alpha.
    pub alpha: f64,
    /// Weight of the new dominant-cycle estimate in the instantaneous-period EMA.
    pub instantaneous_weight: f64,
    /// Weight of the instantaneous period in the output EMA.
    pub period_weight: f64,
    pub median_length: usize,
    pub min_delta_phase: f64,
    pub max_delta_phase: f64,
    /// Dominant cycle used when the median phase delta is zero.
    pub fallback_period: f64,
}

impl Default for CyclePeriodConfig {
    fn default() -> Self {
        Self {
            alpha: 0.07,
            instantaneous_weight: 0.33,
            period_weight: 0.15,
            median_length: 5,
            min_delta_phase: 0.1,
            max_delta_phase: 1.1,
            fallback_period: 15.0,
        }
    }
}

impl CyclePeriodConfig {
    fn validate(&self) -> Result<(), IndicatorError> {
        check_unit_weight("cycle_period", "alpha", self.alpha)?;
        check_unit_weight("cycle_period", "instantaneous_weight", self.instantaneous_weight)?;
        check_unit_weight("cycle_period", "period_weight", self.period_weight)?;
        check_lookback("cycle_period", "median_length", self.median_length, 1)?;
        if !(self.min_delta_phase > 0.0 && self.min_delta_phase <= self.max_delta_phase) {
            return Err(IndicatorError::invalid(
                "cycle_period",
                "min_delta_phase",
                self.min_delta_phase,
                format!("must be in (0, max_delta_phase = {}]", self.max_delta_phase),
            ));
        }
        if !(self.fallback_period.is_finite() && self.fallback_period > 0.0) {
            return Err(IndicatorError::invalid(
                "cycle_period",
                "fallback_period",
                self.fallback_period,
                "must be finite and > 0",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CyclePeriod {
    period: usize,
    config: CyclePeriodConfig,
    name: String,
    prices: RollingWindow<f64>,
    smooth: RollingWindow<f64>,
    cycle: RollingWindow<f64>,
    delta_phases: RollingWindow<f64>,
    prev_q1: f64,
    prev_i1: f64,
    prev_delta_phase: f64,
    instantaneous_period: f64,
    current: Observation,
    samples: usize,
}

impl CyclePeriod {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Self::with_config(period, CyclePeriodConfig::default())
    }

    pub fn with_config(period: usize, config: CyclePeriodConfig) -> Result<Self, IndicatorError> {
        check_period("cycle_period", period, MIN_PERIOD)?;
        config.validate()?;
        Ok(Self {
            period,
            config,
            name: format!("cycle_period_{period}"),
            prices: RollingWindow::new(3)?,
            smooth: RollingWindow::new(3)?,
            cycle: RollingWindow::new(7)?,
            delta_phases: RollingWindow::new(config.median_length)?,
            prev_q1: 0.0,
            prev_i1: 0.0,
            prev_delta_phase: 0.0,
            instantaneous_period: 0.0,
            current: Observation::default(),
            samples: 0,
        })
    }

    pub fn config(&self) -> &CyclePeriodConfig {
        &self.config
    }

    /// The faster of the two cascaded period estimates.
    pub fn instantaneous_period(&self) -> f64 {
        self.instantaneous_period
    }

    fn smoothed_price(&self, value: f64) -> f64 {
        match self.prices.most_recently_removed() {
            Some(p3) if self.prices.is_full() => {
                let p = &self.prices;
                (value + 2.0 * p.value_or_zero(1) + 2.0 * p.value_or_zero(2) + p3) / 6.0
            }
            _ => value,
        }
    }

    fn cycle_value(&self, value: f64) -> f64 {
        let p = &self.prices;
        if self.smooth.len() < 3 || self.samples < self.period {
            if p.len() >= 3 {
                return (value - 2.0 * p.value_or_zero(1) + p.value_or_zero(2)) / 4.0;
            }
            return 0.0;
        }
        let a = self.config.alpha;
        let s = &self.smooth;
        let second_diff = s.value_or_zero(0) - 2.0 * s.value_or_zero(1) + s.value_or_zero(2);
        (1.0 - 0.5 * a).powi(2) * second_diff
            + 2.0 * (1.0 - a) * self.cycle.value_or_zero(0)
            - (1.0 - a).powi(2) * self.cycle.value_or_zero(1)
    }

    fn delta_phase(&self, q1: f64, i1: f64) -> f64 {
        let (q1p, i1p) = (self.prev_q1, self.prev_i1);
        let mut delta = self.prev_delta_phase;
        if q1 != 0.0 && q1p != 0.0 {
            let denominator = 1.0 + (i1 * i1p) / (q1 * q1p);
            let candidate = (i1 / q1 - i1p / q1p) / denominator;
            if denominator != 0.0 && candidate.is_finite() {
                delta = candidate;
            } else {
                trace!(indicator = %self.name, "degenerate phase delta, carrying previous");
            }
        }
        delta.clamp(self.config.min_delta_phase, self.config.max_delta_phase)
    }
}

impl Indicator for CyclePeriod {
    fn name(&self) -> &str {
        &self.name
    }

    fn warm_up_period(&self) -> usize {
        self.period
    }

    fn update(&mut self, time: NaiveDateTime, value: f64) -> f64 {
        self.prices.push(value);
        self.samples += 1;

        let smooth = self.smoothed_price(value);
        self.smooth.push(smooth);

        let cycle = self.cycle_value(value);
        self.cycle.push(cycle);

        let c = &self.cycle;
        let q1 = (0.0962 * c.value_or_zero(0) + 0.5769 * c.value_or_zero(2)
            - 0.5769 * c.value_or_zero(4)
            - 0.0962 * c.value_or_zero(6))
            * (0.5 + 0.08 * self.instantaneous_period);
        let i1 = c.value_or_zero(3);

        let delta = self.delta_phase(q1, i1);
        self.prev_q1 = q1;
        self.prev_i1 = i1;
        self.prev_delta_phase = delta;
        self.delta_phases.push(delta);

        let median = self.delta_phases.median();
        let dominant_cycle = if median == 0.0 {
            self.config.fallback_period
        } else {
            2.0 * PI / median + 0.5
        };

        let w = self.config.instantaneous_weight;
        self.instantaneous_period = w * dominant_cycle + (1.0 - w) * self.instantaneous_period;
        let w = self.config.period_weight;
        let out = w * self.instantaneous_period + (1.0 - w) * self.current.value;

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
        self.delta_phases.reset();
        self.prev_q1 = 0.0;
        self.prev_i1 = 0.0;
        self.prev_delta_phase = 0.0;
        self.instantaneous_period = 0.0;
        self.samples = 0;
        self.current = Observation::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{run, sine, t};

    #[test]
    fn tracks_period_of_pure_sine() {
        for period in [12.0, 20.0, 30.0] {
            let mut cp = CyclePeriod::new(7).unwrap();
            let out = run(&mut cp, &sine(period, 300));
            let last = *out.last().unwrap();
            assert!(
                (last - period).abs() < 0.1 * period,
                "period {period}: estimate {last}"
            );
        }
    }

    #[test]
    fn output_stays_within_clamp_band() {
        // delta phase in [0.1, 1.1] bounds dc to [2π/1.1 + .5, 2π/0.1 + .5],
        // and both EMAs start at 0, so output never exceeds the upper bound.
        let upper = 2.0 * PI / 0.1 + 0.5;
        let mut cp = CyclePeriod::new(7).unwrap();
        for i in 0..500 {
            let v = 100.0 + ((i * 7919) % 113) as f64 * 0.37;
            let out = cp.update(t(i), v);
            assert!((0.0..=upper).contains(&out), "out of band: {out}");
        }
    }

    #[test]
    fn flat_input_uses_lower_delta_clamp() {
        // Constant input: Q1 is always 0, the carried delta (0) is clamped up
        // to 0.1, so dc converges to 2π/0.1 + 0.5.
        let mut cp = CyclePeriod::new(7).unwrap();
        let mut last = 0.0;
        for i in 0..400 {
            last = cp.update(t(i), 50.0);
        }
        let expected = 2.0 * PI / 0.1 + 0.5;
        assert!((last - expected).abs() < 0.5, "{last} vs {expected}");
        assert!((cp.instantaneous_period() - expected).abs() < 1e-6);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(CyclePeriod::new(6).is_err());
        let config = CyclePeriodConfig {
            median_length: 0,
            ..CyclePeriodConfig::default()
        };
        assert!(CyclePeriod::with_config(7, config).is_err());
        let config = CyclePeriodConfig {
            min_delta_phase: 2.0,
            ..CyclePeriodConfig::default()
        };
        assert!(CyclePeriod::with_config(7, config).is_err());
        for fallback_period in [f64::NAN, f64::INFINITY, 0.0] {
            let config = CyclePeriodConfig {
                fallback_period,
                ..CyclePeriodConfig::default()
            };
            assert!(CyclePeriod::with_config(7, config).is_err());
        }
        let config = CyclePeriodConfig {
            median_length: usize::MAX,
            ..CyclePeriodConfig::default()
        };
        assert!(CyclePeriod::with_config(7, config).is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: CyclePeriodConfig = toml::from_str("alpha = 0.1").unwrap();
        assert_eq!(config.alpha, 0.1);
        assert_eq!(config.median_length, 5);
        assert_eq!(config.fallback_period, 15.0);
    }

    #[test]
    fn reset_replays_identically() {
        let mut cp = CyclePeriod::new(10).unwrap();
        let data = sine(17.0, 120);
        let first = run(&mut cp, &data);
        cp.reset();
        assert_eq!(cp.instantaneous_period(), 0.0);
        assert_eq!(run(&mut cp, &data), first);
    }
}
