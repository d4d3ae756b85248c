//! Factory system — converts `IndicatorConfig` into runtime trait objects.
//!
//! `create_indicator` maps a type name plus a flat parameter map onto a concrete
//! indicator; `build_pipeline` chains the stages of a `PipelineConfig`.
//! Parameters absent from the map fall back to the defaults below.

use tracing::debug;

use crate::config::{IndicatorConfig, PipelineConfig};
use crate::error::IndicatorError;
use crate::indicator::{Indicator, Pipeline};
use crate::indicators::inverse_fisher::DEFAULT_SCALE;
use crate::indicators::{
    ema_alpha, AutocorrelogramPeriodogram, CyberCycle, CyclePeriod, CyclePeriodConfig, Decycle,
    HighPassFilter, HomodyneConfig, HomodyneCyclePeriod, InstantaneousTrend,
    InverseFisherTransform, LeastSquaresMovingAverage, PeriodogramConfig, SuperSmoother,
    WilliamsVixFix,
};

/// Every type name `create_indicator` accepts, in display order.
pub const INDICATOR_TYPES: [&str; 11] = [
    "decycle",
    "super_smoother",
    "high_pass",
    "instantaneous_trend",
    "cyber_cycle",
    "cycle_period",
    "homodyne",
    "autocorrelogram_periodogram",
    "inverse_fisher",
    "lsma",
    "williams_vix_fix",
];

// ─── Error type ──────────────────────────────────────────────────────

/// Errors that can occur during indicator construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FactoryError {
    #[error("Unknown indicator type: {0}")]
    UnknownIndicator(String),
    #[error("{indicator_type}: parameter '{parameter}' = {value} is not a whole number >= 0")]
    NotAnInteger {
        indicator_type: String,
        parameter: String,
        value: f64,
    },
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

// ─── Helpers ─────────────────────────────────────────────────────────

/// Extract a named f64 parameter from an `IndicatorConfig`, falling back to `default`.
fn param(config: &IndicatorConfig, name: &str, default: f64) -> f64 {
    config.params.get(name).copied().unwrap_or(default)
}

/// Extract a named integer parameter, falling back to `default`.
///
/// Fractional, negative and non-finite values are rejected rather than truncated.
fn param_usize(
    config: &IndicatorConfig,
    name: &str,
    default: usize,
) -> Result<usize, FactoryError> {
    match config.params.get(name).copied() {
        None => Ok(default),
        Some(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => Ok(v as usize),
        Some(value) => Err(FactoryError::NotAnInteger {
            indicator_type: config.indicator_type.clone(),
            parameter: name.to_string(),
            value,
        }),
    }
}

// ─── Indicator factory ───────────────────────────────────────────────

/// Create an indicator from an `IndicatorConfig`.
pub fn create_indicator(config: &IndicatorConfig) -> Result<Box<dyn Indicator>, FactoryError> {
    let indicator: Box<dyn Indicator> = match config.indicator_type.as_str() {
        "decycle" => Box::new(Decycle::new(param_usize(config, "period", 10)?)?),
        "super_smoother" => Box::new(SuperSmoother::new(param_usize(config, "period", 10)?)?),
        "high_pass" => Box::new(HighPassFilter::new(param_usize(config, "period", 48)?)?),
        "instantaneous_trend" => {
            let period = param_usize(config, "period", 20)?;
            let alpha = param(config, "alpha", ema_alpha(period));
            Box::new(InstantaneousTrend::with_alpha(period, alpha)?)
        }
        "cyber_cycle" => {
            let period = param_usize(config, "period", 20)?;
            let alpha = param(config, "alpha", ema_alpha(period));
            Box::new(CyberCycle::with_alpha(period, alpha)?)
        }
        "cycle_period" => {
            let d = CyclePeriodConfig::default();
            let tuning = CyclePeriodConfig {
                alpha: param(config, "alpha", d.alpha),
                instantaneous_weight: param(
                    config,
                    "instantaneous_weight",
                    d.instantaneous_weight,
                ),
                period_weight: param(config, "period_weight", d.period_weight),
                median_length: param_usize(config, "median_length", d.median_length)?,
                min_delta_phase: param(config, "min_delta_phase", d.min_delta_phase),
                max_delta_phase: param(config, "max_delta_phase", d.max_delta_phase),
                fallback_period: param(config, "fallback_period", d.fallback_period),
            };
            let period = param_usize(config, "period", 7)?;
            Box::new(CyclePeriod::with_config(period, tuning)?)
        }
        "homodyne" => {
            let d = HomodyneConfig::default();
            let tuning = HomodyneConfig {
                phasor_bars: param_usize(config, "phasor_bars", d.phasor_bars)?,
                min_change: param(config, "min_change", d.min_change),
                max_change: param(config, "max_change", d.max_change),
                min_period: param(config, "min_period", d.min_period),
                max_period: param(config, "max_period", d.max_period),
                smoothing: param(config, "smoothing", d.smoothing),
            };
            let period = param_usize(config, "period", 7)?;
            Box::new(HomodyneCyclePeriod::with_config(period, tuning)?)
        }
        "autocorrelogram_periodogram" => {
            let d = PeriodogramConfig::default();
            let tuning = PeriodogramConfig {
                short_period: param_usize(config, "short_period", d.short_period)?,
                long_period: param_usize(config, "long_period", d.long_period)?,
                correlation_width: param_usize(
                    config,
                    "correlation_width",
                    d.correlation_width,
                )?,
                spectrum_smoothing: param(config, "spectrum_smoothing", d.spectrum_smoothing),
                max_power_decay: param(config, "max_power_decay", d.max_power_decay),
            };
            Box::new(AutocorrelogramPeriodogram::with_config(tuning)?)
        }
        "inverse_fisher" => {
            let period = param_usize(config, "period", 10)?;
            let scale = param(config, "scale", DEFAULT_SCALE);
            Box::new(InverseFisherTransform::with_scale(period, scale)?)
        }
        "lsma" => {
            let period = param_usize(config, "period", 25)?;
            Box::new(LeastSquaresMovingAverage::new(period)?)
        }
        "williams_vix_fix" => {
            let period = param_usize(config, "period", 22)?;
            Box::new(WilliamsVixFix::new(period)?)
        }
        other => return Err(FactoryError::UnknownIndicator(other.to_string())),
    };
    debug!(
        indicator_type = %config.indicator_type,
        name = indicator.name(),
        warm_up = indicator.warm_up_period(),
        "created indicator"
    );
    Ok(indicator)
}

/// Build every stage of `config` and chain them into a `Pipeline`.
pub fn build_pipeline(config: &PipelineConfig) -> Result<Pipeline, FactoryError> {
    let stages = config
        .stages
        .iter()
        .map(create_indicator)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Pipeline::new(config.name.clone(), stages)?)
}
