//! Error types shared by every indicator and the history buffer.

use thiserror::Error;

/// Errors raised by indicator construction and history lookback.
///
/// Construction errors are fatal for the instance being built: the caller
/// must construct again with a valid parameter. Numeric edge cases inside
/// `update` (zero division, flat windows) are never reported through this
/// type; each indicator absorbs them with a documented fallback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("{indicator}: invalid {parameter} = {value} ({reason})")]
    InvalidParameter {
        indicator: &'static str,
        parameter: &'static str,
        value: f64,
        reason: String,
    },

    #[error("lookback index {index} out of range for window of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

impl IndicatorError {
    pub(crate) fn invalid(
        indicator: &'static str,
        parameter: &'static str,
        value: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            indicator,
            parameter,
            value,
            reason: reason.into(),
        }
    }
}

/// Longest lookback any window or period may request.
pub const MAX_LOOKBACK: usize = 1 << 20;

/// Reject `period < min` or `period > MAX_LOOKBACK` with an `InvalidParameter` error.
pub(crate) fn check_period(
    indicator: &'static str,
    period: usize,
    min: usize,
) -> Result<(), IndicatorError> {
    check_lookback(indicator, "period", period, min)
}

/// Same bounds as `check_period` for any length-like parameter.
pub(crate) fn check_lookback(
    indicator: &'static str,
    parameter: &'static str,
    value: usize,
    min: usize,
) -> Result<(), IndicatorError> {
    if value < min {
        return Err(IndicatorError::invalid(
            indicator,
            parameter,
            value as f64,
            format!("must be >= {min}"),
        ));
    }
    if value > MAX_LOOKBACK {
        return Err(IndicatorError::invalid(
            indicator,
            parameter,
            value as f64,
            format!("must be <= {MAX_LOOKBACK}"),
        ));
    }
    Ok(())
}

/// Reject weights outside the closed unit interval.
pub(crate) fn check_unit_weight(
    indicator: &'static str,
    parameter: &'static str,
    value: f64,
) -> Result<(), IndicatorError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(IndicatorError::invalid(
            indicator,
            parameter,
            value,
            "must be within [0, 1]",
        ));
    }
    Ok(())
}
