//! Indicator trait and the `Pipeline` combinator.
//!
//! Indicators are stateful streaming transforms: one `update` per new
//! observation, in non-decreasing time order, on a single driving thread.
//! Nothing here enforces the ordering; it is the caller's contract.

use std::fmt;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::{Bar, Observation};
use crate::error::IndicatorError;

/// Trait for streaming indicators.
///
/// # Look-ahead contamination guard
/// The output produced for observation t depends only on observations up to
/// and including t. Feeding a prefix of a stream yields a prefix of the
/// outputs of the full stream.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "decycle_10", "cycle_period_7").
    fn name(&self) -> &str;

    /// Number of observations after which `is_ready()` turns true.
    fn warm_up_period(&self) -> usize;

    /// Consume one observation and return the new output value.
    fn update(&mut self, time: NaiveDateTime, value: f64) -> f64;

    /// The most recent output. Valid before readiness (seed value) and
    /// `Observation::default()` before the first update.
    fn current(&self) -> Observation;

    /// Observations processed since construction or the last reset.
    fn samples(&self) -> usize;

    /// Clear all history and counters; configured coefficients are kept.
    fn reset(&mut self);

    fn is_ready(&self) -> bool {
        self.samples() >= self.warm_up_period()
    }

    fn update_observation(&mut self, observation: Observation) -> f64 {
        self.update(observation.time, observation.value)
    }

    /// Consume a full bar. Scalar indicators read the close; indicators
    /// that need the range override this.
    fn update_bar(&mut self, bar: &Bar) -> f64 {
        self.update(bar.time, bar.close)
    }
}

/// Ordered chain of indicators: each stage consumes the previous stage's
/// output for the same timestamp.
///
/// Stages are updated strictly in order, so stage `n` always reads the value
/// stage `n - 1` produced for this observation.
pub struct Pipeline {
    name: String,
    stages: Vec<Box<dyn Indicator>>,
    current: Observation,
    samples: usize,
}

impl Pipeline {
    pub fn new(
        name: impl Into<String>,
        stages: Vec<Box<dyn Indicator>>,
    ) -> Result<Self, IndicatorError> {
        if stages.is_empty() {
            return Err(IndicatorError::invalid(
                "pipeline",
                "stages",
                0.0,
                "at least one stage is required",
            ));
        }
        let name = name.into();
        debug!(
            pipeline = %name,
            stages = ?stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            "pipeline assembled"
        );
        Ok(Self {
            name,
            stages,
            current: Observation::default(),
            samples: 0,
        })
    }

    pub fn stages(&self) -> &[Box<dyn Indicator>] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field(
                "stages",
                &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("samples", &self.samples)
            .finish()
    }
}

impl Indicator for Pipeline {
    fn name(&self) -> &str {
        &self.name
    }

    /// Every stage sees every observation, so the slowest stage decides.
    fn warm_up_period(&self) -> usize {
        self.stages
            .iter()
            .map(|s| s.warm_up_period())
            .max()
            .unwrap_or(0)
    }

    fn update(&mut self, time: NaiveDateTime, value: f64) -> f64 {
        let mut value = value;
        for stage in &mut self.stages {
            value = stage.update(time, value);
        }
        self.samples += 1;
        self.current = Observation::new(time, value);
        value
    }

    /// The head stage sees the bar; later stages see their predecessor's output.
    fn update_bar(&mut self, bar: &Bar) -> f64 {
        let mut stages = self.stages.iter_mut();
        let mut value = match stages.next() {
            Some(head) => head.update_bar(bar),
            None => bar.close,
        };
        for stage in stages {
            value = stage.update(bar.time, value);
        }
        self.samples += 1;
        self.current = Observation::new(bar.time, value);
        value
    }

    fn current(&self) -> Observation {
        self.current
    }

    fn samples(&self) -> usize {
        self.samples
    }

    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
        self.samples = 0;
        self.current = Observation::default();
        debug!(pipeline = %self.name, "pipeline reset");
    }

    /// Ready once every stage is ready.
    fn is_ready(&self) -> bool {
        self.stages.iter().all(|s| s.is_ready())
    }
}
