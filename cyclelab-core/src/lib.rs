//! CycleLab Core — streaming cycle-analysis indicators.
//!
//! This crate contains:
//! - Domain types (observations, OHLCV bars)
//! - A fixed-capacity rolling history buffer
//! - The `Indicator` trait and the `Pipeline` combinator
//! - Ehlers-style filters and dominant-cycle estimators
//! - TOML study configuration and the indicator factory

pub mod config;
pub mod domain;
pub mod error;
pub mod factory;
pub mod indicator;
pub mod indicators;
pub mod window;

pub use config::{ConfigError, IndicatorConfig, PipelineConfig, StudyConfig};
pub use domain::{Bar, Observation};
pub use error::IndicatorError;
pub use factory::{build_pipeline, create_indicator, FactoryError, INDICATOR_TYPES};
pub use indicator::{Indicator, Pipeline};
pub use window::RollingWindow;
