//! Study configuration — which indicator pipelines to run, loaded from TOML.
//!
//! ```toml
//! [[pipelines]]
//! name = "dominant_cycle"
//!
//! [[pipelines.stages]]
//! indicator_type = "high_pass"
//! params = { period = 48 }
//!
//! [[pipelines.stages]]
//! indicator_type = "super_smoother"
//! params = { period = 10 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::factory::{build_pipeline, FactoryError};
use crate::indicator::Pipeline;

/// Configuration of a single indicator stage.
///
/// Uses `BTreeMap` for deterministic key ordering during serialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorConfig {
    pub indicator_type: String,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

impl IndicatorConfig {
    pub fn new(indicator_type: impl Into<String>) -> Self {
        Self {
            indicator_type: indicator_type.into(),
            params: BTreeMap::new(),
        }
    }

    /// Builder-style parameter insertion.
    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }
}

/// A named chain of stages; stage n consumes stage n-1's output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    pub name: String,
    pub stages: Vec<IndicatorConfig>,
}

/// Every pipeline the driver runs over one input stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StudyConfig {
    #[serde(default)]
    pub pipelines: Vec<PipelineConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("study defines no pipelines")]
    NoPipelines,

    #[error("pipeline '{0}' has no stages")]
    EmptyPipeline(String),

    #[error("duplicate pipeline name '{0}'")]
    DuplicateName(String),

    #[error("pipeline '{pipeline}': {source}")]
    Factory {
        pipeline: String,
        #[source]
        source: FactoryError,
    },
}

impl StudyConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: StudyConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Structural checks that need no indicator construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipelines.is_empty() {
            return Err(ConfigError::NoPipelines);
        }
        let mut seen = std::collections::HashSet::new();
        for pipeline in &self.pipelines {
            if pipeline.stages.is_empty() {
                return Err(ConfigError::EmptyPipeline(pipeline.name.clone()));
            }
            if !seen.insert(pipeline.name.as_str()) {
                return Err(ConfigError::DuplicateName(pipeline.name.clone()));
            }
        }
        Ok(())
    }

    /// Construct every pipeline. Fails on the first invalid stage.
    pub fn build(&self) -> Result<Vec<Pipeline>, ConfigError> {
        self.pipelines
            .iter()
            .map(|p| {
                build_pipeline(p).map_err(|source| ConfigError::Factory {
                    pipeline: p.name.clone(),
                    source,
                })
            })
            .collect()
    }
}
