use crate::engine::{AssemblyPlan, ConsensusEstimator, DEFAULT_TOTAL_STATES};
use crate::event_model::LabelPolicy;
use crate::observability::{JsonLineLogger, LogLevel, DEFAULT_RETAINED_LINES};
use crate::runtime::BatchQueue;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Window length used by the reference deployment for both buffers.
pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_FEED_QUEUE_CAPACITY: usize = 256;

/// Tunables for the consensus pipeline, loaded from JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsensusConfig {
    pub state_window: usize,
    pub part_window: usize,
    pub total_states: u32,
    pub label: LabelPolicy,
    pub feed_queue_capacity: usize,
    pub log: LogConfig,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            state_window: DEFAULT_WINDOW,
            part_window: DEFAULT_WINDOW,
            total_states: DEFAULT_TOTAL_STATES,
            label: LabelPolicy::default(),
            feed_queue_capacity: DEFAULT_FEED_QUEUE_CAPACITY,
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: LogLevel,
    pub retained_lines: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            retained_lines: DEFAULT_RETAINED_LINES,
        }
    }
}

impl ConsensusConfig {
    /// Reads and validates a JSON config file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let payload = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&payload).map_err(|source| ConfigError::Parse { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a validated config from an in-memory JSON object.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_value(value).map_err(|source| ConfigError::Parse { source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.state_window == 0 {
            return Err(ConfigError::invalid("state_window must be > 0"));
        }
        if self.part_window == 0 {
            return Err(ConfigError::invalid("part_window must be > 0"));
        }
        if self.total_states == 0 {
            return Err(ConfigError::invalid("total_states must be > 0"));
        }
        if self.feed_queue_capacity == 0 {
            return Err(ConfigError::invalid("feed_queue_capacity must be > 0"));
        }
        if let LabelPolicy::Prefixed { marker } = &self.label {
            if marker.is_empty() {
                return Err(ConfigError::invalid("label marker must not be empty"));
            }
        }
        if self.log.retained_lines == 0 {
            return Err(ConfigError::invalid("log.retained_lines must be > 0"));
        }
        Ok(())
    }

    pub fn build_estimator(&self) -> Result<ConsensusEstimator, ConfigError> {
        ConsensusEstimator::new(self.state_window, self.part_window, self.label.clone())
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    pub fn plan(&self) -> AssemblyPlan {
        AssemblyPlan::new(self.total_states)
    }

    pub fn build_queue(&self) -> BatchQueue {
        BatchQueue::new(self.feed_queue_capacity)
    }

    pub fn build_logger(&self) -> Result<JsonLineLogger, ConfigError> {
        let logger = JsonLineLogger::new(self.log.retained_lines)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(logger.with_level(self.log.level))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {source}")]
    Parse { source: serde_json::Error },
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn invalid(msg: &str) -> Self {
        ConfigError::Invalid(msg.to_string())
    }
}
