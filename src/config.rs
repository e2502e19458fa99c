//! Match configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes. Builder-style setters exist for tests and the CLI overrides.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::ModelLadder;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Wall-clock budget for the whole match
    pub time_limit_secs: u64,

    /// Attempts per agent tier before escalating
    pub max_attempts: u32,

    /// Sampling temperature range for each solicitation
    pub temperature_min: f32,
    pub temperature_max: f32,

    /// Pause after a transport failure
    pub retry_delay_ms: u64,

    /// Language the agent uses for game messages
    pub language: String,

    /// Escalation ladder, cheapest first
    pub models: ModelLadder,

    /// Starting tier by name; unknown or missing means the first tier
    pub initial_model: Option<String>,

    /// History bound for in-process conversations
    pub max_history: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: 30 * 60,
            max_attempts: 2,
            temperature_min: 0.70,
            temperature_max: 0.95,
            retry_delay_ms: 3000,
            language: "italiano".to_string(),
            models: ModelLadder::default(),
            initial_model: None,
            max_history: 100,
        }
    }
}

impl MatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let mut config: MatchConfig = serde_json::from_str(&text)?;
        config.models = ModelLadder::new(config.models.tiers().to_vec());
        Ok(config)
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn time_limit_secs(mut self, secs: u64) -> Self {
        self.time_limit_secs = secs;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn retry_delay_ms(mut self, ms: u64) -> Self {
        self.retry_delay_ms = ms;
        self
    }

    pub fn models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = ModelLadder::new(models.into_iter().map(Into::into).collect());
        self
    }

    pub fn initial_model(mut self, name: impl Into<String>) -> Self {
        self.initial_model = Some(name.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}
