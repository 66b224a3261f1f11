//! Run configuration with the stock defaults for the Italian
//! dictionary screening job.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::{validate_model_name, DEFAULT_PROMPT_TEMPLATE, WORDS_LIST_PLACEHOLDER};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("batch_size must be at least 1")]
    ZeroBatchSize,

    #[error("checkpoint_interval must be at least 1")]
    ZeroCheckpointInterval,

    #[error("Prompt template does not contain the {{words_list}} placeholder")]
    MissingWordsPlaceholder,

    #[error("Endpoint URL '{0}' must start with http:// or https://")]
    InvalidEndpoint(String),

    #[error("Invalid model name: '{0}'")]
    InvalidModelName(String),

    #[error("Temperature {0} is outside 0.0..=2.0")]
    TemperatureOutOfRange(f32),
}

/// Configuration for one screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Base URL of the Ollama endpoint (the API paths are appended).
    pub endpoint_url: String,
    /// Model asked to classify each batch.
    pub model: String,
    /// Word list to screen, one word per line.
    pub input_path: PathBuf,
    /// Words per classification request.
    pub batch_size: usize,
    /// Progress file enabling resumption after an interruption.
    pub checkpoint_path: PathBuf,
    /// Seconds to wait for a single batch response.
    pub request_timeout_secs: u64,
    /// Batches between checkpoint saves, counted since process start.
    pub checkpoint_interval: u64,
    /// Output file for words the model flagged for exclusion.
    pub excluded_path: PathBuf,
    /// Output file for words that stay in the dictionary.
    pub valid_path: PathBuf,
    /// Output file for words with no usable answer (written only if non-empty).
    pub unknown_path: PathBuf,
    /// Sampling temperature sent to the model. 0.0 = deterministic.
    pub temperature: f32,
    /// Prompt template; must contain the `{words_list}` placeholder.
    pub prompt_template: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "http://localhost:11434".to_string(),
            model: "deepseek-r1:1.5b".to_string(),
            input_path: PathBuf::from("dizionarioEsteso.txt"),
            batch_size: 55,
            checkpoint_path: PathBuf::from("checkpoint.json"),
            request_timeout_secs: 120,
            checkpoint_interval: 100,
            excluded_path: PathBuf::from("parole_da_escludere.txt"),
            valid_path: PathBuf::from("parole_valide.txt"),
            unknown_path: PathBuf::from("parole_con_errori.txt"),
            temperature: 0.0,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

impl FilterConfig {
    /// Reject configurations that cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.checkpoint_interval == 0 {
            return Err(ConfigError::ZeroCheckpointInterval);
        }
        if !self.prompt_template.contains(WORDS_LIST_PLACEHOLDER) {
            return Err(ConfigError::MissingWordsPlaceholder);
        }
        if !self.endpoint_url.starts_with("http://") && !self.endpoint_url.starts_with("https://") {
            return Err(ConfigError::InvalidEndpoint(self.endpoint_url.clone()));
        }
        validate_model_name(&self.model)
            .map_err(|_| ConfigError::InvalidModelName(self.model.clone()))?;
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::TemperatureOutOfRange(self.temperature));
        }
        Ok(())
    }
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "setaccio=info"
}
