//! Application configuration parsing and validation.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::{AppError, Result};

/// Application configuration parsed from `config.toml`.
///
/// Session policy durations (warning lead, extension window) are fixed
/// policy constants owned by the session module and deliberately not
/// configurable here.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    /// Base URL of the converter backend (auth + exchange-rate endpoints).
    pub api_base_url: String,
}

impl AppConfig {
    /// Build a configuration directly from a base URL (CLI override path).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the URL fails validation.
    pub fn from_base_url(api_base_url: impl Into<String>) -> Result<Self> {
        let mut config = Self {
            api_base_url: api_base_url.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and normalize the base URL.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&mut self) -> Result<()> {
        let trimmed = self.api_base_url.trim().trim_end_matches('/');

        if trimmed.is_empty() {
            return Err(AppError::Config("api_base_url must not be empty".into()));
        }

        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(AppError::Config(format!(
                "api_base_url must start with http:// or https://, got '{trimmed}'"
            )));
        }

        self.api_base_url = trimmed.to_owned();
        Ok(())
    }
}
