//! Configuration loading via `ortho-config`.

use std::fmt;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::manager::{ManagerSettings, RetryPolicy};
use crate::secret::SecretString;

/// Engine version used when the provider reports no default.
pub const DEFAULT_FALLBACK_ENGINE_VERSION: &str = "16.1";

/// Control-plane settings derived from environment variables, configuration
/// files, and CLI flags.
#[derive(Clone, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "RDB",
    discovery(
        app_name = "rdb-lifecycle",
        env_var = "RDB_CONFIG_PATH",
        config_file_name = "rdb-lifecycle.toml",
        dotfile_name = ".rdb-lifecycle.toml",
        project_file_name = "rdb-lifecycle.toml"
    )
)]
pub struct RdbConfig {
    /// API secret key sent as the authentication token. Required.
    pub secret_key: String,
    /// Region hosting the instances. Defaults to `fr-par`.
    #[ortho_config(default = "fr-par".to_owned())]
    pub region: String,
    /// Base URL of the control-plane API speaking the `rdb` JSON contract.
    /// Required; there is no default endpoint.
    pub api_url: String,
    /// Engine version used when none is requested and the provider reports
    /// no default.
    #[ortho_config(default = DEFAULT_FALLBACK_ENGINE_VERSION.to_owned())]
    pub fallback_engine_version: String,
    /// Number of status queries made while waiting for availability.
    #[ortho_config(default = 60)]
    pub poll_max_attempts: u32,
    /// Seconds between status queries.
    #[ortho_config(default = 30)]
    pub poll_interval_secs: u64,
    /// Master password for instances created by the command-line workflow.
    pub master_password: Option<String>,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl RdbConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to rdb-lifecycle.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("rdb-lifecycle")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty
    /// and [`ConfigError::Invalid`] when the API URL cannot be parsed or the
    /// polling budget is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.secret_key,
            &FieldMetadata::new("API secret key", "RDB_SECRET_KEY", "secret_key"),
        )?;
        Self::require_field(
            &self.region,
            &FieldMetadata::new("region", "RDB_REGION", "region"),
        )?;
        Self::require_field(
            &self.api_url,
            &FieldMetadata::new("API base URL", "RDB_API_URL", "api_url"),
        )?;
        Self::require_field(
            &self.fallback_engine_version,
            &FieldMetadata::new(
                "fallback engine version",
                "RDB_FALLBACK_ENGINE_VERSION",
                "fallback_engine_version",
            ),
        )?;
        self.api_base_url()?;
        if self.poll_max_attempts == 0 {
            return Err(ConfigError::Invalid(String::from(
                "poll_max_attempts must be at least 1",
            )));
        }
        Ok(())
    }

    /// Parses `api_url` into the base URL request paths are appended to.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the value is not an absolute
    /// URL that can carry path segments.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.api_url.trim())
            .map_err(|err| ConfigError::Invalid(format!("api_url is not a valid URL: {err}")))?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::Invalid(String::from(
                "api_url must be an http(s) base URL",
            )));
        }
        Ok(url)
    }

    /// Builds the immutable settings shared by every manager call.
    #[must_use]
    pub fn manager_settings(&self) -> ManagerSettings {
        ManagerSettings::new(self.region.trim(), self.fallback_engine_version.trim())
    }

    /// Builds the polling policy used while waiting for availability.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.poll_max_attempts,
            Duration::from_secs(self.poll_interval_secs),
        )
    }

    /// Returns the API secret key wrapped for redaction.
    #[must_use]
    pub fn secret_key(&self) -> SecretString {
        SecretString::from(self.secret_key.trim())
    }

    /// Returns the master password used when provisioning instances.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when no password is configured.
    pub fn master_password(&self) -> Result<SecretString, ConfigError> {
        let value = self.master_password.as_deref().unwrap_or_default();
        Self::require_field(
            value,
            &FieldMetadata::new("master password", "RDB_MASTER_PASSWORD", "master_password"),
        )?;
        Ok(SecretString::from(value))
    }
}

impl fmt::Debug for RdbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RdbConfig")
            .field("secret_key", &crate::secret::REDACTED)
            .field("region", &self.region)
            .field("api_url", &self.api_url)
            .field("fallback_engine_version", &self.fallback_engine_version)
            .field("poll_max_attempts", &self.poll_max_attempts)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field(
                "master_password",
                &self.master_password.as_ref().map(|_| crate::secret::REDACTED),
            )
            .finish()
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a field holds a value outside its accepted range.
    #[error("invalid configuration value: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}
