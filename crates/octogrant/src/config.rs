//! Server configuration.
//!
//! Configuration is plain data: deserialize it from TOML (or any serde
//! format), tweak it with the `with_*` builders, then call
//! [`ServerConfig::validate`] before handing it to the server.

use serde::{Deserialize, Serialize};

use crate::types::NO_EXPIRATION;

/// Top-level configuration for the grant server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Access token lifetime in seconds, used when a grant does not set one.
    pub default_access_token_expires: i64,

    /// Refresh token lifetime in seconds.
    pub default_refresh_token_expires: i64,

    /// Whether refresh tokens may be issued at all.
    ///
    /// Registering a grant that consumes refresh tokens turns this on.
    pub allow_refresh: bool,

    /// Background session persistence.
    pub persistence: PersistenceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_access_token_expires: 3600,    // 1 hour
            default_refresh_token_expires: 604800, // 7 days
            allow_refresh: false,
            persistence: PersistenceConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Sets the default access token lifetime.
    #[must_use]
    pub fn with_access_token_expires(mut self, seconds: i64) -> Self {
        self.default_access_token_expires = seconds;
        self
    }

    /// Sets the default refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_expires(mut self, seconds: i64) -> Self {
        self.default_refresh_token_expires = seconds;
        self
    }

    /// Enables or disables refresh token issuance.
    #[must_use]
    pub fn with_allow_refresh(mut self, allow: bool) -> Self {
        self.allow_refresh = allow;
        self
    }

    /// Replaces the persistence settings.
    #[must_use]
    pub fn with_persistence(mut self, persistence: PersistenceConfig) -> Self {
        self.persistence = persistence;
        self
    }

    /// Parses configuration from a TOML document.
    ///
    /// Missing keys take their default values. The result is validated.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and
    /// `ConfigError::InvalidValue` if validation fails.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - a token lifetime is neither positive nor `NO_EXPIRATION`
    /// - the persistence event capacity is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_lifetime(
            "default_access_token_expires",
            self.default_access_token_expires,
        )?;
        validate_lifetime(
            "default_refresh_token_expires",
            self.default_refresh_token_expires,
        )?;

        if self.persistence.event_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "persistence.event_capacity must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_lifetime(name: &str, seconds: i64) -> Result<(), ConfigError> {
    if seconds > 0 || seconds == NO_EXPIRATION {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "{} must be > 0 or {} (no expiration), got {}",
            name, NO_EXPIRATION, seconds
        )))
    }
}

/// Background persistence settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Attempts per save before the failure is reported.
    pub max_retry_attempts: u32,

    /// Delay before the first retry; doubles on each further attempt.
    pub retry_backoff_ms: u64,

    /// Buffered persistence events per subscriber.
    pub event_capacity: usize,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            max_retry_attempts: 3,
            retry_backoff_ms: 100,
            event_capacity: 64,
        }
    }
}

impl PersistenceConfig {
    /// Short backoff for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            max_retry_attempts: 3,
            retry_backoff_ms: 1,
            event_capacity: 64,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A value is out of range or malformed.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// The configuration document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}
