//! API server configuration.
//!
//! Layered with the `config` crate, later sources overriding earlier ones:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Built-in defaults          (this file)                              │
//! │  2. ./coupon-api.toml          (optional)                               │
//! │  3. COUPON_* environment       (COUPON_HTTP_PORT=8080, ...)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

/// Minimum accepted length of the token signing secret, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 16;

/// Coupon API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Interface to bind
    pub bind_addr: String,

    /// SQLite database file
    pub database_path: String,

    /// Secret for signing admin tokens
    pub jwt_secret: String,

    /// Token lifetime in seconds (default: 7 days)
    pub jwt_lifetime_secs: i64,

    /// Upper bound on pooled SQLite connections
    pub db_max_connections: u32,

    /// Origin allowed to call the API from a browser
    pub cors_origin: String,
}

impl ApiConfig {
    /// Loads defaults, then `coupon-api.toml` if present, then `COUPON_*`
    /// environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Self::defaults()?
            .add_source(File::with_name("coupon-api").required(false))
            .add_source(Environment::with_prefix("COUPON").try_parsing(true));

        Self::build(builder)
    }

    /// Built-in defaults, suitable for local development.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("http_port", 5000_i64)?
            .set_default("bind_addr", "0.0.0.0")?
            .set_default("database_path", "./coupons.db")?
            // In production this MUST be overridden
            .set_default("jwt_secret", "coupon-dev-secret-change-in-production")?
            .set_default("jwt_lifetime_secs", 604_800_i64)?
            .set_default("db_max_connections", 5_i64)?
            .set_default("cors_origin", "http://localhost:3000")?)
    }

    /// Materializes a builder and validates the result.
    pub fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: ApiConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("jwt_secret".to_string()));
        }
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::InvalidValue(format!(
                "jwt_secret must be at least {} bytes",
                MIN_JWT_SECRET_LEN
            )));
        }
        if self.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt_lifetime_secs must be positive".to_string(),
            ));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "db_max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// `bind_addr:http_port`, ready for `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.http_port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::build(ApiConfig::defaults().unwrap()).unwrap();

        assert_eq!(config.http_port, 5000);
        assert_eq!(config.jwt_lifetime_secs, 7 * 24 * 60 * 60);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.listen_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn test_override_wins_over_default() {
        let builder = ApiConfig::defaults()
            .unwrap()
            .set_override("http_port", 8080_i64)
            .unwrap();

        let config = ApiConfig::build(builder).unwrap();
        assert_eq!(config.http_port, 8080);
    }

    #[test]
    fn test_short_secret_rejected() {
        let builder = ApiConfig::defaults()
            .unwrap()
            .set_override("jwt_secret", "too-short")
            .unwrap();

        assert!(matches!(
            ApiConfig::build(builder),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let builder = ApiConfig::defaults()
            .unwrap()
            .set_override("jwt_secret", "")
            .unwrap();

        assert!(matches!(
            ApiConfig::build(builder),
            Err(ConfigError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_non_positive_lifetime_rejected() {
        let builder = ApiConfig::defaults()
            .unwrap()
            .set_override("jwt_lifetime_secs", 0_i64)
            .unwrap();

        assert!(ApiConfig::build(builder).is_err());
    }
}
