//! Application configuration loaded via OrthoConfig.
//!
//! Every knob has a development-friendly default so a bare `cargo run`
//! works against a local PostgreSQL and a local model server. Values layer
//! from CLI arguments, `DRIVEWISE_*` environment variables, and the
//! configuration file.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATABASE_URL: &str = "postgres://localhost/drivewise";
const DEFAULT_ASSET_DIR: &str = "./uploads";
const DEFAULT_CLASSIFIER_URL: &str = "http://127.0.0.1:9000/predict";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DB_POOL_SIZE: u32 = 10;

/// Configuration values for the backend process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DRIVEWISE")]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Directory uploaded images are stored in.
    pub asset_dir: Option<PathBuf>,
    /// File holding the token signing secret.
    pub token_secret_file: Option<PathBuf>,
    /// Identity token lifetime in hours.
    pub token_ttl_hours: Option<i64>,
    /// Image reference substituted when a submission carries no files.
    /// Unset means such submissions are rejected.
    pub placeholder_image: Option<String>,
    /// Model-serving endpoint answering prediction requests.
    pub classifier_url: Option<String>,
    /// Classifier request timeout in seconds.
    pub classifier_timeout_secs: Option<u64>,
    /// Maximum size of the database connection pool.
    pub db_pool_size: Option<u32>,
}

impl AppConfig {
    /// Bind address, defaulting to all interfaces on port 8080.
    pub fn bind_addr(&self) -> String {
        self.bind_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
    }

    /// Database URL, defaulting to a local `drivewise` database.
    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned())
    }

    /// Upload directory, defaulting to `./uploads`.
    pub fn asset_dir(&self) -> PathBuf {
        self.asset_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_DIR))
    }

    /// Token lifetime, defaulting to 24 hours.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours.unwrap_or(DEFAULT_TOKEN_TTL_HOURS))
    }

    /// Classifier endpoint, defaulting to a local model server.
    pub fn classifier_url(&self) -> String {
        self.classifier_url
            .clone()
            .unwrap_or_else(|| DEFAULT_CLASSIFIER_URL.to_owned())
    }

    /// Classifier request timeout, defaulting to ten seconds.
    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(
            self.classifier_timeout_secs
                .unwrap_or(DEFAULT_CLASSIFIER_TIMEOUT_SECS),
        )
    }

    /// Connection pool size, defaulting to ten.
    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_DB_POOL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> AppConfig {
        AppConfig {
            bind_addr: None,
            database_url: None,
            asset_dir: None,
            token_secret_file: None,
            token_ttl_hours: None,
            placeholder_image: None,
            classifier_url: None,
            classifier_timeout_secs: None,
            db_pool_size: None,
        }
    }

    #[test]
    fn accessors_fall_back_to_defaults() {
        let config = empty();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.database_url(), "postgres://localhost/drivewise");
        assert_eq!(config.asset_dir(), PathBuf::from("./uploads"));
        assert_eq!(config.token_ttl(), chrono::Duration::hours(24));
        assert_eq!(config.classifier_timeout(), Duration::from_secs(10));
        assert_eq!(config.db_pool_size(), 10);
    }

    #[test]
    fn explicit_values_win_over_defaults() {
        let config = AppConfig {
            bind_addr: Some("127.0.0.1:9999".into()),
            token_ttl_hours: Some(1),
            ..empty()
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:9999");
        assert_eq!(config.token_ttl(), chrono::Duration::hours(1));
    }
}
