//! Application settings loaded from config.toml
//!
//! Every key is optional; missing keys fall back to the defaults below.
//! `DATABASE_URL` in the environment (or `.env`) overrides the file.

use crate::errors::{Error, Result};
use crate::models::DEFAULT_CATEGORY;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Default on-disk database, created on first run
pub const DEFAULT_DATABASE_URL: &str = "sqlite://budget_keeper.sqlite?mode=rwc";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// SeaORM connection URL
    pub database_url: String,
    /// Category given to expenses recorded without one
    pub default_category: String,
    /// Number of expenses shown by the recent-expenses feed
    pub recent_expenses_limit: u64,
    /// Number of categories in the "top categories" statistic
    pub top_categories: usize,
    /// Buffered change events per subscriber before it lags
    pub change_feed_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            default_category: DEFAULT_CATEGORY.to_string(),
            recent_expenses_limit: 10,
            top_categories: 5,
            change_feed_capacity: 64,
        }
    }
}

impl AppConfig {
    /// Rejects settings the rest of the crate cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(Error::Config {
                message: "database_url cannot be empty".to_string(),
            });
        }
        if self.default_category.trim().is_empty() {
            return Err(Error::Config {
                message: "default_category cannot be empty".to_string(),
            });
        }
        if self.change_feed_capacity == 0 {
            return Err(Error::Config {
                message: "change_feed_capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Applies `DATABASE_URL` from the environment, if set.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            debug!("DATABASE_URL override found in environment");
            self.database_url = url;
        }
        self
    }
}

/// Parses configuration from a TOML string.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value fails validation
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Loads `./config.toml` when present (defaults otherwise) and applies
/// environment overrides.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = Path::new("config.toml");
    let config = if path.exists() {
        info!("Loading configuration from {}", path.display());
        load_config(path)?
    } else {
        info!("No config.toml found, using defaults");
        AppConfig::default()
    };

    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}
