//! Runtime configuration.
//!
//! Values come from the environment (optionally a `.env` file) and can be
//! overridden by CLI flags.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_BASE_URL: &str = "RATE_SERVICE_URL";
const ENV_TIMEOUT: &str = "RATE_SERVICE_TIMEOUT_SECS";
const ENV_LOG_FILE: &str = "LOAN_RATES_LOG_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL of the rate service, without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    /// Use the built-in offline schedule instead of the HTTP service.
    pub offline: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            offline: false,
            log_file: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in practice).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(&url)?;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                AppError::new(2, format!("Invalid {ENV_TIMEOUT} '{raw}': {e}"))
            })?;
            if secs == 0 {
                return Err(AppError::new(2, format!("{ENV_TIMEOUT} must be > 0.")));
            }
            config.timeout = Duration::from_secs(secs);
        }

        config.log_file = lookup(ENV_LOG_FILE)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    pub fn with_base_url(mut self, url: &str) -> Result<Self, AppError> {
        let trimmed = url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(AppError::new(2, "Rate service URL must not be empty."));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    pub fn calculate_rates_url(&self) -> String {
        format!("{}/api/calculate-rates", self.base_url)
    }
}
