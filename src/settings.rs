//! Layered runtime settings.
//!
//! Settings come from an optional TOML file with `SEAWALL_*` environment
//! variables layered on top (environment wins). Every field has a default,
//! so an empty environment and no file is a valid configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::batch::BatchOptions;
use crate::error::Result;
use crate::transport::TransportConfig;

/// Prefix for environment overrides, e.g. `SEAWALL_BATCH__CONCURRENCY=8`.
pub const ENV_PREFIX: &str = "SEAWALL";

/// Transport section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Base URL prefixed to relative request paths.
    pub base_url: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Additional attempts after the first.
    pub max_retries: u32,
    /// Base delay in milliseconds for the gateway-error backoff.
    pub base_backoff_ms: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: 30,
            max_retries: 2,
            base_backoff_ms: 500,
        }
    }
}

impl TransportSettings {
    /// Materialize a [`TransportConfig`] from this section.
    pub fn to_config(&self) -> TransportConfig {
        TransportConfig::new(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_retries(self.max_retries)
            .with_base_backoff(Duration::from_millis(self.base_backoff_ms))
    }
}

/// Batch section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Concurrency cap for batch runs.
    pub concurrency: usize,
    /// Retries per item after the first attempt.
    pub retry_limit: u32,
    /// Base retry delay in milliseconds.
    pub retry_delay_ms: u64,
    /// Double the delay on every retry of an item.
    pub exponential_backoff: bool,
    /// Keep launching items after a permanent failure.
    pub continue_on_error: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            concurrency: 3,
            retry_limit: 2,
            retry_delay_ms: 500,
            exponential_backoff: true,
            continue_on_error: true,
        }
    }
}

impl BatchSettings {
    /// Materialize [`BatchOptions`] from this section.
    pub fn to_options(&self) -> BatchOptions {
        BatchOptions::new()
            .with_concurrency(self.concurrency)
            .with_retry_limit(self.retry_limit)
            .with_retry_delay(Duration::from_millis(self.retry_delay_ms))
            .with_exponential_backoff(self.exponential_backoff)
            .with_continue_on_error(self.continue_on_error)
    }
}

/// Budget section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BudgetSettings {
    /// Serialized-character budget applied to tool responses.
    pub response_budget_chars: usize,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            response_budget_chars: 25_000,
        }
    }
}

/// Complete runtime settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub transport: TransportSettings,
    pub batch: BatchSettings,
    pub budget: BudgetSettings,
}

impl Settings {
    /// Load settings from `path` (when given) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
