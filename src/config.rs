//! Configuration schemas.
//!
//! Deserialized with the `config` crate from an optional TOML file overlaid
//! by `TREESCAN__<SECTION>__<KEY>` environment variables.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::{ScanTimings, DEFAULT_ERROR_MESSAGE};
use crate::error::TreeScanError;
use crate::verdict::{validate_probability, DEFAULT_ERROR_PROBABILITY};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Simulation settings.
    #[serde(default)]
    pub scan: ScanConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// With `file`, that file must exist. Without it, `treescan.toml` in
    /// the working directory is used if present. Environment variables
    /// prefixed with `TREESCAN` override both.
    pub fn load(file: Option<&Path>) -> Result<Self, TreeScanError> {
        let builder = config::Config::builder();
        let builder = match file {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name("treescan").required(false)),
        };

        let config: AppConfig = builder
            .add_source(
                config::Environment::with_prefix("TREESCAN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| TreeScanError::Config(format!("Failed to build config: {e}")))?
            .try_deserialize()
            .map_err(|e| TreeScanError::Config(format!("Failed to deserialize config: {e}")))?;

        config.scan.validate()?;
        Ok(config)
    }
}

/// Scan simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Milliseconds between two reveals.
    #[serde(default = "default_reveal_interval")]
    pub reveal_interval_ms: u64,
    /// Milliseconds from a file's reveal to `scanning`.
    #[serde(default = "default_scan_delay")]
    pub scan_delay_ms: u64,
    /// Milliseconds from `scanning` to the verdict.
    #[serde(default = "default_verdict_delay")]
    pub verdict_delay_ms: u64,
    /// Probability that a file resolves to `error`.
    #[serde(default = "default_error_probability")]
    pub error_probability: f64,
    /// Message attached to `error` verdicts.
    #[serde(default = "default_error_message")]
    pub error_message: String,
    /// Seed for reproducible verdicts.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            reveal_interval_ms: default_reveal_interval(),
            scan_delay_ms: default_scan_delay(),
            verdict_delay_ms: default_verdict_delay(),
            error_probability: default_error_probability(),
            error_message: default_error_message(),
            seed: None,
        }
    }
}

impl ScanConfig {
    pub fn timings(&self) -> ScanTimings {
        ScanTimings {
            reveal_interval: Duration::from_millis(self.reveal_interval_ms),
            scan_delay: Duration::from_millis(self.scan_delay_ms),
            verdict_delay: Duration::from_millis(self.verdict_delay_ms),
        }
    }

    pub fn validate(&self) -> Result<(), TreeScanError> {
        self.timings().validate()?;
        validate_probability(self.error_probability)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset, e.g. `"info"` or `"treescan=debug"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_reveal_interval() -> u64 {
    800
}

fn default_scan_delay() -> u64 {
    300
}

fn default_verdict_delay() -> u64 {
    1200
}

fn default_error_probability() -> f64 {
    DEFAULT_ERROR_PROBABILITY
}

fn default_error_message() -> String {
    DEFAULT_ERROR_MESSAGE.to_string()
}

fn default_level() -> String {
    "warn".to_string()
}
