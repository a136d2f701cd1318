//! Configuration management for card fraud analysis

use crate::error::{FraudError, FraudResult};
use crate::models::metadata::PerformanceTargets;
use crate::types::risk::{BadgeThresholds, RiskLevelThresholds};
use crate::types::transaction::TransactionInput;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    pub dataset: DatasetConfig,
    pub input: InputConfig,
    pub detection: DetectionConfig,
    pub performance: PerformanceTargets,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

/// Trained model artifacts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// JSON artifact bundle (classifier, encoders, scaler, column order)
    pub bundle_path: PathBuf,
    /// Number of threads for ONNX inference (default: 1)
    pub onnx_threads: usize,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            bundle_path: PathBuf::from("models/fraud_model.json"),
            onnx_threads: 1,
        }
    }
}

/// Historical transaction dataset
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// CSV file with the historical transactions
    pub path: PathBuf,
    /// Date ages are computed against; today when absent
    pub reference_date: Option<NaiveDate>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/fraudTest.csv"),
            reference_date: None,
        }
    }
}

/// Bounds enforced where transactions are entered
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub min_age: u32,
    pub max_age: u32,
    pub min_amount: f64,
    pub max_amount: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            min_age: 18,
            max_age: 100,
            min_amount: 0.01,
            max_amount: 100_000.0,
        }
    }
}

impl InputConfig {
    /// Reject inputs outside the entry bounds
    pub fn check(&self, input: &TransactionInput) -> FraudResult<()> {
        if input.age < self.min_age || input.age > self.max_age {
            return Err(FraudError::InvalidRange {
                field: "age",
                value: input.age as f64,
                expected: format!("{}..={}", self.min_age, self.max_age),
            });
        }
        if !(input.amount >= self.min_amount && input.amount <= self.max_amount) {
            return Err(FraudError::InvalidRange {
                field: "amount",
                value: input.amount,
                expected: format!("{}..={}", self.min_amount, self.max_amount),
            });
        }
        Ok(())
    }
}

/// Detection configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Risk level classification thresholds on P(fraud)
    pub risk_levels: RiskLevelThresholds,
    /// Amount, time and category badge thresholds
    pub badges: BadgeThresholds,
}

/// Session history
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Records shown in the recent view
    pub recent_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { recent_limit: 5 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Load from `path` when it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_path(path)
                .with_context(|| format!("Invalid configuration file {}", path.display()))
        } else {
            warn!(path = %path.display(), "Configuration file not found, using defaults");
            Ok(Self::default())
        }
    }
}
