//! Descriptive model metadata carried by the artifact bundle

use crate::error::{FraudError, FraudResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Training-time description of the model, display only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub n_estimators: Option<u32>,
    #[serde(default)]
    pub max_depth: Option<u32>,
    #[serde(default)]
    pub trained_at: Option<String>,
}

impl ModelInfo {
    pub fn algorithm(&self) -> &str {
        self.algorithm.as_deref().unwrap_or("Random Forest")
    }

    pub fn n_estimators(&self) -> u32 {
        self.n_estimators.unwrap_or(200)
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth.unwrap_or(15)
    }
}

/// Held-out evaluation metrics recorded at training time (fractions)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Performance {
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub precision: f64,
    #[serde(default)]
    pub recall: f64,
    #[serde(default)]
    pub f1_score: f64,
    #[serde(default)]
    pub roc_auc: f64,
}

/// Minimum metrics a deployable model must have reached
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceTargets {
    pub min_accuracy: f64,
    pub min_recall: f64,
}

impl Default for PerformanceTargets {
    fn default() -> Self {
        Self {
            min_accuracy: 0.85,
            min_recall: 0.80,
        }
    }
}

impl Performance {
    pub fn meets(&self, targets: &PerformanceTargets) -> bool {
        self.accuracy >= targets.min_accuracy && self.recall >= targets.min_recall
    }
}

/// Metadata of a loaded bundle
#[derive(Debug, Clone, Default)]
pub struct ModelMetadata {
    pub info: ModelInfo,
    pub performance: Option<Performance>,
    pub feature_importances: Option<Vec<f64>>,
}

impl ModelMetadata {
    /// Importances paired with column names, most important first
    pub fn ranked_importances(&self, columns: &[String]) -> FraudResult<Vec<(String, f64)>> {
        let Some(importances) = &self.feature_importances else {
            return Ok(Vec::new());
        };
        if importances.len() != columns.len() {
            return Err(FraudError::mismatch(format!(
                "{} feature importances for {} feature columns",
                importances.len(),
                columns.len()
            )));
        }

        let mut ranked: Vec<(String, f64)> = columns
            .iter()
            .cloned()
            .zip(importances.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        Ok(ranked)
    }
}

/// Everything the model performance view shows
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub algorithm: String,
    pub classifier: String,
    pub n_estimators: u32,
    pub max_depth: u32,
    pub trained_at: Option<String>,
    pub performance: Option<Performance>,
    /// `None` when the bundle records no performance
    pub meets_requirements: Option<bool>,
    pub feature_importance: Vec<(String, f64)>,
    pub feature_columns: Vec<String>,
    pub numerical_columns: Vec<String>,
    pub known_categories: usize,
    pub known_states: usize,
    /// Model codes of the merchant categories
    pub category_codes: Vec<(u32, String)>,
    /// Standard merchant categories the model cannot classify
    pub unsupported_categories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_defaults() {
        let info: ModelInfo = serde_json::from_str("{}").unwrap();
        assert_eq!(info.algorithm(), "Random Forest");
        assert_eq!(info.n_estimators(), 200);
        assert_eq!(info.max_depth(), 15);
        assert!(info.trained_at.is_none());
    }

    #[test]
    fn test_requirement_check() {
        let targets = PerformanceTargets::default();
        let mut perf = Performance {
            accuracy: 0.97,
            precision: 0.88,
            recall: 0.82,
            f1_score: 0.85,
            roc_auc: 0.96,
        };
        assert!(perf.meets(&targets));

        perf.recall = 0.79;
        assert!(!perf.meets(&targets));

        perf.recall = 0.80;
        perf.accuracy = 0.85;
        assert!(perf.meets(&targets));
    }

    #[test]
    fn test_ranked_importances() {
        let columns: Vec<String> = ["amt", "hour", "age"].iter().map(|s| s.to_string()).collect();
        let metadata = ModelMetadata {
            feature_importances: Some(vec![0.5, 0.3, 0.2]),
            ..Default::default()
        };
        let ranked = metadata.ranked_importances(&columns).unwrap();
        assert_eq!(ranked[0], ("amt".to_string(), 0.5));
        assert_eq!(ranked[2], ("age".to_string(), 0.2));

        let metadata = ModelMetadata {
            feature_importances: Some(vec![0.2, 0.5, 0.3]),
            ..Default::default()
        };
        let ranked = metadata.ranked_importances(&columns).unwrap();
        assert_eq!(ranked[0].0, "hour");

        let metadata = ModelMetadata {
            feature_importances: Some(vec![1.0]),
            ..Default::default()
        };
        assert!(metadata.ranked_importances(&columns).is_err());

        assert!(ModelMetadata::default()
            .ranked_importances(&columns)
            .unwrap()
            .is_empty());
    }
}
