//! Feature extraction for card transaction model inference.
//!
//! Reproduces the training-time preprocessing: the derived
//! `amt_per_hour_ratio` feature, label encoding of the categorical fields,
//! assembly in the bundle's column order and scaling of the numerical columns.

use crate::error::{FraudError, FraudResult};
use crate::models::encoder::CategoricalEncoders;
use crate::models::scaler::StandardScaler;
use crate::types::transaction::TransactionInput;
use std::collections::HashSet;

/// Every column the extractor can produce
pub const FEATURE_NAMES: [&str; 8] = [
    "category",
    "amt",
    "gender",
    "state",
    "age",
    "hour",
    "is_weekend",
    "amt_per_hour_ratio",
];

/// Derived feature: amount spread over the hours elapsed since midnight, plus one
pub fn amt_per_hour_ratio(amount: f64, hour: u32) -> f64 {
    amount / (hour as f64 + 1.0)
}

/// Encoded, unscaled values of one transaction, addressed by column name
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedTransaction {
    pub category: f64,
    pub amt: f64,
    pub gender: f64,
    pub state: f64,
    pub age: f64,
    pub hour: f64,
    pub is_weekend: f64,
    pub amt_per_hour_ratio: f64,
}

impl EncodedTransaction {
    pub fn get(&self, column: &str) -> Option<f64> {
        match column {
            "category" => Some(self.category),
            "amt" => Some(self.amt),
            "gender" => Some(self.gender),
            "state" => Some(self.state),
            "age" => Some(self.age),
            "hour" => Some(self.hour),
            "is_weekend" => Some(self.is_weekend),
            "amt_per_hour_ratio" => Some(self.amt_per_hour_ratio),
            _ => None,
        }
    }
}

/// Column order and numerical column set of a trained model.
///
/// Validated once at load time so that every later assembly is total.
#[derive(Debug, Clone)]
pub struct FeatureLayout {
    columns: Vec<String>,
    /// `(column, position in columns)` in the order of the bundle's `numerical_cols`
    numerical: Vec<(String, usize)>,
}

impl FeatureLayout {
    pub fn new(feature_columns: Vec<String>, numerical_cols: &[String]) -> FraudResult<Self> {
        let mut seen = HashSet::new();
        for column in &feature_columns {
            if !FEATURE_NAMES.contains(&column.as_str()) {
                return Err(FraudError::mismatch(format!(
                    "feature order references unknown column '{}'",
                    column
                )));
            }
            if !seen.insert(column.as_str()) {
                return Err(FraudError::mismatch(format!(
                    "feature order lists '{}' twice",
                    column
                )));
            }
        }
        if let Some(missing) = FEATURE_NAMES.iter().find(|name| !seen.contains(**name)) {
            return Err(FraudError::mismatch(format!(
                "feature order omits column '{}'",
                missing
            )));
        }

        let mut numerical = Vec::with_capacity(numerical_cols.len());
        for column in numerical_cols {
            let position = feature_columns
                .iter()
                .position(|c| c == column)
                .ok_or_else(|| {
                    FraudError::mismatch(format!(
                        "numerical column '{}' is not a feature column",
                        column
                    ))
                })?;
            if numerical.iter().any(|(c, _)| c == column) {
                return Err(FraudError::mismatch(format!(
                    "numerical columns list '{}' twice",
                    column
                )));
            }
            numerical.push((column.clone(), position));
        }

        Ok(Self {
            columns: feature_columns,
            numerical,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Numerical columns paired with their vector position
    pub fn numerical(&self) -> &[(String, usize)] {
        &self.numerical
    }

    pub fn is_numerical(&self, column: &str) -> bool {
        self.numerical.iter().any(|(c, _)| c == column)
    }

    /// Check that the scaler carries parameters for every numerical column
    pub fn check_scaler(&self, scaler: &StandardScaler) -> FraudResult<()> {
        match self.numerical.iter().find(|(c, _)| !scaler.has_column(c)) {
            Some((column, _)) => Err(FraudError::mismatch(format!(
                "scaler has no parameters for numerical column '{}'",
                column
            ))),
            None => Ok(()),
        }
    }

    pub fn feature_count(&self) -> usize {
        self.columns.len()
    }
}

/// Feature extractor that transforms transaction inputs into model input features.
pub struct FeatureExtractor {
    layout: FeatureLayout,
}

impl FeatureExtractor {
    pub fn new(layout: FeatureLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Derive and label-encode, without ordering or scaling
    pub fn encode(
        &self,
        tx: &TransactionInput,
        encoders: &CategoricalEncoders,
    ) -> FraudResult<EncodedTransaction> {
        tx.validate()?;

        Ok(EncodedTransaction {
            category: encoders.category.encode(&tx.category)? as f64,
            amt: tx.amount,
            gender: encoders.gender.encode(&tx.gender)? as f64,
            state: encoders.state.encode(&tx.state)? as f64,
            age: tx.age as f64,
            hour: tx.hour as f64,
            is_weekend: if tx.is_weekend { 1.0 } else { 0.0 },
            amt_per_hour_ratio: amt_per_hour_ratio(tx.amount, tx.hour),
        })
    }

    /// Lay encoded values out in the trained column order, by name
    pub fn assemble(&self, encoded: &EncodedTransaction) -> FraudResult<Vec<f64>> {
        self.layout
            .columns
            .iter()
            .map(|column| {
                encoded.get(column).ok_or_else(|| {
                    FraudError::mismatch(format!(
                        "feature order references column '{}' absent from the assembled vector",
                        column
                    ))
                })
            })
            .collect()
    }

    /// Full preprocessing: encode, assemble, scale.
    ///
    /// Returns a vector of `layout().feature_count()` values.
    pub fn extract(
        &self,
        tx: &TransactionInput,
        encoders: &CategoricalEncoders,
        scaler: &StandardScaler,
    ) -> FraudResult<Vec<f64>> {
        let encoded = self.encode(tx, encoders)?;
        let mut features = self.assemble(&encoded)?;
        scaler.transform(&mut features, self.layout.numerical())?;
        Ok(features)
    }

    pub fn feature_count(&self) -> usize {
        self.layout.feature_count()
    }

    pub fn feature_names(&self) -> &[String] {
        self.layout.columns()
    }
}
