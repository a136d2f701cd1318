//! Standard scaler fitted at training time

use crate::error::{FraudError, FraudResult};
use serde::Deserialize;
use std::collections::HashMap;

/// Scaler parameters as stored in the bundle: parallel arrays keyed by `columns`
#[derive(Debug, Clone, Deserialize)]
pub struct ScalerSpec {
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Per-column `(x - mean) / scale` transform.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    params: HashMap<String, (f64, f64)>,
    columns: Vec<String>,
}

impl StandardScaler {
    pub fn from_spec(spec: ScalerSpec) -> FraudResult<Self> {
        if spec.mean.len() != spec.columns.len() || spec.scale.len() != spec.columns.len() {
            return Err(FraudError::mismatch(format!(
                "scaler has {} columns but {} means and {} scales",
                spec.columns.len(),
                spec.mean.len(),
                spec.scale.len()
            )));
        }

        let mut params = HashMap::with_capacity(spec.columns.len());
        for ((column, &mean), &scale) in spec.columns.iter().zip(&spec.mean).zip(&spec.scale) {
            if !mean.is_finite() || !scale.is_finite() || scale == 0.0 {
                return Err(FraudError::mismatch(format!(
                    "scaler column '{}' has unusable parameters (mean={}, scale={})",
                    column, mean, scale
                )));
            }
            if params.insert(column.clone(), (mean, scale)).is_some() {
                return Err(FraudError::mismatch(format!(
                    "scaler lists column '{}' twice",
                    column
                )));
            }
        }

        Ok(Self {
            params,
            columns: spec.columns,
        })
    }

    /// Columns the scaler was fitted on
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.params.contains_key(column)
    }

    /// `(mean, scale)` of a column
    pub fn params(&self, column: &str) -> Option<(f64, f64)> {
        self.params.get(column).copied()
    }

    /// Scale one value of the named column
    pub fn transform_value(&self, column: &str, value: f64) -> FraudResult<f64> {
        let (mean, scale) = self.params(column).ok_or_else(|| {
            FraudError::mismatch(format!("scaler has no parameters for column '{}'", column))
        })?;
        Ok((value - mean) / scale)
    }

    /// Scale the named columns of a feature vector in place.
    ///
    /// `targets` pairs each column name with its position in `features`.
    pub fn transform(&self, features: &mut [f64], targets: &[(String, usize)]) -> FraudResult<()> {
        for (column, position) in targets {
            let slot = features.get_mut(*position).ok_or_else(|| {
                FraudError::mismatch(format!(
                    "numerical column '{}' points past the feature vector",
                    column
                ))
            })?;
            *slot = self.transform_value(column, *slot)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ScalerSpec {
        ScalerSpec {
            columns: vec!["amt".to_string(), "hour".to_string()],
            mean: vec![70.0, 12.0],
            scale: vec![160.0, 6.0],
        }
    }

    #[test]
    fn test_transform_value() {
        let scaler = StandardScaler::from_spec(spec()).unwrap();

        assert_eq!(scaler.transform_value("amt", 230.0).unwrap(), 1.0);
        assert_eq!(scaler.transform_value("hour", 9.0).unwrap(), -0.5);
        assert!(matches!(
            scaler.transform_value("age", 30.0),
            Err(FraudError::ArtifactMismatch(_))
        ));
    }

    #[test]
    fn test_transform_in_place_leaves_other_columns() {
        let scaler = StandardScaler::from_spec(spec()).unwrap();
        let mut features = vec![4.0, 70.0, 18.0];
        let targets = vec![("amt".to_string(), 1), ("hour".to_string(), 2)];

        scaler.transform(&mut features, &targets).unwrap();
        assert_eq!(features, vec![4.0, 0.0, 1.0]);
    }

    #[test]
    fn test_rejects_inconsistent_parameters() {
        let mut short = spec();
        short.scale.pop();
        assert!(StandardScaler::from_spec(short).is_err());

        let mut zero = spec();
        zero.scale[0] = 0.0;
        assert!(StandardScaler::from_spec(zero).is_err());

        let mut dup = spec();
        dup.columns[1] = "amt".to_string();
        assert!(StandardScaler::from_spec(dup).is_err());
    }
}
