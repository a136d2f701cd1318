//! Closed-vocabulary label encoders for the categorical columns

use crate::error::{FraudError, FraudResult};
use std::collections::HashMap;

/// Bidirectional label <-> code mapping learned at training time.
///
/// The code of a label is its position in the training-time class list.
/// Labels outside the list are rejected, never mapped to a default code.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    field: String,
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl LabelEncoder {
    pub fn new(field: &str, classes: Vec<String>) -> FraudResult<Self> {
        if classes.is_empty() {
            return Err(FraudError::mismatch(format!(
                "label encoder '{}' has no classes",
                field
            )));
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, label) in classes.iter().enumerate() {
            if codes.insert(label.clone(), code as u32).is_some() {
                return Err(FraudError::mismatch(format!(
                    "label encoder '{}' lists {:?} twice",
                    field, label
                )));
            }
        }

        Ok(Self {
            field: field.to_string(),
            classes,
            codes,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Known labels, in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, label: &str) -> FraudResult<u32> {
        self.codes
            .get(label)
            .copied()
            .ok_or_else(|| FraudError::UnknownCategory {
                field: self.field.clone(),
                label: label.to_string(),
            })
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.codes.contains_key(label)
    }

    /// Every `(code, label)` pair, decoded from the code side
    pub fn vocabulary(&self) -> Vec<(u32, String)> {
        (0..self.classes.len() as u32)
            .filter_map(|code| self.decode(code).map(|label| (code, label.to_string())))
            .collect()
    }
}

/// The three encoders the model was trained with
#[derive(Debug, Clone)]
pub struct CategoricalEncoders {
    pub category: LabelEncoder,
    pub gender: LabelEncoder,
    pub state: LabelEncoder,
}

impl CategoricalEncoders {
    /// Build from the bundle's `label_encoders` table (field -> classes)
    pub fn from_classes(mut table: HashMap<String, Vec<String>>) -> FraudResult<Self> {
        let mut take = |field: &str| -> FraudResult<LabelEncoder> {
            let classes = table.remove(field).ok_or_else(|| {
                FraudError::mismatch(format!("bundle has no label encoder for '{}'", field))
            })?;
            LabelEncoder::new(field, classes)
        };

        Ok(Self {
            category: take("category")?,
            gender: take("gender")?,
            state: take("state")?,
        })
    }
}
