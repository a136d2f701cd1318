//! Transaction input submitted for a single analysis

use crate::error::{FraudError, FraudResult};
use serde::{Deserialize, Serialize};

/// Highest valid hour of day
pub const MAX_HOUR: u32 = 23;

/// Raw attributes of one card transaction, as entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Merchant category label (e.g. `grocery_pos`)
    pub category: String,

    /// Transaction amount in USD
    #[serde(alias = "amt")]
    pub amount: f64,

    /// Cardholder gender label (`F` / `M`)
    pub gender: String,

    /// US postal code of the transaction
    pub state: String,

    /// Cardholder age in years
    #[serde(default = "default_age")]
    pub age: u32,

    /// Hour of day, 0-23
    #[serde(default = "default_hour")]
    pub hour: u32,

    /// Whether the transaction happened on Saturday or Sunday
    #[serde(default)]
    pub is_weekend: bool,
}

fn default_age() -> u32 {
    35
}

fn default_hour() -> u32 {
    14
}

impl TransactionInput {
    /// Create an input with the form defaults (age 35, 14:00, weekday)
    pub fn new(category: &str, amount: f64, gender: &str, state: &str) -> Self {
        Self {
            category: category.to_string(),
            amount,
            gender: gender.to_string(),
            state: state.to_string(),
            age: default_age(),
            hour: default_hour(),
            is_weekend: false,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    pub fn with_hour(mut self, hour: u32) -> Self {
        self.hour = hour;
        self
    }

    pub fn on_weekend(mut self, is_weekend: bool) -> Self {
        self.is_weekend = is_weekend;
        self
    }

    /// Check the ranges the model relies on: amount > 0 and hour in 0..=23.
    ///
    /// Age bounds belong to the input boundary (see `config::InputConfig`).
    pub fn validate(&self) -> FraudResult<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(FraudError::InvalidRange {
                field: "amount",
                value: self.amount,
                expected: "a finite value > 0".to_string(),
            });
        }
        if self.hour > MAX_HOUR {
            return Err(FraudError::InvalidRange {
                field: "hour",
                value: self.hour as f64,
                expected: format!("0..={}", MAX_HOUR),
            });
        }
        Ok(())
    }
}
