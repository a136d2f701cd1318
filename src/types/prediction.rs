//! Classification results and session prediction records

use crate::types::transaction::TransactionInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tolerance for `P(legitimate) + P(fraudulent) == 1`
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Timestamp format used for display and CSV export
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Predicted class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// Class 0, legitimate
    Safe,
    /// Class 1, fraudulent
    Fraud,
}

impl Verdict {
    /// Map a binary class label, `None` for anything outside {0, 1}
    pub fn from_label(label: u8) -> Option<Self> {
        match label {
            0 => Some(Verdict::Safe),
            1 => Some(Verdict::Fraud),
            _ => None,
        }
    }

    pub fn label(self) -> u8 {
        match self {
            Verdict::Safe => 0,
            Verdict::Fraud => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Safe => "SAFE",
            Verdict::Fraud => "FRAUD",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the inference adapter for one transaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub verdict: Verdict,
    /// `[P(legitimate), P(fraudulent)]`
    pub probabilities: [f64; 2],
}

impl Classification {
    pub fn label(&self) -> u8 {
        self.verdict.label()
    }

    pub fn prob_safe(&self) -> f64 {
        self.probabilities[0]
    }

    pub fn prob_fraud(&self) -> f64 {
        self.probabilities[1]
    }

    /// Probability of the predicted class, in percent
    pub fn confidence_pct(&self) -> f64 {
        self.probabilities[self.label() as usize] * 100.0
    }
}

/// One analysed transaction kept in the session history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub record_id: String,
    pub timestamp: DateTime<Utc>,
    pub input: TransactionInput,
    pub classification: Classification,
}

impl PredictionRecord {
    pub fn new(input: TransactionInput, classification: Classification) -> Self {
        Self {
            record_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            input,
            classification,
        }
    }

    pub fn verdict(&self) -> Verdict {
        self.classification.verdict
    }

    /// Flat row used for CSV export and tabular display
    pub fn to_row(&self) -> PredictionRow {
        PredictionRow {
            timestamp: self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            category: self.input.category.clone(),
            amount: self.input.amount,
            gender: self.input.gender.clone(),
            state: self.input.state.clone(),
            age: self.input.age,
            hour: self.input.hour,
            is_weekend: self.input.is_weekend,
            prediction: self.verdict().as_str(),
            confidence: self.classification.confidence_pct(),
            prob_safe: self.classification.prob_safe() * 100.0,
            prob_fraud: self.classification.prob_fraud() * 100.0,
        }
    }
}

/// Export shape of a prediction record; probabilities are percentages
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRow {
    pub timestamp: String,
    pub category: String,
    pub amount: f64,
    pub gender: String,
    pub state: String,
    pub age: u32,
    pub hour: u32,
    pub is_weekend: bool,
    pub prediction: &'static str,
    pub confidence: f64,
    pub prob_safe: f64,
    pub prob_fraud: f64,
}
