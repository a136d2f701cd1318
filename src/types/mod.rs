//! Type definitions for transaction analysis

pub mod labels;
pub mod prediction;
pub mod risk;
pub mod transaction;

pub use prediction::{Classification, PredictionRecord, Verdict};
pub use risk::{RiskLevel, RiskProfile};
pub use transaction::TransactionInput;
