//! Card Fraud Analysis Library
//!
//! Classifies single card transactions with a pre-trained model through a
//! faithful reproduction of the training-time preprocessing, keeps a
//! per-session prediction history, and summarises the historical dataset
//! the model was built from.

pub mod config;
pub mod dataset;
pub mod error;
pub mod feature_extractor;
pub mod history;
pub mod metrics;
pub mod models;
pub mod session;
pub mod types;

pub use config::AppConfig;
pub use dataset::{Dataset, DatasetSummary};
pub use error::{FraudError, FraudResult};
pub use feature_extractor::{FeatureExtractor, FeatureLayout};
pub use history::SessionHistory;
pub use models::inference::{classify, InferenceEngine};
pub use session::Session;
pub use types::{prediction::PredictionRecord, transaction::TransactionInput};
