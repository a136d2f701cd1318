//! Error taxonomy for the inference adapter and artifact loading

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for core operations
pub type FraudResult<T> = Result<T, FraudError>;

/// Errors raised by classification and artifact handling.
///
/// `UnknownCategory` and `InvalidRange` reject a single request and can be
/// corrected by the caller. `ArtifactMismatch` and `ArtifactLoad` mean the
/// model bundle or dataset is unusable for the lifetime of the process.
#[derive(Debug, Error)]
pub enum FraudError {
    /// A categorical label outside the encoder's closed domain
    #[error("unknown {field} label {label:?}")]
    UnknownCategory { field: String, label: String },

    /// A numeric input outside its accepted range
    #[error("{field} out of range: {value} (expected {expected})")]
    InvalidRange {
        field: &'static str,
        value: f64,
        expected: String,
    },

    /// The artifact bundle is internally inconsistent
    #[error("artifact mismatch: {0}")]
    ArtifactMismatch(String),

    /// A model bundle or dataset file could not be read or parsed
    #[error("failed to load {kind} from {}: {reason}", path.display())]
    ArtifactLoad {
        kind: &'static str,
        path: PathBuf,
        reason: String,
    },
}

impl FraudError {
    pub(crate) fn mismatch(message: impl Into<String>) -> Self {
        FraudError::ArtifactMismatch(message.into())
    }

    pub(crate) fn load(kind: &'static str, path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        FraudError::ArtifactLoad {
            kind,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the caller can fix the request and retry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FraudError::UnknownCategory { .. } | FraudError::InvalidRange { .. }
        )
    }
}
