//! Trained model artifacts and the inference adapter

pub mod classifier;
pub mod encoder;
pub mod inference;
pub mod loader;
pub mod metadata;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod scaler;

pub use classifier::{Classifier, ForestClassifier, LogisticClassifier};
pub use encoder::{CategoricalEncoders, LabelEncoder};
pub use inference::{classify, InferenceEngine};
pub use loader::{ArtifactLoader, ModelArtifacts};
pub use metadata::{ModelReport, PerformanceTargets};
pub use scaler::StandardScaler;
