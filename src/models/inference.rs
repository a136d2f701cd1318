//! Inference adapter: raw transaction in, verdict out

use crate::config::AppConfig;
use crate::error::{FraudError, FraudResult};
use crate::feature_extractor::{FeatureExtractor, FeatureLayout};
use crate::models::classifier::Classifier;
use crate::models::encoder::CategoricalEncoders;
use crate::models::loader::{ArtifactLoader, ModelArtifacts};
use crate::models::metadata::{ModelReport, PerformanceTargets};
use crate::models::scaler::StandardScaler;
use crate::types::labels::MERCHANT_CATEGORIES;
use crate::types::prediction::{Classification, Verdict, PROBABILITY_TOLERANCE};
use crate::types::transaction::TransactionInput;
use std::path::Path;
use tracing::{debug, info};

/// Classify one transaction against explicit artifacts.
///
/// Derives `amt_per_hour_ratio`, label-encodes the categorical fields,
/// assembles the vector by column name in `layout` order, scales the
/// numerical columns and asks `classifier` for label and probabilities.
/// Nothing is mutated; the same inputs always give the same output.
pub fn classify(
    input: &TransactionInput,
    encoders: &CategoricalEncoders,
    scaler: &StandardScaler,
    layout: &FeatureLayout,
    classifier: &dyn Classifier,
) -> FraudResult<Classification> {
    let extractor = FeatureExtractor::new(layout.clone());
    let features = extractor.extract(input, encoders, scaler)?;
    run_classifier(classifier, &features)
}

fn run_classifier(classifier: &dyn Classifier, features: &[f64]) -> FraudResult<Classification> {
    let label = classifier.predict(features)?;
    let probabilities = classifier.predict_probabilities(features)?;

    let verdict = Verdict::from_label(label).ok_or_else(|| {
        FraudError::mismatch(format!(
            "{} returned label {} outside {{0, 1}}",
            classifier.name(),
            label
        ))
    })?;

    let [p0, p1] = probabilities;
    let valid = p0.is_finite()
        && p1.is_finite()
        && p0 >= 0.0
        && p1 >= 0.0
        && ((p0 + p1) - 1.0).abs() <= PROBABILITY_TOLERANCE;
    if !valid {
        return Err(FraudError::mismatch(format!(
            "{} returned invalid probabilities [{}, {}]",
            classifier.name(),
            p0,
            p1
        )));
    }

    Ok(Classification {
        verdict,
        probabilities,
    })
}

/// Inference engine bound to one loaded artifact bundle
pub struct InferenceEngine {
    artifacts: ModelArtifacts,
    extractor: FeatureExtractor,
}

impl InferenceEngine {
    /// Create a new inference engine from configuration
    pub fn new(config: &AppConfig) -> FraudResult<Self> {
        Self::from_bundle(&config.artifacts.bundle_path, config.artifacts.onnx_threads)
    }

    /// Load the bundle at `path`
    pub fn from_bundle<P: AsRef<Path>>(path: P, onnx_threads: usize) -> FraudResult<Self> {
        let artifacts = ArtifactLoader::with_threads(onnx_threads).load(path)?;
        Ok(Self::from_artifacts(artifacts))
    }

    pub fn from_artifacts(artifacts: ModelArtifacts) -> Self {
        let extractor = FeatureExtractor::new(artifacts.layout.clone());
        info!(
            classifier = artifacts.classifier.name(),
            features = ?extractor.feature_names(),
            "Inference engine initialized"
        );
        Self {
            artifacts,
            extractor,
        }
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    pub fn encoders(&self) -> &CategoricalEncoders {
        &self.artifacts.encoders
    }

    /// Scaled feature vector for `input`, in model column order
    pub fn features(&self, input: &TransactionInput) -> FraudResult<Vec<f64>> {
        self.extractor
            .extract(input, &self.artifacts.encoders, &self.artifacts.scaler)
    }

    /// Classify one transaction with the bound artifacts
    pub fn classify(&self, input: &TransactionInput) -> FraudResult<Classification> {
        let features = self.features(input)?;
        let classification = run_classifier(self.artifacts.classifier.as_ref(), &features)?;

        debug!(
            category = %input.category,
            amount = input.amount,
            hour = input.hour,
            verdict = %classification.verdict,
            prob_fraud = classification.prob_fraud(),
            "Transaction classified"
        );
        Ok(classification)
    }

    /// Model performance view
    pub fn report(&self, targets: &PerformanceTargets) -> FraudResult<ModelReport> {
        let artifacts = &self.artifacts;
        let info = &artifacts.metadata.info;
        let performance = artifacts.metadata.performance.clone();

        Ok(ModelReport {
            algorithm: info.algorithm().to_string(),
            classifier: artifacts.classifier.name().to_string(),
            n_estimators: info.n_estimators(),
            max_depth: info.max_depth(),
            trained_at: info.trained_at.clone(),
            meets_requirements: performance.as_ref().map(|p| p.meets(targets)),
            performance,
            feature_importance: artifacts
                .metadata
                .ranked_importances(artifacts.layout.columns())?,
            feature_columns: artifacts.layout.columns().to_vec(),
            numerical_columns: artifacts
                .layout
                .numerical()
                .iter()
                .map(|(c, _)| c.clone())
                .collect(),
            known_categories: artifacts.encoders.category.classes().len(),
            known_states: artifacts.encoders.state.classes().len(),
            category_codes: artifacts.encoders.category.vocabulary(),
            unsupported_categories: MERCHANT_CATEGORIES
                .iter()
                .filter(|c| !artifacts.encoders.category.contains(c))
                .map(|c| c.to_string())
                .collect(),
        })
    }
}
