//! Artifact bundle loader

use crate::error::{FraudError, FraudResult};
use crate::feature_extractor::FeatureLayout;
use crate::models::classifier::{
    Classifier, ForestClassifier, ForestSpec, LogisticClassifier, LogisticSpec,
};
use crate::models::encoder::CategoricalEncoders;
use crate::models::metadata::{ModelInfo, ModelMetadata, Performance};
use crate::models::scaler::{ScalerSpec, StandardScaler};
use serde::Deserialize;
use serde_json::error::Category;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Bundle format versions this build understands
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Serialized classifier parameters, tagged by model family
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    RandomForest(ForestSpec),
    LogisticRegression(LogisticSpec),
    /// ONNX file, path relative to the bundle
    Onnx { path: String },
}

/// On-disk layout of the artifact bundle
#[derive(Debug, Clone, Deserialize)]
pub struct BundleManifest {
    pub format_version: u32,
    pub feature_columns: Vec<String>,
    pub numerical_cols: Vec<String>,
    pub label_encoders: HashMap<String, Vec<String>>,
    pub scaler: ScalerSpec,
    pub model: ModelSpec,
    #[serde(default)]
    pub model_info: ModelInfo,
    #[serde(default)]
    pub performance: Option<Performance>,
    #[serde(default)]
    pub feature_importances: Option<Vec<f64>>,
}

/// Validated, read-only artifacts of a trained model
pub struct ModelArtifacts {
    pub classifier: Box<dyn Classifier>,
    pub encoders: CategoricalEncoders,
    pub scaler: StandardScaler,
    pub layout: FeatureLayout,
    pub metadata: ModelMetadata,
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("classifier", &self.classifier.name())
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

/// Well-formed JSON with the wrong shape is an inconsistent bundle, not a read failure
fn parse_manifest(json: &str, origin: &Path) -> FraudResult<BundleManifest> {
    serde_json::from_str(json).map_err(|e| match e.classify() {
        Category::Data => FraudError::mismatch(format!("malformed bundle: {}", e)),
        Category::Io | Category::Syntax | Category::Eof => {
            FraudError::load("model bundle", origin, e)
        }
    })
}

/// Loader for artifact bundles
pub struct ArtifactLoader {
    /// Intra-op threads for ONNX sessions
    onnx_threads: usize,
}

impl ArtifactLoader {
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Read, parse and validate a bundle file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> FraudResult<ModelArtifacts> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading model bundle");

        let raw = std::fs::read_to_string(path)
            .map_err(|e| FraudError::load("model bundle", path, e))?;
        let manifest = parse_manifest(&raw, path)?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let artifacts = self.build(manifest, base_dir)?;

        info!(
            classifier = artifacts.classifier.name(),
            features = artifacts.layout.feature_count(),
            numerical = artifacts.layout.numerical().len(),
            categories = artifacts.encoders.category.classes().len(),
            states = artifacts.encoders.state.classes().len(),
            "Model bundle loaded"
        );
        Ok(artifacts)
    }

    /// Parse and validate a bundle held in memory; ONNX paths resolve against `base_dir`
    pub fn load_str(&self, json: &str, base_dir: &Path) -> FraudResult<ModelArtifacts> {
        let manifest = parse_manifest(json, base_dir)?;
        self.build(manifest, base_dir)
    }

    fn build(&self, manifest: BundleManifest, base_dir: &Path) -> FraudResult<ModelArtifacts> {
        if manifest.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(FraudError::mismatch(format!(
                "bundle format version {} is not supported (expected {})",
                manifest.format_version, SUPPORTED_FORMAT_VERSION
            )));
        }

        let layout = FeatureLayout::new(manifest.feature_columns, &manifest.numerical_cols)?;
        let scaler = StandardScaler::from_spec(manifest.scaler)?;
        layout.check_scaler(&scaler)?;
        let encoders = CategoricalEncoders::from_classes(manifest.label_encoders)?;

        let classifier = self.build_classifier(manifest.model, layout.feature_count(), base_dir)?;
        if classifier.n_features() != layout.feature_count() {
            return Err(FraudError::mismatch(format!(
                "classifier expects {} features but the bundle declares {} columns",
                classifier.n_features(),
                layout.feature_count()
            )));
        }

        let metadata = ModelMetadata {
            info: manifest.model_info,
            performance: manifest.performance,
            feature_importances: manifest.feature_importances,
        };
        metadata.ranked_importances(layout.columns())?;

        Ok(ModelArtifacts {
            classifier,
            encoders,
            scaler,
            layout,
            metadata,
        })
    }

    fn build_classifier(
        &self,
        spec: ModelSpec,
        n_features: usize,
        base_dir: &Path,
    ) -> FraudResult<Box<dyn Classifier>> {
        match spec {
            ModelSpec::RandomForest(forest) => Ok(Box::new(ForestClassifier::new(forest)?)),
            ModelSpec::LogisticRegression(logistic) => {
                Ok(Box::new(LogisticClassifier::new(logistic)?))
            }
            ModelSpec::Onnx { path } => self.load_onnx(&base_dir.join(path), n_features),
        }
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(&self, path: &Path, n_features: usize) -> FraudResult<Box<dyn Classifier>> {
        let model = crate::models::onnx::OnnxClassifier::load(path, n_features, self.onnx_threads)?;
        Ok(Box::new(model))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(&self, path: &Path, _n_features: usize) -> FraudResult<Box<dyn Classifier>> {
        tracing::warn!(
            path = %path.display(),
            threads = self.onnx_threads,
            "Bundle references an ONNX model but the onnx feature is disabled"
        );
        Err(FraudError::load(
            "onnx model",
            path,
            "built without the `onnx` feature",
        ))
    }
}

impl Default for ArtifactLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{json, Value};

    /// Minimal valid bundle: logistic regression over the eight standard columns
    pub(crate) fn bundle_json() -> Value {
        json!({
            "format_version": 1,
            "feature_columns": ["category", "amt", "gender", "state", "age", "hour", "is_weekend", "amt_per_hour_ratio"],
            "numerical_cols": ["amt", "age", "hour", "amt_per_hour_ratio"],
            "label_encoders": {
                "category": ["gas_transport", "grocery_pos", "shopping_net"],
                "gender": ["F", "M"],
                "state": ["CA", "NY", "TX"]
            },
            "scaler": {
                "columns": ["amt", "age", "hour", "amt_per_hour_ratio"],
                "mean": [70.0, 46.0, 12.0, 10.0],
                "scale": [160.0, 17.0, 6.0, 30.0]
            },
            "model": {
                "type": "logistic_regression",
                "coefficients": [0.1, 1.5, 0.0, 0.0, -0.2, 0.3, 0.4, 0.5],
                "intercept": -3.0
            },
            "performance": {"accuracy": 0.95, "recall": 0.81},
            "feature_importances": [0.1, 0.3, 0.0, 0.05, 0.1, 0.2, 0.05, 0.2]
        })
    }

    fn load(bundle: &Value) -> FraudResult<ModelArtifacts> {
        ArtifactLoader::new().load_str(&bundle.to_string(), Path::new("."))
    }

    #[test]
    fn test_load_valid_bundle() {
        let artifacts = load(&bundle_json()).unwrap();

        assert_eq!(artifacts.classifier.name(), "logistic_regression");
        assert_eq!(artifacts.layout.feature_count(), 8);
        assert!(artifacts.layout.is_numerical("amt"));
        assert!(!artifacts.layout.is_numerical("category"));
        assert_eq!(artifacts.encoders.state.encode("TX").unwrap(), 2);
        assert_eq!(artifacts.metadata.info.algorithm(), "Random Forest");
        assert_eq!(artifacts.metadata.performance.as_ref().unwrap().recall, 0.81);
    }

    #[test]
    fn test_unsupported_version() {
        let mut bundle = bundle_json();
        bundle["format_version"] = json!(2);
        assert!(matches!(load(&bundle), Err(FraudError::ArtifactMismatch(_))));
    }

    #[test]
    fn test_numerical_column_missing_from_scaler() {
        let mut bundle = bundle_json();
        bundle["numerical_cols"] = json!(["amt", "age", "hour", "amt_per_hour_ratio", "state"]);
        let err = load(&bundle).unwrap_err();
        assert!(matches!(err, FraudError::ArtifactMismatch(_)));
        assert!(err.to_string().contains("'state'"));
    }

    #[test]
    fn test_classifier_width_must_match_columns() {
        let mut bundle = bundle_json();
        bundle["model"]["coefficients"] = json!([0.1, 1.5, 0.0]);
        assert!(matches!(load(&bundle), Err(FraudError::ArtifactMismatch(_))));
    }

    #[test]
    fn test_feature_importances_must_match_columns() {
        let mut bundle = bundle_json();
        bundle["feature_importances"] = json!([0.5, 0.5]);
        assert!(matches!(load(&bundle), Err(FraudError::ArtifactMismatch(_))));
    }

    #[test]
    fn test_missing_encoder() {
        let mut bundle = bundle_json();
        bundle["label_encoders"]
            .as_object_mut()
            .unwrap()
            .remove("gender");
        assert!(matches!(load(&bundle), Err(FraudError::ArtifactMismatch(_))));
    }

    #[test]
    fn test_wrong_shape_is_a_mismatch() {
        let mut no_scaler = bundle_json();
        no_scaler.as_object_mut().unwrap().remove("scaler");
        assert!(matches!(load(&no_scaler), Err(FraudError::ArtifactMismatch(_))));

        let mut unknown_model = bundle_json();
        unknown_model["model"] = json!({"type": "xgboost"});
        let err = load(&unknown_model).unwrap_err();
        assert!(matches!(err, FraudError::ArtifactMismatch(_)));
        assert!(err.to_string().contains("xgboost"));

        let truncated = ArtifactLoader::new().load_str("{\"format_version\": 1", Path::new("."));
        assert!(matches!(truncated, Err(FraudError::ArtifactLoad { .. })));
    }

    #[test]
    fn test_load_errors() {
        let loader = ArtifactLoader::new();
        let dir = tempfile::tempdir().unwrap();

        let missing = loader.load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, FraudError::ArtifactLoad { .. }));

        let garbled = dir.path().join("garbled.json");
        std::fs::write(&garbled, "{ not json").unwrap();
        assert!(matches!(
            loader.load(&garbled),
            Err(FraudError::ArtifactLoad { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        std::fs::write(&path, bundle_json().to_string()).unwrap();

        let artifacts = ArtifactLoader::with_threads(2).load(&path).unwrap();
        assert_eq!(artifacts.classifier.n_features(), 8);
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn test_onnx_requires_feature() {
        let mut bundle = bundle_json();
        bundle["model"] = json!({"type": "onnx", "path": "model.onnx"});
        assert!(matches!(load(&bundle), Err(FraudError::ArtifactLoad { .. })));
    }
}
