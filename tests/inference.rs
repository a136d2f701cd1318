//! End-to-end classification against the bundled random forest fixture

use card_fraud_analysis::config::{AppConfig, DetectionConfig};
use card_fraud_analysis::feature_extractor::amt_per_hour_ratio;
use card_fraud_analysis::models::{classify, ArtifactLoader, InferenceEngine, PerformanceTargets};
use card_fraud_analysis::types::{RiskLevel, Verdict};
use card_fraud_analysis::{FraudError, Session, TransactionInput};
use std::path::PathBuf;
use std::sync::Arc;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

fn engine() -> InferenceEngine {
    InferenceEngine::from_bundle(fixture("model_bundle.json"), 1).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_grocery_scenario() {
    let engine = engine();
    let input = TransactionInput::new("grocery_pos", 50.0, "F", "CA")
        .with_age(35)
        .with_hour(14);

    assert_eq!(amt_per_hour_ratio(50.0, 14), 50.0 / 15.0);

    let features = engine.features(&input).unwrap();
    let expected = [
        4.0,
        (50.0 - 70.35) / 160.32,
        0.0,
        4.0,
        (35.0 - 46.0) / 17.4,
        (14.0 - 12.8) / 6.8,
        0.0,
        (50.0 / 15.0 - 9.5) / 30.2,
    ];
    assert_eq!(features, expected);

    let result = engine.classify(&input).unwrap();
    assert_eq!(result.verdict, Verdict::Safe);
    assert!(close(result.prob_fraud(), 0.07 / 3.0));
    assert!(close(result.prob_safe() + result.prob_fraud(), 1.0));
}

#[test]
fn test_online_night_purchase_is_flagged() {
    let engine = engine();
    let input = TransactionInput::new("shopping_net", 1200.0, "M", "NY")
        .with_age(30)
        .with_hour(23);

    let result = engine.classify(&input).unwrap();
    assert_eq!(result.verdict, Verdict::Fraud);
    assert!(close(result.prob_fraud(), 2.5 / 3.0));
    assert!(close(result.confidence_pct(), 250.0 / 3.0));
}

#[test]
fn test_free_function_uses_explicit_artifacts() {
    let artifacts = ArtifactLoader::new()
        .load(fixture("model_bundle.json"))
        .unwrap();
    let input = TransactionInput::new("travel", 310.0, "M", "WA").with_hour(0);

    let result = classify(
        &input,
        &artifacts.encoders,
        &artifacts.scaler,
        &artifacts.layout,
        artifacts.classifier.as_ref(),
    )
    .unwrap();
    let again = classify(
        &input,
        &artifacts.encoders,
        &artifacts.scaler,
        &artifacts.layout,
        artifacts.classifier.as_ref(),
    )
    .unwrap();

    assert_eq!(result, again);
    assert!(result.label() <= 1);
}

#[test]
fn test_hour_boundaries() {
    let engine = engine();
    let layout = &engine.artifacts().layout;
    let ratio_index = layout
        .columns()
        .iter()
        .position(|c| c == "amt_per_hour_ratio")
        .unwrap();
    let unscale = |v: f64| v * 30.2 + 9.5;

    let midnight = engine
        .features(&TransactionInput::new("home", 120.0, "F", "OH").with_hour(0))
        .unwrap();
    assert!((unscale(midnight[ratio_index]) - 120.0).abs() < 1e-9);

    let late = engine
        .features(&TransactionInput::new("home", 120.0, "F", "OH").with_hour(23))
        .unwrap();
    assert!((unscale(late[ratio_index]) - 5.0).abs() < 1e-9);

    let err = engine
        .classify(&TransactionInput::new("home", 120.0, "F", "OH").with_hour(24))
        .unwrap_err();
    assert!(matches!(err, FraudError::InvalidRange { field: "hour", .. }));
}

#[test]
fn test_unknown_labels_are_rejected() {
    let engine = engine();
    for input in [
        TransactionInput::new("crypto", 10.0, "F", "CA"),
        TransactionInput::new("home", 10.0, "X", "CA"),
        TransactionInput::new("home", 10.0, "F", "PR"),
    ] {
        let err = engine.classify(&input).unwrap_err();
        assert!(matches!(err, FraudError::UnknownCategory { .. }));
        assert!(err.is_recoverable());
    }
}

#[test]
fn test_session_over_fixture() {
    let config = AppConfig::default();
    let mut session = Session::new(Arc::new(engine()), DetectionConfig::default());

    let inputs = [
        TransactionInput::new("grocery_pos", 50.0, "F", "CA"),
        TransactionInput::new("shopping_net", 1200.0, "M", "NY").with_hour(23),
        TransactionInput::new("kids_pets", 18.5, "F", "FL").on_weekend(true),
    ];
    for input in inputs.iter().cloned() {
        assert!(config.input.check(&input).is_ok());
        session.analyze(input).unwrap();
    }

    let history = session.history();
    assert_eq!(history.len(), 3);
    for (record, input) in history.iter().zip(&inputs) {
        assert_eq!(&record.input, input);
    }
    assert_eq!(history.records()[1].verdict(), Verdict::Fraud);
    assert_eq!(session.metrics().by_level().get(&RiskLevel::High), Some(&1));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.csv");
    history.export_to_path(&path).unwrap();
    let exported = std::fs::read_to_string(&path).unwrap();
    assert_eq!(exported.lines().count(), 4);
}

#[test]
fn test_model_report() {
    let report = engine().report(&PerformanceTargets::default()).unwrap();

    assert_eq!(report.algorithm, "Random Forest");
    assert_eq!(report.classifier, "random_forest");
    assert_eq!(report.n_estimators, 3);
    assert_eq!(report.meets_requirements, Some(true));
    assert_eq!(report.known_categories, 14);
    assert_eq!(report.known_states, 50);
    assert!(report.unsupported_categories.is_empty());
    assert_eq!(report.category_codes[0], (0, "entertainment".to_string()));
    assert_eq!(report.category_codes[13], (13, "travel".to_string()));

    let ranked: Vec<&str> = report
        .feature_importance
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(&ranked[..3], &["amt", "hour", "amt_per_hour_ratio"]);

    let strict = PerformanceTargets {
        min_accuracy: 0.85,
        min_recall: 0.90,
    };
    assert_eq!(
        engine().report(&strict).unwrap().meets_requirements,
        Some(false)
    );
}
