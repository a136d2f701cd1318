//! One user session: classify, keep history, track metrics

use crate::config::{DetectionConfig, InputConfig};
use crate::error::FraudResult;
use crate::history::SessionHistory;
use crate::metrics::SessionMetrics;
use crate::models::inference::InferenceEngine;
use crate::types::prediction::PredictionRecord;
use crate::types::risk::{RiskLevel, RiskProfile};
use crate::types::transaction::TransactionInput;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of one analysis, as shown next to the verdict
#[derive(Debug, Clone)]
pub struct Analysis<'a> {
    pub record: &'a PredictionRecord,
    pub risk_level: RiskLevel,
    pub profile: RiskProfile,
}

/// State owned by one user session.
///
/// The engine is shared; history and metrics belong to this session alone.
pub struct Session {
    id: Uuid,
    engine: Arc<InferenceEngine>,
    detection: DetectionConfig,
    bounds: Option<InputConfig>,
    history: SessionHistory,
    metrics: SessionMetrics,
}

impl Session {
    pub fn new(engine: Arc<InferenceEngine>, detection: DetectionConfig) -> Self {
        let id = Uuid::new_v4();
        info!(session_id = %id, "Session started");
        Self {
            id,
            engine,
            detection,
            bounds: None,
            history: SessionHistory::new(),
            metrics: SessionMetrics::new(),
        }
    }

    /// Reject inputs outside `bounds` before they reach the model
    pub fn with_input_bounds(mut self, bounds: InputConfig) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Classify `input` and append the result to the history.
    ///
    /// Rejected inputs leave the history untouched.
    pub fn analyze(&mut self, input: TransactionInput) -> FraudResult<Analysis<'_>> {
        let start = Instant::now();

        let checked = match &self.bounds {
            Some(bounds) => bounds.check(&input),
            None => Ok(()),
        };
        let classification = match checked.and_then(|()| self.engine.classify(&input)) {
            Ok(classification) => classification,
            Err(e) => {
                if e.is_recoverable() {
                    self.metrics.record_rejection();
                    warn!(session_id = %self.id, error = %e, "Transaction rejected");
                }
                return Err(e);
            }
        };

        let risk_level =
            RiskLevel::from_score(classification.prob_fraud(), &self.detection.risk_levels);
        let profile = RiskProfile::assess(&input, &self.detection.badges);
        self.metrics
            .record_classification(start.elapsed(), &classification, risk_level);

        let record = self.history.append(PredictionRecord::new(input, classification));
        debug!(
            session_id = %self.id,
            record_id = %record.record_id,
            verdict = %record.verdict(),
            risk_level = ?risk_level,
            "Analysis recorded"
        );

        Ok(Analysis {
            record,
            risk_level,
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FraudError;
    use crate::models::loader::tests::bundle_json;
    use crate::models::loader::ArtifactLoader;
    use crate::types::prediction::Verdict;
    use std::path::Path;

    fn engine() -> Arc<InferenceEngine> {
        let artifacts = ArtifactLoader::new()
            .load_str(&bundle_json().to_string(), Path::new("."))
            .unwrap();
        Arc::new(InferenceEngine::from_artifacts(artifacts))
    }

    #[test]
    fn test_analyze_appends_records() {
        let mut session = Session::new(engine(), DetectionConfig::default());

        let analysis = session
            .analyze(TransactionInput::new("grocery_pos", 50.0, "F", "CA"))
            .unwrap();
        assert_eq!(analysis.record.verdict(), Verdict::Safe);
        assert_eq!(analysis.risk_level, RiskLevel::Low);
        assert!(analysis.profile.factors.is_empty());

        let analysis = session
            .analyze(
                TransactionInput::new("shopping_net", 2400.0, "M", "NY")
                    .with_hour(23)
                    .on_weekend(true),
            )
            .unwrap();
        assert_eq!(analysis.record.verdict(), Verdict::Fraud);

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history.records()[0].input.category, "grocery_pos");
        assert_eq!(history.records()[1].input.category, "shopping_net");
        assert_eq!(session.metrics().classified(), 2);
        assert_eq!(session.metrics().fraud_verdicts(), 1);
    }

    #[test]
    fn test_rejected_input_is_not_recorded() {
        let mut session = Session::new(engine(), DetectionConfig::default());

        let err = session
            .analyze(TransactionInput::new("grocery_pos", 50.0, "X", "CA"))
            .unwrap_err();
        assert!(matches!(err, FraudError::UnknownCategory { .. }));
        assert!(session.history().is_empty());
        assert_eq!(session.metrics().rejected(), 1);
    }

    #[test]
    fn test_input_bounds_count_as_rejections() {
        let mut session = Session::new(engine(), DetectionConfig::default())
            .with_input_bounds(InputConfig::default());

        let err = session
            .analyze(TransactionInput::new("grocery_pos", 50.0, "F", "CA").with_age(12))
            .unwrap_err();
        assert!(matches!(err, FraudError::InvalidRange { field: "age", .. }));

        let err = session
            .analyze(TransactionInput::new("grocery_pos", 250_000.0, "F", "CA"))
            .unwrap_err();
        assert!(matches!(err, FraudError::InvalidRange { field: "amount", .. }));

        session
            .analyze(TransactionInput::new("grocery_pos", 50.0, "F", "CA"))
            .unwrap();
        assert_eq!(session.metrics().rejected(), 2);
        assert_eq!(session.metrics().classified(), 1);
        assert_eq!(session.history().len(), 1);

        let mut unbounded = Session::new(engine(), DetectionConfig::default());
        unbounded
            .analyze(TransactionInput::new("grocery_pos", 50.0, "F", "CA").with_age(12))
            .unwrap();
    }

    #[test]
    fn test_sessions_are_isolated() {
        let engine = engine();
        let mut first = Session::new(Arc::clone(&engine), DetectionConfig::default());
        let second = Session::new(engine, DetectionConfig::default());

        first
            .analyze(TransactionInput::new("gas_transport", 20.0, "M", "TX"))
            .unwrap();

        assert_eq!(first.history().len(), 1);
        assert!(second.history().is_empty());
        assert_ne!(first.id(), second.id());
    }
}
