//! Classifier capability and the natively evaluated model families

use crate::error::{FraudError, FraudResult};
use serde::Deserialize;

/// A fitted binary classifier.
///
/// The inference adapter depends only on this trait; how the model was
/// trained or stored is up to the implementation.
pub trait Classifier: Send + Sync {
    /// Short algorithm name, for logs and reports
    fn name(&self) -> &str;

    /// Length of the feature vector the model expects
    fn n_features(&self) -> usize;

    /// `[P(legitimate), P(fraudulent)]`
    fn predict_probabilities(&self, features: &[f64]) -> FraudResult<[f64; 2]>;

    /// Predicted class label, 0 or 1
    fn predict(&self, features: &[f64]) -> FraudResult<u8> {
        let [p0, p1] = self.predict_probabilities(features)?;
        Ok(if p1 > p0 { 1 } else { 0 })
    }
}

fn check_width(model: &str, expected: usize, features: &[f64]) -> FraudResult<()> {
    if features.len() != expected {
        return Err(FraudError::mismatch(format!(
            "{} expects {} features, got {}",
            model,
            expected,
            features.len()
        )));
    }
    Ok(())
}

/// One decision tree in flattened array form.
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise the walk goes
/// left when `x[feature[i]] <= threshold[i]`. `value[i]` holds the class
/// distribution (counts or fractions) of node `i`.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<[f64; 2]>,
}

const LEAF: i64 = -1;

impl DecisionTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, tree_index: usize, n_features: usize) -> FraudResult<()> {
        let nodes = self.node_count();
        let bad = |reason: String| FraudError::mismatch(format!("tree {}: {}", tree_index, reason));

        if nodes == 0 {
            return Err(bad("has no nodes".to_string()));
        }
        if self.children_right.len() != nodes
            || self.feature.len() != nodes
            || self.threshold.len() != nodes
            || self.value.len() != nodes
        {
            return Err(bad("node arrays differ in length".to_string()));
        }

        for node in 0..nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                if right != LEAF {
                    return Err(bad(format!("node {} has only a right child", node)));
                }
                let [a, b] = self.value[node];
                if !(a.is_finite() && b.is_finite() && a >= 0.0 && b >= 0.0 && a + b > 0.0) {
                    return Err(bad(format!("leaf {} has no usable class mass", node)));
                }
                continue;
            }

            for child in [left, right] {
                if child <= node as i64 || child as usize >= nodes {
                    return Err(bad(format!("node {} has invalid child {}", node, child)));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(bad(format!("node {} splits on feature {}", node, feature)));
            }
            if self.threshold[node].is_nan() {
                return Err(bad(format!("node {} has a NaN threshold", node)));
            }
        }
        Ok(())
    }

    /// Normalised class distribution of the leaf reached by `features`
    fn leaf_distribution(&self, features: &[f64]) -> [f64; 2] {
        let mut node = 0usize;
        // children always have a larger index than their parent (checked in
        // `validate`), so the walk terminates
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if features[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        let [a, b] = self.value[node];
        let total = a + b;
        [a / total, b / total]
    }
}

/// Parameters of a random forest as stored in the bundle
#[derive(Debug, Clone, Deserialize)]
pub struct ForestSpec {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

/// Random forest: mean of the trees' leaf class distributions
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    pub fn new(spec: ForestSpec) -> FraudResult<Self> {
        if spec.trees.is_empty() {
            return Err(FraudError::mismatch("random forest has no trees"));
        }
        for (index, tree) in spec.trees.iter().enumerate() {
            tree.validate(index, spec.n_features)?;
        }
        Ok(Self {
            n_features: spec.n_features,
            trees: spec.trees,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for ForestClassifier {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_probabilities(&self, features: &[f64]) -> FraudResult<[f64; 2]> {
        check_width(self.name(), self.n_features, features)?;

        let mut sum = [0.0, 0.0];
        for tree in &self.trees {
            let [p0, p1] = tree.leaf_distribution(features);
            sum[0] += p0;
            sum[1] += p1;
        }
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}

/// Parameters of a logistic regression as stored in the bundle
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticSpec {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Logistic regression: `P(fraud) = sigmoid(w.x + b)`
#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticClassifier {
    pub fn new(spec: LogisticSpec) -> FraudResult<Self> {
        if spec.coefficients.is_empty() {
            return Err(FraudError::mismatch("logistic regression has no coefficients"));
        }
        if !spec.intercept.is_finite() || spec.coefficients.iter().any(|w| !w.is_finite()) {
            return Err(FraudError::mismatch(
                "logistic regression has non-finite parameters",
            ));
        }
        Ok(Self {
            coefficients: spec.coefficients,
            intercept: spec.intercept,
        })
    }

    fn decision(&self, features: &[f64]) -> FraudResult<f64> {
        check_width(self.name(), self.coefficients.len(), features)?;
        Ok(self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept)
    }
}

impl Classifier for LogisticClassifier {
    fn name(&self) -> &str {
        "logistic_regression"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_probabilities(&self, features: &[f64]) -> FraudResult<[f64; 2]> {
        let z = self.decision(features)?;
        let p1 = 1.0 / (1.0 + (-z).exp());
        Ok([1.0 - p1, p1])
    }

    fn predict(&self, features: &[f64]) -> FraudResult<u8> {
        Ok(if self.decision(features)? > 0.0 { 1 } else { 0 })
    }
}
