//! ONNX Runtime backed classifier

use crate::error::{FraudError, FraudResult};
use crate::models::classifier::Classifier;
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::fmt::Display;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Classifier exported to ONNX (e.g. via skl2onnx), evaluated with ONNX Runtime
pub struct OnnxClassifier {
    /// ONNX Runtime session; `run` needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    n_features: usize,
}

fn load_error<E: Display>(path: &Path) -> impl Fn(E) -> FraudError + '_ {
    move |e| FraudError::load("onnx model", path, e)
}

fn inference_error<E: Display>(e: E) -> FraudError {
    FraudError::mismatch(format!("onnx inference failed: {}", e))
}

impl OnnxClassifier {
    /// Load an ONNX model expecting `n_features` float inputs
    pub fn load<P: AsRef<Path>>(path: P, n_features: usize, threads: usize) -> FraudResult<Self> {
        let path = path.as_ref();

        info!(path = %path.display(), threads = threads, "Loading ONNX model");

        let session = Session::builder()
            .map_err(load_error(path))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(load_error(path))?
            .with_intra_threads(threads)
            .map_err(load_error(path))?
            .commit_from_file(path)
            .map_err(load_error(path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        info!(input = %input_name, output = %output_name, "ONNX model loaded");

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            n_features,
        })
    }

    fn run(&self, features: &[f64]) -> FraudResult<f64> {
        let shape = vec![1_i64, features.len() as i64];
        let input: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let tensor = Tensor::from_array((shape, input)).map_err(inference_error)?;

        let mut session = self.session.lock().map_err(inference_error)?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(inference_error)?;
        fraud_probability(&outputs, &self.output_name)
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        "onnx"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_probabilities(&self, features: &[f64]) -> FraudResult<[f64; 2]> {
        if features.len() != self.n_features {
            return Err(FraudError::mismatch(format!(
                "onnx model expects {} features, got {}",
                self.n_features,
                features.len()
            )));
        }
        let p1 = self.run(features)?;
        Ok([1.0 - p1, p1])
    }
}

/// Read P(fraud) from either a `[batch, classes]` tensor output or a
/// `seq(map(int64, float))` output (the zipmap form of sklearn exports)
fn fraud_probability(outputs: &SessionOutputs, output_name: &str) -> FraudResult<f64> {
    if let Some(output) = outputs.get(output_name) {
        if let Some(p) = probability_from_value(output)? {
            return Ok(p);
        }
    }

    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }
        if let Some(p) = probability_from_value(&output)? {
            debug!(output = %name, "Probability read from fallback output");
            return Ok(p);
        }
    }

    Err(FraudError::mismatch("onnx model has no probability output"))
}

fn probability_from_value(output: &DynValue) -> FraudResult<Option<f64>> {
    if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
        let classes = shape.iter().copied().last().unwrap_or(0);
        return Ok(match (classes, data) {
            (c, [_, p1, ..]) if c >= 2 => Some(*p1 as f64),
            (1, [p1, ..]) => Some(*p1 as f64),
            _ => None,
        });
    }

    if DynSequenceValueType::can_downcast(output.dtype()) {
        let allocator = Allocator::default();
        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(inference_error)?;
        let maps = sequence
            .try_extract_sequence::<DynMapValueType>(&allocator)
            .map_err(inference_error)?;
        let Some(first) = maps.first() else {
            return Ok(None);
        };
        let pairs = first
            .try_extract_key_values::<i64, f32>()
            .map_err(inference_error)?;
        if let Some((_, p)) = pairs.iter().find(|(class, _)| *class == 1) {
            return Ok(Some(*p as f64));
        }
        if let Some((_, p)) = pairs.iter().find(|(class, _)| *class == 0) {
            return Ok(Some(1.0 - *p as f64));
        }
    }

    Ok(None)
}
