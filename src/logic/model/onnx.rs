//! ONNX Classifier - ONNX Runtime Integration
//!
//! Runs a classifier graph exported by the trainer without zipmap:
//! one float input `[1, n_features]`, outputs `label` (int64) and
//! `probabilities` (float `[1, n_classes]`), in that order.

use std::path::Path;

use ndarray::Array2;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;
use parking_lot::Mutex;

use crate::error::{ArtifactLoadError, ModelInvocationError};
use super::classifier::Classifier;

pub struct OnnxClassifier {
    session: Mutex<Session>,
    n_classes: usize,
    model_path: String,
}

impl OnnxClassifier {
    /// Load ONNX model from file
    pub fn load(model_path: &Path, n_classes: usize) -> Result<Self, ArtifactLoadError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ArtifactLoadError::Missing(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| ArtifactLoadError::Onnx(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ArtifactLoadError::Onnx(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ArtifactLoadError::Onnx(format!("Failed to load model: {}", e)))?;

        if session.outputs.len() < 2 {
            return Err(ArtifactLoadError::invalid(
                "classifier",
                "onnx graph must expose label and probability outputs",
            ));
        }

        log::info!("ONNX model loaded successfully");

        Ok(Self {
            session: Mutex::new(session),
            n_classes,
            model_path: model_path.display().to_string(),
        })
    }

    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    /// One session run → (label, probabilities)
    fn run(&self, x: &[f64]) -> Result<(usize, Vec<f64>), ModelInvocationError> {
        let mut session = self.session.lock();

        let input: Vec<f32> = x.iter().map(|v| *v as f32).collect();
        let input_array = Array2::<f32>::from_shape_vec((1, x.len()), input)
            .map_err(|e| ModelInvocationError::Backend(format!("Array error: {}", e)))?;

        // Get output names BEFORE run to avoid borrow conflict
        let label_name = session.outputs[0].name.clone();
        let proba_name = session.outputs[1].name.clone();

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| ModelInvocationError::Backend(format!("Tensor error: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelInvocationError::Backend(format!("Inference failed: {}", e)))?;

        let label = outputs
            .get(&label_name)
            .ok_or_else(|| ModelInvocationError::Backend("No label output".to_string()))?
            .try_extract_tensor::<i64>()
            .map_err(|e| ModelInvocationError::Backend(format!("Extract error: {}", e)))?
            .1
            .first()
            .copied()
            .ok_or_else(|| ModelInvocationError::Backend("Empty label output".to_string()))?;

        let proba: Vec<f64> = outputs
            .get(&proba_name)
            .ok_or_else(|| ModelInvocationError::Backend("No probability output".to_string()))?
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelInvocationError::Backend(format!("Extract error: {}", e)))?
            .1
            .iter()
            .map(|p| *p as f64)
            .collect();

        let index = usize::try_from(label).map_err(|_| ModelInvocationError::ClassIndexOutOfRange {
            index: usize::MAX,
            n_classes: self.n_classes,
        })?;

        Ok((index, proba))
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn n_features(&self) -> Option<usize> {
        None
    }

    fn predict(&self, x: &[f64]) -> Result<usize, ModelInvocationError> {
        self.run(x).map(|(label, _)| label)
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ModelInvocationError> {
        self.run(x).map(|(_, proba)| proba)
    }
}
