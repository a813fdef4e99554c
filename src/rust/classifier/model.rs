use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use ndarray::ArrayView2;
use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{Tensor, ValueType};
use log::info;

use super::error::ClassifierError;
use crate::runtime::{RuntimeConfig, create_session_builder};

/// An inference engine that maps a batch of encoded sequences to class scores.
///
/// Implementations must be shareable across threads; the classifier holds
/// them behind an `Arc` and never mutates them after loading.
pub trait InferenceModel: Send + Sync {
    /// Runs the forward pass on a `(1, max_len)` batch and returns the score
    /// sequence of the single row.
    fn infer(&self, batch: ArrayView2<'_, f32>) -> Result<Vec<f32>, ClassifierError>;

    /// Frees buffers held over from the last `infer` call.
    ///
    /// Called once per prediction after the scores have been copied out.
    fn release_transient(&self) {}
}

/// Element type of the model's first input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Float32,
    Int64,
}

/// An ONNX model loaded through ONNX Runtime.
pub struct OnnxModel {
    session: Session,
    input_name: String,
    input_kind: InputKind,
}

impl fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxModel")
            .field("input_name", &self.input_name)
            .field("input_kind", &self.input_kind)
            .finish()
    }
}

impl OnnxModel {
    pub fn from_file<P: AsRef<Path>>(path: P, config: &RuntimeConfig) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClassifierError::LoadError(format!("Model file not found: {:?}", path)));
        }

        let session = create_session_builder(config)?
            .commit_from_file(path)?;
        let model = Self::from_session(session)?;
        info!("Loaded model from {:?} (input '{}', {:?})", path, model.input_name, model.input_kind);
        Ok(model)
    }

    pub fn from_session(session: Session) -> Result<Self, ClassifierError> {
        Self::validate_model(&session)?;

        let input = &session.inputs[0];
        let input_kind = match input.input_type {
            ValueType::Tensor { ty: TensorElementType::Int64, .. } => InputKind::Int64,
            _ => InputKind::Float32,
        };
        let input_name = input.name.clone();

        Ok(Self { session, input_name, input_kind })
    }

    pub fn input_kind(&self) -> InputKind {
        self.input_kind
    }

    /// Validates that the model has the expected input/output structure
    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        if session.inputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 input for the word index sequence".to_string()
            ));
        }
        if session.outputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 output for class scores".to_string()
            ));
        }
        Ok(())
    }
}

impl InferenceModel for OnnxModel {
    // Session outputs are owned by this call and dropped before it returns.
    fn infer(&self, batch: ArrayView2<'_, f32>) -> Result<Vec<f32>, ClassifierError> {
        let outputs = match self.input_kind {
            InputKind::Float32 => {
                let tensor = Tensor::from_array(batch.to_owned())
                    .map_err(|e| ClassifierError::ModelError(format!("Failed to create input tensor: {}", e)))?;
                let mut inputs = HashMap::new();
                inputs.insert(self.input_name.clone(), tensor);
                self.session.run(inputs)
            }
            InputKind::Int64 => {
                let tensor = Tensor::from_array(batch.mapv(|v| v as i64))
                    .map_err(|e| ClassifierError::ModelError(format!("Failed to create input tensor: {}", e)))?;
                let mut inputs = HashMap::new();
                inputs.insert(self.input_name.clone(), tensor);
                self.session.run(inputs)
            }
        }
        .map_err(|e| ClassifierError::ModelError(format!("Failed to run model: {}", e)))?;

        let scores = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::ModelError(format!("Failed to extract output tensor: {}", e)))?;

        Ok(scores.iter().copied().collect())
    }
}
