use ort::Error as OrtError;
use std::fmt;

use crate::model_manager::ModelError as SourceError;

/// Represents the different types of errors that can occur in the text classifier.
#[derive(Debug)]
pub enum ClassifierError {
    /// Error occurred while fetching or parsing the model or its metadata
    LoadError(String),
    /// Error occurred while building or running the ONNX model
    ModelError(String),
    /// Error occurred due to invalid metadata or input parameters
    ValidationError(String),
    /// Prediction was requested before loading finished
    NotReady(String),
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadError(msg) => write!(f, "Load error: {}", msg),
            Self::ModelError(msg) => write!(f, "Model error: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::NotReady(msg) => write!(f, "Classifier not ready: {}", msg),
        }
    }
}

impl std::error::Error for ClassifierError {}

impl From<OrtError> for ClassifierError {
    fn from(err: OrtError) -> Self {
        ClassifierError::ModelError(err.to_string())
    }
}

impl From<SourceError> for ClassifierError {
    fn from(err: SourceError) -> Self {
        ClassifierError::LoadError(err.to_string())
    }
}
