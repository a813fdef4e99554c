mod error;
mod metadata;
mod model;
pub mod encoder;
pub mod predictor;
#[allow(clippy::module_inception)]
mod classifier;

pub use error::ClassifierError;
pub use metadata::{Metadata, MAX_VOCABULARY_SIZE};
pub use model::{InferenceModel, InputKind, OnnxModel};
pub use encoder::{encode, normalize, EncodedInput};
pub use predictor::PredictionResult;
pub use classifier::{Classifier, ClassifierState};

/// Vocabulary and input shape of a loaded classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierInfo {
    /// Largest vocabulary index the model accepts
    pub vocabulary_size: u32,
    /// Number of slots in each encoded input
    pub max_len: usize,
    /// Number of words in the word index
    pub vocabulary_entries: usize,
    /// Where the model was loaded from, if it was loaded from a source
    pub model_source: Option<String>,
    /// Where the metadata was loaded from, if it was loaded from a source
    pub metadata_source: Option<String>,
}
