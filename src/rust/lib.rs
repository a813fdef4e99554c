//! Text classification over fixed-length word-index models.
//!
//! Text is normalized, split into words, mapped through the model's
//! vocabulary and packed into a zero-padded sequence of `max_len` indices.
//! The sequence is fed to an ONNX model and the raw class scores come back
//! together with the time spent in the forward pass.
//!
//! # Basic Usage
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use wordseq::{Classifier, ModelManager, ModelSources};
//!
//! let manager = ModelManager::new_default()?;
//! let mut classifier = Classifier::new();
//! classifier
//!     .init(ModelSources::new("model_js/model.onnx", "model_js/metadata.json"), &manager)
//!     .await?;
//!
//! let result = classifier.predict("That is my idea of good breeding.")?;
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```
//!
//! # Encoding Only
//!
//! ```rust
//! use std::collections::HashMap;
//! use wordseq::{encode, Metadata};
//!
//! let word_index = HashMap::from([("good".to_string(), 3), ("breeding".to_string(), 12)]);
//! let metadata = Metadata::new(50, 10, word_index).unwrap();
//!
//! let encoded = encode("good breeding.", &metadata);
//! assert_eq!(encoded.as_slice(), &[3, 12, 0, 0, 0, 0, 0, 0, 0, 0]);
//! ```
//!
//! # Thread Safety
//!
//! A ready [`Classifier`] is `Send + Sync`; wrap it in `Arc` to predict from
//! several threads.

pub mod classifier;
pub mod examples;
mod runtime;
pub mod model_manager;

pub use classifier::{
    encode, normalize, Classifier, ClassifierError, ClassifierInfo, ClassifierState, EncodedInput,
    InferenceModel, InputKind, Metadata, OnnxModel, PredictionResult, MAX_VOCABULARY_SIZE,
};
pub use examples::ExampleTexts;
pub use runtime::{RuntimeConfig, create_session_builder};
pub use model_manager::{ModelManager, ModelError, ModelSource, ModelSources};

pub fn init_logger() {
    env_logger::init();
}
