use std::fmt;
use std::sync::Arc;
use log::{debug, error, info};

use super::encoder::{encode, EncodedInput};
use super::error::ClassifierError;
use super::metadata::Metadata;
use super::model::InferenceModel;
use super::predictor::{self, PredictionResult};
use crate::model_manager::{ModelManager, ModelSources};
use crate::runtime::RuntimeConfig;

/// Lifecycle of a [`Classifier`]. A failed load stays in `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierState {
    Uninitialized,
    Loading,
    Ready,
}

/// A text classifier over a fixed-length word-index model.
///
/// The model and metadata are loaded once and are read-only afterwards, so a
/// ready classifier can be shared across threads with `Arc` and `predict`
/// called concurrently.
///
/// ```no_run
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// use wordseq::{Classifier, ModelManager, ModelSources};
///
/// let manager = ModelManager::new_default()?;
/// let mut classifier = Classifier::new();
/// classifier
///     .init(ModelSources::new("model_js/model.onnx", "model_js/metadata.json"), &manager)
///     .await?;
///
/// let result = classifier.predict("I observed with assumed innocence")?;
/// println!("{}", result);
/// # Ok(())
/// # }
/// ```
pub struct Classifier {
    state: ClassifierState,
    sources: Option<ModelSources>,
    metadata: Option<Arc<Metadata>>,
    model: Option<Arc<dyn InferenceModel>>,
    status: String,
    runtime_config: RuntimeConfig,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    #[allow(dead_code)]
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("state", &self.state)
            .field("sources", &self.sources)
            .field("status", &self.status)
            .field("max_len", &self.metadata.as_ref().map(|m| m.max_len))
            .finish()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            state: ClassifierState::Uninitialized,
            sources: None,
            metadata: None,
            model: None,
            status: "Standing by.".to_string(),
            runtime_config: RuntimeConfig::default(),
        }
    }

    /// Sets the runtime configuration used when the ONNX model is loaded
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Builds a ready classifier from a model that is already in memory.
    pub fn from_parts(model: Arc<dyn InferenceModel>, metadata: Metadata) -> Result<Self, ClassifierError> {
        let mut classifier = Self::new();
        classifier.state = ClassifierState::Loading;
        classifier.complete_loading(model, metadata)?;
        Ok(classifier)
    }

    pub fn state(&self) -> ClassifierState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ClassifierState::Ready
    }

    /// The latest human-readable status line
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_deref()
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = text.into();
        info!("{}", self.status);
    }

    /// Moves an uninitialized classifier into `Loading`.
    pub fn begin_loading(&mut self, sources: ModelSources) -> Result<(), ClassifierError> {
        if self.state != ClassifierState::Uninitialized {
            return Err(ClassifierError::ValidationError(
                format!("Cannot start loading from state {:?}", self.state)
            ));
        }
        self.state = ClassifierState::Loading;
        self.sources = Some(sources);
        Ok(())
    }

    /// Moves a loading classifier into `Ready` once both parts are available.
    pub fn complete_loading(&mut self, model: Arc<dyn InferenceModel>, metadata: Metadata) -> Result<(), ClassifierError> {
        if self.state != ClassifierState::Loading {
            return Err(ClassifierError::ValidationError(
                format!("Cannot finish loading from state {:?}", self.state)
            ));
        }
        metadata.validate()?;
        info!("maxLen = {}", metadata.max_len);

        self.metadata = Some(Arc::new(metadata));
        self.model = Some(model);
        self.state = ClassifierState::Ready;
        Ok(())
    }

    /// Records a load failure. The classifier stays in `Loading`.
    pub fn fail_loading(&mut self, message: impl Into<String>) {
        self.set_status(message);
    }

    /// Loads the model, then the metadata, and becomes ready.
    ///
    /// On failure the error is logged, the status line describes it and the
    /// classifier stays in `Loading`; there is no retry.
    pub async fn init(&mut self, sources: ModelSources, manager: &ModelManager) -> Result<(), ClassifierError> {
        self.begin_loading(sources.clone())?;

        self.set_status(format!("Loading pretrained model from {}", sources.model));
        let model = match manager.load_model(&sources, &self.runtime_config).await {
            Ok(model) => model,
            Err(e) => {
                error!("{}", e);
                self.fail_loading("Loading pretrained model failed.");
                return Err(e);
            }
        };
        self.set_status("Done loading pretrained model.");

        self.set_status(format!("Loading metadata from {}", sources.metadata));
        let metadata = match manager.load_metadata(&sources.metadata).await {
            Ok(metadata) => metadata,
            Err(e) => {
                error!("{}", e);
                self.fail_loading("Loading metadata failed.");
                return Err(e);
            }
        };
        self.set_status("Done loading metadata.");

        self.complete_loading(Arc::new(model), metadata)
    }

    /// Returns vocabulary size, max length and sources once ready
    pub fn info(&self) -> Option<super::ClassifierInfo> {
        let metadata = self.metadata.as_ref()?;
        Some(super::ClassifierInfo {
            vocabulary_size: metadata.vocabulary_size,
            max_len: metadata.max_len,
            vocabulary_entries: metadata.word_index.len(),
            model_source: self.sources.as_ref().map(|s| s.model.to_string()),
            metadata_source: self.sources.as_ref().map(|s| s.metadata.to_string()),
        })
    }

    fn ready_parts(&self) -> Result<(&Metadata, &dyn InferenceModel), ClassifierError> {
        match (&self.metadata, &self.model) {
            (Some(metadata), Some(model)) if self.is_ready() => Ok((metadata.as_ref(), model.as_ref())),
            _ => Err(ClassifierError::NotReady(format!("state is {:?}", self.state))),
        }
    }

    /// Encodes text with the loaded vocabulary without running the model
    pub fn encode(&self, text: &str) -> Result<EncodedInput, ClassifierError> {
        let (metadata, _) = self.ready_parts()?;
        Ok(encode(text, metadata))
    }

    /// Encodes the text and runs the model on it.
    ///
    /// Any text is accepted: unknown words, empty input and over-long input
    /// degrade to a partially or fully zero input rather than an error. The
    /// reported time covers the forward pass only.
    pub fn predict(&self, text: &str) -> Result<PredictionResult, ClassifierError> {
        let (metadata, model) = self.ready_parts()?;
        let input = encode(text, metadata);
        debug!("Encoded input: {:?}", input.as_slice());
        predictor::predict(model, &input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use ndarray::ArrayView2;

    struct FirstSlotModel;

    impl InferenceModel for FirstSlotModel {
        fn infer(&self, batch: ArrayView2<'_, f32>) -> Result<Vec<f32>, ClassifierError> {
            Ok(vec![batch[[0, 0]], batch[[0, 1]]])
        }
    }

    fn metadata() -> Metadata {
        let word_index = HashMap::from([("good".to_string(), 3), ("breeding".to_string(), 12)]);
        Metadata::new(50, 10, word_index).unwrap()
    }

    #[test]
    fn test_state_transitions() -> Result<(), ClassifierError> {
        let mut classifier = Classifier::new();
        assert_eq!(classifier.state(), ClassifierState::Uninitialized);
        assert!(matches!(classifier.predict("good"), Err(ClassifierError::NotReady(_))));

        classifier.begin_loading(ModelSources::new("model.onnx", "metadata.json"))?;
        assert_eq!(classifier.state(), ClassifierState::Loading);
        assert!(classifier.begin_loading(ModelSources::new("a", "b")).is_err());
        assert!(classifier.info().is_none());

        classifier.complete_loading(Arc::new(FirstSlotModel), metadata())?;
        assert!(classifier.is_ready());
        assert!(classifier.complete_loading(Arc::new(FirstSlotModel), metadata()).is_err());

        let result = classifier.predict("Good breeding!")?;
        assert_eq!(result.score, vec![3.0, 12.0]);
        Ok(())
    }

    #[test]
    fn test_failed_load_stays_loading() {
        let mut classifier = Classifier::new();
        classifier.begin_loading(ModelSources::new("model.onnx", "metadata.json")).unwrap();
        classifier.fail_loading("Loading metadata failed.");
        assert_eq!(classifier.state(), ClassifierState::Loading);
        assert_eq!(classifier.status(), "Loading metadata failed.");
        assert!(matches!(classifier.predict("good"), Err(ClassifierError::NotReady(_))));
    }

    #[tokio::test]
    async fn test_init_with_missing_model() {
        let dir = std::env::temp_dir().join("test-wordseq").join("classifier-init");
        let manager = ModelManager::new(&dir).unwrap();
        let missing: PathBuf = dir.join("absent.onnx");
        let sources = ModelSources::new(missing.to_str().unwrap(), "metadata.json");

        let mut classifier = Classifier::new();
        let result = classifier.init(sources, &manager).await;
        assert!(matches!(result, Err(ClassifierError::LoadError(_))));
        assert_eq!(classifier.state(), ClassifierState::Loading);
        assert_eq!(classifier.status(), "Loading pretrained model failed.");
    }

    #[test]
    fn test_info_from_parts() {
        let classifier = Classifier::from_parts(Arc::new(FirstSlotModel), metadata()).unwrap();
        let info = classifier.info().unwrap();
        assert_eq!(info.vocabulary_size, 50);
        assert_eq!(info.max_len, 10);
        assert_eq!(info.vocabulary_entries, 2);
        assert_eq!(info.model_source, None);
        assert_eq!(classifier.encode("breeding").unwrap().as_slice()[0], 12);
    }
}
