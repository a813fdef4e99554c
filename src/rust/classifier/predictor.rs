use std::fmt;
use std::time::Instant;
use log::debug;

use super::encoder::EncodedInput;
use super::error::ClassifierError;
use super::model::InferenceModel;

/// Class scores for one input and the time spent inside the model.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub score: Vec<f32>,
    pub elapsed_ms: f64,
}

impl PredictionResult {
    /// Index of the highest score, or `None` for an empty score vector.
    pub fn top_class(&self) -> Option<usize> {
        self.score.iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(index, _)| index)
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class scores: ")?;
        for (index, score) in self.score.iter().enumerate() {
            write!(f, "{} ->  {:.3}, ", index, score)?;
        }
        write!(f, " elapsed: {:.3} ms", self.elapsed_ms)
    }
}

/// Runs the model on an encoded input and times the forward pass.
///
/// Only the `infer` call and the release of its transient buffers are timed;
/// building the batch happens before the clock starts. Transient buffers are
/// released whether or not inference succeeded.
pub fn predict(model: &dyn InferenceModel, input: &EncodedInput) -> Result<PredictionResult, ClassifierError> {
    let batch = input.to_batch();

    let begin = Instant::now();
    let score = model.infer(batch.view());
    model.release_transient();
    let score = score?;
    let elapsed_ms = begin.elapsed().as_secs_f64() * 1000.0;

    debug!("Inference returned {} scores in {:.3} ms", score.len(), elapsed_ms);
    Ok(PredictionResult { score, elapsed_ms })
}
