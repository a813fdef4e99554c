use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use ndarray::ArrayView2;
use wordseq::{Classifier, ClassifierError, ClassifierState, InferenceModel, Metadata, ModelSources};

/// Two-class stand-in for a trained model: class 1 grows with the number of
/// filled slots, class 0 shrinks.
struct CountingModel;

impl InferenceModel for CountingModel {
    fn infer(&self, batch: ArrayView2<'_, f32>) -> Result<Vec<f32>, ClassifierError> {
        let filled = batch.iter().filter(|&&slot| slot != 0.0).count() as f32;
        let ratio = filled / batch.ncols() as f32;
        Ok(vec![1.0 - ratio, ratio])
    }
}

fn setup_test_classifier() -> Classifier {
    let word_index = HashMap::from([
        ("good".to_string(), 3),
        ("breeding".to_string(), 12),
        ("innocence".to_string(), 27),
    ]);
    let metadata = Metadata::new(50, 10, word_index).unwrap();
    Classifier::from_parts(Arc::new(CountingModel), metadata).expect("Failed to create classifier")
}

#[test]
fn test_predict_scores() -> Result<(), ClassifierError> {
    let classifier = setup_test_classifier();
    let result = classifier.predict("good breeding.")?;
    assert_eq!(result.score.len(), 2);
    assert!((result.score[0] - 0.8).abs() < 1e-6);
    assert!((result.score[1] - 0.2).abs() < 1e-6);
    assert_eq!(result.top_class(), Some(0));
    assert!(result.elapsed_ms >= 0.0);
    Ok(())
}

#[test]
fn test_permissive_inputs() -> Result<(), ClassifierError> {
    let classifier = setup_test_classifier();

    // empty, unknown-only and over-long input all produce a result
    assert_eq!(classifier.predict("")?.score, vec![1.0, 0.0]);
    assert_eq!(classifier.predict("nothing here is known")?.score, vec![1.0, 0.0]);

    let long_text = "good ".repeat(1000);
    let result = classifier.predict(&long_text)?;
    assert_eq!(result.score, vec![0.0, 1.0]);
    Ok(())
}

#[test]
fn test_predict_before_ready() {
    let mut classifier = Classifier::new();
    assert!(matches!(classifier.predict("good"), Err(ClassifierError::NotReady(_))));

    classifier.begin_loading(ModelSources::new("model.onnx", "metadata.json")).unwrap();
    assert_eq!(classifier.state(), ClassifierState::Loading);
    assert!(matches!(classifier.predict("good"), Err(ClassifierError::NotReady(_))));
}

#[test]
fn test_invalid_metadata_rejected() {
    let metadata: Metadata = serde_json::from_str(
        r#"{"vocabulary_size": 10, "max_len": 0, "word_index": {}}"#
    ).unwrap();
    let result = Classifier::from_parts(Arc::new(CountingModel), metadata);
    assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
}

#[test]
fn test_repeated_predictions_are_independent() -> Result<(), ClassifierError> {
    let classifier = setup_test_classifier();
    let first = classifier.predict("good breeding")?;
    classifier.predict("innocence")?;
    let again = classifier.predict("good breeding")?;
    assert_eq!(first.score, again.score);
    Ok(())
}

#[test]
fn test_thread_safety() {
    let classifier = Arc::new(setup_test_classifier());
    let mut handles = vec![];

    for _ in 0..3 {
        let classifier = Arc::clone(&classifier);
        let handle = thread::spawn(move || {
            let result = classifier.predict("good breeding");
            assert!(result.is_ok());
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}
