use std::collections::HashMap;
use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;

/// Largest vocabulary size whose indices survive the `f32` model batch
/// unchanged (every integer up to 2^24 is exact in `f32`).
pub const MAX_VOCABULARY_SIZE: u32 = 1 << 24;

/// Vocabulary and input shape of a pretrained sequence classifier.
///
/// Deserialized from the metadata document that ships next to the model:
///
/// ```
/// use wordseq::Metadata;
///
/// let metadata = Metadata::from_json_str(
///     r#"{"vocabulary_size": 50, "max_len": 10, "word_index": {"good": 3}}"#
/// ).unwrap();
/// assert_eq!(metadata.max_len, 10);
/// assert_eq!(metadata.index_of("good"), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Largest index the model's embedding layer accepts
    pub vocabulary_size: u32,
    /// Number of slots in the model's input sequence
    pub max_len: usize,
    /// Lowercase word to vocabulary index
    pub word_index: HashMap<String, u32>,
}

impl Metadata {
    pub fn new(vocabulary_size: u32, max_len: usize, word_index: HashMap<String, u32>) -> Result<Self, ClassifierError> {
        let metadata = Self { vocabulary_size, max_len, word_index };
        metadata.validate()?;
        Ok(metadata)
    }

    /// Parses and validates a metadata JSON document. Unknown fields are ignored.
    pub fn from_json_str(json: &str) -> Result<Self, ClassifierError> {
        let metadata: Metadata = serde_json::from_str(json)
            .map_err(|e| ClassifierError::LoadError(format!("Failed to parse metadata: {}", e)))?;
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ClassifierError::LoadError(format!("Failed to read metadata {:?}: {}", path, e)))?;
        Self::from_json_str(&json)
    }

    pub(crate) fn validate(&self) -> Result<(), ClassifierError> {
        if self.max_len == 0 {
            return Err(ClassifierError::ValidationError("max_len must be greater than zero".into()));
        }
        if self.vocabulary_size > MAX_VOCABULARY_SIZE {
            return Err(ClassifierError::ValidationError(format!(
                "vocabulary_size {} exceeds the largest exact index {}",
                self.vocabulary_size, MAX_VOCABULARY_SIZE
            )));
        }
        Ok(())
    }

    pub fn index_of(&self, word: &str) -> Option<u32> {
        self.word_index.get(word).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_extra_fields() {
        let metadata = Metadata::from_json_str(
            r#"{"vocabulary_size": 20000, "max_len": 100, "word_index": {"the": 1, "of": 2}, "epochs": 5}"#
        ).unwrap();
        assert_eq!(metadata.vocabulary_size, 20000);
        assert_eq!(metadata.max_len, 100);
        assert_eq!(metadata.word_index.len(), 2);
        assert_eq!(metadata.index_of("of"), Some(2));
        assert_eq!(metadata.index_of("missing"), None);
    }

    #[test]
    fn test_zero_max_len_rejected() {
        let result = Metadata::from_json_str(r#"{"vocabulary_size": 5, "max_len": 0, "word_index": {}}"#);
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
        assert!(Metadata::new(5, 0, HashMap::new()).is_err());
    }

    #[test]
    fn test_vocabulary_size_bounded_by_exact_f32_range() {
        assert!(Metadata::new(MAX_VOCABULARY_SIZE, 10, HashMap::new()).is_ok());
        let result = Metadata::from_json_str(
            r#"{"vocabulary_size": 16777217, "max_len": 10, "word_index": {"rare": 16777217}}"#
        );
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
        // the bound is the last integer f32 represents without rounding
        assert_eq!(MAX_VOCABULARY_SIZE as f32 as i64, MAX_VOCABULARY_SIZE as i64);
        assert_ne!((MAX_VOCABULARY_SIZE + 1) as f32 as i64, (MAX_VOCABULARY_SIZE + 1) as i64);
    }

    #[test]
    fn test_missing_field_is_load_error() {
        let result = Metadata::from_json_str(r#"{"vocabulary_size": 5, "word_index": {}}"#);
        assert!(matches!(result, Err(ClassifierError::LoadError(_))));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let result = Metadata::from_file("/nonexistent/wordseq/metadata.json");
        assert!(matches!(result, Err(ClassifierError::LoadError(_))));
    }
}
