//! Sample passages offered by the demo front end.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use lazy_static::lazy_static;

use crate::classifier::ClassifierError;

pub const DEFAULT_EXAMPLE: &str = "example1";

lazy_static! {
    static ref BUILTIN_EXAMPLES: BTreeMap<String, String> = {
        let mut examples = BTreeMap::new();
        examples.insert(
            "example1".to_string(),
            "_That_ is my idea of good breeding; and those persons who fancy themselves very important, \
             and never open their mouths, quite mistake the matter.” “Did Charlotte dine with you?” \
             “No, she would go home".to_string(),
        );
        examples.insert(
            "example2".to_string(),
            "I wished to see him again, that I might wreak the utmost extent of abhorrence on his head \
             and avenge the deaths of William and Justine".to_string(),
        );
        examples.insert(
            "example3".to_string(),
            "I observed with assumed innocence that no man was safe from trouble in this world".to_string(),
        );
        examples
    };
}

/// A key → text table of sample inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleTexts {
    texts: BTreeMap<String, String>,
}

impl Default for ExampleTexts {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ExampleTexts {
    pub fn builtin() -> Self {
        Self { texts: BUILTIN_EXAMPLES.clone() }
    }

    pub fn new(texts: BTreeMap<String, String>) -> Self {
        Self { texts }
    }

    /// Reads a JSON object mapping example keys to texts.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ClassifierError::LoadError(format!("Failed to read examples {:?}: {}", path, e)))?;
        let texts = serde_json::from_str(&json)
            .map_err(|e| ClassifierError::LoadError(format!("Failed to parse examples {:?}: {}", path, e)))?;
        Ok(Self { texts })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.texts.get(key).map(String::as_str)
    }

    /// Picks the text to classify first: explicit text wins, otherwise the
    /// example stored under `key`.
    pub fn initial_text(&self, text: Option<&str>, key: &str) -> Result<String, ClassifierError> {
        if let Some(text) = text {
            return Ok(text.to_string());
        }
        self.get(key)
            .map(str::to_owned)
            .ok_or_else(|| ClassifierError::ValidationError(format!(
                "Unknown example '{}' (available: {})",
                key,
                self.keys().collect::<Vec<_>>().join(", ")
            )))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.texts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
