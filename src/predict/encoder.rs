use std::collections::HashMap;

use serde::Deserialize;

/// Maps each label of a fixed vocabulary to its position in that vocabulary.
///
/// Deserializes from `{ "classes": [...] }`; duplicate labels are rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "EncoderDocument")]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct EncoderDocument {
    classes: Vec<String>,
}

impl TryFrom<EncoderDocument> for LabelEncoder {
    type Error = String;

    fn try_from(doc: EncoderDocument) -> Result<Self, Self::Error> {
        LabelEncoder::new(doc.classes)
    }
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self, String> {
        if classes.is_empty() {
            return Err("encoder has no classes".to_string());
        }
        let mut index = HashMap::with_capacity(classes.len());
        for (code, label) in classes.iter().enumerate() {
            if index.insert(label.clone(), code).is_some() {
                return Err(format!("duplicate encoder class '{label}'"));
            }
        }
        Ok(LabelEncoder { classes, index })
    }

    /// The trained vocabulary, in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// The vocabulary sorted for display.
    pub fn sorted_classes(&self) -> Vec<String> {
        let mut sorted = self.classes().to_vec();
        sorted.sort();
        sorted
    }

    /// Code assigned to `label`, or `None` for a label outside the vocabulary.
    pub fn encode(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }
}
