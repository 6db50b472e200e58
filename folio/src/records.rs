use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One metadata field, either a single string or a list of items.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Whether the field holds no usable content. Whitespace-only strings
    /// and lists of them count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(value) => value.trim().is_empty(),
            Self::List(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }

    /// The field flattened to one string, list items joined by a space.
    pub fn text(&self) -> String {
        match self {
            Self::Single(value) => value.clone(),
            Self::List(items) => items.join(" "),
        }
    }

    /// The field as a list of items, a single string being a list of one.
    pub fn items(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::List(items) => items.iter().map(|item| item.as_str()).collect(),
        }
    }
}

/// Metadata of one document keyed by field name, as extracted by a pipeline
/// or as expected by the ground truth. An absent field and an empty one both
/// mean the document has no value there.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EvaluationRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl EvaluationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// The field's value, `None` when absent or empty.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field).filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, field: &str, value: FieldValue) {
        self.fields.insert(field.to_string(), value);
    }

    pub fn set_single(&mut self, field: &str, value: &str) {
        self.set(field, FieldValue::Single(value.to_string()));
    }

    pub fn set_list(&mut self, field: &str, items: &[&str]) {
        self.set(
            field,
            FieldValue::List(items.iter().map(|item| item.to_string()).collect()),
        );
    }

    /// All stored fields in name order, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}
