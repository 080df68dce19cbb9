//! Loosely-typed translation dictionaries and dotted-path resolution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier for a language's dictionary (e.g. `"ru"`, `"en"`).
///
/// Identifiers are opaque to this crate: they are whatever keys the
/// embedding page uses for its dictionaries and its locale marker suffix.
pub type Language = String;

/// Errors from building a dictionary out of raw payload data.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// The payload root was not a key/value table.
    #[error("translation payload root must be an object, got {0}")]
    NotATable(&'static str),
}

/// A single value in a translation tree.
///
/// Translation payloads are loosely typed: alongside displayable strings
/// and nested tables they may carry numbers, booleans, arrays or nulls.
/// Those deserialize as [`TranslationValue::Opaque`] so a payload always
/// round-trips, but resolution treats them exactly like a missing key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationValue {
    /// A displayable leaf string.
    Text(String),
    /// A nested table of further values.
    Table(HashMap<String, TranslationValue>),
    /// Any other payload. Never displayable.
    Opaque(serde_json::Value),
}

impl TranslationValue {
    fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => Self::Text(text),
            serde_json::Value::Object(map) => Self::Table(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            ),
            other => Self::Opaque(other),
        }
    }
}

impl From<&str> for TranslationValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for TranslationValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// The translation tree for one language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    entries: HashMap<String, TranslationValue>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a top-level entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TranslationValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Looks up a top-level entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TranslationValue> {
        self.entries.get(key)
    }

    /// Number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a dot-separated path (e.g. `"nav.home.label"`) to a leaf
    /// string.
    ///
    /// The path is split on `'.'` and folded left to right, descending
    /// only through [`TranslationValue::Table`] values by own key. Any
    /// missing key or non-table intermediate short-circuits to `None`,
    /// and a final value of any type other than
    /// [`TranslationValue::Text`] is `None` as well. Empty segments from
    /// leading, trailing or doubled dots are ordinary missing keys.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&str> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.entries.get(first)?;

        for segment in segments {
            match current {
                TranslationValue::Table(table) => current = table.get(segment)?,
                _ => return None,
            }
        }

        match current {
            TranslationValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl TryFrom<serde_json::Value> for Dictionary {
    type Error = DictionaryError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => Ok(Self {
                entries: map
                    .into_iter()
                    .map(|(key, value)| (key, TranslationValue::from_json(value)))
                    .collect(),
            }),
            other => Err(DictionaryError::NotATable(json_kind(&other))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
