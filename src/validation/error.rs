//! Structured validation error map

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Mapping from a validator-defined key to its error detail
///
/// e.g. `{ "required": true }` or
/// `{ "minLength": { "requiredLength": 5, "actualLength": 4 } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationError(BTreeMap<String, Value>);

impl ValidationError {
    /// Create an error with a single entry
    pub fn new(key: impl Into<String>, detail: impl Into<Value>) -> Self {
        Self::default().with(key, detail)
    }

    /// Add an entry, replacing any previous detail for the key
    pub fn with(mut self, key: impl Into<String>, detail: impl Into<Value>) -> Self {
        self.0.insert(key.into(), detail.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow key union; entries from `other` win on collision
    pub fn merge(&mut self, other: ValidationError) {
        self.0.extend(other.0);
    }
}

impl FromIterator<(String, Value)> for ValidationError {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ValidationError {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
