//! export::sequence
//!
//! Flatten configurations into the key/values form consumed by sequence
//! document generation.
//!
//! Each configuration contributes its selections plus one entry mapping
//! its system type path to its template path. Values are collected per key
//! without duplicates, in first-seen order. An entry whose value equals the
//! path part of its key (the text before the first `-`) only echoes the
//! key back and is skipped.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::core::selection::Configuration;

/// Ordered `key -> unique values` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceData {
    entries: Vec<(String, Vec<String>)>,
}

impl SequenceData {
    /// Values collected for a key.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add one key/value pair, honoring the echo and uniqueness rules.
    pub fn insert(&mut self, key: &str, value: String) {
        if key.split('-').next() == Some(value.as_str()) {
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
            None => self.entries.push((key.to_string(), vec![value])),
        }
    }
}

impl Serialize for SequenceData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, values) in &self.entries {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

/// Flatten configurations into sequence data.
pub fn sequence_data<'a, I>(configs: I) -> SequenceData
where
    I: IntoIterator<Item = &'a Configuration>,
{
    let mut data = SequenceData::default();
    for config in configs {
        for (path, value) in config.selections() {
            data.insert(path.as_str(), value_text(value));
        }
        if let Some(system) = config.system_path() {
            data.insert(system.as_str(), config.template_path().to_string());
        }
    }
    data
}

/// Strings are taken verbatim; other JSON values use their literal form.
fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
