//! core::selection::schema
//!
//! Persisted configuration set (v1).
//!
//! A configuration set is a self-describing JSON document holding every
//! configuration of a project, plus the fingerprint of the catalog the
//! selections were made against:
//!
//! ```json
//! {
//!   "kind": "linkage.configuration-set",
//!   "schema_version": 1,
//!   "catalog_fingerprint": "9f2c...",
//!   "configurations": [ ... ]
//! }
//! ```
//!
//! Unknown fields are rejected. The version is checked before the body is
//! parsed so that a future v2 can be dispatched separately.
//!
//! # Example
//!
//! ```
//! use linkage::core::selection::schema::{parse_configuration_set, ConfigurationSetV1};
//! use linkage::core::selection::ConfigurationStore;
//!
//! let set = ConfigurationSetV1::new(&ConfigurationStore::new(), None);
//! let json = set.to_json().unwrap();
//!
//! let parsed = parse_configuration_set(&json).unwrap();
//! assert!(parsed.configurations.is_empty());
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Configuration, ConfigurationStore};
use crate::core::types::Fingerprint;

/// The kind identifier for configuration sets.
pub const CONFIGURATION_SET_KIND: &str = "linkage.configuration-set";

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from reading or writing configuration sets.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse configuration set: {0}")]
    ParseError(String),

    #[error("invalid kind '{found}', expected '{}'", CONFIGURATION_SET_KIND)]
    InvalidKind { found: String },

    #[error("unsupported schema version {0}, supported: {SCHEMA_VERSION}")]
    UnsupportedVersion(u32),

    #[error("invalid configuration set: {0}")]
    InvalidValue(String),

    #[error("failed to serialize configuration set: {0}")]
    SerializeError(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    kind: String,
    schema_version: u32,
}

/// Parse a configuration set with version dispatch.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, the kind or version is wrong,
/// or the set holds duplicate ids or a zero quantity.
pub fn parse_configuration_set(json: &str) -> Result<ConfigurationSetV1, SchemaError> {
    let envelope: Envelope =
        serde_json::from_str(json).map_err(|e| SchemaError::ParseError(e.to_string()))?;

    if envelope.kind != CONFIGURATION_SET_KIND {
        return Err(SchemaError::InvalidKind {
            found: envelope.kind,
        });
    }

    match envelope.schema_version {
        1 => {
            let set: ConfigurationSetV1 =
                serde_json::from_str(json).map_err(|e| SchemaError::ParseError(e.to_string()))?;
            set.validate()?;
            Ok(set)
        }
        v => Err(SchemaError::UnsupportedVersion(v)),
    }
}

/// Configuration set (v1).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigurationSetV1 {
    /// Kind identifier (always "linkage.configuration-set")
    pub kind: String,

    /// Schema version (always 1 for this struct)
    pub schema_version: u32,

    /// Fingerprint of the catalog the selections were made against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_fingerprint: Option<Fingerprint>,

    pub configurations: Vec<Configuration>,
}

impl ConfigurationSetV1 {
    /// Snapshot a store.
    pub fn new(store: &ConfigurationStore, catalog_fingerprint: Option<Fingerprint>) -> Self {
        Self {
            kind: CONFIGURATION_SET_KIND.to_string(),
            schema_version: SCHEMA_VERSION,
            catalog_fingerprint,
            configurations: store.iter().cloned().collect(),
        }
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SchemaError> {
        serde_json::to_string_pretty(self).map_err(|e| SchemaError::SerializeError(e.to_string()))
    }

    /// Turn the set into a working store.
    pub fn into_store(self) -> ConfigurationStore {
        ConfigurationStore::from_configurations(self.configurations)
    }

    /// Whether the set was saved against the given catalog.
    ///
    /// A set with no recorded fingerprint matches any catalog. A mismatch
    /// is logged; selections may be stale but are still usable.
    pub fn matches_catalog(&self, current: &Fingerprint) -> bool {
        match &self.catalog_fingerprint {
            None => true,
            Some(saved) if saved == current => true,
            Some(saved) => {
                tracing::warn!(
                    saved = %saved,
                    current = %current,
                    "configuration set was saved against a different catalog"
                );
                false
            }
        }
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for config in &self.configurations {
            if !seen.insert(config.id()) {
                return Err(SchemaError::InvalidValue(format!(
                    "duplicate configuration id {}",
                    config.id()
                )));
            }
            if config.quantity() == 0 {
                return Err(SchemaError::InvalidValue(format!(
                    "configuration {} has quantity 0",
                    config.id()
                )));
            }
        }
        Ok(())
    }
}
