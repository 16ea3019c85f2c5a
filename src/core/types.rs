//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ModelicaPath`] - Validated hierarchical path identifier
//! - [`OptionKind`] - Closed classification of an option's type
//! - [`ConfigId`] - Identity of a user configuration
//! - [`UtcTimestamp`] - RFC3339 timestamp
//! - [`Fingerprint`] - Structural catalog hash for staleness detection
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so the catalog and resolver never have to
//! re-check them.
//!
//! # Examples
//!
//! ```
//! use linkage::core::types::{ModelicaPath, OptionKind};
//!
//! let path = ModelicaPath::new("Buildings.Templates.AirHandlersFans.VAVMultiZone").unwrap();
//! assert_eq!(path.last_segment(), "VAVMultiZone");
//!
//! assert!(OptionKind::from_type_name("Real").is_primitive());
//! assert!(!OptionKind::from_type_name("dropdown").is_primitive());
//!
//! assert!(ModelicaPath::new("").is_err());
//! assert!(ModelicaPath::new("a..b").is_err());
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid configuration id: {0}")]
    InvalidConfigId(String),
}

/// A validated hierarchical path identifier (`modelicaPath`).
///
/// Paths are `.`-delimited segments:
/// - Cannot be empty
/// - Cannot start or end with `.`
/// - Cannot contain `..` (empty segment)
/// - Cannot contain whitespace or control characters
///
/// # Example
///
/// ```
/// use linkage::core::types::ModelicaPath;
///
/// let path = ModelicaPath::new("Buildings.Templates.Components.Fans").unwrap();
/// assert_eq!(path.last_segment(), "Fans");
/// assert_eq!(path.parent().unwrap().as_str(), "Buildings.Templates.Components");
///
/// // Single-segment paths are allowed (hand-written catalogs use them)
/// let short = ModelicaPath::new("1").unwrap();
/// assert_eq!(short.last_segment(), "1");
/// assert!(short.parent().is_none());
///
/// assert!(ModelicaPath::new(".hidden").is_err());
/// assert!(ModelicaPath::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelicaPath(String);

impl ModelicaPath {
    /// Segment delimiter.
    pub const DELIMITER: char = '.';

    /// Create a new validated path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPath` if the path is empty or malformed.
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        Self::validate(&path)?;
        Ok(Self(path))
    }

    fn validate(path: &str) -> Result<(), TypeError> {
        if path.is_empty() {
            return Err(TypeError::InvalidPath("path cannot be empty".into()));
        }
        if path.starts_with(Self::DELIMITER) || path.ends_with(Self::DELIMITER) {
            return Err(TypeError::InvalidPath(format!(
                "path '{}' cannot start or end with '.'",
                path
            )));
        }
        if path.contains("..") {
            return Err(TypeError::InvalidPath(format!(
                "path '{}' cannot contain an empty segment",
                path
            )));
        }
        if path.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidPath(format!(
                "path '{}' cannot contain whitespace or control characters",
                path
            )));
        }
        Ok(())
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The substring after the final `.` (the whole path if there is none).
    pub fn last_segment(&self) -> &str {
        last_segment(&self.0)
    }

    /// The path with its last segment removed, if it has more than one.
    pub fn parent(&self) -> Option<ModelicaPath> {
        self.0
            .rsplit_once(Self::DELIMITER)
            .map(|(parent, _)| ModelicaPath(parent.to_string()))
    }

    /// Iterate over the path's segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(Self::DELIMITER)
    }
}

/// The substring after the final `.` of any string.
///
/// Used where the input is not guaranteed to be a valid path (raw type
/// names, dangling references in export).
pub fn last_segment(s: &str) -> &str {
    s.rsplit(ModelicaPath::DELIMITER).next().unwrap_or(s)
}

impl TryFrom<String> for ModelicaPath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModelicaPath> for String {
    fn from(path: ModelicaPath) -> Self {
        path.0
    }
}

impl AsRef<str> for ModelicaPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ModelicaPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelicaPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of an option node's type.
///
/// The catalog document stores a free-form type string; this is the closed
/// set the resolver reasons about. Scalar kinds are leaves and never
/// recurse into child references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "type")]
pub enum OptionKind {
    String,
    Integer,
    Real,
    Boolean,
    /// A medium (fluid) reference, e.g. `MediumAir`
    Medium,
    Dropdown,
    Final,
    Enum,
    /// Any other type reference, kept verbatim
    Class(String),
}

impl OptionKind {
    /// Classify a raw type string from a catalog document.
    ///
    /// # Example
    ///
    /// ```
    /// use linkage::core::types::OptionKind;
    ///
    /// assert_eq!(OptionKind::from_type_name("checkbox"), OptionKind::Boolean);
    /// assert_eq!(OptionKind::from_type_name("MediumWater"), OptionKind::Medium);
    /// assert_eq!(
    ///     OptionKind::from_type_name("Buildings.Templates.Components.Fans.SingleVariable"),
    ///     OptionKind::Class("Buildings.Templates.Components.Fans.SingleVariable".into()),
    /// );
    /// ```
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "String" | "string" => OptionKind::String,
            "Integer" | "integer" => OptionKind::Integer,
            "Real" | "real" => OptionKind::Real,
            "Boolean" | "boolean" | "checkbox" => OptionKind::Boolean,
            "dropdown" => OptionKind::Dropdown,
            "final" => OptionKind::Final,
            "enum" => OptionKind::Enum,
            t if t.starts_with("Medium") => OptionKind::Medium,
            t => OptionKind::Class(t.to_string()),
        }
    }

    /// Scalar kinds are resolved as leaves.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            OptionKind::String
                | OptionKind::Integer
                | OptionKind::Real
                | OptionKind::Boolean
                | OptionKind::Medium
        )
    }

    /// Short display name.
    pub fn as_str(&self) -> &str {
        match self {
            OptionKind::String => "string",
            OptionKind::Integer => "integer",
            OptionKind::Real => "real",
            OptionKind::Boolean => "boolean",
            OptionKind::Medium => "medium",
            OptionKind::Dropdown => "dropdown",
            OptionKind::Final => "final",
            OptionKind::Enum => "enum",
            OptionKind::Class(path) => last_segment(path),
        }
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a user configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigId(Uuid);

impl ConfigId {
    /// Generate a fresh random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identity from its hyphenated string form.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidConfigId` if the string is not a UUID.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| TypeError::InvalidConfigId(format!("'{}': {}", s, e)))
    }
}

impl Default for ConfigId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConfigId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UTC timestamp in RFC3339 format.
///
/// # Example
///
/// ```
/// use linkage::core::types::UtcTimestamp;
///
/// let now = UtcTimestamp::now();
/// assert!(now.to_string().ends_with("+00:00"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// A stable hash over the structural content of a catalog.
///
/// Saved alongside configurations so that a selection made against one
/// catalog release can be flagged when loaded against another.
///
/// # Example
///
/// ```
/// use linkage::core::types::Fingerprint;
///
/// let a = Fingerprint::compute(["b\0dropdown", "a\0final"]);
/// let b = Fingerprint::compute(["a\0final", "b\0dropdown"]);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute a fingerprint from a set of entry lines.
    ///
    /// Entries are sorted before hashing so the result does not depend on
    /// input order.
    pub fn compute<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorted: Vec<S> = entries.into_iter().collect();
        sorted.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));

        let mut hasher = Sha256::new();
        for entry in &sorted {
            hasher.update(entry.as_ref().as_bytes());
            hasher.update(b"\n");
        }

        Self(hex::encode(hasher.finalize()))
    }

    /// Get the fingerprint as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod modelica_path {
        use super::*;

        #[test]
        fn valid_paths() {
            assert!(ModelicaPath::new("1").is_ok());
            assert!(ModelicaPath::new("Buildings.Templates").is_ok());
            assert!(ModelicaPath::new("dat.fanSupDra.m_flow_nominal").is_ok());
            assert!(ModelicaPath::new("Buildings.Media.Air").is_ok());
        }

        #[test]
        fn empty_rejected() {
            assert_eq!(
                ModelicaPath::new(""),
                Err(TypeError::InvalidPath("path cannot be empty".into()))
            );
        }

        #[test]
        fn dots_at_edges_rejected() {
            assert!(ModelicaPath::new(".a").is_err());
            assert!(ModelicaPath::new("a.").is_err());
            assert!(ModelicaPath::new(".").is_err());
        }

        #[test]
        fn empty_segment_rejected() {
            assert!(ModelicaPath::new("a..b").is_err());
        }

        #[test]
        fn whitespace_rejected() {
            assert!(ModelicaPath::new("a b").is_err());
            assert!(ModelicaPath::new("a\tb").is_err());
            assert!(ModelicaPath::new(" a").is_err());
        }

        #[test]
        fn last_segment_and_parent() {
            let path = ModelicaPath::new("A.B.C").unwrap();
            assert_eq!(path.last_segment(), "C");
            assert_eq!(path.parent().unwrap().as_str(), "A.B");
            assert_eq!(path.segments().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        }

        #[test]
        fn serde_roundtrip() {
            let path = ModelicaPath::new("A.B").unwrap();
            let json = serde_json::to_string(&path).unwrap();
            assert_eq!(json, "\"A.B\"");
            let parsed: ModelicaPath = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, path);
        }

        #[test]
        fn serde_rejects_invalid() {
            let result: Result<ModelicaPath, _> = serde_json::from_str("\"a..b\"");
            assert!(result.is_err());
        }
    }

    mod option_kind {
        use super::*;

        #[test]
        fn scalars_are_primitive() {
            for name in ["String", "Integer", "Real", "Boolean", "checkbox", "MediumAir"] {
                assert!(
                    OptionKind::from_type_name(name).is_primitive(),
                    "{} should be primitive",
                    name
                );
            }
        }

        #[test]
        fn composites_are_not_primitive() {
            for name in ["dropdown", "final", "enum", "Buildings.Templates.Data.AllSystems"] {
                assert!(
                    !OptionKind::from_type_name(name).is_primitive(),
                    "{} should be composite",
                    name
                );
            }
        }

        #[test]
        fn class_display_uses_last_segment() {
            let kind = OptionKind::from_type_name("Buildings.Templates.Components.Coils.None");
            assert_eq!(kind.to_string(), "None");
        }
    }

    mod config_id {
        use super::*;

        #[test]
        fn parse_roundtrip() {
            let id = ConfigId::new();
            let parsed = ConfigId::parse(&id.to_string()).unwrap();
            assert_eq!(id, parsed);
        }

        #[test]
        fn parse_rejects_garbage() {
            assert!(matches!(
                ConfigId::parse("not-a-uuid"),
                Err(TypeError::InvalidConfigId(_))
            ));
        }

        #[test]
        fn fresh_ids_differ() {
            assert_ne!(ConfigId::new(), ConfigId::new());
        }
    }

    mod fingerprint {
        use super::*;

        #[test]
        fn order_independent() {
            let a = Fingerprint::compute(vec!["x", "y", "z"]);
            let b = Fingerprint::compute(vec!["z", "x", "y"]);
            assert_eq!(a, b);
        }

        #[test]
        fn content_sensitive() {
            let a = Fingerprint::compute(vec!["x", "y"]);
            let b = Fingerprint::compute(vec!["x", "w"]);
            assert_ne!(a, b);
        }

        #[test]
        fn hex_sha256_length() {
            let fp = Fingerprint::compute(Vec::<String>::new());
            assert_eq!(fp.as_str().len(), 64);
        }
    }
}
