//! core::modifiers
//!
//! Modifiers and the cascade that merges them down the option graph.
//!
//! # Cascade Rule
//!
//! A resolution walk carries an inherited [`ModifierSet`]. At each node the
//! node's locally declared modifiers are merged into it:
//!
//! - If the inherited set has no entry for a key, or the entry is not
//!   final, the local modifier wins and is carried to the children.
//! - If the inherited entry is final, the local declaration is ignored and
//!   the final value propagates unchanged.
//!
//! A final modifier therefore dominates every declaration for the same key
//! below the node that introduced it.
//!
//! # Governing Key
//!
//! The incoming modifier keyed by a node's own path governs that node's
//! value and visibility. A final governing modifier hides the node.
//!
//! # Example
//!
//! ```
//! use linkage::core::modifiers::{Modifier, ModifierSet};
//! use linkage::core::types::ModelicaPath;
//! use serde_json::json;
//!
//! let k = ModelicaPath::new("k").unwrap();
//!
//! let mut parent = ModifierSet::new();
//! parent.insert(Modifier::new(k.clone(), json!(1)).into_final());
//!
//! let mut local = ModifierSet::new();
//! local.insert(Modifier::new(k.clone(), json!(2)));
//!
//! let effective = parent.cascade(&local);
//! assert_eq!(effective.get(&k).unwrap().value, json!(1));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::ModelicaPath;

/// A named attribute override attached to an option node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    /// The attribute (instance path) this modifier targets
    pub key: ModelicaPath,

    /// The override value, kept as an opaque literal
    pub value: serde_json::Value,

    /// Once applied, no descendant may override this key
    #[serde(rename = "final", default)]
    pub is_final: bool,

    /// The modifier redeclares a replaceable component
    #[serde(default)]
    pub redeclare: bool,
}

impl Modifier {
    /// Create a non-final modifier.
    pub fn new(key: ModelicaPath, value: serde_json::Value) -> Self {
        Self {
            key,
            value,
            is_final: false,
            redeclare: false,
        }
    }

    /// Mark this modifier final.
    pub fn into_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Mark this modifier as a redeclaration.
    pub fn into_redeclare(mut self) -> Self {
        self.redeclare = true;
        self
    }
}

/// A set of modifiers keyed by the attribute they target.
///
/// Backed by an ordered map so that equal sets compare, iterate and
/// serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierSet {
    entries: BTreeMap<ModelicaPath, Modifier>,
}

impl ModifierSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a modifier, replacing any entry for the same key.
    ///
    /// This is a plain map insert with no cascade semantics; use
    /// [`ModifierSet::cascade`] when merging across graph levels.
    pub fn insert(&mut self, modifier: Modifier) -> Option<Modifier> {
        self.entries.insert(modifier.key.clone(), modifier)
    }

    /// Look up the modifier for a key.
    pub fn get(&self, key: &ModelicaPath) -> Option<&Modifier> {
        self.entries.get(key)
    }

    /// Look up the modifier for a key given as a string.
    pub fn get_str(&self, key: &str) -> Option<&Modifier> {
        self.entries.get(key)
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &ModelicaPath) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of modifiers in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over modifiers in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Modifier> {
        self.entries.values()
    }

    /// Merge locally declared modifiers into this (inherited) set.
    ///
    /// Returns the effective set at the node that declared `local`. A
    /// local modifier replaces an inherited one unless the inherited entry
    /// is final, in which case the local declaration is dropped.
    pub fn cascade(&self, local: &ModifierSet) -> ModifierSet {
        let mut effective = self.clone();

        for modifier in local.iter() {
            match self.entries.get(&modifier.key) {
                Some(inherited) if inherited.is_final => {
                    tracing::trace!(
                        key = %modifier.key,
                        "local modifier blocked by inherited final modifier"
                    );
                }
                _ => {
                    effective.insert(modifier.clone());
                }
            }
        }

        effective
    }

    /// Keys in `local` whose declaration would be blocked by a final
    /// entry in this set.
    pub fn blocked_keys<'a>(
        &'a self,
        local: &'a ModifierSet,
    ) -> impl Iterator<Item = &'a ModelicaPath> + 'a {
        local
            .iter()
            .filter(move |m| self.get(&m.key).is_some_and(|inherited| inherited.is_final))
            .map(|m| &m.key)
    }

    /// The governing modifier for a node: the entry keyed by its own path.
    pub fn governing(&self, node_path: &ModelicaPath) -> Option<&Modifier> {
        self.get(node_path)
    }

    /// Whether an ancestor has hidden the node with a final governing
    /// modifier.
    pub fn hides(&self, node_path: &ModelicaPath) -> bool {
        self.governing(node_path).is_some_and(|m| m.is_final)
    }
}

impl FromIterator<Modifier> for ModifierSet {
    fn from_iter<T: IntoIterator<Item = Modifier>>(iter: T) -> Self {
        let mut set = ModifierSet::new();
        for modifier in iter {
            set.insert(modifier);
        }
        set
    }
}

/// Collapse a pass-through expression to the literal it wraps.
///
/// The catalog parser wraps plain literals as
/// `{"operator": "none", "operands": [x]}`. Such a wrapper becomes `x`,
/// repeatedly if wrappers nest. Any other value is returned unchanged,
/// including expressions with a real operator.
pub fn collapse_literal(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut expression)
            if expression.get("operator").and_then(|o| o.as_str()) == Some("none") =>
        {
            match expression.remove("operands") {
                Some(serde_json::Value::Array(mut operands)) if operands.len() == 1 => {
                    collapse_literal(operands.remove(0))
                }
                operands => {
                    if let Some(operands) = operands {
                        expression.insert("operands".to_string(), operands);
                    }
                    serde_json::Value::Object(expression)
                }
            }
        }
        other => other,
    }
}
