//! core::catalog::schema
//!
//! Catalog load document (wire shape).
//!
//! # Document Shape
//!
//! ```json
//! {
//!   "systemTypes": [{ "modelicaPath": "...", "description": "..." }],
//!   "templates":   [{ "modelicaPath": "...", "name": "...", "systemTypes": [], "options": [] }],
//!   "options":     [{ "modelicaPath": "...", "name": "...", "type": "...", "options": [] }],
//!   "scheduleOptions": [{ "modelicaPath": "...", "name": "...", "type": "..." }]
//! }
//! ```
//!
//! Reference lists also load under their long names: `optionPaths` on
//! templates, `childPaths` on options and `systemTypePaths` on templates.
//! A template without option roots is rooted at the option sharing its
//! path, which is how the parser emits them.
//!
//! The document is produced by an external template parser that emits
//! extra bookkeeping fields (`treeList`, `enable`, ...). Unknown fields are
//! ignored; required fields are checked after parsing so that the error
//! names the offending record.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{CatalogError, OptionNode, SystemType, Template};
use crate::core::modifiers::{Modifier, ModifierSet};
use crate::core::types::{ModelicaPath, OptionKind};

/// The whole catalog document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    #[serde(default)]
    pub system_types: Vec<SystemTypeRecord>,

    #[serde(default)]
    pub templates: Vec<TemplateRecord>,

    #[serde(default)]
    pub options: Vec<OptionRecord>,

    /// Options shown in the schedule table, exported after `options`
    #[serde(default)]
    pub schedule_options: Vec<OptionRecord>,
}

impl CatalogDocument {
    /// Parse a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` if the text is not a catalog document.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

/// A `systemTypes` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemTypeRecord {
    pub modelica_path: Option<String>,

    pub name: Option<String>,

    /// Parser output labels system types with `description` only
    pub description: Option<String>,

    pub parent: Option<String>,
}

/// A `templates` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub modelica_path: Option<String>,

    pub name: Option<String>,

    #[serde(default, alias = "systemTypePaths")]
    pub system_types: Vec<String>,

    #[serde(default, alias = "optionPaths")]
    pub options: Option<Vec<String>>,
}

/// An `options` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionRecord {
    pub modelica_path: Option<String>,

    pub name: Option<String>,

    #[serde(rename = "type")]
    pub type_name: Option<String>,

    /// Child references (graph edges, not owned)
    #[serde(default, alias = "childPaths")]
    pub options: Option<Vec<String>>,

    #[serde(default)]
    pub modifiers: Option<BTreeMap<String, ModifierRecord>>,

    pub visible: Option<bool>,

    /// Usually a string; the parser occasionally emits a literal
    pub group: Option<serde_json::Value>,

    pub tab: Option<String>,

    pub value: Option<serde_json::Value>,

    #[serde(default)]
    pub definition: bool,

    #[serde(default)]
    pub replaceable: bool,
}

/// A modifier entry, keyed by its target in the enclosing map.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModifierRecord {
    #[serde(alias = "expression", default)]
    pub value: serde_json::Value,

    #[serde(rename = "final", default)]
    pub is_final: bool,

    #[serde(default)]
    pub redeclare: bool,
}

/// Where a record sits in the document, for error messages.
#[derive(Debug, Clone, Copy)]
pub(super) struct RecordLocation {
    pub collection: &'static str,
    pub index: usize,
}

impl RecordLocation {
    fn require<T>(&self, value: Option<T>, field: &'static str) -> Result<T, CatalogError> {
        value.ok_or(CatalogError::MissingField {
            collection: self.collection,
            index: self.index,
            field,
        })
    }

    fn path(&self, raw: &str, field: &'static str) -> Result<ModelicaPath, CatalogError> {
        ModelicaPath::new(raw).map_err(|e| CatalogError::InvalidPath {
            collection: self.collection,
            index: self.index,
            field,
            message: e.to_string(),
        })
    }

    fn paths(&self, raw: &[String], field: &'static str) -> Result<Vec<ModelicaPath>, CatalogError> {
        raw.iter().map(|p| self.path(p, field)).collect()
    }
}

impl SystemTypeRecord {
    pub(super) fn into_system_type(self, at: RecordLocation) -> Result<SystemType, CatalogError> {
        let path = at.path(&at.require(self.modelica_path, "modelicaPath")?, "modelicaPath")?;
        let name = at.require(self.name.or(self.description), "name")?;
        let parent = self
            .parent
            .map(|p| at.path(&p, "parent"))
            .transpose()?;

        Ok(SystemType { path, name, parent })
    }
}

impl TemplateRecord {
    pub(super) fn into_template(self, at: RecordLocation) -> Result<Template, CatalogError> {
        let path = at.path(&at.require(self.modelica_path, "modelicaPath")?, "modelicaPath")?;
        let name = at.require(self.name, "name")?;
        let system_type_paths = at.paths(&self.system_types, "systemTypes")?;
        let option_paths = at.paths(&self.options.unwrap_or_default(), "options")?;

        Ok(Template {
            path,
            name,
            system_type_paths,
            option_paths,
        })
    }
}

impl OptionRecord {
    pub(super) fn into_node(self, at: RecordLocation) -> Result<OptionNode, CatalogError> {
        let path = at.path(&at.require(self.modelica_path, "modelicaPath")?, "modelicaPath")?;
        let name = at.require(self.name, "name")?;
        let type_name = at.require(self.type_name, "type")?;
        let child_paths = at.paths(&self.options.unwrap_or_default(), "options")?;

        let mut modifiers = ModifierSet::new();
        for (key, record) in self.modifiers.unwrap_or_default() {
            let key = at.path(&key, "modifiers")?;
            modifiers.insert(Modifier {
                key,
                value: record.value,
                is_final: record.is_final,
                redeclare: record.redeclare,
            });
        }

        let group = self.group.and_then(|g| match g {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        });

        Ok(OptionNode {
            kind: OptionKind::from_type_name(&type_name),
            path,
            name,
            type_name,
            child_paths,
            modifiers,
            visible: self.visible.unwrap_or(true),
            group,
            tab: self.tab,
            value: self.value,
            definition: self.definition,
            replaceable: self.replaceable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(index: usize) -> RecordLocation {
        RecordLocation {
            collection: "options",
            index,
        }
    }

    #[test]
    fn option_record_ignores_parser_bookkeeping() {
        let json = r#"{
            "modelicaPath": "A.b",
            "name": "B",
            "type": "Real",
            "treeList": ["A"],
            "enable": true
        }"#;
        let record: OptionRecord = serde_json::from_str(json).unwrap();
        let node = record.into_node(at(0)).unwrap();
        assert_eq!(node.path.as_str(), "A.b");
        assert_eq!(node.kind, OptionKind::Real);
        assert!(node.visible);
    }

    #[test]
    fn option_record_requires_type() {
        let record: OptionRecord =
            serde_json::from_str(r#"{ "modelicaPath": "A", "name": "A" }"#).unwrap();
        let err = record.into_node(at(3)).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingField {
                collection: "options",
                index: 3,
                field: "type"
            }
        ));
    }

    #[test]
    fn modifier_accepts_expression_alias() {
        let json = r#"{
            "modelicaPath": "A",
            "name": "A",
            "type": "dropdown",
            "modifiers": {
                "A.x": { "expression": { "operator": "none", "operands": [1] }, "final": true }
            }
        }"#;
        let record: OptionRecord = serde_json::from_str(json).unwrap();
        let node = record.into_node(at(0)).unwrap();
        let modifier = node.modifiers.get_str("A.x").unwrap();
        assert!(modifier.is_final);
        assert_eq!(modifier.value["operands"][0], 1);
    }

    #[test]
    fn literal_group_is_stringified() {
        let json = r#"{ "modelicaPath": "A", "name": "A", "type": "Real", "group": 3 }"#;
        let record: OptionRecord = serde_json::from_str(json).unwrap();
        let node = record.into_node(at(0)).unwrap();
        assert_eq!(node.group.as_deref(), Some("3"));
    }

    #[test]
    fn system_type_accepts_description() {
        let record: SystemTypeRecord = serde_json::from_str(
            r#"{ "modelicaPath": "Buildings.Templates.AirHandlersFans", "description": "Air Handlers" }"#,
        )
        .unwrap();
        let system_type = record
            .into_system_type(RecordLocation {
                collection: "systemTypes",
                index: 0,
            })
            .unwrap();
        assert_eq!(system_type.name, "Air Handlers");
    }

    #[test]
    fn system_type_prefers_name_over_description() {
        let record: SystemTypeRecord = serde_json::from_str(
            r#"{ "modelicaPath": "s", "name": "S", "description": "S desc" }"#,
        )
        .unwrap();
        let system_type = record
            .into_system_type(RecordLocation {
                collection: "systemTypes",
                index: 0,
            })
            .unwrap();
        assert_eq!(system_type.name, "S");
    }

    #[test]
    fn long_reference_names_are_accepted() {
        let template: TemplateRecord = serde_json::from_str(
            r#"{ "modelicaPath": "T", "name": "T", "systemTypePaths": ["s"], "optionPaths": ["a"] }"#,
        )
        .unwrap();
        let template = template
            .into_template(RecordLocation {
                collection: "templates",
                index: 0,
            })
            .unwrap();
        assert_eq!(template.system_type_paths[0].as_str(), "s");
        assert_eq!(template.option_paths[0].as_str(), "a");

        let option: OptionRecord = serde_json::from_str(
            r#"{ "modelicaPath": "a", "name": "A", "type": "dropdown", "childPaths": ["b"] }"#,
        )
        .unwrap();
        let node = option.into_node(at(0)).unwrap();
        assert_eq!(node.child_paths[0].as_str(), "b");
    }
}
