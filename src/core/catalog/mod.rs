//! core::catalog
//!
//! The immutable, load-once catalog of system types, templates and options.
//!
//! # Architecture
//!
//! Option nodes live in an arena (`Vec<OptionNode>`) addressed by
//! [`OptionId`]. Child references in the document are plain paths; at load
//! time they are resolved once into id edges so the resolver can walk the
//! graph without repeated lookups. References to paths the catalog does not
//! contain are dropped from the edge lists (they remain visible in
//! [`OptionNode::child_paths`] for export).
//!
//! # Invariants
//!
//! - Paths are unique within each collection
//! - Every record has its required fields
//! - Nothing mutates the catalog after [`Catalog::load`] returns
//!
//! # Example
//!
//! ```
//! use linkage::core::catalog::Catalog;
//!
//! let catalog = Catalog::load(r#"{
//!     "systemTypes": [{ "modelicaPath": "ahu", "name": "Air Handlers" }],
//!     "templates": [{ "modelicaPath": "tpl", "name": "VAV", "systemTypes": ["ahu"], "options": ["1"] }],
//!     "options": [{ "modelicaPath": "1", "name": "Fan", "type": "dropdown" }]
//! }"#).unwrap();
//!
//! assert_eq!(catalog.get_node("1").unwrap().name, "Fan");
//! assert_eq!(catalog.templates_for_system_type("ahu").len(), 1);
//! ```

pub mod schema;

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use self::schema::{CatalogDocument, RecordLocation};
use super::modifiers::ModifierSet;
use super::types::{Fingerprint, ModelicaPath, OptionKind};

/// Errors from catalog loading.
///
/// Every variant is a `MalformedCatalog` failure: the load is rejected
/// eagerly and no partial catalog is returned.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed catalog: {0}")]
    Parse(String),

    #[error("malformed catalog: {collection}[{index}] is missing required field '{field}'")]
    MissingField {
        collection: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("malformed catalog: {collection}[{index}].{field}: {message}")]
    InvalidPath {
        collection: &'static str,
        index: usize,
        field: &'static str,
        message: String,
    },

    #[error("malformed catalog: duplicate path '{path}' in {collection}")]
    DuplicatePath {
        collection: &'static str,
        path: String,
    },
}

impl CatalogError {
    /// All catalog errors belong to the `MalformedCatalog` category.
    pub fn is_malformed(&self) -> bool {
        true
    }
}

/// Index of an option node in the catalog arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(usize);

impl OptionId {
    /// The raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A selectable parameter or sub-assembly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionNode {
    pub path: ModelicaPath,
    pub name: String,
    pub kind: OptionKind,

    /// The type string exactly as it appeared in the document
    pub type_name: String,

    /// Child references in declaration order (edges, not owned nodes)
    pub child_paths: Vec<ModelicaPath>,

    pub modifiers: ModifierSet,
    pub visible: bool,
    pub group: Option<String>,
    pub tab: Option<String>,

    /// Declared default value
    pub value: Option<serde_json::Value>,

    /// Class definition rather than a parameter
    pub definition: bool,
    pub replaceable: bool,
}

impl OptionNode {
    /// Scalar nodes are resolved as leaves.
    pub fn is_primitive(&self) -> bool {
        self.kind.is_primitive()
    }
}

/// A system archetype exposing an ordered list of root options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    pub path: ModelicaPath,
    pub name: String,
    pub system_type_paths: Vec<ModelicaPath>,
    pub option_paths: Vec<ModelicaPath>,
}

impl Template {
    /// Whether this template applies to the given system type.
    pub fn applies_to(&self, system_type_path: &str) -> bool {
        self.system_type_paths
            .iter()
            .any(|p| p.as_str() == system_type_path)
    }
}

/// A category of building system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemType {
    pub path: ModelicaPath,
    pub name: String,
    pub parent: Option<ModelicaPath>,
}

/// A node in the system type forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemTypeNode {
    pub path: ModelicaPath,
    pub name: String,
    pub children: Vec<SystemTypeNode>,
}

/// The immutable catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    options: Vec<OptionNode>,
    /// Resolved child edges, parallel to `options`
    edges: Vec<Vec<OptionId>>,
    option_index: HashMap<ModelicaPath, OptionId>,

    /// Schedule table entries; not part of the option graph
    schedule_options: Vec<OptionNode>,

    templates: Vec<Template>,
    template_index: HashMap<ModelicaPath, usize>,

    system_types: Vec<SystemType>,
    system_type_index: HashMap<ModelicaPath, usize>,
}

impl Catalog {
    /// Load a catalog from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] (`MalformedCatalog`) if the document
    /// cannot be parsed, a record misses a required field, a path is
    /// invalid, or a path is duplicated within a collection.
    pub fn load(json: &str) -> Result<Self, CatalogError> {
        Self::from_document(CatalogDocument::from_json(json)?)
    }

    /// Build a catalog from an already parsed document.
    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::default();

        for (index, record) in document.system_types.into_iter().enumerate() {
            let system_type = record.into_system_type(RecordLocation {
                collection: "systemTypes",
                index,
            })?;
            insert_unique(
                &mut catalog.system_type_index,
                &system_type.path,
                catalog.system_types.len(),
                "systemTypes",
            )?;
            catalog.system_types.push(system_type);
        }

        for (index, record) in document.templates.into_iter().enumerate() {
            let template = record.into_template(RecordLocation {
                collection: "templates",
                index,
            })?;
            insert_unique(
                &mut catalog.template_index,
                &template.path,
                catalog.templates.len(),
                "templates",
            )?;
            catalog.templates.push(template);
        }

        for (index, record) in document.options.into_iter().enumerate() {
            let node = record.into_node(RecordLocation {
                collection: "options",
                index,
            })?;
            let id = OptionId(catalog.options.len());
            insert_unique(&mut catalog.option_index, &node.path, id, "options")?;
            catalog.options.push(node);
        }

        let mut schedule_index = HashMap::new();
        for (index, record) in document.schedule_options.into_iter().enumerate() {
            let node = record.into_node(RecordLocation {
                collection: "scheduleOptions",
                index,
            })?;
            insert_unique(&mut schedule_index, &node.path, (), "scheduleOptions")?;
            catalog.schedule_options.push(node);
        }

        catalog.edges = catalog
            .options
            .iter()
            .map(|node| {
                node.child_paths
                    .iter()
                    .filter_map(|child| {
                        let id = catalog.option_index.get(child).copied();
                        if id.is_none() {
                            tracing::debug!(
                                parent = %node.path,
                                child = %child,
                                "dropping dangling child reference"
                            );
                        }
                        id
                    })
                    .collect()
            })
            .collect();

        tracing::debug!(
            system_types = catalog.system_types.len(),
            templates = catalog.templates.len(),
            options = catalog.options.len(),
            schedule_options = catalog.schedule_options.len(),
            "catalog loaded"
        );

        Ok(catalog)
    }

    /// Look up an option node by path.
    pub fn get_node(&self, path: &str) -> Option<&OptionNode> {
        self.node_id(path).map(|id| self.node(id))
    }

    /// Look up the arena id of an option path.
    pub fn node_id(&self, path: &str) -> Option<OptionId> {
        self.option_index.get(path).copied()
    }

    /// Get a node by id.
    ///
    /// Ids are only handed out by this catalog, so they are always in range.
    pub fn node(&self, id: OptionId) -> &OptionNode {
        &self.options[id.0]
    }

    /// Resolved child edges of a node, in declaration order, with dangling
    /// references removed.
    pub fn children_of(&self, id: OptionId) -> &[OptionId] {
        &self.edges[id.0]
    }

    /// Look up a template by path.
    pub fn get_template(&self, path: &str) -> Option<&Template> {
        self.template_index.get(path).map(|&i| &self.templates[i])
    }

    /// Look up a system type by path.
    pub fn system_type(&self, path: &str) -> Option<&SystemType> {
        self.system_type_index
            .get(path)
            .map(|&i| &self.system_types[i])
    }

    /// Templates applicable to a system type, in document order.
    pub fn templates_for_system_type(&self, system_type_path: &str) -> Vec<&Template> {
        self.templates
            .iter()
            .filter(|t| t.applies_to(system_type_path))
            .collect()
    }

    /// All option nodes in document order.
    pub fn options(&self) -> &[OptionNode] {
        &self.options
    }

    /// Schedule table entries in document order.
    pub fn schedule_options(&self) -> &[OptionNode] {
        &self.schedule_options
    }

    /// Root option ids of a template.
    ///
    /// These are the declared option roots, minus dangling ones. A template
    /// that declares no roots is rooted at the option sharing its path, if
    /// there is one.
    pub fn template_roots(&self, template: &Template) -> Vec<OptionId> {
        if template.option_paths.is_empty() {
            return self.node_id(template.path.as_str()).into_iter().collect();
        }

        template
            .option_paths
            .iter()
            .filter_map(|path| {
                let id = self.node_id(path.as_str());
                if id.is_none() {
                    tracing::debug!(
                        template = %template.path,
                        option = %path,
                        "skipping dangling template option"
                    );
                }
                id
            })
            .collect()
    }

    /// All templates in document order.
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// All system types in document order.
    pub fn system_types(&self) -> &[SystemType] {
        &self.system_types
    }

    /// Number of option nodes.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the catalog has no option nodes.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Build the system type forest from `parent` links.
    ///
    /// A system type whose parent is absent from the catalog is a root.
    /// Roots and siblings are sorted by name. If the parent links form a
    /// loop, the repeated node is shown once more without children.
    pub fn system_type_forest(&self) -> Vec<SystemTypeNode> {
        let mut buckets: HashMap<&ModelicaPath, Vec<&SystemType>> = HashMap::new();
        let mut roots = Vec::new();

        for system_type in &self.system_types {
            match &system_type.parent {
                Some(parent) if self.system_type_index.contains_key(parent) => {
                    buckets.entry(parent).or_default().push(system_type);
                }
                _ => roots.push(system_type),
            }
        }

        roots.sort_by(|a, b| a.name.cmp(&b.name));
        for siblings in buckets.values_mut() {
            siblings.sort_by(|a, b| a.name.cmp(&b.name));
        }

        let mut visiting = HashSet::new();
        roots
            .into_iter()
            .map(|root| build_forest_node(root, &buckets, &mut visiting))
            .collect()
    }

    /// Structural fingerprint of the catalog.
    ///
    /// Covers option and schedule option paths, types and child
    /// references, and template option roots. Names and labels are excluded so cosmetic edits do
    /// not mark saved selections stale.
    pub fn fingerprint(&self) -> Fingerprint {
        let options = self.options.iter().map(|node| {
            format!(
                "option\0{}\0{}\0{}",
                node.path,
                node.type_name,
                join_paths(&node.child_paths)
            )
        });
        let schedule = self.schedule_options.iter().map(|node| {
            format!(
                "schedule\0{}\0{}\0{}",
                node.path,
                node.type_name,
                join_paths(&node.child_paths)
            )
        });
        let templates = self.templates.iter().map(|template| {
            format!(
                "template\0{}\0{}",
                template.path,
                join_paths(&template.option_paths)
            )
        });
        Fingerprint::compute(options.chain(schedule).chain(templates))
    }
}

fn insert_unique<V>(
    index: &mut HashMap<ModelicaPath, V>,
    path: &ModelicaPath,
    value: V,
    collection: &'static str,
) -> Result<(), CatalogError> {
    if index.contains_key(path) {
        return Err(CatalogError::DuplicatePath {
            collection,
            path: path.to_string(),
        });
    }
    index.insert(path.clone(), value);
    Ok(())
}

fn join_paths(paths: &[ModelicaPath]) -> String {
    paths
        .iter()
        .map(ModelicaPath::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

fn build_forest_node<'a>(
    system_type: &'a SystemType,
    buckets: &HashMap<&'a ModelicaPath, Vec<&'a SystemType>>,
    visiting: &mut HashSet<&'a ModelicaPath>,
) -> SystemTypeNode {
    let path = &system_type.path;
    if !visiting.insert(path) {
        return SystemTypeNode {
            path: path.clone(),
            name: system_type.name.clone(),
            children: Vec::new(),
        };
    }

    let children = buckets
        .get(path)
        .map(|kids| {
            kids.iter()
                .map(|&child| build_forest_node(child, buckets, visiting))
                .collect()
        })
        .unwrap_or_default();

    visiting.remove(path);
    SystemTypeNode {
        path: path.clone(),
        name: system_type.name.clone(),
        children,
    }
}
