//! core::resolve
//!
//! The option graph resolver.
//!
//! # Algorithm
//!
//! A depth-first walk from a root path carrying the inherited modifier set
//! down the recursion. At each node:
//!
//! 1. The node's local modifiers cascade into the inherited set (see
//!    [`ModifierSet::cascade`]) to give its effective set, which is what
//!    its children inherit.
//! 2. Visibility is the node's declared flag, cleared if the incoming
//!    modifier keyed by the node's own path is final.
//! 3. The value is the incoming governing modifier's value, else the
//!    node's declared default, with pass-through expressions collapsed to
//!    their literal.
//! 4. Primitive nodes stop here. Composite nodes recurse into their child
//!    edges in declaration order.
//!
//! # Invariants
//!
//! - The catalog is never mutated; every call allocates a fresh tree
//! - A child already on the active recursion stack is recorded as a cut
//!   edge instead of being descended into, so the walk terminates
//! - Dangling child references are skipped without affecting siblings
//! - The output is a pure function of the arguments
//!
//! # Example
//!
//! ```
//! use linkage::core::catalog::Catalog;
//! use linkage::core::resolve::resolve;
//!
//! let catalog = Catalog::load(r#"{ "options": [
//!     { "modelicaPath": "A", "name": "A", "type": "dropdown", "options": ["B"] },
//!     { "modelicaPath": "B", "name": "B", "type": "dropdown", "options": ["A"] }
//! ] }"#).unwrap();
//!
//! let tree = resolve("A", &catalog).unwrap();
//! assert_eq!(tree.children.len(), 1);
//! assert_eq!(tree.children[0].cut_edges[0].as_str(), "A");
//! ```

use serde::Serialize;
use thiserror::Error;

use super::catalog::{Catalog, OptionId};
use super::modifiers::{collapse_literal, ModifierSet};
use super::types::{ModelicaPath, OptionKind};

/// Errors from resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The root path is not in the catalog; there is nothing to render.
    #[error("unknown root option: {0}")]
    UnknownRoot(String),

    #[error("unknown template: {0}")]
    UnknownTemplate(String),
}

/// A visibility- and value-resolved option.
///
/// Owned by the call that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedNode {
    pub path: ModelicaPath,
    pub name: String,
    pub kind: OptionKind,
    pub group: Option<String>,
    pub effective_modifiers: ModifierSet,
    pub visible: bool,
    pub value: Option<serde_json::Value>,
    pub children: Vec<ResolvedNode>,

    /// Child paths not descended into because they were already on the
    /// recursion stack
    pub cut_edges: Vec<ModelicaPath>,
}

impl ResolvedNode {
    /// Pre-order iterator over this node and its descendants.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Find the first node (pre-order) with the given path.
    pub fn find(&self, path: &str) -> Option<&ResolvedNode> {
        self.iter().find(|n| n.path.as_str() == path)
    }

    /// Whether a node with the given path appears in the tree.
    pub fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    /// Total number of nodes including this one.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Number of levels; a lone node has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(ResolvedNode::depth).max().unwrap_or(0)
    }

    /// Paths of visible nodes, pre-order.
    pub fn visible_paths(&self) -> Vec<&ModelicaPath> {
        self.iter().filter(|n| n.visible).map(|n| &n.path).collect()
    }
}

/// Pre-order iterator over a resolved tree.
pub struct Iter<'a> {
    stack: Vec<&'a ResolvedNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a ResolvedNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A template with each of its option roots resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTemplate {
    pub path: ModelicaPath,
    pub name: String,

    /// Resolved option roots in template order; dangling roots are absent
    pub children: Vec<ResolvedNode>,
}

impl ResolvedTemplate {
    /// Pre-order iterator over every resolved node under the template.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedNode> {
        self.children.iter().flat_map(ResolvedNode::iter)
    }

    /// Find the first node with the given path.
    pub fn find(&self, path: &str) -> Option<&ResolvedNode> {
        self.iter().find(|n| n.path.as_str() == path)
    }

    /// Whether an option path appears anywhere under the template.
    pub fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    /// Total number of resolved option nodes.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }
}

/// Resolve the option graph rooted at `root_path` under an empty context.
///
/// # Errors
///
/// Returns `ResolveError::UnknownRoot` if the root is not in the catalog.
pub fn resolve(root_path: &str, catalog: &Catalog) -> Result<ResolvedNode, ResolveError> {
    resolve_with(root_path, catalog, &ModifierSet::new())
}

/// Resolve the option graph rooted at `root_path` under an explicit
/// inherited modifier set.
pub fn resolve_with(
    root_path: &str,
    catalog: &Catalog,
    inherited: &ModifierSet,
) -> Result<ResolvedNode, ResolveError> {
    let root = catalog
        .node_id(root_path)
        .ok_or_else(|| ResolveError::UnknownRoot(root_path.to_string()))?;

    Ok(Resolver::new(catalog).walk(root, inherited))
}

/// Resolve every option root of a template.
///
/// Each root is resolved independently under an empty context. Option
/// roots that are not in the catalog are skipped. A template that declares
/// no roots resolves the option sharing its path.
///
/// # Errors
///
/// Returns `ResolveError::UnknownTemplate` if the template is not in the
/// catalog.
pub fn resolve_template(
    template_path: &str,
    catalog: &Catalog,
) -> Result<ResolvedTemplate, ResolveError> {
    let template = catalog
        .get_template(template_path)
        .ok_or_else(|| ResolveError::UnknownTemplate(template_path.to_string()))?;

    let empty = ModifierSet::new();
    let mut resolver = Resolver::new(catalog);
    let children = catalog
        .template_roots(template)
        .into_iter()
        .map(|id| resolver.walk(id, &empty))
        .collect();

    Ok(ResolvedTemplate {
        path: template.path.clone(),
        name: template.name.clone(),
        children,
    })
}

/// Per-call walk state.
struct Resolver<'c> {
    catalog: &'c Catalog,
    /// Nodes currently on the recursion stack, indexed by arena id
    on_stack: Vec<bool>,
}

impl<'c> Resolver<'c> {
    fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            on_stack: vec![false; catalog.len()],
        }
    }

    fn walk(&mut self, id: OptionId, inherited: &ModifierSet) -> ResolvedNode {
        let catalog = self.catalog;
        let node = catalog.node(id);
        let effective_modifiers = inherited.cascade(&node.modifiers);

        let visible = node.visible && !inherited.hides(&node.path);
        let value = inherited
            .governing(&node.path)
            .map(|m| m.value.clone())
            .or_else(|| node.value.clone())
            .map(collapse_literal);

        let mut children = Vec::new();
        let mut cut_edges = Vec::new();

        if !node.is_primitive() {
            self.on_stack[id.index()] = true;

            for &child in catalog.children_of(id) {
                if self.on_stack[child.index()] {
                    let child_path = &catalog.node(child).path;
                    tracing::debug!(
                        parent = %node.path,
                        child = %child_path,
                        "cutting cyclic edge"
                    );
                    cut_edges.push(child_path.clone());
                    continue;
                }
                children.push(self.walk(child, &effective_modifiers));
            }

            self.on_stack[id.index()] = false;
        }

        ResolvedNode {
            path: node.path.clone(),
            name: node.name.clone(),
            kind: node.kind.clone(),
            group: node.group.clone(),
            effective_modifiers,
            visible,
            value,
            children,
            cut_edges,
        }
    }
}
