//! core::selection
//!
//! User configurations: concrete values chosen against a template.
//!
//! # Model
//!
//! A [`Configuration`] binds a template to a mapping from option path to
//! chosen value. Every successful mutation bumps the configuration's
//! revision, which callers can use for optimistic concurrency via
//! [`ConfigurationStore::set_value_cas`]. Plain [`ConfigurationStore::set_value`]
//! is last-write-wins per selection key.
//!
//! # Boundary
//!
//! This module only ever writes to configurations. The catalog is read to
//! validate template references and to resolve the template tree that a
//! selection must fall within; it is never mutated.
//!
//! # Example
//!
//! ```
//! use linkage::core::catalog::Catalog;
//! use linkage::core::selection::{ConfigurationStore, SelectionError};
//! use serde_json::json;
//!
//! let catalog = Catalog::load(r#"{
//!     "templates": [{ "modelicaPath": "t", "name": "T", "options": ["fan"] }],
//!     "options": [{ "modelicaPath": "fan", "name": "Fan", "type": "dropdown" }]
//! }"#).unwrap();
//!
//! let mut store = ConfigurationStore::new();
//! let id = store.create(&catalog, "t").unwrap().id();
//!
//! store.set_value(&catalog, id, "fan", json!("variable")).unwrap();
//! assert_eq!(store.find_option_value(id, "fan"), Some(&json!("variable")));
//!
//! let err = store.set_value(&catalog, id, "pump", json!(1)).unwrap_err();
//! assert!(matches!(err, SelectionError::UnresolvableOption { .. }));
//! ```

pub mod schema;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::Catalog;
use super::resolve::{resolve_template, ResolvedTemplate};
use super::types::{ConfigId, ModelicaPath, UtcTimestamp};

/// Default name for a new configuration.
pub const DEFAULT_CONFIGURATION_NAME: &str = "Default";

/// Errors from selection operations.
///
/// On any error the configuration is left unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("unknown system type: {0}")]
    UnknownSystemType(String),

    #[error("template '{template}' does not apply to system type '{system}'")]
    NotApplicable { template: String, system: String },

    #[error("configuration not found: {0}")]
    NotFound(ConfigId),

    /// The option is not part of the template's resolved tree, e.g. a
    /// stale selection after a catalog update.
    #[error("option '{option}' is not resolvable under template '{template}'")]
    UnresolvableOption { template: String, option: String },

    #[error("configuration {0} is locked")]
    Locked(ConfigId),

    #[error("resolved tree is for template '{found}', configuration uses '{expected}'")]
    TemplateMismatch { expected: String, found: String },

    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),

    #[error("revision conflict: expected {expected}, found {actual}")]
    RevisionConflict { expected: u64, actual: u64 },
}

fn default_quantity() -> u32 {
    1
}

/// A user's concrete set of chosen values bound to a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    id: ConfigId,
    template_path: ModelicaPath,
    #[serde(default)]
    system_path: Option<ModelicaPath>,
    name: String,
    #[serde(default)]
    locked: bool,
    #[serde(default = "default_quantity")]
    quantity: u32,
    #[serde(default)]
    selections: BTreeMap<ModelicaPath, serde_json::Value>,
    #[serde(default)]
    revision: u64,
    created_at: UtcTimestamp,
    updated_at: UtcTimestamp,
}

impl Configuration {
    /// Create an unlocked configuration with no selections.
    ///
    /// Does not check the template against a catalog; use
    /// [`ConfigurationStore::create`] for that.
    pub fn new(template_path: ModelicaPath) -> Self {
        let now = UtcTimestamp::now();
        Self {
            id: ConfigId::new(),
            template_path,
            system_path: None,
            name: DEFAULT_CONFIGURATION_NAME.to_string(),
            locked: false,
            quantity: default_quantity(),
            selections: BTreeMap::new(),
            revision: 0,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn id(&self) -> ConfigId {
        self.id
    }

    pub fn template_path(&self) -> &ModelicaPath {
        &self.template_path
    }

    pub fn system_path(&self) -> Option<&ModelicaPath> {
        self.system_path.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn selections(&self) -> &BTreeMap<ModelicaPath, serde_json::Value> {
        &self.selections
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn created_at(&self) -> &UtcTimestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &UtcTimestamp {
        &self.updated_at
    }

    /// The chosen value at an option path, if any.
    pub fn value(&self, option_path: &str) -> Option<&serde_json::Value> {
        self.selections.get(option_path)
    }

    /// Choose a value at an option path.
    ///
    /// `resolved` must be the resolved tree of this configuration's
    /// template; the option path must appear in it.
    ///
    /// # Errors
    ///
    /// - [`SelectionError::Locked`] if the configuration is locked
    /// - [`SelectionError::TemplateMismatch`] if `resolved` is for another template
    /// - [`SelectionError::UnresolvableOption`] if the path is not in the tree
    pub fn set_value(
        &mut self,
        resolved: &ResolvedTemplate,
        option_path: &str,
        value: serde_json::Value,
    ) -> Result<(), SelectionError> {
        self.ensure_unlocked()?;
        if resolved.path != self.template_path {
            return Err(SelectionError::TemplateMismatch {
                expected: self.template_path.to_string(),
                found: resolved.path.to_string(),
            });
        }

        let node = resolved
            .find(option_path)
            .ok_or_else(|| SelectionError::UnresolvableOption {
                template: self.template_path.to_string(),
                option: option_path.to_string(),
            })?;

        self.selections.insert(node.path.clone(), value);
        self.touch();
        Ok(())
    }

    /// Remove the chosen value at an option path.
    ///
    /// Returns the removed value. Removing an absent selection is not an
    /// error and does not bump the revision.
    pub fn clear_value(
        &mut self,
        option_path: &str,
    ) -> Result<Option<serde_json::Value>, SelectionError> {
        self.ensure_unlocked()?;
        let removed = self.selections.remove(option_path);
        if removed.is_some() {
            self.touch();
        }
        Ok(removed)
    }

    /// Rename the configuration.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), SelectionError> {
        self.ensure_unlocked()?;
        self.name = name.into();
        self.touch();
        Ok(())
    }

    /// Set how many instances of this configuration the project needs.
    pub fn set_quantity(&mut self, quantity: u32) -> Result<(), SelectionError> {
        self.ensure_unlocked()?;
        if quantity == 0 {
            return Err(SelectionError::InvalidQuantity(quantity));
        }
        self.quantity = quantity;
        self.touch();
        Ok(())
    }

    /// Flip the lock. Always allowed; returns the new state.
    pub fn toggle_lock(&mut self) -> bool {
        self.locked = !self.locked;
        self.touch();
        self.locked
    }

    /// Selections whose option path no longer appears in the resolved
    /// template tree.
    pub fn stale_selections<'a>(&'a self, resolved: &ResolvedTemplate) -> Vec<&'a ModelicaPath> {
        self.selections
            .keys()
            .filter(|path| !resolved.contains(path.as_str()))
            .collect()
    }

    fn ensure_unlocked(&self) -> Result<(), SelectionError> {
        if self.locked {
            Err(SelectionError::Locked(self.id))
        } else {
            Ok(())
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.updated_at = UtcTimestamp::now();
    }
}

/// The configurations owned by one user or session, in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationStore {
    configs: Vec<Configuration>,
}

impl ConfigurationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing configurations (e.g. from a saved set).
    pub fn from_configurations(configs: Vec<Configuration>) -> Self {
        Self { configs }
    }

    /// Take the configurations back out.
    pub fn into_configurations(self) -> Vec<Configuration> {
        self.configs
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Iterate in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Configuration> {
        self.configs.iter()
    }

    /// Instantiate a template.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownTemplate`] if the template is not
    /// in the catalog.
    pub fn create(
        &mut self,
        catalog: &Catalog,
        template_path: &str,
    ) -> Result<&Configuration, SelectionError> {
        let template = catalog
            .get_template(template_path)
            .ok_or_else(|| SelectionError::UnknownTemplate(template_path.to_string()))?;

        self.configs.push(Configuration::new(template.path.clone()));
        Ok(self.last())
    }

    /// Instantiate a template for a specific system type.
    ///
    /// # Errors
    ///
    /// Fails if the template or system type is unknown, or the template
    /// does not list the system type.
    pub fn create_for_system(
        &mut self,
        catalog: &Catalog,
        system_path: &str,
        template_path: &str,
    ) -> Result<&Configuration, SelectionError> {
        let template = catalog
            .get_template(template_path)
            .ok_or_else(|| SelectionError::UnknownTemplate(template_path.to_string()))?;
        let system_type = catalog
            .system_type(system_path)
            .ok_or_else(|| SelectionError::UnknownSystemType(system_path.to_string()))?;
        if !template.applies_to(system_path) {
            return Err(SelectionError::NotApplicable {
                template: template_path.to_string(),
                system: system_path.to_string(),
            });
        }

        let mut config = Configuration::new(template.path.clone());
        config.system_path = Some(system_type.path.clone());
        self.configs.push(config);
        Ok(self.last())
    }

    /// Look up a configuration.
    pub fn get(&self, id: ConfigId) -> Option<&Configuration> {
        self.configs.iter().find(|c| c.id == id)
    }

    /// Choose a value, last write wins.
    ///
    /// # Errors
    ///
    /// - [`SelectionError::NotFound`] if there is no such configuration
    /// - [`SelectionError::UnknownTemplate`] if its template left the catalog
    /// - any error from [`Configuration::set_value`]
    pub fn set_value(
        &mut self,
        catalog: &Catalog,
        id: ConfigId,
        option_path: &str,
        value: serde_json::Value,
    ) -> Result<&Configuration, SelectionError> {
        let config = self.get_mut(id)?;
        let resolved = resolve_for(catalog, config)?;
        config.set_value(&resolved, option_path, value)?;
        Ok(&*config)
    }

    /// Choose a value only if the configuration is still at
    /// `expected_revision`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::RevisionConflict`] if another edit landed
    /// first, plus everything [`ConfigurationStore::set_value`] can return.
    pub fn set_value_cas(
        &mut self,
        catalog: &Catalog,
        id: ConfigId,
        expected_revision: u64,
        option_path: &str,
        value: serde_json::Value,
    ) -> Result<&Configuration, SelectionError> {
        let config = self.get_mut(id)?;
        if config.revision != expected_revision {
            return Err(SelectionError::RevisionConflict {
                expected: expected_revision,
                actual: config.revision,
            });
        }
        let resolved = resolve_for(catalog, config)?;
        config.set_value(&resolved, option_path, value)?;
        Ok(&*config)
    }

    /// Remove a chosen value.
    pub fn clear_value(
        &mut self,
        id: ConfigId,
        option_path: &str,
    ) -> Result<Option<serde_json::Value>, SelectionError> {
        self.get_mut(id)?.clear_value(option_path)
    }

    /// Rename a configuration.
    pub fn rename(&mut self, id: ConfigId, name: &str) -> Result<(), SelectionError> {
        self.get_mut(id)?.rename(name)
    }

    /// Set a configuration's quantity.
    pub fn set_quantity(&mut self, id: ConfigId, quantity: u32) -> Result<(), SelectionError> {
        self.get_mut(id)?.set_quantity(quantity)
    }

    /// Flip a configuration's lock; returns the new state.
    pub fn toggle_lock(&mut self, id: ConfigId) -> Result<bool, SelectionError> {
        Ok(self.get_mut(id)?.toggle_lock())
    }

    /// Remove a configuration, returning it if it existed.
    pub fn remove(&mut self, id: ConfigId) -> Option<Configuration> {
        let index = self.configs.iter().position(|c| c.id == id)?;
        Some(self.configs.remove(index))
    }

    /// Remove every configuration bound to a template. Returns how many
    /// were removed.
    pub fn remove_all_for(&mut self, template_path: &str) -> usize {
        let before = self.configs.len();
        self.configs
            .retain(|c| c.template_path.as_str() != template_path);
        before - self.configs.len()
    }

    /// Remove every configuration bound to a system type and template
    /// pairing. Returns how many were removed.
    pub fn remove_all_for_system_template(&mut self, system_path: &str, template_path: &str) -> usize {
        let before = self.configs.len();
        self.configs
            .retain(|c| !c.matches_system_template(system_path, template_path));
        before - self.configs.len()
    }

    /// Configurations bound to a template, in creation order.
    pub fn configs_for(&self, template_path: &str) -> Vec<&Configuration> {
        self.configs
            .iter()
            .filter(|c| c.template_path.as_str() == template_path)
            .collect()
    }

    /// Configurations bound to a system type and template pairing.
    pub fn configs_for_system_template(
        &self,
        system_path: &str,
        template_path: &str,
    ) -> Vec<&Configuration> {
        self.configs
            .iter()
            .filter(|c| c.matches_system_template(system_path, template_path))
            .collect()
    }

    /// Whether any configuration exists for the pairing.
    pub fn has_system_template_configs(&self, system_path: &str, template_path: &str) -> bool {
        self.configs
            .iter()
            .any(|c| c.matches_system_template(system_path, template_path))
    }

    /// The value chosen at an option path in a configuration.
    pub fn find_option_value(&self, id: ConfigId, option_path: &str) -> Option<&serde_json::Value> {
        self.get(id)?.value(option_path)
    }

    /// Selections of a configuration that no longer resolve under its
    /// template.
    pub fn stale_selections(
        &self,
        catalog: &Catalog,
        id: ConfigId,
    ) -> Result<Vec<ModelicaPath>, SelectionError> {
        let config = self.get(id).ok_or(SelectionError::NotFound(id))?;
        let resolved = resolve_for(catalog, config)?;
        Ok(config
            .stale_selections(&resolved)
            .into_iter()
            .cloned()
            .collect())
    }

    fn get_mut(&mut self, id: ConfigId) -> Result<&mut Configuration, SelectionError> {
        self.configs
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(SelectionError::NotFound(id))
    }

    fn last(&self) -> &Configuration {
        // Only called right after a push.
        &self.configs[self.configs.len() - 1]
    }
}

impl Configuration {
    fn matches_system_template(&self, system_path: &str, template_path: &str) -> bool {
        self.template_path.as_str() == template_path
            && self
                .system_path
                .as_ref()
                .is_some_and(|s| s.as_str() == system_path)
    }
}

fn resolve_for(
    catalog: &Catalog,
    config: &Configuration,
) -> Result<ResolvedTemplate, SelectionError> {
    resolve_template(config.template_path.as_str(), catalog)
        .map_err(|_| SelectionError::UnknownTemplate(config.template_path.to_string()))
}
