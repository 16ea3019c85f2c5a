//! export::document
//!
//! The structured document handed to the external model-generation
//! service: one configuration, its template resolved against the catalog,
//! and the catalog fingerprint so the receiver can detect version skew.

use serde::Serialize;

use crate::core::catalog::Catalog;
use crate::core::resolve::{resolve_template, ResolveError, ResolvedTemplate};
use crate::core::selection::Configuration;
use crate::core::types::Fingerprint;

/// The kind identifier for configuration documents.
pub const DOCUMENT_KIND: &str = "linkage.configuration-document";

/// Current document version.
pub const DOCUMENT_VERSION: u32 = 1;

/// A configuration paired with its resolved template.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationDocument<'a> {
    pub kind: &'static str,
    pub schema_version: u32,
    pub catalog_fingerprint: Fingerprint,
    pub configuration: &'a Configuration,
    pub template: ResolvedTemplate,
}

impl<'a> ConfigurationDocument<'a> {
    /// Resolve the configuration's template and pair it with the
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownTemplate`] if the template is no
    /// longer in the catalog.
    pub fn build(catalog: &Catalog, configuration: &'a Configuration) -> Result<Self, ResolveError> {
        let template = resolve_template(configuration.template_path().as_str(), catalog)?;
        Ok(Self {
            kind: DOCUMENT_KIND,
            schema_version: DOCUMENT_VERSION,
            catalog_fingerprint: catalog.fingerprint(),
            configuration,
            template,
        })
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
