//! templates command - List templates

use anyhow::Result;
use serde::Serialize;

use super::{load_catalog, load_config, wants_json};
use crate::cli::Context;
use crate::core::catalog::{Catalog, Template};
use crate::ui::output;

#[derive(Serialize)]
struct TemplateSummary<'a> {
    path: &'a str,
    name: &'a str,
    system_types: Vec<&'a str>,
    option_count: usize,
}

impl<'a> TemplateSummary<'a> {
    /// `option_count` counts the root options that resolve in the catalog.
    fn new(catalog: &Catalog, template: &'a Template) -> Self {
        Self {
            path: template.path.as_str(),
            name: &template.name,
            system_types: template.system_type_paths.iter().map(|p| p.as_str()).collect(),
            option_count: catalog.template_roots(template).len(),
        }
    }
}

/// List templates in catalog order, optionally only those for one system
/// type.
pub fn templates(ctx: &Context, system_type: Option<&str>) -> Result<()> {
    let config = load_config(ctx)?;
    let catalog = load_catalog(ctx, &config)?;

    let templates: Vec<&Template> = match system_type {
        Some(system) => {
            if catalog.system_type(system).is_none() {
                output::warn(
                    format!("unknown system type '{}'", system),
                    ctx.verbosity(),
                );
            }
            catalog.templates_for_system_type(system)
        }
        None => catalog.templates().iter().collect(),
    };

    if wants_json(ctx, &config) {
        let summaries: Vec<TemplateSummary> = templates
            .into_iter()
            .map(|t| TemplateSummary::new(&catalog, t))
            .collect();
        output::json(&summaries)?;
        return Ok(());
    }

    if templates.is_empty() {
        output::print("No templates found.", ctx.verbosity());
        return Ok(());
    }

    let lines: Vec<String> = templates
        .iter()
        .map(|t| format!("{}  {}", t.path, t.name))
        .collect();
    output::print(output::format_list(&lines, ""), ctx.verbosity());
    Ok(())
}
