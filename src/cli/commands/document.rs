//! sequence and document commands - Produce downstream documents from a
//! configuration set

use std::path::Path;

use anyhow::{anyhow, Context as _, Result};

use super::{in_working_dir, load_catalog, load_config, parse_config_id, read_configuration_set};
use crate::cli::Context;
use crate::export::document::ConfigurationDocument;
use crate::export::sequence::sequence_data;
use crate::ui::output;

/// Print the sequence data for every configuration in a set.
pub fn sequence(ctx: &Context, configs: &Path) -> Result<()> {
    let set = read_configuration_set(&in_working_dir(ctx, configs)?)?;
    let data = sequence_data(&set.configurations);
    output::json(&data)?;
    Ok(())
}

/// Print the model-generation document for one configuration.
pub fn document(ctx: &Context, configs: &Path, id: &str) -> Result<()> {
    let config = load_config(ctx)?;
    let catalog = load_catalog(ctx, &config)?;
    let set = read_configuration_set(&in_working_dir(ctx, configs)?)?;
    let id = parse_config_id(id)?;

    if !set.matches_catalog(&catalog.fingerprint()) {
        output::warn(
            "configuration set was saved against a different catalog; selections may be stale",
            ctx.verbosity(),
        );
    }

    let configuration = set
        .configurations
        .iter()
        .find(|c| c.id() == id)
        .ok_or_else(|| anyhow!("Configuration {} not found", id))?;

    let document = ConfigurationDocument::build(&catalog, configuration)
        .with_context(|| format!("Cannot build document for configuration {}", id))?;
    output::json(&document)?;
    Ok(())
}
