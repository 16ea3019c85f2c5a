//! select command - Create and edit configurations in a configuration set
//!
//! The set file is read, edited in memory through the configuration store,
//! and written back atomically. Read-only actions never write.

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::{
    in_working_dir, load_catalog, load_config, parse_config_id, read_configuration_set, wants_json,
};
use crate::cli::args::SelectAction;
use crate::cli::Context;
use crate::config::write_file_atomic;
use crate::core::catalog::Catalog;
use crate::core::selection::schema::ConfigurationSetV1;
use crate::core::selection::{Configuration, ConfigurationStore};
use crate::ui::output;

#[derive(Serialize)]
struct ConfigurationSummary<'a> {
    id: String,
    name: &'a str,
    template: &'a str,
    system_type: Option<&'a str>,
    quantity: u32,
    locked: bool,
    selections: usize,
}

impl<'a> From<&'a Configuration> for ConfigurationSummary<'a> {
    fn from(config: &'a Configuration) -> Self {
        Self {
            id: config.id().to_string(),
            name: config.name(),
            template: config.template_path().as_str(),
            system_type: config.system_path().map(|p| p.as_str()),
            quantity: config.quantity(),
            locked: config.is_locked(),
            selections: config.selections().len(),
        }
    }
}

/// Run one select action against the set at `configs`.
pub fn select(ctx: &Context, configs: &Path, action: SelectAction) -> Result<()> {
    let config = load_config(ctx)?;
    let catalog = load_catalog(ctx, &config)?;
    let path = in_working_dir(ctx, configs)?;
    let json = wants_json(ctx, &config);

    let mut store = if path.exists() {
        let set = read_configuration_set(&path)?;
        if !set.matches_catalog(&catalog.fingerprint()) {
            output::warn(
                "configuration set was saved against a different catalog; selections may be stale",
                ctx.verbosity(),
            );
        }
        set.into_store()
    } else {
        ConfigurationStore::new()
    };

    match action {
        SelectAction::List => {
            let summaries: Vec<ConfigurationSummary> = store.iter().map(Into::into).collect();
            if json {
                output::json(&summaries)?;
            } else if summaries.is_empty() {
                output::print("No configurations.", ctx.verbosity());
            } else {
                let lines: Vec<String> = summaries.iter().map(summary_line).collect();
                output::print(output::format_list(&lines, ""), ctx.verbosity());
            }
            return Ok(());
        }
        SelectAction::Stale { id } => {
            let id = parse_config_id(&id)?;
            let stale = store.stale_selections(&catalog, id)?;
            if json {
                output::json(&stale)?;
            } else if stale.is_empty() {
                output::print("No stale selections.", ctx.verbosity());
            } else {
                output::print(output::format_list(&stale, ""), ctx.verbosity());
            }
            return Ok(());
        }
        SelectAction::New {
            template,
            system_type,
            name,
        } => {
            let created = match system_type {
                Some(system) => store.create_for_system(&catalog, &system, &template)?,
                None => store.create(&catalog, &template)?,
            };
            let id = created.id();
            if let Some(name) = name {
                store.rename(id, &name)?;
            }
            output::result(id);
        }
        SelectAction::Set { id, option, value } => {
            let id = parse_config_id(&id)?;
            let value = parse_value(&value);
            store.set_value(&catalog, id, &option, value.clone())?;
            output::success(format!("Set {} = {}", option, value), ctx.verbosity());
        }
        SelectAction::Clear { id, option } => {
            let id = parse_config_id(&id)?;
            match store.clear_value(id, &option)? {
                Some(_) => output::success(format!("Cleared {}", option), ctx.verbosity()),
                None => output::print(format!("{} was not set", option), ctx.verbosity()),
            }
        }
        SelectAction::Rename { id, name } => {
            let id = parse_config_id(&id)?;
            store.rename(id, &name)?;
            output::success(format!("Renamed {} to '{}'", id, name), ctx.verbosity());
        }
        SelectAction::Quantity { id, quantity } => {
            let id = parse_config_id(&id)?;
            store.set_quantity(id, quantity)?;
            output::success(format!("Quantity of {} is {}", id, quantity), ctx.verbosity());
        }
        SelectAction::Lock { id } => {
            let id = parse_config_id(&id)?;
            let state = if store.toggle_lock(id)? { "Locked" } else { "Unlocked" };
            output::success(format!("{} {}", state, id), ctx.verbosity());
        }
        SelectAction::Remove { id } => {
            let id = parse_config_id(&id)?;
            match store.remove(id) {
                Some(_) => output::success(format!("Removed {}", id), ctx.verbosity()),
                None => output::warn(format!("configuration {} not found", id), ctx.verbosity()),
            }
        }
        SelectAction::RemoveAll {
            template,
            system_type,
        } => {
            let removed = match system_type {
                Some(system) => store.remove_all_for_system_template(&system, &template),
                None => store.remove_all_for(&template),
            };
            output::success(format!("Removed {} configuration(s)", removed), ctx.verbosity());
        }
    }

    save(&path, &store, &catalog)
}

fn save(path: &Path, store: &ConfigurationStore, catalog: &Catalog) -> Result<()> {
    let set = ConfigurationSetV1::new(store, Some(catalog.fingerprint()));
    write_file_atomic(path, &set.to_json()?)
        .with_context(|| format!("Failed to write configuration set '{}'", path.display()))
}

/// JSON literals are taken as such; anything else is a plain string.
fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

fn summary_line(summary: &ConfigurationSummary) -> String {
    let lock = if summary.locked { " [locked]" } else { "" };
    format!(
        "{}  {} ({}) x{}, {} selection(s){}",
        summary.id, summary.name, summary.template, summary.quantity, summary.selections, lock
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_parse_as_json_or_string() {
        assert_eq!(parse_value("true"), serde_json::json!(true));
        assert_eq!(parse_value("42"), serde_json::json!(42));
        assert_eq!(parse_value("\"quoted\""), serde_json::json!("quoted"));
        assert_eq!(parse_value("Buildings.Fans.Variable"), serde_json::json!("Buildings.Fans.Variable"));
    }
}
