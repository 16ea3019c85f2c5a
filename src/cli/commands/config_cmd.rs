//! config command - Get, set, or list configuration values

use anyhow::{Context as _, Result};

use super::{load_config, working_dir};
use crate::cli::Context;
use crate::config::{Config, ToolConfig};
use crate::ui::output;

/// Get an effective configuration value.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let config = load_config(ctx)?;

    if let Some(value) = effective_value(&config, key)? {
        output::result(value);
    }
    // Key exists but has no value - exit silently
    Ok(())
}

/// Set a value in the project config (or the global config with `--global`).
pub fn set(ctx: &Context, key: &str, value: &str, global: bool) -> Result<()> {
    let path = if global {
        Config::global_config_path()?
    } else {
        Config::project_config_path(&working_dir(ctx)?)
    };

    let mut tool = if path.exists() {
        Config::read_config(&path)?
    } else {
        ToolConfig::default()
    };

    tool.set(key, value)?;
    Config::write_atomic(&path, &tool)
        .with_context(|| format!("Failed to write config '{}'", path.display()))?;

    output::success(format!("Set {} = {}", key, value), ctx.verbosity());
    Ok(())
}

/// List every key with its effective value and where config was loaded from.
pub fn list(ctx: &Context) -> Result<()> {
    let config = load_config(ctx)?;

    output::result("# Linkage Configuration");
    if let Some(path) = config.global_config_loaded_from() {
        output::result(format!("# global: {}", path.display()));
    }
    if let Some(path) = config.project_config_loaded_from() {
        output::result(format!("# project: {}", path.display()));
    }

    for key in ToolConfig::KEYS {
        match effective_value(&config, key)? {
            Some(value) => output::result(format!("{} = {}", key, value)),
            None => output::result(format!("{} = (not set)", key)),
        }
    }
    Ok(())
}

/// Value after precedence. Keys with built-in defaults always have one.
fn effective_value(config: &Config, key: &str) -> Result<Option<String>> {
    let value = match key {
        "catalog" => config.catalog().map(|p| p.display().to_string()),
        "default_root" => config.default_root().map(str::to_string),
        "export.line_ending" => Some(config.line_ending().to_string()),
        "output.format" => Some(config.output_format().to_string()),
        // Rejects unknown keys with the list of valid ones
        _ => ToolConfig::default().get(key)?,
    };
    Ok(value)
}
