//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads tool config and whatever input files it needs
//! 2. Calls into `core` or `export`
//! 3. Formats and displays output via `ui`
//!
//! Relative paths on the command line are taken relative to `--cwd` when
//! it is given.

mod completion;
mod config_cmd;
mod document;
mod export;
mod resolve;
mod select;
mod systems;
mod templates;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use document::{document, sequence};
pub use export::export_csv;
pub use resolve::resolve;
pub use select::select;
pub use systems::systems;
pub use templates::templates;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};

use crate::cli::args::{Command, ConfigAction};
use crate::cli::Context;
use crate::config::{Config, OutputFormat};
use crate::core::catalog::Catalog;
use crate::core::selection::schema::{parse_configuration_set, ConfigurationSetV1};
use crate::core::types::ConfigId;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Systems => systems::systems(ctx),
        Command::Templates { system_type } => templates::templates(ctx, system_type.as_deref()),
        Command::Resolve { root, template } => {
            resolve::resolve(ctx, root.as_deref(), template.as_deref())
        }
        Command::ExportCsv {
            output,
            line_ending,
        } => export::export_csv(ctx, output.as_deref(), line_ending),
        Command::Sequence { configs } => document::sequence(ctx, &configs),
        Command::Document { configs, id } => document::document(ctx, &configs, &id),
        Command::Select { configs, action } => select::select(ctx, &configs, action),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value, global } => config_cmd::set(ctx, &key, &value, global),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// The directory commands run in.
fn working_dir(ctx: &Context) -> Result<PathBuf> {
    match &ctx.cwd {
        Some(cwd) => Ok(cwd.clone()),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}

/// Resolve a command-line path against the working directory.
fn in_working_dir(ctx: &Context, path: &Path) -> Result<PathBuf> {
    Ok(working_dir(ctx)?.join(path))
}

/// Load tool config for the working directory.
fn load_config(ctx: &Context) -> Result<Config> {
    let cwd = working_dir(ctx)?;
    Config::load(Some(&cwd)).context("Failed to load config")
}

/// Whether results should be printed as JSON.
fn wants_json(ctx: &Context, config: &Config) -> bool {
    ctx.json || config.output_format() == OutputFormat::Json
}

/// Load the catalog named by `--catalog`, else by config.
fn load_catalog(ctx: &Context, config: &Config) -> Result<Catalog> {
    let path = match (&ctx.catalog, config.catalog()) {
        (Some(flag), _) => in_working_dir(ctx, flag)?,
        (None, Some(configured)) => configured,
        (None, None) => bail!(
            "No catalog given. Pass --catalog <FILE> or set one with 'linkage config set catalog <FILE>'."
        ),
    };

    let json = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read catalog '{}'", path.display()))?;
    Catalog::load(&json).with_context(|| format!("Malformed catalog '{}'", path.display()))
}

/// Read and parse a configuration set file.
fn read_configuration_set(path: &Path) -> Result<ConfigurationSetV1> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration set '{}'", path.display()))?;
    parse_configuration_set(&json)
        .with_context(|| format!("Invalid configuration set '{}'", path.display()))
}

fn parse_config_id(id: &str) -> Result<ConfigId> {
    ConfigId::parse(id).with_context(|| format!("Invalid configuration id '{}'", id))
}
