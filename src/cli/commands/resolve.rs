//! resolve command - Print a resolved option or template tree

use anyhow::{bail, Context as _, Result};

use super::{load_catalog, load_config, wants_json};
use crate::cli::Context;
use crate::core::resolve::{resolve as resolve_root, resolve_template};
use crate::ui::{output, tree};

/// Resolve `root`, or every option root of `template`.
///
/// With neither, the configured `default_root` is resolved.
pub fn resolve(ctx: &Context, root: Option<&str>, template: Option<&str>) -> Result<()> {
    let config = load_config(ctx)?;
    let catalog = load_catalog(ctx, &config)?;
    let json = wants_json(ctx, &config);

    if let Some(template) = template {
        let resolved = resolve_template(template, &catalog)
            .with_context(|| format!("Cannot resolve template '{}'", template))?;
        if json {
            output::json(&resolved)?;
        } else {
            output::print(tree::format_template(&resolved).trim_end(), ctx.verbosity());
        }
        return Ok(());
    }

    let Some(root) = root.or(config.default_root()) else {
        bail!("No root given. Pass ROOT or --template, or set 'default_root' in linkage.toml.");
    };

    let resolved = resolve_root(root, &catalog)
        .with_context(|| format!("Cannot resolve '{}'", root))?;
    output::debug(
        format!(
            "{} nodes, depth {}",
            resolved.node_count(),
            resolved.depth()
        ),
        ctx.verbosity(),
    );

    if json {
        output::json(&resolved)?;
    } else {
        output::print(tree::format_node(&resolved).trim_end(), ctx.verbosity());
    }
    Ok(())
}
