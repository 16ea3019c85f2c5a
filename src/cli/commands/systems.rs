//! systems command - Show the system type hierarchy

use anyhow::Result;

use super::{load_catalog, load_config, wants_json};
use crate::cli::Context;
use crate::core::catalog::SystemTypeNode;
use crate::ui::output;

/// Print the system type forest.
pub fn systems(ctx: &Context) -> Result<()> {
    let config = load_config(ctx)?;
    let catalog = load_catalog(ctx, &config)?;
    let forest = catalog.system_type_forest();

    if wants_json(ctx, &config) {
        output::json(&forest)?;
        return Ok(());
    }

    if forest.is_empty() {
        output::print("No system types in catalog.", ctx.verbosity());
        return Ok(());
    }

    let mut lines = Vec::new();
    for root in &forest {
        collect_lines(root, 0, &mut lines);
    }
    output::print(lines.join("\n"), ctx.verbosity());
    Ok(())
}

fn collect_lines(node: &SystemTypeNode, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!("{}{} ({})", "  ".repeat(depth), node.name, node.path));
    for child in &node.children {
        collect_lines(child, depth + 1, lines);
    }
}
