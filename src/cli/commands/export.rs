//! export-csv command - Export the option catalog as CSV

use std::io::Write;
use std::path::Path;

use anyhow::{Context as _, Result};

use super::{in_working_dir, load_catalog, load_config};
use crate::cli::Context;
use crate::config::write_file_atomic;
use crate::export::csv::{options_csv, LineEnding};
use crate::ui::output;

/// Write the options CSV to `output_path`, or stdout.
pub fn export_csv(
    ctx: &Context,
    output_path: Option<&Path>,
    line_ending: Option<LineEnding>,
) -> Result<()> {
    let config = load_config(ctx)?;
    let catalog = load_catalog(ctx, &config)?;
    let line_ending = line_ending.unwrap_or_else(|| config.line_ending());

    let csv = options_csv(&catalog, line_ending);

    match output_path {
        Some(path) => {
            let path = in_working_dir(ctx, path)?;
            write_file_atomic(&path, &csv)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            output::success(
                format!("Wrote {} options to {}", catalog.options().len(), path.display()),
                ctx.verbosity(),
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(csv.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
