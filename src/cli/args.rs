//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--catalog <file>`: Catalog document, overriding the configured one
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::export::csv::LineEnding;

/// Linkage - catalog-driven configurator for engineered building systems
#[derive(Parser, Debug)]
#[command(name = "linkage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Catalog document (JSON); overrides the configured catalog
    #[arg(long, global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Run as if linkage was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the system type hierarchy
    #[command(
        name = "systems",
        after_help = "\
WORKFLOW EXAMPLES:
    # Browse system types, then list their templates
    linkage systems
    linkage templates --system-type Buildings.Templates.Types.AirHandler"
    )]
    Systems,

    /// List templates, optionally for one system type
    #[command(name = "templates")]
    Templates {
        /// Only templates that apply to this system type
        #[arg(long, value_name = "PATH")]
        system_type: Option<String>,
    },

    /// Resolve an option or template into its configuration tree
    #[command(
        name = "resolve",
        long_about = "Resolve an option or template into its configuration tree.\n\n\
            Walks the option graph from ROOT, applying modifiers from parent \
            to child (final modifiers cannot be overridden), and prints each \
            node with its effective value and visibility. Cycles in the graph \
            are cut and reported as '(cycle)'.\n\n\
            Without ROOT or --template, the configured default_root is used.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Resolve every option root of a template
    linkage resolve --template Buildings.Templates.AirHandlersFans.VAVMultiZone

    # Resolve a single option subtree as JSON
    linkage resolve Buildings.Templates.AirHandlersFans.VAVMultiZone.fanSupDra --json"
    )]
    Resolve {
        /// Root option path
        root: Option<String>,

        /// Resolve a template instead of a single option
        #[arg(long, value_name = "PATH", conflicts_with = "root")]
        template: Option<String>,
    },

    /// Export the option catalog as CSV
    #[command(name = "export-csv")]
    ExportCsv {
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Row separator: crlf or lf (default from config, else crlf)
        #[arg(long, value_name = "ENDING")]
        line_ending: Option<LineEnding>,
    },

    /// Flatten a configuration set into sequence data (JSON)
    #[command(name = "sequence")]
    Sequence {
        /// Configuration set file
        configs: PathBuf,
    },

    /// Build the model-generation document for one configuration (JSON)
    #[command(name = "document")]
    Document {
        /// Configuration set file
        configs: PathBuf,

        /// Configuration id
        id: String,
    },

    /// Create and edit configurations in a configuration set file
    #[command(
        name = "select",
        after_help = "\
WORKFLOW EXAMPLES:
    # Start a configuration for a template (creates the file if needed)
    linkage select project.json new --template Buildings.Templates.AirHandlersFans.VAVMultiZone

    # Choose a value; VALUE is parsed as JSON, else taken as a string
    linkage select project.json set <ID> Buildings.Templates.AirHandlersFans.VAVMultiZone.have_senPreBui true

    # Find selections left behind by a catalog update
    linkage select project.json stale <ID>"
    )]
    Select {
        /// Configuration set file
        configs: PathBuf,

        #[command(subcommand)]
        action: SelectAction,
    },

    /// Get, set, or list configuration values
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion for Linkage commands.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    linkage completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    linkage completion zsh >> ~/.zshrc

    # Fish
    linkage completion fish > ~/.config/fish/completions/linkage.fish

    # PowerShell
    linkage completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Configuration set subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SelectAction {
    /// Create a configuration for a template
    New {
        /// Template path
        #[arg(long, value_name = "PATH")]
        template: String,

        /// System type the configuration is for
        #[arg(long, value_name = "PATH")]
        system_type: Option<String>,

        /// Configuration name
        #[arg(long)]
        name: Option<String>,
    },
    /// List configurations
    List,
    /// Choose a value for an option
    Set {
        /// Configuration id
        id: String,
        /// Option path
        option: String,
        /// Value (JSON literal, or a plain string)
        value: String,
    },
    /// Remove a chosen value
    Clear {
        /// Configuration id
        id: String,
        /// Option path
        option: String,
    },
    /// Rename a configuration
    Rename {
        /// Configuration id
        id: String,
        /// New name
        name: String,
    },
    /// Set how many instances a configuration needs
    Quantity {
        /// Configuration id
        id: String,
        /// Quantity (at least 1)
        quantity: u32,
    },
    /// Lock or unlock a configuration
    Lock {
        /// Configuration id
        id: String,
    },
    /// Remove a configuration
    Remove {
        /// Configuration id
        id: String,
    },
    /// Remove every configuration of a template
    RemoveAll {
        /// Template path
        #[arg(long, value_name = "PATH")]
        template: String,

        /// Only those for this system type
        #[arg(long, value_name = "PATH")]
        system_type: Option<String>,
    },
    /// List selections that no longer resolve under the catalog
    Stale {
        /// Configuration id
        id: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
        /// Write to the global config instead of ./linkage.toml
        #[arg(long)]
        global: bool,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
