//! config
//!
//! Tool configuration loading.
//!
//! # Overview
//!
//! Linkage has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: `linkage.toml` in the working directory
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$LINKAGE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/linkage/config.toml`
//! 3. `~/.linkage/config.toml` (canonical write location)
//!
//! Relative `catalog` paths are taken relative to the file that set them.
//!
//! # Example
//!
//! ```no_run
//! use linkage::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("."))).unwrap();
//! if let Some(catalog) = config.catalog() {
//!     println!("Catalog: {}", catalog.display());
//! }
//! println!("Line ending: {:?}", config.line_ending());
//! ```

pub mod schema;

pub use schema::{OutputFormat, ToolConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::export::csv::LineEnding;

/// File name of the project config.
pub const PROJECT_CONFIG_FILE: &str = "linkage.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ToolConfig,
    /// Project configuration (if present)
    pub project: Option<ToolConfig>,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `project_dir` is provided, also loads `linkage.toml` from it.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or
    /// hold invalid values. Missing files are not an error.
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(Self::find_global().as_deref(), project_dir)
    }

    /// Load configuration from an explicit global file and project
    /// directory.
    pub fn load_from(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let (global, global_path) = match global_path {
            Some(path) if path.exists() => (Self::read_config(path)?, Some(path.to_path_buf())),
            _ => (ToolConfig::default(), None),
        };

        let (project, project_path) = match project_dir.map(Self::project_config_path) {
            Some(path) if path.exists() => (Some(Self::read_config(&path)?), Some(path)),
            _ => (None, None),
        };

        global.validate()?;
        if let Some(ref p) = project {
            p.validate()?;
        }

        tracing::debug!(
            global = ?global_path,
            project = ?project_path,
            "loaded configuration"
        );

        Ok(Config {
            global,
            project,
            global_path,
            project_path,
        })
    }

    /// First existing global config file, by search order.
    fn find_global() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("LINKAGE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("linkage/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".linkage/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    pub fn read_config(path: &Path) -> Result<ToolConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for global config.
    ///
    /// Returns `~/.linkage/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".linkage/config.toml"))
    }

    /// Get the path for project config in a directory.
    pub fn project_config_path(project_dir: &Path) -> PathBuf {
        project_dir.join(PROJECT_CONFIG_FILE)
    }

    /// Write a config file atomically.
    pub fn write_atomic(path: &Path, config: &ToolConfig) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        write_file_atomic(path, &contents)
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Catalog document path, resolved against the file that set it.
    pub fn catalog(&self) -> Option<PathBuf> {
        let from_project = self
            .project
            .as_ref()
            .and_then(|p| p.catalog.as_ref())
            .map(|c| relative_to(self.project_path.as_deref(), c));

        from_project.or_else(|| {
            self.global
                .catalog
                .as_ref()
                .map(|c| relative_to(self.global_path.as_deref(), c))
        })
    }

    /// Default root option path for `resolve`.
    pub fn default_root(&self) -> Option<&str> {
        self.project
            .as_ref()
            .and_then(|p| p.default_root.as_deref())
            .or(self.global.default_root.as_deref())
    }

    /// CSV row separator. Defaults to CRLF.
    pub fn line_ending(&self) -> LineEnding {
        let pick = |c: &ToolConfig| c.export.as_ref().and_then(|e| e.line_ending);
        self.project
            .as_ref()
            .and_then(pick)
            .or_else(|| pick(&self.global))
            .unwrap_or_default()
    }

    /// Output format. Defaults to text.
    pub fn output_format(&self) -> OutputFormat {
        let pick = |c: &ToolConfig| c.output.as_ref().and_then(|o| o.format);
        self.project
            .as_ref()
            .and_then(pick)
            .or_else(|| pick(&self.global))
            .unwrap_or_default()
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded project config file.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}

/// Write a file atomically.
///
/// Creates parent directories if needed. Writes to a temp file in the
/// same directory, then renames it over the target.
pub fn write_file_atomic(path: &Path, contents: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(contents.as_bytes())
        .map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

    file.sync_all().map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

fn relative_to(config_file: Option<&Path>, path: &Path) -> PathBuf {
    match config_file.and_then(Path::parent) {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}
