//! config::schema
//!
//! Tool configuration schema.
//!
//! The same schema is used for the global file and the project file
//! (`linkage.toml`); project values override global ones key by key.
//!
//! # Validation
//!
//! Values are validated after parsing: `default_root` must be a valid
//! option path and `catalog` must not be empty.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::ModelicaPath;
use crate::export::csv::LineEnding;

/// Tool configuration for one scope.
///
/// # Example
///
/// ```toml
/// catalog = "catalog/templates.json"
/// default_root = "Buildings.Templates.AirHandlersFans.VAVMultiZone"
///
/// [export]
/// line_ending = "crlf"
///
/// [output]
/// format = "text"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Catalog document used when `--catalog` is not given
    pub catalog: Option<PathBuf>,

    /// Root option resolved when `resolve` gets no path
    pub default_root: Option<String>,

    /// Export settings
    pub export: Option<ExportConfig>,

    /// Output settings
    pub output: Option<OutputConfig>,
}

/// Export settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub line_ending: Option<LineEnding>,
}

/// Output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
}

/// How commands print their results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}', expected 'text' or 'json'")),
        }
    }
}

impl ToolConfig {
    /// Keys accepted by [`ToolConfig::get`] and [`ToolConfig::set`].
    pub const KEYS: &'static [&'static str] =
        &["catalog", "default_root", "export.line_ending", "output.format"];

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(root) = &self.default_root {
            ModelicaPath::new(root.as_str()).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid default_root: {}", e))
            })?;
        }

        if let Some(catalog) = &self.catalog {
            if catalog.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "catalog cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Read a value by dotted key, as text.
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "catalog" => self.catalog.as_ref().map(|p| p.display().to_string()),
            "default_root" => self.default_root.clone(),
            "export.line_ending" => self
                .export
                .as_ref()
                .and_then(|e| e.line_ending)
                .map(|l| l.to_string()),
            "output.format" => self
                .output
                .as_ref()
                .and_then(|o| o.format)
                .map(|f| f.to_string()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a value by dotted key, parsing and validating it.
    ///
    /// The config is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut updated = self.clone();
        match key {
            "catalog" => updated.catalog = Some(PathBuf::from(value)),
            "default_root" => updated.default_root = Some(value.to_string()),
            "export.line_ending" => {
                let line_ending = value.parse().map_err(ConfigError::InvalidValue)?;
                updated.export.get_or_insert_with(Default::default).line_ending = Some(line_ending);
            }
            "output.format" => {
                let format = value.parse().map_err(ConfigError::InvalidValue)?;
                updated.output.get_or_insert_with(Default::default).format = Some(format);
            }
            _ => return Err(unknown_key(key)),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::InvalidValue(format!(
        "unknown config key '{}', must be one of: {}",
        key,
        ToolConfig::KEYS.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full() {
        let config: ToolConfig = toml::from_str(
            r#"
            catalog = "templates.json"
            default_root = "Buildings.Templates.VAV"

            [export]
            line_ending = "lf"

            [output]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog, Some(PathBuf::from("templates.json")));
        assert_eq!(config.export.unwrap().line_ending, Some(LineEnding::Lf));
        assert_eq!(config.output.unwrap().format, Some(OutputFormat::Json));
    }

    #[test]
    fn empty_is_default() {
        let config: ToolConfig = toml::from_str("").unwrap();
        assert_eq!(config, ToolConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(toml::from_str::<ToolConfig>("bogus = 1").is_err());
        assert!(toml::from_str::<ToolConfig>("[export]\nquote = true").is_err());
    }

    #[test]
    fn bad_line_ending_rejected() {
        assert!(toml::from_str::<ToolConfig>("[export]\nline_ending = \"cr\"").is_err());
    }

    #[test]
    fn invalid_default_root_rejected() {
        let config = ToolConfig {
            default_root: Some("a..b".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn get_and_set_by_key() {
        let mut config = ToolConfig::default();
        assert_eq!(config.get("export.line_ending").unwrap(), None);

        config.set("export.line_ending", "lf").unwrap();
        config.set("default_root", "a.b").unwrap();

        assert_eq!(config.get("export.line_ending").unwrap().as_deref(), Some("lf"));
        assert_eq!(config.get("default_root").unwrap().as_deref(), Some("a.b"));
    }

    #[test]
    fn set_rejects_bad_values_without_change() {
        let mut config = ToolConfig::default();
        assert!(config.set("default_root", ".bad").is_err());
        assert!(config.set("output.format", "yaml").is_err());
        assert!(config.set("nope", "x").is_err());
        assert_eq!(config, ToolConfig::default());
    }
}
