//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use sift_extractor::{ExtractorConfig, Language, SchemaCatalog, SchemaConfig, Strategy};
use sift_llm::LlamaCppConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Language-model server
    #[serde(default)]
    pub model: LlamaCppConfig,

    /// Protocol settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Defaults for command-line options
    #[serde(default)]
    pub defaults: Defaults,

    /// Prompt overrides applied on top of the built-in schemas
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<SchemaConfig>,
}

/// Defaults used when an option is not given on the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Prompt language
    pub language: Language,

    /// Conversation strategy
    pub strategy: Strategy,

    /// Output format
    pub format: OutputFormat,

    /// Enable colored output
    pub color: bool,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Human-readable text
    Text,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            language: Language::De,
            strategy: Strategy::Advanced,
            format: OutputFormat::Json,
            color: true,
        }
    }
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".sift").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that TOML parsing alone cannot.
    pub fn validate(&self) -> Result<()> {
        self.extractor.validate().map_err(CliError::Config)?;
        if self.model.endpoint.trim().is_empty() {
            return Err(CliError::Config("model.endpoint must not be empty".into()));
        }
        Ok(())
    }

    /// Built-in schemas with this configuration's overrides applied.
    pub fn catalog(&self) -> Result<SchemaCatalog> {
        let mut catalog = SchemaCatalog::builtin();
        catalog.apply(self.schemas.iter().cloned())?;
        Ok(catalog)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_extractor::PromptSchema;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.language, Language::De);
        assert_eq!(config.defaults.strategy, Strategy::Advanced);
        assert_eq!(config.model.endpoint, "http://localhost:8080");
        assert!(config.schemas.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[model]
endpoint = "http://gpu-box:8081"
model = "llama-3-8b-instruct"

[defaults]
language = "en"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.model.endpoint, "http://gpu-box:8081");
        assert_eq!(config.model.model, "llama-3-8b-instruct");
        assert_eq!(config.model.timeout_secs, 120);
        assert_eq!(config.defaults.language, Language::En);
        assert_eq!(config.defaults.strategy, Strategy::Advanced);
        assert_eq!(config.extractor, ExtractorConfig::default());
    }

    #[test]
    fn test_model_table_with_endpoint_only() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[model]\nendpoint = \"http://gpu-box:8081\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.model.endpoint, "http://gpu-box:8081");
        assert_eq!(config.model.model, "default");
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_invalid_extractor_settings_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[extractor]\nmax_concurrent_requests = 0").unwrap();

        let result = Config::load(Some(file.path()));
        assert!(matches!(result, Err(CliError::Config(ref m)) if m.contains("max_concurrent_requests")));
    }

    #[test]
    fn test_schema_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[schemas]]
language = "en"
strategy = "simple"
system = "You find names."
prefix = "Text:"
suffix = "List every name."
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        let catalog = config.catalog().unwrap();
        let schema = catalog.lookup(Language::En, Strategy::Simple).unwrap();
        assert!(matches!(schema.as_ref(), PromptSchema::Simple(s) if s.suffix == "List every name."));
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let toml_str = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
