//! Configuration file support for myst2ipynb CLI
//!
//! Loads settings from `_myst2ipynb.toml` configuration file.

use anyhow::{Context, Result};
use myst2ipynb_core::{ImageMode, MarkdownFormat};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name (following MyST's `myst.yml` project convention)
pub const CONFIG_FILE_NAME: &str = "_myst2ipynb.toml";

/// Schema URL for the configuration file
pub const SCHEMA_URL: &str = "https://raw.githubusercontent.com/myst2ipynb/myst2ipynb/main/crates/myst2ipynb-cli/schema/myst2ipynb.schema.json";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Markdown cell configuration
    #[serde(skip_serializing_if = "MarkdownConfig::is_empty")]
    pub markdown: MarkdownConfig,
    /// Image handling configuration
    #[serde(skip_serializing_if = "ImagesConfig::is_empty")]
    pub images: ImagesConfig,
    /// Batch export configuration
    #[serde(skip_serializing_if = "BatchConfig::is_empty")]
    pub batch: BatchConfig,
}

/// Markdown cell configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Markdown dialect: "myst" (keep directives and roles) or "commonmark" (default: "myst")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Remove solution blocks when writing CommonMark (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_solutions: Option<bool>,
}

impl MarkdownConfig {
    fn is_empty(&self) -> bool {
        self.format.is_none() && self.drop_solutions.is_none()
    }
}

/// Image handling configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ImagesConfig {
    /// Image mode: "reference" (keep URLs) or "attachment" (embed local images) (default: "reference")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Directory that `/`-prefixed image URLs are relative to, resolved against this file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_root: Option<PathBuf>,
}

impl ImagesConfig {
    fn is_empty(&self) -> bool {
        self.mode.is_none() && self.source_root.is_none()
    }
}

/// Batch export configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct BatchConfig {
    /// Process directories recursively (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,
    /// Number of parallel jobs (default: number of CPUs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

impl BatchConfig {
    fn is_empty(&self) -> bool {
        self.recursive.is_none() && self.jobs.is_none()
    }
}

impl Config {
    /// Load configuration from a specific file path
    ///
    /// A relative `images.source_root` is resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Some(root) = &config.images.source_root
            && root.is_relative()
            && let Some(dir) = path.parent()
        {
            config.images.source_root = Some(dir.join(root));
        }

        Ok(config)
    }

    /// Try to load configuration from a directory (looks for `_myst2ipynb.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Configured markdown format, validated
    pub fn markdown_format(&self) -> Result<Option<MarkdownFormat>> {
        self.markdown
            .format
            .as_deref()
            .map(str::parse::<MarkdownFormat>)
            .transpose()
            .context("Invalid [markdown] format in config")
    }

    /// Configured image mode, validated
    pub fn image_mode(&self) -> Result<Option<ImageMode>> {
        self.images
            .mode
            .as_deref()
            .map(str::parse::<ImageMode>)
            .transpose()
            .context("Invalid [images] mode in config")
    }

    /// Generate JSON schema for the configuration
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = Self::json_schema();
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to TOML string with schema directive
    pub fn to_toml_with_schema(&self) -> Result<String> {
        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        Ok(format!("#:schema {}\n\n{}", SCHEMA_URL, toml_content))
    }

    /// Create a sample configuration with common defaults for init command
    pub fn sample() -> Self {
        Config {
            markdown: MarkdownConfig {
                format: Some(MarkdownFormat::Myst.to_string()),
                drop_solutions: Some(false),
            },
            images: ImagesConfig {
                mode: Some(ImageMode::Reference.to_string()),
                source_root: None, // defaults to the input directory
            },
            batch: BatchConfig {
                recursive: Some(true),
                jobs: None,
            },
        }
    }
}
