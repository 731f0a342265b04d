//! MyST page JSON as written by the MyST build

use crate::{ProjectError, Result};
use myst2ipynb_core::Frontmatter;
use myst_mdast::Root;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// A parsed page: frontmatter plus the mdast tree
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MystPage {
    #[serde(default)]
    pub frontmatter: Frontmatter,
    pub mdast: Root,
}

impl MystPage {
    /// Parse a page from JSON.
    ///
    /// Accepts the build output (`{"frontmatter": ..., "mdast": ...}`) or a
    /// bare mdast root, which gets empty frontmatter.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(json)?;

        if value.get("mdast").is_some() {
            return serde_json::from_value(value);
        }
        if value.get("type").and_then(Value::as_str) == Some("root") {
            return Ok(Self {
                frontmatter: Frontmatter::default(),
                mdast: serde_json::from_value(value)?,
            });
        }

        Err(<serde_json::Error as serde::de::Error>::custom(
            "expected a MyST page with an `mdast` field or an mdast root",
        ))
    }

    /// Read and parse a page file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|source| ProjectError::Json {
            file: path.to_path_buf(),
            source,
        })
    }
}
