//! Jupyter Notebook (nbformat 4.2) output types
//!
//! Field order follows what Jupyter writes, so the serialized JSON matches
//! notebooks produced by other tools.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// nbformat major version
pub const NBFORMAT: u32 = 4;
/// nbformat minor version
pub const NBFORMAT_MINOR: u32 = 2;
/// Language used when the frontmatter has no kernelspec
pub const DEFAULT_LANGUAGE: &str = "python";

/// A Jupyter notebook document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    pub metadata: NotebookMetadata,
    pub nbformat: u32,
    pub nbformat_minor: u32,
}

impl Notebook {
    pub fn new(cells: Vec<Cell>, metadata: NotebookMetadata) -> Self {
        Self {
            cells,
            metadata,
            nbformat: NBFORMAT,
            nbformat_minor: NBFORMAT_MINOR,
        }
    }

    /// Pretty-printed JSON with a trailing newline
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Notebook-level metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotebookMetadata {
    pub language_info: LanguageInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernelspec: Option<KernelspecMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageInfo {
    pub name: String,
}

/// Kernel description; nbformat requires `name` and `display_name`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KernelspecMetadata {
    pub name: String,
    pub display_name: String,
    pub language: String,
}

/// A notebook cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Markdown {
        metadata: Map<String, Value>,
        source: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attachments: Option<Attachments>,
    },
    Code {
        execution_count: Option<u32>,
        metadata: Map<String, Value>,
        outputs: Vec<Value>,
        source: Vec<String>,
    },
}

impl Cell {
    /// Markdown cell; trailing newlines of `md` are dropped
    pub fn markdown(md: &str, attachments: Option<Attachments>) -> Self {
        Cell::Markdown {
            metadata: Map::new(),
            source: split_source(md.trim_end_matches('\n')),
            attachments,
        }
    }

    /// Code cell that has not been executed
    pub fn code(code: &str) -> Self {
        Cell::Code {
            execution_count: None,
            metadata: Map::new(),
            outputs: Vec::new(),
            source: split_source(code),
        }
    }

    pub fn source(&self) -> &[String] {
        match self {
            Cell::Markdown { source, .. } | Cell::Code { source, .. } => source,
        }
    }

    /// Source joined back into a single string
    pub fn source_text(&self) -> String {
        self.source().concat()
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Cell::Code { .. })
    }

    pub fn attachments(&self) -> Option<&Attachments> {
        match self {
            Cell::Markdown { attachments, .. } => attachments.as_ref(),
            Cell::Code { .. } => None,
        }
    }

    /// Markdown cell with nothing but whitespace
    pub fn is_blank_markdown(&self) -> bool {
        !self.is_code() && self.source().iter().all(|line| line.trim().is_empty())
    }
}

/// MIME type to base64 payload
pub type MimeBundle = BTreeMap<String, String>;

/// Cell attachments, serialized as a JSON object in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments {
    entries: Vec<(String, MimeBundle)>,
}

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attachment; an existing name is replaced in place
    pub fn insert(&mut self, name: impl Into<String>, bundle: MimeBundle) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = bundle,
            None => self.entries.push((name, bundle)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&MimeBundle> {
        self.entries
            .iter()
            .find_map(|(n, bundle)| (n == name).then_some(bundle))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Attachment names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Attachments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, bundle) in &self.entries {
            map.serialize_entry(name, bundle)?;
        }
        map.end()
    }
}

/// Split text into notebook source lines.
///
/// Every line keeps its trailing newline except the last.
pub fn split_source(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_source() {
        assert_eq!(split_source("a\nb"), vec!["a\n", "b"]);
        assert_eq!(split_source("a\n\nb"), vec!["a\n", "\n", "b"]);
        assert!(split_source("").is_empty());
    }

    #[test]
    fn test_markdown_cell_trims_trailing_newlines() {
        let cell = Cell::markdown("# Title\n\ntext\n\n", None);
        assert_eq!(cell.source(), ["# Title\n", "\n", "text"]);
        assert!(!cell.is_blank_markdown());
        assert!(Cell::markdown(" \n\n", None).is_blank_markdown());
        assert!(!Cell::code("").is_blank_markdown());
    }

    #[test]
    fn test_code_cell_json() {
        let value = serde_json::to_value(Cell::code("x = 1\nprint(x)")).unwrap();
        assert_eq!(
            value,
            json!({
                "cell_type": "code",
                "execution_count": null,
                "metadata": {},
                "outputs": [],
                "source": ["x = 1\n", "print(x)"]
            })
        );
    }

    #[test]
    fn test_markdown_cell_omits_missing_attachments() {
        let value = serde_json::to_value(Cell::markdown("hi", None)).unwrap();
        assert_eq!(
            value,
            json!({"cell_type": "markdown", "metadata": {}, "source": ["hi"]})
        );
    }

    #[test]
    fn test_attachments_keep_insertion_order() {
        let mut attachments = Attachments::new();
        attachments.insert("z.png", MimeBundle::from([("image/png".to_string(), "Wg==".to_string())]));
        attachments.insert("a.png", MimeBundle::from([("image/png".to_string(), "QQ==".to_string())]));

        let json = serde_json::to_string(&attachments).unwrap();
        assert_eq!(
            json,
            r#"{"z.png":{"image/png":"Wg=="},"a.png":{"image/png":"QQ=="}}"#
        );
        assert_eq!(attachments.names().collect::<Vec<_>>(), ["z.png", "a.png"]);
    }

    #[test]
    fn test_notebook_json_layout() {
        let notebook = Notebook::new(
            vec![Cell::markdown("# Hi", None)],
            NotebookMetadata {
                language_info: LanguageInfo {
                    name: DEFAULT_LANGUAGE.to_string(),
                },
                kernelspec: None,
            },
        );
        let json = notebook.to_json_string().unwrap();
        insta::assert_snapshot!(json.trim_end(), @r##"
        {
          "cells": [
            {
              "cell_type": "markdown",
              "metadata": {},
              "source": [
                "# Hi"
              ]
            }
          ],
          "metadata": {
            "language_info": {
              "name": "python"
            }
          },
          "nbformat": 4,
          "nbformat_minor": 2
        }
        "##);
    }
}
