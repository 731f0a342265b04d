//! Page frontmatter consumed by the notebook exporter
//!
//! Only the keys the exporter reads are modelled; everything else in the
//! MyST frontmatter is ignored.

use crate::options::{ImageMode, MarkdownFormat};
use serde::{Deserialize, Serialize};

/// Document frontmatter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frontmatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernelspec: Option<Kernelspec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<ExportEntry>,
}

/// Jupyter kernel description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kernelspec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// One entry of the frontmatter `exports` list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<String>,
}

impl ExportEntry {
    /// Whether this entry requests a Jupyter notebook
    pub fn is_ipynb(&self) -> bool {
        match &self.format {
            Some(format) => format.eq_ignore_ascii_case("ipynb"),
            None => self
                .output
                .as_deref()
                .is_some_and(|o| o.to_ascii_lowercase().ends_with(".ipynb")),
        }
    }

    /// Requested markdown format; unrecognised values are ignored
    pub fn markdown_format(&self) -> Option<MarkdownFormat> {
        self.markdown.as_deref().and_then(|m| m.parse().ok())
    }

    /// Requested image mode; unrecognised values are ignored
    pub fn image_mode(&self) -> Option<ImageMode> {
        self.images.as_deref().and_then(|m| m.parse().ok())
    }
}

impl Frontmatter {
    /// The first export entry targeting ipynb
    pub fn ipynb_export(&self) -> Option<&ExportEntry> {
        self.exports.iter().find(|e| e.is_ipynb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_frontmatter() {
        let fm: Frontmatter = serde_json::from_str(
            r#"{
                "title": "Intro",
                "authors": [{"name": "Someone"}],
                "kernelspec": {"name": "python3", "display_name": "Python 3"},
                "exports": [
                    {"format": "pdf"},
                    {"format": "ipynb", "output": "out/intro.ipynb", "markdown": "commonmark", "images": "attachment"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(fm.title.as_deref(), Some("Intro"));
        let ks = fm.kernelspec.as_ref().unwrap();
        assert_eq!(ks.name.as_deref(), Some("python3"));
        assert_eq!(ks.language, None);

        let export = fm.ipynb_export().unwrap();
        assert_eq!(export.output.as_deref(), Some("out/intro.ipynb"));
        assert_eq!(export.markdown_format(), Some(MarkdownFormat::Commonmark));
        assert_eq!(export.image_mode(), Some(ImageMode::Attachment));
    }

    #[test]
    fn test_ipynb_export_by_extension() {
        let entry = ExportEntry {
            output: Some("nb/Intro.IPYNB".to_string()),
            ..Default::default()
        };
        assert!(entry.is_ipynb());
        assert!(!ExportEntry::default().is_ipynb());
    }

    #[test]
    fn test_unknown_export_values_are_ignored() {
        let entry = ExportEntry {
            format: Some("ipynb".to_string()),
            markdown: Some("gfm".to_string()),
            ..Default::default()
        };
        assert_eq!(entry.markdown_format(), None);
        assert_eq!(entry.image_mode(), None);
    }
}
