//! Export options for notebook assembly

use crate::attachments::ImageDataMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Markdown dialect written into markdown cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownFormat {
    /// Keep MyST directives and roles
    #[default]
    Myst,
    /// Degrade MyST constructs to plain CommonMark
    Commonmark,
}

/// How images are referenced from markdown cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    /// Leave image URLs as external references
    #[default]
    Reference,
    /// Embed local images as base64 cell attachments
    Attachment,
}

/// Error for an unrecognised option value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {option} value '{value}' (expected one of: {expected})")]
pub struct InvalidOption {
    pub option: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl FromStr for MarkdownFormat {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "myst" => Ok(Self::Myst),
            "commonmark" => Ok(Self::Commonmark),
            _ => Err(InvalidOption {
                option: "markdown",
                value: s.to_string(),
                expected: "myst, commonmark",
            }),
        }
    }
}

impl fmt::Display for MarkdownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Myst => f.write_str("myst"),
            Self::Commonmark => f.write_str("commonmark"),
        }
    }
}

impl FromStr for ImageMode {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reference" => Ok(Self::Reference),
            "attachment" => Ok(Self::Attachment),
            _ => Err(InvalidOption {
                option: "images",
                value: s.to_string(),
                expected: "reference, attachment",
            }),
        }
    }
}

impl fmt::Display for ImageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference => f.write_str("reference"),
            Self::Attachment => f.write_str("attachment"),
        }
    }
}

/// Options for the CommonMark degrader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommonMarkOptions {
    /// Remove solution directives entirely
    pub drop_solutions: bool,
}

/// Image handling for one export
///
/// Attachment mode carries the image data collected for the document.
#[derive(Debug, Clone, Copy, Default)]
pub enum Images<'a> {
    #[default]
    Reference,
    Attachment(&'a ImageDataMap),
}

/// Options for notebook assembly
#[derive(Debug, Clone, Copy, Default)]
pub struct IpynbOptions<'a> {
    pub markdown: MarkdownFormat,
    pub commonmark: CommonMarkOptions,
    pub images: Images<'a>,
}

impl IpynbOptions<'_> {
    /// Whether solutions will be removed by the CommonMark pass
    pub fn drops_solutions(&self) -> bool {
        self.markdown == MarkdownFormat::Commonmark && self.commonmark.drop_solutions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markdown_format() {
        assert_eq!("myst".parse::<MarkdownFormat>(), Ok(MarkdownFormat::Myst));
        assert_eq!(
            "CommonMark".parse::<MarkdownFormat>(),
            Ok(MarkdownFormat::Commonmark)
        );
        let err = "gfm".parse::<MarkdownFormat>().unwrap_err();
        assert_eq!(err.option, "markdown");
        assert!(err.to_string().contains("'gfm'"));
    }

    #[test]
    fn test_parse_image_mode() {
        assert_eq!("attachment".parse::<ImageMode>(), Ok(ImageMode::Attachment));
        assert!("inline".parse::<ImageMode>().is_err());
        assert_eq!(ImageMode::Reference.to_string(), "reference");
    }

    #[test]
    fn test_drops_solutions_only_in_commonmark() {
        let mut options = IpynbOptions {
            commonmark: CommonMarkOptions {
                drop_solutions: true,
            },
            ..Default::default()
        };
        assert!(!options.drops_solutions());
        options.markdown = MarkdownFormat::Commonmark;
        assert!(options.drops_solutions());
    }
}
