//! Rewrite image references in serialized markdown into cell attachments
//!
//! Runs on the markdown string after serialization, so the AST transforms
//! never need to know about notebook attachment syntax.

use crate::notebook::{Attachments, MimeBundle};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Base64 image payload for one image URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDataEntry {
    pub mime: String,
    /// Base64-encoded file contents
    pub data: String,
}

/// Image payloads keyed by the URL as it appears in the serialized markdown
pub type ImageDataMap = HashMap<String, ImageDataEntry>;

/// Result of [`embed_image_attachments`]
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedMarkdown {
    pub md: String,
    /// `None` when no image was rewritten
    pub attachments: Option<Attachments>,
}

/// `![alt](url)`, `![alt](<url>)` or either with a `"title"`, allowing
/// backslash escapes in alt, url and title
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"!\[((?:\\.|[^\]\\])*)\]\((?:<((?:\\.|[^<>\\\n])*)>|((?:\\.|[^\s()\\])+))(?:\s+"(?:\\.|[^"\\])*")?\)"#,
    )
    .expect("image regex is valid")
});

/// Replace references to known images with `attachment:<name>` links.
///
/// Images whose URL is not in `images` are left alone. A URL referenced
/// several times in the same markdown shares one attachment.
pub fn embed_image_attachments(md: &str, images: &ImageDataMap) -> EmbeddedMarkdown {
    if images.is_empty() {
        return unchanged(md);
    }

    let mut attachments = Attachments::new();
    let mut names_by_url: HashMap<String, String> = HashMap::new();

    let rewritten = IMAGE_RE.replace_all(md, |caps: &Captures| {
        let alt = &caps[1];
        let Some(raw_url) = caps.get(2).or_else(|| caps.get(3)) else {
            return caps[0].to_string();
        };
        let url = unescape_url(raw_url.as_str());

        let Some(entry) = images.get(&url) else {
            return caps[0].to_string();
        };

        let name = match names_by_url.get(&url) {
            Some(name) => name.clone(),
            None => {
                let name = unique_name(&attachment_basename(&url), &attachments);
                attachments.insert(
                    name.clone(),
                    MimeBundle::from([(entry.mime.clone(), entry.data.clone())]),
                );
                names_by_url.insert(url, name.clone());
                name
            }
        };

        format!("![{alt}]({})", attachment_destination(&name))
    });

    if attachments.is_empty() {
        return unchanged(md);
    }

    EmbeddedMarkdown {
        md: rewritten.into_owned(),
        attachments: Some(attachments),
    }
}

fn unchanged(md: &str) -> EmbeddedMarkdown {
    EmbeddedMarkdown {
        md: md.to_string(),
        attachments: None,
    }
}

/// Undo the writer's escaping of brackets, parentheses and angle brackets
fn unescape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut chars = url.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next @ ('(' | ')' | '[' | ']' | '<' | '>')) = chars.peek() {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// `attachment:<name>` as a link destination, escaped the way the writer
/// escapes image URLs
fn attachment_destination(name: &str) -> String {
    if name.contains(|c: char| c.is_whitespace() || c == '<' || c == '>') {
        format!(
            "<attachment:{}>",
            name.replace('<', "\\<").replace('>', "\\>")
        )
    } else {
        format!(
            "attachment:{}",
            name.replace('(', "\\(").replace(')', "\\)")
        )
    }
}

/// Last path segment of `url`, without query string or fragment
fn attachment_basename(url: &str) -> String {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = url[..end].trim_end_matches('/');
    match path.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => "image".to_string(),
    }
}

/// `name`, or `stem_N.ext` with the smallest N not yet taken
fn unique_name(name: &str, taken: &Attachments) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    };

    (1..)
        .map(|n| format!("{stem}_{n}{ext}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(data: &str) -> ImageDataEntry {
        ImageDataEntry {
            mime: "image/png".to_string(),
            data: data.to_string(),
        }
    }

    fn map(entries: &[(&str, ImageDataEntry)]) -> ImageDataMap {
        entries
            .iter()
            .map(|(url, entry)| (url.to_string(), entry.clone()))
            .collect()
    }

    #[test]
    fn test_rewrites_known_image() {
        let images = map(&[("/_static/img/chart.png", png("AAAA"))]);
        let result = embed_image_attachments("![Chart](/_static/img/chart.png)", &images);

        assert_eq!(result.md, "![Chart](attachment:chart.png)");
        let attachments = result.attachments.unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(
            attachments.get("chart.png").unwrap().get("image/png").map(String::as_str),
            Some("AAAA")
        );
    }

    #[test]
    fn test_empty_map_returns_input() {
        let md = "![Chart](/img/chart.png)";
        let result = embed_image_attachments(md, &ImageDataMap::new());
        assert_eq!(result.md, md);
        assert!(result.attachments.is_none());
    }

    #[test]
    fn test_unknown_url_is_left_alone() {
        let images = map(&[("/img/a.png", png("AAAA"))]);
        let md = "![remote](https://example.com/b.png)";
        let result = embed_image_attachments(md, &images);
        assert_eq!(result.md, md);
        assert!(result.attachments.is_none());
    }

    #[test]
    fn test_basename_collisions_are_numbered() {
        let images = map(&[
            ("/dir1/img.png", png("ONE")),
            ("/dir2/img.png", png("TWO")),
            ("/dir3/img.png", png("THREE")),
        ]);
        let md = "![a](/dir1/img.png) ![b](/dir2/img.png) ![c](/dir3/img.png)";
        let result = embed_image_attachments(md, &images);

        assert_eq!(
            result.md,
            "![a](attachment:img.png) ![b](attachment:img_1.png) ![c](attachment:img_2.png)"
        );
        let attachments = result.attachments.unwrap();
        assert_eq!(
            attachments.names().collect::<Vec<_>>(),
            ["img.png", "img_1.png", "img_2.png"]
        );
        assert_eq!(
            attachments.get("img_1.png").unwrap()["image/png"],
            "TWO"
        );
    }

    #[test]
    fn test_repeated_url_reuses_attachment() {
        let images = map(&[("/img/a.png", png("AAAA"))]);
        let md = "![first](/img/a.png)\n\n![second](/img/a.png)";
        let result = embed_image_attachments(md, &images);

        assert_eq!(
            result.md,
            "![first](attachment:a.png)\n\n![second](attachment:a.png)"
        );
        assert_eq!(result.attachments.unwrap().len(), 1);
    }

    #[test]
    fn test_escaped_url_and_alt() {
        let images = map(&[("/img/plot(1).png", png("AAAA"))]);
        let md = r"![a \[b\]](/img/plot\(1\).png)";
        let result = embed_image_attachments(md, &images);

        assert_eq!(result.md, r"![a \[b\]](attachment:plot\(1\).png)");
        assert!(result.attachments.unwrap().contains("plot(1).png"));
    }

    #[test]
    fn test_angle_bracket_url_and_quoted_title() {
        let images = map(&[
            ("/img/my chart.png", png("ONE")),
            ("/img/<q>.png", png("TWO")),
        ]);
        let md = r#"![c](</img/my chart.png>) ![q](</img/\<q\>.png> "say \"hi\"")"#;
        let result = embed_image_attachments(md, &images);

        assert_eq!(
            result.md,
            r"![c](<attachment:my chart.png>) ![q](<attachment:\<q\>.png>)"
        );
        let attachments = result.attachments.unwrap();
        assert_eq!(
            attachments.names().collect::<Vec<_>>(),
            ["my chart.png", "<q>.png"]
        );
    }

    #[test]
    fn test_title_is_dropped_and_query_stripped() {
        let images = map(&[("img/diagram.svg?v=2#top", png("SVG"))]);
        let md = r#"![D](img/diagram.svg?v=2#top "A diagram")"#;
        let result = embed_image_attachments(md, &images);
        assert_eq!(result.md, "![D](attachment:diagram.svg)");
    }

    #[test]
    fn test_attachment_basename() {
        assert_eq!(attachment_basename("/a/b/c.png"), "c.png");
        assert_eq!(attachment_basename("c.png?x=1"), "c.png");
        assert_eq!(attachment_basename("/figures/"), "figures");
        assert_eq!(attachment_basename("?only"), "image");
    }

    #[test]
    fn test_unique_name_without_extension() {
        let mut taken = Attachments::new();
        taken.insert("logo", MimeBundle::new());
        taken.insert(".hidden", MimeBundle::new());
        assert_eq!(unique_name("logo", &taken), "logo_1");
        assert_eq!(unique_name(".hidden", &taken), ".hidden_1");
        assert_eq!(unique_name("other.png", &taken), "other.png");
    }
}
