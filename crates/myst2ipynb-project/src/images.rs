//! Collect local image files referenced by a page as base64 data
//!
//! Failures are per image: an image that cannot be resolved or read is
//! logged and left as an external reference.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use myst2ipynb_core::{ImageDataEntry, ImageDataMap};
use myst_mdast::{Node, Root};
use rayon::prelude::*;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Read every local image referenced in `root`.
///
/// Keys are the URLs exactly as they appear in the tree. Remote (`http://`,
/// `https://`) and `data:` URLs are skipped; each distinct URL is read once.
pub fn collect_image_data(root: &Root, document_path: &Path, source_root: &Path) -> ImageDataMap {
    let urls = image_urls(root);

    urls.par_iter()
        .filter_map(|url| {
            let Some(path) = resolve_image_path(url, document_path, source_root) else {
                tracing::warn!("Cannot resolve image '{}' in {}", url, document_path.display());
                return None;
            };
            match fs::read(&path) {
                Ok(bytes) => Some((url.clone(), encode_image(&path, &bytes))),
                Err(e) => {
                    tracing::warn!("Cannot read image '{}' ({}): {}", url, path.display(), e);
                    None
                }
            }
        })
        .collect()
}

/// Local image URLs in document order, without duplicates
fn image_urls(root: &Root) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    root.walk(&mut |node| {
        let url = match node {
            Node::Image(img) => Some(img.url.as_str()),
            Node::Other(generic) if generic.node_type == "image" => {
                generic.fields.get("url").and_then(Value::as_str)
            }
            _ => None,
        };
        if let Some(url) = url
            && is_local(url)
            && seen.insert(url)
        {
            urls.push(url.to_string());
        }
    });
    urls
}

fn is_local(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    !(lower.is_empty()
        || lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("data:"))
}

/// Resolve an image URL to a file path.
///
/// `/`-prefixed URLs are relative to `source_root`, anything else to the
/// directory of `document_path`. Query strings and fragments are ignored.
pub fn resolve_image_path(url: &str, document_path: &Path, source_root: &Path) -> Option<PathBuf> {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = url[..end].trim();
    if path.is_empty() {
        return None;
    }

    match path.strip_prefix('/') {
        Some(rooted) => {
            let rooted = rooted.trim_start_matches('/');
            (!rooted.is_empty()).then(|| source_root.join(rooted))
        }
        None => {
            let dir = document_path.parent().unwrap_or_else(|| Path::new(""));
            Some(dir.join(path))
        }
    }
}

fn encode_image(path: &Path, bytes: &[u8]) -> ImageDataEntry {
    ImageDataEntry {
        mime: mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
        data: STANDARD.encode(bytes),
    }
}
