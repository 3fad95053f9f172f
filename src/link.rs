//! Cross-document links: descriptors and the placeholder resolver.
//!
//! Prose may reference other documented files before they exist:
//!
//! - `LINK\Key` or `LINK\Key#anchor`: link to the document whose base name
//!   is `Key` (case-insensitive);
//! - `IMG\name` inside a `src` attribute: an image under the docs root's
//!   `Images/` folder.
//!
//! Resolution runs once every document has been written. The Markdown
//! transformer percent-encodes the backslash in link destinations, so `%5C`
//! is accepted in its place.

use crate::error::ConfigError;
use anyhow::{Context, Result};
use log::{debug, warn};
use regex::{Captures, Regex};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

static RE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"LINK(?:\\|%5C)(\w+)(?:#(\w+))?").unwrap());

static RE_IMG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(src\s*=\s*["']?)IMG(?:\\|%5C)(\w+)"#).unwrap());

/// Resolved identity of one generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDescriptor {
    /// Uppercased base name, extension stripped.
    pub key: String,
    pub folders: Vec<String>,
    /// Path relative to the docs root, `/`-separated.
    pub path: String,
    /// `../` once per folder.
    pub path_to_root: String,
}

impl LinkDescriptor {
    /// Derive a descriptor from a path relative to the docs root.
    pub fn from_output_path(path: &Path) -> Result<Self, ConfigError> {
        let malformed = || ConfigError::MalformedPath(path.to_path_buf());

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(malformed)?;
        let stem = file_name.split('.').next().unwrap_or(file_name);
        if stem.is_empty() {
            return Err(malformed());
        }

        let mut folders = Vec::new();
        if let Some(parent) = path.parent() {
            for component in parent.components() {
                match component {
                    Component::Normal(name) => {
                        folders.push(name.to_str().ok_or_else(malformed)?.to_string());
                    }
                    Component::CurDir => {}
                    _ => return Err(malformed()),
                }
            }
        }

        let mut rel = folders.join("/");
        if !rel.is_empty() {
            rel.push('/');
        }
        rel.push_str(file_name);

        Ok(Self {
            key: stem.to_uppercase(),
            path_to_root: "../".repeat(folders.len()),
            folders,
            path: rel,
        })
    }
}

/// All descriptors, in registration order. Built once, then read-only.
#[derive(Debug, Default)]
pub struct LinkRegistry {
    descriptors: Vec<LinkDescriptor>,
}

impl LinkRegistry {
    pub fn new(descriptors: Vec<LinkDescriptor>) -> Self {
        Self { descriptors }
    }

    /// First registered descriptor whose key matches, ignoring case.
    ///
    /// Documents sharing a base name shadow each other; the earliest wins.
    pub fn lookup(&self, key: &str) -> Option<&LinkDescriptor> {
        let key = key.to_uppercase();
        self.descriptors.iter().find(|d| d.key == key)
    }

    pub fn descriptors(&self) -> &[LinkDescriptor] {
        &self.descriptors
    }

    /// Rewrite every placeholder in `text` as seen from `current`.
    pub fn resolve_text(&self, text: &str, current: &LinkDescriptor) -> String {
        let linked = RE_LINK.replace_all(text, |caps: &Captures| {
            let key = &caps[1];
            match self.lookup(key) {
                Some(target) => {
                    let mut href = format!("{}{}", current.path_to_root, target.path);
                    if let Some(anchor) = caps.get(2) {
                        href.push('#');
                        href.push_str(anchor.as_str());
                    }
                    href
                }
                None => {
                    warn!("{}: unresolved link to {}", current.path, key);
                    caps[0].to_string()
                }
            }
        });

        RE_IMG
            .replace_all(&linked, |caps: &Captures| {
                format!("{}{}Images/{}", &caps[1], current.path_to_root, &caps[2])
            })
            .into_owned()
    }
}

/// Resolve placeholders in every written document, rewriting files in place.
///
/// `written` holds paths relative to `out_dir`.
pub fn resolve_files(out_dir: &Path, written: &[PathBuf]) -> Result<()> {
    let descriptors = written
        .iter()
        .map(|p| LinkDescriptor::from_output_path(p))
        .collect::<Result<Vec<_>, _>>()?;
    let registry = LinkRegistry::new(descriptors);

    for current in registry.descriptors() {
        let path = out_dir.join(&current.path);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let resolved = registry.resolve_text(&text, current);
        if resolved != text {
            debug!("resolved placeholders in {}", path.display());
            fs::write(&path, resolved)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
    }

    Ok(())
}
