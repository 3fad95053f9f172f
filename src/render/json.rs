//! JSON output: the page title plus the raw segmented document.
//!
//! Serializes the page and its Document directly. Prose and code stay raw;
//! consumers render them however they like.

use crate::model::Document;
use crate::render::{Page, Renderer};
use anyhow::{Context, Result};
use serde::Serialize;

pub struct JsonRenderer;

#[derive(Serialize)]
struct JsonPage<'a> {
    title: &'a str,
    path_to_root: &'a str,
    #[serde(flatten)]
    document: &'a Document,
}

impl Renderer for JsonRenderer {
    fn render(&self, page: &Page) -> Result<String> {
        let json = JsonPage {
            title: &page.title,
            path_to_root: &page.path_to_root,
            document: page.document,
        };
        let mut out = serde_json::to_string_pretty(&json)
            .with_context(|| format!("failed to serialize {}", page.title))?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
