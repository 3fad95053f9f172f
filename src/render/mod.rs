//! Output formats, selected by name.

pub mod html;
pub mod json;

use crate::error::ConfigError;
use crate::model::Document;
use anyhow::Result;

/// Everything a renderer needs to lay out one page.
pub struct Page<'a> {
    pub title: String,
    pub document: &'a Document,
    /// `../` once per folder between the docs root and this page.
    pub path_to_root: String,
    /// Pre-rendered sidebar, already prefixed for this page.
    pub navigation: String,
}

/// Trait for rendering a Page into a specific output format.
pub trait Renderer: Send + Sync {
    fn render(&self, page: &Page) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>, ConfigError> {
    match format {
        "html" => Ok(Box::new(html::HtmlRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(ConfigError::UnknownFormat(format.to_string())),
    }
}
