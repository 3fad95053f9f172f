//! Segmented source file, shared by every renderer.

use crate::outline::Outline;
use serde::Serialize;
use std::path::PathBuf;

/// Complete segmented document from a single source file.
#[derive(Debug, Default, Serialize)]
pub struct Document {
    pub source: PathBuf,
    /// The whole file is intro text; there are no sections.
    pub pure_prose: bool,
    /// Text before the first structural content, plus the rendered outline.
    pub intro: String,
    pub sections: Vec<Section>,
    pub outline: Outline,
}

/// One (prose, code) pair, raw and unrendered.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub prose: String,
    pub code: String,
}

impl Section {
    pub fn new(prose: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            prose: prose.into(),
            code: code.into(),
        }
    }

    /// Both halves are empty or a bare line terminator.
    pub fn is_empty(&self) -> bool {
        is_blank(&self.prose) && is_blank(&self.code)
    }
}

fn is_blank(text: &str) -> bool {
    matches!(text, "" | "\n" | "\r\n")
}
