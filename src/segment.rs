//! Segmenter: splits a source file into prose/code sections.
//!
//! Two modes:
//!
//! - **plain**: every run of comment lines becomes the prose of a section,
//!   the code lines following it become its code.
//! - **outline**: a line-by-line state machine that also tracks structural
//!   blocks (`// cb` headings, `#region`s) in an [`Outline`], numbers them,
//!   and detects the end of a code block by its literal closing token at the
//!   indentation the block was opened at.

use crate::language::{Language, LineKind};
use crate::model::{Document, Section};
use crate::outline::{NodeId, Outline};
use log::trace;
use std::path::Path;

// -- Public API ---------------------------------------------------------------

/// Segment one source file into a Document.
pub fn segment(source: &Path, input: &str, language: &Language, outline: bool) -> Document {
    let mut doc = Document {
        source: source.to_path_buf(),
        ..Document::default()
    };

    if language.is_pure_prose() {
        doc.pure_prose = true;
        doc.intro = input.to_string();
        return doc;
    }

    if outline {
        let mut state = OutlineState::new(language);
        for line in input.lines() {
            state.process_line(line);
        }
        state.finish(&mut doc);
    } else {
        doc.sections = segment_plain(input, language);
    }

    doc.sections.retain(|s| !s.is_empty());
    doc
}

// -- Plain mode ---------------------------------------------------------------

fn segment_plain(input: &str, language: &Language) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut prose = String::new();
    let mut code = String::new();
    let mut has_code = false;

    for line in input.lines() {
        match language.strip_primary(line) {
            Some(text) => {
                if has_code {
                    sections.push(Section::new(
                        language.rewrite_prose(&prose),
                        std::mem::take(&mut code),
                    ));
                    prose.clear();
                    has_code = false;
                }
                push_line(&mut prose, &text);
            }
            None => {
                has_code = true;
                push_line(&mut code, line);
            }
        }
    }
    sections.push(Section::new(language.rewrite_prose(&prose), code));

    sections
}

// -- Outline mode -------------------------------------------------------------

struct OutlineState<'a> {
    language: &'a Language,
    outline: Outline,
    current: NodeId,
    sections: Vec<Section>,
    intro: String,
    in_intro: bool,
    prose: String,
    code: String,
}

impl<'a> OutlineState<'a> {
    fn new(language: &'a Language) -> Self {
        let outline = Outline::new();
        let current = outline.root();
        Self {
            language,
            outline,
            current,
            sections: Vec::new(),
            intro: String::new(),
            in_intro: language.has_intro(),
            prose: String::new(),
            code: String::new(),
        }
    }

    fn process_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        if self.in_intro {
            if self.language.is_ignored_on_start(line) {
                self.in_intro = false;
            } else {
                let text = self
                    .language
                    .strip_primary(line)
                    .unwrap_or_else(|| line.to_string());
                push_line(&mut self.intro, &text);
            }
            return;
        }

        match self.language.classify(line) {
            LineKind::OpenBlock { token, text } => self.open_block(line, token, &text),
            LineKind::CloseBlock { token, text } => {
                self.flush();
                let node = self.outline.node(self.current);
                if !node.closable {
                    if let Some(parent) = self.outline.parent(self.current) {
                        trace!("{} closes block {}", token, node.name);
                        self.current = parent;
                    }
                }
                if !text.trim().is_empty() {
                    push_line(&mut self.prose, &text);
                }
            }
            LineKind::Prose(text) => {
                if !self.code.is_empty() {
                    self.flush();
                }
                push_line(&mut self.prose, &text);
            }
            LineKind::NoMatch => self.code_line(line),
        }
    }

    fn open_block(&mut self, line: &str, token: &str, heading: &str) {
        self.flush();

        let offset = self.language.is_closable(token).then(|| indentation(line));
        let id = self.outline.add_child(self.current, heading, offset);
        let node = self.outline.node(id);
        trace!("{} opens block {} ({:?})", token, node.name, node.heading);

        let level = "#".repeat((node.depth + 1).min(6));
        self.sections.push(Section::new(
            format!(
                "{} <a name=\"{}\"></a>{} {}\n",
                level, node.name, node.name, node.heading
            ),
            String::new(),
        ));
        self.current = id;
        if !heading.trim().is_empty() {
            push_line(&mut self.prose, heading);
        }
    }

    fn code_line(&mut self, line: &str) {
        if self.language.is_ignored_on_start(line) {
            return;
        }
        push_line(&mut self.code, line);

        let node = self.outline.node(self.current);
        if node.closable
            && self.language.is_block_closer(line.trim())
            && node.close_offset == Some(indentation(line))
        {
            if let Some(parent) = node.parent {
                trace!("{:?} closes block {}", line.trim(), node.name);
                self.flush();
                self.current = parent;
            }
        }
    }

    /// Emit the pending prose/code pair as a section.
    fn flush(&mut self) {
        if self.prose.is_empty() && self.code.is_empty() {
            return;
        }
        let prose = self.language.rewrite_prose(&self.prose);
        self.sections
            .push(Section::new(prose, std::mem::take(&mut self.code)));
        self.prose.clear();
    }

    fn finish(mut self, doc: &mut Document) {
        self.flush();
        if self.outline.has_children(self.outline.root()) {
            self.intro.push_str("\n---\n\n");
            self.intro.push_str(&self.outline.render());
            self.intro.push_str("\n\n---\n");
        }
        doc.intro = self.intro;
        doc.sections = self.sections;
        doc.outline = self.outline;
    }
}

// -- Helpers ------------------------------------------------------------------

fn push_line(dest: &mut String, text: &str) {
    dest.push_str(text);
    dest.push('\n');
}

/// Column of the first non-whitespace character.
fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}
