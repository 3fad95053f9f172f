//! Language profiles: per-extension comment and block syntax.
//!
//! A profile only knows line prefixes and literal tokens. It never parses the
//! language itself: a line is prose when one of the comment markers matches at
//! its start, and structure comes from configured (open, close) token pairs.

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// Shebangs and `#{...}` interpolation look like comments in some languages.
pub const DEFAULT_NOISE: &str = r"(^#![/]|^\s*#\{)";

/// Result of classifying one line against a profile's markers.
#[derive(Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// No marker matched: the line is code.
    NoMatch,
    /// A plain comment line; carries the text with the marker stripped.
    Prose(String),
    /// A marker registered as the open token of a block pair.
    OpenBlock { token: &'a str, text: String },
    /// A marker registered as the close token of a block pair.
    CloseBlock { token: &'a str, text: String },
}

#[derive(Debug, Clone)]
struct Marker {
    symbol: String,
    matcher: Regex,
}

/// Immutable comment/structure rules for one file type.
#[derive(Debug)]
pub struct Language {
    pub name: String,
    /// Marker used by plain mode and for intro lines.
    primary: Option<Marker>,
    /// Markers tried in order by outline mode.
    markers: Vec<Marker>,
    /// Lines that look like comments but are never prose.
    noise: Regex,
    block_pairs: Vec<(String, String)>,
    ignore_on_start: Vec<String>,
    block_closers: Vec<String>,
    rewrites: Vec<(Regex, String)>,
    pure_prose: bool,
    excluded_suffixes: Vec<String>,
}

impl Language {
    pub fn builder(name: &str) -> LanguageBuilder {
        LanguageBuilder {
            name: name.to_string(),
            ..LanguageBuilder::default()
        }
    }

    /// Try every marker in declared order; the first match wins.
    pub fn classify(&self, line: &str) -> LineKind<'_> {
        if self.noise.is_match(line) {
            return LineKind::NoMatch;
        }
        for marker in &self.markers {
            if !marker.matcher.is_match(line) {
                continue;
            }
            let text = marker.matcher.replace(line, "").into_owned();
            let token = marker.symbol.as_str();
            if self.close_token_for(token).is_some() {
                return LineKind::OpenBlock { token, text };
            }
            if self.block_pairs.iter().any(|(_, close)| close == token) {
                return LineKind::CloseBlock { token, text };
            }
            return LineKind::Prose(text);
        }
        LineKind::NoMatch
    }

    /// Strip the primary marker, if the line is a non-noise comment.
    pub fn strip_primary(&self, line: &str) -> Option<String> {
        let primary = self.primary.as_ref()?;
        if self.noise.is_match(line) || !primary.matcher.is_match(line) {
            return None;
        }
        Some(primary.matcher.replace(line, "").into_owned())
    }

    /// The close token paired with `open`, if `open` starts a block.
    pub fn close_token_for(&self, open: &str) -> Option<&str> {
        self.block_pairs
            .iter()
            .find(|(o, _)| o == open)
            .map(|(_, c)| c.as_str())
    }

    /// Whether a block opened by `open` is closed by a literal code token.
    pub fn is_closable(&self, open: &str) -> bool {
        self.close_token_for(open)
            .is_some_and(|close| self.is_block_closer(close))
    }

    pub fn is_block_closer(&self, token: &str) -> bool {
        self.block_closers.iter().any(|c| c == token)
    }

    /// True for a line that ends the intro region (and is itself dropped).
    pub fn is_ignored_on_start(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        self.ignore_on_start.iter().any(|p| trimmed.starts_with(p.as_str()))
    }

    pub fn has_intro(&self) -> bool {
        !self.ignore_on_start.is_empty()
    }

    pub fn is_pure_prose(&self) -> bool {
        self.pure_prose
    }

    pub fn excludes(&self, path: &Path) -> bool {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        self.excluded_suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }

    /// Apply prose rewrite rules in declared order.
    pub fn rewrite_prose(&self, prose: &str) -> String {
        self.rewrites
            .iter()
            .fold(prose.to_string(), |acc, (re, replacement)| {
                re.replace_all(&acc, replacement.as_str()).into_owned()
            })
    }
}

/// Fluent constructor for [`Language`]; regexes compile in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct LanguageBuilder {
    name: String,
    primary: Option<String>,
    markers: Vec<String>,
    noise: Option<String>,
    block_pairs: Vec<(String, String)>,
    ignore_on_start: Vec<String>,
    block_closers: Vec<String>,
    rewrites: Vec<(String, String)>,
    pure_prose: bool,
    excluded_suffixes: Vec<String>,
}

impl LanguageBuilder {
    /// The language's ordinary comment marker, as a regex fragment matched
    /// after leading whitespace.
    pub fn comment(mut self, symbol: &str) -> Self {
        self.primary = Some(symbol.to_string());
        self
    }

    /// Outline-mode marker. Without any, outline mode uses the comment marker.
    pub fn marker(mut self, symbol: &str) -> Self {
        self.markers.push(symbol.to_string());
        self
    }

    /// Replace [`DEFAULT_NOISE`] with another comment filter.
    pub fn noise(mut self, pattern: &str) -> Self {
        self.noise = Some(pattern.to_string());
        self
    }

    pub fn block(mut self, open: &str, close: &str) -> Self {
        self.block_pairs.push((open.to_string(), close.to_string()));
        self
    }

    pub fn ignore_on_start(mut self, prefix: &str) -> Self {
        self.ignore_on_start.push(prefix.to_string());
        self
    }

    pub fn block_closer(mut self, token: &str) -> Self {
        self.block_closers.push(token.to_string());
        self
    }

    pub fn rewrite(mut self, pattern: &str, replacement: &str) -> Self {
        self.rewrites.push((pattern.to_string(), replacement.to_string()));
        self
    }

    pub fn pure_prose(mut self) -> Self {
        self.pure_prose = true;
        self
    }

    pub fn exclude_suffix(mut self, suffix: &str) -> Self {
        self.excluded_suffixes.push(suffix.to_string());
        self
    }

    pub fn build(self) -> Result<Language, regex::Error> {
        let primary = self.primary.map(compile_marker).transpose()?;
        let mut markers = self
            .markers
            .into_iter()
            .map(compile_marker)
            .collect::<Result<Vec<_>, regex::Error>>()?;
        if markers.is_empty() {
            markers.extend(primary.clone());
        }
        let noise = Regex::new(self.noise.as_deref().unwrap_or(DEFAULT_NOISE))?;
        let rewrites = self
            .rewrites
            .into_iter()
            .map(|(pattern, replacement)| {
                Ok((Regex::new(&format!("(?m){}", pattern))?, replacement))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Language {
            name: self.name,
            primary,
            markers,
            noise,
            block_pairs: self.block_pairs,
            ignore_on_start: self.ignore_on_start,
            block_closers: self.block_closers,
            rewrites,
            pure_prose: self.pure_prose,
            excluded_suffixes: self.excluded_suffixes,
        })
    }
}

fn compile_marker(symbol: String) -> Result<Marker, regex::Error> {
    let matcher = Regex::new(&format!(r"^\s*{}\s?", symbol))?;
    Ok(Marker { symbol, matcher })
}

/// Profiles keyed by file extension (without the dot).
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    languages: HashMap<String, Language>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, extension: &str, language: Language) {
        self.languages.insert(extension.to_string(), language);
    }

    pub fn get(&self, extension: &str) -> Option<&Language> {
        self.languages.get(extension)
    }

    pub fn for_path(&self, path: &Path) -> Option<&Language> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.get(ext))
    }

    /// The profiles shipped with litdoc.
    pub fn builtin() -> Result<Self, regex::Error> {
        let mut registry = Self::new();

        registry.register(
            "cs",
            Language::builder("csharp")
                .comment("///?")
                .marker("// cb")
                .marker("#region")
                .marker("#endregion")
                .marker("///?")
                .block("// cb", "}")
                .block("#region", "#endregion")
                .block_closer("}")
                .ignore_on_start("using")
                .exclude_suffix("Designer.cs")
                .rewrite(r"<c>([^<]*)</c>", "`${1}`")
                .rewrite(
                    r#"<param[^>]*name="([^"]*)"[^>]*>([^<]*)</param>"#,
                    "**argument** *${1}*: ${2}\n",
                )
                .rewrite(r"<returns>([^<]*)</returns>", "**returns**: ${1}\n")
                .rewrite(r#"<see\s*cref="([^"]*)"\s*/>"#, "see `${1}`")
                .rewrite(r"(</?example>|</?summary>|</?remarks>)", "")
                .build()?,
        );

        registry.register(
            "vb",
            Language::builder("vb.net")
                .comment("'+")
                .marker("#Region")
                .marker("#End Region")
                .marker("'+")
                .block("#Region", "#End Region")
                .ignore_on_start("Imports")
                .exclude_suffix("Designer.vb")
                .rewrite(r"<c>([^<]*)</c>", "`${1}`")
                .rewrite(r"<param[^>]*>([^<]*)</param>", "")
                .rewrite(r"<returns>([^<]*)</returns>", "")
                .rewrite(r#"<see\s*cref="([^"]*)"\s*/>"#, "see `${1}`")
                .rewrite(r"(</?example>|</?summary>|</?remarks>)", "")
                .build()?,
        );

        registry.register(
            "js",
            Language::builder("javascript")
                .comment("//")
                .marker("// cb")
                .marker("//")
                .block("// cb", "}")
                .block_closer("}")
                .block_closer("};")
                .exclude_suffix("min.js")
                .build()?,
        );

        registry.register(
            "rs",
            Language::builder("rust")
                .comment("//[/!]?")
                .marker("// cb")
                .marker("//[/!]?")
                .block("// cb", "}")
                .block_closer("}")
                .ignore_on_start("use ")
                .build()?,
        );

        registry.register("md", Language::builder("markdown").pure_prose().build()?);

        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csharp() -> Language {
        LanguageRegistry::builtin()
            .unwrap()
            .languages
            .remove("cs")
            .unwrap()
    }

    #[test]
    fn classify_plain_comment() {
        let lang = csharp();
        assert_eq!(lang.classify("  // Hello"), LineKind::Prose("Hello".to_string()));
        assert_eq!(lang.classify("/// Doc"), LineKind::Prose("Doc".to_string()));
    }

    #[test]
    fn classify_code() {
        assert_eq!(csharp().classify("var x = 1; // trailing"), LineKind::NoMatch);
    }

    #[test]
    fn first_marker_wins() {
        // "///?" would also match, but "// cb" is declared first.
        assert_eq!(
            csharp().classify("    // cb Example"),
            LineKind::OpenBlock {
                token: "// cb",
                text: "Example".to_string()
            }
        );
    }

    #[test]
    fn classify_region_close() {
        assert_eq!(
            csharp().classify("#endregion"),
            LineKind::CloseBlock {
                token: "#endregion",
                text: String::new()
            }
        );
    }

    #[test]
    fn noise_is_never_prose() {
        let lang = Language::builder("shell").comment("#").build().unwrap();
        assert_eq!(lang.classify("#!/bin/bash"), LineKind::NoMatch);
        assert_eq!(lang.classify("  #{interpolated}"), LineKind::NoMatch);
        assert_eq!(lang.strip_primary("#!/bin/bash"), None);
        assert_eq!(lang.strip_primary("# real"), Some("real".to_string()));
    }

    #[test]
    fn noise_filter_is_per_profile() {
        let lang = Language::builder("ini")
            .comment(";")
            .noise(r"^;;")
            .build()
            .unwrap();
        assert_eq!(lang.classify(";; generated"), LineKind::NoMatch);
        assert_eq!(lang.classify("; kept"), LineKind::Prose("kept".to_string()));
        // The default filter no longer applies.
        let hash = Language::builder("x").comment("#").noise(r"^$").build().unwrap();
        assert_eq!(hash.classify("#!/bin/sh"), LineKind::Prose("!/bin/sh".to_string()));
    }

    #[test]
    fn vb_profile() {
        let registry = LanguageRegistry::builtin().unwrap();
        let vb = registry.get("vb").unwrap();
        assert_eq!(vb.classify("  ''' Summary"), LineKind::Prose("Summary".to_string()));
        assert_eq!(
            vb.classify("#Region \"Helpers\""),
            LineKind::OpenBlock {
                token: "#Region",
                text: "\"Helpers\"".to_string()
            }
        );
        assert_eq!(
            vb.classify("#End Region"),
            LineKind::CloseBlock {
                token: "#End Region",
                text: String::new()
            }
        );
        assert!(!vb.is_closable("#Region"));
        assert!(vb.is_ignored_on_start("Imports System"));
        assert!(vb.excludes(Path::new("Form1.Designer.vb")));
    }

    #[test]
    fn rust_profile() {
        let registry = LanguageRegistry::builtin().unwrap();
        let rs = registry.get("rs").unwrap();
        assert_eq!(rs.classify("/// Doc"), LineKind::Prose("Doc".to_string()));
        assert_eq!(rs.classify("//! Module"), LineKind::Prose("Module".to_string()));
        assert_eq!(rs.strip_primary("    // plain"), Some("plain".to_string()));
        assert_eq!(
            rs.classify("    // cb run"),
            LineKind::OpenBlock {
                token: "// cb",
                text: "run".to_string()
            }
        );
        assert!(rs.is_closable("// cb"));
        assert!(rs.is_ignored_on_start("use std::fs;"));
        assert!(!rs.is_ignored_on_start("user.name();"));
    }

    #[test]
    fn closable_only_for_literal_closers() {
        let lang = csharp();
        assert!(lang.is_closable("// cb"));
        assert!(!lang.is_closable("#region"));
        assert!(!lang.is_closable("///?"));
    }

    #[test]
    fn ignore_on_start_matches_trimmed_prefix() {
        let lang = csharp();
        assert!(lang.is_ignored_on_start("using System;"));
        assert!(lang.is_ignored_on_start("  using System.IO;"));
        assert!(!lang.is_ignored_on_start("// using"));
    }

    #[test]
    fn rewrites_xml_doc_tags() {
        let lang = csharp();
        let out = lang.rewrite_prose("<summary>\nCall <c>Run</c>, see <see cref=\"Foo\"/>\n</summary>\n");
        assert_eq!(out, "\nCall `Run`, see see `Foo`\n\n");
    }

    #[test]
    fn registry_lookup_by_path() {
        let registry = LanguageRegistry::builtin().unwrap();
        assert_eq!(registry.for_path(Path::new("src/a.cs")).unwrap().name, "csharp");
        assert!(registry.for_path(Path::new("README")).is_none());
        assert!(registry.for_path(Path::new("x.py")).is_none());
        assert!(registry.for_path(Path::new("notes.md")).unwrap().is_pure_prose());
    }

    #[test]
    fn excluded_suffixes() {
        let registry = LanguageRegistry::builtin().unwrap();
        let lang = registry.get("cs").unwrap();
        assert!(lang.excludes(Path::new("Form1.Designer.cs")));
        assert!(!lang.excludes(Path::new("Form1.cs")));
    }
}
