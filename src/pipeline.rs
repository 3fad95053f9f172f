//! Batch pipeline: discover, segment and render, then resolve links.
//!
//! Stage 1 turns every selected source file into a written page. Stage 2
//! starts only after all pages exist, since a link may point at any of them.

use crate::error::ConfigError;
use crate::language::LanguageRegistry;
use crate::link::{self, LinkDescriptor};
use crate::nav::NavFolder;
use crate::render::{self, html, Page};
use crate::segment::segment;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Directories never searched for sources.
const EXCLUDED_DIRS: &[&str] = &["docs", "bin", "obj", "target"];

/// Folder under the output root that `IMG\` placeholders point into.
pub const IMAGES_DIR: &str = "Images";

const STYLESHEET_CSS: &str = include_str!("../resources/litdoc.css");
const SCRIPT_JS: &str = include_str!("../resources/litdoc.js");

/// Settings for one documentation run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Files, directories or glob patterns.
    pub inputs: Vec<String>,
    /// Source root; output paths mirror paths relative to it.
    pub root: PathBuf,
    pub output: PathBuf,
    pub outline: bool,
    /// Only document files whose first comment line starts with this text.
    pub directive: Option<String>,
    pub format: String,
    pub images: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            root: PathBuf::from("."),
            output: PathBuf::from("docs"),
            outline: false,
            directive: None,
            format: "html".to_string(),
            images: None,
        }
    }
}

/// A selected input, read and ready to segment.
#[derive(Debug)]
struct SourceFile {
    /// Path relative to the source root.
    rel: PathBuf,
    /// Path of the generated page relative to the output root.
    out_rel: PathBuf,
    content: String,
}

/// Run both stages. Returns the written pages, relative to the output root.
pub fn run(options: &PipelineOptions, languages: &LanguageRegistry) -> Result<Vec<PathBuf>> {
    let renderer = render::create_renderer(&options.format)?;

    let files = discover(&options.inputs, languages)?;
    let sources = select(&files, options, languages, renderer.file_extension())?;
    if sources.is_empty() {
        warn!("no documentable files found");
        return Ok(Vec::new());
    }
    info!("documenting {} files", sources.len());

    fs::create_dir_all(&options.output).with_context(|| {
        format!("failed to create output directory: {}", options.output.display())
    })?;

    // Stage 1: segment and render every file, then write them all.
    let navigation = NavFolder::build(
        sources
            .iter()
            .map(|s| (s.rel.as_path(), url_path(&s.out_rel))),
    );

    let pages = sources
        .par_iter()
        .map(|source| -> Result<(PathBuf, String)> {
            let language = languages
                .for_path(&source.rel)
                .ok_or_else(|| ConfigError::UnknownLanguage(source.rel.clone()))?;
            let document = segment(&source.rel, &source.content, language, options.outline);
            debug!(
                "{} ({}): {} sections, {} outline entries",
                source.rel.display(),
                language.name,
                document.sections.len(),
                document.outline.headings().count()
            );
            let path_to_root = LinkDescriptor::from_output_path(&source.out_rel)?.path_to_root;
            let page = Page {
                title: file_name(&source.rel),
                document: &document,
                navigation: navigation.render(&path_to_root),
                path_to_root,
            };
            let text = renderer.render(&page)?;
            Ok((source.out_rel.clone(), text))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut written = Vec::with_capacity(pages.len());
    for (out_rel, text) in pages {
        let dest = options.output.join(&out_rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&dest, text).with_context(|| format!("failed to write {}", dest.display()))?;
        info!("wrote {}", dest.display());
        written.push(out_rel);
    }

    // Stage 2: every page exists now.
    link::resolve_files(&options.output, &written)?;

    write_assets(&options.output, options.images.as_deref())?;

    Ok(written)
}

/// Expand inputs into a sorted, deduplicated list of documentable files.
///
/// Directories are walked recursively, skipping [`EXCLUDED_DIRS`].
pub fn discover(patterns: &[String], languages: &LanguageRegistry) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            let walker = WalkDir::new(path)
                .into_iter()
                .filter_entry(|e| {
                    e.depth() == 0 || !(e.file_type().is_dir() && is_excluded_dir(e.file_name()))
                });
            for entry in walker {
                let entry = entry
                    .with_context(|| format!("failed to read directory: {}", path.display()))?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }

    files.retain(|p| languages.for_path(p).is_some_and(|language| !language.excludes(p)));
    files.sort();
    files.dedup();
    Ok(files)
}

/// Read the discovered files, apply the directive filter and compute paths.
fn select(
    files: &[PathBuf],
    options: &PipelineOptions,
    languages: &LanguageRegistry,
    extension: &str,
) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    for path in files {
        let language = languages
            .for_path(path)
            .ok_or_else(|| ConfigError::UnknownLanguage(path.clone()))?;
        let mut content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        if let Some(directive) = &options.directive {
            let first = content.lines().next().unwrap_or_default();
            let marked = language
                .strip_primary(first)
                .is_some_and(|text| text.trim_start().starts_with(directive.as_str()));
            if !marked {
                debug!("skipping {}: no {} directive", path.display(), directive);
                continue;
            }
            content = content
                .split_once('\n')
                .map(|(_, rest)| rest.to_string())
                .unwrap_or_default();
        }

        let rel = relative_to(path, &options.root)?;
        let out_rel = output_path(&rel, extension);
        if let Some(first) = claimed.insert(out_rel.clone(), path.clone()) {
            return Err(ConfigError::OutputCollision {
                first,
                second: path.clone(),
                output: out_rel,
            }
            .into());
        }
        sources.push(SourceFile {
            rel,
            out_rel,
            content,
        });
    }
    Ok(sources)
}

/// The generated page's path: same folders, lowercased, new extension.
pub fn output_path(rel: &Path, extension: &str) -> PathBuf {
    PathBuf::from(
        rel.with_extension(extension)
            .to_string_lossy()
            .to_lowercase(),
    )
}

/// `path` relative to `root`, ignoring `./` components on either side.
///
/// The result never climbs out of `root` and is never absolute.
fn relative_to(path: &Path, root: &Path) -> Result<PathBuf, ConfigError> {
    let normalize = |p: &Path| -> PathBuf {
        p.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    };
    let outside = || ConfigError::OutsideRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    };
    let (path_n, root_n) = (normalize(path), normalize(root));
    let rel = path_n.strip_prefix(&root_n).map_err(|_| outside())?;
    let escapes = rel.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes || rel.as_os_str().is_empty() {
        return Err(outside());
    }
    Ok(rel.to_path_buf())
}

/// `/`-separated form of a relative path, for URLs.
fn url_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_excluded_dir(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| EXCLUDED_DIRS.contains(&n))
}

/// Write the stylesheet and script, and copy the image folder if given.
fn write_assets(output: &Path, images: Option<&Path>) -> Result<()> {
    for (name, content) in [(html::STYLESHEET, STYLESHEET_CSS), (html::SCRIPT, SCRIPT_JS)] {
        let dest = output.join(name);
        fs::write(&dest, content).with_context(|| format!("failed to write {}", dest.display()))?;
    }

    let Some(images) = images else {
        return Ok(());
    };
    let target = output.join(IMAGES_DIR);
    for entry in WalkDir::new(images) {
        let entry = entry.with_context(|| format!("failed to read {}", images.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(images)?;
        let dest = target.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::copy(entry.path(), &dest)
            .with_context(|| format!("failed to copy image {}", entry.path().display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn output_path_is_lowercased() {
        assert_eq!(
            output_path(Path::new("Src/Models/User.cs"), "html"),
            PathBuf::from("src/models/user.html")
        );
        assert_eq!(output_path(Path::new("A.cs"), "json"), PathBuf::from("a.json"));
    }

    #[test]
    fn relative_to_ignores_cur_dir() {
        assert_eq!(
            relative_to(Path::new("./src/a.cs"), Path::new(".")).unwrap(),
            PathBuf::from("src/a.cs")
        );
        assert_eq!(
            relative_to(Path::new("src/a.cs"), Path::new("./src")).unwrap(),
            PathBuf::from("a.cs")
        );
        assert!(matches!(
            relative_to(Path::new("other/a.cs"), Path::new("src")),
            Err(ConfigError::OutsideRoot { .. })
        ));
    }

    #[test]
    fn relative_to_rejects_escaping_paths() {
        for path in ["/abs/a.cs", "../a.cs", "src/../../a.cs"] {
            assert!(
                matches!(
                    relative_to(Path::new(path), Path::new(".")),
                    Err(ConfigError::OutsideRoot { .. })
                ),
                "{path}"
            );
        }
        assert!(relative_to(Path::new("/root/src/a.cs"), Path::new("/root/src")).is_ok());
        assert!(relative_to(Path::new("/root/src/../x/a.cs"), Path::new("/root/src")).is_err());
    }

    #[test]
    fn url_path_uses_slashes() {
        assert_eq!(url_path(Path::new("a/b/c.html")), "a/b/c.html");
    }

    #[test]
    fn discover_filters_languages_and_dirs() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "src/A.cs", "");
        touch(root, "src/Form.Designer.cs", "");
        touch(root, "src/notes.txt", "");
        touch(root, "src/deep/B.js", "");
        touch(root, "src/deep/B.min.js", "");
        touch(root, "bin/Debug/C.cs", "");
        touch(root, "docs/D.cs", "");

        let languages = LanguageRegistry::builtin().unwrap();
        let found = discover(&[root.to_string_lossy().into_owned()], &languages).unwrap();
        let rel: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            rel,
            vec![PathBuf::from("src/A.cs"), PathBuf::from("src/deep/B.js")]
        );
    }

    #[test]
    fn discover_dedups_overlapping_inputs() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.cs", "");
        let languages = LanguageRegistry::builtin().unwrap();
        let file = dir.path().join("a.cs").to_string_lossy().into_owned();
        let pattern = dir.path().join("*.cs").to_string_lossy().into_owned();
        let found = discover(&[file, pattern], &languages).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn run_writes_pages_assets_and_resolves_links() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        touch(&src, "A.cs", "// Uses [B](LINK\\B)\nclass A {}\n");
        touch(&src, "sub/B.cs", "// Back to [A](LINK\\A#top)\nclass B {}\n");
        let images = dir.path().join("img");
        touch(&images, "logo.png", "png");

        let options = PipelineOptions {
            inputs: vec![src.to_string_lossy().into_owned()],
            root: src.clone(),
            output: dir.path().join("out"),
            images: Some(images),
            ..PipelineOptions::default()
        };
        let languages = LanguageRegistry::builtin().unwrap();
        let written = run(&options, &languages).unwrap();
        assert_eq!(
            written,
            vec![PathBuf::from("a.html"), PathBuf::from("sub/b.html")]
        );

        let a = fs::read_to_string(options.output.join("a.html")).unwrap();
        let b = fs::read_to_string(options.output.join("sub/b.html")).unwrap();
        assert!(a.contains("href=\"sub/b.html\""), "{a}");
        assert!(b.contains("href=\"../a.html#top\""), "{b}");
        assert!(b.contains("href=\"../litdoc.css\""));
        assert!(!a.contains("LINK"));

        assert!(options.output.join("litdoc.css").is_file());
        assert!(options.output.join("litdoc.js").is_file());
        assert!(options.output.join("Images/logo.png").is_file());
    }

    #[test]
    fn directive_selects_and_is_stripped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Yes.cs", "// GENERATE\n// Documented\nclass Yes {}\n");
        touch(dir.path(), "No.cs", "// Not selected\nclass No {}\n");

        let options = PipelineOptions {
            inputs: vec![dir.path().to_string_lossy().into_owned()],
            root: dir.path().to_path_buf(),
            output: dir.path().join("site"),
            directive: Some("GENERATE".to_string()),
            ..PipelineOptions::default()
        };
        let languages = LanguageRegistry::builtin().unwrap();
        let written = run(&options, &languages).unwrap();
        assert_eq!(written, vec![PathBuf::from("yes.html")]);

        let page = fs::read_to_string(options.output.join("yes.html")).unwrap();
        assert!(!page.contains("GENERATE"));
        assert!(page.contains("Documented"));
    }

    #[test]
    fn colliding_output_pages_are_rejected() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Foo.cs", "// cs doc\nclass Foo {}\n");
        touch(dir.path(), "Foo.js", "// js doc\nfunction foo() {}\n");

        let options = PipelineOptions {
            inputs: vec![dir.path().to_string_lossy().into_owned()],
            root: dir.path().to_path_buf(),
            output: dir.path().join("out"),
            ..PipelineOptions::default()
        };
        let languages = LanguageRegistry::builtin().unwrap();
        let err = run(&options, &languages).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::OutputCollision { output, .. }) if output == Path::new("foo.html")
        ));
        assert!(!options.output.join("foo.html").exists());
    }

    #[test]
    fn unknown_format_is_rejected() {
        let options = PipelineOptions {
            format: "xml".to_string(),
            ..PipelineOptions::default()
        };
        let languages = LanguageRegistry::builtin().unwrap();
        let err = run(&options, &languages).unwrap_err();
        assert!(err.to_string().contains("unknown format"));
    }
}
