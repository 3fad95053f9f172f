//! Sidebar navigation: documented files folded into a folder tree.

use std::path::{Component, Path};

/// Bucket for files that sit directly in the source root.
pub const TOP_LEVEL_FOLDER: &str = "Files";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct NavFolder {
    pub name: String,
    pub folders: Vec<NavFolder>,
    pub files: Vec<NavFile>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct NavFile {
    pub name: String,
    /// Root-relative URL of the generated page.
    pub url: String,
}

impl NavFolder {
    /// Build the tree from source paths (relative to the source root) and
    /// their root-relative output URLs, in the given order.
    pub fn build<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a Path, String)>,
    {
        let mut root = NavFolder::default();
        for (path, url) in entries {
            let segments: Vec<String> = path
                .parent()
                .into_iter()
                .flat_map(|p| p.components())
                .filter_map(|c| match c {
                    Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect();

            let mut folder = &mut root;
            if segments.is_empty() {
                folder = folder.child(TOP_LEVEL_FOLDER);
            }
            for segment in &segments {
                folder = folder.child(segment);
            }

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            folder.files.push(NavFile { name, url });
        }
        root
    }

    /// Lookup-or-insert a direct subfolder, keeping first-seen order.
    fn child(&mut self, name: &str) -> &mut NavFolder {
        let index = match self.folders.iter().position(|f| f.name == name) {
            Some(index) => index,
            None => {
                self.folders.push(NavFolder {
                    name: name.to_string(),
                    ..NavFolder::default()
                });
                self.folders.len() - 1
            }
        };
        &mut self.folders[index]
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.iter().all(NavFolder::is_empty)
    }

    /// Render nested `<ul>` lists: folders first, then files.
    ///
    /// `path_to_root` prefixes every URL so the sidebar works from any page.
    pub fn render(&self, path_to_root: &str) -> String {
        let mut out = String::new();
        self.render_contents(path_to_root, &mut out);
        out
    }

    fn render_contents(&self, path_to_root: &str, out: &mut String) {
        if self.is_empty() {
            return;
        }
        out.push_str("<ul>\n");
        for folder in self.folders.iter().filter(|f| !f.is_empty()) {
            out.push_str(&format!(
                "<li><span class=\"folder\">{}</span>\n",
                html_escape::encode_text(&folder.name)
            ));
            folder.render_contents(path_to_root, out);
            out.push_str("</li>\n");
        }
        for file in &self.files {
            out.push_str(&format!(
                "<li><a href=\"{}{}\">{}</a></li>\n",
                path_to_root,
                html_escape::encode_double_quoted_attribute(&file.url),
                html_escape::encode_text(&file.name)
            ));
        }
        out.push_str("</ul>\n");
    }
}
