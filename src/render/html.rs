//! Two-column HTML page with prose on the left and code on the right.

use crate::markup::{escape_code, prose_to_html};
use crate::render::{Page, Renderer};
use anyhow::Result;

pub const STYLESHEET: &str = "litdoc.css";
pub const SCRIPT: &str = "litdoc.js";

pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, page: &Page) -> Result<String> {
        let doc = page.document;
        let title = html_escape::encode_text(&page.title);
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", title));
        out.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"{}{}\">\n",
            page.path_to_root, STYLESHEET
        ));
        out.push_str("</head>\n<body>\n");

        // Sidebar
        out.push_str("<nav id=\"menu\">\n");
        out.push_str("<input type=\"text\" id=\"search\" placeholder=\"Filter files\">\n");
        out.push_str(&page.navigation);
        out.push_str("</nav>\n");

        out.push_str("<div id=\"container\">\n");
        out.push_str("<table cellpadding=\"0\" cellspacing=\"0\">\n<thead>\n");
        out.push_str(&format!(
            "<tr><th class=\"docs\"><h1>{}</h1></th><th class=\"code\"></th></tr>\n",
            title
        ));
        out.push_str("</thead>\n<tbody>\n");

        if !doc.intro.trim().is_empty() {
            let class = if doc.pure_prose { "docs prose" } else { "docs intro" };
            out.push_str(&format!(
                "<tr><td class=\"{}\" colspan=\"2\">\n{}</td></tr>\n",
                class,
                prose_to_html(&doc.intro)
            ));
        }

        for (i, section) in doc.sections.iter().enumerate() {
            let id = i + 1;
            out.push_str(&format!("<tr id=\"section-{}\">\n", id));
            out.push_str(&format!(
                "<td class=\"docs\"><div class=\"pilwrap\"><a class=\"pilcrow\" href=\"#section-{}\">&#182;</a></div>\n{}</td>\n",
                id,
                prose_to_html(&section.prose)
            ));
            out.push_str(&format!(
                "<td class=\"code\"><pre><code>{}</code></pre></td>\n",
                escape_code(&section.code)
            ));
            out.push_str("</tr>\n");
        }

        out.push_str("</tbody>\n</table>\n</div>\n");
        out.push_str("<a href=\"#\" class=\"back-to-top\">Back to top</a>\n");
        out.push_str(&format!(
            "<script src=\"{}{}\"></script>\n",
            page.path_to_root, SCRIPT
        ));
        out.push_str("</body>\n</html>\n");
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "html"
    }
}
