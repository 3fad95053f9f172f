//! Prose-to-HTML and code escaping.

use comrak::{markdown_to_html, Options};

/// Render Markdown prose. Raw HTML is kept so outline anchors survive.
pub fn prose_to_html(prose: &str) -> String {
    let mut options = Options::default();
    options.render.unsafe_ = true;
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    markdown_to_html(prose, &options)
}

pub fn escape_code(code: &str) -> String {
    html_escape::encode_text(code).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_keeps_raw_anchors() {
        let html = prose_to_html("## <a name=\"1\"></a>1 Example\n");
        assert!(html.contains("<a name=\"1\"></a>1 Example"), "{html}");
        assert!(html.starts_with("<h2>"), "{html}");
    }

    #[test]
    fn markdown_emphasis() {
        assert_eq!(prose_to_html("Call *run*\n"), "<p>Call <em>run</em></p>\n");
    }

    #[test]
    fn code_is_escaped() {
        assert_eq!(escape_code("if (a < b && c > d)"), "if (a &lt; b &amp;&amp; c &gt; d)");
    }
}
