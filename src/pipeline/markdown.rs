//! Markdown → HTML fragment via comrak.
//!
//! Options mirror what the documents this tool is used for rely on: raw HTML
//! blocks pass through untouched, a single newline becomes `<br />`, and
//! GFM tables and strikethrough are recognised. The output has no `<html>` or
//! `<body>` wrapper; see [`super::assemble`].

use comrak::{markdown_to_html, ComrakOptions};

fn comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.render.unsafe_ = true;
    options.render.hardbreaks = true;
    options
}

/// Render Markdown source to an HTML fragment. Pure and deterministic.
pub fn render_fragment(markdown: &str) -> String {
    markdown_to_html(markdown, &comrak_options())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_and_emphasis() {
        let html = render_fragment("# Title\n\nHello **world**");
        assert!(html.contains("<h1>Title</h1>"), "got: {html}");
        assert!(html.contains("<strong>world</strong>"), "got: {html}");
        assert!(!html.contains("<body"));
    }

    #[test]
    fn single_newline_becomes_break() {
        let html = render_fragment("line one\nline two");
        assert!(html.contains("line one<br />"), "got: {html}");
    }

    #[test]
    fn raw_html_passes_through() {
        let html = render_fragment("<div class=\"box\">kept</div>\n\ntext <span>inline</span>");
        assert!(html.contains("<div class=\"box\">kept</div>"), "got: {html}");
        assert!(html.contains("<span>inline</span>"), "got: {html}");
    }

    #[test]
    fn fenced_code_and_table() {
        let md = "```rust\nfn main() {}\n```\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";
        let html = render_fragment(md);
        assert!(html.contains("<pre><code"), "got: {html}");
        assert!(html.contains("<table>"), "got: {html}");
        assert!(html.contains("<td>2</td>"), "got: {html}");
    }

    #[test]
    fn strikethrough() {
        assert!(render_fragment("~~gone~~").contains("<del>gone</del>"));
    }

    #[test]
    fn deterministic() {
        let md = "# A\n\n- one\n- two\n\n> quote\n";
        assert_eq!(render_fragment(md), render_fragment(md));
    }
}
