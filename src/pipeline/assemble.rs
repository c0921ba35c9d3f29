//! HTML fragment → complete, styled HTML document.
//!
//! The stylesheet is a fixed template; only the [`Theme`] constants vary.
//! Page margins are deliberately absent from the CSS: both backends apply
//! them at print time from [`crate::config::PageLayout`].

use crate::config::Theme;

/// Wrap `fragment` in a full HTML document with the theme's stylesheet.
pub fn assemble_document(fragment: &str, title: &str, theme: &Theme) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"UTF-8\">\n\
         <title>{title}</title>\n\
         <style>\n{css}</style>\n\
         </head>\n\
         <body>\n{fragment}</body>\n\
         </html>\n",
        title = escape_html(title),
        css = stylesheet(theme),
    )
}

/// The document stylesheet for `theme`.
pub fn stylesheet(theme: &Theme) -> String {
    let font_size = theme
        .font_size_px
        .map(|px| format!("  font-size: {px}px;\n"))
        .unwrap_or_default();

    format!(
        r#"body {{
  margin: 0;
  padding: {padding}px;
  font-family: 'Arial', 'Helvetica', sans-serif;
  line-height: {line_height};
  color: #333;
  max-width: {max_width}px;
  margin-left: auto;
  margin-right: auto;
{font_size}}}

h1, h2, h3, h4, h5, h6 {{
  color: #2c3e50;
  margin-top: {h_top}px;
  margin-bottom: {h_bottom}px;
}}

h1 {{
  font-size: {h1_size}em;
  border-bottom: {h1_border}px solid #3498db;
  padding-bottom: {h1_padding}px;
}}

h2 {{
  font-size: {h2_size}em;
  border-bottom: 2px solid #ecf0f1;
  padding-bottom: 2px;
}}

h3 {{
  font-size: 1em;
  color: #34495e;
}}

p {{
  margin-bottom: {p_bottom}px;
  text-align: justify;
}}

ul, ol {{
  margin-bottom: {list_bottom}px;
  padding-left: 30px;
}}

li {{
  margin-bottom: 3px;
}}

blockquote {{
  border-left: 4px solid #3498db;
  margin: 20px 0;
  padding: 10px 20px;
  background-color: #f8f9fa;
  font-style: italic;
}}

code {{
  background-color: #f1f2f6;
  padding: 2px 4px;
  border-radius: 3px;
  font-family: 'Courier New', monospace;
}}

pre {{
  background-color: #f1f2f6;
  padding: 15px;
  border-radius: 5px;
  overflow-x: auto;
  margin: 15px 0;
}}

pre code {{
  background-color: transparent;
  padding: 0;
}}

table {{
  border-collapse: collapse;
  width: 100%;
  margin: 20px 0;
}}

th, td {{
  border: 1px solid #ddd;
  padding: 12px;
  text-align: left;
}}

th {{
  background-color: #f2f2f2;
  font-weight: bold;
}}

a {{
  color: #3498db;
  text-decoration: none;
}}

hr {{
  border: none;
  border-top: 2px solid #ecf0f1;
  margin: 30px 0;
}}
"#,
        padding = theme.body_padding_px,
        line_height = theme.line_height,
        max_width = theme.max_content_width_px,
        font_size = font_size,
        h_top = theme.heading_margin_top_px,
        h_bottom = theme.heading_margin_bottom_px,
        h1_size = theme.h1_font_size_em,
        h1_border = theme.h1_border_px,
        h1_padding = theme.h1_padding_bottom_px,
        h2_size = theme.h2_font_size_em,
        p_bottom = theme.paragraph_margin_bottom_px,
        list_bottom = theme.list_margin_bottom_px,
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_wraps_fragment() {
        let doc = assemble_document("<p>hi</p>\n", "note", &Theme::standard());
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<meta charset=\"UTF-8\">"));
        assert!(doc.contains("<title>note</title>"));
        assert!(doc.contains("<body>\n<p>hi</p>\n</body>"));
        assert!(doc.trim_end().ends_with("</html>"));
    }

    #[test]
    fn title_is_escaped() {
        let doc = assemble_document("", "a<b>&\"c\"", &Theme::standard());
        assert!(doc.contains("<title>a&lt;b&gt;&amp;&quot;c&quot;</title>"));
    }

    #[test]
    fn standard_theme_values() {
        let css = stylesheet(&Theme::standard());
        assert!(css.contains("max-width: 1000px;"));
        assert!(css.contains("line-height: 1.6;"));
        assert!(css.contains("padding: 20px;"));
        assert!(css.contains("font-size: 2em;"));
        assert!(css.contains("border-bottom: 3px solid #3498db;"));
        // standard inherits the engine's root font size
        assert!(!css.contains("font-size: 10px;"));
    }

    #[test]
    fn compact_theme_values() {
        let css = stylesheet(&Theme::compact());
        assert!(css.contains("max-width: 800px;"));
        assert!(css.contains("line-height: 1.3;"));
        assert!(css.contains("font-size: 10px;"));
        assert!(css.contains("font-size: 1.5em;"));
        assert!(css.contains("font-size: 1.3em;"));
    }

    #[test]
    fn braces_balance() {
        for theme in [Theme::standard(), Theme::compact()] {
            let css = stylesheet(&theme);
            assert_eq!(css.matches('{').count(), css.matches('}').count());
            assert!(!css.contains("{{"));
        }
    }
}
