use ammonia::Builder;
use comrak::{markdown_to_html, Options};
use std::collections::HashSet;

/// Render user-written post, offer or comment text to sanitized HTML.
///
/// Bare URLs become links and every link opens in a new tab. Raw HTML in the
/// source is escaped rather than passed through.
pub fn render_content(raw: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.render.hardbreaks = true;
    options.render.escape = true;

    let html = markdown_to_html(raw, &options);
    sanitize_html(&html)
}

fn sanitize_html(html: &str) -> String {
    let extra_tags: HashSet<&str> = ["pre", "code", "blockquote", "del", "s"]
        .iter()
        .copied()
        .collect();
    let url_schemes: HashSet<&str> = ["http", "https", "mailto"].iter().copied().collect();

    let mut builder = Builder::default();
    builder
        .add_tags(&extra_tags)
        .add_tag_attributes("a", &["href", "title"])
        .set_tag_attribute_value("a", "target", "_blank")
        .url_schemes(url_schemes)
        .link_rel(Some("noopener noreferrer"));

    builder.clean(html).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_url_opens_in_new_tab() {
        let html = render_content("Apply at https://example.com/jobs today");
        assert!(html.contains("href=\"https://example.com/jobs\""));
        assert!(html.contains("target=\"_blank\""));
        assert!(html.contains("rel=\"noopener noreferrer\""));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = render_content("<script>alert('x')</script>");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn javascript_links_are_dropped() {
        let html = render_content("[click](javascript:alert(1))");
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn line_breaks_survive() {
        let html = render_content("first\nsecond");
        assert!(html.contains("<br"));
    }

    #[test]
    fn empty_input() {
        assert!(render_content("").trim().is_empty());
    }
}
