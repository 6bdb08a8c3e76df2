//! Span-level stages: escaping, emphasis, inline code and links.
//!
//! Every stage expects fence placeholders to already be in place and operates
//! on single lines only; none of the patterns cross a newline.

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern must compile"));

// The opening `*` must be followed by a non-space so that `* item` bullets are
// never taken for emphasis.
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^\s*][^*\n]*?)\*").expect("italic pattern must compile"));

static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`\n]+)`").expect("inline code pattern must compile"));

static LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").expect("link pattern must compile")
});

/// Escape the characters that would otherwise be interpreted as markup.
pub(crate) fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub(crate) fn bold(input: &str) -> String {
    BOLD.replace_all(input, "<strong>${1}</strong>").into_owned()
}

/// Must run after [`bold`], otherwise `**` pairs are split into two emphasis spans.
pub(crate) fn italic(input: &str) -> String {
    ITALIC.replace_all(input, "<em>${1}</em>").into_owned()
}

pub(crate) fn inline_code(input: &str) -> String {
    INLINE_CODE
        .replace_all(input, "<code>${1}</code>")
        .into_owned()
}

pub(crate) fn links(input: &str) -> String {
    LINK.replace_all(
        input,
        "<a href=\"${2}\" target=\"_blank\" rel=\"noopener noreferrer\">${1}</a>",
    )
    .into_owned()
}

pub(crate) fn count_links(input: &str) -> usize {
    LINK.find_iter(input).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<script>alert("x") && 1</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp;&amp; 1&lt;/script&gt;"
        );
    }

    #[test]
    fn bold_is_non_greedy() {
        assert_eq!(
            bold("**a** and **b**"),
            "<strong>a</strong> and <strong>b</strong>"
        );
    }

    #[test]
    fn italic_after_bold_keeps_spans_separate() {
        let html = italic(&bold("**strong** then *soft*"));
        assert_eq!(html, "<strong>strong</strong> then <em>soft</em>");
    }

    #[test]
    fn italic_ignores_bullet_markers() {
        assert_eq!(italic("* item"), "* item");
        assert_eq!(italic("* one *two*"), "* one <em>two</em>");
    }

    #[test]
    fn italic_does_not_span_lines() {
        assert_eq!(italic("*open\nclose*"), "*open\nclose*");
    }

    #[test]
    fn inline_code_wraps_span() {
        assert_eq!(inline_code("run `cargo` now"), "run <code>cargo</code> now");
    }

    #[test]
    fn links_open_in_new_context_without_opener() {
        assert_eq!(
            links("see [docs](https://example.com/a?b=c)"),
            "see <a href=\"https://example.com/a?b=c\" target=\"_blank\" \
             rel=\"noopener noreferrer\">docs</a>"
        );
    }

    #[test]
    fn counts_links() {
        assert_eq!(count_links("[a](x) and [b](y) but not [c]"), 2);
    }
}
