//! Line-anchored stages: headings, lists, blockquotes, rules and paragraphs.
//!
//! Each block stage turns one source line into one output line, so later
//! stages (and the paragraph splitter in particular) can still reason about
//! the document line by line.

use once_cell::sync::Lazy;
use regex::Regex;

use super::fences::is_placeholder_line;

static HEADING_3: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^### (.*)$").expect("h3 pattern must compile"));
static HEADING_2: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^## (.*)$").expect("h2 pattern must compile"));
static HEADING_1: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^# (.*)$").expect("h1 pattern must compile"));

static UNORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\* (.+)$").expect("bullet pattern must compile"));
static ORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\. (.+)$").expect("numbered item pattern must compile"));

// Accepts the escaped marker as well since escaping runs before this stage.
static BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:>|&gt;) (.+)$").expect("blockquote pattern must compile")
});

static HORIZONTAL_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^---$").expect("rule pattern must compile"));

static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("blank line pattern must compile"));

const BLOCK_PREFIXES: [&str; 7] = [
    "<h1>",
    "<h2>",
    "<h3>",
    "<ul>",
    "<ol>",
    "<blockquote>",
    "<hr>",
];

/// Most specific level first, so `#` never claims a `##` or `###` line.
pub(crate) fn headings(input: &str) -> String {
    let html = HEADING_3.replace_all(input, "<h3>${1}</h3>");
    let html = HEADING_2.replace_all(&html, "<h2>${1}</h2>");
    HEADING_1.replace_all(&html, "<h1>${1}</h1>").into_owned()
}

pub(crate) fn unordered_lists(input: &str) -> String {
    wrap_list_runs(input, &UNORDERED_ITEM, "ul")
}

pub(crate) fn ordered_lists(input: &str) -> String {
    wrap_list_runs(input, &ORDERED_ITEM, "ol")
}

pub(crate) fn blockquotes(input: &str) -> String {
    BLOCKQUOTE
        .replace_all(input, "<blockquote>${1}</blockquote>")
        .into_owned()
}

pub(crate) fn horizontal_rules(input: &str) -> String {
    HORIZONTAL_RULE.replace_all(input, "<hr>").into_owned()
}

/// Split the remaining text on blank lines and wrap every run of non-block
/// lines in `<p>`. Lines produced by the block stages, and fence placeholders
/// standing on their own line, are emitted unwrapped. Empty paragraphs are
/// dropped.
pub(crate) fn paragraphs(input: &str) -> String {
    let mut blocks: Vec<String> = Vec::new();

    for chunk in BLANK_LINES.split(input) {
        let mut pending: Vec<&str> = Vec::new();
        for line in chunk.split('\n') {
            if is_block_line(line) {
                flush_paragraph(&mut pending, &mut blocks);
                blocks.push(line.trim().to_string());
            } else {
                pending.push(line);
            }
        }
        flush_paragraph(&mut pending, &mut blocks);
    }

    blocks.join("\n")
}

/// Newlines become `<br>`; nothing else is interpreted.
pub(crate) fn line_breaks(input: &str) -> String {
    input.replace('\n', "<br>")
}

// A list run is a maximal sequence of adjacent item lines of one kind. Any
// other line, blank or not, closes it.
fn wrap_list_runs(input: &str, item: &Regex, tag: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut run: Vec<String> = Vec::new();

    for line in input.split('\n') {
        match item.captures(line) {
            Some(caps) => run.push(format!("<li>{}</li>", &caps[1])),
            None => {
                flush_list(&mut run, tag, &mut lines);
                lines.push(line.to_string());
            }
        }
    }
    flush_list(&mut run, tag, &mut lines);

    lines.join("\n")
}

fn flush_list(run: &mut Vec<String>, tag: &str, lines: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    lines.push(format!("<{tag}>{}</{tag}>", run.concat()));
    run.clear();
}

fn flush_paragraph(pending: &mut Vec<&str>, blocks: &mut Vec<String>) {
    let text = pending.join("\n");
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        blocks.push(format!("<p>{trimmed}</p>"));
    }
    pending.clear();
}

fn is_block_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    BLOCK_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
        || is_placeholder_line(line)
}

#[cfg(test)]
mod tests {
    use super::super::fences::placeholder;
    use super::*;

    #[test]
    fn headings_match_most_specific_first() {
        assert_eq!(
            headings("# One\n## Two\n### Three"),
            "<h1>One</h1>\n<h2>Two</h2>\n<h3>Three</h3>"
        );
    }

    #[test]
    fn heading_requires_space_after_hashes() {
        assert_eq!(headings("#hashtag"), "#hashtag");
        assert_eq!(headings("#### four"), "#### four");
    }

    #[test]
    fn adjacent_bullets_share_one_list() {
        assert_eq!(
            unordered_lists("* a\n* b"),
            "<ul><li>a</li><li>b</li></ul>"
        );
    }

    #[test]
    fn blank_line_terminates_list() {
        assert_eq!(
            unordered_lists("* a\n\n* b"),
            "<ul><li>a</li></ul>\n\n<ul><li>b</li></ul>"
        );
    }

    #[test]
    fn mixed_runs_produce_separate_containers() {
        let html = ordered_lists(&unordered_lists("* a\n1. b\n2. c\n* d"));
        assert_eq!(
            html,
            "<ul><li>a</li></ul>\n<ol><li>b</li><li>c</li></ol>\n<ul><li>d</li></ul>"
        );
    }

    #[test]
    fn nested_items_are_not_list_items() {
        assert_eq!(unordered_lists("  * nested"), "  * nested");
    }

    #[test]
    fn blockquote_accepts_raw_and_escaped_marker() {
        assert_eq!(blockquotes("> raw"), "<blockquote>raw</blockquote>");
        assert_eq!(
            blockquotes("&gt; escaped"),
            "<blockquote>escaped</blockquote>"
        );
    }

    #[test]
    fn rule_needs_whole_line() {
        assert_eq!(horizontal_rules("---"), "<hr>");
        assert_eq!(horizontal_rules("a --- b"), "a --- b");
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        assert_eq!(
            paragraphs("first\nstill first\n\n\n  \nsecond"),
            "<p>first\nstill first</p>\n<p>second</p>"
        );
    }

    #[test]
    fn block_lines_are_not_wrapped() {
        let fence = placeholder(0);
        assert_eq!(
            paragraphs(&format!("<h1>Title</h1>\nintro\n{fence}\noutro")),
            format!("<h1>Title</h1>\n<p>intro</p>\n{fence}\n<p>outro</p>")
        );
    }

    #[test]
    fn paragraph_text_is_trimmed() {
        assert_eq!(paragraphs(" hi "), "<p>hi</p>");
        assert_eq!(paragraphs("  first\nsecond  "), "<p>first\nsecond</p>");
    }

    #[test]
    fn empty_input_yields_no_paragraphs() {
        assert_eq!(paragraphs(""), "");
        assert_eq!(paragraphs("\n\n\n"), "");
    }

    #[test]
    fn line_breaks_replace_every_newline() {
        assert_eq!(line_breaks("a\nb\n"), "a<br>b<br>");
    }
}
