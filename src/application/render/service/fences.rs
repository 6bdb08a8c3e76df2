//! Fenced code block extraction and restoration.
//!
//! Fences are pulled out of the document before any other stage runs and
//! replaced with opaque placeholders. A placeholder is the fence index wrapped
//! in [`PLACEHOLDER_MARK`], a private-use character that is stripped from the
//! rest of the source, so no document text can pose as one. The inline and
//! block stages pass placeholders through untouched, and [`restore_fences`]
//! swaps the finished block markup back in once every other substitution has
//! completed.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::inline::escape_html;

/// Delimits fence placeholders. Never survives in text outside a fence.
pub(crate) const PLACEHOLDER_MARK: char = '\u{E000}';

static FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(\w+)?\n(.*?)```").expect("fence pattern must compile")
});

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x{E000}(\d+)\x{E000}").expect("placeholder pattern must compile")
});

static PLACEHOLDER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\x{E000}\d+\x{E000}$").expect("placeholder line pattern must compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CodeFence {
    pub(crate) language: Option<String>,
    /// Trimmed fence body, exactly as written in the source.
    pub(crate) code: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ExtractedFences {
    pub(crate) text: String,
    pub(crate) fences: Vec<CodeFence>,
}

pub(crate) fn placeholder(index: usize) -> String {
    format!("{PLACEHOLDER_MARK}{index}{PLACEHOLDER_MARK}")
}

/// Replace every complete fence with a placeholder. An opening fence without
/// a closing one is left in place and degrades to ordinary text. Stray
/// [`PLACEHOLDER_MARK`] characters outside fences are dropped.
pub(crate) fn extract_fences(input: &str) -> ExtractedFences {
    let mut text = String::with_capacity(input.len());
    let mut fences = Vec::new();
    let mut last = 0;

    for caps in FENCE.captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_outside_text(&mut text, &input[last..whole.start()]);
        text.push_str(&placeholder(fences.len()));
        fences.push(CodeFence {
            language: caps.get(1).map(|lang| lang.as_str().to_string()),
            code: caps
                .get(2)
                .map(|code| code.as_str().trim().to_string())
                .unwrap_or_default(),
        });
        last = whole.end();
    }
    push_outside_text(&mut text, &input[last..]);

    ExtractedFences { text, fences }
}

fn push_outside_text(out: &mut String, segment: &str) {
    out.extend(segment.chars().filter(|ch| *ch != PLACEHOLDER_MARK));
}

/// Whether a line consists of nothing but a fence placeholder.
pub(crate) fn is_placeholder_line(line: &str) -> bool {
    PLACEHOLDER_LINE.is_match(line.trim())
}

/// Swap placeholders for code block markup in a single pass, so restored
/// code is never scanned again.
pub(crate) fn restore_fences(html: &str, fences: &[CodeFence], escape: bool) -> String {
    if fences.is_empty() {
        return html.to_string();
    }

    PLACEHOLDER
        .replace_all(html, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| fences.get(index))
                .map(|fence| code_block_html(fence, escape))
                .unwrap_or_default()
        })
        .into_owned()
}

fn code_block_html(fence: &CodeFence, escape: bool) -> String {
    let code = if escape {
        escape_html(&fence.code)
    } else {
        fence.code.clone()
    };

    match fence.language.as_deref() {
        Some(lang) => format!(
            "<div class=\"code-block\"><div class=\"code-language\">{lang}</div>\
             <pre><code class=\"language-{}\">{code}</code></pre></div>",
            lang.to_ascii_lowercase()
        ),
        None => format!("<div class=\"code-block\"><pre><code>{code}</code></pre></div>"),
    }
}
