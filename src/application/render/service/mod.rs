mod blocks;
mod content;
mod fences;
mod inline;
mod sanitize;

use std::{num::NonZeroU32, sync::Arc};

use metrics::counter;
use once_cell::sync::{Lazy, OnceCell};
use thiserror::Error;
use tracing::debug;

use crate::application::render::types::{RenderOutput, RenderRequest, RenderService, RenderTarget};
use crate::config::DEFAULT_WORDS_PER_MINUTE;

use content::build_content_metrics;
use fences::{ExtractedFences, extract_fences, restore_fences};
use sanitize::build_post_sanitizer;

pub(crate) const METRIC_RENDER_TOTAL: &str = "folio_render_total";
pub(crate) const METRIC_RENDER_CODE_BLOCKS_TOTAL: &str = "folio_render_code_blocks_total";

/// Regex substitution pipeline for the post markdown dialect.
///
/// Stages run in a fixed order and each one is a pure `&str -> String`
/// transform:
///
/// 1. normalise line endings and extract fenced code blocks
/// 2. escape raw text (when enabled)
/// 3. headings, bold, italic, inline code, links
/// 4. unordered lists, ordered lists, blockquotes, horizontal rules
/// 5. paragraphs
/// 6. restore fenced code blocks, then sanitise (when enabled)
pub struct MarkdownRenderService {
    config: RenderPipelineConfig,
    sanitizer: Option<ammonia::Builder<'static>>,
}

impl MarkdownRenderService {
    pub fn new(config: RenderPipelineConfig) -> Self {
        let sanitizer = config.sanitize.then(build_post_sanitizer);
        Self { config, sanitizer }
    }
}

impl Default for MarkdownRenderService {
    fn default() -> Self {
        Self::new(RenderPipelineConfig::default())
    }
}

static RENDER_SERVICE: Lazy<Arc<MarkdownRenderService>> =
    Lazy::new(|| Arc::new(MarkdownRenderService::new(active_render_config())));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<MarkdownRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

/// Render a post body with the default pipeline configuration.
pub fn render_markdown(markdown: &str) -> String {
    let escape = RenderPipelineConfig::default().escape_html;
    render_post_body(&normalize_line_endings(markdown), escape).html
}

impl RenderService for MarkdownRenderService {
    fn render(&self, request: &RenderRequest) -> RenderOutput {
        debug!(
            target: "folio::render",
            slug = request.target.slug(),
            bytes = request.markdown.len(),
            "rendering document"
        );

        let source = normalize_line_endings(&request.markdown);

        let body = match &request.target {
            RenderTarget::PostBody { .. } => render_post_body(&source, self.config.escape_html),
            RenderTarget::PlainBody { .. } => PostBody {
                html: plain_stages(&source, self.config.escape_html),
                code_blocks: 0,
                links: 0,
            },
        };

        let html = match &self.sanitizer {
            Some(sanitizer) => sanitizer.clean(&body.html).to_string(),
            None => body.html,
        };

        counter!(METRIC_RENDER_TOTAL, "target" => target_label(&request.target)).increment(1);
        counter!(METRIC_RENDER_CODE_BLOCKS_TOTAL).increment(body.code_blocks as u64);

        RenderOutput {
            html,
            contains_code: body.code_blocks > 0,
            content_metrics: build_content_metrics(
                &source,
                body.code_blocks,
                body.links,
                self.config.words_per_minute,
            ),
        }
    }
}

/// Tunables for [`MarkdownRenderService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPipelineConfig {
    /// Escape `& < > "` in raw text before structural substitution.
    pub escape_html: bool,
    /// Run the finished fragment through an allow-list sanitizer.
    pub sanitize: bool,
    pub words_per_minute: NonZeroU32,
}

impl Default for RenderPipelineConfig {
    fn default() -> Self {
        Self {
            escape_html: true,
            sanitize: false,
            words_per_minute: NonZeroU32::new(DEFAULT_WORDS_PER_MINUTE)
                .unwrap_or(NonZeroU32::MIN),
        }
    }
}

impl From<&crate::config::RenderSettings> for RenderPipelineConfig {
    fn from(settings: &crate::config::RenderSettings) -> Self {
        Self {
            escape_html: settings.escape_html,
            sanitize: settings.sanitize,
            words_per_minute: settings.words_per_minute,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderConfigError {
    #[error("render service already configured")]
    AlreadyConfigured,
}

static RENDER_PIPELINE_CONFIG: OnceCell<RenderPipelineConfig> = OnceCell::new();

/// Register the configuration used by [`render_service`]. Must happen before
/// the first call to [`render_service`] to take effect.
pub fn configure_render_service(config: RenderPipelineConfig) -> Result<(), RenderConfigError> {
    RENDER_PIPELINE_CONFIG
        .set(config)
        .map_err(|_| RenderConfigError::AlreadyConfigured)
}

fn active_render_config() -> RenderPipelineConfig {
    RENDER_PIPELINE_CONFIG.get().cloned().unwrap_or_default()
}

fn normalize_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n")
}

struct PostBody {
    html: String,
    code_blocks: usize,
    links: usize,
}

fn render_post_body(source: &str, escape: bool) -> PostBody {
    let ExtractedFences { text, fences } = extract_fences(source);
    let links = inline::count_links(&text);
    let html = markdown_stages(&text, escape);

    PostBody {
        html: restore_fences(&html, &fences, escape),
        code_blocks: fences.len(),
        links,
    }
}

// Expects fence placeholders to be in place already.
fn markdown_stages(text: &str, escape: bool) -> String {
    let text = if escape {
        inline::escape_html(text)
    } else {
        text.to_string()
    };

    let html = blocks::headings(&text);
    let html = inline::bold(&html);
    let html = inline::italic(&html);
    let html = inline::inline_code(&html);
    let html = inline::links(&html);
    let html = blocks::unordered_lists(&html);
    let html = blocks::ordered_lists(&html);
    let html = blocks::blockquotes(&html);
    let html = blocks::horizontal_rules(&html);
    blocks::paragraphs(&html)
}

fn plain_stages(text: &str, escape: bool) -> String {
    if escape {
        blocks::line_breaks(&inline::escape_html(text))
    } else {
        blocks::line_breaks(text)
    }
}

fn target_label(target: &RenderTarget) -> &'static str {
    match target {
        RenderTarget::PostBody { .. } => "post",
        RenderTarget::PlainBody { .. } => "plain",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_post(markdown: &str) -> RenderOutput {
        MarkdownRenderService::default().render(&RenderRequest::post("test", markdown))
    }

    #[test]
    fn plain_text_becomes_single_paragraph() {
        assert_eq!(render_markdown("hello world"), "<p>hello world</p>");
    }

    #[test]
    fn heading_renders_without_paragraph_wrapper() {
        assert_eq!(render_markdown("# Title"), "<h1>Title</h1>");
    }

    #[test]
    fn bold_and_italic_inside_paragraph() {
        assert_eq!(
            render_markdown("**bold** and *italic*"),
            "<p><strong>bold</strong> and <em>italic</em></p>"
        );
    }

    #[test]
    fn fence_content_is_protected_from_inline_rules() {
        let html = render_markdown("```js\nconst x = 1;\n```");
        assert_eq!(
            html,
            "<div class=\"code-block\"><div class=\"code-language\">js</div>\
             <pre><code class=\"language-js\">const x = 1;</code></pre></div>"
        );

        let html = render_markdown("```\n**not bold** *not em* `not code`\n```");
        assert!(html.contains("<code>**not bold** *not em* `not code`</code>"));
        assert!(!html.contains("<strong>"));
        assert!(!html.contains("<em>"));
    }

    #[test]
    fn fence_mentioning_placeholder_syntax_stays_verbatim() {
        let html = render_markdown(
            "```\nlet s = \"__FOLIO_FENCE_1__\";\n```\n\n```sh\nrm -rf /\n```",
        );
        assert_eq!(
            html,
            "<div class=\"code-block\"><pre><code>let s = &quot;__FOLIO_FENCE_1__&quot;;</code></pre></div>\n\
             <div class=\"code-block\"><div class=\"code-language\">sh</div>\
             <pre><code class=\"language-sh\">rm -rf /</code></pre></div>"
        );
    }

    #[test]
    fn placeholder_lookalikes_in_prose_are_plain_text() {
        let html = render_markdown("```\nsecret\n```\n\nsee __FOLIO_FENCE_0__ here");
        assert_eq!(html.matches("secret").count(), 1);
        assert!(html.ends_with("<p>see __FOLIO_FENCE_0__ here</p>"));

        let html = render_markdown("```\nsecret\n```\n\nsee \u{E000}0\u{E000} here");
        assert_eq!(html.matches("secret").count(), 1);
        assert!(html.ends_with("<p>see 0 here</p>"));
    }

    #[test]
    fn lone_placeholder_lookalike_is_a_paragraph() {
        assert_eq!(
            render_markdown("__FOLIO_FENCE_0__"),
            "<p>__FOLIO_FENCE_0__</p>"
        );
        assert_eq!(render_markdown("\u{E000}0\u{E000}"), "<p>0</p>");
    }

    #[test]
    fn paragraph_whitespace_is_trimmed() {
        assert_eq!(render_markdown("  hi  "), "<p>hi</p>");
    }

    #[test]
    fn bullets_are_wrapped_once() {
        assert_eq!(render_markdown("* a\n* b"), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn link_renders_anchor() {
        assert_eq!(
            render_markdown("[text](http://example.com)"),
            "<p><a href=\"http://example.com\" target=\"_blank\" \
             rel=\"noopener noreferrer\">text</a></p>"
        );
    }

    #[test]
    fn crlf_input_is_normalised() {
        assert_eq!(
            render_markdown("# Title\r\n\r\nbody"),
            "<h1>Title</h1>\n<p>body</p>"
        );
    }

    #[test]
    fn raw_html_is_escaped_by_default() {
        assert_eq!(
            render_markdown("<script>alert(1)</script>"),
            "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn escaping_can_be_disabled() {
        let service = MarkdownRenderService::new(RenderPipelineConfig {
            escape_html: false,
            ..RenderPipelineConfig::default()
        });
        let output = service.render(&RenderRequest::post("raw", "<b>x</b>\n\n> quote"));
        assert_eq!(output.html, "<p><b>x</b></p>\n<blockquote>quote</blockquote>");
    }

    #[test]
    fn sanitizer_runs_when_enabled() {
        let service = MarkdownRenderService::new(RenderPipelineConfig {
            escape_html: false,
            sanitize: true,
            ..RenderPipelineConfig::default()
        });
        let output = service.render(&RenderRequest::post("x", "hi <script>alert(1)</script>"));
        assert_eq!(output.html, "<p>hi </p>");
    }

    #[test]
    fn plain_body_uses_line_breaks() {
        let output = MarkdownRenderService::default().render(&RenderRequest::new(
            RenderTarget::PlainBody {
                slug: "plain".into(),
            },
            "# not a heading\n<i>x</i>",
        ));
        assert_eq!(output.html, "# not a heading<br>&lt;i&gt;x&lt;/i&gt;");
        assert!(!output.contains_code);
    }

    #[test]
    fn output_reports_code_and_metrics() {
        let output = render_post("Intro [a](x)\n\n```sh\nls\n```\n\n```\npwd\n```");
        assert!(output.contains_code);
        assert_eq!(output.content_metrics.code_blocks_count, 2);
        assert_eq!(output.content_metrics.links_count, 1);
        assert_eq!(output.content_metrics.reading_time_minutes, 1);
    }

    #[test]
    fn empty_document_renders_empty_fragment() {
        let output = render_post("");
        assert_eq!(output.html, "");
        assert_eq!(output.content_metrics.word_count, 0);
        assert_eq!(output.content_metrics.reading_time_minutes, 0);
    }
}
