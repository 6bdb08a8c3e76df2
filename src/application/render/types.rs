use serde::{Deserialize, Serialize};

/// Identifies what is being rendered and which pipeline applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderTarget {
    /// Render a blog post body through the markdown pipeline.
    PostBody { slug: String },
    /// Render a body as escaped text with newlines turned into `<br>`.
    PlainBody { slug: String },
}

impl RenderTarget {
    /// Returns the slug associated with the target. Only used for log context.
    pub fn slug(&self) -> &str {
        match self {
            RenderTarget::PostBody { slug } | RenderTarget::PlainBody { slug } => slug.as_str(),
        }
    }
}

/// Rendering request passed into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub target: RenderTarget,
    /// Source markdown as stored by the content backend.
    pub markdown: String,
}

impl RenderRequest {
    pub fn new(target: RenderTarget, markdown: impl Into<String>) -> Self {
        Self {
            target,
            markdown: markdown.into(),
        }
    }

    pub fn post(slug: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self::new(RenderTarget::PostBody { slug: slug.into() }, markdown)
    }
}

/// Content-level metrics surfaced alongside rendered HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContentMetrics {
    pub word_count: u32,
    pub reading_time_minutes: u32,
    pub code_blocks_count: u32,
    pub links_count: u32,
}

/// Deterministic rendering result returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutput {
    /// HTML fragment ready to be placed inside the post container.
    pub html: String,
    /// Indicates whether the fragment contains any fenced code blocks.
    pub contains_code: bool,
    #[serde(default)]
    pub content_metrics: ContentMetrics,
}

/// Trait exposed by the rendering pipeline. Rendering is total: every input
/// string produces a fragment, and the same input always produces the same one.
pub trait RenderService: Send + Sync {
    fn render(&self, request: &RenderRequest) -> RenderOutput;
}
