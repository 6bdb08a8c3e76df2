//! Markdown rendering for post bodies.
//!
//! The pipeline is pure: it accepts a document, produces a deterministic HTML
//! fragment, and never fails. Fetching the document and placing the fragment
//! into a page are the caller's concern.

mod service;
mod types;

pub use service::{
    MarkdownRenderService, RenderConfigError, RenderPipelineConfig, configure_render_service,
    render_markdown, render_service,
};
pub(crate) use service::{METRIC_RENDER_CODE_BLOCKS_TOTAL, METRIC_RENDER_TOTAL};
pub use types::{ContentMetrics, RenderOutput, RenderRequest, RenderService, RenderTarget};
