//! Markdown rendering and post helpers for a terminal-styled portfolio blog.
//!
//! Persistence, authentication, and page chrome live in the hosting
//! application and its backend; this crate owns the pieces with real
//! behaviour: turning a stored post body into an HTML fragment, estimating
//! reading time, and deriving post slugs.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
