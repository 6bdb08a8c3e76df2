use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the folio binary.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Portfolio blog markdown tools")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "FOLIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render a markdown post body to an HTML fragment.
    Render(RenderArgs),
    /// Derive a URL slug from a post title.
    Slug(SlugArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub overrides: RenderOverrides,

    /// Markdown file to render; `-` or no argument reads stdin.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Render as plain text with line breaks instead of markdown.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub plain: bool,

    /// Emit the full render output (HTML and content metrics) as JSON.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,

    /// Slug recorded on the render request; defaults to the file stem.
    #[arg(long, value_name = "SLUG")]
    pub slug: Option<String>,

    /// Write the result to a file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SlugArgs {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    /// Post title; multiple words are joined with spaces.
    #[arg(value_name = "TITLE", required = true, num_args = 1..)]
    pub title: Vec<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderOverrides {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    /// Toggle escaping of raw HTML in the source before rendering.
    #[arg(
        long = "render-escape-html",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub escape_html: Option<bool>,

    /// Toggle the allow-list sanitizer on rendered output.
    #[arg(
        long = "render-sanitize",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub sanitize: Option<bool>,

    /// Override the reading speed used for reading-time estimates.
    #[arg(long = "render-words-per-minute", value_name = "COUNT")]
    pub words_per_minute: Option<u32>,
}
