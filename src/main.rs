use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
    process,
};

use folio::{
    application::{
        error::AppError,
        render::{
            RenderPipelineConfig, RenderRequest, RenderService, RenderTarget,
            configure_render_service, render_service,
        },
    },
    config::{self, RenderArgs, SlugArgs},
    domain::slug::derive_slug,
    infra::{error::InfraError, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

const STDIN_MARKER: &str = "-";
const DEFAULT_SLUG: &str = "untitled";

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    let chain = report.messages.join(": ");

    if dispatcher::has_been_set() {
        error!(error = %chain, source = report.source, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %chain, source = report.source, "application error");
    });
}

fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(|err| match err {
        config::LoadError::Invalid { .. } => AppError::validation(err.to_string()),
        config::LoadError::Build(_) => {
            AppError::unexpected(format!("failed to load configuration: {err}"))
        }
    })?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;
    configure_render_service(RenderPipelineConfig::from(&settings.render))
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    match cli_args.command {
        config::Command::Render(args) => run_render(args),
        config::Command::Slug(args) => run_slug(args),
    }
}

fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let input = args
        .file
        .as_deref()
        .filter(|path| path.as_os_str() != STDIN_MARKER);
    let markdown = read_source(input)?;

    let slug = args
        .slug
        .or_else(|| input.and_then(file_stem))
        .unwrap_or_else(|| DEFAULT_SLUG.to_string());

    let target = if args.plain {
        RenderTarget::PlainBody { slug }
    } else {
        RenderTarget::PostBody { slug }
    };

    let request = RenderRequest::new(target, markdown);
    let output = render_service().render(&request);

    info!(
        target: "folio::cli",
        slug = request.target.slug(),
        words = output.content_metrics.word_count,
        reading_time_minutes = output.content_metrics.reading_time_minutes,
        code_blocks = output.content_metrics.code_blocks_count,
        "rendered document"
    );

    let mut rendered = if args.json {
        serde_json::to_string_pretty(&output)
            .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))?
    } else {
        output.html
    };
    rendered.push('\n');

    write_output(args.output.as_deref(), &rendered)
}

fn run_slug(args: SlugArgs) -> Result<(), AppError> {
    let title = args.title.join(" ");
    let slug = derive_slug(&title)?;
    write_output(None, &format!("{slug}\n"))
}

fn read_source(path: Option<&Path>) -> Result<String, AppError> {
    match path {
        Some(path) => Ok(fs::read_to_string(path).map_err(InfraError::from)?),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(InfraError::from)?;
            Ok(buffer)
        }
    }
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<(), AppError> {
    match path {
        Some(path) => fs::write(path, contents).map_err(InfraError::from)?,
        None => io::stdout()
            .write_all(contents.as_bytes())
            .map_err(InfraError::from)?,
    }
    Ok(())
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_owned)
}
