use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pycallmap::core::{AnalyzerOptions, CodebaseAnalyzer};
use pycallmap::formatters::{JsonCompactFormatter, JsonFormatter, MarkdownFormatter};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "pycallmap",
    version,
    author = "pycallmap developers",
    about = "Extract classes, inheritance and call edges from Python sources"
)]
struct Cli {
    /// Python file or directory to analyze
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Output file path, or `-` for stdout
    #[arg(short, long, value_name = "FILE", default_value = "CALLMAP.json")]
    output: PathBuf,

    /// Comma-separated class names to focus on
    #[arg(short, long, value_name = "CLASSES", value_delimiter = ',')]
    classes: Vec<String>,

    /// Output format: json, json-compact, markdown
    #[arg(short, long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Comma-separated source file extensions
    #[arg(long, value_name = "EXTS", value_delimiter = ',', default_value = "py")]
    extensions: Vec<String>,

    /// Descend into hidden and virtualenv/cache directories
    #[arg(long)]
    include_hidden: bool,

    /// Follow symbolic links while scanning
    #[arg(long)]
    follow_links: bool,

    /// Extract from files with syntax errors instead of skipping them
    #[arg(long)]
    tolerant: bool,

    /// Worker threads for extraction (1 disables parallelism)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum OutputFormat {
    Json,
    JsonCompact,
    Markdown,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);
    run(cli)
}

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        input,
        output,
        classes,
        format,
        extensions,
        include_hidden,
        follow_links,
        tolerant,
        jobs,
        log_level: _,
    } = cli;

    let start_time = Instant::now();

    if let Some(jobs) = jobs.filter(|&jobs| jobs > 1) {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("failed to configure worker threads")?;
    }

    let options = AnalyzerOptions::default()
        .with_extensions(extensions.iter().map(|ext| ext.trim().to_string()))
        .with_hidden(include_hidden)
        .with_follow_links(follow_links)
        .with_tolerance(tolerant)
        .with_parallel(jobs != Some(1));

    let analyzer = CodebaseAnalyzer::with_options(options);
    let report = analyzer
        .analyze_selected(&input, &classes)
        .with_context(|| format!("failed to analyze {}", input.display()))?;

    let rendered = match format {
        OutputFormat::Json => JsonFormatter::new().format(&report)?,
        OutputFormat::JsonCompact => JsonCompactFormatter::new().format(&report.model)?,
        OutputFormat::Markdown => MarkdownFormatter::new().format(&report)?,
    };
    write_output(&output, &rendered)?;

    let diagnostics = &report.diagnostics;
    info!(
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        files = diagnostics.files_analyzed,
        skipped = diagnostics.files_skipped(),
        "done"
    );
    if !diagnostics.is_clean() {
        eprintln!(
            "pycallmap: {} file(s) skipped, {} declaration(s) with partial information",
            diagnostics.files_skipped(),
            diagnostics.partial_declarations
        );
    }

    Ok(())
}

fn write_output(output: &Path, rendered: &str) -> Result<()> {
    if output == Path::new("-") {
        let mut stdout = io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        stdout.write_all(b"\n")?;
        return Ok(());
    }
    std::fs::write(output, rendered)
        .with_context(|| format!("failed to write {}", output.display()))?;
    eprintln!("pycallmap: wrote {}", output.display());
    Ok(())
}
