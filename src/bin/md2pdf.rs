//! CLI binary for md2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use md2pdf::pipeline::input::{read_markdown, resolve_input};
use md2pdf::{
    convert, derive_output_path, render_document, BackendKind, ConversionConfig,
    ConversionProgressCallback, Length, PageFormat, ProgressCallback, Stage, Theme,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner that names the current stage and logs each finished one.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("md2pdf");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        if stage == Stage::Render {
            self.bar.println(format!(
                "  {} {:<16} {}",
                green("✓"),
                stage.label(),
                dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
            ));
        }
        if stage == Stage::Write {
            self.bar.finish_and_clear();
        }
    }

    fn on_stage_error(&self, stage: Stage, _error: &str) {
        self.bar.println(format!("  {} {}", red("✗"), stage.label()));
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert next to the source (resume.md → resume.pdf)
  md2pdf resume.md

  # Use the standalone engine and its compact theme
  md2pdf --backend wkhtmltopdf resume.md

  # Letter paper, wider margins, full scale
  md2pdf --format letter --margin 1cm --scale 1.0 notes.md -o out/notes.pdf

  # Inspect the generated HTML without rendering
  md2pdf --html-only notes.md > notes.html

BACKENDS:
  Backend      Engine                         Scale  Theme
  ───────────  ─────────────────────────────  ─────  ────────
  chromium     headless Chrome / Chromium     0.7    standard
  wkhtmltopdf  wkhtmltopdf executable         0.5    compact

ENVIRONMENT VARIABLES:
  RUST_LOG     Override the log filter (e.g. md2pdf=debug)
"#;

/// Convert Markdown files to styled PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "md2pdf",
    version,
    about = "Convert Markdown files to styled, paginated PDFs",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown file to convert.
    input: Option<PathBuf>,

    /// Write the PDF here instead of next to the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Rendering engine.
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Paper size: a3, a4, a5, letter, legal, tabloid.
    #[arg(long)]
    format: Option<String>,

    /// Margin on all four edges, e.g. 0.2cm, 2mm, 0.5in, 12px.
    #[arg(long)]
    margin: Option<String>,

    /// Content scale (0.1–2.0). Defaults to the backend's scale.
    #[arg(long)]
    scale: Option<f64>,

    /// Stylesheet: standard or compact. Defaults to the backend's theme.
    #[arg(long)]
    theme: Option<String>,

    /// Chrome/Chromium executable (chromium backend).
    #[arg(long)]
    browser: Option<PathBuf>,

    /// Launch Chromium without its sandbox (needed as root in containers).
    #[arg(long)]
    no_sandbox: bool,

    /// wkhtmltopdf executable (wkhtmltopdf backend).
    #[arg(long)]
    wkhtmltopdf: Option<PathBuf>,

    /// Give up on rendering after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Print the assembled HTML document to stdout and exit.
    #[arg(long)]
    html_only: bool,

    /// Print the conversion result as JSON.
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Chromium,
    Wkhtmltopdf,
}

impl From<BackendArg> for BackendKind {
    fn from(v: BackendArg) -> Self {
        match v {
            BackendArg::Chromium => BackendKind::Chromium,
            BackendArg::Wkhtmltopdf => BackendKind::Wkhtmltopdf,
        }
    }
}

#[tokio::main]
async fn main() {
    // Usage errors exit 1 like every other failure; help and version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", red("Error:"), one_line(&e));
        std::process::exit(1);
    }
}

/// Flatten an error chain and its hint lines into one diagnostic line.
fn one_line(err: &anyhow::Error) -> String {
    format!("{err:#}")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

async fn run(cli: Cli) -> Result<()> {
    let Some(input) = cli.input.clone() else {
        let mut cmd = Cli::command();
        eprintln!("{}", cmd.render_usage());
        eprintln!("Example: md2pdf resume.md");
        std::process::exit(1);
    };

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.html_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── HTML-only mode ───────────────────────────────────────────────────
    if cli.html_only {
        let resolved = resolve_input(&input, None).context("Failed to resolve input")?;
        let source = read_markdown(&resolved.input)
            .await
            .context("Failed to read input")?;
        let title = resolved
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let theme = build_config(&cli)?.theme;

        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(render_document(&source, &title, &theme).as_bytes())
            .context("Failed to write to stdout")?;
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let mut config = build_config(&cli)?;

    if !cli.quiet && !cli.json {
        let target = config
            .output
            .clone()
            .unwrap_or_else(|| derive_output_path(&input));
        println!(
            "Converting {} → {} (using {})…",
            input.display(),
            target.display(),
            config.backend
        );
    }

    // The spinner only starts once the flags are known to be valid.
    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        config.progress_callback = Some(cb);
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&input, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        println!("✅ Successfully created {}", output.output_path.display());
        if let Some(kb) = output.size_kb() {
            println!("📄 Output file size: {kb} KB");
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let backend = cli.backend.map(BackendKind::from).unwrap_or_default();
    let mut builder = ConversionConfig::builder()
        .backend(backend)
        .sandbox(!cli.no_sandbox);

    if let Some(ref s) = cli.format {
        builder = builder.format(s.parse::<PageFormat>()?);
    }
    if let Some(ref s) = cli.margin {
        builder = builder.margin(s.parse::<Length>()?);
    }
    if let Some(scale) = cli.scale {
        builder = builder.scale(scale);
    }
    if let Some(ref s) = cli.theme {
        builder = builder.theme(s.parse::<Theme>()?);
    }
    if let Some(ref p) = cli.output {
        builder = builder.output(p.clone());
    }
    if let Some(ref p) = cli.browser {
        builder = builder.browser_executable(p.clone());
    }
    if let Some(ref p) = cli.wkhtmltopdf {
        builder = builder.wkhtmltopdf_path(p.clone());
    }
    if let Some(secs) = cli.timeout {
        builder = builder.render_timeout_secs(secs);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_chain_fits_on_one_line() {
        let err = anyhow::Error::new(md2pdf::Md2PdfError::FileNotFound {
            path: PathBuf::from("/tmp/nope.md"),
        })
        .context("Conversion failed");
        let line = one_line(&err);
        assert!(!line.contains('\n'), "got: {line}");
        assert!(line.starts_with("Conversion failed: File '/tmp/nope.md' not found."));
        assert!(line.ends_with("Check the path exists and is readable."));
    }

    #[test]
    fn extra_positional_is_a_usage_error() {
        let err = Cli::try_parse_from(["md2pdf", "a.md", "b.md"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
