//! Conversion entry points.
//!
//! [`convert`] runs the whole pipeline for one file on disk. The lower-level
//! [`render_document`] and [`render_pdf`] expose the HTML-only and in-memory
//! halves for callers that manage files themselves.

use crate::config::{ConversionConfig, Theme};
use crate::error::Md2PdfError;
use crate::output::{self, ConversionOutput, ConversionStats};
use crate::pipeline::render::{PdfRenderer, Renderer};
use crate::pipeline::{assemble, input, markdown};
use crate::progress::Stage;
use std::future::Future;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a Markdown file to a PDF next to it (or at `config.output`).
///
/// # Errors
/// - Input missing, unreadable or not UTF-8
/// - Rendering engine missing, failing, or timing out
/// - Output not writable
///
/// A failure to read back the output size is not an error; it leaves
/// `size_bytes` as None.
pub async fn convert(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Md2PdfError> {
    let total_start = Instant::now();
    let resolved = input::resolve_input(input_path.as_ref(), config.output.as_deref())?;
    info!(
        "Converting {} → {}",
        resolved.input.display(),
        resolved.output.display()
    );

    // ── Step 1: Read ─────────────────────────────────────────────────────
    let source = stage(config, Stage::Read, input::read_markdown(&resolved.input)).await?;

    // ── Step 2–3: Markdown → HTML document ───────────────────────────────
    let title = resolved
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let html = build_document(&source, &title, config);

    // ── Step 4: Render ───────────────────────────────────────────────────
    let renderer = Renderer::from_config(config)?;
    let render_start = Instant::now();
    let pdf = stage(config, Stage::Render, renderer.render(&html, &config.layout)).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!(
        "{} rendered {} bytes in {}ms",
        renderer.name(),
        pdf.len(),
        render_duration_ms
    );

    let stats = ConversionStats {
        markdown_bytes: source.len(),
        html_bytes: html.len(),
        pdf_bytes: pdf.len(),
        render_duration_ms,
        total_duration_ms: 0,
    };
    drop(html);

    // ── Step 5: Write ────────────────────────────────────────────────────
    stage(
        config,
        Stage::Write,
        output::write_atomic(&resolved.output, pdf),
    )
    .await?;

    let size_bytes = output::file_size(&resolved.output).await;

    Ok(ConversionOutput {
        input_path: resolved.input,
        output_path: resolved.output,
        backend: config.backend,
        layout: config.layout.clone(),
        size_bytes,
        stats: ConversionStats {
            total_duration_ms: total_start.elapsed().as_millis() as u64,
            ..stats
        },
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Md2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Md2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_path, config))
}

/// Render Markdown to PDF bytes in memory; nothing touches the file system.
pub async fn render_pdf(
    markdown_source: &str,
    title: &str,
    config: &ConversionConfig,
) -> Result<Vec<u8>, Md2PdfError> {
    let html = build_document(markdown_source, title, config);
    let renderer = Renderer::from_config(config)?;
    stage(config, Stage::Render, renderer.render(&html, &config.layout)).await
}

/// Markdown → complete, styled HTML document. Pure.
pub fn render_document(markdown_source: &str, title: &str, theme: &Theme) -> String {
    let fragment = markdown::render_fragment(markdown_source);
    assemble::assemble_document(&fragment, title, theme)
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn build_document(source: &str, title: &str, config: &ConversionConfig) -> String {
    let fragment = stage_sync(config, Stage::Markdown, || markdown::render_fragment(source));
    debug!("Markdown fragment: {} bytes", fragment.len());
    stage_sync(config, Stage::Assemble, || {
        assemble::assemble_document(&fragment, title, &config.theme)
    })
}

/// Run an async stage, reporting start/complete/error to the callback.
async fn stage<T>(
    config: &ConversionConfig,
    which: Stage,
    fut: impl Future<Output = Result<T, Md2PdfError>>,
) -> Result<T, Md2PdfError> {
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_stage_start(which);
    }
    let start = Instant::now();
    let result = fut.await;
    if let Some(cb) = cb {
        match &result {
            Ok(_) => cb.on_stage_complete(which, start.elapsed().as_millis() as u64),
            Err(e) => cb.on_stage_error(which, &e.to_string()),
        }
    }
    result
}

fn stage_sync<T>(config: &ConversionConfig, which: Stage, f: impl FnOnce() -> T) -> T {
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_stage_start(which);
    }
    let start = Instant::now();
    let value = f();
    if let Some(cb) = cb {
        cb.on_stage_complete(which, start.elapsed().as_millis() as u64);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;
    use crate::progress::ConversionProgressCallback;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<(Stage, bool)>>,
    }

    impl ConversionProgressCallback for Recorder {
        fn on_stage_complete(&self, stage: Stage, _elapsed_ms: u64) {
            self.events.lock().unwrap().push((stage, true));
        }

        fn on_stage_error(&self, stage: Stage, _error: &str) {
            self.events.lock().unwrap().push((stage, false));
        }
    }

    #[test]
    fn document_has_code_block_and_table() {
        let md = "# Report\n\n```\nlet x = 1;\n```\n\n| k | v |\n|---|---|\n| a | 1 |\n";
        let doc = render_document(md, "report", &Theme::standard());
        assert!(doc.contains("<pre><code>let x = 1;"), "got: {doc}");
        assert!(doc.contains("<table>"));
        assert!(doc.contains("<style>"));
        assert!(doc.contains("<title>report</title>"));
    }

    #[test]
    fn render_document_is_deterministic() {
        let md = "Hello\nworld\n\n* a\n* b\n";
        let theme = Theme::compact();
        assert_eq!(render_document(md, "t", &theme), render_document(md, "t", &theme));
    }

    #[tokio::test]
    async fn missing_input_fails_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let rec = Arc::new(Recorder::default());
        let config = ConversionConfig::builder()
            .backend(BackendKind::Wkhtmltopdf)
            .progress_callback(rec.clone())
            .build()
            .unwrap();

        let err = convert(dir.path().join("nope.md"), &config).await.unwrap_err();
        assert!(matches!(err, Md2PdfError::FileNotFound { .. }));
        assert!(rec.events.lock().unwrap().is_empty());
        assert!(!dir.path().join("nope.pdf").exists());
    }

    #[tokio::test]
    async fn render_failure_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("note.md");
        std::fs::write(&input, "# Title\n\nHello **world**").unwrap();

        let rec = Arc::new(Recorder::default());
        let config = ConversionConfig::builder()
            .backend(BackendKind::Wkhtmltopdf)
            .wkhtmltopdf_path("/definitely/not/wkhtmltopdf")
            .progress_callback(rec.clone())
            .build()
            .unwrap();

        let err = convert(&input, &config).await.unwrap_err();
        assert!(matches!(err, Md2PdfError::BackendUnavailable { .. }), "got: {err:?}");
        assert!(!dir.path().join("note.pdf").exists());
        assert_eq!(
            *rec.events.lock().unwrap(),
            vec![
                (Stage::Read, true),
                (Stage::Markdown, true),
                (Stage::Assemble, true),
                (Stage::Render, false),
            ]
        );
    }

    #[test]
    fn convert_sync_reports_missing_file() {
        let config = ConversionConfig::for_backend(BackendKind::Wkhtmltopdf);
        let err = convert_sync("/definitely/not/here.md", &config).unwrap_err();
        assert!(matches!(err, Md2PdfError::FileNotFound { .. }));
    }

    #[test]
    fn render_pdf_reports_unavailable_backend() {
        let config = ConversionConfig::builder()
            .backend(BackendKind::Wkhtmltopdf)
            .wkhtmltopdf_path("/definitely/not/wkhtmltopdf")
            .build()
            .unwrap();
        let err = tokio_test::block_on(render_pdf("# hi", "hi", &config)).unwrap_err();
        assert!(matches!(err, Md2PdfError::BackendUnavailable { .. }));
    }
}
