//! Error types for the md2pdf library.
//!
//! Every failure in the pipeline is fatal: there is one input document and one
//! output file, so there is nothing to salvage once a stage fails. All of them
//! are reported through [`Md2PdfError`].
//!
//! The one exception is reading the size of the finished PDF for the report.
//! That happens after the PDF is safely on disk, so a failure there is logged
//! and surfaces as `ConversionOutput::size_bytes == None` instead.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// All errors returned by the md2pdf library.
#[derive(Debug, Error)]
pub enum Md2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File '{path}' not found.\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read as UTF-8 text.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation or option parsing failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Rendering errors ──────────────────────────────────────────────────
    /// The selected rendering engine could not be started.
    #[error("Rendering backend '{backend}' is not available: {detail}\n{hint}")]
    BackendUnavailable {
        backend: &'static str,
        detail: String,
        hint: &'static str,
    },

    /// The rendering engine started but failed to produce a PDF.
    #[error("Rendering with '{backend}' failed: {detail}")]
    RenderFailed {
        backend: &'static str,
        detail: String,
    },

    /// The rendering engine did not finish within the configured timeout.
    #[error("Rendering with '{backend}' timed out after {}s\nIncrease --timeout or omit it.", .elapsed.as_secs())]
    RenderTimeout {
        backend: &'static str,
        elapsed: Duration,
    },

    /// The engine exited successfully but its output is not a PDF.
    #[error("Rendering with '{backend}' produced no PDF (first bytes: {magic:?})")]
    InvalidPdf {
        backend: &'static str,
        magic: Vec<u8>,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Md2PdfError {
    pub(crate) fn render(backend: &'static str, detail: impl std::fmt::Display) -> Self {
        Md2PdfError::RenderFailed {
            backend,
            detail: detail.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_names_the_path() {
        let e = Md2PdfError::FileNotFound {
            path: PathBuf::from("/tmp/missing.md"),
        };
        assert!(e.to_string().contains("/tmp/missing.md"), "got: {e}");
    }

    #[test]
    fn backend_unavailable_carries_hint() {
        let e = Md2PdfError::BackendUnavailable {
            backend: "wkhtmltopdf",
            detail: "No such file or directory".into(),
            hint: "Install wkhtmltopdf or pass --wkhtmltopdf <PATH>.",
        };
        let msg = e.to_string();
        assert!(msg.contains("wkhtmltopdf"));
        assert!(msg.contains("--wkhtmltopdf"));
    }

    #[test]
    fn render_timeout_display() {
        let e = Md2PdfError::RenderTimeout {
            backend: "chromium",
            elapsed: Duration::from_secs(30),
        };
        assert!(e.to_string().contains("30s"), "got: {e}");
    }

    #[test]
    fn render_helper_builds_render_failed() {
        let e = Md2PdfError::render("chromium", "page crashed");
        assert!(matches!(e, Md2PdfError::RenderFailed { backend: "chromium", .. }));
        assert!(e.to_string().contains("page crashed"));
    }
}
