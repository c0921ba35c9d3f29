//! HTML document → PDF bytes.
//!
//! Two engines sit behind one awaitable interface, [`PdfRenderer`]:
//!
//! * [`chromium`] drives headless Chromium over the DevTools protocol and
//!   uses its print-to-PDF path (feature `chromium`).
//! * [`wkhtmltopdf`] pipes the document through the standalone
//!   `wkhtmltopdf` executable.
//!
//! Callers pick one at runtime through [`Renderer`]. Dropping the returned
//! future cancels the render; neither engine outlives it.

#[cfg(feature = "chromium")]
pub mod chromium;
pub mod wkhtmltopdf;

use crate::config::{BackendKind, ConversionConfig, PageLayout};
use crate::error::Md2PdfError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Something that can turn a full HTML document into PDF bytes.
pub trait PdfRenderer {
    /// Short engine name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Render `html` with the given page geometry.
    fn render(
        &self,
        html: &str,
        layout: &PageLayout,
    ) -> impl Future<Output = Result<Vec<u8>, Md2PdfError>>;
}

/// The renderer selected by [`ConversionConfig::backend`].
#[derive(Debug)]
pub enum Renderer {
    #[cfg(feature = "chromium")]
    Chromium(chromium::ChromiumRenderer),
    Wkhtmltopdf(wkhtmltopdf::WkhtmltopdfRenderer),
}

impl Renderer {
    pub fn from_config(config: &ConversionConfig) -> Result<Self, Md2PdfError> {
        let timeout = config.render_timeout_secs.map(Duration::from_secs);
        match config.backend {
            #[cfg(feature = "chromium")]
            BackendKind::Chromium => Ok(Renderer::Chromium(chromium::ChromiumRenderer {
                executable: config.browser_executable.clone(),
                sandbox: config.sandbox,
                timeout,
            })),
            #[cfg(not(feature = "chromium"))]
            BackendKind::Chromium => Err(Md2PdfError::BackendUnavailable {
                backend: "chromium",
                detail: "not compiled in".into(),
                hint: "Rebuild with `--features chromium` or use --backend wkhtmltopdf.",
            }),
            BackendKind::Wkhtmltopdf => Ok(Renderer::Wkhtmltopdf(
                wkhtmltopdf::WkhtmltopdfRenderer {
                    executable: config.wkhtmltopdf_path.clone(),
                    timeout,
                },
            )),
        }
    }
}

impl PdfRenderer for Renderer {
    fn name(&self) -> &'static str {
        match self {
            #[cfg(feature = "chromium")]
            Renderer::Chromium(r) => r.name(),
            Renderer::Wkhtmltopdf(r) => r.name(),
        }
    }

    async fn render(&self, html: &str, layout: &PageLayout) -> Result<Vec<u8>, Md2PdfError> {
        match self {
            #[cfg(feature = "chromium")]
            Renderer::Chromium(r) => r.render(html, layout).await,
            Renderer::Wkhtmltopdf(r) => r.render(html, layout).await,
        }
    }
}

// ── Engine lifecycle ─────────────────────────────────────────────────────

/// A launched engine instance that must be released after use.
#[cfg_attr(not(feature = "chromium"), allow(dead_code))]
pub(crate) trait EngineSession {
    fn print(
        &mut self,
        html: &str,
        layout: &PageLayout,
    ) -> impl Future<Output = Result<Vec<u8>, Md2PdfError>>;

    fn release(self) -> impl Future<Output = Result<(), Md2PdfError>>;
}

/// Print once, then release the session whatever the print outcome.
///
/// A timeout only bounds the print step, so the release still runs when it
/// fires. Release failures are logged; the print result wins.
#[cfg_attr(not(feature = "chromium"), allow(dead_code))]
pub(crate) async fn print_then_release<S: EngineSession>(
    mut session: S,
    backend: &'static str,
    html: &str,
    layout: &PageLayout,
    timeout: Option<Duration>,
) -> Result<Vec<u8>, Md2PdfError> {
    let printed = with_timeout(backend, timeout, session.print(html, layout)).await;

    if let Err(e) = session.release().await {
        warn!("Failed to release {} instance: {}", backend, e);
    }

    printed
}

pub(crate) async fn with_timeout<T>(
    backend: &'static str,
    timeout: Option<Duration>,
    fut: impl Future<Output = Result<T, Md2PdfError>>,
) -> Result<T, Md2PdfError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Md2PdfError::RenderTimeout {
                backend,
                elapsed: limit,
            })?,
        None => fut.await,
    }
}

/// Reject engine output that is obviously not a PDF.
pub(crate) fn check_pdf_magic(backend: &'static str, bytes: &[u8]) -> Result<(), Md2PdfError> {
    if bytes.starts_with(b"%PDF") {
        Ok(())
    } else {
        Err(Md2PdfError::InvalidPdf {
            backend,
            magic: bytes.iter().take(8).copied().collect(),
        })
    }
}
