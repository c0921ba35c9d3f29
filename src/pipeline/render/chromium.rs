//! Headless Chromium print-to-PDF backend.
//!
//! Each render launches a fresh browser, loads the document into a blank
//! page and prints it. The browser process is always closed afterwards via
//! [`super::print_then_release`]; if the whole future is dropped instead,
//! chromiumoxide kills the child process when the `Browser` is dropped.

use super::{check_pdf_magic, print_then_release, EngineSession, PdfRenderer};
use crate::config::PageLayout;
use crate::error::Md2PdfError;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{EventLifecycleEvent, PrintToPdfParams};
use futures::{Stream, StreamExt};
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const BACKEND: &str = "chromium";
/// Lifecycle event Chromium fires after 500 ms without network connections.
const NETWORK_IDLE: &str = "networkIdle";
const INSTALL_HINT: &str = "Install Chrome or Chromium, or pass --browser <PATH>. \
In containers running as root also pass --no-sandbox.";

/// Renders through a headless Chrome/Chromium instance.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    /// Browser executable. None lets chromiumoxide search the usual locations.
    pub executable: Option<PathBuf>,
    pub sandbox: bool,
    /// Bounds the print step only; the browser is closed either way.
    pub timeout: Option<Duration>,
}

impl PdfRenderer for ChromiumRenderer {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn render(&self, html: &str, layout: &PageLayout) -> Result<Vec<u8>, Md2PdfError> {
        let session = ChromiumSession::launch(self).await?;
        print_then_release(session, BACKEND, html, layout, self.timeout).await
    }
}

/// A running browser plus the task pumping its DevTools event stream.
struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumSession {
    async fn launch(opts: &ChromiumRenderer) -> Result<Self, Md2PdfError> {
        let mut builder = BrowserConfig::builder();
        if let Some(ref exe) = opts.executable {
            builder = builder.chrome_executable(exe);
        }
        if !opts.sandbox {
            builder = builder.no_sandbox();
        }
        let config = builder
            .build()
            .map_err(|detail| Md2PdfError::BackendUnavailable {
                backend: BACKEND,
                detail,
                hint: INSTALL_HINT,
            })?;

        let (browser, handler) =
            Browser::launch(config)
                .await
                .map_err(|e| Md2PdfError::BackendUnavailable {
                    backend: BACKEND,
                    detail: e.to_string(),
                    hint: INSTALL_HINT,
                })?;

        // The connection only makes progress while its handler is polled.
        let handler = tokio::spawn(async move {
            let errors = pump_events(handler).await;
            debug!("Browser connection closed ({} handler errors)", errors);
        });

        info!("Launched headless browser");
        Ok(Self { browser, handler })
    }
}

impl EngineSession for ChromiumSession {
    async fn print(&mut self, html: &str, layout: &PageLayout) -> Result<Vec<u8>, Md2PdfError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| Md2PdfError::render(BACKEND, format!("opening page: {e}")))?;

        // Subscribe first so the idle event cannot slip past.
        let lifecycle = page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| Md2PdfError::render(BACKEND, format!("watching page lifecycle: {e}")))?;

        // set_content only waits for `load`; images and fonts may still be in flight.
        page.set_content(html)
            .await
            .map_err(|e| Md2PdfError::render(BACKEND, format!("loading document: {e}")))?;
        wait_for_network_idle(lifecycle.map(|event| event.name.clone())).await?;
        debug!("Document loaded and network idle ({} bytes)", html.len());

        let pdf = page
            .pdf(print_params(layout))
            .await
            .map_err(|e| Md2PdfError::render(BACKEND, format!("printing: {e}")))?;

        if let Err(e) = page.close().await {
            debug!("Closing page failed: {}", e);
        }

        check_pdf_magic(BACKEND, &pdf)?;
        Ok(pdf)
    }

    async fn release(mut self) -> Result<(), Md2PdfError> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            debug!("Waiting for browser exit failed: {}", e);
        }
        self.handler.abort();
        debug!("Browser closed");
        closed
            .map(|_| ())
            .map_err(|e| Md2PdfError::render(BACKEND, format!("closing browser: {e}")))
    }
}

/// Drive the DevTools connection until it closes.
///
/// Errors are usually CDP messages this chromiumoxide version cannot decode;
/// stopping on them would stall every later command, including close.
async fn pump_events<S, E>(events: S) -> usize
where
    S: Stream<Item = Result<(), E>>,
    E: std::fmt::Display,
{
    let mut events = std::pin::pin!(events);
    let mut errors = 0;
    while let Some(event) = events.next().await {
        if let Err(e) = event {
            errors += 1;
            debug!("Browser handler error: {}", e);
        }
    }
    errors
}

/// Resolve once the page reports no network activity for 500 ms.
async fn wait_for_network_idle<S>(lifecycle: S) -> Result<(), Md2PdfError>
where
    S: Stream<Item = String>,
{
    let mut lifecycle = std::pin::pin!(lifecycle);
    while let Some(name) = lifecycle.next().await {
        if name == NETWORK_IDLE {
            return Ok(());
        }
    }
    Err(Md2PdfError::render(
        BACKEND,
        "page went away before the network became idle",
    ))
}

/// DevTools print parameters; Chromium takes all lengths in inches.
fn print_params(layout: &PageLayout) -> PrintToPdfParams {
    let (width, height) = layout.format.size_inches();
    let margin = layout.margin.to_inches();
    PrintToPdfParams {
        print_background: Some(true),
        scale: Some(layout.scale),
        paper_width: Some(width),
        paper_height: Some(height),
        margin_top: Some(margin),
        margin_bottom: Some(margin),
        margin_left: Some(margin),
        margin_right: Some(margin),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Length, LengthUnit, PageFormat};

    #[test]
    fn print_params_from_layout() {
        let layout = PageLayout {
            format: PageFormat::A4,
            margin: Length::new(2.54, LengthUnit::Cm),
            scale: 0.7,
        };
        let p = print_params(&layout);
        assert_eq!(p.print_background, Some(true));
        assert_eq!(p.scale, Some(0.7));
        assert_eq!(p.paper_width, Some(8.27));
        assert_eq!(p.paper_height, Some(11.7));
        for m in [p.margin_top, p.margin_bottom, p.margin_left, p.margin_right] {
            assert!((m.unwrap() - 1.0).abs() < 1e-9);
        }
        assert_eq!(p.landscape, None);
    }

    #[tokio::test]
    async fn handler_keeps_pumping_after_errors() {
        let events = futures::stream::iter(vec![
            Ok(()),
            Err("unknown CDP event"),
            Ok(()),
            Err("unknown CDP event"),
            Ok(()),
        ]);
        assert_eq!(pump_events(events).await, 2);
    }

    #[tokio::test]
    async fn network_idle_waits_past_load() {
        let events = futures::stream::iter(
            ["init", "DOMContentLoaded", "load", "networkAlmostIdle", "networkIdle"]
                .map(String::from),
        );
        wait_for_network_idle(events).await.unwrap();
    }

    #[tokio::test]
    async fn network_idle_is_required() {
        let events = futures::stream::iter(
            ["init", "DOMContentLoaded", "load", "networkAlmostIdle"].map(String::from),
        );
        let err = wait_for_network_idle(events).await.unwrap_err();
        assert!(matches!(err, Md2PdfError::RenderFailed { backend: "chromium", .. }));
    }

    #[tokio::test]
    async fn network_idle_does_not_resolve_on_load_alone() {
        let events = futures::stream::iter(["load".to_string()]).chain(futures::stream::pending());
        let waited = tokio::time::timeout(
            Duration::from_millis(50),
            wait_for_network_idle(events),
        )
        .await;
        assert!(waited.is_err(), "resolved without networkIdle");
    }

    #[tokio::test]
    async fn renders_pdf_with_local_browser() {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run browser tests");
            return;
        }
        let renderer = ChromiumRenderer {
            executable: None,
            sandbox: false,
            timeout: Some(Duration::from_secs(60)),
        };
        let layout = PageLayout {
            format: PageFormat::A4,
            margin: crate::config::DEFAULT_MARGIN,
            scale: 0.7,
        };
        let pdf = renderer
            .render("<html><body><h1>Hello</h1></body></html>", &layout)
            .await
            .expect("render should succeed");
        assert!(pdf.starts_with(b"%PDF"));
    }
}
