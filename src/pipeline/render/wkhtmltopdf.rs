//! Standalone `wkhtmltopdf` backend.
//!
//! The document goes in on stdin and the PDF comes back on stdout, so no
//! scratch files are involved. The child is spawned with `kill_on_drop`:
//! dropping the render future (timeout, Ctrl-C) takes the process with it.

use super::{check_pdf_magic, with_timeout, PdfRenderer};
use crate::config::PageLayout;
use crate::error::Md2PdfError;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

const BACKEND: &str = "wkhtmltopdf";
const INSTALL_HINT: &str = "Install wkhtmltopdf (https://wkhtmltopdf.org) or pass --wkhtmltopdf <PATH>.";

/// Renders by piping the document through the wkhtmltopdf executable.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfRenderer {
    pub executable: PathBuf,
    pub timeout: Option<Duration>,
}

impl PdfRenderer for WkhtmltopdfRenderer {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn render(&self, html: &str, layout: &PageLayout) -> Result<Vec<u8>, Md2PdfError> {
        with_timeout(BACKEND, self.timeout, self.run(html, layout)).await
    }
}

impl WkhtmltopdfRenderer {
    async fn run(&self, html: &str, layout: &PageLayout) -> Result<Vec<u8>, Md2PdfError> {
        let args = command_args(layout);
        debug!("{} {}", self.executable.display(), args.join(" "));

        let mut child = Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    Md2PdfError::BackendUnavailable {
                        backend: BACKEND,
                        detail: format!("{}: {e}", self.executable.display()),
                        hint: INSTALL_HINT,
                    }
                }
                _ => Md2PdfError::render(BACKEND, format!("spawning: {e}")),
            })?;
        info!("Started wkhtmltopdf (pid {:?})", child.id());

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Md2PdfError::Internal("wkhtmltopdf stdin not captured".into()))?;

        // Feed stdin while draining stdout, or a large document deadlocks on
        // full pipe buffers.
        let feed = async move {
            stdin.write_all(html.as_bytes()).await?;
            stdin.shutdown().await
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|e| Md2PdfError::render(BACKEND, format!("waiting: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Md2PdfError::render(
                BACKEND,
                format!("{}: {}", output.status, last_line(&stderr)),
            ));
        }
        // A write error with a zero exit status means the engine stopped
        // reading early; its output is still what it printed.
        if let Err(e) = fed {
            debug!("Writing document to wkhtmltopdf stdin failed: {}", e);
        }

        check_pdf_magic(BACKEND, &output.stdout)?;
        Ok(output.stdout)
    }
}

/// Command-line for a stdin → stdout conversion with `layout`.
fn command_args(layout: &PageLayout) -> Vec<String> {
    let margin = format!("{:.2}mm", layout.margin.to_mm());
    let mut args: Vec<String> = vec![
        "--quiet".into(),
        "--encoding".into(),
        "utf-8".into(),
        "--page-size".into(),
        layout.format.name().into(),
        "--zoom".into(),
        layout.scale.to_string(),
    ];
    for side in ["--margin-top", "--margin-right", "--margin-bottom", "--margin-left"] {
        args.push(side.into());
        args.push(margin.clone());
    }
    args.push("-".into());
    args.push("-".into());
    args
}

fn last_line(stderr: &str) -> &str {
    stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .map(str::trim)
        .unwrap_or("no diagnostic output")
}
