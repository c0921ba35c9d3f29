//! # md2pdf
//!
//! Convert Markdown documents into styled, paginated PDFs.
//!
//! The crate is thin orchestration around two external capabilities: comrak
//! turns Markdown into HTML, and a print engine turns styled HTML into a PDF.
//! Everything in between is a fixed stylesheet and a fixed page layout.
//!
//! ## Pipeline Overview
//!
//! ```text
//! note.md
//!  │
//!  ├─ 1. Input     absolutise path, check it exists, derive note.pdf
//!  ├─ 2. Markdown  comrak: raw HTML on, hard breaks on, GFM tables
//!  ├─ 3. Assemble  wrap in an HTML document with the theme stylesheet
//!  ├─ 4. Render    headless Chromium print-to-PDF, or wkhtmltopdf
//!  └─ 5. Output    atomic write + size report
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md2pdf::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("resume.md", &config).await?;
//!     println!("{} ({} KB)",
//!         output.output_path.display(),
//!         output.size_kb().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature    | Default | Description |
//! |------------|---------|-------------|
//! | `cli`      | on      | Enables the `md2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `chromium` | on      | Headless Chromium backend via chromiumoxide |
//!
//! Without `chromium` only the wkhtmltopdf backend is available:
//! ```toml
//! md2pdf = { version = "0.1", default-features = false }
//! ```
//!
//! ## Choosing a Backend
//!
//! | Backend | Needs | Scale | Theme |
//! |---------|-------|-------|-------|
//! | `chromium`    | Chrome/Chromium installed | 0.7 | standard |
//! | `wkhtmltopdf` | `wkhtmltopdf` on PATH     | 0.5 | compact  |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    BackendKind, ConversionConfig, ConversionConfigBuilder, Length, LengthUnit, PageFormat,
    PageLayout, Theme,
};
pub use convert::{convert, convert_sync, render_document, render_pdf};
pub use error::Md2PdfError;
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::input::derive_output_path;
pub use pipeline::render::{PdfRenderer, Renderer};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
