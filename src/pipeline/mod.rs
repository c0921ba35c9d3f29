//! Pipeline stages for Markdown-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the rendering engine can be swapped without
//! touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ markdown ──▶ assemble ──▶ render ──▶ output
//! (path)    (comrak)     (+ CSS)      (engine)   (atomic write)
//! ```
//!
//! 1. [`input`]: absolutise the path, check it exists, derive the `.pdf` path
//! 2. [`markdown`]: Markdown → HTML fragment
//! 3. [`assemble`]: fragment → full HTML document with the theme stylesheet
//! 4. [`render`]: HTML → PDF bytes via Chromium or wkhtmltopdf
//!
//! Writing and size reporting live in [`crate::output`].

pub mod assemble;
pub mod input;
pub mod markdown;
pub mod render;
