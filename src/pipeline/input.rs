//! Input resolution: turn the user-supplied path into an absolute, existing
//! Markdown file and derive where the PDF goes.
//!
//! The output path is a pure function of the input path: a trailing `.md` or
//! `.markdown` (any case) becomes `.pdf`. Inputs without a Markdown extension
//! get `.pdf` appended so the output can never overwrite the source.

use crate::error::Md2PdfError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

static MARKDOWN_EXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(md|markdown)$").expect("valid regex"));

/// An input file that exists, plus the output path derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInput {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Resolve `input` to an absolute path and check it exists.
///
/// `output` overrides the derived output path when given; relative overrides
/// are resolved against the current directory like the input.
pub fn resolve_input(input: &Path, output: Option<&Path>) -> Result<ResolvedInput, Md2PdfError> {
    let absolute = absolutize(input)?;

    if !absolute.exists() {
        return Err(Md2PdfError::FileNotFound {
            path: input.to_path_buf(),
        });
    }
    if absolute.is_dir() {
        return Err(Md2PdfError::ReadFailed {
            path: input.to_path_buf(),
            source: std::io::Error::other("is a directory"),
        });
    }

    let output = match output {
        Some(p) => absolutize(p)?,
        None => derive_output_path(&absolute),
    };

    debug!(
        "Resolved input {} → {}",
        absolute.display(),
        output.display()
    );
    Ok(ResolvedInput {
        input: absolute,
        output,
    })
}

/// Replace a trailing Markdown extension with `.pdf`.
///
/// Everything before the extension is kept byte-for-byte. Non-UTF-8 paths
/// fall back to [`Path::with_extension`] semantics.
pub fn derive_output_path(input: &Path) -> PathBuf {
    match input.to_str() {
        Some(s) if MARKDOWN_EXT.is_match(s) => PathBuf::from(MARKDOWN_EXT.replace(s, ".pdf").as_ref()),
        Some(s) => PathBuf::from(format!("{s}.pdf")),
        None => {
            let mut os = input.as_os_str().to_owned();
            os.push(".pdf");
            PathBuf::from(os)
        }
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, Md2PdfError> {
    std::path::absolute(path).map_err(|e| Md2PdfError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read the whole input as UTF-8.
pub async fn read_markdown(path: &Path) -> Result<String, Md2PdfError> {
    tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Md2PdfError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => Md2PdfError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Md2PdfError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })
}
