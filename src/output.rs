//! Conversion results and the on-disk write of the finished PDF.

use crate::config::{BackendKind, PageLayout};
use crate::error::Md2PdfError;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What a successful conversion produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub backend: BackendKind,
    pub layout: PageLayout,
    /// Size of the file on disk; None if it could not be read back.
    pub size_bytes: Option<u64>,
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// On-disk size in kilobytes with two decimals, e.g. `"12.34"`.
    pub fn size_kb(&self) -> Option<String> {
        self.size_bytes.map(format_kb)
    }
}

/// Byte counts and timings for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionStats {
    pub markdown_bytes: usize,
    pub html_bytes: usize,
    pub pdf_bytes: usize,
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Format a byte count as kilobytes (1024) with two decimals.
pub fn format_kb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0)
}

/// Write `bytes` to `path` atomically: temp file in the same directory, then
/// rename. On failure the temp file is removed and `path` is untouched.
pub async fn write_atomic(path: &Path, bytes: Vec<u8>) -> Result<(), Md2PdfError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&path, &bytes))
        .await
        .map_err(|e| Md2PdfError::Internal(format!("Write task panicked: {}", e)))?
}

fn write_atomic_blocking(path: &Path, bytes: &[u8]) -> Result<(), Md2PdfError> {
    let write_err = |source| Md2PdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".md2pdf-")
        .suffix(".pdf.tmp")
        .tempfile_in(&dir)
        .map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Best-effort size of the written file. Failures are logged, never fatal.
pub async fn file_size(path: &Path) -> Option<u64> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Some(meta.len()),
        Err(e) => {
            debug!("Could not stat {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kb_formatting() {
        assert_eq!(format_kb(0), "0.00");
        assert_eq!(format_kb(1024), "1.00");
        assert_eq!(format_kb(1536), "1.50");
        assert_eq!(format_kb(12_637), "12.34");
    }

    #[tokio::test]
    async fn atomic_write_creates_parent_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out.pdf");

        write_atomic(&out, b"%PDF-1.4 test".to_vec()).await.unwrap();

        assert_eq!(std::fs::read(&out).unwrap(), b"%PDF-1.4 test");
        let leftovers: Vec<_> = std::fs::read_dir(out.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.pdf");
        std::fs::write(&out, b"old").unwrap();

        write_atomic(&out, b"%PDF new".to_vec()).await.unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"%PDF new");
    }

    #[tokio::test]
    async fn file_size_of_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(file_size(&dir.path().join("gone.pdf")).await, None);
    }

    #[test]
    fn size_kb_reads_size_bytes() {
        let out = ConversionOutput {
            input_path: PathBuf::from("/a/note.md"),
            output_path: PathBuf::from("/a/note.pdf"),
            backend: BackendKind::Wkhtmltopdf,
            layout: crate::ConversionConfig::for_backend(BackendKind::Wkhtmltopdf).layout,
            size_bytes: Some(2048),
            stats: ConversionStats::default(),
        };
        assert_eq!(out.size_kb().as_deref(), Some("2.00"));
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["backend"], "wkhtmltopdf");
        assert_eq!(json["size_bytes"], 2048);
    }
}
