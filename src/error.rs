//! Error type for the edgequake-pdftext library.
//!
//! Every failure that stops an extraction is a [`PdfTextError`]. Conditions
//! that only degrade one page (a raster that would not render, a rotation
//! pdfium would not report) are logged with `tracing::warn!` and the page
//! carries on with a fallback value instead.
//!
//! Text normalisation never fails, so there is no variant for it.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdftext library.
#[derive(Debug, Error)]
pub enum PdfTextError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// A page-range expression such as `1,2-4,10` could not be parsed.
    #[error("Invalid page range '{input}': {reason}")]
    InvalidPageRange { input: String, reason: String },

    /// Selected page numbers exceed the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// Table extraction needs exactly one table input per extracted page.
    #[error("Got {tables} table inputs for {pages} pages; counts must match")]
    TableCountMismatch { pages: usize, tables: usize },

    /// Table extraction produced a different number of cells than requested.
    #[error("Page {page}: produced {produced} cell texts for {expected} cell rectangles")]
    CellCountMismatch {
        page: usize,
        expected: usize,
        produced: usize,
    },

    /// Table input image has a zero dimension, so cells cannot be rescaled.
    #[error("Page {page}: table image size {width}x{height} has a zero dimension")]
    InvalidTableImage { page: usize, width: u32, height: u32 },

    // ── Geometry errors ───────────────────────────────────────────────────
    /// Rotation outside {0, 90, 180, 270}.
    #[error("Unsupported rotation {degrees}°; expected one of 0, 90, 180, 270")]
    InvalidRotation { degrees: i32 },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium could not bake form fields and annotations into the page.
    #[error("Failed to flatten form fields on page {page}: {detail}")]
    FlattenFailed { page: usize, detail: String },

    /// pdfium returned an error while reading a page's text or objects.
    #[error("Failed to read page {page}: {detail}")]
    PageReadFailed { page: usize, detail: String },

    // ── Worker errors ─────────────────────────────────────────────────────
    /// A page worker died before returning its chunk.
    #[error("Page worker {worker} failed: {detail}")]
    WorkerFailed { worker: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structured output could not be serialised.
    #[error("Failed to serialise output: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n\
  • Set PDFIUM_LIB_PATH=/path/to/dir-containing-libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_out_of_range_display() {
        let e = PdfTextError::PageOutOfRange { page: 12, total: 10 };
        let msg = e.to_string();
        assert!(msg.contains("Page 12"), "got: {msg}");
        assert!(msg.contains("10 pages"), "got: {msg}");
    }

    #[test]
    fn invalid_rotation_display() {
        let e = PdfTextError::InvalidRotation { degrees: 45 };
        assert!(e.to_string().contains("45"));
    }

    #[test]
    fn cell_count_mismatch_display() {
        let e = PdfTextError::CellCountMismatch {
            page: 2,
            expected: 4,
            produced: 3,
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 2"));
        assert!(msg.contains("3 cell texts"));
        assert!(msg.contains("4 cell rectangles"));
    }

    #[test]
    fn worker_failed_display() {
        let e = PdfTextError::WorkerFailed {
            worker: 3,
            detail: "panicked".into(),
        };
        assert!(e.to_string().contains("worker 3"));
        assert!(e.to_string().contains("panicked"));
    }

    #[test]
    fn invalid_page_range_display() {
        let e = PdfTextError::InvalidPageRange {
            input: "3-a".into(),
            reason: "not a number".into(),
        };
        assert!(e.to_string().contains("'3-a'"));
    }
}
