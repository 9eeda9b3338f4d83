//! Extraction entry points.
//!
//! Every public function here follows the same flow: resolve the input to a
//! local file, count pages, resolve the page selection, run the page workers,
//! then project the finished pages into the requested output. The
//! `*_from_source` variants start from any [`DocumentSource`] instead of a
//! path, which is how the integration tests drive the pipeline.

use crate::config::ExtractionConfig;
use crate::error::PdfTextError;
use crate::model::{Page, TableCell, TableInput};
use crate::output::{page_text, DocumentMetadata, PageOutput, StructuredOptions};
use crate::pipeline::pdfium::PdfiumSource;
use crate::pipeline::source::{DocumentSource, SourceOptions};
use crate::pipeline::{input, tables};
use crate::workers::{effective_workers, run_workers, WorkerContext};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Output format for [`extract_to_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pages of plain text joined by newlines.
    #[default]
    Text,
    /// Pretty-printed JSON array of [`PageOutput`].
    Json,
}

/// Extract the canonical page trees from a PDF file or URL.
///
/// # Errors
/// Fails on unreadable input, a page selection outside the document, or any
/// page worker failure. No partial result is returned.
pub async fn extract_pages(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<Vec<Page>, PdfTextError> {
    let input_str = input_str.as_ref();
    info!("Starting extraction: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let source = Arc::new(PdfiumSource::new(resolved.path(), config.password.clone()));

    // ── Step 2: Run the pipeline ─────────────────────────────────────────
    // `resolved` stays alive until the workers are done with the file.
    let pages = extract_pages_from_source(source, config).await?;
    drop(resolved);
    Ok(pages)
}

/// Extract the canonical page trees from an arbitrary document source.
pub async fn extract_pages_from_source(
    source: Arc<dyn DocumentSource>,
    config: &ExtractionConfig,
) -> Result<Vec<Page>, PdfTextError> {
    let start = Instant::now();

    // ── Step 1: Count pages ──────────────────────────────────────────────
    let counter = Arc::clone(&source);
    let total_pages = tokio::task::spawn_blocking(move || counter.page_count())
        .await
        .map_err(|e| PdfTextError::Internal(format!("Page count task panicked: {}", e)))??;
    info!("PDF has {} pages", total_pages);

    // ── Step 2: Compute page indices ─────────────────────────────────────
    let indices = config.pages.resolve(total_pages)?;
    debug!("Selected {} pages for extraction", indices.len());

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start(indices.len());
    }

    // ── Step 3: Fan out over workers ─────────────────────────────────────
    let selected = indices.len();
    let workers = effective_workers(config.workers, selected, config.min_pages_per_worker);
    let ctx = WorkerContext {
        source,
        options: SourceOptions {
            flatten: config.flatten_pdf,
            render_images: config.render_images,
            render_scale: config.render_scale,
        },
        params: config.layout_params(),
        progress: config.progress_callback.clone(),
    };
    let pages = run_workers(ctx, indices, workers).await?;

    info!(
        "Extraction complete: {} pages, {}ms",
        pages.len(),
        start.elapsed().as_millis()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(selected);
    }

    Ok(pages)
}

// ── Projections ──────────────────────────────────────────────────────────

/// Plain text per page, in page order.
pub fn render_paginated_text(pages: &[Page], config: &ExtractionConfig) -> Vec<String> {
    pages
        .iter()
        .map(|p| page_text(p, config.sort, config.hyphens, config.reading_order_tolerance))
        .collect()
}

/// Structured view of every page.
pub fn render_dictionary(pages: &[Page], config: &ExtractionConfig) -> Vec<PageOutput> {
    let opts = StructuredOptions {
        sort: config.sort,
        keep_chars: config.keep_chars,
        tolerance: config.reading_order_tolerance,
    };
    pages.iter().map(|p| PageOutput::from_page(p, opts)).collect()
}

/// Plain text of each selected page.
pub async fn paginated_plain_text(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<Vec<String>, PdfTextError> {
    let pages = extract_pages(input_str, config).await?;
    Ok(render_paginated_text(&pages, config))
}

/// Plain text of the selected pages, joined by a newline.
pub async fn plain_text(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<String, PdfTextError> {
    Ok(paginated_plain_text(input_str, config).await?.join("\n"))
}

/// Structured output of each selected page.
pub async fn dictionary_output(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<Vec<PageOutput>, PdfTextError> {
    let pages = extract_pages(input_str, config).await?;
    Ok(render_dictionary(&pages, config))
}

/// Cell text for caller-detected tables, one [`TableInput`] per selected page.
pub async fn table_output(
    input_str: impl AsRef<str>,
    table_inputs: &[TableInput],
    config: &ExtractionConfig,
) -> Result<Vec<Vec<TableCell>>, PdfTextError> {
    let pages = extract_pages(input_str, config).await?;
    tables::table_output(&pages, table_inputs, config.table_cell_threshold)
}

// ── Files, bytes and blocking wrappers ───────────────────────────────────

/// Extract a PDF and write the result directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn extract_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    format: OutputFormat,
    config: &ExtractionConfig,
) -> Result<usize, PdfTextError> {
    let pages = extract_pages(input_str, config).await?;
    let body = match format {
        OutputFormat::Text => render_paginated_text(&pages, config).join("\n"),
        OutputFormat::Json => serde_json::to_string_pretty(&render_dictionary(&pages, config))?,
    };
    write_atomic(output_path.as_ref(), body.as_bytes()).await?;
    Ok(pages.len())
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PdfTextError> {
    let write_failed = |e| PdfTextError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);
    tokio::fs::write(tmp_path, bytes).await.map_err(write_failed)?;
    tokio::fs::rename(tmp_path, path).await.map_err(write_failed)?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Extract page trees from PDF bytes held in memory.
///
/// The bytes are written to a managed [`tempfile`] that is removed on return.
pub async fn extract_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<Vec<Page>, PdfTextError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| PdfTextError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| PdfTextError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    extract_pages(&path, config).await
}

/// Synchronous wrapper around [`extract_pages`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_pages_sync(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<Vec<Page>, PdfTextError> {
    runtime()?.block_on(extract_pages(input_str, config))
}

/// Synchronous wrapper around [`plain_text`].
pub fn plain_text_sync(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<String, PdfTextError> {
    runtime()?.block_on(plain_text(input_str, config))
}

fn runtime() -> Result<tokio::runtime::Runtime, PdfTextError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PdfTextError::Internal(format!("Failed to create tokio runtime: {}", e)))
}

/// Read PDF metadata without extracting any page content.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<DocumentMetadata, PdfTextError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let source = PdfiumSource::new(resolved.path(), config.password.clone());
    let metadata = tokio::task::spawn_blocking(move || source.metadata())
        .await
        .map_err(|e| PdfTextError::Internal(format!("Metadata task panicked: {}", e)))??;
    drop(resolved);
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn atomic_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.txt");
        write_atomic(&path, b"hello").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
        assert!(!dir.path().join("nested/out.txt.tmp").exists());
    }

    #[tokio::test]
    async fn missing_input_is_reported() {
        let err = extract_pages("/nonexistent/doc.pdf", &ExtractionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PdfTextError::FileNotFound { .. }));
    }

    #[test]
    fn default_output_format_is_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }
}
