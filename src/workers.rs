//! Page workers: fan a page list out over blocking tasks and gather it back.
//!
//! Each worker is one `spawn_blocking` task that calls
//! [`DocumentSource::visit_pages`] on a contiguous chunk, so it opens and
//! closes its own document handle. Chunks are gathered in submission order,
//! never completion order, which keeps the output identical for any worker
//! count. The first failure aborts the whole extraction.

use crate::error::PdfTextError;
use crate::model::Page;
use crate::pipeline::page::{assemble_page, LayoutParams};
use crate::pipeline::source::{DocumentSource, SourceOptions};
use crate::progress::ProgressCallback;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info};

/// How many workers to actually run.
///
/// A request is capped so every worker gets at least `min_pages_per_worker`
/// pages. No request, or a cap of one or less, means a single worker.
pub fn effective_workers(
    requested: Option<usize>,
    pages: usize,
    min_pages_per_worker: usize,
) -> usize {
    match requested {
        Some(n) => n.min(pages / min_pages_per_worker.max(1)).max(1),
        None => 1,
    }
}

/// Split `indices` into at most `workers` contiguous chunks of
/// `ceil(len / workers)` pages.
pub fn chunk_pages(indices: &[usize], workers: usize) -> Vec<Vec<usize>> {
    if indices.is_empty() {
        return Vec::new();
    }
    let per_worker = indices.len().div_ceil(workers.max(1));
    indices.chunks(per_worker).map(<[usize]>::to_vec).collect()
}

/// Everything a worker needs besides its chunk.
#[derive(Clone)]
pub struct WorkerContext {
    pub source: Arc<dyn DocumentSource>,
    pub options: SourceOptions,
    pub params: LayoutParams,
    pub progress: Option<ProgressCallback>,
}

/// Run the per-page pipeline over `indices` on `workers` blocking tasks.
///
/// Pages come back in the order of `indices`.
pub async fn run_workers(
    ctx: WorkerContext,
    indices: Vec<usize>,
    workers: usize,
) -> Result<Vec<Page>, PdfTextError> {
    let total = indices.len();
    let chunks = chunk_pages(&indices, workers);
    info!("Extracting {} page(s) on {} worker(s)", total, chunks.len());

    let handles: Vec<_> = chunks
        .into_iter()
        .enumerate()
        .map(|(worker, chunk)| {
            let ctx = ctx.clone();
            let handle = tokio::task::spawn_blocking(move || run_chunk(&ctx, &chunk, total));
            (worker, handle)
        })
        .collect();

    let per_chunk = try_join_all(handles.into_iter().map(|(worker, handle)| async move {
        match handle.await {
            Ok(result) => result,
            Err(e) => Err(PdfTextError::WorkerFailed {
                worker,
                detail: e.to_string(),
            }),
        }
    }))
    .await?;

    Ok(per_chunk.into_iter().flatten().collect())
}

/// One worker's body: read the chunk and assemble each page in turn.
fn run_chunk(
    ctx: &WorkerContext,
    chunk: &[usize],
    total: usize,
) -> Result<Vec<Page>, PdfTextError> {
    let mut pages = Vec::with_capacity(chunk.len());
    ctx.source.visit_pages(chunk, &ctx.options, &mut |raw| {
        let page = assemble_page(raw, &ctx.params);
        if let Some(ref cb) = ctx.progress {
            cb.on_page_complete(page.page + 1, total, page.lines().count());
        }
        pages.push(page);
        Ok(())
    })?;
    debug!("Worker finished {} page(s)", pages.len());
    Ok(pages)
}
