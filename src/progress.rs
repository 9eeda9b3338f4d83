//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to be told
//! when each page is finished. The CLI drives an `indicatif` bar from it.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdftext::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl ExtractionProgressCallback for Counter {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, line_count: usize) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} lines)", page_num, total_pages, line_count);
//!     }
//! }
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the extraction pipeline as pages finish.
///
/// Workers run on separate threads, so `on_page_complete` may be called
/// concurrently and in any page order. All methods default to no-ops.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before any page is read.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when a page has been assembled into blocks.
    ///
    /// # Arguments
    /// * `page_num`   : 1-indexed page number
    /// * `total_pages`: number of pages in this extraction
    /// * `line_count` : lines found on the page
    fn on_page_complete(&self, page_num: usize, total_pages: usize, line_count: usize) {
        let _ = (page_num, total_pages, line_count);
    }

    /// Called once after every page has been assembled.
    fn on_extraction_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

/// Used when no callback is configured.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// The type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
