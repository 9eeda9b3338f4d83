//! # edgequake-pdftext
//!
//! Extract text and layout from PDF documents by clustering pdfium's glyph
//! stream into spans, lines and blocks.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL
//!  ├─ 2. Source   glyphs, drawing objects and raster via pdfium (spawn_blocking workers)
//!  ├─ 3. Cluster  dedup → spans → lines → super/subscripts → blocks
//!  ├─ 4. Regions  non-text drawing regions clipped to the page
//!  └─ 5. Output   plain text, structured pages, or table cell text
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdftext::{plain_text, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder().sort(true).build()?;
//!     let text = plain_text("document.pdf", &config).await?;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdftext` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdftext = { version = "0.1", default-features = false }
//! ```
//!
//! ## Finding pdfium
//!
//! The pdfium shared library is loaded at runtime. Set `PDFIUM_LIB_PATH` to
//! the directory that contains it, or install it where the system loader
//! looks.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod workers;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, HyphenMode, PageSelection};
pub use error::PdfTextError;
pub use extract::{
    dictionary_output, extract_from_bytes, extract_pages, extract_pages_from_source,
    extract_pages_sync, extract_to_file, inspect, paginated_plain_text, plain_text,
    plain_text_sync, render_dictionary, render_paginated_text, table_output, OutputFormat,
};
pub use geometry::{Bbox, PageRotation};
pub use model::{Block, Char, FontInfo, Line, Page, Reference, ReferenceRegistry, Span, TableCell, TableInput};
pub use output::{DocumentMetadata, PageOutput};
pub use pipeline::source::{DocumentSource, RawGlyph, RawObject, RawPage, SourceOptions};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
