//! Pipeline stages for PDF text extraction.
//!
//! Each submodule implements one transformation step and is tested on its
//! own. [`page::assemble_page`] chains the per-page stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ pdfium ──▶ chars ──▶ dedup ──▶ spans ──▶ lines ──▶ scripts ──▶ blocks
//! (URL/path) (source)                                                        │
//!                      regions ◀── drawing objects        reading_order ◀────┤
//!                      encode  ◀── page raster            postprocess   ◀────┤
//!                                                         tables        ◀────┘
//! ```
//!
//! 1. [`input`] : canonicalise the user-supplied path or URL to a local file
//! 2. [`pdfium`]: read glyphs, objects and rasters through pdfium; a
//!    [`source::DocumentSource`] implementation
//! 3. [`chars`] … [`blocks`]: cluster glyphs into spans, lines and blocks
//! 4. [`scripts`]: flag superscript and subscript spans
//! 5. [`regions`]: non-text drawing regions, clipped to the page
//! 6. [`reading_order`], [`postprocess`], [`tables`]: applied when output
//!    is produced

pub mod blocks;
pub mod chars;
pub mod dedup;
pub mod encode;
pub mod input;
pub mod lines;
pub mod page;
pub mod pdfium;
pub mod postprocess;
pub mod reading_order;
pub mod regions;
pub mod scripts;
pub mod source;
pub mod spans;
pub mod tables;
