//! The contract between the layout pipeline and whatever decodes the PDF.
//!
//! A [`DocumentSource`] hands out one [`RawPage`] per requested page: the
//! glyph stream in engine coordinates, the page box and rotation, the page's
//! drawing objects, and optionally a raster. Nothing in here knows about
//! spans, lines or blocks.
//!
//! [`crate::pipeline::pdfium::PdfiumSource`] is the production
//! implementation. Tests implement the trait directly with synthetic pages.

use crate::error::PdfTextError;
use crate::geometry::{Bbox, PageRotation};
use crate::model::FontInfo;
use image::DynamicImage;

/// One entry of the engine's text stream, in PDF user space.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGlyph {
    /// Position in the page's text stream.
    pub index: usize,
    /// Code value as reported by the engine. May be half of a UTF-16
    /// surrogate pair.
    pub unicode: u32,
    /// Rotation of the glyph in degrees.
    pub angle: f64,
    /// Tight box `[left, bottom, right, top]`.
    pub tight: [f64; 4],
    /// Loose box (full line height), when the engine provides one.
    pub loose: Option<[f64; 4]>,
    pub font: FontInfo,
}

/// Drawing-object type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Text,
    Path,
    Image,
    Shading,
    Form,
    Unsupported,
}

/// A page-level drawing object and its raw bounds `[left, bottom, right, top]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObject {
    pub kind: ObjectKind,
    pub bounds: [f64; 4],
}

/// Everything the pipeline needs from one page.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// 0-based page index.
    pub index: usize,
    /// Page box in PDF user space.
    pub bbox: Bbox,
    pub rotation: PageRotation,
    pub glyphs: Vec<RawGlyph>,
    pub objects: Vec<RawObject>,
    /// Page raster at the requested scale. `None` when rendering was not
    /// requested or failed.
    pub image: Option<DynamicImage>,
}

/// Per-extraction options passed to the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceOptions {
    /// Bake form fields and annotations into page content before reading.
    pub flatten: bool,
    /// Produce [`RawPage::image`].
    pub render_images: bool,
    pub render_scale: f64,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            flatten: false,
            render_images: true,
            render_scale: 2.0,
        }
    }
}

/// A PDF engine the extraction pipeline can read pages from.
///
/// Each call to [`visit_pages`](Self::visit_pages) must acquire its own
/// document handle and release it before returning, whether the call
/// succeeds or fails. Page workers call it concurrently from separate
/// threads, one call per worker.
pub trait DocumentSource: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> Result<usize, PdfTextError>;

    /// Read `indices` in order and pass each page to `visit`.
    ///
    /// The first error from either the engine or `visit` stops the walk and
    /// is returned.
    fn visit_pages(
        &self,
        indices: &[usize],
        options: &SourceOptions,
        visit: &mut dyn FnMut(RawPage) -> Result<(), PdfTextError>,
    ) -> Result<(), PdfTextError>;
}
