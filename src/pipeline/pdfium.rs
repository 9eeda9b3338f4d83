//! pdfium-backed [`DocumentSource`].
//!
//! Every [`visit_pages`](DocumentSource::visit_pages) call binds pdfium and
//! opens its own `PdfDocument` inside a blocking worker; both are dropped on
//! return, so each page worker owns an independent pdfium context.
//!
//! Failures that only affect one page (a rotation pdfium will not report,
//! a raster that will not render) are logged and replaced with a fallback.
//! Failures to open the document or read a page's text abort the call.

use crate::error::PdfTextError;
use crate::geometry::{Bbox, PageRotation};
use crate::model::FontInfo;
use crate::output::DocumentMetadata;
use crate::pipeline::source::{
    DocumentSource, ObjectKind, RawGlyph, RawObject, RawPage, SourceOptions,
};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Bind the pdfium library for the calling worker.
///
/// `PDFIUM_LIB_PATH` names a directory holding the platform library; without
/// it the system loader search path is used.
pub fn bind_pdfium() -> Result<Pdfium, PdfTextError> {
    let dir = std::env::var("PDFIUM_LIB_PATH").ok();
    bind_pdfium_from(dir.as_deref().filter(|d| !d.is_empty()))
}

fn bind_pdfium_from(dir: Option<&str>) -> Result<Pdfium, PdfTextError> {
    let bindings = match dir {
        Some(dir) => {
            debug!("Binding pdfium from {}", dir);
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| PdfTextError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

/// A PDF file on disk, read through pdfium.
#[derive(Debug, Clone)]
pub struct PdfiumSource {
    path: PathBuf,
    password: Option<String>,
}

impl PdfiumSource {
    pub fn new(path: impl Into<PathBuf>, password: Option<String>) -> Self {
        Self {
            path: path.into(),
            password,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Document-level metadata, without reading any page content.
    pub fn metadata(&self) -> Result<DocumentMetadata, PdfTextError> {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, &self.path, self.password.as_deref())?;
        let metadata = document.metadata();

        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata
                .get(tag)
                .map(|t| t.value().trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
            modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
            page_count: document.pages().len() as usize,
            pdf_version: format!("{:?}", document.version()),
        })
    }
}

impl DocumentSource for PdfiumSource {
    fn page_count(&self) -> Result<usize, PdfTextError> {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, &self.path, self.password.as_deref())?;
        Ok(document.pages().len() as usize)
    }

    fn visit_pages(
        &self,
        indices: &[usize],
        options: &SourceOptions,
        visit: &mut dyn FnMut(RawPage) -> Result<(), PdfTextError>,
    ) -> Result<(), PdfTextError> {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, &self.path, self.password.as_deref())?;
        let pages = document.pages();
        let total = pages.len() as usize;
        debug!(
            "Opened {} ({} pages) for {} page(s)",
            self.path.display(),
            total,
            indices.len()
        );

        for &idx in indices {
            if idx >= total {
                return Err(PdfTextError::PageOutOfRange {
                    page: idx + 1,
                    total,
                });
            }
            let raw = read_page(&pages, idx, options)?;
            visit(raw)?;
        }
        Ok(())
    }
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, PdfTextError> {
    let document = pdfium.load_pdf_from_file(path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                PdfTextError::WrongPassword {
                    path: path.to_path_buf(),
                }
            } else {
                PdfTextError::PasswordRequired {
                    path: path.to_path_buf(),
                }
            }
        } else {
            PdfTextError::CorruptPdf {
                path: path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;
    info!("PDF loaded: {}", path.display());
    Ok(document)
}

fn read_page(
    pages: &PdfPages<'_>,
    idx: usize,
    options: &SourceOptions,
) -> Result<RawPage, PdfTextError> {
    let page_num = idx + 1;
    let read_failed = |e: PdfiumError| PdfTextError::PageReadFailed {
        page: page_num,
        detail: format!("{:?}", e),
    };

    let mut page = pages.get(idx as u16).map_err(read_failed)?;
    if options.flatten {
        page.flatten().map_err(|e| PdfTextError::FlattenFailed {
            page: page_num,
            detail: format!("{:?}", e),
        })?;
        // Flattening rewrites the content stream; reload to see the result.
        drop(page);
        page = pages.get(idx as u16).map_err(read_failed)?;
    }

    let rotation = match page.rotation() {
        Ok(r) => rotation_of(r),
        Err(e) => {
            warn!("Page {}: could not read rotation ({:?}), assuming 0°", page_num, e);
            PageRotation::R0
        }
    };

    let bounds = page
        .boundaries()
        .bounding()
        .map(|b| b.bounds)
        .unwrap_or_else(|_| page.page_size());
    let bbox = Bbox::from(rect_array(&bounds));

    let text = page.text().map_err(read_failed)?;
    let glyphs: Vec<RawGlyph> = text.chars().iter().filter_map(|ch| glyph_of(&ch)).collect();

    let objects: Vec<RawObject> = page
        .objects()
        .iter()
        .filter_map(|obj| {
            let kind = match obj.object_type() {
                PdfPageObjectType::Text => ObjectKind::Text,
                PdfPageObjectType::Path => ObjectKind::Path,
                PdfPageObjectType::Image => ObjectKind::Image,
                PdfPageObjectType::Shading => ObjectKind::Shading,
                PdfPageObjectType::XObjectForm => ObjectKind::Form,
                PdfPageObjectType::Unsupported => ObjectKind::Unsupported,
            };
            let bounds = obj.bounds().ok()?.to_rect();
            Some(RawObject {
                kind,
                bounds: rect_array(&bounds),
            })
        })
        .collect();

    let image = if options.render_images {
        let config = PdfRenderConfig::new().scale_page_by_factor(options.render_scale as f32);
        match page.render_with_config(&config) {
            Ok(bitmap) => Some(bitmap.as_image()),
            Err(e) => {
                warn!("Page {}: render failed ({:?}), continuing without image", page_num, e);
                None
            }
        }
    } else {
        None
    };

    debug!(
        "Page {}: {} glyphs, {} objects, rotation {}°",
        page_num,
        glyphs.len(),
        objects.len(),
        rotation.degrees()
    );

    Ok(RawPage {
        index: idx,
        bbox,
        rotation,
        glyphs,
        objects,
        image,
    })
}

fn glyph_of(ch: &PdfPageTextChar<'_>) -> Option<RawGlyph> {
    let loose = ch.loose_bounds().ok().map(|r| rect_array(&r));
    let tight = match ch.tight_bounds() {
        Ok(r) => rect_array(&r),
        Err(_) => loose?,
    };

    Some(RawGlyph {
        index: ch.index(),
        unicode: ch.unicode_value(),
        angle: ch.angle_degrees().map(f64::from).unwrap_or(0.0),
        tight,
        loose,
        font: FontInfo {
            name: ch.font_name(),
            flags: font_flags(ch),
            size: f64::from(ch.scaled_font_size().value),
            weight: ch.font_weight().map(weight_value).unwrap_or(0),
            color: ch
                .fill_color()
                .ok()
                .map(|c| [c.red(), c.green(), c.blue(), c.alpha()]),
        },
    })
}

/// PDF font descriptor flag bits, rebuilt from pdfium's per-flag accessors.
fn font_flags(ch: &PdfPageTextChar<'_>) -> u32 {
    [
        (ch.font_is_fixed_pitch(), 1 << 0),
        (ch.font_is_serif(), 1 << 1),
        (ch.font_is_symbolic(), 1 << 2),
        (ch.font_is_cursive(), 1 << 3),
        (ch.font_is_non_symbolic(), 1 << 5),
        (ch.font_is_italic(), 1 << 6),
        (ch.font_is_all_caps(), 1 << 16),
        (ch.font_is_small_caps(), 1 << 17),
        (ch.font_is_bold_reenforced(), 1 << 18),
    ]
    .into_iter()
    .filter(|(set, _)| *set)
    .fold(0, |acc, (_, bit)| acc | bit)
}

fn weight_value(w: PdfFontWeight) -> u32 {
    match w {
        PdfFontWeight::Weight100 => 100,
        PdfFontWeight::Weight200 => 200,
        PdfFontWeight::Weight300 => 300,
        PdfFontWeight::Weight400Normal => 400,
        PdfFontWeight::Weight500 => 500,
        PdfFontWeight::Weight600 => 600,
        PdfFontWeight::Weight700Bold => 700,
        PdfFontWeight::Weight800 => 800,
        PdfFontWeight::Weight900 => 900,
        PdfFontWeight::Custom(v) => v,
    }
}

fn rotation_of(r: PdfPageRenderRotation) -> PageRotation {
    match r {
        PdfPageRenderRotation::None => PageRotation::R0,
        PdfPageRenderRotation::Degrees90 => PageRotation::R90,
        PdfPageRenderRotation::Degrees180 => PageRotation::R180,
        PdfPageRenderRotation::Degrees270 => PageRotation::R270,
    }
}

fn rect_array(r: &PdfRect) -> [f64; 4] {
    [
        f64::from(r.left().value),
        f64::from(r.bottom().value),
        f64::from(r.right().value),
        f64::from(r.top().value),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_rotation_maps_to_page_rotation() {
        assert_eq!(rotation_of(PdfPageRenderRotation::None), PageRotation::R0);
        assert_eq!(rotation_of(PdfPageRenderRotation::Degrees270), PageRotation::R270);
    }

    #[test]
    fn font_weights_map_to_numeric_values() {
        assert_eq!(weight_value(PdfFontWeight::Weight400Normal), 400);
        assert_eq!(weight_value(PdfFontWeight::Weight700Bold), 700);
        assert_eq!(weight_value(PdfFontWeight::Custom(350)), 350);
    }

    #[test]
    fn unloadable_library_is_a_binding_error() {
        let err = bind_pdfium_from(Some("/nonexistent/pdfium-dir")).unwrap_err();
        assert!(matches!(err, PdfTextError::PdfiumBindingFailed(_)));
    }

    #[test]
    fn each_call_opens_an_independent_context() {
        if bind_pdfium().is_err() {
            return;
        }
        let source = std::sync::Arc::new(PdfiumSource::new("/nonexistent/file.pdf", None));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let source = source.clone();
                std::thread::spawn(move || source.page_count())
            })
            .collect();
        for handle in handles {
            assert!(matches!(
                handle.join().unwrap(),
                Err(PdfTextError::CorruptPdf { .. })
            ));
        }
    }

    #[test]
    fn missing_file_is_reported_before_binding_matters() {
        // Only meaningful when pdfium can be bound; skip otherwise.
        if bind_pdfium().is_err() {
            return;
        }
        let source = PdfiumSource::new("/nonexistent/file.pdf", None);
        assert!(source.page_count().is_err());
    }
}
