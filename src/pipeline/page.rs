//! Per-page assembly: one [`RawPage`] in, one finished [`Page`] out.
//!
//! Stages run strictly in order on the calling thread:
//!
//! ```text
//! glyphs ─▶ chars ─▶ dedup ─▶ spans ─▶ lines ─▶ scripts ─▶ blocks
//! objects ─▶ non-text regions
//! raster ─▶ base64 PNG
//! ```

use crate::geometry::page_extent;
use crate::model::Page;
use crate::pipeline::source::RawPage;
use crate::pipeline::{blocks, chars, dedup, encode, lines, regions, scripts, spans};
use tracing::{debug, warn};

/// Settings the per-page stages read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub quote_loosebox: bool,
    pub superscript_height_threshold: f64,
    pub line_distance_threshold: f64,
    pub render_scale: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            quote_loosebox: true,
            superscript_height_threshold: 0.8,
            line_distance_threshold: 0.1,
            render_scale: 2.0,
        }
    }
}

pub fn assemble_page(raw: RawPage, params: &LayoutParams) -> Page {
    let page_num = raw.index + 1;

    let chars = dedup::deduplicate_chars(chars::get_chars(&raw, params.quote_loosebox));
    let spans = spans::SpanAssembler::new(
        params.superscript_height_threshold,
        params.line_distance_threshold,
    )
    .assemble(chars);
    let mut lines = lines::get_lines(spans);
    scripts::assign_scripts(
        &mut lines,
        params.superscript_height_threshold,
        params.line_distance_threshold,
    );
    let line_count = lines.len();
    let blocks = blocks::get_blocks(lines);

    let images = regions::non_text_regions(&raw.objects, &raw.bbox, raw.rotation);

    let page_image = raw.image.as_ref().and_then(|img| match encode::encode_page(img) {
        Ok(b64) => Some(b64),
        Err(e) => {
            warn!("Failed to encode image for page {}: {}", page_num, e);
            None
        }
    });

    debug!(
        "Page {}: {} lines in {} blocks, {} non-text regions",
        page_num,
        line_count,
        blocks.len(),
        images.len()
    );

    let (width, height) = page_extent(&raw.bbox);
    Page {
        page: raw.index,
        bbox: raw.bbox,
        width: width as u32,
        height: height as u32,
        rotation: raw.rotation,
        blocks,
        scale: params.render_scale,
        page_image,
        images,
        refs: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Bbox, PageRotation};
    use crate::model::FontInfo;
    use crate::pipeline::source::{ObjectKind, RawGlyph, RawObject};
    use image::{DynamicImage, RgbaImage};

    fn glyphs(text: &str, x0: f64, baseline: f64, first_idx: usize) -> Vec<RawGlyph> {
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                let x = x0 + 6.0 * i as f64;
                RawGlyph {
                    index: first_idx + i,
                    unicode: c as u32,
                    angle: 0.0,
                    tight: [x, baseline, x + 6.0, baseline + 8.0],
                    loose: Some([x, baseline - 2.0, x + 6.0, baseline + 10.0]),
                    font: FontInfo {
                        name: "Helvetica".into(),
                        size: 10.0,
                        weight: 400,
                        ..FontInfo::default()
                    },
                }
            })
            .collect()
    }

    fn raw_page(glyphs: Vec<RawGlyph>) -> RawPage {
        RawPage {
            index: 2,
            bbox: Bbox::new(0.0, 0.0, 612.5, 792.0),
            rotation: PageRotation::R0,
            glyphs,
            objects: vec![RawObject {
                kind: ObjectKind::Image,
                bounds: [100.0, 100.0, 200.0, 200.0],
            }],
            image: Some(DynamicImage::ImageRgba8(RgbaImage::new(4, 4))),
        }
    }

    #[test]
    fn assembles_two_line_paragraph() {
        let mut g = glyphs("first line\n", 72.0, 700.0, 0);
        g.extend(glyphs("second line", 72.0, 688.0, 11));
        let page = assemble_page(raw_page(g), &LayoutParams::default());

        assert_eq!(page.page, 2);
        assert_eq!(page.width, 613);
        assert_eq!(page.height, 792);
        assert_eq!(page.blocks.len(), 1);
        assert_eq!(page.blocks[0].lines.len(), 2);
        assert_eq!(page.blocks[0].lines[0].spans[0].text, "first line\n");
        assert_eq!(page.images.len(), 1);
        assert!(page.page_image.is_some());
        assert!(page.refs.is_none());
    }

    #[test]
    fn empty_page_has_no_blocks() {
        let page = assemble_page(raw_page(vec![]), &LayoutParams::default());
        assert!(page.blocks.is_empty());
        assert_eq!(page.scale, 2.0);
    }
}
