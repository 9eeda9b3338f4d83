//! Non-text region detection.
//!
//! Paths, raster images and shadings are visual content by construction
//! and are always reported. Form XObjects and objects pdfium cannot
//! classify may wrap text, so they are reported only when they do not touch
//! any text object. Every reported box is clipped to the page; a box that
//! ends up inverted or outside the page is kept as `None` so positions in
//! the list stay stable.

use crate::geometry::{transform_bbox, Bbox, PageRotation};
use crate::pipeline::source::{ObjectKind, RawObject};

pub fn non_text_regions(
    objects: &[RawObject],
    page_bbox: &Bbox,
    rotation: PageRotation,
) -> Vec<Option<Bbox>> {
    let to_device = |o: &RawObject| transform_bbox(page_bbox, rotation, o.bounds);

    let text_boxes: Vec<Bbox> = objects
        .iter()
        .filter(|o| o.kind == ObjectKind::Text)
        .map(to_device)
        .collect();

    let always = objects
        .iter()
        .filter(|o| matches!(o.kind, ObjectKind::Path | ObjectKind::Image | ObjectKind::Shading));

    let isolated = objects
        .iter()
        .filter(|o| matches!(o.kind, ObjectKind::Form | ObjectKind::Unsupported))
        .filter(|o| {
            let b = to_device(*o);
            text_boxes.iter().all(|t| b.intersection_area(t) == 0.0)
        });

    let page_device = transform_bbox(page_bbox, rotation, page_bbox.to_array());
    always
        .chain(isolated)
        .map(|o| clip_to_page(&to_device(o), &page_device))
        .collect()
}

/// Clamp `b` to `page`; `None` when nothing sensible remains.
fn clip_to_page(b: &Bbox, page: &Bbox) -> Option<Bbox> {
    let x0 = b.x_start().max(page.x_start());
    let y0 = b.y_start().max(page.y_start());
    let x1 = b.x_end().min(page.x_end());
    let y1 = b.y_end().min(page.y_end());
    if x0 > x1 || y0 > y1 {
        return None;
    }
    let clipped = Bbox::new(x0, y0, x1, y1);
    clipped.inside(page).then_some(clipped)
}
