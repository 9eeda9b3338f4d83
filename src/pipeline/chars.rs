//! Glyph ingest: raw engine glyphs → device-space [`Char`]s.
//!
//! Three things happen here, once per glyph:
//!
//! * the loose or tight box is chosen (loose for upright glyphs, so
//!   accents and descenders share a line height; tight for rotated glyphs,
//!   and for apostrophes when `quote_loosebox` is off),
//! * UTF-16 surrogate halves are recombined, since a Rust `char` cannot hold
//!   one (unpaired halves become U+FFFD),
//! * the box is mapped into device space with [`transform_bbox`].

use crate::geometry::{transform_bbox, Bbox};
use crate::model::Char;
use crate::pipeline::postprocess::{combine_surrogates, is_high_surrogate};
use crate::pipeline::source::{RawGlyph, RawPage};

pub fn get_chars(page: &RawPage, quote_loosebox: bool) -> Vec<Char> {
    let glyphs = &page.glyphs;
    let mut chars = Vec::with_capacity(glyphs.len());
    let to_device = |raw: [f64; 4]| transform_bbox(&page.bbox, page.rotation, raw);

    let mut i = 0;
    while i < glyphs.len() {
        let glyph = &glyphs[i];

        if is_high_surrogate(glyph.unicode) {
            if let Some((next, c)) = glyphs
                .get(i + 1)
                .and_then(|n| combine_surrogates(glyph.unicode, n.unicode).map(|c| (n, c)))
            {
                let first = to_device(select_box(glyph, c, quote_loosebox));
                let second = to_device(select_box(next, c, quote_loosebox));
                chars.push(make_char(glyph, c, first.merge(&second)));
                i += 2;
                continue;
            }
        }

        let c = char::from_u32(glyph.unicode).unwrap_or(char::REPLACEMENT_CHARACTER);
        let bbox = to_device(select_box(glyph, c, quote_loosebox));
        chars.push(make_char(glyph, c, bbox));
        i += 1;
    }

    chars
}

fn select_box(glyph: &RawGlyph, c: char, quote_loosebox: bool) -> [f64; 4] {
    let wants_loose = glyph.angle == 0.0 && (c != '\'' || quote_loosebox);
    match glyph.loose {
        Some(loose) if wants_loose => loose,
        _ => glyph.tight,
    }
}

fn make_char(glyph: &RawGlyph, c: char, bbox: Bbox) -> Char {
    Char {
        bbox,
        char: c,
        rotation: glyph.angle,
        font: glyph.font.clone(),
        char_idx: glyph.index,
    }
}
