//! Canonical per-page document tree: `Page → Block → Line → Span → Char`.
//!
//! Every page owns its whole tree; nothing is shared across pages. The tree
//! is built once by [`crate::pipeline::page::assemble_page`] and treated as
//! read-only afterwards. Output views are built from it by
//! [`crate::output`] without touching the original.

use crate::geometry::{Bbox, PageRotation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Font descriptor attached to every glyph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FontInfo {
    pub name: String,
    /// PDF font descriptor flags (fixed pitch, serif, symbolic, italic, …).
    pub flags: u32,
    pub size: f64,
    pub weight: u32,
    /// RGBA fill colour, absent when the engine could not report one.
    pub color: Option<[u8; 4]>,
}

impl FontInfo {
    /// Name, flags, size and weight match. Colour is ignored.
    pub fn same_face(&self, other: &FontInfo) -> bool {
        self.name == other.name
            && self.flags == other.flags
            && self.size == other.size
            && self.weight == other.weight
    }

    /// [`same_face`](Self::same_face) plus identical fill colour.
    pub fn same_style(&self, other: &FontInfo) -> bool {
        self.same_face(other) && self.color == other.color
    }
}

/// A single glyph in device space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Char {
    pub bbox: Bbox,
    pub char: char,
    /// Glyph rotation in degrees.
    pub rotation: f64,
    pub font: FontInfo,
    /// Position of the glyph in the engine's text stream for this page.
    pub char_idx: usize,
}

/// Maximal run of glyphs sharing style and rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub bbox: Bbox,
    pub text: String,
    pub font: FontInfo,
    pub rotation: f64,
    pub char_start_idx: usize,
    pub char_end_idx: usize,
    pub chars: Vec<Char>,
    /// Link target, filled in by a link resolver; empty otherwise.
    pub url: String,
    pub superscript: bool,
    pub subscript: bool,
}

impl Span {
    /// Open a span on its first glyph.
    pub fn start(ch: Char) -> Self {
        Span {
            bbox: ch.bbox,
            text: ch.char.to_string(),
            font: ch.font.clone(),
            rotation: ch.rotation,
            char_start_idx: ch.char_idx,
            char_end_idx: ch.char_idx,
            chars: vec![ch],
            url: String::new(),
            superscript: false,
            subscript: false,
        }
    }

    /// Extend the span with the next glyph.
    pub fn push(&mut self, ch: Char) {
        self.text.push(ch.char);
        self.char_end_idx = ch.char_idx;
        self.bbox = self.bbox.merge(&ch.bbox);
        self.chars.push(ch);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub spans: Vec<Span>,
    pub bbox: Bbox,
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub lines: Vec<Line>,
    pub bbox: Bbox,
    pub rotation: f64,
}

/// One extracted page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 0-based page index in the source document.
    pub page: usize,
    /// Page box as reported by the engine (PDF user space).
    pub bbox: Bbox,
    pub width: u32,
    pub height: u32,
    pub rotation: PageRotation,
    pub blocks: Vec<Block>,
    /// Render scale used for `page_image`.
    pub scale: f64,
    /// Base64 PNG of the rendered page, absent when rendering was disabled or failed.
    pub page_image: Option<String>,
    /// Non-text regions in device space. `None` marks a region dropped by page clipping.
    pub images: Vec<Option<Bbox>>,
    pub refs: Option<Vec<Reference>>,
}

impl Page {
    /// Width and height as the page is displayed, after rotation.
    pub fn visual_size(&self) -> (f64, f64) {
        if self.rotation.is_sideways() {
            (self.height as f64, self.width as f64)
        } else {
            (self.width as f64, self.height as f64)
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }

    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.lines().flat_map(|l| l.spans.iter())
    }
}

// ── Tables ───────────────────────────────────────────────────────────────

/// Text recovered for one caller-supplied table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub text: String,
    /// The cell rectangle exactly as supplied, in image pixel space.
    pub bbox: Bbox,
}

/// Cell rectangles for one page, expressed in the pixel grid of an image
/// of `img_size` (width, height).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInput {
    pub cells: Vec<Bbox>,
    pub img_size: (u32, u32),
}

// ── References ───────────────────────────────────────────────────────────

/// A link anchor on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub idx: usize,
    pub page: usize,
    pub coord: [f64; 2],
}

impl Reference {
    pub fn ref_id(&self) -> String {
        format!("page-{}-{}", self.page, self.idx)
    }

    pub fn url(&self) -> String {
        format!("#{}", self.ref_id())
    }
}

/// Per-page registry of link anchors.
///
/// This crate does not resolve links itself. The registry is the hook for
/// a caller-side link resolver: it registers anchor coordinates with
/// [`add_ref`](Self::add_ref) to get stable reference ids, then calls
/// [`attach`](Self::attach) on the extracted pages so `Page::refs` is
/// populated for the structured output.
#[derive(Debug, Clone, Default)]
pub struct ReferenceRegistry {
    by_page: BTreeMap<usize, Vec<Reference>>,
}

impl ReferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the reference at `coord` on `page`, registering it if new.
    pub fn add_ref(&mut self, page: usize, coord: [f64; 2]) -> Reference {
        if let Some(existing) = self.check_ref(page, coord) {
            return existing;
        }
        let refs = self.by_page.entry(page).or_default();
        let r = Reference {
            idx: refs.len(),
            page,
            coord,
        };
        refs.push(r.clone());
        r
    }

    pub fn check_ref(&self, page: usize, coord: [f64; 2]) -> Option<Reference> {
        self.by_page
            .get(&page)
            .and_then(|refs| refs.iter().find(|r| r.coord == coord).cloned())
    }

    pub fn get_refs(&self, page: usize) -> &[Reference] {
        self.by_page.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Copy registered references onto the matching pages. Pages with no
    /// registered anchor get an empty list.
    pub fn attach(&self, pages: &mut [Page]) {
        for page in pages {
            page.refs = Some(self.get_refs(page.page).to_vec());
        }
    }
}
