//! Output views built from the canonical [`Page`] tree.
//!
//! Two projections exist and neither mutates the tree:
//!
//! - **Plain text** ([`page_text`]): spans concatenated into lines, lines
//!   into blocks, normalised and hyphen-processed.
//! - **Structured** ([`PageOutput`]): the tree minus per-block/per-line
//!   bookkeeping, span text normalised with hyphens kept, glyphs optional,
//!   rotated pages reported in their displayed orientation.

use crate::config::HyphenMode;
use crate::geometry::{Bbox, PageRotation};
use crate::model::{Char, FontInfo, Page, Reference, Span};
use crate::pipeline::postprocess::{handle_hyphens, postprocess_text};
use crate::pipeline::reading_order::reading_order;
use serde::{Deserialize, Serialize};

// ── Plain text ───────────────────────────────────────────────────────────

/// Plain text of one page, before the final trim.
///
/// Each line is normalised and right-trimmed, blocks are separated by a
/// blank line, and hyphen handling runs once over the whole page so that
/// words broken across lines can be rejoined.
pub fn merge_text(page: &Page, sort: bool, hyphens: HyphenMode, tolerance: f64) -> String {
    let mut text = String::new();
    for idx in block_order(page, sort, tolerance) {
        let block = &page.blocks[idx];
        let mut block_text = String::new();
        for line in &block.lines {
            let raw: String = line.spans.iter().map(|s| s.text.as_str()).collect();
            block_text.push_str(postprocess_text(&raw).trim_end());
            block_text.push('\n');
        }
        text.push_str(block_text.trim_end());
        text.push_str("\n\n");
    }
    handle_hyphens(&text, hyphens)
}

/// Plain text of one page, trimmed.
pub fn page_text(page: &Page, sort: bool, hyphens: HyphenMode, tolerance: f64) -> String {
    merge_text(page, sort, hyphens, tolerance).trim().to_string()
}

fn block_order(page: &Page, sort: bool, tolerance: f64) -> Vec<usize> {
    if sort {
        let bboxes: Vec<Bbox> = page.blocks.iter().map(|b| b.bbox).collect();
        reading_order(&bboxes, tolerance)
    } else {
        (0..page.blocks.len()).collect()
    }
}

// ── Structured ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanOutput {
    pub bbox: Bbox,
    pub text: String,
    pub font: FontInfo,
    pub rotation: f64,
    pub char_start_idx: usize,
    pub char_end_idx: usize,
    pub url: String,
    pub superscript: bool,
    pub subscript: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chars: Option<Vec<Char>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineOutput {
    pub spans: Vec<SpanOutput>,
    pub bbox: Bbox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockOutput {
    pub lines: Vec<LineOutput>,
    pub bbox: Bbox,
}

/// Structured view of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageOutput {
    pub page: usize,
    pub bbox: Bbox,
    pub width: u32,
    pub height: u32,
    pub rotation: PageRotation,
    pub blocks: Vec<BlockOutput>,
    pub scale: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_image: Option<String>,
    pub images: Vec<Option<Bbox>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refs: Option<Vec<Reference>>,
}

/// Options for [`PageOutput::from_page`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuredOptions {
    pub sort: bool,
    pub keep_chars: bool,
    pub tolerance: f64,
}

impl PageOutput {
    pub fn from_page(page: &Page, opts: StructuredOptions) -> Self {
        let blocks = block_order(page, opts.sort, opts.tolerance)
            .into_iter()
            .map(|idx| {
                let block = &page.blocks[idx];
                BlockOutput {
                    bbox: block.bbox,
                    lines: block
                        .lines
                        .iter()
                        .map(|line| LineOutput {
                            bbox: line.bbox,
                            spans: line
                                .spans
                                .iter()
                                .map(|s| span_output(s, opts.keep_chars))
                                .collect(),
                        })
                        .collect(),
                }
            })
            .collect();

        let (width, height, bbox) = if page.rotation.is_sideways() {
            let b = page.bbox;
            (
                page.height,
                page.width,
                Bbox::new(b.y_start(), b.x_start(), b.y_end(), b.x_end()),
            )
        } else {
            (page.width, page.height, page.bbox)
        };

        PageOutput {
            page: page.page,
            bbox,
            width,
            height,
            rotation: page.rotation,
            blocks,
            scale: page.scale,
            page_image: page.page_image.clone(),
            images: page.images.clone(),
            refs: page.refs.clone(),
        }
    }
}

fn span_output(span: &Span, keep_chars: bool) -> SpanOutput {
    SpanOutput {
        bbox: span.bbox,
        text: handle_hyphens(&postprocess_text(&span.text), HyphenMode::Keep),
        font: span.font.clone(),
        rotation: span.rotation,
        char_start_idx: span.char_start_idx,
        char_end_idx: span.char_end_idx,
        url: span.url.clone(),
        superscript: span.superscript,
        subscript: span.subscript,
        chars: keep_chars.then(|| span.chars.clone()),
    }
}

// ── Metadata ─────────────────────────────────────────────────────────────

/// Document-level information available without reading page content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Line};
    use crate::pipeline::reading_order::DEFAULT_TOLERANCE;

    fn span(text: &str, bbox: Bbox) -> Span {
        let mut s = Span::start(Char {
            bbox,
            char: 'x',
            rotation: 0.0,
            font: FontInfo::default(),
            char_idx: 0,
        });
        s.text = text.to_string();
        s
    }

    fn block(lines: &[&str], x: f64, y: f64) -> Block {
        let lines: Vec<Line> = lines
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let bbox = Bbox::new(x, y + 12.0 * i as f64, x + 100.0, y + 10.0 + 12.0 * i as f64);
                Line {
                    spans: vec![span(t, bbox)],
                    bbox,
                    rotation: 0.0,
                }
            })
            .collect();
        let bbox = lines
            .iter()
            .skip(1)
            .fold(lines[0].bbox, |acc, l| acc.merge(&l.bbox));
        Block {
            lines,
            bbox,
            rotation: 0.0,
        }
    }

    fn page(blocks: Vec<Block>, rotation: PageRotation) -> Page {
        Page {
            page: 0,
            bbox: Bbox::new(0.0, 0.0, 612.0, 792.0),
            width: 612,
            height: 792,
            rotation,
            blocks,
            scale: 2.0,
            page_image: None,
            images: vec![],
            refs: None,
        }
    }

    #[test]
    fn blocks_separated_by_blank_line() {
        let p = page(
            vec![
                block(&["line one  ", "line two"], 50.0, 50.0),
                block(&["block two"], 50.0, 200.0),
            ],
            PageRotation::R0,
        );
        assert_eq!(
            page_text(&p, false, HyphenMode::Join, DEFAULT_TOLERANCE),
            "line one\nline two\n\nblock two"
        );
    }

    #[test]
    fn hyphenated_word_rejoined_across_lines() {
        let p = page(vec![block(&["exam\x02", "ple text"], 50.0, 50.0)], PageRotation::R0);
        assert_eq!(
            page_text(&p, false, HyphenMode::Join, DEFAULT_TOLERANCE),
            "example\ntext"
        );
        assert_eq!(
            page_text(&p, false, HyphenMode::Keep, DEFAULT_TOLERANCE),
            "exam-\n\nple text"
        );
    }

    #[test]
    fn sort_reorders_blocks_without_touching_page() {
        let p = page(
            vec![block(&["bottom"], 50.0, 400.0), block(&["top"], 50.0, 50.0)],
            PageRotation::R0,
        );
        assert_eq!(page_text(&p, true, HyphenMode::Join, DEFAULT_TOLERANCE), "top\n\nbottom");
        assert_eq!(page_text(&p, false, HyphenMode::Join, DEFAULT_TOLERANCE), "bottom\n\ntop");
        assert_eq!(p.blocks[0].lines[0].spans[0].text, "bottom");
    }

    #[test]
    fn structured_output_drops_chars_unless_asked() {
        let p = page(vec![block(&["ﬁne\x02"], 50.0, 50.0)], PageRotation::R0);
        let opts = StructuredOptions {
            sort: false,
            keep_chars: false,
            tolerance: DEFAULT_TOLERANCE,
        };
        let out = PageOutput::from_page(&p, opts);
        let s = &out.blocks[0].lines[0].spans[0];
        assert_eq!(s.text, "fine-\n");
        assert!(s.chars.is_none());

        let json = serde_json::to_value(&out).unwrap();
        assert!(json["blocks"][0]["lines"][0]["spans"][0].get("chars").is_none());

        let with_chars = PageOutput::from_page(&p, StructuredOptions { keep_chars: true, ..opts });
        assert_eq!(with_chars.blocks[0].lines[0].spans[0].chars.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn sideways_page_swaps_dimensions() {
        let p = page(vec![], PageRotation::R90);
        let out = PageOutput::from_page(
            &p,
            StructuredOptions {
                sort: false,
                keep_chars: false,
                tolerance: DEFAULT_TOLERANCE,
            },
        );
        assert_eq!((out.width, out.height), (792, 612));
        assert_eq!(out.bbox.to_array(), [0.0, 0.0, 792.0, 612.0]);
        assert_eq!(out.rotation, PageRotation::R90);
    }
}
