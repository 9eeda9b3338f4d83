//! Span assembly: consecutive glyphs → same-style runs.
//!
//! A single forward pass. A glyph joins the open span unless one of the
//! break rules in [`SpanAssembler::breaks_before`] fires.

use crate::model::{Char, Span};
use crate::pipeline::postprocess::SOFT_HYPHEN;

/// Horizontal gap, in multiples of the running average glyph width, that
/// ends a span.
const GAP_FACTOR: f64 = 1.5;

/// Minimum vertical overlap with the span, as a fraction of the smaller height.
const MIN_SPAN_OVERLAP: f64 = 0.1;

pub struct SpanAssembler {
    superscript_height_threshold: f64,
    line_distance_threshold: f64,
}

impl SpanAssembler {
    pub fn new(superscript_height_threshold: f64, line_distance_threshold: f64) -> Self {
        Self {
            superscript_height_threshold,
            line_distance_threshold,
        }
    }

    pub fn assemble(&self, chars: Vec<Char>) -> Vec<Span> {
        let mut spans: Vec<Span> = Vec::new();
        let mut width_sum = 0.0;

        for ch in chars {
            let extend = match spans.last() {
                Some(span) => !self.breaks_before(span, &ch, width_sum),
                None => false,
            };

            let width = ch.bbox.width();
            match spans.last_mut() {
                Some(span) if extend => {
                    span.push(ch);
                    width_sum += width;
                }
                _ => {
                    spans.push(Span::start(ch));
                    width_sum = width;
                }
            }
        }

        spans
    }

    fn breaks_before(&self, span: &Span, ch: &Char, width_sum: f64) -> bool {
        if !ch.font.same_style(&span.font) || ch.rotation != span.rotation {
            return true;
        }
        if span.text.ends_with([SOFT_HYPHEN, '\n']) {
            return true;
        }

        let sb = &span.bbox;
        let cb = &ch.bbox;
        let raised = cb.y_start() < sb.y_start() - sb.height() * self.line_distance_threshold
            && cb.y_end() < sb.y_start() + sb.height() * self.superscript_height_threshold
            && cb.x_start() > sb.x_end();
        if raised {
            return true;
        }

        let Some(prev) = span.chars.last() else {
            return false;
        };
        let avg_width = width_sum / span.chars.len() as f64;
        if cb.horizontal_distance(&prev.bbox) > GAP_FACTOR * avg_width {
            return true;
        }
        if cb.overlap_y(&prev.bbox) == 0.0 {
            return true;
        }
        cb.overlap_y(sb) < MIN_SPAN_OVERLAP * cb.height().min(sb.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bbox;
    use crate::model::FontInfo;

    fn font(name: &str) -> FontInfo {
        FontInfo {
            name: name.into(),
            size: 10.0,
            weight: 400,
            color: Some([0, 0, 0, 255]),
            ..FontInfo::default()
        }
    }

    fn ch(c: char, x: f64, y: f64, h: f64, idx: usize) -> Char {
        Char {
            bbox: Bbox::new(x, y, x + 5.0, y + h),
            char: c,
            rotation: 0.0,
            font: font("Helvetica"),
            char_idx: idx,
        }
    }

    fn run(text: &str, x0: f64) -> Vec<Char> {
        text.chars()
            .enumerate()
            .map(|(i, c)| ch(c, x0 + 5.0 * i as f64, 100.0, 10.0, i))
            .collect()
    }

    fn assembler() -> SpanAssembler {
        SpanAssembler::new(0.8, 0.1)
    }

    fn texts(spans: &[Span]) -> Vec<&str> {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn uniform_tight_stream_is_one_span() {
        let spans = assembler().assemble(run("hello world", 0.0));
        assert_eq!(texts(&spans), vec!["hello world"]);
        assert_eq!(spans[0].char_start_idx, 0);
        assert_eq!(spans[0].char_end_idx, 10);
        assert_eq!(spans[0].chars.len(), 11);
    }

    #[test]
    fn font_change_splits_exactly_at_change() {
        let mut chars = run("abcdef", 0.0);
        for c in &mut chars[3..] {
            c.font = font("Helvetica-Bold");
        }
        let spans = assembler().assemble(chars);
        assert_eq!(texts(&spans), vec!["abc", "def"]);
    }

    #[test]
    fn colour_change_splits() {
        let mut chars = run("ab", 0.0);
        chars[1].font.color = Some([255, 0, 0, 255]);
        assert_eq!(assembler().assemble(chars).len(), 2);
    }

    #[test]
    fn newline_and_marker_end_span() {
        let spans = assembler().assemble(run("ab\ncd\x02ef", 0.0));
        assert_eq!(texts(&spans), vec!["ab\n", "cd\x02", "ef"]);
    }

    #[test]
    fn wide_gap_splits() {
        let mut chars = run("ab", 0.0);
        chars.push(ch('c', 30.0, 100.0, 10.0, 2));
        let spans = assembler().assemble(chars);
        assert_eq!(texts(&spans), vec!["ab", "c"]);
    }

    #[test]
    fn raised_glyph_after_span_splits() {
        let mut chars = run("x", 0.0);
        // Top 4 units above, bottom well above 80% of span height.
        chars.push(ch('2', 5.5, 96.0, 5.0, 1));
        let spans = assembler().assemble(chars);
        assert_eq!(texts(&spans), vec!["x", "2"]);
    }

    #[test]
    fn no_vertical_overlap_with_previous_splits() {
        let mut chars = run("a", 0.0);
        chars.push(ch('b', 5.0, 120.0, 10.0, 1));
        assert_eq!(assembler().assemble(chars).len(), 2);
    }

    #[test]
    fn sliver_of_overlap_with_span_splits() {
        // 0.5 units of overlap is under 10% of the 10-unit height.
        let mut chars = run("a", 0.0);
        chars.push(ch('b', 5.0, 109.5, 10.0, 1));
        assert_eq!(texts(&assembler().assemble(chars)), vec!["a", "b"]);

        let mut chars = run("a", 0.0);
        chars.push(ch('b', 5.0, 108.0, 10.0, 1));
        assert_eq!(texts(&assembler().assemble(chars)), vec!["ab"]);
    }

    #[test]
    fn rotation_change_splits() {
        let mut chars = run("ab", 0.0);
        chars[1].rotation = 90.0;
        assert_eq!(assembler().assemble(chars).len(), 2);
    }

    #[test]
    fn empty_input() {
        assert!(assembler().assemble(vec![]).is_empty());
    }
}
