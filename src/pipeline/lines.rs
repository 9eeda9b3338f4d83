//! Line assembly: spans → text lines.

use crate::model::{Line, Span};
use crate::pipeline::postprocess::SOFT_HYPHEN;

pub fn get_lines(spans: Vec<Span>) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();

    for span in spans {
        match lines.last_mut() {
            Some(line) if continues_line(line, &span) => {
                line.bbox = line.bbox.merge(&span.bbox);
                line.spans.push(span);
            }
            _ => lines.push(Line {
                bbox: span.bbox,
                rotation: span.rotation,
                spans: vec![span],
            }),
        }
    }

    lines
}

fn continues_line(line: &Line, span: &Span) -> bool {
    let ends_line = line
        .spans
        .last()
        .is_some_and(|prev| prev.text.ends_with(['\n', SOFT_HYPHEN]));
    if ends_line || span.rotation != line.rotation {
        return false;
    }
    // pdfium sometimes omits the line-break marker; a span starting below
    // the line is a new line regardless.
    span.bbox.y_start() <= line.bbox.y_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bbox;
    use crate::model::{Char, FontInfo};

    fn span(text: &str, x: f64, y: f64) -> Span {
        let mut chars = text.chars().enumerate().map(|(i, c)| Char {
            bbox: Bbox::new(x + 5.0 * i as f64, y, x + 5.0 * (i + 1) as f64, y + 10.0),
            char: c,
            rotation: 0.0,
            font: FontInfo::default(),
            char_idx: i,
        });
        let mut s = Span::start(chars.next().unwrap());
        for c in chars {
            s.push(c);
        }
        s
    }

    #[test]
    fn spans_on_same_row_share_a_line() {
        let lines = get_lines(vec![span("ab", 0.0, 0.0), span("cd", 20.0, 1.0)]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans.len(), 2);
        assert_eq!(lines[0].bbox.to_array(), [0.0, 0.0, 30.0, 11.0]);
    }

    #[test]
    fn newline_suffix_breaks_line() {
        let lines = get_lines(vec![span("ab\n", 0.0, 0.0), span("cd", 0.0, 0.0)]);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn soft_hyphen_suffix_breaks_line() {
        let lines = get_lines(vec![span("ab\x02", 0.0, 0.0), span("cd", 0.0, 0.0)]);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn span_below_line_breaks_without_marker() {
        let lines = get_lines(vec![span("ab", 0.0, 0.0), span("cd", 0.0, 12.0)]);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn rotation_change_breaks_line() {
        let mut rotated = span("cd", 10.0, 0.0);
        rotated.rotation = 90.0;
        let lines = get_lines(vec![span("ab", 0.0, 0.0), rotated]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].rotation, 90.0);
    }
}
