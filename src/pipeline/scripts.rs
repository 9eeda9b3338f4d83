//! Superscript / subscript classification.
//!
//! Runs after line assembly and only sets the `superscript` / `subscript`
//! flags on spans; geometry and text are untouched. Each predicate mirrors
//! one positional or textual condition. They are evaluated literally because
//! single-glyph spans and math symbols are sensitive to the exact structure.

use crate::model::{Line, Span};
use unicode_general_category::{get_general_category, GeneralCategory};

pub fn assign_scripts(lines: &mut [Line], height_threshold: f64, line_distance_threshold: f64) {
    for line in lines.iter_mut() {
        if line.spans.len() < 2 || line.bbox.height() > line.bbox.width() {
            continue;
        }

        let line_height = line.bbox.height();
        let flags: Vec<(bool, bool)> = (0..line.spans.len())
            .map(|i| classify(&line.spans, i, line_height, height_threshold, line_distance_threshold))
            .collect();

        for (span, (sup, sub)) in line.spans.iter_mut().zip(flags) {
            span.superscript = sup;
            span.subscript = sub;
        }
    }
}

fn classify(
    spans: &[Span],
    i: usize,
    line_height: f64,
    height_threshold: f64,
    line_distance_threshold: f64,
) -> (bool, bool) {
    let span = &spans[i];
    let prev = i.checked_sub(1).map(|p| &spans[p]);
    let next = spans.get(i + 1);
    let is_first = prev.is_none_or(|p| p.text.trim().is_empty());
    let is_last = next.is_none_or(|n| n.text.trim().is_empty());

    let bbox = &span.bbox;
    let small_relative_to = |other: &Span| bbox.height() / other.bbox.height().max(1.0) <= height_threshold;

    let line_fullheight = bbox.height() / line_height.max(1.0) <= height_threshold;
    let prev_fullheight = is_first || prev.is_some_and(small_relative_to);
    let next_fullheight = is_last || next.is_some_and(small_relative_to);

    let others = || spans.iter().enumerate().filter(move |(j, _)| *j != i).map(|(_, s)| s);

    let above = others().any(|s| {
        bbox.y_start() < s.bbox.y_start() - s.bbox.height() * line_distance_threshold
    });
    let prev_above = is_first || prev.is_some_and(|p| bbox.y_start() < p.bbox.y_start());
    let next_above = is_last || next.is_some_and(|n| bbox.y_start() < n.bbox.y_start());

    let below = others().any(|s| {
        bbox.y_end() > s.bbox.y_end() + s.bbox.height() * line_distance_threshold
    });
    let prev_below = is_first || prev.is_some_and(|p| bbox.y_end() > p.bbox.y_end());
    let next_below = is_last || next.is_some_and(|n| bbox.y_end() > n.bbox.y_end());

    let text_okay = script_shaped(span.text.trim());
    let fullheight = prev_fullheight || next_fullheight;

    if fullheight && (prev_above || next_above) && above && line_fullheight && text_okay {
        (true, false)
    } else if fullheight && (prev_below || next_below) && below && line_fullheight && text_okay {
        (false, true)
    } else {
        (false, false)
    }
}

/// A single alphanumeric or math-symbol glyph, or an all-digit number.
fn script_shaped(text: &str) -> bool {
    let mut it = text.chars();
    let single = match (it.next(), it.next()) {
        (Some(_), None) => true,
        (Some(_), Some(_)) => false,
        (None, _) => return false,
    };
    let numeric = text.chars().all(is_digit);
    let alnum = text.chars().all(char::is_alphanumeric);
    let math = single && text.chars().all(|c| get_general_category(c) == GeneralCategory::MathSymbol);
    (single || numeric) && (alnum || math)
}

/// Decimal digits plus the raised, lowered and circled digit forms.
/// Vulgar fractions and other numeric symbols do not count.
fn is_digit(c: char) -> bool {
    get_general_category(c) == GeneralCategory::DecimalNumber
        || matches!(c, '\u{B2}' | '\u{B3}' | '\u{B9}' | '\u{2070}' | '\u{2074}'..='\u{2079}')
        || matches!(c, '\u{2080}'..='\u{2089}' | '\u{2460}'..='\u{2468}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bbox;
    use crate::model::{Char, FontInfo};

    fn span(text: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Span {
        let mut s = Span::start(Char {
            bbox: Bbox::new(x0, y0, x1, y1),
            char: text.chars().next().unwrap(),
            rotation: 0.0,
            font: FontInfo::default(),
            char_idx: 0,
        });
        s.text = text.to_string();
        s
    }

    fn line(spans: Vec<Span>) -> Line {
        let bbox = spans
            .iter()
            .skip(1)
            .fold(spans[0].bbox, |acc, s| acc.merge(&s.bbox));
        Line {
            spans,
            bbox,
            rotation: 0.0,
        }
    }

    fn classify_line(spans: Vec<Span>) -> Vec<(bool, bool)> {
        let mut lines = vec![line(spans)];
        assign_scripts(&mut lines, 0.8, 0.1);
        lines[0]
            .spans
            .iter()
            .map(|s| (s.superscript, s.subscript))
            .collect()
    }

    #[test]
    fn raised_digit_is_superscript() {
        let flags = classify_line(vec![
            span("E = mc", 0.0, 100.0, 30.0, 112.0),
            span("2", 30.0, 96.0, 35.0, 103.0),
        ]);
        assert_eq!(flags, vec![(false, false), (true, false)]);
    }

    #[test]
    fn lowered_letter_is_subscript() {
        let flags = classify_line(vec![
            span("x = a", 0.0, 100.0, 30.0, 112.0),
            span("i", 30.0, 108.0, 34.0, 115.0),
            span(" + b", 34.0, 100.0, 60.0, 112.0),
        ]);
        assert_eq!(flags, vec![(false, false), (false, true), (false, false)]);
    }

    #[test]
    fn multi_letter_word_is_never_scripted() {
        let flags = classify_line(vec![
            span("x", 0.0, 100.0, 10.0, 112.0),
            span("ab", 10.0, 96.0, 20.0, 103.0),
        ]);
        assert_eq!(flags[1], (false, false));
    }

    #[test]
    fn raised_math_symbol_is_superscript() {
        let flags = classify_line(vec![
            span("f", 0.0, 100.0, 10.0, 112.0),
            span("∗", 10.0, 96.0, 15.0, 103.0),
            span("(x)", 15.0, 100.0, 40.0, 112.0),
        ]);
        assert_eq!(flags[1], (true, false));
    }

    #[test]
    fn single_span_lines_are_skipped() {
        let flags = classify_line(vec![span("2", 0.0, 96.0, 5.0, 103.0)]);
        assert_eq!(flags, vec![(false, false)]);
    }

    #[test]
    fn vertical_lines_are_skipped() {
        let flags = classify_line(vec![
            span("x", 0.0, 0.0, 4.0, 40.0),
            span("2", 0.0, 40.0, 3.0, 45.0),
        ]);
        assert_eq!(flags, vec![(false, false), (false, false)]);
    }

    #[test]
    fn script_shape_rules() {
        assert!(script_shaped("2"));
        assert!(script_shaped("12"));
        assert!(script_shaped("a"));
        assert!(script_shaped("≤"));
        assert!(!script_shaped("ab"));
        assert!(!script_shaped("≤≤"));
        assert!(!script_shaped(""));
        assert!(!script_shaped(","));
    }

    #[test]
    fn fractions_are_not_digit_runs() {
        assert!(!script_shaped("½½"));
        assert!(script_shaped("½"));
        assert!(script_shaped("²³"));
        assert!(script_shaped("٣٤"));
    }
}
