//! Block assembly: lines → paragraphs.
//!
//! Gap thresholds adapt to the page: the median distance between
//! consecutive line centres, times [`TOLERANCE_FACTOR`]. A line joins the
//! open block when any of the merge rules in [`joins_block`] holds; a final
//! pass then merges neighbouring blocks whose boxes overlap.
//!
//! The constants are empirically tuned and kept for output compatibility.

use crate::model::{Block, Line};
use tracing::debug;

const TOLERANCE_FACTOR: f64 = 1.5;
const DEFAULT_GAP: f64 = 0.1;
/// Share of the allowed y gap under which a horizontally overlapping line
/// is treated as an inline continuation.
const INLINE_GAP_FACTOR: f64 = 0.2;

/// Adaptive gap thresholds for one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllowedGaps {
    pub x: f64,
    pub y: f64,
}

impl AllowedGaps {
    pub fn for_lines(lines: &[Line]) -> Self {
        let (dx, dy): (Vec<f64>, Vec<f64>) = lines
            .windows(2)
            .map(|w| {
                let (px, py) = w[0].bbox.center();
                let (cx, cy) = w[1].bbox.center();
                ((cx - px).abs(), (cy - py).abs())
            })
            .unzip();

        AllowedGaps {
            x: median_or_default(dx) * TOLERANCE_FACTOR,
            y: median_or_default(dy) * TOLERANCE_FACTOR,
        }
    }
}

fn median_or_default(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return DEFAULT_GAP;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    let median = if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };
    if median == 0.0 {
        DEFAULT_GAP
    } else {
        median
    }
}

pub fn get_blocks(lines: Vec<Line>) -> Vec<Block> {
    if lines.is_empty() {
        return Vec::new();
    }

    let gaps = AllowedGaps::for_lines(&lines);
    debug!("Block gaps: x={:.3} y={:.3}", gaps.x, gaps.y);

    let mut blocks: Vec<Block> = Vec::new();
    for line in lines {
        match blocks.last_mut() {
            Some(block) if joins_block(block, &line, gaps) => {
                block.bbox = block.bbox.merge(&line.bbox);
                block.lines.push(line);
            }
            _ => blocks.push(Block {
                bbox: line.bbox,
                rotation: line.rotation,
                lines: vec![line],
            }),
        }
    }

    merge_overlapping(blocks)
}

fn joins_block(block: &Block, line: &Line, gaps: AllowedGaps) -> bool {
    let Some(last) = block.lines.last() else {
        return false;
    };
    let (lx, ly) = last.bbox.center();
    let (cx, cy) = line.bbox.center();
    let x_diff = (cx - lx).abs();
    let y_diff = (cy - ly).abs();
    let within_y = y_diff <= gaps.y;

    // (a) close in both directions
    if x_diff <= gaps.x && within_y {
        return true;
    }
    // (b) second line of a paragraph whose first line is indented
    if block.lines.len() == 1 && last.bbox.x_start() > line.bbox.x_start() && within_y {
        return true;
    }
    // (c) short trailing line
    if last.bbox.x_end() > line.bbox.x_end() && within_y {
        return true;
    }
    // (d) inline splice, e.g. a formula between two text runs
    if y_diff < gaps.y * INLINE_GAP_FACTOR && last.bbox.x_end() > line.bbox.x_start() {
        return true;
    }
    // (e) touches the block at all
    block.bbox.intersection_pct(&line.bbox) > 0.0
}

fn merge_overlapping(blocks: Vec<Block>) -> Vec<Block> {
    let mut merged: Vec<Block> = Vec::with_capacity(blocks.len());
    for block in blocks {
        match merged.last_mut() {
            Some(prev) if prev.bbox.intersection_pct(&block.bbox) > 0.0 => {
                prev.bbox = prev.bbox.merge(&block.bbox);
                prev.lines.extend(block.lines);
            }
            _ => merged.push(block),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bbox;

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> Line {
        Line {
            spans: vec![],
            bbox: Bbox::new(x0, y0, x1, y1),
            rotation: 0.0,
        }
    }

    fn shape(blocks: &[Block]) -> Vec<usize> {
        blocks.iter().map(|b| b.lines.len()).collect()
    }

    #[test]
    fn empty_page_has_no_blocks() {
        assert!(get_blocks(vec![]).is_empty());
    }

    #[test]
    fn single_line_uses_default_gap() {
        let gaps = AllowedGaps::for_lines(&[line(0.0, 0.0, 10.0, 10.0)]);
        assert!((gaps.x - 0.15).abs() < 1e-12);
        assert!((gaps.y - 0.15).abs() < 1e-12);
        assert_eq!(shape(&get_blocks(vec![line(0.0, 0.0, 10.0, 10.0)])), vec![1]);
    }

    #[test]
    fn median_of_even_count_averages() {
        assert_eq!(median_or_default(vec![4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median_or_default(vec![0.0, 0.0, 5.0]), DEFAULT_GAP);
    }

    #[test]
    fn evenly_spaced_paragraph_is_one_block() {
        let lines = (0..4)
            .map(|i| line(50.0, 100.0 + 14.0 * i as f64, 300.0, 110.0 + 14.0 * i as f64))
            .collect();
        assert_eq!(shape(&get_blocks(lines)), vec![4]);
    }

    #[test]
    fn large_vertical_gap_starts_new_block() {
        // Right edges grow line by line so the short-trailing-line rule
        // cannot bridge the gap.
        let lines = vec![
            line(50.0, 100.0, 300.0, 110.0),
            line(50.0, 114.0, 301.0, 124.0),
            line(50.0, 128.0, 302.0, 138.0),
            line(50.0, 200.0, 303.0, 210.0),
            line(50.0, 214.0, 304.0, 224.0),
        ];
        assert_eq!(shape(&get_blocks(lines)), vec![3, 2]);
    }

    #[test]
    fn indented_first_line_joins() {
        let lines = vec![
            line(120.0, 100.0, 300.0, 110.0),
            line(50.0, 114.0, 310.0, 124.0),
            line(50.0, 128.0, 312.0, 138.0),
        ];
        assert_eq!(shape(&get_blocks(lines)), vec![3]);
    }

    #[test]
    fn same_row_lines_within_gap_join_one_block() {
        // Centres 45 apart on one baseline: allowed x gap is 67.5.
        let lines = vec![
            line(0.0, 100.0, 40.0, 110.0),
            line(45.0, 100.0, 85.0, 110.0),
            line(90.0, 100.0, 130.0, 110.0),
            line(400.0, 100.0, 440.0, 110.0),
        ];
        let blocks = get_blocks(lines);
        assert_eq!(shape(&blocks), vec![3, 1]);
        assert_eq!(blocks[0].bbox.to_array(), [0.0, 100.0, 130.0, 110.0]);
    }

    #[test]
    fn overlapping_blocks_are_merged_in_second_pass() {
        let mut blocks = vec![
            Block {
                lines: vec![line(0.0, 0.0, 10.0, 10.0)],
                bbox: Bbox::new(0.0, 0.0, 10.0, 10.0),
                rotation: 0.0,
            },
            Block {
                lines: vec![line(5.0, 5.0, 20.0, 20.0)],
                bbox: Bbox::new(5.0, 5.0, 20.0, 20.0),
                rotation: 0.0,
            },
        ];
        blocks.push(Block {
            lines: vec![line(100.0, 100.0, 110.0, 110.0)],
            bbox: Bbox::new(100.0, 100.0, 110.0, 110.0),
            rotation: 0.0,
        });
        let merged = merge_overlapping(blocks);
        assert_eq!(shape(&merged), vec![2, 1]);
        assert_eq!(merged[0].bbox.to_array(), [0.0, 0.0, 20.0, 20.0]);
    }
}
