//! Row-then-column reading order for blocks.
//!
//! Blocks are bucketed into rows by their rounded top edge, rows are read
//! top to bottom, and blocks within a row left to right. This is a
//! heuristic, not a multi-column layout solver: two columns whose
//! paragraphs start at different heights are read paragraph by paragraph
//! in vertical order.

use crate::geometry::Bbox;
use crate::model::Block;
use std::collections::BTreeMap;

pub const DEFAULT_TOLERANCE: f64 = 1.25;

/// Permutation that puts `bboxes` into reading order.
pub fn reading_order(bboxes: &[Bbox], tolerance: f64) -> Vec<usize> {
    let mut rows: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, bbox) in bboxes.iter().enumerate() {
        let row = (bbox.y_start() / tolerance).round_ties_even() as i64;
        rows.entry(row).or_default().push(i);
    }

    rows.into_values()
        .flat_map(|mut row| {
            row.sort_by(|&a, &b| bboxes[a].x_start().total_cmp(&bboxes[b].x_start()));
            row
        })
        .collect()
}

/// Return `blocks` reordered into reading order.
pub fn sort_blocks(blocks: Vec<Block>, tolerance: f64) -> Vec<Block> {
    let bboxes: Vec<Bbox> = blocks.iter().map(|b| b.bbox).collect();
    let order = reading_order(&bboxes, tolerance);
    let mut slots: Vec<Option<Block>> = blocks.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> Bbox {
        Bbox::new(x, y, x + 10.0, y + 10.0)
    }

    #[test]
    fn rows_top_to_bottom_then_left_to_right() {
        let boxes = [at(300.0, 100.0), at(50.0, 400.0), at(50.0, 100.4)];
        assert_eq!(reading_order(&boxes, DEFAULT_TOLERANCE), vec![2, 0, 1]);
    }

    #[test]
    fn same_row_sorted_by_x() {
        let boxes = [at(200.0, 50.0), at(10.0, 50.2), at(100.0, 49.9)];
        assert_eq!(reading_order(&boxes, DEFAULT_TOLERANCE), vec![1, 2, 0]);
    }

    #[test]
    fn idempotent_on_sorted_input() {
        let boxes = [at(10.0, 10.0), at(20.0, 10.0), at(5.0, 90.0), at(50.0, 200.0)];
        let once = reading_order(&boxes, DEFAULT_TOLERANCE);
        assert_eq!(once, vec![0, 1, 2, 3]);
        let reordered: Vec<Bbox> = once.iter().map(|&i| boxes[i]).collect();
        assert_eq!(reading_order(&reordered, DEFAULT_TOLERANCE), vec![0, 1, 2, 3]);
    }

    #[test]
    fn equal_x_keeps_input_order() {
        let boxes = [at(10.0, 10.0), at(10.0, 10.3)];
        assert_eq!(reading_order(&boxes, DEFAULT_TOLERANCE), vec![0, 1]);
    }

    #[test]
    fn sort_blocks_moves_blocks() {
        let block = |x, y| Block {
            lines: vec![],
            bbox: at(x, y),
            rotation: 0.0,
        };
        let sorted = sort_blocks(vec![block(0.0, 500.0), block(0.0, 20.0)], DEFAULT_TOLERANCE);
        assert_eq!(sorted[0].bbox.y_start(), 20.0);
        assert_eq!(sorted[1].bbox.y_start(), 500.0);
    }
}
