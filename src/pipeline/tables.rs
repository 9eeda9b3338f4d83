//! Table cell text recovery.
//!
//! Callers detect tables on a rendered page image (typically with a vision
//! model) and hand back cell rectangles in that image's pixel grid. Each
//! rectangle is rescaled to the page's device space and collects the text of
//! every span that lies mostly inside it.

use crate::config::HyphenMode;
use crate::error::PdfTextError;
use crate::model::{Page, TableCell, TableInput};
use crate::pipeline::postprocess::{handle_hyphens, postprocess_text};
use tracing::debug;

/// Fill in cell text for one table input per page.
///
/// `threshold` is the share of a span's area that must fall inside a cell.
pub fn table_output(
    pages: &[Page],
    inputs: &[TableInput],
    threshold: f64,
) -> Result<Vec<Vec<TableCell>>, PdfTextError> {
    if pages.len() != inputs.len() {
        return Err(PdfTextError::TableCountMismatch {
            pages: pages.len(),
            tables: inputs.len(),
        });
    }

    pages
        .iter()
        .zip(inputs)
        .map(|(page, input)| {
            let cells = page_cells(page, input, threshold)?;
            if cells.len() != input.cells.len() {
                return Err(PdfTextError::CellCountMismatch {
                    page: page.page,
                    expected: input.cells.len(),
                    produced: cells.len(),
                });
            }
            Ok(cells)
        })
        .collect()
}

fn page_cells(
    page: &Page,
    input: &TableInput,
    threshold: f64,
) -> Result<Vec<TableCell>, PdfTextError> {
    let (img_w, img_h) = input.img_size;
    if img_w == 0 || img_h == 0 {
        return Err(PdfTextError::InvalidTableImage {
            page: page.page,
            width: img_w,
            height: img_h,
        });
    }

    let page_size = page.visual_size();
    let img_size = (img_w as f64, img_h as f64);

    let cells: Vec<TableCell> = input
        .cells
        .iter()
        .map(|cell| {
            let area = cell.rescale(page_size, img_size);
            let text: String = page
                .spans()
                .filter(|s| s.bbox.intersection_pct(&area) > threshold)
                .map(|s| handle_hyphens(&postprocess_text(&s.text), HyphenMode::Keep))
                .collect();
            TableCell {
                text: text.trim().to_string(),
                bbox: *cell,
            }
        })
        .collect();

    debug!("Page {}: filled {} table cells", page.page, cells.len());
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Bbox, PageRotation};
    use crate::model::{Block, Char, FontInfo, Line, Span};

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

    fn page_with(spans: Vec<Span>) -> Page {
        let bbox = Bbox::new(0.0, 0.0, 200.0, 100.0);
        Page {
            page: 0,
            bbox,
            width: 200,
            height: 100,
            rotation: PageRotation::R0,
            blocks: vec![Block {
                lines: vec![Line {
                    spans,
                    bbox,
                    rotation: 0.0,
                }],
                bbox,
                rotation: 0.0,
            }],
            scale: 2.0,
            page_image: None,
            images: vec![],
            refs: None,
        }
    }

    #[test]
    fn cells_collect_text_in_order() {
        let page = page_with(vec![
            span("Name ", Bbox::new(10.0, 10.0, 40.0, 20.0)),
            span("Alice", Bbox::new(42.0, 10.0, 70.0, 20.0)),
            span("42", Bbox::new(110.0, 10.0, 130.0, 20.0)),
        ]);
        // Image is twice the page size.
        let input = TableInput {
            cells: vec![
                Bbox::new(0.0, 0.0, 200.0, 60.0),
                Bbox::new(200.0, 0.0, 400.0, 60.0),
                Bbox::new(0.0, 100.0, 200.0, 200.0),
            ],
            img_size: (400, 200),
        };
        let tables = table_output(&[page], &[input], 0.5).unwrap();
        let texts: Vec<&str> = tables[0].iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Name Alice", "42", ""]);
        assert_eq!(tables[0][1].bbox, Bbox::new(200.0, 0.0, 400.0, 60.0));
    }

    #[test]
    fn marginal_overlap_is_ignored() {
        let page = page_with(vec![span("edge", Bbox::new(90.0, 10.0, 110.0, 20.0))]);
        let input = TableInput {
            cells: vec![Bbox::new(0.0, 0.0, 95.0, 50.0)],
            img_size: (200, 100),
        };
        let tables = table_output(&[page], &[input], 0.5).unwrap();
        assert_eq!(tables[0][0].text, "");
    }

    #[test]
    fn soft_hyphen_kept_in_cells() {
        let page = page_with(vec![span("tab\x02", Bbox::new(10.0, 10.0, 40.0, 20.0))]);
        let input = TableInput {
            cells: vec![Bbox::new(0.0, 0.0, 100.0, 50.0)],
            img_size: (200, 100),
        };
        let tables = table_output(&[page], &[input], 0.5).unwrap();
        assert_eq!(tables[0][0].text, "tab-");
    }

    #[test]
    fn page_and_table_counts_must_match() {
        let err = table_output(&[page_with(vec![])], &[], 0.5).unwrap_err();
        assert!(matches!(err, PdfTextError::TableCountMismatch { pages: 1, tables: 0 }));
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        let input = TableInput {
            cells: vec![],
            img_size: (0, 100),
        };
        let err = table_output(&[page_with(vec![])], &[input], 0.5).unwrap_err();
        assert!(matches!(err, PdfTextError::InvalidTableImage { .. }));
    }
}
