//! Bounding boxes and the engine → device coordinate transform.
//!
//! pdfium reports glyph and object positions in PDF user space: origin at the
//! bottom-left of the media box, y growing upward, possibly offset from zero.
//! Everything downstream of the source adapter works in **device space**
//! instead: origin top-left, y growing downward, page rotation already
//! applied. [`transform_bbox`] is the single place where that conversion
//! happens.
//!
//! Every [`Bbox`] constructor normalises its corners so `x_start <= x_end`
//! and `y_start <= y_end`. Zero-area boxes are legal and every predicate
//! below handles them.

use crate::error::PdfTextError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Bbox ─────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in device coordinates.
///
/// Serialised as `[x_start, y_start, x_end, y_end]`.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Bbox {
    x_start: f64,
    y_start: f64,
    x_end: f64,
    y_end: f64,
}

impl Bbox {
    /// Build a box from two corners given in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x_start: x0.min(x1),
            y_start: y0.min(y1),
            x_end: x0.max(x1),
            y_end: y0.max(y1),
        }
    }

    #[inline]
    pub fn x_start(&self) -> f64 {
        self.x_start
    }

    #[inline]
    pub fn y_start(&self) -> f64 {
        self.y_start
    }

    #[inline]
    pub fn x_end(&self) -> f64 {
        self.x_end
    }

    #[inline]
    pub fn y_end(&self) -> f64 {
        self.y_end
    }

    pub fn width(&self) -> f64 {
        self.x_end - self.x_start
    }

    pub fn height(&self) -> f64 {
        self.y_end - self.y_start
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.x_start + self.x_end) / 2.0,
            (self.y_start + self.y_end) / 2.0,
        )
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.x_start, self.y_start, self.x_end, self.y_end]
    }

    /// Smallest rectangle containing both boxes.
    pub fn merge(&self, other: &Bbox) -> Bbox {
        Bbox {
            x_start: self.x_start.min(other.x_start),
            y_start: self.y_start.min(other.y_start),
            x_end: self.x_end.max(other.x_end),
            y_end: self.y_end.max(other.y_end),
        }
    }

    /// Length of the shared x interval, never negative.
    pub fn overlap_x(&self, other: &Bbox) -> f64 {
        (self.x_end.min(other.x_end) - self.x_start.max(other.x_start)).max(0.0)
    }

    /// Length of the shared y interval, never negative.
    pub fn overlap_y(&self, other: &Bbox) -> f64 {
        (self.y_end.min(other.y_end) - self.y_start.max(other.y_start)).max(0.0)
    }

    pub fn intersection_area(&self, other: &Bbox) -> f64 {
        self.overlap_x(other) * self.overlap_y(other)
    }

    /// Fraction of `self` covered by `other`; `0.0` when `self` has no area.
    pub fn intersection_pct(&self, other: &Bbox) -> f64 {
        let area = self.area();
        if area == 0.0 {
            return 0.0;
        }
        self.intersection_area(other) / area
    }

    /// Intersection normalised by the smaller of the two areas.
    ///
    /// When either box is degenerate the area ratio is undefined, so this
    /// falls back to a containment test: `1.0` if one box lies inside the
    /// other, `0.0` otherwise.
    pub fn intersection_score(&self, other: &Bbox) -> f64 {
        let (a, b) = (self.area(), other.area());
        if a == 0.0 || b == 0.0 {
            if self.inside(other) || other.inside(self) {
                return 1.0;
            }
            return 0.0;
        }
        self.intersection_area(other) / a.min(b)
    }

    /// Gap between the nearest vertical edges, `0.0` when the x ranges overlap.
    pub fn horizontal_distance(&self, other: &Bbox) -> f64 {
        if self.x_end < other.x_start {
            other.x_start - self.x_end
        } else if other.x_end < self.x_start {
            self.x_start - other.x_end
        } else {
            0.0
        }
    }

    /// `true` when `self` lies entirely within `other` (edges may touch).
    pub fn inside(&self, other: &Bbox) -> bool {
        self.x_start >= other.x_start
            && self.x_end <= other.x_end
            && self.y_start >= other.y_start
            && self.y_end <= other.y_end
    }

    /// Scale x and y independently by `target / reference`.
    ///
    /// Used to move caller rectangles between an image pixel grid and the
    /// page's point grid: `cell.rescale(page_size, image_size)`.
    pub fn rescale(&self, target: (f64, f64), reference: (f64, f64)) -> Bbox {
        let sx = target.0 / reference.0;
        let sy = target.1 / reference.1;
        Bbox::new(
            self.x_start * sx,
            self.y_start * sy,
            self.x_end * sx,
            self.y_end * sy,
        )
    }

    /// Rotate the box inside a `page_width × page_height` page.
    pub fn rotate(&self, page_width: f64, page_height: f64, rotation: PageRotation) -> Bbox {
        let (x0, y0, x1, y1) = (self.x_start, self.y_start, self.x_end, self.y_end);
        match rotation {
            PageRotation::R0 => *self,
            PageRotation::R90 => Bbox::new(page_height - y1, x0, page_height - y0, x1),
            PageRotation::R180 => Bbox::new(
                page_width - x1,
                page_height - y1,
                page_width - x0,
                page_height - y0,
            ),
            PageRotation::R270 => Bbox::new(y0, page_width - x1, y1, page_width - x0),
        }
    }
}

impl From<[f64; 4]> for Bbox {
    fn from(v: [f64; 4]) -> Self {
        Bbox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Bbox> for [f64; 4] {
    fn from(b: Bbox) -> Self {
        b.to_array()
    }
}

impl fmt::Debug for Bbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bbox([{}, {}, {}, {}])",
            self.x_start, self.y_start, self.x_end, self.y_end
        )
    }
}

// ── Page rotation ────────────────────────────────────────────────────────

/// Page rotation, restricted to quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum PageRotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl PageRotation {
    pub fn degrees(self) -> i32 {
        match self {
            PageRotation::R0 => 0,
            PageRotation::R90 => 90,
            PageRotation::R180 => 180,
            PageRotation::R270 => 270,
        }
    }

    /// Quarter turns that exchange the page's visual width and height.
    pub fn is_sideways(self) -> bool {
        matches!(self, PageRotation::R90 | PageRotation::R270)
    }
}

impl TryFrom<i32> for PageRotation {
    type Error = PdfTextError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(PageRotation::R0),
            90 => Ok(PageRotation::R90),
            180 => Ok(PageRotation::R180),
            270 => Ok(PageRotation::R270),
            other => Err(PdfTextError::InvalidRotation { degrees: other }),
        }
    }
}

impl From<PageRotation> for i32 {
    fn from(r: PageRotation) -> Self {
        r.degrees()
    }
}

// ── Transform ────────────────────────────────────────────────────────────

/// Integer page extent used by the transform: `ceil(|x_end - x_start|)` and
/// `ceil(|y_end - y_start|)` of the engine page box.
pub fn page_extent(page_bbox: &Bbox) -> (f64, f64) {
    (page_bbox.width().abs().ceil(), page_bbox.height().abs().ceil())
}

/// Map a raw engine rectangle `[left, bottom, right, top]` into device space.
///
/// Subtracts the page origin, flips y against the ceiled page height,
/// normalises, then applies `rotation`.
pub fn transform_bbox(page_bbox: &Bbox, rotation: PageRotation, raw: [f64; 4]) -> Bbox {
    let (page_width, page_height) = page_extent(page_bbox);

    let cx0 = raw[0] - page_bbox.x_start;
    let cx1 = raw[2] - page_bbox.x_start;
    let ty0 = page_height - (raw[1] - page_bbox.y_start);
    let ty1 = page_height - (raw[3] - page_bbox.y_start);

    Bbox::new(cx0, ty0, cx1, ty1).rotate(page_width, page_height, rotation)
}
