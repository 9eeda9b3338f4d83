//! Configuration types for text extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Layout thresholds, worker fan-out,
//! rendering, and output shaping all live in the one struct so a config can
//! be cloned into every page worker unchanged.

use crate::error::PdfTextError;
use crate::pipeline::page::LayoutParams;
use crate::progress::ProgressCallback;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a text extraction.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdftext::{ExtractionConfig, HyphenMode, PageSelection};
///
/// let config = ExtractionConfig::builder()
///     .pages(PageSelection::parse("1,3-5").unwrap())
///     .workers(4)
///     .sort(true)
///     .hyphens(HyphenMode::Keep)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Page selection. Default: All pages.
    pub pages: PageSelection,

    /// Requested number of page workers. Default: None (sequential).
    ///
    /// The effective count is clamped so each worker gets at least
    /// `min_pages_per_worker` pages; a 12-page document asked to use 8
    /// workers runs on one.
    pub workers: Option<usize>,

    /// Minimum pages each worker must receive. Default: 10.
    ///
    /// Opening a document and binding pdfium costs far more than extracting
    /// a single page, so small chunks are slower than running sequentially.
    pub min_pages_per_worker: usize,

    /// Bake form fields and annotations into page content before reading. Default: false.
    pub flatten_pdf: bool,

    /// Use pdfium's loose glyph box for apostrophes. Default: true.
    ///
    /// Loose boxes span the full line height, which keeps quotes on the same
    /// line as their word. Some fonts place `'` so high that its loose box
    /// pulls in the line above; turning this off uses the tight box instead.
    pub quote_loosebox: bool,

    /// Render each page to a base64 PNG. Default: true.
    pub render_images: bool,

    /// Scale factor for the page raster. Range: 0.1–10. Default: 2.0.
    pub render_scale: f64,

    /// Maximum height ratio (span / reference) for a span to count as
    /// smaller-than-line when detecting super/subscripts. Default: 0.8.
    pub superscript_height_threshold: f64,

    /// Fraction of a sibling's height a glyph must rise (or drop) past it
    /// before it counts as raised (or lowered). Default: 0.1.
    pub line_distance_threshold: f64,

    /// Row bucket size, in points, for reading-order sorting. Default: 1.25.
    pub reading_order_tolerance: f64,

    /// Sort blocks into reading order before emitting. Default: false.
    pub sort: bool,

    /// Soft-hyphen handling in plain-text output. Default: [`HyphenMode::Join`].
    ///
    /// Structured output always keeps hyphens so span text stays aligned
    /// with span geometry.
    pub hyphens: HyphenMode,

    /// Keep per-glyph detail in structured output. Default: false.
    pub keep_chars: bool,

    /// Minimum share of a span's area that must fall inside a table cell for
    /// the span's text to be assigned to that cell. Range: (0, 1]. Default: 0.5.
    pub table_cell_threshold: f64,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Receives per-page progress events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            pages: PageSelection::default(),
            workers: None,
            min_pages_per_worker: 10,
            flatten_pdf: false,
            quote_loosebox: true,
            render_images: true,
            render_scale: 2.0,
            superscript_height_threshold: 0.8,
            line_distance_threshold: 0.1,
            reading_order_tolerance: 1.25,
            sort: false,
            hyphens: HyphenMode::default(),
            keep_chars: false,
            table_cell_threshold: 0.5,
            password: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("pages", &self.pages)
            .field("workers", &self.workers)
            .field("min_pages_per_worker", &self.min_pages_per_worker)
            .field("flatten_pdf", &self.flatten_pdf)
            .field("quote_loosebox", &self.quote_loosebox)
            .field("render_images", &self.render_images)
            .field("render_scale", &self.render_scale)
            .field("superscript_height_threshold", &self.superscript_height_threshold)
            .field("line_distance_threshold", &self.line_distance_threshold)
            .field("reading_order_tolerance", &self.reading_order_tolerance)
            .field("sort", &self.sort)
            .field("hyphens", &self.hyphens)
            .field("keep_chars", &self.keep_chars)
            .field("table_cell_threshold", &self.table_cell_threshold)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The subset of settings the per-page pipeline needs.
    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            quote_loosebox: self.quote_loosebox,
            superscript_height_threshold: self.superscript_height_threshold,
            line_distance_threshold: self.line_distance_threshold,
            render_scale: self.render_scale,
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.config.workers = Some(n.max(1));
        self
    }

    pub fn min_pages_per_worker(mut self, n: usize) -> Self {
        self.config.min_pages_per_worker = n.max(1);
        self
    }

    pub fn flatten_pdf(mut self, v: bool) -> Self {
        self.config.flatten_pdf = v;
        self
    }

    pub fn quote_loosebox(mut self, v: bool) -> Self {
        self.config.quote_loosebox = v;
        self
    }

    pub fn render_images(mut self, v: bool) -> Self {
        self.config.render_images = v;
        self
    }

    pub fn render_scale(mut self, scale: f64) -> Self {
        self.config.render_scale = scale.clamp(0.1, 10.0);
        self
    }

    pub fn superscript_height_threshold(mut self, t: f64) -> Self {
        self.config.superscript_height_threshold = t;
        self
    }

    pub fn line_distance_threshold(mut self, t: f64) -> Self {
        self.config.line_distance_threshold = t;
        self
    }

    pub fn reading_order_tolerance(mut self, t: f64) -> Self {
        self.config.reading_order_tolerance = t;
        self
    }

    pub fn sort(mut self, v: bool) -> Self {
        self.config.sort = v;
        self
    }

    pub fn hyphens(mut self, mode: HyphenMode) -> Self {
        self.config.hyphens = mode;
        self
    }

    pub fn keep_chars(mut self, v: bool) -> Self {
        self.config.keep_chars = v;
        self
    }

    pub fn table_cell_threshold(mut self, t: f64) -> Self {
        self.config.table_cell_threshold = t;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, PdfTextError> {
        let c = &self.config;
        if !(c.superscript_height_threshold > 0.0 && c.superscript_height_threshold <= 1.0) {
            return Err(PdfTextError::InvalidConfig(format!(
                "superscript_height_threshold must be in (0, 1], got {}",
                c.superscript_height_threshold
            )));
        }
        if !(c.line_distance_threshold >= 0.0 && c.line_distance_threshold.is_finite()) {
            return Err(PdfTextError::InvalidConfig(format!(
                "line_distance_threshold must be ≥ 0, got {}",
                c.line_distance_threshold
            )));
        }
        if !(c.reading_order_tolerance > 0.0 && c.reading_order_tolerance.is_finite()) {
            return Err(PdfTextError::InvalidConfig(format!(
                "reading_order_tolerance must be > 0, got {}",
                c.reading_order_tolerance
            )));
        }
        if !(c.table_cell_threshold > 0.0 && c.table_cell_threshold <= 1.0) {
            return Err(PdfTextError::InvalidConfig(format!(
                "table_cell_threshold must be in (0, 1], got {}",
                c.table_cell_threshold
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// What to do with the soft-hyphen marker pdfium emits at a line wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HyphenMode {
    /// Re-join the word split across the wrap. (default for plain text)
    #[default]
    Join,
    /// Render the marker as a literal `-` followed by a newline.
    Keep,
}

/// Specifies which pages of the PDF to extract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Extract all pages (default).
    #[default]
    All,
    /// Extract a single page (1-indexed).
    Single(usize),
    /// Extract a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Extract specific pages (1-indexed).
    Set(Vec<usize>),
    /// Inclusive 1-indexed ranges, as produced by [`PageSelection::parse`].
    /// Kept unexpanded until the page count is known.
    Ranges(Vec<(usize, usize)>),
}

static RE_RANGE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*(?:-\s*(\d+)\s*)?$").expect("valid page-range regex"));

impl PageSelection {
    /// Parse `"all"` or a comma-separated list of 1-based pages and
    /// inclusive ranges such as `"1,2-4,10"`.
    pub fn parse(input: &str) -> Result<Self, PdfTextError> {
        let invalid = |reason: String| PdfTextError::InvalidPageRange {
            input: input.to_string(),
            reason,
        };

        if input.trim().eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let mut ranges = Vec::new();
        for token in input.split(',') {
            let caps = RE_RANGE_TOKEN
                .captures(token)
                .ok_or_else(|| invalid(format!("'{}' is not a page or range", token.trim())))?;
            let start: usize = caps[1]
                .parse()
                .map_err(|_| invalid(format!("'{}' is too large", &caps[1])))?;
            let end: usize = match caps.get(2) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| invalid(format!("'{}' is too large", m.as_str())))?,
                None => start,
            };
            if start > end {
                return Err(invalid(format!("range {start}-{end} is reversed")));
            }
            ranges.push((start, end));
        }
        Ok(PageSelection::Ranges(ranges))
    }

    /// Expand the selection into a sorted, deduplicated list of 0-indexed
    /// page numbers, rejecting any page outside `1..=total_pages`.
    pub fn resolve(&self, total_pages: usize) -> Result<Vec<usize>, PdfTextError> {
        let ranges: Vec<(usize, usize)> = match self {
            PageSelection::All if total_pages == 0 => vec![],
            PageSelection::All => vec![(1, total_pages)],
            PageSelection::Single(p) => vec![(*p, *p)],
            PageSelection::Range(start, end) => vec![(*start, *end)],
            PageSelection::Set(pages) => pages.iter().map(|&p| (p, p)).collect(),
            PageSelection::Ranges(ranges) => ranges.clone(),
        };

        // Bounds are checked before any range is expanded.
        for &(start, end) in ranges.iter().filter(|(s, e)| s <= e) {
            let bad = if start == 0 {
                Some(0)
            } else if end > total_pages {
                Some(start.max(total_pages + 1))
            } else {
                None
            };
            if let Some(page) = bad {
                return Err(PdfTextError::PageOutOfRange {
                    page,
                    total: total_pages,
                });
            }
        }

        let mut indices: Vec<usize> = ranges
            .into_iter()
            .flat_map(|(start, end)| start..=end)
            .map(|p| p - 1)
            .collect();
        indices.sort_unstable();
        indices.dedup();
        Ok(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ExtractionConfig::default();
        assert_eq!(c.min_pages_per_worker, 10);
        assert_eq!(c.render_scale, 2.0);
        assert_eq!(c.superscript_height_threshold, 0.8);
        assert_eq!(c.line_distance_threshold, 0.1);
        assert_eq!(c.reading_order_tolerance, 1.25);
        assert_eq!(c.hyphens, HyphenMode::Join);
        assert!(c.quote_loosebox);
    }

    #[test]
    fn builder_clamps_workers_and_scale() {
        let c = ExtractionConfig::builder()
            .workers(0)
            .render_scale(100.0)
            .build()
            .unwrap();
        assert_eq!(c.workers, Some(1));
        assert_eq!(c.render_scale, 10.0);
    }

    #[test]
    fn builder_rejects_zero_table_threshold() {
        let err = ExtractionConfig::builder()
            .table_cell_threshold(0.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, PdfTextError::InvalidConfig(_)));
    }

    #[test]
    fn parse_range_expression() {
        let sel = PageSelection::parse("1,2-4,10").unwrap();
        assert_eq!(sel, PageSelection::Ranges(vec![(1, 1), (2, 4), (10, 10)]));
        assert_eq!(sel.resolve(10).unwrap(), vec![0, 1, 2, 3, 9]);
    }

    #[test]
    fn parse_dedups_and_sorts() {
        let sel = PageSelection::parse("5, 3-4 ,3,1").unwrap();
        assert_eq!(sel.resolve(5).unwrap(), vec![0, 2, 3, 4]);
    }

    #[test]
    fn huge_range_is_rejected_without_expanding() {
        let sel = PageSelection::parse("1-18446744073709551615").unwrap();
        let err = sel.resolve(12).unwrap_err();
        assert!(matches!(err, PdfTextError::PageOutOfRange { page: 13, total: 12 }));

        let err = PageSelection::Range(3, 4_000_000_000).resolve(12).unwrap_err();
        assert!(matches!(err, PdfTextError::PageOutOfRange { page: 13, .. }));
    }

    #[test]
    fn range_starting_past_the_end_reports_its_first_page() {
        let err = PageSelection::parse("20-30").unwrap().resolve(12).unwrap_err();
        assert!(matches!(err, PdfTextError::PageOutOfRange { page: 20, total: 12 }));
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", "1,,2", "a", "3-", "-2", "4-2", "1-2-3"] {
            assert!(
                matches!(PageSelection::parse(bad), Err(PdfTextError::InvalidPageRange { .. })),
                "expected error for {bad:?}"
            );
        }
    }

    #[test]
    fn parse_all_keyword() {
        assert_eq!(PageSelection::parse("ALL").unwrap(), PageSelection::All);
    }

    #[test]
    fn resolve_to_zero_based_indices() {
        assert_eq!(PageSelection::All.resolve(3).unwrap(), vec![0, 1, 2]);
        assert_eq!(PageSelection::Single(3).resolve(5).unwrap(), vec![2]);
        assert_eq!(PageSelection::Range(2, 4).resolve(5).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            PageSelection::Set(vec![3, 1, 3]).resolve(5).unwrap(),
            vec![0, 2]
        );
    }

    #[test]
    fn resolve_rejects_out_of_range() {
        let err = PageSelection::Set(vec![1, 11]).resolve(10).unwrap_err();
        assert!(matches!(err, PdfTextError::PageOutOfRange { page: 11, total: 10 }));
        let err = PageSelection::Single(0).resolve(10).unwrap_err();
        assert!(matches!(err, PdfTextError::PageOutOfRange { page: 0, .. }));
    }
}
