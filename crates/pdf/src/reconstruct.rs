//! Line and word reconstruction from loose glyphs.
//!
//! Glyphs are consumed in emission order.  A glyph whose bottom edge is
//! within `y_tolerance` of the previous glyph's continues the open line,
//! otherwise the line is flushed and a new one starts.  Within a line a
//! single synthetic space is inserted when the horizontal gap to the
//! previous glyph exceeds `space_ratio` times that glyph's width.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::element::{Glyph, LayoutPage, PageElement, TextLineElement};
use crate::geometry::{near, BoundingBox};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionParams {
    /// Maximum difference between glyph bottoms on the same line.
    pub y_tolerance: f32,
    /// Fraction of the previous glyph's width a gap must exceed to count as
    /// a word break.
    pub space_ratio: f32,
}

impl Default for ReconstructionParams {
    fn default() -> Self {
        ReconstructionParams {
            y_tolerance: 0.1,
            space_ratio: 0.2,
        }
    }
}

/// One logical line of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconstructedLine {
    pub text: String,
    pub bbox: BoundingBox,
    /// Largest glyph size on the line.
    pub font_size: f32,
}

#[derive(Debug)]
struct OpenLine {
    text: String,
    bbox: BoundingBox,
    font_size: f32,
    last_y: f32,
    last_x_end: f32,
    last_width: f32,
}

impl OpenLine {
    fn start(glyph: &Glyph) -> Self {
        OpenLine {
            text: glyph.text.clone(),
            bbox: glyph.bbox,
            font_size: glyph.font_size,
            last_y: glyph.bbox.y1,
            last_x_end: glyph.bbox.x2,
            last_width: glyph.bbox.width(),
        }
    }

    fn into_line(self) -> ReconstructedLine {
        ReconstructedLine {
            text: self.text,
            bbox: self.bbox,
            font_size: self.font_size,
        }
    }
}

fn is_blank(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_whitespace)
}

/// Incremental reconstructor; feed glyphs and pre-grouped lines in document
/// order, then call [`LineReconstructor::finish`].
#[derive(Debug)]
pub struct LineReconstructor {
    params: ReconstructionParams,
    lines: Vec<ReconstructedLine>,
    open: Option<OpenLine>,
}

impl LineReconstructor {
    pub fn new(params: ReconstructionParams) -> Self {
        LineReconstructor {
            params,
            lines: Vec::new(),
            open: None,
        }
    }

    pub fn push_glyph(&mut self, glyph: &Glyph) {
        let same_line = self
            .open
            .as_ref()
            .is_some_and(|line| near(glyph.bbox.y1, line.last_y, self.params.y_tolerance));

        if !same_line {
            self.flush();
            self.open = Some(OpenLine::start(glyph));
            return;
        }

        let space_ratio = self.params.space_ratio;
        if let Some(line) = self.open.as_mut() {
            let glyph_blank = is_blank(&glyph.text);
            let ends_blank = line.text.ends_with(char::is_whitespace);
            if glyph_blank && ends_blank {
                return;
            }
            let gap_threshold = line.last_x_end + space_ratio * line.last_width;
            if glyph.bbox.x1 > gap_threshold && !glyph_blank && !ends_blank {
                line.text.push(' ');
            }
            line.text.push_str(&glyph.text);
            line.bbox = line.bbox.union(&glyph.bbox);
            line.font_size = line.font_size.max(glyph.font_size);
            line.last_y = glyph.bbox.y1;
            line.last_x_end = glyph.bbox.x2;
            line.last_width = glyph.bbox.width();
        }
    }

    /// A line the producer already grouped: closes the open line and is
    /// emitted unchanged.
    pub fn push_line(&mut self, line: &TextLineElement) {
        self.flush();
        self.lines.push(ReconstructedLine {
            text: line.text.clone(),
            bbox: line.bbox,
            font_size: line.font_size,
        });
    }

    fn flush(&mut self) {
        if let Some(open) = self.open.take() {
            self.lines.push(open.into_line());
        }
    }

    pub fn finish(mut self) -> Vec<ReconstructedLine> {
        self.flush();
        self.lines
    }
}

/// Reconstruct lines from a glyph sequence in one call.
pub fn reconstruct_lines<'a, I>(glyphs: I, params: ReconstructionParams) -> Vec<ReconstructedLine>
where
    I: IntoIterator<Item = &'a Glyph>,
{
    let mut rec = LineReconstructor::new(params);
    for glyph in glyphs {
        rec.push_glyph(glyph);
    }
    rec.finish()
}

fn feed(element: &PageElement, rec: &mut LineReconstructor) {
    match element {
        PageElement::Character(glyph) => rec.push_glyph(glyph),
        PageElement::TextLine(line) => rec.push_line(line),
        other => {
            for child in other.children() {
                feed(child, rec);
            }
        }
    }
}

/// All text lines of a page, in document order.
pub fn page_lines(page: &LayoutPage, params: ReconstructionParams) -> Vec<ReconstructedLine> {
    let mut rec = LineReconstructor::new(params);
    for element in &page.elements {
        feed(element, &mut rec);
    }
    rec.finish()
}

/// The page's text as NFKC-normalized lines joined with `\n`.  Ligature
/// glyphs such as `ﬁ` come out as their letters.
pub fn page_text(page: &LayoutPage, params: ReconstructionParams) -> String {
    page_lines(page, params)
        .iter()
        .map(|line| line.text.nfkc().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
