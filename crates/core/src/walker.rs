//! Visitor over a page's element tree.
//!
//! Characters and pre-grouped lines go to the line reconstructor,
//! graphic elements to the template matcher.  Containers are entered in
//! document order; figures are matched themselves (logos are often wrapped
//! in a form XObject) and then entered.  Annotations and unsupported
//! elements are logged and skipped.

use coverscan_pdf::reconstruct::LineReconstructor;
use coverscan_pdf::{BoundingBox, LayoutPage, PageElement, ReconstructedLine, ReconstructionParams};
use serde::Serialize;

use crate::evidence::MatchOutcome;
use crate::matcher::{match_element, match_line};
use crate::templates::TemplateSet;

/// Accumulator for one page.
#[derive(Debug)]
pub struct PageScan<'t> {
    page_index: usize,
    templates: &'t TemplateSet,
    reconstructor: LineReconstructor,
    images: Vec<BoundingBox>,
    outcome: MatchOutcome,
}

/// What a page scan found.
#[derive(Debug, Clone, Serialize)]
pub struct PageEvidence {
    pub page_index: usize,
    pub lines: Vec<ReconstructedLine>,
    /// Boxes of every image, including those inside figures.
    pub images: Vec<BoundingBox>,
    pub outcome: MatchOutcome,
}

impl<'t> PageScan<'t> {
    pub fn new(page_index: usize, templates: &'t TemplateSet, params: ReconstructionParams) -> Self {
        PageScan {
            page_index,
            templates,
            reconstructor: LineReconstructor::new(params),
            images: Vec::new(),
            outcome: MatchOutcome::default(),
        }
    }

    fn match_graphic(&mut self, element: &PageElement) {
        let outcome = match_element(element, self.templates);
        if !outcome.is_empty() {
            log::debug!(
                "page {}: {} {:?} matched {:?}",
                self.page_index,
                element.kind_name(),
                element.bbox(),
                outcome.evidence
            );
        }
        self.outcome.merge(outcome);
    }

    /// Match the reconstructed lines and return everything found.
    pub fn finish(self) -> PageEvidence {
        let lines = self.reconstructor.finish();
        let mut outcome = self.outcome;
        for line in &lines {
            log::debug!("page {}: line {:?} at {:?}", self.page_index, line.text, line.bbox);
            outcome.merge(match_line(line, self.templates));
        }
        PageEvidence {
            page_index: self.page_index,
            lines,
            images: self.images,
            outcome,
        }
    }
}

/// Visit `element` and its descendants.
pub fn walk(element: &PageElement, page_index: usize, scan: &mut PageScan<'_>) {
    log::trace!("page {}: visit {} {:?}", page_index, element.kind_name(), element.bbox());
    match element {
        PageElement::TextContainer { children, .. } => {
            for child in children {
                walk(child, page_index, scan);
            }
        }
        PageElement::Figure { children, .. } => {
            scan.match_graphic(element);
            for child in children {
                walk(child, page_index, scan);
            }
        }
        PageElement::Character(glyph) => scan.reconstructor.push_glyph(glyph),
        PageElement::TextLine(line) => scan.reconstructor.push_line(line),
        PageElement::Image(image) => {
            scan.images.push(image.bbox);
            scan.match_graphic(element);
        }
        PageElement::Line(_) | PageElement::Curve(_) | PageElement::Rectangle(_) => {
            scan.match_graphic(element);
        }
        PageElement::Annotation { subtype, .. } => {
            log::debug!("page {}: skipping {} annotation", page_index, subtype);
        }
        PageElement::Unsupported { kind } => {
            log::debug!("page {}: skipping unsupported element '{}'", page_index, kind);
        }
    }
}

/// Walk every element of `page` and finish the scan.
pub fn scan_page(page: &LayoutPage, templates: &TemplateSet, params: ReconstructionParams) -> PageEvidence {
    let mut scan = PageScan::new(page.index, templates, params);
    for element in &page.elements {
        walk(element, page.index, &mut scan);
    }
    scan.finish()
}
