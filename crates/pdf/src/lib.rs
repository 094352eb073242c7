use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use parser::backend::{LopdfBackend, PageId, PdfBackend};

pub mod dump;
pub mod element;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod geometry;
pub mod parser;
pub mod reconstruct;
pub mod writer;

pub use element::*;
pub use geometry::BoundingBox;
pub use reconstruct::{ReconstructedLine, ReconstructionParams};
pub use writer::PageRangeWriter;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },
    #[error("PDF writing error: {0}")]
    Write(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A loaded PDF whose pages can be interpreted into element trees on demand.
///
/// Pages are interpreted lazily; nothing is cached between calls, so a
/// classifier that stops early never pays for the remaining pages.
pub struct LayoutDocument {
    backend: LopdfBackend,
    page_ids: Vec<PageId>,
}

impl LayoutDocument {
    /// Parse PDF bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let backend = LopdfBackend::load_bytes(bytes)?;
        let page_ids = backend.pages().into_values().collect();
        Ok(LayoutDocument { backend, page_ids })
    }

    /// Read and parse the PDF at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Interpret the page at 0-based `index`.
    pub fn page(&self, index: usize) -> Result<LayoutPage, PdfError> {
        let page_id = *self.page_ids.get(index).ok_or(PdfError::PageOutOfRange {
            index,
            count: self.page_ids.len(),
        })?;
        parser::layout::interpret_page(&self.backend, page_id, index)
    }

    /// Reconstructed text of the page at 0-based `index`.
    pub fn page_text(&self, index: usize, params: ReconstructionParams) -> Result<String, PdfError> {
        Ok(reconstruct::page_text(&self.page(index)?, params))
    }

    /// Entries of the document Info dictionary.
    pub fn metadata(&self) -> BTreeMap<String, String> {
        self.backend.metadata()
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &lopdf::Document {
        self.backend.raw_doc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, FixturePage};

    #[test]
    fn test_empty_bytes_fail_to_parse() {
        assert!(matches!(
            LayoutDocument::from_bytes(&[]),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_truncated_document_fails_to_parse() {
        let bytes = fixtures::build(&fixtures::text_pages(&["a", "b"]));
        assert!(LayoutDocument::from_bytes(&bytes[..bytes.len() / 3]).is_err());
    }

    #[test]
    fn test_pages_are_zero_based() {
        let bytes = fixtures::build(&fixtures::text_pages(&["first", "second"]));
        let doc = LayoutDocument::from_bytes(&bytes).unwrap();
        assert_eq!(doc.page_count(), 2);
        let params = ReconstructionParams::default();
        assert_eq!(doc.page_text(0, params).unwrap(), "first");
        assert_eq!(doc.page_text(1, params).unwrap(), "second");
        assert_eq!(doc.page(1).unwrap().index, 1);
        assert!(matches!(
            doc.page(2),
            Err(PdfError::PageOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_whole_pipeline_on_real_pdf() {
        let page = FixturePage::default()
            .with_text(38.685, 61.24 + 0.21 * 10.0, 10.0, "TRITA-EECS-EX-2023:1")
            .with_line(19.427, 33.375, 559.0, 33.375)
            .with_curve(-1.0, 0.0, 600.0, 105.0);
        let doc = LayoutDocument::from_bytes(&fixtures::build(&[page])).unwrap();
        let layout = doc.page(0).unwrap();

        let kinds: Vec<&str> = layout.elements.iter().map(|e| e.kind_name()).collect();
        assert_eq!(kinds, vec!["LTTextBox", "LTLine", "LTCurve"]);

        let text_box = layout.elements[0].bbox().unwrap();
        assert!((text_box.x1 - 38.685).abs() < 0.01);
        assert!((text_box.y1 - 61.24).abs() < 0.01);

        assert_eq!(doc.metadata().get("Title").map(String::as_str), Some("Fixture"));
    }

    #[test]
    fn test_words_placed_by_real_width_keep_their_space() {
        // "Illinois" in 12pt Helvetica is 33.336pt wide; the next word starts
        // one space (3.336pt) later.
        let page = FixturePage::default()
            .with_text(72.0, 700.0, 12.0, "Illinois")
            .with_text(108.68, 700.0, 12.0, "Institute");
        let doc = LayoutDocument::from_bytes(&fixtures::build(&[page])).unwrap();
        let params = ReconstructionParams::default();
        assert_eq!(doc.page_text(0, params).unwrap(), "Illinois Institute");

        let layout = doc.page(0).unwrap();
        let first = layout.elements[0].bbox().unwrap();
        assert!((first.x2 - 105.336).abs() < 0.01);
    }
}
