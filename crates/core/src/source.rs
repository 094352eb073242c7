use coverscan_pdf::{LayoutDocument, LayoutPage, PdfError};

/// Anything the classifiers can pull interpreted pages from.
///
/// Pages are requested one at a time and in the order the classifier
/// needs them, so a classifier that stops early never interprets the rest.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// The page at 0-based `index`.
    fn page(&self, index: usize) -> Result<LayoutPage, PdfError>;
}

impl PageSource for LayoutDocument {
    fn page_count(&self) -> usize {
        LayoutDocument::page_count(self)
    }

    fn page(&self, index: usize) -> Result<LayoutPage, PdfError> {
        LayoutDocument::page(self, index)
    }
}

impl PageSource for [LayoutPage] {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page(&self, index: usize) -> Result<LayoutPage, PdfError> {
        self.get(index).cloned().ok_or(PdfError::PageOutOfRange {
            index,
            count: self.len(),
        })
    }
}

impl PageSource for Vec<LayoutPage> {
    fn page_count(&self) -> usize {
        self.as_slice().page_count()
    }

    fn page(&self, index: usize) -> Result<LayoutPage, PdfError> {
        self.as_slice().page(index)
    }
}
