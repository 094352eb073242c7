use crate::config::Config;
use crate::evidence::{DocumentClassification, ErrorTag, MatchOutcome};

/// Per-document analysis state.
///
/// Created for one file, threaded through every classifier call, and
/// dropped (or turned into its [`DocumentClassification`]) when the file is
/// done.  Nothing in it outlives the document.
#[derive(Debug)]
pub struct AnalysisContext<'a> {
    pub config: &'a Config,
    /// Usually the PDF file name; used to look up document overrides.
    pub document_id: String,
    pub testing: bool,
    classification: DocumentClassification,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(config: &'a Config, document_id: impl Into<String>) -> Self {
        AnalysisContext {
            config,
            document_id: document_id.into(),
            testing: false,
            classification: DocumentClassification::default(),
        }
    }

    pub fn with_testing(mut self, testing: bool) -> Self {
        self.testing = testing;
        self
    }

    /// Fold a page's match outcome into the document record.
    pub fn record(&mut self, page_index: usize, outcome: &MatchOutcome) {
        for evidence in &outcome.evidence {
            if self.classification.evidence.insert(*evidence) {
                log::debug!("{}: page {}: evidence '{}'", self.document_id, page_index, evidence);
            }
        }
        for error in &outcome.errors {
            self.add_error(page_index, error.clone());
        }
    }

    pub fn add_error(&mut self, page_index: usize, error: ErrorTag) {
        log::debug!("{}: page {}: error '{}'", self.document_id, page_index, error);
        self.classification.errors.insert(error);
    }

    pub fn classification(&self) -> &DocumentClassification {
        &self.classification
    }

    pub fn classification_mut(&mut self) -> &mut DocumentClassification {
        &mut self.classification
    }

    pub fn into_classification(self) -> DocumentClassification {
        self.classification
    }
}
