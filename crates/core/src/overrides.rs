//! Per-document exceptions for the front-matter classifier.
//!
//! A small share of real documents use non-standard heading wording, have
//! their table of contents further in than the page ceiling, or consist of
//! images only.  Those documents are listed here, keyed by an identifier
//! that is matched as a substring of the file name, instead of widening the
//! general markers.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

const BUILTIN: &str = include_str!("../data/overrides.toml");

/// What a matching rule does to the classifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// The table of contents starts on this page.
    Contents,
    /// The front matter ends with this page.
    References,
    /// The front matter ends before this page.
    ReferencesExclusive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRule {
    /// Only on this 0-based page.
    #[serde(default)]
    pub page: Option<usize>,
    /// Only on this page or later.
    #[serde(default)]
    pub min_page: Option<usize>,
    #[serde(default)]
    pub contains: Option<String>,
    #[serde(default)]
    pub starts_with: Option<String>,
    pub transition: Transition,
}

impl OverrideRule {
    /// A rule without text conditions fires on its page regardless of the
    /// page's text.
    pub fn applies(&self, page: usize, text: &str) -> bool {
        self.page.map_or(true, |p| p == page)
            && self.min_page.map_or(true, |m| page >= m)
            && self.contains.as_deref().map_or(true, |c| text.contains(c))
            && self
                .starts_with
                .as_deref()
                .map_or(true, |s| text.starts_with(s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub document: String,
    #[serde(default)]
    pub ignore: bool,
    #[serde(default)]
    pub page_ceiling: Option<usize>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub rules: Vec<OverrideRule>,
}

/// The overrides of every entry matching one document, combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOverrides {
    pub ignore: bool,
    pub page_ceiling: Option<usize>,
    pub rules: Vec<OverrideRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTable {
    entries: Vec<OverrideEntry>,
}

#[derive(Deserialize)]
struct OverrideFile {
    #[serde(default)]
    overrides: OverrideTable,
}

impl OverrideTable {
    pub fn new(entries: Vec<OverrideEntry>) -> Self {
        OverrideTable { entries }
    }

    /// The table compiled into the binary.
    pub fn builtin() -> Result<Self, AnalysisError> {
        Self::from_toml(BUILTIN)
    }

    /// Parse a document with an `[[overrides]]` array.
    pub fn from_toml(input: &str) -> Result<Self, AnalysisError> {
        let file: OverrideFile = toml::from_str(input)?;
        Ok(file.overrides)
    }

    pub fn entries(&self) -> &[OverrideEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `other`'s entries after this table's.
    pub fn extend(&mut self, other: OverrideTable) {
        self.entries.extend(other.entries);
    }

    /// Combine every entry whose identifier occurs in `document_id`.  The
    /// largest page ceiling wins.
    pub fn for_document(&self, document_id: &str) -> DocumentOverrides {
        let mut out = DocumentOverrides::default();
        for entry in self
            .entries
            .iter()
            .filter(|e| !e.document.is_empty() && document_id.contains(&e.document))
        {
            log::debug!("override '{}' applies to {}", entry.document, document_id);
            out.ignore |= entry.ignore;
            out.page_ceiling = match (out.page_ceiling, entry.page_ceiling) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
            out.rules.extend(entry.rules.iter().cloned());
        }
        out
    }
}
