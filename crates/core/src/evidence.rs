//! Evidence, error tags and the per-document classification record.
//!
//! Evidence supports a positive conclusion ("this is a new cover"), an
//! [`ErrorTag`] records a detected defect regardless of the conclusion.
//! Both only ever grow while a document is scanned.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Positive observations made while scanning pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    PossibleKthLogo,
    KthLogotype,
    NewCoverBottomRule,
    OldCoverBottomImage,
    CoverPlaceEnglish,
    CoverPlaceSwedish,
    CoverSubjectArea,
    CoverLevelAndCredits,
    CoverTitle,
    CoverAuthor,
    TritaNumber,
    WwwUrl,
    NewBackCoverLine,
    OldBackCoverImage,
    ForDivaMarker,
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Evidence::PossibleKthLogo => "possible KTH logo",
            Evidence::KthLogotype => "possible KTH logotype",
            Evidence::NewCoverBottomRule => "new cover bottom rule",
            Evidence::OldCoverBottomImage => "old cover bottom image",
            Evidence::CoverPlaceEnglish => "cover place English",
            Evidence::CoverPlaceSwedish => "cover place Swedish",
            Evidence::CoverSubjectArea => "cover subject area",
            Evidence::CoverLevelAndCredits => "cover level and credits",
            Evidence::CoverTitle => "cover title",
            Evidence::CoverAuthor => "cover author",
            Evidence::TritaNumber => "found_TRITA_number",
            Evidence::WwwUrl => "found_www_url",
            Evidence::NewBackCoverLine => "found_new_back_cover_line",
            Evidence::OldBackCoverImage => "found_old_back_cover_image",
            Evidence::ForDivaMarker => "For DIVA marker",
        };
        f.write_str(tag)
    }
}

/// A free-text description of a detected defect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorTag(pub String);

impl ErrorTag {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorTag(message.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ErrorTag {
    fn from(s: &str) -> Self {
        ErrorTag(s.to_string())
    }
}

impl From<String> for ErrorTag {
    fn from(s: String) -> Self {
        ErrorTag(s)
    }
}

/// Which generation of the cover template an anchor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    Old,
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverVersion {
    Old,
    New,
    #[default]
    None,
}

impl CoverVersion {
    /// New wins over Old when anchors of both generations fired.
    pub fn from_generations(generations: &BTreeSet<Generation>) -> Self {
        if generations.contains(&Generation::New) {
            CoverVersion::New
        } else if generations.contains(&Generation::Old) {
            CoverVersion::Old
        } else {
            CoverVersion::None
        }
    }
}

impl fmt::Display for CoverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverVersion::Old => f.write_str("Old"),
            CoverVersion::New => f.write_str("New"),
            CoverVersion::None => f.write_str("None"),
        }
    }
}

/// Result of soft template matching: what matched, what was slightly off,
/// and which cover generations the matched anchors belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    pub evidence: BTreeSet<Evidence>,
    pub errors: BTreeSet<ErrorTag>,
    pub generations: BTreeSet<Generation>,
}

impl MatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.evidence.is_empty() && self.errors.is_empty() && self.generations.is_empty()
    }

    pub fn has(&self, evidence: Evidence) -> bool {
        self.evidence.contains(&evidence)
    }

    pub fn merge(&mut self, other: MatchOutcome) {
        self.evidence.extend(other.evidence);
        self.errors.extend(other.errors);
        self.generations.extend(other.generations);
    }
}

/// Everything learned about one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentClassification {
    pub cover_version: CoverVersion,
    /// 0-based page index.
    pub found_for_diva_page: Option<usize>,
    /// 0-based page index.
    pub found_back_cover_page: Option<usize>,
    pub evidence: BTreeSet<Evidence>,
    pub errors: BTreeSet<ErrorTag>,
}

/// Page index as printed by the CLI: 0-based, or -1 when inconclusive.
pub fn page_or_sentinel(page: Option<usize>) -> i64 {
    page.map_or(-1, |p| p as i64)
}
