//! Front matter selection.
//!
//! Walks the first pages of a thesis and decides which of them belong to
//! the table of contents and the lists that follow it.  The walk keeps
//! three flags: whether a table of contents was seen, whether the section
//! ended, and whether the page that ended it is already body text.
//! Document overrides are consulted before the general markers.

use coverscan_pdf::reconstruct::page_text;
use serde::Serialize;

use crate::config::Markers;
use crate::context::AnalysisContext;
use crate::error::AnalysisError;
use crate::overrides::{OverrideRule, Transition};
use crate::source::PageSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontMatterOptions {
    /// Leave the cover page out of the selection.
    pub anonymous: bool,
    /// Replaces the configured ceiling; a document override still wins.
    pub page_ceiling: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The document is listed as ignored.
    Ignored,
    /// A reference or end-of-contents marker closed the section.
    References,
    /// The body started; the page that showed it is not retained.
    BodyReached,
    /// The page ceiling was reached.
    Ceiling,
    /// The document ended before the ceiling.
    EndOfDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrontMatterSelection {
    /// 0-based page indices, ascending.
    pub pages: Vec<usize>,
    pub stop: StopReason,
    pub contents_found: bool,
    pub references_found: bool,
}

#[derive(Debug, Default)]
struct ScanState {
    contents_found: bool,
    references_found: bool,
    skip_last_page: bool,
}

impl ScanState {
    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Contents => self.contents_found = true,
            Transition::References => self.references_found = true,
            Transition::ReferencesExclusive => {
                self.references_found = true;
                self.skip_last_page = true;
            }
        }
    }
}

fn contains_any(text: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| text.contains(m.as_str()))
}

fn starts_with_any(text: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| text.starts_with(m.as_str()))
}

/// Pages carrying printer's or defence notes.
pub fn is_skipped_page(index: usize, text: &str, markers: &Markers) -> bool {
    index > 0 && contains_any(text, &markers.skip_pages)
}

fn apply_markers(state: &mut ScanState, index: usize, text: &str, markers: &Markers, rules: &[OverrideRule]) {
    for rule in rules.iter().filter(|r| r.applies(index, text)) {
        log::debug!("override rule fired on page {}: {:?}", index, rule.transition);
        state.apply(rule.transition);
    }

    if index > 1 && contains_any(text, &markers.contents) {
        state.apply(Transition::Contents);
    }
    if index > 1 && contains_any(text, &markers.references) {
        state.apply(Transition::References);
    }
    if index > 2 && contains_any(text, &markers.bibliography) {
        state.apply(Transition::References);
    }
    if index > 0 && starts_with_any(text, &markers.chapter_start) {
        state.apply(Transition::ReferencesExclusive);
    }
    if state.contents_found && contains_any(text, &markers.list_of) {
        state.apply(Transition::ReferencesExclusive);
    }
}

/// Select the front matter pages of one document.
///
/// Page 0 is always retained unless `options.anonymous` is set.  Other pages
/// are retained from the table of contents on, up to and including the
/// page that ends the section (excluding it when it is body text).  When
/// the scan runs out of pages without seeing a table of contents, every
/// scanned page with text is selected instead.
pub fn select_front_matter<S>(
    source: &S,
    ctx: &AnalysisContext<'_>,
    options: &FrontMatterOptions,
) -> Result<FrontMatterSelection, AnalysisError>
where
    S: PageSource + ?Sized,
{
    let config = ctx.config;
    let document = config.overrides.for_document(&ctx.document_id);

    if document.ignore {
        log::debug!("{}: ignored by override", ctx.document_id);
        return Ok(FrontMatterSelection {
            pages: Vec::new(),
            stop: StopReason::Ignored,
            contents_found: false,
            references_found: false,
        });
    }

    let ceiling = document
        .page_ceiling
        .or(options.page_ceiling)
        .unwrap_or(config.limits.page_ceiling);
    let limit = source.page_count().min(ceiling);
    log::debug!("{}: scanning {} of {} pages", ctx.document_id, limit, source.page_count());

    let mut state = ScanState::default();
    let mut pages = Vec::new();
    let mut candidates = Vec::new();
    let mut stop = if limit == ceiling {
        StopReason::Ceiling
    } else {
        StopReason::EndOfDocument
    };

    for index in 0..limit {
        if index == 0 {
            if !options.anonymous {
                pages.push(0);
                candidates.push(0);
            }
            continue;
        }

        let page = source.page(index)?;
        let text = page_text(&page, config.reconstruction);
        if is_skipped_page(index, &text, &config.markers) {
            log::debug!("{}: skipping page {}", ctx.document_id, index);
            continue;
        }
        let has_text = !text.trim().is_empty();
        if has_text {
            candidates.push(index);
        }

        apply_markers(&mut state, index, &text, &config.markers, &document.rules);

        if state.contents_found && has_text && !state.skip_last_page {
            pages.push(index);
        }

        if state.references_found {
            stop = if state.skip_last_page {
                StopReason::BodyReached
            } else {
                StopReason::References
            };
            log::debug!("{}: stopping at page {} ({:?})", ctx.document_id, index, stop);
            break;
        }
    }

    if !state.contents_found && matches!(stop, StopReason::Ceiling | StopReason::EndOfDocument) {
        log::debug!("{}: no table of contents, keeping every scanned page", ctx.document_id);
        pages = candidates;
    }

    Ok(FrontMatterSelection {
        pages,
        stop,
        contents_found: state.contents_found,
        references_found: state.references_found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::overrides::{OverrideEntry, OverrideTable};
    use coverscan_pdf::{BoundingBox, LayoutPage, PageElement, TextLineElement};

    fn page(index: usize, lines: &[&str]) -> LayoutPage {
        LayoutPage {
            index,
            width: 595.0,
            height: 842.0,
            elements: lines
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    let y = 700.0 - i as f32 * 20.0;
                    PageElement::TextLine(TextLineElement {
                        bbox: BoundingBox::new(72.0, y, 300.0, y + 12.0),
                        font_size: 12.0,
                        text: text.to_string(),
                    })
                })
                .collect(),
        }
    }

    fn document(pages: &[&[&str]]) -> Vec<LayoutPage> {
        pages.iter().enumerate().map(|(i, lines)| page(i, lines)).collect()
    }

    fn select(pages: &[LayoutPage], id: &str, options: FrontMatterOptions) -> FrontMatterSelection {
        let config = Config::default();
        select_with(&config, pages, id, options)
    }

    fn select_with(
        config: &Config,
        pages: &[LayoutPage],
        id: &str,
        options: FrontMatterOptions,
    ) -> FrontMatterSelection {
        let ctx = AnalysisContext::new(config, id);
        select_front_matter(pages, &ctx, &options).unwrap()
    }

    // ==================== General markers ====================

    #[test]
    fn test_contents_through_references() {
        let pages = document(&[
            &["Cover"],
            &["Abstract"],
            &["Sammanfattning"],
            &["Contents", "1 Introduction ... 1"],
            &["List of Figures"],
            &["References ... 80"],
            &["1 Introduction"],
        ]);
        let selection = select(&pages, "thesis.pdf", FrontMatterOptions::default());
        assert_eq!(selection.pages, vec![0, 3, 4, 5]);
        assert_eq!(selection.stop, StopReason::References);
        assert!(selection.contents_found);
        assert!(selection.references_found);
    }

    #[test]
    fn test_chapter_start_is_not_retained() {
        let pages = document(&[
            &["Cover"],
            &["Abstract"],
            &["Table of Contents"],
            &["Acronyms"],
            &["Chapter 1", "Introduction"],
            &["More"],
        ]);
        let selection = select(&pages, "thesis.pdf", FrontMatterOptions::default());
        assert_eq!(selection.pages, vec![0, 2, 3]);
        assert_eq!(selection.stop, StopReason::BodyReached);
    }

    #[test]
    fn test_list_of_after_contents_ends_scan() {
        let pages = document(&[
            &["Cover"],
            &["Abstract"],
            &["CONTENTS"],
            &["LIST OF FIGURES"],
        ]);
        let selection = select(&pages, "thesis.pdf", FrontMatterOptions::default());
        assert_eq!(selection.pages, vec![0, 2]);
        assert_eq!(selection.stop, StopReason::BodyReached);
    }

    #[test]
    fn test_early_markers_are_ignored() {
        // A contents marker on page 1 and a bibliography on page 2 are too
        // early to count.
        let pages = document(&[
            &["Cover"],
            &["Contents"],
            &["Bibliography"],
            &["Innehållsförteckning"],
            &["Referenser"],
        ]);
        let selection = select(&pages, "thesis.pdf", FrontMatterOptions::default());
        assert_eq!(selection.pages, vec![0, 3, 4]);
        assert_eq!(selection.stop, StopReason::References);
    }

    #[test]
    fn test_skipped_and_empty_pages() {
        let pages = document(&[
            &["Cover"],
            &["Abstract"],
            &["Contents"],
            &["Printed by Universitetsservice US-AB"],
            &[],
            &["Acronyms"],
            &["References"],
        ]);
        let selection = select(&pages, "thesis.pdf", FrontMatterOptions::default());
        assert_eq!(selection.pages, vec![0, 2, 5, 6]);
    }

    #[test]
    fn test_anonymous_drops_cover() {
        let pages = document(&[&["Cover"], &["Abstract"], &["Contents"], &["References"]]);
        let options = FrontMatterOptions {
            anonymous: true,
            ..FrontMatterOptions::default()
        };
        let selection = select(&pages, "thesis.pdf", options);
        assert_eq!(selection.pages, vec![2, 3]);
    }

    // ==================== Bounds ====================

    #[test]
    fn test_ceiling_without_contents_keeps_scanned_pages() {
        let texts: Vec<String> = (0..40).map(|i| format!("Page {}", i)).collect();
        let pages: Vec<LayoutPage> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| page(i, &[t.as_str()]))
            .collect();
        let selection = select(&pages, "long.pdf", FrontMatterOptions::default());
        assert_eq!(selection.pages, (0..25).collect::<Vec<_>>());
        assert_eq!(selection.stop, StopReason::Ceiling);
        assert!(!selection.contents_found);
    }

    #[test]
    fn test_short_document_ends_scan() {
        let pages = document(&[&["Cover"], &["Abstract"], &["Contents"], &["Acronyms"]]);
        let selection = select(&pages, "short.pdf", FrontMatterOptions::default());
        assert_eq!(selection.pages, vec![0, 2, 3]);
        assert_eq!(selection.stop, StopReason::EndOfDocument);
    }

    #[test]
    fn test_ceiling_option() {
        let pages = document(&[&["Cover"], &["Abstract"], &["Foreword"], &["Contents"]]);
        let options = FrontMatterOptions {
            page_ceiling: Some(3),
            ..FrontMatterOptions::default()
        };
        let selection = select(&pages, "thesis.pdf", options);
        assert_eq!(selection.pages, vec![0, 1, 2]);
        assert_eq!(selection.stop, StopReason::Ceiling);
    }

    // ==================== Document overrides ====================

    #[test]
    fn test_ignored_document() {
        let pages = document(&[&["Cover"], &["Abstract"]]);
        let config = Config::default().with_builtin_overrides().unwrap();
        let selection = select_with(&config, &pages, "1513609-FULLTEXT03.pdf", FrontMatterOptions::default());
        assert_eq!(selection.stop, StopReason::Ignored);
        assert!(selection.pages.is_empty());
    }

    #[test]
    fn test_override_rules() {
        let pages = document(&[
            &["Cover"],
            &["Abstract"],
            &["Preamble"],
            &["Table of content"],
            &["Referenc es"],
            &["Body"],
        ]);
        let mut config = Config::default();
        config.overrides = OverrideTable::from_toml(
            r#"
            [[overrides]]
            document = "4242"
            [[overrides.rules]]
            min_page = 2
            contains = "Table of content"
            transition = "contents"
            [[overrides.rules]]
            page = 4
            contains = "Referenc es"
            transition = "references"
            "#,
        )
        .unwrap();

        let selection = select_with(&config, &pages, "4242-FULLTEXT01.pdf", FrontMatterOptions::default());
        assert_eq!(selection.pages, vec![0, 3, 4]);
        assert_eq!(selection.stop, StopReason::References);

        // Other documents only see the general markers.
        let other = select_with(&config, &pages, "9999-FULLTEXT01.pdf", FrontMatterOptions::default());
        assert!(!other.contents_found);
        assert_eq!(other.stop, StopReason::EndOfDocument);
    }

    #[test]
    fn test_override_ceiling_wins() {
        let texts: Vec<String> = (0..40).map(|i| format!("Page {}", i)).collect();
        let pages: Vec<LayoutPage> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| page(i, &[t.as_str()]))
            .collect();
        let mut config = Config::default();
        config.overrides = OverrideTable::new(vec![OverrideEntry {
            document: "1713829".to_string(),
            ignore: false,
            page_ceiling: Some(33),
            note: None,
            rules: Vec::new(),
        }]);
        let options = FrontMatterOptions {
            page_ceiling: Some(10),
            ..FrontMatterOptions::default()
        };
        let selection = select_with(&config, &pages, "1713829-FULLTEXT01.pdf", options);
        assert_eq!(selection.pages.len(), 33);
    }
}
