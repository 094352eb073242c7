//! Back cover search.
//!
//! The back cover is the last or nearly last page, so pages are scanned
//! from the end.  A page is the back cover when it carries a TRITA number,
//! the `www.kth.se` URL and one of the two generations' bottom graphics.
//! The scan stops at the first such page.

use crate::context::AnalysisContext;
use crate::error::AnalysisError;
use crate::evidence::{CoverVersion, Evidence, MatchOutcome};
use crate::source::PageSource;
use crate::walker::scan_page;

/// The cover generation a page's outcome proves, if it is a back cover.
pub fn back_cover_version(outcome: &MatchOutcome) -> Option<CoverVersion> {
    if !(outcome.has(Evidence::TritaNumber) && outcome.has(Evidence::WwwUrl)) {
        return None;
    }
    if outcome.has(Evidence::NewBackCoverLine) {
        Some(CoverVersion::New)
    } else if outcome.has(Evidence::OldBackCoverImage) {
        Some(CoverVersion::Old)
    } else {
        None
    }
}

/// Scan `source` from its last page towards the first and return the
/// 0-based index of the back cover, or `None` when no page qualifies.
///
/// On success the context records the page and sets the cover version.
pub fn find_back_cover<S>(source: &S, ctx: &mut AnalysisContext<'_>) -> Result<Option<usize>, AnalysisError>
where
    S: PageSource + ?Sized,
{
    let templates = ctx.config.back_cover_templates();
    let params = ctx.config.reconstruction;

    for index in (0..source.page_count()).rev() {
        log::debug!("{}: back cover scan, page {}", ctx.document_id, index);
        let page = source.page(index)?;
        let evidence = scan_page(&page, &templates, params);
        ctx.record(index, &evidence.outcome);

        if let Some(version) = back_cover_version(&evidence.outcome) {
            log::debug!("{}: {} back cover on page {}", ctx.document_id, version, index);
            let classification = ctx.classification_mut();
            classification.found_back_cover_page = Some(index);
            classification.cover_version = version;
            return Ok(Some(index));
        }
    }

    log::debug!("{}: no back cover found", ctx.document_id);
    Ok(None)
}
