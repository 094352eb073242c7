//! Front cover check: which template generation the cover follows and
//! which content defects it shows.  Only page 0 is looked at.

use crate::classify::cover_rules::check_cover;
use crate::context::AnalysisContext;
use crate::error::AnalysisError;
use crate::evidence::CoverVersion;
use crate::source::PageSource;
use crate::walker::{scan_page, PageEvidence};

/// Classify the first page of `source` as a front cover.
///
/// The version is decided by the graphic anchors alone; text anchors only
/// add evidence.  A document without pages has no cover version.
pub fn check_front_cover<S>(source: &S, ctx: &mut AnalysisContext<'_>) -> Result<CoverVersion, AnalysisError>
where
    S: PageSource + ?Sized,
{
    if source.page_count() == 0 {
        return Ok(CoverVersion::None);
    }

    let page = source.page(0)?;
    let templates = ctx.config.front_cover_templates();
    let evidence = scan_page(&page, &templates, ctx.config.reconstruction);
    Ok(record_front_cover(&evidence, ctx))
}

/// Fold a scanned cover page into the context and return its version.
pub fn record_front_cover(evidence: &PageEvidence, ctx: &mut AnalysisContext<'_>) -> CoverVersion {
    ctx.record(evidence.page_index, &evidence.outcome);
    for error in check_cover(&evidence.lines, &evidence.images) {
        ctx.add_error(evidence.page_index, error);
    }

    let version = CoverVersion::from_generations(&evidence.outcome.generations);
    log::debug!("{}: cover version {}", ctx.document_id, version);
    ctx.classification_mut().cover_version = version;
    version
}
