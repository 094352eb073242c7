//! Detection of the "For DIVA" metadata page that some theses still carry
//! at the end of the document.

use coverscan_pdf::reconstruct::page_text;

use crate::context::AnalysisContext;
use crate::error::AnalysisError;
use crate::evidence::Evidence;
use crate::source::PageSource;

/// The first configured marker found in `text`.
pub fn for_diva_marker<'m>(text: &str, markers: &'m [String]) -> Option<&'m str> {
    markers.iter().map(String::as_str).find(|m| text.contains(m))
}

/// Scan forward and return the 0-based index of the first page carrying a
/// For DIVA marker.
pub fn find_for_diva<S>(source: &S, ctx: &mut AnalysisContext<'_>) -> Result<Option<usize>, AnalysisError>
where
    S: PageSource + ?Sized,
{
    let params = ctx.config.reconstruction;

    for index in 0..source.page_count() {
        let page = source.page(index)?;
        let text = page_text(&page, params);
        if let Some(marker) = for_diva_marker(&text, &ctx.config.markers.for_diva) {
            log::debug!("{}: '{}' on page {}", ctx.document_id, marker, index);
            let classification = ctx.classification_mut();
            classification.evidence.insert(Evidence::ForDivaMarker);
            classification.found_for_diva_page = Some(index);
            return Ok(Some(index));
        }
    }
    Ok(None)
}
