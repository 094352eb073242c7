use std::path::Path;

use colored::Colorize;
use coverscan_core::report::BACK_COVER_SUFFIX;
use coverscan_core::{
    find_back_cover, page_or_sentinel, AnalysisContext, AnalysisError, Config, CoverVersion,
    DocumentClassification,
};
use coverscan_pdf::LayoutDocument;
use serde::Serialize;

use crate::documents::{
    document_id, joined_errors, load_config, print_classification, print_dump, run_spreadsheet,
    DocumentArgs, Target,
};
use crate::prelude::{println, *};

pub const PAGE_COLUMN: &str = "Back cover";
pub const VERSION_COLUMN: &str = "Back cover version";
pub const ERRORS_COLUMN: &str = "Back cover errors";

#[derive(Debug, clap::Args)]
pub struct Options {
    #[clap(flatten)]
    documents: DocumentArgs,
}

#[derive(Debug, Serialize)]
pub struct BackCoverOutput {
    pub file: String,
    /// 0-based, -1 when no back cover was found.
    pub back_cover_page: i64,
    pub cover_version: CoverVersion,
    pub classification: DocumentClassification,
}

/// Search one document for its back cover.
pub fn analyze(path: &Path, id: &str, config: &Config) -> Result<DocumentClassification, AnalysisError> {
    let document = LayoutDocument::open(path)?;
    let mut ctx = AnalysisContext::new(config, id);
    find_back_cover(&document, &mut ctx)?;
    Ok(ctx.into_classification())
}

/// Report cells.  Page and version stay empty when no back cover was
/// found; errors are written whenever there are any.
fn columns(classification: &DocumentClassification) -> Vec<(String, String)> {
    let mut cells = Vec::new();
    if let Some(page) = classification.found_back_cover_page {
        cells.push((PAGE_COLUMN.to_string(), page.to_string()));
        cells.push((VERSION_COLUMN.to_string(), classification.cover_version.to_string()));
    }
    if !classification.errors.is_empty() {
        cells.push((ERRORS_COLUMN.to_string(), joined_errors(classification)));
    }
    cells
}

pub fn run(options: Options, global: crate::Global) -> Result<()> {
    let config = load_config(&global)?;
    let args = &options.documents;

    match args.target()? {
        Target::Pdf(path) => {
            if args.testing {
                return print_dump(&path, None);
            }

            let id = document_id(&path);
            let classification = analyze(&path, &id, &config)
                .wrap_err_with(|| f!("Failed to process {}", path.display()))?;
            let output = BackCoverOutput {
                file: id,
                back_cover_page: page_or_sentinel(classification.found_back_cover_page),
                cover_version: classification.cover_version,
                classification,
            };

            if args.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            match output.classification.found_back_cover_page {
                Some(page) => println!(
                    "Found {} back cover on page {} in {}",
                    output.cover_version.to_string().bold(),
                    page.to_string().green(),
                    output.file
                ),
                None => println!("No back cover found in {}", output.file),
            }
            print_classification(&output.classification);
            println!("{}", output.back_cover_page);
            Ok(())
        }
        Target::Spreadsheet(path) => run_spreadsheet(&path, args, BACK_COVER_SUFFIX, |pdf, id| {
            analyze(pdf, id, &config).map(|c| columns(&c))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverscan_core::ErrorTag;

    #[test]
    fn test_columns_only_when_found() {
        let mut classification = DocumentClassification::default();
        assert!(columns(&classification).is_empty());

        classification.found_back_cover_page = Some(41);
        classification.cover_version = CoverVersion::Old;
        assert_eq!(
            columns(&classification),
            vec![
                (PAGE_COLUMN.to_string(), "41".to_string()),
                (VERSION_COLUMN.to_string(), "Old".to_string()),
            ]
        );
    }

    #[test]
    fn test_errors_are_reported_without_a_match() {
        let mut classification = DocumentClassification::default();
        classification.errors.insert(ErrorTag::from(
            "'TRITA' present, but not where expected: 38.685,300.000 to 150.000,310.000",
        ));

        let cells = columns(&classification);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].0, ERRORS_COLUMN);
        assert!(cells[0].1.starts_with("'TRITA' present"));
    }
}
