use std::path::Path;

use colored::Colorize;
use coverscan_core::report::COVER_SUFFIX;
use coverscan_core::{
    check_front_cover, AnalysisContext, AnalysisError, Config, CoverVersion, DocumentClassification,
};
use coverscan_pdf::LayoutDocument;
use serde::Serialize;

use crate::documents::{
    document_id, joined_errors, load_config, print_classification, print_dump, run_spreadsheet,
    DocumentArgs, Target,
};
use crate::prelude::{println, *};

pub const VERSION_COLUMN: &str = "Cover version";
pub const ERRORS_COLUMN: &str = "Cover errors";

#[derive(Debug, clap::Args)]
pub struct Options {
    #[clap(flatten)]
    documents: DocumentArgs,
}

#[derive(Debug, Serialize)]
pub struct CoverOutput {
    pub file: String,
    pub cover_version: CoverVersion,
    pub classification: DocumentClassification,
}

pub fn analyze(path: &Path, id: &str, config: &Config) -> Result<DocumentClassification, AnalysisError> {
    let document = LayoutDocument::open(path)?;
    let mut ctx = AnalysisContext::new(config, id);
    check_front_cover(&document, &mut ctx)?;
    Ok(ctx.into_classification())
}

fn columns(classification: &DocumentClassification) -> Vec<(String, String)> {
    vec![
        (VERSION_COLUMN.to_string(), classification.cover_version.to_string()),
        (ERRORS_COLUMN.to_string(), joined_errors(classification)),
    ]
}

pub fn run(options: Options, global: crate::Global) -> Result<()> {
    let config = load_config(&global)?;
    let args = &options.documents;

    match args.target()? {
        Target::Pdf(path) => {
            if args.testing {
                return print_dump(&path, Some(0));
            }

            let id = document_id(&path);
            let classification = analyze(&path, &id, &config)
                .wrap_err_with(|| f!("Failed to process {}", path.display()))?;
            let output = CoverOutput {
                file: id,
                cover_version: classification.cover_version,
                classification,
            };

            if args.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            let version = match output.cover_version {
                CoverVersion::New => "New".green(),
                CoverVersion::Old => "Old".yellow(),
                CoverVersion::None => "None".red(),
            };
            println!("Cover version of {}: {}", output.file, version.bold());
            print_classification(&output.classification);
            Ok(())
        }
        Target::Spreadsheet(path) => run_spreadsheet(&path, args, COVER_SUFFIX, |pdf, id| {
            analyze(pdf, id, &config).map(|c| columns(&c))
        }),
    }
}
