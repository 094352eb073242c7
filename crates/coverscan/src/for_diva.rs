use std::path::Path;

use colored::Colorize;
use coverscan_core::report::FOR_DIVA_SUFFIX;
use coverscan_core::{find_for_diva, page_or_sentinel, AnalysisContext, AnalysisError, Config};
use coverscan_pdf::LayoutDocument;
use serde::Serialize;

use crate::documents::{document_id, load_config, print_dump, run_spreadsheet, DocumentArgs, Target};
use crate::prelude::{println, *};

pub const PAGE_COLUMN: &str = "For DIVA page(s) present";

#[derive(Debug, clap::Args)]
pub struct Options {
    #[clap(flatten)]
    documents: DocumentArgs,
}

#[derive(Debug, Serialize)]
pub struct ForDivaOutput {
    pub file: String,
    /// 0-based, -1 when the document has no For DIVA page.
    pub for_diva_page: i64,
}

pub fn analyze(path: &Path, id: &str, config: &Config) -> Result<Option<usize>, AnalysisError> {
    let document = LayoutDocument::open(path)?;
    let mut ctx = AnalysisContext::new(config, id);
    find_for_diva(&document, &mut ctx)
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
            let page = analyze(&path, &id, &config)
                .wrap_err_with(|| f!("Failed to process {}", path.display()))?;
            let output = ForDivaOutput {
                file: id,
                for_diva_page: page_or_sentinel(page),
            };

            if args.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            match page {
                Some(page) => println!(
                    "Found For DIVA page at {} in {}",
                    page.to_string().green(),
                    output.file
                ),
                None => println!("No For DIVA page in {}", output.file),
            }
            println!("{}", output.for_diva_page);
            Ok(())
        }
        Target::Spreadsheet(path) => run_spreadsheet(&path, args, FOR_DIVA_SUFFIX, |pdf, id| {
            let page = analyze(pdf, id, &config)?;
            Ok(page
                .map(|p| vec![(PAGE_COLUMN.to_string(), p.to_string())])
                .unwrap_or_default())
        }),
    }
}
