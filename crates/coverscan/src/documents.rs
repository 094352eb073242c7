//! Plumbing shared by the per-document commands: input selection, config
//! loading, element dumps and the spreadsheet batch loop.

use std::path::{Path, PathBuf};

use colored::Colorize;
use coverscan_core::batch::{run_batch, BatchOptions, BatchOutcome, RowStatus};
use coverscan_core::report::output_path;
use coverscan_core::{AnalysisError, Config, DocumentClassification, Sheet};
use coverscan_pdf::dump::{hierarchy, HEADER};
use coverscan_pdf::LayoutDocument;
use indicatif::{ProgressBar, ProgressStyle};

use crate::prelude::{println, *};

#[derive(Debug, Clone, clap::Args)]
pub struct DocumentArgs {
    /// PDF file to check
    #[arg(long, conflicts_with = "spreadsheet")]
    pub pdf: Option<PathBuf>,

    /// Spreadsheet (xlsx, xls, ods or csv) with PID and FullTextLink columns
    #[arg(long)]
    pub spreadsheet: Option<PathBuf>,

    /// Start at this data row (0-based)
    #[arg(short, long, default_value = "0")]
    pub nth: usize,

    /// Directory holding the PDFs named in the spreadsheet
    #[arg(long, env = "COVERSCAN_PDF_DIR", default_value = ".")]
    pub pdf_dir: PathBuf,

    /// Dump page elements instead of classifying, or stop after the first spreadsheet row
    #[arg(short, long)]
    pub testing: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub enum Target {
    Pdf(PathBuf),
    Spreadsheet(PathBuf),
}

impl DocumentArgs {
    pub fn target(&self) -> Result<Target> {
        match (&self.pdf, &self.spreadsheet) {
            (Some(pdf), _) => Ok(Target::Pdf(pdf.clone())),
            (None, Some(sheet)) => Ok(Target::Spreadsheet(sheet.clone())),
            (None, None) => Err(Error::MissingInput.into()),
        }
    }

    fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            nth: self.nth,
            testing: self.testing,
            pdf_dir: self.pdf_dir.clone(),
        }
    }
}

/// The configured analysis settings with the built-in overrides applied.
pub fn load_config(global: &crate::Global) -> Result<Config> {
    let config = match &global.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| f!("Failed to read config file {}", path.display()))?;
            Config::from_toml(&text)?
        }
        None => Config::default(),
    };
    Ok(config.with_builtin_overrides()?)
}

/// Document identifier used for overrides: the file name.
pub fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Print the element hierarchy of every page, or of `only` when given.
pub fn print_dump(path: &Path, only: Option<usize>) -> Result<()> {
    let document = LayoutDocument::open(path)
        .wrap_err_with(|| f!("Failed to open {}", path.display()))?;
    let pages: Vec<usize> = match only {
        Some(index) => vec![index],
        None => (0..document.page_count()).collect(),
    };

    for index in pages {
        let page = document.page(index)?;
        println!("{}", f!("Page {}", index).bold());
        println!("{}", HEADER);
        for row in hierarchy(&page) {
            println!("{}", row);
        }
        println!();
    }
    Ok(())
}

/// Evidence and errors of one document as a two-column table.
/// Accumulated errors as one report cell.
pub fn joined_errors(classification: &DocumentClassification) -> String {
    classification
        .errors
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn print_classification(classification: &DocumentClassification) {
    if classification.evidence.is_empty() && classification.errors.is_empty() {
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["Kind".bold().cyan(), "Detail".bold().cyan()]);
    for evidence in &classification.evidence {
        table.add_row(prettytable::row!["evidence".green(), evidence.to_string()]);
    }
    for error in &classification.errors {
        table.add_row(prettytable::row!["error".red(), error.to_string()]);
    }
    table.printstd();
}

fn status_cell(status: &RowStatus) -> colored::ColoredString {
    match status {
        RowStatus::Processed => "processed".green(),
        RowStatus::Failed(reason) => f!("failed: {}", reason).red(),
        RowStatus::Skipped(reason) => f!("skipped: {}", reason).yellow(),
    }
}

fn print_outcomes(outcomes: &[BatchOutcome]) {
    let mut table = new_table();
    table.add_row(prettytable::row![
        "Row".bold().cyan(),
        "PID".bold().cyan(),
        "Name".bold().cyan(),
        "Status".bold().cyan(),
        "Result".bold().cyan()
    ]);
    for outcome in outcomes {
        let results = outcome
            .results
            .iter()
            .map(|(column, value)| f!("{}: {}", column, value))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(prettytable::row![
            outcome.row.to_string().bright_black(),
            outcome.pid.as_deref().unwrap_or("-"),
            outcome.name.as_deref().unwrap_or("-").bright_white(),
            status_cell(&outcome.status),
            results
        ]);
    }
    table.printstd();
}

/// Run `process` over a spreadsheet and write the augmented table next to
/// it, named after `suffix`.
pub fn run_spreadsheet<F>(path: &Path, args: &DocumentArgs, suffix: &str, process: F) -> Result<()>
where
    F: FnMut(&Path, &str) -> Result<Vec<(String, String)>, AnalysisError>,
{
    let mut process = process;
    let mut sheet = Sheet::from_path(path)
        .wrap_err_with(|| f!("Failed to read spreadsheet {}", path.display()))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")?,
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let outcomes = run_batch(&mut sheet, &args.batch_options(), |pdf, id| {
        spinner.set_message(f!("Processing {}", id));
        process(pdf, id)
    })?;

    spinner.finish_and_clear();

    let output = output_path(path, suffix);
    sheet
        .save_csv(&output)
        .wrap_err_with(|| f!("Failed to write {}", output.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        return Ok(());
    }

    let failed = outcomes
        .iter()
        .filter(|o| matches!(o.status, RowStatus::Failed(_)))
        .count();
    println!(
        "\nProcessed {} row(s), {} failed:\n",
        outcomes.len().to_string().bold(),
        failed.to_string().bold()
    );
    print_outcomes(&outcomes);
    println!("\nWrote {}", output.display().to_string().green());
    Ok(())
}
