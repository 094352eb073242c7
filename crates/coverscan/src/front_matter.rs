use std::path::PathBuf;

use colored::Colorize;
use coverscan_core::batch::{extract_front_matter, pdf_files, FileOutcome, FileStatus};
use coverscan_core::{FrontMatterOptions, StopReason};
use indicatif::{ProgressBar, ProgressStyle};

use crate::documents::load_config;
use crate::prelude::{println, *};

#[derive(Debug, clap::Args)]
pub struct Options {
    /// Directory with the PDFs to combine
    input_dir: PathBuf,

    /// Combined output PDF
    output: PathBuf,

    /// Leave out the cover pages
    #[arg(long)]
    anonymous: bool,

    /// Pages to scan per document (document overrides still apply)
    #[arg(long, env = "COVERSCAN_PAGE_CEILING")]
    ceiling: Option<usize>,

    /// Output the per-file report as JSON
    #[arg(long)]
    json: bool,
}

fn stop_label(stop: StopReason) -> &'static str {
    match stop {
        StopReason::Ignored => "ignored",
        StopReason::References => "references",
        StopReason::BodyReached => "body reached",
        StopReason::Ceiling => "page ceiling",
        StopReason::EndOfDocument => "end of document",
    }
}

fn print_files(files: &[FileOutcome]) {
    let mut table = new_table();
    table.add_row(prettytable::row![
        "File".bold().cyan(),
        "Pages".bold().cyan(),
        "Stop".bold().cyan()
    ]);
    for outcome in files {
        let name = outcome
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (pages, stop) = match &outcome.status {
            FileStatus::Selected { selection } => (
                selection
                    .pages
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
                    .normal(),
                stop_label(selection.stop).bright_black(),
            ),
            FileStatus::Ignored => ("-".normal(), "ignored".yellow()),
            FileStatus::Failed { reason } => ("-".normal(), reason.red()),
        };
        table.add_row(prettytable::row![name.bright_white(), pages, stop]);
    }
    table.printstd();
}

pub fn run(options: Options, global: crate::Global) -> Result<()> {
    if !options.input_dir.is_dir() {
        return Err(Error::NotADirectory(options.input_dir.display().to_string()).into());
    }

    let config = load_config(&global)?;
    let files = pdf_files(&options.input_dir)?;
    let front_matter = FrontMatterOptions {
        anonymous: options.anonymous,
        page_ceiling: options.ceiling,
    };

    let bar = if global.verbose {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(files.len() as u64)
    };
    bar.set_style(ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos}/{len} {msg}")?);

    let extraction = extract_front_matter(&files, &config, &front_matter, |file| {
        bar.inc(1);
        bar.set_message(
            file.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
    })?;

    bar.finish_and_clear();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&extraction.files)?);
    } else {
        print_files(&extraction.files);
    }

    let Some(pdf) = extraction.pdf else {
        return Err(Error::NothingSelected(files.len()).into());
    };
    std::fs::write(&options.output, pdf)
        .wrap_err_with(|| f!("Failed to write {}", options.output.display()))?;

    if !options.json {
        println!(
            "\nWrote {} page(s) to {}",
            extraction.page_count.to_string().bold(),
            options.output.display().to_string().green()
        );
    }
    Ok(())
}
