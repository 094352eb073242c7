use std::path::PathBuf;

use coverscan_pdf::dump::hierarchy;
use coverscan_pdf::reconstruct::page_lines;
use coverscan_pdf::LayoutDocument;
use serde::Serialize;

use crate::documents::{load_config, print_dump};
use crate::prelude::{println, *};

#[derive(Debug, clap::Args)]
pub struct Options {
    /// PDF file to dump
    #[arg(long)]
    pdf: PathBuf,

    /// Only this page (0-based)
    #[arg(long)]
    page: Option<usize>,

    /// Print the reconstructed text lines instead of the element tree
    #[arg(long)]
    lines: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct PageDump<T> {
    page: usize,
    rows: Vec<T>,
}

pub fn run(options: Options, global: crate::Global) -> Result<()> {
    if !options.json && !options.lines {
        return print_dump(&options.pdf, options.page);
    }

    let config = load_config(&global)?;
    let document = LayoutDocument::open(&options.pdf)
        .wrap_err_with(|| f!("Failed to open {}", options.pdf.display()))?;
    let pages: Vec<usize> = match options.page {
        Some(index) => vec![index],
        None => (0..document.page_count()).collect(),
    };

    for index in pages {
        let page = document.page(index)?;
        if options.lines {
            let lines = page_lines(&page, config.reconstruction);
            if options.json {
                let dump = PageDump { page: index, rows: lines };
                println!("{}", serde_json::to_string_pretty(&dump)?);
            } else {
                for line in lines {
                    println!(
                        "{:>3} {:>7.2} {:>7.2} {:>5.1}  {}",
                        index, line.bbox.x1, line.bbox.y1, line.font_size, line.text
                    );
                }
            }
        } else {
            let dump = PageDump {
                page: index,
                rows: hierarchy(&page),
            };
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }
    Ok(())
}
