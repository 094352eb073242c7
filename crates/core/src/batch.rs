//! Batch drivers.
//!
//! Documents are processed one at a time.  A failure is recorded against
//! its row (or file) and the batch moves on to the next document.

use std::path::{Path, PathBuf};

use coverscan_pdf::{LayoutDocument, PageRangeWriter};
use serde::Serialize;

use crate::classify::{select_front_matter, FrontMatterOptions, FrontMatterSelection, StopReason};
use crate::config::Config;
use crate::context::AnalysisContext;
use crate::error::AnalysisError;
use crate::report::{document_filename, Sheet, LINK_COLUMN, NAME_COLUMN, PID_COLUMN};

/// Column that receives the error message of a failed document.
pub const ERROR_COLUMN: &str = "Unexpected error when processing file";

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// First data row to process (0-based).
    pub nth: usize,
    /// Stop after the first row that reached processing.
    pub testing: bool,
    /// Directory holding the downloaded PDFs.
    pub pdf_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum RowStatus {
    Processed,
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub row: usize,
    pub pid: Option<String>,
    pub name: Option<String>,
    pub filename: Option<String>,
    pub status: RowStatus,
    /// Cells written for this row, in order.
    pub results: Vec<(String, String)>,
}

impl BatchOutcome {
    fn new(row: usize, pid: Option<&str>, name: Option<&str>) -> Self {
        BatchOutcome {
            row,
            pid: pid.map(str::to_string),
            name: name.map(str::to_string),
            filename: None,
            status: RowStatus::Processed,
            results: Vec::new(),
        }
    }

    fn skipped(mut self, reason: impl Into<String>) -> Self {
        self.status = RowStatus::Skipped(reason.into());
        self
    }
}

/// Run `process` over the rows of `sheet`.
///
/// `process` receives the PDF path and the document file name, which is
/// also the document identifier used for overrides.  The cells it returns
/// are written into the row; an error is written into [`ERROR_COLUMN`].
/// Only a missing `PID` or `FullTextLink` column aborts the batch.
pub fn run_batch<F>(
    sheet: &mut Sheet,
    options: &BatchOptions,
    mut process: F,
) -> Result<Vec<BatchOutcome>, AnalysisError>
where
    F: FnMut(&Path, &str) -> Result<Vec<(String, String)>, AnalysisError>,
{
    let pid_column = sheet.require_column(PID_COLUMN)?;
    let link_column = sheet.require_column(LINK_COLUMN)?;
    let name_column = sheet.column(NAME_COLUMN);

    let mut outcomes = Vec::new();
    for row in options.nth..sheet.len() {
        let pid = sheet.get(row, pid_column).map(str::to_string);
        let name = name_column.and_then(|c| sheet.get(row, c)).map(str::to_string);
        let outcome = BatchOutcome::new(row, pid.as_deref(), name.as_deref());

        let Some(pid) = pid else {
            log::info!("row {}: no PID, skipping", row);
            outcomes.push(outcome.skipped("no PID"));
            continue;
        };
        let Some(link) = sheet.get(row, link_column) else {
            log::info!("row {}: no full text link for {}, skipping", row, pid);
            outcomes.push(outcome.skipped("no full text link"));
            continue;
        };
        let Some(filename) = document_filename(&pid, link) else {
            log::info!("row {}: unusable full text link '{}', skipping", row, link);
            outcomes.push(outcome.skipped("unusable full text link"));
            continue;
        };

        let mut outcome = BatchOutcome {
            filename: Some(filename.clone()),
            ..outcome
        };
        let path = options.pdf_dir.join(&filename);
        log::debug!("row {}: processing {}", row, path.display());

        let result = if path.is_file() {
            process(&path, &filename)
        } else {
            Err(AnalysisError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )))
        };

        match result {
            Ok(cells) => {
                for (column, value) in &cells {
                    sheet.set(row, column, value.clone());
                }
                outcome.results = cells;
            }
            Err(err) => {
                log::warn!("row {}: {}: {}", row, filename, err);
                sheet.set(row, ERROR_COLUMN, err.to_string());
                outcome.status = RowStatus::Failed(err.to_string());
            }
        }
        outcomes.push(outcome);

        if options.testing {
            break;
        }
    }

    Ok(outcomes)
}

/// Every `.pdf` file directly inside `dir`, sorted by file name.
pub fn pdf_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, AnalysisError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Selected { selection: FrontMatterSelection },
    Ignored,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

#[derive(Debug)]
pub struct Extraction {
    /// The merged PDF, `None` when no page was selected at all.
    pub pdf: Option<Vec<u8>>,
    pub page_count: usize,
    pub files: Vec<FileOutcome>,
}

fn extract_one(
    path: &Path,
    config: &Config,
    options: &FrontMatterOptions,
    writer: &mut PageRangeWriter,
) -> Result<FrontMatterSelection, AnalysisError> {
    let id = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ctx = AnalysisContext::new(config, id);
    let document = LayoutDocument::open(path)?;
    let selection = select_front_matter(&document, &ctx, options)?;
    writer.add(&document, &selection.pages)?;
    Ok(selection)
}

/// Select the front matter of every file and merge it into one PDF.
///
/// `progress` is called before each file is opened.
pub fn extract_front_matter<P>(
    files: &[PathBuf],
    config: &Config,
    options: &FrontMatterOptions,
    mut progress: P,
) -> Result<Extraction, AnalysisError>
where
    P: FnMut(&Path),
{
    let mut writer = PageRangeWriter::new();
    let mut outcomes = Vec::with_capacity(files.len());

    for file in files {
        progress(file);
        let status = match extract_one(file, config, options, &mut writer) {
            Ok(selection) if selection.stop == StopReason::Ignored => FileStatus::Ignored,
            Ok(selection) => {
                log::info!("{}: {} page(s)", file.display(), selection.pages.len());
                FileStatus::Selected { selection }
            }
            Err(err) => {
                log::warn!("{}: {}", file.display(), err);
                FileStatus::Failed {
                    reason: err.to_string(),
                }
            }
        };
        outcomes.push(FileOutcome {
            file: file.clone(),
            status,
        });
    }

    let page_count = writer.page_count();
    let pdf = if page_count > 0 {
        Some(writer.finish()?)
    } else {
        None
    };

    Ok(Extraction {
        pdf,
        page_count,
        files: outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Sheet {
        Sheet::from_csv(
            "PID,FullTextLink,Name\n\
             1,https://example.org/get/diva2:1/FULLTEXT01.pdf,One\n\
             2,,Two\n\
             3,https://example.org/get/diva2:3/FULLTEXT01.pdf,Three\n\
             4,https://example.org/get/diva2:4/FULLTEXT01.pdf,Four\n"
                .as_bytes(),
        )
        .unwrap()
    }

    fn pdf_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), b"%PDF-1.5").unwrap();
        }
        dir
    }

    #[test]
    fn test_rows_are_isolated() {
        let dir = pdf_dir(&["1-FULLTEXT01.pdf", "3-FULLTEXT01.pdf", "4-FULLTEXT01.pdf"]);
        let mut sheet = sheet();
        let options = BatchOptions {
            pdf_dir: dir.path().to_path_buf(),
            ..BatchOptions::default()
        };

        let outcomes = run_batch(&mut sheet, &options, |_, id| {
            if id.starts_with("3-") {
                Err(AnalysisError::Spreadsheet("broken".to_string()))
            } else {
                Ok(vec![("page".to_string(), "7".to_string())])
            }
        })
        .unwrap();

        let statuses: Vec<&RowStatus> = outcomes.iter().map(|o| &o.status).collect();
        assert_eq!(statuses.len(), 4);
        assert_eq!(statuses[0], &RowStatus::Processed);
        assert!(matches!(statuses[1], RowStatus::Skipped(_)));
        assert!(matches!(statuses[2], RowStatus::Failed(_)));
        assert_eq!(statuses[3], &RowStatus::Processed);

        let page = sheet.column("page").unwrap();
        let error = sheet.column(ERROR_COLUMN).unwrap();
        assert_eq!(sheet.get(0, page), Some("7"));
        assert_eq!(sheet.get(0, error), None);
        assert!(sheet.get(2, error).unwrap().contains("broken"));
        assert_eq!(sheet.get(2, page), None);
        assert_eq!(sheet.get(3, page), Some("7"));
        assert_eq!(sheet.get(3, error), None);
        assert_eq!(sheet.len(), 4);
    }

    #[test]
    fn test_missing_file_fails_its_row() {
        let dir = pdf_dir(&[]);
        let mut sheet = sheet();
        let options = BatchOptions {
            pdf_dir: dir.path().to_path_buf(),
            ..BatchOptions::default()
        };

        let outcomes = run_batch(&mut sheet, &options, |_, _| Ok(Vec::new())).unwrap();
        assert!(matches!(&outcomes[0].status, RowStatus::Failed(reason) if reason.contains("not found")));
    }

    #[test]
    fn test_blank_rows_are_skipped_and_kept() {
        let dir = pdf_dir(&["1-a.pdf", "2-b.pdf"]);
        let mut sheet =
            Sheet::from_csv("PID,FullTextLink\n1,x/a.pdf\n,\n2,x/b.pdf\n".as_bytes()).unwrap();
        let options = BatchOptions {
            pdf_dir: dir.path().to_path_buf(),
            ..BatchOptions::default()
        };

        let outcomes = run_batch(&mut sheet, &options, |_, _| {
            Ok(vec![("page".to_string(), "0".to_string())])
        })
        .unwrap();

        assert_eq!(outcomes[1].status, RowStatus::Skipped("no PID".to_string()));
        assert_eq!(outcomes[2].status, RowStatus::Processed);
        assert_eq!(sheet.len(), 3);
        let page = sheet.column("page").unwrap();
        assert_eq!(sheet.get(1, page), None);
        assert_eq!(sheet.get(2, page), Some("0"));
    }

    #[test]
    fn test_nth_and_testing() {
        let dir = pdf_dir(&["1-FULLTEXT01.pdf", "3-FULLTEXT01.pdf", "4-FULLTEXT01.pdf"]);
        let mut sheet = sheet();
        let options = BatchOptions {
            nth: 1,
            testing: true,
            pdf_dir: dir.path().to_path_buf(),
        };

        let mut seen = Vec::new();
        let outcomes = run_batch(&mut sheet, &options, |_, id| {
            seen.push(id.to_string());
            Ok(Vec::new())
        })
        .unwrap();

        assert_eq!(seen, vec!["3-FULLTEXT01.pdf"]);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].name.as_deref(), Some("Three"));
    }

    #[test]
    fn test_missing_link_column() {
        let mut sheet = Sheet::from_csv("PID,Name\n1,a\n".as_bytes()).unwrap();
        let result = run_batch(&mut sheet, &BatchOptions::default(), |_, _| Ok(Vec::new()));
        assert!(matches!(result, Err(AnalysisError::MissingColumn(c)) if c == LINK_COLUMN));
    }

    #[test]
    fn test_pdf_files_sorted() {
        let dir = pdf_dir(&["b.pdf", "a.PDF", "notes.txt"]);
        let files = pdf_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }
}
