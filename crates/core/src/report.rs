//! Tabular reports.
//!
//! Batch runs read a spreadsheet of theses (one row per document, with at
//! least a `PID` and a `FullTextLink` column), add result columns and write
//! the table back out as CSV.  Rows are never reordered or dropped.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use serde::Serialize;

use crate::error::AnalysisError;

pub const PID_COLUMN: &str = "PID";
pub const LINK_COLUMN: &str = "FullTextLink";
pub const NAME_COLUMN: &str = "Name";

pub const BACK_COVER_SUFFIX: &str = "with_back_cover_info.csv";
pub const FOR_DIVA_SUFFIX: &str = "with_forDIVA_info.csv";
pub const COVER_SUFFIX: &str = "with_cover_info.csv";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Identifiers come back from Excel as floats.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR:{e:?}"),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

impl Sheet {
    /// Build a sheet from raw rows; the first non-empty row is the header.
    /// Blank rows after it are kept so the table writes back unchanged.
    pub fn from_rows(rows: impl IntoIterator<Item = Vec<String>>) -> Self {
        let mut rows = rows
            .into_iter()
            .skip_while(|row| row.iter().all(|cell| cell.trim().is_empty()));
        let headers = rows
            .next()
            .map(|row| row.into_iter().map(|h| h.trim().to_string()).collect())
            .unwrap_or_default();
        Sheet {
            headers,
            rows: rows.collect(),
        }
    }

    /// Load a `.csv` file, or the first worksheet of anything calamine
    /// can open (xlsx, xls, ods).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv {
            return Self::from_csv(File::open(path)?);
        }

        let mut workbook = open_workbook_auto(path)?;
        let Some(name) = workbook.sheet_names().first().cloned() else {
            return Ok(Sheet::default());
        };
        let range = workbook.worksheet_range(&name)?;
        Ok(Self::from_rows(
            range.rows().map(|row| row.iter().map(cell_text).collect()),
        ))
    }

    pub fn from_csv<R: Read>(reader: R) -> Result<Self, AnalysisError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_reader(reader);
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self::from_rows(rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, AnalysisError> {
        self.column(name)
            .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))
    }

    /// The trimmed cell, or `None` when it is missing or blank.
    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)?
            .get(column)
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
    }

    /// Index of `name`, appending the column when it does not exist yet.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        match self.column(name) {
            Some(index) => index,
            None => {
                self.headers.push(name.to_string());
                self.headers.len() - 1
            }
        }
    }

    pub fn set(&mut self, row: usize, column: &str, value: impl Into<String>) {
        let index = self.ensure_column(column);
        let Some(cells) = self.rows.get_mut(row) else {
            return;
        };
        if cells.len() <= index {
            cells.resize(index + 1, String::new());
        }
        cells[index] = value.into();
    }

    /// Every row padded to the header width.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), AnalysisError> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            let mut cells = row.clone();
            if cells.len() < self.headers.len() {
                cells.resize(self.headers.len(), String::new());
            }
            writer.write_record(&cells)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<(), AnalysisError> {
        self.write_csv(File::create(path)?)
    }
}

/// Local file name of a thesis: `{PID}-{last segment of the link}`.
pub fn document_filename(pid: &str, link: &str) -> Option<String> {
    let link = link.trim();
    let (_, suffix) = link.rsplit_once('/')?;
    if suffix.is_empty() {
        return None;
    }
    Some(format!("{}-{}", pid.trim(), suffix))
}

/// The report written next to `input`: its stem followed by `suffix`.
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}"))
}
