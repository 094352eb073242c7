use coverscan_pdf::PdfError;
use thiserror::Error;

/// Errors raised while analysing a document or reading and writing reports.
///
/// Anything that reaches the batch driver as an `Err` is recorded against
/// the offending row; it never aborts the batch.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing column '{0}'")]
    MissingColumn(String),
}

impl From<calamine::Error> for AnalysisError {
    fn from(err: calamine::Error) -> Self {
        AnalysisError::Spreadsheet(err.to_string())
    }
}
