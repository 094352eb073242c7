#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Either --pdf or --spreadsheet is required")]
    MissingInput,

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("No pages selected from {0} file(s)")]
    NothingSelected(usize),
}
