use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecoError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Could not parse {0} statement: transaction table headers not found")]
    HeaderNotFound(String),

    #[error("Could not parse {format} statement: required column '{column}' not found")]
    RequiredColumnMissing { format: String, column: String },

    #[error("{0}")]
    EmptyStatement(String),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("No bank accounts configured. Add one with `bankreco accounts add`.")]
    NoAccounts,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RecoError>;
