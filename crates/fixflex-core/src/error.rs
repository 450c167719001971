//! Error types for fixflex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Unsupported statement format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid transaction index: {index} (view has {len} transactions)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Please enter a category name")]
    EmptyCategoryName,

    #[error("This category already exists: {0}")]
    DuplicateCategory(String),
}

pub type Result<T> = std::result::Result<T, Error>;
