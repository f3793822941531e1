use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::ParseAmountError;
use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("An entry already exists for {0}")]
    Conflict(NaiveDate),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DateTaken(date) => AppError::Conflict(date),
            StoreError::Backend(e) => AppError::Database(e),
        }
    }
}

impl From<ParseAmountError> for AppError {
    fn from(err: ParseAmountError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}
