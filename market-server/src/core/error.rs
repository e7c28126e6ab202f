//! Startup and infrastructure errors
//!
//! Request handlers never return these; they use [`AppError`](crate::AppError).

use thiserror::Error;

use crate::db::RepoError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] RepoError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
