use thiserror::Error;

use crate::permissions::RoleTableError;
use crate::utils::AppError;

/// Startup and lifecycle failures (request errors use [`AppError`])
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] AppError),

    #[error(transparent)]
    RoleTable(#[from] RoleTableError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
