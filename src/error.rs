//! Common error type and result alias.
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Failed to decode image data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Ledger write failed: {0}")]
    Ledger(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{backend} failed after {attempts} attempt(s): {source}")]
    Backend {
        backend: &'static str,
        attempts: u32,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Innermost cause for `Backend` errors, the error itself otherwise.
    pub fn last_cause(&self) -> &AppError {
        match self {
            AppError::Backend { source, .. } => source.last_cause(),
            other => other,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
