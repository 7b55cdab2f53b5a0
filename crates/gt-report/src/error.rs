use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to render PDF: {0}")]
    Pdf(String),

    #[error("failed to encode report as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write report to {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, ReportError>;

