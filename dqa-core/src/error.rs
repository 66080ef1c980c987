// dqa-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DqaError {
    // --- DOMAIN ERRORS (headers, rules, resolver protocol) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, CSV, subprocess) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATION ERRORS ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

// Manual implementations to avoid duplicate enum variants but keep ergonomics
impl From<std::io::Error> for DqaError {
    fn from(err: std::io::Error) -> Self {
        DqaError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<csv::Error> for DqaError {
    fn from(err: csv::Error) -> Self {
        DqaError::Infrastructure(InfrastructureError::Csv(err))
    }
}
