use thiserror::Error;

use crate::validate::ValidationErrors;

/// Medrec API error type
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Unknown resource kind: {0}")]
    UnknownResourceKind(String),
    #[error("Record is not a JSON object")]
    NotAnObject,
    #[error("No authentication token found. Please log in.")]
    MissingCredential,
    #[error("{0}")]
    Validation(ValidationErrors),
}

/// Medrec API result type
pub type ApiResult<T> = Result<T, ApiError>;
