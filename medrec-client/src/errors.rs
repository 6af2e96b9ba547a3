use medrec_api::prelude::{ApiError, RecordId, ResourceKind, ValidationErrors};
use serde::Deserialize;

/// Result type for medrec client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur when interacting with the remote API.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("No authentication token found. Please log in.")]
    MissingCredential,
    #[error("Authentication failed: {}", or_fallback(.message, "unauthorized"))]
    Unauthorized { message: Option<String> },
    #[error("{} #{id} not found", singular(.kind))]
    NotFound { kind: ResourceKind, id: RecordId },
    #[error("Validation error: {}", or_fallback(.message, "unprocessable entity"))]
    Validation { message: Option<String> },
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Invalid input: {0}")]
    InvalidInput(ValidationErrors),
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::MissingCredential => ClientError::MissingCredential,
            ApiError::Validation(errors) => ClientError::InvalidInput(errors),
            other => ClientError::InvalidRecord(other.to_string()),
        }
    }
}

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ClientError {
    /// Builds the error for a non-2xx response.
    ///
    /// `target` is the record the request addressed, if any; a 404 on a record route becomes
    /// [`ClientError::NotFound`], a 404 elsewhere is a server error.
    pub fn from_response(
        status: u16,
        body: &str,
        target: Option<(ResourceKind, RecordId)>,
    ) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.message.or(body.error))
            .filter(|message| !message.trim().is_empty());

        match (status, target) {
            (401 | 403, _) => ClientError::Unauthorized { message },
            (404, Some((kind, id))) => ClientError::NotFound { kind, id },
            (422, _) => ClientError::Validation { message },
            _ => ClientError::Server {
                status,
                message: message.unwrap_or_else(|| {
                    reqwest::StatusCode::from_u16(status)
                        .ok()
                        .and_then(|status| status.canonical_reason())
                        .unwrap_or("unexpected response")
                        .to_string()
                }),
            },
        }
    }

    /// Returns whether the addressed record doesn't exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// Returns the message to show to the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::MissingCredential => {
                "No authentication token found. Please log in.".to_string()
            }
            ClientError::Unauthorized { .. } => {
                "Authentication failed. Please log in again.".to_string()
            }
            ClientError::NotFound { kind, .. } => {
                format!("{} not found.", capitalize(kind.singular()))
            }
            ClientError::Validation { message: Some(message) } => message.clone(),
            ClientError::Validation { message: None } => {
                "Validation error. Please check your input.".to_string()
            }
            ClientError::InvalidInput(errors) => errors.summary().to_string(),
            ClientError::Server { message, .. } if !message.is_empty() => message.clone(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

fn or_fallback<'a>(message: &'a Option<String>, fallback: &'a str) -> &'a str {
    message.as_deref().unwrap_or(fallback)
}

fn singular(kind: &ResourceKind) -> &'static str {
    kind.singular()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
