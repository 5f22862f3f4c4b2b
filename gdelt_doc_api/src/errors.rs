//! Error types for the API client.

/// Errors that can occur when compiling filters or making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The filters were malformed. Raised before any request is sent.
    #[error("Invalid filter: {0}")]
    Validation(String),
    /// The requested mode is not a recognized API mode, or not valid for the operation.
    #[error("Mode {0} not in supported API modes")]
    InvalidMode(String),
    /// The request could not be sent or timed out.
    #[error("Request failed")]
    Transport(#[from] reqwest::Error),
    /// The API rejected the request because of its rate limit.
    #[error("Rate limited by GDELT API")]
    RateLimited,
    /// The API returned a non-success status, or an error message in place of data.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    /// The response body was not valid structured data, even after sanitization.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Broad classification of an HTTP error status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    BadRequest,
    NotFound,
    RateLimit,
    ClientError,
    ServerError,
    Other,
}

impl StatusKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => StatusKind::BadRequest,
            404 => StatusKind::NotFound,
            429 => StatusKind::RateLimit,
            401..=499 => StatusKind::ClientError,
            500..=599 => StatusKind::ServerError,
            _ => StatusKind::Other,
        }
    }
}

impl Error {
    /// Classifies the HTTP status behind this error, if there is one.
    pub fn status_kind(&self) -> Option<StatusKind> {
        match self {
            Error::RateLimited => Some(StatusKind::RateLimit),
            Error::Api { status, .. } if *status != 200 => Some(StatusKind::from_status(*status)),
            _ => None,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}
