//! Client error types.

use std::fmt;

use goroon_api::ApiError;
use goroon_core::ResolveError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Session file could not be written.
    Session(String),
    /// Credentials or a session are needed but missing.
    AuthRequired(String),
    /// The date flags did not describe a valid window.
    DateRange(ResolveError),
    /// The remote API call failed.
    Api(ApiError),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Session(msg) => write!(f, "session error: {}", msg),
            Self::AuthRequired(msg) => write!(f, "authentication required: {}", msg),
            Self::DateRange(err) => write!(f, "invalid date range: {}", err),
            Self::Api(err) => write!(f, "{}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DateRange(err) => Some(err),
            Self::Api(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

impl From<ResolveError> for ClientError {
    fn from(err: ResolveError) -> Self {
        Self::DateRange(err)
    }
}
