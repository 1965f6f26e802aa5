//! Error types for remote API calls.
//!
//! Every failure surfaced by a [`GaroonApi`](crate::GaroonApi) call is an
//! [`ApiError`] carrying an [`ApiErrorCode`] classification. Errors are
//! propagated to the command layer unchanged; nothing here retries.

use std::fmt;
use thiserror::Error;

/// The category of an API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorCode {
    /// Login failed or the session/credentials were rejected.
    AuthenticationFailed,
    /// The requested user (or other resource) does not exist.
    NotFound,
    /// Connection failed, timed out, or the body could not be read.
    NetworkError,
    /// The server answered with a SOAP fault or an error status.
    ServerError,
    /// The response could not be understood.
    InvalidResponse,
    /// Missing or invalid client configuration.
    ConfigurationError,
    /// A request could not be built.
    InternalError,
}

impl ApiErrorCode {
    /// Returns a stable snake_case name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::NotFound => "not_found",
            Self::NetworkError => "network_error",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error returned by the remote API or the transport underneath it.
#[derive(Debug, Error)]
pub struct ApiError {
    code: ApiErrorCode,
    message: String,
    /// SOAP action that failed, e.g. `ScheduleGetEvents`.
    action: Option<String>,
    /// Server-side error code from a SOAP fault, e.g. `GRN_CMMN_00105`.
    fault_code: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ApiError {
    /// Creates a new error with the given code and message.
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            action: None,
            fault_code: None,
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::AuthenticationFailed, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::NotFound, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::NetworkError, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::InvalidResponse, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::InternalError, message)
    }

    /// Sets the SOAP action this error belongs to.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the server-side fault code.
    pub fn with_fault_code(mut self, code: impl Into<String>) -> Self {
        self.fault_code = Some(code.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ApiErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the failed action, if set.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Returns the server-side fault code, if any.
    pub fn fault_code(&self) -> Option<&str> {
        self.fault_code.as_deref()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref action) = self.action {
            write!(f, "[{}] ", action)?;
        }
        write!(f, "{}: ", self.code)?;
        if let Some(ref fault) = self.fault_code {
            write!(f, "{}: ", fault)?;
        }
        write!(f, "{}", self.message)
    }
}

/// A specialized Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
