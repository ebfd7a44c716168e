use std::fmt;
use thiserror::Error;

/// Why the transport dropped the stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    Unauthorized,
    InvalidTokenFormat,
}

impl AuthFailure {
    pub fn sentinel(self) -> &'static str {
        match self {
            AuthFailure::Unauthorized => "UNAUTHORIZED",
            AuthFailure::InvalidTokenFormat => "INVALID_TOKEN_FORMAT",
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sentinel())
    }
}

/// Failures raised by the transport itself. Any response that is not an
/// auth failure is handed back to the caller instead.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    AuthExpired(AuthFailure),
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("invalid request path {path}: {reason}")]
    InvalidPath { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Credential already cleared; callers show nothing and let the
    /// navigation owner redirect to login.
    #[error("{0}")]
    AuthExpired(AuthFailure),
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("request failed with status {status}{}", detail_suffix(.message))]
    Status {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },
    #[error("decode response: {0}")]
    Decode(String),
    #[error("{0}")]
    Request(String),
}

fn detail_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .filter(|message| !message.is_empty())
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

impl ApiError {
    /// HTTP status for diagnostics; transport failures without a response
    /// report 0.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Status { status, .. } => *status,
            ApiError::Network(err) => err.status().map(|status| status.as_u16()).unwrap_or(0),
            ApiError::AuthExpired(AuthFailure::Unauthorized) => 401,
            ApiError::AuthExpired(AuthFailure::InvalidTokenFormat) => 400,
            ApiError::Decode(_) | ApiError::Request(_) => 0,
        }
    }

    /// Message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref().filter(|m| !m.is_empty()),
            _ => None,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::AuthExpired(reason) => ApiError::AuthExpired(reason),
            TransportError::Network(err) => ApiError::Network(err),
            TransportError::InvalidPath { path, reason } => {
                ApiError::Request(format!("invalid request path {path}: {reason}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_match_backend_codes() {
        assert_eq!(AuthFailure::Unauthorized.to_string(), "UNAUTHORIZED");
        assert_eq!(
            AuthFailure::InvalidTokenFormat.to_string(),
            "INVALID_TOKEN_FORMAT"
        );
    }

    #[test]
    fn status_error_exposes_code_and_message() {
        let err = ApiError::Status {
            status: 404,
            code: None,
            message: Some("not here".to_string()),
        };
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.server_message(), Some("not here"));
        assert_eq!(err.to_string(), "request failed with status 404: not here");
    }

    #[test]
    fn empty_server_message_is_ignored() {
        let err = ApiError::Status {
            status: 409,
            code: None,
            message: Some(String::new()),
        };
        assert_eq!(err.server_message(), None);
        assert_eq!(err.to_string(), "request failed with status 409");
    }
}
