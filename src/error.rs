//! Backend call errors and their user-facing classification.
//!
//! ERROR HANDLING
//! ==============
//! Every failed request lands in exactly one [`ErrorKind`]. View-models branch on
//! the kind (redirect to `/404`, show a credentials message, raise an alert)
//! instead of matching raw HTTP statuses. Nothing is retried automatically.

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

/// Errors produced by backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received (connect failure, timeout, aborted request).
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The backend rejected the credentials or the bearer token.
    #[error("authentication rejected: status {status}")]
    Unauthorized { status: u16 },

    /// The requested resource does not exist.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// Any other non-success status.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The bearer token cannot be encoded as a header value.
    #[error("invalid header value: {0}")]
    InvalidHeader(String),
}

/// Failure taxonomy shared by all view-models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Connectivity,
    NotFound,
    Server,
}

pub const MSG_INVALID_CREDENTIALS: &str = "Invalid credentials. Please try again.";
pub const MSG_UNREACHABLE: &str = "Unable to reach the server.";
pub const MSG_GENERIC: &str = "Something went wrong. Please try again later.";

impl ApiError {
    /// Map a non-success HTTP status to the matching variant.
    #[must_use]
    pub fn from_status(status: u16, path: &str, body: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            404 => Self::NotFound { path: path.to_owned() },
            _ => Self::Status { status, body },
        }
    }

    /// Map a transport-level `reqwest` failure.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        if err.is_builder() {
            return Self::HttpClientBuild(err.to_string());
        }
        Self::Unreachable(err.to_string())
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Authentication,
            Self::Unreachable(_) => ErrorKind::Connectivity,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Status { .. } | Self::Decode(_) | Self::HttpClientBuild(_) | Self::InvalidHeader(_) => {
                ErrorKind::Server
            }
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "E_UNREACHABLE",
            Self::Unauthorized { .. } => "E_UNAUTHORIZED",
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::Status { .. } => "E_STATUS",
            Self::Decode(_) => "E_DECODE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::InvalidHeader(_) => "E_INVALID_HEADER",
        }
    }

    /// Message shown to the user on the login form.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Authentication => MSG_INVALID_CREDENTIALS,
            ErrorKind::Connectivity => MSG_UNREACHABLE,
            ErrorKind::NotFound | ErrorKind::Server => MSG_GENERIC,
        }
    }
}
