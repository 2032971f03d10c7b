//! Failure taxonomy for calls made through the Base API client.
//!
//! Every failure the site can observe, whether raised by the remote API,
//! by the transport, or by the form decoder before a call is made, is one
//! of three variants. The set is closed so callers can match exhaustively.

use thiserror::Error;

/// Result type alias for Base API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// A categorized failure from the Base API boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid credentials or access denied.
    #[error("Unauthorized")]
    Unauthorized,

    /// The input was rejected, either by the remote API's validation or
    /// while decoding the submitted form.
    #[error("Invalid request: {detail}")]
    InvalidRequest {
        /// Server-supplied (or decoder-supplied) explanation.
        detail: String,
    },

    /// Anything else: network errors, unexpected statuses, malformed bodies.
    #[error("Unknown error: {cause}")]
    Unknown {
        /// Diagnostic text. Meant for logs, not for rendered pages.
        cause: String,
    },
}

impl ApiError {
    /// Build an [`ApiError::InvalidRequest`].
    #[must_use]
    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::InvalidRequest {
            detail: detail.into(),
        }
    }

    /// Build an [`ApiError::Unknown`] from anything displayable.
    #[must_use]
    pub fn unknown(cause: impl std::fmt::Display) -> Self {
        Self::Unknown {
            cause: cause.to_string(),
        }
    }

    /// Short, stable label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Unknown { .. } => "unknown",
        }
    }

    /// Returns `true` if the failure was caused by what the visitor submitted.
    ///
    /// # Examples
    ///
    /// ```
    /// # use base_site_client::ApiError;
    /// assert!(ApiError::Unauthorized.is_user_error());
    /// assert!(ApiError::invalid_request("Email is taken").is_user_error());
    /// assert!(!ApiError::unknown("connection reset").is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::InvalidRequest { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::unknown(err)
    }
}
