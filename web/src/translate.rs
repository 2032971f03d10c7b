//! Failure to user-facing message.

use base_site_client::ApiError;

/// Shown for [`ApiError::Unauthorized`].
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized!";

/// Shown for [`ApiError::Unknown`]. The cause is never rendered.
pub const FALLBACK_MESSAGE: &str = "Something went wrong!";

/// Message to display on a re-rendered form.
#[must_use]
pub fn error_message(error: &ApiError) -> String {
    match error {
        ApiError::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
        ApiError::InvalidRequest { detail } => format!("Invalid request: {detail}"),
        ApiError::Unknown { .. } => FALLBACK_MESSAGE.to_string(),
    }
}
