//! Resource records returned by the Base API and the inputs sent to it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A user account owned by the Base API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Opaque user identifier.
    pub id: String,
    /// Email address.
    pub email: String,
    /// Free-form metadata attached at registration or update.
    #[serde(default)]
    pub custom_data: Option<serde_json::Value>,
}

/// A stored file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Opaque file identifier.
    pub id: String,
    /// MIME type declared at upload.
    pub content_type: String,
    /// Original filename, when the API reports it.
    #[serde(default)]
    pub name: Option<String>,
}

/// A stored image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Opaque image identifier.
    pub id: String,
    /// MIME type declared at upload.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// A mailing list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailingList {
    /// Opaque list identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Subscribed email addresses.
    #[serde(default)]
    pub subscribers: Vec<String>,
}

/// One page of a paginated listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// Page number that was requested.
    pub page: i64,
    /// Page size, when reported.
    #[serde(default)]
    pub per_page: Option<u32>,
    /// Total record count, when reported.
    #[serde(default)]
    pub total: Option<u64>,
}

impl<T> Page<T> {
    /// An empty page, used when a listing could not be fetched.
    #[must_use]
    pub const fn empty(page: i64) -> Self {
        Self {
            items: Vec::new(),
            page,
            per_page: None,
            total: None,
        }
    }
}

/// Registration input.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewUser {
    /// Email address.
    pub email: String,
    /// Password, passed through untouched.
    pub password: String,
    /// Password confirmation, passed through untouched.
    pub confirmation: String,
    /// Optional metadata.
    pub custom_data: Option<serde_json::Value>,
}

/// Fields that can be changed on an existing user.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserUpdate {
    /// New email address.
    pub email: String,
    /// New metadata (`None` clears it).
    pub custom_data: Option<serde_json::Value>,
}

/// Email/password pair for authentication.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A transactional email.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Email {
    /// Subject line.
    pub subject: String,
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// HTML body.
    pub html: String,
    /// Plain-text body.
    pub text: String,
}

/// A message sent to every subscriber of a mailing list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListMessage {
    /// Subject line.
    pub subject: String,
    /// Sender address.
    pub from: String,
    /// HTML body.
    pub html: String,
    /// Plain-text body.
    pub text: String,
}

/// A file on local disk waiting to be handed to the API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upload {
    /// Location of the (temporary) file.
    pub path: PathBuf,
    /// Original filename as sent by the browser.
    pub filename: String,
    /// Declared MIME type.
    pub content_type: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_without_custom_data() {
        let user: User = serde_json::from_str(r#"{"id":"u1","email":"a@b.com"}"#).unwrap();
        assert_eq!(user.custom_data, None);
    }

    #[test]
    fn test_page_ignores_unknown_fields() {
        let page: Page<Image> =
            serde_json::from_str(r#"{"items":[{"id":"i1"}],"page":2,"cursor":"x"}"#).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.page, 2);
        assert_eq!(page.total, None);
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials {
            email: "a@b.com".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{credentials:?}").contains("hunter2"));
    }
}
