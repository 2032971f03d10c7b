//! Handler results.
//!
//! Every route handler returns an [`Outcome`]: what to send back, how the
//! session should change, and the API failure it recovered from, if any.
//! Handlers never fail; failures are folded into the outcome here.

use crate::session::SessionUpdate;
use crate::translate::error_message;
use crate::views::{Template, View};
use base_site_client::{ApiError, Page};
use serde::Serialize;

/// Response kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Redirect (303) to a path.
    Redirect(String),
    /// Render a page.
    Render(View),
}

impl Reply {
    /// Label used in metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Redirect(_) => "redirect",
            Self::Render(_) => "render",
        }
    }
}

/// Result of handling one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// What to send back.
    pub reply: Reply,
    /// Session change to commit.
    pub session: SessionUpdate,
    /// Failure the handler recovered from.
    pub failure: Option<ApiError>,
}

impl Outcome {
    /// Redirect to `path`.
    #[must_use]
    pub fn redirect(path: impl Into<String>) -> Self {
        Self {
            reply: Reply::Redirect(path.into()),
            session: SessionUpdate::Keep,
            failure: None,
        }
    }

    /// Render `view`.
    #[must_use]
    pub const fn render(view: View) -> Self {
        Self {
            reply: Reply::Render(view),
            session: SessionUpdate::Keep,
            failure: None,
        }
    }

    /// Ask for a session change.
    #[must_use]
    pub fn with_session(mut self, update: SessionUpdate) -> Self {
        self.session = update;
        self
    }

    /// Record the failure this outcome recovers from.
    #[must_use]
    pub fn after_failure(mut self, error: ApiError) -> Self {
        self.failure = Some(error);
        self
    }
}

/// Re-render a form with the translated message for `error`.
#[must_use]
pub fn resubmit(view: View, error: ApiError) -> Outcome {
    Outcome::render(view.with("error", error_message(&error))).after_failure(error)
}

/// Show a fetched resource, or go back to its listing.
pub fn show_or_redirect<T: Serialize>(
    template: Template,
    key: &str,
    listing: &str,
    result: Result<T, ApiError>,
) -> Outcome {
    match result {
        Ok(resource) => Outcome::render(View::new(template).with(key, resource)),
        Err(error) => Outcome::redirect(listing).after_failure(error),
    }
}

/// Render one page of a listing. A failed fetch renders an empty page with
/// the translated message.
pub fn listing<T: Serialize>(
    template: Template,
    page: i64,
    result: Result<Page<T>, ApiError>,
) -> Outcome {
    match result {
        Ok(data) => Outcome::render(
            View::new(template)
                .with("data", data)
                .with("page", page),
        ),
        Err(error) => resubmit(
            View::new(template)
                .with("data", Page::<T>::empty(page))
                .with("page", page),
            error,
        ),
    }
}

/// Path of one resource under `collection`, with `id` percent-encoded as a
/// single segment.
#[must_use]
pub fn resource_path(collection: &str, id: &str) -> String {
    format!("{collection}/{}", urlencoding::encode(id))
}

/// Redirect to `success` or `failure` depending on `result`.
pub fn redirect_after<T>(result: Result<T, ApiError>, success: String, failure: &str) -> Outcome {
    match result {
        Ok(_) => Outcome::redirect(success),
        Err(error) => Outcome::redirect(failure).after_failure(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base_site_client::User;

    #[test]
    fn test_resubmit_translates_error() {
        let outcome = resubmit(View::new(Template::Login), ApiError::Unauthorized);

        let Reply::Render(view) = &outcome.reply else {
            unreachable!("resubmit always renders");
        };
        assert_eq!(view.context.str("error"), "Unauthorized!");
        assert_eq!(outcome.failure, Some(ApiError::Unauthorized));
        assert_eq!(outcome.session, SessionUpdate::Keep);
    }

    #[test]
    fn test_failed_read_redirects_to_listing() {
        let outcome = show_or_redirect::<User>(
            Template::User,
            "user",
            "/users",
            Err(ApiError::unknown("gone")),
        );
        assert_eq!(outcome.reply, Reply::Redirect("/users".to_string()));
        assert!(outcome.failure.is_some());
    }

    #[test]
    fn test_failed_listing_renders_empty_page() {
        let outcome = listing::<User>(Template::Users, 4, Err(ApiError::unknown("down")));

        let Reply::Render(view) = &outcome.reply else {
            unreachable!("listing always renders");
        };
        assert_eq!(view.context.str("error"), "Something went wrong!");
        assert_eq!(view.context.get("page"), Some(&serde_json::Value::from(4)));
        assert_eq!(
            view.context.get("data").and_then(|d| d.get("items")),
            Some(&serde_json::json!([]))
        );
    }

    #[test]
    fn test_redirect_after() {
        let ok = redirect_after(Ok(()), "/files".to_string(), "/files");
        assert_eq!(ok.reply, Reply::Redirect("/files".to_string()));
        assert!(ok.failure.is_none());

        let failed = redirect_after::<()>(
            Err(ApiError::Unauthorized),
            "/mailing-lists/l1".to_string(),
            "/mailing-lists",
        );
        assert_eq!(failed.reply, Reply::Redirect("/mailing-lists".to_string()));
    }

    #[test]
    fn test_resource_path_encodes_segment() {
        assert_eq!(resource_path("/users", "user-1"), "/users/user-1");
        assert_eq!(resource_path("/mailing-lists", "\n"), "/mailing-lists/%0A");
        assert_eq!(resource_path("/files", "a/b c"), "/files/a%2Fb%20c");
    }

    #[test]
    fn test_resource_path_is_a_valid_location() {
        use axum::response::IntoResponse;

        let path = resource_path("/images", "bad\r\nid");
        let response = axum::response::Redirect::to(&path).into_response();
        assert_eq!(
            response.headers()[axum::http::header::LOCATION],
            "/images/bad%0D%0Aid"
        );
    }
}
