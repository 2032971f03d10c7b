//! Transactional email form.

use crate::dispatch::{Outcome, resubmit};
use crate::extractors::RouteInput;
use crate::views::{Template, View};
use base_site_client::{ApiError, BaseApi, Email};

const FIELDS: [&str; 5] = ["subject", "from", "to", "html", "text"];

/// `GET /send-email`
#[must_use]
pub fn form() -> Outcome {
    Outcome::render(View::new(Template::SendEmail))
}

/// `POST /send-email`
///
/// Success re-renders the empty form with a confirmation.
pub async fn send<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    match deliver(api, input).await {
        Ok(()) => Outcome::render(View::new(Template::SendEmail).with("success", true)),
        Err(error) => {
            let view = FIELDS
                .iter()
                .fold(View::new(Template::SendEmail), |view, field| {
                    view.with(field, input.field(field))
                });
            resubmit(view, error)
        }
    }
}

async fn deliver<A: BaseApi>(api: &A, input: &RouteInput) -> Result<(), ApiError> {
    let form = input.form()?;
    let email = Email {
        subject: form.field("subject").to_string(),
        from: form.field("from").to_string(),
        to: form.field("to").to_string(),
        html: form.field("html").to_string(),
        text: form.field("text").to_string(),
    };

    api.send_email(&email).await
}
