//! Mailing list listing, detail, subscriptions and sending.
//!
//! Every write goes back to the list on success and to the listing on
//! failure, without a message.

use crate::dispatch::{Outcome, listing, redirect_after, resource_path, show_or_redirect};
use crate::extractors::RouteInput;
use crate::views::Template;
use base_site_client::{ApiError, BaseApi, ListMessage};

const LISTING: &str = "/mailing-lists";

/// `GET /mailing-lists`
pub async fn list<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let page = input.page();
    listing(Template::MailingLists, page, api.list_mailing_lists(page).await)
}

/// `GET /mailing-lists/:id`
pub async fn show<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let result = api.get_mailing_list(input.param("id")).await;
    show_or_redirect(Template::MailingList, "list", LISTING, result)
}

fn list_path(id: &str) -> String {
    resource_path(LISTING, id)
}

/// `POST /mailing-lists/:id/subscribe`
pub async fn subscribe<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let id = input.param("id");
    let result = match input.form() {
        Ok(form) => api.subscribe(id, form.field("email")).await,
        Err(error) => Err(error),
    };
    redirect_after(result, list_path(id), LISTING)
}

/// `POST /mailing-lists/:id/unsubscribe`
pub async fn unsubscribe<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let id = input.param("id");
    let result = match input.form() {
        Ok(form) => api.unsubscribe(id, form.field("email")).await,
        Err(error) => Err(error),
    };
    redirect_after(result, list_path(id), LISTING)
}

/// `POST /mailing-lists/:id/send`
pub async fn send<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let id = input.param("id");
    redirect_after(deliver(api, id, input).await, list_path(id), LISTING)
}

async fn deliver<A: BaseApi>(api: &A, id: &str, input: &RouteInput) -> Result<(), ApiError> {
    let form = input.form()?;
    let message = ListMessage {
        subject: form.field("subject").to_string(),
        from: form.field("from").to_string(),
        html: form.field("html").to_string(),
        text: form.field("text").to_string(),
    };

    api.send_to_mailing_list(id, &message).await
}
