//! User listing, detail, edit and deletion.

use crate::dispatch::{Outcome, listing, resource_path, resubmit, show_or_redirect};
use crate::extractors::RouteInput;
use crate::form::decode_custom_data;
use crate::session::{SessionSnapshot, SessionUpdate};
use crate::views::{Template, View};
use base_site_client::{ApiError, BaseApi, User, UserUpdate};
use serde_json::Value;

const LISTING: &str = "/users";

/// `GET /users`
pub async fn list<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let page = input.page();
    listing(Template::Users, page, api.list_users(page).await)
}

/// `GET /users/:id`
pub async fn show<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let result = api.get_user(input.param("id")).await;
    show_or_redirect(Template::User, "user", LISTING, result)
}

fn edit_view(id: &str, email: &str, custom_data: &str) -> View {
    View::new(Template::UpdateUser)
        .with("id", id)
        .with("email", email)
        .with("custom_data", custom_data)
}

fn custom_data_text(custom_data: Option<&Value>) -> String {
    custom_data
        .filter(|value| !value.is_null())
        .and_then(|value| serde_json::to_string_pretty(value).ok())
        .unwrap_or_default()
}

/// `GET /users/:id/update`
pub async fn edit<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let id = input.param("id");
    match api.get_user(id).await {
        Ok(user) => Outcome::render(edit_view(
            id,
            &user.email,
            &custom_data_text(user.custom_data.as_ref()),
        )),
        Err(error) => Outcome::redirect(LISTING).after_failure(error),
    }
}

/// `POST /users/:id`
pub async fn update<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let id = input.param("id");
    match save(api, id, input).await {
        Ok(user) => Outcome::redirect(resource_path(LISTING, &user.id)),
        Err(error) => resubmit(
            edit_view(id, input.field("email"), input.field("custom_data")),
            error,
        ),
    }
}

async fn save<A: BaseApi>(api: &A, id: &str, input: &RouteInput) -> Result<User, ApiError> {
    let form = input.form()?;
    let user = api.get_user(id).await?;
    let update = UserUpdate {
        email: form.field("email").to_string(),
        custom_data: decode_custom_data(form.field("custom_data"))?,
    };

    api.update_user(&user.id, &update).await
}

/// `POST /users/:id/delete`
///
/// Deleting the signed-in user signs them out.
pub async fn delete<A: BaseApi>(
    api: &A,
    session: &SessionSnapshot,
    input: &RouteInput,
) -> Outcome {
    let id = input.param("id");
    match api.delete_user(id).await {
        Ok(()) if session.is_user(id) => {
            Outcome::redirect(LISTING).with_session(SessionUpdate::SignOut)
        }
        Ok(()) => Outcome::redirect(LISTING),
        Err(error) => Outcome::redirect(LISTING).after_failure(error),
    }
}
