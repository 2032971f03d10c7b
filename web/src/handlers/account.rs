//! Home, registration, login and logout.

use crate::dispatch::{Outcome, resource_path, resubmit};
use crate::extractors::RouteInput;
use crate::form::decode_custom_data;
use crate::session::SessionUpdate;
use crate::views::{Template, View};
use base_site_client::{ApiError, BaseApi, Credentials, NewUser, User};

/// `GET /`
#[must_use]
pub fn home() -> Outcome {
    Outcome::render(View::new(Template::Index))
}

fn register_view(email: &str, custom_data: &str) -> View {
    View::new(Template::Register)
        .with("email", email)
        .with("custom_data", custom_data)
}

/// `GET /register`
#[must_use]
pub fn register_form() -> Outcome {
    Outcome::render(register_view("", ""))
}

/// `POST /register`
pub async fn register<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    match create_user(api, input).await {
        Ok(user) => signed_in(user),
        Err(error) => resubmit(
            register_view(input.field("email"), input.field("custom_data")),
            error,
        ),
    }
}

async fn create_user<A: BaseApi>(api: &A, input: &RouteInput) -> Result<User, ApiError> {
    let form = input.form()?;
    let user = NewUser {
        email: form.field("email").to_string(),
        password: form.field("password").to_string(),
        confirmation: form.field("confirmation").to_string(),
        custom_data: decode_custom_data(form.field("custom_data"))?,
    };

    api.create_user(&user).await
}

fn login_view(email: &str) -> View {
    View::new(Template::Login).with("email", email)
}

/// `GET /login`
#[must_use]
pub fn login_form() -> Outcome {
    Outcome::render(login_view(""))
}

/// `POST /login`
pub async fn login<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    match authenticate(api, input).await {
        Ok(user) => signed_in(user),
        Err(error) => resubmit(login_view(input.field("email")), error),
    }
}

async fn authenticate<A: BaseApi>(api: &A, input: &RouteInput) -> Result<User, ApiError> {
    let form = input.form()?;
    let credentials = Credentials {
        email: form.field("email").to_string(),
        password: form.field("password").to_string(),
    };

    api.authenticate(&credentials).await
}

fn signed_in(user: User) -> Outcome {
    Outcome::redirect(resource_path("/users", &user.id)).with_session(SessionUpdate::SignIn(user.id))
}

/// `GET /logout`
#[must_use]
pub fn logout() -> Outcome {
    Outcome::redirect("/").with_session(SessionUpdate::SignOut)
}
