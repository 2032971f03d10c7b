//! Route table and the shell that runs it.
//!
//! Every route is one [`RouteSpec`] row in [`ROUTES`]. The router binds each
//! row to [`serve`], which runs the same steps for all of them:
//!
//! 1. **Read** the session snapshot from the signed cookie
//! 2. **Guard** anonymous-only routes
//! 3. **Dispatch** to the route's handler
//! 4. **Commit** the session update the handler asked for to the cookie jar
//! 5. **Reply** with a redirect or a rendered page, plus the jar

use crate::dispatch::{Outcome, Reply};
use crate::error::AppError;
use crate::extractors::RouteInput;
use crate::handlers::{account, email, files, images, mailing_lists, users};
use crate::metrics::{record_api_failure, record_route_outcome};
use crate::session::{SessionSnapshot, SessionUpdate};
use crate::state::AppState;
use axum::{
    response::{Html, IntoResponse, Redirect, Response},
    routing::MethodFilter,
};
use axum_extra::extract::cookie::SignedCookieJar;
use base_site_client::{ApiError, BaseApi};

/// HTTP method of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl Verb {
    /// Method filter for the router.
    #[must_use]
    pub const fn filter(self) -> MethodFilter {
        match self {
            Self::Get => MethodFilter::GET,
            Self::Post => MethodFilter::POST,
        }
    }
}

/// Who may use a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Anyone.
    Open,
    /// Only visitors who are not signed in; others go to `/`.
    AnonymousOnly,
}

/// What a route does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Route {
    Home,
    RegisterForm,
    Register,
    LoginForm,
    Login,
    Logout,
    ListUsers,
    ShowUser,
    EditUser,
    UpdateUser,
    DeleteUser,
    SendEmailForm,
    SendEmail,
    UploadFileForm,
    UploadFile,
    ListFiles,
    ShowFile,
    DeleteFile,
    UploadImageForm,
    UploadImage,
    ListImages,
    ShowImage,
    DeleteImage,
    ListMailingLists,
    ShowMailingList,
    Subscribe,
    Unsubscribe,
    SendToMailingList,
}

impl Route {
    /// Stable name used in logs and metrics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::RegisterForm => "register_form",
            Self::Register => "register",
            Self::LoginForm => "login_form",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::ListUsers => "users.list",
            Self::ShowUser => "users.show",
            Self::EditUser => "users.edit",
            Self::UpdateUser => "users.update",
            Self::DeleteUser => "users.delete",
            Self::SendEmailForm => "email.form",
            Self::SendEmail => "email.send",
            Self::UploadFileForm => "files.upload_form",
            Self::UploadFile => "files.upload",
            Self::ListFiles => "files.list",
            Self::ShowFile => "files.show",
            Self::DeleteFile => "files.delete",
            Self::UploadImageForm => "images.upload_form",
            Self::UploadImage => "images.upload",
            Self::ListImages => "images.list",
            Self::ShowImage => "images.show",
            Self::DeleteImage => "images.delete",
            Self::ListMailingLists => "mailing_lists.list",
            Self::ShowMailingList => "mailing_lists.show",
            Self::Subscribe => "mailing_lists.subscribe",
            Self::Unsubscribe => "mailing_lists.unsubscribe",
            Self::SendToMailingList => "mailing_lists.send",
        }
    }
}

/// One row of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSpec {
    /// HTTP method.
    pub verb: Verb,
    /// Path pattern.
    pub path: &'static str,
    /// Handler.
    pub route: Route,
    /// Access rule.
    pub guard: Guard,
}

const fn open(verb: Verb, path: &'static str, route: Route) -> RouteSpec {
    RouteSpec {
        verb,
        path,
        route,
        guard: Guard::Open,
    }
}

const fn anonymous(verb: Verb, path: &'static str, route: Route) -> RouteSpec {
    RouteSpec {
        verb,
        path,
        route,
        guard: Guard::AnonymousOnly,
    }
}

/// Every page and form action of the site.
pub static ROUTES: [RouteSpec; 28] = [
    open(Verb::Get, "/", Route::Home),
    anonymous(Verb::Get, "/register", Route::RegisterForm),
    anonymous(Verb::Post, "/register", Route::Register),
    anonymous(Verb::Get, "/login", Route::LoginForm),
    anonymous(Verb::Post, "/login", Route::Login),
    open(Verb::Get, "/logout", Route::Logout),
    open(Verb::Get, "/users", Route::ListUsers),
    open(Verb::Get, "/users/:id", Route::ShowUser),
    open(Verb::Get, "/users/:id/update", Route::EditUser),
    open(Verb::Post, "/users/:id", Route::UpdateUser),
    open(Verb::Post, "/users/:id/delete", Route::DeleteUser),
    open(Verb::Get, "/send-email", Route::SendEmailForm),
    open(Verb::Post, "/send-email", Route::SendEmail),
    open(Verb::Get, "/upload-file", Route::UploadFileForm),
    open(Verb::Post, "/upload-file", Route::UploadFile),
    open(Verb::Get, "/files", Route::ListFiles),
    open(Verb::Get, "/files/:id", Route::ShowFile),
    open(Verb::Post, "/files/:id/delete", Route::DeleteFile),
    open(Verb::Get, "/upload-image", Route::UploadImageForm),
    open(Verb::Post, "/upload-image", Route::UploadImage),
    open(Verb::Get, "/images", Route::ListImages),
    open(Verb::Get, "/images/:id", Route::ShowImage),
    open(Verb::Post, "/images/:id/delete", Route::DeleteImage),
    open(Verb::Get, "/mailing-lists", Route::ListMailingLists),
    open(Verb::Get, "/mailing-lists/:id", Route::ShowMailingList),
    open(Verb::Post, "/mailing-lists/:id/subscribe", Route::Subscribe),
    open(Verb::Post, "/mailing-lists/:id/unsubscribe", Route::Unsubscribe),
    open(Verb::Post, "/mailing-lists/:id/send", Route::SendToMailingList),
];

/// Run the handler for `route`.
pub async fn dispatch<A: BaseApi>(
    route: Route,
    api: &A,
    session: &SessionSnapshot,
    mut input: RouteInput,
) -> Outcome {
    match route {
        Route::Home => account::home(),
        Route::RegisterForm => account::register_form(),
        Route::Register => account::register(api, &input).await,
        Route::LoginForm => account::login_form(),
        Route::Login => account::login(api, &input).await,
        Route::Logout => account::logout(),
        Route::ListUsers => users::list(api, &input).await,
        Route::ShowUser => users::show(api, &input).await,
        Route::EditUser => users::edit(api, &input).await,
        Route::UpdateUser => users::update(api, &input).await,
        Route::DeleteUser => users::delete(api, session, &input).await,
        Route::SendEmailForm => email::form(),
        Route::SendEmail => email::send(api, &input).await,
        Route::UploadFileForm => files::upload_form(),
        Route::UploadFile => files::upload(api, &mut input).await,
        Route::ListFiles => files::list(api, &input).await,
        Route::ShowFile => files::show(api, &input).await,
        Route::DeleteFile => files::delete(api, &input).await,
        Route::UploadImageForm => images::upload_form(),
        Route::UploadImage => images::upload(api, &mut input).await,
        Route::ListImages => images::list(api, &input).await,
        Route::ShowImage => images::show(api, &input).await,
        Route::DeleteImage => images::delete(api, &input).await,
        Route::ListMailingLists => mailing_lists::list(api, &input).await,
        Route::ShowMailingList => mailing_lists::show(api, &input).await,
        Route::Subscribe => mailing_lists::subscribe(api, &input).await,
        Route::Unsubscribe => mailing_lists::unsubscribe(api, &input).await,
        Route::SendToMailingList => mailing_lists::send(api, &input).await,
    }
}

/// Handle one request for `spec`.
///
/// # Errors
///
/// Only failures outside the route convention: a view that cannot be
/// rendered.
pub async fn serve<A: BaseApi + 'static>(
    spec: &'static RouteSpec,
    state: AppState<A>,
    jar: SignedCookieJar,
    input: RouteInput,
) -> Result<Response, AppError> {
    let snapshot = SessionSnapshot::from_jar(&jar);
    let route = spec.route.name();

    let outcome = if spec.guard == Guard::AnonymousOnly && snapshot.is_logged_in() {
        tracing::debug!(route, "Signed-in visitor sent home");
        Outcome::redirect("/")
    } else {
        dispatch(spec.route, state.api.as_ref(), &snapshot, input).await
    };

    if let Some(error) = &outcome.failure {
        log_failure(route, error);
    }
    record_route_outcome(route, outcome.reply.kind());

    let after = outcome.session.apply_to(&snapshot);
    if outcome.session != SessionUpdate::Keep {
        tracing::info!(route, logged_in = after.is_logged_in(), "Session updated");
    }
    let jar = outcome.session.commit(jar, &state.sessions);

    match outcome.reply {
        Reply::Redirect(path) => Ok((jar, Redirect::to(&path)).into_response()),
        Reply::Render(mut view) => {
            view.context.insert("logged_in", after.is_logged_in());
            let html = state.renderer.render(view.template, &view.context)?;
            Ok((jar, Html(html)).into_response())
        }
    }
}

fn log_failure(route: &'static str, error: &ApiError) {
    record_api_failure(route, error.kind());
    match error {
        ApiError::Unknown { cause } => {
            tracing::warn!(route, kind = error.kind(), cause = %cause, "Base API call failed");
        }
        _ => tracing::warn!(route, kind = error.kind(), "Base API call rejected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_routes_are_unique() {
        let mut seen = HashSet::new();
        for spec in &ROUTES {
            assert!(
                seen.insert((spec.verb, spec.path)),
                "duplicate route {:?} {}",
                spec.verb,
                spec.path
            );
        }
    }

    #[test]
    fn test_only_login_and_register_are_guarded() {
        let guarded: Vec<_> = ROUTES
            .iter()
            .filter(|spec| spec.guard == Guard::AnonymousOnly)
            .map(|spec| spec.path)
            .collect();
        assert_eq!(guarded, ["/register", "/register", "/login", "/login"]);
    }

    #[test]
    fn test_route_names_are_unique() {
        let names: HashSet<_> = ROUTES.iter().map(|spec| spec.route.name()).collect();
        assert_eq!(names.len(), ROUTES.len());
    }
}
