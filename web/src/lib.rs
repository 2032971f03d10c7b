//! Server-rendered site over the Base API.
//!
//! The site is a thin shell around a hosted API: every page either renders
//! a view or redirects, and every form action makes at most one API call.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← HTTP, cookies, multipart
//! │  - Route table + shell (routes)         │  ← Session load/commit
//! │  - Request decoding (extractors, form)  │  ← Logging, metrics
//! ├─────────────────────────────────────────┤
//! │         Route handlers                  │
//! │  - One API call per action              │  ← Snapshot in, update out
//! │  - Outcome values (dispatch)            │  ← Redirect or view
//! │  - Error translation (translate)        │  ← Never fail
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at the route's shell
//! 2. **Decode input**: path, query and url-encoded or multipart form
//! 3. **Load session** snapshot
//! 4. **Dispatch** to the handler, which calls the Base API
//! 5. **Commit** the session update
//! 6. **Reply** with a redirect or rendered HTML
//!
//! # Example
//!
//! ```ignore
//! use base_site_client::BaseClient;
//! use base_site_web::{build_router, AppState, SessionSettings};
//!
//! let state = AppState::new(BaseClient::new(token, url))
//!     .with_sessions(SessionSettings::from_config(&config.session)?);
//! let app = build_router(state);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod extractors;
pub mod form;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;
pub mod translate;
pub mod views;

// Re-export key types for convenience
pub use config::{Config, ConfigError};
pub use dispatch::{Outcome, Reply};
pub use error::AppError;
pub use extractors::RouteInput;
pub use middleware::{REQUEST_ID_HEADER, RequestIdExt, request_id_layer};
pub use routes::{ROUTES, Route, RouteSpec};
pub use session::{SessionSettings, SessionSnapshot, SessionUpdate};
pub use state::AppState;
pub use views::{HtmlRenderer, Template, View, ViewRenderer};

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    routing::{get, on},
};
use axum_extra::extract::cookie::SignedCookieJar;
use base_site_client::BaseApi;

/// Build the site's router: every row of [`ROUTES`], `/health`, `/metrics`
/// and an HTML 404 fallback.
///
/// Bodies over the upload limits' overall cap fail to decode, and the route
/// re-renders its form with the translated message.
pub fn build_router<A: BaseApi + 'static>(state: AppState<A>) -> Router {
    let mut router = Router::new();

    for spec in &ROUTES {
        router = router.route(
            spec.path,
            on(
                spec.verb.filter(),
                move |State(state): State<AppState<A>>, jar: SignedCookieJar, input: RouteInput| {
                    routes::serve(spec, state, jar, input)
                },
            ),
        );
    }

    let body_limit = state.uploads.body_limit();

    router
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::health::metrics::<A>))
        .fallback(handlers::health::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(request_id_layer())
        .with_state(state)
}
