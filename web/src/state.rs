//! Application state shared by every handler.

use crate::form::UploadLimits;
use crate::session::{Key, SessionSettings};
use crate::views::{HtmlRenderer, ViewRenderer};
use axum::extract::FromRef;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared state: the Base API client, the renderer, session cookie settings
/// and decoding limits.
///
/// Generic over the client so tests can run the real router against an
/// in-memory API.
///
/// # Examples
///
/// ```ignore
/// let state = AppState::new(BaseClient::new(token, url))
///     .with_sessions(SessionSettings::from_config(&config.session)?)
///     .with_upload_limits(config.uploads.clone());
/// ```
pub struct AppState<A> {
    /// Base API client
    pub api: Arc<A>,
    /// Page renderer
    pub renderer: Arc<dyn ViewRenderer>,
    /// Session cookie key and attributes
    pub sessions: SessionSettings,
    /// Form decoding limits
    pub uploads: UploadLimits,
    /// Prometheus handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            renderer: Arc::clone(&self.renderer),
            sessions: self.sessions.clone(),
            uploads: self.uploads.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<A> AppState<A> {
    /// State with the built-in HTML renderer, default limits and a random
    /// session key.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api: Arc::new(api),
            renderer: Arc::new(HtmlRenderer::new()),
            sessions: SessionSettings::ephemeral(false),
            uploads: UploadLimits::default(),
            metrics: None,
        }
    }

    /// Use a different renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl ViewRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// Use different session cookie settings.
    #[must_use]
    pub fn with_sessions(mut self, sessions: SessionSettings) -> Self {
        self.sessions = sessions;
        self
    }

    /// Use different decoding limits.
    #[must_use]
    pub fn with_upload_limits(mut self, uploads: UploadLimits) -> Self {
        self.uploads = uploads;
        self
    }

    /// Serve `/metrics` from this handle.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl<A> FromRef<AppState<A>> for Key {
    fn from_ref(state: &AppState<A>) -> Self {
        state.sessions.key().clone()
    }
}

impl<A> FromRef<AppState<A>> for UploadLimits {
    fn from_ref(state: &AppState<A>) -> Self {
        state.uploads.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone() {
        // Axum needs Clone state even when the client is not Clone
        struct NotClone;
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState<NotClone>>();
    }

    #[test]
    fn test_limits_from_state() {
        let limits = UploadLimits {
            file_size: 10,
            ..UploadLimits::default()
        };
        let state = AppState::new(()).with_upload_limits(limits.clone());
        assert_eq!(UploadLimits::from_ref(&state), limits);
    }

    #[test]
    fn test_key_from_state() {
        let sessions = SessionSettings::ephemeral(false);
        let state = AppState::new(()).with_sessions(sessions.clone());
        assert_eq!(Key::from_ref(&state).master(), sessions.key().master());
    }
}
