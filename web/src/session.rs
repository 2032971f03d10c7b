//! Session context.
//!
//! The session is a single signed cookie holding the signed-in user's id.
//! There is no server-side record, so any process holding the same key
//! accepts the cookie.
//!
//! Handlers never touch the cookie. They receive a [`SessionSnapshot`] and
//! return a [`SessionUpdate`]; the route shell commits the update to the
//! response's cookie jar.

use crate::config::{ConfigError, SessionConfig};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};

pub use axum_extra::extract::cookie::Key;

/// Name of the session cookie. Its value is the signed-in user's id.
pub const SESSION_COOKIE: &str = "session";

/// Minimum length of `SESSION_SECRET`, in bytes.
pub const MIN_SECRET_LEN: usize = 64;

/// Read-only view of the visitor's session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Signed-in user, if any.
    pub user_id: Option<String>,
}

impl SessionSnapshot {
    /// A visitor nobody has signed in as.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// A visitor signed in as `user_id`.
    #[must_use]
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    /// Whether someone is signed in.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }

    /// Whether the signed-in user is `user_id`.
    #[must_use]
    pub fn is_user(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }

    /// Read the snapshot from the request's cookies.
    ///
    /// A missing, empty or badly signed cookie reads as anonymous.
    #[must_use]
    pub fn from_jar(jar: &SignedCookieJar) -> Self {
        Self {
            user_id: jar
                .get(SESSION_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .filter(|id| !id.is_empty()),
        }
    }
}

/// Change a handler asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Leave the session alone.
    #[default]
    Keep,
    /// Sign in as the given user.
    SignIn(String),
    /// Forget the signed-in user.
    SignOut,
}

impl SessionUpdate {
    /// The snapshot as it will be once this update is committed.
    #[must_use]
    pub fn apply_to(&self, snapshot: &SessionSnapshot) -> SessionSnapshot {
        match self {
            Self::Keep => snapshot.clone(),
            Self::SignIn(user_id) => SessionSnapshot::signed_in(user_id.clone()),
            Self::SignOut => SessionSnapshot::anonymous(),
        }
    }

    /// Write this update to the response's cookie jar.
    #[must_use]
    pub fn commit(self, jar: SignedCookieJar, settings: &SessionSettings) -> SignedCookieJar {
        match self {
            Self::Keep => jar,
            Self::SignIn(user_id) => jar.add(settings.cookie(user_id)),
            Self::SignOut => jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        }
    }
}

/// Signing key and attributes of the session cookie.
#[derive(Clone)]
pub struct SessionSettings {
    key: Key,
    secure: bool,
}

impl std::fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSettings")
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl SessionSettings {
    /// Settings with an explicit signing key.
    #[must_use]
    pub const fn new(key: Key, secure: bool) -> Self {
        Self { key, secure }
    }

    /// Settings with a fresh random key. Sessions do not survive a restart.
    #[must_use]
    pub fn ephemeral(secure: bool) -> Self {
        Self::new(Key::generate(), secure)
    }

    /// Settings from configuration.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` when the secret is shorter than
    /// [`MIN_SECRET_LEN`] bytes.
    pub fn from_config(config: &SessionConfig) -> Result<Self, ConfigError> {
        let Some(secret) = &config.secret else {
            tracing::warn!("SESSION_SECRET not set, sessions will not survive a restart");
            return Ok(Self::ephemeral(config.secure));
        };

        let key = Key::try_from(secret.as_bytes()).map_err(|_| ConfigError::Invalid {
            key: "SESSION_SECRET".to_string(),
            reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
        })?;
        Ok(Self::new(key, config.secure))
    }

    /// Key the session cookie is signed with.
    #[must_use]
    pub const fn key(&self) -> &Key {
        &self.key
    }

    /// Session cookie for `user_id`. It lasts until the browser closes.
    #[must_use]
    pub fn cookie(&self, user_id: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, user_id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_sign_in() {
        let after = SessionUpdate::SignIn("u1".to_string()).apply_to(&SessionSnapshot::anonymous());
        assert!(after.is_user("u1"));
    }

    #[test]
    fn test_apply_sign_out() {
        let after = SessionUpdate::SignOut.apply_to(&SessionSnapshot::signed_in("u1"));
        assert!(!after.is_logged_in());
    }

    #[test]
    fn test_apply_keep() {
        let before = SessionSnapshot::signed_in("u1");
        assert_eq!(SessionUpdate::Keep.apply_to(&before), before);
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = SessionConfig {
            secret: Some("too short".to_string()),
            secure: false,
        };
        assert!(matches!(
            SessionSettings::from_config(&config),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_long_secret_accepted() {
        let config = SessionConfig {
            secret: Some("s".repeat(MIN_SECRET_LEN)),
            secure: true,
        };
        let settings = SessionSettings::from_config(&config).unwrap();
        assert!(settings.secure);
    }

    #[test]
    fn test_missing_secret_generates_key() {
        let config = SessionConfig {
            secret: None,
            secure: false,
        };
        assert!(SessionSettings::from_config(&config).is_ok());
    }

    #[test]
    fn test_commit_sign_in_then_read() {
        let settings = SessionSettings::ephemeral(false);
        let jar = SignedCookieJar::new(settings.key().clone());

        let jar = SessionUpdate::SignIn("u1".to_string()).commit(jar, &settings);

        assert!(SessionSnapshot::from_jar(&jar).is_user("u1"));
    }

    #[test]
    fn test_commit_sign_out_then_read() {
        let settings = SessionSettings::ephemeral(false);
        let jar = SignedCookieJar::new(settings.key().clone());

        let jar = SessionUpdate::SignIn("u1".to_string()).commit(jar, &settings);
        let jar = SessionUpdate::SignOut.commit(jar, &settings);

        assert!(!SessionSnapshot::from_jar(&jar).is_logged_in());
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = SessionSettings::ephemeral(true).cookie("u1".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "u1");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn test_same_secret_same_key() {
        let config = SessionConfig {
            secret: Some("k".repeat(MIN_SECRET_LEN)),
            secure: false,
        };
        let first = SessionSettings::from_config(&config).unwrap();
        let second = SessionSettings::from_config(&config).unwrap();
        assert_eq!(first.key().master(), second.key().master());
    }
}
