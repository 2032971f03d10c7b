//! Configuration management for the site.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::form::UploadLimits;
use base_site_client::http::DEFAULT_API_URL;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Configuration failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(String),

    /// A variable is set to something unusable.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Site configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listener settings
    pub server: ServerConfig,
    /// Base API connection
    pub api: ApiConfig,
    /// Session cookie
    pub session: SessionConfig,
    /// Form decoding limits
    pub uploads: UploadLimits,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// Base API configuration
#[derive(Clone)]
pub struct ApiConfig {
    /// API root URL
    pub url: String,
    /// Bearer token sent with every call
    pub access_token: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Session cookie configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Cookie signing secret; a random key is used when unset
    pub secret: Option<String>,
    /// Send the cookie over HTTPS only
    pub secure: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("secure", &self.secure)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// `Missing` when `BASE_ACCESS_TOKEN` is not set, `Invalid` when a
    /// numeric or boolean variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    /// if it is set.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = UploadLimits::default();

        Ok(Self {
            server: ServerConfig {
                host: lookup("SITE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "SITE_PORT", 3000)?,
            },
            api: ApiConfig {
                url: lookup("BASE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                access_token: lookup("BASE_ACCESS_TOKEN")
                    .filter(|token| !token.is_empty())
                    .ok_or_else(|| ConfigError::Missing("BASE_ACCESS_TOKEN".to_string()))?,
            },
            session: SessionConfig {
                secret: lookup("SESSION_SECRET").filter(|secret| !secret.is_empty()),
                secure: parse_or(&lookup, "SESSION_SECURE", false)?,
            },
            uploads: UploadLimits {
                field_name_size: parse_or(
                    &lookup,
                    "UPLOAD_FIELD_NAME_SIZE",
                    defaults.field_name_size,
                )?,
                field_size: parse_or(&lookup, "UPLOAD_FIELD_SIZE", defaults.field_size)?,
                file_size: parse_or(&lookup, "UPLOAD_FILE_SIZE", defaults.file_size)?,
                dir: lookup("UPLOAD_DIR").map_or(defaults.dir, PathBuf::from),
            },
        })
    }

    /// Address to bind the listener to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("BASE_ACCESS_TOKEN", "t")])).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.api.url, "http://localhost:8080");
        assert_eq!(config.api.access_token, "t");
        assert!(config.session.secret.is_none());
        assert!(!config.session.secure);
        assert_eq!(config.uploads.field_name_size, 100);
        assert_eq!(config.uploads.field_size, 1_000_000);
        assert_eq!(config.uploads.file_size, 1_000_000);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("BASE_ACCESS_TOKEN", "t"),
            ("SITE_HOST", "127.0.0.1"),
            ("SITE_PORT", "8000"),
            ("SESSION_SECURE", "true"),
            ("UPLOAD_FILE_SIZE", "42"),
            ("UPLOAD_DIR", "/var/tmp/uploads"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert!(config.session.secure);
        assert_eq!(config.uploads.file_size, 42);
        assert_eq!(config.uploads.dir, PathBuf::from("/var/tmp/uploads"));
    }

    #[test]
    fn test_missing_token() {
        let result = Config::from_lookup(lookup(&[]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::Missing("BASE_ACCESS_TOKEN".to_string())
        );
    }

    #[test]
    fn test_invalid_port() {
        let result = Config::from_lookup(lookup(&[
            ("BASE_ACCESS_TOKEN", "t"),
            ("SITE_PORT", "eighty"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { ref key, .. }) if key == "SITE_PORT"
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = Config::from_lookup(lookup(&[
            ("BASE_ACCESS_TOKEN", "top-secret-token"),
            ("SESSION_SECRET", "another-secret"),
        ]))
        .unwrap();

        let debug = format!("{config:?}");
        assert!(!debug.contains("top-secret-token"));
        assert!(!debug.contains("another-secret"));
    }
}
