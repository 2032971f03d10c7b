//! # Base API Client
//!
//! Typed boundary to the hosted Base API: users, sessions, transactional
//! email, files, images and mailing lists.
//!
//! ## Example
//!
//! ```no_run
//! use base_site_client::{BaseApi, BaseClient, Credentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads BASE_ACCESS_TOKEN and BASE_API_URL
//!     let client = BaseClient::from_env()?;
//!
//!     let user = client
//!         .authenticate(&Credentials {
//!             email: "ada@example.com".to_string(),
//!             password: "correct horse".to_string(),
//!         })
//!         .await?;
//!
//!     println!("signed in as {}", user.id);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `test-utils` (default): [`mocks::MockBaseApi`], an in-memory API that
//!   records every call

pub mod error;
pub mod http;
pub mod provider;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use error::{ApiError, Result};
pub use http::BaseClient;
pub use provider::BaseApi;
pub use types::{
    Credentials, Email, File, Image, ListMessage, MailingList, NewUser, Page, Upload, User,
    UserUpdate,
};

#[cfg(feature = "test-utils")]
pub use mocks::{ApiCall, MockBaseApi};
