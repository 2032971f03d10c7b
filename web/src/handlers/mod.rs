//! HTTP request handlers.
//!
//! Route handlers are organized by resource. Each takes the API client and
//! the decoded input and returns an [`Outcome`](crate::dispatch::Outcome);
//! none of them can fail.

pub mod account;
pub mod email;
pub mod files;
pub mod health;
pub mod images;
pub mod mailing_lists;
pub mod users;

// Re-export common handler utilities
pub use health::health_check;
