//! Mock Base API for testing.
//!
//! An in-memory implementation of [`crate::BaseApi`] that records every
//! call, so tests can assert on exactly what the site asked the API to do.

pub mod base_api;

pub use base_api::{ApiCall, MockBaseApi};
