//! The Base API boundary trait.
//!
//! Handlers depend on [`BaseApi`], never on a concrete client. Production
//! wires in [`crate::BaseClient`]; tests use the in-memory mock.

use crate::error::Result;
use crate::types::{
    Credentials, Email, File, Image, ListMessage, MailingList, NewUser, Page, Upload, User,
    UserUpdate,
};
use std::future::Future;

/// Resource-oriented operations offered by the hosted Base API.
///
/// Each method is a single remote call. Implementations never retry and
/// never cache.
pub trait BaseApi: Send + Sync {
    // ═══════════════════════════════════════════════════════════════════════
    // Users
    // ═══════════════════════════════════════════════════════════════════════

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when the API rejects the input (taken email,
    /// mismatched confirmation, ...).
    fn create_user(&self, user: &NewUser) -> impl Future<Output = Result<User>> + Send;

    /// Fetch one user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the call fails.
    fn get_user(&self, id: &str) -> impl Future<Output = Result<User>> + Send;

    /// List users, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    fn list_users(&self, page: i64) -> impl Future<Output = Result<Page<User>>> + Send;

    /// Change a user's email and metadata.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when the API rejects the new values.
    fn update_user(
        &self,
        id: &str,
        update: &UserUpdate,
    ) -> impl Future<Output = Result<User>> + Send;

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the call fails.
    fn delete_user(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    // ═══════════════════════════════════════════════════════════════════════
    // Sessions
    // ═══════════════════════════════════════════════════════════════════════

    /// Check an email/password pair and return the matching user.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the credentials are wrong.
    fn authenticate(&self, credentials: &Credentials)
    -> impl Future<Output = Result<User>> + Send;

    // ═══════════════════════════════════════════════════════════════════════
    // Emails
    // ═══════════════════════════════════════════════════════════════════════

    /// Send a transactional email.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for malformed addresses or missing bodies.
    fn send_email(&self, email: &Email) -> impl Future<Output = Result<()>> + Send;

    // ═══════════════════════════════════════════════════════════════════════
    // Files
    // ═══════════════════════════════════════════════════════════════════════

    /// Upload a file from local disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the API rejects it.
    fn create_file(&self, upload: &Upload) -> impl Future<Output = Result<File>> + Send;

    /// Fetch one file's metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or the call fails.
    fn get_file(&self, id: &str) -> impl Future<Output = Result<File>> + Send;

    /// List files.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    fn list_files(&self, page: i64) -> impl Future<Output = Result<Page<File>>> + Send;

    /// Delete a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or the call fails.
    fn delete_file(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    // ═══════════════════════════════════════════════════════════════════════
    // Images
    // ═══════════════════════════════════════════════════════════════════════

    /// Upload an image from local disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the API rejects it.
    fn create_image(&self, upload: &Upload) -> impl Future<Output = Result<Image>> + Send;

    /// Fetch one image's metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the image does not exist or the call fails.
    fn get_image(&self, id: &str) -> impl Future<Output = Result<Image>> + Send;

    /// List images.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    fn list_images(&self, page: i64) -> impl Future<Output = Result<Page<Image>>> + Send;

    /// Delete an image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image does not exist or the call fails.
    fn delete_image(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    // ═══════════════════════════════════════════════════════════════════════
    // Mailing lists
    // ═══════════════════════════════════════════════════════════════════════

    /// List mailing lists.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    fn list_mailing_lists(
        &self,
        page: i64,
    ) -> impl Future<Output = Result<Page<MailingList>>> + Send;

    /// Fetch one mailing list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list does not exist or the call fails.
    fn get_mailing_list(&self, id: &str) -> impl Future<Output = Result<MailingList>> + Send;

    /// Add an address to a list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list does not exist or the address is rejected.
    fn subscribe(&self, id: &str, email: &str)
    -> impl Future<Output = Result<MailingList>> + Send;

    /// Remove an address from a list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list does not exist or the call fails.
    fn unsubscribe(
        &self,
        id: &str,
        email: &str,
    ) -> impl Future<Output = Result<MailingList>> + Send;

    /// Send a message to every subscriber of a list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list does not exist or the message is rejected.
    fn send_to_mailing_list(
        &self,
        id: &str,
        message: &ListMessage,
    ) -> impl Future<Output = Result<()>> + Send;
}
