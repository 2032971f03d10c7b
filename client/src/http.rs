//! HTTP implementation of [`BaseApi`] on top of `reqwest`.

use crate::error::{ApiError, Result};
use crate::provider::BaseApi;
use crate::types::{
    Credentials, Email, File, Image, ListMessage, MailingList, NewUser, Page, Upload, User,
    UserUpdate,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Base API URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Base API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct BaseClient {
    client: Client,
    access_token: String,
    api_url: String,
}

impl std::fmt::Debug for BaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl BaseClient {
    /// Create a client for the API at `api_url`, authenticating with `access_token`.
    #[must_use]
    pub fn new(access_token: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.into(),
            api_url: api_url.into(),
        }
    }

    /// Create a client from `BASE_ACCESS_TOKEN` and `BASE_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns the lookup error if `BASE_ACCESS_TOKEN` is not set.
    pub fn from_env() -> std::result::Result<Self, std::env::VarError> {
        let access_token = std::env::var("BASE_ACCESS_TOKEN")?;
        let api_url =
            std::env::var("BASE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self::new(access_token, api_url))
    }

    /// Configured API root.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Build an endpoint URL. Segments are percent-encoded, so identifiers
    /// taken from request paths cannot escape their resource.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_url).map_err(ApiError::unknown)?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiError::unknown("Base API URL cannot carry a path"))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        tracing::debug!(method = %method, path = %url.path(), "Base API request");

        Ok(self
            .client
            .request(method, url)
            .bearer_auth(&self.access_token))
    }

    async fn execute(builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Base API request failed to send");
            ApiError::unknown(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = classify(status, &body);
        tracing::warn!(
            status = status.as_u16(),
            kind = error.kind(),
            "Base API call rejected"
        );
        Err(error)
    }

    async fn fetch<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        Self::execute(builder)
            .await?
            .json::<T>()
            .await
            .map_err(ApiError::unknown)
    }

    async fn discard(builder: RequestBuilder) -> Result<()> {
        Self::execute(builder).await.map(drop)
    }

    async fn list<T: DeserializeOwned>(&self, resource: &str, page: i64) -> Result<Page<T>> {
        let builder = self
            .request(Method::GET, &[resource])?
            .query(&[("page", page)]);
        Self::fetch(builder).await
    }

    async fn upload<T: DeserializeOwned>(&self, resource: &str, upload: &Upload) -> Result<T> {
        let form = multipart_form(upload).await?;
        let builder = self.request(Method::POST, &[resource])?.multipart(form);
        Self::fetch(builder).await
    }
}

/// Body of a rejected request.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct Subscription<'a> {
    email: &'a str,
}

/// Map a non-success status to the failure taxonomy.
fn classify(status: StatusCode, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            let detail = serde_json::from_str::<ErrorBody>(body)
                .map_or_else(|_| body.trim().to_string(), |b| b.error);
            ApiError::InvalidRequest { detail }
        }
        other => ApiError::unknown(format!("unexpected status {other}")),
    }
}

async fn multipart_form(upload: &Upload) -> Result<Form> {
    let bytes = tokio::fs::read(&upload.path).await.map_err(|e| {
        ApiError::unknown(format!(
            "cannot read upload {}: {e}",
            upload.path.display()
        ))
    })?;

    let part = Part::bytes(bytes)
        .file_name(upload.filename.clone())
        .mime_str(&upload.content_type)
        .map_err(|_| {
            ApiError::invalid_request(format!(
                "unsupported content type {}",
                upload.content_type
            ))
        })?;

    Ok(Form::new().part("file", part))
}

impl BaseApi for BaseClient {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        Self::fetch(self.request(Method::POST, &["users"])?.json(user)).await
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        Self::fetch(self.request(Method::GET, &["users", id])?).await
    }

    async fn list_users(&self, page: i64) -> Result<Page<User>> {
        self.list("users", page).await
    }

    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User> {
        Self::fetch(self.request(Method::POST, &["users", id])?.json(update)).await
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        Self::discard(self.request(Method::DELETE, &["users", id])?).await
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<User> {
        Self::fetch(self.request(Method::POST, &["sessions"])?.json(credentials)).await
    }

    async fn send_email(&self, email: &Email) -> Result<()> {
        Self::discard(self.request(Method::POST, &["emails"])?.json(email)).await
    }

    async fn create_file(&self, upload: &Upload) -> Result<File> {
        self.upload("files", upload).await
    }

    async fn get_file(&self, id: &str) -> Result<File> {
        Self::fetch(self.request(Method::GET, &["files", id])?).await
    }

    async fn list_files(&self, page: i64) -> Result<Page<File>> {
        self.list("files", page).await
    }

    async fn delete_file(&self, id: &str) -> Result<()> {
        Self::discard(self.request(Method::DELETE, &["files", id])?).await
    }

    async fn create_image(&self, upload: &Upload) -> Result<Image> {
        self.upload("images", upload).await
    }

    async fn get_image(&self, id: &str) -> Result<Image> {
        Self::fetch(self.request(Method::GET, &["images", id])?).await
    }

    async fn list_images(&self, page: i64) -> Result<Page<Image>> {
        self.list("images", page).await
    }

    async fn delete_image(&self, id: &str) -> Result<()> {
        Self::discard(self.request(Method::DELETE, &["images", id])?).await
    }

    async fn list_mailing_lists(&self, page: i64) -> Result<Page<MailingList>> {
        self.list("mailing-lists", page).await
    }

    async fn get_mailing_list(&self, id: &str) -> Result<MailingList> {
        Self::fetch(self.request(Method::GET, &["mailing-lists", id])?).await
    }

    async fn subscribe(&self, id: &str, email: &str) -> Result<MailingList> {
        let builder = self
            .request(Method::POST, &["mailing-lists", id, "subscribe"])?
            .json(&Subscription { email });
        Self::fetch(builder).await
    }

    async fn unsubscribe(&self, id: &str, email: &str) -> Result<MailingList> {
        let builder = self
            .request(Method::POST, &["mailing-lists", id, "unsubscribe"])?
            .json(&Subscription { email });
        Self::fetch(builder).await
    }

    async fn send_to_mailing_list(&self, id: &str, message: &ListMessage) -> Result<()> {
        let builder = self
            .request(Method::POST, &["mailing-lists", id, "send"])?
            .json(message);
        Self::discard(builder).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = BaseClient::new("token", "http://localhost:8080");
        assert_eq!(client.access_token, "token");
        assert_eq!(client.api_url(), "http://localhost:8080");
    }

    #[test]
    fn test_url_encodes_identifiers() {
        let client = BaseClient::new("token", "http://api.test/v1/");
        let url = client.url(&["users", "../sessions"]).unwrap();
        assert_eq!(url.as_str(), "http://api.test/v1/users/..%2Fsessions");
    }

    #[test]
    fn test_classify_unauthorized() {
        assert_eq!(classify(StatusCode::UNAUTHORIZED, ""), ApiError::Unauthorized);
        assert_eq!(classify(StatusCode::FORBIDDEN, ""), ApiError::Unauthorized);
    }

    #[test]
    fn test_classify_invalid_request_reads_error_field() {
        let err = classify(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"error":"Email is already taken"}"#,
        );
        assert_eq!(err, ApiError::invalid_request("Email is already taken"));
    }

    #[test]
    fn test_classify_invalid_request_falls_back_to_body() {
        let err = classify(StatusCode::BAD_REQUEST, "  missing email \n");
        assert_eq!(err, ApiError::invalid_request("missing email"));
    }

    #[test]
    fn test_classify_other_statuses_are_unknown() {
        let err = classify(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, ApiError::Unknown { .. }));
        let err = classify(StatusCode::NOT_FOUND, "");
        assert!(matches!(err, ApiError::Unknown { .. }));
    }
}
