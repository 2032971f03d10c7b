//! Request input extractor.
//!
//! [`RouteInput`] gathers everything a route handler may read: path
//! parameters, query parameters and the decoded body. It never rejects a
//! request. A body that fails to decode is kept as an `Err` so the handler
//! can re-render its form with the translated message.
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(input: RouteInput) -> String {
//!     format!("page {} of user {}", input.page(), input.param("id"))
//! }
//! ```

use crate::form::{FormSubmission, UploadLimits, UploadedFile, parse_page};
use axum::{
    async_trait,
    extract::{FromRef, FromRequest, FromRequestParts, Multipart, Path, Query, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use base_site_client::ApiError;
use std::collections::HashMap;

/// Decoded request input.
#[derive(Debug)]
pub struct RouteInput {
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    form: Result<FormSubmission, ApiError>,
}

impl Default for RouteInput {
    fn default() -> Self {
        Self::new(HashMap::new(), HashMap::new(), Ok(FormSubmission::default()))
    }
}

impl RouteInput {
    /// Assemble input from already-decoded parts.
    #[must_use]
    pub fn new(
        params: HashMap<String, String>,
        query: HashMap<String, String>,
        form: Result<FormSubmission, ApiError>,
    ) -> Self {
        Self {
            params,
            query,
            form,
        }
    }

    /// Path parameter `name`, or `""`.
    #[must_use]
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).map_or("", String::as_str)
    }

    /// Query parameter `name`.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// The `page` query parameter, 1 when missing or not a number.
    #[must_use]
    pub fn page(&self) -> i64 {
        parse_page(self.query("page"))
    }

    /// The decoded body.
    ///
    /// # Errors
    ///
    /// The decode failure, if the body could not be decoded.
    pub fn form(&self) -> Result<&FormSubmission, ApiError> {
        self.form.as_ref().map_err(Clone::clone)
    }

    /// Body field `name`, or `""` (also when the body failed to decode).
    #[must_use]
    pub fn field(&self, name: &str) -> &str {
        self.form.as_ref().map_or("", |form| form.field(name))
    }

    /// Take the single file uploaded under `name`.
    ///
    /// # Errors
    ///
    /// The decode failure, or `InvalidRequest` when the upload is missing
    /// or ambiguous.
    pub fn take_file(&mut self, name: &str) -> Result<UploadedFile, ApiError> {
        match &mut self.form {
            Ok(form) => form.take_file(name),
            Err(error) => Err(error.clone()),
        }
    }
}

#[async_trait]
impl<S> FromRequest<S> for RouteInput
where
    S: Send + Sync,
    UploadLimits: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let limits = UploadLimits::from_ref(state);
        let (mut parts, body) = req.into_parts();

        let params = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .map(|Path(params)| params)
            .unwrap_or_default();
        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(query)| query)
            .unwrap_or_default();

        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let req = Request::from_parts(parts, body);

        let form = if content_type.starts_with("multipart/form-data") {
            match Multipart::from_request(req, state).await {
                Ok(multipart) => FormSubmission::from_multipart(multipart, &limits).await,
                Err(rejection) => Err(ApiError::invalid_request(rejection.body_text())),
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            match Form::<Vec<(String, String)>>::from_request(req, state).await {
                Ok(Form(pairs)) => FormSubmission::from_pairs(pairs, &limits),
                Err(rejection) => Err(ApiError::invalid_request(rejection.body_text())),
            }
        } else {
            Ok(FormSubmission::default())
        };

        if let Err(error) = &form {
            tracing::debug!(error = %error, "Request body rejected by form decoder");
        }

        Ok(Self::new(params, query, form))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[derive(Clone)]
    struct TestState(UploadLimits);

    impl FromRef<TestState> for UploadLimits {
        fn from_ref(state: &TestState) -> Self {
            state.0.clone()
        }
    }

    async fn extract(request: axum::http::Request<Body>) -> RouteInput {
        RouteInput::from_request(request, &TestState(UploadLimits::default()))
            .await
            .expect("Should extract")
    }

    #[tokio::test]
    async fn test_urlencoded_body() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/login?page=2")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email=a%40b.com&password=p+q"))
            .expect("Valid request");

        let input = extract(request).await;
        assert_eq!(input.field("email"), "a@b.com");
        assert_eq!(input.field("password"), "p q");
        assert_eq!(input.page(), 2);
    }

    #[tokio::test]
    async fn test_no_body() {
        let request = axum::http::Request::builder()
            .uri("/users")
            .body(Body::empty())
            .expect("Valid request");

        let input = extract(request).await;
        assert!(input.form().is_ok());
        assert_eq!(input.field("email"), "");
        assert_eq!(input.page(), 1);
        assert_eq!(input.param("id"), "");
    }

    #[tokio::test]
    async fn test_oversized_field_is_carried_as_error() {
        let body = format!("text={}", "x".repeat(1_000_001));
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/send-email")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("Valid request");

        let input = extract(request).await;
        assert!(matches!(input.form(), Err(ApiError::InvalidRequest { .. })));
        assert_eq!(input.field("text"), "");
    }

    #[tokio::test]
    async fn test_multipart_file_is_spooled() {
        let dir = tempfile::tempdir().unwrap();
        let limits = UploadLimits {
            dir: dir.path().to_path_buf(),
            ..UploadLimits::default()
        };
        let body = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n\
            Content-Type: text/plain\r\n\r\n\
            hello\r\n\
            --XYZ--\r\n";
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/upload-file")
            .header(CONTENT_TYPE, "multipart/form-data; boundary=XYZ")
            .body(Body::from(body))
            .expect("Valid request");

        let mut input = RouteInput::from_request(request, &TestState(limits))
            .await
            .expect("Should extract");
        let file = input.take_file("file").unwrap();

        assert_eq!(file.filename, "notes.txt");
        assert_eq!(file.content_type, "text/plain");
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "hello");

        drop(file);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
