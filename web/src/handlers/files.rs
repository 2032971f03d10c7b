//! File upload, listing, detail and deletion.

use crate::dispatch::{
    Outcome, listing, redirect_after, resource_path, resubmit, show_or_redirect,
};
use crate::extractors::RouteInput;
use crate::views::{Template, View};
use base_site_client::{ApiError, BaseApi, File};

const LISTING: &str = "/files";

/// Multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "file";

/// `GET /upload-file`
#[must_use]
pub fn upload_form() -> Outcome {
    Outcome::render(View::new(Template::UploadFile))
}

/// `POST /upload-file`
///
/// The temporary file is removed before this returns, on every path.
pub async fn upload<A: BaseApi>(api: &A, input: &mut RouteInput) -> Outcome {
    match store(api, input).await {
        Ok(file) => Outcome::redirect(resource_path(LISTING, &file.id)),
        Err(error) => resubmit(View::new(Template::UploadFile), error),
    }
}

async fn store<A: BaseApi>(api: &A, input: &mut RouteInput) -> Result<File, ApiError> {
    let uploaded = input.take_file(UPLOAD_FIELD)?;
    api.create_file(&uploaded.to_upload()).await
}

/// `GET /files`
pub async fn list<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let page = input.page();
    listing(Template::Files, page, api.list_files(page).await)
}

/// `GET /files/:id`
pub async fn show<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let result = api.get_file(input.param("id")).await;
    show_or_redirect(Template::File, "file", LISTING, result)
}

/// `POST /files/:id/delete`
pub async fn delete<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let result = api.delete_file(input.param("id")).await;
    redirect_after(result, LISTING.to_string(), LISTING)
}
