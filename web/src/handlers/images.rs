//! Image upload, listing, detail and deletion.

use crate::dispatch::{
    Outcome, listing, redirect_after, resource_path, resubmit, show_or_redirect,
};
use crate::extractors::RouteInput;
use crate::views::{Template, View};
use base_site_client::{ApiError, BaseApi, Image};

const LISTING: &str = "/images";

/// Multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "image";

/// `GET /upload-image`
#[must_use]
pub fn upload_form() -> Outcome {
    Outcome::render(View::new(Template::UploadImage))
}

/// `POST /upload-image`
pub async fn upload<A: BaseApi>(api: &A, input: &mut RouteInput) -> Outcome {
    match store(api, input).await {
        Ok(image) => Outcome::redirect(resource_path(LISTING, &image.id)),
        Err(error) => resubmit(View::new(Template::UploadImage), error),
    }
}

async fn store<A: BaseApi>(api: &A, input: &mut RouteInput) -> Result<Image, ApiError> {
    let uploaded = input.take_file(UPLOAD_FIELD)?;
    api.create_image(&uploaded.to_upload()).await
}

/// `GET /images`
pub async fn list<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let page = input.page();
    listing(Template::Images, page, api.list_images(page).await)
}

/// `GET /images/:id`
pub async fn show<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let result = api.get_image(input.param("id")).await;
    show_or_redirect(Template::Image, "image", LISTING, result)
}

/// `POST /images/:id/delete`
pub async fn delete<A: BaseApi>(api: &A, input: &RouteInput) -> Outcome {
    let result = api.delete_image(input.param("id")).await;
    redirect_after(result, LISTING.to_string(), LISTING)
}
