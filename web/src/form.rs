//! Form decoding.
//!
//! Turns url-encoded and multipart bodies into a [`FormSubmission`]. String
//! values pass through untouched. Every limit violation is reported as
//! [`ApiError::InvalidRequest`], so a rejected upload reaches the same
//! translated-error page as a rejection from the API itself.

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use base_site_client::{ApiError, Upload};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Size limits applied while decoding a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    /// Maximum length of a field name, in bytes.
    pub field_name_size: usize,
    /// Maximum length of a non-file field value, in bytes.
    pub field_size: usize,
    /// Maximum size of an uploaded file, in bytes.
    pub file_size: usize,
    /// Directory for temporary upload files.
    pub dir: PathBuf,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            field_name_size: 100,
            field_size: 1_000_000,
            file_size: 1_000_000,
            dir: std::env::temp_dir(),
        }
    }
}

impl UploadLimits {
    /// Hard cap for a whole request body: room for one file and a few
    /// full-size fields plus multipart framing.
    #[must_use]
    pub const fn body_limit(&self) -> usize {
        self.file_size
            .saturating_add(self.field_size.saturating_mul(4))
            .saturating_add(64 * 1024)
    }
}

/// A file received in a multipart body, held in a temporary file.
///
/// The temporary file is deleted when this value is dropped, whichever way
/// the request ends.
#[derive(Debug)]
pub struct UploadedFile {
    /// Filename as sent by the browser.
    pub filename: String,
    /// Declared MIME type.
    pub content_type: String,
    temp: NamedTempFile,
}

impl UploadedFile {
    /// Where the contents live until this value is dropped.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        self.temp.path()
    }

    /// Describe this file for the API client.
    #[must_use]
    pub fn to_upload(&self) -> Upload {
        Upload {
            path: self.path().to_path_buf(),
            filename: self.filename.clone(),
            content_type: self.content_type.clone(),
        }
    }
}

/// Decoded request body: ordered fields plus uploaded files.
#[derive(Debug, Default)]
pub struct FormSubmission {
    fields: Vec<(String, String)>,
    files: Vec<(String, UploadedFile)>,
}

impl FormSubmission {
    /// Value of `name`, or `""` when the field was not submitted.
    #[must_use]
    pub fn field(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map_or("", |(_, value)| value.as_str())
    }

    /// Take the single file uploaded under `name`.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when no file, more than one file, or a file under a
    /// different field name was submitted.
    pub fn take_file(&mut self, name: &str) -> Result<UploadedFile, ApiError> {
        if let Some((other, _)) = self.files.iter().find(|(field, _)| field != name) {
            return Err(ApiError::invalid_request(format!(
                "Unexpected file field {other}"
            )));
        }

        match self.files.len() {
            0 => Err(ApiError::invalid_request("No file was uploaded")),
            1 => Ok(self.files.remove(0).1),
            _ => Err(ApiError::invalid_request(format!(
                "Only one file may be uploaded as {name}"
            ))),
        }
    }

    /// Build a submission from url-encoded pairs.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when a name or value exceeds `limits`.
    pub fn from_pairs(
        pairs: Vec<(String, String)>,
        limits: &UploadLimits,
    ) -> Result<Self, ApiError> {
        for (name, value) in &pairs {
            check_field_name(name, limits)?;
            if value.len() > limits.field_size {
                return Err(field_too_large(name, limits));
            }
        }

        Ok(Self {
            fields: pairs,
            files: Vec::new(),
        })
    }

    /// Decode a multipart body, spooling file parts to temporary files.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for malformed bodies and limit violations, `Unknown`
    /// when a temporary file cannot be written.
    pub async fn from_multipart(
        mut multipart: Multipart,
        limits: &UploadLimits,
    ) -> Result<Self, ApiError> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();
            check_field_name(&name, limits)?;

            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let (temp, size) = spool(field, &name, limits).await?;

                    // An empty file input still sends a part
                    if filename.is_empty() && size == 0 {
                        continue;
                    }

                    submission.files.push((
                        name,
                        UploadedFile {
                            filename,
                            content_type,
                            temp,
                        },
                    ));
                }
                None => {
                    let value = read_value(field, &name, limits).await?;
                    submission.fields.push((name, value));
                }
            }
        }

        Ok(submission)
    }
}

fn check_field_name(name: &str, limits: &UploadLimits) -> Result<(), ApiError> {
    if name.len() > limits.field_name_size {
        return Err(ApiError::invalid_request(format!(
            "Field name exceeds {} bytes",
            limits.field_name_size
        )));
    }
    Ok(())
}

fn field_too_large(name: &str, limits: &UploadLimits) -> ApiError {
    ApiError::invalid_request(format!(
        "Field {name} exceeds {} bytes",
        limits.field_size
    ))
}

fn malformed(error: MultipartError) -> ApiError {
    ApiError::invalid_request(format!("Malformed form data: {}", error.body_text()))
}

async fn read_value(
    mut field: Field<'_>,
    name: &str,
    limits: &UploadLimits,
) -> Result<String, ApiError> {
    let mut value = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        if value.len() + chunk.len() > limits.field_size {
            return Err(field_too_large(name, limits));
        }
        value.extend_from_slice(&chunk);
    }

    String::from_utf8(value)
        .map_err(|_| ApiError::invalid_request(format!("Field {name} is not valid UTF-8")))
}

async fn spool(
    mut field: Field<'_>,
    name: &str,
    limits: &UploadLimits,
) -> Result<(NamedTempFile, usize), ApiError> {
    let mut temp = NamedTempFile::new_in(&limits.dir)
        .map_err(|e| ApiError::unknown(format!("cannot create upload file: {e}")))?;
    let mut size = 0usize;

    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        size += chunk.len();
        if size > limits.file_size {
            return Err(ApiError::invalid_request(format!(
                "File {name} exceeds {} bytes",
                limits.file_size
            )));
        }
        temp.write_all(&chunk)
            .map_err(|e| ApiError::unknown(format!("cannot write upload file: {e}")))?;
    }

    temp.flush()
        .map_err(|e| ApiError::unknown(format!("cannot write upload file: {e}")))?;
    Ok((temp, size))
}

/// Decode the free-form `custom_data` field.
///
/// Empty or whitespace-only input means no metadata.
///
/// # Errors
///
/// `InvalidRequest` when the input is not valid JSON.
pub fn decode_custom_data(raw: &str) -> Result<Option<serde_json::Value>, ApiError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(raw)
        .map(Some)
        .map_err(|e| ApiError::invalid_request(format!("custom_data is not valid JSON: {e}")))
}

/// Page number from a `page` query value.
///
/// Reads the leading integer (optional sign, then digits) after any
/// leading whitespace. Missing, empty or non-numeric input means page 1.
/// Zero and negative numbers are passed through.
#[must_use]
pub fn parse_page(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return 1;
    };
    let raw = raw.trim_start();

    let sign_len = usize::from(raw.starts_with(['+', '-']));
    let digits = raw[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();

    if digits == 0 {
        return 1;
    }
    raw[..sign_len + digits].parse().unwrap_or(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn limits() -> UploadLimits {
        UploadLimits {
            field_name_size: 8,
            field_size: 16,
            file_size: 32,
            dir: std::env::temp_dir(),
        }
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_missing_field_is_empty() {
        let form = FormSubmission::from_pairs(pairs(&[("email", "a@b.com")]), &limits()).unwrap();
        assert_eq!(form.field("email"), "a@b.com");
        assert_eq!(form.field("password"), "");
    }

    #[test]
    fn test_values_are_not_trimmed() {
        let form = FormSubmission::from_pairs(pairs(&[("password", "  p ")]), &limits()).unwrap();
        assert_eq!(form.field("password"), "  p ");
    }

    #[test]
    fn test_long_field_name_rejected() {
        let result = FormSubmission::from_pairs(pairs(&[("a_very_long_name", "x")]), &limits());
        assert!(matches!(result, Err(ApiError::InvalidRequest { .. })));
    }

    #[test]
    fn test_long_value_rejected() {
        let value = "x".repeat(17);
        let result = FormSubmission::from_pairs(pairs(&[("text", &value)]), &limits());
        assert!(matches!(result, Err(ApiError::InvalidRequest { .. })));
    }

    #[test]
    fn test_take_file_without_upload() {
        let mut form = FormSubmission::default();
        let result = form.take_file("file");
        assert_eq!(
            result.unwrap_err(),
            ApiError::invalid_request("No file was uploaded")
        );
    }

    #[test]
    fn test_uploaded_file_removed_on_drop() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().to_path_buf();
        let file = UploadedFile {
            filename: "a.txt".to_string(),
            content_type: "text/plain".to_string(),
            temp,
        };

        assert!(path.exists());
        assert_eq!(file.to_upload().path, path);
        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_take_file_rejects_other_field() {
        let mut form = FormSubmission::default();
        form.files.push((
            "image".to_string(),
            UploadedFile {
                filename: "a.png".to_string(),
                content_type: "image/png".to_string(),
                temp: NamedTempFile::new().unwrap(),
            },
        ));

        assert!(form.take_file("file").is_err());
    }

    #[test]
    fn test_custom_data_blank_is_none() {
        assert_eq!(decode_custom_data("").unwrap(), None);
        assert_eq!(decode_custom_data(" \n\t").unwrap(), None);
    }

    #[test]
    fn test_custom_data_json() {
        let value = decode_custom_data(r#"{"plan":"pro"}"#).unwrap();
        assert_eq!(value, Some(serde_json::json!({"plan": "pro"})));
    }

    #[test]
    fn test_custom_data_malformed() {
        let error = decode_custom_data("{oops").unwrap_err();
        assert!(matches!(
            &error,
            ApiError::InvalidRequest { detail } if detail.starts_with("custom_data is not valid JSON")
        ));
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("")), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("3")), 3);
        assert_eq!(parse_page(Some("2x")), 2);
        assert_eq!(parse_page(Some("  7")), 7);
        assert_eq!(parse_page(Some("-4")), -4);
        assert_eq!(parse_page(Some("0")), 0);
        assert_eq!(parse_page(Some("+")), 1);
        assert_eq!(parse_page(Some("99999999999999999999")), 1);
    }

    proptest! {
        #[test]
        fn prop_parse_page_reads_leading_integer(n in any::<i32>(), suffix in "[a-z ]{0,5}") {
            let raw = format!("{n}{suffix}");
            prop_assert_eq!(parse_page(Some(&raw)), i64::from(n));
        }

        #[test]
        fn prop_parse_page_never_panics(raw in ".*") {
            let _ = parse_page(Some(&raw));
        }

        #[test]
        fn prop_whitespace_custom_data_is_none(raw in "[ \t\r\n]*") {
            prop_assert_eq!(decode_custom_data(&raw).unwrap(), None);
        }

        #[test]
        fn prop_custom_data_never_unknown(raw in ".*") {
            let result = decode_custom_data(&raw);
            let is_unknown = matches!(result, Err(ApiError::Unknown { .. }));
            prop_assert!(!is_unknown);
        }
    }
}
