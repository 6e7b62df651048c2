//! Multipart upload parsing for `/remove`.
//!
//! The body has already been read (and capped) by the HTTP front; this module
//! pulls the `image` field out of it with `multer`, enforcing the per-field
//! size ceiling before anything is staged or submitted.

use std::convert::Infallible;

use bytes::Bytes;

use crate::constants::UPLOAD_FIELD_NAME;
use crate::error::UploadError;

/// The `image` field of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub bytes: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

fn map_multer_error(err: multer::Error, limit: usize) -> UploadError {
    match err {
        multer::Error::FieldSizeExceeded { .. } | multer::Error::StreamSizeExceeded { .. } => {
            UploadError::TooLarge { limit }
        }
        other => UploadError::Malformed(other.to_string()),
    }
}

/// Extract the `image` field from a multipart body.
///
/// Returns `Ok(None)` when the request is not multipart, has no `image`
/// file field, or the field is empty (a form submitted without a file).
/// An `image` part without a `filename` is a text field and does not count.
///
/// # Errors
///
/// - `UploadError::TooLarge` if the field exceeds `max_bytes`
/// - `UploadError::Malformed` if the multipart framing is broken
pub async fn parse_image_upload(
    content_type: Option<&str>,
    body: Bytes,
    max_bytes: usize,
) -> Result<Option<UploadedImage>, UploadError> {
    let boundary = match content_type.and_then(|ct| multer::parse_boundary(ct).ok()) {
        Some(boundary) => boundary,
        None => return Ok(None),
    };

    let constraints = multer::Constraints::new().size_limit(
        multer::SizeLimit::new().for_field(UPLOAD_FIELD_NAME, max_bytes as u64),
    );
    let stream = futures::stream::once(futures::future::ready(Ok::<Bytes, Infallible>(body)));
    let mut multipart = multer::Multipart::with_constraints(stream, boundary, constraints);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| map_multer_error(e, max_bytes))?
    {
        // A plain text field named `image` carries no file
        if field.name() != Some(UPLOAD_FIELD_NAME) || field.file_name().is_none() {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let content_type = field.content_type().map(|mime| mime.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| map_multer_error(e, max_bytes))?;

        if bytes.is_empty() {
            return Ok(None);
        }

        return Ok(Some(UploadedImage {
            bytes,
            file_name,
            content_type,
        }));
    }

    Ok(None)
}
