//! Image upload handlers.
//!
//! ```text
//! POST /api/uploads          single "image" field
//! POST /api/uploads/multiple up to five "images" fields
//! ```
//!
//! Accepted types are jpeg, jpg, png, and gif, checked against both the
//! filename extension and the part's content type. Stored names are
//! timestamp plus random suffix, so client names never reach the
//! filesystem. Files are served back under `/uploads/{name}`.

use actix_multipart::{Field, Multipart};
use actix_web::{post, web, HttpResponse};
use futures_util::TryStreamExt;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::identity::{authenticate, BearerToken};
use crate::inbound::http::state::{HttpState, UploadConfig};
use crate::inbound::http::ApiResult;

const ALLOWED_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "png", "gif"];

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub filename: String,
    /// Public path the file is served from.
    pub path: String,
}

fn unsupported_type_error() -> Error {
    Error::invalid_request("Only image files are allowed (jpeg, jpg, png, gif)").with_details(
        json!({
            "field": "image",
            "code": "unsupported_file_type",
        }),
    )
}

fn too_large_error(max_bytes: usize) -> Error {
    Error::invalid_request(format!(
        "File is too large (maximum {} MB)",
        max_bytes / (1024 * 1024)
    ))
    .with_details(json!({
        "field": "image",
        "code": "file_too_large",
    }))
}

fn multipart_error(error: actix_multipart::MultipartError) -> Error {
    Error::invalid_request(format!("malformed multipart request: {error}"))
}

fn validated_extension(field: &Field) -> Result<String, Error> {
    let filename = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .ok_or_else(unsupported_type_error)?;
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .ok_or_else(unsupported_type_error)?;
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(unsupported_type_error());
    }
    let is_image_mime = field
        .content_type()
        .is_some_and(|mime| mime.type_() == mime::IMAGE);
    if !is_image_mime {
        return Err(unsupported_type_error());
    }
    Ok(extension)
}

fn unique_filename(extension: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let noise: u32 = rand::random();
    format!("{timestamp}-{noise}.{extension}")
}

async fn store_field(field: &mut Field, config: &UploadConfig) -> Result<UploadedFile, Error> {
    let extension = validated_extension(field)?;
    let mut bytes: Vec<u8> = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > config.max_bytes {
            return Err(too_large_error(config.max_bytes));
        }
        bytes.extend_from_slice(&chunk);
    }
    let filename = unique_filename(&extension);
    let destination = config.dir.join(&filename);
    std::fs::write(&destination, &bytes)
        .map_err(|error| Error::internal(format!("failed to store upload: {error}")))?;
    Ok(UploadedFile {
        path: format!("/uploads/{filename}"),
        filename,
    })
}

/// Upload a single image.
#[utoipa::path(
    post,
    path = "/api/uploads",
    responses(
        (status = 201, description = "File stored"),
        (status = 400, description = "Invalid upload", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["uploads"]
)]
#[post("")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    token: BearerToken,
    mut multipart: Multipart,
) -> ApiResult<HttpResponse> {
    authenticate(&state, &token).await?;
    while let Some(mut field) = multipart.try_next().await.map_err(multipart_error)? {
        if field.name() != Some("image") {
            continue;
        }
        let stored = store_field(&mut field, &state.uploads).await?;
        return Ok(HttpResponse::Created().json(json!({
            "success": true,
            "file": stored,
        })));
    }
    Err(Error::invalid_request("image field is required").with_details(json!({
        "field": "image",
        "code": "missing_field",
    })))
}

/// Upload up to five images in one request.
#[utoipa::path(
    post,
    path = "/api/uploads/multiple",
    responses(
        (status = 201, description = "Files stored"),
        (status = 400, description = "Invalid upload", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["uploads"]
)]
#[post("/multiple")]
pub async fn upload_images(
    state: web::Data<HttpState>,
    token: BearerToken,
    mut multipart: Multipart,
) -> ApiResult<HttpResponse> {
    authenticate(&state, &token).await?;
    let mut stored: Vec<UploadedFile> = Vec::new();
    while let Some(mut field) = multipart.try_next().await.map_err(multipart_error)? {
        if field.name() != Some("images") {
            continue;
        }
        if stored.len() == state.uploads.max_files {
            return Err(Error::invalid_request(format!(
                "at most {} files may be uploaded at once",
                state.uploads.max_files
            ))
            .with_details(json!({
                "field": "images",
                "code": "too_many_files",
            })));
        }
        stored.push(store_field(&mut field, &state.uploads).await?);
    }
    if stored.is_empty() {
        return Err(Error::invalid_request("images field is required").with_details(json!({
            "field": "images",
            "code": "missing_field",
        })));
    }
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "files": stored,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_filenames_keep_the_extension_and_differ() {
        let first = unique_filename("png");
        let second = unique_filename("png");
        assert!(first.ends_with(".png"));
        assert_ne!(first, second);
    }
}
