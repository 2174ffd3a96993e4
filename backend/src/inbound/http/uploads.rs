//! Photo upload and download handlers.
//!
//! ```text
//! POST /api/v1/uploads?filename=tower.jpg   (raw image bytes as the body)
//! GET  /uploads/{name}
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, PhotoUploadPolicy};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::read_body_limited;
use crate::inbound::http::state::HttpState;

/// Largest body the upload endpoint reads, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimit(pub usize);

impl Default for UploadLimit {
    fn default() -> Self {
        Self(PhotoUploadPolicy::default().max_bytes)
    }
}

/// Query parameters for `POST /api/v1/uploads`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadQuery {
    /// Client-side file name; only its extension is used.
    pub filename: Option<String>,
}

/// Response body for a stored upload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "/uploads/9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08.jpg")]
    pub url: String,
}

/// Store an uploaded photo under a content-addressed name.
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    params(UploadQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Photo stored", body = UploadResponse),
        (status = 400, description = "Missing name, unsupported type or empty body", body = Error),
        (status = 413, description = "Body exceeds the upload limit", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["uploads"],
    operation_id = "uploadPhoto"
)]
#[post("/uploads")]
pub async fn upload_photo(
    state: web::Data<HttpState>,
    query: web::Query<UploadQuery>,
    limit: Option<web::Data<UploadLimit>>,
    payload: web::Payload,
) -> actix_web::Result<HttpResponse> {
    let limit = limit.map_or_else(UploadLimit::default, |data| *data.get_ref());
    let body = read_body_limited(payload, limit.0).await?;
    let filename = query.into_inner().filename.unwrap_or_default();
    let uploaded = state.photos.upload(&filename, body).await?;
    Ok(HttpResponse::Created().json(UploadResponse { url: uploaded.url }))
}

/// Serve a stored photo.
#[utoipa::path(
    get,
    path = "/uploads/{name}",
    params(("name" = String, Path, description = "Stored photo name")),
    responses(
        (status = 200, description = "Photo bytes"),
        (status = 404, description = "No such photo", body = Error)
    ),
    tags = ["uploads"],
    operation_id = "getPhoto"
)]
#[get("/uploads/{name}")]
pub async fn get_photo(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let photo = state.photos.fetch(&path.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, photo.extension.content_type()))
        .insert_header((header::CACHE_CONTROL, "public, max-age=31536000, immutable"))
        .body(photo.bytes))
}
