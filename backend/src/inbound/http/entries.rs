//! Journal entry handlers.
//!
//! ```text
//! POST /api/v1/entries {"user_id":"…","title":"Paris trip","content":"…","photos":["p1.jpg"]}
//! GET  /api/v1/users/{user_id}/entries?limit=10
//! GET  /api/v1/entries/{entry_id}
//! ```
//!
//! Identifiers arriving in paths or bodies are validated here; a malformed
//! owner is a `400`, never silently replaced.

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Entry, EntryId, EntryListLimit, EntryValidationError, Error, NewEntry, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/entries`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateEntryRequest {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: String,
    #[schema(example = "Paris trip")]
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Response body for a created entry.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateEntryResponse {
    pub entry_id: String,
    pub created_at: DateTime<Utc>,
}

/// Entry as returned by both read endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct EntryResponse {
    pub entry_id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub location: Option<String>,
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        Self {
            entry_id: entry.id.to_string(),
            user_id: entry.user_id.to_string(),
            title: entry.title.as_str().to_owned(),
            content: entry.content.as_str().to_owned(),
            location: entry.location.map(|l| l.as_str().to_owned()),
            photos: entry.photos.into_inner(),
            created_at: entry.created_at,
        }
    }
}

/// Query parameters for the by-owner listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListEntriesQuery {
    /// Page size, 1 to 100. Defaults to the server setting.
    pub limit: Option<u32>,
}

impl TryFrom<CreateEntryRequest> for NewEntry {
    type Error = EntryValidationError;

    fn try_from(value: CreateEntryRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.user_id,
            &value.title,
            &value.content,
            value.location.as_deref(),
            value.photos,
        )
    }
}

fn entry_error(err: EntryValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
}

fn parse_user_id(raw: &str) -> ApiResult<UserId> {
    UserId::new(raw).map_err(|err| entry_error(EntryValidationError::Owner(err)))
}

/// Create an entry, writing both the by-id and by-owner views.
#[utoipa::path(
    post,
    path = "/api/v1/entries",
    request_body = CreateEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = CreateEntryResponse),
        (status = 400, description = "Invalid request or unknown owner", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["entries"],
    operation_id = "createEntry"
)]
#[post("/entries")]
pub async fn create_entry(
    state: web::Data<HttpState>,
    payload: web::Json<CreateEntryRequest>,
) -> ApiResult<HttpResponse> {
    let new_entry = NewEntry::try_from(payload.into_inner()).map_err(entry_error)?;
    let created = state.journal.create_entry(new_entry).await?;
    Ok(HttpResponse::Created().json(CreateEntryResponse {
        entry_id: created.entry_id.to_string(),
        created_at: created.created_at,
    }))
}

/// List an owner's entries, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/entries",
    params(
        ("user_id" = String, Path, description = "Owner identifier (UUID)"),
        ListEntriesQuery
    ),
    responses(
        (status = 200, description = "Entries, newest first", body = [EntryResponse]),
        (status = 400, description = "Invalid user id or limit", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["entries"],
    operation_id = "listEntries"
)]
#[get("/users/{user_id}/entries")]
pub async fn list_entries(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<ListEntriesQuery>,
) -> ApiResult<web::Json<Vec<EntryResponse>>> {
    let user_id = parse_user_id(&path.into_inner())?;
    let limit = query
        .into_inner()
        .limit
        .map(EntryListLimit::new)
        .transpose()
        .map_err(entry_error)?;
    let entries = state.journal.entries_for_owner(&user_id, limit).await?;
    Ok(web::Json(
        entries.into_iter().map(EntryResponse::from).collect(),
    ))
}

/// Fetch one entry by id.
#[utoipa::path(
    get,
    path = "/api/v1/entries/{entry_id}",
    params(("entry_id" = String, Path, description = "Entry identifier (UUID)")),
    responses(
        (status = 200, description = "Entry", body = EntryResponse),
        (status = 400, description = "Invalid entry id", body = Error),
        (status = 404, description = "No such entry", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["entries"],
    operation_id = "getEntry"
)]
#[get("/entries/{entry_id}")]
pub async fn get_entry(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<EntryResponse>> {
    let id = EntryId::new(path.into_inner()).map_err(entry_error)?;
    let entry = state.journal.entry(&id).await?;
    Ok(web::Json(entry.into()))
}
