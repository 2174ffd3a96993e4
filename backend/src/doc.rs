//! OpenAPI documentation for the HTTP surface.
//!
//! [`ApiDoc`] collects every handler's `utoipa::path` annotation and the
//! request/response schemas. Swagger UI serves it in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::accounts::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};
use crate::inbound::http::entries::{CreateEntryRequest, CreateEntryResponse, EntryResponse};
use crate::inbound::http::uploads::UploadResponse;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Journal API",
        description = "Accounts, journal entries and photo uploads."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::entries::create_entry,
        crate::inbound::http::entries::list_entries,
        crate::inbound::http::entries::get_entry,
        crate::inbound::http::uploads::upload_photo,
        crate::inbound::http::uploads::get_photo,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        CreateEntryRequest,
        CreateEntryResponse,
        EntryResponse,
        UploadResponse,
    )),
    tags(
        (name = "accounts", description = "Registration and login"),
        (name = "entries", description = "Journal entries"),
        (name = "uploads", description = "Photo uploads"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
