//! HTTP inbound adapter exposing the REST endpoints.

use actix_web::web;

pub mod accounts;
pub mod cors;
pub mod entries;
pub mod error;
pub mod health;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;

pub use error::{ApiResult, json_config, query_config};

/// Register the journal routes: the JSON API under `/api/v1` and stored
/// photos under `/uploads`.
///
/// Callers supply [`state::HttpState`] (and optionally
/// [`uploads::UploadLimit`]) as app data.
///
/// # Examples
/// ```no_run
/// use actix_web::App;
/// use journal::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(
            web::scope("/api/v1")
                .service(accounts::register)
                .service(accounts::login)
                .service(entries::create_entry)
                .service(entries::list_entries)
                .service(entries::get_entry)
                .service(uploads::upload_photo),
        )
        .service(uploads::get_photo);
}
