//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use journal::ApiDoc;
use journal::Trace;
use journal::inbound::http::configure;
use journal::inbound::http::cors::Cors;
use journal::inbound::http::health::{HealthState, live, ready};
use journal::inbound::http::state::HttpState;
use journal::inbound::http::uploads::UploadLimit;
use journal::outbound::persistence::run_pending_migrations;
use journal::settings::JournalSettings;

use state_builders::{build_http_state, build_stores};

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    upload_limit: web::Data<UploadLimit>,
    cors: Cors,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        upload_limit,
        cors,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(upload_limit)
        .wrap(cors)
        .wrap(Trace)
        .configure(configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the Actix server. Readiness flips once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        cors_allow_origin,
        upload_limit,
    } = config;
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
        upload_limit: web::Data::new(upload_limit),
        cors: Cors::new(&cors_allow_origin),
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}

/// `journal serve`: open stores, build services and serve until shutdown.
pub async fn serve(settings: JournalSettings, port_override: Option<u16>) -> Result<()> {
    let mut bind_addr = settings.bind_addr()?;
    if let Some(port) = port_override {
        bind_addr.set_port(port);
    }

    let stores = build_stores(&settings).await?;
    let http_state = web::Data::new(build_http_state(&settings, stores)?);
    let config = ServerConfig::new(bind_addr)
        .with_cors_allow_origin(settings.cors_allow_origin())
        .with_upload_limit(UploadLimit(settings.photo_upload_policy().max_bytes));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), http_state, config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, backend = %settings.store_backend()?, "journal listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("server terminated with an error")
}

/// `journal migrate`: apply pending migrations and exit.
pub async fn migrate(settings: &JournalSettings) -> Result<()> {
    let url = settings.database_url()?;
    let applied = run_pending_migrations(url)
        .await
        .wrap_err("failed to migrate the database")?;
    info!(count = applied.len(), "migrations complete");
    Ok(())
}
