//! Backend entry point: seeds the directory and serves the portal routes.

#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use color_eyre::eyre::{Context, Result};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use portal_backend::api::{self, health::HealthState};
#[cfg(debug_assertions)]
use portal_backend::ApiDoc;
use portal_backend::config::BackendSettings;
use portal_backend::fixtures::seed_directory;
use portal_backend::{PortalState, Trace};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = BackendSettings::load_from_iter([OsString::from("portal-backend")])
        .wrap_err("load backend settings")?;
    let bind_addr = settings.bind_addr()?;

    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(DefaultClock);
    let portal = web::Data::new(PortalState::new(seed_directory(clock.utc()), clock));
    let health = web::Data::new(HealthState::new());

    let server_health = health.clone();
    let mut server = HttpServer::new(move || {
        let app = App::new()
            .app_data(portal.clone())
            .app_data(server_health.clone())
            .wrap(Trace)
            .configure(api::configure)
            .service(api::health::ready)
            .service(api::health::live);
        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
        app
    })
    .bind(bind_addr)
    .wrap_err_with(|| format!("bind {bind_addr}"))?;
    if let Some(workers) = settings.workers() {
        server = server.workers(workers);
    }

    health.mark_ready();
    info!(%bind_addr, "portal backend listening");
    let outcome = server.run().await;
    health.mark_unhealthy();
    outcome.wrap_err("http server")
}
