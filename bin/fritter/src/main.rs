//! # Fritter Binary
//!
//! The entry point that assembles the application from settings and the
//! compiled-in storage backend.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use fr_api::middleware::{cors_policy, standard_middleware};
use fr_api::{configure_routes, AppState};
use fr_config::Settings;
use fr_core::{OwnerPolicy, Repositories};

#[cfg(feature = "db-sqlite")]
use fr_db_sqlite::SqliteStore;

#[cfg(not(feature = "db-sqlite"))]
compile_error!("fritter needs a storage backend; enable the `db-sqlite` feature");

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = fr_config::load_dotenv();
    let settings = Settings::load()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&settings.log.level));
    match dotenv {
        Ok(Some(path)) => log::debug!("loaded environment from {}", path.display()),
        Ok(None) => {}
        Err(e) => log::warn!("ignoring unreadable .env file: {e}"),
    }

    // 1. Storage
    #[cfg(feature = "db-sqlite")]
    let store = SqliteStore::connect(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| format!("failed to open {}", settings.database.url))?;

    // 2. Shared state. Every port is served by the same store.
    let state = web::Data::new(AppState::new(
        Repositories::from_store(Arc::new(store)),
        Arc::new(OwnerPolicy),
    ));

    let (host, port) = settings.bind_address();
    let allowed_origin = settings.cors.allowed_origin.clone();
    log::info!("Fritter starting on http://{host}:{port}");

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors_policy(allowed_origin.as_deref()))
            .wrap(standard_middleware())
            .configure(configure_routes)
    });
    if settings.server.workers > 0 {
        server = server.workers(settings.server.workers);
    }

    server
        .bind((host.as_str(), port))
        .with_context(|| format!("failed to bind {host}:{port}"))?
        .run()
        .await?;
    Ok(())
}
