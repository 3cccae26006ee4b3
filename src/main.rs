use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use tracing::info;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use hr_service::api::AppState;
use hr_service::config::{Config, StorageBackend};
use hr_service::db::{ensure_schema, init_db};
use hr_service::docs::ApiDoc;
use hr_service::routes;
use hr_service::store::SharedConnector;
use hr_service::store::memory::MemoryConnector;
use hr_service::store::mysql::MySqlConnector;
use hr_service::utils::logging::init_tracing;

#[get("/")]
async fn index() -> impl Responder {
    "HR service is running"
}

async fn build_connector(config: &Config) -> anyhow::Result<SharedConnector> {
    match config.storage_backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Ok(MemoryConnector::new())
        }
        StorageBackend::Mysql => {
            let platform = init_db(&config.database_url, config.db_max_connections)
                .await
                .context("Failed to connect to platform database")?;
            let region = if config.region_database_url == config.database_url {
                platform.clone()
            } else {
                init_db(&config.region_database_url, config.db_max_connections)
                    .await
                    .context("Failed to connect to region database")?
            };
            ensure_schema(&platform).await.context("Failed to prepare platform schema")?;
            ensure_schema(&region).await.context("Failed to prepare region schema")?;
            Ok(Arc::new(MySqlConnector::new(platform, region)))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // keep the guard alive so buffered log lines are flushed on exit
    let _guard = init_tracing(&config)?;

    info!(backend = %config.storage_backend, "Server starting...");

    let state = AppState::new(build_connector(&config).await?);

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(state.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
