// server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use storefront::services::seed;
use storefront::{MemoryStore, PgStore, Store};
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing
use tracing_subscriber::EnvFilter;

use storefront_server::config::{AppConfig, LogFormat, StorageBackend};
use storefront_server::{configure_app_routes, errors, AppState};

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = Arc::new(AppConfig::from_env().context("Failed to load application configuration")?);
  init_tracing(app_config.log_format);
  errors::expose_error_detail(!app_config.is_production());

  tracing::info!(
    env = ?app_config.app_env,
    backend = ?app_config.storage_backend,
    "Starting storefront server..."
  );

  let mut pg_store = None;
  let store: Arc<dyn Store> = match app_config.storage_backend {
    StorageBackend::Postgres => {
      let database_url = app_config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres backend")?;
      let pool = PgPoolOptions::new()
        .max_connections(app_config.database_max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to the database")?;
      tracing::info!("Successfully connected to the database.");

      let store = PgStore::new(pool);
      if app_config.run_migrations {
        store.run_migrations().await.context("Failed to run database migrations")?;
      }
      pg_store = Some(store.clone());
      Arc::new(store)
    }
    StorageBackend::Memory => {
      tracing::warn!("Using the in-memory store; data is lost on shutdown.");
      Arc::new(MemoryStore::new())
    }
  };

  if app_config.seed_db {
    let seeded = seed::seed_demo_data(store.as_ref())
      .await
      .context("Failed to seed the database")?;
    tracing::info!(seeded, "Database seeding finished.");
  }

  let app_state = actix_data::Data::new(AppState::new(store, app_config.clone()));

  let server_address = app_config.bind_address();
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(app_state.clone()) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await
  .context("HTTP server terminated with an error")?;

  if let Some(store) = pg_store {
    store.pool().close().await;
    tracing::info!("Database pool closed.");
  }
  tracing::info!("Server stopped.");
  Ok(())
}
