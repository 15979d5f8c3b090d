// core/src/store/postgres/mod.rs

//! Postgres backend built on runtime `sqlx` queries.

use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::ProductSummary;

mod cart;
mod catalog;
mod orders;
mod reviews;
mod users;

/// Store backed by a Postgres connection pool. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  /// Applies the embedded migrations in `core/migrations`.
  pub async fn run_migrations(&self) -> StoreResult<()> {
    info!("Running database migrations.");
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    Ok(())
  }
}

/// Product columns embedded in cart and order lines, aliased so they do not
/// clash with the line's own columns.
const LINE_PRODUCT_COLUMNS: &str = "p.name AS product_name, p.price_cents AS product_price_cents, \
   p.stock AS product_stock, p.image_urls AS product_image_urls";

#[derive(Debug, FromRow)]
struct LineProduct {
  product_name: String,
  product_price_cents: i64,
  product_stock: i32,
  product_image_urls: Vec<String>,
}

impl LineProduct {
  fn into_summary(self, id: Uuid) -> ProductSummary {
    ProductSummary {
      id,
      name: self.product_name,
      price_cents: self.product_price_cents,
      stock: self.product_stock,
      image_urls: self.product_image_urls,
    }
  }
}
