// core/src/store/postgres/catalog.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, QueryBuilder, Transaction};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use super::PgStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{
  Category, NewCategory, NewProduct, Page, Product, ProductChanges, ProductQuery, SortField, SortOrder,
};
use crate::store::CatalogStore;

/// Product columns plus review statistics. Expects the `products p` alias.
const PRODUCT_SELECT: &str = "SELECT p.id, p.name, p.description, p.price_cents, p.stock, p.image_urls, \
   p.created_at, p.updated_at, \
   COALESCE(rs.average_rating, 0)::FLOAT8 AS average_rating, \
   COALESCE(rs.review_count, 0) AS review_count \
   FROM products p \
   LEFT JOIN LATERAL ( \
     SELECT AVG(r.rating) AS average_rating, COUNT(*) AS review_count \
     FROM reviews r WHERE r.product_id = p.id \
   ) rs ON TRUE";

#[derive(Debug, FromRow)]
struct ProductRow {
  id: Uuid,
  name: String,
  description: String,
  price_cents: i64,
  stock: i32,
  image_urls: Vec<String>,
  average_rating: f64,
  review_count: i64,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ProductCategoryRow {
  product_id: Uuid,
  #[sqlx(flatten)]
  category: Category,
}

/// Escapes `LIKE` wildcards so user input matches literally.
fn like_pattern(search: &str) -> String {
  let escaped = search.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
  format!("%{}%", escaped)
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
  qb.push(" WHERE TRUE");
  if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
    let pattern = like_pattern(search);
    qb.push(" AND (p.name ILIKE ")
      .push_bind(pattern.clone())
      .push(" OR p.description ILIKE ")
      .push_bind(pattern)
      .push(")");
  }
  if let Some(category_id) = query.category_id {
    qb.push(" AND EXISTS (SELECT 1 FROM product_categories pc WHERE pc.product_id = p.id AND pc.category_id = ")
      .push_bind(category_id)
      .push(")");
  }
  if let Some(category_name) = query.category_name.clone() {
    qb.push(
      " AND EXISTS (SELECT 1 FROM product_categories pc JOIN categories c ON c.id = pc.category_id \
       WHERE pc.product_id = p.id AND c.name = ",
    )
    .push_bind(category_name)
    .push(")");
  }
  if let Some(min) = query.min_price_cents {
    qb.push(" AND p.price_cents >= ").push_bind(min);
  }
  if let Some(max) = query.max_price_cents {
    qb.push(" AND p.price_cents <= ").push_bind(max);
  }
}

fn order_by(query: &ProductQuery) -> String {
  let column = match query.sort.field {
    SortField::CreatedAt => "p.created_at",
    SortField::Price => "p.price_cents",
    SortField::Name => "p.name",
  };
  let direction = match query.sort.order {
    SortOrder::Asc => "ASC",
    SortOrder::Desc => "DESC",
  };
  format!(" ORDER BY {} {}, p.id {}", column, direction, direction)
}

impl PgStore {
  /// Loads categories for `rows` and assembles the product views.
  async fn with_categories(&self, rows: Vec<ProductRow>) -> StoreResult<Vec<Product>> {
    if rows.is_empty() {
      return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let links = sqlx::query_as::<_, ProductCategoryRow>(
      "SELECT pc.product_id, c.id, c.name, c.description, c.created_at \
       FROM product_categories pc JOIN categories c ON c.id = pc.category_id \
       WHERE pc.product_id = ANY($1) ORDER BY c.name",
    )
    .bind(&ids)
    .fetch_all(&self.pool)
    .await?;

    let mut by_product: HashMap<Uuid, Vec<Category>> = HashMap::new();
    for link in links {
      by_product.entry(link.product_id).or_default().push(link.category);
    }

    Ok(
      rows
        .into_iter()
        .map(|row| Product {
          categories: by_product.remove(&row.id).unwrap_or_default(),
          id: row.id,
          name: row.name,
          description: row.description,
          price_cents: row.price_cents,
          stock: row.stock,
          image_urls: row.image_urls,
          average_rating: (row.average_rating * 100.0).round() / 100.0,
          review_count: row.review_count,
          created_at: row.created_at,
          updated_at: row.updated_at,
        })
        .collect(),
    )
  }

  async fn require_product(&self, id: Uuid) -> StoreResult<Product> {
    self
      .find_product(id)
      .await?
      .ok_or_else(|| StoreError::Internal(format!("Product {} vanished after write.", id)))
  }
}

async fn ensure_categories_exist(tx: &mut Transaction<'static, Postgres>, category_ids: &[Uuid]) -> StoreResult<()> {
  if category_ids.is_empty() {
    return Ok(());
  }
  let found: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ANY($1)")
    .bind(category_ids)
    .fetch_all(&mut **tx)
    .await?;
  match category_ids.iter().find(|id| !found.contains(id)) {
    Some(missing) => Err(StoreError::Validation(format!("Category {} does not exist.", missing))),
    None => Ok(()),
  }
}

async fn replace_categories(
  tx: &mut Transaction<'static, Postgres>,
  product_id: Uuid,
  category_ids: &[Uuid],
) -> StoreResult<()> {
  sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
    .bind(product_id)
    .execute(&mut **tx)
    .await?;
  if !category_ids.is_empty() {
    sqlx::query(
      "INSERT INTO product_categories (product_id, category_id) \
       SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
    )
    .bind(product_id)
    .bind(category_ids)
    .execute(&mut **tx)
    .await?;
  }
  Ok(())
}

#[async_trait]
impl CatalogStore for PgStore {
  async fn list_categories(&self) -> StoreResult<Vec<Category>> {
    let categories =
      sqlx::query_as::<_, Category>("SELECT id, name, description, created_at FROM categories ORDER BY name ASC")
        .fetch_all(&self.pool)
        .await?;
    Ok(categories)
  }

  async fn create_category(&self, new_category: NewCategory) -> StoreResult<Category> {
    let category = sqlx::query_as::<_, Category>(
      "INSERT INTO categories (id, name, description) VALUES ($1, $2, $3) \
       RETURNING id, name, description, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&new_category.name)
    .bind(&new_category.description)
    .fetch_one(&self.pool)
    .await?;
    Ok(category)
  }

  async fn list_products(&self, query: &ProductQuery) -> StoreResult<Page<Product>> {
    let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products p");
    push_filters(&mut count_qb, query);
    let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

    let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
    push_filters(&mut qb, query);
    qb.push(order_by(query));
    qb.push(" LIMIT ")
      .push_bind(i64::from(query.page.limit))
      .push(" OFFSET ")
      .push_bind(query.page.offset() as i64);
    debug!(sql = qb.sql(), "Listing products.");
    let rows: Vec<ProductRow> = qb.build_query_as().fetch_all(&self.pool).await?;

    Ok(Page {
      data: self.with_categories(rows).await?,
      meta: query.page.meta(total.max(0) as u64),
    })
  }

  async fn count_products(&self) -> StoreResult<u64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
      .fetch_one(&self.pool)
      .await?;
    Ok(total.max(0) as u64)
  }

  async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
    let row = sqlx::query_as::<_, ProductRow>(&format!("{} WHERE p.id = $1", PRODUCT_SELECT))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    match row {
      Some(row) => Ok(self.with_categories(vec![row]).await?.pop()),
      None => Ok(None),
    }
  }

  async fn create_product(&self, new_product: NewProduct) -> StoreResult<Product> {
    let mut tx = self.pool.begin().await?;
    ensure_categories_exist(&mut tx, &new_product.category_ids).await?;

    let id = Uuid::new_v4();
    sqlx::query(
      "INSERT INTO products (id, name, description, price_cents, stock, image_urls) \
       VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(id)
    .bind(&new_product.name)
    .bind(&new_product.description)
    .bind(new_product.price_cents)
    .bind(new_product.stock)
    .bind(&new_product.image_urls)
    .execute(&mut *tx)
    .await?;
    replace_categories(&mut tx, id, &new_product.category_ids).await?;
    tx.commit().await?;

    self.require_product(id).await
  }

  async fn update_product(&self, id: Uuid, changes: ProductChanges) -> StoreResult<Option<Product>> {
    let mut tx = self.pool.begin().await?;
    let updated = sqlx::query(
      "UPDATE products SET \
         name = COALESCE($2, name), \
         description = COALESCE($3, description), \
         price_cents = COALESCE($4, price_cents), \
         stock = COALESCE($5, stock), \
         image_urls = COALESCE($6, image_urls), \
         updated_at = now() \
       WHERE id = $1",
    )
    .bind(id)
    .bind(&changes.name)
    .bind(&changes.description)
    .bind(changes.price_cents)
    .bind(changes.stock)
    .bind(&changes.image_urls)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
      return Ok(None);
    }
    if let Some(category_ids) = &changes.category_ids {
      ensure_categories_exist(&mut tx, category_ids).await?;
      replace_categories(&mut tx, id, category_ids).await?;
    }
    tx.commit().await?;

    self.require_product(id).await.map(Some)
  }

  async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
    let mut tx = self.pool.begin().await?;
    for statement in [
      "DELETE FROM product_categories WHERE product_id = $1",
      "DELETE FROM reviews WHERE product_id = $1",
      "DELETE FROM cart_items WHERE product_id = $1",
      "DELETE FROM order_items WHERE product_id = $1",
    ] {
      sqlx::query(statement).bind(id).execute(&mut *tx).await?;
    }
    let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&mut *tx)
      .await?;
    if deleted.rows_affected() == 0 {
      return Ok(false);
    }
    tx.commit().await?;
    Ok(true)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
  }

  #[test]
  fn order_by_uses_requested_column() {
    let query = ProductQuery {
      sort: crate::models::ProductSort::parse(Some("price_asc")),
      ..Default::default()
    };
    assert_eq!(order_by(&query), " ORDER BY p.price_cents ASC, p.id ASC");
  }
}
