// core/src/services/catalog.rs

//! Products and categories.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{Category, NewCategory, NewProduct, Page, Product, ProductChanges, ProductDetail, ProductQuery};
use crate::store::Store;

fn product_not_found() -> StoreError {
  StoreError::not_found("Product")
}

fn require_text(value: &str, field: &str) -> StoreResult<()> {
  if value.trim().is_empty() {
    return Err(StoreError::Validation(format!("Product {} cannot be empty.", field)));
  }
  Ok(())
}

fn require_price(price_cents: i64) -> StoreResult<()> {
  if price_cents < 0 {
    return Err(StoreError::Validation("Price must be a non-negative amount.".to_string()));
  }
  Ok(())
}

fn require_stock(stock: i32) -> StoreResult<()> {
  if stock < 0 {
    return Err(StoreError::Validation("Stock must be a non-negative integer.".to_string()));
  }
  Ok(())
}

fn validate_new_product(input: &NewProduct) -> StoreResult<()> {
  require_text(&input.name, "name")?;
  require_text(&input.description, "description")?;
  require_price(input.price_cents)?;
  require_stock(input.stock)
}

fn validate_changes(changes: &ProductChanges) -> StoreResult<()> {
  if let Some(name) = &changes.name {
    require_text(name, "name")?;
  }
  if let Some(description) = &changes.description {
    require_text(description, "description")?;
  }
  if let Some(price_cents) = changes.price_cents {
    require_price(price_cents)?;
  }
  if let Some(stock) = changes.stock {
    require_stock(stock)?;
  }
  Ok(())
}

#[instrument(name = "catalog::list_products", skip(store))]
pub async fn list_products(store: &dyn Store, query: &ProductQuery) -> StoreResult<Page<Product>> {
  if let (Some(min), Some(max)) = (query.min_price_cents, query.max_price_cents) {
    if min > max {
      return Err(StoreError::Validation("minPrice cannot be greater than maxPrice.".to_string()));
    }
  }
  store.list_products(query).await
}

#[instrument(name = "catalog::get_product", skip(store))]
pub async fn get_product(store: &dyn Store, id: Uuid) -> StoreResult<ProductDetail> {
  let product = store.find_product(id).await?.ok_or_else(product_not_found)?;
  let reviews = store.list_reviews(id).await?;
  Ok(ProductDetail { product, reviews })
}

#[instrument(name = "catalog::create_product", skip(store, input), fields(name = %input.name))]
pub async fn create_product(store: &dyn Store, input: NewProduct) -> StoreResult<Product> {
  validate_new_product(&input)?;
  let product = store.create_product(input).await?;
  info!(product_id = %product.id, "Product created.");
  Ok(product)
}

#[instrument(name = "catalog::update_product", skip(store, changes))]
pub async fn update_product(store: &dyn Store, id: Uuid, changes: ProductChanges) -> StoreResult<Product> {
  validate_changes(&changes)?;
  let product = store.update_product(id, changes).await?.ok_or_else(product_not_found)?;
  info!(product_id = %product.id, "Product updated.");
  Ok(product)
}

#[instrument(name = "catalog::delete_product", skip(store))]
pub async fn delete_product(store: &dyn Store, id: Uuid) -> StoreResult<()> {
  if !store.delete_product(id).await? {
    warn!("Delete requested for a missing product.");
    return Err(product_not_found());
  }
  info!(product_id = %id, "Product deleted.");
  Ok(())
}

pub async fn list_categories(store: &dyn Store) -> StoreResult<Vec<Category>> {
  store.list_categories().await
}

#[instrument(name = "catalog::create_category", skip(store, input), fields(name = %input.name))]
pub async fn create_category(store: &dyn Store, input: NewCategory) -> StoreResult<Category> {
  let name = input.name.trim().to_string();
  if name.is_empty() {
    return Err(StoreError::Validation("Category name is required.".to_string()));
  }
  let description = input.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
  store
    .create_category(NewCategory { name, description })
    .await
    .map_err(|e| match e {
      StoreError::Conflict(_) => StoreError::Conflict("A category with this name already exists.".to_string()),
      other => other,
    })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn draft() -> NewProduct {
    NewProduct {
      name: "Lamp".to_string(),
      description: "Warm light".to_string(),
      price_cents: 2500,
      stock: 3,
      image_urls: Vec::new(),
      category_ids: Vec::new(),
    }
  }

  #[test]
  fn negative_price_and_stock_are_rejected() {
    let mut input = draft();
    input.price_cents = -1;
    assert!(matches!(validate_new_product(&input), Err(StoreError::Validation(_))));

    let mut input = draft();
    input.stock = -5;
    assert!(matches!(validate_new_product(&input), Err(StoreError::Validation(_))));
  }

  #[test]
  fn blank_names_are_rejected_in_changes() {
    let changes = ProductChanges {
      name: Some("   ".to_string()),
      ..Default::default()
    };
    assert!(validate_changes(&changes).is_err());
    assert!(validate_changes(&ProductChanges::default()).is_ok());
  }
}
