// server/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront::models::{NewProduct, PageRequest, ProductChanges, ProductQuery, ProductSort};
use storefront::services::catalog;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{created, ok, paged};
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

/// Query string of `GET /products`. Prices are in cents.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
  pub page: Option<u32>,
  pub limit: Option<u32>,
  pub search: Option<String>,
  pub category_id: Option<Uuid>,
  pub category: Option<String>,
  pub min_price: Option<i64>,
  pub max_price: Option<i64>,
  pub sort_by: Option<String>,
}

impl ProductListParams {
  pub fn into_query(self) -> ProductQuery {
    let non_blank = |value: Option<String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    ProductQuery {
      page: PageRequest::new(self.page, self.limit),
      search: non_blank(self.search),
      category_id: self.category_id,
      category_name: non_blank(self.category),
      min_price_cents: self.min_price,
      max_price_cents: self.max_price,
      sort: ProductSort::parse(self.sort_by.as_deref()),
    }
  }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price_cents: Option<i64>,
  pub stock: Option<i32>,
  #[serde(default)]
  pub image_urls: Vec<String>,
  #[serde(default)]
  pub category_ids: Vec<Uuid>,
}

impl TryFrom<CreateProductPayload> for NewProduct {
  type Error = AppError;

  fn try_from(payload: CreateProductPayload) -> Result<Self, Self::Error> {
    match (payload.name, payload.description, payload.price_cents, payload.stock) {
      (Some(name), Some(description), Some(price_cents), Some(stock)) => Ok(NewProduct {
        name,
        description,
        price_cents,
        stock,
        image_urls: payload.image_urls,
        category_ids: payload.category_ids,
      }),
      _ => Err(AppError::Validation(
        "Missing required fields: name, description, priceCents, stock".to_string(),
      )),
    }
  }
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  params: web::Query<ProductListParams>,
) -> Result<HttpResponse, AppError> {
  let query = params.into_inner().into_query();
  let page = catalog::list_products(app_state.store.as_ref(), &query).await?;
  info!(returned = page.data.len(), total = page.meta.total, "Products listed.");
  Ok(paged("Products fetched successfully", page))
}

#[instrument(name = "handler::get_product", skip(app_state))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let detail = catalog::get_product(app_state.store.as_ref(), path.into_inner()).await?;
  Ok(ok("Product fetched successfully", detail))
}

#[instrument(
    name = "handler::create_product",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.id())
)]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<CreateProductPayload>,
) -> Result<HttpResponse, AppError> {
  let input = NewProduct::try_from(req_payload.into_inner())?;
  let product = catalog::create_product(app_state.store.as_ref(), input).await?;
  info!(product_id = %product.id, "Product created.");
  Ok(created("Product created successfully", product))
}

#[instrument(
    name = "handler::update_product",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.id())
)]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<ProductChanges>,
) -> Result<HttpResponse, AppError> {
  let product = catalog::update_product(app_state.store.as_ref(), path.into_inner(), req_payload.into_inner()).await?;
  Ok(ok("Product updated successfully", product))
}

#[instrument(
    name = "handler::delete_product",
    skip(app_state, auth_user),
    fields(user_id = %auth_user.id())
)]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  catalog::delete_product(app_state.store.as_ref(), product_id).await?;
  info!(%product_id, "Product deleted.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully" })))
}

#[cfg(test)]
mod tests {
  use super::*;
  use storefront::models::{SortField, SortOrder};

  #[test]
  fn blank_filters_are_ignored() {
    let query = ProductListParams {
      search: Some("  ".to_string()),
      category: Some(String::new()),
      sort_by: Some("price_desc".to_string()),
      limit: Some(500),
      ..Default::default()
    }
    .into_query();
    assert!(query.search.is_none());
    assert!(query.category_name.is_none());
    assert_eq!(query.sort.field, SortField::Price);
    assert_eq!(query.sort.order, SortOrder::Desc);
    assert_eq!(query.page.limit, 100);
  }

  #[test]
  fn product_payload_requires_core_fields() {
    let payload = CreateProductPayload {
      name: Some("Lamp".to_string()),
      description: None,
      price_cents: Some(1500),
      stock: Some(3),
      image_urls: Vec::new(),
      category_ids: Vec::new(),
    };
    assert!(matches!(NewProduct::try_from(payload), Err(AppError::Validation(_))));
  }
}
