// server/src/web/handlers/mod.rs

pub mod auth_handlers;
pub mod cart_handlers;
pub mod category_handlers;
pub mod order_handlers;
pub mod product_handlers;
pub mod review_handlers;

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use storefront::models::{Page, PageMeta, PageRequest};

/// Success envelope shared by every endpoint.
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
  message: &'a str,
  data: T,
  #[serde(skip_serializing_if = "Option::is_none")]
  pagination: Option<PageMeta>,
}

pub(crate) fn ok<T: Serialize>(message: &str, data: T) -> HttpResponse {
  HttpResponse::Ok().json(Envelope {
    message,
    data,
    pagination: None,
  })
}

pub(crate) fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
  HttpResponse::Created().json(Envelope {
    message,
    data,
    pagination: None,
  })
}

pub(crate) fn paged<T: Serialize>(message: &str, page: Page<T>) -> HttpResponse {
  HttpResponse::Ok().json(Envelope {
    message,
    data: page.data,
    pagination: Some(page.meta),
  })
}

/// `?page=&limit=` for paginated listings.
#[derive(Deserialize, Debug, Default)]
pub struct PageParams {
  pub page: Option<u32>,
  pub limit: Option<u32>,
}

impl PageParams {
  pub fn to_request(&self) -> PageRequest {
    PageRequest::new(self.page, self.limit)
  }
}
