// core/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::category::Category;
use super::page::PageRequest;
use super::review::Review;

/// A catalog product with its categories and rating statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: String,
  pub price_cents: i64,
  pub stock: i32,
  pub image_urls: Vec<String>,
  pub categories: Vec<Category>,
  pub average_rating: f64,
  pub review_count: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Product fields embedded in cart and order lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
  pub id: Uuid,
  pub name: String,
  pub price_cents: i64,
  pub stock: i32,
  pub image_urls: Vec<String>,
}

/// Single-product view: the product plus its reviews, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
  #[serde(flatten)]
  pub product: Product,
  pub reviews: Vec<Review>,
}

/// Rounds an average rating to two decimals; no ratings means 0.
pub fn average_rating(ratings: impl IntoIterator<Item = i16>) -> (f64, i64) {
  let (sum, count) = ratings
    .into_iter()
    .fold((0i64, 0i64), |(sum, count), r| (sum + i64::from(r), count + 1));
  if count == 0 {
    return (0.0, 0);
  }
  let avg = sum as f64 / count as f64;
  ((avg * 100.0).round() / 100.0, count)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
  pub name: String,
  pub description: String,
  pub price_cents: i64,
  pub stock: i32,
  #[serde(default)]
  pub image_urls: Vec<String>,
  #[serde(default)]
  pub category_ids: Vec<Uuid>,
}

/// Partial update; `None` leaves a field untouched. `category_ids`, when
/// present, replaces the whole category set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price_cents: Option<i64>,
  pub stock: Option<i32>,
  pub image_urls: Option<Vec<String>>,
  pub category_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
  CreatedAt,
  Price,
  Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
  Asc,
  Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductSort {
  pub field: SortField,
  pub order: SortOrder,
}

impl Default for ProductSort {
  fn default() -> Self {
    Self {
      field: SortField::CreatedAt,
      order: SortOrder::Desc,
    }
  }
}

impl ProductSort {
  /// Parses `<field>_<dir>` (e.g. `price_asc`). Unknown input falls back to
  /// newest first.
  pub fn parse(raw: Option<&str>) -> Self {
    let Some((field, order)) = raw.and_then(|s| s.split_once('_')) else {
      return Self::default();
    };
    let field = match field {
      "price" => SortField::Price,
      "name" => SortField::Name,
      "createdAt" => SortField::CreatedAt,
      _ => return Self::default(),
    };
    let order = match order {
      "asc" => SortOrder::Asc,
      "desc" => SortOrder::Desc,
      _ => return Self::default(),
    };
    Self { field, order }
  }
}

/// Catalog listing filters.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
  pub page: PageRequest,
  pub search: Option<String>,
  pub category_id: Option<Uuid>,
  pub category_name: Option<String>,
  pub min_price_cents: Option<i64>,
  pub max_price_cents: Option<i64>,
  pub sort: ProductSort,
}

impl ProductQuery {
  /// In-memory equivalent of the SQL filter, used by the memory store.
  pub fn matches(&self, product: &Product) -> bool {
    if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
      let needle = search.to_lowercase();
      if !product.name.to_lowercase().contains(&needle) && !product.description.to_lowercase().contains(&needle) {
        return false;
      }
    }
    if let Some(category_id) = self.category_id {
      if !product.categories.iter().any(|c| c.id == category_id) {
        return false;
      }
    }
    if let Some(name) = self.category_name.as_deref() {
      if !product.categories.iter().any(|c| c.name == name) {
        return false;
      }
    }
    if self.min_price_cents.is_some_and(|min| product.price_cents < min) {
      return false;
    }
    if self.max_price_cents.is_some_and(|max| product.price_cents > max) {
      return false;
    }
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sort_parses_known_fields() {
    assert_eq!(
      ProductSort::parse(Some("price_asc")),
      ProductSort {
        field: SortField::Price,
        order: SortOrder::Asc
      }
    );
    assert_eq!(ProductSort::parse(Some("name_desc")).field, SortField::Name);
  }

  #[test]
  fn sort_falls_back_to_newest_first() {
    assert_eq!(ProductSort::parse(Some("stock_asc")), ProductSort::default());
    assert_eq!(ProductSort::parse(Some("price_sideways")), ProductSort::default());
    assert_eq!(ProductSort::parse(Some("price")), ProductSort::default());
    assert_eq!(ProductSort::parse(None), ProductSort::default());
  }

  #[test]
  fn average_rating_rounds_to_two_decimals() {
    assert_eq!(average_rating([5, 4, 4]), (4.33, 3));
    assert_eq!(average_rating(Vec::<i16>::new()), (0.0, 0));
  }
}
