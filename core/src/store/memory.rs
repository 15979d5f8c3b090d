// core/src/store/memory.rs

//! In-process store with the same observable semantics as [`PgStore`](super::PgStore).
//!
//! All tables live behind one async mutex. A checkout transaction keeps that
//! mutex locked for its whole lifetime and works on a staged copy of the
//! tables, so transactions are serializable and an uncommitted handle simply
//! discards its copy.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{CartStore, CatalogStore, CheckoutTx, OrderStore, ReviewStore, StockSnapshot, UserStore};
use crate::error::{StoreError, StoreResult};
use crate::models::product::average_rating;
use crate::models::{
  Cart, CartItem, CartLine, Category, NewCategory, NewOrder, NewProduct, NewReview, NewUser, Order, OrderItem,
  OrderLine, OrderStatus, Page, PageRequest, Product, ProductChanges, ProductQuery, ProductSummary, Review,
  ReviewChanges, SortField, SortOrder, User, UserContact, UserSummary,
};

#[derive(Debug, Clone)]
struct ProductRow {
  id: Uuid,
  name: String,
  description: String,
  price_cents: i64,
  stock: i32,
  image_urls: Vec<String>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CartRow {
  id: Uuid,
  user_id: Uuid,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct OrderRow {
  id: Uuid,
  user_id: Uuid,
  status: OrderStatus,
  total_amount_cents: i64,
  shipping_address: Value,
  billing_address: Value,
  payment_method: String,
  payment_result: Value,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ReviewRow {
  id: Uuid,
  user_id: Uuid,
  product_id: Uuid,
  rating: i16,
  title: String,
  comment: String,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

/// Rows are kept in insertion order; insertion order breaks timestamp ties.
#[derive(Debug, Clone, Default)]
struct Tables {
  users: Vec<User>,
  categories: Vec<Category>,
  products: Vec<ProductRow>,
  product_categories: Vec<(Uuid, Uuid)>,
  carts: Vec<CartRow>,
  cart_items: Vec<CartItem>,
  orders: Vec<OrderRow>,
  order_items: Vec<OrderItem>,
  reviews: Vec<ReviewRow>,
}

fn page_of<T>(rows: Vec<T>, page: PageRequest) -> Page<T> {
  let total = rows.len() as u64;
  let data = rows
    .into_iter()
    .skip(page.offset() as usize)
    .take(page.limit as usize)
    .collect();
  Page {
    data,
    meta: page.meta(total),
  }
}

impl Tables {
  fn product_row(&self, id: Uuid) -> Option<&ProductRow> {
    self.products.iter().find(|p| p.id == id)
  }

  fn product_row_mut(&mut self, id: Uuid) -> Option<&mut ProductRow> {
    self.products.iter_mut().find(|p| p.id == id)
  }

  fn summary(row: &ProductRow) -> ProductSummary {
    ProductSummary {
      id: row.id,
      name: row.name.clone(),
      price_cents: row.price_cents,
      stock: row.stock,
      image_urls: row.image_urls.clone(),
    }
  }

  fn product_view(&self, row: &ProductRow) -> Product {
    let categories = self
      .product_categories
      .iter()
      .filter(|(product_id, _)| *product_id == row.id)
      .filter_map(|(_, category_id)| self.categories.iter().find(|c| c.id == *category_id).cloned())
      .collect();
    let (average_rating, review_count) = average_rating(
      self
        .reviews
        .iter()
        .filter(|r| r.product_id == row.id)
        .map(|r| r.rating),
    );
    Product {
      id: row.id,
      name: row.name.clone(),
      description: row.description.clone(),
      price_cents: row.price_cents,
      stock: row.stock,
      image_urls: row.image_urls.clone(),
      categories,
      average_rating,
      review_count,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }

  fn ensure_categories_exist(&self, category_ids: &[Uuid]) -> StoreResult<()> {
    match category_ids.iter().find(|id| !self.categories.iter().any(|c| c.id == **id)) {
      Some(missing) => Err(StoreError::Validation(format!("Category {} does not exist.", missing))),
      None => Ok(()),
    }
  }

  fn set_product_categories(&mut self, product_id: Uuid, category_ids: &[Uuid]) {
    self.product_categories.retain(|(p, _)| *p != product_id);
    for category_id in category_ids {
      if !self.product_categories.contains(&(product_id, *category_id)) {
        self.product_categories.push((product_id, *category_id));
      }
    }
  }

  fn cart_view(&self, cart: &CartRow) -> Cart {
    let items = self
      .cart_items
      .iter()
      .filter(|item| item.cart_id == cart.id)
      .filter_map(|item| {
        self.product_row(item.product_id).map(|p| CartLine {
          item: item.clone(),
          product: Self::summary(p),
        })
      })
      .collect();
    Cart {
      id: cart.id,
      user_id: cart.user_id,
      items,
      created_at: cart.created_at,
      updated_at: cart.updated_at,
    }
  }

  fn order_view(&self, order: &OrderRow) -> StoreResult<Order> {
    let user = self
      .users
      .iter()
      .find(|u| u.id == order.user_id)
      .map(UserContact::from)
      .ok_or_else(|| StoreError::Internal(format!("Order {} references a missing user.", order.id)))?;
    let items = self
      .order_items
      .iter()
      .filter(|item| item.order_id == order.id)
      .filter_map(|item| {
        self.product_row(item.product_id).map(|p| OrderLine {
          item: item.clone(),
          product: Self::summary(p),
        })
      })
      .collect();
    Ok(Order {
      id: order.id,
      user_id: order.user_id,
      user,
      status: order.status,
      total_amount_cents: order.total_amount_cents,
      shipping_address: order.shipping_address.clone(),
      billing_address: order.billing_address.clone(),
      payment_method: order.payment_method.clone(),
      payment_result: order.payment_result.clone(),
      items,
      created_at: order.created_at,
      updated_at: order.updated_at,
    })
  }

  fn review_view(&self, row: &ReviewRow) -> StoreResult<Review> {
    let user = self
      .users
      .iter()
      .find(|u| u.id == row.user_id)
      .map(UserSummary::from)
      .ok_or_else(|| StoreError::Internal(format!("Review {} references a missing user.", row.id)))?;
    Ok(Review {
      id: row.id,
      user_id: row.user_id,
      product_id: row.product_id,
      rating: row.rating,
      title: row.title.clone(),
      comment: row.comment.clone(),
      user,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }

  /// Indices of `created_at`-stamped rows, newest first.
  fn newest_first<T>(rows: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..rows.len()).collect();
    idx.sort_by(|a, b| {
      created_at(&rows[*b])
        .cmp(&created_at(&rows[*a]))
        .then(b.cmp(a))
    });
    idx
  }
}

/// Shared in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
    let mut tables = self.tables.lock().await;
    if tables.users.iter().any(|u| u.email == new_user.email) {
      return Err(StoreError::Conflict("Unique constraint failed on: users_email_key".to_string()));
    }
    let now = Utc::now();
    let user = User {
      id: Uuid::new_v4(),
      name: new_user.name,
      email: new_user.email,
      password_hash: new_user.password_hash,
      created_at: now,
      updated_at: now,
    };
    tables.users.push(user.clone());
    Ok(user)
  }

  async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
    let tables = self.tables.lock().await;
    Ok(tables.users.iter().find(|u| u.id == id).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    let tables = self.tables.lock().await;
    Ok(tables.users.iter().find(|u| u.email == email).cloned())
  }
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn list_categories(&self) -> StoreResult<Vec<Category>> {
    let tables = self.tables.lock().await;
    let mut categories = tables.categories.clone();
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(categories)
  }

  async fn create_category(&self, new_category: NewCategory) -> StoreResult<Category> {
    let mut tables = self.tables.lock().await;
    if tables.categories.iter().any(|c| c.name == new_category.name) {
      return Err(StoreError::Conflict("Unique constraint failed on: categories_name_key".to_string()));
    }
    let category = Category {
      id: Uuid::new_v4(),
      name: new_category.name,
      description: new_category.description,
      created_at: Utc::now(),
    };
    tables.categories.push(category.clone());
    Ok(category)
  }

  async fn list_products(&self, query: &ProductQuery) -> StoreResult<Page<Product>> {
    let tables = self.tables.lock().await;
    let mut matching: Vec<(usize, Product)> = tables
      .products
      .iter()
      .enumerate()
      .map(|(idx, row)| (idx, tables.product_view(row)))
      .filter(|(_, product)| query.matches(product))
      .collect();

    let sort = query.sort;
    matching.sort_by(|(ia, a), (ib, b)| {
      let by_field = match sort.field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Price => a.price_cents.cmp(&b.price_cents),
        SortField::Name => a.name.cmp(&b.name),
      };
      let ordering = by_field.then(ia.cmp(ib));
      match sort.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
      }
    });

    Ok(page_of(
      matching.into_iter().map(|(_, product)| product).collect(),
      query.page,
    ))
  }

  async fn count_products(&self) -> StoreResult<u64> {
    Ok(self.tables.lock().await.products.len() as u64)
  }

  async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
    let tables = self.tables.lock().await;
    Ok(tables.product_row(id).map(|row| tables.product_view(row)))
  }

  async fn create_product(&self, new_product: NewProduct) -> StoreResult<Product> {
    let mut tables = self.tables.lock().await;
    tables.ensure_categories_exist(&new_product.category_ids)?;
    let now = Utc::now();
    let row = ProductRow {
      id: Uuid::new_v4(),
      name: new_product.name,
      description: new_product.description,
      price_cents: new_product.price_cents,
      stock: new_product.stock,
      image_urls: new_product.image_urls,
      created_at: now,
      updated_at: now,
    };
    tables.set_product_categories(row.id, &new_product.category_ids);
    let product = tables.product_view(&row);
    tables.products.push(row);
    Ok(product)
  }

  async fn update_product(&self, id: Uuid, changes: ProductChanges) -> StoreResult<Option<Product>> {
    let mut tables = self.tables.lock().await;
    if tables.product_row(id).is_none() {
      return Ok(None);
    }
    if let Some(category_ids) = &changes.category_ids {
      tables.ensure_categories_exist(category_ids)?;
      tables.set_product_categories(id, category_ids);
    }
    let Some(row) = tables.product_row_mut(id) else {
      return Ok(None);
    };
    if let Some(name) = changes.name {
      row.name = name;
    }
    if let Some(description) = changes.description {
      row.description = description;
    }
    if let Some(price_cents) = changes.price_cents {
      row.price_cents = price_cents;
    }
    if let Some(stock) = changes.stock {
      row.stock = stock;
    }
    if let Some(image_urls) = changes.image_urls {
      row.image_urls = image_urls;
    }
    row.updated_at = Utc::now();
    let row = row.clone();
    Ok(Some(tables.product_view(&row)))
  }

  async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
    let mut tables = self.tables.lock().await;
    if tables.product_row(id).is_none() {
      return Ok(false);
    }
    tables.product_categories.retain(|(p, _)| *p != id);
    tables.reviews.retain(|r| r.product_id != id);
    tables.cart_items.retain(|i| i.product_id != id);
    tables.order_items.retain(|i| i.product_id != id);
    tables.products.retain(|p| p.id != id);
    Ok(true)
  }
}

#[async_trait]
impl CartStore for MemoryStore {
  async fn get_or_create_cart(&self, user_id: Uuid) -> StoreResult<Cart> {
    let mut tables = self.tables.lock().await;
    if !tables.users.iter().any(|u| u.id == user_id) {
      return Err(StoreError::not_found("User"));
    }
    let cart = match tables.carts.iter().find(|c| c.user_id == user_id) {
      Some(cart) => cart.clone(),
      None => {
        let now = Utc::now();
        let cart = CartRow {
          id: Uuid::new_v4(),
          user_id,
          created_at: now,
          updated_at: now,
        };
        tables.carts.push(cart.clone());
        cart
      }
    };
    Ok(tables.cart_view(&cart))
  }

  async fn find_cart_item(&self, item_id: Uuid) -> StoreResult<Option<(CartItem, Uuid)>> {
    let tables = self.tables.lock().await;
    let Some(item) = tables.cart_items.iter().find(|i| i.id == item_id) else {
      return Ok(None);
    };
    let owner = tables
      .carts
      .iter()
      .find(|c| c.id == item.cart_id)
      .map(|c| c.user_id)
      .ok_or_else(|| StoreError::Internal(format!("Cart item {} has no cart.", item_id)))?;
    Ok(Some((item.clone(), owner)))
  }

  async fn insert_cart_item(&self, cart_id: Uuid, product_id: Uuid, quantity: i32) -> StoreResult<CartItem> {
    let mut tables = self.tables.lock().await;
    if tables.product_row(product_id).is_none() {
      return Err(StoreError::Validation("Referenced record does not exist (cart_items_product_id_fkey).".to_string()));
    }
    let now = Utc::now();
    let item = CartItem {
      id: Uuid::new_v4(),
      cart_id,
      product_id,
      quantity,
      created_at: now,
      updated_at: now,
    };
    tables.cart_items.push(item.clone());
    Ok(item)
  }

  async fn set_cart_item_quantity(&self, item_id: Uuid, quantity: i32) -> StoreResult<CartItem> {
    let mut tables = self.tables.lock().await;
    let item = tables
      .cart_items
      .iter_mut()
      .find(|i| i.id == item_id)
      .ok_or_else(|| StoreError::not_found("Cart item"))?;
    item.quantity = quantity;
    item.updated_at = Utc::now();
    Ok(item.clone())
  }

  async fn delete_cart_item(&self, item_id: Uuid) -> StoreResult<()> {
    let mut tables = self.tables.lock().await;
    let before = tables.cart_items.len();
    tables.cart_items.retain(|i| i.id != item_id);
    if tables.cart_items.len() == before {
      return Err(StoreError::not_found("Cart item"));
    }
    Ok(())
  }

  async fn clear_cart(&self, cart_id: Uuid) -> StoreResult<()> {
    let mut tables = self.tables.lock().await;
    tables.cart_items.retain(|i| i.cart_id != cart_id);
    Ok(())
  }
}

/// Holds the store lock until committed or dropped.
struct MemoryCheckoutTx {
  guard: OwnedMutexGuard<Tables>,
  staged: Tables,
}

#[async_trait]
impl CheckoutTx for MemoryCheckoutTx {
  async fn product_snapshot(&mut self, product_id: Uuid) -> StoreResult<Option<StockSnapshot>> {
    Ok(self.staged.product_row(product_id).map(|p| StockSnapshot {
      product_id: p.id,
      name: p.name.clone(),
      price_cents: p.price_cents,
      stock: p.stock,
    }))
  }

  async fn insert_order(&mut self, new_order: &NewOrder) -> StoreResult<Order> {
    let now = Utc::now();
    let order = OrderRow {
      id: Uuid::new_v4(),
      user_id: new_order.user_id,
      status: OrderStatus::Pending,
      total_amount_cents: new_order.total_amount_cents,
      shipping_address: new_order.shipping_address.clone(),
      billing_address: new_order.billing_address.clone(),
      payment_method: new_order.payment_method.clone(),
      payment_result: new_order.payment_result.clone(),
      created_at: now,
      updated_at: now,
    };
    for line in &new_order.lines {
      self.staged.order_items.push(OrderItem {
        id: Uuid::new_v4(),
        order_id: order.id,
        product_id: line.product_id,
        quantity: line.quantity,
        price_cents: line.price_cents,
      });
    }
    let view = self.staged.order_view(&order)?;
    self.staged.orders.push(order);
    Ok(view)
  }

  async fn decrement_stock(&mut self, product_id: Uuid, quantity: i32) -> StoreResult<()> {
    let row = self
      .staged
      .product_row_mut(product_id)
      .ok_or_else(|| StoreError::NotFound(format!("Product with ID {} not found.", product_id)))?;
    if row.stock < quantity {
      return Err(StoreError::InsufficientStock {
        product_id,
        product_name: row.name.clone(),
        available: row.stock,
        requested: quantity,
      });
    }
    row.stock -= quantity;
    row.updated_at = Utc::now();
    Ok(())
  }

  async fn clear_cart(&mut self, cart_id: Uuid) -> StoreResult<()> {
    self.staged.cart_items.retain(|i| i.cart_id != cart_id);
    Ok(())
  }

  async fn commit(self: Box<Self>) -> StoreResult<()> {
    let MemoryCheckoutTx { mut guard, staged } = *self;
    *guard = staged;
    Ok(())
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn begin_checkout(&self) -> StoreResult<Box<dyn CheckoutTx>> {
    let guard = Arc::clone(&self.tables).lock_owned().await;
    let staged = guard.clone();
    Ok(Box::new(MemoryCheckoutTx { guard, staged }))
  }

  async fn list_orders(&self, user_id: Uuid, page: PageRequest) -> StoreResult<Page<Order>> {
    let tables = self.tables.lock().await;
    let orders = Tables::newest_first(&tables.orders, |o| o.created_at)
      .into_iter()
      .map(|idx| &tables.orders[idx])
      .filter(|o| o.user_id == user_id)
      .map(|o| tables.order_view(o))
      .collect::<StoreResult<Vec<_>>>()?;
    Ok(page_of(orders, page))
  }

  async fn find_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
    let tables = self.tables.lock().await;
    tables.orders.iter().find(|o| o.id == id).map(|o| tables.order_view(o)).transpose()
  }

  async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<Option<Order>> {
    let mut tables = self.tables.lock().await;
    let Some(order) = tables.orders.iter_mut().find(|o| o.id == id) else {
      return Ok(None);
    };
    order.status = status;
    order.updated_at = Utc::now();
    let order = order.clone();
    tables.order_view(&order).map(Some)
  }
}

#[async_trait]
impl ReviewStore for MemoryStore {
  async fn list_reviews(&self, product_id: Uuid) -> StoreResult<Vec<Review>> {
    let tables = self.tables.lock().await;
    Tables::newest_first(&tables.reviews, |r| r.created_at)
      .into_iter()
      .map(|idx| &tables.reviews[idx])
      .filter(|r| r.product_id == product_id)
      .map(|r| tables.review_view(r))
      .collect()
  }

  async fn find_review(&self, id: Uuid) -> StoreResult<Option<Review>> {
    let tables = self.tables.lock().await;
    tables
      .reviews
      .iter()
      .find(|r| r.id == id)
      .map(|r| tables.review_view(r))
      .transpose()
  }

  async fn create_review(&self, new_review: NewReview) -> StoreResult<Review> {
    let mut tables = self.tables.lock().await;
    if tables
      .reviews
      .iter()
      .any(|r| r.user_id == new_review.user_id && r.product_id == new_review.product_id)
    {
      return Err(StoreError::Conflict(
        "Unique constraint failed on: reviews_user_id_product_id_key".to_string(),
      ));
    }
    let now = Utc::now();
    let row = ReviewRow {
      id: Uuid::new_v4(),
      user_id: new_review.user_id,
      product_id: new_review.product_id,
      rating: new_review.rating,
      title: new_review.title,
      comment: new_review.comment,
      created_at: now,
      updated_at: now,
    };
    let review = tables.review_view(&row)?;
    tables.reviews.push(row);
    Ok(review)
  }

  async fn update_review(&self, id: Uuid, changes: ReviewChanges) -> StoreResult<Option<Review>> {
    let mut tables = self.tables.lock().await;
    let Some(row) = tables.reviews.iter_mut().find(|r| r.id == id) else {
      return Ok(None);
    };
    if let Some(rating) = changes.rating {
      row.rating = rating;
    }
    if let Some(title) = changes.title {
      row.title = title;
    }
    if let Some(comment) = changes.comment {
      row.comment = comment;
    }
    row.updated_at = Utc::now();
    let row = row.clone();
    tables.review_view(&row).map(Some)
  }

  async fn delete_review(&self, id: Uuid) -> StoreResult<bool> {
    let mut tables = self.tables.lock().await;
    let before = tables.reviews.len();
    tables.reviews.retain(|r| r.id != id);
    Ok(tables.reviews.len() != before)
  }
}
