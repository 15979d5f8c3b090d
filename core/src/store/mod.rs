// core/src/store/mod.rs

//! Storage traits and their implementations.
//!
//! Services only talk to `dyn Store`. [`PgStore`] is the production
//! backend; [`MemoryStore`] keeps everything in process and backs the tests
//! and the `memory` storage backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::{
  Cart, CartItem, Category, NewCategory, NewOrder, NewProduct, NewReview, NewUser, Order, OrderStatus, Page, PageRequest,
  Product, ProductChanges, ProductQuery, Review, ReviewChanges, User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
  /// Fails with `Conflict` when the email is taken.
  async fn create_user(&self, new_user: NewUser) -> StoreResult<User>;
  async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
  async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
  async fn list_categories(&self) -> StoreResult<Vec<Category>>;
  /// Fails with `Conflict` when the name is taken.
  async fn create_category(&self, new_category: NewCategory) -> StoreResult<Category>;

  async fn list_products(&self, query: &ProductQuery) -> StoreResult<Page<Product>>;
  async fn count_products(&self) -> StoreResult<u64>;
  async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>>;
  /// Fails with `Validation` when a category id does not exist.
  async fn create_product(&self, new_product: NewProduct) -> StoreResult<Product>;
  /// Applies `changes` atomically. `Ok(None)` when the product does not exist.
  async fn update_product(&self, id: Uuid, changes: ProductChanges) -> StoreResult<Option<Product>>;
  /// Deletes the product with its category links, reviews, cart items and
  /// order items in one transaction. Returns whether it existed.
  async fn delete_product(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
  /// Loads the user's cart with items and current product data, creating an
  /// empty cart on first access.
  async fn get_or_create_cart(&self, user_id: Uuid) -> StoreResult<Cart>;
  /// The item together with the id of the user owning its cart.
  async fn find_cart_item(&self, item_id: Uuid) -> StoreResult<Option<(CartItem, Uuid)>>;
  async fn insert_cart_item(&self, cart_id: Uuid, product_id: Uuid, quantity: i32) -> StoreResult<CartItem>;
  async fn set_cart_item_quantity(&self, item_id: Uuid, quantity: i32) -> StoreResult<CartItem>;
  async fn delete_cart_item(&self, item_id: Uuid) -> StoreResult<()>;
  async fn clear_cart(&self, cart_id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Opens the transaction that order creation runs in.
  async fn begin_checkout(&self) -> StoreResult<Box<dyn CheckoutTx>>;
  async fn list_orders(&self, user_id: Uuid, page: PageRequest) -> StoreResult<Page<Order>>;
  async fn find_order(&self, id: Uuid) -> StoreResult<Option<Order>>;
  async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<Option<Order>>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
  /// Newest first.
  async fn list_reviews(&self, product_id: Uuid) -> StoreResult<Vec<Review>>;
  async fn find_review(&self, id: Uuid) -> StoreResult<Option<Review>>;
  /// Fails with `Conflict` when the user already reviewed the product.
  async fn create_review(&self, new_review: NewReview) -> StoreResult<Review>;
  async fn update_review(&self, id: Uuid, changes: ReviewChanges) -> StoreResult<Option<Review>>;
  async fn delete_review(&self, id: Uuid) -> StoreResult<bool>;
}

/// A product row as seen from inside a checkout transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockSnapshot {
  pub product_id: Uuid,
  pub name: String,
  pub price_cents: i64,
  pub stock: i32,
}

/// One database transaction for order creation.
///
/// Dropping the handle without calling [`commit`](CheckoutTx::commit) rolls
/// every change back.
#[async_trait]
pub trait CheckoutTx: Send {
  async fn product_snapshot(&mut self, product_id: Uuid) -> StoreResult<Option<StockSnapshot>>;
  async fn insert_order(&mut self, new_order: &NewOrder) -> StoreResult<Order>;
  /// Decrements stock only while `stock >= quantity` still holds; otherwise
  /// fails with `InsufficientStock`.
  async fn decrement_stock(&mut self, product_id: Uuid, quantity: i32) -> StoreResult<()>;
  async fn clear_cart(&mut self, cart_id: Uuid) -> StoreResult<()>;
  async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Everything the services need from a backend.
pub trait Store: UserStore + CatalogStore + CartStore + OrderStore + ReviewStore {}

impl<T> Store for T where T: UserStore + CatalogStore + CartStore + OrderStore + ReviewStore {}
