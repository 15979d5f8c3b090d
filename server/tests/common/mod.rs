// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::sync::Arc;
use storefront::models::{NewProduct, Product, User};
use storefront::services::{catalog, users};
use storefront::{MemoryStore, Store};
use storefront_server::config::{AppConfig, StorageBackend};
use storefront_server::AppState;
use tracing::Level;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Builds an initialized actix test service over the given `AppState`.
#[macro_export]
macro_rules! init_app {
  ($state:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($state.clone()))
        .configure(storefront_server::configure_app_routes),
    )
    .await
  };
}

/// Two customers and two products in a fresh memory store.
pub struct Shop {
  pub state: AppState,
  pub alice: User,
  pub bob: User,
  pub lamp: Product,
  pub chair: Product,
}

pub async fn add_user(store: &dyn Store, name: &str) -> User {
  users::sign_up(
    store,
    users::SignUp {
      name: name.to_string(),
      email: format!("{}@example.com", name.to_lowercase()),
      password: "correct-horse".to_string(),
    },
  )
  .await
  .expect("user fixture")
}

pub async fn add_product(store: &dyn Store, name: &str, price_cents: i64, stock: i32) -> Product {
  catalog::create_product(
    store,
    NewProduct {
      name: name.to_string(),
      description: format!("A fine {}", name.to_lowercase()),
      price_cents,
      stock,
      image_urls: Vec::new(),
      category_ids: Vec::new(),
    },
  )
  .await
  .expect("product fixture")
}

pub fn memory_config() -> AppConfig {
  AppConfig {
    storage_backend: StorageBackend::Memory,
    ..Default::default()
  }
}

pub async fn shop() -> Shop {
  setup_tracing();
  let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
  let alice = add_user(store.as_ref(), "Alice").await;
  let bob = add_user(store.as_ref(), "Bob").await;
  let lamp = add_product(store.as_ref(), "Lamp", 2500, 3).await;
  let chair = add_product(store.as_ref(), "Chair", 8000, 1).await;
  Shop {
    state: AppState::new(store, Arc::new(memory_config())),
    alice,
    bob,
    lamp,
    chair,
  }
}

pub fn checkout_body() -> Value {
  json!({
    "shippingAddress": { "street": "1 Main St", "city": "Springfield" },
    "billingAddress": { "street": "1 Main St", "city": "Springfield" },
    "paymentMethod": "card",
    "paymentConfirmationToken": "tok_test_123"
  })
}
