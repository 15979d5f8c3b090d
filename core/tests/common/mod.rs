// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use storefront::models::{NewProduct, NewUser, PlaceOrder, Product, User};
use storefront::services::catalog;
use storefront::store::UserStore;
use storefront::pipeline::HandlerFuture;
use storefront::{ContextData, Handler, MemoryStore, PipelineControl, PipelineError, Store};
use tracing::Level;

// --- Pipeline fixtures ---

/// Records what a pipeline run touched.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
  pub hits: u32,
  pub trail: String,
  pub visited: Vec<String>,
  pub halt_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum FlowError {
  #[error("engine: {0}")]
  Engine(String),

  #[error("step failed: {0}")]
  Step(String),
}

impl From<PipelineError> for FlowError {
  fn from(err: PipelineError) -> Self {
    FlowError::Engine(format!("{:?}", err))
  }
}

pub fn ledger() -> ContextData<Ledger> {
  ContextData::new(Ledger::default())
}

/// Appends `token` to the trail; stops the run if `label` is the ledger's `halt_at`.
pub fn mark(label: &'static str, token: &'static str) -> Handler<Ledger, FlowError> {
  Box::new(move |ctx: ContextData<Ledger>| -> HandlerFuture<FlowError> {
    Box::pin(async move {
      let mut ledger = ctx.write();
      ledger.hits += 1;
      ledger.trail.push_str(token);
      ledger.visited.push(label.to_string());
      let halt = ledger.halt_at.as_deref() == Some(label);
      Ok(if halt { PipelineControl::Stop } else { PipelineControl::Continue })
    })
  })
}

pub fn boom(label: &'static str, reason: &'static str) -> Handler<Ledger, FlowError> {
  Box::new(move |ctx: ContextData<Ledger>| -> HandlerFuture<FlowError> {
    Box::pin(async move {
      ctx.write().visited.push(label.to_string());
      Err(FlowError::Step(reason.to_string()))
    })
  })
}

// --- Tracing ---

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

// --- Store fixtures ---

/// A memory store with two shoppers and two products.
pub struct Shop {
  pub store: MemoryStore,
  pub alice: User,
  pub bob: User,
  /// 1999 cents, 5 in stock.
  pub widget: Product,
  /// 4500 cents, 2 in stock.
  pub gadget: Product,
}

pub async fn add_user(store: &dyn Store, name: &str, email: &str) -> User {
  store
    .create_user(NewUser {
      name: name.to_string(),
      email: email.to_string(),
      password_hash: "not-a-real-hash".to_string(),
    })
    .await
    .unwrap()
}

pub async fn add_product(store: &dyn Store, name: &str, price_cents: i64, stock: i32) -> Product {
  catalog::create_product(
    store,
    NewProduct {
      name: name.to_string(),
      description: format!("A fine {}", name.to_lowercase()),
      price_cents,
      stock,
      image_urls: vec![format!("https://img.example.com/{}.png", name.to_lowercase())],
      category_ids: Vec::new(),
    },
  )
  .await
  .unwrap()
}

pub async fn shop() -> Shop {
  setup_tracing();
  let store = MemoryStore::new();
  let alice = add_user(&store, "Alice", "alice@example.com").await;
  let bob = add_user(&store, "Bob", "bob@example.com").await;
  let widget = add_product(&store, "Widget", 1999, 5).await;
  let gadget = add_product(&store, "Gadget", 4500, 2).await;
  Shop {
    store,
    alice,
    bob,
    widget,
    gadget,
  }
}

pub fn address() -> Value {
  json!({ "street": "1 Main St", "city": "Springfield", "zip": "12345" })
}

pub fn order_input() -> PlaceOrder {
  PlaceOrder {
    shipping_address: address(),
    billing_address: address(),
    payment_method: "card".to_string(),
    payment_token: "tok_visa".to_string(),
  }
}
