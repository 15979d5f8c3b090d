// core/src/services/seed.rs

//! Demo catalog for local development.

use tracing::{info, instrument};

use super::users::{self, SignUp};
use crate::error::StoreResult;
use crate::models::{NewCategory, NewProduct};
use crate::store::Store;

pub const DEMO_USER_EMAIL: &str = "demo@example.com";
pub const DEMO_USER_PASSWORD: &str = "password123";

struct DemoProduct {
  name: &'static str,
  description: &'static str,
  price_cents: i64,
  stock: i32,
  category: &'static str,
}

const DEMO_CATEGORIES: [(&str, &str); 3] = [
  ("Electronics", "Gadgets and devices"),
  ("Books", "Printed and digital books"),
  ("Home", "Things for the house"),
];

const DEMO_PRODUCTS: [DemoProduct; 5] = [
  DemoProduct {
    name: "Wireless Headphones",
    description: "Over-ear headphones with noise cancellation.",
    price_cents: 12999,
    stock: 25,
    category: "Electronics",
  },
  DemoProduct {
    name: "Mechanical Keyboard",
    description: "Tenkeyless keyboard with tactile switches.",
    price_cents: 8950,
    stock: 40,
    category: "Electronics",
  },
  DemoProduct {
    name: "The Rust Programming Language",
    description: "The official book on the Rust language.",
    price_cents: 3999,
    stock: 100,
    category: "Books",
  },
  DemoProduct {
    name: "Ceramic Mug",
    description: "Stoneware mug, holds 350ml.",
    price_cents: 1500,
    stock: 60,
    category: "Home",
  },
  DemoProduct {
    name: "Desk Lamp",
    description: "Adjustable LED lamp with warm light.",
    price_cents: 4200,
    stock: 0,
    category: "Home",
  },
];

/// Inserts demo data when the catalog is empty. Returns whether anything was
/// inserted.
#[instrument(name = "seed::seed_demo_data", skip(store))]
pub async fn seed_demo_data(store: &dyn Store) -> StoreResult<bool> {
  if store.count_products().await? > 0 {
    info!("Catalog already has products, skipping seed.");
    return Ok(false);
  }

  if store.find_user_by_email(DEMO_USER_EMAIL).await?.is_none() {
    users::sign_up(
      store,
      SignUp {
        name: "Demo User".to_string(),
        email: DEMO_USER_EMAIL.to_string(),
        password: DEMO_USER_PASSWORD.to_string(),
      },
    )
    .await?;
  }

  let existing = store.list_categories().await?;
  let mut categories = Vec::with_capacity(DEMO_CATEGORIES.len());
  for (name, description) in DEMO_CATEGORIES {
    let category = match existing.iter().find(|c| c.name == name) {
      Some(found) => found.clone(),
      None => {
        store
          .create_category(NewCategory {
            name: name.to_string(),
            description: Some(description.to_string()),
          })
          .await?
      }
    };
    categories.push(category);
  }

  for demo in &DEMO_PRODUCTS {
    let category_ids = categories
      .iter()
      .filter(|c| c.name == demo.category)
      .map(|c| c.id)
      .collect();
    store
      .create_product(NewProduct {
        name: demo.name.to_string(),
        description: demo.description.to_string(),
        price_cents: demo.price_cents,
        stock: demo.stock,
        image_urls: Vec::new(),
        category_ids,
      })
      .await?;
  }

  info!(products = DEMO_PRODUCTS.len(), categories = categories.len(), "Seeded demo catalog.");
  Ok(true)
}
