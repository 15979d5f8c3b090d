// core/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Public author details embedded in reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
  pub id: Uuid,
  pub name: String,
}

impl From<&User> for UserSummary {
  fn from(user: &User) -> Self {
    Self {
      id: user.id,
      name: user.name.clone(),
    }
  }
}

/// Customer details embedded in orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserContact {
  pub id: Uuid,
  pub name: String,
  pub email: String,
}

impl From<&User> for UserContact {
  fn from(user: &User) -> Self {
    Self {
      id: user.id,
      name: user.name.clone(),
      email: user.email.clone(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub name: String,
  pub email: String,
  pub password_hash: String,
}
