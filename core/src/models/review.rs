// core/src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserSummary;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
  pub id: Uuid,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub rating: i16,
  pub title: String,
  pub comment: String,
  pub user: UserSummary,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub rating: i16,
  pub title: String,
  pub comment: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewChanges {
  pub rating: Option<i16>,
  pub title: Option<String>,
  pub comment: Option<String>,
}

impl ReviewChanges {
  pub fn is_empty(&self) -> bool {
    self.rating.is_none() && self.title.is_none() && self.comment.is_none()
  }
}
