// core/src/store/postgres/reviews.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::PgStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{NewReview, Review, ReviewChanges, UserSummary};
use crate::store::ReviewStore;

const REVIEW_SELECT: &str = "SELECT r.id, r.user_id, r.product_id, r.rating, r.title, r.comment, \
   r.created_at, r.updated_at, u.name AS user_name \
   FROM reviews r JOIN users u ON u.id = r.user_id";

#[derive(Debug, FromRow)]
struct ReviewRow {
  id: Uuid,
  user_id: Uuid,
  product_id: Uuid,
  rating: i16,
  title: String,
  comment: String,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
  user_name: String,
}

impl From<ReviewRow> for Review {
  fn from(row: ReviewRow) -> Self {
    Review {
      id: row.id,
      user_id: row.user_id,
      product_id: row.product_id,
      rating: row.rating,
      title: row.title,
      comment: row.comment,
      user: UserSummary {
        id: row.user_id,
        name: row.user_name,
      },
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

impl PgStore {
  async fn require_review(&self, id: Uuid) -> StoreResult<Review> {
    self
      .find_review(id)
      .await?
      .ok_or_else(|| StoreError::Internal(format!("Review {} vanished after write.", id)))
  }
}

#[async_trait]
impl ReviewStore for PgStore {
  async fn list_reviews(&self, product_id: Uuid) -> StoreResult<Vec<Review>> {
    let rows = sqlx::query_as::<_, ReviewRow>(&format!(
      "{} WHERE r.product_id = $1 ORDER BY r.created_at DESC, r.id DESC",
      REVIEW_SELECT
    ))
    .bind(product_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(Review::from).collect())
  }

  async fn find_review(&self, id: Uuid) -> StoreResult<Option<Review>> {
    let row = sqlx::query_as::<_, ReviewRow>(&format!("{} WHERE r.id = $1", REVIEW_SELECT))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(Review::from))
  }

  async fn create_review(&self, new_review: NewReview) -> StoreResult<Review> {
    let id: Uuid = sqlx::query_scalar(
      "INSERT INTO reviews (id, user_id, product_id, rating, title, comment) \
       VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(new_review.user_id)
    .bind(new_review.product_id)
    .bind(new_review.rating)
    .bind(&new_review.title)
    .bind(&new_review.comment)
    .fetch_one(&self.pool)
    .await?;
    self.require_review(id).await
  }

  async fn update_review(&self, id: Uuid, changes: ReviewChanges) -> StoreResult<Option<Review>> {
    let updated: Option<Uuid> = sqlx::query_scalar(
      "UPDATE reviews SET \
         rating = COALESCE($2, rating), \
         title = COALESCE($3, title), \
         comment = COALESCE($4, comment), \
         updated_at = now() \
       WHERE id = $1 RETURNING id",
    )
    .bind(id)
    .bind(changes.rating)
    .bind(&changes.title)
    .bind(&changes.comment)
    .fetch_optional(&self.pool)
    .await?;
    match updated {
      Some(id) => self.require_review(id).await.map(Some),
      None => Ok(None),
    }
  }

  async fn delete_review(&self, id: Uuid) -> StoreResult<bool> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }
}
