// core/src/services/reviews.rs

//! Product reviews. One review per user and product.

use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{NewReview, Review, ReviewChanges};
use crate::store::Store;

/// Review content as submitted by a user.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewDraft {
  pub rating: i16,
  pub title: String,
  pub comment: String,
}

fn validate_rating(rating: i16) -> StoreResult<()> {
  if !(1..=5).contains(&rating) {
    return Err(StoreError::Validation("Rating must be a number between 1 and 5.".to_string()));
  }
  Ok(())
}

fn validate_text(value: &str, field: &str) -> StoreResult<()> {
  if value.trim().is_empty() {
    return Err(StoreError::Validation(format!("{} cannot be empty.", field)));
  }
  Ok(())
}

fn validate_changes(changes: &ReviewChanges) -> StoreResult<()> {
  if let Some(rating) = changes.rating {
    validate_rating(rating)?;
  }
  if let Some(title) = &changes.title {
    validate_text(title, "Title")?;
  }
  if let Some(comment) = &changes.comment {
    validate_text(comment, "Comment")?;
  }
  Ok(())
}

async fn owned_review(store: &dyn Store, user_id: Uuid, review_id: Uuid, action: &str) -> StoreResult<Review> {
  let review = store
    .find_review(review_id)
    .await?
    .ok_or_else(|| StoreError::not_found("Review"))?;
  if review.user_id != user_id {
    warn!(%review_id, action, "Review belongs to another user.");
    return Err(StoreError::Forbidden(format!(
      "User not authorized to {} this review.",
      action
    )));
  }
  Ok(review)
}

#[instrument(name = "reviews::list_reviews", skip(store))]
pub async fn list_reviews(store: &dyn Store, product_id: Uuid) -> StoreResult<Vec<Review>> {
  if store.find_product(product_id).await?.is_none() {
    return Err(StoreError::not_found("Product"));
  }
  store.list_reviews(product_id).await
}

#[instrument(name = "reviews::create_review", skip(store, draft))]
pub async fn create_review(store: &dyn Store, user_id: Uuid, product_id: Uuid, draft: ReviewDraft) -> StoreResult<Review> {
  validate_rating(draft.rating)?;
  validate_text(&draft.title, "Title")?;
  validate_text(&draft.comment, "Comment")?;

  if store.find_product(product_id).await?.is_none() {
    return Err(StoreError::not_found("Product"));
  }
  if store.find_user(user_id).await?.is_none() {
    return Err(StoreError::NotFound("User not found. Cannot create review.".to_string()));
  }

  let review = store
    .create_review(NewReview {
      user_id,
      product_id,
      rating: draft.rating,
      title: draft.title.trim().to_string(),
      comment: draft.comment.trim().to_string(),
    })
    .await
    .map_err(|e| match e {
      StoreError::Conflict(_) => StoreError::Conflict("User has already reviewed this product.".to_string()),
      other => other,
    })?;
  info!(review_id = %review.id, rating = review.rating, "Review created.");
  Ok(review)
}

pub async fn get_review(store: &dyn Store, review_id: Uuid) -> StoreResult<Review> {
  store
    .find_review(review_id)
    .await?
    .ok_or_else(|| StoreError::not_found("Review"))
}

#[instrument(name = "reviews::update_review", skip(store, changes))]
pub async fn update_review(
  store: &dyn Store,
  user_id: Uuid,
  review_id: Uuid,
  changes: ReviewChanges,
) -> StoreResult<Review> {
  let existing = owned_review(store, user_id, review_id, "update").await?;
  validate_changes(&changes)?;
  if changes.is_empty() {
    return Ok(existing);
  }
  let changes = ReviewChanges {
    rating: changes.rating,
    title: changes.title.map(|t| t.trim().to_string()),
    comment: changes.comment.map(|c| c.trim().to_string()),
  };
  store
    .update_review(review_id, changes)
    .await?
    .ok_or_else(|| StoreError::not_found("Review"))
}

#[instrument(name = "reviews::delete_review", skip(store))]
pub async fn delete_review(store: &dyn Store, user_id: Uuid, review_id: Uuid) -> StoreResult<()> {
  owned_review(store, user_id, review_id, "delete").await?;
  if !store.delete_review(review_id).await? {
    return Err(StoreError::not_found("Review"));
  }
  info!(%review_id, "Review deleted.");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ratings_outside_one_to_five_are_rejected() {
    assert!(validate_rating(0).is_err());
    assert!(validate_rating(6).is_err());
    assert!(validate_rating(1).is_ok());
    assert!(validate_rating(5).is_ok());
  }

  #[test]
  fn blank_comment_in_changes_is_rejected() {
    let changes = ReviewChanges {
      comment: Some(" ".to_string()),
      ..Default::default()
    };
    assert_eq!(
      validate_changes(&changes).unwrap_err().to_string(),
      "Comment cannot be empty."
    );
  }
}
