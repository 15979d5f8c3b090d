// server/src/pipelines/mod.rs

//! Builds the workflow pipelines used by the storefront handlers.

use crate::errors::AppError;
use storefront::Pipeline;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod contexts;

use contexts::{AddToCartCtxData, CheckoutCtxData};

/// Pipelines built once at startup and shared by every worker.
pub struct AppPipelines {
  pub add_to_cart: Pipeline<AddToCartCtxData, AppError>,
  pub checkout: Pipeline<CheckoutCtxData, AppError>,
}

impl AppPipelines {
  pub fn build() -> Self {
    let pipelines = Self {
      add_to_cart: cart_pipeline::build_add_to_cart_pipeline(),
      checkout: checkout_pipeline::build_checkout_pipeline(),
    };
    tracing::info!("Application pipelines built.");
    pipelines
  }
}
