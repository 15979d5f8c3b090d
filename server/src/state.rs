// server/src/state.rs
use crate::config::AppConfig;
use crate::pipelines::AppPipelines;
use std::sync::Arc;
use storefront::Store;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub pipelines: Arc<AppPipelines>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the store into freshly built pipelines.
  pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
    Self {
      store,
      pipelines: Arc::new(AppPipelines::build()),
      config,
    }
  }
}
