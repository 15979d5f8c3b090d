// core/src/pipeline/context_data.rs
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Handle to the data a pipeline run works on. Clones point at the same data.
///
/// `read`/`write` take a blocking lock; drop the guard before awaiting.
#[derive(Debug)]
pub struct ContextData<T: Send + Sync + 'static> {
  inner: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> ContextData<T> {
  pub fn new(data: T) -> Self {
    Self { inner: Arc::new(RwLock::new(data)) }
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.inner.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.inner.write()
  }

  /// `None` while another clone is still alive.
  pub fn into_inner(self) -> Option<T> {
    Arc::into_inner(self.inner).map(RwLock::into_inner)
  }
}

impl<T: Send + Sync + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    Self { inner: Arc::clone(&self.inner) }
  }
}
