// core/src/models/page.rs

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// 1-based page number and page size, already clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page: u32,
  pub limit: u32,
}

impl PageRequest {
  pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
    Self {
      page: page.unwrap_or(1).max(1),
      limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
    }
  }

  pub fn offset(&self) -> u64 {
    u64::from(self.page - 1) * u64::from(self.limit)
  }

  pub fn meta(&self, total: u64) -> PageMeta {
    PageMeta {
      total,
      page: self.page,
      limit: self.limit,
      total_pages: total.div_ceil(u64::from(self.limit)),
    }
  }
}

impl Default for PageRequest {
  fn default() -> Self {
    Self::new(None, None)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
  pub total: u64,
  pub page: u32,
  pub limit: u32,
  pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
  pub data: Vec<T>,
  pub meta: PageMeta,
}
