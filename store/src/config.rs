//! Store configuration, usually read from the environment.

use thiserror::Error;
use todo_api::{SortField, SortOrder};
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base URL must not be empty")]
    EmptyBaseUrl,
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// API root, e.g. `http://localhost:8080/api`.
    pub base_url: String,
    pub page_size: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl StoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Reads `TODO_API_URL`, `TODO_PAGE_SIZE`, `TODO_SORT_BY` and
    /// `TODO_SORT_ORDER`. Unset or unparseable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new(lookup("TODO_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()));

        if let Some(raw) = lookup("TODO_PAGE_SIZE") {
            match raw.parse::<u32>() {
                Ok(size) if size > 0 => config.page_size = size,
                _ => warn!(value = %raw, "ignoring invalid TODO_PAGE_SIZE"),
            }
        }
        if let Some(raw) = lookup("TODO_SORT_BY") {
            match raw.parse() {
                Ok(field) => config.sort_by = field,
                Err(err) => warn!(%err, "ignoring invalid TODO_SORT_BY"),
            }
        }
        if let Some(raw) = lookup("TODO_SORT_ORDER") {
            match raw.parse() {
                Ok(order) => config.sort_order = order,
                Err(err) => warn!(%err, "ignoring invalid TODO_SORT_ORDER"),
            }
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }
}
