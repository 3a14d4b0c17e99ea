//! Persisted feed filter selection.

use std::sync::Arc;

use crate::domain::filters::FeedFilters;
use crate::shared::error::AppError;

use super::local_store::LocalStore;

/// Storage key holding the last-applied feed filters.
pub const FEED_FILTERS_KEY: &str = "feedFilters";

/// Reads and writes the `feedFilters` entry of the local store.
#[derive(Clone)]
pub struct FeedFilterStore {
    store: Arc<LocalStore>,
}

impl FeedFilterStore {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// Filters to start a view with. Missing or unreadable entries fall
    /// back to the default selection.
    pub fn load(&self) -> FeedFilters {
        match self.store.get::<FeedFilters>(FEED_FILTERS_KEY) {
            Ok(Some(filters)) => filters,
            Ok(None) => FeedFilters::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load filters from storage");
                FeedFilters::default()
            }
        }
    }

    /// Persist `filters`; called on every change.
    pub fn save(&self, filters: &FeedFilters) -> Result<(), AppError> {
        self.store.set(FEED_FILTERS_KEY, filters)
    }

    /// Apply `edit` to the stored filters and persist the result.
    pub fn update(&self, edit: impl FnOnce(&mut FeedFilters)) -> Result<FeedFilters, AppError> {
        let mut filters = self.load();
        edit(&mut filters);
        self.save(&filters)?;
        Ok(filters)
    }
}
