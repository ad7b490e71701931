//! Cache trait for storing fetched catalogs.
//!
//! This module defines the [`CatalogCache`] trait that provides a unified interface
//! for caching period and category catalogs per provider and scope.

use async_trait::async_trait;
use std::time::Duration;

use crate::{
    error::Result,
    types::{CategoryCatalog, CategoryScope, PeriodCatalog, PeriodScope},
};

/// Trait for caching fetched catalogs.
///
/// Entries are keyed by provider name and scope; `None` is the unscoped catalog.
#[async_trait]
pub trait CatalogCache: Send + Sync {
    /// Retrieves a cached period catalog.
    ///
    /// Returns `Ok(Some(catalog))` if cached, `Ok(None)` if not cached.
    async fn get_periods(
        &self,
        provider: &str,
        scope: Option<&PeriodScope>,
    ) -> Result<Option<PeriodCatalog>>;

    /// Stores a period catalog in the cache.
    async fn put_periods(
        &self,
        provider: &str,
        scope: Option<&PeriodScope>,
        catalog: &PeriodCatalog,
    ) -> Result<()>;

    /// Retrieves a cached category catalog.
    ///
    /// Returns `Ok(Some(catalog))` if cached, `Ok(None)` if not cached.
    async fn get_categories(
        &self,
        provider: &str,
        scope: Option<&CategoryScope>,
    ) -> Result<Option<CategoryCatalog>>;

    /// Stores a category catalog in the cache.
    async fn put_categories(
        &self,
        provider: &str,
        scope: Option<&CategoryScope>,
        catalog: &CategoryCatalog,
    ) -> Result<()>;

    /// Removes cache entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached catalogs.
    async fn clear(&self) -> Result<()>;
}
