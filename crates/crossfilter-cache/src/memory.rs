//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::Utc;
use crossfilter_core::{
    CatalogCache, CategoryCatalog, CategoryScope, PeriodCatalog, PeriodScope, Result,
};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: chrono::DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Key for period catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PeriodsKey {
    provider: String,
    scope: Option<PeriodScope>,
}

/// Key for category catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CategoriesKey {
    provider: String,
    scope: Option<CategoryScope>,
}

/// In-memory catalog cache.
///
/// Catalogs are stored in `RwLock`-protected `HashMap`s and are lost when the
/// cache is dropped. Catalogs are cloned on get/put operations.
#[derive(Debug, Default)]
pub struct InMemoryCatalogCache {
    periods: RwLock<HashMap<PeriodsKey, CacheEntry<PeriodCatalog>>>,
    categories: RwLock<HashMap<CategoriesKey, CacheEntry<CategoryCatalog>>>,
}

impl InMemoryCatalogCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached catalogs.
    pub async fn len(&self) -> usize {
        self.periods.read().await.len() + self.categories.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CatalogCache for InMemoryCatalogCache {
    #[instrument(skip(self), fields(provider = %provider))]
    async fn get_periods(
        &self,
        provider: &str,
        scope: Option<&PeriodScope>,
    ) -> Result<Option<PeriodCatalog>> {
        let key = PeriodsKey {
            provider: provider.to_string(),
            scope: scope.cloned(),
        };

        let cache = self.periods.read().await;
        match cache.get(&key) {
            Some(entry) => {
                debug!("Cache hit for period catalog");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss for period catalog");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, catalog), fields(provider = %provider, items = catalog.len()))]
    async fn put_periods(
        &self,
        provider: &str,
        scope: Option<&PeriodScope>,
        catalog: &PeriodCatalog,
    ) -> Result<()> {
        let key = PeriodsKey {
            provider: provider.to_string(),
            scope: scope.cloned(),
        };

        let mut cache = self.periods.write().await;
        cache.insert(key, CacheEntry::new(catalog.clone()));
        debug!("Cached period catalog");
        Ok(())
    }

    #[instrument(skip(self), fields(provider = %provider))]
    async fn get_categories(
        &self,
        provider: &str,
        scope: Option<&CategoryScope>,
    ) -> Result<Option<CategoryCatalog>> {
        let key = CategoriesKey {
            provider: provider.to_string(),
            scope: scope.copied(),
        };

        let cache = self.categories.read().await;
        match cache.get(&key) {
            Some(entry) => {
                debug!("Cache hit for category catalog");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss for category catalog");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, catalog), fields(provider = %provider, items = catalog.len()))]
    async fn put_categories(
        &self,
        provider: &str,
        scope: Option<&CategoryScope>,
        catalog: &CategoryCatalog,
    ) -> Result<()> {
        let key = CategoriesKey {
            provider: provider.to_string(),
            scope: scope.copied(),
        };

        let mut cache = self.categories.write().await;
        cache.insert(key, CacheEntry::new(catalog.clone()));
        debug!("Cached category catalog");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut total_removed = 0usize;

        {
            let mut cache = self.periods.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        {
            let mut cache = self.categories.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        if total_removed > 0 {
            debug!("Invalidated {} stale catalogs", total_removed);
        }

        Ok(total_removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.periods.write().await.clear();
        self.categories.write().await.clear();
        debug!("Cleared all cached catalogs");
        Ok(())
    }
}
