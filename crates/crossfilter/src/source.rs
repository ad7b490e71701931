//! Catalog source combining providers with an optional cache.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crossfilter_core::{
    CatalogCache, CategoryCatalog, CategoryCatalogProvider, CategoryScope, PeriodCatalog,
    PeriodCatalogProvider, PeriodScope, Result,
};

/// Where the coordinator gets its catalogs from.
///
/// If a cache is configured it is checked before the provider, and successful
/// provider responses are written back. Cache failures are logged and never
/// fail a fetch.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use crossfilter::{CatalogSource, InMemoryCatalogCache, ReportingApiClient};
///
/// let client = Arc::new(ReportingApiClient::new("https://reports.example.com/api")?);
/// let source = CatalogSource::new(client.clone(), client)
///     .with_cache(Arc::new(InMemoryCatalogCache::new()), Duration::from_secs(300));
/// ```
#[derive(Clone)]
pub struct CatalogSource {
    periods: Arc<dyn PeriodCatalogProvider>,
    categories: Arc<dyn CategoryCatalogProvider>,
    cache: Option<Arc<dyn CatalogCache>>,
    ttl: Option<Duration>,
}

impl std::fmt::Debug for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSource")
            .field("periods", &self.periods.name())
            .field("categories", &self.categories.name())
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl CatalogSource {
    /// Create a source without a cache.
    #[must_use]
    pub fn new(
        periods: Arc<dyn PeriodCatalogProvider>,
        categories: Arc<dyn CategoryCatalogProvider>,
    ) -> Self {
        Self {
            periods,
            categories,
            cache: None,
            ttl: None,
        }
    }

    /// Set the cache; entries older than `ttl` are dropped before each lookup.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CatalogCache>, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.ttl = Some(ttl);
        self
    }

    /// Create a source backed by the reporting API with an in-memory cache.
    #[cfg(feature = "http")]
    pub fn from_config(config: &crate::CoordinatorConfig) -> Result<Self> {
        let client = Arc::new(crossfilter_http::ReportingApiClient::from_config(
            config.api.clone(),
        )?);
        let cache = Arc::new(crossfilter_cache::InMemoryCatalogCache::new());
        Ok(Self::new(client.clone(), client).with_cache(cache, config.cache_ttl()))
    }

    /// Fetch the period catalog, optionally scoped by categories.
    pub async fn fetch_periods(&self, scope: Option<&PeriodScope>) -> Result<PeriodCatalog> {
        let provider = self.periods.name();

        if let Some(cache) = &self.cache {
            self.evict_stale(cache.as_ref()).await;
            if let Ok(Some(cached)) = cache.get_periods(provider, scope).await {
                debug!(provider, scoped = scope.is_some(), "Cache hit for period catalog");
                return Ok(cached);
            }
        }

        debug!(provider, scoped = scope.is_some(), "Fetching period catalog");
        let catalog = self.periods.fetch_period_catalog(scope).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put_periods(provider, scope, &catalog).await {
                warn!(provider, error = %e, "Failed to cache period catalog");
            }
        }
        Ok(catalog)
    }

    /// Fetch the category catalog, optionally scoped by a date range.
    pub async fn fetch_categories(&self, scope: Option<&CategoryScope>) -> Result<CategoryCatalog> {
        let provider = self.categories.name();

        if let Some(cache) = &self.cache {
            self.evict_stale(cache.as_ref()).await;
            if let Ok(Some(cached)) = cache.get_categories(provider, scope).await {
                debug!(provider, scoped = scope.is_some(), "Cache hit for category catalog");
                return Ok(cached);
            }
        }

        debug!(provider, scoped = scope.is_some(), "Fetching category catalog");
        let catalog = self.categories.fetch_category_catalog(scope).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put_categories(provider, scope, &catalog).await {
                warn!(provider, error = %e, "Failed to cache category catalog");
            }
        }
        Ok(catalog)
    }

    async fn evict_stale(&self, cache: &dyn CatalogCache) {
        let Some(ttl) = self.ttl else {
            return;
        };
        if let Err(e) = cache.invalidate_stale(ttl).await {
            warn!(error = %e, "Failed to invalidate stale catalogs");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedProvider;
    use crossfilter_cache::InMemoryCatalogCache;
    use crossfilter_core::{CategoryId, CategoryItem, FilterError, PeriodItem};

    fn periods() -> PeriodCatalog {
        PeriodCatalog::from_items(vec![PeriodItem::yearly(2024).unwrap()])
    }

    fn countries() -> CategoryCatalog {
        CategoryCatalog::new(vec![CategoryItem::new(5, "Japan", "Nippon")])
    }

    #[tokio::test]
    async fn test_fetch_without_cache_hits_provider_every_time() {
        let period_provider = Arc::new(ScriptedProvider::new(periods()));
        let category_provider = Arc::new(ScriptedProvider::new(countries()));
        let source = CatalogSource::new(period_provider.clone(), category_provider.clone());

        source.fetch_categories(None).await.unwrap();
        source.fetch_categories(None).await.unwrap();
        assert_eq!(category_provider.requests().len(), 2);
        assert!(period_provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_cache_serves_repeated_scope() {
        let period_provider = Arc::new(ScriptedProvider::new(periods()));
        let category_provider = Arc::new(ScriptedProvider::new(countries()));
        let source = CatalogSource::new(period_provider.clone(), category_provider)
            .with_cache(Arc::new(InMemoryCatalogCache::new()), Duration::from_secs(60));

        let scope = PeriodScope::new([CategoryId::new(5)]);
        let first = source.fetch_periods(Some(&scope)).await.unwrap();
        let second = source.fetch_periods(Some(&scope)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(period_provider.requests().len(), 1);

        // A different scope is a different entry
        source.fetch_periods(None).await.unwrap();
        assert_eq!(period_provider.requests(), vec![Some(scope), None]);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let period_provider = Arc::new(ScriptedProvider::new(periods()));
        let category_provider = Arc::new(ScriptedProvider::new(countries()));
        category_provider.push_ready(Err(FilterError::Network("connection reset".to_string())));
        let source = CatalogSource::new(period_provider, category_provider.clone())
            .with_cache(Arc::new(InMemoryCatalogCache::new()), Duration::from_secs(60));

        assert!(source.fetch_categories(None).await.is_err());
        assert_eq!(source.fetch_categories(None).await.unwrap(), countries());
        assert_eq!(category_provider.requests().len(), 2);
    }
}
