//! Provider traits for fetching filter catalogs.
//!
//! This module defines the collaborator traits the coordinator consumes:
//!
//! - [`CatalogProvider`] - Base trait for all catalog providers
//! - [`PeriodCatalogProvider`] - Year/quarter/month catalogs, optionally scoped by categories
//! - [`CategoryCatalogProvider`] - Category catalogs, optionally scoped by a date range

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{CategoryCatalog, CategoryScope, PeriodCatalog, PeriodScope},
};

/// Base trait for all catalog providers.
pub trait CatalogProvider: Send + Sync + Debug {
    /// Returns the name of this provider, also used as its cache namespace.
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider for the period catalog.
#[async_trait]
pub trait PeriodCatalogProvider: CatalogProvider {
    /// Fetches the period catalog.
    ///
    /// With `None` the full catalog is returned; with a scope, only periods
    /// that have data for the scoped categories.
    async fn fetch_period_catalog(&self, scope: Option<&PeriodScope>) -> Result<PeriodCatalog>;
}

/// Provider for the category catalog.
#[async_trait]
pub trait CategoryCatalogProvider: CatalogProvider {
    /// Fetches the category catalog.
    ///
    /// With `None` the full catalog is returned; with a scope, only categories
    /// that have data within the scoped date range.
    async fn fetch_category_catalog(&self, scope: Option<&CategoryScope>)
    -> Result<CategoryCatalog>;
}
