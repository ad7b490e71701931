#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for period/category report filtering.
//!
//! This crate provides the foundational abstractions of the cross-filter:
//!
//! - [`PeriodItem`](types::PeriodItem) / [`PeriodCatalog`](types::PeriodCatalog) - Selectable periods
//! - [`CategoryItem`](types::CategoryItem) / [`CategoryCatalog`](types::CategoryCatalog) - Selectable categories
//! - [`FacetSelection`](selection::FacetSelection) - Staged selection for one facet
//! - [`resolve_union`](range::resolve_union) - Chosen periods to a report date range
//! - [`PeriodCatalogProvider`](provider::PeriodCatalogProvider) / [`CategoryCatalogProvider`](provider::CategoryCatalogProvider) - Catalog sources
//! - [`CatalogCache`](cache::CatalogCache) - Caching abstraction

/// Cache trait for storing fetched catalogs.
pub mod cache;
/// Error types for filter operations.
pub mod error;
/// Period granularity definitions.
pub mod granularity;
/// Provider traits for fetching catalogs.
pub mod provider;
/// Mapping of chosen periods to date ranges.
pub mod range;
/// Staged facet selections.
pub mod selection;
/// Core data types (periods, categories, intervals, filters).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::CatalogCache;
pub use error::{FilterError, Result};
pub use granularity::Granularity;
pub use provider::{CatalogProvider, CategoryCatalogProvider, PeriodCatalogProvider};
pub use range::{resolve, resolve_union};
pub use selection::{FacetItem, FacetSelection};
pub use types::{
    CategoryCatalog, CategoryId, CategoryItem, CategoryScope, DateInterval, PeriodCatalog,
    PeriodItem, PeriodKey, PeriodScope, ReportQueryFilter, YearEntry,
};
