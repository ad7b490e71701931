#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Period/category cross-filter coordinator for reporting dashboards.
//!
//! This crate re-exports the core types and provides the
//! [`CrossFilterCoordinator`], which keeps a period facet and a category facet
//! mutually consistent and emits a combined [`ReportQueryFilter`] after every
//! confirm or clear.
//!
//! # Features
//!
//! - `http` - Reporting API client used as the default catalog source
//!
//! # Example
//!
//! ```rust,ignore
//! use crossfilter::{CatalogSource, CoordinatorConfig, CrossFilterCoordinator, PeriodItem};
//!
//! #[tokio::main]
//! async fn main() -> crossfilter::Result<()> {
//!     let config = CoordinatorConfig::from_file("crossfilter.toml")?;
//!     let source = CatalogSource::from_config(&config)?;
//!     let coordinator = CrossFilterCoordinator::new(source, config, |filter: &crossfilter::ReportQueryFilter| {
//!         println!("{:?}", filter.to_query_pairs());
//!     });
//!
//!     coordinator.load_initial().await;
//!     let transition = coordinator
//!         .confirm_period_items([PeriodItem::quarterly(2024, 1)?, PeriodItem::quarterly(2024, 3)?])
//!         .await?;
//!     println!("{:?}", transition.filter);
//!
//!     Ok(())
//! }
//! ```

mod config;
mod coordinator;
mod source;

#[cfg(test)]
mod test_support;

// Core types and traits
pub use crossfilter_core::*;

// Cache implementations
pub use crossfilter_cache::InMemoryCatalogCache;

// Providers
#[cfg(feature = "http")]
pub use crossfilter_http::{ReportingApiClient, ReportingApiConfig};

pub use config::CoordinatorConfig;
pub use coordinator::{
    CrossFilterCoordinator, FilterListener, InitialLoad, NarrowingOutcome, Transition,
};
pub use source::CatalogSource;
