#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Catalog caching implementations for the report filter coordinator.
//!
//! This crate provides [`InMemoryCatalogCache`], an implementation of the
//! [`CatalogCache`] trait from `crossfilter-core` with TTL-based invalidation.

/// In-memory cache implementation.
pub mod memory;

// Re-export the trait for convenience
pub use crossfilter_core::CatalogCache;

// Re-export implementations
pub use memory::InMemoryCatalogCache;
