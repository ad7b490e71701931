//! Error types for filter operations.
//!
//! This module defines [`FilterError`] which covers all error cases that can occur
//! when fetching catalogs, building period items, staging selections, or loading
//! configuration.

use thiserror::Error;

use crate::granularity::Granularity;

/// Errors that can occur during filter operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// The reporting API answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// The URL that was requested.
        url: String,
    },

    /// Error parsing a catalog response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A period item whose fields do not match its granularity.
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// A period item was staged while a different granularity is active.
    #[error("Cannot stage a {item} period while {active} is active")]
    GranularityMismatch {
        /// The granularity currently active on the facet.
        active: Granularity,
        /// The granularity of the rejected item.
        item: Granularity,
    },

    /// Error interacting with the catalog cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FilterError {
    /// Returns true if this error came from fetching a catalog.
    ///
    /// These are recovered locally by the coordinator: the previous catalog and
    /// selections are retained.
    #[must_use]
    pub const fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Http { .. } | Self::Parse(_) | Self::InvalidPeriod(_)
        )
    }
}

/// Result type alias using [`FilterError`].
pub type Result<T> = std::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_classification() {
        assert!(FilterError::Network("timeout".to_string()).is_fetch_error());
        assert!(
            FilterError::Http {
                status: 502,
                url: "http://localhost/countries".to_string(),
            }
            .is_fetch_error()
        );
        assert!(!FilterError::Config("bad".to_string()).is_fetch_error());
        assert!(
            !FilterError::GranularityMismatch {
                active: Granularity::Yearly,
                item: Granularity::Monthly,
            }
            .is_fetch_error()
        );
    }

    #[test]
    fn test_mismatch_message() {
        let err = FilterError::GranularityMismatch {
            active: Granularity::Quarterly,
            item: Granularity::Monthly,
        };
        assert_eq!(
            err.to_string(),
            "Cannot stage a monthly period while quarterly is active"
        );
    }
}
