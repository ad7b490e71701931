//! Coordinator configuration.
//!
//! Supports a TOML file with every key optional:
//!
//! ```toml
//! period_placeholder = "All periods"
//! category_placeholder = "All countries"
//! count_phrase = "{count} items"
//! narrow_categories = true
//! narrow_periods = true
//! cache_ttl_secs = 300
//!
//! [api]
//! base_url = "https://reports.example.com/api"
//! timeout_secs = 30
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crossfilter_core::selection::COUNT_PLACEHOLDER;
use crossfilter_core::{FilterError, Result};

#[cfg(feature = "http")]
use crossfilter_http::ReportingApiConfig;

/// Configuration for a [`CrossFilterCoordinator`](crate::CrossFilterCoordinator).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Period button text when no period is chosen.
    pub period_placeholder: String,

    /// Category button text when no category is chosen.
    pub category_placeholder: String,

    /// Button text when several items are chosen; `{count}` is replaced.
    pub count_phrase: String,

    /// Re-fetch the category catalog when the period facet changes.
    pub narrow_categories: bool,

    /// Re-fetch the period catalog when the category facet changes.
    pub narrow_periods: bool,

    /// Maximum age of cached catalogs in seconds.
    pub cache_ttl_secs: u64,

    /// Reporting API connection settings.
    #[cfg(feature = "http")]
    pub api: ReportingApiConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            period_placeholder: "All periods".to_string(),
            category_placeholder: "All countries".to_string(),
            count_phrase: crossfilter_core::selection::DEFAULT_COUNT_PHRASE.to_string(),
            narrow_categories: true,
            narrow_periods: true,
            cache_ttl_secs: 300,
            #[cfg(feature = "http")]
            api: ReportingApiConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Load a config from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| FilterError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| FilterError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialization cannot.
    pub fn validate(&self) -> Result<()> {
        if !self.count_phrase.contains(COUNT_PLACEHOLDER) {
            return Err(FilterError::Config(format!(
                "count_phrase {:?} must contain {COUNT_PLACEHOLDER}",
                self.count_phrase
            )));
        }
        Ok(())
    }

    /// Returns the cache TTL as a duration.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Set the placeholder texts.
    #[must_use]
    pub fn with_placeholders(
        mut self,
        period_placeholder: impl Into<String>,
        category_placeholder: impl Into<String>,
    ) -> Self {
        self.period_placeholder = period_placeholder.into();
        self.category_placeholder = category_placeholder.into();
        self
    }

    /// Set the count phrase.
    #[must_use]
    pub fn with_count_phrase(mut self, count_phrase: impl Into<String>) -> Self {
        self.count_phrase = count_phrase.into();
        self
    }

    /// Enable or disable narrowing of each facet.
    ///
    /// With both disabled the coordinator behaves like two independent filters.
    #[must_use]
    pub const fn with_narrowing(mut self, narrow_categories: bool, narrow_periods: bool) -> Self {
        self.narrow_categories = narrow_categories;
        self.narrow_periods = narrow_periods;
        self
    }
}
