#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Reporting REST API catalog provider.
//!
//! This crate provides a reqwest-based client that implements the
//! [`CatalogProvider`], [`PeriodCatalogProvider`], and [`CategoryCatalogProvider`]
//! traits from `crossfilter-core`.
//!
//! # Example
//!
//! ```no_run
//! use crossfilter_http::ReportingApiClient;
//! use crossfilter_core::CategoryCatalogProvider;
//!
//! # async fn example() -> crossfilter_core::Result<()> {
//! let client = ReportingApiClient::new("https://reports.example.com/api")?;
//! let countries = client.fetch_category_catalog(None).await?;
//! println!("Fetched {} countries", countries.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use crossfilter_core::{
    CatalogProvider, CategoryCatalog, CategoryCatalogProvider, CategoryItem, CategoryScope,
    FilterError, PeriodCatalog, PeriodCatalogProvider, PeriodItem, PeriodScope, Result, YearEntry,
    types::join_ids,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Provider name, also the cache namespace.
const PROVIDER_NAME: &str = "Reporting API";

/// Connection settings for the reporting API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingApiConfig {
    /// API root, e.g. `https://reports.example.com/api`.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Path of the period catalog endpoint, relative to `base_url`.
    pub periods_path: String,

    /// Path of the category catalog endpoint, relative to `base_url`.
    pub categories_path: String,
}

impl Default for ReportingApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            periods_path: "periods".to_string(),
            categories_path: "countries".to_string(),
        }
    }
}

impl ReportingApiConfig {
    /// Creates a config for `base_url` with default paths and timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Catalog provider backed by the reporting REST API.
///
/// Implements [`CatalogProvider`], [`PeriodCatalogProvider`], and [`CategoryCatalogProvider`].
#[derive(Debug)]
pub struct ReportingApiClient {
    client: reqwest::Client,
    config: ReportingApiConfig,
}

impl ReportingApiClient {
    /// Create a client for `base_url` with default settings.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(ReportingApiConfig::new(base_url))
    }

    /// Create a client from a config, building its own HTTP client.
    pub fn from_config(config: ReportingApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FilterError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create a client with a caller-supplied HTTP client.
    ///
    /// Use this to attach authentication headers; the config's timeout is not
    /// applied to a supplied client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client, config: ReportingApiConfig) -> Self {
        Self { client, config }
    }

    /// Returns the client's configuration.
    #[must_use]
    pub const fn config(&self) -> &ReportingApiConfig {
        &self.config
    }

    /// Build the period catalog URL for an optional scope.
    fn periods_url(&self, scope: Option<&PeriodScope>) -> Result<Url> {
        let mut params = Vec::new();
        if let Some(scope) = scope {
            params.push(("countryIds", join_ids(&scope.category_ids)));
        }
        self.build_url(&self.config.periods_path, &params)
    }

    /// Build the category catalog URL for an optional scope.
    fn categories_url(&self, scope: Option<&CategoryScope>) -> Result<Url> {
        let mut params = Vec::new();
        if let Some(scope) = scope {
            params.push(("dateFrom", scope.date_from.format("%Y-%m-%d").to_string()));
            params.push(("dateTo", scope.date_to.format("%Y-%m-%d").to_string()));
        }
        self.build_url(&self.config.categories_path, &params)
    }

    fn build_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let endpoint = self.config.endpoint(path);
        let url = if params.is_empty() {
            Url::parse(&endpoint)
        } else {
            Url::parse_with_params(&endpoint, params)
        };
        url.map_err(|e| FilterError::Config(format!("invalid URL {endpoint}: {e}")))
    }

    /// Send a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("Fetching catalog: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FilterError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FilterError::Http {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FilterError::Parse(e.to_string()))
    }
}

impl CatalogProvider for ReportingApiClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Reporting REST API provider for period and country catalogs"
    }
}

#[async_trait]
impl PeriodCatalogProvider for ReportingApiClient {
    #[instrument(skip(self))]
    async fn fetch_period_catalog(&self, scope: Option<&PeriodScope>) -> Result<PeriodCatalog> {
        let url = self.periods_url(scope)?;
        let response: PeriodCatalogResponse = self.get_json(url).await?;
        parse_period_catalog(response)
    }
}

#[async_trait]
impl CategoryCatalogProvider for ReportingApiClient {
    #[instrument(skip(self))]
    async fn fetch_category_catalog(
        &self,
        scope: Option<&CategoryScope>,
    ) -> Result<CategoryCatalog> {
        let url = self.categories_url(scope)?;
        let items: Vec<CategoryItem> = self.get_json(url).await?;
        debug!(count = items.len(), "Fetched category catalog");
        Ok(CategoryCatalog::new(items))
    }
}

/// Convert the period tree response into a catalog.
fn parse_period_catalog(response: PeriodCatalogResponse) -> Result<PeriodCatalog> {
    let mut years = Vec::with_capacity(response.years.len());

    for year in response.years {
        let year_item = labelled(PeriodItem::yearly(year.year)?, year.label, year.order_count);

        let quarters = year
            .quarters
            .into_iter()
            .map(|q| {
                PeriodItem::quarterly(year.year, q.quarter)
                    .map(|item| labelled(item, q.label, q.order_count))
            })
            .collect::<Result<Vec<_>>>()?;

        let months = year
            .months
            .into_iter()
            .map(|m| {
                PeriodItem::monthly(year.year, m.month)
                    .map(|item| labelled(item, m.label, m.order_count))
            })
            .collect::<Result<Vec<_>>>()?;

        years.push(YearEntry::new(year_item, quarters, months)?);
    }

    debug!(years = years.len(), "Parsed period catalog");
    Ok(PeriodCatalog::new(years))
}

fn labelled(item: PeriodItem, label: Option<String>, order_count: Option<u64>) -> PeriodItem {
    let item = match label {
        Some(label) if !label.is_empty() => item.with_label(label),
        _ => item,
    };
    match order_count {
        Some(count) => item.with_order_count(count),
        None => item,
    }
}

// ============================================================================
// Reporting API Response Types
// ============================================================================

/// Period catalog response.
#[derive(Debug, Deserialize)]
struct PeriodCatalogResponse {
    years: Vec<YearNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YearNode {
    year: i32,
    label: Option<String>,
    order_count: Option<u64>,
    #[serde(default)]
    quarters: Vec<QuarterNode>,
    #[serde(default)]
    months: Vec<MonthNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuarterNode {
    quarter: u8,
    label: Option<String>,
    order_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonthNode {
    month: u8,
    label: Option<String>,
    order_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crossfilter_core::{CategoryId, DateInterval, Granularity, PeriodKey};

    const PERIODS_JSON: &str = r#"{
        "years": [
            {
                "year": 2023,
                "label": "2023",
                "orderCount": 120,
                "quarters": [
                    {"quarter": 1, "label": "Q1 2023", "orderCount": 30},
                    {"quarter": 2, "orderCount": 25}
                ],
                "months": [
                    {"month": 1, "label": "January 2023", "orderCount": 9}
                ]
            },
            {"year": 2024}
        ]
    }"#;

    fn client() -> ReportingApiClient {
        ReportingApiClient::new("https://reports.example.com/api/").unwrap()
    }

    #[test]
    fn test_periods_url() {
        let client = client();
        let url = client.periods_url(None).unwrap();
        assert_eq!(url.as_str(), "https://reports.example.com/api/periods");

        let scope = PeriodScope::new([CategoryId::new(5), CategoryId::new(2)]);
        let url = client.periods_url(Some(&scope)).unwrap();
        assert_eq!(
            url.as_str(),
            "https://reports.example.com/api/periods?countryIds=2%2C5"
        );
    }

    #[test]
    fn test_categories_url() {
        let client = client();
        let scope: CategoryScope = DateInterval::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
        )
        .unwrap()
        .into();

        let url = client.categories_url(Some(&scope)).unwrap();
        assert_eq!(
            url.as_str(),
            "https://reports.example.com/api/countries?dateFrom=2024-01-01&dateTo=2024-09-30"
        );
    }

    #[test]
    fn test_custom_paths() {
        let config = ReportingApiConfig {
            periods_path: "/v2/report-periods".to_string(),
            ..ReportingApiConfig::new("http://localhost:9000")
        };
        let client = ReportingApiClient::from_config(config).unwrap();
        let url = client.periods_url(None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/v2/report-periods");
    }

    #[test]
    fn test_parse_period_catalog() {
        let response: PeriodCatalogResponse = serde_json::from_str(PERIODS_JSON).unwrap();
        let catalog = parse_period_catalog(response).unwrap();

        assert_eq!(catalog.years().len(), 2);
        let first = &catalog.years()[0];
        assert_eq!(first.year().order_count(), Some(120));
        assert_eq!(first.quarters().len(), 2);
        assert_eq!(first.quarters()[1].label(), "Q2 2023");
        assert_eq!(first.months()[0].label(), "January 2023");
        assert_eq!(catalog.items(Granularity::Monthly).count(), 1);
        assert!(catalog.find(&PeriodKey::Year(2024)).is_some());
    }

    #[test]
    fn test_parse_rejects_invalid_quarter() {
        let json = r#"{"years": [{"year": 2023, "quarters": [{"quarter": 7}]}]}"#;
        let response: PeriodCatalogResponse = serde_json::from_str(json).unwrap();
        let err = parse_period_catalog(response).unwrap_err();
        assert!(matches!(err, FilterError::InvalidPeriod(_)));
        assert!(err.is_fetch_error());
    }

    #[test]
    fn test_category_response_shape() {
        let json = r#"[
            {"id": 5, "nameLocal": "Japan", "nameForeign": "Nippon"},
            {"id": 7, "nameLocal": "Korea", "nameForeign": "Hanguk"}
        ]"#;
        let items: Vec<CategoryItem> = serde_json::from_str(json).unwrap();
        let catalog = CategoryCatalog::new(items);
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.find(CategoryId::new(7)).unwrap().name_foreign,
            "Hanguk"
        );
    }

    #[test]
    fn test_provider_info() {
        let client = client();
        assert_eq!(client.name(), "Reporting API");
        assert_eq!(client.config().timeout_secs, 30);
    }
}
