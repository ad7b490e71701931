//! Core data types for report filtering.
//!
//! This module defines the fundamental data structures:
//!
//! - [`PeriodKey`] / [`PeriodItem`] - A selectable year, quarter or month
//! - [`PeriodCatalog`] - Years with their quarters and months
//! - [`CategoryId`] / [`CategoryItem`] / [`CategoryCatalog`] - Selectable categories (countries)
//! - [`DateInterval`] - An inclusive date range
//! - [`PeriodScope`] / [`CategoryScope`] - Narrowing scopes for catalog fetches
//! - [`ReportQueryFilter`] - The combined filter handed to the report query

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::error::{FilterError, Result};
use crate::granularity::Granularity;

/// Earliest year a period item may carry.
pub const MIN_YEAR: i32 = 1;

/// Latest year a period item may carry.
pub const MAX_YEAR: i32 = 9999;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Identity of a period item.
///
/// The variant carries the granularity, so a quarter number without a quarter
/// granularity (or the reverse) cannot be expressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PeriodKey {
    /// A calendar year.
    Year(i32),
    /// A calendar quarter.
    Quarter {
        /// Calendar year.
        year: i32,
        /// Quarter number (1-4).
        quarter: u8,
    },
    /// A calendar month.
    Month {
        /// Calendar year.
        year: i32,
        /// Month number (1-12).
        month: u8,
    },
}

impl PeriodKey {
    /// Returns the granularity of this key.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        match self {
            Self::Year(_) => Granularity::Yearly,
            Self::Quarter { .. } => Granularity::Quarterly,
            Self::Month { .. } => Granularity::Monthly,
        }
    }

    /// Returns the calendar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        match self {
            Self::Year(year) | Self::Quarter { year, .. } | Self::Month { year, .. } => *year,
        }
    }

    /// Returns the quarter number for quarterly keys.
    #[must_use]
    pub const fn quarter(&self) -> Option<u8> {
        match self {
            Self::Quarter { quarter, .. } => Some(*quarter),
            _ => None,
        }
    }

    /// Returns the month number for monthly keys.
    #[must_use]
    pub const fn month(&self) -> Option<u8> {
        match self {
            Self::Month { month, .. } => Some(*month),
            _ => None,
        }
    }

    /// Checks the year, quarter and month ranges.
    pub fn validate(&self) -> Result<()> {
        let year = self.year();
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(FilterError::InvalidPeriod(format!(
                "year {year} outside {MIN_YEAR}..={MAX_YEAR}"
            )));
        }
        match self {
            Self::Quarter { quarter, .. } if !(1..=4).contains(quarter) => Err(
                FilterError::InvalidPeriod(format!("quarter {quarter} outside 1..=4")),
            ),
            Self::Month { month, .. } if !(1..=12).contains(month) => Err(
                FilterError::InvalidPeriod(format!("month {month} outside 1..=12")),
            ),
            _ => Ok(()),
        }
    }

    /// Returns the label used when the catalog supplies none.
    #[must_use]
    pub fn default_label(&self) -> String {
        match self {
            Self::Year(year) => year.to_string(),
            Self::Quarter { year, quarter } => format!("Q{quarter} {year}"),
            Self::Month { year, month } => {
                let name = usize::from(*month)
                    .checked_sub(1)
                    .and_then(|i| MONTH_ABBREVIATIONS.get(i))
                    .copied()
                    .unwrap_or("?");
                format!("{name} {year}")
            }
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{year}"),
            Self::Quarter { year, quarter } => write!(f, "{year}-Q{quarter}"),
            Self::Month { year, month } => write!(f, "{year}-{month:02}"),
        }
    }
}

/// A selectable time period with its display label.
///
/// Items are validated on construction and deserialization, so a quarterly
/// item always carries a quarter in 1..=4 and a monthly item a month in 1..=12.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPeriodItem", into = "RawPeriodItem")]
pub struct PeriodItem {
    key: PeriodKey,
    label: String,
    order_count: Option<u64>,
}

impl PeriodItem {
    /// Creates an item from a key, using the default label.
    pub fn from_key(key: PeriodKey) -> Result<Self> {
        key.validate()?;
        Ok(Self {
            label: key.default_label(),
            key,
            order_count: None,
        })
    }

    /// Creates a yearly item.
    pub fn yearly(year: i32) -> Result<Self> {
        Self::from_key(PeriodKey::Year(year))
    }

    /// Creates a quarterly item.
    pub fn quarterly(year: i32, quarter: u8) -> Result<Self> {
        Self::from_key(PeriodKey::Quarter { year, quarter })
    }

    /// Creates a monthly item.
    pub fn monthly(year: i32, month: u8) -> Result<Self> {
        Self::from_key(PeriodKey::Month { year, month })
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the order count shown next to the label.
    #[must_use]
    pub const fn with_order_count(mut self, order_count: u64) -> Self {
        self.order_count = Some(order_count);
        self
    }

    /// Returns the identity key.
    #[must_use]
    pub const fn key(&self) -> PeriodKey {
        self.key
    }

    /// Returns the granularity.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.key.granularity()
    }

    /// Returns the calendar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.key.year()
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the order count, if the catalog supplied one.
    #[must_use]
    pub const fn order_count(&self) -> Option<u64> {
        self.order_count
    }
}

/// Flat wire shape of a [`PeriodItem`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPeriodItem {
    granularity: Granularity,
    year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quarter: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    month: Option<u8>,
    #[serde(default)]
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order_count: Option<u64>,
}

impl TryFrom<RawPeriodItem> for PeriodItem {
    type Error = FilterError;

    fn try_from(raw: RawPeriodItem) -> Result<Self> {
        let key = match (raw.granularity, raw.quarter, raw.month) {
            (Granularity::Yearly, None, None) => PeriodKey::Year(raw.year),
            (Granularity::Quarterly, Some(quarter), None) => PeriodKey::Quarter {
                year: raw.year,
                quarter,
            },
            (Granularity::Monthly, None, Some(month)) => PeriodKey::Month {
                year: raw.year,
                month,
            },
            (granularity, quarter, month) => {
                return Err(FilterError::InvalidPeriod(format!(
                    "{granularity} period {} with quarter {quarter:?} and month {month:?}",
                    raw.year
                )));
            }
        };

        let mut item = Self::from_key(key)?;
        if !raw.label.is_empty() {
            item.label = raw.label;
        }
        item.order_count = raw.order_count;
        Ok(item)
    }
}

impl From<PeriodItem> for RawPeriodItem {
    fn from(item: PeriodItem) -> Self {
        Self {
            granularity: item.key.granularity(),
            year: item.key.year(),
            quarter: item.key.quarter(),
            month: item.key.month(),
            label: item.label,
            order_count: item.order_count,
        }
    }
}

/// One year of a [`PeriodCatalog`] with its quarters and months.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct YearEntry {
    year: PeriodItem,
    quarters: Vec<PeriodItem>,
    months: Vec<PeriodItem>,
}

impl YearEntry {
    /// Creates a year entry, checking that every child belongs to the year.
    pub fn new(year: PeriodItem, quarters: Vec<PeriodItem>, months: Vec<PeriodItem>) -> Result<Self> {
        if year.granularity() != Granularity::Yearly {
            return Err(FilterError::InvalidPeriod(format!(
                "year entry built from {} item {}",
                year.granularity(),
                year.key()
            )));
        }
        let expected = [(&quarters, Granularity::Quarterly), (&months, Granularity::Monthly)];
        for (children, granularity) in expected {
            if let Some(bad) = children
                .iter()
                .find(|c| c.granularity() != granularity || c.year() != year.year())
            {
                return Err(FilterError::InvalidPeriod(format!(
                    "{} does not belong under year {}",
                    bad.key(),
                    year.year()
                )));
            }
        }
        Ok(Self {
            year,
            quarters,
            months,
        })
    }

    /// Returns the yearly item.
    #[must_use]
    pub const fn year(&self) -> &PeriodItem {
        &self.year
    }

    /// Returns the quarters of this year in catalog order.
    #[must_use]
    pub fn quarters(&self) -> &[PeriodItem] {
        &self.quarters
    }

    /// Returns the months of this year in catalog order.
    #[must_use]
    pub fn months(&self) -> &[PeriodItem] {
        &self.months
    }

    fn items(&self) -> impl Iterator<Item = &PeriodItem> {
        std::iter::once(&self.year)
            .chain(self.quarters.iter())
            .chain(self.months.iter())
    }
}

/// Hierarchical catalog of selectable periods.
///
/// Catalogs are replaced wholesale on every fetch and never mutated in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PeriodCatalog {
    years: Vec<YearEntry>,
}

impl PeriodCatalog {
    /// Creates a catalog from year entries, in display order.
    #[must_use]
    pub const fn new(years: Vec<YearEntry>) -> Self {
        Self { years }
    }

    /// Builds a catalog from a flat list of items.
    ///
    /// Quarters and months are attached to their year, in input order. A year
    /// that only appears through its children gets a default yearly item.
    /// Duplicate keys keep the first occurrence.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = PeriodItem>) -> Self {
        let mut years: Vec<YearEntry> = Vec::new();
        let mut seen = HashSet::new();

        for item in items {
            if !seen.insert(item.key()) {
                continue;
            }
            let year = item.year();
            let index = match years.iter().position(|e| e.year.year() == year) {
                Some(index) => index,
                None => {
                    let placeholder = PeriodItem {
                        key: PeriodKey::Year(year),
                        label: PeriodKey::Year(year).default_label(),
                        order_count: None,
                    };
                    years.push(YearEntry {
                        year: placeholder,
                        quarters: Vec::new(),
                        months: Vec::new(),
                    });
                    years.len() - 1
                }
            };
            let entry = &mut years[index];
            match item.granularity() {
                Granularity::Yearly => entry.year = item,
                Granularity::Quarterly => entry.quarters.push(item),
                Granularity::Monthly => entry.months.push(item),
            }
        }

        Self { years }
    }

    /// Returns the year entries.
    #[must_use]
    pub fn years(&self) -> &[YearEntry] {
        &self.years
    }

    /// Returns every item of the given granularity, in catalog order.
    pub fn items(&self, granularity: Granularity) -> impl Iterator<Item = &PeriodItem> {
        self.years.iter().flat_map(move |entry| match granularity {
            Granularity::Yearly => std::slice::from_ref(&entry.year).iter(),
            Granularity::Quarterly => entry.quarters.iter(),
            Granularity::Monthly => entry.months.iter(),
        })
    }

    /// Returns every item of every granularity.
    pub fn iter(&self) -> impl Iterator<Item = &PeriodItem> {
        self.years.iter().flat_map(YearEntry::items)
    }

    /// Looks up an item by key.
    #[must_use]
    pub fn find(&self, key: &PeriodKey) -> Option<&PeriodItem> {
        self.iter().find(|item| item.key() == *key)
    }

    /// Returns the identity keys of all items.
    #[must_use]
    pub fn keys(&self) -> HashSet<PeriodKey> {
        self.iter().map(PeriodItem::key).collect()
    }

    /// Returns the total number of items across all granularities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.years
            .iter()
            .map(|e| 1 + e.quarters.len() + e.months.len())
            .sum()
    }

    /// Returns true if the catalog has no years.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Identifier of a category (country) in the reporting API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(i64);

impl CategoryId {
    /// Creates a category id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CategoryId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A selectable category value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryItem {
    /// Identity of the category.
    pub id: CategoryId,
    /// Short name in the dashboard's language.
    pub name_local: String,
    /// Long or foreign-language name.
    pub name_foreign: String,
}

impl CategoryItem {
    /// Creates a new category item.
    #[must_use]
    pub fn new(
        id: impl Into<CategoryId>,
        name_local: impl Into<String>,
        name_foreign: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name_local: name_local.into(),
            name_foreign: name_foreign.into(),
        }
    }
}

/// Flat catalog of selectable categories.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryCatalog {
    items: Vec<CategoryItem>,
}

impl CategoryCatalog {
    /// Creates a catalog, keeping the first occurrence of each id.
    #[must_use]
    pub fn new(items: Vec<CategoryItem>) -> Self {
        items.into_iter().collect()
    }

    /// Returns the items in catalog order.
    #[must_use]
    pub fn items(&self) -> &[CategoryItem] {
        &self.items
    }

    /// Returns an iterator over the items.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryItem> {
        self.items.iter()
    }

    /// Looks up an item by id.
    #[must_use]
    pub fn find(&self, id: CategoryId) -> Option<&CategoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Returns the identity keys of all items.
    #[must_use]
    pub fn keys(&self) -> HashSet<CategoryId> {
        self.items.iter().map(|item| item.id).collect()
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<CategoryItem> for CategoryCatalog {
    fn from_iter<I: IntoIterator<Item = CategoryItem>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        Self {
            items: iter.into_iter().filter(|item| seen.insert(item.id)).collect(),
        }
    }
}

/// An inclusive date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateInterval {
    /// Creates an interval, or `None` if `start` is after `end`.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// First day of the interval.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the interval.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns true if `date` falls within the interval.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns true if `other` lies entirely within this interval.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns the smallest interval covering both.
    #[must_use]
    pub fn bounding(&self, other: &Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Number of days covered, counting both ends.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Narrowing scope for a period catalog fetch.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodScope {
    /// Only periods with data for these categories.
    pub category_ids: BTreeSet<CategoryId>,
}

impl PeriodScope {
    /// Creates a scope from category ids.
    #[must_use]
    pub fn new(category_ids: impl IntoIterator<Item = CategoryId>) -> Self {
        Self {
            category_ids: category_ids.into_iter().collect(),
        }
    }
}

/// Narrowing scope for a category catalog fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScope {
    /// First day of the range.
    pub date_from: NaiveDate,
    /// Last day of the range.
    pub date_to: NaiveDate,
}

impl From<DateInterval> for CategoryScope {
    fn from(interval: DateInterval) -> Self {
        Self {
            date_from: interval.start(),
            date_to: interval.end(),
        }
    }
}

/// Combined filter consumed by the report query.
///
/// Fields are `None` when the corresponding facet has nothing chosen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQueryFilter {
    /// First day of the reporting range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    /// Last day of the reporting range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    /// Categories to report on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_ids: Option<BTreeSet<CategoryId>>,
}

impl ReportQueryFilter {
    /// Combines a resolved date range and chosen category ids.
    ///
    /// An empty id set contributes no constraint.
    #[must_use]
    pub fn new(range: Option<DateInterval>, category_ids: impl IntoIterator<Item = CategoryId>) -> Self {
        let ids: BTreeSet<CategoryId> = category_ids.into_iter().collect();
        Self {
            date_from: range.map(|r| r.start()),
            date_to: range.map(|r| r.end()),
            category_ids: (!ids.is_empty()).then_some(ids),
        }
    }

    /// Returns the date range, if both ends are set.
    #[must_use]
    pub fn date_range(&self) -> Option<DateInterval> {
        DateInterval::new(self.date_from?, self.date_to?)
    }

    /// Returns true if neither facet constrains the report.
    #[must_use]
    pub const fn is_unconstrained(&self) -> bool {
        self.date_from.is_none() && self.date_to.is_none() && self.category_ids.is_none()
    }

    /// Renders the filter as reporting API query parameters.
    ///
    /// Dates use ISO format; ids are comma-joined in ascending order.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(from) = self.date_from {
            pairs.push(("dateFrom", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.date_to {
            pairs.push(("dateTo", to.format("%Y-%m-%d").to_string()));
        }
        if let Some(ids) = &self.category_ids {
            pairs.push(("countryIds", join_ids(ids)));
        }
        pairs
    }
}

/// Joins category ids with commas.
#[must_use]
pub fn join_ids<'a>(ids: impl IntoIterator<Item = &'a CategoryId>) -> String {
    ids.into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Returns the last calendar day of `month` in `year`, or `None` if out of range.
#[must_use]
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month.checked_add(1)?, 1)?
    };
    let last = first_of_next.pred_opt()?;
    (last.month() == month).then_some(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_item_validation() {
        assert!(PeriodItem::quarterly(2024, 0).is_err());
        assert!(PeriodItem::quarterly(2024, 5).is_err());
        assert!(PeriodItem::monthly(2024, 13).is_err());
        assert!(PeriodItem::yearly(0).is_err());
        assert!(PeriodItem::yearly(10_000).is_err());
        assert!(PeriodItem::monthly(2024, 12).is_ok());
    }

    #[test]
    fn test_default_labels() {
        assert_eq!(PeriodItem::yearly(2024).unwrap().label(), "2024");
        assert_eq!(PeriodItem::quarterly(2024, 3).unwrap().label(), "Q3 2024");
        assert_eq!(PeriodItem::monthly(2023, 2).unwrap().label(), "Feb 2023");
        assert_eq!(
            PeriodItem::monthly(2023, 2).unwrap().with_label("Februar").label(),
            "Februar"
        );
    }

    #[test]
    fn test_period_item_deserialize() {
        let item: PeriodItem = serde_json::from_str(
            r#"{"granularity":"quarterly","year":2024,"quarter":2,"label":"Q2","orderCount":17}"#,
        )
        .unwrap();
        assert_eq!(item.key(), PeriodKey::Quarter { year: 2024, quarter: 2 });
        assert_eq!(item.label(), "Q2");
        assert_eq!(item.order_count(), Some(17));

        let defaulted: PeriodItem =
            serde_json::from_str(r#"{"granularity":"monthly","year":2024,"month":11}"#).unwrap();
        assert_eq!(defaulted.label(), "Nov 2024");
    }

    #[test]
    fn test_period_item_deserialize_rejects_mismatched_fields() {
        let missing_quarter =
            serde_json::from_str::<PeriodItem>(r#"{"granularity":"quarterly","year":2024}"#);
        assert!(missing_quarter.is_err());

        let stray_month = serde_json::from_str::<PeriodItem>(
            r#"{"granularity":"yearly","year":2024,"month":3}"#,
        );
        assert!(stray_month.is_err());

        let bad_quarter = serde_json::from_str::<PeriodItem>(
            r#"{"granularity":"quarterly","year":2024,"quarter":9}"#,
        );
        assert!(bad_quarter.is_err());
    }

    #[test]
    fn test_period_item_serialize_flat() {
        let item = PeriodItem::monthly(2024, 4).unwrap().with_order_count(3);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["granularity"], "monthly");
        assert_eq!(json["month"], 4);
        assert_eq!(json["orderCount"], 3);
        assert!(json.get("quarter").is_none());
    }

    #[test]
    fn test_catalog_from_items_groups_by_year() {
        let catalog = PeriodCatalog::from_items(vec![
            PeriodItem::yearly(2023).unwrap(),
            PeriodItem::quarterly(2023, 1).unwrap(),
            PeriodItem::monthly(2024, 5).unwrap(),
            PeriodItem::quarterly(2023, 1).unwrap().with_label("duplicate"),
        ]);

        assert_eq!(catalog.years().len(), 2);
        assert_eq!(catalog.years()[0].quarters().len(), 1);
        assert_eq!(catalog.years()[0].quarters()[0].label(), "Q1 2023");
        assert_eq!(catalog.years()[1].year().label(), "2024");
        assert_eq!(catalog.years()[1].months().len(), 1);
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.items(Granularity::Yearly).count(), 2);
        assert!(catalog.find(&PeriodKey::Month { year: 2024, month: 5 }).is_some());
        assert!(catalog.keys().contains(&PeriodKey::Year(2024)));
    }

    #[test]
    fn test_year_entry_rejects_foreign_children() {
        let result = YearEntry::new(
            PeriodItem::yearly(2023).unwrap(),
            vec![PeriodItem::quarterly(2024, 1).unwrap()],
            Vec::new(),
        );
        assert!(result.is_err());

        let result = YearEntry::new(
            PeriodItem::yearly(2023).unwrap(),
            vec![PeriodItem::monthly(2023, 1).unwrap()],
            Vec::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_category_catalog_dedups() {
        let catalog = CategoryCatalog::new(vec![
            CategoryItem::new(5, "Japan", "日本"),
            CategoryItem::new(7, "Korea", "한국"),
            CategoryItem::new(5, "Japan again", ""),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find(CategoryId::new(5)).unwrap().name_local, "Japan");
    }

    #[test]
    fn test_filter_query_pairs() {
        let range = DateInterval::new(date(2024, 1, 1), date(2024, 9, 30));
        let filter = ReportQueryFilter::new(range, [CategoryId::new(9), CategoryId::new(2)]);
        assert_eq!(
            filter.to_query_pairs(),
            vec![
                ("dateFrom", "2024-01-01".to_string()),
                ("dateTo", "2024-09-30".to_string()),
                ("countryIds", "2,9".to_string()),
            ]
        );
        assert_eq!(filter.date_range(), range);
    }

    #[test]
    fn test_empty_filter_is_unconstrained() {
        let filter = ReportQueryFilter::new(None, []);
        assert!(filter.is_unconstrained());
        assert!(filter.to_query_pairs().is_empty());
        assert_eq!(serde_json::to_string(&filter).unwrap(), "{}");
    }

    #[test]
    fn test_interval_helpers() {
        assert!(DateInterval::new(date(2024, 2, 1), date(2024, 1, 1)).is_none());
        let q1 = DateInterval::new(date(2024, 1, 1), date(2024, 3, 31)).unwrap();
        let jan = DateInterval::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(q1.contains(&jan));
        assert!(!jan.contains(&q1));
        assert_eq!(q1.days(), 91);
        assert!(q1.contains_date(date(2024, 2, 29)));
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2024, 2), Some(date(2024, 2, 29)));
        assert_eq!(last_day_of_month(2023, 2), Some(date(2023, 2, 28)));
        assert_eq!(last_day_of_month(1900, 2), Some(date(1900, 2, 28)));
        assert_eq!(last_day_of_month(2024, 12), Some(date(2024, 12, 31)));
        assert_eq!(last_day_of_month(2024, 13), None);
    }
}
