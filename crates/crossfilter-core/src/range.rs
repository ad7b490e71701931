//! Mapping of chosen periods to a report date range.
//!
//! [`resolve`] turns one period into its inclusive calendar interval and
//! [`resolve_union`] collapses a set of periods into a single bounding
//! interval. The bounding interval also covers unselected periods lying
//! between selected ones: Q1 and Q3 resolve to January through September.

use chrono::NaiveDate;

use crate::types::{DateInterval, PeriodItem, PeriodKey, last_day_of_month};

/// Resolves a period to its inclusive date interval.
///
/// # Panics
///
/// Panics if the item's key is out of range. [`PeriodItem`] validates its key
/// on construction, so this only fires on a broken invariant.
#[must_use]
pub fn resolve(item: &PeriodItem) -> DateInterval {
    let (year, first_month, last_month) = match item.key() {
        PeriodKey::Year(year) => (year, 1, 12),
        PeriodKey::Quarter { year, quarter } => {
            let quarter = u32::from(quarter);
            (year, (quarter - 1) * 3 + 1, quarter * 3)
        }
        PeriodKey::Month { year, month } => (year, u32::from(month), u32::from(month)),
    };

    let start = NaiveDate::from_ymd_opt(year, first_month, 1);
    let end = last_day_of_month(year, last_month);
    match (start, end) {
        (Some(start), Some(end)) => DateInterval::new(start, end)
            .unwrap_or_else(|| panic!("period {} resolved to a reversed interval", item.key())),
        _ => panic!("period {} escaped validation", item.key()),
    }
}

/// Resolves a set of periods to the smallest interval covering all of them.
///
/// Returns `None` for an empty set, meaning "no date constraint".
#[must_use]
pub fn resolve_union<'a>(items: impl IntoIterator<Item = &'a PeriodItem>) -> Option<DateInterval> {
    items
        .into_iter()
        .map(resolve)
        .reduce(|acc, interval| acc.bounding(&interval))
}
