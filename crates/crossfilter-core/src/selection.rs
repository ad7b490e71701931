//! Staged multi-value selection for one filter facet.
//!
//! A [`FacetSelection`] keeps two sets: the *pending* set that checkbox toggles
//! edit, and the *chosen* set that only changes on [`FacetSelection::confirm`],
//! [`FacetSelection::clear`], [`FacetSelection::prune`] or a granularity
//! switch. Only the chosen set feeds the report filter.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{FilterError, Result};
use crate::granularity::Granularity;
use crate::types::{CategoryId, CategoryItem, PeriodItem, PeriodKey};

/// Placeholder in count phrases that is replaced by the number of chosen items.
pub const COUNT_PLACEHOLDER: &str = "{count}";

/// Default count phrase used by [`FacetSelection::summary_label`].
pub const DEFAULT_COUNT_PHRASE: &str = "{count} items";

/// An item that can be chosen in a facet.
pub trait FacetItem: Clone + Debug {
    /// Identity key; two items with equal keys are the same selection.
    type Key: Clone + Debug + Eq + Ord + Hash;

    /// Returns the identity key.
    fn key(&self) -> Self::Key;

    /// Returns the text shown when this is the only chosen item.
    fn label(&self) -> &str;

    /// Returns the hierarchy level, for facets that have one.
    fn granularity(&self) -> Option<Granularity> {
        None
    }
}

impl FacetItem for PeriodItem {
    type Key = PeriodKey;

    fn key(&self) -> PeriodKey {
        Self::key(self)
    }

    fn label(&self) -> &str {
        Self::label(self)
    }

    fn granularity(&self) -> Option<Granularity> {
        Some(Self::granularity(self))
    }
}

impl FacetItem for CategoryItem {
    type Key = CategoryId;

    fn key(&self) -> CategoryId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name_local
    }
}

/// Selection state of one facet.
#[derive(Debug, Clone)]
pub struct FacetSelection<T: FacetItem> {
    active_granularity: Option<Granularity>,
    chosen: BTreeMap<T::Key, T>,
    pending: BTreeMap<T::Key, T>,
}

impl<T: FacetItem> Default for FacetSelection<T> {
    fn default() -> Self {
        Self {
            active_granularity: None,
            chosen: BTreeMap::new(),
            pending: BTreeMap::new(),
        }
    }
}

impl<T: FacetItem> FacetSelection<T> {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active granularity.
    #[must_use]
    pub const fn active_granularity(&self) -> Option<Granularity> {
        self.active_granularity
    }

    /// Switches the active granularity, clearing chosen and pending items.
    ///
    /// Returns false and changes nothing if `granularity` is already active.
    pub fn set_granularity(&mut self, granularity: Granularity) -> bool {
        if self.active_granularity == Some(granularity) {
            return false;
        }
        self.active_granularity = Some(granularity);
        self.chosen.clear();
        self.pending.clear();
        true
    }

    /// Checks or unchecks an item in the pending set.
    ///
    /// Returns whether the item is now checked. An item with a granularity is
    /// rejected if a different granularity is active; with none active, the
    /// item's granularity is adopted.
    pub fn toggle(&mut self, item: T) -> Result<bool> {
        self.accept_granularity(item.granularity())?;
        let key = item.key();
        if self.pending.remove(&key).is_some() {
            Ok(false)
        } else {
            self.pending.insert(key, item);
            Ok(true)
        }
    }

    /// Replaces the pending set.
    ///
    /// Fails without modifying anything if any item conflicts with the active
    /// granularity or with another item's granularity.
    pub fn stage(&mut self, items: impl IntoIterator<Item = T>) -> Result<()> {
        let items: Vec<T> = items.into_iter().collect();
        self.active_granularity = common_granularity(&items, self.active_granularity)?;
        self.pending = items.into_iter().map(|item| (item.key(), item)).collect();
        Ok(())
    }

    /// Replaces the pending set, switching to the items' granularity.
    ///
    /// If the items share a granularity other than the active one, the facet
    /// switches to it as [`set_granularity`](Self::set_granularity) does,
    /// dropping the chosen set. Items of mixed granularity are rejected
    /// without modifying anything.
    pub fn restage(&mut self, items: impl IntoIterator<Item = T>) -> Result<()> {
        let items: Vec<T> = items.into_iter().collect();
        if let Some(granularity) = common_granularity(&items, None)? {
            self.set_granularity(granularity);
        }
        self.pending = items.into_iter().map(|item| (item.key(), item)).collect();
        Ok(())
    }

    /// Commits the pending set as the chosen set and returns it.
    pub fn confirm(&mut self) -> Vec<T> {
        self.chosen = self.pending.clone();
        self.chosen.values().cloned().collect()
    }

    /// Empties both sets and resets the active granularity.
    pub fn clear(&mut self) {
        self.chosen.clear();
        self.pending.clear();
        self.active_granularity = None;
    }

    /// Drops chosen and pending items whose key is not in `valid_keys`.
    ///
    /// Returns true if the chosen set changed.
    pub fn prune(&mut self, valid_keys: &HashSet<T::Key>) -> bool {
        let before = self.chosen.len();
        self.chosen.retain(|key, _| valid_keys.contains(key));
        self.pending.retain(|key, _| valid_keys.contains(key));
        self.chosen.len() != before
    }

    /// Returns the chosen items in key order.
    pub fn chosen(&self) -> impl Iterator<Item = &T> {
        self.chosen.values()
    }

    /// Returns the keys of the chosen items.
    #[must_use]
    pub fn chosen_keys(&self) -> BTreeSet<T::Key> {
        self.chosen.keys().cloned().collect()
    }

    /// Returns the pending items in key order.
    pub fn pending(&self) -> impl Iterator<Item = &T> {
        self.pending.values()
    }

    /// Returns true if the item with `key` is checked in the pending set.
    #[must_use]
    pub fn is_staged(&self, key: &T::Key) -> bool {
        self.pending.contains_key(key)
    }

    /// Returns true if the item with `key` is chosen.
    #[must_use]
    pub fn is_chosen(&self, key: &T::Key) -> bool {
        self.chosen.contains_key(key)
    }

    /// Returns the number of chosen items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    /// Returns true if nothing is chosen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// Button text: `default_text`, the single item's label, or "N items".
    #[must_use]
    pub fn summary_label(&self, default_text: &str) -> String {
        self.summary_label_with(default_text, DEFAULT_COUNT_PHRASE)
    }

    /// Like [`summary_label`](Self::summary_label) with a localized count phrase.
    ///
    /// `{count}` in `count_phrase` is replaced by the number of chosen items.
    #[must_use]
    pub fn summary_label_with(&self, default_text: &str, count_phrase: &str) -> String {
        let mut chosen = self.chosen.values();
        match (chosen.next(), chosen.next()) {
            (None, _) => default_text.to_string(),
            (Some(only), None) => only.label().to_string(),
            (Some(_), Some(_)) => {
                count_phrase.replace(COUNT_PLACEHOLDER, &self.chosen.len().to_string())
            }
        }
    }

    fn accept_granularity(&mut self, granularity: Option<Granularity>) -> Result<()> {
        match (self.active_granularity, granularity) {
            (Some(active), Some(item)) if active != item => {
                Err(FilterError::GranularityMismatch { active, item })
            }
            (None, Some(item)) => {
                self.active_granularity = Some(item);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Returns the granularity shared by `items` and `start`, if any.
fn common_granularity<T: FacetItem>(
    items: &[T],
    start: Option<Granularity>,
) -> Result<Option<Granularity>> {
    let mut adopted = start;
    for granularity in items.iter().filter_map(|item| item.granularity()) {
        match adopted {
            Some(active) if active != granularity => {
                return Err(FilterError::GranularityMismatch {
                    active,
                    item: granularity,
                });
            }
            _ => adopted = Some(granularity),
        }
    }
    Ok(adopted)
}
