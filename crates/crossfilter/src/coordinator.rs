//! Period/category cross-filter coordinator.
//!
//! The coordinator owns the selection and catalog of both facets. Confirming
//! or clearing one facet re-fetches the other facet's catalog (narrowing),
//! drops chosen items the new catalog no longer contains (pruning) and hands
//! the combined [`ReportQueryFilter`] to a [`FilterListener`].
//!
//! Every catalog request takes a generation number from the facet whose
//! catalog it refreshes. A response is applied only if no newer request for
//! that catalog was issued in the meantime; older responses are discarded.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crossfilter_core::{
    CategoryCatalog, CategoryId, CategoryItem, CategoryScope, FacetItem, FacetSelection,
    FilterError, Granularity, PeriodCatalog, PeriodItem, PeriodKey, PeriodScope,
    ReportQueryFilter, Result, resolve_union,
};

use crate::config::CoordinatorConfig;
use crate::source::CatalogSource;

/// Receives the combined filter after every confirm or clear.
pub trait FilterListener: Send + Sync {
    /// Called once per transition, after the coordinator's state is settled.
    fn on_filter_change(&self, filter: &ReportQueryFilter);
}

impl<F> FilterListener for F
where
    F: Fn(&ReportQueryFilter) + Send + Sync,
{
    fn on_filter_change(&self, filter: &ReportQueryFilter) {
        self(filter)
    }
}

/// What happened to the other facet's catalog during a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrowingOutcome {
    /// The new catalog was applied; `pruned` is true if chosen items were dropped.
    Applied {
        /// Whether pruning removed any chosen item.
        pruned: bool,
    },
    /// A newer request for the same catalog was issued; this response was discarded.
    Superseded,
    /// The fetch failed; the previous catalog and selection were kept.
    Failed(FilterError),
    /// Narrowing is disabled for this facet; nothing was fetched.
    Skipped,
}

impl NarrowingOutcome {
    /// Returns true if the dependent facet's UI should re-render.
    #[must_use]
    pub const fn catalog_changed(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Result of a confirm or clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The filter handed to the listener.
    pub filter: ReportQueryFilter,
    /// What happened to the other facet's catalog.
    pub narrowing: NarrowingOutcome,
}

/// Result of [`CrossFilterCoordinator::load_initial`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialLoad {
    /// Outcome of the full period catalog fetch.
    pub periods: NarrowingOutcome,
    /// Outcome of the full category catalog fetch.
    pub categories: NarrowingOutcome,
}

/// Catalog types that can prune a selection.
trait FacetCatalog {
    type Key: Eq + Hash;

    fn keys(&self) -> HashSet<Self::Key>;

    fn len(&self) -> usize;
}

impl FacetCatalog for PeriodCatalog {
    type Key = PeriodKey;

    fn keys(&self) -> HashSet<PeriodKey> {
        Self::keys(self)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }
}

impl FacetCatalog for CategoryCatalog {
    type Key = CategoryId;

    fn keys(&self) -> HashSet<CategoryId> {
        Self::keys(self)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }
}

#[derive(Debug)]
struct Facet<T: FacetItem, C> {
    name: &'static str,
    selection: FacetSelection<T>,
    catalog: C,
    generation: u64,
}

impl<T, C> Facet<T, C>
where
    T: FacetItem,
    C: FacetCatalog<Key = T::Key> + Default,
{
    fn new(name: &'static str) -> Self {
        Self {
            name,
            selection: FacetSelection::new(),
            catalog: C::default(),
            generation: 0,
        }
    }

    /// Start a new catalog request, superseding any in flight.
    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Apply a catalog response if it belongs to the latest request.
    fn apply(&mut self, generation: u64, response: Result<C>) -> NarrowingOutcome {
        if generation != self.generation {
            debug!(
                facet = self.name,
                generation,
                current = self.generation,
                "Discarding superseded catalog response"
            );
            return NarrowingOutcome::Superseded;
        }

        match response {
            Ok(catalog) => {
                let before = self.selection.len();
                let pruned = self.selection.prune(&catalog.keys());
                debug!(
                    facet = self.name,
                    items = catalog.len(),
                    dropped = before - self.selection.len(),
                    "Replaced catalog"
                );
                self.catalog = catalog;
                NarrowingOutcome::Applied { pruned }
            }
            Err(e) => {
                warn!(
                    facet = self.name,
                    error = %e,
                    "Catalog fetch failed, keeping previous catalog"
                );
                NarrowingOutcome::Failed(e)
            }
        }
    }
}

#[derive(Debug)]
struct CoordinatorState {
    periods: Facet<PeriodItem, PeriodCatalog>,
    categories: Facet<CategoryItem, CategoryCatalog>,
}

impl CoordinatorState {
    fn new() -> Self {
        Self {
            periods: Facet::new("period"),
            categories: Facet::new("category"),
        }
    }

    fn filter(&self) -> ReportQueryFilter {
        ReportQueryFilter::new(
            resolve_union(self.periods.selection.chosen()),
            self.categories.selection.chosen().map(|item| item.id),
        )
    }

    /// Scope for narrowing the category catalog by the chosen periods.
    fn category_scope(&self) -> Option<CategoryScope> {
        resolve_union(self.periods.selection.chosen()).map(CategoryScope::from)
    }

    /// Scope for narrowing the period catalog by the chosen categories.
    fn period_scope(&self) -> Option<PeriodScope> {
        let ids = self.categories.selection.chosen_keys();
        (!ids.is_empty()).then(|| PeriodScope::new(ids))
    }
}

/// Coordinates the period and category facets of one report view.
///
/// All transition methods take `&self`; state lives behind a mutex that is
/// never held across a fetch, so a second transition may start while the
/// first one's fetch is still in flight.
pub struct CrossFilterCoordinator {
    source: CatalogSource,
    config: CoordinatorConfig,
    listener: Box<dyn FilterListener>,
    state: Mutex<CoordinatorState>,
}

impl std::fmt::Debug for CrossFilterCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossFilterCoordinator")
            .field("source", &self.source)
            .field("config", &self.config)
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}

impl CrossFilterCoordinator {
    /// Create a coordinator with empty catalogs and selections.
    ///
    /// Call [`load_initial`](Self::load_initial) to fetch the full catalogs.
    pub fn new(
        source: CatalogSource,
        config: CoordinatorConfig,
        listener: impl FilterListener + 'static,
    ) -> Self {
        Self {
            source,
            config,
            listener: Box::new(listener),
            state: Mutex::new(CoordinatorState::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the full period and category catalogs.
    ///
    /// Both fetches run concurrently. A failed fetch leaves that catalog empty.
    pub async fn load_initial(&self) -> InitialLoad {
        let (period_generation, category_generation) = {
            let mut state = self.state();
            (
                state.periods.next_generation(),
                state.categories.next_generation(),
            )
        };

        debug!("Loading full catalogs");
        let (periods, categories) = futures::join!(
            self.source.fetch_periods(None),
            self.source.fetch_categories(None)
        );

        let mut state = self.state();
        InitialLoad {
            periods: state.periods.apply(period_generation, periods),
            categories: state.categories.apply(category_generation, categories),
        }
    }

    /// Switch the period facet's granularity, clearing its chosen items.
    ///
    /// If periods were chosen, dropping them changes the report filter: the
    /// unscoped category catalog is fetched and the filter is emitted as for
    /// [`clear_period`](Self::clear_period). Returns `None` if `granularity`
    /// was already active or nothing was chosen.
    pub async fn set_period_granularity(&self, granularity: Granularity) -> Option<Transition> {
        let generation = {
            let mut state = self.state();
            let dropped = state.periods.selection.len();
            if !state.periods.selection.set_granularity(granularity) || dropped == 0 {
                return None;
            }
            debug!(%granularity, dropped, "Switched period granularity");
            state.categories.next_generation()
        };
        Some(self.narrow_categories(generation, None).await)
    }

    /// Check or uncheck a period in the pending selection.
    pub fn toggle_period(&self, item: PeriodItem) -> Result<bool> {
        self.state().periods.selection.toggle(item)
    }

    /// Check or uncheck a category in the pending selection.
    pub fn toggle_category(&self, item: CategoryItem) -> Result<bool> {
        self.state().categories.selection.toggle(item)
    }

    /// Commit the pending period selection and narrow the category catalog.
    ///
    /// With periods chosen, categories are re-fetched for their bounding date
    /// range; with none chosen, the unscoped category catalog is fetched.
    pub async fn confirm_period(&self) -> Transition {
        let (generation, scope) = {
            let mut state = self.state();
            let chosen = state.periods.selection.confirm();
            debug!(count = chosen.len(), "Confirmed period selection");
            (state.categories.next_generation(), state.category_scope())
        };
        self.narrow_categories(generation, scope).await
    }

    /// Replace the pending period selection with `items` and confirm it.
    ///
    /// The facet switches to the items' granularity if it differs from the
    /// active one. Items of mixed granularity are rejected without changing
    /// any state.
    pub async fn confirm_period_items(
        &self,
        items: impl IntoIterator<Item = PeriodItem>,
    ) -> Result<Transition> {
        self.state().periods.selection.restage(items)?;
        Ok(self.confirm_period().await)
    }

    /// Commit the pending category selection and narrow the period catalog.
    ///
    /// With categories chosen, periods are re-fetched for their ids; with none
    /// chosen, the unscoped period catalog is fetched.
    pub async fn confirm_category(&self) -> Transition {
        let (generation, scope) = {
            let mut state = self.state();
            let chosen = state.categories.selection.confirm();
            debug!(count = chosen.len(), "Confirmed category selection");
            (state.periods.next_generation(), state.period_scope())
        };
        self.narrow_periods(generation, scope).await
    }

    /// Replace the pending category selection with `items` and confirm it.
    pub async fn confirm_category_items(
        &self,
        items: impl IntoIterator<Item = CategoryItem>,
    ) -> Result<Transition> {
        self.state().categories.selection.stage(items)?;
        Ok(self.confirm_category().await)
    }

    /// Clear the period facet and restore the unscoped category catalog.
    pub async fn clear_period(&self) -> Transition {
        let generation = {
            let mut state = self.state();
            state.periods.selection.clear();
            debug!("Cleared period selection");
            state.categories.next_generation()
        };
        self.narrow_categories(generation, None).await
    }

    /// Clear the category facet and restore the unscoped period catalog.
    pub async fn clear_category(&self) -> Transition {
        let generation = {
            let mut state = self.state();
            state.categories.selection.clear();
            debug!("Cleared category selection");
            state.periods.next_generation()
        };
        self.narrow_periods(generation, None).await
    }

    async fn narrow_categories(&self, generation: u64, scope: Option<CategoryScope>) -> Transition {
        let narrowing = if self.config.narrow_categories {
            let response = self.source.fetch_categories(scope.as_ref()).await;
            self.state().categories.apply(generation, response)
        } else {
            NarrowingOutcome::Skipped
        };
        self.emit(narrowing)
    }

    async fn narrow_periods(&self, generation: u64, scope: Option<PeriodScope>) -> Transition {
        let narrowing = if self.config.narrow_periods {
            let response = self.source.fetch_periods(scope.as_ref()).await;
            self.state().periods.apply(generation, response)
        } else {
            NarrowingOutcome::Skipped
        };
        self.emit(narrowing)
    }

    /// Hand the current filter to the listener, outside the state lock.
    fn emit(&self, narrowing: NarrowingOutcome) -> Transition {
        let filter = self.state().filter();
        debug!(
            date_from = ?filter.date_from,
            date_to = ?filter.date_to,
            categories = filter.category_ids.as_ref().map_or(0, |ids| ids.len()),
            "Emitting report filter"
        );
        self.listener.on_filter_change(&filter);
        Transition { filter, narrowing }
    }

    /// Returns the filter for the current chosen sets.
    #[must_use]
    pub fn get_current_filter(&self) -> ReportQueryFilter {
        self.state().filter()
    }

    /// Button text for the period facet.
    #[must_use]
    pub fn period_facet_summary(&self) -> String {
        self.state()
            .periods
            .selection
            .summary_label_with(&self.config.period_placeholder, &self.config.count_phrase)
    }

    /// Button text for the category facet.
    #[must_use]
    pub fn category_facet_summary(&self) -> String {
        self.state()
            .categories
            .selection
            .summary_label_with(&self.config.category_placeholder, &self.config.count_phrase)
    }

    /// Returns the active period granularity.
    #[must_use]
    pub fn period_granularity(&self) -> Option<Granularity> {
        self.state().periods.selection.active_granularity()
    }

    /// Returns a snapshot of the current period catalog.
    #[must_use]
    pub fn period_catalog(&self) -> PeriodCatalog {
        self.state().periods.catalog.clone()
    }

    /// Returns a snapshot of the current category catalog.
    #[must_use]
    pub fn category_catalog(&self) -> CategoryCatalog {
        self.state().categories.catalog.clone()
    }

    /// Returns the chosen periods.
    #[must_use]
    pub fn chosen_periods(&self) -> Vec<PeriodItem> {
        self.state().periods.selection.chosen().cloned().collect()
    }

    /// Returns the chosen categories.
    #[must_use]
    pub fn chosen_categories(&self) -> Vec<CategoryItem> {
        self.state().categories.selection.chosen().cloned().collect()
    }

    /// Returns the coordinator's configuration.
    #[must_use]
    pub const fn config(&self) -> &CoordinatorConfig {
        &self.config
    }
}
