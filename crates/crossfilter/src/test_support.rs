//! Scripted in-process catalog providers for tests.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::Mutex;

use async_trait::async_trait;
use crossfilter_core::{
    CatalogProvider, CategoryCatalog, CategoryCatalogProvider, CategoryScope, FilterError,
    PeriodCatalog, PeriodCatalogProvider, PeriodScope, Result,
};
use tokio::sync::oneshot;

/// Ties a catalog type to the scope it is fetched with.
pub(crate) trait Scoped: Clone + Debug + Send + Sync + 'static {
    type Scope: Clone + Debug + PartialEq + Send + Sync + 'static;
}

impl Scoped for PeriodCatalog {
    type Scope = PeriodScope;
}

impl Scoped for CategoryCatalog {
    type Scope = CategoryScope;
}

#[derive(Debug)]
enum Response<C> {
    Ready(Result<C>),
    Gated(oneshot::Receiver<Result<C>>),
}

/// Provider answering from a queue of scripted responses.
///
/// Once the queue is empty every request gets the fallback catalog.
#[derive(Debug)]
pub(crate) struct ScriptedProvider<C: Scoped> {
    fallback: C,
    responses: Mutex<VecDeque<Response<C>>>,
    requests: Mutex<Vec<Option<C::Scope>>>,
}

impl<C: Scoped> ScriptedProvider<C> {
    pub(crate) fn new(fallback: C) -> Self {
        Self {
            fallback,
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response that is returned immediately.
    pub(crate) fn push_ready(&self, response: Result<C>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Response::Ready(response));
    }

    /// Queue a response that is held until the returned sender fires.
    pub(crate) fn push_gated(&self) -> oneshot::Sender<Result<C>> {
        let (tx, rx) = oneshot::channel();
        self.responses.lock().unwrap().push_back(Response::Gated(rx));
        tx
    }

    /// Scopes of all requests so far, in order.
    pub(crate) fn requests(&self) -> Vec<Option<C::Scope>> {
        self.requests.lock().unwrap().clone()
    }

    async fn respond(&self, scope: Option<&C::Scope>) -> Result<C> {
        self.requests.lock().unwrap().push(scope.cloned());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            None => Ok(self.fallback.clone()),
            Some(Response::Ready(response)) => response,
            Some(Response::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(FilterError::Network("gate dropped".to_string()))),
        }
    }
}

impl<C: Scoped> CatalogProvider for ScriptedProvider<C> {
    fn name(&self) -> &str {
        "scripted"
    }

    fn description(&self) -> &str {
        "Scripted provider for tests"
    }
}

#[async_trait]
impl PeriodCatalogProvider for ScriptedProvider<PeriodCatalog> {
    async fn fetch_period_catalog(&self, scope: Option<&PeriodScope>) -> Result<PeriodCatalog> {
        self.respond(scope).await
    }
}

#[async_trait]
impl CategoryCatalogProvider for ScriptedProvider<CategoryCatalog> {
    async fn fetch_category_catalog(
        &self,
        scope: Option<&CategoryScope>,
    ) -> Result<CategoryCatalog> {
        self.respond(scope).await
    }
}
