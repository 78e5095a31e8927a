use futures::FutureExt;
use payloads::{APIClient, Session};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::cache::{Cache, CacheEvent, Erased, Update, downcast};
use crate::{
    AuthState, Config, PageSizes, QueryError, QueryFilter, QueryKey,
    QueryState,
};

/// Entry point of the query layer: the API client plus the response cache
/// shared by every hook built from it.
///
/// Cloning is cheap and clones share the cache.
#[derive(Clone)]
pub struct QueryClient {
    api: APIClient,
    cache: Arc<Cache>,
    page_sizes: PageSizes,
    auth: Arc<Mutex<AuthState>>,
}

impl QueryClient {
    pub fn new(api: APIClient) -> Self {
        Self {
            api,
            cache: Cache::new(),
            page_sizes: PageSizes::default(),
            auth: Arc::default(),
        }
    }

    pub fn from_config(config: &Config, session: Session) -> Self {
        Self::new(APIClient::new(config.api_url.clone(), session))
            .with_page_sizes(config.page_sizes)
    }

    pub fn with_page_sizes(mut self, page_sizes: PageSizes) -> Self {
        self.page_sizes = page_sizes;
        self
    }

    pub fn api(&self) -> &APIClient {
        &self.api
    }

    pub fn page_sizes(&self) -> PageSizes {
        self.page_sizes
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Email of the logged in customer.
    pub fn current_email(&self) -> Option<String> {
        match self.auth_state() {
            AuthState::LoggedIn { email } => Some(email),
            AuthState::LoggedOut => None,
        }
    }

    pub(crate) fn set_auth_state(&self, state: AuthState) {
        *self.auth.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Return the cached value for the key, or fetch it.
    ///
    /// Fresh cached data is returned without a request. If a request for
    /// the key is already in flight it is joined, so concurrent callers
    /// share one request and receive the same result. `fetcher` is only
    /// called when a new request is needed.
    #[tracing::instrument(skip_all, fields(key = %key))]
    pub async fn fetch_query<T, F, Fut>(
        &self,
        key: QueryKey,
        fetcher: F,
    ) -> Result<T, QueryError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        let task = {
            let mut entries = self.cache.lock();
            let entry = entries.entry(key.clone()).or_default();
            if let Some(value) = entry.fresh_data() {
                tracing::trace!(%key, "cache hit");
                return downcast(&key, value);
            }
            match entry.in_flight_task() {
                Some(task) => task,
                None => {
                    self.cache.begin_fetch(entry, &key, replace_with(fetcher))
                }
            }
        };
        downcast(&key, &task.await?)
    }

    /// Fetch the key again even if cached data is fresh. Previous data stays
    /// visible while the request runs. Joins a request already in flight.
    #[tracing::instrument(skip_all, fields(key = %key))]
    pub async fn refetch_query<T, F, Fut>(
        &self,
        key: QueryKey,
        fetcher: F,
    ) -> Result<T, QueryError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        let task = {
            let mut entries = self.cache.lock();
            let entry = entries.entry(key.clone()).or_default();
            match entry.in_flight_task() {
                Some(task) => task,
                None => {
                    self.cache.begin_fetch(entry, &key, replace_with(fetcher))
                }
            }
        };
        downcast(&key, &task.await?)
    }

    /// Run [`fetch_query`](Self::fetch_query) as its own task.
    ///
    /// Aborting or dropping the returned handle cancels only this observer:
    /// the shared request still completes and updates the cache for
    /// everyone else.
    pub fn spawn_query<T, F, Fut>(
        &self,
        key: QueryKey,
        fetcher: F,
    ) -> QueryTask<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        let client = self.clone();
        QueryTask {
            key: key.clone(),
            handle: Some(tokio::spawn(async move {
                client.fetch_query(key, fetcher).await
            })),
        }
    }

    pub fn query_state<T: Clone + 'static>(
        &self,
        key: &QueryKey,
    ) -> QueryState<T> {
        self.cache.snapshot(key)
    }

    pub fn get_query_data<T: Clone + 'static>(
        &self,
        key: &QueryKey,
    ) -> Option<T> {
        self.query_state(key).data.into_option()
    }

    /// Store a value directly, e.g. an entity returned by a mutation.
    pub fn set_query_data<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
        value: T,
    ) {
        self.cache.set_data(key, Arc::new(value));
    }

    /// Keys currently cached whose resource matches the filter, for lookups
    /// across every cached parameter set.
    pub fn cached_keys(&self, filter: &QueryFilter) -> Vec<QueryKey> {
        self.cache
            .lock()
            .keys()
            .filter(|key| filter.matches(key))
            .cloned()
            .collect()
    }

    /// Mark matching entries stale so that the next read fetches again.
    pub fn invalidate_queries(&self, filter: &QueryFilter) -> Vec<QueryKey> {
        self.cache.invalidate(filter)
    }

    /// Abort in-flight requests of matching entries.
    pub fn cancel_queries(&self, filter: &QueryFilter) -> Vec<QueryKey> {
        self.cache.cancel(filter)
    }

    pub fn remove_queries(&self, filter: &QueryFilter) -> Vec<QueryKey> {
        self.cache.remove(filter)
    }

    /// Receive a [`CacheEvent`] whenever an entry changes.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.cache.subscribe()
    }

    pub(crate) fn cache(&self) -> &Arc<Cache> {
        &self.cache
    }
}

/// Turn a value fetcher into a cache update that replaces the entry.
pub(crate) fn replace_with<T, F, Fut>(
    fetcher: F,
) -> futures::future::BoxFuture<'static, Result<Update, QueryError>>
where
    T: Send + Sync + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
{
    async move {
        let value = fetcher().await?;
        let update: Update =
            Box::new(move |_: Option<&Erased>| Ok(Arc::new(value) as Erased));
        Ok(update)
    }
    .boxed()
}

/// Handle to a query running as its own task.
pub struct QueryTask<T> {
    key: QueryKey,
    handle: Option<JoinHandle<Result<T, QueryError>>>,
}

impl<T> QueryTask<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Stop waiting for the result. The cache still receives it.
    pub fn abort(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the result. Returns [`QueryError::Cancelled`] if the task
    /// was aborted.
    pub async fn join(mut self) -> Result<T, QueryError> {
        let Some(handle) = self.handle.take() else {
            return Err(QueryError::Cancelled);
        };
        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(QueryError::Cancelled),
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}

impl<T> Drop for QueryTask<T> {
    fn drop(&mut self) {
        // teardown of the observer, e.g. an unmounted screen
        self.abort();
    }
}
