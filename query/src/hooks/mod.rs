//! Per-resource query and mutation handles.
//!
//! Each `use_*` function builds a cheap handle over a shared
//! [`QueryClient`]; building a handle never issues a request. A UI layer
//! calls `fetch` when a screen appears and renders from `state`, or spawns
//! the query and drops the task when the screen goes away.

mod use_auth;
mod use_bookings;
mod use_cars;
mod use_flats;
mod use_rentals;

pub use use_auth::{use_login, use_logout, use_register};
pub use use_bookings::{
    use_active_bookings, use_booking_for_flat, use_create_booking,
    use_delete_booking,
};
pub use use_cars::{
    use_car, use_cars, use_cities, use_infinite_cars, use_locations,
};
pub use use_flats::{use_flat, use_flats, use_infinite_flats, use_update_flat};
pub use use_rentals::{
    use_cancel_rental, use_infinite_rentals, use_rent_car, use_rental,
    use_rentals,
};

use futures::future::{BoxFuture, FutureExt};
use payloads::{ClientError, Lookup, QueryParams};
use std::future::Future;
use std::sync::Arc;

use crate::{QueryClient, QueryError, QueryKey, QueryState, QueryTask};

type Fetcher<T> =
    Arc<dyn Fn() -> BoxFuture<'static, Result<T, QueryError>> + Send + Sync>;

/// Handle to one cached query.
///
/// A query without a key is disabled: it never fetches and its state stays
/// `Idle`. Entity queries are disabled when their id is absent.
pub struct Query<T> {
    client: QueryClient,
    key: Option<QueryKey>,
    fetcher: Fetcher<T>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            key: self.key.clone(),
            fetcher: self.fetcher.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Query<T> {
    pub(crate) fn new<F, Fut>(
        client: &QueryClient,
        key: QueryKey,
        fetcher: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        Self {
            client: client.clone(),
            key: Some(key),
            fetcher: Arc::new(move || fetcher().boxed()),
        }
    }

    pub(crate) fn disabled(client: &QueryClient) -> Self {
        Self {
            client: client.clone(),
            key: None,
            fetcher: Arc::new(|| async { Err(QueryError::Disabled) }.boxed()),
        }
    }

    pub fn key(&self) -> Option<&QueryKey> {
        self.key.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Cached data if fresh, otherwise the result of one shared request.
    pub async fn fetch(&self) -> Result<T, QueryError> {
        let key = self.key.clone().ok_or(QueryError::Disabled)?;
        let fetcher = self.fetcher.clone();
        self.client.fetch_query(key, move || fetcher()).await
    }

    pub async fn refetch(&self) -> Result<T, QueryError> {
        let key = self.key.clone().ok_or(QueryError::Disabled)?;
        let fetcher = self.fetcher.clone();
        self.client.refetch_query(key, move || fetcher()).await
    }

    /// Run the fetch as a task. Returns `None` for a disabled query.
    pub fn spawn(&self) -> Option<QueryTask<T>> {
        let key = self.key.clone()?;
        let fetcher = self.fetcher.clone();
        Some(self.client.spawn_query(key, move || fetcher()))
    }

    pub fn state(&self) -> QueryState<T> {
        match &self.key {
            Some(key) => self.client.query_state(key),
            None => QueryState::default(),
        }
    }

    pub fn data(&self) -> Option<T> {
        self.state().data.into_option()
    }
}

/// Page size as the only parameter of an infinite sequence's key.
struct PageSize(u32);

impl QueryParams for PageSize {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![("size", self.0.to_string())]
    }
}

/// Map a 404 to [`Lookup::NotFound`].
fn lookup<T>(result: Result<T, ClientError>) -> Result<Lookup<T>, QueryError> {
    match result {
        Ok(value) => Ok(Lookup::Found(value)),
        Err(e) if e.is_not_found() => Ok(Lookup::NotFound),
        Err(e) => Err(e.into()),
    }
}

fn invalid_input(message: impl Into<String>) -> QueryError {
    QueryError::InvalidInput(message.into())
}
