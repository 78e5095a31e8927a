//! The shared response cache.
//!
//! Entries are keyed by [`QueryKey`] and hold type-erased values. Each entry
//! has at most one request in flight; callers asking for the same key while
//! it runs join that request instead of starting another. Every request is
//! tagged with a generation drawn from one counter for the whole cache, and
//! a response is only stored if its entry still carries that generation
//! when it arrives. Invalidation, cancellation and removal detach the
//! generation, and generations are never reused, so late responses are
//! discarded deterministically even after an entry is removed and fetched
//! again.

use futures::future::{AbortHandle, Abortable, BoxFuture, FutureExt, Shared};
use jiff::Timestamp;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

use crate::{QueryError, QueryFilter, QueryKey, QueryState, QueryStatus};

pub(crate) type Erased = Arc<dyn Any + Send + Sync>;

/// Computes the new value of an entry from its current value once a
/// response arrives. Plain queries ignore the current value; infinite
/// queries append to it.
pub(crate) type Update =
    Box<dyn FnOnce(Option<&Erased>) -> Result<Erased, QueryError> + Send>;

pub(crate) type SharedFetch =
    Shared<BoxFuture<'static, Result<Erased, QueryError>>>;

const EVENT_CAPACITY: usize = 256;

/// Notification that an entry changed, for re-rendering observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    pub key: QueryKey,
    pub kind: CacheEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEventKind {
    Fetching,
    Updated,
    Invalidated,
    Removed,
}

struct InFlight {
    task: SharedFetch,
    abort: AbortHandle,
}

#[derive(Default)]
pub(crate) struct Entry {
    data: Option<Erased>,
    error: Option<QueryError>,
    status: QueryStatus,
    is_stale: bool,
    updated_at: Option<Timestamp>,
    /// Generation of the request in flight; 0 when there is none.
    generation: u64,
    in_flight: Option<InFlight>,
}

impl Entry {
    /// Data that can be served without a request.
    pub(crate) fn fresh_data(&self) -> Option<&Erased> {
        if self.is_stale || self.error.is_some() {
            return None;
        }
        self.data.as_ref()
    }

    pub(crate) fn data(&self) -> Option<&Erased> {
        self.data.as_ref()
    }

    pub(crate) fn in_flight_task(&self) -> Option<SharedFetch> {
        self.in_flight.as_ref().map(|f| f.task.clone())
    }

    pub(crate) fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub(crate) fn is_stale(&self) -> bool {
        self.is_stale
    }

    fn settled_status(&self) -> QueryStatus {
        if self.error.is_some() {
            QueryStatus::Error
        } else if self.data.is_some() {
            QueryStatus::Success
        } else {
            QueryStatus::Idle
        }
    }

    /// Forget the in-flight request so that its response is discarded.
    fn detach(&mut self) -> Option<InFlight> {
        let in_flight = self.in_flight.take()?;
        self.generation = 0;
        self.status = self.settled_status();
        Some(in_flight)
    }

    fn snapshot<T: Clone + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let (data, error) = match self.data.as_ref().map(|v| downcast(key, v))
        {
            None => (None, self.error.clone()),
            Some(Ok(data)) => (Some(data), self.error.clone()),
            Some(Err(e)) => (None, Some(e)),
        };
        QueryState {
            data: data.into(),
            error,
            status: self.status,
            is_stale: self.is_stale,
            updated_at: self.updated_at,
        }
    }
}

pub(crate) fn downcast<T: Clone + 'static>(
    key: &QueryKey,
    value: &Erased,
) -> Result<T, QueryError> {
    (**value)
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| QueryError::TypeMismatch(key.to_string()))
}

pub(crate) struct Cache {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    /// Last generation handed out. Starts at 0, so 0 is never a request's.
    generation: AtomicU64,
    events: broadcast::Sender<CacheEvent>,
}

impl Cache {
    pub(crate) fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            entries: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            events,
        })
    }

    /// Never held across an await point.
    pub(crate) fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    fn notify(&self, key: &QueryKey, kind: CacheEventKind) {
        // no receivers is fine
        let _ = self.events.send(CacheEvent {
            key: key.clone(),
            kind,
        });
    }

    /// Start a request for an entry and return the task every caller
    /// should await.
    ///
    /// The request is spawned on the current tokio runtime when there is
    /// one, so it completes and lands in the cache even if every caller
    /// goes away.
    pub(crate) fn begin_fetch(
        self: &Arc<Self>,
        entry: &mut Entry,
        key: &QueryKey,
        request: BoxFuture<'static, Result<Update, QueryError>>,
    ) -> SharedFetch {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        entry.generation = generation;
        entry.status = QueryStatus::Loading;

        let cache = Arc::downgrade(self);
        let settle_key = key.clone();
        let (abort, registration) = AbortHandle::new_pair();
        let task = Abortable::new(
            async move {
                let update = request.await;
                match cache.upgrade() {
                    Some(cache) => {
                        cache.settle(&settle_key, generation, update)
                    }
                    None => Err(QueryError::Cancelled),
                }
            },
            registration,
        )
        .map(|result| result.unwrap_or(Err(QueryError::Cancelled)))
        .boxed()
        .shared();

        entry.in_flight = Some(InFlight {
            task: task.clone(),
            abort,
        });
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(task.clone());
        }
        tracing::debug!(%key, generation, "fetching");
        self.notify(key, CacheEventKind::Fetching);
        task
    }

    fn settle(
        &self,
        key: &QueryKey,
        generation: u64,
        update: Result<Update, QueryError>,
    ) -> Result<Erased, QueryError> {
        let mut entries = self.lock();
        let Some(entry) = entries
            .get_mut(key)
            .filter(|entry| entry.generation == generation)
        else {
            tracing::debug!(%key, generation, "discarding superseded response");
            // the callers that awaited this request still get its result
            return update.and_then(|update| update(None));
        };

        entry.in_flight = None;
        let result = update.and_then(|update| update(entry.data.as_ref()));
        match &result {
            Ok(value) => {
                entry.data = Some(value.clone());
                entry.error = None;
                entry.status = QueryStatus::Success;
                entry.is_stale = false;
                entry.updated_at = Some(Timestamp::now());
            }
            Err(e) => {
                tracing::debug!(%key, error = %e, "request failed");
                entry.error = Some(e.clone());
                entry.status = QueryStatus::Error;
            }
        }
        drop(entries);
        self.notify(key, CacheEventKind::Updated);
        result
    }

    pub(crate) fn snapshot<T: Clone + 'static>(
        &self,
        key: &QueryKey,
    ) -> QueryState<T> {
        self.lock()
            .get(key)
            .map(|entry| entry.snapshot(key))
            .unwrap_or_default()
    }

    pub(crate) fn set_data(&self, key: &QueryKey, value: Erased) {
        let mut entries = self.lock();
        let entry = entries.entry(key.clone()).or_default();
        entry.detach();
        entry.data = Some(value);
        entry.error = None;
        entry.status = QueryStatus::Success;
        entry.is_stale = false;
        entry.updated_at = Some(Timestamp::now());
        drop(entries);
        self.notify(key, CacheEventKind::Updated);
    }

    /// Mark matching entries stale. Responses to requests already in flight
    /// are discarded, since they may predate the change that caused the
    /// invalidation.
    pub(crate) fn invalidate(&self, filter: &QueryFilter) -> Vec<QueryKey> {
        let mut invalidated = Vec::new();
        let mut entries = self.lock();
        for (key, entry) in
            entries.iter_mut().filter(|(key, _)| filter.matches(key))
        {
            entry.is_stale = true;
            entry.detach();
            invalidated.push(key.clone());
        }
        drop(entries);
        for key in &invalidated {
            tracing::debug!(%key, "invalidated");
            self.notify(key, CacheEventKind::Invalidated);
        }
        invalidated
    }

    /// Abort in-flight requests of matching entries. Entries fall back to
    /// their last settled state.
    pub(crate) fn cancel(&self, filter: &QueryFilter) -> Vec<QueryKey> {
        let mut cancelled = Vec::new();
        let mut entries = self.lock();
        for (key, entry) in
            entries.iter_mut().filter(|(key, _)| filter.matches(key))
        {
            if let Some(in_flight) = entry.detach() {
                in_flight.abort.abort();
                cancelled.push(key.clone());
            }
        }
        drop(entries);
        for key in &cancelled {
            tracing::debug!(%key, "cancelled");
            self.notify(key, CacheEventKind::Updated);
        }
        cancelled
    }

    pub(crate) fn remove(&self, filter: &QueryFilter) -> Vec<QueryKey> {
        let mut removed = Vec::new();
        let mut entries = self.lock();
        entries.retain(|key, entry| {
            if !filter.matches(key) {
                return true;
            }
            if let Some(in_flight) = entry.detach() {
                in_flight.abort.abort();
            }
            removed.push(key.clone());
            false
        });
        drop(entries);
        for key in &removed {
            self.notify(key, CacheEventKind::Removed);
        }
        removed
    }
}
