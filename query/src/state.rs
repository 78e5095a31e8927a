use jiff::Timestamp;

use crate::QueryError;

/// Distinguishes "not fetched yet" from "fetched", so that a fetched empty
/// value is not mistaken for a missing one.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    NotFetched,
    Fetched(T),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::NotFetched
    }
}

impl<T> FetchState<T> {
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Self::Fetched(value) => Some(value),
            Self::NotFetched => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Fetched(value) => Some(value),
            Self::NotFetched => None,
        }
    }
}

impl<T> From<Option<T>> for FetchState<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NotFetched, Self::Fetched)
    }
}

/// Lifecycle of one cache entry.
///
/// `Idle -> Loading -> Success | Error`, and back to `Loading` on every
/// refetch. Data from the last success stays available while loading and
/// after a failed refetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// A snapshot of a cache entry for rendering.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: FetchState<T>,
    pub error: Option<QueryError>,
    pub status: QueryStatus,
    /// Set by invalidation; the next read fetches again.
    pub is_stale: bool,
    pub updated_at: Option<Timestamp>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: FetchState::NotFetched,
            error: None,
            status: QueryStatus::Idle,
            is_stale: false,
            updated_at: None,
        }
    }
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    /// True if this is the initial load (data not yet fetched, currently
    /// loading, and no error).
    pub fn is_initial_loading(&self) -> bool {
        self.is_loading() && !self.data.is_fetched() && self.error.is_none()
    }

    /// True while a refetch runs with previous data still shown.
    pub fn is_refetching(&self) -> bool {
        self.is_loading() && self.data.is_fetched()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryState<U> {
        QueryState {
            data: self.data.into_option().map(f).into(),
            error: self.error,
            status: self.status,
            is_stale: self.is_stale,
            updated_at: self.updated_at,
        }
    }
}

/// Who is logged in through this client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    LoggedOut,
    LoggedIn { email: String },
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::LoggedIn { .. })
    }
}

/// Lifecycle of a mutation.
#[derive(Debug, Clone)]
pub enum MutationState<O> {
    Idle,
    Pending,
    Success(O),
    Error(QueryError),
}

impl<O> Default for MutationState<O> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<O> MutationState<O> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }
}
