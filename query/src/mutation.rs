use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{MutationState, QueryClient, QueryError, QueryFilter};

type Run<I, O> = Arc<
    dyn Fn(QueryClient, I) -> BoxFuture<'static, Result<O, QueryError>>
        + Send
        + Sync,
>;

type Invalidates<I, O> =
    Arc<dyn Fn(&QueryClient, &I, &O) -> Vec<QueryFilter> + Send + Sync>;

/// A create, update or delete action.
///
/// On success every cache entry selected by the invalidation filters is
/// marked stale. On failure the cache is left untouched and the error is
/// returned to the caller.
pub struct Mutation<I, O> {
    client: QueryClient,
    run: Run<I, O>,
    invalidates: Invalidates<I, O>,
    state: Arc<Mutex<MutationState<O>>>,
}

impl<I, O> Clone for Mutation<I, O> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            run: self.run.clone(),
            invalidates: self.invalidates.clone(),
            state: self.state.clone(),
        }
    }
}

impl<I, O> Mutation<I, O>
where
    I: Clone + Send + 'static,
    O: Clone + Send + 'static,
{
    /// `invalidates` is evaluated after a successful run but before any
    /// entry is invalidated, so it can still read cached data.
    pub fn new<F, Fut, V>(client: &QueryClient, run: F, invalidates: V) -> Self
    where
        F: Fn(QueryClient, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, QueryError>> + Send + 'static,
        V: Fn(&QueryClient, &I, &O) -> Vec<QueryFilter> + Send + Sync + 'static,
    {
        Self {
            client: client.clone(),
            run: Arc::new(move |client, input| run(client, input).boxed()),
            invalidates: Arc::new(invalidates),
            state: Arc::default(),
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn mutate(&self, input: I) -> Result<O, QueryError> {
        self.set_state(MutationState::Pending);
        match (self.run)(self.client.clone(), input.clone()).await {
            Ok(output) => {
                for filter in (self.invalidates)(&self.client, &input, &output)
                {
                    self.client.invalidate_queries(&filter);
                }
                self.set_state(MutationState::Success(output.clone()));
                Ok(output)
            }
            Err(e) => {
                tracing::debug!(error = %e, "mutation failed");
                self.set_state(MutationState::Error(e.clone()));
                Err(e)
            }
        }
    }

    pub fn state(&self) -> MutationState<O> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Return to `Idle`, e.g. after the toast for an error was dismissed.
    pub fn reset(&self) {
        self.set_state(MutationState::Idle);
    }

    fn set_state(&self, state: MutationState<O>) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}
