//! Incremental ("infinite") pagination on top of the cache.
//!
//! The pages fetched so far for one key are stored together as a single
//! [`InfiniteData`] entry. Filters and page size are part of the key, so a
//! different filter is a different sequence starting at page 0, while the
//! pages of the previous filter stay cached under their own key.

use futures::future::{BoxFuture, FutureExt};
use payloads::{Lookup, Page, PageMeta, PageRequest};
use std::future::Future;
use std::sync::Arc;

use crate::cache::{Erased, Update};
use crate::{QueryClient, QueryError, QueryKey, QueryState};

/// The pages of an infinite query, in the order they were fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct InfiniteData<T> {
    pub pages: Vec<Page<T>>,
    pub page_size: u32,
}

impl<T> InfiniteData<T> {
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.content.iter())
    }

    pub fn last_page(&self) -> Option<&PageMeta> {
        self.pages.last().map(|page| &page.page)
    }

    pub fn has_next_page(&self) -> bool {
        self.last_page().is_some_and(PageMeta::has_next)
    }

    pub fn total_elements(&self) -> u64 {
        self.last_page().map_or(0, |meta| meta.total_elements)
    }

    /// The first loaded item matching the predicate.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Lookup<&T> {
        self.items().find(|item| predicate(item)).into()
    }

    fn next_request(&self) -> Option<PageRequest> {
        let page = self.last_page()?.next_page()?;
        Some(PageRequest {
            page,
            size: self.page_size,
        })
    }

    fn push(&mut self, page: Page<T>) {
        let expected = self.last_page().map_or(0, |meta| meta.number + 1);
        if page.page.number == expected {
            self.pages.push(page);
        } else {
            tracing::warn!(
                expected,
                received = page.page.number,
                "dropping out of order page"
            );
        }
    }
}

/// Outcome of [`InfiniteQuery::fetch_next_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchNext {
    Fetched,
    /// The last fetched page was the final one; nothing was requested.
    NoMorePages,
    /// A request for this query is already running; nothing was requested.
    AlreadyFetching,
}

type PageFetcher<T> = Arc<
    dyn Fn(PageRequest) -> BoxFuture<'static, Result<Page<T>, QueryError>>
        + Send
        + Sync,
>;

/// Handle to one paginated sequence.
pub struct InfiniteQuery<T> {
    client: QueryClient,
    key: QueryKey,
    page_size: u32,
    fetch_page: PageFetcher<T>,
}

impl<T> Clone for InfiniteQuery<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            key: self.key.clone(),
            page_size: self.page_size,
            fetch_page: self.fetch_page.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> InfiniteQuery<T> {
    pub fn new<F, Fut>(
        client: &QueryClient,
        key: QueryKey,
        page_size: u32,
        fetch_page: F,
    ) -> Self
    where
        F: Fn(PageRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Page<T>, QueryError>> + Send + 'static,
    {
        Self {
            client: client.clone(),
            key,
            page_size: page_size.max(1),
            fetch_page: Arc::new(move |request| fetch_page(request).boxed()),
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Load the first page, or return the cached sequence if it is fresh.
    pub async fn fetch(&self) -> Result<InfiniteData<T>, QueryError> {
        let fetch_page = self.fetch_page.clone();
        let page_size = self.page_size;
        self.client
            .fetch_query(self.key.clone(), move || {
                first_page(fetch_page, page_size)
            })
            .await
    }

    /// Restart the sequence from page 0.
    pub async fn refetch(&self) -> Result<InfiniteData<T>, QueryError> {
        let fetch_page = self.fetch_page.clone();
        let page_size = self.page_size;
        self.client
            .refetch_query(self.key.clone(), move || {
                first_page(fetch_page, page_size)
            })
            .await
    }

    /// Request the page after the last fetched one and append it.
    ///
    /// Does nothing if the last page was the final one or if a request for
    /// this key is already running. With nothing fetched yet, or after the
    /// sequence was invalidated, this loads page 0 instead.
    #[tracing::instrument(skip(self), fields(key = %self.key))]
    pub async fn fetch_next_page(&self) -> Result<FetchNext, QueryError> {
        let task = {
            let mut entries = self.client.cache().lock();
            let entry = entries.entry(self.key.clone()).or_default();
            if entry.is_fetching() {
                tracing::debug!(key = %self.key, "next page already in flight");
                return Ok(FetchNext::AlreadyFetching);
            }
            match entry.data().filter(|_| !entry.is_stale()) {
                None => None,
                Some(value) => {
                    let data = (**value)
                        .downcast_ref::<InfiniteData<T>>()
                        .ok_or_else(|| {
                            QueryError::TypeMismatch(self.key.to_string())
                        })?;
                    let Some(request) = data.next_request() else {
                        return Ok(FetchNext::NoMorePages);
                    };
                    let append = self.append_page(request);
                    Some(self.client.cache().begin_fetch(
                        entry,
                        &self.key,
                        append,
                    ))
                }
            }
        };
        match task {
            Some(task) => {
                task.await?;
            }
            None => {
                self.fetch().await?;
            }
        }
        Ok(FetchNext::Fetched)
    }

    pub fn state(&self) -> QueryState<InfiniteData<T>> {
        self.client.query_state(&self.key)
    }

    pub fn data(&self) -> Option<InfiniteData<T>> {
        self.client.get_query_data(&self.key)
    }

    /// Every loaded item across all pages.
    pub fn items(&self) -> Vec<T> {
        self.data()
            .map(|data| data.items().cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_next_page(&self) -> bool {
        self.data().is_some_and(|data| data.has_next_page())
    }

    fn append_page(
        &self,
        request: PageRequest,
    ) -> BoxFuture<'static, Result<Update, QueryError>> {
        let fetch_page = self.fetch_page.clone();
        async move {
            let page = fetch_page(request).await?;
            let update: Update = Box::new(move |current: Option<&Erased>| {
                let mut data = current
                    .and_then(|value| {
                        (**value).downcast_ref::<InfiniteData<T>>()
                    })
                    .cloned()
                    // the sequence was dropped while the page was loading
                    .ok_or(QueryError::Cancelled)?;
                data.push(page);
                Ok(Arc::new(data) as Erased)
            });
            Ok(update)
        }
        .boxed()
    }
}

async fn first_page<T>(
    fetch_page: PageFetcher<T>,
    page_size: u32,
) -> Result<InfiniteData<T>, QueryError> {
    let page = fetch_page(PageRequest::first(page_size)).await?;
    Ok(InfiniteData {
        pages: vec![page],
        page_size,
    })
}
