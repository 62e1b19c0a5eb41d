//! Cursor-driven incremental list loading.
//!
//! An [`IncrementalList`] owns a cursor and the items accumulated so far.
//! [`IncrementalList::fetch_more`] may be called as often as the consumer
//! likes (typically whenever the end of the rendered list comes into view);
//! at most one page request is in flight at a time and nothing is requested
//! once the cursor is exhausted.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Cursor for the following page; `None` when there are no more.
    pub next: Option<String>,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    /// Empty terminal page. Fetchers return this when a request fails so
    /// that pagination stops instead of retrying.
    pub fn exhausted() -> Self {
        Self {
            next: None,
            data: Vec::new(),
        }
    }
}

/// Loads the page starting at a cursor.
///
/// Implementations handle their own failures and degrade to
/// [`Page::exhausted`].
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch_page(&self, cursor: String) -> Page<T>;
}

/// [`PageFetcher`] backed by an async closure.
pub struct FnPageFetcher<F>(F);

/// Wrap an async closure as a [`PageFetcher`].
pub fn page_fn<F>(f: F) -> FnPageFetcher<F> {
    FnPageFetcher(f)
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for FnPageFetcher<F>
where
    T: Send + 'static,
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Page<T>> + Send,
{
    async fn fetch_page(&self, cursor: String) -> Page<T> {
        (self.0)(cursor).await
    }
}

struct ListState<T> {
    cursor: Option<String>,
    items: Vec<T>,
    in_flight: bool,
}

struct Inner<T> {
    fetcher: Arc<dyn PageFetcher<T>>,
    state: Mutex<ListState<T>>,
    /// Mirrors `in_flight` for waiters.
    busy: watch::Sender<bool>,
}

/// Incrementally loaded list.
///
/// Cloning yields another handle to the same list.
pub struct IncrementalList<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for IncrementalList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Send + 'static> IncrementalList<T> {
    /// Create the list and immediately request the first page.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(initial_cursor: impl Into<String>, fetcher: Arc<dyn PageFetcher<T>>) -> Self {
        let (busy, _) = watch::channel(false);
        let list = Self {
            inner: Arc::new(Inner {
                fetcher,
                state: Mutex::new(ListState {
                    cursor: Some(initial_cursor.into()),
                    items: Vec::new(),
                    in_flight: false,
                }),
                busy,
            }),
        };
        list.fetch_more();
        list
    }

    /// Request the next page.
    ///
    /// Returns `false` without doing anything if a fetch is already in
    /// flight or the list is exhausted.
    pub fn fetch_more(&self) -> bool {
        let cursor = {
            let mut state = self.inner.state.lock();
            if state.in_flight {
                return false;
            }
            let Some(cursor) = state.cursor.clone() else {
                return false;
            };
            state.in_flight = true;
            self.inner.busy.send_replace(true);
            cursor
        };

        debug!(cursor = %cursor, "Fetching page");
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let fetcher = inner.fetcher.clone();
            let fetch = tokio::spawn(async move { fetcher.fetch_page(cursor).await });
            // A fetcher that panics ends the list rather than leaving it in flight.
            let page = match fetch.await {
                Ok(page) => page,
                Err(e) => {
                    warn!(error = %e, "Page fetch aborted; treating list as exhausted");
                    Page::exhausted()
                }
            };

            let mut state = inner.state.lock();
            debug!(items = page.data.len(), has_next = page.next.is_some(), "Page received");
            state.items.extend(page.data);
            state.cursor = page.next;
            state.in_flight = false;
            inner.busy.send_replace(false);
        });
        true
    }

    /// Wait until no fetch is in flight.
    pub async fn settled(&self) {
        let mut busy = self.inner.busy.subscribe();
        let _ = busy.wait_for(|in_flight| !*in_flight).await;
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().in_flight
    }

    /// No further pages will be requested.
    pub fn is_exhausted(&self) -> bool {
        self.inner.state.lock().cursor.is_none()
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().items.is_empty()
    }
}

impl<T: Clone> IncrementalList<T> {
    /// Snapshot of the items accumulated so far, in arrival order.
    pub fn items(&self) -> Vec<T> {
        self.inner.state.lock().items.clone()
    }
}
