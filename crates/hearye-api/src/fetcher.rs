//! Page fetching for paginated list endpoints.

use crate::pagination::{Page, PageFetcher};
use crate::{ApiClient, RequestResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::marker::PhantomData;
use tracing::warn;

/// Paginated list response body.
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default)]
    next: Option<String>,
    results: Vec<T>,
}

/// Fetches `{ "next": ..., "results": [...] }` pages through the request
/// pipeline. Any failure ends pagination with an empty page.
pub struct JsonPageFetcher<T> {
    client: ApiClient,
    _item: PhantomData<fn() -> T>,
}

impl<T> JsonPageFetcher<T> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _item: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> JsonPageFetcher<T> {
    async fn try_fetch(&self, cursor: &str) -> RequestResult<Page<T>> {
        let response = self.client.get(cursor).await?;
        let body: ListResponse<T> = response.json().await?;
        Ok(Page {
            next: body.next.filter(|next| !next.is_empty()),
            data: body.results,
        })
    }
}

#[async_trait]
impl<T> PageFetcher<T> for JsonPageFetcher<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, cursor: String) -> Page<T> {
        match self.try_fetch(&cursor).await {
            Ok(page) => page,
            Err(e) => {
                warn!(cursor = %cursor, error = %e, "Page fetch failed; ending pagination");
                Page::exhausted()
            }
        }
    }
}
