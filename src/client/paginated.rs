//! Paginated stream for lazy iteration over list endpoints.
//!
//! Trakt pages are 1-based and the paging state travels in response headers
//! (`X-Pagination-Page`, `X-Pagination-Limit`, `X-Pagination-Page-Count`,
//! `X-Pagination-Item-Count`). [`PaginatedStream`] walks those pages and
//! yields individual items.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use serde_json::Value;

use super::transport::{BoxFuture, HttpResponse};
use super::ClientInner;
use crate::route::{Pagination, Route};
use crate::Result;

/// One decoded page.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The items in this page
    pub items: Vec<T>,
    /// Paging headers, when the endpoint sent them
    pub pagination: Option<PaginationInfo>,
}

/// Pagination metadata from response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationInfo {
    /// Current page (1-based)
    pub page: u32,
    /// Items per page
    pub limit: u32,
    /// Total number of pages
    pub page_count: u32,
    /// Total number of items across all pages
    pub item_count: u64,
}

impl PaginationInfo {
    /// Read the `X-Pagination-*` headers. Returns `None` unless page and
    /// page count are both present.
    pub fn from_response(response: &HttpResponse) -> Option<Self> {
        let number = |name: &str| response.header(name).and_then(|v| v.trim().parse::<u64>().ok());

        Some(Self {
            page: u32::try_from(number("x-pagination-page")?).ok()?,
            limit: number("x-pagination-limit")
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0),
            page_count: u32::try_from(number("x-pagination-page-count")?).ok()?,
            item_count: number("x-pagination-item-count").unwrap_or(0),
        })
    }

    /// Check if there are more pages after the current one.
    pub fn has_more(&self) -> bool {
        self.page < self.page_count
    }

    /// Get the next page number, if available.
    pub fn next_page(&self) -> Option<u32> {
        if self.has_more() {
            Some(self.page + 1)
        } else {
            None
        }
    }
}

type FetchPage<T> = Box<dyn Fn(Pagination) -> BoxFuture<'static, Result<Page<T>>> + Send + Sync>;

/// A stream that lazily fetches pages from a paginated endpoint.
///
/// The stream ends when the headers report the last page, when a page comes
/// back empty, or after the first error.
///
/// # Example
///
/// ```no_run
/// use futures_util::StreamExt;
/// use trakt_rs::MediaType;
///
/// # async fn example(client: trakt_rs::TraktClient) -> trakt_rs::Result<()> {
/// let mut stream = client.discover().trending_stream(MediaType::Shows, 20);
///
/// while let Some(show) = stream.next().await {
///     println!("{:?}", show?.title());
/// }
/// # Ok(())
/// # }
/// ```
pub struct PaginatedStream<T> {
    fetch_page: FetchPage<T>,
    current_items: VecDeque<T>,
    next_page: Option<Pagination>,
    pending_fetch: Option<BoxFuture<'static, Result<Page<T>>>>,
}

impl<T: Send + 'static> PaginatedStream<T> {
    /// Create a stream starting at `first`.
    pub fn new<F>(first: Pagination, fetch_page: F) -> Self
    where
        F: Fn(Pagination) -> BoxFuture<'static, Result<Page<T>>> + Send + Sync + 'static,
    {
        Self {
            fetch_page: Box::new(fetch_page),
            current_items: VecDeque::new(),
            next_page: Some(first),
            pending_fetch: None,
        }
    }

    /// Stream the items of a paginated route. `route` builds the route for
    /// a page and `decode` turns a response body into items; a decode error
    /// ends the stream like any other error.
    pub(crate) fn for_route<R, D>(
        inner: Arc<ClientInner>,
        first: Pagination,
        route: R,
        decode: D,
    ) -> Self
    where
        R: Fn(Pagination) -> Route + Send + Sync + 'static,
        D: Fn(&Route, &Value) -> Result<Vec<T>> + Send + Sync + 'static,
    {
        let decode = Arc::new(decode);
        Self::new(first, move |pagination| {
            let inner = inner.clone();
            let decode = decode.clone();
            let route = route(pagination);
            Box::pin(async move {
                let response = inner.submit_raw(&route).await?;
                let body = super::http::decode_body(&response.body)?;
                Ok(Page {
                    items: decode(&route, &body)?,
                    pagination: PaginationInfo::from_response(&response),
                })
            })
        })
    }
}

impl<T> Stream for PaginatedStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            if let Some(item) = this.current_items.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            if let Some(fut) = this.pending_fetch.as_mut() {
                match fut.as_mut().poll(cx) {
                    Poll::Ready(Ok(page)) => {
                        this.pending_fetch = None;
                        let requested = this.next_page.take();
                        this.next_page = match (requested, page.pagination) {
                            (Some(requested), Some(info)) => info
                                .next_page()
                                .and_then(|next| Pagination::new(next, requested.limit()).ok()),
                            _ => None,
                        };
                        if page.items.is_empty() {
                            return Poll::Ready(None);
                        }
                        this.current_items = page.items.into();
                        continue;
                    }
                    Poll::Ready(Err(e)) => {
                        this.pending_fetch = None;
                        this.next_page = None;
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }

            match this.next_page {
                Some(page) => {
                    this.pending_fetch = Some((this.fetch_page)(page));
                }
                None => return Poll::Ready(None),
            }
        }
    }
}

impl<T> Unpin for PaginatedStream<T> {}
