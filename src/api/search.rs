//! Text search.

use std::sync::Arc;

use serde_json::Value;

use crate::client::{ClientInner, PaginatedStream};
use crate::models::{Media, MediaType};
use crate::route::{Pagination, Route};
use crate::Result;

use super::discover::list;

/// Service for searching movies, shows, episodes and people.
///
/// # Example
///
/// ```no_run
/// use trakt_rs::MediaType;
///
/// # async fn example(client: trakt_rs::TraktClient) -> trakt_rs::Result<()> {
/// let results = client
///     .search()
///     .search("tron", Some(MediaType::Movies), Some(2010), None)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct SearchService {
    inner: Arc<ClientInner>,
}

impl SearchService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Search by text, optionally restricted to one type and year.
    pub async fn search(
        &self,
        query: &str,
        media_type: Option<MediaType>,
        year: Option<u32>,
        pagination: Option<Pagination>,
    ) -> Result<Vec<Media>> {
        let route = Route::Search {
            query: query.to_string(),
            media_type,
            year,
            pagination: pagination.unwrap_or_default(),
        };
        let data = self.inner.submit(&route).await?;
        results(&route, &data)
    }

    /// Stream every search result, `limit` per page.
    pub fn search_stream(
        &self,
        query: &str,
        media_type: Option<MediaType>,
        year: Option<u32>,
        limit: u32,
    ) -> PaginatedStream<Media> {
        let query = query.to_string();
        PaginatedStream::for_route(
            self.inner.clone(),
            Pagination::first(limit),
            move |pagination| Route::Search {
                query: query.clone(),
                media_type,
                year,
                pagination,
            },
            results,
        )
    }
}

fn results(route: &Route, data: &Value) -> Result<Vec<Media>> {
    Ok(list(route, data)?.filter_map(Media::from_entry).collect())
}
