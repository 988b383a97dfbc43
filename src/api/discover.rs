//! Trending lists and personal recommendations.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;

use crate::client::{ClientInner, PaginatedStream};
use crate::models::{Media, MediaRef, MediaType, Watchable};
use crate::route::{Pagination, Route};
use crate::{Error, Result};

/// Service for trending and recommended movies and shows.
///
/// # Example
///
/// ```no_run
/// use trakt_rs::MediaType;
///
/// # async fn example(client: trakt_rs::TraktClient) -> trakt_rs::Result<()> {
/// let trending = client.discover().trending(MediaType::Shows, None).await?;
/// for show in &trending {
///     println!("{:?}", show.title());
/// }
/// # Ok(())
/// # }
/// ```
pub struct DiscoverService {
    inner: Arc<ClientInner>,
}

impl DiscoverService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Trending movies or shows. Defaults to the first page of 100.
    pub async fn trending(
        &self,
        media_type: MediaType,
        pagination: Option<Pagination>,
    ) -> Result<Vec<Media>> {
        let route = Route::Trending(media_type, pagination.unwrap_or_default());
        let data = self.inner.submit(&route).await?;
        keyed_entries(&route, media_type, &data)
    }

    /// Stream every trending item, `limit` per page.
    pub fn trending_stream(&self, media_type: MediaType, limit: u32) -> PaginatedStream<Media> {
        PaginatedStream::for_route(
            self.inner.clone(),
            Pagination::first(limit),
            move |pagination| Route::Trending(media_type, pagination),
            move |route, data| keyed_entries(route, media_type, data),
        )
    }

    /// Recommended movies or shows for the user.
    pub async fn recommendations(
        &self,
        media_type: MediaType,
        pagination: Option<Pagination>,
    ) -> Result<Vec<Media>> {
        let route = Route::Recommendations(media_type, pagination.unwrap_or_default());
        let data = self.inner.submit(&route).await?;
        bare_entries(&route, media_type, &data)
    }

    /// Hide a movie or show from future recommendations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] if the API answers anything but
    /// `204 No Content`.
    pub async fn hide_recommendation<W: Watchable + ?Sized>(&self, item: &W) -> Result<()> {
        let route = Route::HideRecommendation(MediaRef::of(item)?);
        let response = self.inner.submit_raw(&route).await?;
        if response.status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(Error::Api {
                status: response.status.as_u16(),
                message: "expected 204 No Content".to_string(),
                body: Value::String(String::from_utf8_lossy(&response.body).into_owned()),
            })
        }
    }
}

/// Decode `[{"<single>": {...}, ...}]`, skipping entries that do not parse.
pub(crate) fn keyed_entries(
    route: &Route,
    media_type: MediaType,
    data: &Value,
) -> Result<Vec<Media>> {
    Ok(list(route, data)?
        .filter_map(|entry| Media::from_typed(media_type, entry.get(media_type.single())?))
        .collect())
}

/// Decode `[{...}, ...]` where each element is the entity itself.
pub(crate) fn bare_entries(
    route: &Route,
    media_type: MediaType,
    data: &Value,
) -> Result<Vec<Media>> {
    Ok(list(route, data)?
        .filter_map(|entry| Media::from_typed(media_type, entry))
        .collect())
}

/// Elements of a list response. Anything but an array is
/// [`Error::Decode`].
pub(crate) fn list<'a>(route: &Route, data: &'a Value) -> Result<std::slice::Iter<'a, Value>> {
    data.as_array()
        .map(|items| items.iter())
        .ok_or_else(|| Error::Decode(format!("{} response is not a list", route.name())))
}
