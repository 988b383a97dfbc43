//! Watchlist, history, collection and ratings.

use std::sync::Arc;

use tracing::debug;

use crate::client::ClientInner;
use crate::models::{
    Media, MediaRef, MediaType, SyncCounter, SyncResponse, Watchable, WatchedEntry,
};
use crate::route::Route;
use crate::{Error, Result};

use super::discover::{keyed_entries, list};

/// Which batch list a [`SyncService::add_batch`] or
/// [`SyncService::remove_batch`] call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncList {
    /// The watchlist
    Watchlist,
    /// The watched history
    History,
}

/// Service for the user's lists. Every operation needs a token.
///
/// Single-item mutations check the per-type counter in the response and
/// only then update the item's flag; a zero count is
/// [`Error::NoEffect`].
///
/// # Example
///
/// ```no_run
/// use trakt_rs::MediaType;
///
/// # async fn example(client: trakt_rs::TraktClient) -> trakt_rs::Result<()> {
/// let mut movie = client.media().movie("tron-legacy-2010").await?;
/// client.sync().add_to_watchlist(&mut movie).await?;
/// assert!(movie.watchlist);
///
/// let watchlist = client.sync().watchlist(MediaType::Movies).await?;
/// # Ok(())
/// # }
/// ```
pub struct SyncService {
    inner: Arc<ClientInner>,
}

impl SyncService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Items on the watchlist, all flagged `watchlist`.
    pub async fn watchlist(&self, media_type: MediaType) -> Result<Vec<Media>> {
        let route = Route::Watchlist(media_type);
        let data = self.inner.submit(&route).await?;
        let mut items: Vec<Media> = list(&route, &data)?
            .filter_map(Media::from_entry)
            .collect();
        for item in &mut items {
            if let Some(item) = item.as_watchable_mut() {
                item.set_watchlist(true);
            }
        }
        Ok(items)
    }

    /// Items in the collection.
    pub async fn collection(&self, media_type: MediaType) -> Result<Vec<Media>> {
        let route = Route::Collection(media_type);
        let data = self.inner.submit(&route).await?;
        keyed_entries(&route, media_type, &data)
    }

    /// Watched movies or shows with play counts.
    pub async fn watched(&self, media_type: MediaType) -> Result<Vec<WatchedEntry>> {
        let route = Route::Watched(media_type);
        let data = self.inner.submit(&route).await?;
        Ok(list(&route, &data)?
            .filter_map(|entry| WatchedEntry::from_json(media_type, entry))
            .collect())
    }

    /// Add an item to the watchlist and flag it.
    pub async fn add_to_watchlist<W: Watchable + ?Sized>(&self, item: &mut W) -> Result<()> {
        let target = MediaRef::of(&*item)?;
        self.mutate(
            "add to watchlist",
            Route::AddToWatchlist(vec![target.clone()]),
            SyncCounter::Added,
            target.media_type,
        )
        .await?;
        item.set_watchlist(true);
        Ok(())
    }

    /// Remove an item from the watchlist and clear its flag.
    pub async fn remove_from_watchlist<W: Watchable + ?Sized>(&self, item: &mut W) -> Result<()> {
        let target = MediaRef::of(&*item)?;
        self.mutate(
            "remove from watchlist",
            Route::RemoveFromWatchlist(vec![target.clone()]),
            SyncCounter::Deleted,
            target.media_type,
        )
        .await?;
        item.set_watchlist(false);
        Ok(())
    }

    /// Add an item to the watched history and flag it.
    pub async fn mark_watched<W: Watchable + ?Sized>(&self, item: &mut W) -> Result<()> {
        let target = MediaRef::of(&*item)?;
        self.mutate(
            "mark watched",
            Route::AddToHistory(vec![target.clone()]),
            SyncCounter::Added,
            target.media_type,
        )
        .await?;
        item.set_watched(true);
        Ok(())
    }

    /// Remove an item from the watched history and clear its flag.
    pub async fn unwatch<W: Watchable + ?Sized>(&self, item: &mut W) -> Result<()> {
        let target = MediaRef::of(&*item)?;
        self.mutate(
            "unwatch",
            Route::RemoveFromHistory(vec![target.clone()]),
            SyncCounter::Deleted,
            target.media_type,
        )
        .await?;
        item.set_watched(false);
        Ok(())
    }

    /// Rate an item from 1 to 10.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a rating outside `1..=10`,
    /// before anything is sent.
    pub async fn rate<W: Watchable + ?Sized>(&self, item: &W, rating: u8) -> Result<()> {
        if !(1..=10).contains(&rating) {
            return Err(Error::InvalidInput(format!(
                "rating must be between 1 and 10, got {}",
                rating
            )));
        }
        let target = MediaRef::of(&*item)?;
        let media_type = target.media_type;
        self.mutate("rate", Route::Rate(target, rating), SyncCounter::Added, media_type)
            .await
    }

    /// Add several items at once and return the raw counters.
    pub async fn add_batch(&self, kind: SyncList, items: Vec<MediaRef>) -> Result<SyncResponse> {
        let route = match kind {
            SyncList::Watchlist => Route::AddToWatchlist(items),
            SyncList::History => Route::AddToHistory(items),
        };
        SyncResponse::from_json(&self.inner.submit(&route).await?)
    }

    /// Remove several items at once and return the raw counters.
    pub async fn remove_batch(
        &self,
        kind: SyncList,
        items: Vec<MediaRef>,
    ) -> Result<SyncResponse> {
        let route = match kind {
            SyncList::Watchlist => Route::RemoveFromWatchlist(items),
            SyncList::History => Route::RemoveFromHistory(items),
        };
        SyncResponse::from_json(&self.inner.submit(&route).await?)
    }

    async fn mutate(
        &self,
        action: &'static str,
        route: Route,
        counter: SyncCounter,
        media_type: MediaType,
    ) -> Result<()> {
        let response = SyncResponse::from_json(&self.inner.submit(&route).await?)?;
        let count = response.count(counter, media_type)?;
        debug!(action, %media_type, count, "Sync mutation");
        if count == 0 {
            return Err(Error::NoEffect { action, media_type });
        }
        Ok(())
    }
}
