//! Movies, shows, seasons and episodes.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::client::ClientInner;
use crate::models::{Episode, LoadState, Movie, Release, Season, Show, TraktId};
use crate::route::Route;
use crate::{Error, Result};

use super::discover::list;

/// Service for looking up media and the user's progress.
///
/// # Example
///
/// ```no_run
/// # async fn example(client: trakt_rs::TraktClient) -> trakt_rs::Result<()> {
/// let mut show = client.media().show("the-wire").await?;
/// client.media().progress(&mut show).await?;
///
/// if let Some(next) = &show.next_episode {
///     println!("Up next: S{:02}E{:02}", next.season_number, next.number);
/// }
/// # Ok(())
/// # }
/// ```
pub struct MediaService {
    inner: Arc<ClientInner>,
}

impl MediaService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Get a movie by id or slug.
    pub async fn movie(&self, id: impl Into<TraktId>) -> Result<Movie> {
        let id = id.into();
        let data = self.inner.submit(&Route::Movie(id.clone())).await?;
        Movie::from_json(&data).ok_or_else(|| Error::Decode(format!("movie {} is malformed", id)))
    }

    /// Get a show by id or slug.
    pub async fn show(&self, id: impl Into<TraktId>) -> Result<Show> {
        let id = id.into();
        let data = self.inner.submit(&Route::Show(id.clone())).await?;
        Show::from_json(&data).ok_or_else(|| Error::Decode(format!("show {} is malformed", id)))
    }

    /// All seasons of a show.
    pub async fn seasons(&self, show: impl Into<TraktId>) -> Result<Vec<Season>> {
        let show = show.into();
        let route = Route::Season {
            show: show.clone(),
            season: None,
        };
        let data = self.inner.submit(&route).await?;
        Ok(list(&route, &data)?
            .filter_map(Season::from_json)
            .map(|mut season| {
                season.show_id = Some(show.clone());
                season
            })
            .collect())
    }

    /// All episodes of one season.
    pub async fn episodes(&self, show: impl Into<TraktId>, season: u32) -> Result<Vec<Episode>> {
        let show = show.into();
        let route = Route::Season {
            show: show.clone(),
            season: Some(season),
        };
        let data = self.inner.submit(&route).await?;
        Ok(list(&route, &data)?
            .filter_map(Episode::from_json)
            .map(|mut episode| {
                episode.show_id = Some(show.clone());
                episode
            })
            .collect())
    }

    /// Get a single episode.
    pub async fn episode(
        &self,
        show: impl Into<TraktId>,
        season: u32,
        number: u32,
    ) -> Result<Episode> {
        let show = show.into();
        let route = Route::Episode {
            show: show.clone(),
            season,
            episode: number,
        };
        let data = self.inner.submit(&route).await?;

        let mut episode = Episode::new(season, number);
        episode.show_id = Some(show);
        if !episode.digest(&data) {
            return Err(Error::Decode(format!(
                "episode {}x{} is malformed",
                season, number
            )));
        }
        episode.load_state = LoadState::Loaded;
        Ok(episode)
    }

    /// Fill in an episode's details.
    ///
    /// A loaded episode returns `Ok(true)` without a request, and one that
    /// is already in flight returns `Ok(false)`. Otherwise the episode is
    /// fetched and digested. If the returned future is dropped before it
    /// completes, the episode is left [`LoadState::Failed`] and may be
    /// requested again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the episode does not know its
    /// show, or the request's error. Either way the state becomes
    /// [`LoadState::Failed`].
    pub async fn load_episode(&self, episode: &mut Episode) -> Result<bool> {
        match episode.load_state {
            LoadState::Loaded => return Ok(true),
            LoadState::InFlight => return Ok(false),
            LoadState::NotRequested | LoadState::Failed => {}
        }

        let Some(show) = episode.show_id.clone() else {
            episode.load_state = LoadState::Failed;
            return Err(Error::InvalidInput(format!(
                "episode {}x{} has no show id",
                episode.season_number, episode.number
            )));
        };
        let route = Route::Episode {
            show,
            season: episode.season_number,
            episode: episode.number,
        };

        let mut guard = LoadGuard::start(episode);
        let data = match self.inner.submit(&route).await {
            Ok(data) => data,
            Err(e) => {
                debug!(route = route.name(), error = %e, "Episode load failed");
                guard.finish(LoadState::Failed);
                return Err(e);
            }
        };

        if guard.episode.digest(&data) {
            guard.finish(LoadState::Loaded);
            Ok(true)
        } else {
            guard.finish(LoadState::Failed);
            Err(Error::Decode("episode response is malformed".to_string()))
        }
    }

    /// Merge the user's watched progress into a show.
    ///
    /// Seasons and episodes from the response are added to (or merged
    /// into) the show, episodes flagged watched when completed, and
    /// `next_episode` is set when the API names one.
    pub async fn progress(&self, show: &mut Show) -> Result<()> {
        let route = Route::Progress {
            show: show.id.clone(),
        };
        let data = self.inner.submit(&route).await?;
        if !data.is_object() {
            return Err(Error::Decode("progress response is not an object".to_string()));
        }

        let seasons = data.get("seasons").and_then(Value::as_array);
        for season_data in seasons.into_iter().flatten() {
            if season_data.get("episodes").map_or(true, |e| !e.is_array()) {
                continue;
            }
            if let Some(season) = Season::from_json(season_data) {
                show.add_season(season);
            }
        }

        if let Some(next) = data.get("next_episode").and_then(Episode::from_json) {
            let (season_number, number) = (next.season_number, next.number);
            if show.season(season_number).is_none() {
                show.add_season(Season::new(season_number));
            }
            if let Some(season) = show.season_mut(season_number) {
                if season.episode(number).is_none() {
                    season.add_episode(next.clone());
                }
            }
            let mut next = next;
            next.show_id = Some(show.id.clone());
            show.next_episode = Some(next);
        }

        Ok(())
    }

    /// Fetch a movie's releases, optionally for one country, and store
    /// them on the movie.
    pub async fn releases<'a>(
        &self,
        movie: &'a mut Movie,
        country: Option<&str>,
    ) -> Result<&'a [Release]> {
        let route = Route::Releases {
            movie: movie.id.clone(),
            country: country.map(str::to_lowercase),
        };
        let data = self.inner.submit(&route).await?;
        movie.releases = list(&route, &data)?
            .filter_map(Release::from_json)
            .collect();
        Ok(&movie.releases)
    }
}

/// Marks an episode in flight and guarantees it does not stay that way.
struct LoadGuard<'a> {
    episode: &'a mut Episode,
    finished: bool,
}

impl<'a> LoadGuard<'a> {
    fn start(episode: &'a mut Episode) -> Self {
        episode.load_state = LoadState::InFlight;
        Self {
            episode,
            finished: false,
        }
    }

    fn finish(&mut self, state: LoadState) {
        self.episode.load_state = state;
        self.finished = true;
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.episode.load_state = LoadState::Failed;
        }
    }
}
