//! Movie, show, season, episode and person models.
//!
//! Entities are built from decoded JSON with `from_json`, which returns
//! `None` when identifying fields are missing, and enriched later with
//! `digest`, which merges whatever fields a newer response carries. A
//! partially loaded entity can therefore be re-fetched in place.
//!
//! Ownership follows the API's hierarchy: a [`Show`] owns its seasons by
//! number, a [`Season`] owns its episodes by number, and an [`Episode`] only
//! records the season number and show id it belongs to.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::datetime::{parse_date, parse_datetime};
use super::{LoadState, MediaType, TraktId};
use crate::{Error, Result};

/// Image URLs keyed by kind (`poster`, `fanart`, ...) then size
/// (`full`, `medium`, `thumb`).
pub type Images = BTreeMap<String, BTreeMap<String, String>>;

/// External identifiers attached to every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ids {
    /// Numeric trakt id
    pub trakt: Option<u64>,
    /// URL slug
    pub slug: Option<String>,
    /// IMDb id
    pub imdb: Option<String>,
    /// TMDb id
    pub tmdb: Option<u64>,
    /// TVDB id
    pub tvdb: Option<u64>,
}

impl Ids {
    /// The id used for API calls: the numeric trakt id, else the slug.
    pub fn primary(&self) -> Option<TraktId> {
        self.trakt
            .map(TraktId::Numeric)
            .or_else(|| self.slug.clone().map(TraktId::Slug))
    }

    fn merge(&mut self, other: Ids) {
        merge(&mut self.trakt, other.trakt);
        merge(&mut self.slug, other.slug);
        merge(&mut self.imdb, other.imdb);
        merge(&mut self.tmdb, other.tmdb);
        merge(&mut self.tvdb, other.tvdb);
    }
}

/// Capability shared by everything that can be watched, rated or put on a
/// watchlist.
pub trait Watchable {
    /// Media type used to group this entity in sync bodies.
    fn media_type(&self) -> MediaType;
    /// Identifier, if the entity has been loaded with ids.
    fn trakt_id(&self) -> Option<TraktId>;
    /// Whether the user has watched this entity.
    fn is_watched(&self) -> bool;
    /// Update the watched flag.
    fn set_watched(&mut self, watched: bool);
    /// Whether this entity is on the user's watchlist.
    fn in_watchlist(&self) -> bool;
    /// Update the watchlist flag.
    fn set_watchlist(&mut self, watchlist: bool);
}

macro_rules! impl_watchable {
    ($ty:ty, $media:expr, |$this:ident| $id:expr) => {
        impl Watchable for $ty {
            fn media_type(&self) -> MediaType {
                $media
            }

            fn trakt_id(&self) -> Option<TraktId> {
                let $this = self;
                $id
            }

            fn is_watched(&self) -> bool {
                self.watched
            }

            fn set_watched(&mut self, watched: bool) {
                self.watched = watched;
            }

            fn in_watchlist(&self) -> bool {
                self.watchlist
            }

            fn set_watchlist(&mut self, watchlist: bool) {
                self.watchlist = watchlist;
            }
        }
    };
}

/// Route-level handle on an entity: its media type and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaRef {
    /// Media type of the entity
    pub media_type: MediaType,
    /// Identifier of the entity
    pub id: TraktId,
}

impl MediaRef {
    /// Create a reference from its parts.
    pub fn new(media_type: MediaType, id: impl Into<TraktId>) -> Self {
        Self {
            media_type,
            id: id.into(),
        }
    }

    /// Reference a watchable entity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the entity has no id yet.
    pub fn of<W: Watchable + ?Sized>(item: &W) -> Result<Self> {
        let id = item.trakt_id().ok_or_else(|| {
            Error::InvalidInput(format!(
                "{} has no trakt id and cannot be referenced",
                item.media_type().single()
            ))
        })?;
        Ok(Self::new(item.media_type(), id))
    }
}

/// A movie.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    /// Identifier used in API paths
    pub id: TraktId,
    /// All known identifiers
    pub ids: Ids,
    /// Title
    pub title: String,
    /// Release year
    pub year: Option<u32>,
    /// Plot summary
    pub overview: Option<String>,
    /// Tagline
    pub tagline: Option<String>,
    /// Runtime in minutes
    pub runtime: Option<u32>,
    /// Community rating (0-10)
    pub rating: Option<f64>,
    /// Number of votes behind `rating`
    pub votes: Option<u64>,
    /// First release date
    pub released: Option<NaiveDate>,
    /// Certification (e.g. `PG-13`)
    pub certification: Option<String>,
    /// Genre slugs
    pub genres: Vec<String>,
    /// Artwork
    pub images: Images,
    /// Per-country releases, filled by the releases endpoint
    pub releases: Vec<Release>,
    /// Watched by the user
    pub watched: bool,
    /// On the user's watchlist
    pub watchlist: bool,
}

#[derive(Debug, Default, Deserialize)]
struct MoviePatch {
    ids: Option<Ids>,
    title: Option<String>,
    year: Option<u32>,
    overview: Option<String>,
    tagline: Option<String>,
    runtime: Option<u32>,
    rating: Option<f64>,
    votes: Option<u64>,
    released: Option<String>,
    certification: Option<String>,
    genres: Option<Vec<String>>,
    images: Option<Value>,
}

impl Movie {
    /// Build a movie from a decoded object. Requires `ids` and `title`.
    pub fn from_json(data: &Value) -> Option<Self> {
        let patch = MoviePatch::deserialize(data).ok()?;
        let id = patch.ids.as_ref()?.primary()?;
        let title = patch.title.clone()?;

        let mut movie = Movie {
            id,
            ids: Ids::default(),
            title,
            year: None,
            overview: None,
            tagline: None,
            runtime: None,
            rating: None,
            votes: None,
            released: None,
            certification: None,
            genres: Vec::new(),
            images: Images::new(),
            releases: Vec::new(),
            watched: false,
            watchlist: false,
        };
        movie.apply(patch);
        Some(movie)
    }

    /// Merge the fields present in `data`. Returns `false` if `data` is not
    /// a movie object.
    pub fn digest(&mut self, data: &Value) -> bool {
        match MoviePatch::deserialize(data) {
            Ok(patch) => {
                self.apply(patch);
                true
            }
            Err(e) => {
                tracing::debug!(id = %self.id, error = %e, "Ignoring malformed movie data");
                false
            }
        }
    }

    fn apply(&mut self, patch: MoviePatch) {
        if let Some(ids) = patch.ids {
            self.ids.merge(ids);
            if let Some(id) = self.ids.primary() {
                self.id = id;
            }
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        merge(&mut self.year, patch.year);
        merge(&mut self.overview, patch.overview);
        merge(&mut self.tagline, patch.tagline);
        merge(&mut self.runtime, patch.runtime);
        merge(&mut self.rating, patch.rating);
        merge(&mut self.votes, patch.votes);
        merge(&mut self.released, patch.released.as_deref().and_then(parse_date));
        merge(&mut self.certification, patch.certification);
        if let Some(genres) = patch.genres {
            self.genres = genres;
        }
        if let Some(images) = patch.images {
            self.images = parse_images(&images);
        }
    }
}

impl_watchable!(Movie, MediaType::Movies, |m| Some(m.id.clone()));

/// A TV show.
#[derive(Debug, Clone, PartialEq)]
pub struct Show {
    /// Identifier used in API paths
    pub id: TraktId,
    /// All known identifiers
    pub ids: Ids,
    /// Title
    pub title: String,
    /// Premiere year
    pub year: Option<u32>,
    /// Plot summary
    pub overview: Option<String>,
    /// Episode runtime in minutes
    pub runtime: Option<u32>,
    /// Community rating (0-10)
    pub rating: Option<f64>,
    /// Number of votes behind `rating`
    pub votes: Option<u64>,
    /// Broadcasting network
    pub network: Option<String>,
    /// Production status (`returning series`, `ended`, ...)
    pub status: Option<String>,
    /// First air date of the pilot
    pub first_aired: Option<DateTime<Utc>>,
    /// Number of aired episodes
    pub aired_episodes: Option<u32>,
    /// Genre slugs
    pub genres: Vec<String>,
    /// Artwork
    pub images: Images,
    /// Seasons, owned by number
    pub seasons: BTreeMap<u32, Season>,
    /// Next episode to watch, filled by the progress endpoint
    pub next_episode: Option<Episode>,
    /// Watched by the user
    pub watched: bool,
    /// On the user's watchlist
    pub watchlist: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ShowPatch {
    ids: Option<Ids>,
    title: Option<String>,
    year: Option<u32>,
    overview: Option<String>,
    runtime: Option<u32>,
    rating: Option<f64>,
    votes: Option<u64>,
    network: Option<String>,
    status: Option<String>,
    first_aired: Option<String>,
    aired_episodes: Option<u32>,
    genres: Option<Vec<String>>,
    images: Option<Value>,
}

impl Show {
    /// Build a show from a decoded object. Requires `ids` and `title`.
    pub fn from_json(data: &Value) -> Option<Self> {
        let patch = ShowPatch::deserialize(data).ok()?;
        let id = patch.ids.as_ref()?.primary()?;
        let title = patch.title.clone()?;

        let mut show = Show {
            id,
            ids: Ids::default(),
            title,
            year: None,
            overview: None,
            runtime: None,
            rating: None,
            votes: None,
            network: None,
            status: None,
            first_aired: None,
            aired_episodes: None,
            genres: Vec::new(),
            images: Images::new(),
            seasons: BTreeMap::new(),
            next_episode: None,
            watched: false,
            watchlist: false,
        };
        show.apply(patch);
        Some(show)
    }

    /// Merge the fields present in `data`. Returns `false` if `data` is not
    /// a show object.
    pub fn digest(&mut self, data: &Value) -> bool {
        match ShowPatch::deserialize(data) {
            Ok(patch) => {
                self.apply(patch);
                true
            }
            Err(e) => {
                tracing::debug!(id = %self.id, error = %e, "Ignoring malformed show data");
                false
            }
        }
    }

    fn apply(&mut self, patch: ShowPatch) {
        if let Some(ids) = patch.ids {
            self.ids.merge(ids);
            if let Some(id) = self.ids.primary() {
                self.id = id;
            }
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        merge(&mut self.year, patch.year);
        merge(&mut self.overview, patch.overview);
        merge(&mut self.runtime, patch.runtime);
        merge(&mut self.rating, patch.rating);
        merge(&mut self.votes, patch.votes);
        merge(&mut self.network, patch.network);
        merge(&mut self.status, patch.status);
        merge(
            &mut self.first_aired,
            patch.first_aired.as_deref().and_then(parse_datetime),
        );
        merge(&mut self.aired_episodes, patch.aired_episodes);
        if let Some(genres) = patch.genres {
            self.genres = genres;
        }
        if let Some(images) = patch.images {
            self.images = parse_images(&images);
        }
    }

    /// Season by number.
    pub fn season(&self, number: u32) -> Option<&Season> {
        self.seasons.get(&number)
    }

    /// Mutable season by number.
    pub fn season_mut(&mut self, number: u32) -> Option<&mut Season> {
        self.seasons.get_mut(&number)
    }

    /// Attach a season. If one with the same number exists, the incoming
    /// season's fields and episodes are merged into it.
    pub fn add_season(&mut self, mut season: Season) {
        season.attach_to_show(&self.id);
        match self.seasons.get_mut(&season.number) {
            Some(existing) => existing.absorb(season),
            None => {
                self.seasons.insert(season.number, season);
            }
        }
    }
}

impl_watchable!(Show, MediaType::Shows, |s| Some(s.id.clone()));

/// A season of a show.
#[derive(Debug, Clone, PartialEq)]
pub struct Season {
    /// Season number (0 for specials)
    pub number: u32,
    /// Identifier, when the API provided ids
    pub id: Option<TraktId>,
    /// All known identifiers
    pub ids: Ids,
    /// Title
    pub title: Option<String>,
    /// Summary
    pub overview: Option<String>,
    /// Number of episodes
    pub episode_count: Option<u32>,
    /// Number of aired episodes
    pub aired_episodes: Option<u32>,
    /// Community rating (0-10)
    pub rating: Option<f64>,
    /// First air date
    pub first_aired: Option<DateTime<Utc>>,
    /// Artwork
    pub images: Images,
    /// Id of the owning show
    pub show_id: Option<TraktId>,
    /// Episodes, owned by number
    pub episodes: BTreeMap<u32, Episode>,
    /// Watched by the user
    pub watched: bool,
    /// On the user's watchlist
    pub watchlist: bool,
}

#[derive(Debug, Default, Deserialize)]
struct SeasonPatch {
    number: Option<u32>,
    ids: Option<Ids>,
    title: Option<String>,
    overview: Option<String>,
    episode_count: Option<u32>,
    aired_episodes: Option<u32>,
    rating: Option<f64>,
    first_aired: Option<String>,
    images: Option<Value>,
    episodes: Option<Vec<Value>>,
}

impl Season {
    /// Create an empty season.
    pub fn new(number: u32) -> Self {
        Season {
            number,
            id: None,
            ids: Ids::default(),
            title: None,
            overview: None,
            episode_count: None,
            aired_episodes: None,
            rating: None,
            first_aired: None,
            images: Images::new(),
            show_id: None,
            episodes: BTreeMap::new(),
            watched: false,
            watchlist: false,
        }
    }

    /// Build a season from a decoded object. Requires `number`; embedded
    /// `episodes` are attached to the season.
    pub fn from_json(data: &Value) -> Option<Self> {
        let patch = SeasonPatch::deserialize(data).ok()?;
        let mut season = Season::new(patch.number?);
        season.apply(patch);
        Some(season)
    }

    /// Merge the fields present in `data`.
    pub fn digest(&mut self, data: &Value) -> bool {
        match SeasonPatch::deserialize(data) {
            Ok(patch) => {
                self.apply(patch);
                true
            }
            Err(e) => {
                tracing::debug!(season = self.number, error = %e, "Ignoring malformed season data");
                false
            }
        }
    }

    fn apply(&mut self, patch: SeasonPatch) {
        if let Some(ids) = patch.ids {
            self.ids.merge(ids);
            merge(&mut self.id, self.ids.primary());
        }
        merge(&mut self.title, patch.title);
        merge(&mut self.overview, patch.overview);
        merge(&mut self.episode_count, patch.episode_count);
        merge(&mut self.aired_episodes, patch.aired_episodes);
        merge(&mut self.rating, patch.rating);
        merge(
            &mut self.first_aired,
            patch.first_aired.as_deref().and_then(parse_datetime),
        );
        if let Some(images) = patch.images {
            self.images = parse_images(&images);
        }
        for data in patch.episodes.unwrap_or_default() {
            let Some(number) = data.get("number").and_then(Value::as_u64) else {
                continue;
            };
            let mut episode = Episode::new(self.number, number as u32);
            if episode.digest(&data) {
                self.add_episode(episode);
            }
        }
    }

    /// Episode by number.
    pub fn episode(&self, number: u32) -> Option<&Episode> {
        self.episodes.get(&number)
    }

    /// Mutable episode by number.
    pub fn episode_mut(&mut self, number: u32) -> Option<&mut Episode> {
        self.episodes.get_mut(&number)
    }

    /// Attach an episode to this season. An existing episode with the same
    /// number keeps its loaded details and takes over the incoming fields.
    pub fn add_episode(&mut self, mut episode: Episode) {
        episode.season_number = self.number;
        episode.show_id = self.show_id.clone();
        match self.episodes.get_mut(&episode.number) {
            Some(existing) => existing.absorb(episode),
            None => {
                self.episodes.insert(episode.number, episode);
            }
        }
    }

    fn attach_to_show(&mut self, show_id: &TraktId) {
        self.show_id = Some(show_id.clone());
        for episode in self.episodes.values_mut() {
            episode.show_id = Some(show_id.clone());
        }
    }

    fn absorb(&mut self, other: Season) {
        merge(&mut self.id, other.id);
        self.ids.merge(other.ids);
        merge(&mut self.title, other.title);
        merge(&mut self.overview, other.overview);
        merge(&mut self.episode_count, other.episode_count);
        merge(&mut self.aired_episodes, other.aired_episodes);
        merge(&mut self.rating, other.rating);
        merge(&mut self.first_aired, other.first_aired);
        if !other.images.is_empty() {
            self.images = other.images;
        }
        for (_, episode) in other.episodes {
            self.add_episode(episode);
        }
    }
}

impl_watchable!(Season, MediaType::Seasons, |s| s.id.clone());

/// An episode of a season.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    /// Episode number within its season
    pub number: u32,
    /// Number of the season this episode belongs to
    pub season_number: u32,
    /// Identifier, when the API provided ids
    pub id: Option<TraktId>,
    /// All known identifiers
    pub ids: Ids,
    /// Title
    pub title: Option<String>,
    /// Summary
    pub overview: Option<String>,
    /// Absolute episode number across seasons
    pub number_abs: Option<u32>,
    /// Runtime in minutes
    pub runtime: Option<u32>,
    /// Community rating (0-10)
    pub rating: Option<f64>,
    /// First air date
    pub first_aired: Option<DateTime<Utc>>,
    /// When the user last watched it, from progress data
    pub last_watched_at: Option<DateTime<Utc>>,
    /// Artwork
    pub images: Images,
    /// Id of the owning show
    pub show_id: Option<TraktId>,
    /// Watched by the user
    pub watched: bool,
    /// On the user's watchlist
    pub watchlist: bool,
    pub(crate) load_state: LoadState,
    /// Whether `watched` came from response data rather than the default
    watched_reported: bool,
}

#[derive(Debug, Default, Deserialize)]
struct EpisodePatch {
    season: Option<u32>,
    number: Option<u32>,
    ids: Option<Ids>,
    title: Option<String>,
    overview: Option<String>,
    number_abs: Option<u32>,
    runtime: Option<u32>,
    rating: Option<f64>,
    first_aired: Option<String>,
    last_watched_at: Option<String>,
    completed: Option<bool>,
    images: Option<Value>,
}

impl Episode {
    /// Create an empty episode, to be filled by [`digest`](Self::digest) or
    /// loaded through the client.
    pub fn new(season_number: u32, number: u32) -> Self {
        Episode {
            number,
            season_number,
            id: None,
            ids: Ids::default(),
            title: None,
            overview: None,
            number_abs: None,
            runtime: None,
            rating: None,
            first_aired: None,
            last_watched_at: None,
            images: Images::new(),
            show_id: None,
            watched: false,
            watchlist: false,
            load_state: LoadState::NotRequested,
            watched_reported: false,
        }
    }

    /// Build an episode from a decoded object. Requires `season` and
    /// `number`.
    pub fn from_json(data: &Value) -> Option<Self> {
        let patch = EpisodePatch::deserialize(data).ok()?;
        let mut episode = Episode::new(patch.season?, patch.number?);
        episode.apply(patch);
        Some(episode)
    }

    /// Merge the fields present in `data`.
    pub fn digest(&mut self, data: &Value) -> bool {
        match EpisodePatch::deserialize(data) {
            Ok(patch) => {
                self.apply(patch);
                true
            }
            Err(e) => {
                tracing::debug!(
                    season = self.season_number,
                    episode = self.number,
                    error = %e,
                    "Ignoring malformed episode data"
                );
                false
            }
        }
    }

    fn apply(&mut self, patch: EpisodePatch) {
        if let Some(season) = patch.season {
            self.season_number = season;
        }
        if let Some(number) = patch.number {
            self.number = number;
        }
        if let Some(ids) = patch.ids {
            self.ids.merge(ids);
            merge(&mut self.id, self.ids.primary());
        }
        merge(&mut self.title, patch.title);
        merge(&mut self.overview, patch.overview);
        merge(&mut self.number_abs, patch.number_abs);
        merge(&mut self.runtime, patch.runtime);
        merge(&mut self.rating, patch.rating);
        merge(
            &mut self.first_aired,
            patch.first_aired.as_deref().and_then(parse_datetime),
        );
        merge(
            &mut self.last_watched_at,
            patch.last_watched_at.as_deref().and_then(parse_datetime),
        );
        if let Some(completed) = patch.completed {
            self.watched = completed;
            self.watched_reported = true;
        }
        if let Some(images) = patch.images {
            self.images = parse_images(&images);
        }
    }

    /// Current load state.
    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Forget a previous load so the episode can be requested again.
    pub fn reset_load_state(&mut self) {
        self.load_state = LoadState::NotRequested;
    }

    fn absorb(&mut self, other: Episode) {
        merge(&mut self.id, other.id);
        self.ids.merge(other.ids);
        merge(&mut self.title, other.title);
        merge(&mut self.overview, other.overview);
        merge(&mut self.number_abs, other.number_abs);
        merge(&mut self.runtime, other.runtime);
        merge(&mut self.rating, other.rating);
        merge(&mut self.first_aired, other.first_aired);
        merge(&mut self.last_watched_at, other.last_watched_at);
        merge(&mut self.show_id, other.show_id);
        if !other.images.is_empty() {
            self.images = other.images;
        }
        // An unreported `false` is only the default and must not clear a
        // known watched flag.
        if other.watched_reported || other.watched {
            self.watched = other.watched;
            self.watched_reported = true;
        }
    }
}

impl_watchable!(Episode, MediaType::Episodes, |e| e.id.clone());

/// A cast or crew member.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    /// Identifier used in API paths
    pub id: TraktId,
    /// All known identifiers
    pub ids: Ids,
    /// Full name
    pub name: String,
    /// Biography
    pub biography: Option<String>,
    /// Date of birth
    pub birthday: Option<NaiveDate>,
    /// Date of death
    pub death: Option<NaiveDate>,
    /// Place of birth
    pub birthplace: Option<String>,
    /// Homepage URL
    pub homepage: Option<String>,
    /// Artwork
    pub images: Images,
}

#[derive(Debug, Default, Deserialize)]
struct PersonPatch {
    ids: Option<Ids>,
    name: Option<String>,
    biography: Option<String>,
    birthday: Option<String>,
    death: Option<String>,
    birthplace: Option<String>,
    homepage: Option<String>,
    images: Option<Value>,
}

impl Person {
    /// Build a person from a decoded object. Requires `ids` and `name`.
    pub fn from_json(data: &Value) -> Option<Self> {
        let patch = PersonPatch::deserialize(data).ok()?;
        let id = patch.ids.as_ref()?.primary()?;
        let name = patch.name.clone()?;

        let mut person = Person {
            id,
            ids: Ids::default(),
            name,
            biography: None,
            birthday: None,
            death: None,
            birthplace: None,
            homepage: None,
            images: Images::new(),
        };
        person.apply(patch);
        Some(person)
    }

    /// Merge the fields present in `data`.
    pub fn digest(&mut self, data: &Value) -> bool {
        match PersonPatch::deserialize(data) {
            Ok(patch) => {
                self.apply(patch);
                true
            }
            Err(_) => false,
        }
    }

    fn apply(&mut self, patch: PersonPatch) {
        if let Some(ids) = patch.ids {
            self.ids.merge(ids);
            if let Some(id) = self.ids.primary() {
                self.id = id;
            }
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        merge(&mut self.biography, patch.biography);
        merge(&mut self.birthday, patch.birthday.as_deref().and_then(parse_date));
        merge(&mut self.death, patch.death.as_deref().and_then(parse_date));
        merge(&mut self.birthplace, patch.birthplace);
        merge(&mut self.homepage, patch.homepage);
        if let Some(images) = patch.images {
            self.images = parse_images(&images);
        }
    }
}

/// A movie release in one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Two-letter country code
    pub country: String,
    /// Local certification
    pub certification: Option<String>,
    /// Release date
    pub release_date: Option<NaiveDate>,
    /// Release type (`theatrical`, `digital`, ...)
    pub release_type: Option<String>,
    /// Free-form note
    pub note: Option<String>,
}

impl Release {
    /// Build a release from a decoded object. Requires `country`.
    pub fn from_json(data: &Value) -> Option<Self> {
        #[derive(Deserialize)]
        struct Raw {
            country: String,
            certification: Option<String>,
            release_date: Option<String>,
            release_type: Option<String>,
            note: Option<String>,
        }

        let raw = Raw::deserialize(data).ok()?;
        Some(Release {
            country: raw.country,
            certification: raw.certification.filter(|c| !c.is_empty()),
            release_date: raw.release_date.as_deref().and_then(parse_date),
            release_type: raw.release_type,
            note: raw.note,
        })
    }
}

/// Any entity the API can return in a mixed list (search results,
/// watchlists, credits).
#[derive(Debug, Clone, PartialEq)]
pub enum Media {
    /// A movie
    Movie(Movie),
    /// A show
    Show(Show),
    /// A season
    Season(Season),
    /// An episode
    Episode(Episode),
    /// A person
    Person(Person),
}

impl Media {
    /// Build an entity of a known type from its object.
    pub fn from_typed(media_type: MediaType, data: &Value) -> Option<Self> {
        match media_type {
            MediaType::Movies => Movie::from_json(data).map(Media::Movie),
            MediaType::Shows => Show::from_json(data).map(Media::Show),
            MediaType::Seasons => Season::from_json(data).map(Media::Season),
            MediaType::Episodes => Episode::from_json(data).map(Media::Episode),
            MediaType::People => Person::from_json(data).map(Media::Person),
        }
    }

    /// Build an entity from a typed list entry such as
    /// `{"type": "movie", "movie": {...}}`.
    ///
    /// Episode entries usually carry their show next to them; its id is
    /// recorded on the episode.
    pub fn from_entry(entry: &Value) -> Option<Self> {
        let name = entry.get("type")?.as_str()?;
        let media_type = MediaType::from_single(name)?;
        let mut media = Self::from_typed(media_type, entry.get(name)?)?;

        if let Media::Episode(episode) = &mut media {
            episode.show_id = entry
                .get("show")
                .and_then(|s| s.get("ids"))
                .and_then(|ids| Ids::deserialize(ids).ok())
                .and_then(|ids| ids.primary());
        }
        Some(media)
    }

    /// Media type of the wrapped entity.
    pub fn media_type(&self) -> MediaType {
        match self {
            Media::Movie(_) => MediaType::Movies,
            Media::Show(_) => MediaType::Shows,
            Media::Season(_) => MediaType::Seasons,
            Media::Episode(_) => MediaType::Episodes,
            Media::Person(_) => MediaType::People,
        }
    }

    /// Display title or name, if any.
    pub fn title(&self) -> Option<&str> {
        match self {
            Media::Movie(m) => Some(&m.title),
            Media::Show(s) => Some(&s.title),
            Media::Season(s) => s.title.as_deref(),
            Media::Episode(e) => e.title.as_deref(),
            Media::Person(p) => Some(&p.name),
        }
    }

    /// Watchable view of the entity; people are not watchable.
    pub fn as_watchable(&self) -> Option<&dyn Watchable> {
        match self {
            Media::Movie(m) => Some(m),
            Media::Show(s) => Some(s),
            Media::Season(s) => Some(s),
            Media::Episode(e) => Some(e),
            Media::Person(_) => None,
        }
    }

    /// Mutable watchable view of the entity.
    pub fn as_watchable_mut(&mut self) -> Option<&mut dyn Watchable> {
        match self {
            Media::Movie(m) => Some(m),
            Media::Show(s) => Some(s),
            Media::Season(s) => Some(s),
            Media::Episode(e) => Some(e),
            Media::Person(_) => None,
        }
    }

    /// Returns the movie, if this is one.
    pub fn as_movie(&self) -> Option<&Movie> {
        match self {
            Media::Movie(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the show, if this is one.
    pub fn as_show(&self) -> Option<&Show> {
        match self {
            Media::Show(s) => Some(s),
            _ => None,
        }
    }
}

fn merge<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn parse_images(value: &Value) -> Images {
    let Some(kinds) = value.as_object() else {
        return Images::new();
    };

    kinds
        .iter()
        .filter_map(|(kind, sizes)| {
            let sizes: BTreeMap<String, String> = sizes
                .as_object()?
                .iter()
                .filter_map(|(size, url)| Some((size.clone(), url.as_str()?.to_string())))
                .collect();
            (!sizes.is_empty()).then(|| (kind.clone(), sizes))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn avatar() -> Value {
        json!({
            "title": "Avatar",
            "year": 2009,
            "ids": {"trakt": 12269, "slug": "avatar-2009", "imdb": "tt0499549", "tmdb": 19995}
        })
    }

    #[test]
    fn test_movie_from_json() {
        let movie = Movie::from_json(&avatar()).unwrap();
        assert_eq!(movie.id, TraktId::Numeric(12269));
        assert_eq!(movie.title, "Avatar");
        assert_eq!(movie.year, Some(2009));
        assert_eq!(movie.ids.imdb.as_deref(), Some("tt0499549"));
        assert!(!movie.watched);
    }

    #[test]
    fn test_movie_requires_ids_and_title() {
        assert!(Movie::from_json(&json!({"title": "No ids"})).is_none());
        assert!(Movie::from_json(&json!({"ids": {"trakt": 1}})).is_none());
        assert!(Movie::from_json(&json!([1, 2])).is_none());
    }

    #[test]
    fn test_movie_digest_enriches_in_place() {
        let mut movie = Movie::from_json(&avatar()).unwrap();
        movie.watchlist = true;

        assert!(movie.digest(&json!({
            "overview": "A paraplegic marine...",
            "released": "2009-12-18",
            "genres": ["action", "science-fiction"],
            "images": {"poster": {"full": "https://img/full.jpg", "thumb": null}}
        })));

        assert_eq!(movie.title, "Avatar");
        assert_eq!(movie.overview.as_deref(), Some("A paraplegic marine..."));
        assert_eq!(movie.released, NaiveDate::from_ymd_opt(2009, 12, 18));
        assert_eq!(movie.genres.len(), 2);
        assert_eq!(movie.images["poster"]["full"], "https://img/full.jpg");
        assert!(!movie.images["poster"].contains_key("thumb"));
        assert!(movie.watchlist, "digest must keep session flags");
    }

    #[test]
    fn test_movie_slug_only_id() {
        let movie = Movie::from_json(&json!({
            "title": "Tron: Legacy",
            "ids": {"slug": "tron-legacy-2010"}
        }))
        .unwrap();
        assert_eq!(movie.id, TraktId::Slug("tron-legacy-2010".into()));
    }

    #[test]
    fn test_show_owns_seasons_and_episodes() {
        let mut show = Show::from_json(&json!({
            "title": "Scandal",
            "year": 2012,
            "ids": {"trakt": 39105}
        }))
        .unwrap();

        let season = Season::from_json(&json!({
            "number": 5,
            "episodes": [
                {"number": 1, "title": "Heavy Is the Head"},
                {"number": 2, "title": "Yes"}
            ]
        }))
        .unwrap();
        show.add_season(season);

        let season = show.season(5).unwrap();
        assert_eq!(season.show_id, Some(TraktId::Numeric(39105)));
        let episode = season.episode(2).unwrap();
        assert_eq!(episode.season_number, 5);
        assert_eq!(episode.show_id, Some(TraktId::Numeric(39105)));
        assert_eq!(episode.title.as_deref(), Some("Yes"));
    }

    #[test]
    fn test_add_season_merges_existing() {
        let mut show = Show::from_json(&json!({"title": "S", "ids": {"trakt": 1}})).unwrap();

        let mut first = Season::new(1);
        let mut pilot = Episode::new(1, 1);
        pilot.title = Some("Pilot".into());
        first.add_episode(pilot);
        show.add_season(first);

        let mut second = Season::new(1);
        let mut watched = Episode::new(1, 1);
        watched.watched = true;
        second.add_episode(watched);
        second.add_episode(Episode::new(1, 2));
        show.add_season(second);

        let season = show.season(1).unwrap();
        assert_eq!(season.episodes.len(), 2);
        let pilot = season.episode(1).unwrap();
        assert_eq!(pilot.title.as_deref(), Some("Pilot"));
        assert!(pilot.watched);
    }

    #[test]
    fn test_merge_keeps_watched_unless_reported() {
        let mut season = Season::new(1);
        season.add_episode(
            Episode::from_json(&json!({"season": 1, "number": 1, "completed": true})).unwrap(),
        );

        season.add_episode(
            Episode::from_json(&json!({"season": 1, "number": 1, "title": "Pilot"})).unwrap(),
        );
        let pilot = season.episode(1).unwrap();
        assert!(pilot.watched);
        assert_eq!(pilot.title.as_deref(), Some("Pilot"));

        season.add_episode(
            Episode::from_json(&json!({"season": 1, "number": 1, "completed": false})).unwrap(),
        );
        assert!(!season.episode(1).unwrap().watched);
    }

    #[test]
    fn test_episode_from_json_requires_season_and_number() {
        assert!(Episode::from_json(&json!({"number": 1})).is_none());
        let episode = Episode::from_json(&json!({
            "season": 5,
            "number": 21,
            "title": "That's My Girl",
            "ids": {"trakt": 2035567},
            "first_aired": "2016-05-13T02:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(episode.id, Some(TraktId::Numeric(2035567)));
        assert!(episode.first_aired.is_some());
        assert_eq!(episode.load_state(), LoadState::NotRequested);
    }

    #[test]
    fn test_person_birthday() {
        let person = Person::from_json(&json!({
            "name": "Mel Gibson",
            "ids": {"trakt": 297737, "slug": "mel-gibson"},
            "birthday": "1956-01-03"
        }))
        .unwrap();
        assert_eq!(person.birthday, NaiveDate::from_ymd_opt(1956, 1, 3));
    }

    #[test]
    fn test_media_from_entry() {
        let media = Media::from_entry(&json!({"type": "movie", "score": 26.0, "movie": avatar()}))
            .unwrap();
        assert_eq!(media.media_type(), MediaType::Movies);
        assert_eq!(media.title(), Some("Avatar"));

        let episode = Media::from_entry(&json!({
            "type": "episode",
            "episode": {"season": 1, "number": 2, "ids": {"trakt": 5}},
            "show": {"title": "S", "ids": {"trakt": 99}}
        }))
        .unwrap();
        match episode {
            Media::Episode(e) => assert_eq!(e.show_id, Some(TraktId::Numeric(99))),
            other => panic!("expected episode, got {other:?}"),
        }

        assert!(Media::from_entry(&json!({"type": "list", "list": {}})).is_none());
    }

    #[test]
    fn test_media_ref_of() {
        let movie = Movie::from_json(&avatar()).unwrap();
        let reference = MediaRef::of(&movie).unwrap();
        assert_eq!(reference, MediaRef::new(MediaType::Movies, 12269u64));

        let episode = Episode::new(1, 1);
        assert!(matches!(MediaRef::of(&episode), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_release_from_json() {
        let release = Release::from_json(&json!({
            "country": "us",
            "certification": "",
            "release_date": "2010-12-17",
            "release_type": "theatrical",
            "note": null
        }))
        .unwrap();
        assert_eq!(release.country, "us");
        assert_eq!(release.certification, None);
        assert_eq!(release.release_date, NaiveDate::from_ymd_opt(2010, 12, 17));
    }
}
