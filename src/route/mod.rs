//! The endpoint catalog.
//!
//! Every endpoint the client talks to is one variant of [`Route`]. A variant
//! carries only the values its request needs, and the route derives
//! everything else from them: HTTP method, path, parameters, whether a user
//! token is required and whether a failed attempt may be retried. All of
//! these are exhaustive `match`es, so adding a variant without mapping it is
//! a compile error.
//!
//! ```
//! use trakt_rs::{MediaType, Pagination, Route};
//!
//! let route = Route::Trending(MediaType::Movies, Pagination::default());
//! assert_eq!(route.path(), "/movies/trending");
//! assert!(!route.needs_authorization());
//! ```

mod pagination;
mod request;

pub use pagination::Pagination;
pub use request::PreparedRequest;

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use reqwest::header::HeaderMap;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Map, Value};

use crate::models::{MediaRef, MediaType, TraktId};

/// `extended` value requested on every detail and list read.
pub const EXTENDED_INFO: &str = "full,images";

/// Redirect URI for out-of-band (PIN) authorization.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// One API endpoint invocation.
#[derive(Debug, Clone)]
pub enum Route {
    /// Generate new device codes
    GenerateCode {
        /// OAuth client id
        client_id: String,
    },
    /// Poll for the access token of a device code
    PollDevice {
        /// Device code returned by [`Route::GenerateCode`]
        device_code: String,
        /// OAuth client id
        client_id: String,
        /// OAuth client secret
        client_secret: SecretString,
    },
    /// Exchange a PIN for an access token
    Token {
        /// OAuth client id
        client_id: String,
        /// OAuth client secret
        client_secret: SecretString,
        /// PIN shown to the user after authorizing the application
        pin: String,
    },
    /// Exchange a refresh token for a new access token
    RefreshToken {
        /// OAuth client id
        client_id: String,
        /// OAuth client secret
        client_secret: SecretString,
        /// Refresh token of the current session
        refresh_token: SecretString,
    },
    /// Trending movies or shows
    Trending(MediaType, Pagination),
    /// Personal recommendations for movies or shows
    Recommendations(MediaType, Pagination),
    /// The user's collection
    Collection(MediaType),
    /// The user's watchlist
    Watchlist(MediaType),
    /// Cast and crew of a movie or show
    People(MediaRef),
    /// A person's movie or show credits
    Credits {
        /// Person id or slug
        person: TraktId,
        /// Which credits to list
        media_type: MediaType,
    },
    /// The user's watched movies or shows
    Watched(MediaType),
    /// Add items to the watchlist
    AddToWatchlist(Vec<MediaRef>),
    /// Remove items from the watchlist
    RemoveFromWatchlist(Vec<MediaRef>),
    /// Add items to the watched history
    AddToHistory(Vec<MediaRef>),
    /// Remove items from the watched history
    RemoveFromHistory(Vec<MediaRef>),
    /// Hide a movie or show from recommendations
    HideRecommendation(MediaRef),
    /// Watched progress of a show
    Progress {
        /// Show id or slug
        show: TraktId,
    },
    /// A single episode
    Episode {
        /// Show id or slug
        show: TraktId,
        /// Season number
        season: u32,
        /// Episode number
        episode: u32,
    },
    /// All seasons of a show, or the episodes of one season
    Season {
        /// Show id or slug
        show: TraktId,
        /// Season number; `None` lists the seasons
        season: Option<u32>,
    },
    /// A movie
    Movie(TraktId),
    /// A show
    Show(TraktId),
    /// Text search
    Search {
        /// Search text
        query: String,
        /// Restrict results to one type
        media_type: Option<MediaType>,
        /// Restrict results to one year
        year: Option<u32>,
        /// Page to fetch
        pagination: Pagination,
    },
    /// Rate an item from 1 to 10
    Rate(MediaRef, u8),
    /// A user profile; `None` is the authenticated user
    Profile(Option<String>),
    /// Releases of a movie, optionally for one country
    Releases {
        /// Movie id or slug
        movie: TraktId,
        /// Two-letter country code
        country: Option<String>,
    },
}

impl Route {
    /// Variant name, for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Route::GenerateCode { .. } => "GenerateCode",
            Route::PollDevice { .. } => "PollDevice",
            Route::Token { .. } => "Token",
            Route::RefreshToken { .. } => "RefreshToken",
            Route::Trending(..) => "Trending",
            Route::Recommendations(..) => "Recommendations",
            Route::Collection(_) => "Collection",
            Route::Watchlist(_) => "Watchlist",
            Route::People(_) => "People",
            Route::Credits { .. } => "Credits",
            Route::Watched(_) => "Watched",
            Route::AddToWatchlist(_) => "AddToWatchlist",
            Route::RemoveFromWatchlist(_) => "RemoveFromWatchlist",
            Route::AddToHistory(_) => "AddToHistory",
            Route::RemoveFromHistory(_) => "RemoveFromHistory",
            Route::HideRecommendation(_) => "HideRecommendation",
            Route::Progress { .. } => "Progress",
            Route::Episode { .. } => "Episode",
            Route::Season { .. } => "Season",
            Route::Movie(_) => "Movie",
            Route::Show(_) => "Show",
            Route::Search { .. } => "Search",
            Route::Rate(..) => "Rate",
            Route::Profile(_) => "Profile",
            Route::Releases { .. } => "Releases",
        }
    }

    /// HTTP method.
    pub fn method(&self) -> Method {
        match self {
            Route::GenerateCode { .. }
            | Route::PollDevice { .. }
            | Route::Token { .. }
            | Route::RefreshToken { .. }
            | Route::AddToWatchlist(_)
            | Route::RemoveFromWatchlist(_)
            | Route::AddToHistory(_)
            | Route::RemoveFromHistory(_)
            | Route::Rate(..) => Method::POST,
            Route::HideRecommendation(_) => Method::DELETE,
            Route::Trending(..)
            | Route::Recommendations(..)
            | Route::Collection(_)
            | Route::Watchlist(_)
            | Route::People(_)
            | Route::Credits { .. }
            | Route::Watched(_)
            | Route::Progress { .. }
            | Route::Episode { .. }
            | Route::Season { .. }
            | Route::Movie(_)
            | Route::Show(_)
            | Route::Search { .. }
            | Route::Profile(_)
            | Route::Releases { .. } => Method::GET,
        }
    }

    /// Path relative to the API host.
    pub fn path(&self) -> String {
        match self {
            Route::GenerateCode { .. } => "/oauth/device/code".to_string(),
            Route::PollDevice { .. } => "/oauth/device/token".to_string(),
            Route::Token { .. } | Route::RefreshToken { .. } => "/oauth/token".to_string(),
            Route::Trending(media_type, _) => format!("/{}/trending", media_type),
            Route::Recommendations(media_type, _) => format!("/recommendations/{}", media_type),
            Route::Collection(media_type) => format!("/sync/collection/{}", media_type),
            Route::Watchlist(media_type) => format!("/sync/watchlist/{}", media_type),
            Route::Watched(media_type) => format!("/sync/watched/{}", media_type),
            Route::People(item) => format!("/{}/{}/people", item.media_type, item.id),
            Route::Credits { person, media_type } => format!("/people/{}/{}", person, media_type),
            Route::AddToWatchlist(_) => "/sync/watchlist".to_string(),
            Route::RemoveFromWatchlist(_) => "/sync/watchlist/remove".to_string(),
            Route::AddToHistory(_) => "/sync/history".to_string(),
            Route::RemoveFromHistory(_) => "/sync/history/remove".to_string(),
            Route::HideRecommendation(item) => {
                format!("/recommendations/{}/{}", item.media_type, item.id)
            }
            Route::Progress { show } => format!("/shows/{}/progress/watched", show),
            Route::Episode {
                show,
                season,
                episode,
            } => format!("/shows/{}/seasons/{}/episodes/{}", show, season, episode),
            Route::Season { show, season } => match season {
                Some(number) => format!("/shows/{}/seasons/{}", show, number),
                None => format!("/shows/{}/seasons", show),
            },
            Route::Movie(id) => format!("/movies/{}", id),
            Route::Show(id) => format!("/shows/{}", id),
            Route::Search { .. } => "/search".to_string(),
            Route::Rate(..) => "/sync/ratings".to_string(),
            Route::Profile(user) => format!("/users/{}", user.as_deref().unwrap_or("me")),
            Route::Releases { movie, country } => match country {
                Some(code) => format!("/movies/{}/releases/{}", movie, code),
                None => format!("/movies/{}/releases", movie),
            },
        }
    }

    /// Request parameters: the JSON body of POST routes, the query string of
    /// the others. Query parameters are always flat scalars.
    pub fn parameters(&self) -> Option<Map<String, Value>> {
        match self {
            Route::GenerateCode { client_id } => object(json!({ "client_id": client_id })),
            Route::PollDevice {
                device_code,
                client_id,
                client_secret,
            } => object(json!({
                "client_id": client_id,
                "client_secret": client_secret.expose_secret(),
                "code": device_code,
            })),
            Route::Token {
                client_id,
                client_secret,
                pin,
            } => object(json!({
                "code": pin,
                "client_id": client_id,
                "client_secret": client_secret.expose_secret(),
                "redirect_uri": OOB_REDIRECT_URI,
                "grant_type": "authorization_code",
            })),
            Route::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            } => object(json!({
                "refresh_token": refresh_token.expose_secret(),
                "client_id": client_id,
                "client_secret": client_secret.expose_secret(),
                "redirect_uri": OOB_REDIRECT_URI,
                "grant_type": "refresh_token",
            })),
            Route::Watchlist(_)
            | Route::Collection(_)
            | Route::Watched(_)
            | Route::Progress { .. }
            | Route::Episode { .. }
            | Route::Season { .. }
            | Route::Movie(_)
            | Route::Show(_)
            | Route::People(_)
            | Route::Credits { .. } => Some(extended(Map::new())),
            Route::Trending(_, pagination) | Route::Recommendations(_, pagination) => {
                Some(extended(pagination.value()))
            }
            Route::AddToWatchlist(items)
            | Route::RemoveFromWatchlist(items)
            | Route::AddToHistory(items)
            | Route::RemoveFromHistory(items) => Some(grouped(items)),
            Route::Search {
                query,
                media_type,
                year,
                pagination,
            } => {
                let mut params = pagination.value();
                params.insert("query".to_string(), Value::from(query.as_str()));
                if let Some(media_type) = media_type {
                    params.insert("type".to_string(), Value::from(media_type.single()));
                }
                if let Some(year) = year {
                    params.insert("year".to_string(), Value::from(*year));
                }
                Some(params)
            }
            Route::Rate(item, rating) => {
                let mut params = Map::new();
                params.insert(
                    item.media_type.as_str().to_string(),
                    json!([{ "rating": rating, "ids": { "trakt": Value::from(&item.id) } }]),
                );
                Some(params)
            }
            Route::HideRecommendation(_) | Route::Profile(_) | Route::Releases { .. } => None,
        }
    }

    /// Extra headers this route adds on top of the client defaults.
    /// No endpoint currently needs any.
    pub fn headers(&self) -> HeaderMap {
        HeaderMap::new()
    }

    /// Whether the request must carry the user's access token.
    pub fn needs_authorization(&self) -> bool {
        match self {
            Route::GenerateCode { .. }
            | Route::PollDevice { .. }
            | Route::Token { .. }
            | Route::RefreshToken { .. }
            | Route::People(_)
            | Route::Credits { .. }
            | Route::Trending(..)
            | Route::Movie(_)
            | Route::Show(_)
            | Route::Episode { .. }
            | Route::Season { .. }
            | Route::Search { .. } => false,
            Route::Recommendations(..)
            | Route::Collection(_)
            | Route::Watchlist(_)
            | Route::Watched(_)
            | Route::AddToWatchlist(_)
            | Route::RemoveFromWatchlist(_)
            | Route::AddToHistory(_)
            | Route::RemoveFromHistory(_)
            | Route::HideRecommendation(_)
            | Route::Progress { .. }
            | Route::Rate(..)
            | Route::Profile(_)
            | Route::Releases { .. } => true,
        }
    }

    /// Whether a transient failure may be retried. Device polling is driven
    /// by its own loop, where failures are the expected answer.
    pub fn retry_on_failure(&self) -> bool {
        !matches!(self, Route::PollDevice { .. })
    }

    /// Canonical identity of the request this route produces.
    ///
    /// Built from method, path and every `key=value` parameter pair, then
    /// hashed, so secrets in OAuth parameters never leak through it. Pairs
    /// are taken in sorted key order (the iteration order of
    /// [`serde_json::Map`]), not the order parameters were inserted, so two
    /// routes with the same parameters always agree.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint(*blake3::hash(self.canonical().as_bytes()).as_bytes())
    }

    fn canonical(&self) -> String {
        let mut canonical = format!("{} {}", self.method(), self.path());
        if let Some(params) = self.parameters() {
            let pairs: Vec<String> = params
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            canonical.push(' ');
            canonical.push_str(&pairs.join(","));
        }
        canonical
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint() == other.fingerprint()
    }
}

impl Eq for Route {}

impl Hash for Route {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fingerprint().hash(state);
    }
}

/// BLAKE3 digest identifying the outgoing request of a [`Route`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self)
    }
}

fn object(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn extended(mut params: Map<String, Value>) -> Map<String, Value> {
    params.insert("extended".to_string(), Value::from(EXTENDED_INFO));
    params
}

/// Group items by media type: `{"movies": [{"ids": {"trakt": 1}}], ...}`.
fn grouped(items: &[MediaRef]) -> Map<String, Value> {
    let mut groups: BTreeMap<&'static str, Vec<Value>> = BTreeMap::new();
    for item in items {
        groups
            .entry(item.media_type.as_str())
            .or_default()
            .push(json!({ "ids": { "trakt": Value::from(&item.id) } }));
    }
    groups
        .into_iter()
        .map(|(media_type, list)| (media_type.to_string(), Value::Array(list)))
        .collect()
}
