//! Enumeration types for the Trakt API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of media an endpoint or entity refers to.
///
/// The plural form is used in paths and in grouped sync bodies
/// (`/movies/trending`, `{"movies": [...]}`); the singular form keys
/// individual list entries (`{"type": "movie", "movie": {...}}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Movies
    Movies,
    /// TV shows
    Shows,
    /// Seasons of a show
    Seasons,
    /// Episodes of a season
    Episodes,
    /// Cast and crew members
    People,
}

impl MediaType {
    /// All media types, in API order.
    pub const ALL: [MediaType; 5] = [
        MediaType::Movies,
        MediaType::Shows,
        MediaType::Seasons,
        MediaType::Episodes,
        MediaType::People,
    ];

    /// Plural name used in paths and grouped bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movies => "movies",
            MediaType::Shows => "shows",
            MediaType::Seasons => "seasons",
            MediaType::Episodes => "episodes",
            MediaType::People => "people",
        }
    }

    /// Singular name used in list entries and the search `type` filter.
    pub fn single(&self) -> &'static str {
        match self {
            MediaType::Movies => "movie",
            MediaType::Shows => "show",
            MediaType::Seasons => "season",
            MediaType::Episodes => "episode",
            MediaType::People => "person",
        }
    }

    /// Look up a media type by its singular name.
    pub fn from_single(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.single() == name)
    }

    /// Look up a media type by its plural name.
    pub fn from_plural(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a lazily fetched entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Never requested, or explicitly reset
    #[default]
    NotRequested,
    /// A request is currently outstanding
    InFlight,
    /// Full details have been merged in
    Loaded,
    /// The last request failed or was cancelled
    Failed,
}

impl LoadState {
    /// Returns `true` if a new request may be issued from this state.
    pub fn can_request(&self) -> bool {
        matches!(self, LoadState::NotRequested | LoadState::Failed)
    }
}
