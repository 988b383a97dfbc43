//! Primitive types and newtypes for type-safe API interactions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// An opaque Trakt identifier: either the numeric trakt id or a slug.
///
/// Both forms are accepted anywhere the API takes an id in a path, so the
/// rendered value is always path-safe without extra escaping.
///
/// # Example
///
/// ```
/// use trakt_rs::TraktId;
///
/// let numeric = TraktId::from(39105u64);
/// let slug = TraktId::from("tron-legacy-2010");
/// assert_eq!(numeric.to_string(), "39105");
/// assert_eq!(slug.as_slug(), Some("tron-legacy-2010"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraktId {
    /// Numeric trakt id
    Numeric(u64),
    /// URL slug (e.g. `mel-gibson`)
    Slug(String),
}

impl TraktId {
    /// Parse a string, treating all-digit input as a numeric id.
    pub fn parse(s: &str) -> Self {
        match s.parse::<u64>() {
            Ok(n) => TraktId::Numeric(n),
            Err(_) => TraktId::Slug(s.to_string()),
        }
    }

    /// Numeric id, if this is one.
    pub fn as_numeric(&self) -> Option<u64> {
        match self {
            TraktId::Numeric(n) => Some(*n),
            TraktId::Slug(_) => None,
        }
    }

    /// Slug, if this is one.
    pub fn as_slug(&self) -> Option<&str> {
        match self {
            TraktId::Numeric(_) => None,
            TraktId::Slug(s) => Some(s),
        }
    }
}

impl fmt::Display for TraktId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraktId::Numeric(n) => write!(f, "{}", n),
            TraktId::Slug(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for TraktId {
    fn from(n: u64) -> Self {
        TraktId::Numeric(n)
    }
}

impl From<u32> for TraktId {
    fn from(n: u32) -> Self {
        TraktId::Numeric(u64::from(n))
    }
}

impl From<String> for TraktId {
    fn from(s: String) -> Self {
        TraktId::Slug(s)
    }
}

impl From<&str> for TraktId {
    fn from(s: &str) -> Self {
        TraktId::Slug(s.to_string())
    }
}

impl From<&TraktId> for Value {
    fn from(id: &TraktId) -> Self {
        match id {
            TraktId::Numeric(n) => Value::from(*n),
            TraktId::Slug(s) => Value::from(s.as_str()),
        }
    }
}

/// Environment configuration for the Trakt API.
///
/// # Example
///
/// ```
/// use trakt_rs::Environment;
///
/// let env = Environment::Staging;
/// println!("API URL: {}", env.api_base_url());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Production API.
    #[default]
    Production,
    /// Staging API, for app development against throwaway accounts.
    Staging,
}

impl Environment {
    /// Get the base URL for REST API requests.
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://api.trakt.tv",
            Environment::Staging => "https://api-staging.trakt.tv",
        }
    }

    /// Get the base URL of the website hosting the PIN authorization page.
    pub fn site_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://trakt.tv",
            Environment::Staging => "https://staging.trakt.tv",
        }
    }

    /// Returns `true` if this is the production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Staging => write!(f, "staging"),
        }
    }
}
