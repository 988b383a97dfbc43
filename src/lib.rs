//! # trakt-rs
//!
//! An async Rust client for the [Trakt](https://trakt.tv) movie and TV
//! tracking API.
//!
//! Every endpoint is a variant of [`Route`], which knows its method, path,
//! parameters, whether it needs a user token and whether it may be retried.
//! [`TraktClient::submit`] sends any route; the typed services on the client
//! decode the responses into models.
//!
//! ## Features
//!
//! - **Routing**: a closed, exhaustively matched endpoint catalog with
//!   request fingerprints for deduplication
//! - **Authentication**: OAuth device-code and PIN flows with a persistent
//!   token slot
//! - **Sync**: watchlist, watched history, collection and ratings, with
//!   mutation results checked against the API's counters
//! - **Media**: movies, shows, seasons, episodes, people, releases and
//!   watched progress merged into an owned show tree
//! - **Async-first**: built on Tokio and reqwest
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trakt_rs::{Credentials, MediaType, TraktClient};
//!
//! #[tokio::main]
//! async fn main() -> trakt_rs::Result<()> {
//!     let client = TraktClient::new(Credentials::from_env()?)?;
//!
//!     let trending = client.discover().trending(MediaType::Movies, None).await?;
//!     println!("Found {} trending movies", trending.len());
//!
//!     if let Some(movie) = trending.first().and_then(|m| m.as_movie()) {
//!         let people = client.people().cast(movie).await?;
//!         println!("{} has {} cast members", movie.title, people.cast.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Authenticated Requests
//!
//! ```rust,no_run
//! use trakt_rs::{Credentials, FileTokenStore, MediaType, TraktClient, ClientConfig, ReqwestTransport};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> trakt_rs::Result<()> {
//!     let config = ClientConfig::default();
//!     let http = reqwest::Client::builder().timeout(config.timeout).build()?;
//!     let client = TraktClient::with_parts(
//!         Credentials::from_env()?,
//!         config,
//!         Arc::new(ReqwestTransport::new(http)),
//!         Arc::new(FileTokenStore::new("trakt-token.json")),
//!     )?;
//!
//!     if !client.is_authenticated().await {
//!         let code = client.auth().device_code().await?;
//!         println!("Open {} and enter {}", code.verification_url, code.user_code);
//!         client.auth().wait_for_device(&code).await?;
//!     }
//!
//!     for entry in client.sync().watched(MediaType::Shows).await? {
//!         println!("{:?}: {} plays", entry.media.title(), entry.plays);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod route;

// Re-export primary types at crate root for convenience
pub use auth::{
    DeviceCode, FileTokenStore, MemoryTokenStore, NavigationDecision, PinFlow, PinOutcome, Token,
    TokenStore,
};
pub use client::{
    ClientConfig, Credentials, HttpResponse, PaginatedStream, ReqwestTransport, RetryConfig,
    TraktClient, Transport,
};
pub use error::{Error, Result};
pub use models::{Environment, LoadState, Media, MediaRef, MediaType, TraktId, Watchable};
pub use route::{Fingerprint, Pagination, PreparedRequest, Route};

/// Prelude module for convenient imports.
///
/// ```rust
/// use trakt_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{DeviceCode, NavigationDecision, PinFlow, PinOutcome, Token, TokenStore};
    pub use crate::client::{ClientConfig, Credentials, TraktClient};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        // Primitives
        Environment, MediaRef, TraktId,
        // Enums
        LoadState, MediaType,
        // Entities
        Episode, Media, Movie, Person, Release, Season, Show, Watchable,
        // Listings
        MediaPeople, PersonCredits, SyncResponse, WatchedEntry,
    };
    pub use crate::route::{Pagination, Route};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_urls() {
        assert_eq!(Environment::Production.api_base_url(), "https://api.trakt.tv");
        assert_eq!(
            Environment::Staging.api_base_url(),
            "https://api-staging.trakt.tv"
        );
    }

    #[test]
    fn test_route_reexports() {
        let route = Route::Movie(TraktId::from("tron-legacy-2010"));
        assert_eq!(route.path(), "/movies/tron-legacy-2010");
        assert_eq!(route.fingerprint(), route.clone().fingerprint());
    }
}
