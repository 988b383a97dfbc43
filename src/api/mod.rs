//! API service modules for Trakt endpoints.
//!
//! Each service wraps [`TraktClient::submit`](crate::TraktClient::submit)
//! for one area of the API and decodes the responses into models.

mod auth;
mod discover;
mod media;
mod people;
mod search;
mod sync;
mod users;

pub use auth::AuthService;
pub use discover::DiscoverService;
pub use media::MediaService;
pub use people::PeopleService;
pub use search::SearchService;
pub use sync::{SyncList, SyncService};
pub use users::UsersService;
