//! Data models for the Trakt API.
//!
//! - [`primitives`] - Ids and environment
//! - [`enums`] - Media types and load state
//! - [`media`] - Movies, shows, seasons, episodes, people, releases
//! - [`credits`] - Cast and crew listings
//! - [`sync`] - Sync mutation counters and watched history
//! - [`datetime`] - Wire date formats

pub mod credits;
pub mod datetime;
pub mod enums;
pub mod media;
pub mod primitives;
pub mod sync;

pub use credits::*;
pub use enums::*;
pub use media::*;
pub use primitives::*;
pub use sync::*;
