//! Cast, crew and filmographies.

use std::sync::Arc;

use crate::client::ClientInner;
use crate::models::{MediaPeople, MediaRef, MediaType, PersonCredits, TraktId, Watchable};
use crate::route::Route;
use crate::{Error, Result};

/// Service for people behind movies and shows.
///
/// # Example
///
/// ```no_run
/// use trakt_rs::MediaType;
///
/// # async fn example(client: trakt_rs::TraktClient) -> trakt_rs::Result<()> {
/// let show = client.media().show("scandal").await?;
/// let people = client.people().cast(&show).await?;
/// for member in &people.cast {
///     println!("{} as {}", member.person.name, member.character);
/// }
///
/// let credits = client.people().credits("mel-gibson", MediaType::Movies).await?;
/// # Ok(())
/// # }
/// ```
pub struct PeopleService {
    inner: Arc<ClientInner>,
}

impl PeopleService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Cast and crew of a movie or show.
    pub async fn cast<W: Watchable + ?Sized>(&self, item: &W) -> Result<MediaPeople> {
        self.cast_of(MediaRef::of(item)?).await
    }

    /// Cast and crew of the referenced movie or show.
    pub async fn cast_of(&self, item: MediaRef) -> Result<MediaPeople> {
        let data = self.inner.submit(&Route::People(item)).await?;
        MediaPeople::from_json(&data)
            .ok_or_else(|| Error::Decode("people response is not an object".to_string()))
    }

    /// A person's movie or show credits.
    pub async fn credits(
        &self,
        person: impl Into<TraktId>,
        media_type: MediaType,
    ) -> Result<PersonCredits> {
        let route = Route::Credits {
            person: person.into(),
            media_type,
        };
        let data = self.inner.submit(&route).await?;
        PersonCredits::from_json(media_type, &data)
            .ok_or_else(|| Error::Decode("credits response is not an object".to_string()))
    }
}
