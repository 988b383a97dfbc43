//! Sync endpoint payloads: mutation counters and watched history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::datetime::parse_datetime;
use super::{Media, MediaType};
use crate::{Error, Result};

/// Per-type counters reported by a sync mutation (`{"movies": 1, ...}`).
pub type SyncCounts = BTreeMap<String, u64>;

/// Which counter of a [`SyncResponse`] signals success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncCounter {
    /// `added`, for additions and ratings
    Added,
    /// `deleted`, for removals
    Deleted,
}

impl SyncCounter {
    fn key(&self) -> &'static str {
        match self {
            SyncCounter::Added => "added",
            SyncCounter::Deleted => "deleted",
        }
    }
}

/// Response body of watchlist, history and rating mutations.
///
/// The API signals success through per-type counts, not a boolean, so a
/// `200 OK` with `{"added": {"movies": 0}}` is a failed mutation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SyncResponse {
    /// Items added
    pub added: Option<SyncCounts>,
    /// Items removed
    pub deleted: Option<SyncCounts>,
    /// Items that were already present
    pub existing: Option<SyncCounts>,
    /// Items the API could not match, echoed back
    pub not_found: Option<Value>,
}

impl SyncResponse {
    /// Decode a mutation response.
    pub fn from_json(data: &Value) -> Result<Self> {
        SyncResponse::deserialize(data)
            .map_err(|e| Error::Decode(format!("invalid sync response: {}", e)))
    }

    /// Read one counter for one media type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the counter map is absent. A missing
    /// media type inside a present map counts as zero.
    pub fn count(&self, counter: SyncCounter, media_type: MediaType) -> Result<u64> {
        let counts = match counter {
            SyncCounter::Added => self.added.as_ref(),
            SyncCounter::Deleted => self.deleted.as_ref(),
        }
        .ok_or_else(|| Error::Decode(format!("sync response has no `{}` map", counter.key())))?;

        Ok(counts.get(media_type.as_str()).copied().unwrap_or(0))
    }
}

/// One entry of the user's watched history.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchedEntry {
    /// The watched movie or show, flagged `watched`
    pub media: Media,
    /// Number of plays
    pub plays: u64,
    /// Most recent play
    pub last_watched_at: DateTime<Utc>,
}

impl WatchedEntry {
    /// Decode an entry of `/sync/watched/{type}`. Requires the media object,
    /// `plays` and a parseable `last_watched_at`.
    pub fn from_json(media_type: MediaType, entry: &Value) -> Option<Self> {
        let mut media = Media::from_typed(media_type, entry.get(media_type.single())?)?;
        let plays = entry.get("plays")?.as_u64()?;
        let last_watched_at = parse_datetime(entry.get("last_watched_at")?.as_str()?)?;

        if let Some(item) = media.as_watchable_mut() {
            item.set_watched(true);
        }

        Some(WatchedEntry {
            media,
            plays,
            last_watched_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sync_counts() {
        let response = SyncResponse::from_json(&json!({
            "added": {"movies": 1, "shows": 0, "episodes": 0},
            "existing": {"movies": 0},
            "not_found": {"movies": []}
        }))
        .unwrap();

        assert_eq!(response.count(SyncCounter::Added, MediaType::Movies).unwrap(), 1);
        assert_eq!(response.count(SyncCounter::Added, MediaType::Shows).unwrap(), 0);
        assert_eq!(response.count(SyncCounter::Added, MediaType::People).unwrap(), 0);
        assert!(matches!(
            response.count(SyncCounter::Deleted, MediaType::Movies),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_sync_response_rejects_garbage() {
        assert!(SyncResponse::from_json(&json!({"added": "lots"})).is_err());
    }

    #[test]
    fn test_watched_entry() {
        let entry = WatchedEntry::from_json(
            MediaType::Movies,
            &json!({
                "plays": 3,
                "last_watched_at": "2015-03-21T19:03:58.000Z",
                "movie": {"title": "Batman Begins", "ids": {"trakt": 1}}
            }),
        )
        .unwrap();

        assert_eq!(entry.plays, 3);
        assert!(entry.media.as_watchable().unwrap().is_watched());
        assert!(WatchedEntry::from_json(MediaType::Movies, &json!({"plays": 1})).is_none());
    }
}
