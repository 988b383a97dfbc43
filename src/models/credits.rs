//! Cast and crew listings.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{Media, MediaType, Person};

/// A person playing a character.
#[derive(Debug, Clone, PartialEq)]
pub struct CastMember {
    /// Character name
    pub character: String,
    /// The actor
    pub person: Person,
}

/// A person holding a crew job.
#[derive(Debug, Clone, PartialEq)]
pub struct CrewMember {
    /// Job title (e.g. `Executive Producer`)
    pub job: String,
    /// The crew member
    pub person: Person,
}

/// Cast and crew of a movie or show, crew grouped by department.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaPeople {
    /// Actors
    pub cast: Vec<CastMember>,
    /// Crew keyed by department (`production`, `directing`, ...)
    pub crew: BTreeMap<String, Vec<CrewMember>>,
}

impl MediaPeople {
    /// Decode a `/{type}/{id}/people` response. Unusable entries are skipped.
    pub fn from_json(data: &Value) -> Option<Self> {
        let object = data.as_object()?;

        let cast = entries(object.get("cast"))
            .filter_map(|entry| {
                Some(CastMember {
                    character: text(entry, "character"),
                    person: Person::from_json(entry.get("person")?)?,
                })
            })
            .collect();

        let crew = departments(object.get("crew"))
            .map(|(department, members)| {
                let members = entries(Some(members))
                    .filter_map(|entry| {
                        Some(CrewMember {
                            job: text(entry, "job"),
                            person: Person::from_json(entry.get("person")?)?,
                        })
                    })
                    .collect();
                (department.clone(), members)
            })
            .collect();

        Some(MediaPeople { cast, crew })
    }

    /// Crew members of one department.
    pub fn department(&self, name: &str) -> &[CrewMember] {
        self.crew.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

/// A character played in some movie or show.
#[derive(Debug, Clone, PartialEq)]
pub struct CastRole {
    /// Character name
    pub character: String,
    /// The movie or show
    pub media: Media,
}

/// A crew job held on some movie or show.
#[derive(Debug, Clone, PartialEq)]
pub struct CrewRole {
    /// Job title
    pub job: String,
    /// The movie or show
    pub media: Media,
}

/// A person's credits for one media type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonCredits {
    /// Acting roles
    pub cast: Vec<CastRole>,
    /// Crew jobs keyed by department
    pub crew: BTreeMap<String, Vec<CrewRole>>,
}

impl PersonCredits {
    /// Decode a `/people/{id}/{type}` response; each entry carries the
    /// media object under the singular type name.
    pub fn from_json(media_type: MediaType, data: &Value) -> Option<Self> {
        let object = data.as_object()?;
        let key = media_type.single();

        let cast = entries(object.get("cast"))
            .filter_map(|entry| {
                Some(CastRole {
                    character: text(entry, "character"),
                    media: Media::from_typed(media_type, entry.get(key)?)?,
                })
            })
            .collect();

        let crew = departments(object.get("crew"))
            .map(|(department, roles)| {
                let roles = entries(Some(roles))
                    .filter_map(|entry| {
                        Some(CrewRole {
                            job: text(entry, "job"),
                            media: Media::from_typed(media_type, entry.get(key)?)?,
                        })
                    })
                    .collect();
                (department.clone(), roles)
            })
            .collect();

        Some(PersonCredits { cast, crew })
    }
}

fn entries<'a>(value: Option<&'a Value>) -> impl Iterator<Item = &'a Value> + 'a {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flat_map(|items| items.iter())
}

fn departments<'a>(
    value: Option<&'a Value>,
) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
    value
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|map| map.iter())
}

fn text(entry: &Value, key: &str) -> String {
    entry
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
