//! # Domain Models
//!
//! These structs represent the core entities of Fritter.
//! We use UUID v7 for time-ordered, globally unique identification.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// A single user-authored short text entry (a "freet").
///
/// Relations are held by back-reference in storage and populated by the
/// `FreetRepo` on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Freet {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

/// The author-declared purpose of a freet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntentKind {
    Inform,
    Joke,
    Share,
}

impl IntentKind {
    pub const ALL: [IntentKind; 3] = [IntentKind::Inform, IntentKind::Joke, IntentKind::Share];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Inform => "Inform",
            IntentKind::Joke => "Joke",
            IntentKind::Share => "Share",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentKind {
    type Err = UnknownVariant;

    /// Exact, case-sensitive match on the variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// One intent per freet. `supplement` carries a source link and is
/// required for `Inform`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub freet_id: Uuid,
    pub kind: IntentKind,
    pub supplement: Option<String>,
}

/// A free-text label attached to a freet. Labels are not unique across freets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub freet_id: Uuid,
    pub label: String,
}

/// What a suggestion proposes for a freet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuggestionKind {
    Tag,
    Intent,
    Supplement,
}

impl SuggestionKind {
    pub const ALL: [SuggestionKind; 3] = [
        SuggestionKind::Tag,
        SuggestionKind::Intent,
        SuggestionKind::Supplement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::Tag => "Tag",
            SuggestionKind::Intent => "Intent",
            SuggestionKind::Supplement => "Supplement",
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuggestionKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SuggestionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Returned when a string names no variant of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not a known variant")]
pub struct UnknownVariant(pub String);

/// A non-binding proposal by another user. Never applied to the freet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: Uuid,
    pub freet_id: Uuid,
    pub suggestor_id: Uuid,
    pub kind: SuggestionKind,
    pub value: String,
}

/// The three OR-combined criterion slots of a filter.
///
/// On the wire this is the positional triple `[[authors], [tags], [intents]]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub authors: Vec<Uuid>,
    pub tags: Vec<String>,
    pub intents: Vec<IntentKind>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty() && self.tags.is_empty() && self.intents.is_empty()
    }
}

impl Serialize for FilterCriteria {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let authors: Vec<String> = self.authors.iter().map(Uuid::to_string).collect();
        let intents: Vec<String> = self.intents.iter().map(|k| k.as_str().to_string()).collect();
        (authors, &self.tags, intents).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterCriteria {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let mut slots = Vec::<Vec<String>>::deserialize(deserializer)?;
        if slots.len() > 3 {
            return Err(D::Error::invalid_length(slots.len(), &"at most 3 criterion lists"));
        }
        slots.resize_with(3, Vec::new);
        let intents = slots.pop().unwrap_or_default();
        let tags = slots.pop().unwrap_or_default();
        let authors = slots.pop().unwrap_or_default();

        Ok(FilterCriteria {
            authors: authors
                .iter()
                .map(|a| Uuid::parse_str(a).map_err(D::Error::custom))
                .collect::<Result<_, _>>()?,
            tags,
            intents: intents
                .iter()
                .map(|i| i.parse().map_err(D::Error::custom))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// A saved, named query that unions freets matching any of its criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "include")]
    pub criteria: FilterCriteria,
}

/// A tag label with the number of freets it labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

/// How many users proposed the same value of the same kind for one freet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionCount {
    pub value: String,
    pub kind: SuggestionKind,
    pub count: i64,
}
