//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to be used by the binary.
//! "Nothing matched" is always an empty value, never an `Err`.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Filter, FilterCriteria, Freet, Intent, IntentKind, LabelCount, Suggestion, SuggestionCount,
    SuggestionKind, Tag,
};

/// Persistence contract for freets. Every returned `Freet` is populated
/// with its intent, tags and suggestions.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait FreetRepo: Send + Sync {
    async fn create(&self, author_id: Uuid, content: &str) -> anyhow::Result<Freet>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Freet>>;
    /// Most recently modified first.
    async fn list_all(&self) -> anyhow::Result<Vec<Freet>>;
    async fn fetch_by_author(&self, author_id: Uuid) -> anyhow::Result<Vec<Freet>>;
    /// Ids only; nothing is populated.
    async fn post_ids_by_author(&self, author_id: Uuid) -> anyhow::Result<HashSet<Uuid>>;
    /// Unknown ids are skipped. No ordering guarantee.
    async fn fetch_by_ids(&self, ids: &BTreeSet<Uuid>) -> anyhow::Result<Vec<Freet>>;
    async fn update_content(&self, id: Uuid, content: &str) -> anyhow::Result<Option<Freet>>;
    /// Removes the freet together with its tags, intent and suggestions.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TagRepo: Send + Sync {
    async fn add_all(&self, freet_id: Uuid, labels: &[String]) -> anyhow::Result<Vec<Tag>>;
    async fn find_one(&self, label: &str, freet_id: Uuid) -> anyhow::Result<Option<Tag>>;
    /// Labels starting with `prefix`, most used first.
    async fn labels_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<LabelCount>>;
    /// Exact, case-sensitive label match.
    async fn post_ids_by_label(&self, label: &str) -> anyhow::Result<HashSet<Uuid>>;
    async fn delete_for_freet(&self, freet_id: Uuid) -> anyhow::Result<u64>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IntentRepo: Send + Sync {
    async fn add(
        &self,
        freet_id: Uuid,
        kind: IntentKind,
        supplement: Option<String>,
    ) -> anyhow::Result<Intent>;
    async fn get(&self, freet_id: Uuid) -> anyhow::Result<Option<Intent>>;
    async fn post_ids_by_kind(&self, kind: IntentKind) -> anyhow::Result<HashSet<Uuid>>;
    async fn delete(&self, freet_id: Uuid) -> anyhow::Result<bool>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SuggestionRepo: Send + Sync {
    async fn add(
        &self,
        freet_id: Uuid,
        suggestor_id: Uuid,
        kind: SuggestionKind,
        value: &str,
    ) -> anyhow::Result<Suggestion>;
    async fn find_one(
        &self,
        value: &str,
        kind: SuggestionKind,
        suggestor_id: Uuid,
        freet_id: Uuid,
    ) -> anyhow::Result<Option<Suggestion>>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Suggestion>>;
    async fn find_by_suggestor(
        &self,
        suggestor_id: Uuid,
        freet_id: Uuid,
    ) -> anyhow::Result<Vec<Suggestion>>;
    /// Distinct values of `kind` proposed for the freet, most proposed first.
    async fn popular_by_kind(
        &self,
        kind: SuggestionKind,
        freet_id: Uuid,
    ) -> anyhow::Result<Vec<SuggestionCount>>;
    async fn post_ids_with(&self, value: &str, kind: SuggestionKind)
        -> anyhow::Result<HashSet<Uuid>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

/// Filter definitions. Performs no validation and no access control;
/// callers do both against the returned `owner_id`/`is_public`.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait FilterRepo: Send + Sync {
    async fn create(
        &self,
        name: &str,
        owner_id: Uuid,
        is_public: bool,
        criteria: FilterCriteria,
    ) -> anyhow::Result<Filter>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Filter>>;
    /// Public filters matching the prefix, followed by the requester's
    /// private ones. The two groups are disjoint.
    async fn find_by_name_prefix(
        &self,
        prefix: &str,
        requester_id: Uuid,
    ) -> anyhow::Result<Vec<Filter>>;
    async fn find_by_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<Filter>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

/// The full set of ports, shared by the API layer and the aggregator.
#[derive(Clone)]
pub struct Repositories {
    pub freets: Arc<dyn FreetRepo>,
    pub tags: Arc<dyn TagRepo>,
    pub intents: Arc<dyn IntentRepo>,
    pub suggestions: Arc<dyn SuggestionRepo>,
    pub filters: Arc<dyn FilterRepo>,
}

impl Repositories {
    /// Uses one backend for every port.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: FreetRepo + TagRepo + IntentRepo + SuggestionRepo + FilterRepo + 'static,
    {
        Self {
            freets: store.clone(),
            tags: store.clone(),
            intents: store.clone(),
            suggestions: store.clone(),
            filters: store,
        }
    }
}
