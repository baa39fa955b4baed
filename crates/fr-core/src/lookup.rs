//! Relation lookups: criterion value -> set of matching freet ids.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::IntentKind;
use crate::traits::{FreetRepo, IntentRepo, TagRepo};

/// Read-only view over the three relation types a filter can name.
///
/// An unknown author, label or intent yields an empty set.
#[derive(Clone)]
pub struct RelationLookups {
    freets: Arc<dyn FreetRepo>,
    tags: Arc<dyn TagRepo>,
    intents: Arc<dyn IntentRepo>,
}

impl RelationLookups {
    pub fn new(
        freets: Arc<dyn FreetRepo>,
        tags: Arc<dyn TagRepo>,
        intents: Arc<dyn IntentRepo>,
    ) -> Self {
        Self { freets, tags, intents }
    }

    pub async fn by_author(&self, author_id: Uuid) -> Result<HashSet<Uuid>> {
        self.freets.post_ids_by_author(author_id).await.map_err(AppError::lookup)
    }

    pub async fn by_tag(&self, label: &str) -> Result<HashSet<Uuid>> {
        self.tags.post_ids_by_label(label).await.map_err(AppError::lookup)
    }

    pub async fn by_intent(&self, kind: IntentKind) -> Result<HashSet<Uuid>> {
        self.intents.post_ids_by_kind(kind).await.map_err(AppError::lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockFreetRepo, MockIntentRepo, MockTagRepo};

    fn lookups(freets: MockFreetRepo, tags: MockTagRepo, intents: MockIntentRepo) -> RelationLookups {
        RelationLookups::new(Arc::new(freets), Arc::new(tags), Arc::new(intents))
    }

    #[tokio::test]
    async fn author_lookup_returns_their_freet_ids() {
        let author = Uuid::now_v7();
        let expected: HashSet<Uuid> = [Uuid::now_v7(), Uuid::now_v7()].into();
        let returned = expected.clone();

        let mut freets = MockFreetRepo::new();
        freets
            .expect_post_ids_by_author()
            .withf(move |id| *id == author)
            .returning(move |_| Ok(returned.clone()));
        freets.expect_fetch_by_author().never();

        let ids = lookups(freets, MockTagRepo::new(), MockIntentRepo::new())
            .by_author(author)
            .await
            .unwrap();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn unknown_label_is_an_empty_set() {
        let mut tags = MockTagRepo::new();
        tags.expect_post_ids_by_label().returning(|_| Ok(HashSet::new()));

        let ids = lookups(MockFreetRepo::new(), tags, MockIntentRepo::new())
            .by_tag("nobody_uses_this")
            .await
            .unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn storage_errors_become_lookup_failures() {
        let mut intents = MockIntentRepo::new();
        intents
            .expect_post_ids_by_kind()
            .returning(|_| Err(anyhow::anyhow!("database is locked")));

        let err = lookups(MockFreetRepo::new(), MockTagRepo::new(), intents)
            .by_intent(IntentKind::Joke)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LookupFailure(msg) if msg.contains("locked")));
    }
}
