use std::collections::HashSet;

use async_trait::async_trait;
use fr_core::models::{Intent, IntentKind};
use fr_core::traits::IntentRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::{blob_to_uuid, uuid_to_blob, SqliteStore};

pub(crate) const INTENT_COLUMNS_IN: &str =
    "SELECT freet_id, kind, supplement FROM intents WHERE freet_id IN";

pub(crate) fn intent_from_row(row: &SqliteRow) -> anyhow::Result<Intent> {
    Ok(Intent {
        freet_id: blob_to_uuid(row.try_get::<Vec<u8>, _>("freet_id")?.as_slice())?,
        kind: row.try_get::<String, _>("kind")?.parse()?,
        supplement: row.try_get("supplement")?,
    })
}

#[async_trait]
impl IntentRepo for SqliteStore {
    async fn add(
        &self,
        freet_id: Uuid,
        kind: IntentKind,
        supplement: Option<String>,
    ) -> anyhow::Result<Intent> {
        sqlx::query("INSERT INTO intents (freet_id, kind, supplement) VALUES (?, ?, ?)")
            .bind(uuid_to_blob(freet_id))
            .bind(kind.as_str())
            .bind(supplement.as_deref())
            .execute(&self.pool)
            .await?;
        Ok(Intent { freet_id, kind, supplement })
    }

    async fn get(&self, freet_id: Uuid) -> anyhow::Result<Option<Intent>> {
        let row = sqlx::query("SELECT freet_id, kind, supplement FROM intents WHERE freet_id = ?")
            .bind(uuid_to_blob(freet_id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(intent_from_row).transpose()
    }

    async fn post_ids_by_kind(&self, kind: IntentKind) -> anyhow::Result<HashSet<Uuid>> {
        let rows = sqlx::query("SELECT freet_id FROM intents WHERE kind = ?")
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| blob_to_uuid(row.try_get::<Vec<u8>, _>("freet_id")?.as_slice()))
            .collect()
    }

    async fn delete(&self, freet_id: Uuid) -> anyhow::Result<bool> {
        let deleted = sqlx::query("DELETE FROM intents WHERE freet_id = ?")
            .bind(uuid_to_blob(freet_id))
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use fr_core::traits::FreetRepo;

    use super::*;
    use crate::testing::store;

    #[tokio::test]
    async fn intents_are_found_by_kind() {
        let repo = store().await;
        let joke = repo.create(Uuid::now_v7(), "knock knock").await.unwrap();
        let news = repo.create(Uuid::now_v7(), "breaking").await.unwrap();
        IntentRepo::add(&repo, joke.id, IntentKind::Joke, None).await.unwrap();
        IntentRepo::add(&repo, news.id, IntentKind::Inform, Some("example.com/story".into()))
            .await
            .unwrap();

        assert_eq!(repo.post_ids_by_kind(IntentKind::Joke).await.unwrap(), HashSet::from([joke.id]));
        assert!(repo.post_ids_by_kind(IntentKind::Share).await.unwrap().is_empty());

        let intent = IntentRepo::get(&repo, news.id).await.unwrap().unwrap();
        assert_eq!(intent.kind, IntentKind::Inform);
        assert_eq!(intent.supplement.as_deref(), Some("example.com/story"));
    }

    #[tokio::test]
    async fn one_intent_per_freet() {
        let repo = store().await;
        let freet = repo.create(Uuid::now_v7(), "hm").await.unwrap();
        IntentRepo::add(&repo, freet.id, IntentKind::Share, None).await.unwrap();

        assert!(IntentRepo::add(&repo, freet.id, IntentKind::Joke, None).await.is_err());
        assert!(IntentRepo::delete(&repo, freet.id).await.unwrap());
        assert!(!IntentRepo::delete(&repo, freet.id).await.unwrap());
        assert!(IntentRepo::get(&repo, freet.id).await.unwrap().is_none());
    }
}
