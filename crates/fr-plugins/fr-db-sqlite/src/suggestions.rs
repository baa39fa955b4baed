use std::collections::HashSet;

use async_trait::async_trait;
use fr_core::models::{Suggestion, SuggestionCount, SuggestionKind};
use fr_core::traits::SuggestionRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::{blob_to_uuid, uuid_to_blob, SqliteStore};

const SUGGESTION_COLUMNS: &str = "SELECT id, freet_id, suggestor_id, kind, value FROM suggestions";

pub(crate) const SUGGESTION_COLUMNS_IN: &str =
    "SELECT id, freet_id, suggestor_id, kind, value FROM suggestions WHERE freet_id IN";

pub(crate) fn suggestion_from_row(row: &SqliteRow) -> anyhow::Result<Suggestion> {
    Ok(Suggestion {
        id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice())?,
        freet_id: blob_to_uuid(row.try_get::<Vec<u8>, _>("freet_id")?.as_slice())?,
        suggestor_id: blob_to_uuid(row.try_get::<Vec<u8>, _>("suggestor_id")?.as_slice())?,
        kind: row.try_get::<String, _>("kind")?.parse()?,
        value: row.try_get("value")?,
    })
}

#[async_trait]
impl SuggestionRepo for SqliteStore {
    async fn add(
        &self,
        freet_id: Uuid,
        suggestor_id: Uuid,
        kind: SuggestionKind,
        value: &str,
    ) -> anyhow::Result<Suggestion> {
        let suggestion = Suggestion {
            id: Uuid::now_v7(),
            freet_id,
            suggestor_id,
            kind,
            value: value.to_string(),
        };

        sqlx::query("INSERT INTO suggestions (id, freet_id, suggestor_id, kind, value) VALUES (?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(suggestion.id))
            .bind(uuid_to_blob(freet_id))
            .bind(uuid_to_blob(suggestor_id))
            .bind(kind.as_str())
            .bind(&suggestion.value)
            .execute(&self.pool)
            .await?;
        Ok(suggestion)
    }

    async fn find_one(
        &self,
        value: &str,
        kind: SuggestionKind,
        suggestor_id: Uuid,
        freet_id: Uuid,
    ) -> anyhow::Result<Option<Suggestion>> {
        let row = sqlx::query(&format!(
            "{SUGGESTION_COLUMNS} WHERE value = ? AND kind = ? AND suggestor_id = ? AND freet_id = ?"
        ))
        .bind(value)
        .bind(kind.as_str())
        .bind(uuid_to_blob(suggestor_id))
        .bind(uuid_to_blob(freet_id))
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(suggestion_from_row).transpose()
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Suggestion>> {
        let row = sqlx::query(&format!("{SUGGESTION_COLUMNS} WHERE id = ?"))
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(suggestion_from_row).transpose()
    }

    async fn find_by_suggestor(
        &self,
        suggestor_id: Uuid,
        freet_id: Uuid,
    ) -> anyhow::Result<Vec<Suggestion>> {
        let rows = sqlx::query(&format!(
            "{SUGGESTION_COLUMNS} WHERE suggestor_id = ? AND freet_id = ? ORDER BY id"
        ))
        .bind(uuid_to_blob(suggestor_id))
        .bind(uuid_to_blob(freet_id))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(suggestion_from_row).collect()
    }

    async fn popular_by_kind(
        &self,
        kind: SuggestionKind,
        freet_id: Uuid,
    ) -> anyhow::Result<Vec<SuggestionCount>> {
        let rows = sqlx::query(
            "SELECT value, COUNT(*) AS count FROM suggestions \
             WHERE kind = ? AND freet_id = ? \
             GROUP BY value ORDER BY count DESC, value ASC",
        )
        .bind(kind.as_str())
        .bind(uuid_to_blob(freet_id))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(SuggestionCount {
                    value: row.try_get("value")?,
                    kind,
                    count: row.try_get("count")?,
                })
            })
            .collect()
    }

    async fn post_ids_with(
        &self,
        value: &str,
        kind: SuggestionKind,
    ) -> anyhow::Result<HashSet<Uuid>> {
        let rows = sqlx::query("SELECT DISTINCT freet_id FROM suggestions WHERE value = ? AND kind = ?")
            .bind(value)
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| blob_to_uuid(row.try_get::<Vec<u8>, _>("freet_id")?.as_slice()))
            .collect()
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let deleted = sqlx::query("DELETE FROM suggestions WHERE id = ?")
            .bind(uuid_to_blob(id))
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
    async fn same_suggestion_twice_is_rejected() {
        let repo = store().await;
        let freet = repo.create(Uuid::now_v7(), "x").await.unwrap();
        let me = Uuid::now_v7();

        SuggestionRepo::add(&repo, freet.id, me, SuggestionKind::Tag, "cats").await.unwrap();
        assert!(SuggestionRepo::add(&repo, freet.id, me, SuggestionKind::Tag, "cats").await.is_err());
        // Same value under another kind, or by someone else, is a new suggestion.
        SuggestionRepo::add(&repo, freet.id, me, SuggestionKind::Intent, "cats").await.unwrap();
        SuggestionRepo::add(&repo, freet.id, Uuid::now_v7(), SuggestionKind::Tag, "cats").await.unwrap();

        let found = SuggestionRepo::find_one(&repo, "cats", SuggestionKind::Tag, me, freet.id)
            .await
            .unwrap();
        assert!(found.is_some());
        assert_eq!(repo.find_by_suggestor(me, freet.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn popularity_counts_per_kind() {
        let repo = store().await;
        let freet = repo.create(Uuid::now_v7(), "x").await.unwrap();
        for value in ["cats", "cats", "cats", "dogs"] {
            SuggestionRepo::add(&repo, freet.id, Uuid::now_v7(), SuggestionKind::Tag, value)
                .await
                .unwrap();
        }
        SuggestionRepo::add(&repo, freet.id, Uuid::now_v7(), SuggestionKind::Intent, "Joke")
            .await
            .unwrap();

        let tags = repo.popular_by_kind(SuggestionKind::Tag, freet.id).await.unwrap();
        assert_eq!(tags.iter().map(|c| (c.value.as_str(), c.count)).collect::<Vec<_>>(), vec![("cats", 3), ("dogs", 1)]);
        assert_eq!(repo.popular_by_kind(SuggestionKind::Intent, freet.id).await.unwrap().len(), 1);
        assert!(repo.popular_by_kind(SuggestionKind::Supplement, freet.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn freets_are_found_by_suggestion() {
        let repo = store().await;
        let a = repo.create(Uuid::now_v7(), "a").await.unwrap();
        let b = repo.create(Uuid::now_v7(), "b").await.unwrap();
        let s = SuggestionRepo::add(&repo, a.id, Uuid::now_v7(), SuggestionKind::Tag, "wow").await.unwrap();
        SuggestionRepo::add(&repo, a.id, Uuid::now_v7(), SuggestionKind::Tag, "wow").await.unwrap();
        SuggestionRepo::add(&repo, b.id, Uuid::now_v7(), SuggestionKind::Intent, "wow").await.unwrap();

        assert_eq!(repo.post_ids_with("wow", SuggestionKind::Tag).await.unwrap(), HashSet::from([a.id]));
        assert!(SuggestionRepo::delete(&repo, s.id).await.unwrap());
        assert!(SuggestionRepo::get(&repo, s.id).await.unwrap().is_none());
    }
}
