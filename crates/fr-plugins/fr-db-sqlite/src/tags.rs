use std::collections::HashSet;

use async_trait::async_trait;
use fr_core::models::{LabelCount, Tag};
use fr_core::traits::TagRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::{blob_to_uuid, uuid_to_blob, SqliteStore};

pub(crate) const TAG_COLUMNS_IN: &str = "SELECT id, freet_id, label FROM tags WHERE freet_id IN";

pub(crate) fn tag_from_row(row: &SqliteRow) -> anyhow::Result<Tag> {
    Ok(Tag {
        id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice())?,
        freet_id: blob_to_uuid(row.try_get::<Vec<u8>, _>("freet_id")?.as_slice())?,
        label: row.try_get("label")?,
    })
}

#[async_trait]
impl TagRepo for SqliteStore {
    async fn add_all(&self, freet_id: Uuid, labels: &[String]) -> anyhow::Result<Vec<Tag>> {
        let mut tx = self.pool.begin().await?;
        let mut tags = Vec::with_capacity(labels.len());

        for label in labels {
            let tag = Tag { id: Uuid::now_v7(), freet_id, label: label.clone() };
            sqlx::query("INSERT INTO tags (id, freet_id, label) VALUES (?, ?, ?)")
                .bind(uuid_to_blob(tag.id))
                .bind(uuid_to_blob(tag.freet_id))
                .bind(&tag.label)
                .execute(&mut *tx)
                .await?;
            tags.push(tag);
        }

        tx.commit().await?;
        Ok(tags)
    }

    async fn find_one(&self, label: &str, freet_id: Uuid) -> anyhow::Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, freet_id, label FROM tags WHERE label = ? AND freet_id = ?")
            .bind(label)
            .bind(uuid_to_blob(freet_id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(tag_from_row).transpose()
    }

    async fn labels_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<LabelCount>> {
        let rows = sqlx::query(
            "SELECT label, COUNT(*) AS count FROM tags \
             WHERE substr(label, 1, length(?1)) = ?1 \
             GROUP BY label ORDER BY count DESC, label ASC",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(LabelCount {
                    label: row.try_get("label")?,
                    count: row.try_get("count")?,
                })
            })
            .collect()
    }

    async fn post_ids_by_label(&self, label: &str) -> anyhow::Result<HashSet<Uuid>> {
        let rows = sqlx::query("SELECT DISTINCT freet_id FROM tags WHERE label = ?")
            .bind(label)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| blob_to_uuid(row.try_get::<Vec<u8>, _>("freet_id")?.as_slice()))
            .collect()
    }

    async fn delete_for_freet(&self, freet_id: Uuid) -> anyhow::Result<u64> {
        let deleted = sqlx::query("DELETE FROM tags WHERE freet_id = ?")
            .bind(uuid_to_blob(freet_id))
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use fr_core::traits::FreetRepo;

    use super::*;
    use crate::testing::store;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|l| l.to_string()).collect()
    }

    #[tokio::test]
    async fn label_lookup_is_exact_and_case_sensitive() {
        let repo = store().await;
        let a = repo.create(Uuid::now_v7(), "a").await.unwrap();
        let b = repo.create(Uuid::now_v7(), "b").await.unwrap();
        repo.add_all(a.id, &labels(&["funny"])).await.unwrap();
        repo.add_all(b.id, &labels(&["funny", "Funny", "funnybone"])).await.unwrap();

        let ids = repo.post_ids_by_label("funny").await.unwrap();
        assert_eq!(ids, HashSet::from([a.id, b.id]));
        assert_eq!(repo.post_ids_by_label("Funny").await.unwrap(), HashSet::from([b.id]));
        assert!(repo.post_ids_by_label("fun").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn popular_labels_are_counted_by_prefix() {
        let repo = store().await;
        let a = repo.create(Uuid::now_v7(), "a").await.unwrap();
        let b = repo.create(Uuid::now_v7(), "b").await.unwrap();
        repo.add_all(a.id, &labels(&["cats", "catnip", "dogs"])).await.unwrap();
        repo.add_all(b.id, &labels(&["cats"])).await.unwrap();

        let popular = repo.labels_by_prefix("cat").await.unwrap();
        assert_eq!(
            popular,
            vec![
                LabelCount { label: "cats".into(), count: 2 },
                LabelCount { label: "catnip".into(), count: 1 },
            ]
        );
        assert_eq!(repo.labels_by_prefix("").await.unwrap().len(), 3);
        assert!(repo.labels_by_prefix("%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_one_and_clear() {
        let repo = store().await;
        let freet = repo.create(Uuid::now_v7(), "x").await.unwrap();
        repo.add_all(freet.id, &labels(&["one", "two"])).await.unwrap();

        assert!(repo.find_one("one", freet.id).await.unwrap().is_some());
        assert!(repo.find_one("three", freet.id).await.unwrap().is_none());
        assert_eq!(repo.delete_for_freet(freet.id).await.unwrap(), 2);
        assert!(repo.find_one("one", freet.id).await.unwrap().is_none());
    }
}
