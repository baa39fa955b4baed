use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use fr_core::models::{Freet, Intent, Suggestion, Tag};
use fr_core::traits::FreetRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::{blob_to_uuid, intents, suggestions, tags, uuid_to_blob, SqliteStore};

const FREET_COLUMNS: &str = "SELECT id, author_id, content, created_at, modified_at FROM freets";

fn freet_from_row(row: &SqliteRow) -> anyhow::Result<Freet> {
    Ok(Freet {
        id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice())?,
        author_id: blob_to_uuid(row.try_get::<Vec<u8>, _>("author_id")?.as_slice())?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        modified_at: row.try_get("modified_at")?,
        intent: None,
        tags: Vec::new(),
        suggestions: Vec::new(),
    })
}

impl SqliteStore {
    /// Attaches intents, tags and suggestions to a batch of freets,
    /// one query per relation.
    async fn populate(&self, mut freets: Vec<Freet>) -> anyhow::Result<Vec<Freet>> {
        if freets.is_empty() {
            return Ok(freets);
        }
        let ids: Vec<Uuid> = freets.iter().map(|f| f.id).collect();

        let mut intents: HashMap<Uuid, Intent> = self
            .fetch_in(intents::INTENT_COLUMNS_IN, &ids, "")
            .await?
            .iter()
            .map(|row| intents::intent_from_row(row).map(|i| (i.freet_id, i)))
            .collect::<anyhow::Result<_>>()?;

        // Chunks split by freet, so per-freet ordering survives the merge.
        let mut tags: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in self.fetch_in(tags::TAG_COLUMNS_IN, &ids, " ORDER BY label").await? {
            let tag = tags::tag_from_row(&row)?;
            tags.entry(tag.freet_id).or_default().push(tag);
        }

        let mut suggestions: HashMap<Uuid, Vec<Suggestion>> = HashMap::new();
        for row in self
            .fetch_in(suggestions::SUGGESTION_COLUMNS_IN, &ids, " ORDER BY id")
            .await?
        {
            let suggestion = suggestions::suggestion_from_row(&row)?;
            suggestions.entry(suggestion.freet_id).or_default().push(suggestion);
        }

        for freet in &mut freets {
            freet.intent = intents.remove(&freet.id);
            freet.tags = tags.remove(&freet.id).unwrap_or_default();
            freet.suggestions = suggestions.remove(&freet.id).unwrap_or_default();
        }
        Ok(freets)
    }

    async fn fetch_populated(&self, rows: Vec<SqliteRow>) -> anyhow::Result<Vec<Freet>> {
        let freets = rows
            .iter()
            .map(freet_from_row)
            .collect::<anyhow::Result<Vec<_>>>()?;
        self.populate(freets).await
    }
}

#[async_trait]
impl FreetRepo for SqliteStore {
    async fn create(&self, author_id: Uuid, content: &str) -> anyhow::Result<Freet> {
        let now = Utc::now();
        let freet = Freet {
            id: Uuid::now_v7(),
            author_id,
            content: content.to_string(),
            created_at: now,
            modified_at: now,
            intent: None,
            tags: Vec::new(),
            suggestions: Vec::new(),
        };

        sqlx::query("INSERT INTO freets (id, author_id, content, created_at, modified_at) VALUES (?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(freet.id))
            .bind(uuid_to_blob(freet.author_id))
            .bind(&freet.content)
            .bind(freet.created_at)
            .bind(freet.modified_at)
            .execute(&self.pool)
            .await?;
        Ok(freet)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Freet>> {
        let row = sqlx::query(&format!("{FREET_COLUMNS} WHERE id = ?"))
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.fetch_populated(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Freet>> {
        let rows = sqlx::query(&format!("{FREET_COLUMNS} ORDER BY modified_at DESC, id DESC"))
            .fetch_all(&self.pool)
            .await?;
        self.fetch_populated(rows).await
    }

    async fn fetch_by_author(&self, author_id: Uuid) -> anyhow::Result<Vec<Freet>> {
        let rows = sqlx::query(&format!("{FREET_COLUMNS} WHERE author_id = ? ORDER BY id DESC"))
            .bind(uuid_to_blob(author_id))
            .fetch_all(&self.pool)
            .await?;
        self.fetch_populated(rows).await
    }

    async fn post_ids_by_author(&self, author_id: Uuid) -> anyhow::Result<HashSet<Uuid>> {
        let rows = sqlx::query("SELECT id FROM freets WHERE author_id = ?")
            .bind(uuid_to_blob(author_id))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice()))
            .collect()
    }

    async fn fetch_by_ids(&self, ids: &BTreeSet<Uuid>) -> anyhow::Result<Vec<Freet>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().copied().collect();
        let rows = self
            .fetch_in(&format!("{FREET_COLUMNS} WHERE id IN"), &ids, "")
            .await?;
        self.fetch_populated(rows).await
    }

    async fn update_content(&self, id: Uuid, content: &str) -> anyhow::Result<Option<Freet>> {
        let updated = sqlx::query("UPDATE freets SET content = ?, modified_at = ? WHERE id = ?")
            .bind(content)
            .bind(Utc::now())
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        FreetRepo::get(self, id).await
    }

    /// Atomic cascade: relations first, then the freet itself.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        for table in ["tags", "intents", "suggestions"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE freet_id = ?"))
                .bind(uuid_to_blob(id))
                .execute(&mut *tx)
                .await?;
        }
        let deleted = sqlx::query("DELETE FROM freets WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(deleted.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use fr_core::models::{IntentKind, SuggestionKind};
    use fr_core::traits::{IntentRepo, SuggestionRepo, TagRepo};

    use super::*;
    use crate::testing::store;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let repo = store().await;
        let author = Uuid::now_v7();

        let created = repo.create(author, "first!").await.unwrap();
        let fetched = FreetRepo::get(&repo, created.id).await.unwrap().unwrap();

        assert_eq!(fetched.author_id, author);
        assert_eq!(fetched.content, "first!");
        assert!(fetched.intent.is_none());
        assert!(FreetRepo::get(&repo, Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reads_are_populated_with_relations() {
        let repo = store().await;
        let author = Uuid::now_v7();
        let freet = repo.create(author, "cats are great").await.unwrap();

        repo.add_all(freet.id, &["cats".to_string(), "pets".to_string()]).await.unwrap();
        IntentRepo::add(&repo, freet.id, IntentKind::Share, None).await.unwrap();
        SuggestionRepo::add(&repo, freet.id, Uuid::now_v7(), SuggestionKind::Tag, "animals")
            .await
            .unwrap();

        let fetched = repo.fetch_by_author(author).await.unwrap().pop().unwrap();
        assert_eq!(fetched.intent.map(|i| i.kind), Some(IntentKind::Share));
        let labels: Vec<_> = fetched.tags.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["cats", "pets"]);
        assert_eq!(fetched.suggestions.len(), 1);
        assert_eq!(fetched.suggestions[0].value, "animals");
    }

    #[tokio::test]
    async fn fetch_by_ids_skips_unknown_ids() {
        let repo = store().await;
        let a = repo.create(Uuid::now_v7(), "a").await.unwrap();
        let b = repo.create(Uuid::now_v7(), "b").await.unwrap();

        let ids: BTreeSet<Uuid> = [a.id, b.id, Uuid::now_v7()].into();
        let mut fetched: Vec<Uuid> = repo.fetch_by_ids(&ids).await.unwrap().iter().map(|f| f.id).collect();
        fetched.sort();

        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(fetched, expected);
        assert!(repo.fetch_by_ids(&BTreeSet::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn author_ids_skip_population() {
        let repo = store().await;
        let author = Uuid::now_v7();
        let a = repo.create(author, "a").await.unwrap();
        let b = repo.create(author, "b").await.unwrap();
        repo.create(Uuid::now_v7(), "c").await.unwrap();

        assert_eq!(repo.post_ids_by_author(author).await.unwrap(), HashSet::from([a.id, b.id]));
        assert!(repo.post_ids_by_author(Uuid::now_v7()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reads_span_more_freets_than_sqlite_binds() {
        const BULK: i64 = 33_000;
        let repo = store().await;
        let author = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < ?1) \
             INSERT INTO freets (id, author_id, content, created_at, modified_at) \
             SELECT randomblob(16), ?2, 'bulk ' || i, ?3, ?3 FROM n",
        )
        .bind(BULK)
        .bind(uuid_to_blob(author))
        .bind(now)
        .execute(&repo.pool)
        .await
        .unwrap();
        let tagged = repo.create(author, "tagged").await.unwrap();
        repo.add_all(tagged.id, &["last".to_string()]).await.unwrap();
        let total = BULK as usize + 1;

        let by_author = repo.fetch_by_author(author).await.unwrap();
        assert_eq!(by_author.len(), total);
        assert_eq!(by_author.iter().filter(|f| !f.tags.is_empty()).count(), 1);
        assert_eq!(repo.list_all().await.unwrap().len(), total);

        let ids: BTreeSet<Uuid> = repo.post_ids_by_author(author).await.unwrap().into_iter().collect();
        assert_eq!(ids.len(), total);
        let fetched = repo.fetch_by_ids(&ids).await.unwrap();
        assert_eq!(fetched.len(), total);
        let labelled = fetched.iter().find(|f| f.id == tagged.id).unwrap();
        assert_eq!(labelled.tags[0].label, "last");
    }

    #[tokio::test]
    async fn update_bumps_modification_time() {
        let repo = store().await;
        let created = repo.create(Uuid::now_v7(), "draft").await.unwrap();
        let freet = FreetRepo::get(&repo, created.id).await.unwrap().unwrap();

        let updated = repo.update_content(freet.id, "final").await.unwrap().unwrap();
        assert_eq!(updated.content, "final");
        assert!(updated.modified_at >= freet.modified_at);
        assert_eq!(updated.created_at, freet.created_at);
        assert!(repo.update_content(Uuid::now_v7(), "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_cascades_relations() {
        let repo = store().await;
        let freet = repo.create(Uuid::now_v7(), "bye").await.unwrap();
        repo.add_all(freet.id, &["gone".to_string()]).await.unwrap();
        IntentRepo::add(&repo, freet.id, IntentKind::Joke, None).await.unwrap();

        assert!(FreetRepo::delete(&repo, freet.id).await.unwrap());
        assert!(!FreetRepo::delete(&repo, freet.id).await.unwrap());
        assert!(repo.post_ids_by_label("gone").await.unwrap().is_empty());
        assert!(repo.post_ids_by_kind(IntentKind::Joke).await.unwrap().is_empty());
    }
}
