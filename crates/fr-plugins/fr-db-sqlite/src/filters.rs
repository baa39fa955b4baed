use async_trait::async_trait;
use chrono::Utc;
use fr_core::models::{Filter, FilterCriteria};
use fr_core::traits::FilterRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::{blob_to_uuid, uuid_to_blob, SqliteStore};

const FILTER_COLUMNS: &str = "SELECT id, owner_id, name, is_public, created_at, criteria FROM filters";

fn filter_from_row(row: &SqliteRow) -> anyhow::Result<Filter> {
    Ok(Filter {
        id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice())?,
        owner_id: blob_to_uuid(row.try_get::<Vec<u8>, _>("owner_id")?.as_slice())?,
        name: row.try_get("name")?,
        is_public: row.try_get("is_public")?,
        created_at: row.try_get("created_at")?,
        criteria: serde_json::from_str(&row.try_get::<String, _>("criteria")?)?,
    })
}

#[async_trait]
impl FilterRepo for SqliteStore {
    async fn create(
        &self,
        name: &str,
        owner_id: Uuid,
        is_public: bool,
        criteria: FilterCriteria,
    ) -> anyhow::Result<Filter> {
        let filter = Filter {
            id: Uuid::now_v7(),
            owner_id,
            name: name.to_string(),
            is_public,
            created_at: Utc::now(),
            criteria,
        };

        sqlx::query("INSERT INTO filters (id, owner_id, name, is_public, created_at, criteria) VALUES (?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(filter.id))
            .bind(uuid_to_blob(filter.owner_id))
            .bind(&filter.name)
            .bind(filter.is_public)
            .bind(filter.created_at)
            .bind(serde_json::to_string(&filter.criteria)?)
            .execute(&self.pool)
            .await?;
        Ok(filter)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Filter>> {
        let row = sqlx::query(&format!("{FILTER_COLUMNS} WHERE id = ?"))
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(filter_from_row).transpose()
    }

    /// Two separate queries, concatenated: public first, then the
    /// requester's private filters.
    async fn find_by_name_prefix(
        &self,
        prefix: &str,
        requester_id: Uuid,
    ) -> anyhow::Result<Vec<Filter>> {
        let public = sqlx::query(&format!(
            "{FILTER_COLUMNS} WHERE is_public = 1 AND substr(name, 1, length(?1)) = ?1 ORDER BY id"
        ))
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;

        let private = sqlx::query(&format!(
            "{FILTER_COLUMNS} WHERE is_public = 0 AND owner_id = ?2 AND substr(name, 1, length(?1)) = ?1 ORDER BY id"
        ))
        .bind(prefix)
        .bind(uuid_to_blob(requester_id))
        .fetch_all(&self.pool)
        .await?;

        public.iter().chain(private.iter()).map(filter_from_row).collect()
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<Filter>> {
        let rows = sqlx::query(&format!("{FILTER_COLUMNS} WHERE owner_id = ? ORDER BY id"))
            .bind(uuid_to_blob(owner_id))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(filter_from_row).collect()
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let deleted = sqlx::query("DELETE FROM filters WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }
}
