//! # fr-db-sqlite Implementation
//!
//! This crate implements the data mapping between the SQLite relational model
//! and the `fr-core` domain models. One `SqliteStore` serves every port.

mod filters;
mod freets;
mod intents;
mod suggestions;
mod tags;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

/// Tables are keyed by 16-byte UUID blobs. Relations point at `freets(id)`
/// and are removed explicitly before their freet.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS freets (
    id          BLOB PRIMARY KEY NOT NULL,
    author_id   BLOB NOT NULL,
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    modified_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS freets_author_id ON freets (author_id);

CREATE TABLE IF NOT EXISTS tags (
    id       BLOB PRIMARY KEY NOT NULL,
    freet_id BLOB NOT NULL REFERENCES freets (id),
    label    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS tags_label ON tags (label);
CREATE INDEX IF NOT EXISTS tags_freet_id ON tags (freet_id);

CREATE TABLE IF NOT EXISTS intents (
    freet_id   BLOB PRIMARY KEY NOT NULL REFERENCES freets (id),
    kind       TEXT NOT NULL,
    supplement TEXT
);
CREATE INDEX IF NOT EXISTS intents_kind ON intents (kind);

CREATE TABLE IF NOT EXISTS suggestions (
    id           BLOB PRIMARY KEY NOT NULL,
    freet_id     BLOB NOT NULL REFERENCES freets (id),
    suggestor_id BLOB NOT NULL,
    kind         TEXT NOT NULL,
    value        TEXT NOT NULL,
    UNIQUE (freet_id, suggestor_id, kind, value)
);
CREATE INDEX IF NOT EXISTS suggestions_value_kind ON suggestions (value, kind);

CREATE TABLE IF NOT EXISTS filters (
    id         BLOB PRIMARY KEY NOT NULL,
    owner_id   BLOB NOT NULL,
    name       TEXT NOT NULL,
    is_public  INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    criteria   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS filters_owner_id ON filters (owner_id);
"#;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (or creates) the database at `url` and applies the schema.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        Self::connect(url, 5).await
    }

    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` is a separate database, so keep
        // exactly one alive for the lifetime of the pool.
        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if url.contains(":memory:") {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(Option::<Duration>::None)
                .max_lifetime(Option::<Duration>::None);
        }

        let pool = pool_options.connect_with(options).await?;
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        log::info!("sqlite store ready at {url}");

        Ok(Self { pool })
    }
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> anyhow::Result<Uuid> {
    Ok(Uuid::from_slice(blob)?)
}

/// Ids bound per `IN (...)` list. SQLite rejects statements with more than
/// 32766 parameters.
const IN_CHUNK: usize = 10_000;

/// `<select> (?, ?, ...)` with one bound blob per id. Callers skip empty sets.
fn select_in<'a>(select: &str, ids: impl IntoIterator<Item = &'a Uuid>) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(select);
    builder.push(" (");
    let mut list = builder.separated(", ");
    for id in ids {
        list.push_bind(uuid_to_blob(*id));
    }
    list.push_unseparated(")");
    builder
}

impl SqliteStore {
    /// Runs `<select> (?, ...)<suffix>` over `ids` in chunks of `IN_CHUNK`
    /// and concatenates the rows. Ordering in `suffix` holds per chunk only.
    async fn fetch_in(&self, select: &str, ids: &[Uuid], suffix: &str) -> anyhow::Result<Vec<SqliteRow>> {
        let mut rows = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(IN_CHUNK) {
            let mut builder = select_in(select, chunk);
            builder.push(suffix);
            rows.extend(builder.build().fetch_all(&self.pool).await?);
        }
        Ok(rows)
    }
}
