//! SQLite item store (embedded, no external dependencies)

use super::ItemRow;
use async_trait::async_trait;
use catalog_core::{CatalogError, Item, ItemDraft, ItemId, ItemStore, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", url);

        let in_memory = url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(url)
            .map_err(CatalogError::storage)?
            .create_if_missing(true)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        if !in_memory {
            options = options.journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
        }

        // Every connection to `:memory:` opens its own empty database, so an
        // in-memory store is pinned to a single connection that never expires.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(CatalogError::storage)?;

        Ok(Self { pool })
    }

    /// Fresh in-memory database with the schema in place
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let store = Self::connect("sqlite::memory:", 1).await?;
        store.ensure_schema().await?;
        Ok(store)
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn get_by_id(&self, id: ItemId) -> Result<Option<Item>> {
        let row: Option<ItemRow> = sqlx::query_as(
            r#"
            SELECT id, name, description FROM items WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CatalogError::storage)?;

        Ok(row.map(Into::into))
    }

    async fn get_all(&self) -> Result<Vec<Item>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT id, name, description FROM items ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(CatalogError::storage)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, draft: &ItemDraft) -> Result<Item> {
        let row: ItemRow = sqlx::query_as(
            r#"
            INSERT INTO items (name, description)
            VALUES (?1, ?2)
            RETURNING id, name, description
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .fetch_one(&self.pool)
        .await
        .map_err(CatalogError::storage)?;

        Ok(row.into())
    }

    async fn save(&self, item: &Item) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE items SET name = ?1, description = ?2 WHERE id = ?3
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.id)
        .execute(&self.pool)
        .await
        .map_err(CatalogError::storage)?;

        Ok(())
    }

    async fn delete(&self, item: &Item) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM items WHERE id = ?1
            "#,
        )
        .bind(item.id)
        .execute(&self.pool)
        .await
        .map_err(CatalogError::storage)?;

        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(255) NOT NULL,
                description TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(CatalogError::storage)?;

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(CatalogError::storage)?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
