//! PostgreSQL item store

use super::ItemRow;
use async_trait::async_trait;
use catalog_core::{CatalogError, Item, ItemDraft, ItemId, ItemStore, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

pub struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
            .map_err(CatalogError::storage)?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn get_by_id(&self, id: ItemId) -> Result<Option<Item>> {
        let row: Option<ItemRow> = sqlx::query_as(
            r#"
            SELECT id, name, description FROM items WHERE id = $1
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
            VALUES ($1, $2)
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
            UPDATE items SET name = $1, description = $2 WHERE id = $3
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
            DELETE FROM items WHERE id = $1
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
                id SERIAL PRIMARY KEY,
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
