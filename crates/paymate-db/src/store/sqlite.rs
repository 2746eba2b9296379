//! # SQLite Document Store
//!
//! Documents live in one table keyed by `(collection, id)`:
//!
//! ```text
//! documents
//! ┌────────────┬──────────┬──────────┬──────────────────────┬────────────┐
//! │ collection │ id       │ owner_id │ body (JSON text)     │ updated_at │
//! ├────────────┼──────────┼──────────┼──────────────────────┼────────────┤
//! │ invoices   │ 7f3e...  │ ent-1    │ {"invoiceNumber":..} │ 2024-06-.. │
//! │ payslips   │ 91ac...  │ ent-1    │ {"memberId":..}      │ 2024-06-.. │
//! └────────────┴──────────┴──────────┴──────────────────────┴────────────┘
//! ```
//!
//! Change events are only seen by subscribers of this process's store.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::debug;

use super::{notify, put_events, ChangeEvent, DocumentStore};
use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
    changes: broadcast::Sender<ChangeEvent>,
}

impl SqliteDocumentStore {
    /// Wraps a migrated pool. `buffer` is the change-channel capacity.
    pub fn new(pool: SqlitePool, buffer: usize) -> Self {
        let (changes, _) = broadcast::channel(buffer.max(1));
        SqliteDocumentStore { pool, changes }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Number of documents in `collection`, across all owners.
    pub async fn count(&self, collection: &str) -> DbResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn put_raw(&self, collection: &str, id: &str, owner_id: &str, body: Value) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<String> = sqlx::query_scalar(
            "SELECT owner_id FROM documents WHERE collection = ?1 AND id = ?2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, owner_id, body, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (collection, id) DO UPDATE SET
                owner_id = excluded.owner_id,
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(owner_id)
        .bind(body.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(collection, id, owner_id, "Stored document");
        notify(
            &self.changes,
            put_events(collection, id, owner_id, previous.as_deref()),
        );
        Ok(())
    }

    async fn get_raw(&self, collection: &str, id: &str) -> DbResult<Option<Value>> {
        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM documents WHERE collection = ?1 AND id = ?2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match body {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn delete_raw(&self, collection: &str, id: &str) -> DbResult<bool> {
        let owner: Option<String> = sqlx::query_scalar(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2 RETURNING owner_id",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match owner {
            Some(owner_id) => {
                debug!(collection, id, "Deleted document");
                notify(
                    &self.changes,
                    vec![ChangeEvent::delete(collection, id, &owner_id)],
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_raw(&self, collection: &str, owner_id: &str) -> DbResult<Vec<Value>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = ?1 AND owner_id = ?2 ORDER BY id",
        )
        .bind(collection)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        bodies
            .iter()
            .map(|text| serde_json::from_str(text).map_err(Into::into))
            .collect()
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
