use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Document, DocumentStore, Filter, Record, StoreError};

/// Postgres-backed document store. Every collection lives in the `documents`
/// table keyed by `(collection, id)`, with the body in a JSONB column;
/// filters are translated to SQL over `doc->>'field'`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type Row = (Uuid, Value);

fn into_record(collection: &str, (id, value): Row) -> Result<Record, StoreError> {
    match value {
        Value::Object(doc) => Ok(Record { id, doc }),
        _ => Err(StoreError::Corrupt(collection.to_string())),
    }
}

const SELECT: &str = "SELECT id, doc FROM documents WHERE collection = $1";
const ORDER: &str = "ORDER BY created_at, id";

async fn fetch(pool: &PgPool, collection: &str, filter: Filter) -> Result<Vec<Row>, StoreError> {
    let result = match filter {
        Filter::All => {
            sqlx::query_as(&format!("{SELECT} {ORDER}"))
                .bind(collection)
                .fetch_all(pool)
                .await
        }
        Filter::Id(id) => {
            sqlx::query_as(&format!("{SELECT} AND id = $2"))
                .bind(collection)
                .bind(id)
                .fetch_all(pool)
                .await
        }
        Filter::IdIn(ids) => {
            sqlx::query_as(&format!("{SELECT} AND id = ANY($2) {ORDER}"))
                .bind(collection)
                .bind(ids)
                .fetch_all(pool)
                .await
        }
        Filter::Eq(field, value) => {
            sqlx::query_as(&format!("{SELECT} AND doc->>'{field}' = $2 {ORDER}"))
                .bind(collection)
                .bind(value)
                .fetch_all(pool)
                .await
        }
        Filter::Regex(field, pattern) => {
            sqlx::query_as(&format!("{SELECT} AND doc->>'{field}' ~ $2 {ORDER}"))
                .bind(collection)
                .bind(pattern)
                .fetch_all(pool)
                .await
        }
        Filter::Lt(field, limit) => {
            sqlx::query_as(&format!(
                "{SELECT} AND (doc->>'{field}')::bigint < $2 {ORDER}"
            ))
            .bind(collection)
            .bind(limit)
            .fetch_all(pool)
            .await
        }
        Filter::Gt(field, limit) => {
            sqlx::query_as(&format!(
                "{SELECT} AND (doc->>'{field}')::bigint > $2 {ORDER}"
            ))
            .bind(collection)
            .bind(limit)
            .fetch_all(pool)
            .await
        }
        Filter::Between(field, min, max) => {
            sqlx::query_as(&format!(
                "{SELECT} AND (doc->>'{field}')::bigint BETWEEN $2 AND $3 {ORDER}"
            ))
            .bind(collection)
            .bind(min)
            .bind(max)
            .fetch_all(pool)
            .await
        }
    };
    result.map_err(StoreError::Unavailable)
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find(&self, collection: &str, filter: Filter) -> Result<Vec<Record>, StoreError> {
        fetch(&self.pool, collection, filter)
            .await?
            .into_iter()
            .map(|row| into_record(collection, row))
            .collect()
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Filter,
    ) -> Result<Option<Record>, StoreError> {
        fetch(&self.pool, collection, filter)
            .await?
            .into_iter()
            .next()
            .map(|row| into_record(collection, row))
            .transpose()
    }

    async fn insert_one(&self, collection: &str, doc: Document) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO documents (collection, id, doc) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(Value::Object(doc))
            .execute(&self.pool)
            .await
            .map_err(StoreError::Unavailable)?;
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        id: Uuid,
        changes: Document,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE documents SET doc = doc || $3 WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .bind(Value::Object(changes))
                .execute(&self.pool)
                .await
                .map_err(StoreError::Unavailable)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_one(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Unavailable)?;
        Ok(result.rows_affected() > 0)
    }
}
