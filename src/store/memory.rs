use std::collections::HashMap;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Document, DocumentStore, Filter, Record, StoreError};

/// In-process document store. Collections keep insertion order. Used when no
/// `DATABASE_URL` is configured, and by the test suite.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn numeric(doc: &Document, field: &str) -> Option<i64> {
    doc.get(field).and_then(Value::as_i64)
}

fn text<'a>(doc: &'a Document, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(Value::as_str)
}

fn matches(record: &Record, filter: &Filter, regex: Option<&Regex>) -> bool {
    match filter {
        Filter::All => true,
        Filter::Id(id) => record.id == *id,
        Filter::IdIn(ids) => ids.contains(&record.id),
        Filter::Eq(field, value) => text(&record.doc, field) == Some(value.as_str()),
        Filter::Regex(field, _) => regex
            .zip(text(&record.doc, field))
            .is_some_and(|(re, s)| re.is_match(s)),
        Filter::Lt(field, limit) => numeric(&record.doc, field).is_some_and(|n| n < *limit),
        Filter::Gt(field, limit) => numeric(&record.doc, field).is_some_and(|n| n > *limit),
        Filter::Between(field, min, max) => {
            numeric(&record.doc, field).is_some_and(|n| n >= *min && n <= *max)
        }
    }
}

// Regex filters are compiled once per call, not per record.
fn compile(filter: &Filter) -> Result<Option<Regex>, StoreError> {
    match filter {
        Filter::Regex(_, pattern) => Ok(Some(Regex::new(pattern)?)),
        _ => Ok(None),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: &str, filter: Filter) -> Result<Vec<Record>, StoreError> {
        let regex = compile(&filter)?;
        let collections = self.collections.read().await;
        let records = collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| matches(record, &filter, regex.as_ref()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Filter,
    ) -> Result<Option<Record>, StoreError> {
        let regex = compile(&filter)?;
        let collections = self.collections.read().await;
        let record = collections.get(collection).and_then(|records| {
            records
                .iter()
                .find(|record| matches(record, &filter, regex.as_ref()))
                .cloned()
        });
        Ok(record)
    }

    async fn insert_one(&self, collection: &str, doc: Document) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(Record { id, doc });
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        id: Uuid,
        changes: Document,
    ) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|record| record.id == id));
        match record {
            Some(record) => {
                for (field, value) in changes {
                    record.doc.insert(field, value);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_one(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let records = match collections.get_mut(collection) {
            Some(records) => records,
            None => return Ok(false),
        };
        let before = records.len();
        records.retain(|record| record.id != id);
        Ok(records.len() < before)
    }
}
