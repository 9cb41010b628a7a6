use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    store::{Document, DocumentStore, Filter, Record, collections::CATEGORIES},
};

use super::{parse_id, require_str};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Category {
    pub id: Option<Uuid>,
    pub name: String,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self { id: None, name }
    }

    pub fn from_record(record: Record) -> AppResult<Self> {
        Ok(Self {
            id: Some(record.id),
            name: require_str(&record.doc, CATEGORIES, "name")?,
        })
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("name".to_string(), Value::String(self.name.clone()));
        doc
    }

    pub async fn find_by_id(store: &dyn DocumentStore, id: &str) -> AppResult<Self> {
        let id = parse_id(id)?;
        let record = store
            .find_one(CATEGORIES, Filter::Id(id))
            .await?
            .ok_or(AppError::NotFound)?;
        Self::from_record(record)
    }

    pub async fn find_all(store: &dyn DocumentStore) -> AppResult<Vec<Self>> {
        let records = store.find(CATEGORIES, Filter::All).await?;
        records.into_iter().map(Self::from_record).collect()
    }

    pub async fn save(&mut self, store: &dyn DocumentStore) -> AppResult<()> {
        let doc = self.to_document();
        match self.id {
            Some(id) => {
                if !store.update_one(CATEGORIES, id, doc).await? {
                    return Err(AppError::NotFound);
                }
            }
            None => {
                self.id = Some(store.insert_one(CATEGORIES, doc).await?);
            }
        }
        Ok(())
    }

    pub async fn remove(&self, store: &dyn DocumentStore) -> AppResult<()> {
        let id = self.id.ok_or(AppError::NotFound)?;
        if !store.delete_one(CATEGORIES, id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn save_find_rename_remove() {
        let store = MemoryStore::new();
        let mut category = Category::new("Sneakers".to_string());
        category.save(&store).await.unwrap();
        let id = category.id.unwrap().to_string();

        let mut loaded = Category::find_by_id(&store, &id).await.unwrap();
        assert_eq!(loaded.name, "Sneakers");

        loaded.name = "Footwear".to_string();
        loaded.save(&store).await.unwrap();
        assert_eq!(
            Category::find_by_id(&store, &id).await.unwrap().name,
            "Footwear"
        );

        loaded.remove(&store).await.unwrap();
        assert!(matches!(
            Category::find_by_id(&store, &id).await,
            Err(AppError::NotFound)
        ));
    }
}
