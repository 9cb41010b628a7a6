use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    store::{Document, DocumentStore, Filter, Record, collections::USERS},
};

use super::{parse_id, require_bool, require_datetime, require_str};

/// Credentials stay opaque: the hash is never serialized into a response.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Option<Uuid>,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, is_admin: bool) -> Self {
        Self {
            id: None,
            email,
            password_hash,
            is_admin,
            created_at: Utc::now(),
        }
    }

    pub fn from_record(record: Record) -> AppResult<Self> {
        let doc = &record.doc;
        Ok(Self {
            id: Some(record.id),
            email: require_str(doc, USERS, "email")?,
            password_hash: require_str(doc, USERS, "password_hash")?,
            is_admin: require_bool(doc, USERS, "is_admin")?,
            created_at: require_datetime(doc, USERS, "created_at")?,
        })
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("email".to_string(), Value::String(self.email.clone()));
        doc.insert(
            "password_hash".to_string(),
            Value::String(self.password_hash.clone()),
        );
        doc.insert("is_admin".to_string(), Value::Bool(self.is_admin));
        doc.insert(
            "created_at".to_string(),
            Value::String(self.created_at.to_rfc3339()),
        );
        doc
    }

    pub async fn find_by_id(store: &dyn DocumentStore, id: &str) -> AppResult<Self> {
        let id = parse_id(id)?;
        let record = store
            .find_one(USERS, Filter::Id(id))
            .await?
            .ok_or(AppError::NotFound)?;
        Self::from_record(record)
    }

    pub async fn find_by_email(store: &dyn DocumentStore, email: &str) -> AppResult<Option<Self>> {
        let record = store
            .find_one(USERS, Filter::Eq("email", email.to_string()))
            .await?;
        record.map(Self::from_record).transpose()
    }

    pub async fn save(&mut self, store: &dyn DocumentStore) -> AppResult<()> {
        match self.id {
            Some(id) => {
                if !store.update_one(USERS, id, self.to_document()).await? {
                    return Err(AppError::NotFound);
                }
            }
            None => {
                self.id = Some(store.insert_one(USERS, self.to_document()).await?);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn email_lookup_round_trips() {
        let store = MemoryStore::new();
        let mut user = User::new("a@shop.test".to_string(), "hash".to_string(), false);
        user.save(&store).await.unwrap();

        let found = User::find_by_email(&store, "a@shop.test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert!(!found.is_admin);

        assert!(
            User::find_by_email(&store, "b@shop.test")
                .await
                .unwrap()
                .is_none()
        );
    }
}
