use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::AppResult,
    store::{DocumentStore, Document, collections::AUDIT_LOGS},
};

pub async fn log_audit(
    store: &dyn DocumentStore,
    user_id: Option<Uuid>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    let mut doc = Document::new();
    doc.insert("action".to_string(), Value::String(action.to_string()));
    doc.insert("at".to_string(), Value::String(Utc::now().to_rfc3339()));
    if let Some(user_id) = user_id {
        doc.insert("user_id".to_string(), Value::String(user_id.to_string()));
    }
    if let Some(resource) = resource {
        doc.insert("resource".to_string(), Value::String(resource.to_string()));
    }
    if let Some(metadata) = metadata {
        doc.insert("metadata".to_string(), metadata);
    }
    store.insert_one(AUDIT_LOGS, doc).await?;
    Ok(())
}
