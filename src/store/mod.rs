use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Raw document body as stored: a flat JSON object.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// A stored document together with its store-assigned identity.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: Uuid,
    pub doc: Document,
}

pub mod collections {
    pub const PRODUCTS: &str = "products";
    pub const CATEGORIES: &str = "categories";
    pub const ORDERS: &str = "orders";
    pub const USERS: &str = "users";
    pub const AUDIT_LOGS: &str = "audit_logs";
}

/// Filters a collection can be queried with. Field names are code constants,
/// never user input.
#[derive(Debug, Clone)]
pub enum Filter {
    All,
    Id(Uuid),
    IdIn(Vec<Uuid>),
    /// Equality on a string field.
    Eq(&'static str, String),
    /// Regex match on a string field.
    Regex(&'static str, String),
    /// Strictly less than, on a numeric field.
    Lt(&'static str, i64),
    /// Strictly greater than, on a numeric field.
    Gt(&'static str, i64),
    /// Inclusive on both ends.
    Between(&'static str, i64, i64),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable")]
    Unavailable(#[source] sqlx::Error),

    #[error("corrupt document in `{0}`")]
    Corrupt(String),

    #[error("invalid filter pattern")]
    InvalidFilter(#[from] regex::Error),
}

/// Collection-oriented persistence boundary. Identities are assigned by the
/// store on insert; `update_one` merges the given fields into the stored
/// document and leaves fields it does not name untouched.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(&self, collection: &str, filter: Filter) -> Result<Vec<Record>, StoreError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: Filter,
    ) -> Result<Option<Record>, StoreError>;

    async fn insert_one(&self, collection: &str, doc: Document) -> Result<Uuid, StoreError>;

    async fn update_one(
        &self,
        collection: &str,
        id: Uuid,
        changes: Document,
    ) -> Result<bool, StoreError>;

    async fn delete_one(&self, collection: &str, id: Uuid) -> Result<bool, StoreError>;
}
