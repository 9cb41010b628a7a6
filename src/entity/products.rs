use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    store::{Document, DocumentStore, Filter, Record, collections::PRODUCTS},
};

use super::{parse_id, require_id, require_price, require_str};

/// Where uploaded product images land on disk, and where they are served.
pub const IMAGE_DIR: &str = "product-data/images";
pub const IMAGE_URL_PREFIX: &str = "/products/assets/images";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Product {
    /// Assigned by the store on first save.
    pub id: Option<Uuid>,
    pub title: String,
    pub category_id: Uuid,
    pub summary: String,
    pub description: String,
    /// Minor currency units, never negative.
    pub price: i64,
    /// Image filename; path and URL below are derived from it.
    pub image: String,
    pub image_path: String,
    pub image_url: String,
}

impl Product {
    pub fn new(
        title: String,
        category_id: Uuid,
        summary: String,
        description: String,
        price: i64,
        image: String,
    ) -> Self {
        let mut product = Self {
            id: None,
            title,
            category_id,
            summary,
            description,
            price,
            image,
            image_path: String::new(),
            image_url: String::new(),
        };
        product.update_image_data();
        product
    }

    pub fn from_record(record: Record) -> AppResult<Self> {
        let doc = &record.doc;
        let mut product = Self {
            id: Some(record.id),
            title: require_str(doc, PRODUCTS, "title")?,
            category_id: require_id(doc, PRODUCTS, "category_id")?,
            summary: require_str(doc, PRODUCTS, "summary")?,
            description: require_str(doc, PRODUCTS, "description")?,
            price: require_price(doc, PRODUCTS, "price")?,
            image: require_str(doc, PRODUCTS, "image")?,
            image_path: String::new(),
            image_url: String::new(),
        };
        product.update_image_data();
        Ok(product)
    }

    /// Persisted fields only; identity and the derived image fields stay out.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("title".to_string(), Value::String(self.title.clone()));
        doc.insert(
            "category_id".to_string(),
            Value::String(self.category_id.to_string()),
        );
        doc.insert("summary".to_string(), Value::String(self.summary.clone()));
        doc.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        doc.insert("price".to_string(), Value::from(self.price));
        doc.insert("image".to_string(), Value::String(self.image.clone()));
        doc
    }

    fn update_image_data(&mut self) {
        self.image_path = format!("{IMAGE_DIR}/{}", self.image);
        self.image_url = format!("{IMAGE_URL_PREFIX}/{}", self.image);
    }

    pub fn replace_image(&mut self, image: String) {
        self.image = image;
        self.update_image_data();
    }

    pub async fn find_by_id(store: &dyn DocumentStore, id: &str) -> AppResult<Self> {
        let id = parse_id(id)?;
        let record = store
            .find_one(PRODUCTS, Filter::Id(id))
            .await?
            .ok_or(AppError::NotFound)?;
        Self::from_record(record)
    }

    pub async fn find_all(store: &dyn DocumentStore) -> AppResult<Vec<Self>> {
        let records = store.find(PRODUCTS, Filter::All).await?;
        records.into_iter().map(Self::from_record).collect()
    }

    /// Substring match on the title.
    pub async fn find_by_title(store: &dyn DocumentStore, title: &str) -> AppResult<Vec<Self>> {
        let pattern = format!(".*{}.*", regex::escape(title));
        let records = store.find(PRODUCTS, Filter::Regex("title", pattern)).await?;
        records.into_iter().map(Self::from_record).collect()
    }

    pub async fn find_by_category(
        store: &dyn DocumentStore,
        category_id: Uuid,
    ) -> AppResult<Vec<Self>> {
        let records = store
            .find(PRODUCTS, Filter::Eq("category_id", category_id.to_string()))
            .await?;
        records.into_iter().map(Self::from_record).collect()
    }

    /// Strictly below `price`.
    pub async fn find_lower_price(store: &dyn DocumentStore, price: i64) -> AppResult<Vec<Self>> {
        let records = store.find(PRODUCTS, Filter::Lt("price", price)).await?;
        records.into_iter().map(Self::from_record).collect()
    }

    /// Strictly above `price`.
    pub async fn find_greater_price(store: &dyn DocumentStore, price: i64) -> AppResult<Vec<Self>> {
        let records = store.find(PRODUCTS, Filter::Gt("price", price)).await?;
        records.into_iter().map(Self::from_record).collect()
    }

    /// Inclusive on both ends.
    pub async fn find_in_price_range(
        store: &dyn DocumentStore,
        min: i64,
        max: i64,
    ) -> AppResult<Vec<Self>> {
        let records = store
            .find(PRODUCTS, Filter::Between("price", min, max))
            .await?;
        records.into_iter().map(Self::from_record).collect()
    }

    pub async fn find_multiple(store: &dyn DocumentStore, ids: &[Uuid]) -> AppResult<Vec<Self>> {
        let records = store.find(PRODUCTS, Filter::IdIn(ids.to_vec())).await?;
        records.into_iter().map(Self::from_record).collect()
    }

    /// Insert when the product has no identity yet, merge-update otherwise.
    /// On update a blank image is left out of the write so an edit without a
    /// fresh upload keeps the stored file.
    pub async fn save(&mut self, store: &dyn DocumentStore) -> AppResult<()> {
        let mut doc = self.to_document();
        match self.id {
            Some(id) => {
                if self.image.is_empty() {
                    doc.remove("image");
                }
                if !store.update_one(PRODUCTS, id, doc).await? {
                    return Err(AppError::NotFound);
                }
            }
            None => {
                self.id = Some(store.insert_one(PRODUCTS, doc).await?);
            }
        }
        Ok(())
    }

    pub async fn remove(&self, store: &dyn DocumentStore) -> AppResult<()> {
        let id = self.id.ok_or(AppError::NotFound)?;
        if !store.delete_one(PRODUCTS, id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
