use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub title: String,
    pub category_id: String,
    pub summary: String,
    pub description: String,
    pub price: i64,
    pub image: String,
}

/// Full replace. A missing or blank image means "keep the stored file".
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub title: String,
    pub category_id: String,
    pub summary: String,
    pub description: String,
    pub price: i64,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceImageRequest {
    pub image: String,
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}
