use serde::Deserialize;
use utoipa::ToSchema;

use crate::services::catalog_service::ProductFilter;

/// Filter form as submitted by the storefront. Absent fields fall back to
/// the inactive sentinels.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductFilterQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
}

impl ProductFilterQuery {
    pub fn into_filter(self) -> ProductFilter {
        ProductFilter {
            search: self.search.unwrap_or_default(),
            category: self.category.unwrap_or_else(|| "all".to_string()),
            price: self.price.unwrap_or_default(),
        }
    }
}
