use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::products::ProductList,
    entity::Product,
    error::AppResult,
    response::{ApiResponse, Meta},
    routes::params::ProductFilterQuery,
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("search" = Option<String>, Query, description = "Title substring; empty means no constraint"),
        ("category" = Option<String>, Query, description = "Category id, or \"all\" for no constraint"),
        ("price" = Option<String>, Query, description = "Price band: cheap, medium or expensive"),
    ),
    responses(
        (status = 200, description = "List products matching the filter", body = ApiResponse<ProductList>),
        (status = 404, description = "Unknown category"),
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductFilterQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let filter = query.into_filter();
    let items = catalog_service::filter_products(&state, &filter).await?;

    let meta = Meta::count(items.len() as i64);
    let data = ProductList { items };
    Ok(Json(ApiResponse::success("Products", data, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = Product::find_by_id(state.store.as_ref(), &id).await?;
    Ok(Json(ApiResponse::success("Product", product, None)))
}
