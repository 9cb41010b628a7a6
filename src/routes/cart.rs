use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use utoipa::ToSchema;

use crate::{
    cart::Cart,
    error::AppResult,
    middleware::cart::{load_cart, save_cart},
    response::{ApiResponse, Meta},
    services::cart_service,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(show_cart))
        .route("/items", post(add_item))
        .route("/items/{product_id}", patch(update_item).delete(remove_item))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Current session cart, repriced from the catalog", body = ApiResponse<Cart>)
    ),
    tag = "Cart"
)]
pub async fn show_cart(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let mut cart = load_cart(&session).await?;
    cart_service::refresh_prices(&state, &mut cart).await?;
    save_cart(&session, &cart).await?;
    Ok(Json(ApiResponse::success("OK", cart, None)))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add a product to the cart", body = ApiResponse<Cart>),
        (status = 400, description = "Bad quantity"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let mut cart = load_cart(&session).await?;
    cart_service::add_item(&state, &mut cart, &payload.product_id, payload.quantity).await?;
    save_cart(&session, &cart).await?;
    Ok(Json(ApiResponse::success("Added to cart", cart, None)))
}

#[utoipa::path(
    patch,
    path = "/api/cart/items/{product_id}",
    params(
        ("product_id" = String, Path, description = "Product ID")
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Update line quantity; zero removes the line", body = ApiResponse<Cart>),
        (status = 404, description = "No such line"),
    ),
    tag = "Cart"
)]
pub async fn update_item(
    session: Session,
    Path(product_id): Path<String>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let mut cart = load_cart(&session).await?;
    cart_service::update_item(&mut cart, &product_id, payload.quantity)?;
    save_cart(&session, &cart).await?;
    Ok(Json(ApiResponse::success("Cart updated", cart, None)))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{product_id}",
    params(
        ("product_id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Remove the line", body = ApiResponse<Cart>),
        (status = 404, description = "No such line"),
    ),
    tag = "Cart"
)]
pub async fn remove_item(
    session: Session,
    Path(product_id): Path<String>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let mut cart = load_cart(&session).await?;
    cart_service::remove_item(&mut cart, &product_id)?;
    save_cart(&session, &cart).await?;
    Ok(Json(ApiResponse::success(
        "Removed from cart",
        cart,
        Some(Meta::empty()),
    )))
}
