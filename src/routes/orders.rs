use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::{
    dto::orders::OrderList,
    entity::Order,
    error::AppResult,
    middleware::{
        auth::CurrentUser,
        cart::{load_cart, save_cart},
    },
    response::{ApiResponse, Meta},
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/checkout", post(checkout))
        .route("/{id}", get(get_order))
}

#[utoipa::path(
    post,
    path = "/api/orders/checkout",
    responses(
        (status = 200, description = "Snapshot the cart into an order", body = ApiResponse<Order>),
        (status = 400, description = "Cart is empty"),
        (status = 401, description = "Not logged in"),
    ),
    security(("session_cookie" = [])),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: CurrentUser,
    session: Session,
) -> AppResult<Json<ApiResponse<Order>>> {
    let mut cart = load_cart(&session).await?;
    let order = order_service::checkout(&state, &user, &mut cart).await?;
    // Reached only on success, so the emptied cart is what gets persisted.
    save_cart(&session, &cart).await?;
    Ok(Json(ApiResponse::success(
        "Checkout success",
        order,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "List the caller's orders, newest first", body = ApiResponse<OrderList>),
        (status = 401, description = "Not logged in"),
    ),
    security(("session_cookie" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let items = order_service::list_orders(&state, &user).await?;
    let meta = Meta::count(items.len() as i64);
    let data = OrderList { items };
    Ok(Json(ApiResponse::success("Orders", data, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Get one of the caller's orders", body = ApiResponse<Order>),
        (status = 404, description = "Order not found"),
    ),
    security(("session_cookie" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = order_service::get_order(&state, &user, &id).await?;
    Ok(Json(ApiResponse::success("Order", order, None)))
}
