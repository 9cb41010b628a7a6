use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::{
    dto::auth::{LoginRequest, RegisterRequest, UserResponse},
    error::{AppError, AppResult},
    middleware::auth::{CURRENT_USER_KEY, CurrentUser},
    response::{ApiResponse, Meta},
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Register user", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid input or email taken"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = auth_service::register_user(&state, payload).await?;
    Ok(Json(ApiResponse::success("User created", user.into(), None)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<CurrentUser>),
        (status = 400, description = "Invalid credentials"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<CurrentUser>>> {
    let current = auth_service::login_user(&state, payload).await?;

    // Fresh session id on privilege change; the cart carries over.
    session
        .cycle_id()
        .await
        .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?;
    session
        .insert(CURRENT_USER_KEY, &current)
        .await
        .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?;

    Ok(Json(ApiResponse::success(
        "Logged in",
        current,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Destroy the session, cart included"),
    ),
    security(("session_cookie" = [])),
    tag = "Auth"
)]
pub async fn logout(session: Session) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    session
        .flush()
        .await
        .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?;
    Ok(Json(ApiResponse::success(
        "Logged out",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current login state", body = ApiResponse<CurrentUser>),
        (status = 401, description = "Not logged in"),
    ),
    security(("session_cookie" = [])),
    tag = "Auth"
)]
pub async fn me(user: CurrentUser) -> AppResult<Json<ApiResponse<CurrentUser>>> {
    Ok(Json(ApiResponse::success("OK", user, None)))
}
