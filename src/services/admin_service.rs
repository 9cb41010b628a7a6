use crate::{
    audit::log_audit,
    dto::{
        categories::{CreateCategoryRequest, UpdateCategoryRequest},
        products::{CreateProductRequest, ReplaceImageRequest, UpdateProductRequest},
    },
    entity::{
        Category, Order, Product,
        orders::{STATUS_FULFILLED, STATUS_PENDING},
    },
    error::{AppError, AppResult},
    middleware::auth::{CurrentUser, ensure_admin},
    routes::admin::UpdateOrderStatusRequest,
    state::AppState,
};

fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidArgument("title is required".to_string()));
    }
    Ok(())
}

fn validate_price(price: i64) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::InvalidArgument(
            "price must not be negative".to_string(),
        ));
    }
    Ok(())
}

pub async fn create_product(
    state: &AppState,
    user: &CurrentUser,
    payload: CreateProductRequest,
) -> AppResult<Product> {
    ensure_admin(user)?;
    validate_title(&payload.title)?;
    validate_price(payload.price)?;

    let store = state.store.as_ref();
    let category = Category::find_by_id(store, &payload.category_id).await?;
    let category_id = category
        .id
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("stored category without identity")))?;

    let mut product = Product::new(
        payload.title,
        category_id,
        payload.summary,
        payload.description,
        payload.price,
        payload.image,
    );
    product.save(store).await?;

    if let Err(err) = log_audit(
        store,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = ?err, "audit log failed");
    }

    Ok(product)
}

/// Full-field replace; a blank or absent image keeps the stored file.
pub async fn update_product(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
    payload: UpdateProductRequest,
) -> AppResult<Product> {
    ensure_admin(user)?;
    validate_title(&payload.title)?;
    validate_price(payload.price)?;

    let store = state.store.as_ref();
    let existing = Product::find_by_id(store, id).await?;
    let category = Category::find_by_id(store, &payload.category_id).await?;
    let category_id = category
        .id
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("stored category without identity")))?;

    let mut product = Product::new(
        payload.title,
        category_id,
        payload.summary,
        payload.description,
        payload.price,
        payload.image.unwrap_or_default(),
    );
    product.id = existing.id;
    product.save(store).await?;

    if let Err(err) = log_audit(
        store,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = ?err, "audit log failed");
    }

    // Reload so the response reflects what is actually stored, image included.
    Product::find_by_id(store, id).await
}

pub async fn delete_product(state: &AppState, user: &CurrentUser, id: &str) -> AppResult<()> {
    ensure_admin(user)?;
    let store = state.store.as_ref();
    let product = Product::find_by_id(store, id).await?;
    product.remove(store).await?;

    if let Err(err) = log_audit(
        store,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = ?err, "audit log failed");
    }

    Ok(())
}

pub async fn replace_product_image(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
    payload: ReplaceImageRequest,
) -> AppResult<Product> {
    ensure_admin(user)?;
    if payload.image.trim().is_empty() {
        return Err(AppError::InvalidArgument("image is required".to_string()));
    }

    let store = state.store.as_ref();
    let mut product = Product::find_by_id(store, id).await?;
    product.replace_image(payload.image);
    product.save(store).await?;

    if let Err(err) = log_audit(
        store,
        Some(user.user_id),
        "product_image_replace",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = ?err, "audit log failed");
    }

    Ok(product)
}

pub async fn create_category(
    state: &AppState,
    user: &CurrentUser,
    payload: CreateCategoryRequest,
) -> AppResult<Category> {
    ensure_admin(user)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidArgument("name is required".to_string()));
    }

    let store = state.store.as_ref();
    let mut category = Category::new(payload.name);
    category.save(store).await?;

    if let Err(err) = log_audit(
        store,
        Some(user.user_id),
        "category_create",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = ?err, "audit log failed");
    }

    Ok(category)
}

pub async fn update_category(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
    payload: UpdateCategoryRequest,
) -> AppResult<Category> {
    ensure_admin(user)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidArgument("name is required".to_string()));
    }

    let store = state.store.as_ref();
    let mut category = Category::find_by_id(store, id).await?;
    category.name = payload.name;
    category.save(store).await?;

    if let Err(err) = log_audit(
        store,
        Some(user.user_id),
        "category_update",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = ?err, "audit log failed");
    }

    Ok(category)
}

pub async fn delete_category(state: &AppState, user: &CurrentUser, id: &str) -> AppResult<()> {
    ensure_admin(user)?;
    let store = state.store.as_ref();
    let category = Category::find_by_id(store, id).await?;
    category.remove(store).await?;

    if let Err(err) = log_audit(
        store,
        Some(user.user_id),
        "category_delete",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = ?err, "audit log failed");
    }

    Ok(())
}

pub async fn list_all_orders(state: &AppState, user: &CurrentUser) -> AppResult<Vec<Order>> {
    ensure_admin(user)?;
    let mut orders = Order::find_all(state.store.as_ref()).await?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
}

pub async fn update_order_status(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
    payload: UpdateOrderStatusRequest,
) -> AppResult<Order> {
    ensure_admin(user)?;
    if payload.status != STATUS_PENDING && payload.status != STATUS_FULFILLED {
        return Err(AppError::InvalidArgument("Invalid status".to_string()));
    }

    let store = state.store.as_ref();
    let mut order = Order::find_by_id(store, id).await?;
    order.update_status(store, payload.status).await?;

    if let Err(err) = log_audit(
        store,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = ?err, "audit log failed");
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use uuid::Uuid;

    fn state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()))
    }

    fn admin() -> CurrentUser {
        CurrentUser {
            user_id: Uuid::new_v4(),
            email: "admin@shop.test".to_string(),
            is_admin: true,
        }
    }

    fn customer() -> CurrentUser {
        CurrentUser {
            user_id: Uuid::new_v4(),
            email: "user@shop.test".to_string(),
            is_admin: false,
        }
    }

    async fn seed_category(state: &AppState) -> String {
        let category = create_category(
            state,
            &admin(),
            CreateCategoryRequest {
                name: "Shoes".to_string(),
            },
        )
        .await
        .unwrap();
        category.id.unwrap().to_string()
    }

    fn create_request(category_id: &str) -> CreateProductRequest {
        CreateProductRequest {
            title: "Shoe".to_string(),
            category_id: category_id.to_string(),
            summary: "summary".to_string(),
            description: "description".to_string(),
            price: 50_000,
            image: "shoe.png".to_string(),
        }
    }

    #[tokio::test]
    async fn non_admins_are_turned_away() {
        let state = state();
        let category_id = seed_category(&state).await;
        let err = create_product(&state, &customer(), create_request(&category_id)).await;
        assert!(matches!(err, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn product_crud_validates_category_and_price() {
        let state = state();
        let category_id = seed_category(&state).await;

        let missing_category = create_product(
            &state,
            &admin(),
            CreateProductRequest {
                category_id: Uuid::new_v4().to_string(),
                ..create_request(&category_id)
            },
        )
        .await;
        assert!(matches!(missing_category, Err(AppError::NotFound)));

        let negative = create_product(
            &state,
            &admin(),
            CreateProductRequest {
                price: -1,
                ..create_request(&category_id)
            },
        )
        .await;
        assert!(matches!(negative, Err(AppError::InvalidArgument(_))));

        let product = create_product(&state, &admin(), create_request(&category_id))
            .await
            .unwrap();
        assert_eq!(product.image_url, "/products/assets/images/shoe.png");
    }

    #[tokio::test]
    async fn update_without_new_image_keeps_the_stored_one() {
        let state = state();
        let category_id = seed_category(&state).await;
        let product = create_product(&state, &admin(), create_request(&category_id))
            .await
            .unwrap();
        let id = product.id.unwrap().to_string();

        let updated = update_product(
            &state,
            &admin(),
            &id,
            UpdateProductRequest {
                title: "Running Shoe".to_string(),
                category_id: category_id.clone(),
                summary: "summary".to_string(),
                description: "description".to_string(),
                price: 75_000,
                image: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.title, "Running Shoe");
        assert_eq!(updated.price, 75_000);
        assert_eq!(updated.image, "shoe.png");
    }

    #[tokio::test]
    async fn order_status_accepts_only_known_states() {
        let state = state();
        let err = update_order_status(
            &state,
            &admin(),
            &Uuid::new_v4().to_string(),
            UpdateOrderStatusRequest {
                status: "shipped".to_string(),
            },
        )
        .await;
        assert!(matches!(err, Err(AppError::InvalidArgument(_))));
    }
}
