use crate::{
    audit::log_audit,
    cart::Cart,
    entity::Order,
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    services::cart_service,
    state::AppState,
};

/// Snapshot the cart into an immutable order and persist it. The cart is
/// cleared only after the insert succeeds; on any failure the session cart
/// comes through untouched.
pub async fn checkout(state: &AppState, user: &CurrentUser, cart: &mut Cart) -> AppResult<Order> {
    if cart.is_empty() {
        return Err(AppError::InvalidArgument("Cart is empty".to_string()));
    }

    cart_service::refresh_prices(state, cart).await?;
    if cart.is_empty() {
        return Err(AppError::InvalidArgument("Cart is empty".to_string()));
    }

    let mut order = Order::from_cart(cart, user.user_id);
    order.save(state.store.as_ref()).await?;
    cart.clear();

    if let Err(err) = log_audit(
        state.store.as_ref(),
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": order.total })),
    )
    .await
    {
        tracing::warn!(error = ?err, "audit log failed");
    }

    Ok(order)
}

pub async fn list_orders(state: &AppState, user: &CurrentUser) -> AppResult<Vec<Order>> {
    let mut orders = Order::find_by_user(state.store.as_ref(), user.user_id).await?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
}

/// Another user's order reads the same as a missing one.
pub async fn get_order(state: &AppState, user: &CurrentUser, id: &str) -> AppResult<Order> {
    let order = Order::find_by_id(state.store.as_ref(), id).await?;
    if order.user_id != user.user_id {
        return Err(AppError::NotFound);
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entity::Product,
        store::{
            Document, DocumentStore, Filter, MemoryStore, Record, StoreError,
            collections::ORDERS,
        },
    };
    use async_trait::async_trait;
    use std::sync::Arc;
    use uuid::Uuid;

    /// Delegates everywhere except order inserts, which fail as if the
    /// database dropped off mid-checkout.
    struct OrderInsertFails(MemoryStore);

    #[async_trait]
    impl DocumentStore for OrderInsertFails {
        async fn find(&self, c: &str, f: Filter) -> Result<Vec<Record>, StoreError> {
            self.0.find(c, f).await
        }
        async fn find_one(&self, c: &str, f: Filter) -> Result<Option<Record>, StoreError> {
            self.0.find_one(c, f).await
        }
        async fn insert_one(&self, c: &str, doc: Document) -> Result<Uuid, StoreError> {
            if c == ORDERS {
                return Err(StoreError::Unavailable(sqlx::Error::PoolClosed));
            }
            self.0.insert_one(c, doc).await
        }
        async fn update_one(&self, c: &str, id: Uuid, d: Document) -> Result<bool, StoreError> {
            self.0.update_one(c, id, d).await
        }
        async fn delete_one(&self, c: &str, id: Uuid) -> Result<bool, StoreError> {
            self.0.delete_one(c, id).await
        }
    }

    fn customer() -> CurrentUser {
        CurrentUser {
            user_id: Uuid::new_v4(),
            email: "user@shop.test".to_string(),
            is_admin: false,
        }
    }

    async fn seed(store: &dyn DocumentStore, title: &str, price: i64) -> Product {
        let mut product = Product::new(
            title.to_string(),
            Uuid::new_v4(),
            "summary".to_string(),
            "description".to_string(),
            price,
            "img.png".to_string(),
        );
        product.save(store).await.unwrap();
        product
    }

    #[tokio::test]
    async fn checkout_snapshots_lines_and_clears_the_cart() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let user = customer();
        let mut cart = Cart::default();

        let shoe = seed(state.store.as_ref(), "Shoe", 50_000).await;
        cart.add(&shoe, 2).unwrap();

        let order = checkout(&state, &user, &mut cart).await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(order.total, 100_000);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].title, "Shoe");
        assert_eq!(order.items[0].unit_price, 50_000);

        let listed = list_orders(&state, &user).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn checkout_uses_current_prices_not_cart_snapshots() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let user = customer();
        let mut cart = Cart::default();

        let mut shoe = seed(state.store.as_ref(), "Shoe", 50_000).await;
        cart.add(&shoe, 1).unwrap();

        shoe.price = 90_000;
        shoe.save(state.store.as_ref()).await.unwrap();

        let order = checkout(&state, &user, &mut cart).await.unwrap();
        assert_eq!(order.total, 90_000);
    }

    #[tokio::test]
    async fn empty_cart_cannot_check_out() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let mut cart = Cart::default();
        let err = checkout(&state, &customer(), &mut cart).await;
        assert!(matches!(err, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn failed_persistence_leaves_the_cart_and_no_order() {
        let failing = Arc::new(OrderInsertFails(MemoryStore::new()));
        let state = AppState::new(failing.clone());
        let user = customer();
        let mut cart = Cart::default();

        let shoe = seed(state.store.as_ref(), "Shoe", 50_000).await;
        cart.add(&shoe, 2).unwrap();

        let err = checkout(&state, &user, &mut cart).await;
        assert!(matches!(err, Err(AppError::Store(_))));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.grand_total, 100_000);
        let orders = failing.0.find(ORDERS, Filter::All).await.unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn orders_are_invisible_to_other_users() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let owner = customer();
        let mut cart = Cart::default();
        let shoe = seed(state.store.as_ref(), "Shoe", 50_000).await;
        cart.add(&shoe, 1).unwrap();
        let order = checkout(&state, &owner, &mut cart).await.unwrap();
        let order_id = order.id.unwrap().to_string();

        assert!(get_order(&state, &owner, &order_id).await.is_ok());
        assert!(matches!(
            get_order(&state, &customer(), &order_id).await,
            Err(AppError::NotFound)
        ));
    }
}
