use std::sync::Arc;

use axum_storefront_api::{
    cart::Cart,
    dto::{
        auth::{LoginRequest, RegisterRequest},
        categories::CreateCategoryRequest,
        products::{CreateProductRequest, UpdateProductRequest},
    },
    entity::Product,
    error::AppError,
    middleware::auth::CurrentUser,
    routes::admin::UpdateOrderStatusRequest,
    services::{
        admin_service, auth_service, cart_service,
        catalog_service::{self, ProductFilter},
        order_service,
    },
    state::AppState,
    store::MemoryStore,
};
use uuid::Uuid;

fn admin() -> CurrentUser {
    CurrentUser {
        user_id: Uuid::new_v4(),
        email: "admin@shop.test".to_string(),
        is_admin: true,
    }
}

async fn seed_category(state: &AppState, name: &str) -> String {
    admin_service::create_category(
        state,
        &admin(),
        CreateCategoryRequest {
            name: name.to_string(),
        },
    )
    .await
    .expect("create category")
    .id
    .expect("category id")
    .to_string()
}

async fn seed_product(state: &AppState, title: &str, category_id: &str, price: i64) -> Product {
    admin_service::create_product(
        state,
        &admin(),
        CreateProductRequest {
            title: title.to_string(),
            category_id: category_id.to_string(),
            summary: format!("{title} summary"),
            description: format!("{title} description"),
            price,
            image: format!("{}.png", title.to_lowercase()),
        },
    )
    .await
    .expect("create product")
}

fn titles(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.title.as_str()).collect()
}

// Full storefront pass: admin builds the catalog, a customer browses with
// every filter, fills a cart across a price change, checks out, and the
// admin fulfils the order.
#[tokio::test]
async fn browse_fill_cart_checkout_and_fulfil() {
    let state = AppState::new(Arc::new(MemoryStore::new()));

    let shoes = seed_category(&state, "Shoes").await;
    let accessories = seed_category(&state, "Accessories").await;

    let sneaker = seed_product(&state, "Sneaker", &shoes, 50_000).await;
    seed_product(&state, "Boot", &shoes, 600_000).await;
    let hat = seed_product(&state, "Hat", &accessories, 200_000).await;

    // No active criteria returns the whole catalog.
    let all = catalog_service::filter_products(&state, &ProductFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let cheap = catalog_service::filter_products(
        &state,
        &ProductFilter {
            price: "cheap".to_string(),
            ..ProductFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(titles(&cheap), ["Sneaker"]);

    let by_search = catalog_service::filter_products(
        &state,
        &ProductFilter {
            search: "oo".to_string(),
            ..ProductFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(titles(&by_search), ["Boot"]);

    let by_category = catalog_service::filter_products(
        &state,
        &ProductFilter {
            category: accessories.clone(),
            ..ProductFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(titles(&by_category), ["Hat"]);

    // Customer signs up and logs in.
    auth_service::register_user(
        &state,
        RegisterRequest {
            email: "customer@shop.test".to_string(),
            password: "secret123".to_string(),
        },
    )
    .await
    .unwrap();
    let customer = auth_service::login_user(
        &state,
        LoginRequest {
            email: "customer@shop.test".to_string(),
            password: "secret123".to_string(),
        },
    )
    .await
    .unwrap();

    // Fill the cart.
    let mut cart = Cart::default();
    let sneaker_id = sneaker.id.unwrap().to_string();
    let hat_id = hat.id.unwrap().to_string();
    cart_service::add_item(&state, &mut cart, &sneaker_id, 2)
        .await
        .unwrap();
    cart_service::add_item(&state, &mut cart, &hat_id, 1)
        .await
        .unwrap();
    assert_eq!(cart.grand_total, 300_000);

    cart_service::update_item(&mut cart, &hat_id, 0).unwrap();
    assert_eq!(cart.items.len(), 1);

    // Admin reprices the sneaker before the customer checks out; the order
    // must reflect the current catalog price, not the stale snapshot.
    admin_service::update_product(
        &state,
        &admin(),
        &sneaker_id,
        UpdateProductRequest {
            title: "Sneaker".to_string(),
            category_id: shoes.clone(),
            summary: "Sneaker summary".to_string(),
            description: "Sneaker description".to_string(),
            price: 60_000,
            image: None,
        },
    )
    .await
    .unwrap();

    let order = order_service::checkout(&state, &customer, &mut cart)
        .await
        .unwrap();
    assert!(cart.is_empty());
    assert_eq!(order.total, 120_000);
    assert_eq!(order.items[0].unit_price, 60_000);
    assert_eq!(order.status, "pending");

    let mine = order_service::list_orders(&state, &customer).await.unwrap();
    assert_eq!(mine.len(), 1);

    // Back office: the order is visible and can be fulfilled.
    let fulfiller = admin();
    let all_orders = admin_service::list_all_orders(&state, &fulfiller)
        .await
        .unwrap();
    assert_eq!(all_orders.len(), 1);

    let order_id = order.id.unwrap().to_string();
    let fulfilled = admin_service::update_order_status(
        &state,
        &fulfiller,
        &order_id,
        UpdateOrderStatusRequest {
            status: "fulfilled".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(fulfilled.status, "fulfilled");

    let seen_by_customer = order_service::get_order(&state, &customer, &order_id)
        .await
        .unwrap();
    assert_eq!(seen_by_customer.status, "fulfilled");
    assert_eq!(seen_by_customer.total, 120_000);
}

#[tokio::test]
async fn customers_cannot_reach_the_back_office() {
    let state = AppState::new(Arc::new(MemoryStore::new()));

    auth_service::register_user(
        &state,
        RegisterRequest {
            email: "customer@shop.test".to_string(),
            password: "secret123".to_string(),
        },
    )
    .await
    .unwrap();
    let customer = auth_service::login_user(
        &state,
        LoginRequest {
            email: "customer@shop.test".to_string(),
            password: "secret123".to_string(),
        },
    )
    .await
    .unwrap();

    let err = admin_service::create_category(
        &state,
        &customer,
        CreateCategoryRequest {
            name: "Shoes".to_string(),
        },
    )
    .await;
    assert!(matches!(err, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn unknown_and_malformed_ids_read_as_not_found() {
    let state = AppState::new(Arc::new(MemoryStore::new()));

    let missing = Product::find_by_id(state.store.as_ref(), &Uuid::new_v4().to_string()).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let malformed = Product::find_by_id(state.store.as_ref(), "not-an-object-id").await;
    assert!(matches!(malformed, Err(AppError::NotFound)));
}
