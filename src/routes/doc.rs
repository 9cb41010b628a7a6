use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::{Cart, CartItem},
    dto::{
        auth::{LoginRequest, RegisterRequest, UserResponse},
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        orders::OrderList,
        products::{
            CreateProductRequest, ProductList, ReplaceImageRequest, UpdateProductRequest,
        },
    },
    entity::{Category, Order, OrderLine, Product},
    middleware::auth::CurrentUser,
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, categories, health, orders, params, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("id"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        products::list_products,
        products::get_product,
        categories::list_categories,
        categories::get_category,
        cart::show_cart,
        cart::add_item,
        cart::update_item,
        cart::remove_item,
        orders::checkout,
        orders::list_orders,
        orders::get_order,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::replace_product_image,
        admin::create_category,
        admin::update_category,
        admin::delete_category,
        admin::list_all_orders,
        admin::update_order_status
    ),
    components(
        schemas(
            Product,
            Category,
            Order,
            OrderLine,
            Cart,
            CartItem,
            CurrentUser,
            UserResponse,
            RegisterRequest,
            LoginRequest,
            CreateProductRequest,
            UpdateProductRequest,
            ReplaceImageRequest,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            ProductList,
            CategoryList,
            OrderList,
            cart::AddToCartRequest,
            cart::UpdateCartItemRequest,
            admin::UpdateOrderStatusRequest,
            params::ProductFilterQuery,
            health::HealthData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Category>,
            ApiResponse<CategoryList>,
            ApiResponse<Cart>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<CurrentUser>,
            ApiResponse<UserResponse>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog browsing and filtering"),
        (name = "Categories", description = "Category listing"),
        (name = "Cart", description = "Session cart"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Auth", description = "Session authentication"),
        (name = "Admin", description = "Back-office endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
