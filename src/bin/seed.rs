use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use uuid::Uuid;

use axum_storefront_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    entity::{Category, Product, User},
    store::{DocumentStore, Filter, PgStore, collections::PRODUCTS},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let url = config
        .database_url
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set to seed"))?;

    let pool = create_pool(&url).await?;
    run_migrations(&pool).await?;
    let store = PgStore::new(pool);

    let admin_id = ensure_user(&store, "admin@example.com", "admin123", true).await?;
    let user_id = ensure_user(&store, "user@example.com", "user123", false).await?;
    seed_catalog(&store).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    store: &dyn DocumentStore,
    email: &str,
    password: &str,
    is_admin: bool,
) -> anyhow::Result<Uuid> {
    if let Some(user) = User::find_by_email(store, email).await? {
        let id = user
            .id
            .ok_or_else(|| anyhow::anyhow!("stored user without identity"))?;
        println!("User {email} already present");
        return Ok(id);
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let mut user = User::new(email.to_string(), password_hash, is_admin);
    user.save(store).await?;
    println!("Ensured user {email} (admin={is_admin})");
    user.id
        .ok_or_else(|| anyhow::anyhow!("save did not assign an identity"))
}

async fn ensure_category(store: &dyn DocumentStore, name: &str) -> anyhow::Result<Uuid> {
    let existing = Category::find_all(store)
        .await?
        .into_iter()
        .find(|category| category.name == name);
    if let Some(category) = existing {
        return category
            .id
            .ok_or_else(|| anyhow::anyhow!("stored category without identity"));
    }

    let mut category = Category::new(name.to_string());
    category.save(store).await?;
    println!("Seeded category {name}");
    category
        .id
        .ok_or_else(|| anyhow::anyhow!("save did not assign an identity"))
}

async fn seed_catalog(store: &dyn DocumentStore) -> anyhow::Result<()> {
    let products = [
        ("Axum Hoodie", "Clothing", "Warm hoodie for Rustaceans", 550_000, "hoodie.png"),
        ("Ferris Mug", "Mugs", "Coffee tastes better with Ferris", 120_000, "mug.png"),
        ("Rust Sticker Pack", "Stickers", "Decorate your laptop", 50_000, "stickers.png"),
        ("E-book: Async Rust", "Books", "Learn async Rust patterns", 250_000, "ebook.png"),
    ];

    for (title, category, summary, price, image) in products {
        let category_id = ensure_category(store, category).await?;

        let taken = store
            .find_one(PRODUCTS, Filter::Eq("title", title.to_string()))
            .await?;
        if taken.is_some() {
            continue;
        }

        let mut product = Product::new(
            title.to_string(),
            category_id,
            summary.to_string(),
            summary.to_string(),
            price,
            image.to_string(),
        );
        product.save(store).await?;
        println!("Seeded product {title}");
    }

    Ok(())
}
