use axum_storefront_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let url = config
        .database_url
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set to migrate"))?;
    let pool = create_pool(&url).await?;
    run_migrations(&pool).await?;
    println!("Migrations applied");
    Ok(())
}
