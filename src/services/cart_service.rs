use uuid::Uuid;

use crate::{
    cart::Cart,
    entity::{Product, parse_id},
    error::{AppError, AppResult},
    state::AppState,
};

/// Re-fetch current catalog prices into the cart. Called before the cart is
/// shown or totalled, so a stale session never sees an outdated price.
pub async fn refresh_prices(state: &AppState, cart: &mut Cart) -> AppResult<()> {
    if cart.is_empty() {
        return Ok(());
    }
    let ids: Vec<Uuid> = cart.items.iter().map(|line| line.product_id).collect();
    let products = Product::find_multiple(state.store.as_ref(), &ids).await?;
    cart.update_prices(&products);
    Ok(())
}

pub async fn add_item(
    state: &AppState,
    cart: &mut Cart,
    product_id: &str,
    quantity: i64,
) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::InvalidArgument(
            "quantity must be greater than 0".to_string(),
        ));
    }
    let product = Product::find_by_id(state.store.as_ref(), product_id).await?;
    cart.add(&product, quantity)
}

pub fn update_item(cart: &mut Cart, product_id: &str, quantity: i64) -> AppResult<()> {
    let product_id = parse_id(product_id)?;
    if !cart.update_quantity(product_id, quantity) {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub fn remove_item(cart: &mut Cart, product_id: &str) -> AppResult<()> {
    let product_id = parse_id(product_id)?;
    if !cart.remove(product_id) {
        return Err(AppError::NotFound);
    }
    Ok(())
}
