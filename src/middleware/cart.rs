use tower_sessions::Session;

use crate::{
    cart::Cart,
    error::{AppError, AppResult},
};

/// Session key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// First interaction gets an empty cart; it lives only as long as the session.
pub async fn load_cart(session: &Session) -> AppResult<Cart> {
    let cart = session
        .get::<Cart>(CART_KEY)
        .await
        .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?;
    Ok(cart.unwrap_or_default())
}

pub async fn save_cart(session: &Session, cart: &Cart) -> AppResult<()> {
    session
        .insert(CART_KEY, cart)
        .await
        .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))
}
