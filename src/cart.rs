use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::Product,
    error::{AppError, AppResult},
};

/// One product line. `unit_price` and `title` are snapshots of the catalog,
/// refreshed by [`Cart::update_prices`] before any totalling.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub product_id: Uuid,
    pub title: String,
    pub unit_price: i64,
    pub quantity: i64,
    pub line_total: i64,
}

/// Session-scoped shopping cart. Lives serialized inside the visitor's
/// session, hydrated per request, never shared across sessions. Totals are
/// recomputed on every mutation, so the struct is always consistent with its
/// own lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total_quantity: i64,
    pub grand_total: i64,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merge into an existing line for the same product, or append a new one.
    pub fn add(&mut self, product: &Product, quantity: i64) -> AppResult<()> {
        let product_id = product.id.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("unsaved product cannot go into a cart"))
        })?;

        match self.line_mut(product_id) {
            Some(line) => {
                line.quantity += quantity;
                line.title = product.title.clone();
                line.unit_price = product.price;
            }
            None => self.items.push(CartItem {
                product_id,
                title: product.title.clone(),
                unit_price: product.price,
                quantity,
                line_total: 0,
            }),
        }
        self.recompute_totals();
        Ok(())
    }

    /// Returns whether a line was actually removed.
    pub fn remove(&mut self, product_id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.product_id != product_id);
        let removed = self.items.len() < before;
        if removed {
            self.recompute_totals();
        }
        removed
    }

    /// A quantity of zero or less removes the line. Returns whether the line
    /// existed.
    pub fn update_quantity(&mut self, product_id: Uuid, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(product_id);
        }
        match self.line_mut(product_id) {
            Some(line) => {
                line.quantity = quantity;
                self.recompute_totals();
                true
            }
            None => false,
        }
    }

    /// Refresh unit prices and titles from the catalog. Lines whose product
    /// no longer exists are dropped.
    pub fn update_prices(&mut self, products: &[Product]) {
        self.items.retain_mut(|line| {
            match products
                .iter()
                .find(|product| product.id == Some(line.product_id))
            {
                Some(product) => {
                    line.unit_price = product.price;
                    line.title = product.title.clone();
                    true
                }
                None => false,
            }
        });
        self.recompute_totals();
    }

    pub fn recompute_totals(&mut self) {
        for line in &mut self.items {
            line.line_total = line.unit_price * line.quantity;
        }
        self.total_quantity = self.items.iter().map(|line| line.quantity).sum();
        self.grand_total = self.items.iter().map(|line| line.line_total).sum();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute_totals();
    }

    fn line_mut(&mut self, product_id: Uuid) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(title: &str, price: i64) -> Product {
        let mut product = Product::new(
            title.to_string(),
            Uuid::new_v4(),
            "summary".to_string(),
            "description".to_string(),
            price,
            "img.png".to_string(),
        );
        product.id = Some(Uuid::new_v4());
        product
    }

    #[test]
    fn add_then_remove_leaves_an_empty_cart() {
        let mut cart = Cart::default();
        let shoe = product("Shoe", 50_000);

        cart.add(&shoe, 2).unwrap();
        assert!(cart.remove(shoe.id.unwrap()));

        assert!(cart.is_empty());
        assert_eq!(cart.grand_total, 0);
        assert_eq!(cart.total_quantity, 0);
    }

    #[test]
    fn adding_the_same_product_twice_merges_into_one_line() {
        let mut cart = Cart::default();
        let shoe = product("Shoe", 50_000);

        cart.add(&shoe, 1).unwrap();
        cart.add(&shoe, 1).unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.items[0].line_total, 100_000);
        assert_eq!(cart.grand_total, 100_000);
    }

    #[test]
    fn zero_quantity_removes_the_line() {
        let mut cart = Cart::default();
        let shoe = product("Shoe", 50_000);
        let hat = product("Hat", 30_000);

        cart.add(&shoe, 2).unwrap();
        cart.add(&hat, 1).unwrap();
        assert!(cart.update_quantity(shoe.id.unwrap(), 0));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.grand_total, 30_000);

        assert!(!cart.update_quantity(shoe.id.unwrap(), 3));
    }

    #[test]
    fn price_refresh_retotals_and_drops_vanished_products() {
        let mut cart = Cart::default();
        let shoe = product("Shoe", 50_000);
        let hat = product("Hat", 30_000);
        cart.add(&shoe, 2).unwrap();
        cart.add(&hat, 1).unwrap();

        let mut repriced = shoe.clone();
        repriced.price = 60_000;
        cart.update_prices(std::slice::from_ref(&repriced));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].unit_price, 60_000);
        assert_eq!(cart.grand_total, 120_000);
    }
}
