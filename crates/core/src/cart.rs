//! Cart and favorites state.
//!
//! The cart lives entirely in the visitor's session; nothing is persisted by
//! the REST API. Each line snapshots the product's name, price and image at
//! the time it was added so the cart page renders without a catalog fetch.

use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::types::{Price, ProductId};

/// Largest quantity a single line accepts.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartLine {
    /// Price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` of `product`, merging with an existing line.
    /// A zero quantity is ignored.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.line_mut(&product.id) {
            line.quantity = line.quantity.saturating_add(quantity).min(MAX_LINE_QUANTITY);
            return;
        }
        self.lines.push(CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.primary_image().map(String::from),
            quantity: quantity.min(MAX_LINE_QUANTITY),
        });
    }

    /// Set the quantity of a line; zero removes it. Returns whether a line matched.
    pub fn update(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }
        match self.line_mut(product_id) {
            Some(line) => {
                line.quantity = quantity.min(MAX_LINE_QUANTITY);
                true
            }
            None => false,
        }
    }

    /// Remove a line. Returns whether a line matched.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Σ price × quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Σ quantity over all lines, for the header badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |count: u32, line| count.saturating_add(line.quantity))
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
    }
}

/// The signed-in user's favorite products, as last fetched from the API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Favorites {
    products: Vec<Product>,
}

impl Favorites {
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.products.iter().any(|p| &p.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Σ price, each favorite counted once.
    #[must_use]
    pub fn total(&self) -> Price {
        self.products.iter().map(|p| p.price).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CategoryId;

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Bouquet {id}"),
            description: String::new(),
            price: Price::from_cents(cents),
            category: CategoryId::new("bouquets"),
            images: vec![format!("/uploads/{id}.jpg")],
            image: None,
            is_featured: false,
            is_best_seller: false,
            colors: Vec::new(),
            occasions: Vec::new(),
            city: None,
            store: None,
            created_at: None,
        }
    }

    #[test]
    fn test_add_merges_lines() {
        let mut cart = Cart::default();
        cart.add(&product("a", 1_000), 1);
        cart.add(&product("a", 1_000), 2);
        cart.add(&product("b", 250), 4);
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.item_count(), 7);
        assert_eq!(cart.total(), Price::from_cents(4_000));
        assert_eq!(cart.lines()[0].image.as_deref(), Some("/uploads/a.jpg"));
    }

    #[test]
    fn test_total_tracks_every_mutation() {
        let mut cart = Cart::default();
        cart.add(&product("a", 1_000), 1);
        cart.add(&product("b", 500), 2);
        assert_eq!(cart.total(), Price::from_cents(2_000));

        assert!(cart.update(&ProductId::new("b"), 5));
        assert_eq!(cart.total(), Price::from_cents(3_500));

        assert!(cart.remove(&ProductId::new("a")));
        assert_eq!(cart.total(), Price::from_cents(2_500));

        assert!(cart.update(&ProductId::new("b"), 0));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_unknown_lines_and_zero_quantity() {
        let mut cart = Cart::default();
        cart.add(&product("a", 100), 0);
        assert!(cart.is_empty());
        assert!(!cart.update(&ProductId::new("missing"), 3));
        assert!(!cart.remove(&ProductId::new("missing")));
    }

    #[test]
    fn test_quantity_is_capped() {
        let mut cart = Cart::default();
        cart.add(&product("a", 100), 90);
        cart.add(&product("a", 100), 90);
        assert_eq!(cart.item_count(), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_total_of_huge_prices_does_not_overflow() {
        let mut cart = Cart::default();
        let mut dear = product("dear", 0);
        dear.price = Price::new(rust_decimal::Decimal::MAX);
        cart.add(&dear, 2);
        cart.add(&product("b", 100), 1);
        assert_eq!(cart.total(), Price::new(rust_decimal::Decimal::MAX));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::default();
        cart.add(&product("a", 100), 1);
        cart.clear();
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_favorites_total_and_contains() {
        let favorites = Favorites::new(vec![product("a", 1_500), product("b", 2_500)]);
        assert_eq!(favorites.total(), Price::from_cents(4_000));
        assert!(favorites.contains(&ProductId::new("b")));
        assert!(!favorites.contains(&ProductId::new("c")));
        assert_eq!(favorites.len(), 2);
    }
}
