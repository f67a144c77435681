//! # Cart
//!
//! The operator's working list of lines to purchase.
//!
//! ## Merge-by-Code Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Adding a Product                                     │
//! │                                                                         │
//! │  add_product(Tea)                                                       │
//! │       │                                                                 │
//! │       ├── line with code "A1" exists? ── YES ──► quantity += 1         │
//! │       │                                          (rejected at 99)      │
//! │       │                                                                 │
//! │       └── NO ──► push CartLine { Tea, qty: 1 } at the end              │
//! │                                                                         │
//! │  INVARIANT: no two lines share a code; insertion order is stable.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, PurchaseLine};
use crate::MAX_LINE_QUANTITY;

/// A product in the cart together with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    /// The product as it was fetched from the catalog.
    pub product: Product,

    /// Quantity, always within 1..=99.
    pub quantity: u32,
}

impl CartLine {
    /// Creates a line holding one unit of `product`.
    pub fn new(product: Product) -> Self {
        CartLine {
            product,
            quantity: 1,
        }
    }

    /// The product code this line is keyed by.
    pub fn code(&self) -> &str {
        &self.product.code
    }

    /// Unit price × quantity, for the per-line subtotal on screen.
    pub fn line_total(&self) -> Money {
        self.product.price.multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by product code
/// - Every quantity is within 1..=99
/// - Lines keep the order in which their code was first added
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds one unit of a product, merging with an existing line.
    ///
    /// ## Returns
    /// - `Ok(&CartLine)` with the affected line
    /// - `Err(CoreError::QuantityLimit)` if that line is already at 99;
    ///   the cart is unchanged
    pub fn add_product(&mut self, product: &Product) -> CoreResult<&CartLine> {
        if let Some(idx) = self.position(&product.code) {
            let line = &mut self.lines[idx];
            if line.quantity >= MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityLimit {
                    code: product.code.clone(),
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity += 1;
            return Ok(&self.lines[idx]);
        }

        self.lines.push(CartLine::new(product.clone()));
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Overwrites the quantity of the line with `code`.
    ///
    /// The caller validates `quantity` (see [`crate::validation`]); this
    /// only enforces that the line exists.
    pub fn set_quantity(&mut self, code: &str, quantity: u32) -> CoreResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.code() == code)
            .ok_or_else(|| CoreError::NotInCart(code.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes the line with `code`, returning it. Absent codes are a no-op.
    pub fn remove(&mut self, code: &str) -> Option<CartLine> {
        self.position(code).map(|idx| self.lines.remove(idx))
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Looks up a line by code.
    pub fn get(&self, code: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.code() == code)
    }

    /// All lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of the line totals. Display only: the ledger's totals are
    /// authoritative.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// `{code, quantity}` pairs for a purchase request, in cart order.
    pub fn purchase_lines(&self) -> Vec<PurchaseLine> {
        self.lines
            .iter()
            .map(|l| PurchaseLine {
                code: l.code().to_string(),
                quantity: l.quantity,
            })
            .collect()
    }

    fn position(&self, code: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.code() == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(code: &str, price: i64) -> Product {
        Product::new(code, format!("Product {}", code), Money::from_minor(price))
    }

    #[test]
    fn test_cart_add_product() {
        let mut cart = Cart::new();
        let line = cart.add_product(&product("A1", 150)).unwrap();

        assert_eq!(line.quantity, 1);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.subtotal(), Money::from_minor(150));
    }

    #[test]
    fn test_cart_add_same_product_increases_quantity() {
        let mut cart = Cart::new();
        let tea = product("A1", 150);

        cart.add_product(&tea).unwrap();
        cart.add_product(&tea).unwrap();

        assert_eq!(cart.len(), 1); // Still one line
        assert_eq!(cart.get("A1").unwrap().quantity, 2);
        assert_eq!(cart.get("A1").unwrap().line_total(), Money::from_minor(300));
    }

    #[test]
    fn test_cart_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.add_product(&product("A1", 150)).unwrap();
        cart.add_product(&product("B2", 220)).unwrap();
        cart.add_product(&product("C3", 275)).unwrap();
        cart.add_product(&product("A1", 150)).unwrap();
        cart.set_quantity("B2", 7).unwrap();

        let codes: Vec<&str> = cart.lines().iter().map(CartLine::code).collect();
        assert_eq!(codes, ["A1", "B2", "C3"]);
    }

    #[test]
    fn test_cart_rejects_increment_past_max() {
        let mut cart = Cart::new();
        let tea = product("A1", 150);
        cart.add_product(&tea).unwrap();
        cart.set_quantity("A1", MAX_LINE_QUANTITY).unwrap();
        let before = cart.clone();

        let err = cart.add_product(&tea).unwrap_err();
        assert!(matches!(err, CoreError::QuantityLimit { max: 99, .. }));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_cart_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add_product(&product("A1", 150)).unwrap();
        let before = cart.clone();

        assert!(cart.remove("ZZ").is_none());
        assert_eq!(cart, before);

        let removed = cart.remove("A1").unwrap();
        assert_eq!(removed.code(), "A1");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_set_quantity_missing_line() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.set_quantity("A1", 3),
            Err(CoreError::NotInCart("A1".to_string()))
        );
    }

    #[test]
    fn test_cart_purchase_lines_omit_price() {
        let mut cart = Cart::new();
        cart.add_product(&product("A1", 150)).unwrap();
        cart.add_product(&product("B2", 220)).unwrap();
        cart.set_quantity("B2", 3).unwrap();

        let lines = cart.purchase_lines();
        assert_eq!(
            lines,
            vec![
                PurchaseLine { code: "A1".into(), quantity: 1 },
                PurchaseLine { code: "B2".into(), quantity: 3 },
            ]
        );
        assert_eq!(cart.total_quantity(), 4);
    }
}
