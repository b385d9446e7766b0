//! # Cart Pricing Engine
//!
//! Pure computation of line totals, cart-level adjustments, and the sale
//! total from a cart snapshot.
//!
//! ## Pricing Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  per item:   line_total   = unit_price × quantity                   │
//! │              discount     = Adjustment on line_total, clamped to    │
//! │                             [0, line_total]                         │
//! │              item_net     = line_total − discount                   │
//! │                                                                     │
//! │  cart:       subtotal     = Σ item_net                              │
//! │              discount     = Adjustment on subtotal   ┐ siblings of  │
//! │              addition     = Adjustment on subtotal   ┘ subtotal,    │
//! │                                            never stacked            │
//! │              total        = subtotal − discount + addition, ≥ 0     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same `price_cart` runs client-side for live preview and server-side
//! at commit time; the server result is the only one that counts.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{Adjustment, Money};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Model
// =============================================================================

/// One line of a cart.
///
/// Carries a frozen snapshot of the product (sku, name, price) taken when
/// the item was added. The commit path re-reads the catalog and prices
/// against server-held values; the snapshot is what ends up on the sale
/// record so later product edits never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product ID (UUID).
    pub product_id: String,

    /// SKU at time of adding (frozen).
    pub sku: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Price in cents at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Quantity, always >= 1.
    pub quantity: i64,

    /// Per-item discount.
    #[serde(default)]
    pub discount: Adjustment,
}

impl CartItem {
    /// Line total before discount (unit price × quantity).
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }

    /// Discount amount for this line, clamped to `[0, line_total]` so the
    /// effective item total can never go negative.
    pub fn discount_amount(&self) -> Money {
        let line_total = self.line_total();
        let discount = self.discount.amount_on(line_total);
        if discount > line_total {
            line_total
        } else {
            discount.clamp_non_negative()
        }
    }

    /// Line total after discount.
    pub fn net_total(&self) -> Money {
        self.line_total() - self.discount_amount()
    }
}

/// A cart snapshot: the full input to pricing and commit.
///
/// Built and owned by the client as a plain serializable value - there is
/// no server-side mutable cart. The server receives the whole cart once,
/// at checkout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Ordered line items.
    pub items: Vec<CartItem>,

    /// Cart-level discount, computed against the subtotal.
    #[serde(default)]
    pub discount: Adjustment,

    /// Cart-level addition (delivery fee, service charge), also computed
    /// against the subtotal.
    #[serde(default)]
    pub addition: Adjustment,

    /// Customer attached to the sale, if any. Required when any tender is
    /// deferred credit.
    #[serde(default)]
    pub customer_id: Option<String>,
}

// =============================================================================
// Quote
// =============================================================================

/// The result of pricing a cart. All values in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartQuote {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub addition_cents: i64,
    pub total_cents: i64,
}

impl CartQuote {
    /// Sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Prices a cart snapshot.
///
/// Pure and deterministic; validation failures are returned as values.
/// Both cart-level adjustments are computed against the pre-adjustment
/// subtotal - a 10% discount and a 5% addition on a 200.00 subtotal give
/// `200 − 20 + 10 = 190`, not `200 − 20 = 180` then `+9`.
pub fn price_cart(cart: &Cart) -> CoreResult<CartQuote> {
    if cart.items.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    if cart.items.len() > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }
    if !cart.discount.is_non_negative() {
        return Err(CoreError::NegativeAmount {
            field: "cart discount",
        });
    }
    if !cart.addition.is_non_negative() {
        return Err(CoreError::NegativeAmount {
            field: "cart addition",
        });
    }

    let mut subtotal = Money::zero();
    for item in &cart.items {
        if item.quantity < 1 || item.quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::InvalidQuantity {
                sku: item.sku.clone(),
                quantity: item.quantity,
            });
        }
        if item.unit_price_cents < 0 {
            return Err(CoreError::NegativeAmount {
                field: "unit price",
            });
        }
        if !item.discount.is_non_negative() {
            return Err(CoreError::NegativeAmount {
                field: "item discount",
            });
        }
        subtotal += item.net_total();
    }

    let discount = cart.discount.amount_on(subtotal);
    let addition = cart.addition.amount_on(subtotal);
    let total = (subtotal - discount + addition).clamp_non_negative();

    Ok(CartQuote {
        subtotal_cents: subtotal.cents(),
        discount_cents: discount.cents(),
        addition_cents: addition.cents(),
        total_cents: total.cents(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(sku: &str, price_cents: i64, qty: i64, discount: Adjustment) -> CartItem {
        CartItem {
            product_id: format!("prod-{sku}"),
            sku: sku.to_string(),
            name: sku.to_string(),
            unit_price_cents: price_cents,
            quantity: qty,
            discount,
        }
    }

    #[test]
    fn test_item_percentage_discount() {
        // price 100.00, qty 2, item discount 10% => net 180.00
        let it = item("A", 10000, 2, Adjustment::Percent(1000));
        assert_eq!(it.line_total().cents(), 20000);
        assert_eq!(it.discount_amount().cents(), 2000);
        assert_eq!(it.net_total().cents(), 18000);
    }

    #[test]
    fn test_item_discount_clamped_to_line_total() {
        // fixed discount larger than the line: item nets to zero, not negative
        let it = item("A", 500, 1, Adjustment::Fixed(10000));
        assert_eq!(it.discount_amount().cents(), 500);
        assert_eq!(it.net_total().cents(), 0);
    }

    #[test]
    fn test_cart_fixed_discount_off_subtotal() {
        // one item netting 180.00, cart discount fixed 9.00 => total 171.00
        let cart = Cart {
            items: vec![item("A", 10000, 2, Adjustment::Percent(1000))],
            discount: Adjustment::Fixed(900),
            addition: Adjustment::none(),
            customer_id: None,
        };
        let quote = price_cart(&cart).unwrap();
        assert_eq!(quote.subtotal_cents, 18000);
        assert_eq!(quote.discount_cents, 900);
        assert_eq!(quote.addition_cents, 0);
        assert_eq!(quote.total_cents, 17100);
    }

    #[test]
    fn test_addition_computed_from_subtotal_not_discounted_value() {
        // subtotal 200.00, discount 10% (=20.00), addition 5% (=10.00)
        // total = 200 - 20 + 10 = 190.00; if the addition were stacked on
        // the discounted value it would be 9.00 and total 189.00.
        let cart = Cart {
            items: vec![item("A", 20000, 1, Adjustment::none())],
            discount: Adjustment::Percent(1000),
            addition: Adjustment::Percent(500),
            customer_id: None,
        };
        let quote = price_cart(&cart).unwrap();
        assert_eq!(quote.discount_cents, 2000);
        assert_eq!(quote.addition_cents, 1000);
        assert_eq!(quote.total_cents, 19000);
    }

    #[test]
    fn test_total_clamped_to_zero() {
        let cart = Cart {
            items: vec![item("A", 1000, 1, Adjustment::none())],
            discount: Adjustment::Fixed(5000),
            addition: Adjustment::none(),
            customer_id: None,
        };
        let quote = price_cart(&cart).unwrap();
        assert_eq!(quote.total_cents, 0);
    }

    #[test]
    fn test_empty_cart_rejected() {
        let cart = Cart::default();
        assert!(matches!(price_cart(&cart), Err(CoreError::EmptyCart)));
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let cart = Cart {
            items: vec![item("A", 1000, 0, Adjustment::none())],
            ..Cart::default()
        };
        assert!(matches!(
            price_cart(&cart),
            Err(CoreError::InvalidQuantity { quantity: 0, .. })
        ));
    }

    #[test]
    fn test_negative_inputs_rejected() {
        let cart = Cart {
            items: vec![item("A", -100, 1, Adjustment::none())],
            ..Cart::default()
        };
        assert!(matches!(
            price_cart(&cart),
            Err(CoreError::NegativeAmount { .. })
        ));

        let cart = Cart {
            items: vec![item("A", 100, 1, Adjustment::none())],
            discount: Adjustment::Fixed(-500),
            ..Cart::default()
        };
        assert!(matches!(
            price_cart(&cart),
            Err(CoreError::NegativeAmount { .. })
        ));
    }
}
