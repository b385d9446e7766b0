//! # Domain Types
//!
//! Persisted domain types for Balcão POS.
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (product sku) - human-readable
//!
//! ## Snapshot Pattern
//! Sale children (`SaleItem`, `SaleTender`) freeze the data they were
//! priced against. A sale is immutable once created: later product or fee
//! edits never rewrite history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::tender::TenderKind;

// =============================================================================
// Product
// =============================================================================

/// A catalog product with its stock level.
///
/// The catalog itself (CRUD, search) is a collaborator; the sale pipeline
/// only needs the price for re-pricing and compare-and-decrement access to
/// `stock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown on receipts.
    pub name: String,

    /// Price in cents.
    pub price_cents: i64,

    /// Current stock level. Never negative for committed sales.
    pub stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A store customer. Needed by the sale pipeline for purchase history and
/// as the debtor on fiado obligations; full customer management is a
/// collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Created exactly once by the checkout transaction and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub seller_id: String,
    pub customer_id: Option<String>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub addition_cents: i64,
    pub total_cents: i64,
    /// Σ method fees across tenders, customer-borne and store-absorbed.
    pub fee_cents: i64,
    /// Cash handed back to the customer.
    pub change_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item of a committed sale (frozen product snapshot).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// SKU at time of sale (frozen).
    pub sku_snapshot: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// Item discount actually applied, in cents.
    pub discount_cents: i64,
    /// Line total after discount.
    pub net_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// One tender of a committed sale, with its computed fee and charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SaleTender {
    pub id: String,
    pub sale_id: String,
    pub method: TenderKind,
    pub amount_cents: i64,
    pub fee_cents: i64,
    pub charge_cents: i64,
    pub store_absorbed: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Customer Purchase History
// =============================================================================

/// Append-only purchase-history entry on a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: String,
    pub customer_id: String,
    pub sale_id: String,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Deferred Credit ("fiado")
// =============================================================================

/// A deferred-payment obligation, created 1:1 with each deferred-credit
/// tender of a sale. Settlement (flipping `paid`) is an external
/// collaborator's operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct CreditObligation {
    pub id: String,
    pub sale_id: String,
    pub customer_id: String,
    pub amount_cents: i64,
    /// Sale date plus the fixed credit term.
    pub due_at: DateTime<Utc>,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cash Register
// =============================================================================

/// Lifecycle state of a register session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum RegisterStatus {
    /// Drawer in use; sales may be recorded against it.
    Open,
    /// Counted and reconciled; terminal state.
    Closed,
}

/// The time-bounded period during which a cashier operates a drawer, from
/// opening float to closing count. At most one open session per cashier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct RegisterSession {
    pub id: String,
    pub cashier_id: String,
    pub status: RegisterStatus,
    pub opening_float_cents: i64,
    /// Running total of sale movements appended by the checkout path.
    pub sales_total_cents: i64,
    /// Amount counted at close.
    pub counted_cents: Option<i64>,
    /// `counted − expected` at close. Reported, never silently corrected.
    pub variance_cents: Option<i64>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl RegisterSession {
    /// Cash mathematically expected in the drawer:
    /// opening float + accumulated sale totals.
    #[inline]
    pub fn expected(&self) -> Money {
        Money::from_cents(self.opening_float_cents + self.sales_total_cents)
    }

    /// Variance a closing count would produce (`counted − expected`).
    /// Pure; the ledger persists this at close.
    #[inline]
    pub fn reconcile(&self, counted: Money) -> Money {
        counted - self.expected()
    }
}

/// Kind of a cash-ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum CashMovementKind {
    /// One entry per committed sale, keyed by the sale id.
    Sale,
}

/// Append-only ledger entry tied to a register session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct CashMovement {
    pub id: String,
    pub session_id: String,
    pub kind: CashMovementKind,
    /// Idempotency key: a sale lands in the ledger at most once.
    pub sale_id: Option<String>,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn session(float_cents: i64, sales_cents: i64) -> RegisterSession {
        RegisterSession {
            id: "sess-1".to_string(),
            cashier_id: "cashier-1".to_string(),
            status: RegisterStatus::Open,
            opening_float_cents: float_cents,
            sales_total_cents: sales_cents,
            counted_cents: None,
            variance_cents: None,
            opened_at: Utc::now(),
            closed_at: None,
        }
    }

    #[test]
    fn test_expected_is_float_plus_sales() {
        let s = session(10000, 45000);
        assert_eq!(s.expected().cents(), 55000);
    }

    #[test]
    fn test_reconcile_reports_shortfall() {
        // float 100.00, sales 450.00, counted 540.00 => variance -10.00
        let s = session(10000, 45000);
        assert_eq!(s.reconcile(Money::from_cents(54000)).cents(), -1000);
    }

    #[test]
    fn test_reconcile_reports_overage() {
        let s = session(10000, 45000);
        assert_eq!(s.reconcile(Money::from_cents(55500)).cents(), 500);
    }
}
