//! # Payment Allocator
//!
//! Pure computation of per-tender fees, charge amounts, remaining balance,
//! and cash change, given a sale total and an ordered list of tender
//! attempts.
//!
//! ## Allocation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  per tender:  fee     = method fee Adjustment on amount             │
//! │               charge  = amount + fee   (customer-borne fee)         │
//! │                         amount         (store-absorbed fee)         │
//! │                                                                     │
//! │  running:     remaining = total − Σ accepted amounts                │
//! │               non-cash tender > remaining  →  rejected              │
//! │               cash may exceed remaining    →  excess becomes change │
//! │                                                                     │
//! │  payable when Σ amounts ≥ total (exact cents, no float rounding)    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Allocation never fails on underpayment - a partial plan with a non-zero
//! remaining balance is exactly what a live tender screen needs. The commit
//! path is where underpayment becomes an error.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{Adjustment, Money};

// =============================================================================
// Tender Kind
// =============================================================================

/// One instrument of payment contributing to a sale's total.
///
/// A closed variant set validated against a configuration snapshot fetched
/// once per commit attempt - never re-read mid-transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TenderKind {
    /// Physical cash. The only kind allowed to exceed the remaining
    /// balance; the excess is returned as change.
    Cash,
    /// Pix bank transfer (key entry).
    Pix,
    /// Pix via QR code.
    PixQr,
    /// Debit card.
    Debit,
    /// Credit card.
    Credit,
    /// Store credit ("fiado"): the customer owes the amount by a future
    /// due date. Requires a customer on the sale.
    DeferredCredit,
}

impl TenderKind {
    /// Whether this kind settles as physical cash in the drawer.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, TenderKind::Cash)
    }
}

impl fmt::Display for TenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TenderKind::Cash => "cash",
            TenderKind::Pix => "pix",
            TenderKind::PixQr => "pix_qr",
            TenderKind::Debit => "debit",
            TenderKind::Credit => "credit",
            TenderKind::DeferredCredit => "deferred_credit",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Who pays a payment-method surcharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum FeeResponsibility {
    /// Fee is added to what the customer is asked to pay.
    Customer,
    /// Fee reduces the store's net proceeds; the charge stays the tender
    /// amount.
    Store,
}

/// Configuration for a single payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodConfig {
    pub enabled: bool,
    pub fee: Adjustment,
    pub fee_responsibility: FeeResponsibility,
}

impl MethodConfig {
    /// Enabled, fee-free, store-responsibility config.
    pub const fn free() -> Self {
        MethodConfig {
            enabled: true,
            fee: Adjustment::Fixed(0),
            fee_responsibility: FeeResponsibility::Store,
        }
    }
}

/// The store's payment-method configuration snapshot.
///
/// Loaded once per commit attempt from the configuration store; methods
/// without an explicit entry fall back to an enabled, fee-free default
/// with the store-wide fee responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfig {
    pub methods: HashMap<TenderKind, MethodConfig>,
    pub default_responsibility: FeeResponsibility,
}

impl PaymentConfig {
    /// Every method enabled, no fees. Useful default and test fixture.
    pub fn allow_all() -> Self {
        PaymentConfig {
            methods: HashMap::new(),
            default_responsibility: FeeResponsibility::Store,
        }
    }

    /// Sets the configuration for one method (builder style).
    pub fn with_method(mut self, kind: TenderKind, config: MethodConfig) -> Self {
        self.methods.insert(kind, config);
        self
    }

    /// Resolves the effective configuration for a tender kind.
    pub fn method(&self, kind: TenderKind) -> MethodConfig {
        self.methods.get(&kind).copied().unwrap_or(MethodConfig {
            enabled: true,
            fee: Adjustment::Fixed(0),
            fee_responsibility: self.default_responsibility,
        })
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        PaymentConfig::allow_all()
    }
}

// =============================================================================
// Tender Input / Output
// =============================================================================

/// One tender attempt as submitted by the client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderRequest {
    pub kind: TenderKind,
    pub amount_cents: i64,
}

impl TenderRequest {
    pub const fn new(kind: TenderKind, amount_cents: i64) -> Self {
        TenderRequest { kind, amount_cents }
    }
}

/// One accepted tender with its computed fee and charge amount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderEntry {
    pub kind: TenderKind,
    /// What this tender contributes toward the sale total.
    pub amount_cents: i64,
    /// Method fee computed on the amount.
    pub fee_cents: i64,
    /// What the customer is actually asked to pay on this instrument.
    /// Exceeds `amount_cents` when the fee is customer-borne.
    pub charge_cents: i64,
    /// True when the store absorbs the fee (reduces net proceeds without
    /// changing the charge).
    pub store_absorbed: bool,
}

/// The result of allocating tenders against a sale total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPlan {
    pub entries: Vec<TenderEntry>,
    /// Σ tender amounts.
    pub tendered_cents: i64,
    /// Balance still due, floored at zero.
    pub remaining_cents: i64,
    /// Cash to hand back. Non-zero only when cash pushed the tendered sum
    /// past the total.
    pub change_cents: i64,
}

impl PaymentPlan {
    /// Whether the plan fully covers the sale total.
    #[inline]
    pub fn is_payable(&self) -> bool {
        self.remaining_cents == 0
    }

    /// Total of all fees, customer-borne and store-absorbed alike.
    pub fn fee_total_cents(&self) -> i64 {
        self.entries.iter().map(|e| e.fee_cents).sum()
    }
}

// =============================================================================
// Allocation
// =============================================================================

/// Allocates an ordered list of tender attempts against a sale total.
///
/// Rejections (disabled method, over-the-balance non-cash tender, fiado
/// without a customer) are returned as values; an underpaid plan is *not*
/// an error here - check [`PaymentPlan::is_payable`] before committing.
pub fn allocate_payment(
    total: Money,
    tenders: &[TenderRequest],
    config: &PaymentConfig,
    has_customer: bool,
) -> CoreResult<PaymentPlan> {
    let mut entries = Vec::with_capacity(tenders.len());
    let mut tendered = Money::zero();

    for tender in tenders {
        let method = config.method(tender.kind);
        if !method.enabled {
            return Err(CoreError::PaymentMethodDisabled(tender.kind));
        }
        if tender.kind == TenderKind::DeferredCredit && !has_customer {
            return Err(CoreError::DeferredCreditRequiresCustomer);
        }

        let remaining = (total - tendered).clamp_non_negative();
        let amount = Money::from_cents(tender.amount_cents);
        if !amount.is_positive() {
            return Err(CoreError::InvalidPaymentAmount {
                method: tender.kind,
                amount_cents: tender.amount_cents,
                remaining_cents: remaining.cents(),
            });
        }
        // Only cash may overshoot the balance; for every other instrument
        // an overshoot would be an un-refundable charge.
        if !tender.kind.is_cash() && amount > remaining {
            return Err(CoreError::InvalidPaymentAmount {
                method: tender.kind,
                amount_cents: tender.amount_cents,
                remaining_cents: remaining.cents(),
            });
        }

        let fee = method.fee.amount_on(amount);
        if fee.is_negative() {
            return Err(CoreError::NegativeAmount { field: "method fee" });
        }
        let (charge, store_absorbed) = match method.fee_responsibility {
            FeeResponsibility::Customer => (amount + fee, false),
            FeeResponsibility::Store => (amount, true),
        };

        entries.push(TenderEntry {
            kind: tender.kind,
            amount_cents: amount.cents(),
            fee_cents: fee.cents(),
            charge_cents: charge.cents(),
            store_absorbed,
        });
        tendered += amount;
    }

    // Non-cash tenders are capped at the live remaining balance above, so
    // any excess necessarily came from cash.
    let remaining = (total - tendered).clamp_non_negative();
    let change = (tendered - total).clamp_non_negative();

    Ok(PaymentPlan {
        entries,
        tendered_cents: tendered.cents(),
        remaining_cents: remaining.cents(),
        change_cents: change.cents(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn total(cents: i64) -> Money {
        Money::from_cents(cents)
    }

    #[test]
    fn test_single_cash_tender_with_change() {
        // total 180.00, one cash tender of 200.00 => change 20.00
        let plan = allocate_payment(
            total(18000),
            &[TenderRequest::new(TenderKind::Cash, 20000)],
            &PaymentConfig::allow_all(),
            false,
        )
        .unwrap();

        assert!(plan.is_payable());
        assert_eq!(plan.tendered_cents, 20000);
        assert_eq!(plan.remaining_cents, 0);
        assert_eq!(plan.change_cents, 2000);
    }

    #[test]
    fn test_customer_borne_fee_raises_charge() {
        // credit 100.00 with 3% customer-borne fee => fee 3.00, charge 103.00
        let config = PaymentConfig::allow_all().with_method(
            TenderKind::Credit,
            MethodConfig {
                enabled: true,
                fee: Adjustment::Percent(300),
                fee_responsibility: FeeResponsibility::Customer,
            },
        );
        let plan = allocate_payment(
            total(10000),
            &[TenderRequest::new(TenderKind::Credit, 10000)],
            &config,
            false,
        )
        .unwrap();

        let entry = &plan.entries[0];
        assert_eq!(entry.fee_cents, 300);
        assert_eq!(entry.charge_cents, 10300);
        assert!(!entry.store_absorbed);
    }

    #[test]
    fn test_store_borne_fee_keeps_charge() {
        let config = PaymentConfig::allow_all().with_method(
            TenderKind::Credit,
            MethodConfig {
                enabled: true,
                fee: Adjustment::Percent(300),
                fee_responsibility: FeeResponsibility::Store,
            },
        );
        let plan = allocate_payment(
            total(10000),
            &[TenderRequest::new(TenderKind::Credit, 10000)],
            &config,
            false,
        )
        .unwrap();

        let entry = &plan.entries[0];
        assert_eq!(entry.fee_cents, 300);
        assert_eq!(entry.charge_cents, 10000);
        assert!(entry.store_absorbed);
        assert_eq!(plan.fee_total_cents(), 300);
    }

    #[test]
    fn test_non_cash_cannot_exceed_remaining() {
        let result = allocate_payment(
            total(10000),
            &[TenderRequest::new(TenderKind::Debit, 10001)],
            &PaymentConfig::allow_all(),
            false,
        );
        assert!(matches!(
            result,
            Err(CoreError::InvalidPaymentAmount {
                method: TenderKind::Debit,
                amount_cents: 10001,
                remaining_cents: 10000,
            })
        ));
    }

    #[test]
    fn test_split_tender_mixed_change() {
        // total 180.00: debit 100.00 then cash 100.00 => change 20.00,
        // which could only have come from the cash portion.
        let plan = allocate_payment(
            total(18000),
            &[
                TenderRequest::new(TenderKind::Debit, 10000),
                TenderRequest::new(TenderKind::Cash, 10000),
            ],
            &PaymentConfig::allow_all(),
            false,
        )
        .unwrap();

        assert!(plan.is_payable());
        assert_eq!(plan.change_cents, 2000);
    }

    #[test]
    fn test_underpaid_plan_is_not_an_error() {
        let plan = allocate_payment(
            total(18000),
            &[TenderRequest::new(TenderKind::Pix, 5000)],
            &PaymentConfig::allow_all(),
            false,
        )
        .unwrap();

        assert!(!plan.is_payable());
        assert_eq!(plan.remaining_cents, 13000);
        assert_eq!(plan.change_cents, 0);
    }

    #[test]
    fn test_disabled_method_rejected() {
        let config = PaymentConfig::allow_all().with_method(
            TenderKind::Pix,
            MethodConfig {
                enabled: false,
                ..MethodConfig::free()
            },
        );
        let result = allocate_payment(
            total(1000),
            &[TenderRequest::new(TenderKind::Pix, 1000)],
            &config,
            false,
        );
        assert!(matches!(
            result,
            Err(CoreError::PaymentMethodDisabled(TenderKind::Pix))
        ));
    }

    #[test]
    fn test_deferred_credit_requires_customer() {
        let result = allocate_payment(
            total(5000),
            &[TenderRequest::new(TenderKind::DeferredCredit, 5000)],
            &PaymentConfig::allow_all(),
            false,
        );
        assert!(matches!(
            result,
            Err(CoreError::DeferredCreditRequiresCustomer)
        ));

        let plan = allocate_payment(
            total(5000),
            &[TenderRequest::new(TenderKind::DeferredCredit, 5000)],
            &PaymentConfig::allow_all(),
            true,
        )
        .unwrap();
        assert!(plan.is_payable());
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let result = allocate_payment(
            total(1000),
            &[TenderRequest::new(TenderKind::Cash, 0)],
            &PaymentConfig::allow_all(),
            false,
        );
        assert!(matches!(
            result,
            Err(CoreError::InvalidPaymentAmount { .. })
        ));
    }

    #[test]
    fn test_second_non_cash_after_full_payment_rejected() {
        // cash already covered everything; a debit swipe on top must fail
        let result = allocate_payment(
            total(1000),
            &[
                TenderRequest::new(TenderKind::Cash, 1500),
                TenderRequest::new(TenderKind::Debit, 100),
            ],
            &PaymentConfig::allow_all(),
            false,
        );
        assert!(matches!(
            result,
            Err(CoreError::InvalidPaymentAmount {
                remaining_cents: 0,
                ..
            })
        ));
    }
}
