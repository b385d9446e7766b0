//! # Checkout Service
//!
//! The transaction finalizer: the only state-mutating entry point of the
//! sale pipeline.
//!
//! ## Commit Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Priced ──► StockReserved ──► Committed                             │
//! │     │             │                                                 │
//! │     └─────────────┴──► Aborted (transaction rolls back, zero        │
//! │                        partial effects observable)                  │
//! │                                                                     │
//! │  One SQLite transaction spans:                                      │
//! │    1. open-session lookup (NoOpenRegister aborts before any write)  │
//! │    2. catalog snapshot + server-side re-pricing (client totals are  │
//! │       untrusted preview data)                                       │
//! │    3. conditional stock decrement per distinct product              │
//! │    4. sale + item + tender inserts (immutable snapshot)             │
//! │    5. customer purchase-history append                              │
//! │    6. one fiado obligation per deferred-credit tender               │
//! │    7. one cash movement + guarded running-total bump                │
//! │                                                                     │
//! │  Either every write lands, or none do.                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The payment configuration is loaded once, before the transaction
//! opens, and never re-read mid-commit.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::credit::{generate_obligation_id, CreditRepository};
use crate::repository::customer::CustomerRepository;
use crate::repository::product::ProductRepository;
use crate::repository::register::{generate_movement_id, RegisterRepository};
use crate::repository::sale::{
    generate_sale_id, generate_sale_item_id, generate_sale_tender_id, SaleRepository,
};
use balcao_core::{
    allocate_payment, price_cart, validation, Cart, CartItem, CartQuote, CashMovement,
    CashMovementKind, CoreError, CreditObligation, PurchaseRecord, Sale, SaleItem, SaleTender,
    TenderKind, TenderRequest, CREDIT_TERM_DAYS,
};

// =============================================================================
// Errors
// =============================================================================

/// Commit-time failures. Every variant means the sale was NOT recorded and
/// no state changed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Pricing or allocation rule violation (re-detected server-side).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A cart line references a product that does not exist or is
    /// inactive.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The attached customer does not exist.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// A cart line's quantity exceeded stock at the instant of commit.
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Tendered total does not cover the sale total.
    #[error("Sale underpaid: tendered {tendered_cents} of {total_cents} cents")]
    Underpaid {
        tendered_cents: i64,
        total_cents: i64,
    },

    /// The seller has no open register session; a sale cannot be recorded
    /// without an owning register.
    #[error("No open register session for cashier {0}")]
    NoOpenRegister(String),

    /// An atomic guard detected a concurrent update. Transient: nothing
    /// was persisted, the caller may retry with a fresh cart snapshot.
    #[error("Concurrent update detected, retry the sale")]
    Conflict,

    /// Infrastructure failure.
    #[error(transparent)]
    Db(DbError),
}

impl From<DbError> for CheckoutError {
    fn from(err: DbError) -> Self {
        match err {
            // Busy and the sale-movement idempotency key both mean "lost a
            // race, nothing persisted" - retryable.
            DbError::Busy => CheckoutError::Conflict,
            other => CheckoutError::Db(other),
        }
    }
}

impl CheckoutError {
    /// Whether a caller-driven retry with a fresh cart snapshot may
    /// succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, CheckoutError::Conflict)
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// Everything a caller needs to render a receipt for a committed sale.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub tenders: Vec<SaleTender>,
    /// Fiado obligations created by this sale (empty unless a
    /// deferred-credit tender was used).
    pub obligations: Vec<CreditObligation>,
    /// The server-side quote the sale was committed against.
    pub quote: CartQuote,
    /// Cash to hand back right now.
    pub change_cents: i64,
}

// =============================================================================
// Service
// =============================================================================

/// Orchestrates the atomic sale commit.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
}

impl CheckoutService {
    /// Creates a new CheckoutService.
    pub fn new(db: Database) -> Self {
        CheckoutService { db }
    }

    /// Commits a sale: re-prices the cart server-side, allocates the
    /// tenders, and lands every side effect - stock, sale record,
    /// customer history, fiado, cash ledger - in one transaction.
    ///
    /// The submitted cart is treated as intent (products, quantities,
    /// discounts, tenders); unit prices and fees are re-derived from
    /// server-held state. On any failure the transaction rolls back and
    /// the error names the precise reason.
    pub async fn commit_sale(
        &self,
        cart: &Cart,
        tenders: &[TenderRequest],
        seller_id: &str,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        validation::validate_entity_id("seller_id", seller_id).map_err(CoreError::from)?;
        if let Some(customer_id) = &cart.customer_id {
            validation::validate_entity_id("customer_id", customer_id).map_err(CoreError::from)?;
        }
        if cart.items.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        debug!(
            seller_id = %seller_id,
            items = cart.items.len(),
            tenders = tenders.len(),
            "Starting sale commit"
        );

        // Configuration snapshot: fetched once per attempt, never re-read
        // mid-transaction.
        let config = self.db.payment_config().load().await?;

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        // Step 1: the sale needs an owning register before anything else.
        let session = RegisterRepository::get_open_by_cashier_tx(&mut tx, seller_id)
            .await?
            .ok_or_else(|| CheckoutError::NoOpenRegister(seller_id.to_string()))?;

        // Step 2: catalog snapshot + server-side re-pricing. The client's
        // unit prices are preview data; the committed sale uses the
        // server's.
        let mut server_items = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let product = ProductRepository::fetch_tx(&mut tx, &item.product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| CheckoutError::ProductNotFound(item.product_id.clone()))?;

            server_items.push(CartItem {
                product_id: product.id,
                sku: product.sku,
                name: product.name,
                unit_price_cents: product.price_cents,
                quantity: item.quantity,
                discount: item.discount,
            });
        }
        let server_cart = Cart {
            items: server_items,
            discount: cart.discount,
            addition: cart.addition,
            customer_id: cart.customer_id.clone(),
        };
        let quote = price_cart(&server_cart)?;

        let plan = allocate_payment(
            quote.total(),
            tenders,
            &config,
            server_cart.customer_id.is_some(),
        )?;
        if !plan.is_payable() {
            return Err(CheckoutError::Underpaid {
                tendered_cents: plan.tendered_cents,
                total_cents: quote.total_cents,
            });
        }

        // Step 3: conditional decrement per distinct product. Quantities
        // for repeated lines are aggregated so the guard sees the full
        // demand at once.
        let mut demand: BTreeMap<&str, i64> = BTreeMap::new();
        for item in &server_cart.items {
            *demand.entry(item.product_id.as_str()).or_insert(0) += item.quantity;
        }
        for (product_id, quantity) in &demand {
            let decremented =
                ProductRepository::try_decrement_stock_tx(&mut tx, product_id, *quantity).await?;
            if !decremented {
                // Re-read inside the transaction for an accurate message;
                // the rollback on return discards the decrements already
                // applied in this attempt.
                let current = ProductRepository::fetch_tx(&mut tx, product_id).await?;
                let (sku, available) = current
                    .map(|p| (p.sku, p.stock))
                    .unwrap_or_else(|| ((*product_id).to_string(), 0));
                warn!(sku = %sku, available, requested = quantity, "Sale aborted: insufficient stock");
                return Err(CheckoutError::InsufficientStock {
                    sku,
                    available,
                    requested: *quantity,
                });
            }
        }

        // Step 4: the immutable sale record and its frozen snapshots.
        let now = Utc::now();
        let sale = Sale {
            id: generate_sale_id(),
            seller_id: seller_id.to_string(),
            customer_id: server_cart.customer_id.clone(),
            subtotal_cents: quote.subtotal_cents,
            discount_cents: quote.discount_cents,
            addition_cents: quote.addition_cents,
            total_cents: quote.total_cents,
            fee_cents: plan.fee_total_cents(),
            change_cents: plan.change_cents,
            created_at: now,
        };
        SaleRepository::insert_sale_tx(&mut tx, &sale).await?;

        let mut items = Vec::with_capacity(server_cart.items.len());
        for item in &server_cart.items {
            let sale_item = SaleItem {
                id: generate_sale_item_id(),
                sale_id: sale.id.clone(),
                product_id: item.product_id.clone(),
                sku_snapshot: item.sku.clone(),
                name_snapshot: item.name.clone(),
                unit_price_cents: item.unit_price_cents,
                quantity: item.quantity,
                discount_cents: item.discount_amount().cents(),
                net_total_cents: item.net_total().cents(),
                created_at: now,
            };
            SaleRepository::insert_item_tx(&mut tx, &sale_item).await?;
            items.push(sale_item);
        }

        let mut sale_tenders = Vec::with_capacity(plan.entries.len());
        for entry in &plan.entries {
            let tender = SaleTender {
                id: generate_sale_tender_id(),
                sale_id: sale.id.clone(),
                method: entry.kind,
                amount_cents: entry.amount_cents,
                fee_cents: entry.fee_cents,
                charge_cents: entry.charge_cents,
                store_absorbed: entry.store_absorbed,
                created_at: now,
            };
            SaleRepository::insert_tender_tx(&mut tx, &tender).await?;
            sale_tenders.push(tender);
        }

        // Step 5: customer purchase history.
        let mut obligations = Vec::new();
        if let Some(customer_id) = &server_cart.customer_id {
            let customer = CustomerRepository::fetch_tx(&mut tx, customer_id)
                .await?
                .ok_or_else(|| CheckoutError::CustomerNotFound(customer_id.clone()))?;

            let record = PurchaseRecord {
                id: uuid::Uuid::new_v4().to_string(),
                customer_id: customer.id.clone(),
                sale_id: sale.id.clone(),
                amount_cents: sale.total_cents,
                created_at: now,
            };
            CustomerRepository::append_purchase_tx(&mut tx, &record).await?;

            // Step 6: one fiado obligation per deferred-credit tender.
            for entry in plan
                .entries
                .iter()
                .filter(|e| e.kind == TenderKind::DeferredCredit)
            {
                let obligation = CreditObligation {
                    id: generate_obligation_id(),
                    sale_id: sale.id.clone(),
                    customer_id: customer.id.clone(),
                    amount_cents: entry.amount_cents,
                    due_at: now + Duration::days(CREDIT_TERM_DAYS),
                    paid: false,
                    created_at: now,
                };
                CreditRepository::insert_obligation_tx(&mut tx, &obligation).await?;
                obligations.push(obligation);
            }
        }

        // Step 7: exactly one ledger movement, and the running total bump
        // guarded on the session still being open.
        let movement = CashMovement {
            id: generate_movement_id(),
            session_id: session.id.clone(),
            kind: CashMovementKind::Sale,
            sale_id: Some(sale.id.clone()),
            amount_cents: sale.total_cents,
            created_at: now,
        };
        RegisterRepository::insert_movement_tx(&mut tx, &movement).await?;

        let updated = RegisterRepository::add_sale_total_tx(&mut tx, &session.id, sale.total_cents)
            .await?;
        if updated == 0 {
            // The session closed between our lookup and this bump.
            warn!(session_id = %session.id, "Sale aborted: register closed mid-commit");
            return Err(CheckoutError::Conflict);
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            sale_id = %sale.id,
            seller_id = %seller_id,
            total_cents = sale.total_cents,
            change_cents = sale.change_cents,
            obligations = obligations.len(),
            "Sale committed"
        );

        Ok(CheckoutReceipt {
            change_cents: sale.change_cents,
            sale,
            items,
            tenders: sale_tenders,
            obligations,
            quote,
        })
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
