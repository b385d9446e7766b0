//! # Register Ledger
//!
//! Cash register session lifecycle: open with a float, accumulate sale
//! movements (the checkout path appends those), close with a physical
//! count and a computed variance.
//!
//! ## Session Exclusivity
//! A cashier has at most one open session. The invariant is enforced by a
//! partial unique index on `register_sessions(cashier_id) WHERE
//! status = 'open'`, so two concurrent opens cannot both succeed - the
//! loser's INSERT fails and is reported as [`RegisterError::AlreadyOpen`].
//!
//! ## Closing
//! `expected = opening_float + sales_total`, `variance = counted -
//! expected`. A shortfall is negative, an overage positive. Closing is a
//! guarded single UPDATE (`WHERE status = 'open'`), so a double close
//! reports [`RegisterError::SessionClosed`] instead of silently
//! overwriting the first count.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::register::{generate_session_id, RegisterRepository};
use balcao_core::{validation, CashMovement, CoreError, Money, RegisterSession, RegisterStatus};

// =============================================================================
// Errors
// =============================================================================

/// Register lifecycle failures.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// The cashier already has an open session.
    #[error("Cashier {cashier_id} already has an open register session")]
    AlreadyOpen { cashier_id: String },

    /// No session with that ID exists.
    #[error("Register session not found: {0}")]
    SessionNotFound(String),

    /// The session was already closed; its count and variance are frozen.
    #[error("Register session already closed: {0}")]
    SessionClosed(String),

    /// Input validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Transient contention; retryable.
    #[error("Concurrent update detected, retry the operation")]
    Conflict,

    /// Infrastructure failure.
    #[error(transparent)]
    Db(DbError),
}

impl From<DbError> for RegisterError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Busy => RegisterError::Conflict,
            other => RegisterError::Db(other),
        }
    }
}

// =============================================================================
// Close summary
// =============================================================================

/// The reconciliation result handed back when a session closes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterClose {
    pub session_id: String,
    /// `opening_float + sales_total`.
    pub expected_cents: i64,
    /// What was physically in the drawer.
    pub counted_cents: i64,
    /// `counted - expected`; negative is a shortfall.
    pub variance_cents: i64,
    pub closed_at: chrono::DateTime<chrono::Utc>,
}

// =============================================================================
// Service
// =============================================================================

/// Session lifecycle service over the register repository.
#[derive(Debug, Clone)]
pub struct RegisterLedger {
    db: Database,
}

impl RegisterLedger {
    /// Creates a new RegisterLedger.
    pub fn new(db: Database) -> Self {
        RegisterLedger { db }
    }

    /// Opens a session for the cashier with the given opening float.
    pub async fn open(
        &self,
        cashier_id: &str,
        opening_float_cents: i64,
    ) -> Result<RegisterSession, RegisterError> {
        validation::validate_entity_id("cashier_id", cashier_id).map_err(CoreError::from)?;
        validation::validate_non_negative_cents("opening_float_cents", opening_float_cents)
            .map_err(CoreError::from)?;

        let session = RegisterSession {
            id: generate_session_id(),
            cashier_id: cashier_id.to_string(),
            status: RegisterStatus::Open,
            opening_float_cents,
            sales_total_cents: 0,
            counted_cents: None,
            variance_cents: None,
            opened_at: Utc::now(),
            closed_at: None,
        };

        match self.db.registers().insert_session(&session).await {
            Ok(()) => {
                info!(
                    session_id = %session.id,
                    cashier_id = %cashier_id,
                    opening_float_cents,
                    "Register session opened"
                );
                Ok(session)
            }
            // The partial unique index fired: a session is already open.
            Err(DbError::UniqueViolation { .. }) => {
                warn!(cashier_id = %cashier_id, "Open refused: session already open");
                Err(RegisterError::AlreadyOpen {
                    cashier_id: cashier_id.to_string(),
                })
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Returns the cashier's open session, if any.
    pub async fn current(&self, cashier_id: &str) -> Result<Option<RegisterSession>, RegisterError> {
        Ok(self.db.registers().get_open_by_cashier(cashier_id).await?)
    }

    /// Returns a session by ID.
    pub async fn session(&self, session_id: &str) -> Result<RegisterSession, RegisterError> {
        self.db
            .registers()
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| RegisterError::SessionNotFound(session_id.to_string()))
    }

    /// Returns a session's movements in ledger order.
    pub async fn movements(&self, session_id: &str) -> Result<Vec<CashMovement>, RegisterError> {
        Ok(self.db.registers().movements(session_id).await?)
    }

    /// Closes a session with a physical drawer count, computing the
    /// expected total and variance at the instant of close.
    ///
    /// The close reads the session and transitions it inside one
    /// transaction, so the variance is computed against the final
    /// `sales_total` - a sale committing concurrently either lands before
    /// the close (and is counted) or aborts on its open-session guard.
    pub async fn close(
        &self,
        session_id: &str,
        counted_cents: i64,
    ) -> Result<RegisterClose, RegisterError> {
        validation::validate_entity_id("session_id", session_id).map_err(CoreError::from)?;
        validation::validate_non_negative_cents("counted_cents", counted_cents)
            .map_err(CoreError::from)?;

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let session = RegisterRepository::get_by_id_tx(&mut tx, session_id)
            .await?
            .ok_or_else(|| RegisterError::SessionNotFound(session_id.to_string()))?;
        if session.status == RegisterStatus::Closed {
            return Err(RegisterError::SessionClosed(session_id.to_string()));
        }

        let expected = session.expected();
        let variance = session.reconcile(Money::from_cents(counted_cents));
        let closed_at = Utc::now();

        let updated = RegisterRepository::close_session_tx(
            &mut tx,
            session_id,
            counted_cents,
            variance.cents(),
            closed_at,
        )
        .await?;
        if updated == 0 {
            // Lost a race with another close between the read and the
            // guarded UPDATE.
            return Err(RegisterError::SessionClosed(session_id.to_string()));
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            session_id = %session_id,
            expected_cents = expected.cents(),
            counted_cents,
            variance_cents = variance.cents(),
            "Register session closed"
        );

        Ok(RegisterClose {
            session_id: session_id.to_string(),
            expected_cents: expected.cents(),
            counted_cents,
            variance_cents: variance.cents(),
            closed_at,
        })
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use balcao_core::{Adjustment, Cart, CartItem, Product, TenderKind, TenderRequest};
    use chrono::Utc;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn sell_one(db: &Database, cashier_id: &str, price_cents: i64) {
        let now = Utc::now();
        let product = Product {
            id: uuid::Uuid::new_v4().to_string(),
            sku: format!("SKU-{}", uuid::Uuid::new_v4()),
            name: "Test Item".to_string(),
            price_cents,
            stock: 10,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();

        let cart = Cart {
            items: vec![CartItem {
                product_id: product.id.clone(),
                sku: product.sku.clone(),
                name: product.name.clone(),
                unit_price_cents: product.price_cents,
                quantity: 1,
                discount: Adjustment::none(),
            }],
            discount: Adjustment::none(),
            addition: Adjustment::none(),
            customer_id: None,
        };
        db.checkout()
            .commit_sale(
                &cart,
                &[TenderRequest::new(TenderKind::Cash, price_cents)],
                cashier_id,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_open_and_current() {
        let db = test_db().await;
        let ledger = db.ledger();

        assert!(ledger.current("cashier-1").await.unwrap().is_none());

        let session = ledger.open("cashier-1", 10000).await.unwrap();
        assert_eq!(session.opening_float_cents, 10000);
        assert_eq!(session.sales_total_cents, 0);
        assert_eq!(session.status, RegisterStatus::Open);

        let current = ledger.current("cashier-1").await.unwrap().unwrap();
        assert_eq!(current.id, session.id);
    }

    #[tokio::test]
    async fn test_second_open_rejected() {
        let db = test_db().await;
        let ledger = db.ledger();

        ledger.open("cashier-1", 10000).await.unwrap();
        let err = ledger.open("cashier-1", 5000).await.unwrap_err();
        assert!(matches!(err, RegisterError::AlreadyOpen { cashier_id } if cashier_id == "cashier-1"));

        // A different cashier is unaffected
        ledger.open("cashier-2", 5000).await.unwrap();
    }

    #[tokio::test]
    async fn test_close_reports_shortfall() {
        // float 100.00, sales 450.00, counted 540.00 => variance -10.00
        let db = test_db().await;
        let ledger = db.ledger();

        let session = ledger.open("cashier-1", 10000).await.unwrap();
        sell_one(&db, "cashier-1", 45000).await;

        let close = ledger.close(&session.id, 54000).await.unwrap();
        assert_eq!(close.expected_cents, 55000);
        assert_eq!(close.counted_cents, 54000);
        assert_eq!(close.variance_cents, -1000);

        let session = ledger.session(&session.id).await.unwrap();
        assert_eq!(session.status, RegisterStatus::Closed);
        assert_eq!(session.counted_cents, Some(54000));
        assert_eq!(session.variance_cents, Some(-1000));
        assert!(session.closed_at.is_some());
    }

    #[tokio::test]
    async fn test_close_reports_overage() {
        let db = test_db().await;
        let ledger = db.ledger();

        let session = ledger.open("cashier-1", 10000).await.unwrap();
        let close = ledger.close(&session.id, 10500).await.unwrap();
        assert_eq!(close.variance_cents, 500);
    }

    #[tokio::test]
    async fn test_double_close_rejected() {
        let db = test_db().await;
        let ledger = db.ledger();

        let session = ledger.open("cashier-1", 10000).await.unwrap();
        ledger.close(&session.id, 10000).await.unwrap();

        let err = ledger.close(&session.id, 99999).await.unwrap_err();
        assert!(matches!(err, RegisterError::SessionClosed(_)));

        // The first count is frozen
        let session = ledger.session(&session.id).await.unwrap();
        assert_eq!(session.counted_cents, Some(10000));
    }

    #[tokio::test]
    async fn test_close_unknown_session() {
        let db = test_db().await;
        let err = db.ledger().close("no-such-session", 0).await.unwrap_err();
        assert!(matches!(err, RegisterError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_reopen_after_close() {
        let db = test_db().await;
        let ledger = db.ledger();

        let first = ledger.open("cashier-1", 10000).await.unwrap();
        ledger.close(&first.id, 10000).await.unwrap();

        // The partial index only covers open sessions
        let second = ledger.open("cashier-1", 20000).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_sales_land_in_movements() {
        let db = test_db().await;
        let ledger = db.ledger();

        let session = ledger.open("cashier-1", 0).await.unwrap();
        sell_one(&db, "cashier-1", 1200).await;
        sell_one(&db, "cashier-1", 800).await;

        let movements = ledger.movements(&session.id).await.unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(
            movements.iter().map(|m| m.amount_cents).sum::<i64>(),
            2000
        );

        let close = ledger.close(&session.id, 2000).await.unwrap();
        assert_eq!(close.expected_cents, 2000);
        assert_eq!(close.variance_cents, 0);
    }

    #[tokio::test]
    async fn test_negative_float_rejected() {
        let db = test_db().await;
        let err = db.ledger().open("cashier-1", -1).await.unwrap_err();
        assert!(matches!(err, RegisterError::Core(_)));
    }
}
