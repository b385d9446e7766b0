//! # Credit Repository
//!
//! Deferred-credit ("fiado") obligations. One row is created per
//! deferred-credit tender at commit time; settlement - flipping `paid` -
//! belongs to an external collaborator and is deliberately absent here.

use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::DbResult;
use balcao_core::CreditObligation;

/// Repository for deferred-credit obligations.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    pool: SqlitePool,
}

impl CreditRepository {
    /// Creates a new CreditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CreditRepository { pool }
    }

    /// Lists a customer's unpaid obligations, earliest due first.
    pub async fn open_obligations(&self, customer_id: &str) -> DbResult<Vec<CreditObligation>> {
        let obligations = sqlx::query_as::<_, CreditObligation>(
            "SELECT id, sale_id, customer_id, amount_cents, due_at, paid, created_at
             FROM credit_obligations
             WHERE customer_id = ? AND paid = 0
             ORDER BY due_at",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(obligations)
    }

    /// Lists the obligations created by one sale.
    pub async fn by_sale(&self, sale_id: &str) -> DbResult<Vec<CreditObligation>> {
        let obligations = sqlx::query_as::<_, CreditObligation>(
            "SELECT id, sale_id, customer_id, amount_cents, due_at, paid, created_at
             FROM credit_obligations
             WHERE sale_id = ?
             ORDER BY rowid",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(obligations)
    }

    // -------------------------------------------------------------------------
    // Transaction-scoped operations (checkout path)
    // -------------------------------------------------------------------------

    /// Inserts one obligation inside the caller's transaction.
    pub async fn insert_obligation_tx(
        conn: &mut SqliteConnection,
        obligation: &CreditObligation,
    ) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO credit_obligations (id, sale_id, customer_id, amount_cents,
                                             due_at, paid, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&obligation.id)
        .bind(&obligation.sale_id)
        .bind(&obligation.customer_id)
        .bind(obligation.amount_cents)
        .bind(obligation.due_at)
        .bind(obligation.paid)
        .bind(obligation.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}

/// Helper to generate a new obligation ID.
pub fn generate_obligation_id() -> String {
    Uuid::new_v4().to_string()
}
