//! # Register Repository
//!
//! Register sessions and the append-only cash-movement ledger.
//!
//! The "one open session per cashier" invariant is not checked here with a
//! SELECT - it lives in the schema as a partial unique index
//! (`idx_register_sessions_one_open`), so a check-then-create race is
//! structurally impossible: the second INSERT loses with a unique
//! violation, which the ledger maps to its AlreadyOpen error.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use balcao_core::{CashMovement, RegisterSession};

const SESSION_COLUMNS: &str = "id, cashier_id, status, opening_float_cents, sales_total_cents, \
     counted_cents, variance_cents, opened_at, closed_at";

/// Repository for register sessions and cash movements.
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: SqlitePool,
}

impl RegisterRepository {
    /// Creates a new RegisterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegisterRepository { pool }
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<RegisterSession>> {
        let session = sqlx::query_as::<_, RegisterSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM register_sessions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Gets the cashier's currently open session, if any.
    pub async fn get_open_by_cashier(&self, cashier_id: &str) -> DbResult<Option<RegisterSession>> {
        let session = sqlx::query_as::<_, RegisterSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM register_sessions
             WHERE cashier_id = ? AND status = 'open'"
        ))
        .bind(cashier_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Inserts a new session. A second open session for the same cashier
    /// fails with a unique violation from the partial index.
    pub async fn insert_session(&self, session: &RegisterSession) -> DbResult<()> {
        debug!(cashier_id = %session.cashier_id, "Opening register session");

        sqlx::query(
            "INSERT INTO register_sessions (id, cashier_id, status, opening_float_cents,
                                            sales_total_cents, counted_cents, variance_cents,
                                            opened_at, closed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(&session.cashier_id)
        .bind(session.status)
        .bind(session.opening_float_cents)
        .bind(session.sales_total_cents)
        .bind(session.counted_cents)
        .bind(session.variance_cents)
        .bind(session.opened_at)
        .bind(session.closed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists a session's cash movements, in ledger order.
    pub async fn movements(&self, session_id: &str) -> DbResult<Vec<CashMovement>> {
        let movements = sqlx::query_as::<_, CashMovement>(
            "SELECT id, session_id, kind, sale_id, amount_cents, created_at
             FROM cash_movements
             WHERE session_id = ?
             ORDER BY rowid",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    // -------------------------------------------------------------------------
    // Transaction-scoped operations
    // -------------------------------------------------------------------------

    /// Resolves a session by ID inside the caller's transaction.
    pub async fn get_by_id_tx(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<RegisterSession>> {
        let session = sqlx::query_as::<_, RegisterSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM register_sessions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(session)
    }

    /// Resolves the cashier's open session inside the caller's transaction.
    pub async fn get_open_by_cashier_tx(
        conn: &mut SqliteConnection,
        cashier_id: &str,
    ) -> DbResult<Option<RegisterSession>> {
        let session = sqlx::query_as::<_, RegisterSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM register_sessions
             WHERE cashier_id = ? AND status = 'open'"
        ))
        .bind(cashier_id)
        .fetch_optional(conn)
        .await?;

        Ok(session)
    }

    /// Appends a ledger movement. The UNIQUE constraint on `sale_id`
    /// guarantees a sale lands in the ledger at most once.
    pub async fn insert_movement_tx(
        conn: &mut SqliteConnection,
        movement: &CashMovement,
    ) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO cash_movements (id, session_id, kind, sale_id, amount_cents, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&movement.id)
        .bind(&movement.session_id)
        .bind(movement.kind)
        .bind(&movement.sale_id)
        .bind(movement.amount_cents)
        .bind(movement.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Bumps the session's running sale total, guarded on the session
    /// still being open. Returns rows affected: 0 means a concurrent close
    /// won the race and the caller must abort.
    pub async fn add_sale_total_tx(
        conn: &mut SqliteConnection,
        session_id: &str,
        amount_cents: i64,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE register_sessions
             SET sales_total_cents = sales_total_cents + ?
             WHERE id = ? AND status = 'open'",
        )
        .bind(amount_cents)
        .bind(session_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Transitions a session to closed with its count and variance,
    /// guarded on it still being open. Returns rows affected.
    pub async fn close_session_tx(
        conn: &mut SqliteConnection,
        session_id: &str,
        counted_cents: i64,
        variance_cents: i64,
        closed_at: chrono::DateTime<chrono::Utc>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE register_sessions
             SET status = 'closed', counted_cents = ?, variance_cents = ?, closed_at = ?
             WHERE id = ? AND status = 'open'",
        )
        .bind(counted_cents)
        .bind(variance_cents)
        .bind(closed_at)
        .bind(session_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Helper to generate a new session ID.
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new movement ID.
pub fn generate_movement_id() -> String {
    Uuid::new_v4().to_string()
}
