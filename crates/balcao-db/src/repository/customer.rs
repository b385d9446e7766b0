//! # Customer Repository
//!
//! Customers and their append-only purchase history. Full customer
//! management is a collaborator; the sale pipeline needs a debtor for
//! fiado and a history to append to.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use balcao_core::{Customer, PurchaseRecord};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, created_at FROM customers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Inserting customer");

        sqlx::query("INSERT INTO customers (id, name, phone, created_at) VALUES (?, ?, ?, ?)")
            .bind(&customer.id)
            .bind(&customer.name)
            .bind(&customer.phone)
            .bind(customer.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Lists a customer's purchase history, most recent first.
    pub async fn purchases(&self, customer_id: &str) -> DbResult<Vec<PurchaseRecord>> {
        let purchases = sqlx::query_as::<_, PurchaseRecord>(
            "SELECT id, customer_id, sale_id, amount_cents, created_at
             FROM customer_purchases
             WHERE customer_id = ?
             ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    // -------------------------------------------------------------------------
    // Transaction-scoped operations (checkout path)
    // -------------------------------------------------------------------------

    /// Resolves a customer inside the caller's transaction, so the fiado
    /// debtor is known to exist before any obligation row is written.
    pub async fn fetch_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, created_at FROM customers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(customer)
    }

    /// Appends a purchase-history entry inside the caller's transaction.
    pub async fn append_purchase_tx(
        conn: &mut SqliteConnection,
        record: &PurchaseRecord,
    ) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO customer_purchases (id, customer_id, sale_id, amount_cents, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.customer_id)
        .bind(&record.sale_id)
        .bind(record.amount_cents)
        .bind(record.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}

/// Helper to generate a new customer ID.
pub fn generate_customer_id() -> String {
    Uuid::new_v4().to_string()
}
