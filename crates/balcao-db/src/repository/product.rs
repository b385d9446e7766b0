//! # Product Repository
//!
//! Catalog access for the sale pipeline, most importantly the atomic
//! conditional stock decrement.
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  ❌ WRONG: check-then-act (races under concurrency)                 │
//! │     let stock = SELECT stock ...;                                   │
//! │     if stock >= qty { UPDATE products SET stock = stock_we_read-q } │
//! │                                                                     │
//! │  ✅ CORRECT: single conditional UPDATE                              │
//! │     UPDATE products SET stock = stock - ?qty                        │
//! │     WHERE id = ?id AND stock >= ?qty                                │
//! │                                                                     │
//! │  rows_affected == 0  →  insufficient stock, nothing changed         │
//! │  The schema CHECK (stock >= 0) backstops the guard.                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use balcao_core::Product;

const PRODUCT_COLUMNS: &str =
    "id, sku, name, price_cents, stock, is_active, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?"
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            "INSERT INTO products (id, sku, name, price_cents, stock, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Adds stock (restocking). Positive quantities only; sales go through
    /// the checkout transaction, never through here.
    pub async fn restock(&self, id: &str, quantity: i64) -> DbResult<()> {
        debug!(id = %id, quantity = %quantity, "Restocking product");

        let result = sqlx::query(
            "UPDATE products SET stock = stock + ?, updated_at = ? WHERE id = ?",
        )
        .bind(quantity.max(0))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Transaction-scoped operations (checkout path)
    // -------------------------------------------------------------------------

    /// Fetches a product inside the caller's transaction, so the snapshot
    /// the sale records and the stock guard see the same row version.
    pub async fn fetch_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(product)
    }

    /// Atomically decrements stock if and only if enough is available.
    ///
    /// Returns `true` when the decrement happened. `false` means the guard
    /// failed - stock was insufficient at the instant of the update - and
    /// the row is untouched. Never performs a partial decrement.
    pub async fn try_decrement_stock_tx(
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE products
             SET stock = stock - ?, updated_at = ?
             WHERE id = ? AND stock >= ?",
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(id)
        .bind(quantity)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
