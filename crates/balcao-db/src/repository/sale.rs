//! # Sale Repository
//!
//! Persistence for committed sales and their frozen snapshots.
//!
//! A sale and its children (`sale_items`, `sale_tenders`) are written once
//! by the checkout transaction and never updated - the snapshot pattern
//! keeps receipts stable no matter how the catalog changes afterwards.
//! This repository therefore has transaction-scoped inserts and plain
//! reads, nothing else.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use balcao_core::{Sale, SaleItem, SaleTender};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT id, seller_id, customer_id, subtotal_cents, discount_cents,
                    addition_cents, total_cents, fee_cents, change_cents, created_at
             FROM sales
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all items for a sale, in insertion order.
    pub async fn items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT id, sale_id, product_id, sku_snapshot, name_snapshot,
                    unit_price_cents, quantity, discount_cents, net_total_cents, created_at
             FROM sale_items
             WHERE sale_id = ?
             ORDER BY rowid",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets all tenders for a sale, in insertion order.
    pub async fn tenders(&self, sale_id: &str) -> DbResult<Vec<SaleTender>> {
        let tenders = sqlx::query_as::<_, SaleTender>(
            "SELECT id, sale_id, method, amount_cents, fee_cents, charge_cents,
                    store_absorbed, created_at
             FROM sale_tenders
             WHERE sale_id = ?
             ORDER BY rowid",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tenders)
    }

    // -------------------------------------------------------------------------
    // Transaction-scoped operations (checkout path)
    // -------------------------------------------------------------------------

    /// Inserts the immutable sale record inside the caller's transaction.
    pub async fn insert_sale_tx(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, total = %sale.total_cents, "Inserting sale");

        sqlx::query(
            "INSERT INTO sales (id, seller_id, customer_id, subtotal_cents, discount_cents,
                                addition_cents, total_cents, fee_cents, change_cents, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&sale.id)
        .bind(&sale.seller_id)
        .bind(&sale.customer_id)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.addition_cents)
        .bind(sale.total_cents)
        .bind(sale.fee_cents)
        .bind(sale.change_cents)
        .bind(sale.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts one frozen line-item snapshot.
    pub async fn insert_item_tx(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO sale_items (id, sale_id, product_id, sku_snapshot, name_snapshot,
                                     unit_price_cents, quantity, discount_cents,
                                     net_total_cents, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(&item.sku_snapshot)
        .bind(&item.name_snapshot)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .bind(item.discount_cents)
        .bind(item.net_total_cents)
        .bind(item.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts one tender record with its computed fee and charge.
    pub async fn insert_tender_tx(
        conn: &mut SqliteConnection,
        tender: &SaleTender,
    ) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO sale_tenders (id, sale_id, method, amount_cents, fee_cents,
                                       charge_cents, store_absorbed, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&tender.id)
        .bind(&tender.sale_id)
        .bind(tender.method)
        .bind(tender.amount_cents)
        .bind(tender.fee_cents)
        .bind(tender.charge_cents)
        .bind(tender.store_absorbed)
        .bind(tender.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}

/// Generates a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new sale tender ID.
pub fn generate_sale_tender_id() -> String {
    Uuid::new_v4().to_string()
}
