//! # balcao-db: Persistence Layer for Balcão POS
//!
//! This crate owns every durable effect of the sale pipeline. It uses
//! SQLite for local storage with sqlx for async operations; the pure math
//! lives in `balcao-core` and is re-run here, server-side, before anything
//! is written.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Balcão POS Data Flow                             │
//! │                                                                         │
//! │  Client (cart + tenders, previewed with balcao-core)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     balcao-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌───────────────┐   ┌──────────────────┐  │   │
//! │  │   │   Database   │   │ Repositories  │   │     Services     │  │   │
//! │  │   │   (pool.rs)  │   │ product, sale │   │ CheckoutService  │  │   │
//! │  │   │              │   │ customer,     │   │ (atomic commit)  │  │   │
//! │  │   │ SqlitePool   │◄──│ credit,       │◄──│ RegisterLedger   │  │   │
//! │  │   │ WAL + busy   │   │ register,     │   │ (open / close)   │  │   │
//! │  │   │ timeout      │   │ config        │   │                  │  │   │
//! │  │   └──────────────┘   └───────────────┘   └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL) — stock, sales, fiado, register ledger           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, sale, etc.)
//! - [`checkout`] - The atomic sale commit service
//! - [`ledger`] - Register session lifecycle and reconciliation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use balcao_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/balcao.db")).await?;
//!
//! let session = db.ledger().open("cashier-1", 10000).await?;
//! let receipt = db.checkout().commit_sale(&cart, &tenders, "cashier-1").await?;
//! let close = db.ledger().close(&session.id, 54000).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use checkout::{CheckoutError, CheckoutReceipt, CheckoutService};
pub use ledger::{RegisterClose, RegisterError, RegisterLedger};

// Repository re-exports for convenience
pub use repository::config::PaymentConfigRepository;
pub use repository::credit::CreditRepository;
pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
pub use repository::register::RegisterRepository;
pub use repository::sale::SaleRepository;
