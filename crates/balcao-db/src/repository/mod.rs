//! # Repository Module
//!
//! Database repository implementations for Balcão POS.
//!
//! Each repository holds a pool clone for its read paths. Write operations
//! that must participate in the checkout transaction are associated
//! functions taking `&mut SqliteConnection`, so the caller decides the
//! transaction boundary - the commit path spans products, sales,
//! customers, credit, and the register ledger in one transaction, and no
//! repository can accidentally commit half of it.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - catalog access and the atomic stock decrement
//! - [`sale::SaleRepository`] - immutable sale records and their snapshots
//! - [`customer::CustomerRepository`] - customers and purchase history
//! - [`credit::CreditRepository`] - deferred-credit ("fiado") obligations
//! - [`register::RegisterRepository`] - register sessions and cash movements
//! - [`config::PaymentConfigRepository`] - payment-method configuration snapshot

pub mod config;
pub mod credit;
pub mod customer;
pub mod product;
pub mod register;
pub mod sale;
