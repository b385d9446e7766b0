//! # balcao-core: Pure Business Logic for Balcão POS
//!
//! This crate is the **heart** of Balcão POS. It contains the sale pricing
//! and payment allocation logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Balcão POS Data Flow                           │
//! │                                                                     │
//! │  Client (any UI)                                                    │
//! │    │  builds Cart + tender list, previews totals locally            │
//! │    │  using price_cart / allocate_payment (no round-trip)           │
//! │    ▼                                                                │
//! │  ┌───────────────────────────────────────────────────────────┐     │
//! │  │            ★ balcao-core (THIS CRATE) ★                   │     │
//! │  │                                                           │     │
//! │  │   ┌────────┐ ┌─────────┐ ┌────────┐ ┌───────────────┐    │     │
//! │  │   │ money  │ │ pricing │ │ tender │ │ types / error │    │     │
//! │  │   │ Money  │ │  Cart   │ │ Plan   │ │  Sale, Fiado  │    │     │
//! │  │   └────────┘ └─────────┘ └────────┘ └───────────────┘    │     │
//! │  │                                                           │     │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS      │     │
//! │  └───────────────────────────────────────────────────────────┘     │
//! │    │                                                                │
//! │    │  on checkout the full cart + tenders go to balcao-db,          │
//! │    │  which re-runs the same math server-side and commits           │
//! │    ▼                                                                │
//! │  balcao-db (atomic commit: stock, sale, fiado, register)            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type and adjustments, integer-cents arithmetic
//! - [`pricing`] - Cart model and the pricing engine
//! - [`tender`] - Payment methods, fee configuration, payment allocation
//! - [`types`] - Persisted domain types (Sale, CreditObligation, ...)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output - always
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64), never floats
//! 4. **Explicit Errors**: business-rule violations are returned as typed
//!    values, never panics

pub mod error;
pub mod money;
pub mod pricing;
pub mod tender;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Adjustment, Money};
pub use pricing::{price_cart, Cart, CartItem, CartQuote};
pub use tender::{
    allocate_payment, FeeResponsibility, MethodConfig, PaymentConfig, PaymentPlan, TenderEntry,
    TenderKind, TenderRequest,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Term, in days, before a deferred-credit ("fiado") obligation falls due.
///
/// Counted from the sale timestamp. Configurable per store in a future
/// version; fixed for now.
pub const CREDIT_TERM_DAYS: i64 = 30;

/// Maximum items allowed in a single cart.
///
/// Prevents runaway carts and keeps a single commit transaction short.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in a cart.
///
/// Prevents accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
