//! # Error Types
//!
//! Domain-specific error types for balcao-core.
//!
//! ## Error Hierarchy
//! ```text
//! balcao-core (this file)
//! ├── CoreError        - pricing / allocation business-rule violations
//! └── ValidationError  - input validation failures
//!
//! balcao-db (separate crate)
//! ├── DbError          - database operation failures
//! ├── CheckoutError    - commit-time failures (stock, register, conflicts)
//! └── RegisterError    - register session failures
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual `impl Error`
//! 2. Every variant carries the context a caller needs for an actionable
//!    message (sku, amounts, method)
//! 3. Pure engines return these as values - business rules never panic

use thiserror::Error;

use crate::tender::TenderKind;

// =============================================================================
// Core Error
// =============================================================================

/// Business-rule violations detected by the pure pricing and allocation
/// engines. Detected before any write; the commit layer re-runs the same
/// checks server-side.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Commit attempted with no items in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart exceeds the maximum item count.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity is below 1 or above the allowed maximum.
    #[error("Invalid quantity {quantity} for {sku}")]
    InvalidQuantity { sku: String, quantity: i64 },

    /// A monetary input (price, discount, addition, fee) is negative.
    #[error("{field} must not be negative")]
    NegativeAmount { field: &'static str },

    /// A tender's amount is not acceptable: non-positive, or a non-cash
    /// tender exceeding the remaining balance. Cash may exceed the balance
    /// (the excess becomes change); everything else may not.
    #[error(
        "Invalid {method} tender of {amount_cents} cents: {remaining_cents} cents remaining"
    )]
    InvalidPaymentAmount {
        method: TenderKind,
        amount_cents: i64,
        remaining_cents: i64,
    },

    /// Tender kind is disabled in the store's payment configuration.
    #[error("Payment method {0} is disabled")]
    PaymentMethodDisabled(TenderKind),

    /// A deferred-credit ("fiado") tender needs a customer to owe the
    /// amount; an anonymous sale cannot carry one.
    #[error("Deferred credit requires a customer on the sale")]
    DeferredCreditRequiresCustomer,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, used for early checks before business logic.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed identifier).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
