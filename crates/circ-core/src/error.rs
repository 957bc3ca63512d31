//! # Error Types
//!
//! Domain-specific error types for circ-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  circ-core errors (this file)                                          │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  circ-db errors (separate crate)                                       │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── CircError        - Request-boundary taxonomy (what callers see)   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → CircError → Caller      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, borrower name, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item cannot be found.
    ///
    /// ## When This Occurs
    /// - Item ID doesn't exist in the catalog
    /// - Caller passed a loan ID or borrower ID by mistake
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// No copies left to issue.
    ///
    /// ## When This Occurs
    /// - Every copy of the item is out on loan
    ///
    /// ## Circulation Workflow
    /// ```text
    /// Issue(item, borrower)
    ///      │
    ///      ▼
    /// Check stock: available=0
    ///      │
    ///      ▼
    /// ItemUnavailable { item_id, total: 3 }
    ///      │
    ///      ▼
    /// Desk shows: "All 3 copies are out on loan"
    /// ```
    #[error("Item {item_id} is unavailable: all {total} copies are out on loan")]
    ItemUnavailable { item_id: String, total: i64 },

    /// Return attempted with no matching open loan.
    ///
    /// ## When This Occurs
    /// - Item was never issued to this borrower
    /// - Loan was already returned (double-return)
    #[error("No active loan for item {item_id} and borrower '{borrower}'")]
    NoActiveLoan { item_id: String, borrower: String },

    /// Borrower already holds an open loan for this item.
    #[error("Borrower '{borrower}' already has item {item_id} on loan")]
    LoanAlreadyOpen { item_id: String, borrower: String },

    /// Catalog update would reduce the total count below the number of
    /// copies currently out on loan.
    #[error("Cannot set total to {requested}: {open} copies are out on loan")]
    StockBelowOpenLoans { requested: i64, open: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
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

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., invalid email, invalid date).
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
