//! # circ-core: Pure Business Logic for the Circulation System
//!
//! This crate is the **heart** of the circulation system. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Circ Architecture                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                        Callers                                  │   │
//! │  │    issue, return_item, availability, active_loans, ...         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ circ-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   fine    │  │   error   │  │ validation│  │   │
//! │  │   │   Item    │  │   Money   │  │ CoreError │  │   rules   │  │   │
//! │  │   │ LoanRecord│  │  schedule │  │           │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    circ-db (Database Layer)                     │   │
//! │  │        SQLite queries, migrations, circulation engine           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, LoanRecord, Borrower, Account)
//! - [`fine`] - Money type and the overdue fine schedule (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use circ_core::fine::{overdue_fine, DAILY_PENALTY};
//!
//! // Loan was due three days before the return moment
//! let due = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
//! let returned = Utc.with_ymd_and_hms(2026, 3, 13, 15, 30, 0).unwrap();
//!
//! assert_eq!(overdue_fine(due, returned), DAILY_PENALTY * 3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fine;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use circ_core::Money` instead of
// `use circ_core::fine::Money`

pub use error::{CoreError, ValidationError};
pub use fine::{Money, DAILY_PENALTY};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum copies of a single item that can be registered at once
///
/// ## Business Reason
/// Prevents accidental over-registration (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_STOCK: i64 = 999;
