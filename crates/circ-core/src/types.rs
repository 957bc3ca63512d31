//! # Domain Types
//!
//! Core domain types used throughout the circulation system.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │   LoanRecord    │   │    Borrower     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  title          │   │  item_id (FK)   │   │  name           │       │
//! │  │  total_count    │   │  due_date       │   │  email (UNIQUE) │       │
//! │  │  available_count│   │  returned_at?   │   │  phone          │       │
//! │  └─────────────────┘   │  fine_cents?    │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │     Account     │   │      Role       │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  username       │   │  Admin          │                             │
//! │  │  password_hash  │   │  Librarian      │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Open Loan Invariant
//! A `LoanRecord` with `returned_at == None` is an **open loan**. For every
//! item, `available_count = total_count - number of open loans`, and at most
//! one open loan exists per (item, borrower) pair.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fine::Money;

// =============================================================================
// Item
// =============================================================================

/// A catalog entry with total and currently-available copy counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display title.
    pub title: String,

    /// Author or creator.
    pub author: String,

    /// Shelving category (e.g. "Fiction", "Reference").
    pub category: String,

    /// Total copies owned. Never negative.
    pub total_count: i64,

    /// Copies currently on the shelf.
    /// Always within `0..=total_count`; mutated only by the circulation
    /// engine (and recomputed on catalog updates).
    pub available_count: i64,

    /// When the item was added to the catalog.
    pub created_at: DateTime<Utc>,

    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Checks whether at least one copy is on the shelf.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.available_count > 0
    }

    /// Number of copies currently out on loan.
    #[inline]
    pub fn on_loan(&self) -> i64 {
        self.total_count - self.available_count
    }
}

// =============================================================================
// Borrower
// =============================================================================

/// A registered borrower. Foreign-key target for loans; no invariants of
/// its own beyond the unique email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Borrower {
    pub id: String,
    pub name: String,
    /// Contact email - unique across borrowers.
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Loan Record
// =============================================================================

/// One issue-to-return lifecycle for one copy of an item.
///
/// Created by the Issue operation with `returned_at = None` and
/// `fine_cents = None`. Mutated exactly once by the Return operation, which
/// sets both. Immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LoanRecord {
    pub id: String,

    /// Item this loan is against.
    pub item_id: String,

    /// Borrower the copy was issued to.
    pub borrower_name: String,

    /// When the copy left the shelf.
    pub issued_at: DateTime<Utc>,

    /// Calendar date the copy is due back. Set at issue time, never changes.
    pub due_date: NaiveDate,

    /// When the copy came back. `None` means the loan is still open.
    pub returned_at: Option<DateTime<Utc>>,

    /// Fine charged at return time, in cents.
    /// Set if and only if `returned_at` is set.
    pub fine_cents: Option<i64>,
}

impl LoanRecord {
    /// Checks whether the loan is still open (copy not yet returned).
    #[inline]
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }

    /// Returns the recorded fine, if the loan has been closed.
    #[inline]
    pub fn fine(&self) -> Option<Money> {
        self.fine_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Role
// =============================================================================

/// Staff account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including account management.
    Admin,
    /// Circulation desk operations.
    Librarian,
}

impl Role {
    /// Stable string form, matching the database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Librarian => "librarian",
        }
    }
}

// =============================================================================
// Account
// =============================================================================

/// A staff account.
///
/// `password_hash` holds an argon2 PHC string; plaintext passwords are never
/// stored or compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Account {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item(total: i64, available: i64) -> Item {
        let now = Utc::now();
        Item {
            id: "item-1".to_string(),
            title: "The Pragmatic Programmer".to_string(),
            author: "Hunt & Thomas".to_string(),
            category: "Reference".to_string(),
            total_count: total,
            available_count: available,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_item_availability() {
        assert!(sample_item(3, 1).is_available());
        assert!(!sample_item(3, 0).is_available());
        assert_eq!(sample_item(5, 2).on_loan(), 3);
    }

    #[test]
    fn test_loan_open_and_fine() {
        let mut loan = LoanRecord {
            id: "loan-1".to_string(),
            item_id: "item-1".to_string(),
            borrower_name: "Alice".to_string(),
            issued_at: Utc::now(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            returned_at: None,
            fine_cents: None,
        };
        assert!(loan.is_open());
        assert_eq!(loan.fine(), None);

        loan.returned_at = Some(Utc::now());
        loan.fine_cents = Some(1500);
        assert!(!loan.is_open());
        assert_eq!(loan.fine(), Some(Money::from_cents(1500)));
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Librarian.as_str(), "librarian");
    }
}
