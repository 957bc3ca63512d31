//! # Circulation Engine
//!
//! Issue and Return as atomic operations spanning the catalog (item stock)
//! and the ledger (loan rows). This module is the ONLY writer of
//! `available_count` and of loan rows.
//!
//! ## Issue Operation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  issue(item, borrower, due_date)          [one transaction]            │
//! │                                                                         │
//! │  1. UPDATE items SET available_count = available_count - 1             │
//! │         WHERE id = ? AND available_count > 0                           │
//! │         │                                                               │
//! │         ├── 0 rows & item missing ──► NotFound        (rolled back)    │
//! │         ├── 0 rows & item exists  ──► Unavailable     (rolled back)    │
//! │         ▼                                                               │
//! │  2. INSERT INTO loans (..., returned_at = NULL)                        │
//! │         │                                                               │
//! │         ├── unique index hit ──► DuplicateKey         (rolled back,    │
//! │         │       (second open loan for the pair)        stock restored) │
//! │         ▼                                                               │
//! │  3. COMMIT ──► loan row + stock decrement land together                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Return Operation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  return_item(item, borrower)              [one transaction]            │
//! │                                                                         │
//! │  1. SELECT the unique open loan ──► none? NoActiveLoan                 │
//! │  2. fine = overdue_fine(due_date, now)    now sampled ONCE             │
//! │  3. UPDATE loans SET returned_at = now, fine_cents = fine              │
//! │         WHERE id = ? AND returned_at IS NULL                           │
//! │  4. UPDATE items SET available_count = available_count + 1             │
//! │         WHERE id = ? AND available_count < total_count                 │
//! │  5. COMMIT                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! The engine runs on the single-connection writer pool (see `pool`), so
//! issue/return transactions are fully serialized: two concurrent issues
//! against an item with one copy left resolve to exactly one success and
//! one `Unavailable`. The guarded UPDATEs, the schema CHECK constraints and
//! the partial unique index back the same invariants a second time, so even
//! a future second writer could not drive stock negative or double-open a
//! loan. At-most-one-attempt: nothing here retries; a failed operation has
//! rolled back and performed no mutation.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{CircError, CircResult, DbError};
use circ_core::fine::overdue_fine;
use circ_core::validation::validate_name;
use circ_core::{LoanRecord, Money};

// =============================================================================
// Receipts
// =============================================================================

/// Successful issue result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueReceipt {
    /// Identifier of the created loan record.
    pub loan_id: String,
    /// Echo of the agreed due date.
    pub due_date: NaiveDate,
}

/// Successful return result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnReceipt {
    /// Identifier of the closed loan record.
    pub loan_id: String,
    /// Fine charged at return time (zero when on time).
    pub fine: Money,
}

// =============================================================================
// Engine
// =============================================================================

/// Orchestrates issue/return as atomic operations.
#[derive(Debug, Clone)]
pub struct CirculationEngine {
    /// Single-connection writer pool; serializes all circulation writes.
    writer: SqlitePool,
}

impl CirculationEngine {
    /// Creates a new engine over the writer pool.
    pub fn new(writer: SqlitePool) -> Self {
        CirculationEngine { writer }
    }

    /// Issues one copy of an item to a borrower.
    ///
    /// ## Precondition Order
    /// 1. Item exists → else `NotFound`
    /// 2. `available_count > 0` → else `Unavailable`
    /// 3. No open loan for the pair → else `DuplicateKey`
    ///
    /// ## Atomicity
    /// The loan insert and the stock decrement commit together or not at
    /// all; every failure path leaves state untouched.
    pub async fn issue(
        &self,
        item_id: &str,
        borrower: &str,
        due_date: NaiveDate,
    ) -> CircResult<IssueReceipt> {
        validate_name(borrower)?;
        let borrower = borrower.trim();

        debug!(item_id = %item_id, borrower = %borrower, due = %due_date, "Issue requested");

        let now = Utc::now();
        let mut tx = self.writer.begin().await.map_err(DbError::from)?;

        // Guarded decrement: claims a copy only if one is on the shelf.
        let claimed = sqlx::query(
            r#"
            UPDATE items
            SET available_count = available_count - 1, updated_at = ?2
            WHERE id = ?1 AND available_count > 0
            "#,
        )
        .bind(item_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        if claimed.rows_affected() == 0 {
            // Distinguish the two failure kinds; dropping `tx` rolls back.
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM items WHERE id = ?1)")
                .bind(item_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(DbError::from)?;

            return Err(if exists {
                CircError::Unavailable {
                    item_id: item_id.to_string(),
                }
            } else {
                CircError::not_found("Item", item_id)
            });
        }

        let loan_id = Uuid::new_v4().to_string();
        let inserted = sqlx::query(
            r#"
            INSERT INTO loans (id, item_id, borrower_name, issued_at, due_date, returned_at, fine_cents)
            VALUES (?1, ?2, ?3, ?4, ?5, NULL, NULL)
            "#,
        )
        .bind(&loan_id)
        .bind(item_id)
        .bind(borrower)
        .bind(now)
        .bind(due_date)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            // The partial unique index rejects a second open loan for the
            // pair; the rollback also restores the claimed copy.
            return Err(match DbError::from(e) {
                DbError::UniqueViolation { .. } => CircError::DuplicateKey {
                    field: "open loan".to_string(),
                    value: format!("{}/{}", item_id, borrower),
                },
                other => other.into(),
            });
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(loan_id = %loan_id, item_id = %item_id, borrower = %borrower, "Item issued");

        Ok(IssueReceipt {
            loan_id,
            due_date,
        })
    }

    /// Records the return of an item and computes the overdue fine.
    ///
    /// The clock is sampled once at the start of the operation, so the
    /// recorded `returned_at` and the fine agree by construction. A second
    /// return of the same loan fails `NoActiveLoan`: the record is no
    /// longer open after the first.
    pub async fn return_item(&self, item_id: &str, borrower: &str) -> CircResult<ReturnReceipt> {
        validate_name(borrower)?;
        let borrower = borrower.trim();

        debug!(item_id = %item_id, borrower = %borrower, "Return requested");

        let now = Utc::now();
        let mut tx = self.writer.begin().await.map_err(DbError::from)?;

        let loan = sqlx::query_as::<_, LoanRecord>(
            r#"
            SELECT id, item_id, borrower_name, issued_at, due_date, returned_at, fine_cents
            FROM loans
            WHERE item_id = ?1 AND borrower_name = ?2 AND returned_at IS NULL
            "#,
        )
        .bind(item_id)
        .bind(borrower)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::from)?;

        let loan = match loan {
            Some(l) => l,
            None => {
                return Err(CircError::NoActiveLoan {
                    item_id: item_id.to_string(),
                    borrower: borrower.to_string(),
                })
            }
        };

        let fine = overdue_fine(loan.due_date, now);

        let closed = sqlx::query(
            r#"
            UPDATE loans
            SET returned_at = ?2, fine_cents = ?3
            WHERE id = ?1 AND returned_at IS NULL
            "#,
        )
        .bind(&loan.id)
        .bind(now)
        .bind(fine.cents())
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        if closed.rows_affected() == 0 {
            // Unreachable on the serialized writer; kept as a second guard.
            return Err(CircError::NoActiveLoan {
                item_id: item_id.to_string(),
                borrower: borrower.to_string(),
            });
        }

        let restocked = sqlx::query(
            r#"
            UPDATE items
            SET available_count = available_count + 1, updated_at = ?2
            WHERE id = ?1 AND available_count < total_count
            "#,
        )
        .bind(item_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        if restocked.rows_affected() == 0 {
            // Open loan with a full shelf would mean the ledger and the
            // count disagree; refuse to commit anything.
            return Err(DbError::Internal(format!(
                "item {} has an open loan but available_count = total_count",
                item_id
            ))
            .into());
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            loan_id = %loan.id,
            item_id = %item_id,
            borrower = %borrower,
            fine = %fine,
            "Item returned"
        );

        Ok(ReturnReceipt {
            loan_id: loan.id,
            fine,
        })
    }
}
