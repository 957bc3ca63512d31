//! # Loan Repository
//!
//! Read access to the circulation ledger.
//!
//! The ledger is append-then-close: a row is inserted by Issue with
//! `returned_at = NULL`, closed exactly once by Return, and never touched
//! again. Both of those writes happen inside the circulation engine's
//! transactions; this repository only reads.

use sqlx::SqlitePool;

use crate::error::DbResult;
use circ_core::LoanRecord;

/// Repository for loan ledger reads.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    pool: SqlitePool,
}

const LOAN_COLUMNS: &str =
    "id, item_id, borrower_name, issued_at, due_date, returned_at, fine_cents";

impl LoanRepository {
    /// Creates a new LoanRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LoanRepository { pool }
    }

    /// Gets a loan by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<LoanRecord>> {
        let loan = sqlx::query_as::<_, LoanRecord>(&format!(
            "SELECT {} FROM loans WHERE id = ?1",
            LOAN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(loan)
    }

    /// Gets the unique open loan for an (item, borrower) pair, if any.
    ///
    /// The partial unique index guarantees at most one row matches.
    pub async fn open_loan(&self, item_id: &str, borrower: &str) -> DbResult<Option<LoanRecord>> {
        let loan = sqlx::query_as::<_, LoanRecord>(&format!(
            r#"
            SELECT {}
            FROM loans
            WHERE item_id = ?1 AND borrower_name = ?2 AND returned_at IS NULL
            "#,
            LOAN_COLUMNS
        ))
        .bind(item_id)
        .bind(borrower)
        .fetch_optional(&self.pool)
        .await?;

        Ok(loan)
    }

    /// Lists all open loans, oldest due date first.
    pub async fn list_open(&self) -> DbResult<Vec<LoanRecord>> {
        let loans = sqlx::query_as::<_, LoanRecord>(&format!(
            r#"
            SELECT {}
            FROM loans
            WHERE returned_at IS NULL
            ORDER BY due_date, id
            "#,
            LOAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Counts open loans against one item.
    ///
    /// Used by invariant checks: for every item,
    /// `available_count = total_count - open_count`.
    pub async fn open_count(&self, item_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE item_id = ?1 AND returned_at IS NULL",
        )
        .bind(item_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
