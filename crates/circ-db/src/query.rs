//! # Query Service
//!
//! Read-only projections over the catalog and the ledger. Nothing here
//! mutates state; every projection is a single SELECT, so it reads a
//! consistent snapshot and can never observe a half-committed issue or
//! return (those commit atomically on the writer connection).

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{CircError, CircResult, DbError};

// =============================================================================
// Projection Types
// =============================================================================

/// An open loan joined with its item title.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActiveLoan {
    pub loan_id: String,
    pub borrower_name: String,
    pub item_id: String,
    pub title: String,
    pub due_date: NaiveDate,
}

/// Stock snapshot for one item.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub title: String,
    pub available: i64,
    pub total: i64,
}

// =============================================================================
// Service
// =============================================================================

/// Read-only projections; safe to call concurrently with engine writes.
#[derive(Debug, Clone)]
pub struct QueryService {
    pool: SqlitePool,
}

impl QueryService {
    /// Creates a new QueryService over the reader pool.
    pub fn new(pool: SqlitePool) -> Self {
        QueryService { pool }
    }

    /// All open loans with item titles, earliest due date first.
    pub async fn active_loans(&self) -> CircResult<Vec<ActiveLoan>> {
        let loans = sqlx::query_as::<_, ActiveLoan>(
            r#"
            SELECT l.id AS loan_id,
                   l.borrower_name,
                   l.item_id,
                   i.title,
                   l.due_date
            FROM loans l
            JOIN items i ON l.item_id = i.id
            WHERE l.returned_at IS NULL
            ORDER BY l.due_date, l.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(loans)
    }

    /// Open loans whose due date has passed (strictly before today, UTC).
    pub async fn overdue_loans(&self) -> CircResult<Vec<ActiveLoan>> {
        let today = Utc::now().date_naive();

        let loans = sqlx::query_as::<_, ActiveLoan>(
            r#"
            SELECT l.id AS loan_id,
                   l.borrower_name,
                   l.item_id,
                   i.title,
                   l.due_date
            FROM loans l
            JOIN items i ON l.item_id = i.id
            WHERE l.returned_at IS NULL AND l.due_date < ?1
            ORDER BY l.due_date, l.id
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(loans)
    }

    /// Title plus available/total counts for one item.
    ///
    /// ## Returns
    /// * `Ok(Availability)` - Item found
    /// * `Err(CircError::NotFound)` - Unknown item id
    pub async fn availability(&self, item_id: &str) -> CircResult<Availability> {
        let snapshot = sqlx::query_as::<_, Availability>(
            r#"
            SELECT title,
                   available_count AS available,
                   total_count AS total
            FROM items
            WHERE id = ?1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        snapshot.ok_or_else(|| CircError::not_found("Item", item_id))
    }
}
