//! # Item Repository
//!
//! Database operations for the catalog of lendable items.
//!
//! ## Stock Columns
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    total_count vs available_count                       │
//! │                                                                         │
//! │  total_count      copies the library owns                              │
//! │  available_count  copies on the shelf right now                        │
//! │                                                                         │
//! │  Invariant: available_count = total_count - open loans                 │
//! │                                                                         │
//! │  Writers:                                                               │
//! │   • circulation engine  ──► ±1 deltas inside issue/return transactions │
//! │   • catalog update      ──► recomputes available from total in the     │
//! │                             same statement (see `update`)              │
//! │                                                                         │
//! │  Nothing else writes either column. There is deliberately NO way to    │
//! │  set available_count directly: an absolute write could silently        │
//! │  desynchronize it from the ledger.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use circ_core::validation::{validate_author, validate_stock, validate_title};
use circ_core::Item;

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ItemRepository::new(pool);
///
/// let item = repo.create("Dune", "Frank Herbert", "Fiction", 3).await?;
/// let found = repo.get_by_id(&item.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Inserts a new catalog item.
    ///
    /// `available_count` starts equal to `total_count`: a freshly
    /// registered item has every copy on the shelf.
    pub async fn create(
        &self,
        title: &str,
        author: &str,
        category: &str,
        stock: i64,
    ) -> DbResult<Item> {
        validate_title(title)?;
        validate_author(author)?;
        validate_stock(stock)?;

        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            author: author.trim().to_string(),
            category: category.trim().to_string(),
            total_count: stock,
            available_count: stock,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, title = %item.title, stock = stock, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items (
                id, title, author, category,
                total_count, available_count,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.title)
        .bind(&item.author)
        .bind(&item.category)
        .bind(item.total_count)
        .bind(item.available_count)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    /// Gets an item by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Item))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, title, author, category,
                   total_count, available_count,
                   created_at, updated_at
            FROM items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists the whole catalog, ordered by title.
    pub async fn list(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, title, author, category,
                   total_count, available_count,
                   created_at, updated_at
            FROM items
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Updates an item's descriptive fields and total copy count.
    ///
    /// ## Stock Policy
    /// Callers edit `total_count` only. `available_count` is recomputed in
    /// the same statement as `total − open loans`, so the two counts cannot
    /// drift apart. An update that would push the total below the number of
    /// copies currently out on loan is rejected.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Item doesn't exist
    /// * `Err(DbError::CheckViolation)` - Total below open-loan count
    pub async fn update(
        &self,
        id: &str,
        title: &str,
        author: &str,
        category: &str,
        total_count: i64,
    ) -> DbResult<()> {
        validate_title(title)?;
        validate_author(author)?;
        validate_stock(total_count)?;

        debug!(id = %id, total = total_count, "Updating item");

        let now = Utc::now();

        // Guarded single-statement write: the WHERE clause refuses a total
        // below the open-loan count, and available is derived in the same
        // statement so no interleaving write can observe a mixed state.
        let result = sqlx::query(
            r#"
            UPDATE items SET
                title = ?2,
                author = ?3,
                category = ?4,
                total_count = ?5,
                available_count = ?5 - (
                    SELECT COUNT(*) FROM loans
                    WHERE item_id = ?1 AND returned_at IS NULL
                ),
                updated_at = ?6
            WHERE id = ?1
              AND ?5 >= (
                    SELECT COUNT(*) FROM loans
                    WHERE item_id = ?1 AND returned_at IS NULL
              )
            "#,
        )
        .bind(id)
        .bind(title.trim())
        .bind(author.trim())
        .bind(category.trim())
        .bind(total_count)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Diagnostic read only; the guarded write above is authoritative.
            let open: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM loans WHERE item_id = ?1 AND returned_at IS NULL",
            )
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

            return if self.get_by_id(id).await?.is_none() {
                Err(DbError::not_found("Item", id))
            } else {
                Err(DbError::CheckViolation {
                    message: format!(
                        "total_count {} is below the open loan count {}",
                        total_count, open
                    ),
                })
            };
        }

        Ok(())
    }

    /// Counts catalog items (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
