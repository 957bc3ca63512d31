//! # Borrower Repository
//!
//! Plain field storage for registered borrowers. The only constraint is the
//! unique email; loans reference borrowers by name and carry the real
//! invariants themselves.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use circ_core::validation::{validate_email, validate_name};
use circ_core::Borrower;

/// Repository for borrower database operations.
#[derive(Debug, Clone)]
pub struct BorrowerRepository {
    pool: SqlitePool,
}

impl BorrowerRepository {
    /// Creates a new BorrowerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BorrowerRepository { pool }
    }

    /// Registers a borrower.
    ///
    /// ## Returns
    /// * `Ok(Borrower)` - Registered borrower
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
    ) -> DbResult<Borrower> {
        validate_name(name)?;
        validate_email(email)?;

        let borrower = Borrower {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.map(|p| p.trim().to_string()),
            created_at: Utc::now(),
        };

        debug!(id = %borrower.id, email = %borrower.email, "Registering borrower");

        sqlx::query(
            r#"
            INSERT INTO borrowers (id, name, email, phone, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&borrower.id)
        .bind(&borrower.name)
        .bind(&borrower.email)
        .bind(&borrower.phone)
        .bind(borrower.created_at)
        .execute(&self.pool)
        .await?;

        Ok(borrower)
    }

    /// Lists all borrowers, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Borrower>> {
        let borrowers = sqlx::query_as::<_, Borrower>(
            r#"
            SELECT id, name, email, phone, created_at
            FROM borrowers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(borrowers)
    }
}
