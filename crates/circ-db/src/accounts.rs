//! # Staff Account Service
//!
//! Opaque identity surface: verify a username/password pair, create, list
//! and delete staff accounts. Deliberately thin - it exists so the rest of
//! the system can treat identity as an external collaborator.
//!
//! ## Credential Storage
//! Passwords are stored as salted argon2 PHC strings and verified with a
//! constant-time comparison inside the argon2 crate. Plaintext never
//! touches the database. Verification failures collapse into a single
//! `InvalidCredentials` kind: callers cannot tell "unknown user" from
//! "wrong password".

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{CircError, CircResult, DbError};
use circ_core::validation::validate_username;
use circ_core::Role;

// =============================================================================
// Projection Type
// =============================================================================

/// Account listing entry. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub id: String,
    pub username: String,
    pub role: Role,
}

// =============================================================================
// Service
// =============================================================================

/// Staff account operations.
#[derive(Debug, Clone)]
pub struct AccountService {
    pool: SqlitePool,
}

impl AccountService {
    /// Creates a new AccountService.
    pub fn new(pool: SqlitePool) -> Self {
        AccountService { pool }
    }

    /// Creates a staff account with a salted argon2 password hash.
    ///
    /// ## Returns
    /// * `Ok(AccountInfo)` - Created account (no hash)
    /// * `Err(CircError::DuplicateKey)` - Username taken
    pub async fn create(&self, username: &str, password: &str, role: Role) -> CircResult<AccountInfo> {
        validate_username(username)?;
        let username = username.trim();

        debug!(username = %username, role = role.as_str(), "Creating account");

        let account = AccountInfo {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            role,
        };
        let hash = hash_password(password)?;
        let now = Utc::now();

        let inserted = sqlx::query(
            r#"
            INSERT INTO accounts (id, username, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&hash)
        .bind(role)
        .bind(now)
        .execute(&self.pool)
        .await;

        if let Err(e) = inserted {
            return Err(match DbError::from(e) {
                DbError::UniqueViolation { .. } => CircError::DuplicateKey {
                    field: "username".to_string(),
                    value: username.to_string(),
                },
                other => other.into(),
            });
        }

        info!(id = %account.id, username = %username, "Account created");
        Ok(account)
    }

    /// Verifies a username/password pair.
    ///
    /// ## Returns
    /// * `Ok(Role)` - Credentials verified
    /// * `Err(CircError::InvalidCredentials)` - Unknown user or wrong password
    pub async fn verify(&self, username: &str, password: &str) -> CircResult<Role> {
        let row = sqlx::query_as::<_, (String, Role)>(
            "SELECT password_hash, role FROM accounts WHERE username = ?1",
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        let (hash, role) = match row {
            Some(r) => r,
            None => {
                warn!(username = %username.trim(), "Login attempt for unknown account");
                return Err(CircError::InvalidCredentials);
            }
        };

        if verify_password(password, &hash) {
            Ok(role)
        } else {
            warn!(username = %username.trim(), "Password verification failed");
            Err(CircError::InvalidCredentials)
        }
    }

    /// Lists all accounts (without password hashes), ordered by username.
    pub async fn list(&self) -> CircResult<Vec<AccountInfo>> {
        let accounts = sqlx::query_as::<_, AccountInfo>(
            "SELECT id, username, role FROM accounts ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(accounts)
    }

    /// Deletes an account by id.
    ///
    /// ## Returns
    /// * `Ok(())` - Account removed
    /// * `Err(CircError::NotFound)` - Unknown id
    pub async fn delete(&self, id: &str) -> CircResult<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(CircError::not_found("Account", id));
        }

        info!(id = %id, "Account deleted");
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Hashes a password for storage.
fn hash_password(password: &str) -> CircResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CircError::StoreUnavailable(format!("failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verifies a password against its stored hash.
fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
