//! # Validation Module
//!
//! Input validation utilities for the circulation system.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller                                                       │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field-level rule validation                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (email, username, open loans)                  │
//! │  └── CHECK constraints (stock bounds)                                  │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use circ_core::validation::{validate_title, validate_stock};
//!
//! validate_title("The Pragmatic Programmer").unwrap();
//! validate_stock(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::MAX_ITEM_STOCK;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item title.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
///
/// ## Example
/// ```rust
/// use circ_core::validation::validate_title;
///
/// assert!(validate_title("Dune").is_ok());
/// assert!(validate_title("").is_err());
/// ```
pub fn validate_title(title: &str) -> ValidationResult<()> {
    non_empty_capped("title", title, 200)
}

/// Validates an author field.
pub fn validate_author(author: &str) -> ValidationResult<()> {
    non_empty_capped("author", author, 200)
}

/// Validates a borrower or staff name.
///
/// Names key the open-loan uniqueness constraint, so an empty or
/// whitespace-only name would make loans unaddressable.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    non_empty_capped("name", name, 100)
}

/// Validates a username.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
pub fn validate_username(username: &str) -> ValidationResult<()> {
    non_empty_capped("username", username, 50)?;

    if !username
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a borrower email address.
///
/// Shallow structural check only; the unique index is what actually
/// guards against duplicates.
///
/// ## Example
/// ```rust
/// use circ_core::validation::validate_email;
///
/// assert!(validate_email("alice@example.com").is_ok());
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let at = email.find('@');
    let valid = match at {
        Some(pos) => pos > 0 && email[pos + 1..].contains('.') && !email.ends_with('.'),
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain.tld".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an initial or updated stock value.
///
/// ## Rules
/// - Must not be negative
/// - Must be at most [`MAX_ITEM_STOCK`]
///
/// ## Example
/// ```rust
/// use circ_core::validation::validate_stock;
///
/// assert!(validate_stock(0).is_ok());
/// assert!(validate_stock(-1).is_err());
/// assert!(validate_stock(10_000).is_err());
/// ```
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "stock".to_string(),
        });
    }

    if stock > MAX_ITEM_STOCK {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: MAX_ITEM_STOCK,
        });
    }

    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn non_empty_capped(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_rules() {
        assert!(validate_title("Dune").is_ok());
        assert!(validate_title("  ").is_err());
        assert!(validate_title(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("desk-01").is_ok());
        assert!(validate_username("admin_2").is_ok());
        assert!(validate_username("bad name").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@nodot").is_err());
        assert!(validate_email("alice@example.").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_stock_rules() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(MAX_ITEM_STOCK).is_ok());
        assert!(validate_stock(-1).is_err());
        assert!(validate_stock(MAX_ITEM_STOCK + 1).is_err());
    }
}
