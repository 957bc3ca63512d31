//! End-to-end circulation tests against real SQLite databases.
//!
//! Most tests run on an in-memory database. The concurrency test uses a
//! file-backed database in a temp directory so the reader and writer pools
//! exercise the same split-pool layout production uses.

use chrono::{Duration, Utc};
use circ_core::{Money, Role, DAILY_PENALTY};
use circ_db::{CircError, Database, DbConfig};

async fn mem_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

// =============================================================================
// Issue
// =============================================================================

#[tokio::test]
async fn issue_decrements_stock_and_opens_loan() {
    let db = mem_db().await;
    let item = db.items().create("Dune", "Frank Herbert", "Fiction", 3).await.unwrap();
    let due = Utc::now().date_naive() + Duration::days(14);

    let receipt = db.circulation().issue(&item.id, "Alice", due).await.unwrap();
    assert_eq!(receipt.due_date, due);

    let snapshot = db.queries().availability(&item.id).await.unwrap();
    assert_eq!(snapshot.available, 2);
    assert_eq!(snapshot.total, 3);

    let loan = db.loans().get_by_id(&receipt.loan_id).await.unwrap().unwrap();
    assert!(loan.is_open());
    assert_eq!(loan.borrower_name, "Alice");
    assert_eq!(loan.due_date, due);
}

#[tokio::test]
async fn issue_unknown_item_is_not_found() {
    let db = mem_db().await;
    let due = Utc::now().date_naive() + Duration::days(7);

    let err = db.circulation().issue("no-such-id", "Alice", due).await.unwrap_err();
    assert_eq!(err.kind(), "NOT_FOUND");
}

#[tokio::test]
async fn issue_exhausted_item_is_unavailable_and_leaves_state_unchanged() {
    let db = mem_db().await;
    let item = db.items().create("Hamlet", "Shakespeare", "Fiction", 1).await.unwrap();
    let due = Utc::now().date_naive() + Duration::days(7);

    db.circulation().issue(&item.id, "Alice", due).await.unwrap();

    let err = db.circulation().issue(&item.id, "Bob", due).await.unwrap_err();
    assert!(matches!(err, CircError::Unavailable { .. }));
    assert_eq!(err.kind(), "UNAVAILABLE");

    // The failed attempt left no trace.
    let snapshot = db.queries().availability(&item.id).await.unwrap();
    assert_eq!(snapshot.available, 0);
    assert_eq!(db.loans().open_count(&item.id).await.unwrap(), 1);
}

#[tokio::test]
async fn second_open_loan_for_same_pair_is_rejected_and_rolled_back() {
    let db = mem_db().await;
    let item = db.items().create("Emma", "Jane Austen", "Fiction", 5).await.unwrap();
    let due = Utc::now().date_naive() + Duration::days(7);

    db.circulation().issue(&item.id, "Alice", due).await.unwrap();

    let err = db.circulation().issue(&item.id, "Alice", due).await.unwrap_err();
    assert_eq!(err.kind(), "DUPLICATE_KEY");

    // The rejected issue rolled back its stock decrement too.
    let snapshot = db.queries().availability(&item.id).await.unwrap();
    assert_eq!(snapshot.available, 4);
    assert_eq!(db.loans().open_count(&item.id).await.unwrap(), 1);
}

#[tokio::test]
async fn issue_rejects_blank_borrower() {
    let db = mem_db().await;
    let item = db.items().create("Ulysses", "James Joyce", "Fiction", 1).await.unwrap();
    let due = Utc::now().date_naive() + Duration::days(7);

    let err = db.circulation().issue(&item.id, "   ", due).await.unwrap_err();
    assert_eq!(err.kind(), "VALIDATION");

    let snapshot = db.queries().availability(&item.id).await.unwrap();
    assert_eq!(snapshot.available, 1);
}

// =============================================================================
// Return and Fines
// =============================================================================

#[tokio::test]
async fn return_on_time_charges_no_fine() {
    let db = mem_db().await;
    let item = db.items().create("Walden", "Thoreau", "Non-fiction", 2).await.unwrap();
    let due = Utc::now().date_naive() + Duration::days(1);

    db.circulation().issue(&item.id, "Alice", due).await.unwrap();
    let receipt = db.circulation().return_item(&item.id, "Alice").await.unwrap();

    assert!(receipt.fine.is_zero());

    let snapshot = db.queries().availability(&item.id).await.unwrap();
    assert_eq!(snapshot.available, 2);
}

#[tokio::test]
async fn return_three_days_late_charges_three_daily_penalties() {
    let db = mem_db().await;
    let item = db.items().create("Iliad", "Homer", "Fiction", 1).await.unwrap();
    let due = Utc::now().date_naive() - Duration::days(3);

    db.circulation().issue(&item.id, "Alice", due).await.unwrap();
    let receipt = db.circulation().return_item(&item.id, "Alice").await.unwrap();

    assert_eq!(receipt.fine, DAILY_PENALTY * 3);
    assert_eq!(receipt.fine.cents(), 1500);

    // The closed ledger row records the same fine.
    let loan = db.loans().get_by_id(&receipt.loan_id).await.unwrap().unwrap();
    assert!(!loan.is_open());
    assert_eq!(loan.fine(), Some(Money::from_cents(1500)));
}

#[tokio::test]
async fn return_without_open_loan_fails() {
    let db = mem_db().await;
    let item = db.items().create("Odyssey", "Homer", "Fiction", 1).await.unwrap();

    let err = db.circulation().return_item(&item.id, "Alice").await.unwrap_err();
    assert_eq!(err.kind(), "NO_ACTIVE_LOAN");
    assert!(err.to_string().contains("verify the item identifier"));
}

#[tokio::test]
async fn double_return_fails_on_second_attempt() {
    let db = mem_db().await;
    let item = db.items().create("Persuasion", "Jane Austen", "Fiction", 1).await.unwrap();
    let due = Utc::now().date_naive() + Duration::days(7);

    db.circulation().issue(&item.id, "Alice", due).await.unwrap();
    db.circulation().return_item(&item.id, "Alice").await.unwrap();

    let err = db.circulation().return_item(&item.id, "Alice").await.unwrap_err();
    assert_eq!(err.kind(), "NO_ACTIVE_LOAN");

    // Stock did not climb past total.
    let snapshot = db.queries().availability(&item.id).await.unwrap();
    assert_eq!(snapshot.available, 1);
    assert_eq!(snapshot.total, 1);
}

#[tokio::test]
async fn full_circulation_scenario() {
    let db = mem_db().await;
    let item = db.items().create("Dubliners", "James Joyce", "Fiction", 2).await.unwrap();
    let today = Utc::now().date_naive();

    // Alice takes a copy that was due yesterday (backdated due date).
    db.circulation().issue(&item.id, "Alice", today - Duration::days(1)).await.unwrap();
    assert_eq!(db.queries().availability(&item.id).await.unwrap().available, 1);

    // Bob takes the last copy.
    db.circulation().issue(&item.id, "Bob", today + Duration::days(7)).await.unwrap();
    assert_eq!(db.queries().availability(&item.id).await.unwrap().available, 0);

    // Carol is turned away.
    let err = db.circulation().issue(&item.id, "Carol", today + Duration::days(7)).await.unwrap_err();
    assert_eq!(err.kind(), "UNAVAILABLE");

    // Alice returns one day late.
    let receipt = db.circulation().return_item(&item.id, "Alice").await.unwrap();
    assert_eq!(receipt.fine, DAILY_PENALTY);
    assert_eq!(db.queries().availability(&item.id).await.unwrap().available, 1);

    // Only Bob's loan remains open, and it is not overdue.
    let active = db.queries().active_loans().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].borrower_name, "Bob");
    assert!(db.queries().overdue_loans().await.unwrap().is_empty());
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn active_loans_sorted_by_due_date_with_titles() {
    let db = mem_db().await;
    let a = db.items().create("Book A", "Author A", "Fiction", 1).await.unwrap();
    let b = db.items().create("Book B", "Author B", "Fiction", 1).await.unwrap();
    let today = Utc::now().date_naive();

    db.circulation().issue(&a.id, "Alice", today + Duration::days(10)).await.unwrap();
    db.circulation().issue(&b.id, "Bob", today + Duration::days(2)).await.unwrap();

    let active = db.queries().active_loans().await.unwrap();
    assert_eq!(active.len(), 2);
    assert_eq!(active[0].title, "Book B");
    assert_eq!(active[1].title, "Book A");
}

#[tokio::test]
async fn overdue_loans_excludes_due_today_and_future() {
    let db = mem_db().await;
    let item = db.items().create("Book C", "Author C", "Fiction", 3).await.unwrap();
    let today = Utc::now().date_naive();

    db.circulation().issue(&item.id, "Past", today - Duration::days(2)).await.unwrap();
    db.circulation().issue(&item.id, "Today", today).await.unwrap();
    db.circulation().issue(&item.id, "Future", today + Duration::days(2)).await.unwrap();

    let overdue = db.queries().overdue_loans().await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].borrower_name, "Past");
}

#[tokio::test]
async fn availability_round_trip_and_unknown_item() {
    let db = mem_db().await;
    let item = db.items().create("Book D", "Author D", "Reference", 5).await.unwrap();

    let snapshot = db.queries().availability(&item.id).await.unwrap();
    assert_eq!(snapshot.title, "Book D");
    assert_eq!(snapshot.available, 5);
    assert_eq!(snapshot.total, 5);

    let err = db.queries().availability("missing").await.unwrap_err();
    assert_eq!(err.kind(), "NOT_FOUND");
}

// =============================================================================
// Catalog Updates
// =============================================================================

#[tokio::test]
async fn update_recomputes_available_from_open_loans() {
    let db = mem_db().await;
    let item = db.items().create("Book E", "Author E", "Fiction", 3).await.unwrap();
    let due = Utc::now().date_naive() + Duration::days(7);

    db.circulation().issue(&item.id, "Alice", due).await.unwrap();
    db.circulation().issue(&item.id, "Bob", due).await.unwrap();

    // Grow the holding: 2 copies out, so 5 total means 3 on the shelf.
    db.items().update(&item.id, "Book E", "Author E", "Fiction", 5).await.unwrap();

    let snapshot = db.queries().availability(&item.id).await.unwrap();
    assert_eq!(snapshot.total, 5);
    assert_eq!(snapshot.available, 3);
}

#[tokio::test]
async fn update_rejects_total_below_open_loans() {
    let db = mem_db().await;
    let item = db.items().create("Book F", "Author F", "Fiction", 3).await.unwrap();
    let due = Utc::now().date_naive() + Duration::days(7);

    db.circulation().issue(&item.id, "Alice", due).await.unwrap();
    db.circulation().issue(&item.id, "Bob", due).await.unwrap();

    let err = db.items().update(&item.id, "Book F", "Author F", "Fiction", 1).await.unwrap_err();
    let kind = CircError::from(err).kind();
    assert_eq!(kind, "VALIDATION");

    // Nothing changed.
    let snapshot = db.queries().availability(&item.id).await.unwrap();
    assert_eq!(snapshot.total, 3);
    assert_eq!(snapshot.available, 1);
}

#[tokio::test]
async fn update_unknown_item_is_not_found() {
    let db = mem_db().await;

    let err = db.items().update("missing", "T", "A", "C", 1).await.unwrap_err();
    assert_eq!(CircError::from(err).kind(), "NOT_FOUND");
}

// =============================================================================
// Borrowers and Accounts
// =============================================================================

#[tokio::test]
async fn duplicate_borrower_email_is_rejected() {
    let db = mem_db().await;

    db.borrowers().create("Alice", "alice@example.com", None).await.unwrap();
    let err = db.borrowers().create("Alicia", "alice@example.com", Some("555-1234")).await.unwrap_err();

    assert_eq!(CircError::from(err).kind(), "DUPLICATE_KEY");
    assert_eq!(db.borrowers().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn account_lifecycle() {
    let db = mem_db().await;

    let account = db.accounts().create("librarian1", "s3cret", Role::Librarian).await.unwrap();

    // Verify succeeds with the right password only.
    let role = db.accounts().verify("librarian1", "s3cret").await.unwrap();
    assert_eq!(role, Role::Librarian);
    let err = db.accounts().verify("librarian1", "wrong").await.unwrap_err();
    assert_eq!(err.kind(), "INVALID_CREDENTIALS");
    let err = db.accounts().verify("nobody", "s3cret").await.unwrap_err();
    assert_eq!(err.kind(), "INVALID_CREDENTIALS");

    // Username is unique.
    let err = db.accounts().create("librarian1", "other", Role::Admin).await.unwrap_err();
    assert_eq!(err.kind(), "DUPLICATE_KEY");

    // Listing never exposes hashes (the type has no hash field).
    let listed = db.accounts().list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].username, "librarian1");
    assert_eq!(listed[0].role, Role::Librarian);

    // Delete, then the account is gone.
    db.accounts().delete(&account.id).await.unwrap();
    assert!(db.accounts().list().await.unwrap().is_empty());
    let err = db.accounts().delete(&account.id).await.unwrap_err();
    assert_eq!(err.kind(), "NOT_FOUND");
}

#[tokio::test]
async fn operations_after_close_report_store_unavailable() {
    let db = mem_db().await;
    let item = db.items().create("Book G", "Author G", "Fiction", 1).await.unwrap();

    db.close().await;

    let due = Utc::now().date_naive() + Duration::days(7);
    let err = db.circulation().issue(&item.id, "Alice", due).await.unwrap_err();
    assert_eq!(err.kind(), "STORE_UNAVAILABLE");

    let err = db.queries().availability(&item.id).await.unwrap_err();
    assert_eq!(err.kind(), "STORE_UNAVAILABLE");
}

// =============================================================================
// Concurrency
// =============================================================================

/// With 3 copies and 16 simultaneous issue attempts, exactly 3 succeed and
/// the rest are turned away; the stock invariant holds afterwards.
#[tokio::test]
async fn concurrent_issues_claim_exactly_the_available_copies() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("circ_test.db");
    let db = Database::new(DbConfig::new(&path)).await.unwrap();

    let item = db.items().create("Hot Title", "Popular Author", "Fiction", 3).await.unwrap();
    let due = Utc::now().date_naive() + Duration::days(7);

    let mut handles = Vec::new();
    for n in 0..16 {
        let db = db.clone();
        let item_id = item.id.clone();
        handles.push(tokio::spawn(async move {
            let borrower = format!("Borrower {}", n);
            db.circulation().issue(&item_id, &borrower, due).await
        }));
    }

    let mut ok = 0;
    let mut unavailable = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => {
                assert_eq!(e.kind(), "UNAVAILABLE");
                unavailable += 1;
            }
        }
    }

    assert_eq!(ok, 3);
    assert_eq!(unavailable, 13);

    let snapshot = db.queries().availability(&item.id).await.unwrap();
    assert_eq!(snapshot.available, 0);
    assert_eq!(snapshot.total, 3);
    assert_eq!(db.loans().open_count(&item.id).await.unwrap(), 3);

    db.close().await;
}
