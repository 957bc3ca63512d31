//! # circ-db - Circulation Database Layer
//!
//! SQLite-backed storage and operations for the circulation system:
//! connection pooling, migrations, repositories, the circulation engine
//! and the read-side query service.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        circ-db                              │
//! │                                                             │
//! │  ┌───────────────┐  ┌───────────────┐  ┌────────────────┐  │
//! │  │  Circulation   │  │ Query Service │  │ Account Service│  │
//! │  │  Engine        │  │ (reads only)  │  │ (argon2 creds) │  │
//! │  │  issue/return  │  └───────┬───────┘  └───────┬────────┘  │
//! │  └───────┬───────┘          │                  │           │
//! │          │          ┌───────┴──────────────────┴────────┐  │
//! │          │          │          Repositories             │  │
//! │          │          │   Item  │  Loan  │  Borrower      │  │
//! │          │          └───────────────┬───────────────────┘  │
//! │          │                          │                      │
//! │  ┌───────┴──────────────────────────┴───────────────────┐  │
//! │  │   Database: writer pool (1 conn) + reader pool       │  │
//! │  │   WAL mode, foreign keys on, embedded migrations     │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Serialization
//! Every mutation runs on a single-connection writer pool. That turns
//! SQLite's writer lock from a retry problem into a queue: concurrent
//! issue requests for the last copy of an item line up, and exactly one
//! of them finds `available_count > 0`.
//!
//! ## Error Layering
//! Repositories return [`DbResult`] (storage faults only). The engine and
//! services translate those into the operation-level [`CircError`]
//! taxonomy that callers match on via [`CircError::kind`].

pub mod accounts;
pub mod circulation;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod query;
pub mod repository;

pub use accounts::{AccountInfo, AccountService};
pub use circulation::{CirculationEngine, IssueReceipt, ReturnReceipt};
pub use error::{CircError, CircResult, DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use query::{ActiveLoan, Availability, QueryService};
pub use repository::borrower::BorrowerRepository;
pub use repository::item::ItemRepository;
pub use repository::loan::LoanRepository;
