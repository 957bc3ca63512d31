//! # Repository Implementations
//!
//! One repository per table, in the style of a thin data-access layer:
//!
//! - [`item`] - Catalog store (items with total/available counts)
//! - [`loan`] - Ledger store reads (loan rows are written only by the
//!   circulation engine)
//! - [`borrower`] - Registered borrowers

pub mod borrower;
pub mod item;
pub mod loan;
