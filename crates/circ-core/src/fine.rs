//! # Fine Module
//!
//! Provides the `Money` type and the overdue fine schedule.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Fines are days_overdue × 500 cents. Always exact.                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fine Schedule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  due_date ──────────────► return moment                                 │
//! │                                                                         │
//! │  returned on or before due_date        fine = 0                        │
//! │  returned d calendar days late         fine = d × DAILY_PENALTY        │
//! │                                                                         │
//! │  "Days late" is a whole-day ceiling over calendar dates: returning     │
//! │  at any time on the day after the due date counts as one full day.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use circ_core::fine::{overdue_fine, Money, DAILY_PENALTY};
//!
//! let due = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
//!
//! // On time: no fine
//! let on_time = Utc.with_ymd_and_hms(2026, 3, 10, 18, 0, 0).unwrap();
//! assert_eq!(overdue_fine(due, on_time), Money::zero());
//!
//! // One day late
//! let late = Utc.with_ymd_and_hms(2026, 3, 11, 9, 0, 0).unwrap();
//! assert_eq!(overdue_fine(due, late), DAILY_PENALTY);
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for fine waivers/adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use circ_core::fine::Money;
    ///
    /// let fine = Money::from_cents(500); // 5 currency units
    /// assert_eq!(fine.cents(), 500);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the amount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Money {
    /// Formats as major.minor, e.g. `15.00`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    #[inline]
    fn mul(self, rhs: i64) -> Money {
        Money(self.0 * rhs)
    }
}

// =============================================================================
// Fine Schedule
// =============================================================================

/// Penalty charged per full day overdue.
///
/// Fixed at 5 currency units per day. The rate is a constant, not
/// configuration: the system has exactly one fine schedule.
pub const DAILY_PENALTY: Money = Money::from_cents(500);

/// Number of whole days a loan is overdue at the return moment.
///
/// Computed over calendar dates (UTC): returning at any time on the day
/// after the due date counts as one full day late. Returns 0 when the loan
/// is returned on or before the due date.
///
/// ## Example
/// ```rust
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use circ_core::fine::days_overdue;
///
/// let due = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
/// let now = Utc.with_ymd_and_hms(2026, 3, 13, 23, 59, 0).unwrap();
/// assert_eq!(days_overdue(due, now), 3);
/// ```
pub fn days_overdue(due_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let late = (now.date_naive() - due_date).num_days();
    late.max(0)
}

/// Fine owed for a loan due on `due_date` and returned at `now`.
///
/// Deterministic: `now` must be sampled once per return operation so the
/// recorded fine matches the recorded return timestamp.
pub fn overdue_fine(due_date: NaiveDate, now: DateTime<Utc>) -> Money {
    DAILY_PENALTY * days_overdue(due_date, now)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn moment(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1500).to_string(), "15.00");
        assert_eq!(Money::from_cents(505).to_string(), "5.05");
        assert_eq!(Money::from_cents(-250).to_string(), "-2.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(500);
        let b = Money::from_cents(250);
        assert_eq!(a + b, Money::from_cents(750));
        assert_eq!(a - b, Money::from_cents(250));
        assert_eq!(a * 3, Money::from_cents(1500));

        let mut c = Money::zero();
        c += a;
        assert_eq!(c, a);
    }

    #[test]
    fn test_no_fine_on_or_before_due_date() {
        let due = date(2026, 3, 10);

        // Returned the same day, late in the evening
        assert_eq!(overdue_fine(due, moment(2026, 3, 10, 22)), Money::zero());

        // Returned early
        assert_eq!(overdue_fine(due, moment(2026, 3, 8, 9)), Money::zero());
    }

    #[test]
    fn test_one_day_late_charges_one_day() {
        let due = date(2026, 3, 10);

        // Any time on the next calendar day is one full day late
        assert_eq!(overdue_fine(due, moment(2026, 3, 11, 0)), DAILY_PENALTY);
        assert_eq!(overdue_fine(due, moment(2026, 3, 11, 23)), DAILY_PENALTY);
    }

    #[test]
    fn test_three_days_late() {
        let due = date(2026, 3, 10);
        let fine = overdue_fine(due, moment(2026, 3, 13, 15));
        assert_eq!(fine, DAILY_PENALTY * 3);
        assert_eq!(fine.cents(), 1500);
    }

    #[test]
    fn test_days_overdue_never_negative() {
        let due = date(2026, 3, 10);
        assert_eq!(days_overdue(due, moment(2026, 3, 1, 12)), 0);
    }

    #[test]
    fn test_overdue_across_month_boundary() {
        let due = date(2026, 2, 27);
        // 2026 is not a leap year: Feb 27 → Mar 2 is 3 days
        assert_eq!(days_overdue(due, moment(2026, 3, 2, 8)), 3);
    }
}
