//! Loan record
//!
//! A loan links one card to one book for a bounded period. The `(cno, bno)`
//! pair is the natural key: a second borrow of the same pair while one loan
//! is open must be rejected upstream.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default borrow duration when the reader does not override it.
pub const DEFAULT_LOAN_DAYS: u64 = 14;

/// One open borrow record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    /// Borrowing card number.
    pub cno: String,
    /// Borrowed book number.
    pub bno: String,
    /// Day the loan was opened.
    pub borrow_date: NaiveDate,
    /// Day the book is due back.
    pub due_date: NaiveDate,
}

impl Loan {
    /// Opens a loan starting today-equivalent `from` and running `days`
    /// days. `None` when the due date would not fit in the calendar.
    pub fn open(cno: &str, bno: &str, from: NaiveDate, days: u64) -> Option<Self> {
        let due_date = from.checked_add_days(Days::new(days))?;
        Some(Self {
            cno: cno.to_string(),
            bno: bno.to_string(),
            borrow_date: from,
            due_date,
        })
    }

    /// Days remaining until the due date, negative when overdue.
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }
}
