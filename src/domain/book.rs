//! Book catalog record
//!
//! A book row mirrors the `book` table. The `stock` counter is redundant
//! state: it must equal `total` minus the number of open loans referencing
//! the book, and the lending workflow is the only place allowed to move it.

use serde::{Deserialize, Serialize};

/// A catalog entry for one title held by the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Book number, the primary key. Fixed-length string (10 chars in the
    /// seeded catalog), kept as text so leading zeros survive.
    pub bno: String,
    /// Shelving category.
    pub category: String,
    /// Title as printed.
    pub title: String,
    /// Publishing house.
    pub press: String,
    /// Publication year.
    pub year: i64,
    /// Author as printed.
    pub author: String,
    /// List price.
    pub price: f64,
    /// Copies owned in total.
    pub total: i64,
    /// Copies currently on the shelf. Invariant: `0 <= stock <= total`.
    pub stock: i64,
}

impl Book {
    /// Returns true if at least one copy is available to lend.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Checks the stock invariant. The record parser rejects input that
    /// violates it, so no upsert path can install an inconsistent row;
    /// storage tests re-check it after lending mutations.
    pub fn stock_consistent(&self) -> bool {
        self.stock >= 0 && self.stock <= self.total
    }
}
