//! libdesk - a small library circulation desk console backed by SQLite
//!
//! The tool manages a catalog of books, reader cards, and the borrow/return
//! cycle against an embedded relational store. Stock counters and open
//! loans are kept consistent by running each lending mutation inside one
//! transaction.

pub mod circulation;
pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{Book, Card, CardKind, Loan};
pub use storage::Library;
