//! # Storage Layer
//!
//! SQLite persistence for libdesk. One interactive session drives exactly
//! one connection; all calls are synchronous and blocking.
//!
//! ## Tables
//!
//! | Table | Key | Contents |
//! |-------|-----|----------|
//! | `book` | `bno` | catalog entries with a live `stock` counter |
//! | `card` | `cno` | reader cards |
//! | `borrow` | `(cno, bno)` | open loans with borrow/due dates |
//!
//! ## Key Types
//!
//! - [`Library`] - typed operations over the catalog, including the
//!   transactional borrow/return mutations
//! - [`QueryTable`] - a fully materialized result set of display strings
//! - [`execute_read`] / [`execute_write`] - the generic statement executor
//!   every lookup flows through

mod connection;
mod exec;
mod library;
mod table;

pub use connection::{default_db_path, open, open_in_memory};
pub use exec::{execute_read, execute_write, ExecError, QueryTable};
pub use library::{CirculationError, Library};
pub use table::render_table;
