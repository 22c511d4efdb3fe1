//! # Circulation Workflows
//!
//! The interactive flows behind the desk: borrowing and returning books,
//! and adding or updating catalog and card records. Every flow is
//! stateless between invocations - it starts cold, re-reads from storage,
//! and talks to the user only through the [`Console`] boundary.

pub mod console;
mod lending;
mod upsert;

pub use console::{Console, FileConsole, StdConsole};
pub use lending::{borrow, give_back};
pub use upsert::{add_book, add_books, add_card, delete_card, modify_card, ConfirmPolicy};

use anyhow::Result;
use rusqlite::Params;

use crate::storage::{execute_read, render_table, Library};

/// Runs a lookup and prints it as a table through the console. The shared
/// display path for every "show this row again" step in the workflows.
fn display_query<P: Params>(
    library: &Library,
    console: &mut dyn Console,
    sql: &str,
    params: P,
) -> Result<()> {
    let table = execute_read(library.conn(), sql, params)?;
    console.print(&render_table(&table));
    Ok(())
}
