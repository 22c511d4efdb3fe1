//! # Command-Line Interface
//!
//! User-facing commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Lending | Borrow/return cycle | `borrow`, `return` |
//! | Book | Catalog queries and upserts | `book list`, `book find`, `book add-batch` |
//! | Card | Reader card management | `card add`, `card delete` |
//! | Admin | Setup and debugging | `init`, `schema` |
//!
//! All query commands honor `--format text|json`. The database location
//! comes from `--db`, the `LIBDESK_DB` environment variable, or the user
//! data directory, in that order.
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod query;

pub use app::{run, BookCommands, CardCommands, Cli, Commands};
pub use output::OutputFormat;
pub use query::{FindField, RangeField};
