//! Output formatting for query commands

use crate::storage::{render_table, QueryTable};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Prints a result set in the selected format: the fixed-width table for
/// humans, one JSON array of column-keyed objects for machines.
pub fn emit(table: &QueryTable, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", render_table(table)),
        OutputFormat::Json => println!("{}", table.to_json()),
    }
}
