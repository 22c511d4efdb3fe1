//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::OutputFormat;
use super::query::{self, FindField, RangeField};
use crate::circulation::{self, ConfirmPolicy, FileConsole, StdConsole};
use crate::storage::{default_db_path, Library};

#[derive(Parser)]
#[command(name = "libdesk")]
#[command(author, version, about = "A small library circulation desk console backed by SQLite")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file (defaults to the user data directory)
    #[arg(long, global = true, env = "LIBDESK_DB")]
    pub db: Option<PathBuf>,

    /// Output format for query results
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and schema
    Init,

    /// Borrow a book interactively
    Borrow,

    /// Return a borrowed book interactively
    Return,

    /// Query and maintain the book catalog
    #[command(subcommand)]
    Book(BookCommands),

    /// Manage reader cards
    #[command(subcommand)]
    Card(CardCommands),

    /// Print the CREATE TABLE statements of the live database
    Schema,
}

#[derive(Subcommand)]
pub enum BookCommands {
    /// List the whole catalog
    List,

    /// Find books where a column matches exactly
    Find {
        /// Column to match
        field: FindField,
        /// Value to match
        value: String,
    },

    /// Find books with a column inside an inclusive range
    Range {
        /// Numeric column to bracket
        field: RangeField,
        /// Lower bound
        low: String,
        /// Upper bound
        high: String,
    },

    /// Add or update one book from a prompted line
    Add,

    /// Add or update books in batch from prompted lines
    AddBatch {
        /// Confirm each duplicate individually instead of once per batch
        #[arg(long)]
        confirm_each: bool,
    },

    /// Add or update books in batch from a file
    Import {
        /// File with one comma-separated book record per line
        file: PathBuf,

        /// Confirm each duplicate individually instead of once per batch
        #[arg(long)]
        confirm_each: bool,
    },
}

#[derive(Subcommand)]
pub enum CardCommands {
    /// Issue a card (asks before overwriting an existing number)
    Add,

    /// Update an existing card
    Modify,

    /// Delete a card
    Delete,
}

fn confirm_policy(confirm_each: bool) -> ConfirmPolicy {
    if confirm_each {
        ConfirmPolicy::PerRecord
    } else {
        ConfirmPolicy::OncePerBatch
    }
}

/// Parses arguments and runs the selected command against the catalog.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "libdesk=debug" } else { "libdesk=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => default_db_path()?,
    };
    let mut library = Library::open(&db_path)?;
    let mut console = StdConsole;

    match cli.command {
        Commands::Init => {
            println!("Initialized library database at {}", db_path.display());
        }
        Commands::Borrow => circulation::borrow(&mut library, &mut console)?,
        Commands::Return => circulation::give_back(&mut library, &mut console)?,
        Commands::Book(command) => match command {
            BookCommands::List => query::list_books(&library, cli.format)?,
            BookCommands::Find { field, value } => {
                query::find_books(&library, field, &value, cli.format)?
            }
            BookCommands::Range { field, low, high } => {
                query::range_books(&library, field, &low, &high, cli.format)?
            }
            BookCommands::Add => circulation::add_book(&library, &mut console)?,
            BookCommands::AddBatch { confirm_each } => {
                circulation::add_books(&library, &mut console, confirm_policy(confirm_each))?
            }
            BookCommands::Import { file, confirm_each } => {
                let mut file_console = FileConsole::open(&file)?;
                circulation::add_books(&library, &mut file_console, confirm_policy(confirm_each))?
            }
        },
        Commands::Card(command) => match command {
            CardCommands::Add => circulation::add_card(&library, &mut console)?,
            CardCommands::Modify => circulation::modify_card(&library, &mut console)?,
            CardCommands::Delete => circulation::delete_card(&library, &mut console)?,
        },
        Commands::Schema => query::show_schema(&library, cli.format)?,
    }

    Ok(())
}
