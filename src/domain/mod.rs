//! Domain models for libdesk
//!
//! Contains the catalog records and the record parser, without any I/O
//! concerns.

mod book;
mod card;
mod loan;
mod parse;

pub use book::Book;
pub use card::{Card, CardKind};
pub use loan::{Loan, DEFAULT_LOAN_DAYS};
pub use parse::{parse_book, parse_card_fields, split_fields, ParseError};
