//! Catalog query commands
//!
//! Every lookup here rides the generic executor/formatter pipeline; the
//! commands only choose the statement and bind the parameters.

use anyhow::{bail, Result};
use rusqlite::params;

use crate::storage::{execute_read, Library};

use super::output::{emit, OutputFormat};

/// Column a book lookup matches exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FindField {
    Title,
    Number,
    Category,
    Press,
    Author,
}

impl FindField {
    fn column(self) -> &'static str {
        match self {
            FindField::Title => "title",
            FindField::Number => "bno",
            FindField::Category => "category",
            FindField::Press => "press",
            FindField::Author => "author",
        }
    }
}

/// Numeric column a range lookup brackets inclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RangeField {
    Year,
    Price,
}

/// Lists the whole catalog.
pub fn list_books(library: &Library, format: OutputFormat) -> Result<()> {
    let table = execute_read(library.conn(), "SELECT * FROM book ORDER BY bno", [])?;
    if table.is_empty() {
        println!("Cannot find any book");
    } else {
        emit(&table, format);
    }
    Ok(())
}

/// Exact-match lookup on one text column.
pub fn find_books(library: &Library, field: FindField, value: &str, format: OutputFormat) -> Result<()> {
    let sql = format!(
        "SELECT * FROM book WHERE {} = ?1 ORDER BY bno",
        field.column()
    );
    let table = execute_read(library.conn(), &sql, params![value])?;
    if table.is_empty() {
        println!(
            "Cannot find any book where {} is \"{}\"",
            field.column(),
            value
        );
    } else {
        emit(&table, format);
    }
    Ok(())
}

/// Inclusive range lookup on a numeric column. The bounds are re-checked
/// here because clap hands them over as text: year wants integers, price
/// accepts decimals.
pub fn range_books(
    library: &Library,
    field: RangeField,
    low: &str,
    high: &str,
    format: OutputFormat,
) -> Result<()> {
    let table = match field {
        RangeField::Year => {
            let (Ok(low), Ok(high)) = (low.parse::<i64>(), high.parse::<i64>()) else {
                bail!("year bounds must be integers, got \"{low}\" and \"{high}\"");
            };
            execute_read(
                library.conn(),
                "SELECT * FROM book WHERE year BETWEEN ?1 AND ?2 ORDER BY bno",
                params![low, high],
            )?
        }
        RangeField::Price => {
            let (Ok(low), Ok(high)) = (low.parse::<f64>(), high.parse::<f64>()) else {
                bail!("price bounds must be numbers, got \"{low}\" and \"{high}\"");
            };
            execute_read(
                library.conn(),
                "SELECT * FROM book WHERE price BETWEEN ?1 AND ?2 ORDER BY bno",
                params![low, high],
            )?
        }
    };

    if table.is_empty() {
        println!("Cannot find any book in range {low} to {high}");
    } else {
        emit(&table, format);
    }
    Ok(())
}

/// Prints the CREATE TABLE statement of every user table. A debugging aid
/// for checking what schema a database file actually carries.
pub fn show_schema(library: &Library, format: OutputFormat) -> Result<()> {
    let table = execute_read(
        library.conn(),
        "SELECT name, sql FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        [],
    )?;
    emit(&table, format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Book;

    fn seeded() -> Library {
        let lib = Library::open_in_memory().unwrap();
        for (bno, year, price) in [("B1", 1995, 100.2), ("B2", 2001, 55.0)] {
            lib.replace_book(&Book {
                bno: bno.to_string(),
                category: "cat".to_string(),
                title: format!("title-{bno}"),
                press: "press".to_string(),
                year,
                author: "author".to_string(),
                price,
                total: 3,
                stock: 3,
            })
            .unwrap();
        }
        lib
    }

    #[test]
    fn find_field_maps_to_columns() {
        assert_eq!(FindField::Number.column(), "bno");
        assert_eq!(FindField::Title.column(), "title");
    }

    #[test]
    fn exact_and_range_queries_run() {
        let lib = seeded();
        find_books(&lib, FindField::Title, "title-B1", OutputFormat::Text).unwrap();
        range_books(&lib, RangeField::Year, "1990", "2000", OutputFormat::Text).unwrap();
        range_books(&lib, RangeField::Price, "50", "60", OutputFormat::Json).unwrap();
        list_books(&lib, OutputFormat::Text).unwrap();
        show_schema(&lib, OutputFormat::Text).unwrap();
    }

    #[test]
    fn bad_year_bounds_are_an_input_error() {
        let lib = seeded();
        let err = range_books(&lib, RangeField::Year, "soon", "2000", OutputFormat::Text)
            .unwrap_err();
        assert!(err.to_string().contains("year bounds"));
    }
}
