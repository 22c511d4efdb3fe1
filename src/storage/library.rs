//! Typed catalog operations
//!
//! [`Library`] owns the session's single connection and exposes the
//! operations the workflows need. The borrow/return mutations run inside a
//! scoped [`rusqlite::Transaction`]: commit is explicit and any early exit,
//! including error propagation, rolls both statements back when the guard
//! drops. Autocommit is therefore never left off on any path.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction};
use thiserror::Error;
use tracing::warn;

use crate::domain::{Book, Card, CardKind, Loan};

use super::connection;
use super::exec::{execute_read, execute_write, ExecError, QueryTable};

const REPLACE_BOOK_SQL: &str =
    "REPLACE INTO book (bno, category, title, press, year, author, price, total, stock)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

/// Failures of the lending state machine that the console reports to the
/// reader rather than treating as bugs.
#[derive(Debug, Error)]
pub enum CirculationError {
    #[error("book {0} is out of stock")]
    OutOfStock(String),

    #[error("no book numbered {0}")]
    BookNotFound(String),

    #[error("no open loan for card {cno} and book {bno}")]
    LoanNotFound { cno: String, bno: String },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// The catalog store. One instance per session, owning one connection.
pub struct Library {
    conn: Connection,
}

impl Library {
    /// Opens the on-disk catalog, creating schema as needed.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: connection::open(path)?,
        })
    }

    /// In-memory catalog for tests.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: connection::open_in_memory()?,
        })
    }

    /// Borrow of the underlying connection for the generic read pipeline.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn find_book(&self, bno: &str) -> Result<Option<Book>> {
        self.conn
            .query_row(
                "SELECT bno, category, title, press, year, author, price, total, stock
                 FROM book WHERE bno = ?1",
                params![bno],
                |row| {
                    Ok(Book {
                        bno: row.get(0)?,
                        category: row.get(1)?,
                        title: row.get(2)?,
                        press: row.get(3)?,
                        year: row.get(4)?,
                        author: row.get(5)?,
                        price: row.get(6)?,
                        total: row.get(7)?,
                        stock: row.get(8)?,
                    })
                },
            )
            .optional()
            .context("failed to look up book")
    }

    pub fn find_card(&self, cno: &str) -> Result<Option<Card>> {
        self.conn
            .query_row(
                "SELECT cno, name, department, type FROM card WHERE cno = ?1",
                params![cno],
                |row| {
                    let kind: String = row.get(3)?;
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, kind))
                },
            )
            .optional()
            .context("failed to look up card")?
            .map(|(cno, name, department, kind): (String, String, String, String)| {
                let kind: CardKind = kind
                    .parse()
                    .map_err(|e| anyhow::anyhow!("stored card kind is invalid: {e}"))?;
                Ok(Card {
                    cno,
                    name,
                    department,
                    kind,
                })
            })
            .transpose()
    }

    pub fn find_loan(&self, cno: &str, bno: &str) -> Result<Option<Loan>> {
        self.conn
            .query_row(
                "SELECT cno, bno, borrow_date, return_date
                 FROM borrow WHERE cno = ?1 AND bno = ?2",
                params![cno, bno],
                map_loan,
            )
            .optional()
            .context("failed to look up loan")
    }

    /// Open loans held by one card, oldest due first.
    pub fn loans_for_card(&self, cno: &str) -> Result<Vec<Loan>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT cno, bno, borrow_date, return_date
                 FROM borrow WHERE cno = ?1 ORDER BY return_date, bno",
            )
            .context("failed to prepare loan query")?;

        let loans = stmt
            .query_map(params![cno], map_loan)
            .context("failed to load loans")?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to collect loans")?;

        Ok(loans)
    }

    /// Minimum due date over the open loans of a book, or `None` when no
    /// copy is out. On equal dates the first one scanned wins; there is no
    /// secondary order.
    pub fn nearest_due_date(&self, bno: &str) -> Result<Option<NaiveDate>> {
        let mut stmt = self
            .conn
            .prepare("SELECT return_date FROM borrow WHERE bno = ?1")
            .context("failed to prepare due-date query")?;

        let mut rows = stmt
            .query(params![bno])
            .context("failed to query due dates")?;

        let mut nearest: Option<NaiveDate> = None;
        while let Some(row) = rows.next().context("failed to fetch due date")? {
            let due: NaiveDate = row.get(0).context("failed to read due date")?;
            match nearest {
                Some(current) if due >= current => {}
                _ => nearest = Some(due),
            }
        }

        Ok(nearest)
    }

    /// Opens a loan: decrement stock, insert the borrow row, atomically.
    ///
    /// The decrement carries its own `stock > 0` guard, so the counter can
    /// never go negative even if availability changed between the workflow's
    /// check and this call. Zero touched rows aborts and rolls back.
    pub fn borrow_book(&mut self, loan: &Loan) -> Result<(), CirculationError> {
        let tx = self.conn.transaction()?;

        let touched = exec_in_tx(
            &tx,
            "UPDATE book SET stock = stock - 1 WHERE bno = ?1 AND stock > 0",
            params![loan.bno],
        )?;
        if touched == 0 {
            warn!(bno = %loan.bno, "borrow aborted: no available stock, rolling back");
            return Err(CirculationError::OutOfStock(loan.bno.clone()));
        }

        exec_in_tx(
            &tx,
            "INSERT INTO borrow (cno, bno, borrow_date, return_date) VALUES (?1, ?2, ?3, ?4)",
            params![loan.cno, loan.bno, loan.borrow_date, loan.due_date],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Closes a loan: increment stock, delete the borrow row, atomically.
    /// A book already at zero stock can still be returned; only a missing
    /// book row or a missing loan row aborts (and rolls back).
    pub fn return_book(&mut self, cno: &str, bno: &str) -> Result<(), CirculationError> {
        let tx = self.conn.transaction()?;

        let touched = exec_in_tx(
            &tx,
            "UPDATE book SET stock = stock + 1 WHERE bno = ?1",
            params![bno],
        )?;
        if touched == 0 {
            warn!(%bno, "return aborted: book row missing, rolling back");
            return Err(CirculationError::BookNotFound(bno.to_string()));
        }

        let deleted = exec_in_tx(
            &tx,
            "DELETE FROM borrow WHERE cno = ?1 AND bno = ?2",
            params![cno, bno],
        )?;
        if deleted == 0 {
            warn!(%cno, %bno, "return aborted: no such loan, rolling back");
            return Err(CirculationError::LoanNotFound {
                cno: cno.to_string(),
                bno: bno.to_string(),
            });
        }

        tx.commit()?;
        Ok(())
    }

    /// Replace-style write: insert when absent, overwrite when the book
    /// number already exists.
    pub fn replace_book(&self, book: &Book) -> Result<usize> {
        execute_write(
            &self.conn,
            REPLACE_BOOK_SQL,
            params![
                book.bno,
                book.category,
                book.title,
                book.press,
                book.year,
                book.author,
                book.price,
                book.total,
                book.stock
            ],
        )
        .context("failed to replace book")
    }

    /// Batched replace. Returns the aggregate affected count; a row that
    /// fails is logged and skipped, it never aborts the rest of the batch.
    pub fn replace_books(&self, books: &[Book]) -> Result<usize> {
        let mut stmt = self
            .conn
            .prepare(REPLACE_BOOK_SQL)
            .map_err(|e| ExecError::new(REPLACE_BOOK_SQL, e))
            .context("failed to prepare batch replace")?;

        let mut affected = 0;
        for book in books {
            match stmt.execute(params![
                book.bno,
                book.category,
                book.title,
                book.press,
                book.year,
                book.author,
                book.price,
                book.total,
                book.stock
            ]) {
                Ok(n) => affected += n,
                Err(e) => warn!(bno = %book.bno, error = %e, "batch row failed, skipping"),
            }
        }

        Ok(affected)
    }

    /// One probe covering every candidate key in a single round trip: an
    /// OR-chain over the primary-key equality predicate.
    pub fn books_with_numbers(&self, bnos: &[String]) -> Result<QueryTable> {
        if bnos.is_empty() {
            return Ok(QueryTable::default());
        }

        let predicate = vec!["bno = ?"; bnos.len()].join(" OR ");
        let sql = format!(
            "SELECT bno, category, title, press, year, author, price, total, stock
             FROM book WHERE {predicate} ORDER BY bno"
        );

        execute_read(&self.conn, &sql, params_from_iter(bnos.iter()))
            .context("failed to probe candidate book numbers")
    }

    pub fn replace_card(&self, card: &Card) -> Result<usize> {
        execute_write(
            &self.conn,
            "REPLACE INTO card (cno, name, department, type) VALUES (?1, ?2, ?3, ?4)",
            params![card.cno, card.name, card.department, card.kind.code()],
        )
        .context("failed to replace card")
    }

    pub fn delete_card(&self, cno: &str) -> Result<usize> {
        execute_write(&self.conn, "DELETE FROM card WHERE cno = ?1", params![cno])
            .context("failed to delete card")
    }
}

fn map_loan(row: &rusqlite::Row<'_>) -> rusqlite::Result<Loan> {
    Ok(Loan {
        cno: row.get(0)?,
        bno: row.get(1)?,
        borrow_date: row.get(2)?,
        due_date: row.get(3)?,
    })
}

/// Run one mutating statement inside an open transaction, logging the SQL
/// on failure before the guard rolls everything back.
fn exec_in_tx(
    tx: &Transaction<'_>,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<usize, CirculationError> {
    tx.execute(sql, params).map_err(|e| {
        warn!(%sql, error = %e, "statement failed inside transaction");
        CirculationError::Sqlite(e)
    })
}
