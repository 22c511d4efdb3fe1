//! Borrow and return flows
//!
//! Two symmetric state machines over the same storage. Each step either
//! advances with information re-read from the database or aborts with a
//! user-visible message and no mutation; the only writes happen inside the
//! storage layer's transactions.

use anyhow::Result;
use chrono::{Days, Local, NaiveDate};
use rusqlite::params;

use crate::domain::{Loan, DEFAULT_LOAN_DAYS};
use crate::storage::{CirculationError, Library};

use super::console::{confirm, is_quit, prompt_trimmed, Console};
use super::display_query;

/// Interactive borrow: card -> book -> confirmation -> transaction.
pub fn borrow(library: &mut Library, console: &mut dyn Console) -> Result<()> {
    let Some(cno) = prompt_trimmed(console, "Please input your reader's card number: ")? else {
        return Ok(());
    };
    if is_quit(&cno) {
        return Ok(());
    }

    if library.find_card(&cno)?.is_none() {
        console.print(&format!("Unable to find the card numbered: {cno}"));
        return Ok(());
    }
    display_query(library, console, "SELECT * FROM card WHERE cno = ?1", params![cno])?;

    // Current loans are informational here, not a gate.
    if library.loans_for_card(&cno)?.is_empty() {
        console.print(&format!("You haven't borrowed any book as: {cno}"));
    } else {
        display_query(
            library,
            console,
            "SELECT * FROM borrow WHERE cno = ?1 ORDER BY return_date, bno",
            params![cno],
        )?;
    }

    let Some(bno) = prompt_trimmed(console, "Please input the book number of your desired book: ")?
    else {
        return Ok(());
    };
    if is_quit(&bno) {
        return Ok(());
    }

    if library.find_loan(&cno, &bno)?.is_some() {
        console.print(&format!("You've already borrowed book: {bno} as: {cno}"));
        return Ok(());
    }

    let Some(book) = library.find_book(&bno)? else {
        console.print(&format!("Unable to find the book numbered: {bno}"));
        return Ok(());
    };
    let today = Local::now().date_naive();
    if !book.in_stock() {
        console.print("The book is out of stock, please return later");
        if let Some(nearest) = library.nearest_due_date(&bno)? {
            console.print(&format!("The nearest return date is: {nearest}"));
            let days = (nearest - today).num_days();
            console.print(&format!("Which is {days} day(s) from now"));
        }
        return Ok(());
    }
    display_query(library, console, "SELECT * FROM book WHERE bno = ?1", params![bno])?;

    if !confirm(console, "Are you sure you want to borrow this book (Y/N)? ")? {
        return Ok(());
    }

    let duration = prompt_duration(console, today)?;
    let Some(loan) = Loan::open(&cno, &bno, today, duration) else {
        console.print("Cannot accept a due date past the calendar");
        return Ok(());
    };

    match library.borrow_book(&loan) {
        Ok(()) => {}
        Err(CirculationError::OutOfStock(_)) => {
            // Availability changed between the check and the transaction;
            // the guarded decrement kept the counter honest.
            console.print("The book is out of stock, please return later");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    console.print("The book is borrowed");
    display_query(
        library,
        console,
        "SELECT * FROM borrow WHERE cno = ?1 AND bno = ?2",
        params![cno, bno],
    )?;
    display_query(library, console, "SELECT * FROM book WHERE bno = ?1", params![bno])?;

    Ok(())
}

/// Interactive return: the mirror image of [`borrow`].
pub fn give_back(library: &mut Library, console: &mut dyn Console) -> Result<()> {
    let Some(cno) = prompt_trimmed(console, "Please input your reader's card number: ")? else {
        return Ok(());
    };
    if is_quit(&cno) {
        return Ok(());
    }

    if library.find_card(&cno)?.is_none() {
        console.print(&format!("Unable to find the card numbered: {cno}"));
        return Ok(());
    }
    display_query(library, console, "SELECT * FROM card WHERE cno = ?1", params![cno])?;

    if library.loans_for_card(&cno)?.is_empty() {
        console.print(&format!("You haven't borrowed any book as: {cno}"));
        return Ok(());
    }
    display_query(
        library,
        console,
        "SELECT * FROM borrow WHERE cno = ?1 ORDER BY return_date, bno",
        params![cno],
    )?;

    let Some(bno) =
        prompt_trimmed(console, "Please input the book number of the book to be returned: ")?
    else {
        return Ok(());
    };
    if is_quit(&bno) {
        return Ok(());
    }

    if library.find_loan(&cno, &bno)?.is_none() {
        console.print(&format!("You haven't borrowed book: {bno} as: {cno}"));
        return Ok(());
    }

    let Some(book) = library.find_book(&bno)? else {
        console.print(&format!("Unable to find the book numbered: {bno}"));
        return Ok(());
    };
    if !book.in_stock() {
        // Scarcity never blocks a return.
        console.print("The book is out of stock, do return it if possible");
    }
    display_query(library, console, "SELECT * FROM book WHERE bno = ?1", params![bno])?;

    if !confirm(console, "Are you sure you want to return this book (Y/N)? ")? {
        return Ok(());
    }

    match library.return_book(&cno, &bno) {
        Ok(()) => {}
        Err(CirculationError::LoanNotFound { .. }) => {
            console.print(&format!("You haven't borrowed book: {bno} as: {cno}"));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    console.print("The book is returned");
    display_query(library, console, "SELECT * FROM book WHERE bno = ?1", params![bno])?;

    Ok(())
}

/// Offers to override the default 14-day duration. Non-positive or
/// unparsable answers re-prompt, as does a duration whose due date would
/// overflow the calendar; end of input keeps the default.
fn prompt_duration(console: &mut dyn Console, from: NaiveDate) -> Result<u64> {
    loop {
        if !confirm(
            console,
            "Note that the default return date is 2 weeks later, do you want to change it (Y/N)? ",
        )? {
            return Ok(DEFAULT_LOAN_DAYS);
        }

        let Some(answer) =
            prompt_trimmed(console, "Please input your desired borrow duration in days: ")?
        else {
            return Ok(DEFAULT_LOAN_DAYS);
        };

        match answer.parse::<i64>() {
            Ok(days) if days > 0 => {
                if from.checked_add_days(Days::new(days as u64)).is_none() {
                    console.print("Cannot accept a duration that far in the future, try again");
                    continue;
                }
                console.print(&format!("You've changed your borrowing duration to: {days} day(s)"));
                return Ok(days as u64);
            }
            Ok(_) => console.print("Cannot accept a non-positive duration, try again"),
            Err(_) => {
                tracing::warn!(input = %answer, "cannot read a duration");
                console.print("Illegal input, try again");
            }
        }
    }
}
