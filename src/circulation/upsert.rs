//! Single and batch upsert flows
//!
//! Catalog and card records are written with replace semantics keyed on the
//! primary key. Whenever a write would overwrite an existing row the user
//! sees the current row first and must confirm. The batch path probes all
//! candidate keys in one round trip and reports only the aggregate affected
//! count; per-row failures during the batched write are logged, not shown.

use anyhow::Result;
use rusqlite::params;
use tracing::warn;

use crate::domain::{parse_book, parse_card_fields, Card};
use crate::storage::{render_table, Library};

use super::console::{confirm, is_break, is_quit, prompt_trimmed, Console};
use super::display_query;

/// How duplicate confirmation is gathered on the batch path. Once per batch
/// is the desk's usual policy; per record exists for stricter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmPolicy {
    /// One confirmation covers every duplicate; declining aborts the batch.
    #[default]
    OncePerBatch,
    /// Each duplicate is confirmed on its own; declined records are dropped
    /// and the rest proceed.
    PerRecord,
}

const BOOK_FIELDS_HELP: &str = "Please input the
1. book number 2. category 3. title 4. press 5. year 6. author 7. price 8. total 9. stock
of the book (existing books will be updated by book number)";

/// Adds or updates one book from a single input line.
pub fn add_book(library: &Library, console: &mut dyn Console) -> Result<()> {
    console.print(BOOK_FIELDS_HELP);
    console.print("(input q to quit) (separate by comma):");

    let book = loop {
        let Some(line) = console.prompt("")? else {
            return Ok(());
        };
        if is_quit(&line) {
            return Ok(());
        }
        match parse_book(&line) {
            Ok(book) => break book,
            Err(e) => {
                warn!(input = %line.trim(), error = %e, "cannot read book record");
                console.print(&format!("Unable to interpret the input ({e}), try again"));
            }
        }
    };

    if library.find_book(&book.bno)?.is_some() {
        console.print("Duplication found");
        display_query(
            library,
            console,
            "SELECT * FROM book WHERE bno = ?1",
            params![book.bno],
        )?;
        if !confirm(
            console,
            "Are you sure you want to update this book's information (Y/N)? ",
        )? {
            return Ok(());
        }
    }

    let affected = library.replace_book(&book)?;
    console.print(&format!("OK, {affected} row(s) affected"));
    display_query(
        library,
        console,
        "SELECT * FROM book WHERE bno = ?1",
        params![book.bno],
    )?;

    Ok(())
}

/// Adds or updates books in batch. Accumulation ends at `b`/`break` or end
/// of input (so file-backed import terminates the same way); `q`/`quit`
/// aborts with no writes. Unparsable lines are skipped with a warning.
pub fn add_books(
    library: &Library,
    console: &mut dyn Console,
    policy: ConfirmPolicy,
) -> Result<()> {
    console.print(BOOK_FIELDS_HELP);
    console.print("(input b to break, q to quit) (separate by comma):");

    let mut records = Vec::new();
    loop {
        let Some(line) = console.prompt("")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        if is_break(&line) {
            break;
        }
        if is_quit(&line) {
            return Ok(());
        }
        match parse_book(&line) {
            Ok(book) => records.push(book),
            Err(e) => {
                warn!(input = %line.trim(), error = %e, "skipping unreadable record");
                console.print(&format!("Skipping unreadable record ({e})"));
            }
        }
    }

    if records.is_empty() {
        return Ok(());
    }
    console.print(&format!(
        "We've received {} record(s) to update or insert",
        records.len()
    ));

    let candidate_keys: Vec<String> = records.iter().map(|b| b.bno.clone()).collect();
    let duplicates = library.books_with_numbers(&candidate_keys)?;

    if !duplicates.is_empty() {
        console.print("Duplication found");
        console.print(&render_table(&duplicates));

        match policy {
            ConfirmPolicy::OncePerBatch => {
                if !confirm(
                    console,
                    "Are you sure you want to update these books' information (Y/N)? ",
                )? {
                    return Ok(());
                }
            }
            ConfirmPolicy::PerRecord => {
                let existing: Vec<String> =
                    duplicates.column("bno").iter().map(|s| s.to_string()).collect();
                let mut kept = Vec::with_capacity(records.len());
                for book in records {
                    if existing.contains(&book.bno)
                        && !confirm(
                            console,
                            &format!("Overwrite book {} (Y/N)? ", book.bno),
                        )?
                    {
                        continue;
                    }
                    kept.push(book);
                }
                records = kept;
                if records.is_empty() {
                    return Ok(());
                }
            }
        }
    }

    let affected = library.replace_books(&records)?;
    console.print(&format!("OK, {affected} row(s) affected."));

    let written_keys: Vec<String> = records.iter().map(|b| b.bno.clone()).collect();
    let table = library.books_with_numbers(&written_keys)?;
    console.print(&render_table(&table));

    Ok(())
}

/// Creates a card, asking before overwriting an existing number.
pub fn add_card(library: &Library, console: &mut dyn Console) -> Result<()> {
    let Some(cno) = prompt_trimmed(console, "Please input the card number you want to add: ")?
    else {
        return Ok(());
    };
    if is_quit(&cno) {
        return Ok(());
    }

    if library.find_card(&cno)?.is_some() {
        console.print("Duplication found");
        display_query(library, console, "SELECT * FROM card WHERE cno = ?1", params![cno])?;
        if !confirm(console, "Do you want to modify this card's information (Y/N)? ")? {
            return Ok(());
        }
    }

    write_card_fields(library, console, &cno)
}

/// Updates an existing card; unlike [`add_card`] a missing number aborts.
pub fn modify_card(library: &Library, console: &mut dyn Console) -> Result<()> {
    let Some(cno) = prompt_trimmed(console, "Please input the card number you want to modify: ")?
    else {
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
    if !confirm(console, "Is this the card you want to modify (Y/N)? ")? {
        return Ok(());
    }

    write_card_fields(library, console, &cno)
}

/// Deletes a card after showing it and confirming.
pub fn delete_card(library: &Library, console: &mut dyn Console) -> Result<()> {
    let Some(cno) = prompt_trimmed(console, "Please input the card number you want to delete: ")?
    else {
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
    if !confirm(console, "Is this the card you want to delete (Y/N)? ")? {
        return Ok(());
    }

    let affected = library.delete_card(&cno)?;
    console.print(&format!("OK, {affected} row(s) affected"));
    Ok(())
}

/// Prompts the remaining card fields and performs the replace-style write.
fn write_card_fields(library: &Library, console: &mut dyn Console, cno: &str) -> Result<()> {
    console.print("Please input the\n1. owner name 2. department 3. kind (S or T)\nof the card (separate by comma):");

    let (name, department, kind) = loop {
        let Some(line) = console.prompt("")? else {
            return Ok(());
        };
        if is_quit(&line) {
            return Ok(());
        }
        match parse_card_fields(&line) {
            Ok(fields) => break fields,
            Err(e) => {
                warn!(input = %line.trim(), error = %e, "cannot read card record");
                console.print(&format!("Unable to interpret the input ({e}), try again"));
            }
        }
    };

    let card = Card {
        cno: cno.to_string(),
        name,
        department,
        kind,
    };
    let affected = library.replace_card(&card)?;
    console.print(&format!("OK, {affected} row(s) affected"));
    display_query(library, console, "SELECT * FROM card WHERE cno = ?1", params![cno])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circulation::console::script::ScriptedConsole;
    use crate::domain::CardKind;

    const BOOK_LINE: &str = "0000000013, English, English Total, Ali, 1995, Bab, 100.2, 10, 10";

    fn empty_library() -> Library {
        Library::open_in_memory().unwrap()
    }

    #[test]
    fn add_book_inserts_when_absent() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&[BOOK_LINE]);

        add_book(&lib, &mut console).unwrap();

        assert!(console.saw("OK, 1 row(s) affected"));
        let book = lib.find_book("0000000013").unwrap().unwrap();
        assert_eq!(book.title, "English Total");
    }

    #[test]
    fn add_book_retries_after_parse_failure() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&["not, enough, fields", BOOK_LINE]);

        add_book(&lib, &mut console).unwrap();

        assert!(console.saw("try again"));
        assert!(lib.find_book("0000000013").unwrap().is_some());
    }

    #[test]
    fn add_book_rejects_inconsistent_stock_and_retries() {
        let lib = empty_library();
        // More copies on the shelf than the library owns.
        let bad = "0000000013, English, English Total, Ali, 1995, Bab, 100.2, 10, 12";
        let mut console = ScriptedConsole::new(&[bad, BOOK_LINE]);

        add_book(&lib, &mut console).unwrap();

        assert!(console.saw("try again"));
        assert_eq!(lib.find_book("0000000013").unwrap().unwrap().stock, 10);
    }

    #[test]
    fn add_book_asks_before_overwriting() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&[BOOK_LINE]);
        add_book(&lib, &mut console).unwrap();

        // Same key, new press, confirmed.
        let updated = "0000000013, English, English Total, NewPress, 1995, Bab, 100.2, 10, 10";
        let mut console = ScriptedConsole::new(&[updated, "y"]);
        add_book(&lib, &mut console).unwrap();

        assert!(console.saw("Duplication found"));
        assert_eq!(lib.find_book("0000000013").unwrap().unwrap().press, "NewPress");
    }

    #[test]
    fn add_book_declined_overwrite_leaves_row_alone() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&[BOOK_LINE]);
        add_book(&lib, &mut console).unwrap();

        let updated = "0000000013, English, English Total, NewPress, 1995, Bab, 100.2, 10, 10";
        let mut console = ScriptedConsole::new(&[updated, "n"]);
        add_book(&lib, &mut console).unwrap();

        assert_eq!(lib.find_book("0000000013").unwrap().unwrap().press, "Ali");
    }

    #[test]
    fn add_book_quit_writes_nothing() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&["q"]);

        add_book(&lib, &mut console).unwrap();

        assert!(lib.find_book("0000000013").unwrap().is_none());
    }

    #[test]
    fn batch_inserts_and_reports_aggregate_count() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&[
            BOOK_LINE,
            "B2, Math, Algebra, Springer, 2001, Lang, 55.0, 3, 3",
            "b",
        ]);

        add_books(&lib, &mut console, ConfirmPolicy::OncePerBatch).unwrap();

        assert!(console.saw("We've received 2 record(s)"));
        assert!(console.saw("OK, 2 row(s) affected."));
        assert!(lib.find_book("B2").unwrap().is_some());
    }

    #[test]
    fn batch_with_duplicates_confirms_once_for_all() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&[BOOK_LINE, "b"]);
        add_books(&lib, &mut console, ConfirmPolicy::OncePerBatch).unwrap();

        let mut console = ScriptedConsole::new(&[
            "0000000013, English, English Total, Ali, 1995, Bab, 100.2, 10, 7",
            "B2, Math, Algebra, Springer, 2001, Lang, 55.0, 3, 3",
            "b",
            "y",
        ]);
        add_books(&lib, &mut console, ConfirmPolicy::OncePerBatch).unwrap();

        assert!(console.saw("Duplication found"));
        assert!(console.saw("OK, 2 row(s) affected."));
        assert_eq!(lib.find_book("0000000013").unwrap().unwrap().stock, 7);
    }

    #[test]
    fn batch_declined_confirmation_writes_nothing() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&[BOOK_LINE, "b"]);
        add_books(&lib, &mut console, ConfirmPolicy::OncePerBatch).unwrap();

        let mut console = ScriptedConsole::new(&[
            "0000000013, English, English Total, Ali, 1995, Bab, 100.2, 10, 7",
            "b",
            "n",
        ]);
        add_books(&lib, &mut console, ConfirmPolicy::OncePerBatch).unwrap();

        assert_eq!(lib.find_book("0000000013").unwrap().unwrap().stock, 10);
    }

    #[test]
    fn batch_per_record_policy_drops_declined_rows() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&[
            BOOK_LINE,
            "B2, Math, Algebra, Springer, 2001, Lang, 55.0, 3, 3",
            "b",
        ]);
        add_books(&lib, &mut console, ConfirmPolicy::OncePerBatch).unwrap();

        // Overwrite both; decline 0000000013, accept B2. A brand-new B3
        // rides along without any question.
        let mut console = ScriptedConsole::new(&[
            "0000000013, English, English Total, Ali, 1995, Bab, 100.2, 10, 1",
            "B2, Math, Algebra, Springer, 2001, Lang, 55.0, 3, 1",
            "B3, CS, SICP, MIT, 1985, Abelson, 60.0, 2, 2",
            "b",
            "n",
            "y",
        ]);
        add_books(&lib, &mut console, ConfirmPolicy::PerRecord).unwrap();

        assert_eq!(lib.find_book("0000000013").unwrap().unwrap().stock, 10);
        assert_eq!(lib.find_book("B2").unwrap().unwrap().stock, 1);
        assert!(lib.find_book("B3").unwrap().is_some());
        assert!(console.saw("OK, 2 row(s) affected."));
    }

    #[test]
    fn batch_skips_unparsable_lines() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&["garbage line", BOOK_LINE, "b"]);

        add_books(&lib, &mut console, ConfirmPolicy::OncePerBatch).unwrap();

        assert!(console.saw("Skipping unreadable record"));
        assert!(console.saw("OK, 1 row(s) affected."));
    }

    #[test]
    fn batch_skips_inconsistent_stock_records() {
        let lib = empty_library();
        let bad = "B2, Math, Algebra, Springer, 2001, Lang, 55.0, 3, -1";
        let mut console = ScriptedConsole::new(&[bad, BOOK_LINE, "b"]);

        add_books(&lib, &mut console, ConfirmPolicy::OncePerBatch).unwrap();

        assert!(console.saw("Skipping unreadable record"));
        assert!(lib.find_book("B2").unwrap().is_none());
        assert!(lib.find_book("0000000013").unwrap().is_some());
    }

    #[test]
    fn batch_quit_discards_everything() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&[BOOK_LINE, "q"]);

        add_books(&lib, &mut console, ConfirmPolicy::OncePerBatch).unwrap();

        assert!(lib.find_book("0000000013").unwrap().is_none());
    }

    #[test]
    fn batch_break_with_nothing_collected_is_a_no_op() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&["b"]);

        add_books(&lib, &mut console, ConfirmPolicy::OncePerBatch).unwrap();

        assert!(!console.saw("row(s) affected"));
    }

    #[test]
    fn batch_end_of_input_behaves_like_break() {
        let lib = empty_library();
        // No break sentinel: the script simply runs out, as a file would.
        let mut console = ScriptedConsole::new(&[BOOK_LINE]);

        add_books(&lib, &mut console, ConfirmPolicy::OncePerBatch).unwrap();

        assert!(console.saw("OK, 1 row(s) affected."));
    }

    #[test]
    fn card_add_modify_delete_cycle() {
        let lib = empty_library();

        let mut console = ScriptedConsole::new(&["C1", "Rui, CS, T"]);
        add_card(&lib, &mut console).unwrap();
        let card = lib.find_card("C1").unwrap().unwrap();
        assert_eq!(card.kind, CardKind::Teacher);

        let mut console = ScriptedConsole::new(&["C1", "y", "Rui, EE, S"]);
        modify_card(&lib, &mut console).unwrap();
        let card = lib.find_card("C1").unwrap().unwrap();
        assert_eq!(card.department, "EE");
        assert_eq!(card.kind, CardKind::Student);

        let mut console = ScriptedConsole::new(&["C1", "y"]);
        delete_card(&lib, &mut console).unwrap();
        assert!(lib.find_card("C1").unwrap().is_none());
    }

    #[test]
    fn card_add_over_existing_asks_first() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&["C1", "Rui, CS, T"]);
        add_card(&lib, &mut console).unwrap();

        let mut console = ScriptedConsole::new(&["C1", "n"]);
        add_card(&lib, &mut console).unwrap();
        assert_eq!(lib.find_card("C1").unwrap().unwrap().name, "Rui");
    }

    #[test]
    fn card_fields_retry_on_bad_kind() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&["C1", "Rui, CS, Q", "Rui, CS, S"]);

        add_card(&lib, &mut console).unwrap();

        assert!(console.saw("try again"));
        assert_eq!(lib.find_card("C1").unwrap().unwrap().kind, CardKind::Student);
    }

    #[test]
    fn modify_missing_card_aborts() {
        let lib = empty_library();
        let mut console = ScriptedConsole::new(&["C9"]);

        modify_card(&lib, &mut console).unwrap();

        assert!(console.saw("Unable to find the card"));
    }
}
