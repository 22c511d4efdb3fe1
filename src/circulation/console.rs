//! Line-oriented console boundary
//!
//! The workflows never touch stdin, argv, or files directly; everything
//! goes through [`Console`]. Bulk import is nothing more than substituting
//! the input source behind this same boundary.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Prompt/response boundary. `prompt` returns `None` once the input source
/// is exhausted.
pub trait Console {
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>>;
    fn print(&mut self, text: &str);
}

/// Interactive console over stdin/stdout.
#[derive(Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        print!("{text}");
        io::stdout().flush()?;
        read_stdin_line()
    }

    fn print(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Console that answers prompts from a file, used for bulk import. Once the
/// file runs dry it falls back to stdin so a duplicate confirmation can
/// still be answered interactively.
pub struct FileConsole {
    reader: BufReader<File>,
    exhausted: bool,
}

impl FileConsole {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("cannot open input file: {}", path.display()))?;
        Ok(Self {
            reader: BufReader::new(file),
            exhausted: false,
        })
    }
}

impl Console for FileConsole {
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        print!("{text}");
        io::stdout().flush()?;

        if !self.exhausted {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? > 0 {
                return Ok(Some(strip_newline(line)));
            }
            self.exhausted = true;
        }
        read_stdin_line()
    }

    fn print(&mut self, text: &str) {
        println!("{text}");
    }
}

fn read_stdin_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        Ok(None)
    } else {
        Ok(Some(strip_newline(line)))
    }
}

fn strip_newline(mut line: String) -> String {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}

/// Did the user type the abort sentinel?
pub fn is_quit(line: &str) -> bool {
    matches!(line.trim(), "q" | "quit")
}

/// Did the user end batch accumulation?
pub fn is_break(line: &str) -> bool {
    matches!(line.trim(), "b" | "break")
}

/// Prompts and trims the answer. `None` on end of input.
pub fn prompt_trimmed(console: &mut dyn Console, text: &str) -> io::Result<Option<String>> {
    Ok(console.prompt(text)?.map(|line| line.trim().to_string()))
}

/// Asks a yes/no question until the answer starts with y/Y/n/N. End of
/// input counts as "no" so an exhausted script can never force a write.
pub fn confirm(console: &mut dyn Console, text: &str) -> io::Result<bool> {
    loop {
        let Some(answer) = console.prompt(text)? else {
            return Ok(false);
        };
        match answer.trim().chars().next() {
            Some('y') | Some('Y') => return Ok(true),
            Some('n') | Some('N') => return Ok(false),
            _ => continue,
        }
    }
}
