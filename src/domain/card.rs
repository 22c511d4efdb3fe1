//! Reader's card record

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::parse::ParseError;

/// Who the card was issued to. The set is closed; anything outside it is
/// rejected at parse time rather than stored as free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    /// "S" in the stored schema.
    Student,
    /// "T" in the stored schema.
    Teacher,
}

impl CardKind {
    /// Single-letter code stored in the `type` column.
    pub fn code(&self) -> &'static str {
        match self {
            CardKind::Student => "S",
            CardKind::Teacher => "T",
        }
    }
}

impl FromStr for CardKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "S" | "s" => Ok(CardKind::Student),
            "T" | "t" => Ok(CardKind::Teacher),
            other => Err(ParseError::BadCardKind(other.to_string())),
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A reader's proof of membership. Referenced read-only by the lending
/// workflow; created and replaced by the upsert pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Card number, the primary key.
    pub cno: String,
    /// Owner name.
    pub name: String,
    /// Owning department.
    pub department: String,
    /// Staff or student.
    pub kind: CardKind,
}
