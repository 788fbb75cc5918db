//! SQL dialect rules used when generating statement text
//!
//! Only the parts that differ between engines when writing DML are modelled
//! here: identifier quoting and the handful of literal formats that are not
//! ANSI (booleans, binary strings, backslash escaping).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Single-case identifiers; mixed case would be folded by the engine when bare
static PLAIN_IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z_][a-z0-9_$]*|[A-Z_][A-Z0-9_$]*)$").expect("valid regex")
});

/// Target SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Generic,
    PostgreSQL,
    MySQL,
    SQLite,
    MsSql,
}

impl Dialect {
    /// Returns the identifier quote character for this dialect
    pub fn quote_char(&self) -> char {
        match self {
            Dialect::Generic | Dialect::PostgreSQL | Dialect::SQLite => '"',
            Dialect::MySQL => '`',
            Dialect::MsSql => '[',
        }
    }

    /// Returns the closing quote character (differs only for MsSql)
    pub fn close_quote_char(&self) -> char {
        match self {
            Dialect::MsSql => ']',
            _ => self.quote_char(),
        }
    }

    /// Quotes an identifier unconditionally
    pub fn quote_identifier(&self, name: &str) -> String {
        let close = self.close_quote_char();
        let escaped = name.replace(close, &format!("{}{}", close, close));
        format!("{}{}{}", self.quote_char(), escaped, close)
    }

    /// Quotes an identifier only when it could not be written bare. Names
    /// mixing upper and lower case are always quoted.
    pub fn quote_identifier_if_needed(&self, name: &str) -> String {
        if PLAIN_IDENTIFIER_REGEX.is_match(name) {
            name.to_string()
        } else {
            self.quote_identifier(name)
        }
    }

    /// Whether backslashes inside string literals must be escaped
    pub fn escapes_backslash(&self) -> bool {
        matches!(self, Dialect::MySQL)
    }

    /// Whether the engine has TRUE/FALSE literals
    pub fn has_boolean_literals(&self) -> bool {
        !matches!(self, Dialect::MsSql | Dialect::SQLite)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::Generic => "ANSI SQL",
            Dialect::PostgreSQL => "PostgreSQL",
            Dialect::MySQL => "MySQL",
            Dialect::SQLite => "SQLite",
            Dialect::MsSql => "SQL Server",
        }
    }
}
