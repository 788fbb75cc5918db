use serde::{Deserialize, Serialize};
use zqlz_core::{LiteralFormatter, SqlType, TableIdentity, Value};

use crate::{DmlError, DmlResult};

/// Placeholder used in statement templates
pub const PLACEHOLDER: char = '?';

/// Kind of a generated statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        }
    }
}

/// Value bound to one placeholder, with the column it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundValue {
    pub column: String,
    pub value: Value,
}

impl BoundValue {
    pub fn new(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// Receives the values of a statement when it is executed with parameters.
///
/// Indices are 1-based, as in every driver API ZQLZ talks to.
pub trait StatementBinder {
    fn bind_null(&mut self, index: usize, sql_type: SqlType) -> zqlz_core::Result<()>;
    fn bind_value(&mut self, index: usize, value: &Value) -> zqlz_core::Result<()>;
}

/// A statement template with positional placeholders and its bound values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmlStatement {
    kind: StatementKind,
    table: TableIdentity,
    sql: String,
    values: Vec<BoundValue>,
}

impl DmlStatement {
    /// Build a statement, checking that every placeholder has a value
    pub fn new(
        kind: StatementKind,
        table: TableIdentity,
        sql: impl Into<String>,
        values: Vec<BoundValue>,
    ) -> DmlResult<Self> {
        let sql = sql.into();
        let placeholders = count_placeholders(&sql);
        if placeholders != values.len() {
            return Err(DmlError::PlaceholderMismatch {
                placeholders,
                values: values.len(),
            });
        }
        Ok(Self {
            kind,
            table,
            sql,
            values,
        })
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn table(&self) -> &TableIdentity {
        &self.table
    }

    /// The template, with placeholders
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[BoundValue] {
        &self.values
    }

    pub fn placeholder_count(&self) -> usize {
        self.values.len()
    }

    /// Render as literal SQL by substituting every placeholder outside of
    /// quotes with the formatted value
    pub fn render(&self, formatter: &dyn LiteralFormatter) -> String {
        let mut result = String::with_capacity(self.sql.len() + self.values.len() * 8);
        let mut values = self.values.iter();
        let mut quote: Option<char> = None;

        for c in self.sql.chars() {
            match quote {
                Some(q) => {
                    if c == q {
                        quote = None;
                    }
                    result.push(c);
                }
                None if closing_quote(c).is_some() => {
                    quote = closing_quote(c);
                    result.push(c);
                }
                None if c == PLACEHOLDER => match values.next() {
                    Some(bound) => result.push_str(&formatter.format_literal(&bound.value)),
                    None => result.push(c),
                },
                None => result.push(c),
            }
        }

        result
    }

    /// Render as literal SQL followed by a statement terminator
    pub fn render_with_terminator(
        &self,
        formatter: &dyn LiteralFormatter,
        terminator: &str,
    ) -> String {
        format!("{}{}", self.render(formatter), terminator)
    }

    /// Hand every value to a binder: typed NULL for the NULL sentinel, the
    /// value itself otherwise
    pub fn bind(&self, binder: &mut dyn StatementBinder) -> DmlResult<()> {
        for (i, bound) in self.values.iter().enumerate() {
            let index = i + 1;
            match &bound.value {
                Value::Null(sql_type) => binder.bind_null(index, *sql_type)?,
                value => binder.bind_value(index, value)?,
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for DmlStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql)
    }
}

/// Closing character for a quote that starts with `c`
fn closing_quote(c: char) -> Option<char> {
    match c {
        '\'' | '"' | '`' => Some(c),
        '[' => Some(']'),
        _ => None,
    }
}

/// Number of placeholders outside of quoted literals and identifiers
pub fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut quote: Option<char> = None;

    for c in sql.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if closing_quote(c).is_some() => quote = closing_quote(c),
            None if c == PLACEHOLDER => count += 1,
            None => {}
        }
    }

    count
}
