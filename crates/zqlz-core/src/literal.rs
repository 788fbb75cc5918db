//! Literal formatting
//!
//! Turns typed values into SQL literal text so that a statement can be
//! exported as a copy-pasteable script instead of being executed with
//! bound parameters.

use crate::{Dialect, Value};

/// Produces the SQL literal text for a value.
///
/// Implementations are passed explicitly to whatever renders SQL; there is
/// no process-wide formatter.
pub trait LiteralFormatter {
    fn format_literal(&self, value: &Value) -> String;
}

/// Literal rules for the dialects ZQLZ generates scripts for
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardLiteralFormatter {
    dialect: Dialect,
}

impl StandardLiteralFormatter {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn quote_string(&self, s: &str) -> String {
        let mut escaped = s.replace('\'', "''");
        if self.dialect.escapes_backslash() {
            escaped = escaped.replace('\\', "\\\\");
        }
        format!("'{}'", escaped)
    }

    fn format_bytes(&self, bytes: &[u8]) -> String {
        let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        match self.dialect {
            Dialect::PostgreSQL => format!("'\\x{}'", hex),
            Dialect::MsSql => format!("0x{}", hex),
            _ => format!("X'{}'", hex),
        }
    }
}

impl LiteralFormatter for StandardLiteralFormatter {
    fn format_literal(&self, value: &Value) -> String {
        match value {
            Value::Null(_) => "NULL".to_string(),
            Value::Bool(v) => {
                let literal = match (self.dialect.has_boolean_literals(), *v) {
                    (true, true) => "TRUE",
                    (true, false) => "FALSE",
                    (false, true) => "1",
                    (false, false) => "0",
                };
                literal.to_string()
            }
            Value::Int16(v) => v.to_string(),
            Value::Int32(v) => v.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::Float32(v) => v.to_string(),
            Value::Float64(v) => v.to_string(),
            Value::Decimal(v) => v.to_string(),
            Value::String(v) => self.quote_string(v),
            Value::Bytes(v) => self.format_bytes(v),
            Value::Uuid(v) => format!("'{}'", v),
            Value::Json(v) => self.quote_string(&v.to_string()),
            Value::Date(v) => format!("DATE '{}'", v.format("%Y-%m-%d")),
            Value::Time(v) => format!("TIME '{}'", v.format("%H:%M:%S")),
            Value::DateTime(v) => format!("TIMESTAMP '{}'", v.format("%Y-%m-%d %H:%M:%S")),
            Value::DateTimeUtc(v) => match self.dialect {
                Dialect::PostgreSQL => format!("'{}'", v.to_rfc3339()),
                _ => format!("TIMESTAMP '{}'", v.format("%Y-%m-%d %H:%M:%S")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_string_literal_escapes_quotes() {
        let formatter = StandardLiteralFormatter::default();
        assert_eq!(
            formatter.format_literal(&Value::from("O'Brien")),
            "'O''Brien'"
        );
    }

    #[test]
    fn test_mysql_escapes_backslash() {
        let formatter = StandardLiteralFormatter::new(Dialect::MySQL);
        assert_eq!(formatter.format_literal(&Value::from("a\\b")), "'a\\\\b'");
    }

    #[test]
    fn test_numbers_are_not_quoted() {
        let formatter = StandardLiteralFormatter::default();
        assert_eq!(formatter.format_literal(&Value::Int32(42)), "42");
        assert_eq!(
            formatter.format_literal(&Value::Decimal("10.50".to_string())),
            "10.50"
        );
    }

    #[test]
    fn test_boolean_literal_per_dialect() {
        let pg = StandardLiteralFormatter::new(Dialect::PostgreSQL);
        let mssql = StandardLiteralFormatter::new(Dialect::MsSql);
        assert_eq!(pg.format_literal(&Value::Bool(true)), "TRUE");
        assert_eq!(mssql.format_literal(&Value::Bool(true)), "1");
    }

    #[test]
    fn test_typed_null_and_date() {
        let formatter = StandardLiteralFormatter::default();
        assert_eq!(
            formatter.format_literal(&Value::Null(crate::SqlType::Integer)),
            "NULL"
        );
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            formatter.format_literal(&Value::Date(date)),
            "DATE '2024-02-29'"
        );
    }
}
