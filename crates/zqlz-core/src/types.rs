//! Core types for ZQLZ

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Dialect;

/// Declared type family of a column.
///
/// Drivers report database specific type names; [`SqlType::from_type_name`]
/// folds them into the handful of families that matter for literal rendering
/// and typed NULL binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal,
    Char,
    Varchar,
    Clob,
    Binary,
    Blob,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
    #[default]
    Other,
}

impl SqlType {
    /// Map a database type name (e.g. `varchar(20)`, `int4`, `timestamptz`)
    /// to its type family.
    pub fn from_type_name(type_name: &str) -> Self {
        let lower = type_name.trim().to_lowercase();
        let base = lower
            .split(|c| c == '(' || c == '[')
            .next()
            .unwrap_or("")
            .trim();

        match base {
            "bool" | "boolean" | "bit" => SqlType::Boolean,
            "int2" | "smallint" | "tinyint" | "smallserial" => SqlType::SmallInt,
            "int" | "int4" | "integer" | "mediumint" | "serial" => SqlType::Integer,
            "int8" | "bigint" | "bigserial" => SqlType::BigInt,
            "float4" | "real" => SqlType::Real,
            "float8" | "float" | "double" | "double precision" => SqlType::Double,
            "numeric" | "decimal" | "money" | "number" => SqlType::Decimal,
            "char" | "bpchar" | "character" | "nchar" => SqlType::Char,
            "varchar" | "character varying" | "nvarchar" | "varchar2" | "name" | "citext"
            | "enum" | "set" => SqlType::Varchar,
            "text" | "clob" | "longtext" | "mediumtext" | "tinytext" | "ntext" => SqlType::Clob,
            "binary" | "varbinary" | "bytea" => SqlType::Binary,
            "blob" | "longblob" | "mediumblob" | "tinyblob" | "image" => SqlType::Blob,
            "uuid" | "uniqueidentifier" => SqlType::Uuid,
            "date" => SqlType::Date,
            "time" | "timetz" | "time without time zone" => SqlType::Time,
            "timestamp" | "datetime" | "datetime2" | "timestamp without time zone" => {
                SqlType::Timestamp
            }
            "timestamptz" | "timestamp with time zone" | "datetimeoffset" => SqlType::TimestampTz,
            "json" | "jsonb" => SqlType::Json,
            _ => SqlType::Other,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SqlType::SmallInt
                | SqlType::Integer
                | SqlType::BigInt
                | SqlType::Real
                | SqlType::Double
                | SqlType::Decimal
        )
    }

    pub fn is_character(&self) -> bool {
        matches!(self, SqlType::Char | SqlType::Varchar | SqlType::Clob)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            SqlType::Date | SqlType::Time | SqlType::Timestamp | SqlType::TimestampTz
        )
    }
}

/// A database value that can represent any SQL type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL, carrying the declared type of the column it was set on
    Null(SqlType),
    /// Boolean
    Bool(bool),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 32-bit floating point
    Float32(f32),
    /// 64-bit floating point
    Float64(f64),
    /// Decimal/Numeric (stored as string for precision)
    Decimal(String),
    /// UTF-8 string
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// UUID
    Uuid(Uuid),
    /// Date (year, month, day)
    Date(NaiveDate),
    /// Time (hour, minute, second, nanosecond)
    Time(NaiveTime),
    /// DateTime without timezone
    DateTime(NaiveDateTime),
    /// DateTime with timezone (UTC)
    DateTimeUtc(DateTime<Utc>),
    /// JSON value
    Json(serde_json::Value),
}

impl Value {
    /// The NULL sentinel for a column of the given type
    pub fn null(sql_type: SqlType) -> Self {
        Value::Null(sql_type)
    }

    /// Check if the value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Type family of this value. For NULL this is the declared column type.
    pub fn sql_type(&self) -> SqlType {
        match self {
            Value::Null(t) => *t,
            Value::Bool(_) => SqlType::Boolean,
            Value::Int16(_) => SqlType::SmallInt,
            Value::Int32(_) => SqlType::Integer,
            Value::Int64(_) => SqlType::BigInt,
            Value::Float32(_) => SqlType::Real,
            Value::Float64(_) => SqlType::Double,
            Value::Decimal(_) => SqlType::Decimal,
            Value::String(_) => SqlType::Varchar,
            Value::Bytes(_) => SqlType::Blob,
            Value::Uuid(_) => SqlType::Uuid,
            Value::Date(_) => SqlType::Date,
            Value::Time(_) => SqlType::Time,
            Value::DateTime(_) => SqlType::Timestamp,
            Value::DateTimeUtc(_) => SqlType::TimestampTz,
            Value::Json(_) => SqlType::Json,
        }
    }

    /// Try to get as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null(_) => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Uuid(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::Time(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v),
            Value::DateTimeUtc(v) => write!(f, "{}", v),
            Value::Json(v) => write!(f, "{}", v),
        }
    }
}

/// Fully qualified identity of a table.
///
/// Two identities are the same table when catalog, schema and name match
/// case-insensitively; an absent catalog or schema matches any value so
/// that `orders` and `public.orders` resolve to one node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableIdentity {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: String,
}

impl TableIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            name: name.into(),
        }
    }

    pub fn with_schema(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Parse a dotted `catalog.schema.name`, `schema.name` or `name`.
    /// Surrounding identifier quotes are stripped from every part; any parts
    /// before the last three stay in the catalog, joined with `.`.
    pub fn parse(qualified: &str) -> Self {
        let parts: Vec<String> = qualified
            .split('.')
            .map(|p| {
                p.trim()
                    .trim_matches('"')
                    .trim_matches('`')
                    .trim_start_matches('[')
                    .trim_end_matches(']')
                    .to_string()
            })
            .collect();

        match parts.as_slice() {
            [] => Self::new(""),
            [name] => Self::new(name.clone()),
            [schema, name] => Self::with_schema(schema.clone(), name.clone()),
            [catalog @ .., schema, name] => Self {
                catalog: Some(catalog.join(".")),
                schema: Some(schema.clone()),
                name: name.clone(),
            },
        }
    }

    /// Same table, ignoring case and treating missing qualifiers as wildcards
    pub fn is_same_table(&self, other: &TableIdentity) -> bool {
        fn part_matches(a: &Option<String>, b: &Option<String>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                _ => true,
            }
        }

        self.name.eq_ignore_ascii_case(&other.name)
            && part_matches(&self.schema, &other.schema)
            && part_matches(&self.catalog, &other.catalog)
    }

    /// Name for use in generated SQL, schema-qualified when a schema is known
    pub fn qualified_name(&self, dialect: Dialect) -> String {
        match &self.schema {
            Some(schema) => format!(
                "{}.{}",
                dialect.quote_identifier_if_needed(schema),
                dialect.quote_identifier_if_needed(&self.name)
            ),
            None => dialect.quote_identifier_if_needed(&self.name),
        }
    }

    /// Name for use in generated SQL, without any qualifier
    pub fn table_name(&self, dialect: Dialect) -> String {
        dialect.quote_identifier_if_needed(&self.name)
    }
}

impl PartialEq for TableIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_table(other)
    }
}

impl std::fmt::Display for TableIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(catalog) = &self.catalog {
            write!(f, "{}.", catalog)?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{}.", schema)?;
        }
        write!(f, "{}", self.name)
    }
}
