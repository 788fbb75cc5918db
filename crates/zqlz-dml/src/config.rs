//! Settings for statement generation and dependency resolution

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use zqlz_core::Dialect;

use crate::{DmlError, DmlResult};

/// Depth at which dependency resolution stops descending
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Configuration for DML generation.
///
/// Every field has a default, so a TOML file only needs the keys it wants
/// to change:
///
/// ```toml
/// dialect = "postgresql"
/// max_depth = 6
/// include_null_in_insert = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmlConfig {
    /// Hard cap on dependency tree depth
    pub max_depth: usize,
    /// Dialect used for identifier quoting and literal rendering
    pub dialect: Dialect,
    /// Appended to every statement of a generated script
    pub statement_terminator: String,
    /// Final statement of a generated delete script
    pub commit_statement: String,
    /// Whether INSERT lists columns whose value is NULL or unset
    pub include_null_in_insert: bool,
    /// Treat empty strings as NULL when building statements
    pub empty_string_is_null: bool,
    /// Emit schema-qualified table names
    pub qualify_table_names: bool,
}

impl Default for DmlConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            dialect: Dialect::Generic,
            statement_terminator: ";".to_string(),
            commit_statement: "COMMIT".to_string(),
            include_null_in_insert: true,
            empty_string_is_null: false,
            qualify_table_names: true,
        }
    }
}

impl DmlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Default::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_include_null_in_insert(mut self, include: bool) -> Self {
        self.include_null_in_insert = include;
        self
    }

    pub fn with_empty_string_is_null(mut self, enabled: bool) -> Self {
        self.empty_string_is_null = enabled;
        self
    }

    pub fn with_qualified_table_names(mut self, qualify: bool) -> Self {
        self.qualify_table_names = qualify;
        self
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> DmlResult<Self> {
        let config: DmlConfig =
            toml::from_str(text).map_err(|e| DmlError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read DML config: {:?}", path))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("Failed to parse DML config: {:?}", path))?;
        Ok(config)
    }

    fn validate(&self) -> DmlResult<()> {
        if self.max_depth == 0 {
            return Err(DmlError::Config("max_depth must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Table name as it should appear in generated SQL
    pub(crate) fn table_name(&self, table: &zqlz_core::TableIdentity) -> String {
        if self.qualify_table_names {
            table.qualified_name(self.dialect)
        } else {
            table.table_name(self.dialect)
        }
    }

    pub(crate) fn column_name(&self, column: &str) -> String {
        self.dialect.quote_identifier_if_needed(column)
    }
}
