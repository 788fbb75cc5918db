use serde::{Deserialize, Serialize};
use zqlz_core::{SchemaMetadata, SqlType, TableIdentity};

use crate::{DmlError, DmlResult};

/// Column of an editable result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub sql_type: SqlType,
    /// Part of the column set that identifies a row
    pub is_key: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            is_key: false,
        }
    }

    pub fn key(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            is_key: true,
        }
    }

    /// Column described by the type name a driver reported
    pub fn from_type_name(name: impl Into<String>, type_name: &str) -> Self {
        Self::new(name, SqlType::from_type_name(type_name))
    }
}

/// The table an editable result belongs to and its columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultInfo {
    table: TableIdentity,
    columns: Vec<ColumnDefinition>,
}

impl ResultInfo {
    pub fn new(table: TableIdentity, columns: Vec<ColumnDefinition>) -> Self {
        Self { table, columns }
    }

    pub fn table(&self) -> &TableIdentity {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> DmlResult<&ColumnDefinition> {
        self.columns
            .get(index)
            .ok_or(DmlError::ColumnIndexOutOfRange {
                index,
                column_count: self.columns.len(),
            })
    }

    /// Index of a column, matched case-insensitively
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Indices of the identifying columns, in column order
    pub fn key_columns(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_key)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn has_key_columns(&self) -> bool {
        self.columns.iter().any(|c| c.is_key)
    }

    /// Mark exactly the named columns as identifying
    pub fn with_key_columns(mut self, names: &[&str]) -> DmlResult<Self> {
        self.mark_key_columns(names.iter().copied())?;
        Ok(self)
    }

    /// Mark the table's primary key columns as identifying.
    ///
    /// Returns whether a key was found; a table without a primary key leaves
    /// the result without identifying columns.
    pub fn resolve_key_columns(&mut self, metadata: &dyn SchemaMetadata) -> DmlResult<bool> {
        let primary_key = metadata.primary_key_columns(&self.table)?;
        if primary_key.is_empty() {
            tracing::debug!(table = %self.table, "table has no primary key");
            return Ok(false);
        }
        self.mark_key_columns(primary_key.iter().map(String::as_str))?;
        Ok(true)
    }

    fn mark_key_columns<'a>(&mut self, names: impl Iterator<Item = &'a str>) -> DmlResult<()> {
        let mut indices = Vec::new();
        for name in names {
            let index = self
                .column_index(name)
                .ok_or_else(|| DmlError::UnknownColumn {
                    table: self.table.to_string(),
                    column: name.to_string(),
                })?;
            indices.push(index);
        }

        for (i, column) in self.columns.iter_mut().enumerate() {
            column.is_key = indices.contains(&i);
        }
        Ok(())
    }
}
