//! Schema metadata traits and types

use crate::{Result, TableIdentity, ZqlzError};
use serde::{Deserialize, Serialize};

/// Schema metadata needed to reason about foreign keys.
///
/// This is a synchronous, read-only view of what a driver's introspection
/// queries return. Callers that need to keep a UI responsive run the whole
/// pipeline on a worker; implementations only have to tolerate sequential
/// calls from one operation.
pub trait SchemaMetadata {
    /// Canonical form of a loosely typed table identity. The default keeps
    /// the identity as given.
    fn normalize_table(&self, table: &TableIdentity) -> Result<TableIdentity> {
        Ok(table.clone())
    }

    /// Foreign keys touching `table`.
    ///
    /// With [`FkDirection::Referencing`] this returns the tables that hold a
    /// foreign key to `table` (exported keys); with
    /// [`FkDirection::Referenced`] the tables `table` itself references
    /// (imported keys).
    fn foreign_keys(
        &self,
        table: &TableIdentity,
        direction: FkDirection,
    ) -> Result<Vec<FkRelation>>;

    /// Ordered columns that uniquely identify a row of `table`. Empty when
    /// the table has no primary key.
    fn primary_key_columns(&self, table: &TableIdentity) -> Result<Vec<String>>;
}

/// Which side of a foreign key to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FkDirection {
    /// Tables that reference the given table (towards children)
    Referencing,
    /// Tables the given table references (towards parents)
    Referenced,
}

/// Foreign key action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForeignKeyAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ForeignKeyAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyAction::NoAction => "NO ACTION",
            ForeignKeyAction::Restrict => "RESTRICT",
            ForeignKeyAction::Cascade => "CASCADE",
            ForeignKeyAction::SetNull => "SET NULL",
            ForeignKeyAction::SetDefault => "SET DEFAULT",
        }
    }

    /// Parse the textual rule reported by information_schema
    pub fn from_rule(rule: &str) -> Self {
        match rule.trim().to_uppercase().as_str() {
            "RESTRICT" => ForeignKeyAction::Restrict,
            "CASCADE" => ForeignKeyAction::Cascade,
            "SET NULL" => ForeignKeyAction::SetNull,
            "SET DEFAULT" => ForeignKeyAction::SetDefault,
            _ => ForeignKeyAction::NoAction,
        }
    }
}

/// One foreign key seen from the table it was queried for.
///
/// `columns` pairs a column of the queried table with the matching column
/// of `related_table`; a composite key has one pair per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FkRelation {
    pub related_table: TableIdentity,
    pub fk_name: String,
    pub columns: Vec<(String, String)>,
    pub on_update: ForeignKeyAction,
    pub on_delete: ForeignKeyAction,
}

/// Foreign key declared on a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_table: TableIdentity,
    pub referenced_columns: Vec<String>,
    pub on_update: ForeignKeyAction,
    pub on_delete: ForeignKeyAction,
}

impl ForeignKeyInfo {
    pub fn new(
        name: impl Into<String>,
        columns: &[&str],
        referenced_table: TableIdentity,
        referenced_columns: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            referenced_table,
            referenced_columns: referenced_columns.iter().map(|c| c.to_string()).collect(),
            on_update: ForeignKeyAction::NoAction,
            on_delete: ForeignKeyAction::NoAction,
        }
    }

    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = action;
        self
    }

    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = action;
        self
    }
}

/// Table entry of a [`MaterializedSchema`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializedTable {
    pub table: TableIdentity,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyInfo>,
}

/// Schema metadata that was already fetched from the database.
///
/// Drivers run their catalog queries once and hand the listings over; the
/// dependency machinery then works purely in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializedSchema {
    tables: Vec<MaterializedTable>,
}

impl MaterializedSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table with its primary key columns
    pub fn add_table(&mut self, table: TableIdentity, primary_key: &[&str]) -> &mut Self {
        if let Some(existing) = self.find_mut(&table) {
            existing.primary_key = primary_key.iter().map(|c| c.to_string()).collect();
        } else {
            self.tables.push(MaterializedTable {
                table,
                primary_key: primary_key.iter().map(|c| c.to_string()).collect(),
                foreign_keys: Vec::new(),
            });
        }
        self
    }

    /// Register a foreign key declared on `table`. Unknown tables are added
    /// without a primary key.
    pub fn add_foreign_key(&mut self, table: TableIdentity, fk: ForeignKeyInfo) -> &mut Self {
        if self.find(&table).is_none() {
            self.add_table(table.clone(), &[]);
        }
        if let Some(entry) = self.find_mut(&table) {
            entry.foreign_keys.push(fk);
        }
        self
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableIdentity> {
        self.tables.iter().map(|t| &t.table)
    }

    fn find(&self, table: &TableIdentity) -> Option<&MaterializedTable> {
        self.tables.iter().find(|t| t.table.is_same_table(table))
    }

    fn find_mut(&mut self, table: &TableIdentity) -> Option<&mut MaterializedTable> {
        self.tables.iter_mut().find(|t| t.table.is_same_table(table))
    }

    fn require(&self, table: &TableIdentity) -> Result<&MaterializedTable> {
        self.find(table)
            .ok_or_else(|| ZqlzError::NotFound(format!("table {}", table)))
    }
}

impl SchemaMetadata for MaterializedSchema {
    fn normalize_table(&self, table: &TableIdentity) -> Result<TableIdentity> {
        Ok(self.require(table)?.table.clone())
    }

    fn foreign_keys(
        &self,
        table: &TableIdentity,
        direction: FkDirection,
    ) -> Result<Vec<FkRelation>> {
        let entry = self.require(table)?;

        let relations = match direction {
            FkDirection::Referenced => entry
                .foreign_keys
                .iter()
                .map(|fk| FkRelation {
                    related_table: fk.referenced_table.clone(),
                    fk_name: fk.name.clone(),
                    columns: fk
                        .columns
                        .iter()
                        .cloned()
                        .zip(fk.referenced_columns.iter().cloned())
                        .collect(),
                    on_update: fk.on_update,
                    on_delete: fk.on_delete,
                })
                .collect(),
            FkDirection::Referencing => self
                .tables
                .iter()
                .flat_map(|other| {
                    other
                        .foreign_keys
                        .iter()
                        .filter(|fk| fk.referenced_table.is_same_table(&entry.table))
                        .map(move |fk| FkRelation {
                            related_table: other.table.clone(),
                            fk_name: fk.name.clone(),
                            columns: fk
                                .referenced_columns
                                .iter()
                                .cloned()
                                .zip(fk.columns.iter().cloned())
                                .collect(),
                            on_update: fk.on_update,
                            on_delete: fk.on_delete,
                        })
                })
                .collect(),
        };

        Ok(relations)
    }

    fn primary_key_columns(&self, table: &TableIdentity) -> Result<Vec<String>> {
        Ok(self.require(table)?.primary_key.clone())
    }
}

#[cfg(test)]
mod tests;
