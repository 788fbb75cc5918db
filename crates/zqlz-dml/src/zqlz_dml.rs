//! ZQLZ DML - Change tracking and foreign key aware statement generation
//!
//! This crate provides:
//! - Change-tracked rows and row collections of an editable result
//! - INSERT/UPDATE/DELETE generation with literal rendering and binding
//! - Dependency trees over foreign keys, with cycle and depth guards
//! - Insert/delete ordering for sets of tables
//! - Delete scripts that also remove transitively dependent rows

mod config;
pub mod delete_script;
pub mod dependencies;
mod error;
pub mod row;
pub mod statement;

pub use config::{DEFAULT_MAX_DEPTH, DmlConfig};
pub use error::{DmlError, DmlResult};

pub use delete_script::{DeleteScript, DeleteScriptGenerator};

pub use dependencies::{
    ColumnMapping, DependencyNode, DependencyResolver, DependencySorter, DependencyTree, NodeId,
};

pub use row::{ColumnDefinition, ResultInfo, RowState, RowStatus, RowStore};

pub use statement::{
    BoundValue, DmlStatement, PLACEHOLDER, StatementBinder, StatementFactory, StatementKind,
    count_placeholders,
};

#[cfg(test)]
mod test_fixtures;
