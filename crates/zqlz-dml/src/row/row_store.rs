use zqlz_core::Value;

use crate::{DmlError, DmlResult, DmlStatement, ResultInfo, RowState, StatementFactory};

/// Rows of one editable result, plus the rows deleted since the last save
#[derive(Debug, Clone)]
pub struct RowStore {
    info: ResultInfo,
    rows: Vec<RowState>,
    deleted: Vec<RowState>,
}

impl RowStore {
    pub fn new(info: ResultInfo) -> Self {
        Self {
            info,
            rows: Vec::new(),
            deleted: Vec::new(),
        }
    }

    pub fn info(&self) -> &ResultInfo {
        &self.info
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    /// Append a row read from the database
    pub fn load_row(&mut self, values: Vec<Value>) -> DmlResult<usize> {
        if values.len() != self.info.column_count() {
            return Err(DmlError::RowWidthMismatch {
                expected: self.info.column_count(),
                actual: values.len(),
            });
        }
        self.rows.push(RowState::from_values(values));
        Ok(self.rows.len() - 1)
    }

    /// Append an empty row that will be inserted on save
    pub fn add_row(&mut self) -> usize {
        self.rows.push(RowState::new_row(self.info.column_count()));
        self.rows.len() - 1
    }

    pub fn row(&self, index: usize) -> DmlResult<&RowState> {
        let row_count = self.rows.len();
        self.rows
            .get(index)
            .ok_or(DmlError::RowIndexOutOfRange { index, row_count })
    }

    pub fn row_mut(&mut self, index: usize) -> DmlResult<&mut RowState> {
        let row_count = self.rows.len();
        self.rows
            .get_mut(index)
            .ok_or(DmlError::RowIndexOutOfRange { index, row_count })
    }

    /// Remove a row. Rows that exist in the database are kept aside so a
    /// DELETE can be generated for them.
    pub fn delete_row(&mut self, index: usize) -> DmlResult<()> {
        let row_count = self.rows.len();
        if index >= row_count {
            return Err(DmlError::RowIndexOutOfRange { index, row_count });
        }
        let row = self.rows.remove(index);
        if !row.is_new() {
            self.deleted.push(row);
        }
        Ok(())
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.deleted.is_empty() || self.rows.iter().any(|r| !r.is_unmodified())
    }

    /// Undo all edits: restore changed values, drop added rows and bring
    /// deleted rows back
    pub fn discard_changes(&mut self) {
        self.rows.retain(|r| !r.is_new());
        for row in &mut self.rows {
            row.restore_original();
        }
        for mut row in self.deleted.drain(..) {
            row.restore_original();
            self.rows.push(row);
        }
        tracing::info!(table = %self.info.table(), "discarded all pending changes");
    }

    /// Accept the current state as persisted
    pub fn reset_status(&mut self) {
        self.deleted.clear();
        for row in &mut self.rows {
            row.reset();
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.deleted.clear();
    }

    /// Statements that persist all pending changes, in execution order:
    /// deletes, then updates, then inserts
    pub fn generate_dml(&self, factory: &StatementFactory) -> DmlResult<Vec<DmlStatement>> {
        let mut statements = Vec::new();

        for row in &self.deleted {
            statements.push(factory.create_delete(row, &self.info)?);
        }

        for row in self.rows.iter().filter(|r| r.is_modified() && !r.is_new()) {
            match factory.create_update(row, &self.info) {
                Ok(statement) => statements.push(statement),
                Err(DmlError::NoModifiedColumns { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        for row in self.rows.iter().filter(|r| r.is_new()) {
            statements.push(factory.create_insert(row, &self.info)?);
        }

        tracing::debug!(
            table = %self.info.table(),
            statements = statements.len(),
            "generated DML for pending changes"
        );
        Ok(statements)
    }
}
