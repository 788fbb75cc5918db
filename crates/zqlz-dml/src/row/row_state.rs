use bitflags::bitflags;
use zqlz_core::{SqlType, Value};

use crate::{DmlError, DmlResult};

bitflags! {
    /// Persistence status of a row. No flag set means unmodified.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RowStatus: u8 {
        /// Row does not exist in the database yet
        const NEW = 0b01;
        /// At least one column differs from what was read
        const MODIFIED = 0b10;
    }
}

/// Shadow slot for one column
#[derive(Debug, Clone, PartialEq)]
enum Original {
    NotCaptured,
    Captured(Option<Value>),
}

/// Values of a single row plus the bookkeeping needed to know what changed.
///
/// A slot holding `None` has never been given a value; SQL NULL is stored
/// explicitly as [`Value::Null`] so that it keeps the column's type.
#[derive(Debug, Clone, PartialEq)]
pub struct RowState {
    values: Vec<Option<Value>>,
    originals: Option<Vec<Original>>,
    status: RowStatus,
}

impl RowState {
    /// A row added by the user; every column starts without a value
    pub fn new_row(column_count: usize) -> Self {
        Self {
            values: vec![None; column_count],
            originals: None,
            status: RowStatus::NEW,
        }
    }

    /// A row read from the database
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
            originals: None,
            status: RowStatus::empty(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.values.len()
    }

    pub fn status(&self) -> RowStatus {
        self.status
    }

    pub fn is_new(&self) -> bool {
        self.status.contains(RowStatus::NEW)
    }

    pub fn is_modified(&self) -> bool {
        self.status.contains(RowStatus::MODIFIED)
    }

    pub fn is_unmodified(&self) -> bool {
        self.status.is_empty()
    }

    /// Mark the row as not yet persisted. Any captured originals are
    /// dropped since there is nothing in the database to restore to.
    pub fn set_new(&mut self) {
        self.status = RowStatus::NEW;
        self.originals = None;
    }

    fn check_index(&self, index: usize) -> DmlResult<()> {
        if index >= self.values.len() {
            return Err(DmlError::ColumnIndexOutOfRange {
                index,
                column_count: self.values.len(),
            });
        }
        Ok(())
    }

    /// Current value of a column
    pub fn get(&self, index: usize) -> DmlResult<Option<&Value>> {
        self.check_index(index)?;
        Ok(self.values[index].as_ref())
    }

    /// Value the column had before the current edits, or the current value
    /// when the column was not changed
    pub fn get_original(&self, index: usize) -> DmlResult<Option<&Value>> {
        self.check_index(index)?;
        match self.originals.as_ref().map(|o| &o[index]) {
            Some(Original::Captured(value)) => Ok(value.as_ref()),
            _ => Ok(self.values[index].as_ref()),
        }
    }

    /// Change a column value.
    ///
    /// Setting the value a column already holds is a no-op. The first change
    /// to a column after the last reset records the previous value.
    pub fn set(&mut self, index: usize, value: Value) -> DmlResult<()> {
        self.check_index(index)?;

        if self.values[index].as_ref() == Some(&value) {
            return Ok(());
        }

        if self.is_new() {
            self.values[index] = Some(value);
            return Ok(());
        }

        let column_count = self.values.len();
        let originals = self
            .originals
            .get_or_insert_with(|| vec![Original::NotCaptured; column_count]);
        if originals[index] == Original::NotCaptured {
            originals[index] = Original::Captured(self.values[index].take());
        }

        self.values[index] = Some(value);
        self.status.insert(RowStatus::MODIFIED);
        Ok(())
    }

    /// Set a column to SQL NULL of the given type
    pub fn set_null(&mut self, index: usize, sql_type: SqlType) -> DmlResult<()> {
        self.set(index, Value::Null(sql_type))
    }

    /// Whether a column has to be written when the row is persisted
    pub fn is_column_modified(&self, index: usize) -> DmlResult<bool> {
        self.check_index(index)?;

        if self.is_unmodified() {
            return Ok(false);
        }

        if self.is_new() {
            return Ok(self.values[index]
                .as_ref()
                .is_some_and(|value| !value.is_null()));
        }

        Ok(matches!(
            self.originals.as_ref().map(|o| &o[index]),
            Some(Original::Captured(_))
        ))
    }

    /// Indices of all columns for which [`RowState::is_column_modified`] holds
    pub fn modified_columns(&self) -> Vec<usize> {
        (0..self.values.len())
            .filter(|&i| self.is_column_modified(i).unwrap_or(false))
            .collect()
    }

    /// Put every captured original value back and mark the row unmodified
    pub fn restore_original(&mut self) {
        if let Some(originals) = self.originals.take() {
            for (slot, original) in self.values.iter_mut().zip(originals) {
                if let Original::Captured(value) = original {
                    *slot = value;
                }
            }
        }
        self.status = RowStatus::empty();
    }

    /// Accept the current values as persisted
    pub fn reset(&mut self) {
        self.status = RowStatus::empty();
        self.originals = None;
    }
}
