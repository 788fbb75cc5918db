use zqlz_core::{Dialect, Value};

use crate::{
    BoundValue, DmlConfig, DmlError, DmlResult, DmlStatement, ResultInfo, RowState, StatementKind,
};

/// Builds INSERT, UPDATE and DELETE statements for edited rows
#[derive(Debug, Clone, Default)]
pub struct StatementFactory {
    config: DmlConfig,
}

impl StatementFactory {
    pub fn new(config: DmlConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DmlConfig {
        &self.config
    }

    /// Value to bind for a column: unset becomes a NULL of the column's type
    fn bind_value(
        &self,
        value: Option<&Value>,
        info: &ResultInfo,
        index: usize,
    ) -> DmlResult<Value> {
        let sql_type = info.column(index)?.sql_type;
        let value = match value {
            None => Value::Null(sql_type),
            Some(Value::String(s)) if s.is_empty() && self.config.empty_string_is_null => {
                Value::Null(sql_type)
            }
            Some(v) => v.clone(),
        };
        Ok(value)
    }

    /// `col = ?` for every identifying column, bound to the value the row
    /// had when it was read
    fn key_condition(
        &self,
        row: &RowState,
        info: &ResultInfo,
        values: &mut Vec<BoundValue>,
    ) -> DmlResult<String> {
        let keys = info.key_columns();
        if keys.is_empty() {
            return Err(DmlError::NoKeyColumns {
                table: info.table().to_string(),
            });
        }

        let mut conditions = Vec::with_capacity(keys.len());
        for index in keys {
            let column = info.column(index)?;
            let name = self.config.column_name(&column.name);
            let original = self.bind_value(row.get_original(index)?, info, index)?;
            if original.is_null() {
                conditions.push(format!("{} IS NULL", name));
            } else {
                conditions.push(format!("{} = ?", name));
                values.push(BoundValue::new(&column.name, original));
            }
        }

        Ok(conditions.join(" AND "))
    }

    /// INSERT for a row. Identifying columns that were never set are left
    /// out so the database can generate them; an explicit NULL is kept.
    #[tracing::instrument(skip_all, fields(table = %info.table()))]
    pub fn create_insert(&self, row: &RowState, info: &ResultInfo) -> DmlResult<DmlStatement> {
        let mut columns = Vec::new();
        let mut values = Vec::new();

        for (index, column) in info.columns().iter().enumerate() {
            let slot = row.get(index)?;
            if column.is_key && slot.is_none() {
                continue;
            }
            let value = self.bind_value(slot, info, index)?;
            if value.is_null() && !column.is_key && !self.config.include_null_in_insert {
                continue;
            }
            columns.push(self.config.column_name(&column.name));
            values.push(BoundValue::new(&column.name, value));
        }

        let table = self.config.table_name(info.table());
        let sql = if columns.is_empty() {
            match self.config.dialect {
                Dialect::MySQL => format!("INSERT INTO {} () VALUES ()", table),
                _ => format!("INSERT INTO {} DEFAULT VALUES", table),
            }
        } else {
            let placeholders = vec!["?"; columns.len()].join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                columns.join(", "),
                placeholders
            )
        };

        tracing::debug!("Insert SQL: {}", sql);
        DmlStatement::new(StatementKind::Insert, info.table().clone(), sql, values)
    }

    /// UPDATE covering only the modified columns of a row
    #[tracing::instrument(skip_all, fields(table = %info.table()))]
    pub fn create_update(&self, row: &RowState, info: &ResultInfo) -> DmlResult<DmlStatement> {
        if !info.has_key_columns() {
            return Err(DmlError::NoKeyColumns {
                table: info.table().to_string(),
            });
        }

        let modified = row.modified_columns();
        if modified.is_empty() {
            return Err(DmlError::NoModifiedColumns {
                table: info.table().to_string(),
            });
        }

        let mut values = Vec::new();
        let mut assignments = Vec::with_capacity(modified.len());
        for index in modified {
            let column = info.column(index)?;
            assignments.push(format!("{} = ?", self.config.column_name(&column.name)));
            values.push(BoundValue::new(
                &column.name,
                self.bind_value(row.get(index)?, info, index)?,
            ));
        }

        let condition = self.key_condition(row, info, &mut values)?;
        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            self.config.table_name(info.table()),
            assignments.join(", "),
            condition
        );

        tracing::debug!("Update SQL: {}", sql);
        DmlStatement::new(StatementKind::Update, info.table().clone(), sql, values)
    }

    /// DELETE matching a row by its identifying columns
    #[tracing::instrument(skip_all, fields(table = %info.table()))]
    pub fn create_delete(&self, row: &RowState, info: &ResultInfo) -> DmlResult<DmlStatement> {
        let mut values = Vec::new();
        let condition = self.key_condition(row, info, &mut values)?;
        let sql = format!(
            "DELETE FROM {} WHERE {}",
            self.config.table_name(info.table()),
            condition
        );

        tracing::debug!("Delete SQL: {}", sql);
        DmlStatement::new(StatementKind::Delete, info.table().clone(), sql, values)
    }
}
