use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use zqlz_core::{FkDirection, LiteralFormatter, SchemaMetadata, TableIdentity, Value, ZqlzError};

use crate::{DependencyResolver, DependencyTree, DmlConfig, DmlError, DmlResult, NodeId};

/// Ordered DELETE statements plus the commit marker that ends the script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteScript {
    statements: Vec<String>,
    terminator: String,
    commit_statement: String,
}

impl DeleteScript {
    /// The DELETE statements in execution order, without terminators
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn commit_statement(&self) -> &str {
        &self.commit_statement
    }

    /// Number of DELETE statements
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// One statement per line, each terminated, ending with the commit
    pub fn to_script(&self) -> String {
        let mut script = String::new();
        for statement in self.statements.iter().chain([&self.commit_statement]) {
            script.push_str(statement);
            script.push_str(&self.terminator);
            script.push('\n');
        }
        script
    }
}

impl std::fmt::Display for DeleteScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_script())
    }
}

/// Builds a [`DeleteScript`] for one root row.
///
/// Rows of dependent tables are located with nested sub-selects that lead
/// back to the root row, so only the root needs literal key values:
///
/// ```sql
/// DELETE FROM grandchild WHERE child_id IN (SELECT id FROM child WHERE parent_id IN (SELECT id FROM root WHERE id = 7));
/// DELETE FROM child WHERE parent_id IN (SELECT id FROM root WHERE id = 7);
/// DELETE FROM root WHERE id = 7;
/// COMMIT;
/// ```
pub struct DeleteScriptGenerator<'a> {
    metadata: &'a dyn SchemaMetadata,
    formatter: &'a dyn LiteralFormatter,
    config: DmlConfig,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl<'a> DeleteScriptGenerator<'a> {
    pub fn new(
        metadata: &'a dyn SchemaMetadata,
        formatter: &'a dyn LiteralFormatter,
        config: DmlConfig,
    ) -> Self {
        Self {
            metadata,
            formatter,
            config,
            cancel_flag: None,
        }
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// Script deleting the row of `root` identified by `key_values` and all
    /// rows depending on it.
    ///
    /// Leaf tables come first, then the intermediate tables from the deepest
    /// up, then the root.
    #[tracing::instrument(skip_all, fields(table = %root))]
    pub fn generate(
        &self,
        root: &TableIdentity,
        key_values: &[(String, Value)],
    ) -> DmlResult<DeleteScript> {
        if key_values.is_empty() {
            return Err(DmlError::NoKeyColumns {
                table: root.to_string(),
            });
        }
        self.check_key_columns(root, key_values)?;

        let mut resolver = DependencyResolver::with_config(self.metadata, &self.config);
        if let Some(flag) = &self.cancel_flag {
            resolver = resolver.with_cancel_flag(flag.clone());
        }
        let tree = resolver.build_tree(root, FkDirection::Referencing);

        if tree.cancelled() {
            return Err(ZqlzError::Cancelled.into());
        }
        if tree.aborted() {
            tracing::warn!(
                max_depth = resolver.max_depth(),
                "dependency tree truncated, script may not cover every dependent row"
            );
        }

        let root_condition = self.root_condition(key_values);
        let root_id = tree.root_id();
        let mut statements: Vec<String> = Vec::new();
        let mut intermediates: Vec<NodeId> = Vec::new();

        for &leaf in tree.leaves() {
            if leaf == root_id {
                continue;
            }
            push_unique(&mut statements, self.delete_for(&tree, leaf, &root_condition));
            for ancestor in tree.ancestors(leaf) {
                if ancestor != root_id && !intermediates.contains(&ancestor) {
                    intermediates.push(ancestor);
                }
            }
        }

        intermediates.sort_by(|a, b| tree.depth(*b).cmp(&tree.depth(*a)).then(a.cmp(b)));
        for node in intermediates {
            push_unique(&mut statements, self.delete_for(&tree, node, &root_condition));
        }

        push_unique(&mut statements, self.delete_for(&tree, root_id, &root_condition));

        tracing::info!(
            statements = statements.len(),
            nodes = tree.len(),
            "delete script generated"
        );

        Ok(DeleteScript {
            statements,
            terminator: self.config.statement_terminator.clone(),
            commit_statement: self.config.commit_statement.clone(),
        })
    }

    /// Supplied columns must belong to the primary key when one is known
    fn check_key_columns(
        &self,
        root: &TableIdentity,
        key_values: &[(String, Value)],
    ) -> DmlResult<()> {
        let primary_key = match self.metadata.primary_key_columns(root) {
            Ok(columns) => columns,
            Err(e) => {
                tracing::warn!(table = %root, error = %e, "could not read primary key");
                return Ok(());
            }
        };
        if primary_key.is_empty() {
            return Ok(());
        }

        for (column, _) in key_values {
            if !primary_key.iter().any(|pk| pk.eq_ignore_ascii_case(column)) {
                return Err(DmlError::UnknownColumn {
                    table: root.to_string(),
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }

    fn root_condition(&self, key_values: &[(String, Value)]) -> String {
        key_values
            .iter()
            .map(|(column, value)| {
                let column = self.config.column_name(column);
                if value.is_null() {
                    format!("{} IS NULL", column)
                } else {
                    format!("{} = {}", column, self.formatter.format_literal(value))
                }
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn delete_for(&self, tree: &DependencyTree, node: NodeId, root_condition: &str) -> String {
        format!(
            "DELETE FROM {} WHERE {}",
            self.config.table_name(tree.node(node).table()),
            self.condition(tree, node, root_condition)
        )
    }

    /// WHERE clause selecting the rows of `node` that lead back to the root row
    fn condition(&self, tree: &DependencyTree, node: NodeId, root_condition: &str) -> String {
        let current = tree.node(node);
        let Some(parent) = current.parent() else {
            return root_condition.to_string();
        };

        let child_columns: Vec<String> = current
            .columns()
            .iter()
            .map(|m| self.config.column_name(&m.child_column))
            .collect();
        let parent_columns: Vec<String> = current
            .columns()
            .iter()
            .map(|m| self.config.column_name(&m.parent_column))
            .collect();

        let left = if child_columns.len() == 1 {
            child_columns.join("")
        } else {
            format!("({})", child_columns.join(", "))
        };

        format!(
            "{} IN (SELECT {} FROM {} WHERE {})",
            left,
            parent_columns.join(", "),
            self.config.table_name(tree.node(parent).table()),
            self.condition(tree, parent, root_condition)
        )
    }
}

fn push_unique(statements: &mut Vec<String>, statement: String) {
    if !statements.contains(&statement) {
        statements.push(statement);
    }
}
