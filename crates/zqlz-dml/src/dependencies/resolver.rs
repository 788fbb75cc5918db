use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use zqlz_core::{FkDirection, SchemaMetadata, TableIdentity};

use crate::{DependencyTree, DmlConfig, NodeId, config::DEFAULT_MAX_DEPTH};

/// Follows foreign keys from a table and records them as a [`DependencyTree`].
///
/// Expansion stops at a table that already occurs on the path from the
/// root (a cycle), at the configured depth cap, when the cancel flag is
/// raised, or when the metadata lookup for a table fails. None of these
/// are errors; the tree simply ends in a leaf at that point and the tree's
/// flags tell the caller why.
pub struct DependencyResolver<'a> {
    metadata: &'a dyn SchemaMetadata,
    max_depth: usize,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(metadata: &'a dyn SchemaMetadata) -> Self {
        Self {
            metadata,
            max_depth: DEFAULT_MAX_DEPTH,
            cancel_flag: None,
        }
    }

    pub fn with_config(metadata: &'a dyn SchemaMetadata, config: &DmlConfig) -> Self {
        Self::new(metadata).with_max_depth(config.max_depth)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Flag polled between node expansions; raising it stops the traversal
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Build the tree rooted at `root`.
    ///
    /// [`FkDirection::Referencing`] expands towards the tables that
    /// reference the root (what a delete has to remove first);
    /// [`FkDirection::Referenced`] towards the tables the root depends on.
    #[tracing::instrument(skip(self), fields(table = %root))]
    pub fn build_tree(&self, root: &TableIdentity, direction: FkDirection) -> DependencyTree {
        let root = match self.metadata.normalize_table(root) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(table = %root, error = %e, "could not normalize table name");
                root.clone()
            }
        };

        let mut tree = DependencyTree::new(root);
        let root_id = tree.root_id();
        self.expand(&mut tree, root_id, direction, 0);

        tracing::info!(
            nodes = tree.len(),
            leaves = tree.leaves().len(),
            cycle = tree.cycle_detected(),
            aborted = tree.aborted(),
            "dependency tree built"
        );
        tree
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn expand(
        &self,
        tree: &mut DependencyTree,
        node: NodeId,
        direction: FkDirection,
        level: usize,
    ) {
        if self.is_cancelled() {
            if !tree.cancelled() {
                tracing::warn!("dependency resolution cancelled");
            }
            tree.mark_cancelled();
            tree.add_leaf(node);
            return;
        }

        if level >= self.max_depth {
            tracing::warn!(
                table = %tree.node(node).table(),
                max_depth = self.max_depth,
                "maximum dependency depth reached"
            );
            tree.mark_aborted();
            tree.add_leaf(node);
            return;
        }

        let relations = match self.metadata.foreign_keys(tree.node(node).table(), direction) {
            Ok(relations) => relations,
            Err(e) => {
                tracing::warn!(
                    table = %tree.node(node).table(),
                    error = %e,
                    "could not read foreign keys, treating table as leaf"
                );
                tree.add_leaf(node);
                return;
            }
        };

        if relations.is_empty() {
            tree.add_leaf(node);
            return;
        }

        let mut children = Vec::with_capacity(relations.len());
        for relation in relations {
            let child = tree.add_child(node, relation.related_table, relation.fk_name);
            for (own_column, related_column) in relation.columns {
                tree.add_column_mapping(child, related_column, own_column);
            }
            tree.set_actions(child, relation.on_update, relation.on_delete);
            children.push(child);
        }

        for child in children {
            if Self::closes_cycle(tree, node, child) {
                tracing::debug!(
                    table = %tree.node(child).table(),
                    fk = ?tree.node(child).fk_name(),
                    "foreign key cycle detected"
                );
                tree.mark_cycle();
                tree.add_leaf(child);
                continue;
            }
            self.expand(tree, child, direction, level + 1);
        }
    }

    /// Whether `child`'s table is `current`'s table or one of its ancestors'
    fn closes_cycle(tree: &DependencyTree, current: NodeId, child: NodeId) -> bool {
        let table = tree.node(child).table();
        tree.node(current).table().is_same_table(table)
            || tree
                .ancestors(current)
                .into_iter()
                .any(|ancestor| tree.node(ancestor).table().is_same_table(table))
    }
}
