use serde::{Deserialize, Serialize};
use zqlz_core::{ForeignKeyAction, TableIdentity};

/// Handle of a node inside a [`DependencyTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Column pair of the foreign key that links a node to its parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Column of this node's table
    pub child_column: String,
    /// Matching column of the parent node's table
    pub parent_column: String,
}

/// A table reached through one foreign key.
///
/// The same table can occur several times in a tree (self references, or
/// two foreign keys to the same table); nodes are therefore told apart by
/// their [`NodeId`], not by their table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyNode {
    id: NodeId,
    table: TableIdentity,
    fk_name: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    columns: Vec<ColumnMapping>,
    on_update: ForeignKeyAction,
    on_delete: ForeignKeyAction,
}

impl DependencyNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn table(&self) -> &TableIdentity {
        &self.table
    }

    /// Foreign key that created the edge to the parent; `None` for the root
    pub fn fk_name(&self) -> Option<&str> {
        self.fk_name.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn columns(&self) -> &[ColumnMapping] {
        &self.columns
    }

    pub fn on_update(&self) -> ForeignKeyAction {
        self.on_update
    }

    pub fn on_delete(&self) -> ForeignKeyAction {
        self.on_delete
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena holding a tree of [`DependencyNode`]s.
///
/// Parent links are plain handles, so a schema cycle never turns into an
/// ownership cycle. The tree is built once and then only read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyTree {
    nodes: Vec<DependencyNode>,
    leaves: Vec<NodeId>,
    cycle_detected: bool,
    aborted: bool,
    cancelled: bool,
}

impl DependencyTree {
    /// Tree with only a root node
    pub fn new(root: TableIdentity) -> Self {
        Self {
            nodes: vec![DependencyNode {
                id: NodeId(0),
                table: root,
                fk_name: None,
                parent: None,
                children: Vec::new(),
                columns: Vec::new(),
                on_update: ForeignKeyAction::NoAction,
                on_delete: ForeignKeyAction::NoAction,
            }],
            leaves: Vec::new(),
            cycle_detected: false,
            aborted: false,
            cancelled: false,
        }
    }

    pub fn root(&self) -> &DependencyNode {
        &self.nodes[0]
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    /// Node for a handle issued by this tree.
    ///
    /// Panics when `id` is out of range, as with a handle from a larger tree;
    /// use [`DependencyTree::get`] for handles of unknown origin.
    pub fn node(&self, id: NodeId) -> &DependencyNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&DependencyNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[DependencyNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a child under `parent` and return its handle
    pub fn add_child(
        &mut self,
        parent: NodeId,
        table: TableIdentity,
        fk_name: impl Into<String>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DependencyNode {
            id,
            table,
            fk_name: Some(fk_name.into()),
            parent: Some(parent),
            children: Vec::new(),
            columns: Vec::new(),
            on_update: ForeignKeyAction::NoAction,
            on_delete: ForeignKeyAction::NoAction,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Record one column pair of the foreign key linking `node` to its parent
    pub fn add_column_mapping(
        &mut self,
        node: NodeId,
        child_column: impl Into<String>,
        parent_column: impl Into<String>,
    ) {
        self.nodes[node.0].columns.push(ColumnMapping {
            child_column: child_column.into(),
            parent_column: parent_column.into(),
        });
    }

    pub fn set_actions(
        &mut self,
        node: NodeId,
        on_update: ForeignKeyAction,
        on_delete: ForeignKeyAction,
    ) {
        let node = &mut self.nodes[node.0];
        node.on_update = on_update;
        node.on_delete = on_delete;
    }

    /// Parent, grandparent, ... up to and including the root
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.node(parent).parent;
        }
        ancestors
    }

    /// Number of edges between the root and `id`
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    /// Nodes that were not expanded, in discovery order
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    pub(crate) fn add_leaf(&mut self, id: NodeId) {
        if !self.leaves.contains(&id) {
            self.leaves.push(id);
        }
    }

    /// Distinct tables of the tree, in discovery order
    pub fn tables(&self) -> Vec<TableIdentity> {
        let mut tables: Vec<TableIdentity> = Vec::new();
        for node in &self.nodes {
            if !tables.iter().any(|t| t.is_same_table(&node.table)) {
                tables.push(node.table.clone());
            }
        }
        tables
    }

    /// Whether a foreign key cycle (including a self reference) was found
    pub fn cycle_detected(&self) -> bool {
        self.cycle_detected
    }

    /// Whether expansion stopped at the depth cap
    pub fn aborted(&self) -> bool {
        self.aborted
    }

    /// Whether expansion stopped because it was cancelled
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    pub(crate) fn mark_cycle(&mut self) {
        self.cycle_detected = true;
    }

    pub(crate) fn mark_aborted(&mut self) {
        self.aborted = true;
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }
}
