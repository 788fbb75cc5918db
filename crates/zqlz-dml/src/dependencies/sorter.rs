use std::collections::VecDeque;

use zqlz_core::{FkDirection, SchemaMetadata, TableIdentity};

/// Orders tables so that bulk inserts or deletes respect foreign keys.
///
/// Tables whose metadata cannot be read keep their place relative to the
/// others; tables caught in a foreign key cycle are appended in input order.
pub struct DependencySorter<'a> {
    metadata: &'a dyn SchemaMetadata,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SortDirection {
    /// Referenced tables first
    Insert,
    /// Referencing tables first
    Delete,
}

impl<'a> DependencySorter<'a> {
    pub fn new(metadata: &'a dyn SchemaMetadata) -> Self {
        Self { metadata }
    }

    /// Parents before children
    #[tracing::instrument(skip_all, fields(tables = tables.len()))]
    pub fn sort_for_insert(&self, tables: &[TableIdentity]) -> Vec<TableIdentity> {
        let tables = self.normalize(tables);
        self.sort(tables, SortDirection::Insert)
    }

    /// Children before parents. With `add_missing_dependents` the tables
    /// referencing any of the given tables are pulled in first, transitively.
    #[tracing::instrument(skip_all, fields(tables = tables.len()))]
    pub fn sort_for_delete(
        &self,
        tables: &[TableIdentity],
        add_missing_dependents: bool,
    ) -> Vec<TableIdentity> {
        let tables = if add_missing_dependents {
            self.add_missing_dependents(tables)
        } else {
            self.normalize(tables)
        };
        self.sort(tables, SortDirection::Delete)
    }

    /// The given tables followed by every table that references one of them
    /// directly or transitively, in discovery order
    pub fn add_missing_dependents(&self, tables: &[TableIdentity]) -> Vec<TableIdentity> {
        let mut result = self.normalize(tables);
        let mut queue: VecDeque<TableIdentity> = result.iter().cloned().collect();

        while let Some(table) = queue.pop_front() {
            let relations = match self.metadata.foreign_keys(&table, FkDirection::Referencing) {
                Ok(relations) => relations,
                Err(e) => {
                    tracing::warn!(table = %table, error = %e, "could not read referencing tables");
                    continue;
                }
            };

            for relation in relations {
                let dependent = relation.related_table;
                if !result.iter().any(|t| t.is_same_table(&dependent)) {
                    tracing::debug!(table = %dependent, referenced = %table, "adding dependent table");
                    result.push(dependent.clone());
                    queue.push_back(dependent);
                }
            }
        }

        result
    }

    fn normalize(&self, tables: &[TableIdentity]) -> Vec<TableIdentity> {
        let mut result: Vec<TableIdentity> = Vec::with_capacity(tables.len());
        for table in tables {
            let table = match self.metadata.normalize_table(table) {
                Ok(normalized) => normalized,
                Err(e) => {
                    tracing::warn!(table = %table, error = %e, "could not normalize table name");
                    table.clone()
                }
            };
            if !result.iter().any(|t| t.is_same_table(&table)) {
                result.push(table);
            }
        }
        result
    }

    fn sort(&self, tables: Vec<TableIdentity>, direction: SortDirection) -> Vec<TableIdentity> {
        let successors = self.build_edges(&tables, direction);
        let order = stable_topological_order(&successors);

        tracing::info!(tables = tables.len(), "tables sorted by dependency");

        let mut slots: Vec<Option<TableIdentity>> = tables.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect()
    }

    /// `successors[a]` lists the tables that have to come after table `a`
    fn build_edges(&self, tables: &[TableIdentity], direction: SortDirection) -> Vec<Vec<usize>> {
        let mut successors = vec![Vec::new(); tables.len()];

        for (referencing, table) in tables.iter().enumerate() {
            let relations = match self.metadata.foreign_keys(table, FkDirection::Referenced) {
                Ok(relations) => relations,
                Err(e) => {
                    tracing::warn!(table = %table, error = %e, "could not read foreign keys, keeping position");
                    continue;
                }
            };

            for relation in relations {
                let Some(referenced) = tables
                    .iter()
                    .position(|t| t.is_same_table(&relation.related_table))
                else {
                    continue;
                };
                if referenced == referencing {
                    continue;
                }

                let (before, after) = match direction {
                    SortDirection::Insert => (referenced, referencing),
                    SortDirection::Delete => (referencing, referenced),
                };
                if !successors[before].contains(&after) {
                    successors[before].push(after);
                }
            }
        }

        successors
    }
}

/// Kahn's algorithm over `successors`.
///
/// Among the nodes that are ready, the one earliest in the input goes
/// first, so unconstrained nodes keep their relative input order. Nodes
/// left over because of a cycle are appended in input order.
fn stable_topological_order(successors: &[Vec<usize>]) -> Vec<usize> {
    let count = successors.len();

    let mut in_degree = vec![0usize; count];
    for targets in successors {
        for &target in targets {
            in_degree[target] += 1;
        }
    }

    let mut emitted = vec![false; count];
    let mut order = Vec::with_capacity(count);

    while let Some(next) = (0..count).find(|&i| !emitted[i] && in_degree[i] == 0) {
        emitted[next] = true;
        order.push(next);
        for &target in &successors[next] {
            in_degree[target] -= 1;
        }
    }

    if order.len() < count {
        let remaining: Vec<usize> = (0..count).filter(|&i| !emitted[i]).collect();
        tracing::warn!(
            tables = remaining.len(),
            "foreign key cycle between tables, keeping input order for them"
        );
        order.extend(remaining);
    }

    order
}
