//! Unit tests for dependency resolution and ordering

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use super::*;
use crate::DmlConfig;
use crate::test_fixtures::{
    FailingMetadata, chain_schema, employee_schema, long_chain_schema, names, six_table_schema,
    table,
};
use zqlz_core::{
    FkDirection, ForeignKeyAction, ForeignKeyInfo, MaterializedSchema, SchemaMetadata,
    TableIdentity,
};

fn six_tables() -> Vec<TableIdentity> {
    [
        "base",
        "child1",
        "child2",
        "child1_detail",
        "child1_detail2",
        "child2_detail",
    ]
    .into_iter()
    .map(table)
    .collect()
}

/// a.b_id -> b.id and b.a_id -> a.id, plus an unrelated table c
fn two_table_cycle() -> MaterializedSchema {
    let mut schema = MaterializedSchema::new();
    schema
        .add_table(table("a"), &["id"])
        .add_table(table("b"), &["id"])
        .add_table(table("c"), &["id"])
        .add_foreign_key(
            table("a"),
            ForeignKeyInfo::new("fk_a_b", &["b_id"], table("b"), &["id"]),
        )
        .add_foreign_key(
            table("b"),
            ForeignKeyInfo::new("fk_b_a", &["a_id"], table("a"), &["id"]),
        );
    schema
}

fn children_of(metadata: &dyn SchemaMetadata, root: &str) -> DependencyTree {
    DependencyResolver::new(metadata).build_tree(&table(root), FkDirection::Referencing)
}

fn position(order: &[TableIdentity], name: &str) -> usize {
    order
        .iter()
        .position(|t| t.name == name)
        .unwrap_or_else(|| panic!("{} missing from {:?}", name, names(order)))
}

// ============================================================================
// DependencyTree Tests
// ============================================================================

mod tree_tests {
    use super::*;

    #[test]
    fn test_add_child_links_parent() {
        let mut tree = DependencyTree::new(table("root"));
        let child = tree.add_child(tree.root_id(), table("child"), "fk_child");
        let grandchild = tree.add_child(child, table("grandchild"), "fk_grandchild");
        tree.add_column_mapping(child, "root_id", "id");
        tree.set_actions(child, ForeignKeyAction::Cascade, ForeignKeyAction::SetNull);

        assert_eq!(tree.len(), 3);
        assert!(tree.root().is_root());
        assert_eq!(tree.root().fk_name(), None);
        assert_eq!(tree.root().children(), &[child]);
        assert_eq!(tree.node(grandchild).parent(), Some(child));
        assert_eq!(tree.node(child).fk_name(), Some("fk_child"));
        assert_eq!(tree.node(child).columns()[0].child_column, "root_id");
        assert_eq!(tree.node(child).on_delete(), ForeignKeyAction::SetNull);
        assert_eq!(tree.ancestors(grandchild), vec![child, tree.root_id()]);
        assert_eq!(tree.depth(grandchild), 2);
    }

    #[test]
    fn test_get_with_foreign_handle() {
        let mut larger = DependencyTree::new(table("root"));
        let child = larger.add_child(larger.root_id(), table("child"), "fk_child");
        let single = DependencyTree::new(table("other"));

        assert_eq!(larger.get(child).map(|n| n.table().name.as_str()), Some("child"));
        assert!(single.get(child).is_none());
        assert!(single.get(single.root_id()).is_some());
    }

    #[test]
    fn test_same_table_twice_gives_distinct_nodes() {
        let mut tree = DependencyTree::new(table("employee"));
        let first = tree.add_child(tree.root_id(), table("employee"), "fk_manager");
        let second = tree.add_child(tree.root_id(), table("employee"), "fk_mentor");

        assert_ne!(first, second);
        assert_eq!(tree.tables().len(), 1);
    }
}

// ============================================================================
// DependencyResolver Tests
// ============================================================================

mod resolver_tests {
    use super::*;

    #[test]
    fn test_build_tree_towards_children() {
        let schema = six_table_schema();
        let tree = children_of(&schema, "base");

        assert_eq!(tree.len(), 6);
        assert!(!tree.cycle_detected());
        assert!(!tree.aborted());

        let leaves: Vec<&str> = tree
            .leaves()
            .iter()
            .map(|id| tree.node(*id).table().name.as_str())
            .collect();
        assert_eq!(leaves, vec!["child1_detail2", "child2_detail"]);

        let child1 = tree.root().children()[0];
        let mappings = tree.node(child1).columns();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].child_column, "base_id1");
        assert_eq!(mappings[0].parent_column, "id1");
        assert_eq!(tree.node(child1).on_delete(), ForeignKeyAction::Cascade);
    }

    #[test]
    fn test_build_tree_towards_parents() {
        let schema = six_table_schema();
        let tree = DependencyResolver::new(&schema)
            .build_tree(&table("child1_detail2"), FkDirection::Referenced);

        assert_eq!(tree.len(), 4);
        let leaf = tree.leaves()[0];
        assert_eq!(tree.node(leaf).table().name, "base");
        assert_eq!(tree.depth(leaf), 3);
        assert_eq!(tree.node(leaf).columns()[0].child_column, "id1");
        assert_eq!(tree.node(leaf).columns()[0].parent_column, "base_id1");
    }

    #[test]
    fn test_root_is_normalized() {
        let schema = chain_schema();
        let tree = children_of(&schema, "ROOT");

        assert_eq!(tree.root().table().name, "root");
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_self_reference_is_a_single_cycle_leaf() {
        let schema = employee_schema();
        let tree = children_of(&schema, "employee");

        assert!(tree.cycle_detected());
        assert!(!tree.aborted());
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.leaves().len(), 1);

        let leaf = tree.node(tree.leaves()[0]);
        assert_eq!(leaf.table().name, "employee");
        assert_eq!(leaf.fk_name(), Some("fk_employee_manager"));
        assert_eq!(leaf.parent(), Some(tree.root_id()));
    }

    #[test]
    fn test_two_table_cycle_stops_at_ancestor() {
        let schema = two_table_cycle();
        let tree = children_of(&schema, "a");

        assert!(tree.cycle_detected());
        assert_eq!(tree.len(), 3);
        let leaf = tree.node(tree.leaves()[0]);
        assert_eq!(leaf.table().name, "a");
        assert_eq!(tree.depth(leaf.id()), 2);
    }

    #[test]
    fn test_depth_cap_aborts_without_error() {
        let schema = long_chain_schema(15);
        let tree = children_of(&schema, "t0");

        assert!(tree.aborted());
        assert!(!tree.cycle_detected());
        assert_eq!(tree.len(), 11);
        assert_eq!(tree.leaves().len(), 1);
        assert_eq!(tree.node(tree.leaves()[0]).table().name, "t10");
    }

    #[test]
    fn test_depth_cap_from_config() {
        let schema = long_chain_schema(15);
        let config = DmlConfig::default().with_max_depth(3);
        let resolver = DependencyResolver::with_config(&schema, &config);
        let tree = resolver.build_tree(&table("t0"), FkDirection::Referencing);

        assert_eq!(resolver.max_depth(), 3);
        assert!(tree.aborted());
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_chain_within_cap_is_not_aborted() {
        let schema = long_chain_schema(5);
        let tree = children_of(&schema, "t0");

        assert!(!tree.aborted());
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_cancelled_before_start() {
        let schema = six_table_schema();
        let flag = Arc::new(AtomicBool::new(true));
        let tree = DependencyResolver::new(&schema)
            .with_cancel_flag(flag)
            .build_tree(&table("base"), FkDirection::Referencing);

        assert!(tree.cancelled());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.leaves(), &[tree.root_id()]);
    }

    #[test]
    fn test_metadata_failure_ends_branch() {
        let metadata = FailingMetadata::new(six_table_schema(), "child1");
        let tree = children_of(&metadata, "base");

        assert_eq!(tree.len(), 4);
        assert!(!tree.aborted());
        let leaves: Vec<&str> = tree
            .leaves()
            .iter()
            .map(|id| tree.node(*id).table().name.as_str())
            .collect();
        assert_eq!(leaves, vec!["child1", "child2_detail"]);
    }

    #[test]
    fn test_table_without_foreign_keys_is_root_leaf() {
        let schema = chain_schema();
        let tree = DependencyResolver::new(&schema)
            .build_tree(&table("grandchild"), FkDirection::Referencing);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.leaves(), &[tree.root_id()]);
    }
}

// ============================================================================
// DependencySorter Tests
// ============================================================================

mod sorter_tests {
    use super::*;

    #[test]
    fn test_sort_for_delete_six_tables() {
        let schema = six_table_schema();
        let order = DependencySorter::new(&schema).sort_for_delete(&six_tables(), false);

        assert_eq!(order.len(), 6);
        assert_eq!(order[0].name, "child1_detail2");
        assert_eq!(order[5].name, "base");
        assert!(position(&order, "child1_detail") < position(&order, "child1"));
        assert!(position(&order, "child2_detail") < position(&order, "child2"));
    }

    #[test]
    fn test_sort_for_insert_six_tables() {
        let schema = six_table_schema();
        let order = DependencySorter::new(&schema).sort_for_insert(&six_tables());

        assert_eq!(
            names(&order),
            vec![
                "base",
                "child1",
                "child2",
                "child1_detail",
                "child1_detail2",
                "child2_detail"
            ]
        );
    }

    #[test]
    fn test_insert_order_is_independent_of_input_order() {
        let schema = six_table_schema();
        let mut tables = six_tables();
        tables.reverse();
        let order = DependencySorter::new(&schema).sort_for_insert(&tables);

        assert_eq!(order[0].name, "base");
        assert!(position(&order, "child1") < position(&order, "child1_detail"));
        assert!(position(&order, "child1_detail") < position(&order, "child1_detail2"));
        assert!(position(&order, "child2") < position(&order, "child2_detail"));
    }

    #[test]
    fn test_sort_for_delete_adds_missing_dependents() {
        let schema = six_table_schema();
        let order = DependencySorter::new(&schema).sort_for_delete(&[table("child1")], true);

        assert_eq!(order.len(), 3);
        assert_eq!(order[2].name, "child1");
        assert!(order[..2].iter().any(|t| t.name == "child1_detail"));
        assert!(order[..2].iter().any(|t| t.name == "child1_detail2"));
    }

    #[test]
    fn test_sort_for_delete_without_closure() {
        let schema = six_table_schema();
        let order = DependencySorter::new(&schema).sort_for_delete(&[table("child1")], false);
        assert_eq!(names(&order), vec!["child1"]);
    }

    #[test]
    fn test_add_missing_dependents_is_transitive() {
        let schema = six_table_schema();
        let tables = DependencySorter::new(&schema).add_missing_dependents(&[table("base")]);

        assert_eq!(
            names(&tables),
            vec![
                "base",
                "child1",
                "child2",
                "child1_detail",
                "child2_detail",
                "child1_detail2"
            ]
        );
    }

    #[test]
    fn test_duplicate_input_is_collapsed() {
        let schema = six_table_schema();
        let order = DependencySorter::new(&schema)
            .sort_for_insert(&[table("child1"), table("CHILD1"), table("base")]);

        assert_eq!(names(&order), vec!["base", "child1"]);
    }

    #[test]
    fn test_unknown_table_keeps_its_place() {
        let schema = six_table_schema();
        let order = DependencySorter::new(&schema).sort_for_delete(
            &[table("child1_detail"), table("ghost"), table("child1")],
            false,
        );

        assert_eq!(names(&order), vec!["child1_detail", "ghost", "child1"]);
    }

    #[test]
    fn test_unknown_table_first_stays_first() {
        let schema = six_table_schema();
        let order = DependencySorter::new(&schema).sort_for_delete(
            &[table("ghost"), table("child1_detail"), table("child1")],
            false,
        );

        assert_eq!(names(&order), vec!["ghost", "child1_detail", "child1"]);
    }

    #[test]
    fn test_unconstrained_table_keeps_input_position() {
        let mut schema = chain_schema();
        schema.add_table(table("lonely"), &["id"]);

        let order = DependencySorter::new(&schema).sort_for_insert(&[
            table("grandchild"),
            table("lonely"),
            table("child"),
            table("root"),
        ]);

        assert_eq!(names(&order), vec!["lonely", "root", "child", "grandchild"]);
    }

    #[test]
    fn test_failed_lookup_degrades_to_no_constraint() {
        let metadata = FailingMetadata::new(six_table_schema(), "child1_detail");
        let order = DependencySorter::new(&metadata)
            .sort_for_insert(&[table("child1_detail"), table("base"), table("child1")]);

        assert_eq!(order.len(), 3);
        assert!(position(&order, "base") < position(&order, "child1"));
    }

    #[test]
    fn test_cycle_is_appended_in_input_order() {
        let schema = two_table_cycle();
        let order =
            DependencySorter::new(&schema).sort_for_insert(&[table("a"), table("b"), table("c")]);

        assert_eq!(names(&order), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_self_reference_is_ignored() {
        let schema = employee_schema();
        let order = DependencySorter::new(&schema).sort_for_delete(&[table("employee")], true);
        assert_eq!(names(&order), vec!["employee"]);
    }
}
