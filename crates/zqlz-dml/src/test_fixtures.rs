//! Schemas shared by the unit tests

use zqlz_core::{
    FkDirection, FkRelation, ForeignKeyAction, ForeignKeyInfo, MaterializedSchema, Result,
    SchemaMetadata, TableIdentity, ZqlzError,
};

pub fn table(name: &str) -> TableIdentity {
    TableIdentity::new(name)
}

pub fn names(tables: &[TableIdentity]) -> Vec<String> {
    tables.iter().map(|t| t.name.clone()).collect()
}

/// base(id1, id2) with two children, two grandchildren below child1 and
/// one below child2
pub fn six_table_schema() -> MaterializedSchema {
    let mut schema = MaterializedSchema::new();
    schema
        .add_table(table("base"), &["id1", "id2"])
        .add_table(table("child1"), &["id"])
        .add_table(table("child2"), &["id"])
        .add_table(table("child1_detail"), &["id"])
        .add_table(table("child1_detail2"), &["id"])
        .add_table(table("child2_detail"), &["id"])
        .add_foreign_key(
            table("child1"),
            ForeignKeyInfo::new(
                "fk_child1_base",
                &["base_id1", "base_id2"],
                table("base"),
                &["id1", "id2"],
            )
            .on_delete(ForeignKeyAction::Cascade),
        )
        .add_foreign_key(
            table("child2"),
            ForeignKeyInfo::new(
                "fk_child2_base",
                &["base_id1", "base_id2"],
                table("base"),
                &["id1", "id2"],
            ),
        )
        .add_foreign_key(
            table("child1_detail"),
            ForeignKeyInfo::new("fk_detail_child1", &["child1_id"], table("child1"), &["id"]),
        )
        .add_foreign_key(
            table("child1_detail2"),
            ForeignKeyInfo::new(
                "fk_detail2_detail",
                &["detail_id"],
                table("child1_detail"),
                &["id"],
            ),
        )
        .add_foreign_key(
            table("child2_detail"),
            ForeignKeyInfo::new("fk_detail_child2", &["child2_id"], table("child2"), &["id"]),
        );
    schema
}

/// employee.manager_id references employee.id
pub fn employee_schema() -> MaterializedSchema {
    let mut schema = MaterializedSchema::new();
    schema.add_table(table("employee"), &["id"]).add_foreign_key(
        table("employee"),
        ForeignKeyInfo::new(
            "fk_employee_manager",
            &["manager_id"],
            table("employee"),
            &["id"],
        ),
    );
    schema
}

/// root(id) <- child(parent_id) <- grandchild(child_id)
pub fn chain_schema() -> MaterializedSchema {
    let mut schema = MaterializedSchema::new();
    schema
        .add_table(table("root"), &["id"])
        .add_table(table("child"), &["id"])
        .add_table(table("grandchild"), &["id"])
        .add_foreign_key(
            table("child"),
            ForeignKeyInfo::new("fk_child_root", &["parent_id"], table("root"), &["id"]),
        )
        .add_foreign_key(
            table("grandchild"),
            ForeignKeyInfo::new("fk_grandchild_child", &["child_id"], table("child"), &["id"]),
        );
    schema
}

/// `depth + 1` tables t0 <- t1 <- ... <- t{depth}
pub fn long_chain_schema(depth: usize) -> MaterializedSchema {
    let mut schema = MaterializedSchema::new();
    schema.add_table(table("t0"), &["id"]);
    for i in 1..=depth {
        let name = format!("t{}", i);
        let parent = format!("t{}", i - 1);
        schema.add_table(table(&name), &["id"]).add_foreign_key(
            table(&name),
            ForeignKeyInfo::new(
                format!("fk_{}", name),
                &["parent_id"],
                table(&parent),
                &["id"],
            ),
        );
    }
    schema
}

/// Wraps a schema and fails every foreign key lookup for one table
pub struct FailingMetadata {
    pub inner: MaterializedSchema,
    pub failing_table: String,
}

impl FailingMetadata {
    pub fn new(inner: MaterializedSchema, failing_table: &str) -> Self {
        Self {
            inner,
            failing_table: failing_table.to_string(),
        }
    }
}

impl SchemaMetadata for FailingMetadata {
    fn normalize_table(&self, table: &TableIdentity) -> Result<TableIdentity> {
        self.inner.normalize_table(table)
    }

    fn foreign_keys(
        &self,
        table: &TableIdentity,
        direction: FkDirection,
    ) -> Result<Vec<FkRelation>> {
        if table.name.eq_ignore_ascii_case(&self.failing_table) {
            return Err(ZqlzError::Schema(format!("lookup failed for {}", table)));
        }
        self.inner.foreign_keys(table, direction)
    }

    fn primary_key_columns(&self, table: &TableIdentity) -> Result<Vec<String>> {
        self.inner.primary_key_columns(table)
    }
}
