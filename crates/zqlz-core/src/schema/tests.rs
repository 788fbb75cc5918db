use super::*;

fn orders_schema() -> MaterializedSchema {
    let mut schema = MaterializedSchema::new();
    schema
        .add_table(TableIdentity::with_schema("shop", "customer"), &["id"])
        .add_table(TableIdentity::with_schema("shop", "orders"), &["id"])
        .add_foreign_key(
            TableIdentity::with_schema("shop", "orders"),
            ForeignKeyInfo::new(
                "fk_orders_customer",
                &["customer_id"],
                TableIdentity::with_schema("shop", "customer"),
                &["id"],
            )
            .on_delete(ForeignKeyAction::Cascade),
        );
    schema
}

#[test]
fn test_normalize_returns_registered_identity() {
    let schema = orders_schema();
    let normalized = schema
        .normalize_table(&TableIdentity::new("ORDERS"))
        .unwrap();
    assert_eq!(normalized.schema.as_deref(), Some("shop"));
    assert_eq!(normalized.name, "orders");
}

#[test]
fn test_unknown_table_is_not_found() {
    let schema = orders_schema();
    let err = schema
        .foreign_keys(&TableIdentity::new("missing"), FkDirection::Referenced)
        .unwrap_err();
    assert!(matches!(err, ZqlzError::NotFound(_)));
}

#[test]
fn test_referenced_relations_pair_own_column_first() {
    let schema = orders_schema();
    let relations = schema
        .foreign_keys(&TableIdentity::new("orders"), FkDirection::Referenced)
        .unwrap();

    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].related_table, TableIdentity::new("customer"));
    assert_eq!(
        relations[0].columns,
        vec![("customer_id".to_string(), "id".to_string())]
    );
    assert_eq!(relations[0].on_delete, ForeignKeyAction::Cascade);
}

#[test]
fn test_referencing_relations_are_reversed() {
    let schema = orders_schema();
    let relations = schema
        .foreign_keys(&TableIdentity::new("customer"), FkDirection::Referencing)
        .unwrap();

    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].fk_name, "fk_orders_customer");
    assert_eq!(relations[0].related_table, TableIdentity::new("orders"));
    assert_eq!(
        relations[0].columns,
        vec![("id".to_string(), "customer_id".to_string())]
    );
}

#[test]
fn test_table_identity_matching_ignores_case_and_missing_schema() {
    let qualified = TableIdentity::parse("\"Shop\".\"Orders\"");
    assert_eq!(qualified.schema.as_deref(), Some("Shop"));
    assert!(qualified.is_same_table(&TableIdentity::new("orders")));
    assert!(!qualified.is_same_table(&TableIdentity::with_schema("other", "orders")));
}

#[test]
fn test_qualified_name_quotes_only_when_needed() {
    let table = TableIdentity::with_schema("public", "order items");
    assert_eq!(
        table.qualified_name(crate::Dialect::PostgreSQL),
        "public.\"order items\""
    );
    assert_eq!(
        table.qualified_name(crate::Dialect::MsSql),
        "public.[order items]"
    );
}

#[test]
fn test_mixed_case_identifiers_are_quoted() {
    use crate::Dialect;

    assert_eq!(
        Dialect::PostgreSQL.quote_identifier_if_needed("OrderItems"),
        "\"OrderItems\""
    );
    assert_eq!(Dialect::MySQL.quote_identifier_if_needed("orderId"), "`orderId`");
    assert_eq!(Dialect::PostgreSQL.quote_identifier_if_needed("order_items"), "order_items");
    assert_eq!(Dialect::PostgreSQL.quote_identifier_if_needed("ORDER_ITEMS"), "ORDER_ITEMS");
    assert_eq!(
        TableIdentity::with_schema("Sales", "orders").qualified_name(Dialect::PostgreSQL),
        "\"Sales\".orders"
    );
}

#[test]
fn test_parse_keeps_extra_parts_in_catalog() {
    let table = TableIdentity::parse("server.db.dbo.orders");
    assert_eq!(table.catalog.as_deref(), Some("server.db"));
    assert_eq!(table.schema.as_deref(), Some("dbo"));
    assert_eq!(table.name, "orders");

    let plain = TableIdentity::parse("[orders]");
    assert_eq!(plain.name, "orders");
    assert!(plain.schema.is_none());
}

#[test]
fn test_sql_type_from_type_name() {
    use crate::SqlType;

    assert_eq!(SqlType::from_type_name("varchar(20)"), SqlType::Varchar);
    assert_eq!(SqlType::from_type_name("INT4"), SqlType::Integer);
    assert_eq!(SqlType::from_type_name("numeric(10,2)"), SqlType::Decimal);
    assert_eq!(
        SqlType::from_type_name("timestamp with time zone"),
        SqlType::TimestampTz
    );
    assert!(SqlType::BigInt.is_numeric());
    assert!(SqlType::Char.is_character());
}
