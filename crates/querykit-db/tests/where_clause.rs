//! End-to-end tests for the lookup resolution and WHERE-clause compilation
//! pipeline: catalog resolution, tree insertion, and SQL assembly against a
//! concrete backend.

use std::collections::HashMap;
use std::sync::Arc;

use querykit_db::backend::{Backend, Connection};
use querykit_db::fields::{FieldDef, FieldType};
use querykit_db::query::expressions::{ColumnRef, Lhs, ModelRef, Operand, Subquery};
use querykit_db::query::where_clause::{CompiledWhere, Connector, WhereChild, WhereNode};
use querykit_db::query::LookupCatalog;
use querykit_db::value::Value;

fn pg() -> Connection {
    Connection::new(Backend::Postgres)
}

fn field(name: &str, field_type: FieldType) -> Arc<FieldDef> {
    Arc::new(FieldDef::new(name, field_type))
}

fn column(name: &str, field_type: FieldType) -> Lhs {
    Lhs::from(ColumnRef::new(name).with_field(field(name, field_type)))
}

fn compiled(node: &WhereNode, conn: &Connection) -> (String, Vec<Value>) {
    node.as_sql(conn)
        .unwrap()
        .into_sql()
        .expect("expected compiled SQL")
}

// ── End-to-end scenarios ─────────────────────────────────────────────

#[test]
fn test_and_of_or_scenario() {
    let catalog = LookupCatalog::with_defaults();
    let age = FieldDef::new("age", FieldType::IntegerField);
    let status = FieldDef::new("status", FieldType::CharField);

    let mut inner = WhereNode::with_connector(Connector::Or);
    inner
        .add_leaf(
            column("status", FieldType::CharField),
            catalog.resolve(&status, "exact").unwrap(),
            Operand::Value(Value::from("active")),
            Connector::Or,
        )
        .unwrap();
    inner
        .add_leaf(
            column("status", FieldType::CharField),
            catalog.resolve(&status, "exact").unwrap(),
            Operand::Value(Value::from("pending")),
            Connector::Or,
        )
        .unwrap();

    let mut tree = WhereNode::new();
    tree.add_leaf(
        column("age", FieldType::IntegerField),
        catalog.resolve(&age, "gte").unwrap(),
        Operand::Value(Value::Int(18)),
        Connector::And,
    )
    .unwrap();
    tree.add(WhereChild::Node(inner), Connector::And);

    let (sql, params) = compiled(&tree, &pg());
    assert_eq!(sql, "age >= %s AND (status = %s OR status = %s)");
    assert_eq!(
        params,
        vec![Value::Int(18), Value::from("active"), Value::from("pending")]
    );
}

#[test]
fn test_in_chunking_scenario() {
    let catalog = LookupCatalog::with_defaults();
    let id = FieldDef::new("id", FieldType::IntegerField);
    let conn = pg().with_max_in_list_size(Some(2));

    let mut tree = WhereNode::new();
    tree.add_leaf(
        column("id", FieldType::IntegerField),
        catalog.resolve(&id, "in").unwrap(),
        (1..=5).map(Value::from).collect(),
        Connector::And,
    )
    .unwrap();

    let (sql, params) = compiled(&tree, &conn);
    assert_eq!(sql, "(id IN (%s, %s) OR id IN (%s, %s) OR id IN (%s))");
    assert_eq!(
        params,
        vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
            Value::Int(4),
            Value::Int(5)
        ]
    );
}

#[test]
fn test_year_scenario() {
    let catalog = LookupCatalog::with_defaults();
    let created = FieldDef::new("created", FieldType::DateTimeField);

    let mut tree = WhereNode::new();
    tree.add_leaf(
        column("created", FieldType::DateTimeField),
        catalog.resolve(&created, "year").unwrap(),
        Operand::Value(Value::Int(2012)),
        Connector::And,
    )
    .unwrap();

    let (sql, params) = compiled(&tree, &pg());
    assert_eq!(sql, "created BETWEEN %s AND %s");
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].to_string(), "2012-01-01 00:00:00");
    assert_eq!(params[1].to_string(), "2012-12-31 23:59:59.999999");
}

// ── Short-circuiting through the full pipeline ───────────────────────

#[test]
fn test_empty_in_empties_the_whole_and_tree() {
    let catalog = LookupCatalog::with_defaults();
    let id = FieldDef::new("id", FieldType::IntegerField);
    let name = FieldDef::new("name", FieldType::CharField);

    let mut tree = WhereNode::new();
    tree.add_leaf(
        column("name", FieldType::CharField),
        catalog.resolve(&name, "exact").unwrap(),
        Operand::Value(Value::from("Alice")),
        Connector::And,
    )
    .unwrap();
    tree.add_leaf(
        column("id", FieldType::IntegerField),
        catalog.resolve(&id, "in").unwrap(),
        Vec::<Value>::new().into_iter().collect(),
        Connector::And,
    )
    .unwrap();

    assert_eq!(tree.as_sql(&pg()).unwrap(), CompiledWhere::Nothing);

    let mut negated = tree.clone();
    negated.negate();
    assert_eq!(negated.as_sql(&pg()).unwrap(), CompiledWhere::Everything);
}

#[test]
fn test_isnull_never_binds_parameters() {
    let catalog = LookupCatalog::with_defaults();
    let bio = FieldDef::new("bio", FieldType::TextField);

    for (flag, expected) in [(true, "bio IS NULL"), (false, "bio IS NOT NULL")] {
        let mut tree = WhereNode::new();
        tree.add_leaf(
            column("bio", FieldType::TextField),
            catalog.resolve(&bio, "isnull").unwrap(),
            Operand::Value(Value::Bool(flag)),
            Connector::And,
        )
        .unwrap();
        let (sql, params) = compiled(&tree, &pg());
        assert_eq!(sql, expected);
        assert!(params.is_empty());
    }
}

// ── Related fields ───────────────────────────────────────────────────

#[test]
fn test_related_value_resolves_to_pk() {
    let catalog = LookupCatalog::with_defaults();
    let author = FieldDef::new(
        "author",
        FieldType::ForeignKey {
            to: "auth.User".to_string(),
            to_field: None,
        },
    )
    .column("author_id");

    let user = ModelRef::new("auth.User", "id").with_attr("id", Value::Int(7));
    let mut tree = WhereNode::new();
    tree.add_leaf(
        Lhs::from(ColumnRef::new("author_id").with_field(Arc::new(author.clone()))),
        catalog.resolve(&author, "exact").unwrap(),
        Operand::Object(user),
        Connector::And,
    )
    .unwrap();

    let (sql, params) = compiled(&tree, &pg());
    assert_eq!(sql, "author_id = %s");
    assert_eq!(params, vec![Value::Int(7)]);
}

#[test]
fn test_deleted_related_row_compares_against_null() {
    let catalog = LookupCatalog::with_defaults();
    let author = FieldDef::new(
        "author",
        FieldType::ForeignKey {
            to: "auth.User".to_string(),
            to_field: None,
        },
    );

    let orphan = ModelRef::new("auth.User", "id");
    let mut tree = WhereNode::new();
    tree.add_leaf(
        Lhs::from(ColumnRef::new("author_id").with_field(Arc::new(author.clone()))),
        catalog.resolve(&author, "exact").unwrap(),
        Operand::Object(orphan),
        Connector::And,
    )
    .unwrap();

    let (sql, params) = compiled(&tree, &pg());
    assert_eq!(sql, "author_id = %s");
    assert_eq!(params, vec![Value::Null]);
}

// ── Sub-queries and relabeling ───────────────────────────────────────

#[test]
fn test_in_subquery_with_relabeling() {
    let catalog = LookupCatalog::with_defaults();
    let id = FieldDef::new("id", FieldType::IntegerField);

    let mut sub_where = WhereNode::new();
    sub_where
        .add_leaf(
            Lhs::from(
                ColumnRef::new("banned")
                    .with_alias("B0")
                    .with_field(field("banned", FieldType::BooleanField)),
            ),
            catalog
                .resolve(&FieldDef::new("banned", FieldType::BooleanField), "exact")
                .unwrap(),
            Operand::Value(Value::Bool(true)),
            Connector::And,
        )
        .unwrap();
    let sub = Subquery::new("users", "id").with_alias("B0").with_where(sub_where);

    let mut tree = WhereNode::new();
    tree.add_leaf(
        Lhs::from(ColumnRef::new("id").with_alias("T1").with_field(field("id", FieldType::IntegerField))),
        catalog.resolve(&id, "in").unwrap(),
        Operand::Subquery(sub),
        Connector::And,
    )
    .unwrap();

    let (sql, params) = compiled(&tree, &pg());
    assert_eq!(
        sql,
        "T1.id IN (SELECT B0.id FROM users B0 WHERE B0.banned = %s)"
    );
    assert_eq!(params, vec![Value::Bool(true)]);

    // Relabeling renames outer and nested aliases and is idempotent for
    // aliases absent from the map.
    let mut relabeled = tree.clone();
    relabeled.relabel_aliases(&HashMap::from([
        ("T1".to_string(), "T4".to_string()),
        ("B0".to_string(), "B7".to_string()),
    ]));
    let (sql, _) = compiled(&relabeled, &pg());
    assert_eq!(
        sql,
        "T4.id IN (SELECT B7.id FROM users B7 WHERE B7.banned = %s)"
    );
}

#[test]
fn test_subquery_matching_nothing_empties_the_predicate() {
    let catalog = LookupCatalog::with_defaults();
    let id = FieldDef::new("id", FieldType::IntegerField);

    let mut sub_where = WhereNode::new();
    sub_where.add(WhereChild::Nothing, Connector::And);
    let sub = Subquery::new("users", "id").with_where(sub_where);

    let mut tree = WhereNode::new();
    tree.add_leaf(
        column("id", FieldType::IntegerField),
        catalog.resolve(&id, "in").unwrap(),
        Operand::Subquery(sub),
        Connector::And,
    )
    .unwrap();

    assert_eq!(tree.as_sql(&pg()).unwrap(), CompiledWhere::Nothing);
}

// ── Backend differences ──────────────────────────────────────────────

#[test]
fn test_icontains_across_backends() {
    let catalog = LookupCatalog::with_defaults();
    let title = FieldDef::new("title", FieldType::CharField);

    let mut tree = WhereNode::new();
    tree.add_leaf(
        column("title", FieldType::CharField),
        catalog.resolve(&title, "icontains").unwrap(),
        Operand::Value(Value::from("rust")),
        Connector::And,
    )
    .unwrap();

    let (sql, params) = compiled(&tree, &pg());
    assert_eq!(sql, "title ILIKE %s");
    assert_eq!(params, vec![Value::from("%rust%")]);

    let (sql, _) = compiled(&tree, &Connection::new(Backend::Sqlite));
    assert_eq!(sql, "title LIKE %s ESCAPE '\\'");

    let (sql, _) = compiled(&tree, &Connection::new(Backend::Mysql));
    assert_eq!(sql, "title LIKE %s");
}

#[test]
fn test_unknown_lookup_is_a_configuration_error() {
    let catalog = LookupCatalog::with_defaults();
    let title = FieldDef::new("title", FieldType::CharField);
    assert!(catalog.resolve(&title, "fuzzy").is_err());
}
