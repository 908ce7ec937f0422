/// Dynamic template tests
///
/// Statement registration, static/dynamic classification, and per-call
/// rendering of conditional and repeated clauses.
/// Run with: cargo test --test dynamic_template_tests
use std::collections::HashMap;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use rustsqlmap::parsing::KEY_ENABLE_DEFAULT_VALUE;
use rustsqlmap::{
    CommandKind, Configuration, DeclarationNode, MapperError, Result, ScriptNodeParser,
    StatementDeclaration, Value,
};

fn single_statement(declaration: StatementDeclaration) -> Arc<rustsqlmap::StatementDescriptor> {
    let id = declaration.id().to_string();
    Configuration::builder()
        .statement(declaration)
        .build()
        .unwrap()
        .statements()
        .get(&id)
        .unwrap()
}

#[test]
fn test_plain_text_statement_is_static() {
    let descriptor = single_statement(StatementDeclaration::from_text(
        "s",
        CommandKind::Select,
        "SELECT * FROM users WHERE id = #{id}",
    ));
    assert!(!descriptor.template.is_dynamic());

    let bound = descriptor
        .resolve_bound_statement(&Value::from(json!({"id": 42})))
        .unwrap();
    assert_eq!(bound.sql, "SELECT * FROM users WHERE id = ?");
    assert_eq!(bound.bindings[0].property, "id");

    let rebound = descriptor
        .resolve_bound_statement(&Value::from(json!({"id": 7})))
        .unwrap();
    assert_eq!(rebound.sql, bound.sql);
    assert_eq!(rebound.parameter.field("id"), Some(&Value::Integer(7)));
}

#[test]
fn test_declaration_variable_resolved_once() {
    let config = Configuration::builder()
        .variable("schema", "app")
        .statement(StatementDeclaration::from_text(
            "s",
            CommandKind::Select,
            "SELECT * FROM ${schema}.users",
        ))
        .build()
        .unwrap();

    let descriptor = config.statements().get("s").unwrap();
    assert!(!descriptor.template.is_dynamic());
    let bound = descriptor.resolve_bound_statement(&Value::Null).unwrap();
    assert_eq!(bound.sql, "SELECT * FROM app.users");
}

#[test]
fn test_variable_default_applies_at_registration() {
    let config = Configuration::builder()
        .variable(KEY_ENABLE_DEFAULT_VALUE, "true")
        .statement(StatementDeclaration::from_text(
            "s",
            CommandKind::Select,
            "SELECT * FROM ${schema:public}.users",
        ))
        .build()
        .unwrap();

    let bound = config
        .statements()
        .get("s")
        .unwrap()
        .resolve_bound_statement(&Value::Null)
        .unwrap();
    assert_eq!(bound.sql, "SELECT * FROM public.users");
}

#[test]
fn test_surviving_span_interpolates_per_call() {
    let descriptor = single_statement(StatementDeclaration::from_text(
        "s",
        CommandKind::Select,
        "SELECT * FROM users ORDER BY ${sort}",
    ));
    assert!(descriptor.template.is_dynamic());

    let by_name = descriptor
        .resolve_bound_statement(&Value::from(json!({"sort": "name"})))
        .unwrap();
    assert_eq!(by_name.sql, "SELECT * FROM users ORDER BY name");

    let by_age = descriptor
        .resolve_bound_statement(&Value::from(json!({"sort": "age"})))
        .unwrap();
    assert_eq!(by_age.sql, "SELECT * FROM users ORDER BY age");
}

#[test]
fn test_unresolved_span_reemitted_at_render() {
    let descriptor = single_statement(StatementDeclaration::from_text(
        "s",
        CommandKind::Select,
        "SELECT * FROM users ORDER BY ${sort}",
    ));
    let bound = descriptor
        .resolve_bound_statement(&Value::from(json!({})))
        .unwrap();
    assert_eq!(bound.sql, "SELECT * FROM users ORDER BY ${sort}");
}

#[test]
fn test_if_clause_follows_property_truthiness() {
    let node = DeclarationNode::element("select")
        .text("SELECT * FROM users")
        .child(
            DeclarationNode::element("if")
                .attr("test", "name")
                .text("WHERE name = #{name}"),
        );
    let descriptor = single_statement(StatementDeclaration::from_node(
        "s",
        CommandKind::Select,
        node,
    ));
    assert!(descriptor.template.is_dynamic());

    let with_name = descriptor
        .resolve_bound_statement(&Value::from(json!({"name": "kirk"})))
        .unwrap();
    assert_eq!(with_name.sql, "SELECT * FROM users WHERE name = ?");
    assert_eq!(with_name.bindings.len(), 1);

    // Empty text is falsy; the clause and its binding both disappear.
    let empty_name = descriptor
        .resolve_bound_statement(&Value::from(json!({"name": ""})))
        .unwrap();
    assert_eq!(empty_name.sql, "SELECT * FROM users");
    assert!(empty_name.bindings.is_empty());

    let missing = descriptor
        .resolve_bound_statement(&Value::from(json!({})))
        .unwrap();
    assert_eq!(missing.sql, "SELECT * FROM users");
}

#[test]
fn test_nested_if_clauses() {
    let node = DeclarationNode::element("select")
        .text("SELECT * FROM orders")
        .child(
            DeclarationNode::element("if")
                .attr("test", "filter")
                .text("WHERE 1 = 1")
                .child(
                    DeclarationNode::element("if")
                        .attr("test", "filter.region")
                        .text("AND region = #{filter.region}"),
                ),
        );
    let descriptor = single_statement(StatementDeclaration::from_node(
        "s",
        CommandKind::Select,
        node,
    ));

    let both = descriptor
        .resolve_bound_statement(&Value::from(json!({"filter": {"region": "eu"}})))
        .unwrap();
    assert_eq!(both.sql, "SELECT * FROM orders WHERE 1 = 1 AND region = ?");

    let outer_only = descriptor
        .resolve_bound_statement(&Value::from(json!({"filter": {"active": true}})))
        .unwrap();
    assert_eq!(outer_only.sql, "SELECT * FROM orders WHERE 1 = 1");
}

#[test]
fn test_foreach_expands_with_open_close_separator() {
    let node = DeclarationNode::element("select")
        .text("SELECT * FROM users WHERE id IN")
        .child(
            DeclarationNode::element("foreach")
                .attr("collection", "ids")
                .attr("item", "id")
                .attr("open", "(")
                .attr("close", ")")
                .attr("separator", ",")
                .text("#{id}"),
        );
    let descriptor = single_statement(StatementDeclaration::from_node(
        "s",
        CommandKind::Select,
        node,
    ));

    let bound = descriptor
        .resolve_bound_statement(&Value::from(json!({"ids": [7, 8, 9]})))
        .unwrap();
    assert_eq!(bound.sql, "SELECT * FROM users WHERE id IN ( ? , ? , ? )");
    let properties: Vec<_> = bound.bindings.iter().map(|b| b.property.as_str()).collect();
    assert_eq!(properties, vec!["ids[0]", "ids[1]", "ids[2]"]);
}

#[test]
fn test_foreach_empty_collection_renders_nothing() {
    let node = DeclarationNode::element("select")
        .text("SELECT * FROM users")
        .child(
            DeclarationNode::element("foreach")
                .attr("collection", "ids")
                .attr("item", "id")
                .attr("open", "WHERE id IN (")
                .attr("close", ")")
                .attr("separator", ",")
                .text("#{id}"),
        );
    let descriptor = single_statement(StatementDeclaration::from_node(
        "s",
        CommandKind::Select,
        node,
    ));

    let bound = descriptor
        .resolve_bound_statement(&Value::from(json!({"ids": []})))
        .unwrap();
    assert_eq!(bound.sql, "SELECT * FROM users");
    assert!(bound.bindings.is_empty());
}

#[test]
fn test_foreach_missing_collection_names_statement() {
    let node = DeclarationNode::element("select").child(
        DeclarationNode::element("foreach")
            .attr("collection", "ids")
            .attr("item", "id")
            .text("#{id}"),
    );
    let descriptor = single_statement(StatementDeclaration::from_node(
        "users.by_ids",
        CommandKind::Select,
        node,
    ));

    let err = descriptor
        .resolve_bound_statement(&Value::from(json!({})))
        .unwrap_err();
    match err {
        MapperError::Binding { property, statement } => {
            assert_eq!(property, "ids");
            assert_eq!(statement, "users.by_ids");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_foreach_over_object_items() {
    let node = DeclarationNode::element("insert")
        .text("INSERT INTO users (id, name) VALUES")
        .child(
            DeclarationNode::element("foreach")
                .attr("collection", "rows")
                .attr("item", "row")
                .attr("separator", ",")
                .text("(#{row.id}, #{row.name})"),
        );
    let descriptor = single_statement(StatementDeclaration::from_node(
        "s",
        CommandKind::Insert,
        node,
    ));

    let bound = descriptor
        .resolve_bound_statement(&Value::from(json!({
            "rows": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]
        })))
        .unwrap();
    assert_eq!(
        bound.sql,
        "INSERT INTO users (id, name) VALUES (?, ?) , (?, ?)"
    );
    let properties: Vec<_> = bound.bindings.iter().map(|b| b.property.as_str()).collect();
    assert_eq!(
        properties,
        vec!["rows[0].id", "rows[0].name", "rows[1].id", "rows[1].name"]
    );
}

#[test]
fn test_nested_foreach_qualifies_both_levels() {
    let inner = DeclarationNode::element("foreach")
        .attr("collection", "g.ids")
        .attr("item", "id")
        .attr("open", "(")
        .attr("close", ")")
        .attr("separator", ",")
        .text("#{id}");
    let node = DeclarationNode::element("select").child(
        DeclarationNode::element("foreach")
            .attr("collection", "groups")
            .attr("item", "g")
            .attr("separator", "UNION")
            .text("SELECT")
            .child(inner),
    );
    let descriptor = single_statement(StatementDeclaration::from_node(
        "s",
        CommandKind::Select,
        node,
    ));

    let bound = descriptor
        .resolve_bound_statement(&Value::from(json!({
            "groups": [{"ids": [1, 2]}, {"ids": [3]}]
        })))
        .unwrap();
    assert_eq!(bound.sql, "SELECT ( ? , ? ) UNION SELECT ( ? )");
    let properties: Vec<_> = bound.bindings.iter().map(|b| b.property.as_str()).collect();
    assert_eq!(
        properties,
        vec!["groups[0].ids[0]", "groups[0].ids[1]", "groups[1].ids[0]"]
    );
}

#[test]
fn test_foreach_index_variable_in_interpolation() {
    let node = DeclarationNode::element("select").text("SELECT").child(
        DeclarationNode::element("foreach")
            .attr("collection", "cols")
            .attr("item", "c")
            .attr("index", "i")
            .attr("separator", ",")
            .text("${c} AS col_${i}"),
    );
    let descriptor = single_statement(StatementDeclaration::from_node(
        "s",
        CommandKind::Select,
        node,
    ));

    let bound = descriptor
        .resolve_bound_statement(&Value::from(json!({"cols": ["name", "age"]})))
        .unwrap();
    assert_eq!(bound.sql, "SELECT name AS col_0 , age AS col_1");
}

#[test]
fn test_bare_array_parameter_addressable_as_list() {
    let node = DeclarationNode::element("select")
        .text("SELECT * FROM users WHERE id IN")
        .child(
            DeclarationNode::element("foreach")
                .attr("collection", "list")
                .attr("item", "id")
                .attr("open", "(")
                .attr("close", ")")
                .attr("separator", ",")
                .text("#{id}"),
        );
    let descriptor = single_statement(StatementDeclaration::from_node(
        "s",
        CommandKind::Select,
        node,
    ));

    let bound = descriptor
        .resolve_bound_statement(&Value::from(json!([5, 6])))
        .unwrap();
    assert_eq!(bound.sql, "SELECT * FROM users WHERE id IN ( ? , ? )");
    let properties: Vec<_> = bound.bindings.iter().map(|b| b.property.as_str()).collect();
    assert_eq!(properties, vec!["list[0]", "list[1]"]);
}

#[test]
fn test_include_splices_and_keeps_statement_static() {
    let config = Configuration::builder()
        .sql_fragment(
            "user_columns",
            DeclarationNode::element("sql").text("id, name, created_at"),
        )
        .statement(StatementDeclaration::from_node(
            "s",
            CommandKind::Select,
            DeclarationNode::element("select")
                .text("SELECT")
                .child(DeclarationNode::element("include").attr("refid", "user_columns"))
                .text("FROM users"),
        ))
        .build()
        .unwrap();

    let descriptor = config.statements().get("s").unwrap();
    assert!(!descriptor.template.is_dynamic());
    let bound = descriptor.resolve_bound_statement(&Value::Null).unwrap();
    assert_eq!(bound.sql, "SELECT id, name, created_at FROM users");
}

#[test]
fn test_include_with_dynamic_fragment_stays_dynamic() {
    let config = Configuration::builder()
        .sql_fragment(
            "name_filter",
            DeclarationNode::element("sql").child(
                DeclarationNode::element("if")
                    .attr("test", "name")
                    .text("AND name = #{name}"),
            ),
        )
        .statement(StatementDeclaration::from_node(
            "s",
            CommandKind::Select,
            DeclarationNode::element("select")
                .text("SELECT * FROM users WHERE 1 = 1")
                .child(DeclarationNode::element("include").attr("refid", "name_filter")),
        ))
        .build()
        .unwrap();

    let descriptor = config.statements().get("s").unwrap();
    assert!(descriptor.template.is_dynamic());
    let bound = descriptor
        .resolve_bound_statement(&Value::from(json!({"name": "kirk"})))
        .unwrap();
    assert_eq!(bound.sql, "SELECT * FROM users WHERE 1 = 1 AND name = ?");
}

#[test]
fn test_unknown_fragment_reference_fails_build() {
    let err = Configuration::builder()
        .statement(StatementDeclaration::from_node(
            "users.find",
            CommandKind::Select,
            DeclarationNode::element("select")
                .child(DeclarationNode::element("include").attr("refid", "ghost")),
        ))
        .build()
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("users.find"));
    assert!(message.contains("ghost"));
}

#[test]
fn test_circular_include_fails_build() {
    let err = Configuration::builder()
        .sql_fragment(
            "a",
            DeclarationNode::element("sql")
                .child(DeclarationNode::element("include").attr("refid", "b")),
        )
        .sql_fragment(
            "b",
            DeclarationNode::element("sql")
                .child(DeclarationNode::element("include").attr("refid", "a")),
        )
        .statement(StatementDeclaration::from_node(
            "users.loop",
            CommandKind::Select,
            DeclarationNode::element("select")
                .child(DeclarationNode::element("include").attr("refid", "a")),
        ))
        .build()
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("users.loop"));
    assert!(message.contains("Circular include"));
}

#[test]
fn test_unknown_element_fails_build() {
    let err = Configuration::builder()
        .statement(StatementDeclaration::from_node(
            "s",
            CommandKind::Select,
            DeclarationNode::element("select").child(DeclarationNode::element("choose")),
        ))
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("choose"));
}

#[test]
fn test_raw_engine_accepts_static_rejects_dynamic() {
    let config = Configuration::builder()
        .statement(
            StatementDeclaration::from_text("s", CommandKind::Select, "SELECT * FROM users")
                .engine("raw"),
        )
        .build()
        .unwrap();
    assert!(!config.statements().get("s").unwrap().template.is_dynamic());

    let err = Configuration::builder()
        .statement(
            StatementDeclaration::from_text(
                "users.sorted",
                CommandKind::Select,
                "SELECT * FROM users ORDER BY ${sort}",
            )
            .engine("raw"),
        )
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("Dynamic content is not allowed"));
}

struct CannedScriptParser;

impl ScriptNodeParser for CannedScriptParser {
    fn parse(&self, _body: &str) -> Result<DeclarationNode> {
        Ok(DeclarationNode::element("select")
            .text("SELECT * FROM users")
            .child(
                DeclarationNode::element("if")
                    .attr("test", "id")
                    .text("WHERE id = #{id}"),
            ))
    }
}

#[test]
fn test_script_marker_routes_through_parser() {
    let config = Configuration::builder()
        .script_parser(Arc::new(CannedScriptParser))
        .statement(StatementDeclaration::from_text(
            "s",
            CommandKind::Select,
            "<script>SELECT * FROM users <if test=\"id\">WHERE id = #{id}</if></script>",
        ))
        .build()
        .unwrap();

    let descriptor = config.statements().get("s").unwrap();
    assert!(descriptor.template.is_dynamic());
    let bound = descriptor
        .resolve_bound_statement(&Value::from(json!({"id": 3})))
        .unwrap();
    assert_eq!(bound.sql, "SELECT * FROM users WHERE id = ?");
}

#[test]
fn test_script_marker_without_parser_fails_build() {
    let err = Configuration::builder()
        .statement(StatementDeclaration::from_text(
            "s",
            CommandKind::Select,
            "<script>SELECT 1</script>",
        ))
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("script node parser"));
}

#[test]
fn test_script_marker_must_be_the_exact_prefix() {
    // Leading whitespace keeps the body on the plain-text path, so no
    // script parser is needed and the marker survives as literal text.
    let config = Configuration::builder()
        .statement(StatementDeclaration::from_text(
            "s",
            CommandKind::Select,
            "  <script>SELECT 1</script>",
        ))
        .build()
        .unwrap();

    let descriptor = config.statements().get("s").unwrap();
    assert!(!descriptor.template.is_dynamic());
    let bound = descriptor.resolve_bound_statement(&Value::Null).unwrap();
    assert_eq!(bound.sql, "  <script>SELECT 1</script>");
}

#[test]
fn test_fragments_and_variables_compose() {
    let mut extra = HashMap::new();
    extra.insert("schema".to_string(), "app".to_string());

    let config = Configuration::builder()
        .variables(extra)
        .sql_fragment(
            "base",
            DeclarationNode::element("sql").text("SELECT id FROM ${schema}.users"),
        )
        .statement(StatementDeclaration::from_node(
            "s",
            CommandKind::Select,
            DeclarationNode::element("select")
                .child(DeclarationNode::element("include").attr("refid", "base"))
                .text("WHERE id = #{id}"),
        ))
        .build()
        .unwrap();

    let bound = config
        .statements()
        .get("s")
        .unwrap()
        .resolve_bound_statement(&Value::from(json!({"id": 1})))
        .unwrap();
    assert_eq!(bound.sql, "SELECT id FROM app.users WHERE id = ?");
}
