/// Token scanning and substitution tests
///
/// Escape-aware span scanning, variable substitution with opt-in defaults,
/// and placeholder extraction exercised through the public API.
/// Run with: cargo test --test token_parsing_tests
use rustsqlmap::parsing::{
    KEY_DEFAULT_VALUE_SEPARATOR, KEY_ENABLE_DEFAULT_VALUE, TokenScanner, substitute,
};
use rustsqlmap::template::StaticTemplate;
use rustsqlmap::{DataType, ParameterMode, Properties};

fn vars(pairs: &[(&str, &str)]) -> Properties {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_scan_without_tokens_is_identity() {
    let scanner = TokenScanner::new("${", "}");
    let mut calls = 0;
    let out = scanner.scan("SELECT * FROM users", &mut |_: &str| {
        calls += 1;
        String::new()
    });
    assert_eq!(out, "SELECT * FROM users");
    assert_eq!(calls, 0);
}

#[test]
fn test_scan_visits_spans_in_order() {
    let scanner = TokenScanner::new("${", "}");
    let mut seen = Vec::new();
    let out = scanner.scan("a ${one} b ${two} c", &mut |content: &str| {
        seen.push(content.to_string());
        format!("[{}]", content)
    });
    assert_eq!(out, "a [one] b [two] c");
    assert_eq!(seen, vec!["one", "two"]);
}

#[test]
fn test_escaped_open_token_stays_literal() {
    let scanner = TokenScanner::new("${", "}");
    let mut calls = 0;
    let out = scanner.scan(r"price is \${amount}", &mut |_: &str| {
        calls += 1;
        String::new()
    });
    // The backslash is consumed; the span text survives untouched.
    assert_eq!(out, "price is ${amount}");
    assert_eq!(calls, 0);
}

#[test]
fn test_escaped_close_is_part_of_content() {
    let scanner = TokenScanner::new("#{", "}");
    let mut seen = Vec::new();
    scanner.scan(r"#{a\}b}", &mut |content: &str| {
        seen.push(content.to_string());
        "?".to_string()
    });
    assert_eq!(seen, vec!["a}b"]);
}

#[test]
fn test_unterminated_span_emitted_literally() {
    let scanner = TokenScanner::new("#{", "}");
    let mut calls = 0;
    let out = scanner.scan("WHERE id = #{id", &mut |_: &str| {
        calls += 1;
        String::new()
    });
    assert_eq!(out, "WHERE id = #{id");
    assert_eq!(calls, 0);
}

#[test]
fn test_scan_handles_multibyte_text() {
    let scanner = TokenScanner::new("${", "}");
    let out = scanner.scan("Привіт ${name} Світ", &mut |content: &str| {
        assert_eq!(content, "name");
        "Олена".to_string()
    });
    assert_eq!(out, "Привіт Олена Світ");
}

#[test]
fn test_substitute_known_and_unknown() {
    let table = vars(&[("schema", "app")]);
    assert_eq!(
        substitute("SELECT * FROM ${schema}.users", Some(&table)),
        "SELECT * FROM app.users"
    );
    // Unknown names come back intact for later passes.
    assert_eq!(
        substitute("ORDER BY ${missing}", Some(&table)),
        "ORDER BY ${missing}"
    );
    assert_eq!(substitute("ORDER BY ${missing}", None), "ORDER BY ${missing}");
}

#[test]
fn test_substitute_defaults_require_opt_in() {
    let plain = vars(&[]);
    assert_eq!(substitute("${host:localhost}", Some(&plain)), "${host:localhost}");

    let enabled = vars(&[(KEY_ENABLE_DEFAULT_VALUE, "true")]);
    assert_eq!(substitute("${host:localhost}", Some(&enabled)), "localhost");
    assert_eq!(substitute("${host:}", Some(&enabled)), "");
}

#[test]
fn test_substitute_present_key_beats_default() {
    let table = vars(&[(KEY_ENABLE_DEFAULT_VALUE, "true"), ("host", "db01")]);
    assert_eq!(substitute("${host:localhost}", Some(&table)), "db01");
}

#[test]
fn test_substitute_splits_at_first_separator_only() {
    let table = vars(&[(KEY_ENABLE_DEFAULT_VALUE, "true")]);
    assert_eq!(
        substitute("${jdbc.url:postgres://db:5432/app}", Some(&table)),
        "postgres://db:5432/app"
    );
}

#[test]
fn test_substitute_custom_separator() {
    let table = vars(&[
        (KEY_ENABLE_DEFAULT_VALUE, "true"),
        (KEY_DEFAULT_VALUE_SEPARATOR, "?:"),
    ]);
    // With "?:" as the separator a plain ":" is ordinary content.
    assert_eq!(substitute("${key?:fallback}", Some(&table)), "fallback");
    assert_eq!(substitute("${a:b}", Some(&table)), "${a:b}");
}

#[test]
fn test_extraction_replaces_placeholders_in_order() {
    let template = StaticTemplate::new(
        "UPDATE users SET name = #{name}, age = #{age} WHERE id = #{id}",
        None,
    )
    .unwrap();
    assert_eq!(
        template.sql(),
        "UPDATE users SET name = ?, age = ? WHERE id = ?"
    );
    let properties: Vec<_> = template
        .bindings()
        .iter()
        .map(|b| b.property.as_str())
        .collect();
    assert_eq!(properties, vec!["name", "age", "id"]);
}

#[test]
fn test_extraction_parses_attributes() {
    let template =
        StaticTemplate::new("CALL count_users(#{region,mode=IN}, #{total,mode=OUT,type=INTEGER})", None)
            .unwrap();
    assert_eq!(template.sql(), "CALL count_users(?, ?)");
    assert_eq!(template.bindings()[0].mode, ParameterMode::In);
    assert_eq!(template.bindings()[1].mode, ParameterMode::Out);
    assert_eq!(template.bindings()[1].data_type, Some(DataType::Integer));
}

#[test]
fn test_extraction_rejects_unknown_attribute() {
    let err = StaticTemplate::new("SELECT #{id,javaType=long}", None).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("javaType"));
    assert!(message.contains("mode, type, jdbcType, template"));
}

#[test]
fn test_extraction_rejects_expressions_and_empty_spans() {
    assert!(StaticTemplate::new("SELECT #{(id + 1)}", None).is_err());
    assert!(StaticTemplate::new("SELECT #{}", None).is_err());
    assert!(StaticTemplate::new("SELECT #{ }", None).is_err());
}

#[test]
fn test_escaped_placeholder_survives_extraction() {
    let template = StaticTemplate::new(r"SELECT '\#{literal}' FROM dual", None).unwrap();
    assert_eq!(template.sql(), "SELECT '#{literal}' FROM dual");
    assert!(template.bindings().is_empty());
}

#[test]
fn test_substitute_then_extract_pipeline() {
    // Registration order: variables first, then placeholder extraction.
    let table = vars(&[("table", "users")]);
    let substituted = substitute("SELECT * FROM ${table} WHERE id = #{id}", Some(&table));
    let template = StaticTemplate::new(&substituted, None).unwrap();
    assert_eq!(template.sql(), "SELECT * FROM users WHERE id = ?");
    assert_eq!(template.bindings()[0].property, "id");
}
