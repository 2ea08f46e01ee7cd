use argot_parse::{
    Coercion, ErrorKind, ParseError, ParseOptions, RawOptionDefinition, parse, split_command,
};
use serde_json::{Value, json};

fn argv(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn strict() -> ParseOptions {
    ParseOptions::default()
}

fn partial() -> ParseOptions {
    ParseOptions {
        partial: true,
        ..Default::default()
    }
}

#[test]
fn boolean_flag_scenario() {
    let defs = [RawOptionDefinition::new("one").flag()];
    let result = parse(&defs, &argv(&["--one"]), &strict()).unwrap();
    assert_eq!(result.to_json(), json!({ "one": true }));
    assert!(result.unknown().is_empty());
}

#[test]
fn lazy_multiple_with_equals_scenario() {
    let defs = [RawOptionDefinition::new("one").lazy_multiple()];
    let result = parse(&defs, &argv(&["--one=1", "--one=2"]), &strict()).unwrap();
    assert_eq!(result.to_json(), json!({ "one": ["1", "2"] }));
}

#[test]
fn reparsing_identical_input_is_idempotent() {
    let defs = [
        RawOptionDefinition::new("files").multiple().default_option(),
        RawOptionDefinition::new("tag").lazy_multiple().default_value(json!(["x"])),
        RawOptionDefinition::new("level").number().default_value(1),
    ];
    let args = argv(&["a", "b", "--tag", "t1", "--level", "3", "--tag", "t2", "--what"]);
    let first = parse(&defs, &args, &partial()).unwrap();
    let second = parse(&defs, &args, &partial()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.to_json(),
        json!({
            "files": ["a", "b"],
            "tag": ["t1", "t2"],
            "level": 3,
            "_unknown": ["--what"],
        })
    );
}

#[test]
fn singular_option_twice_is_already_set() {
    let defs = [RawOptionDefinition::new("one").alias("o")];
    assert!(parse(&defs, &argv(&["--one", "a"]), &strict()).is_ok());

    for args in [
        &["--one", "a", "--one", "b"][..],
        &["-o", "a", "--one=b"][..],
        &["--one=a", "-o", "b"][..],
    ] {
        let err = parse(&defs, &argv(args), &strict()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadySet, "{args:?}");
    }
}

#[test]
fn untouched_default_is_preserved() {
    let defs = [
        RawOptionDefinition::new("cheese").default_value("mozzarella"),
        RawOptionDefinition::new("other"),
    ];
    let result = parse(&defs, &[], &strict()).unwrap();
    assert_eq!(result.to_json(), json!({ "cheese": "mozzarella" }));
}

#[test]
fn greedy_multiple_replaces_default() {
    let defs = [RawOptionDefinition::new("opt")
        .number()
        .multiple()
        .default_value(json!([1]))];
    let result = parse(&defs, &argv(&["--opt", "2", "3"]), &strict()).unwrap();
    assert_eq!(result.get("opt"), Some(&json!([2, 3])));
}

#[test]
fn unknown_bucket_keeps_order() {
    let defs = [RawOptionDefinition::new("known").flag()];
    let result = parse(
        &defs,
        &argv(&["z", "--known", "--b", "a", "-c"]),
        &partial(),
    )
    .unwrap();
    assert_eq!(result.unknown(), &argv(&["z", "--b", "a", "-c"])[..]);
    assert_eq!(result.get("known"), Some(&json!(true)));
}

#[test]
fn repeated_multiple_flag_accumulates_true() {
    let defs = [RawOptionDefinition::new("flag").alias("f").flag().multiple()];
    let result = parse(&defs, &argv(&["--flag", "-f", "--flag"]), &strict()).unwrap();
    assert_eq!(result.get("flag"), Some(&json!([true, true, true])));
}

#[test]
fn grouped_definition_appears_under_all_and_group() {
    let defs = [
        RawOptionDefinition::new("host").group("db"),
        RawOptionDefinition::new("verbose").flag(),
    ];
    let result = parse(&defs, &argv(&["--host", "localhost"]), &strict()).unwrap();
    assert!(result.is_grouped());
    let all = result.group("_all").unwrap();
    let db = result.group("db").unwrap();
    assert_eq!(all.get("host"), db.get("host"));
    assert_eq!(db.get("host"), Some(&json!("localhost")));
    assert!(result.group("_none").is_none());
}

#[test]
fn strict_mode_rejects_unknown_option_and_value() {
    let defs = [RawOptionDefinition::new("one")];
    assert_eq!(
        parse(&defs, &argv(&["--two"]), &strict()).unwrap_err(),
        ParseError::UnknownOption {
            option: "--two".to_string()
        }
    );
    assert_eq!(
        parse(&defs, &argv(&["--one", "a", "b"]), &strict()).unwrap_err(),
        ParseError::UnknownValue {
            value: "b".to_string()
        }
    );
}

#[test]
fn invalid_definitions_fail_before_scanning() {
    let defs = [
        RawOptionDefinition::new("a").default_option(),
        RawOptionDefinition::new("b").default_option(),
    ];
    let err = parse(&defs, &argv(&["--not-even-scanned"]), &strict()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDefinitions);
}

#[test]
fn negative_numbers_are_values() {
    let defs = [RawOptionDefinition::new("offset").number()];
    let result = parse(&defs, &argv(&["--offset", "-5"]), &strict()).unwrap();
    assert_eq!(result.get("offset"), Some(&json!(-5)));
}

#[test]
fn option_without_value_is_null() {
    let defs = [RawOptionDefinition::new("output").default_value("out")];
    let result = parse(&defs, &argv(&["--output"]), &strict()).unwrap();
    assert_eq!(result.get("output"), Some(&Value::Null));
}

#[test]
fn camel_case_and_case_insensitive() {
    let defs = [
        RawOptionDefinition::new("output-dir").alias("o"),
        RawOptionDefinition::new("dry-run").flag(),
    ];
    let options = ParseOptions {
        camel_case: true,
        case_insensitive: true,
        ..Default::default()
    };
    let result = parse(&defs, &argv(&["-O", "dist", "--DRY-RUN"]), &options).unwrap();
    assert_eq!(
        result.to_json(),
        json!({ "outputDir": "dist", "dryRun": true })
    );
}

#[test]
fn stop_at_first_unknown_passes_rest_through() {
    let defs = [RawOptionDefinition::new("verbose").alias("v").flag()];
    let options = ParseOptions {
        stop_at_first_unknown: true,
        ..Default::default()
    };
    let result = parse(&defs, &argv(&["-v", "run", "-v", "--x=1"]), &options).unwrap();
    assert_eq!(result.get("verbose"), Some(&json!(true)));
    assert_eq!(result.unknown(), &argv(&["run", "-v", "--x=1"])[..]);
}

#[test]
fn stop_at_first_unknown_after_value_on_flag() {
    let defs = [
        RawOptionDefinition::new("one").flag(),
        RawOptionDefinition::new("two").flag(),
    ];
    let options = ParseOptions {
        stop_at_first_unknown: true,
        ..Default::default()
    };
    let result = parse(&defs, &argv(&["--one=x", "--two"]), &options).unwrap();
    assert_eq!(
        result.to_json(),
        json!({ "one": true, "_unknown": ["--one=x", "--two"] })
    );
    assert_eq!(result.get("two"), None);
}

#[test]
fn camel_case_key_collision_is_rejected() {
    let defs = [
        RawOptionDefinition::new("dry-run"),
        RawOptionDefinition::new("dry_run"),
    ];
    let args = argv(&["--dry-run", "a", "--dry_run", "b"]);
    let flat = parse(&defs, &args, &strict()).unwrap();
    assert_eq!(flat.get("dry-run"), Some(&json!("a")));
    assert_eq!(flat.get("dry_run"), Some(&json!("b")));

    let options = ParseOptions {
        camel_case: true,
        ..Default::default()
    };
    let err = parse(&defs, &args, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDefinitions);
    assert!(err.to_string().contains("dryRun"), "{err}");
}

#[test]
fn custom_coercion_is_applied() {
    let upper = Coercion::custom("upper", |raw| Ok(Value::String(raw.to_uppercase())));
    let defs = [RawOptionDefinition::new("name").coerce(upper)];
    let result = parse(&defs, &argv(&["--name", "argot"]), &strict()).unwrap();
    assert_eq!(result.get("name"), Some(&json!("ARGOT")));

    let failing = Coercion::custom("port", |raw| {
        raw.parse::<u16>()
            .map(Value::from)
            .map_err(|e| e.to_string())
    });
    let defs = [RawOptionDefinition::new("port").coerce(failing)];
    let err = parse(&defs, &argv(&["--port", "99999"]), &strict()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[test]
fn split_then_parse() {
    let split = split_command(
        &[Some("eat"), Some("sleep")],
        &argv(&["eat", "--food", "peas"]),
    )
    .unwrap();
    assert_eq!(split.command.as_deref(), Some("eat"));

    let defs = [RawOptionDefinition::new("food")];
    let result = parse(&defs, &split.argv, &strict()).unwrap();
    assert_eq!(result.get("food"), Some(&json!("peas")));
}
