//! Defects in the schema template surface as compile errors, never as
//! validation results.

use agent_config_validation::{AGENT_SCHEMA_TEMPLATE, Bounds, CompileError, ConfigValidator, compile};

fn bounds() -> Bounds {
    Bounds::new(64, 512, 1_048_576)
}

#[test]
fn test_misspelled_placeholder() {
    let template = AGENT_SCHEMA_TEMPLATE.replacen("{{ .MinBuffers }}", "{{ .MinBuffer }}", 1);
    match compile(&template, &bounds()) {
        Err(CompileError::UnknownPlaceholder { name }) => assert_eq!(name, "MinBuffer"),
        other => panic!("expected unknown placeholder, got {:?}", other),
    }
}

#[test]
fn test_dangling_reference() {
    let template = AGENT_SCHEMA_TEMPLATE.replacen("#duration\"}", "#durations\"}", 1);
    match compile(&template, &bounds()) {
        Err(CompileError::UnresolvedRef { reference }) => assert_eq!(reference, "#durations"),
        other => panic!("expected unresolved reference, got {:?}", other),
    }
}

#[test]
fn test_zero_bound() {
    let err = compile(AGENT_SCHEMA_TEMPLATE, &Bounds::new(64, 0, 1)).unwrap_err();
    assert!(matches!(
        err,
        CompileError::NonPositiveBound {
            name: "max_buffers_cap"
        }
    ));
    assert!(ConfigValidator::new(Bounds::new(0, 1, 1)).is_err());
}

#[test]
fn test_unknown_keyword_in_custom_template() {
    let template = r#"{"properties": {"n": {"type": "integer", "maximun": {{ .MaxBuffers }}}}}"#;
    let err = ConfigValidator::with_template(template, bounds()).unwrap_err();
    assert!(err.to_string().contains("maximun"), "{}", err);
}
