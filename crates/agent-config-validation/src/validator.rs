// Configuration validation engine
//
// Validation never stops at the first violation: every node is checked and
// every error is collected. A type mismatch ends the checks for that node
// only; siblings and the rest of the tree are still visited.

use agent_config_doc::{ConfigEntry, ConfigNode, ConfigValue, SourceInfo};
use serde_json::Value;

use crate::error::{
    InstancePath, LengthUnit, PathSegment, SchemaPath, ValidationError, ValidationErrorKind,
};
use crate::report::ValidationOutcome;
use crate::schema::{
    AnySchema, ArrayItems, ArraySchema, BooleanSchema, Condition, NumberSchema, ObjectSchema,
    SchemaNode, StringSchema,
};

/// Validates a document against a schema, collecting every violation
pub fn validate(value: &ConfigNode, schema: &SchemaNode) -> ValidationOutcome {
    let mut context = ValidationContext::new();
    validate_node(value, schema, &mut context);
    ValidationOutcome::new(context.into_errors())
}

/// Validation context tracks state during validation
#[derive(Debug, Default)]
pub struct ValidationContext {
    /// Current instance path (e.g., ["output", "elasticsearch", "servers", 0])
    instance_path: InstancePath,
    /// Current schema path (e.g., ["properties", "output"])
    schema_path: SchemaPath,
    /// Collected validation errors
    errors: Vec<ValidationError>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error at the current paths.
    ///
    /// A violation already recorded at the same instance path is not added
    /// again, so a property checked by both its base schema and a `then`
    /// branch is reported once.
    pub fn add_error(&mut self, kind: ValidationErrorKind, location: &SourceInfo) {
        if self
            .errors
            .iter()
            .any(|e| e.instance_path == self.instance_path && e.kind == kind)
        {
            return;
        }
        let error = ValidationError::new(kind, self.instance_path.clone())
            .with_schema_path(self.schema_path.clone())
            .with_location(location);
        self.errors.push(error);
    }

    /// Execute a function with a new instance path segment
    pub fn with_instance_path<F, R>(&mut self, segment: PathSegment, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.instance_path.push(segment);
        let result = f(self);
        self.instance_path.pop();
        result
    }

    /// Execute a function with a new schema path segment
    pub fn with_schema_path<F, R>(&mut self, segment: impl Into<String>, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.schema_path.push(segment);
        let result = f(self);
        self.schema_path.pop();
        result
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

/// Validate one node, appending violations to the context
pub fn validate_node(value: &ConfigNode, schema: &SchemaNode, context: &mut ValidationContext) {
    match schema {
        SchemaNode::Any(s) => validate_any(value, s, context),
        SchemaNode::Boolean(s) => validate_boolean(value, s, context),
        SchemaNode::Number(s) => validate_number(value, s, context),
        SchemaNode::String(s) => validate_string(value, s, context),
        SchemaNode::Array(s) => validate_array(value, s, context),
        SchemaNode::Object(s) => validate_object(value, s, context),
        SchemaNode::Ref(r) => {
            tracing::warn!(reference = %r.reference, "unresolved schema reference reached validation");
            context.add_error(
                ValidationErrorKind::UnresolvedRef {
                    reference: r.reference.clone(),
                },
                &value.source_info,
            );
        }
    }
}

fn type_mismatch(value: &ConfigNode, expected: &str, context: &mut ValidationContext) {
    context.add_error(
        ValidationErrorKind::TypeMismatch {
            expected: expected.to_string(),
            got: value.type_name().to_string(),
        },
        &value.source_info,
    );
}

fn validate_any(value: &ConfigNode, schema: &AnySchema, context: &mut ValidationContext) {
    check_enum(value, schema.enum_values.as_deref(), context);
}

fn validate_boolean(value: &ConfigNode, schema: &BooleanSchema, context: &mut ValidationContext) {
    if value.as_bool().is_none() {
        type_mismatch(value, "boolean", context);
        return;
    }
    check_enum(value, schema.enum_values.as_deref(), context);
}

/// Validate a number value
fn validate_number(value: &ConfigNode, schema: &NumberSchema, context: &mut ValidationContext) {
    let expected = if schema.integer { "integer" } else { "number" };
    let num = match &value.value {
        ConfigValue::Integer(n) => *n as f64,
        ConfigValue::Float(f) => *f,
        _ => {
            type_mismatch(value, expected, context);
            return;
        }
    };

    if schema.integer && num.fract() != 0.0 {
        type_mismatch(value, expected, context);
        return;
    }

    // Bounds are inclusive
    if let Some(min) = schema.minimum
        && num < min
    {
        context.add_error(
            ValidationErrorKind::RangeViolation {
                value: num,
                minimum: Some(min),
                maximum: None,
            },
            &value.source_info,
        );
    }
    if let Some(max) = schema.maximum
        && num > max
    {
        context.add_error(
            ValidationErrorKind::RangeViolation {
                value: num,
                minimum: None,
                maximum: Some(max),
            },
            &value.source_info,
        );
    }

    check_enum(value, schema.enum_values.as_deref(), context);
}

/// Validate a string value
fn validate_string(value: &ConfigNode, schema: &StringSchema, context: &mut ValidationContext) {
    let Some(s) = value.as_str() else {
        type_mismatch(value, "string", context);
        return;
    };

    let length = s.chars().count();
    if let Some(min) = schema.min_length
        && length < min
    {
        context.add_error(
            ValidationErrorKind::TooShort {
                length,
                min,
                unit: LengthUnit::Characters,
            },
            &value.source_info,
        );
    }
    if let Some(max) = schema.max_length
        && length > max
    {
        context.add_error(
            ValidationErrorKind::TooLong {
                length,
                max,
                unit: LengthUnit::Characters,
            },
            &value.source_info,
        );
    }

    if let Some(pattern) = &schema.pattern
        && !pattern.is_match(s)
    {
        context.add_error(
            ValidationErrorKind::PatternMismatch {
                value: s.to_string(),
                pattern: pattern.as_str().to_string(),
            },
            &value.source_info,
        );
    }

    if let Some(format) = schema.format
        && !format.matches(s, schema.schemes.as_deref())
    {
        context.add_error(
            ValidationErrorKind::FormatMismatch {
                value: s.to_string(),
                format: format.name().to_string(),
            },
            &value.source_info,
        );
    }

    check_enum(value, schema.enum_values.as_deref(), context);
}

/// Validate an array value
fn validate_array(value: &ConfigNode, schema: &ArraySchema, context: &mut ValidationContext) {
    let Some(items) = value.as_array() else {
        type_mismatch(value, "array", context);
        return;
    };

    if let Some(min) = schema.min_items
        && items.len() < min
    {
        context.add_error(
            ValidationErrorKind::TooShort {
                length: items.len(),
                min,
                unit: LengthUnit::Items,
            },
            &value.source_info,
        );
    }

    match &schema.items {
        Some(ArrayItems::Uniform(item_schema)) => {
            context.with_schema_path("items", |ctx| {
                for (i, item) in items.iter().enumerate() {
                    ctx.with_instance_path(PathSegment::Index(i), |ctx| {
                        validate_node(item, item_schema, ctx)
                    });
                }
            });
        }
        Some(ArrayItems::Positional(item_schemas)) => {
            // Elements beyond the listed schemas are unconstrained
            for (i, (item, item_schema)) in items.iter().zip(item_schemas).enumerate() {
                context.with_schema_path(format!("items[{}]", i), |ctx| {
                    ctx.with_instance_path(PathSegment::Index(i), |ctx| {
                        validate_node(item, item_schema, ctx)
                    })
                });
            }
        }
        None => {}
    }
}

/// Validate an object value
fn validate_object(value: &ConfigNode, schema: &ObjectSchema, context: &mut ValidationContext) {
    let Some(entries) = value.as_object() else {
        type_mismatch(value, "object", context);
        return;
    };

    // A variant is active when the document declares one of its keys
    let active: Vec<(usize, &ObjectSchema)> = schema
        .variants
        .iter()
        .enumerate()
        .filter_map(|(i, variant)| variant.as_object().map(|object| (i, object)))
        .filter(|(_, variant)| {
            entries
                .iter()
                .any(|entry| variant.properties.contains_key(&entry.key))
        })
        .collect();
    let open = schema.additional_properties
        || active
            .iter()
            .any(|(_, variant)| variant.additional_properties);

    for entry in entries {
        let mut declared = false;

        if let Some(property) = schema.properties.get(&entry.key) {
            declared = true;
            validate_property(entry, property, context);
        }
        for (i, variant) in &active {
            if let Some(property) = variant.properties.get(&entry.key) {
                declared = true;
                context.with_schema_path(format!("anyOf[{}]", i), |ctx| {
                    validate_property(entry, property, ctx)
                });
            }
        }

        if !declared && !open {
            context.with_instance_path(PathSegment::Key(entry.key.clone()), |ctx| {
                ctx.add_error(
                    ValidationErrorKind::UnknownProperty {
                        property: entry.key.clone(),
                    },
                    &entry.key_info,
                )
            });
        }
    }

    check_required(value, entries, &schema.required, context);
    for (i, variant) in &active {
        context.with_schema_path(format!("anyOf[{}]", i), |ctx| {
            check_required(value, entries, &variant.required, ctx);
            if let Some(condition) = &variant.condition {
                apply_condition(value, condition, ctx);
            }
        });
    }

    if let Some(condition) = &schema.condition {
        apply_condition(value, condition, context);
    }
}

fn validate_property(entry: &ConfigEntry, schema: &SchemaNode, context: &mut ValidationContext) {
    context.with_schema_path("properties", |ctx| {
        ctx.with_schema_path(entry.key.as_str(), |ctx| {
            ctx.with_instance_path(PathSegment::Key(entry.key.clone()), |ctx| {
                validate_node(&entry.value, schema, ctx)
            })
        })
    });
}

fn check_required(
    value: &ConfigNode,
    entries: &[ConfigEntry],
    required: &[String],
    context: &mut ValidationContext,
) {
    if required.is_empty() {
        return;
    }
    context.with_schema_path("required", |ctx| {
        for key in required {
            if entries.iter().any(|entry| &entry.key == key) {
                continue;
            }
            ctx.with_instance_path(PathSegment::Key(key.clone()), |ctx| {
                ctx.add_error(
                    ValidationErrorKind::MissingRequired {
                        property: key.clone(),
                    },
                    &value.source_info,
                )
            });
        }
    });
}

/// Apply `then` when validating the object against `if` produces no errors.
fn apply_condition(value: &ConfigNode, condition: &Condition, context: &mut ValidationContext) {
    let mut trial = ValidationContext::new();
    validate_node(value, &condition.if_node, &mut trial);
    if trial.has_errors() {
        return;
    }
    context.with_schema_path("then", |ctx| {
        validate_node(value, &condition.then_node, ctx)
    });
}

fn check_enum(value: &ConfigNode, allowed: Option<&[Value]>, context: &mut ValidationContext) {
    let Some(allowed) = allowed else {
        return;
    };
    if allowed.iter().any(|candidate| enum_matches(value, candidate)) {
        return;
    }
    context.add_error(
        ValidationErrorKind::EnumViolation {
            value: value.to_json().to_string(),
            allowed: allowed.iter().map(Value::to_string).collect(),
        },
        &value.source_info,
    );
}

fn enum_matches(value: &ConfigNode, candidate: &Value) -> bool {
    match (&value.value, candidate) {
        (ConfigValue::Null, Value::Null) => true,
        (ConfigValue::Bool(a), Value::Bool(b)) => a == b,
        (ConfigValue::String(a), Value::String(b)) => a == b,
        (ConfigValue::Integer(_) | ConfigValue::Float(_), Value::Number(n)) => {
            value.as_f64() == n.as_f64()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RefSchema, SchemaAnnotations};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn check(schema: serde_json::Value, doc: serde_json::Value) -> Vec<ValidationError> {
        let schema = SchemaNode::from_json(&schema).unwrap();
        validate(&ConfigNode::from_json(&doc), &schema).sorted()
    }

    fn kinds(errors: &[ValidationError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.kind.name()).collect()
    }

    fn paths(errors: &[ValidationError]) -> Vec<String> {
        errors.iter().map(|e| e.instance_path.to_string()).collect()
    }

    #[test]
    fn test_validate_boolean() {
        assert!(check(json!({"type": "boolean"}), json!(true)).is_empty());
        let errors = check(json!({"type": "boolean"}), json!("yes"));
        assert_eq!(errors[0].message(), "Expected boolean, got string");
    }

    #[test]
    fn test_range_is_inclusive() {
        let schema = json!({"type": "integer", "minimum": 1, "maximum": 64});
        assert!(check(schema.clone(), json!(1)).is_empty());
        assert!(check(schema.clone(), json!(64)).is_empty());
        assert_eq!(kinds(&check(schema.clone(), json!(65))), vec!["RangeViolation"]);
        assert_eq!(kinds(&check(schema, json!(0))), vec!["RangeViolation"]);
    }

    #[test]
    fn test_integer_accepts_whole_floats() {
        let schema = json!({"type": "integer"});
        assert!(check(schema.clone(), json!(4.0)).is_empty());
        let errors = check(schema, json!(4.5));
        assert_eq!(errors[0].message(), "Expected integer, got number");
    }

    #[test]
    fn test_type_mismatch_stops_node_checks() {
        let errors = check(
            json!({"type": "integer", "minimum": 10, "enum": [10, 20]}),
            json!("ten"),
        );
        assert_eq!(kinds(&errors), vec!["TypeMismatch"]);
    }

    #[test]
    fn test_string_checks_are_all_reported() {
        let errors = check(
            json!({"type": "string", "maxLength": 3, "pattern": "[0-9]+", "enum": ["1", "22"]}),
            json!("abcd"),
        );
        assert_eq!(
            kinds(&errors),
            vec!["EnumViolation", "PatternMismatch", "TooLong"]
        );
    }

    #[test]
    fn test_length_counts_characters() {
        let schema = json!({"type": "string", "maxLength": 3});
        assert!(check(schema, json!("äöü")).is_empty());
    }

    #[test]
    fn test_enum_message() {
        let errors = check(json!({"enum": ["json", "text"]}), json!("xml"));
        assert_eq!(
            errors[0].message(),
            r#"Value must be one of: "json", "text", got "xml""#
        );
    }

    #[test]
    fn test_unknown_properties_are_collected() {
        let errors = check(
            json!({"properties": {"a": {"type": "string"}}}),
            json!({"a": "x", "b": 1, "c": 2}),
        );
        assert_eq!(kinds(&errors), vec!["UnknownProperty", "UnknownProperty"]);
        assert_eq!(paths(&errors), vec!["b", "c"]);
    }

    #[test]
    fn test_open_object_accepts_unknown_keys() {
        let errors = check(
            json!({"properties": {"a": {}}, "additionalProperties": true}),
            json!({"a": 1, "b": 2}),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_required_path_names_the_key() {
        let errors = check(
            json!({"properties": {"tls": {"properties": {"cert": {}}, "required": ["cert"]}}}),
            json!({"tls": {}}),
        );
        assert_eq!(paths(&errors), vec!["tls.cert"]);
        assert_eq!(errors[0].message(), "Missing required property 'cert'");
    }

    #[test]
    fn test_array_items() {
        let errors = check(
            json!({"type": "array", "items": {"type": "string", "format": "email"}, "minItems": 1}),
            json!(["ok@example.com", "nope", 3]),
        );
        assert_eq!(kinds(&errors), vec!["FormatMismatch", "TypeMismatch"]);
        assert_eq!(paths(&errors), vec!["[1]", "[2]"]);

        let errors = check(json!({"type": "array", "minItems": 1}), json!([]));
        assert_eq!(errors[0].message(), "Array length 0 is less than minimum 1");
    }

    #[test]
    fn test_positional_items_leave_extras_unconstrained() {
        let schema = json!({"items": [{"type": "string"}, {"type": "integer"}]});
        assert!(check(schema.clone(), json!(["a", 1, {"anything": true}])).is_empty());
        assert_eq!(paths(&check(schema, json!([1, "a"]))), vec!["[0]", "[1]"]);
    }

    #[test]
    fn test_condition() {
        let schema = json!({
            "properties": {"enabled": {"type": "boolean"}, "url": {"type": "string"}},
            "if": {"properties": {"enabled": {"const": true}}, "required": ["enabled"]},
            "then": {"required": ["url"]}
        });
        assert!(check(schema.clone(), json!({"enabled": false})).is_empty());
        assert!(check(schema.clone(), json!({})).is_empty());
        assert!(check(schema.clone(), json!({"enabled": true, "url": "x"})).is_empty());

        let errors = check(schema, json!({"enabled": true}));
        assert_eq!(kinds(&errors), vec!["MissingRequired"]);
        assert_eq!(paths(&errors), vec!["url"]);
        assert_eq!(errors[0].schema_path.to_string(), "then > required");
    }

    #[test]
    fn test_variant_group() {
        let schema = json!({
            "properties": {"enabled": {"type": "boolean"}},
            "anyOf": [
                {
                    "properties": {"rule": {"properties": {"paths": {"type": "array"}}}},
                    "required": ["rule"]
                },
                {"properties": {"alert": {"type": "string"}}}
            ]
        });

        assert!(check(schema.clone(), json!({"enabled": true})).is_empty());
        assert!(check(schema.clone(), json!({"alert": "x"})).is_empty());
        assert!(check(schema.clone(), json!({"rule": {"paths": []}, "alert": "x"})).is_empty());

        let errors = check(schema.clone(), json!({"rule": {"paths": 1}}));
        assert_eq!(paths(&errors), vec!["rule.paths"]);
        assert_eq!(
            errors[0].schema_path.to_string(),
            "anyOf[0] > properties > rule > properties > paths"
        );

        let errors = check(schema, json!({"alert": "x", "other": 1}));
        assert_eq!(kinds(&errors), vec!["UnknownProperty"]);
    }

    #[test]
    fn test_then_branch_does_not_repeat_base_violations() {
        let schema = SchemaNode::from_json(&json!({
            "properties": {"enabled": {"type": "boolean"}, "servers": {"type": "array"}},
            "if": {"properties": {"enabled": {"const": true}}, "required": ["enabled"]},
            "then": {"properties": {"servers": {"type": "array", "minItems": 1}}}
        }))
        .unwrap();
        let doc = ConfigNode::from_json(&json!({"enabled": true, "servers": "localhost"}));

        let outcome = validate(&doc, &schema);
        assert_eq!(outcome.len(), 1);
        assert_eq!(
            outcome.errors()[0].to_string(),
            "servers: Expected array, got string"
        );
    }

    #[test]
    fn test_unresolved_ref_is_a_violation() {
        let schema = SchemaNode::Ref(RefSchema {
            annotations: SchemaAnnotations::default(),
            reference: "#duration".to_string(),
        });
        let outcome = validate(&ConfigNode::string("5s"), &schema);
        assert_eq!(kinds(outcome.errors()), vec!["UnresolvedRef"]);
        assert_eq!(outcome.errors()[0].error_code(), "C-1-19");
    }

    #[test]
    fn test_siblings_are_validated_after_mismatch() {
        let errors = check(
            json!({"properties": {"a": {"type": "integer"}, "b": {"type": "integer"}}}),
            json!({"a": "x", "b": "y"}),
        );
        assert_eq!(paths(&errors), vec!["a", "b"]);
    }

    #[test]
    fn test_locations_come_from_the_document() {
        let schema = SchemaNode::from_json(&json!({
            "properties": {"logging": {"properties": {"level": {"enum": ["info", "debug"]}}}}
        }))
        .unwrap();
        let doc = agent_config_doc::parse("logging:\n  level: verbose\n  colour: true\n").unwrap();
        let errors = validate(&doc, &schema).sorted();

        assert_eq!(kinds(&errors), vec!["UnknownProperty", "EnumViolation"]);
        let unknown = errors[0].location.as_ref().unwrap();
        assert_eq!((unknown.line, unknown.col), (3, 3));
        let level = errors[1].location.as_ref().unwrap();
        assert_eq!((level.line, level.col), (2, 10));
    }
}
