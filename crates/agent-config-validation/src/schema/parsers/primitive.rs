//! Primitive type schema parsers
//!
//! - any: no type restriction, optional enum
//! - boolean
//! - number / integer: inclusive minimum and maximum
//! - string: length limits, anchored pattern, named format

use agent_config_doc::ConfigNode;
use serde_json::Value;

use crate::error::{CompileError, CompileResult, SchemaPath};
use crate::schema::SchemaNode;
use crate::schema::helpers::{get_number, get_string, get_string_array, get_usize};
use crate::schema::types::{
    AnySchema, BooleanSchema, Format, NumberSchema, Pattern, SchemaAnnotations, StringSchema,
};

pub(in crate::schema) fn parse_any_schema(
    annotations: SchemaAnnotations,
    enum_values: Option<Vec<Value>>,
) -> SchemaNode {
    SchemaNode::Any(AnySchema {
        annotations,
        enum_values,
    })
}

pub(in crate::schema) fn parse_boolean_schema(
    annotations: SchemaAnnotations,
    enum_values: Option<Vec<Value>>,
) -> SchemaNode {
    SchemaNode::Boolean(BooleanSchema {
        annotations,
        enum_values,
    })
}

/// Parse a number schema
///
/// ```json
/// {"type": "integer", "minimum": 1, "maximum": 64}
/// ```
pub(in crate::schema) fn parse_number_schema(
    node: &ConfigNode,
    path: &SchemaPath,
    annotations: SchemaAnnotations,
    enum_values: Option<Vec<Value>>,
    integer: bool,
) -> CompileResult<SchemaNode> {
    Ok(SchemaNode::Number(NumberSchema {
        annotations,
        integer,
        minimum: get_number(node, "minimum", path)?,
        maximum: get_number(node, "maximum", path)?,
        enum_values,
    }))
}

/// Parse a string schema
///
/// ```json
/// {"type": "string", "format": "uri", "schemes": ["http", "https"]}
/// ```
pub(in crate::schema) fn parse_string_schema(
    node: &ConfigNode,
    path: &SchemaPath,
    annotations: SchemaAnnotations,
    enum_values: Option<Vec<Value>>,
) -> CompileResult<SchemaNode> {
    let pattern = match get_string(node, "pattern", path)? {
        Some(source) => Some(Pattern::new(source.as_str()).map_err(|e| {
            CompileError::InvalidPattern {
                path: path.clone(),
                pattern: source.clone(),
                message: e.to_string(),
            }
        })?),
        None => None,
    };

    let format = match get_string(node, "format", path)? {
        Some(name) => Some(Format::from_name(&name).ok_or_else(|| {
            CompileError::invalid(path, format!("unknown format '{}'", name))
        })?),
        None => None,
    };

    let schemes = get_string_array(node, "schemes", path)?;
    if schemes.is_some() && format != Some(Format::Uri) {
        return Err(CompileError::invalid(
            path,
            "'schemes' requires format 'uri'",
        ));
    }

    Ok(SchemaNode::String(StringSchema {
        annotations,
        min_length: get_usize(node, "minLength", path)?,
        max_length: get_usize(node, "maxLength", path)?,
        pattern,
        format,
        schemes,
        enum_values,
    }))
}

#[cfg(test)]
mod tests {
    use crate::error::CompileError;
    use crate::schema::SchemaNode;
    use serde_json::json;

    #[test]
    fn test_pattern_is_anchored() {
        let node = SchemaNode::from_json(&json!({"pattern": "[0-9]+(ms|s|m|h)"})).unwrap();
        let SchemaNode::String(s) = node else {
            panic!("expected string schema");
        };
        let pattern = s.pattern.unwrap();
        assert_eq!(pattern.as_str(), "[0-9]+(ms|s|m|h)");
        assert!(pattern.is_match("250ms"));
        assert!(!pattern.is_match("x250ms"));
        assert!(!pattern.is_match("250msx"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = SchemaNode::from_json(&json!({"pattern": "[unclosed"})).unwrap_err();
        match err {
            CompileError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "[unclosed"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unknown_format() {
        assert!(SchemaNode::from_json(&json!({"format": "hostname"})).is_err());
    }

    #[test]
    fn test_schemes_require_uri_format() {
        assert!(SchemaNode::from_json(&json!({"format": "uri", "schemes": ["http"]})).is_ok());
        assert!(SchemaNode::from_json(&json!({"format": "email", "schemes": ["http"]})).is_err());
    }

    #[test]
    fn test_negative_length_rejected() {
        assert!(SchemaNode::from_json(&json!({"minLength": -1})).is_err());
    }
}
