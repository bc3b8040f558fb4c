//! Schema parsing entry point
//!
//! Turns a schema document (a [`ConfigNode`] tree of JSON-Schema keywords)
//! into a [`SchemaNode`] tree:
//! - parse_schema(): dispatch on the declared or inferred kind
//! - resolve_kind(): infer the kind of an untyped node from its keywords
//! - parse_enum(): `enum` and `const`
//!
//! References are kept as [`SchemaNode::Ref`] here; resolution happens in
//! the `resolve` module once every definition is known.

use agent_config_doc::ConfigNode;
use serde_json::Value;

use crate::error::{CompileError, CompileResult, SchemaPath};

use super::SchemaNode;
use super::helpers::{get_string, scalar_to_json};
use super::parsers::*;
use super::types::{RefSchema, SchemaAnnotations};

const COMMON_KEYWORDS: &[&str] = &[
    "$id",
    "$schema",
    "title",
    "description",
    "type",
    "enum",
    "const",
];
const OBJECT_KEYWORDS: &[&str] = &[
    "properties",
    "additionalProperties",
    "required",
    "if",
    "then",
    "anyOf",
];
const ARRAY_KEYWORDS: &[&str] = &["items", "minItems"];
const STRING_KEYWORDS: &[&str] = &["minLength", "maxLength", "pattern", "format", "schemes"];
const NUMBER_KEYWORDS: &[&str] = &["minimum", "maximum"];

/// Keywords allowed next to `$ref`
const REF_SIBLINGS: &[&str] = &["$ref", "description"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Kind {
    Any,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    fn from_type(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(Kind::Boolean),
            "integer" => Some(Kind::Integer),
            "number" => Some(Kind::Number),
            "string" => Some(Kind::String),
            "array" => Some(Kind::Array),
            "object" => Some(Kind::Object),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Kind::Any => "any",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }

    /// Kind a type-specific keyword belongs to
    fn of_keyword(key: &str) -> Option<Self> {
        if OBJECT_KEYWORDS.contains(&key) {
            Some(Kind::Object)
        } else if ARRAY_KEYWORDS.contains(&key) {
            Some(Kind::Array)
        } else if STRING_KEYWORDS.contains(&key) {
            Some(Kind::String)
        } else if NUMBER_KEYWORDS.contains(&key) {
            Some(Kind::Number)
        } else {
            None
        }
    }

    fn accepts(self, keyword_kind: Kind) -> bool {
        self == keyword_kind || (self == Kind::Integer && keyword_kind == Kind::Number)
    }
}

/// Parse a schema node.
///
/// `fragment` marks the subtree of an `if`/`then` branch: objects there are
/// open unless they say otherwise, since a branch only constrains the keys
/// it names.
pub(super) fn parse_schema(
    node: &ConfigNode,
    path: &SchemaPath,
    fragment: bool,
) -> CompileResult<SchemaNode> {
    if !node.is_object() {
        return Err(CompileError::invalid(
            path,
            format!("schema must be an object, got {}", node.type_name()),
        ));
    }

    if node.get("$ref").is_some() {
        return parse_ref(node, path);
    }

    for key in node.keys() {
        if !COMMON_KEYWORDS.contains(&key) && Kind::of_keyword(key).is_none() {
            return Err(CompileError::invalid(
                path,
                format!("unknown keyword '{}'", key),
            ));
        }
    }

    let kind = resolve_kind(node, path)?;
    let annotations = parse_annotations(node, path)?;
    let enum_values = parse_enum(node, path)?;

    if enum_values.is_some() && matches!(kind, Kind::Array | Kind::Object) {
        return Err(CompileError::invalid(
            path,
            format!("'enum' and 'const' do not apply to type '{}'", kind.name()),
        ));
    }

    match kind {
        Kind::Any => Ok(parse_any_schema(annotations, enum_values)),
        Kind::Boolean => Ok(parse_boolean_schema(annotations, enum_values)),
        Kind::Integer => parse_number_schema(node, path, annotations, enum_values, true),
        Kind::Number => parse_number_schema(node, path, annotations, enum_values, false),
        Kind::String => parse_string_schema(node, path, annotations, enum_values),
        Kind::Array => parse_array_schema(node, path, annotations, fragment),
        Kind::Object => parse_object_schema(node, path, annotations, fragment),
    }
}

/// Determine the kind of a node from `type`, or from its keywords when
/// `type` is absent. Keywords of different kinds on one node are rejected.
fn resolve_kind(node: &ConfigNode, path: &SchemaPath) -> CompileResult<Kind> {
    let declared = match get_string(node, "type", path)? {
        Some(name) => Some(Kind::from_type(&name).ok_or_else(|| {
            CompileError::invalid(path, format!("unknown type '{}'", name))
        })?),
        None => None,
    };

    let mut implied: Option<(Kind, &str)> = None;
    for key in node.keys() {
        let Some(keyword_kind) = Kind::of_keyword(key) else {
            continue;
        };
        if let Some(declared) = declared {
            if !declared.accepts(keyword_kind) {
                return Err(CompileError::invalid(
                    path,
                    format!("keyword '{}' does not apply to type '{}'", key, declared.name()),
                ));
            }
            continue;
        }
        match implied {
            None => implied = Some((keyword_kind, key)),
            Some((kind, first)) if kind != keyword_kind => {
                return Err(CompileError::invalid(
                    path,
                    format!(
                        "keywords '{}' and '{}' apply to different types",
                        first, key
                    ),
                ));
            }
            Some(_) => {}
        }
    }

    Ok(declared
        .or(implied.map(|(kind, _)| kind))
        .unwrap_or(Kind::Any))
}

fn parse_annotations(node: &ConfigNode, path: &SchemaPath) -> CompileResult<SchemaAnnotations> {
    // `$schema` is informational, but must still be well-formed
    get_string(node, "$schema", path)?;
    Ok(SchemaAnnotations {
        id: get_string(node, "$id", path)?,
        title: get_string(node, "title", path)?,
        description: get_string(node, "description", path)?,
    })
}

/// Parse `enum` or `const` into the list of accepted scalars
fn parse_enum(node: &ConfigNode, path: &SchemaPath) -> CompileResult<Option<Vec<Value>>> {
    match (node.get("enum"), node.get("const")) {
        (Some(_), Some(_)) => Err(CompileError::invalid(
            path,
            "'enum' and 'const' cannot be combined",
        )),
        (Some(values), None) => {
            let items = values
                .as_array()
                .ok_or_else(|| CompileError::invalid(path, "'enum' must be an array"))?;
            if items.is_empty() {
                return Err(CompileError::invalid(path, "'enum' must not be empty"));
            }
            items
                .iter()
                .map(|item| scalar_to_json(item, path))
                .collect::<CompileResult<Vec<_>>>()
                .map(Some)
        }
        (None, Some(value)) => Ok(Some(vec![scalar_to_json(value, path)?])),
        (None, None) => Ok(None),
    }
}

fn parse_ref(node: &ConfigNode, path: &SchemaPath) -> CompileResult<SchemaNode> {
    if let Some(key) = node.keys().find(|key| !REF_SIBLINGS.contains(key)) {
        return Err(CompileError::invalid(
            path,
            format!("'$ref' cannot be combined with '{}'", key),
        ));
    }
    let reference = get_string(node, "$ref", path)?.unwrap_or_default();
    Ok(SchemaNode::Ref(RefSchema {
        annotations: SchemaAnnotations {
            description: get_string(node, "description", path)?,
            ..Default::default()
        },
        reference,
    }))
}
