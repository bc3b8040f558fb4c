//! Object schema parser
//!
//! Objects can have:
//! - properties: named property schemas, in declaration order
//! - additionalProperties: boolean only; objects are closed unless it is true
//!   (or the object sits inside an `if`/`then` branch)
//! - required: list of property names
//! - if/then: a conditional requirement, both or neither
//! - anyOf: a group of object variants sharing this object's key space

use agent_config_doc::ConfigNode;
use indexmap::IndexMap;

use crate::error::{CompileError, CompileResult, SchemaPath};
use crate::schema::SchemaNode;
use crate::schema::helpers::{get_bool, get_string_array};
use crate::schema::parser::parse_schema;
use crate::schema::types::{Condition, ObjectSchema, SchemaAnnotations};

/// Parse an object schema
///
/// ```json
/// {
///   "type": "object",
///   "properties": {"enabled": {"type": "boolean"}, "url": {"type": "string"}},
///   "if": {"properties": {"enabled": {"const": true}}, "required": ["enabled"]},
///   "then": {"required": ["url"]}
/// }
/// ```
pub(in crate::schema) fn parse_object_schema(
    node: &ConfigNode,
    path: &SchemaPath,
    annotations: SchemaAnnotations,
    fragment: bool,
) -> CompileResult<SchemaNode> {
    let mut properties = IndexMap::new();
    if let Some(props) = node.get("properties") {
        let entries = props
            .as_object()
            .ok_or_else(|| CompileError::invalid(path, "'properties' must be an object"))?;
        for entry in entries {
            let child = path.join(["properties", entry.key.as_str()]);
            let schema = parse_schema(&entry.value, &child, fragment)?;
            if properties.insert(entry.key.clone(), schema).is_some() {
                return Err(CompileError::invalid(
                    path,
                    format!("property '{}' is declared twice", entry.key),
                ));
            }
        }
    }

    let additional_properties = get_bool(node, "additionalProperties", path)?.unwrap_or(fragment);
    let required = get_string_array(node, "required", path)?.unwrap_or_default();

    let condition = match (node.get("if"), node.get("then")) {
        (Some(if_node), Some(then_node)) => Some(Box::new(Condition {
            if_node: parse_schema(if_node, &path.join(["if"]), true)?,
            then_node: parse_schema(then_node, &path.join(["then"]), true)?,
        })),
        (Some(_), None) => {
            return Err(CompileError::invalid(path, "'if' requires a matching 'then'"));
        }
        (None, Some(_)) => {
            return Err(CompileError::invalid(path, "'then' requires a matching 'if'"));
        }
        (None, None) => None,
    };

    let variants = match node.get("anyOf") {
        None => Vec::new(),
        Some(group) => {
            let items = group
                .as_array()
                .filter(|items| !items.is_empty())
                .ok_or_else(|| {
                    CompileError::invalid(path, "'anyOf' must be a non-empty array of schemas")
                })?;
            let variants = items
                .iter()
                .enumerate()
                .map(|(i, item)| parse_schema(item, &path.join([format!("anyOf[{}]", i)]), fragment))
                .collect::<CompileResult<Vec<_>>>()?;
            // References are checked once resolved
            for (i, variant) in variants.iter().enumerate() {
                check_variant(variant, &path.join([format!("anyOf[{}]", i)]))?;
            }
            variants
        }
    };

    Ok(SchemaNode::Object(ObjectSchema {
        annotations,
        properties,
        additional_properties,
        required,
        condition,
        variants,
    }))
}

/// A variant must be a plain object schema without a nested variant group.
pub(in crate::schema) fn check_variant(variant: &SchemaNode, path: &SchemaPath) -> CompileResult<()> {
    match variant {
        SchemaNode::Ref(_) => Ok(()),
        SchemaNode::Object(object) if object.variants.is_empty() => Ok(()),
        SchemaNode::Object(_) => Err(CompileError::invalid(
            path,
            "variant groups cannot be nested",
        )),
        other => Err(CompileError::invalid(
            path,
            format!("'anyOf' variants must be object schemas, got {}", other.type_name()),
        )),
    }
}
