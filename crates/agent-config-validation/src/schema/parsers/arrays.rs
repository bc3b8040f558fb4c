//! Array schema parser
//!
//! `items` is either one schema applied to every element, or an array of
//! schemas applied by position.

use agent_config_doc::ConfigNode;

use crate::error::{CompileError, CompileResult, SchemaPath};
use crate::schema::SchemaNode;
use crate::schema::helpers::get_usize;
use crate::schema::parser::parse_schema;
use crate::schema::types::{ArrayItems, ArraySchema, SchemaAnnotations};

pub(in crate::schema) fn parse_array_schema(
    node: &ConfigNode,
    path: &SchemaPath,
    annotations: SchemaAnnotations,
    fragment: bool,
) -> CompileResult<SchemaNode> {
    let items = match node.get("items") {
        None => None,
        Some(items) if items.is_object() => Some(ArrayItems::Uniform(Box::new(parse_schema(
            items,
            &path.join(["items"]),
            fragment,
        )?))),
        Some(items) => {
            let schemas = items.as_array().ok_or_else(|| {
                CompileError::invalid(path, "'items' must be a schema or an array of schemas")
            })?;
            let positional = schemas
                .iter()
                .enumerate()
                .map(|(i, item)| parse_schema(item, &path.join([format!("items[{}]", i)]), fragment))
                .collect::<CompileResult<Vec<_>>>()?;
            Some(ArrayItems::Positional(positional))
        }
    };

    Ok(SchemaNode::Array(ArraySchema {
        annotations,
        items,
        min_items: get_usize(node, "minItems", path)?,
    }))
}
