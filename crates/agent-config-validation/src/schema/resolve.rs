// Definition registry and `$ref` resolution
//
// References are replaced by a copy of their target, so a compiled tree never
// contains `SchemaNode::Ref`.
//
// Definitions are parsed once, as closed schemas, whatever the context of the
// reference. A definition meant to stand in for a whole `if`/`then` fragment
// must say `"additionalProperties": true` itself.

use std::collections::HashMap;

use agent_config_doc::{ConfigNode, ConfigValue};
use indexmap::IndexMap;

use crate::error::{CompileError, CompileResult, SchemaPath};

use super::SchemaNode;
use super::parser::parse_schema;
use super::parsers::check_variant;
use super::types::ArrayItems;

const DEFINITIONS: &str = "definitions";
const DEFINITION_PREFIX: &str = "#/definitions/";

/// Parse a schema document, including its root-level `definitions`, and
/// resolve every reference.
pub(super) fn compile_document(doc: &ConfigNode) -> CompileResult<SchemaNode> {
    let root_path = SchemaPath::new();
    let (body, definitions) = split_definitions(doc, &root_path)?;

    let mut resolver = Resolver::new(definitions)?;
    // Every definition is resolved, referenced or not
    let names: Vec<String> = resolver.definitions.keys().cloned().collect();
    for name in names {
        resolver.resolve_reference(&format!("{}{}", DEFINITION_PREFIX, name))?;
    }
    tracing::debug!(
        definitions = resolver.definitions.len(),
        "resolved schema definitions"
    );

    let mut root = parse_schema(&body, &root_path, false)?;
    resolver.resolve(&mut root, &root_path)?;
    Ok(root)
}

/// Separate the root `definitions` block from the root schema body.
fn split_definitions(
    doc: &ConfigNode,
    path: &SchemaPath,
) -> CompileResult<(ConfigNode, IndexMap<String, SchemaNode>)> {
    let Some(entries) = doc.as_object() else {
        return Err(CompileError::invalid(
            path,
            format!("schema must be an object, got {}", doc.type_name()),
        ));
    };

    let mut definitions = IndexMap::new();
    if let Some(block) = doc.get(DEFINITIONS) {
        let defs = block
            .as_object()
            .ok_or_else(|| CompileError::invalid(path, "'definitions' must be an object"))?;
        for entry in defs {
            let def_path = path.join([DEFINITIONS, entry.key.as_str()]);
            let schema = parse_schema(&entry.value, &def_path, false)?;
            definitions.insert(entry.key.clone(), schema);
        }
    }

    let body = ConfigNode::new(
        ConfigValue::Object(
            entries
                .iter()
                .filter(|entry| entry.key != DEFINITIONS)
                .cloned()
                .collect(),
        ),
        doc.source_info.clone(),
    );
    Ok((body, definitions))
}

struct Resolver {
    definitions: IndexMap<String, SchemaNode>,
    /// `$id` of a definition (e.g. `#duration`) to its name
    ids: HashMap<String, String>,
    resolved: HashMap<String, SchemaNode>,
    in_progress: Vec<String>,
}

impl Resolver {
    fn new(definitions: IndexMap<String, SchemaNode>) -> CompileResult<Self> {
        let mut ids = HashMap::new();
        for (name, schema) in &definitions {
            if let Some(id) = &schema.annotations().id
                && ids.insert(id.clone(), name.clone()).is_some()
            {
                return Err(CompileError::invalid(
                    &SchemaPath::new().join([DEFINITIONS, name.as_str()]),
                    format!("duplicate $id '{}'", id),
                ));
            }
        }
        Ok(Self {
            definitions,
            ids,
            resolved: HashMap::new(),
            in_progress: Vec::new(),
        })
    }

    /// Map `#/definitions/<name>` or `#<id>` to a definition name
    fn definition_name(&self, reference: &str) -> Option<String> {
        if let Some(name) = reference.strip_prefix(DEFINITION_PREFIX) {
            return self.definitions.contains_key(name).then(|| name.to_string());
        }
        self.ids.get(reference).cloned()
    }

    fn resolve_reference(&mut self, reference: &str) -> CompileResult<SchemaNode> {
        let name = self
            .definition_name(reference)
            .ok_or_else(|| CompileError::UnresolvedRef {
                reference: reference.to_string(),
            })?;

        if let Some(done) = self.resolved.get(&name) {
            return Ok(done.clone());
        }
        if self.in_progress.contains(&name) {
            return Err(CompileError::CircularRef {
                reference: reference.to_string(),
            });
        }

        let Some(mut schema) = self.definitions.get(&name).cloned() else {
            return Err(CompileError::UnresolvedRef {
                reference: reference.to_string(),
            });
        };
        self.in_progress.push(name.clone());
        let path = SchemaPath::new().join([DEFINITIONS, name.as_str()]);
        let result = self.resolve(&mut schema, &path);
        self.in_progress.pop();
        result?;

        tracing::trace!(reference, "resolved schema reference");
        self.resolved.insert(name, schema.clone());
        Ok(schema)
    }

    fn resolve(&mut self, node: &mut SchemaNode, path: &SchemaPath) -> CompileResult<()> {
        match node {
            SchemaNode::Ref(reference) => {
                let description = reference.annotations.description.clone();
                let target = reference.reference.clone();
                let mut resolved = self.resolve_reference(&target)?;
                if description.is_some() {
                    resolved.annotations_mut().description = description;
                }
                *node = resolved;
            }
            SchemaNode::Array(array) => match &mut array.items {
                Some(ArrayItems::Uniform(items)) => self.resolve(items, &path.join(["items"]))?,
                Some(ArrayItems::Positional(items)) => {
                    for (i, item) in items.iter_mut().enumerate() {
                        self.resolve(item, &path.join([format!("items[{}]", i)]))?;
                    }
                }
                None => {}
            },
            SchemaNode::Object(object) => {
                for (name, property) in object.properties.iter_mut() {
                    self.resolve(property, &path.join(["properties", name.as_str()]))?;
                }
                if let Some(condition) = object.condition.as_mut() {
                    self.resolve(&mut condition.if_node, &path.join(["if"]))?;
                    self.resolve(&mut condition.then_node, &path.join(["then"]))?;
                }
                for (i, variant) in object.variants.iter_mut().enumerate() {
                    let variant_path = path.join([format!("anyOf[{}]", i)]);
                    self.resolve(variant, &variant_path)?;
                    check_variant(variant, &variant_path)?;
                }
            }
            SchemaNode::Any(_)
            | SchemaNode::Boolean(_)
            | SchemaNode::Number(_)
            | SchemaNode::String(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate;
    use serde_json::json;

    fn compile(value: serde_json::Value) -> CompileResult<SchemaNode> {
        compile_document(&ConfigNode::from_json(&value))
    }

    fn contains_ref(node: &SchemaNode) -> bool {
        match node {
            SchemaNode::Ref(_) => true,
            SchemaNode::Array(array) => match &array.items {
                Some(ArrayItems::Uniform(items)) => contains_ref(items),
                Some(ArrayItems::Positional(items)) => items.iter().any(contains_ref),
                None => false,
            },
            SchemaNode::Object(object) => {
                object.properties.values().any(contains_ref)
                    || object.variants.iter().any(contains_ref)
                    || object
                        .condition
                        .as_ref()
                        .is_some_and(|c| contains_ref(&c.if_node) || contains_ref(&c.then_node))
            }
            _ => false,
        }
    }

    #[test]
    fn test_refs_by_path_and_id() {
        let root = compile(json!({
            "definitions": {
                "duration": {"$id": "#duration", "type": "string", "pattern": "[0-9]+(ms|s|m|h)"}
            },
            "properties": {
                "flush-period": {"$ref": "#/definitions/duration"},
                "timeout": {"$ref": "#duration", "description": "request timeout"}
            }
        }))
        .unwrap();

        assert!(!contains_ref(&root));
        let timeout = root.property("timeout").unwrap();
        assert!(matches!(timeout, SchemaNode::String(_)));
        assert_eq!(
            timeout.annotations().description.as_deref(),
            Some("request timeout")
        );
    }

    #[test]
    fn test_nested_references_resolve() {
        let root = compile(json!({
            "definitions": {
                "url": {"type": "string", "format": "uri"},
                "servers": {"type": "array", "items": {"$ref": "#/definitions/url"}}
            },
            "properties": {"servers": {"$ref": "#/definitions/servers"}}
        }))
        .unwrap();
        assert!(!contains_ref(&root));
    }

    #[test]
    fn test_unresolved_reference() {
        let err = compile(json!({"properties": {"a": {"$ref": "#/definitions/missing"}}}))
            .unwrap_err();
        match err {
            CompileError::UnresolvedRef { reference } => {
                assert_eq!(reference, "#/definitions/missing")
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unreferenced_definition_is_still_checked() {
        let err = compile(json!({
            "definitions": {"orphan": {"items": {"$ref": "#nowhere"}}},
            "properties": {}
        }))
        .unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedRef { .. }));
    }

    #[test]
    fn test_referenced_then_fragment_stays_closed() {
        let schema = |definition: serde_json::Value| {
            compile(json!({
                "definitions": {"needs-url": definition},
                "properties": {"enabled": {"type": "boolean"}, "url": {"type": "string"}},
                "if": {"properties": {"enabled": {"const": true}}, "required": ["enabled"]},
                "then": {"$ref": "#/definitions/needs-url"}
            }))
            .unwrap()
        };
        let doc = ConfigNode::from_json(&json!({"enabled": true, "url": "http://x"}));

        let closed = validate(&doc, &schema(json!({"required": ["url"]})));
        let unknown: Vec<String> = closed
            .sorted()
            .iter()
            .map(|e| e.instance_path.to_string())
            .collect();
        assert_eq!(unknown, vec!["enabled", "url"]);

        let open = schema(json!({"required": ["url"], "additionalProperties": true}));
        assert!(validate(&doc, &open).is_valid());
    }

    #[test]
    fn test_circular_reference() {
        let err = compile(json!({
            "definitions": {
                "a": {"properties": {"b": {"$ref": "#/definitions/b"}}},
                "b": {"properties": {"a": {"$ref": "#/definitions/a"}}}
            },
            "properties": {"root": {"$ref": "#/definitions/a"}}
        }))
        .unwrap_err();
        assert!(matches!(err, CompileError::CircularRef { .. }));
    }

    #[test]
    fn test_definitions_only_at_root() {
        let err = compile(json!({
            "properties": {"a": {"definitions": {}}}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unknown keyword 'definitions'"));
    }

    #[test]
    fn test_variant_reference_must_be_object() {
        let err = compile(json!({
            "definitions": {"name": {"type": "string"}},
            "anyOf": [{"$ref": "#/definitions/name"}]
        }))
        .unwrap_err();
        assert!(matches!(err, CompileError::InvalidSchema { .. }));
    }
}
