//! Schema model for configuration validation
//!
//! A schema document uses a closed subset of JSON Schema (draft-07 keyword
//! names). It is parsed into an immutable [`SchemaNode`] tree; references are
//! resolved at that point and patterns are compiled once, so validation never
//! touches the schema text again.
//!
//! Schema documents are read with `agent-config-doc`, the same YAML 1.2 / JSON
//! reader used for configuration files, so property order is kept as written.

use agent_config_doc::ConfigNode;
use serde_json::Value;

use crate::error::CompileResult;

mod format;
mod helpers;
mod parser;
mod parsers;
mod resolve;
mod types;

pub use types::{
    AnySchema, ArrayItems, ArraySchema, BooleanSchema, Condition, Format, NumberSchema,
    ObjectSchema, Pattern, RefSchema, SchemaAnnotations, StringSchema,
};

/// A node of the compiled schema tree
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Any value (optionally restricted by `enum`/`const`)
    Any(AnySchema),
    Boolean(BooleanSchema),
    /// Number or integer
    Number(NumberSchema),
    String(StringSchema),
    Array(ArraySchema),
    Object(ObjectSchema),
    /// Unresolved reference; never present after [`SchemaNode::from_document`]
    Ref(RefSchema),
}

/// Discriminant of a [`SchemaNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Any,
    Boolean,
    Number,
    String,
    Array,
    Object,
    Ref,
}

impl SchemaNode {
    /// Parse and resolve a schema document.
    ///
    /// # Example
    ///
    /// ```
    /// use agent_config_validation::SchemaNode;
    ///
    /// let doc = agent_config_doc::parse(r#"{"type": "integer", "maximum": 64}"#).unwrap();
    /// let schema = SchemaNode::from_document(&doc).unwrap();
    /// assert_eq!(schema.type_name(), "integer");
    /// ```
    pub fn from_document(doc: &ConfigNode) -> CompileResult<SchemaNode> {
        resolve::compile_document(doc)
    }

    /// Parse and resolve a schema given as a JSON value.
    pub fn from_json(value: &Value) -> CompileResult<SchemaNode> {
        Self::from_document(&ConfigNode::from_json(value))
    }

    pub fn kind(&self) -> SchemaKind {
        match self {
            SchemaNode::Any(_) => SchemaKind::Any,
            SchemaNode::Boolean(_) => SchemaKind::Boolean,
            SchemaNode::Number(_) => SchemaKind::Number,
            SchemaNode::String(_) => SchemaKind::String,
            SchemaNode::Array(_) => SchemaKind::Array,
            SchemaNode::Object(_) => SchemaKind::Object,
            SchemaNode::Ref(_) => SchemaKind::Ref,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaNode::Any(_) => "any",
            SchemaNode::Boolean(_) => "boolean",
            SchemaNode::Number(n) if n.integer => "integer",
            SchemaNode::Number(_) => "number",
            SchemaNode::String(_) => "string",
            SchemaNode::Array(_) => "array",
            SchemaNode::Object(_) => "object",
            SchemaNode::Ref(_) => "ref",
        }
    }

    pub fn annotations(&self) -> &SchemaAnnotations {
        match self {
            SchemaNode::Any(s) => &s.annotations,
            SchemaNode::Boolean(s) => &s.annotations,
            SchemaNode::Number(s) => &s.annotations,
            SchemaNode::String(s) => &s.annotations,
            SchemaNode::Array(s) => &s.annotations,
            SchemaNode::Object(s) => &s.annotations,
            SchemaNode::Ref(s) => &s.annotations,
        }
    }

    pub(crate) fn annotations_mut(&mut self) -> &mut SchemaAnnotations {
        match self {
            SchemaNode::Any(s) => &mut s.annotations,
            SchemaNode::Boolean(s) => &mut s.annotations,
            SchemaNode::Number(s) => &mut s.annotations,
            SchemaNode::String(s) => &mut s.annotations,
            SchemaNode::Array(s) => &mut s.annotations,
            SchemaNode::Object(s) => &mut s.annotations,
            SchemaNode::Ref(s) => &mut s.annotations,
        }
    }

    /// Enumerated values accepted by a scalar node, if restricted
    pub fn enum_values(&self) -> Option<&[Value]> {
        match self {
            SchemaNode::Any(s) => s.enum_values.as_deref(),
            SchemaNode::Boolean(s) => s.enum_values.as_deref(),
            SchemaNode::Number(s) => s.enum_values.as_deref(),
            SchemaNode::String(s) => s.enum_values.as_deref(),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            SchemaNode::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Schema of a declared property of an object node
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.as_object()?.properties.get(name)
    }

    /// Follow a chain of property names from this node
    ///
    /// ```
    /// use agent_config_validation::{Bounds, compile, AGENT_SCHEMA_TEMPLATE};
    ///
    /// let schema = compile(AGENT_SCHEMA_TEMPLATE, &Bounds::new(64, 512, 1024)).unwrap();
    /// let node = schema.root().lookup(&["kstream", "min-buffers"]).unwrap();
    /// assert_eq!(node.type_name(), "integer");
    /// ```
    pub fn lookup(&self, names: &[&str]) -> Option<&SchemaNode> {
        names
            .iter()
            .try_fold(self, |node, name| node.property(name))
    }
}
