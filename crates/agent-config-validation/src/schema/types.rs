// Schema node payloads

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use super::SchemaNode;

/// Common annotations carried by every schema node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaAnnotations {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Accepts any value, optionally restricted to an enumerated set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnySchema {
    pub annotations: SchemaAnnotations,
    pub enum_values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanSchema {
    pub annotations: SchemaAnnotations,
    pub enum_values: Option<Vec<Value>>,
}

/// Number schema; `integer` rejects values with a fractional part
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSchema {
    pub annotations: SchemaAnnotations,
    pub integer: bool,
    /// Inclusive lower bound
    pub minimum: Option<f64>,
    /// Inclusive upper bound
    pub maximum: Option<f64>,
    pub enum_values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    pub annotations: SchemaAnnotations,
    /// In characters
    pub min_length: Option<usize>,
    /// In characters
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
    pub format: Option<Format>,
    /// Accepted URI schemes when `format` is [`Format::Uri`]; any scheme if unset
    pub schemes: Option<Vec<String>>,
    pub enum_values: Option<Vec<Value>>,
}

/// Element constraints of an array schema
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayItems {
    /// Every element matches the same schema
    Uniform(Box<SchemaNode>),
    /// Element `i` matches schema `i`; extra elements are unconstrained
    Positional(Vec<SchemaNode>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArraySchema {
    pub annotations: SchemaAnnotations,
    pub items: Option<ArrayItems>,
    pub min_items: Option<usize>,
}

/// Object schema
///
/// `variants` holds a group of alternative property sets (an `anyOf` of
/// object schemas). A variant is active when the document declares at least
/// one of its properties; active variants contribute their property schemas,
/// required keys and conditions. Closed-world checking is done against the
/// union of `properties` and every variant's properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub annotations: SchemaAnnotations,
    pub properties: IndexMap<String, SchemaNode>,
    /// Whether keys outside the declared properties are accepted
    pub additional_properties: bool,
    pub required: Vec<String>,
    pub condition: Option<Box<Condition>>,
    pub variants: Vec<SchemaNode>,
}

impl ObjectSchema {
    /// Whether any property of this schema or of its variants is named `key`
    pub fn declares(&self, key: &str) -> bool {
        self.properties.contains_key(key)
            || self.variants.iter().any(|variant| match variant {
                SchemaNode::Object(v) => v.properties.contains_key(key),
                _ => false,
            })
    }
}

/// If/then pair attached to an object schema
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub if_node: SchemaNode,
    pub then_node: SchemaNode,
}

/// Symbolic reference, only present before compilation resolves it
#[derive(Debug, Clone, PartialEq)]
pub struct RefSchema {
    pub annotations: SchemaAnnotations,
    pub reference: String,
}

/// Anchored regular expression, compiled once
///
/// The source is matched against the whole string: `[0-9]+(ms|s)` accepts
/// `10ms` but not `x10ms`.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self { source, regex })
    }

    /// The pattern as written in the schema
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Named string formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Email,
    Uri,
}

impl Format {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "email" => Some(Format::Email),
            "uri" => Some(Format::Uri),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Email => "email",
            Format::Uri => "uri",
        }
    }
}
