// Error types for schema compilation and configuration validation

use agent_config_doc::{DocError, SourceInfo};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while turning the schema template into a compiled schema.
///
/// Every variant points at a defect in the embedded schema or in the bounds
/// handed to the compiler, never at the user's configuration. Callers on the
/// startup path should treat them as fatal.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A bound handed to the compiler was zero
    #[error("bound '{name}' must be a positive integer")]
    NonPositiveBound { name: &'static str },

    /// A `{{` without its closing `}}`
    #[error("unterminated template placeholder at offset {offset}")]
    UnterminatedPlaceholder { offset: usize },

    /// A placeholder that names no bound
    #[error("template placeholder '{name}' has no matching bound")]
    UnknownPlaceholder { name: String },

    /// The rendered template is not a well-formed document
    #[error("rendered schema is not a well-formed document: {0}")]
    Parse(#[from] DocError),

    /// Structurally invalid schema node
    #[error("invalid schema at {path}: {message}")]
    InvalidSchema { path: SchemaPath, message: String },

    /// A `pattern` that is not a valid regular expression
    #[error("invalid pattern '{pattern}' at {path}: {message}")]
    InvalidPattern {
        path: SchemaPath,
        pattern: String,
        message: String,
    },

    /// A `$ref` naming no definition
    #[error("unresolved schema reference '{reference}'")]
    UnresolvedRef { reference: String },

    /// A `$ref` chain that leads back to itself
    #[error("circular schema reference '{reference}'")]
    CircularRef { reference: String },
}

impl CompileError {
    pub(crate) fn invalid(path: &SchemaPath, message: impl Into<String>) -> Self {
        CompileError::InvalidSchema {
            path: path.clone(),
            message: message.into(),
        }
    }
}

/// Result type for schema compilation
pub type CompileResult<T> = Result<T, CompileError>;

/// Unit of a length constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// String length, in Unicode scalar values
    Characters,
    /// Array length
    Items,
}

impl LengthUnit {
    fn subject(self) -> &'static str {
        match self {
            LengthUnit::Characters => "String length",
            LengthUnit::Items => "Array length",
        }
    }
}

/// Structured validation error kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ValidationErrorKind {
    /// Key not declared by a closed object
    UnknownProperty { property: String },

    /// Required key absent
    MissingRequired { property: String },

    /// Value not in the enumerated set
    EnumViolation { value: String, allowed: Vec<String> },

    /// String does not match the schema pattern
    PatternMismatch { value: String, pattern: String },

    /// String does not satisfy a named format
    FormatMismatch { value: String, format: String },

    /// Number outside its inclusive bounds; only the violated bound is set
    RangeViolation {
        value: f64,
        minimum: Option<f64>,
        maximum: Option<f64>,
    },

    /// String or array below its minimum length
    TooShort {
        length: usize,
        min: usize,
        unit: LengthUnit,
    },

    /// String or array above its maximum length
    TooLong {
        length: usize,
        max: usize,
        unit: LengthUnit,
    },

    /// Value of the wrong type
    TypeMismatch { expected: String, got: String },

    /// Schema node is a `$ref` that was never resolved to its target
    UnresolvedRef { reference: String },
}

impl ValidationErrorKind {
    /// Get the error code for this error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationErrorKind::MissingRequired { .. } => "C-1-10",
            ValidationErrorKind::TypeMismatch { .. } => "C-1-11",
            ValidationErrorKind::EnumViolation { .. } => "C-1-12",
            ValidationErrorKind::TooShort { .. } => "C-1-13",
            ValidationErrorKind::PatternMismatch { .. } => "C-1-14",
            ValidationErrorKind::RangeViolation { .. } => "C-1-15",
            ValidationErrorKind::FormatMismatch { .. } => "C-1-16",
            ValidationErrorKind::TooLong { .. } => "C-1-17",
            ValidationErrorKind::UnknownProperty { .. } => "C-1-18",
            ValidationErrorKind::UnresolvedRef { .. } => "C-1-19",
        }
    }

    /// Short kind name, as exposed to programmatic consumers
    pub fn name(&self) -> &'static str {
        match self {
            ValidationErrorKind::UnknownProperty { .. } => "UnknownProperty",
            ValidationErrorKind::MissingRequired { .. } => "MissingRequired",
            ValidationErrorKind::EnumViolation { .. } => "EnumViolation",
            ValidationErrorKind::PatternMismatch { .. } => "PatternMismatch",
            ValidationErrorKind::FormatMismatch { .. } => "FormatMismatch",
            ValidationErrorKind::RangeViolation { .. } => "RangeViolation",
            ValidationErrorKind::TooShort { .. } => "TooShort",
            ValidationErrorKind::TooLong { .. } => "TooLong",
            ValidationErrorKind::TypeMismatch { .. } => "TypeMismatch",
            ValidationErrorKind::UnresolvedRef { .. } => "UnresolvedRef",
        }
    }

    /// Format a human-readable message from this error kind
    pub fn message(&self) -> String {
        match self {
            ValidationErrorKind::UnknownProperty { property } => {
                format!("Unknown property '{}'", property)
            }
            ValidationErrorKind::MissingRequired { property } => {
                format!("Missing required property '{}'", property)
            }
            ValidationErrorKind::EnumViolation { value, allowed } => {
                format!("Value must be one of: {}, got {}", allowed.join(", "), value)
            }
            ValidationErrorKind::PatternMismatch { value, pattern } => {
                format!("String '{}' does not match pattern '{}'", value, pattern)
            }
            ValidationErrorKind::FormatMismatch { value, format } => {
                format!("String '{}' is not a valid {}", value, format)
            }
            ValidationErrorKind::RangeViolation {
                value,
                minimum,
                maximum,
            } => match (minimum, maximum) {
                (Some(min), _) => format!("Number {} is less than minimum {}", value, min),
                (None, Some(max)) => format!("Number {} is greater than maximum {}", value, max),
                (None, None) => format!("Number {} is out of range", value),
            },
            ValidationErrorKind::TooShort { length, min, unit } => {
                format!("{} {} is less than minimum {}", unit.subject(), length, min)
            }
            ValidationErrorKind::TooLong { length, max, unit } => {
                format!("{} {} is greater than maximum {}", unit.subject(), length, max)
            }
            ValidationErrorKind::TypeMismatch { expected, got } => {
                format!("Expected {}, got {}", expected, got)
            }
            ValidationErrorKind::UnresolvedRef { reference } => {
                format!("Schema reference '{}' was never resolved", reference)
            }
        }
    }
}

/// A single violation found in a configuration document
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ValidationError {
    /// The structured error kind
    pub kind: ValidationErrorKind,
    /// Path from the document root (e.g., `kstream.blacklist.events[0]`)
    pub instance_path: InstancePath,
    /// Schema path that failed (e.g., `properties > kstream > properties > min-buffers`)
    pub schema_path: SchemaPath,
    /// Where the offending node was read from, when known
    pub location: Option<SourceInfo>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.instance_path, self.kind.message())
    }
}

impl ValidationError {
    /// Create a new validation error with a structured kind
    pub fn new(kind: ValidationErrorKind, instance_path: InstancePath) -> Self {
        Self {
            kind,
            instance_path,
            schema_path: SchemaPath::new(),
            location: None,
        }
    }

    /// Get the human-readable message for this error
    pub fn message(&self) -> String {
        self.kind.message()
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    pub fn with_schema_path(mut self, schema_path: SchemaPath) -> Self {
        self.schema_path = schema_path;
        self
    }

    /// Attach the source location of the offending node.
    ///
    /// Nodes built in memory carry a default location; those are left out.
    pub fn with_location(mut self, location: &SourceInfo) -> Self {
        if *location != SourceInfo::default() {
            self.location = Some(location.clone());
        }
        self
    }
}

/// Instance path (e.g., `["output", "elasticsearch", "servers", 0]`)
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Build a path from key segments, mostly useful in tests.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: keys.into_iter().map(|k| PathSegment::Key(k.into())).collect(),
        }
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Return a copy of this path extended by one segment
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// RFC 6901 JSON pointer form (e.g., `/kstream/blacklist/events/0`)
    pub fn to_pointer(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                PathSegment::Key(key) => format!("/{}", key.replace('~', "~0").replace('/', "~1")),
                PathSegment::Index(index) => format!("/{}", index),
            })
            .collect()
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "(root)");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i > 0 => write!(f, ".{}", key)?,
                segment => write!(f, "{}", segment)?,
            }
        }
        Ok(())
    }
}

/// Schema path (e.g., `["properties", "kstream", "properties", "min-buffers"]`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaPath {
    segments: Vec<String>,
}

impl SchemaPath {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// Return a copy of this path extended by the given segments
    pub fn join<I, S>(&self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut path = self.clone();
        for segment in segments {
            path.push(segment);
        }
        path
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "(root)")
        } else {
            write!(f, "{}", self.segments.join(" > "))
        }
    }
}

/// A segment in an instance path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum PathSegment {
    /// Object key
    Key(String),
    /// Array index
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_path_display() {
        let mut path = InstancePath::new();
        assert_eq!(path.to_string(), "(root)");

        path.push_key("kstream");
        assert_eq!(path.to_string(), "kstream");

        path.push_key("blacklist");
        path.push_key("events");
        path.push_index(0);
        assert_eq!(path.to_string(), "kstream.blacklist.events[0]");
        assert_eq!(path.to_pointer(), "/kstream/blacklist/events/0");
    }

    #[test]
    fn test_pointer_escapes_keys() {
        let path = InstancePath::from_keys(["a/b", "c~d"]);
        assert_eq!(path.to_pointer(), "/a~1b/c~0d");
    }

    #[test]
    fn test_schema_path_display() {
        let mut path = SchemaPath::new();
        assert_eq!(path.to_string(), "(root)");

        path.push("properties");
        path.push("kstream");
        assert_eq!(path.to_string(), "properties > kstream");
        assert_eq!(path.join(["then"]).len(), 3);
    }

    #[test]
    fn test_path_ordering_is_lexicographic() {
        let parent = InstancePath::from_keys(["kstream"]);
        let child = parent.child(PathSegment::Key("buffer-size".into()));
        let sibling = InstancePath::from_keys(["logging"]);
        assert!(parent < child);
        assert!(child < sibling);
    }

    #[test]
    fn test_validation_error_creation() {
        let error = ValidationError::new(
            ValidationErrorKind::TypeMismatch {
                expected: "integer".to_string(),
                got: "string".to_string(),
            },
            InstancePath::from_keys(["kstream", "min-buffers"]),
        );
        assert_eq!(error.message(), "Expected integer, got string");
        assert_eq!(error.error_code(), "C-1-11");
        assert_eq!(error.to_string(), "kstream.min-buffers: Expected integer, got string");
        assert!(error.location.is_none());
    }

    #[test]
    fn test_range_messages() {
        let over = ValidationErrorKind::RangeViolation {
            value: 100.0,
            minimum: None,
            maximum: Some(64.0),
        };
        assert_eq!(over.message(), "Number 100 is greater than maximum 64");

        let under = ValidationErrorKind::RangeViolation {
            value: 0.0,
            minimum: Some(1.0),
            maximum: None,
        };
        assert_eq!(under.message(), "Number 0 is less than minimum 1");
    }

    #[test]
    fn test_length_messages() {
        let kind = ValidationErrorKind::TooShort {
            length: 0,
            min: 1,
            unit: LengthUnit::Items,
        };
        assert_eq!(kind.message(), "Array length 0 is less than minimum 1");
        assert_eq!(kind.name(), "TooShort");
    }
}
