//! The configuration document tree.

use crate::SourceInfo;

/// A node in a parsed configuration document.
///
/// The node carries only data; constraints live in the schema. Every node
/// remembers where it came from so that violations can be reported against
/// the original file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigNode {
    pub value: ConfigValue,
    pub source_info: SourceInfo,
}

/// The tagged value of a [`ConfigNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<ConfigNode>),
    /// Object entries in document order
    Object(Vec<ConfigEntry>),
}

/// A key-value pair of an object node.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntry {
    pub key: String,
    /// Location of the key itself
    pub key_info: SourceInfo,
    pub value: ConfigNode,
}

impl ConfigNode {
    pub fn new(value: ConfigValue, source_info: SourceInfo) -> Self {
        Self { value, source_info }
    }

    /// Create a node without location information.
    pub fn detached(value: ConfigValue) -> Self {
        Self::new(value, SourceInfo::default())
    }

    /// Build an object node from `(key, value)` pairs without location information.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, ConfigNode)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(key, value)| ConfigEntry::new(key, SourceInfo::default(), value))
            .collect();
        Self::detached(ConfigValue::Object(entries))
    }

    /// Build an array node without location information.
    pub fn array(items: impl IntoIterator<Item = ConfigNode>) -> Self {
        Self::detached(ConfigValue::Array(items.into_iter().collect()))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::detached(ConfigValue::String(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Self::detached(ConfigValue::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Self::detached(ConfigValue::Float(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::detached(ConfigValue::Bool(value))
    }

    pub fn null() -> Self {
        Self::detached(ConfigValue::Null)
    }

    /// Human-readable name of the value's type, as used in mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self.value {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Float(_) => "number",
            ConfigValue::String(_) => "string",
            ConfigValue::Array(_) => "array",
            ConfigValue::Object(_) => "object",
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self.value, ConfigValue::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.value, ConfigValue::Array(_))
    }

    pub fn as_object(&self) -> Option<&[ConfigEntry]> {
        match &self.value {
            ConfigValue::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ConfigNode]> {
        match &self.value {
            ConfigValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            ConfigValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Numeric value of an integer or float node.
    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            ConfigValue::Integer(i) => Some(i as f64),
            ConfigValue::Float(f) => Some(f),
            _ => None,
        }
    }

    /// Look up an object entry by key.
    ///
    /// When a key appears more than once the last occurrence wins, matching
    /// how the agent's loader resolves duplicates.
    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        self.as_object()?
            .iter()
            .rev()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Keys of an object node in document order. Empty for non-objects.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.as_object()
            .unwrap_or_default()
            .iter()
            .map(|entry| entry.key.as_str())
    }

    /// Number of children (array length or object entry count).
    pub fn len(&self) -> usize {
        match &self.value {
            ConfigValue::Array(items) => items.len(),
            ConfigValue::Object(entries) => entries.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConfigEntry {
    pub fn new(key: impl Into<String>, key_info: SourceInfo, value: ConfigNode) -> Self {
        Self {
            key: key.into(),
            key_info,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_lookup() {
        let node = ConfigNode::object([
            ("enabled", ConfigNode::boolean(true)),
            ("port", ConfigNode::integer(25)),
        ]);

        assert!(node.is_object());
        assert_eq!(node.len(), 2);
        assert_eq!(node.get("enabled").and_then(ConfigNode::as_bool), Some(true));
        assert_eq!(node.get("port").and_then(ConfigNode::as_f64), Some(25.0));
        assert!(node.get("host").is_none());
        assert_eq!(node.keys().collect::<Vec<_>>(), vec!["enabled", "port"]);
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let node = ConfigNode::object([
            ("level", ConfigNode::string("info")),
            ("level", ConfigNode::string("debug")),
        ]);
        assert_eq!(node.get("level").and_then(ConfigNode::as_str), Some("debug"));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(ConfigNode::null().type_name(), "null");
        assert_eq!(ConfigNode::integer(1).type_name(), "integer");
        assert_eq!(ConfigNode::float(1.5).type_name(), "number");
        assert_eq!(ConfigNode::array(Vec::<ConfigNode>::new()).type_name(), "array");
        assert!(ConfigNode::string("x").keys().next().is_none());
    }
}
