//! Conversion between [`ConfigNode`] and `serde_json::Value`.

use crate::{ConfigNode, ConfigValue};
use serde_json::{Map, Number, Value};

impl ConfigNode {
    /// Build a document tree from an already-parsed JSON value.
    ///
    /// Nodes carry no source location. Object entries follow the iteration
    /// order of the JSON map.
    pub fn from_json(value: &Value) -> Self {
        let value = match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Integer(i),
                None => ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ConfigValue::String(s.clone()),
            Value::Array(items) => ConfigValue::Array(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => {
                return ConfigNode::object(map.iter().map(|(k, v)| (k.clone(), Self::from_json(v))));
            }
        };
        ConfigNode::detached(value)
    }

    /// Convert the tree into a JSON value, dropping source locations.
    ///
    /// Non-finite floats become `null`; duplicate keys keep the last value.
    pub fn to_json(&self) -> Value {
        match &self.value {
            ConfigValue::Null => Value::Null,
            ConfigValue::Bool(b) => Value::Bool(*b),
            ConfigValue::Integer(i) => Value::Number((*i).into()),
            ConfigValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            ConfigValue::String(s) => Value::String(s.clone()),
            ConfigValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            ConfigValue::Object(entries) => {
                let mut map = Map::new();
                for entry in entries {
                    map.insert(entry.key.clone(), entry.value.to_json());
                }
                Value::Object(map)
            }
        }
    }
}
