// Keyword accessors used by the schema parsers

use agent_config_doc::{ConfigNode, ConfigValue};
use serde_json::Value;

use crate::error::{CompileError, CompileResult, SchemaPath};

/// Get a string-valued keyword
pub(super) fn get_string(
    node: &ConfigNode,
    key: &str,
    path: &SchemaPath,
) -> CompileResult<Option<String>> {
    match node.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| CompileError::invalid(path, format!("'{}' must be a string", key))),
    }
}

/// Get a boolean-valued keyword
pub(super) fn get_bool(node: &ConfigNode, key: &str, path: &SchemaPath) -> CompileResult<Option<bool>> {
    match node.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| CompileError::invalid(path, format!("'{}' must be a boolean", key))),
    }
}

/// Get a non-negative integer keyword
pub(super) fn get_usize(node: &ConfigNode, key: &str, path: &SchemaPath) -> CompileResult<Option<usize>> {
    match node.get(key) {
        None => Ok(None),
        Some(ConfigNode {
            value: ConfigValue::Integer(n),
            ..
        }) if *n >= 0 => Ok(Some(*n as usize)),
        Some(_) => Err(CompileError::invalid(
            path,
            format!("'{}' must be a non-negative integer", key),
        )),
    }
}

/// Get a numeric keyword
pub(super) fn get_number(node: &ConfigNode, key: &str, path: &SchemaPath) -> CompileResult<Option<f64>> {
    match node.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| CompileError::invalid(path, format!("'{}' must be a number", key))),
    }
}

/// Get an array-of-strings keyword
pub(super) fn get_string_array(
    node: &ConfigNode,
    key: &str,
    path: &SchemaPath,
) -> CompileResult<Option<Vec<String>>> {
    let Some(value) = node.get(key) else {
        return Ok(None);
    };
    let items = value
        .as_array()
        .ok_or_else(|| CompileError::invalid(path, format!("'{}' must be an array of strings", key)))?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                CompileError::invalid(path, format!("'{}' must contain only strings", key))
            })
        })
        .collect::<CompileResult<Vec<_>>>()
        .map(Some)
}

/// Convert a scalar document node into a JSON value for enum comparison
pub(super) fn scalar_to_json(node: &ConfigNode, path: &SchemaPath) -> CompileResult<Value> {
    match &node.value {
        ConfigValue::Array(_) | ConfigValue::Object(_) => Err(CompileError::invalid(
            path,
            "enumerated values must be scalars",
        )),
        ConfigValue::Float(f) if !f.is_finite() => Err(CompileError::invalid(
            path,
            "enumerated numbers must be finite",
        )),
        _ => Ok(node.to_json()),
    }
}
