//! YAML parser that builds [`ConfigNode`] trees.

use crate::{ConfigEntry, ConfigNode, ConfigValue, DocError, Result, SourceInfo};
use std::collections::HashMap;
use std::path::Path;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Parse a configuration document from YAML (or JSON) text.
///
/// Only the first document of a multi-document stream is read.
///
/// # Example
///
/// ```rust
/// use agent_config_doc::parse;
///
/// let doc = parse("logging:\n  level: info").unwrap();
/// assert!(doc.is_object());
/// ```
///
/// # Errors
///
/// Returns an error if the text is not well-formed YAML or holds no document.
pub fn parse(content: &str) -> Result<ConfigNode> {
    parse_impl(content, None)
}

/// Parse a configuration document, tagging every node with `filename`.
///
/// # Example
///
/// ```rust
/// use agent_config_doc::parse_file;
///
/// let doc = parse_file("api:\n  transport: localhost:8482", "agent.yml").unwrap();
/// assert_eq!(doc.source_info.file.as_deref(), Some("agent.yml"));
/// ```
pub fn parse_file(content: &str, filename: &str) -> Result<ConfigNode> {
    parse_impl(content, Some(filename))
}

/// Read and parse a configuration file from disk.
pub fn read_file(path: impl AsRef<Path>) -> Result<ConfigNode> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| DocError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_file(&content, &path.display().to_string())
}

fn parse_impl(content: &str, filename: Option<&str>) -> Result<ConfigNode> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = DocBuilder::new(filename);

    parser.load(&mut builder, false)?;

    builder.result()
}

/// Builder that implements MarkedEventReceiver to construct ConfigNode trees.
struct DocBuilder {
    filename: Option<String>,

    /// Stack of nodes being constructed
    stack: Vec<BuildNode>,

    /// Completed anchored nodes, by anchor id
    anchors: HashMap<usize, ConfigNode>,

    root: Option<ConfigNode>,
}

/// A collection node being constructed during parsing.
enum BuildNode {
    Sequence {
        start_marker: Marker,
        anchor_id: usize,
        items: Vec<ConfigNode>,
    },

    Mapping {
        start_marker: Marker,
        anchor_id: usize,
        /// Keys waiting for their value are stored with `None`
        entries: Vec<(String, SourceInfo, Option<ConfigNode>)>,
    },
}

impl DocBuilder {
    fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(|s| s.to_string()),
            stack: Vec::new(),
            anchors: HashMap::new(),
            root: None,
        }
    }

    fn result(self) -> Result<ConfigNode> {
        self.root.ok_or(DocError::Empty)
    }

    fn complete(&mut self, node: ConfigNode, anchor_id: usize) {
        if anchor_id > 0 {
            self.anchors.insert(anchor_id, node.clone());
        }

        let Some(parent) = self.stack.last_mut() else {
            // Only the first document is kept
            if self.root.is_none() {
                self.root = Some(node);
            }
            return;
        };

        match parent {
            BuildNode::Sequence { items, .. } => items.push(node),
            BuildNode::Mapping { entries, .. } => match entries.last_mut() {
                Some((_, _, value @ None)) => *value = Some(node),
                _ => {
                    // A new key; non-string keys are rendered to their text form
                    let key = key_text(&node);
                    entries.push((key, node.source_info, None));
                }
            },
        }
    }

    fn make_source_info(&self, marker: &Marker, len: usize) -> SourceInfo {
        let info = SourceInfo::from_marker(marker, len);
        match &self.filename {
            Some(filename) => info.with_file(filename.clone()),
            None => info,
        }
    }
}

impl MarkedEventReceiver for DocBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        match ev {
            Event::Scalar(value, style, anchor_id, _tag) => {
                let source_info = self.make_source_info(&marker, value.len());
                let value = if matches!(style, TScalarStyle::Plain) {
                    infer_plain_scalar(&value)
                } else {
                    ConfigValue::String(value)
                };
                self.complete(ConfigNode::new(value, source_info), anchor_id);
            }

            Event::SequenceStart(anchor_id, _) => {
                self.stack.push(BuildNode::Sequence {
                    start_marker: marker,
                    anchor_id,
                    items: Vec::new(),
                });
            }

            Event::SequenceEnd => {
                if let Some(BuildNode::Sequence {
                    start_marker,
                    anchor_id,
                    items,
                }) = self.stack.pop()
                {
                    let len = marker.index().saturating_sub(start_marker.index());
                    let source_info = self.make_source_info(&start_marker, len);
                    self.complete(
                        ConfigNode::new(ConfigValue::Array(items), source_info),
                        anchor_id,
                    );
                }
            }

            Event::MappingStart(anchor_id, _) => {
                self.stack.push(BuildNode::Mapping {
                    start_marker: marker,
                    anchor_id,
                    entries: Vec::new(),
                });
            }

            Event::MappingEnd => {
                if let Some(BuildNode::Mapping {
                    start_marker,
                    anchor_id,
                    entries,
                }) = self.stack.pop()
                {
                    let len = marker.index().saturating_sub(start_marker.index());
                    let source_info = self.make_source_info(&start_marker, len);
                    let entries = entries
                        .into_iter()
                        .map(|(key, key_info, value)| {
                            // Dangling key reads as null
                            let value = value.unwrap_or_else(|| {
                                ConfigNode::new(ConfigValue::Null, key_info.clone())
                            });
                            ConfigEntry::new(key, key_info, value)
                        })
                        .collect();
                    self.complete(
                        ConfigNode::new(ConfigValue::Object(entries), source_info),
                        anchor_id,
                    );
                }
            }

            Event::Alias(anchor_id) => {
                let source_info = self.make_source_info(&marker, 0);
                let node = match self.anchors.get(&anchor_id) {
                    Some(anchored) => ConfigNode::new(anchored.value.clone(), source_info),
                    None => ConfigNode::new(ConfigValue::Null, source_info),
                };
                self.complete(node, 0);
            }

            // Stream and document boundaries carry no data
            _ => {}
        }
    }
}

/// Text form of a mapping key.
fn key_text(node: &ConfigNode) -> String {
    match &node.value {
        ConfigValue::String(s) => s.clone(),
        ConfigValue::Integer(i) => i.to_string(),
        ConfigValue::Float(f) => f.to_string(),
        ConfigValue::Bool(b) => b.to_string(),
        ConfigValue::Null => String::new(),
        ConfigValue::Array(_) | ConfigValue::Object(_) => node.type_name().to_string(),
    }
}

/// Resolve a plain scalar using the YAML 1.2 core schema.
fn infer_plain_scalar(value: &str) -> ConfigValue {
    match value {
        "true" | "True" | "TRUE" => return ConfigValue::Bool(true),
        "false" | "False" | "FALSE" => return ConfigValue::Bool(false),
        "null" | "Null" | "NULL" | "~" | "" => return ConfigValue::Null,
        _ => {}
    }

    if let Ok(i) = value.parse::<i64>() {
        return ConfigValue::Integer(i);
    }

    // Rust accepts "inf" and "NaN" as floats; YAML does not spell them that way
    let numeric_start = value
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));
    if numeric_start
        && let Ok(f) = value.parse::<f64>()
        && f.is_finite()
    {
        return ConfigValue::Float(f);
    }

    ConfigValue::String(value.to_string())
}
