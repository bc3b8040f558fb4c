//! # agent-config-doc
//!
//! The parsed form of an agent configuration file.
//!
//! A configuration document is a tree of [`ConfigNode`]s, each one a tagged
//! [`ConfigValue`] (`Object | Array | String | Integer | Float | Bool | Null`)
//! paired with the [`SourceInfo`] it was read from. The validator dispatches on
//! the tag and uses the source info to point operators at the offending line.
//!
//! Documents are read from YAML 1.2 text, which also covers JSON, or built
//! from a `serde_json::Value` by programmatic consumers.
//!
//! ## Example
//!
//! ```rust
//! use agent_config_doc::parse;
//!
//! let doc = parse("kstream:\n  min-buffers: 8\n").unwrap();
//! let min = doc.get("kstream").and_then(|k| k.get("min-buffers"));
//! assert_eq!(min.and_then(|n| n.as_f64()), Some(8.0));
//! ```

mod error;
mod json;
mod node;
mod parser;
mod source_info;

pub use error::{DocError, Result};
pub use node::{ConfigEntry, ConfigNode, ConfigValue};
pub use parser::{parse, parse_file, read_file};
pub use source_info::SourceInfo;
