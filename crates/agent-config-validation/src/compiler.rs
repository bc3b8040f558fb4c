//! Schema template compilation.
//!
//! `compile` is a pure function of the template text and the bounds: the
//! same inputs always give an equal [`CompiledSchema`], and the result holds
//! no interior mutability, so one instance can be shared across threads.

use agent_config_doc::ConfigNode;

use crate::bounds::Bounds;
use crate::error::CompileResult;
use crate::report::ValidationOutcome;
use crate::schema::SchemaNode;
use crate::template;
use crate::validator;

/// Source name used for locations inside the rendered schema
const SCHEMA_SOURCE_NAME: &str = "<agent schema>";

/// A schema template closed over a set of bounds
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    root: SchemaNode,
    bounds: Bounds,
    rendered: String,
}

impl CompiledSchema {
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The template text after placeholder substitution
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// Validate a document, collecting every violation
    pub fn validate(&self, doc: &ConfigNode) -> ValidationOutcome {
        validator::validate(doc, &self.root)
    }
}

/// Render `template` with `bounds`, parse it, and build the schema tree.
///
/// Every failure is a defect in the template or the bounds, not in a user
/// document.
///
/// # Example
///
/// ```
/// use agent_config_validation::{compile, Bounds};
///
/// let template = r#"{"properties": {"workers": {"type": "integer", "maximum": {{ .MaxBuffers }}}}}"#;
/// let schema = compile(template, &Bounds::new(4, 8, 16)).unwrap();
/// assert!(schema.rendered().contains(r#""maximum": 8"#));
/// ```
pub fn compile(template: &str, bounds: &Bounds) -> CompileResult<CompiledSchema> {
    let rendered = template::render(template, bounds)?;
    let doc = agent_config_doc::parse_file(&rendered, SCHEMA_SOURCE_NAME)?;
    let root = SchemaNode::from_document(&doc)?;

    tracing::debug!(
        min_buffers_cap = bounds.min_buffers_cap,
        max_buffers_cap = bounds.max_buffers_cap,
        max_buffer_size_cap = bounds.max_buffer_size_cap,
        "compiled configuration schema"
    );
    if bounds.min_buffers_cap > bounds.max_buffers_cap {
        tracing::debug!(
            min_buffers_cap = bounds.min_buffers_cap,
            max_buffers_cap = bounds.max_buffers_cap,
            "min-buffers cap exceeds max-buffers cap; caps are applied independently"
        );
    }

    Ok(CompiledSchema {
        root,
        bounds: *bounds,
        rendered,
    })
}
