//! Agent configuration validation
//!
//! This crate checks a parsed configuration document against a schema that is
//! compiled from a template at startup:
//!
//! 1. [`Bounds`] carries the host-derived caps (`{{ .MinBuffers }}`,
//!    `{{ .MaxBuffers }}`, `{{ .MaxBufferSize }}`).
//! 2. [`compile`] substitutes them into the template and builds an immutable
//!    [`SchemaNode`] tree.
//! 3. [`validate`] walks a document and collects every violation into a
//!    [`ValidationOutcome`].
//! 4. [`Report`] orders the violations and renders them for people or tools.
//!
//! [`ConfigValidator`] wraps these steps for the agent's startup and reload
//! paths.
//!
//! # Example
//!
//! ```
//! use agent_config_doc::parse;
//! use agent_config_validation::{Bounds, compile, AGENT_SCHEMA_TEMPLATE};
//!
//! let schema = compile(AGENT_SCHEMA_TEMPLATE, &Bounds::new(64, 512, 1_048_576)).unwrap();
//! let doc = parse("logging:\n  level: info\n  formatter: xml\n").unwrap();
//!
//! let outcome = schema.validate(&doc);
//! assert_eq!(outcome.len(), 1);
//! assert_eq!(outcome.errors()[0].error_code(), "C-1-12");
//! ```

pub mod bounds;
pub mod compiler;
pub mod config_validator;
pub mod error;
pub mod report;
pub mod schema;
pub mod template;
pub mod validator;

pub use bounds::{BoundProvider, Bounds, HostBounds};
pub use compiler::{CompiledSchema, compile};
pub use config_validator::ConfigValidator;
pub use error::{
    CompileError, CompileResult, InstancePath, LengthUnit, PathSegment, SchemaPath,
    ValidationError, ValidationErrorKind,
};
pub use report::{ErrorRecord, Report, ValidationOutcome};
pub use schema::{SchemaKind, SchemaNode};
pub use validator::{ValidationContext, validate};

/// The agent configuration schema template
pub const AGENT_SCHEMA_TEMPLATE: &str = include_str!("../schemas/agent-config.schema.json");

/// Order and present a validation outcome
pub fn report(outcome: &ValidationOutcome) -> Report {
    Report::new(outcome)
}
