//! Startup and reload gate for agent configuration.

use std::sync::Arc;

use agent_config_doc::ConfigNode;

use crate::bounds::{BoundProvider, Bounds};
use crate::compiler::{CompiledSchema, compile};
use crate::error::CompileResult;
use crate::report::ValidationOutcome;
use crate::AGENT_SCHEMA_TEMPLATE;

/// Holds a compiled schema and the template it came from.
///
/// Cloning is cheap and shares the compiled schema, so one validator can be
/// handed to every thread that checks configuration. A reload path calls
/// [`ConfigValidator::refresh`] when the host bounds may have changed.
///
/// ```
/// use agent_config_doc::parse;
/// use agent_config_validation::{Bounds, ConfigValidator};
///
/// let validator = ConfigValidator::new(Bounds::new(64, 512, 1_048_576)).unwrap();
/// let doc = parse("kstream:\n  min-buffers: 100\n").unwrap();
/// let outcome = validator.validate(&doc);
/// assert_eq!(outcome.report().to_text(), "kstream.min-buffers: Number 100 is greater than maximum 64");
/// ```
#[derive(Debug, Clone)]
pub struct ConfigValidator {
    template: Arc<str>,
    schema: Arc<CompiledSchema>,
}

impl ConfigValidator {
    /// Compile the embedded agent schema
    pub fn new(bounds: Bounds) -> CompileResult<Self> {
        Self::with_template(AGENT_SCHEMA_TEMPLATE, bounds)
    }

    /// Compile a custom schema template
    pub fn with_template(template: &str, bounds: Bounds) -> CompileResult<Self> {
        let schema = compile(template, &bounds)?;
        Ok(Self {
            template: Arc::from(template),
            schema: Arc::new(schema),
        })
    }

    /// Compile the embedded agent schema with bounds from `provider`
    pub fn from_provider(provider: &dyn BoundProvider) -> CompileResult<Self> {
        Self::new(provider.bounds())
    }

    pub fn schema(&self) -> &Arc<CompiledSchema> {
        &self.schema
    }

    pub fn bounds(&self) -> Bounds {
        self.schema.bounds()
    }

    /// Recompile with new bounds.
    ///
    /// Returns `Ok(false)` without recompiling when the bounds are unchanged.
    /// On error the current schema is kept.
    pub fn refresh(&mut self, bounds: Bounds) -> CompileResult<bool> {
        if bounds == self.bounds() {
            return Ok(false);
        }
        let schema = compile(&self.template, &bounds)?;
        tracing::debug!(
            old = ?self.bounds(),
            new = ?bounds,
            "recompiled configuration schema"
        );
        self.schema = Arc::new(schema);
        Ok(true)
    }

    pub fn validate(&self, doc: &ConfigNode) -> ValidationOutcome {
        let outcome = self.schema.validate(doc);
        tracing::trace!(violations = outcome.len(), "validated configuration");
        outcome
    }

    /// All-or-nothing acceptance: `Ok` only when there are no violations.
    pub fn check(&self, doc: &ConfigNode) -> Result<(), ValidationOutcome> {
        let outcome = self.validate(doc);
        if outcome.is_valid() {
            Ok(())
        } else {
            Err(outcome)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::HostBounds;
    use crate::error::CompileError;

    #[test]
    fn test_refresh_only_recompiles_on_change() {
        let mut validator = ConfigValidator::new(Bounds::new(4, 8, 16)).unwrap();
        let before = Arc::clone(validator.schema());

        assert!(!validator.refresh(Bounds::new(4, 8, 16)).unwrap());
        assert!(Arc::ptr_eq(&before, validator.schema()));

        assert!(validator.refresh(Bounds::new(8, 8, 16)).unwrap());
        assert!(!Arc::ptr_eq(&before, validator.schema()));
        assert_eq!(validator.bounds(), Bounds::new(8, 8, 16));
    }

    #[test]
    fn test_failed_refresh_keeps_schema() {
        let mut validator = ConfigValidator::new(Bounds::new(4, 8, 16)).unwrap();
        let err = validator.refresh(Bounds::new(0, 8, 16)).unwrap_err();
        assert!(matches!(err, CompileError::NonPositiveBound { .. }));
        assert_eq!(validator.bounds(), Bounds::new(4, 8, 16));
    }

    #[test]
    fn test_clones_share_schema() {
        let validator = ConfigValidator::from_provider(&HostBounds::with_cpus(2)).unwrap();
        let clone = validator.clone();
        assert!(Arc::ptr_eq(validator.schema(), clone.schema()));
        assert_eq!(validator.bounds(), Bounds::new(4, 24, 1024));
    }

    #[test]
    fn test_check() {
        let validator = ConfigValidator::new(Bounds::new(4, 8, 16)).unwrap();
        let ok = agent_config_doc::parse("kstream:\n  min-buffers: 4\n").unwrap();
        assert!(validator.check(&ok).is_ok());

        let bad = agent_config_doc::parse("kstream:\n  min-buffers: 5\n").unwrap();
        let outcome = validator.check(&bad).unwrap_err();
        assert_eq!(outcome.len(), 1);
    }
}
