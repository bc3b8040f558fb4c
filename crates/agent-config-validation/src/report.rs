//! Validation outcomes and their presentation.
//!
//! A [`ValidationOutcome`] is the raw list of violations found in one pass.
//! A [`Report`] orders them deterministically (by instance path, then code,
//! then message, with exact duplicates removed) and renders them as plain
//! text, as structured records, or as source snippets.

use std::fmt;

use ariadne::{Color, Config, Label, ReportKind, Source};
use serde::{Deserialize, Serialize};

use agent_config_doc::SourceInfo;

use crate::error::{ValidationError, ValidationErrorKind};

/// Every violation found while validating one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    errors: Vec<ValidationError>,
}

impl ValidationOutcome {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Violations in the order they were found
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Violations ordered by instance path, error code and message, with
    /// repeats of the same violation at the same path removed
    pub fn sorted(&self) -> Vec<ValidationError> {
        let mut errors = self.errors.clone();
        errors.sort_by(|a, b| {
            a.instance_path
                .cmp(&b.instance_path)
                .then_with(|| a.error_code().cmp(b.error_code()))
                .then_with(|| a.message().cmp(&b.message()))
        });
        errors.dedup_by(|a, b| a.instance_path == b.instance_path && a.kind == b.kind);
        errors
    }

    pub fn report(&self) -> Report {
        Report::new(self)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            0 => write!(f, "configuration is valid"),
            1 => write!(f, "configuration has 1 violation"),
            n => write!(f, "configuration has {} violations", n),
        }
    }
}

impl std::error::Error for ValidationOutcome {}

/// Structured form of one violation, for programmatic consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Dotted instance path (`(root)` for the document itself)
    pub path: String,
    /// RFC 6901 pointer to the same node
    pub pointer: String,
    pub schema_path: String,
    pub code: String,
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub details: ValidationErrorKind,
}

impl From<&ValidationError> for ErrorRecord {
    fn from(error: &ValidationError) -> Self {
        Self {
            path: error.instance_path.to_string(),
            pointer: error.instance_path.to_pointer(),
            schema_path: error.schema_path.to_string(),
            code: error.error_code().to_string(),
            kind: error.kind.name().to_string(),
            message: error.message(),
            file: error.location.as_ref().and_then(|loc| loc.file.clone()),
            line: error.location.as_ref().map(|loc| loc.line),
            column: error.location.as_ref().map(|loc| loc.col),
            details: error.kind.clone(),
        }
    }
}

/// Ordered, de-duplicated violations ready for display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    errors: Vec<ValidationError>,
}

impl Report {
    pub fn new(outcome: &ValidationOutcome) -> Self {
        Self {
            errors: outcome.sorted(),
        }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// One `path: message` line per violation
    pub fn to_text(&self) -> String {
        self.errors
            .iter()
            .map(ValidationError::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn records(&self) -> Vec<ErrorRecord> {
        self.errors.iter().map(ErrorRecord::from).collect()
    }

    /// Records as a pretty-printed JSON array
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records())
    }

    /// Render each violation against the document text it was read from.
    ///
    /// Violations with a known location get a source snippet; the rest fall
    /// back to a one-line `error[code]: path: message` form.
    pub fn render_with_source(&self, name: &str, source: &str) -> String {
        let mut out = String::new();
        for error in &self.errors {
            let snippet = error
                .location
                .as_ref()
                .and_then(|location| render_snippet(error, location, name, source));
            match snippet {
                Some(snippet) => out.push_str(&snippet),
                None => {
                    out.push_str(&format!("error[{}]: {}\n", error.error_code(), error));
                }
            }
        }
        out
    }
}

impl From<ValidationOutcome> for Report {
    fn from(outcome: ValidationOutcome) -> Self {
        Report::new(&outcome)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// ariadne spans are character offsets; locations are byte offsets
fn char_offset(source: &str, byte_offset: usize) -> Option<usize> {
    if byte_offset > source.len() || !source.is_char_boundary(byte_offset) {
        return None;
    }
    Some(source[..byte_offset].chars().count())
}

fn render_snippet(
    error: &ValidationError,
    location: &SourceInfo,
    name: &str,
    source: &str,
) -> Option<String> {
    let start = char_offset(source, location.offset)?;
    let end = char_offset(source, location.end_offset())?
        .max(start + 1)
        .min(source.chars().count());
    let file = name.to_string();

    let report = ariadne::Report::build(ReportKind::Error, file.clone(), start)
        .with_config(Config::default().with_color(false))
        .with_code(error.error_code())
        .with_message(format!("{}: {}", error.instance_path, error.message()))
        .with_label(
            Label::new((file.clone(), start..end))
                .with_message(error.message())
                .with_color(Color::Red),
        )
        .finish();

    let mut output = Vec::new();
    report
        .write((file, Source::from(source)), &mut output)
        .ok()?;
    String::from_utf8(output).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InstancePath, LengthUnit};
    use pretty_assertions::assert_eq;

    fn error(keys: &[&str], kind: ValidationErrorKind) -> ValidationError {
        ValidationError::new(kind, InstancePath::from_keys(keys.iter().copied()))
    }

    fn missing(property: &str) -> ValidationErrorKind {
        ValidationErrorKind::MissingRequired {
            property: property.to_string(),
        }
    }

    #[test]
    fn test_sorted_orders_and_dedups() {
        let outcome = ValidationOutcome::new(vec![
            error(&["output", "url"], missing("url")),
            error(&["kstream"], missing("x")),
            error(&["output", "url"], missing("url")),
            error(
                &["kstream"],
                ValidationErrorKind::TypeMismatch {
                    expected: "object".into(),
                    got: "string".into(),
                },
            ),
        ]);
        assert_eq!(outcome.len(), 4);

        let sorted = outcome.sorted();
        let lines: Vec<String> = sorted.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "kstream: Missing required property 'x'",
                "kstream: Expected object, got string",
                "output.url: Missing required property 'url'",
            ]
        );
    }

    #[test]
    fn test_text_report() {
        let outcome = ValidationOutcome::new(vec![
            error(&[], missing("kstream")),
            error(
                &["alertsenders", "mail", "to"],
                ValidationErrorKind::TooShort {
                    length: 0,
                    min: 1,
                    unit: LengthUnit::Items,
                },
            ),
        ]);
        insta::assert_snapshot!(outcome.report().to_text(), @r"
        (root): Missing required property 'kstream'
        alertsenders.mail.to: Array length 0 is less than minimum 1
        ");
    }

    #[test]
    fn test_records() {
        let outcome = ValidationOutcome::new(vec![error(
            &["kstream", "min-buffers"],
            ValidationErrorKind::RangeViolation {
                value: 100.0,
                minimum: None,
                maximum: Some(64.0),
            },
        )]);
        let records = outcome.report().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "kstream.min-buffers");
        assert_eq!(records[0].pointer, "/kstream/min-buffers");
        assert_eq!(records[0].code, "C-1-15");
        assert_eq!(records[0].kind, "RangeViolation");
        assert_eq!(records[0].line, None);

        let json = outcome.report().to_json().unwrap();
        let parsed: Vec<ErrorRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(ValidationOutcome::default().to_string(), "configuration is valid");
        let outcome = ValidationOutcome::new(vec![error(&["a"], missing("a"))]);
        assert_eq!(outcome.to_string(), "configuration has 1 violation");
    }

    #[test]
    fn test_render_without_location_falls_back_to_text() {
        let outcome = ValidationOutcome::new(vec![error(&["api"], missing("transport"))]);
        let rendered = outcome.report().render_with_source("agent.yml", "api: {}\n");
        assert_eq!(
            rendered,
            "error[C-1-10]: api: Missing required property 'transport'\n"
        );
    }

    #[test]
    fn test_render_with_location() {
        let source = "kstream:\n  min-buffers: 100\n";
        let location = SourceInfo::new(None, 24, 2, 16, 3);
        let outcome = ValidationOutcome::new(vec![
            error(
                &["kstream", "min-buffers"],
                ValidationErrorKind::RangeViolation {
                    value: 100.0,
                    minimum: None,
                    maximum: Some(64.0),
                },
            )
            .with_location(&location),
        ]);
        let rendered = outcome.report().render_with_source("agent.yml", source);
        assert!(rendered.contains("C-1-15"));
        assert!(rendered.contains("Number 100 is greater than maximum 64"));
        assert!(rendered.contains("agent.yml"));
        assert!(rendered.contains("min-buffers: 100"));
    }
}
