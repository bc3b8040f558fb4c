//! Placeholder substitution for the schema template.
//!
//! A placeholder is `{{ .Name }}`, where `Name` is one of
//! [`Bounds::PLACEHOLDERS`]. Whitespace inside the braces is ignored. The
//! rendered text is parsed afterwards, so a placeholder standing in for a
//! number must sit where the document expects one (unquoted).

use crate::bounds::Bounds;
use crate::error::{CompileError, CompileResult};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Substitute every placeholder in `template` with its bound.
///
/// Fails on zero bounds, on an opening `{{` with no closing `}}`, and on
/// placeholder names that match no bound.
pub fn render(template: &str, bounds: &Bounds) -> CompileResult<String> {
    bounds.check()?;

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let body_start = start + OPEN.len();
        let body_len = rest[body_start..]
            .find(CLOSE)
            .ok_or(CompileError::UnterminatedPlaceholder {
                offset: offset + start,
            })?;

        let expr = rest[body_start..body_start + body_len].trim();
        let value = expr
            .strip_prefix('.')
            .and_then(|name| bounds.placeholder(name.trim()))
            .ok_or_else(|| CompileError::UnknownPlaceholder {
                name: expr.trim_start_matches('.').trim().to_string(),
            })?;
        out.push_str(&value.to_string());

        let consumed = body_start + body_len + CLOSE.len();
        offset += consumed;
        rest = &rest[consumed..];
    }
    out.push_str(rest);

    Ok(out)
}
