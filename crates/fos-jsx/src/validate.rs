//! Round-trip validation
//!
//! Parses a partial's HTML with html5ever and compares the element outline
//! it produces with the outline the builder meant to write. Self-closed
//! non-void tags, missing table sections and block elements inside `<p>`
//! all show up as a difference.

use fos_html::{parse_outline, OutlineEntry};

use crate::error::{CompileError, CompileResult};
use crate::partial::Partial;

/// Check that the HTML parser builds exactly the partial's outline
pub fn validate_partial(partial: &Partial) -> CompileResult<()> {
    let xml = partial.xmlns.is_some();
    let parsed = parse_outline(&partial.content, xml).map_err(|err| CompileError::MalformedHtml {
        message: err.to_string(),
        span: partial.span,
    })?;

    let expected: Vec<OutlineEntry> = partial.outline.iter().map(normalized).collect();
    let found: Vec<OutlineEntry> = parsed.iter().map(normalized).collect();
    if expected == found {
        tracing::trace!("validated partial <{}> ({} elements)", partial.tag, expected.len());
        return Ok(());
    }

    let position = expected
        .iter()
        .zip(&found)
        .position(|(a, b)| a != b)
        .unwrap_or(expected.len().min(found.len()));
    let message = match (expected.get(position), found.get(position)) {
        (Some(want), Some(got)) => format!("expected `{}` but the parser produced `{}`", want.to_string().trim(), got.to_string().trim()),
        (Some(want), None) => format!("`{}` is dropped by the parser", want.to_string().trim()),
        (None, Some(got)) => format!("the parser inserts `{}`", got.to_string().trim()),
        (None, None) => "outline mismatch".to_string(),
    };
    tracing::debug!("partial <{}> fails validation: {}", partial.tag, message);
    Err(CompileError::MalformedHtml {
        message,
        span: partial.span,
    })
}

/// HTML names are case-insensitive; html5ever lowercases them (and camel
/// cases some SVG names)
fn normalized(entry: &OutlineEntry) -> OutlineEntry {
    OutlineEntry::new(
        entry.depth,
        entry.tag.to_ascii_lowercase(),
        entry
            .attrs
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
            .collect(),
    )
}
