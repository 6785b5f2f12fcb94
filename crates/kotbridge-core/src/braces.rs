//! Narrowing a lambda or body span to the text between its braces.

use crate::error::SpanError;
use crate::ir::Span;

/// Returns the interior of the outermost `{ ... }` within `span`.
///
/// The end moves back to just after the last `}` and the start moves forward
/// to the first `{`. When at least the two delimiters remain they are
/// dropped. A span without braces collapses to zero width.
///
/// # Errors
///
/// Returns [`SpanError`] if `span` is inverted or out of bounds.
pub fn body_span(content: &str, span: Span) -> Result<Span, SpanError> {
    let bytes = content.as_bytes();
    if span.start > span.end || span.end > bytes.len() {
        return Err(SpanError {
            start: span.start,
            end: span.end,
            len: bytes.len(),
        });
    }

    let mut start = span.start;
    let mut end = span.end;
    while end > start && bytes[end - 1] != b'}' {
        end -= 1;
    }
    while start < end && bytes[start] != b'{' {
        start += 1;
    }
    if end > start + 1 {
        end -= 1;
        start += 1;
    }

    Ok(Span::new(start, end))
}
