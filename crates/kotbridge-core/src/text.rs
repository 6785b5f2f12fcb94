//! Slicing captured text out of a file and normalizing it.

use crate::error::SpanError;
use crate::ir::Span;

/// Normalized text of a captured range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Indentation-stripped, outer-trimmed text.
    pub text: String,
    /// The input range with outer whitespace removed.
    pub trimmed: Span,
}

/// Extracts `span` from `content`.
///
/// The reported range drops leading and trailing whitespace. For an empty or
/// all-whitespace range it collapses to zero width at `span.start`.
///
/// # Errors
///
/// Returns [`SpanError`] if `span` is inverted, out of bounds or splits a
/// character.
pub fn extract(content: &str, span: Span) -> Result<ExtractedText, SpanError> {
    let slice = content.get(span.start..span.end).ok_or(SpanError {
        start: span.start,
        end: span.end,
        len: content.len(),
    })?;

    let end = span.start + slice.trim_end().len();
    let start = end - content[span.start..end].trim_start().len();

    Ok(ExtractedText {
        text: trim_indent(slice).trim().to_owned(),
        trimmed: Span::new(start, end),
    })
}

/// Removes the common leading whitespace of all non-blank lines.
///
/// A blank first or last line is dropped. Blank lines in between lose up to
/// the common width. Every whitespace char counts as one column, so a tab
/// and a space are the same width.
#[must_use]
pub fn trim_indent(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let indent = lines
        .iter()
        .filter(|line| !is_blank(line))
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let last = lines.len() - 1;
    lines
        .iter()
        .enumerate()
        .filter(|&(i, line)| !((i == 0 || i == last) && is_blank(line)))
        .map(|(_, line)| drop_chars(line, indent))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_blank(line: &str) -> bool {
    line.chars().all(char::is_whitespace)
}

fn drop_chars(line: &str, n: usize) -> &str {
    line.char_indices().nth(n).map_or("", |(i, _)| &line[i..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_of(content: &str, needle: &str) -> Span {
        let start = content.find(needle).unwrap();
        Span::new(start, start + needle.len())
    }

    #[test]
    fn strips_common_indent() {
        assert_eq!(trim_indent("\n    a\n      b\n    c\n"), "a\n  b\nc");
    }

    #[test]
    fn blank_lines_do_not_count_towards_indent() {
        assert_eq!(trim_indent("\n    a\n\n    b\n  "), "a\n\nb");
        assert_eq!(trim_indent("    a\n  \n    b"), "a\n\nb");
    }

    #[test]
    fn tabs_and_spaces_are_one_column_each() {
        assert_eq!(trim_indent("\t\ta\n  b"), "a\nb");
        assert_eq!(trim_indent("\t a\n\t  b"), "a\n b");
    }

    #[test]
    fn all_blank_is_empty() {
        assert_eq!(trim_indent("   \n"), "");
        assert_eq!(trim_indent(""), "");
        let extracted = extract("   \n \t\n", Span::new(0, 7)).unwrap();
        assert_eq!(extracted.text, "");
        assert_eq!(extracted.trimmed, Span::new(0, 0));
    }

    #[test]
    fn extra_surrounding_blank_lines_do_not_matter() {
        let tight = extract("{\n    x()\n}", Span::new(1, 10)).unwrap();
        let loose = extract("{\n\n\n    x()\n\n\n}", Span::new(1, 14)).unwrap();
        assert_eq!(tight.text, "x()");
        assert_eq!(loose.text, tight.text);
    }

    #[test]
    fn trimmed_range_covers_text_only() {
        let content = "val f = Block {\n        println(\"hi\")\n        1\n    }\n";
        let body = Span::new(content.find('{').unwrap() + 1, content.rfind('}').unwrap());
        let extracted = extract(content, body).unwrap();

        assert_eq!(extracted.text, "println(\"hi\")\n1");
        assert_eq!(
            extracted.trimmed,
            Span::new(content.find("println").unwrap(), content.rfind('1').unwrap() + 1)
        );
    }

    #[test]
    fn whitespace_range_collapses_to_start() {
        let content = "f {  \n  }";
        let body = Span::new(3, 8);
        let extracted = extract(content, body).unwrap();
        assert_eq!(extracted.text, "");
        assert_eq!(extracted.trimmed, Span::new(3, 3));
    }

    #[test]
    fn declaration_text_keeps_relative_indent() {
        let content =
            "@CaptureSource\ninterface TestClass {\n    fun boo() = \"boo!\"\n}\n";
        let decl = span_of(content, content.trim_end());
        let extracted = extract(content, Span::new("@CaptureSource".len(), decl.end)).unwrap();
        assert_eq!(
            extracted.text,
            "interface TestClass {\n    fun boo() = \"boo!\"\n}"
        );
    }

    #[test]
    fn rejects_bad_spans() {
        assert!(extract("abc", Span::new(2, 1)).is_err());
        assert!(extract("abc", Span::new(0, 4)).is_err());
        assert!(extract("é", Span::new(1, 2)).is_err());
    }
}
