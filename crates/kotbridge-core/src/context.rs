//! Per-file context threaded through the capture pass.

use kotbridge_runtime::{SourceLocation, SourceOffset};
use std::borrow::Cow;
use std::path::{Component, Path};

use crate::error::{CaptureError, SpanError};
use crate::ir::Span;

/// Immutable view of the file being transformed.
///
/// Holds the newline-normalized text and a line index so byte spans from
/// the IR can be turned into char/line/column offsets.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Absolute path to the file.
    pub path: &'a Path,
    /// Newline-normalized file contents.
    pub content: &'a str,
    /// Path relative to the project root, `/`-separated.
    pub relative_path: String,
    line_starts: Vec<usize>,
    line_char_starts: Vec<usize>,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    ///
    /// `content` must already be newline-normalized (see
    /// [`normalize_newlines`]).
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, project_dir: &Path) -> Self {
        let relative_path = relative_to(project_dir, path);

        let mut line_starts = vec![0];
        let mut line_char_starts = vec![0];
        let mut chars = 0;
        for (byte, ch) in content.char_indices() {
            chars += 1;
            if ch == '\n' {
                line_starts.push(byte + 1);
                line_char_starts.push(chars);
            }
        }

        Self {
            path,
            content,
            relative_path,
            line_starts,
            line_char_starts,
        }
    }

    /// File name without directories.
    #[must_use]
    pub fn file_name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map_or_else(|| Cow::Borrowed(self.relative_path.as_str()), |n| n.to_string_lossy())
    }

    /// Converts a byte offset into a char/line/column offset.
    ///
    /// # Errors
    ///
    /// Returns [`SpanError`] if `byte` is past the end of the file or not on
    /// a char boundary.
    pub fn offset_at(&self, byte: usize) -> Result<SourceOffset, SpanError> {
        if !self.content.is_char_boundary(byte) {
            return Err(SpanError {
                start: byte,
                end: byte,
                len: self.content.len(),
            });
        }

        let line = self.line_starts.partition_point(|&start| start <= byte) - 1;
        let column = self.content[self.line_starts[line]..byte].chars().count();
        Ok(SourceOffset::new(
            self.line_char_starts[line] + column,
            line + 1,
            column,
        ))
    }

    /// Builds the location of a byte span.
    ///
    /// # Errors
    ///
    /// Returns an error if the span does not fit the file or the resulting
    /// location is invalid.
    pub fn location(&self, span: Span) -> Result<SourceLocation, CaptureError> {
        let from = self.offset_at(span.start).map_err(|source| self.span_error(source))?;
        let to = self.offset_at(span.end).map_err(|source| self.span_error(source))?;
        SourceLocation::new(self.relative_path.clone(), from, to).map_err(|source| {
            CaptureError::Location {
                path: self.path.to_path_buf(),
                source,
            }
        })
    }

    /// Wraps a span problem with this file's path.
    #[must_use]
    pub fn span_error(&self, source: SpanError) -> CaptureError {
        CaptureError::Span {
            path: self.path.to_path_buf(),
            source,
        }
    }
}

/// Replaces `\r\n` with `\n`.
#[must_use]
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Expresses `path` relative to `root` with `/` separators, walking up with
/// `..` where the two diverge.
#[must_use]
pub fn relative_to(root: &Path, path: &Path) -> String {
    let root: Vec<Component<'_>> = root
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let target: Vec<Component<'_>> = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let common = root
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    parts.extend(root[common..].iter().map(|_| "..".to_owned()));
    parts.extend(
        target[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_one_based_lines_zero_based_columns() {
        let content = "ab\ncd\n\nef";
        let ctx = FileContext::new(Path::new("/p/src/A.kt"), content, Path::new("/p"));

        assert_eq!(ctx.offset_at(0).unwrap(), SourceOffset::new(0, 1, 0));
        assert_eq!(ctx.offset_at(2).unwrap(), SourceOffset::new(2, 1, 2));
        assert_eq!(ctx.offset_at(3).unwrap(), SourceOffset::new(3, 2, 0));
        assert_eq!(ctx.offset_at(6).unwrap(), SourceOffset::new(6, 3, 0));
        assert_eq!(ctx.offset_at(9).unwrap(), SourceOffset::new(9, 4, 2));
        assert!(ctx.offset_at(10).is_err());
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let content = "val s = \"é\"\nx";
        let ctx = FileContext::new(Path::new("/p/A.kt"), content, Path::new("/p"));
        let x = content.find('x').unwrap();
        assert_eq!(ctx.offset_at(x).unwrap(), SourceOffset::new(12, 2, 0));
        let e = content.find('é').unwrap();
        assert!(ctx.offset_at(e + 1).is_err());
    }

    #[test]
    fn location_uses_relative_path() {
        let content = "fun f() {}\n";
        let ctx = FileContext::new(
            Path::new("/work/proj/src/main/kotlin/F.kt"),
            content,
            Path::new("/work/proj"),
        );
        let loc = ctx.location(Span::new(4, 7)).unwrap();
        assert_eq!(loc.encode(), "src/main/kotlin/F.kt\n4,1,4\n7,1,7");
        assert_eq!(ctx.file_name(), "F.kt");
    }

    #[test]
    fn relative_paths_walk_up() {
        assert_eq!(
            relative_to(Path::new("/a/b/c"), Path::new("/a/d/E.kt")),
            "../../d/E.kt"
        );
        assert_eq!(relative_to(Path::new("/a/./b"), Path::new("/a/b/F.kt")), "F.kt");
    }

    #[test]
    fn crlf_is_normalized() {
        assert_eq!(normalize_newlines("a\r\nb\n"), "a\nb\n");
        assert!(matches!(normalize_newlines("a\nb"), Cow::Borrowed(_)));
    }
}
