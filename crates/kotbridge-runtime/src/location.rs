//! Source positions and the compact string form they travel in.
//!
//! A location is embedded into generated code as a single string literal
//! made of three lines:
//!
//! ```text
//! src/test/kotlin/CapturedLocationTests.kt
//! 231,9,12
//! 236,9,17
//! ```
//!
//! The first line is the project-relative path. The next two are
//! `char,line,column` triples for the start and the end of the captured
//! text. Lines are 1-indexed; char offsets and columns are 0-indexed and
//! counted in Unicode scalar values of the newline-normalized file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::error::LocationError;

/// Number of newline-separated parts in an encoded location.
const LOCATION_PARTS: usize = 3;

/// Number of comma-separated fields in an encoded offset.
const OFFSET_FIELDS: usize = 3;

/// One position inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceOffset {
    /// Offset from the start of the file (0-indexed, in chars).
    pub char: usize,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column within the line (0-indexed, in chars).
    pub column: usize,
}

impl SourceOffset {
    /// Creates a new offset.
    #[must_use]
    pub const fn new(char: usize, line: usize, column: usize) -> Self {
        Self { char, line, column }
    }
}

impl fmt::Display for SourceOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.char, self.line, self.column)
    }
}

/// A captured range of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Path relative to the project root.
    pub path: String,
    /// Start of the captured text.
    pub from: SourceOffset,
    /// End of the captured text (exclusive).
    pub to: SourceOffset,
}

impl SourceLocation {
    /// Creates a location, checking the invariants the wire format relies on.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is empty, absolute or contains a newline,
    /// if either offset has a zero line, or if `from` lies after `to`.
    pub fn new(
        path: impl Into<String>,
        from: SourceOffset,
        to: SourceOffset,
    ) -> Result<Self, LocationError> {
        let location = Self {
            path: path.into(),
            from,
            to,
        };
        location.validate()?;
        Ok(location)
    }

    /// Encodes this location into its three-line string form.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}\n{}\n{}", self.path, self.from, self.to)
    }

    /// Decodes a location from its three-line string form.
    ///
    /// Decoding is strict: exactly three lines and exactly three integer
    /// fields per offset are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError`] describing the first malformed part.
    pub fn decode(encoded: &str) -> Result<Self, LocationError> {
        let parts: Vec<&str> = encoded.split('\n').collect();
        if parts.len() != LOCATION_PARTS {
            return Err(LocationError::PartCount { found: parts.len() });
        }

        let location = Self {
            path: parts[0].to_owned(),
            from: parse_offset(parts[1])?,
            to: parse_offset(parts[2])?,
        };
        location.validate()?;
        Ok(location)
    }

    fn validate(&self) -> Result<(), LocationError> {
        if self.path.is_empty() {
            return Err(LocationError::EmptyPath);
        }
        if self.path.contains('\n') {
            return Err(LocationError::MultilinePath);
        }
        if looks_absolute(&self.path) {
            return Err(LocationError::AbsolutePath {
                path: self.path.clone(),
            });
        }
        if self.from.line == 0 || self.to.line == 0 {
            return Err(LocationError::ZeroLine);
        }
        if self.from.char > self.to.char {
            return Err(LocationError::Inverted {
                from: self.from.char,
                to: self.to.char,
            });
        }
        Ok(())
    }
}

impl FromStr for SourceLocation {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}-{}:{}",
            self.path, self.from.line, self.from.column, self.to.line, self.to.column
        )
    }
}

fn parse_offset(encoded: &str) -> Result<SourceOffset, LocationError> {
    let fields: Vec<&str> = encoded.split(',').collect();
    if fields.len() != OFFSET_FIELDS {
        return Err(LocationError::FieldCount {
            offset: encoded.to_owned(),
            found: fields.len(),
        });
    }

    let number = |field: &str| {
        field
            .parse::<usize>()
            .map_err(|e: ParseIntError| LocationError::InvalidNumber {
                field: field.to_owned(),
                source: e,
            })
    };

    Ok(SourceOffset {
        char: number(fields[0])?,
        line: number(fields[1])?,
        column: number(fields[2])?,
    })
}

/// Rejects Unix roots, UNC/backslash roots and Windows drive prefixes alike,
/// independent of the platform doing the decoding.
fn looks_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/')
        || path.starts_with('\\')
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceLocation {
        SourceLocation::new(
            "src/test/kotlin/CapturedLocationTests.kt",
            SourceOffset::new(231, 9, 12),
            SourceOffset::new(236, 9, 17),
        )
        .unwrap()
    }

    #[test]
    fn encodes_three_lines() {
        assert_eq!(
            sample().encode(),
            "src/test/kotlin/CapturedLocationTests.kt\n231,9,12\n236,9,17"
        );
    }

    #[test]
    fn round_trips() {
        let loc = sample();
        assert_eq!(SourceLocation::decode(&loc.encode()).unwrap(), loc);

        let empty = SourceLocation::new(
            "a.kt",
            SourceOffset::new(0, 1, 0),
            SourceOffset::new(0, 1, 0),
        )
        .unwrap();
        assert_eq!(empty.encode().parse::<SourceLocation>().unwrap(), empty);
    }

    #[test]
    fn rejects_missing_lines() {
        let err = SourceLocation::decode("a.kt\n1,1,1").unwrap_err();
        assert!(matches!(err, LocationError::PartCount { found: 2 }));
    }

    #[test]
    fn rejects_trailing_parts() {
        let err = SourceLocation::decode("a.kt\n1,1,1\n2,1,2\nextra").unwrap_err();
        assert!(matches!(err, LocationError::PartCount { found: 4 }));
    }

    #[test]
    fn rejects_short_offsets() {
        let err = SourceLocation::decode("a.kt\n1,1\n2,1,2").unwrap_err();
        assert!(matches!(err, LocationError::FieldCount { found: 2, .. }));
    }

    #[test]
    fn rejects_long_offsets() {
        let err = SourceLocation::decode("a.kt\n1,1,1\n2,1,2,9").unwrap_err();
        assert!(matches!(err, LocationError::FieldCount { found: 4, .. }));
    }

    #[test]
    fn rejects_non_numbers() {
        let err = SourceLocation::decode("a.kt\n1,x,1\n2,1,2").unwrap_err();
        assert!(matches!(err, LocationError::InvalidNumber { .. }));
        assert!(SourceLocation::decode("a.kt\n-1,1,1\n2,1,2").is_err());
    }

    #[test]
    fn rejects_absolute_paths() {
        for path in ["/abs/a.kt", "\\\\share\\a.kt", "C:\\work\\a.kt"] {
            let encoded = format!("{path}\n1,1,1\n2,1,2");
            assert!(
                matches!(
                    SourceLocation::decode(&encoded),
                    Err(LocationError::AbsolutePath { .. })
                ),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_inverted_range() {
        let err = SourceLocation::decode("a.kt\n5,1,5\n2,1,2").unwrap_err();
        assert!(matches!(err, LocationError::Inverted { from: 5, to: 2 }));
    }

    #[test]
    fn rejects_zero_line() {
        assert!(matches!(
            SourceLocation::decode("a.kt\n0,0,0\n1,1,1"),
            Err(LocationError::ZeroLine)
        ));
    }

    #[test]
    fn new_rejects_newline_in_path() {
        let err = SourceLocation::new(
            "a\nb.kt",
            SourceOffset::new(0, 1, 0),
            SourceOffset::new(0, 1, 0),
        )
        .unwrap_err();
        assert!(matches!(err, LocationError::MultilinePath));
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(
            sample().to_string(),
            "src/test/kotlin/CapturedLocationTests.kt:9:12-9:17"
        );
    }
}
