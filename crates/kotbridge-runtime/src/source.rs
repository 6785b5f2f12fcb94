//! Captured source attached to a block or declaration.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::location::SourceLocation;

/// Normalized text of a captured fragment together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    /// Location of the text inside the original file.
    pub location: SourceLocation,
    /// Indentation-trimmed, outer-whitespace-trimmed text.
    pub text: String,
    /// Resource name of the separately compiled fragment, empty when the
    /// capture is metadata-only.
    pub artifact_ref: String,
}

impl Source {
    /// Creates a new source.
    #[must_use]
    pub fn new(
        location: SourceLocation,
        text: impl Into<String>,
        artifact_ref: impl Into<String>,
    ) -> Self {
        Self {
            location,
            text: text.into(),
            artifact_ref: artifact_ref.into(),
        }
    }

    /// Returns `true` if the text was emitted as a standalone fragment.
    #[must_use]
    pub fn is_emitted(&self) -> bool {
        !self.artifact_ref.is_empty()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
