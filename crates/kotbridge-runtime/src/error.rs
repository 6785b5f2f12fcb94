//! Error types for the runtime side.

use std::num::ParseIntError;

/// Errors produced while decoding an encoded [`SourceLocation`](crate::SourceLocation).
///
/// A malformed location means the program was built with a different
/// version of the extractor than the runtime it executes against.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    /// The encoded location does not consist of exactly three lines.
    #[error("expected 3 newline-separated parts, found {found}")]
    PartCount {
        /// Number of parts found.
        found: usize,
    },

    /// An encoded offset does not consist of exactly three fields.
    #[error("expected 3 comma-separated fields in offset '{offset}', found {found}")]
    FieldCount {
        /// The offending offset text.
        offset: String,
        /// Number of fields found.
        found: usize,
    },

    /// An offset field is not a non-negative integer.
    #[error("invalid offset field '{field}': {source}")]
    InvalidNumber {
        /// The offending field.
        field: String,
        /// Underlying parse error.
        source: ParseIntError,
    },

    /// The path is empty.
    #[error("location path is empty")]
    EmptyPath,

    /// The path contains a newline and cannot be encoded.
    #[error("location path contains a newline")]
    MultilinePath,

    /// The path is absolute instead of project-relative.
    #[error("location path '{path}' is absolute")]
    AbsolutePath {
        /// The offending path.
        path: String,
    },

    /// A line number is zero.
    #[error("line numbers start at 1")]
    ZeroLine,

    /// The start offset lies after the end offset.
    #[error("start offset {from} lies after end offset {to}")]
    Inverted {
        /// Start char offset.
        from: usize,
        /// End char offset.
        to: usize,
    },
}

/// Errors raised when a captured block is used at runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The value was never given a source by the compiler pass.
    #[error("there is no source code for this block")]
    NoSource,

    /// The encoded location embedded in the program is malformed.
    #[error("malformed source location: {0}")]
    Location(#[from] LocationError),

    /// The block was captured for introspection only.
    #[error("block at {location} was not extracted to a separate fragment")]
    NotEmitted {
        /// Human-readable location of the block.
        location: String,
    },

    /// The compiled fragment for an artifact reference is missing or unreadable.
    #[error("failed to find or read compiled fragment '{artifact_ref}': {source}")]
    FragmentNotFound {
        /// Artifact reference that was looked up.
        artifact_ref: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
