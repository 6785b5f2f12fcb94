//! Errors raised by the capture pass.

use kotbridge_runtime::LocationError;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

/// A byte range that does not fit the file it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("span {start}..{end} is out of bounds for a file of {len} bytes")]
pub struct SpanError {
    /// Start of the offending range.
    pub start: usize,
    /// End of the offending range.
    pub end: usize,
    /// Length of the file text.
    pub len: usize,
}

/// Failures of the compile-time capture pass.
///
/// Every variant aborts extraction; no partial output is kept.
#[derive(Debug, Error, Diagnostic)]
pub enum CaptureError {
    /// A marker annotation argument was not a compile-time constant.
    #[error("only compile-time constants are supported here: `{text}` in @{annotation}")]
    #[diagnostic(
        code(kotbridge::non_constant_argument),
        help("use a string literal or a `const val` reference")
    )]
    NonConstantArgument {
        /// Annotation the argument belongs to.
        annotation: String,
        /// Source text of the argument.
        text: String,
        /// File the argument was found in.
        #[source_code]
        source_code: NamedSource<String>,
        /// Location of the argument.
        #[label("not a compile-time constant")]
        span: SourceSpan,
    },

    /// A node span pointed outside of its file.
    #[error("invalid span in {path}")]
    #[diagnostic(code(kotbridge::span))]
    Span {
        /// File being processed.
        path: PathBuf,
        /// Underlying range problem.
        #[source]
        source: SpanError,
    },

    /// A computed location could not be represented.
    #[error("cannot build a location in {path}")]
    #[diagnostic(code(kotbridge::location))]
    Location {
        /// File being processed.
        path: PathBuf,
        /// Underlying location problem.
        #[source]
        source: LocationError,
    },

    /// Writing a generated fragment failed.
    #[error("failed to write fragment {path}")]
    #[diagnostic(code(kotbridge::write))]
    Write {
        /// Target file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A frontend could not parse a source file.
    #[error("parse error in {path}: {message}")]
    #[diagnostic(code(kotbridge::parse))]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}
