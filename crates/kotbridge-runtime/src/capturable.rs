//! The capturable contract and the call the compiler pass injects.

use tracing::trace;

use crate::error::RuntimeError;
use crate::location::SourceLocation;
use crate::source::Source;

/// A value that can carry the source text it was written as.
///
/// Values start without a source. The compiler pass rewrites every literal
/// of a capturable type into a call to [`attach_source`], which is the only
/// place a source is supposed to be set.
pub trait Capturable: Sized {
    /// Returns the attached source.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::NoSource`] if no source was ever attached.
    fn source(&self) -> Result<&Source, RuntimeError>;

    /// Returns this value carrying `source`.
    #[must_use]
    fn with_source(self, source: Source) -> Self;
}

/// Decodes `location` and attaches it, along with `text` and `artifact_ref`,
/// to `value`.
///
/// # Errors
///
/// Returns [`RuntimeError::Location`] if `location` is malformed.
pub fn attach_source<T: Capturable>(
    value: T,
    location: &str,
    text: &str,
    artifact_ref: &str,
) -> Result<T, RuntimeError> {
    let location = SourceLocation::decode(location)?;
    trace!(%location, artifact_ref, "attaching captured source");
    Ok(value.with_source(Source::new(location, text, artifact_ref)))
}

/// A closure that may carry its captured source.
#[derive(Debug, Clone)]
pub struct CapturedBlock<F> {
    block: F,
    source: Option<Source>,
}

impl<F> CapturedBlock<F> {
    /// Wraps `block` without a source.
    #[must_use]
    pub const fn new(block: F) -> Self {
        Self {
            block,
            source: None,
        }
    }

    /// Returns the wrapped closure.
    #[must_use]
    pub const fn block(&self) -> &F {
        &self.block
    }

    /// Unwraps the closure, dropping the source.
    #[must_use]
    pub fn into_block(self) -> F {
        self.block
    }
}

impl<F> Capturable for CapturedBlock<F> {
    fn source(&self) -> Result<&Source, RuntimeError> {
        self.source.as_ref().ok_or(RuntimeError::NoSource)
    }

    fn with_source(self, source: Source) -> Self {
        Self {
            block: self.block,
            source: Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_is_missing_before_attachment() {
        let block = CapturedBlock::new(|| 2 + 2);
        let err = block.source().unwrap_err();
        assert_eq!(err.to_string(), "there is no source code for this block");
    }

    #[test]
    fn attach_source_decodes_location() {
        let block = attach_source(
            CapturedBlock::new(|| 2 + 2),
            "src/test/kotlin/CapturedLocationTests.kt\n231,9,12\n236,9,17",
            "2 + 2",
            "",
        )
        .unwrap();

        let source = block.source().unwrap();
        assert_eq!(source.text, "2 + 2");
        assert_eq!(source.location.path, "src/test/kotlin/CapturedLocationTests.kt");
        assert_eq!(source.location.from.char, 231);
        assert_eq!(source.location.from.line, 9);
        assert_eq!(source.location.from.column, 12);
        assert_eq!(source.location.to.char, 236);
        assert_eq!(source.location.to.column, 17);
        assert!(!source.is_emitted());
        assert_eq!((block.block())(), 4);
    }

    #[test]
    fn attach_source_fails_fast_on_malformed_location() {
        let result = attach_source(CapturedBlock::new(|| ()), "broken", "", "");
        assert!(matches!(result.err(), Some(RuntimeError::Location(_))));
    }
}
