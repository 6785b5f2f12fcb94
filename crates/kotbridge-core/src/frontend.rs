//! Frontend trait for lowering host-language source into the IR.

use crate::context::FileContext;
use crate::error::CaptureError;
use crate::ir::SourceFile;
use crate::markers::MarkerRegistry;
use crate::symbols::SymbolTable;

/// A host-language frontend.
///
/// The extractor drives every frontend through three passes over all files
/// of a run: constants, then declarations, then lowering. Earlier passes
/// fill the shared [`SymbolTable`] so lowering can resolve names declared in
/// other files.
///
/// # Example
///
/// ```ignore
/// use kotbridge_core::{Frontend, FileContext, MarkerRegistry, SourceFile, SymbolTable};
///
/// struct Scripts;
///
/// impl Frontend for Scripts {
///     fn language_id(&self) -> &'static str { "script" }
///     fn extensions(&self) -> &'static [&'static str] { &["kts"] }
///
///     fn collect_declarations(&self, _: &FileContext, _: &mut SymbolTable, _: &MarkerRegistry)
///         -> Result<(), CaptureError> { Ok(()) }
///
///     fn lower(&self, _: &FileContext, _: &SymbolTable, _: &MarkerRegistry)
///         -> Result<SourceFile, CaptureError> { Ok(SourceFile::default()) }
/// }
/// ```
pub trait Frontend: Send + Sync {
    /// Language identifier (e.g., `"kotlin"`).
    fn language_id(&self) -> &'static str;

    /// File extensions handled, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Registers compile-time constants declared in `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed.
    fn collect_constants(
        &self,
        file: &FileContext<'_>,
        symbols: &mut SymbolTable,
        markers: &MarkerRegistry,
    ) -> Result<(), CaptureError> {
        let _ = (file, symbols, markers);
        Ok(())
    }

    /// Registers classes and functions declared in `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or an annotation
    /// argument is invalid.
    fn collect_declarations(
        &self,
        file: &FileContext<'_>,
        symbols: &mut SymbolTable,
        markers: &MarkerRegistry,
    ) -> Result<(), CaptureError>;

    /// Lowers `file` into the IR.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed.
    fn lower(
        &self,
        file: &FileContext<'_>,
        symbols: &SymbolTable,
        markers: &MarkerRegistry,
    ) -> Result<SourceFile, CaptureError>;

    /// Returns `true` if this frontend handles `extension`.
    fn handles(&self, extension: &str) -> bool {
        self.extensions().contains(&extension)
    }
}

/// Type alias for boxed [`Frontend`] trait objects.
pub type FrontendBox = Box<dyn Frontend>;
