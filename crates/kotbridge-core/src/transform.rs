//! The capture pass over one lowered file.

use kotbridge_runtime::Source;
use tracing::debug;

use crate::braces::body_span;
use crate::context::FileContext;
use crate::converters::resolve_converters;
use crate::emit::{FragmentEmitter, FragmentRequest};
use crate::error::CaptureError;
use crate::imports::ImportDiscoverer;
use crate::ir::{Declaration, SamConversion, SourceFile, Span};
use crate::markers::Marker;
use crate::text::extract;
use crate::types::{Capture, CaptureKind};
use crate::visit::{self, Visit};

/// Finds capturable blocks and annotated declarations in one file.
///
/// Blocks are lambdas converted to an interface that directly extends the
/// capturable marker. Their body text is captured and, when an emitter is
/// set, rendered into a standalone fragment. Declarations carrying exactly
/// one capture-source annotation get their text captured without a
/// fragment. Nodes without a span are skipped.
pub struct CaptureTransformer<'a> {
    file: &'a FileContext<'a>,
    emitter: Option<&'a FragmentEmitter>,
    captures: Vec<Capture>,
    error: Option<CaptureError>,
}

impl<'a> CaptureTransformer<'a> {
    /// Creates a metadata-only transformer.
    #[must_use]
    pub fn new(file: &'a FileContext<'a>) -> Self {
        Self {
            file,
            emitter: None,
            captures: Vec::new(),
            error: None,
        }
    }

    /// Emits a fragment for every captured block.
    #[must_use]
    pub fn with_emitter(mut self, emitter: &'a FragmentEmitter) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Runs the pass, returning captures in traversal order.
    ///
    /// # Errors
    ///
    /// Returns the first [`CaptureError`] met; traversal stops there.
    pub fn run(mut self, source: &SourceFile) -> Result<Vec<Capture>, CaptureError> {
        self.visit_source_file(source);
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.captures),
        }
    }

    fn record(&mut self, result: Result<Option<Capture>, CaptureError>) {
        match result {
            Ok(Some(capture)) => {
                debug!(
                    "Captured {} {} at {}",
                    capture.kind, capture.subject, capture.source.location
                );
                self.captures.push(capture);
            }
            Ok(None) => {}
            Err(e) => self.error = Some(e),
        }
    }

    fn capture_block(&self, sam: &SamConversion) -> Result<Option<Capture>, CaptureError> {
        let converters = resolve_converters(&sam.owner, self.file)?;
        let Some(span) = sam.span else {
            debug!("Skipping {} conversion without a span", sam.owner.fqn);
            return Ok(None);
        };

        let imports = ImportDiscoverer::discover(&sam.operand);
        let body = body_span(self.file.content, span).map_err(|e| self.file.span_error(e))?;
        let extracted = extract(self.file.content, body).map_err(|e| self.file.span_error(e))?;
        let location = self.file.location(extracted.trimmed)?;
        let parameter_types: Vec<String> = sam
            .type_operand
            .arguments
            .iter()
            .map(ToString::to_string)
            .collect();

        let fragment = match self.emitter {
            Some(emitter) => {
                let site = format!("{}:{}", self.file.file_name(), location.from.line);
                Some(emitter.emit(&FragmentRequest {
                    text: &extracted.text,
                    imports: &imports,
                    converters: &converters,
                    parameter_types: &parameter_types,
                    location: &site,
                })?)
            }
            None => None,
        };
        let artifact_ref = fragment
            .as_ref()
            .map(|f| f.artifact_ref.clone())
            .unwrap_or_default();

        Ok(Some(Capture {
            kind: CaptureKind::Block,
            subject: sam.owner.fqn.clone(),
            source: Source::new(location, extracted.text, artifact_ref),
            imports,
            converters: Some(converters),
            parameter_types,
            fragment,
        }))
    }

    fn capture_declaration(&self, decl: &Declaration) -> Result<Option<Capture>, CaptureError> {
        let mut markers = decl
            .annotations()
            .iter()
            .filter(|a| a.is(Marker::CaptureSource));
        let (Some(annotation), None) = (markers.next(), markers.next()) else {
            return Ok(None);
        };
        let (Some(annotation_span), Some(decl_span)) = (annotation.span, decl.span()) else {
            debug!("Skipping {} without a span", decl.fqn());
            return Ok(None);
        };

        // Starts after the annotation so its own text is not captured.
        let range = Span::new(annotation_span.end, decl_span.end);
        let extracted = extract(self.file.content, range).map_err(|e| self.file.span_error(e))?;
        let location = self.file.location(extracted.trimmed)?;

        Ok(Some(Capture {
            kind: CaptureKind::Declaration,
            subject: decl.fqn().to_owned(),
            source: Source::new(location, extracted.text, ""),
            imports: Vec::new(),
            converters: None,
            parameter_types: Vec::new(),
            fragment: None,
        }))
    }
}

impl<'ast> Visit<'ast> for CaptureTransformer<'_> {
    fn visit_declaration(&mut self, node: &'ast Declaration) {
        if self.error.is_some() {
            return;
        }
        let result = self.capture_declaration(node);
        self.record(result);
        visit::visit_declaration(self, node);
    }

    fn visit_sam_conversion(&mut self, node: &'ast SamConversion) {
        if self.error.is_some() {
            return;
        }
        if node.owner.is_capturable() {
            let result = self.capture_block(node);
            self.record(result);
        }
        visit::visit_sam_conversion(self, node);
    }
}
