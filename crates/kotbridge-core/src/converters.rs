//! Resolving the converter functions wrapped around a fragment entry point.

use miette::NamedSource;
use serde::{Deserialize, Serialize};

use crate::context::FileContext;
use crate::error::CaptureError;
use crate::ir::{Annotation, ClassInfo, ConstValue};
use crate::markers::Marker;

/// Converter applied to each entry point argument.
pub const ARGUMENT_CONVERTER: &str = "toJsConverter";

/// Converter applied to the entry point result.
pub const RESULT_CONVERTER: &str = "fromJsConverter";

/// Converter function names; empty means pass-through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedConverters {
    /// Fully-qualified argument converter.
    pub argument: String,
    /// Fully-qualified result converter.
    pub result: String,
}

/// Resolves converters for a capturable interface.
///
/// Candidates are the interface's own annotations followed by each direct
/// supertype's. Earlier candidates win per slot and an empty value never
/// replaces a resolved one.
///
/// # Errors
///
/// Returns [`CaptureError::NonConstantArgument`] if a converter argument is
/// not a compile-time constant.
pub fn resolve_converters(
    owner: &ClassInfo,
    file: &FileContext<'_>,
) -> Result<RequestedConverters, CaptureError> {
    let candidates = std::iter::once(owner.annotations.as_slice())
        .chain(owner.supertypes.iter().map(|s| s.annotations.as_slice()));

    candidates
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .try_fold(RequestedConverters::default(), |acc, annotations| {
            let Some(annotation) = annotations.iter().find(|a| a.is(Marker::Converters)) else {
                return Ok(acc);
            };
            Ok(RequestedConverters {
                argument: slot(annotation, ARGUMENT_CONVERTER, 0, file)?.unwrap_or(acc.argument),
                result: slot(annotation, RESULT_CONVERTER, 1, file)?.unwrap_or(acc.result),
            })
        })
}

fn slot(
    annotation: &Annotation,
    name: &str,
    position: usize,
    file: &FileContext<'_>,
) -> Result<Option<String>, CaptureError> {
    match annotation.argument(name, position) {
        None => Ok(None),
        Some(ConstValue::NonConstant { text, span }) => {
            let span = span.or(annotation.span).unwrap_or_default();
            Err(CaptureError::NonConstantArgument {
                annotation: annotation.name.clone(),
                text: text.clone(),
                source_code: NamedSource::new(file.relative_path.clone(), file.content.to_owned()),
                span: (span.start, span.len()).into(),
            })
        }
        Some(value) => Ok(value.as_text().filter(|s| !s.is_empty())),
    }
}
