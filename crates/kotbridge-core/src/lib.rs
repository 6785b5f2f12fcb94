//! # kotbridge-core
//!
//! Compile-time engine that captures the source text of marked blocks and
//! declarations and turns captured blocks into standalone fragments.
//!
//! This crate provides:
//!
//! - a typed IR ([`ir`]) and a [`Visit`] trait over it
//! - the [`Frontend`] trait frontends implement to lower host source
//! - [`CaptureTransformer`], the per-file capture pass
//! - [`Extractor`] for running the pass over a whole project
//! - the pieces the pass is made of: [`body_span`], [`extract`],
//!   [`fragment_hash`], [`resolve_converters`], [`ImportDiscoverer`] and
//!   [`FragmentEmitter`]
//!
//! ## Example
//!
//! ```ignore
//! use kotbridge_core::Extractor;
//! use kotbridge_kotlin::KotlinFrontend;
//!
//! let extractor = Extractor::builder()
//!     .project_dir(".")
//!     .extracted_dir("build/generated/kotbridge/main/kjs")
//!     .frontend(KotlinFrontend::new())
//!     .build()?;
//!
//! let report = extractor.extract()?;
//! report.print_report();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod braces;
mod config;
mod context;
mod converters;
mod emit;
mod error;
mod extractor;
mod frontend;
mod hash;
mod imports;
mod markers;
mod symbols;
mod text;
mod transform;
mod types;

pub mod ir;
/// Helpers shared by frontends.
pub mod utils;
pub mod visit;

pub use braces::body_span;
pub use config::{
    Config, ConfigError, ExtractionConfig, MarkerConfig, PluginOptions, EXTRACTED_DIR_OPTION,
    PROJECT_DIR_OPTION,
};
pub use context::{normalize_newlines, relative_to, FileContext};
pub use converters::{resolve_converters, RequestedConverters, ARGUMENT_CONVERTER, RESULT_CONVERTER};
pub use emit::{sanitize_location, EmittedFragment, FragmentEmitter, FragmentRequest, UNIT_TYPE};
pub use error::{CaptureError, SpanError};
pub use extractor::{ExtractError, Extractor, ExtractorBuilder};
pub use frontend::{Frontend, FrontendBox};
pub use hash::fragment_hash;
pub use imports::{ImportDiscoverer, ImportSet};
pub use ir::{SourceFile, Span};
pub use markers::{Marker, MarkerRegistry};
pub use symbols::{FunctionSymbol, SymbolTable};
pub use text::{extract, trim_indent, ExtractedText};
pub use transform::CaptureTransformer;
pub use types::{Capture, CaptureKind, ExtractionReport, FileCaptures};
pub use visit::Visit;
