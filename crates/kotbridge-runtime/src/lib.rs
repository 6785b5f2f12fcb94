//! # kotbridge-runtime
//!
//! Runtime counterpart of the kotbridge compiler pass.
//!
//! The pass turns every literal of a capturable type into a call to
//! [`attach_source`], passing the encoded [`SourceLocation`], the normalized
//! text and the artifact reference of the separately compiled fragment.
//! This crate decodes that data and makes it available to whatever executes
//! the fragment:
//!
//! - [`Capturable`] contract and the [`CapturedBlock`] wrapper
//! - [`SourceLocation`] with its strict three-line wire format
//! - [`FragmentLoader`] for resolving artifact references to compiled text

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod capturable;
mod error;
mod location;
mod resources;
mod source;

pub use capturable::{attach_source, Capturable, CapturedBlock};
pub use error::{LocationError, RuntimeError};
pub use location::{SourceLocation, SourceOffset};
pub use resources::{DirResources, FragmentLoader, ResourceResolver};
pub use source::Source;
