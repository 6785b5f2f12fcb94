//! # kotbridge-kotlin
//!
//! Tree-sitter based Kotlin frontend for kotbridge.
//!
//! [`KotlinFrontend`] implements [`kotbridge_core::Frontend`]: it folds
//! `const val` declarations, registers classes and function signatures, and
//! lowers each file into the IR the capture pass walks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod consts;
mod kotlin;
mod lower;
mod resolve;
mod syntax;
mod types;

pub use kotlin::KotlinFrontend;
