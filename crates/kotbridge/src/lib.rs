//! # kotbridge
//!
//! Build-time source capture for Kotlin.
//!
//! This is the main facade crate that re-exports the capture engine, the
//! Kotlin frontend, the runtime types and the `Capturable` derive.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let report = kotbridge::extract_project("path/to/project")?;
//! for capture in report.captures() {
//!     println!("{}: {}", capture.source.location, capture.source.text);
//! }
//! ```
//!
//! Configure the run with a `kotbridge.toml` in the project root:
//!
//! ```toml
//! [extraction]
//! extracted_dir = "build/generated/kotbridge/main/kjs"
//! source_roots = ["src/main/kotlin"]
//! ```
//!
//! ## Runtime Side
//!
//! ```rust,ignore
//! use kotbridge::runtime::{attach_source, Capturable, Source};
//!
//! #[derive(kotbridge::Capturable)]
//! struct Script {
//!     body: fn() -> i32,
//!     source: Option<Source>,
//! }
//!
//! let script = attach_source(
//!     Script { body: || 4, source: None },
//!     "src/App.kt\n120,9,12\n125,9,17",
//!     "2 + 2",
//!     "",
//! )?;
//! assert_eq!(script.source()?.text, "2 + 2");
//! ```

#![forbid(unsafe_code)]

// Re-export the engine
pub use kotbridge_core::*;

// Re-export the Kotlin frontend
pub use kotbridge_kotlin::KotlinFrontend;

// Re-export the derive for #[derive(kotbridge::Capturable)]
pub use kotbridge_macros::Capturable;

/// Runtime types the generated code and fragment executors use.
pub mod runtime {
    pub use kotbridge_runtime::*;
}

mod runner;

pub use runner::{
    extract_project, extract_with_config, extract_with_options, load_project_config,
    CONFIG_FILE_NAMES,
};
