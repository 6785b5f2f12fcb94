//! Results of the capture pass.

use kotbridge_runtime::Source;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::converters::RequestedConverters;
use crate::emit::EmittedFragment;

/// What was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    /// A lambda converted to a capturable interface.
    Block,
    /// A declaration annotated for source capture.
    Declaration,
}

impl std::fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Block => write!(f, "block"),
            Self::Declaration => write!(f, "declaration"),
        }
    }
}

/// One captured block or declaration.
///
/// `source` holds exactly what the generated code hands to the runtime:
/// the location, the normalized text and the artifact reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capture {
    /// Block or declaration.
    pub kind: CaptureKind,
    /// Capturable interface of a block, or the captured declaration.
    pub subject: String,
    /// Captured source.
    pub source: Source,
    /// Imports of the generated fragment.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    /// Converters of the generated fragment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converters: Option<RequestedConverters>,
    /// Argument and return types of the generated fragment.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameter_types: Vec<String>,
    /// Generated fragment, for emitted blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<EmittedFragment>,
}

impl Capture {
    /// Encoded location literal injected into the host program.
    #[must_use]
    pub fn encoded_location(&self) -> String {
        self.source.location.encode()
    }
}

/// Captures found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCaptures {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the project root.
    pub relative_path: String,
    /// Captures in traversal order.
    pub captures: Vec<Capture>,
}

/// Outcome of an extraction run.
#[derive(Debug, Default, Serialize)]
pub struct ExtractionReport {
    /// Files with at least one capture.
    pub files: Vec<FileCaptures>,
    /// Number of files processed.
    pub files_processed: usize,
    /// Fragments written to disk.
    pub fragments_written: usize,
    /// Fragments left untouched because identical content existed.
    pub fragments_unchanged: usize,
}

impl ExtractionReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the captures of one processed file.
    pub fn add_file(&mut self, file: FileCaptures) {
        self.files_processed += 1;
        for fragment in file.captures.iter().filter_map(|c| c.fragment.as_ref()) {
            if fragment.written {
                self.fragments_written += 1;
            } else {
                self.fragments_unchanged += 1;
            }
        }
        if !file.captures.is_empty() {
            self.files.push(file);
        }
    }

    /// All captures in file order.
    pub fn captures(&self) -> impl Iterator<Item = &Capture> {
        self.files.iter().flat_map(|f| f.captures.iter())
    }

    /// Total number of captures.
    #[must_use]
    pub fn capture_count(&self) -> usize {
        self.files.iter().map(|f| f.captures.len()).sum()
    }

    /// Formats a human-readable summary.
    #[must_use]
    pub fn format_report(&self) -> String {
        let mut report = String::new();
        for file in &self.files {
            for capture in &file.captures {
                let _ = writeln!(
                    report,
                    "{} {} at {}",
                    capture.kind, capture.subject, capture.source.location
                );
                if let Some(fragment) = &capture.fragment {
                    let state = if fragment.written { "written" } else { "unchanged" };
                    let _ = writeln!(report, "  = fragment: {} ({state})", fragment.path.display());
                }
                for import in &capture.imports {
                    let _ = writeln!(report, "  = import: {import}");
                }
            }
        }
        let _ = writeln!(
            report,
            "Captured {} block(s)/declaration(s) in {} file(s); {} fragment(s) written, {} unchanged",
            self.capture_count(),
            self.files_processed,
            self.fragments_written,
            self.fragments_unchanged
        );
        report
    }

    /// Prints [`Self::format_report`] to stdout.
    pub fn print_report(&self) {
        print!("{}", self.format_report());
    }
}
