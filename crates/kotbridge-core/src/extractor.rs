//! Extraction driver: discovers sources and runs the capture pass on them.

use crate::config::{Config, ConfigError};
use crate::context::{normalize_newlines, FileContext};
use crate::emit::FragmentEmitter;
use crate::error::CaptureError;
use crate::frontend::{Frontend, FrontendBox};
use crate::markers::MarkerRegistry;
use crate::symbols::SymbolTable;
use crate::transform::CaptureTransformer;
use crate::types::{ExtractionReport, FileCaptures};

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during extraction.
#[derive(Debug, Error, Diagnostic)]
pub enum ExtractError {
    /// IO error resolving directories.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The capture pass failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Capture(#[from] CaptureError),

    /// No frontend was registered.
    #[error("No frontend registered; nothing can be extracted")]
    NoFrontends,
}

/// Builder for configuring an [`Extractor`].
#[derive(Default)]
pub struct ExtractorBuilder {
    project_dir: Option<PathBuf>,
    extracted_dir: Option<PathBuf>,
    source_roots: Vec<String>,
    exclude_patterns: Vec<String>,
    frontends: Vec<FrontendBox>,
    config: Option<Config>,
}

impl ExtractorBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project root; locations are relative to it.
    #[must_use]
    pub fn project_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(path.into());
        self
    }

    /// Sets the fragment output directory. Without one, blocks are captured
    /// metadata-only.
    #[must_use]
    pub fn extracted_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.extracted_dir = Some(path.into());
        self
    }

    /// Adds a source root relative to the project root.
    #[must_use]
    pub fn source_root(mut self, root: impl Into<String>) -> Self {
        self.source_roots.push(root.into());
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Registers a frontend.
    #[must_use]
    pub fn frontend<F: Frontend + 'static>(mut self, frontend: F) -> Self {
        self.frontends.push(Box::new(frontend));
        self
    }

    /// Registers a boxed frontend.
    #[must_use]
    pub fn frontend_box(mut self, frontend: FrontendBox) -> Self {
        self.frontends.push(frontend);
        self
    }

    /// Sets the configuration. Explicit builder settings take precedence.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the extractor.
    ///
    /// # Errors
    ///
    /// Returns an error if no frontend is registered or the working
    /// directory cannot be determined.
    pub fn build(self) -> Result<Extractor, ExtractError> {
        if self.frontends.is_empty() {
            return Err(ExtractError::NoFrontends);
        }
        let config = self.config.unwrap_or_default();

        let project_dir = self
            .project_dir
            .unwrap_or_else(|| config.extraction.project_dir.clone());
        let project_dir = if project_dir.is_absolute() {
            project_dir
        } else {
            std::env::current_dir()?.join(&project_dir)
        };

        let extracted_dir = self
            .extracted_dir
            .or_else(|| config.extraction.extracted_dir.clone())
            .map(|dir| {
                if dir.is_absolute() {
                    dir
                } else {
                    project_dir.join(dir)
                }
            });
        let emitter = extracted_dir.map(|dir| {
            FragmentEmitter::new(dir)
                .fragment_extension(config.extraction.fragment_extension.clone())
                .artifact_extension(config.extraction.artifact_extension.clone())
        });

        let source_roots = if self.source_roots.is_empty() {
            config.extraction.source_roots.clone()
        } else {
            self.source_roots
        };

        // Merge exclude patterns from config
        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.extraction.exclude.iter().cloned());
        exclude_patterns.retain(|pattern| match glob::Pattern::new(pattern) {
            Ok(_) => true,
            Err(e) => {
                warn!("Ignoring invalid exclude pattern {:?}: {}", pattern, e);
                false
            }
        });

        Ok(Extractor {
            markers: MarkerRegistry::new(&config.markers),
            project_dir,
            emitter,
            source_roots,
            exclude_patterns,
            frontends: self.frontends,
        })
    }
}

struct LoadedFile {
    path: PathBuf,
    content: String,
    frontend: usize,
}

/// Runs the capture pass over a project.
///
/// Use [`Extractor::builder()`] to construct an instance.
pub struct Extractor {
    project_dir: PathBuf,
    emitter: Option<FragmentEmitter>,
    source_roots: Vec<String>,
    exclude_patterns: Vec<String>,
    frontends: Vec<FrontendBox>,
    markers: MarkerRegistry,
}

impl Extractor {
    /// Creates a new builder for configuring an extractor.
    #[must_use]
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    /// Returns the project root.
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Returns the fragment output directory, if fragments are emitted.
    #[must_use]
    pub fn extracted_dir(&self) -> Option<&Path> {
        self.emitter.as_ref().map(FragmentEmitter::out_dir)
    }

    /// Extracts every source file of the project.
    ///
    /// All files are read and indexed before any is transformed, so names
    /// declared in one file resolve in every other. The first failure aborts
    /// the run.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery, reading, parsing or capturing fails.
    pub fn extract(&self) -> Result<ExtractionReport, ExtractError> {
        info!("Starting extraction at {:?}", self.project_dir);

        let files = self.load_files()?;
        info!("Found {} files to extract", files.len());

        let mut symbols = SymbolTable::new();
        for file in &files {
            let ctx = FileContext::new(&file.path, &file.content, &self.project_dir);
            self.frontends[file.frontend].collect_constants(&ctx, &mut symbols, &self.markers)?;
        }
        for file in &files {
            let ctx = FileContext::new(&file.path, &file.content, &self.project_dir);
            self.frontends[file.frontend].collect_declarations(
                &ctx,
                &mut symbols,
                &self.markers,
            )?;
        }
        debug!("Indexed {} classes", symbols.class_count());

        let emitter = self.emitter.as_ref().map(FragmentEmitter::for_run);
        let mut report = ExtractionReport::new();
        for file in &files {
            debug!("Extracting: {}", file.path.display());
            let ctx = FileContext::new(&file.path, &file.content, &self.project_dir);
            let lowered = self.frontends[file.frontend].lower(&ctx, &symbols, &self.markers)?;

            let mut transformer = CaptureTransformer::new(&ctx);
            if let Some(emitter) = &emitter {
                transformer = transformer.with_emitter(emitter);
            }
            let captures = transformer.run(&lowered)?;

            report.add_file(FileCaptures {
                path: file.path.clone(),
                relative_path: ctx.relative_path.clone(),
                captures,
            });
        }

        info!(
            "Extraction complete: {} captures in {} files",
            report.capture_count(),
            report.files_processed
        );

        Ok(report)
    }

    fn load_files(&self) -> Result<Vec<LoadedFile>, ExtractError> {
        self.discover_files()?
            .into_iter()
            .map(|(path, frontend)| {
                let content = std::fs::read_to_string(&path).map_err(|source| {
                    ExtractError::Read {
                        path: path.clone(),
                        source,
                    }
                })?;
                Ok(LoadedFile {
                    content: normalize_newlines(&content).into_owned(),
                    path,
                    frontend,
                })
            })
            .collect()
    }

    /// Discovers source files with their frontend, sorted by path.
    fn discover_files(&self) -> Result<Vec<(PathBuf, usize)>, ExtractError> {
        let mut files = Vec::new();

        for root in &self.source_roots {
            let root = self.project_dir.join(root);
            for (index, frontend) in self.frontends.iter().enumerate() {
                for extension in frontend.extensions() {
                    let pattern = format!("{}/**/*.{extension}", root.display());
                    for entry in glob::glob(&pattern)? {
                        let path = entry.map_err(|e| ExtractError::Io(e.into_error()))?;

                        if self.should_exclude(&path) {
                            debug!("Excluding: {}", path.display());
                            continue;
                        }

                        files.push((path, index));
                    }
                }
            }
        }

        files.sort();
        files.dedup_by(|a, b| a.0 == b.0);
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        let relative = path
            .strip_prefix(&self.project_dir)
            .map_or_else(|_| path_str.to_string(), |p| p.to_string_lossy().into_owned());
        let rooted = format!("/{relative}");

        for pattern in &self.exclude_patterns {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) || glob_pattern.matches(&relative) {
                    return true;
                }
            }

            // Also check as substring for patterns like "**/build/**"
            let normalized_pattern = pattern.replace("**", "");
            if !normalized_pattern.is_empty()
                && normalized_pattern != "/"
                && rooted.contains(&normalized_pattern)
            {
                return true;
            }
        }

        false
    }
}
