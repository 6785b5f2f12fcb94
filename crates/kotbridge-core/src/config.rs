//! Configuration types for kotbridge.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::markers::Marker;

/// Plugin option naming the project root.
pub const PROJECT_DIR_OPTION: &str = "projectDir";

/// Plugin option naming the fragment output directory.
pub const EXTRACTED_DIR_OPTION: &str = "extractedDir";

/// Top-level configuration, usually read from `kotbridge.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Extraction settings.
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Fully-qualified names of the marker types.
    #[serde(default)]
    pub markers: MarkerConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Where to read sources and write fragments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Project root; locations are relative to it.
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,

    /// Output directory for generated fragments. Blocks are captured
    /// metadata-only when unset.
    #[serde(default)]
    pub extracted_dir: Option<PathBuf>,

    /// Source directories, relative to the project root.
    #[serde(default = "default_source_roots")]
    pub source_roots: Vec<String>,

    /// Glob patterns to exclude.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Extension of generated fragment files.
    #[serde(default = "default_fragment_extension")]
    pub fragment_extension: String,

    /// Extension of compiled fragment artifacts.
    #[serde(default = "default_artifact_extension")]
    pub artifact_extension: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            project_dir: default_project_dir(),
            extracted_dir: None,
            source_roots: default_source_roots(),
            exclude: default_exclude(),
            fragment_extension: default_fragment_extension(),
            artifact_extension: default_artifact_extension(),
        }
    }
}

fn default_project_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_source_roots() -> Vec<String> {
    vec!["src".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec!["**/build/**".to_string()]
}

fn default_fragment_extension() -> String {
    "kt".to_string()
}

fn default_artifact_extension() -> String {
    "js".to_string()
}

/// Marker names; override them to run against a fork of the annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Capturable supertype.
    pub capturable: String,
    /// Declaration capture annotation.
    pub capture_source: String,
    /// Converter annotation.
    pub converters: String,
    /// Import opt-out annotation.
    pub no_import: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            capturable: "com.github.tarcv.kotbridge.Capturable".to_string(),
            capture_source: "com.github.tarcv.kotbridge.CaptureSource".to_string(),
            converters: "com.github.tarcv.kotbridge.Converters".to_string(),
            no_import: "com.github.tarcv.kotbridge.KtJsNoImport".to_string(),
        }
    }
}

impl MarkerConfig {
    /// Returns the configured name of `marker`.
    #[must_use]
    pub fn fqn(&self, marker: Marker) -> &str {
        match marker {
            Marker::Capturable => &self.capturable,
            Marker::CaptureSource => &self.capture_source,
            Marker::Converters => &self.converters,
            Marker::NoImport => &self.no_import,
        }
    }
}

/// The two string options a build passes when invoking the plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOptions {
    /// Project root; defaults to the working directory.
    pub project_dir: Option<PathBuf>,
    /// Fragment output directory.
    pub extracted_dir: PathBuf,
}

impl PluginOptions {
    /// Reads options from name/value pairs.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown name or a missing `extractedDir`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<PathBuf>,
    {
        let mut project_dir = None;
        let mut extracted_dir = None;
        for (name, value) in pairs {
            match name.as_ref() {
                PROJECT_DIR_OPTION => project_dir = Some(value.into()),
                EXTRACTED_DIR_OPTION => extracted_dir = Some(value.into()),
                other => {
                    return Err(ConfigError::UnexpectedOption {
                        name: other.to_string(),
                    })
                }
            }
        }

        let extracted_dir = extracted_dir.ok_or_else(|| ConfigError::MissingOption {
            name: EXTRACTED_DIR_OPTION.to_string(),
        })?;
        Ok(Self {
            project_dir,
            extracted_dir,
        })
    }

    /// Overrides the matching settings of `config`.
    pub fn apply(&self, config: &mut ExtractionConfig) {
        if let Some(project_dir) = &self.project_dir {
            config.project_dir.clone_from(project_dir);
        }
        config.extracted_dir = Some(self.extracted_dir.clone());
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A plugin option the plugin does not know.
    #[error("Unexpected config option {name}")]
    UnexpectedOption {
        /// Option name.
        name: String,
    },

    /// A required plugin option was not passed.
    #[error("Missing required config option {name}")]
    MissingOption {
        /// Option name.
        name: String,
    },
}
