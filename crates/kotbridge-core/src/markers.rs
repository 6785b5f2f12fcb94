//! Marker annotations and types recognized by the capture pass.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::MarkerConfig;

/// Compile-time signals the capture pass reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Marker {
    /// Supertype of functional interfaces whose literals get captured.
    Capturable,
    /// Annotation requesting the source of the annotated declaration.
    CaptureSource,
    /// Annotation naming the argument/result converter functions.
    Converters,
    /// Annotation excluding an extension function from fragment imports.
    NoImport,
}

impl Marker {
    /// All markers, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Capturable,
        Self::CaptureSource,
        Self::Converters,
        Self::NoImport,
    ];
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Capturable => write!(f, "capturable"),
            Self::CaptureSource => write!(f, "capture-source"),
            Self::Converters => write!(f, "converters"),
            Self::NoImport => write!(f, "no-import"),
        }
    }
}

/// Maps fully-qualified names to [`Marker`]s.
///
/// Frontends resolve the names written in source (through imports and the
/// current package) and then ask the registry which marker, if any, a name
/// denotes.
#[derive(Debug, Clone)]
pub struct MarkerRegistry {
    by_fqn: HashMap<String, Marker>,
    config: MarkerConfig,
}

impl MarkerRegistry {
    /// Builds a registry from configured names.
    #[must_use]
    pub fn new(config: &MarkerConfig) -> Self {
        let by_fqn = Marker::ALL
            .iter()
            .map(|&marker| (config.fqn(marker).to_owned(), marker))
            .collect();
        Self {
            by_fqn,
            config: config.clone(),
        }
    }

    /// Returns the marker a fully-qualified name denotes.
    #[must_use]
    pub fn resolve(&self, fqn: &str) -> Option<Marker> {
        self.by_fqn.get(fqn).copied()
    }

    /// Returns `true` if `fqn` names any marker.
    #[must_use]
    pub fn is_marker(&self, fqn: &str) -> bool {
        self.by_fqn.contains_key(fqn)
    }

    /// Returns the configured fully-qualified name of `marker`.
    #[must_use]
    pub fn fqn(&self, marker: Marker) -> &str {
        self.config.fqn(marker)
    }
}

impl Default for MarkerRegistry {
    fn default() -> Self {
        Self::new(&MarkerConfig::default())
    }
}
