//! Lookup of separately compiled fragments by artifact reference.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::error::RuntimeError;
use crate::source::Source;

/// Reads packaged resources by name.
pub trait ResourceResolver: Send + Sync {
    /// Reads the resource called `name` as text.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the resource does not exist or cannot be read.
    fn read(&self, name: &str) -> io::Result<String>;
}

/// Resolves resources relative to a directory on disk.
#[derive(Debug, Clone)]
pub struct DirResources {
    root: PathBuf,
}

impl DirResources {
    /// Creates a resolver rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the directory resources are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceResolver for DirResources {
    fn read(&self, name: &str) -> io::Result<String> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("resource name '{name}' is not a plain relative path"),
            ));
        }
        std::fs::read_to_string(self.root.join(relative))
    }
}

/// Loads compiled fragments for captured blocks, reading each one once.
pub struct FragmentLoader<R> {
    resolver: R,
    cache: Mutex<HashMap<String, Arc<str>>>,
}

impl<R: ResourceResolver> FragmentLoader<R> {
    /// Creates a loader backed by `resolver`.
    #[must_use]
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the compiled fragment for `source`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::NotEmitted`] for metadata-only captures and
    /// [`RuntimeError::FragmentNotFound`] when the resource cannot be read.
    pub fn load(&self, source: &Source) -> Result<Arc<str>, RuntimeError> {
        if !source.is_emitted() {
            return Err(RuntimeError::NotEmitted {
                location: source.location.to_string(),
            });
        }

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(script) = cache.get(&source.artifact_ref) {
            return Ok(Arc::clone(script));
        }

        debug!(artifact_ref = %source.artifact_ref, "loading compiled fragment");
        let script: Arc<str> = self
            .resolver
            .read(&source.artifact_ref)
            .map_err(|e| RuntimeError::FragmentNotFound {
                artifact_ref: source.artifact_ref.clone(),
                source: e,
            })?
            .into();
        cache.insert(source.artifact_ref.clone(), Arc::clone(&script));
        Ok(script)
    }

    /// Number of fragments loaded so far.
    #[must_use]
    pub fn loaded(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
