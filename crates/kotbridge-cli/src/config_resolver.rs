//! Locating and loading `kotbridge.toml`.
//!
//! Lookup order, first hit wins:
//!
//! 1. `--config PATH`, taken as-is
//! 2. `kotbridge.toml`, then `.kotbridge.toml`, in the project root
//! 3. `config.toml` in `$KOTBRIDGE_CONFIG_DIR`, or in `~/.kotbridge/`
//! 4. built-in defaults

use anyhow::{Context, Result};
use kotbridge::{Config, CONFIG_FILE_NAMES};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Origin of the configuration in effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed on the command line.
    Explicit(PathBuf),
    /// Found in the project root.
    Project(PathBuf),
    /// Found in the per-user config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// File the configuration comes from.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Reads the configuration, or returns the defaults for
    /// [`ConfigSource::Default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            info!("Using global config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Finds the configuration for a project.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    global_dir: Option<PathBuf>,
}

impl ConfigResolver {
    /// Resolver using `$KOTBRIDGE_CONFIG_DIR`, falling back to
    /// `~/.kotbridge/`.
    #[must_use]
    pub fn from_env() -> Self {
        let global_dir = std::env::var_os("KOTBRIDGE_CONFIG_DIR")
            .map(PathBuf::from)
            .or_else(|| home::home_dir().map(|home| home.join(".kotbridge")));
        Self { global_dir }
    }

    /// Resolver with a fixed per-user config directory.
    #[must_use]
    pub fn with_global_dir(global_dir: Option<PathBuf>) -> Self {
        Self { global_dir }
    }

    /// Applies the lookup order described in the module docs.
    #[must_use]
    pub fn resolve(&self, project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
        if let Some(path) = explicit {
            return ConfigSource::Explicit(path.to_path_buf());
        }

        if let Some(path) = CONFIG_FILE_NAMES
            .iter()
            .map(|name| project_dir.join(name))
            .find(|path| path.is_file())
        {
            debug!("Found project config: {}", path.display());
            return ConfigSource::Project(path);
        }

        self.global_dir
            .as_ref()
            .map(|dir| dir.join("config.toml"))
            .filter(|path| path.is_file())
            .map_or(ConfigSource::Default, |path| {
                debug!("Found global config: {}", path.display());
                ConfigSource::Global(path)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn resolve(project: &Path, global: Option<&Path>) -> ConfigSource {
        ConfigResolver::with_global_dir(global.map(Path::to_path_buf)).resolve(project, None)
    }

    #[test]
    fn explicit_path_is_used_unchecked() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("kotbridge.toml"), "").unwrap();

        let source = ConfigResolver::default()
            .resolve(project.path(), Some(Path::new("/nonexistent.toml")));
        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("/nonexistent.toml")));
        assert!(source.load().is_err());
    }

    #[test]
    fn visible_project_file_beats_hidden_one() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join(".kotbridge.toml"), "").unwrap();
        assert_eq!(
            resolve(project.path(), None),
            ConfigSource::Project(project.path().join(".kotbridge.toml"))
        );

        fs::write(project.path().join("kotbridge.toml"), "").unwrap();
        assert_eq!(
            resolve(project.path(), None),
            ConfigSource::Project(project.path().join("kotbridge.toml"))
        );
    }

    #[test]
    fn global_config_only_without_project_config() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(
            global.path().join("config.toml"),
            "[extraction]\nsource_roots = [\"src/main/kotlin\"]\n",
        )
        .unwrap();

        let source = resolve(project.path(), Some(global.path()));
        assert_eq!(source, ConfigSource::Global(global.path().join("config.toml")));
        assert_eq!(
            source.load().unwrap().extraction.source_roots,
            vec!["src/main/kotlin"]
        );

        fs::write(project.path().join("kotbridge.toml"), "").unwrap();
        assert!(matches!(
            resolve(project.path(), Some(global.path())),
            ConfigSource::Project(_)
        ));
    }

    #[test]
    fn defaults_when_nothing_found() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();

        let source = resolve(project.path(), Some(global.path()));
        assert_eq!(source, ConfigSource::Default);
        assert!(source.path().is_none());
        assert!(source.load().unwrap().extraction.extracted_dir.is_none());
    }
}
