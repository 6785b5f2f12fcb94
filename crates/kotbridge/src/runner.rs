//! Convenience drivers running the Kotlin frontend over a project.

use kotbridge_core::{
    Config, ConfigError, ExtractError, ExtractionReport, Extractor, PluginOptions,
};
use kotbridge_kotlin::KotlinFrontend;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file names searched in a project root, in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &["kotbridge.toml", ".kotbridge.toml"];

/// Reads the first config file found in `root`, or the defaults.
///
/// A relative `project_dir` in the file is taken relative to `root`.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed.
pub fn load_project_config(root: &Path) -> Result<Config, ConfigError> {
    let mut config = match CONFIG_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.exists())
    {
        Some(path) => {
            debug!("Using config {:?}", path);
            Config::from_file(&path)?
        }
        None => Config::default(),
    };
    config.extraction.project_dir = anchor(root, &config.extraction.project_dir);
    Ok(config)
}

fn anchor(root: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else if dir == Path::new(".") {
        root.to_path_buf()
    } else {
        root.join(dir)
    }
}

/// Runs the Kotlin frontend with `config`.
///
/// # Errors
///
/// Returns an error if sources cannot be read or the capture pass fails.
pub fn extract_with_config(config: Config) -> Result<ExtractionReport, ExtractError> {
    info!(
        "Extracting captures under {:?}",
        config.extraction.project_dir
    );
    Extractor::builder()
        .config(config)
        .frontend(KotlinFrontend::new())
        .build()?
        .extract()
}

/// Runs the Kotlin frontend over the project at `root`, configured by its
/// `kotbridge.toml` if there is one.
///
/// # Errors
///
/// Returns an error if the config is invalid, sources cannot be read or
/// the capture pass fails.
pub fn extract_project(root: impl AsRef<Path>) -> Result<ExtractionReport, ExtractError> {
    let config = load_project_config(root.as_ref())?;
    extract_with_config(config)
}

/// Runs the Kotlin frontend the way a build invokes the plugin: with the
/// `projectDir` and `extractedDir` options as name/value pairs.
///
/// # Errors
///
/// Returns an error for unknown or missing options, and for every failure
/// of [`extract_with_config`].
pub fn extract_with_options<I, K, V>(options: I) -> Result<ExtractionReport, ExtractError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<PathBuf>,
{
    let options = PluginOptions::from_pairs(options)?;
    let root = options
        .project_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let mut config = load_project_config(&root)?;
    options.apply(&mut config.extraction);
    extract_with_config(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_project_config_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = load_project_config(dir.path()).unwrap();
        assert_eq!(config.extraction.project_dir, dir.path());
        assert!(config.extraction.extracted_dir.is_none());
    }

    #[test]
    fn load_project_config_prefers_visible_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("kotbridge.toml"),
            "[extraction]\nsource_roots = [\"app\"]\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(".kotbridge.toml"),
            "[extraction]\nsource_roots = [\"hidden\"]\n",
        )
        .unwrap();
        let config = load_project_config(dir.path()).unwrap();
        assert_eq!(config.extraction.source_roots, vec!["app"]);
    }

    #[test]
    fn load_project_config_anchors_relative_project_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".kotbridge.toml"),
            "[extraction]\nproject_dir = \"app\"\n",
        )
        .unwrap();
        let config = load_project_config(dir.path()).unwrap();
        assert_eq!(config.extraction.project_dir, dir.path().join("app"));
    }

    #[test]
    fn load_project_config_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("kotbridge.toml"), "[extraction\n").unwrap();
        assert!(matches!(
            load_project_config(dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn extract_with_options_rejects_unknown_option() {
        let err = extract_with_options([("extractedDir", "out"), ("mode", "fast")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Unexpected config option mode"
        );
    }
}
