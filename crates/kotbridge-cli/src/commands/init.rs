//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# kotbridge configuration

[extraction]
# Project root; locations are recorded relative to it
project_dir = "."

# Where generated fragments are written. Without it, blocks are captured
# for introspection only.
extracted_dir = "build/generated/kotbridge/main/kjs"

# Source directories, relative to the project root
source_roots = ["src"]

# Glob patterns to exclude
exclude = [
    "**/build/**",
]

# fragment_extension = "kt"
# artifact_extension = "js"

# Fully-qualified marker names, for forks of the annotation library
[markers]
# capturable = "com.github.tarcv.kotbridge.Capturable"
# capture_source = "com.github.tarcv.kotbridge.CaptureSource"
# converters = "com.github.tarcv.kotbridge.Converters"
# no_import = "com.github.tarcv.kotbridge.KtJsNoImport"
"#;

/// Runs the init command, writing `kotbridge.toml` into `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join("kotbridge.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created kotbridge.toml");
    println!("\nNext steps:");
    println!("  1. Edit kotbridge.toml to point at your sources");
    println!("  2. Run: kotbridge extract");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kotbridge::Config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn template_parses_to_defaults() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.extraction.source_roots, vec!["src"]);
        assert_eq!(config.extraction.fragment_extension, "kt");
        assert_eq!(config.markers, kotbridge::MarkerConfig::default());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("kotbridge.toml"), "# mine\n").unwrap();

        assert!(run(tmp.path(), false).is_err());
        assert_eq!(
            fs::read_to_string(tmp.path().join("kotbridge.toml")).unwrap(),
            "# mine\n"
        );

        run(tmp.path(), true).unwrap();
        assert_eq!(
            fs::read_to_string(tmp.path().join("kotbridge.toml")).unwrap(),
            DEFAULT_CONFIG
        );
    }
}
