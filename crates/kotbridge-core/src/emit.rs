//! Rendering captured blocks into standalone compilation units.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use crate::converters::RequestedConverters;
use crate::error::CaptureError;
use crate::hash::fragment_hash;

/// Return type used when no parameter types are known.
pub const UNIT_TYPE: &str = "Unit";

/// Everything needed to render one fragment.
#[derive(Debug, Clone)]
pub struct FragmentRequest<'a> {
    /// Normalized block text.
    pub text: &'a str,
    /// Imports in order.
    pub imports: &'a [String],
    /// Converters wrapped around the entry point.
    pub converters: &'a RequestedConverters,
    /// Argument types followed by the return type.
    pub parameter_types: &'a [String],
    /// `file:line` of the block, before sanitizing.
    pub location: &'a str,
}

impl FragmentRequest<'_> {
    /// Renders the compilation unit.
    ///
    /// The unit holds the imports, an inline `__caller` that invokes the
    /// block with the same receiver and typing context, and an exported
    /// `entrypoint` applying the converters.
    #[must_use]
    pub fn render(&self) -> String {
        let (return_type, arguments) = match self.parameter_types.split_last() {
            Some((last, rest)) => (last.as_str(), rest),
            None => (UNIT_TYPE, &[][..]),
        };

        let names: Vec<String> = (1..=arguments.len()).map(|i| format!("__arg{i}")).collect();
        let signature: Vec<String> = names
            .iter()
            .zip(arguments)
            .map(|(name, ty)| format!("{name}: {ty}"))
            .collect();

        let mut caller_args = signature.clone();
        caller_args.push(format!("block: ({})->{return_type}", arguments.join(", ")));

        let invoke_args: Vec<String> = names
            .iter()
            .map(|name| format!("{}({name})", self.converters.argument))
            .collect();

        let mut out = self
            .imports
            .iter()
            .map(|fqn| format!("import {fqn}"))
            .collect::<Vec<_>>()
            .join("\n");
        // write! into a String cannot fail
        let _ = write!(
            out,
            "\ninline fun __caller({caller}): {return_type} = block({block_args})\n\
             /* {location} */ @JsExport fun entrypoint({signature}) = {result}(__caller({invoke}) {{\n\
             {text}\n\
             }})",
            caller = caller_args.join(", "),
            block_args = names.join(", "),
            location = sanitize_location(self.location),
            signature = signature.join(", "),
            result = self.converters.result,
            invoke = invoke_args.join(", "),
            text = self.text,
        );
        out
    }
}

/// Replaces characters that could end the comment or look like a path.
#[must_use]
pub fn sanitize_location(location: &str) -> String {
    location.replace(['*', '/', '\\'], "_")
}

/// Result of emitting a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedFragment {
    /// Content hash of the block text.
    pub hash: String,
    /// Generated file.
    pub path: PathBuf,
    /// Name of the compiled artifact the runtime loads.
    pub artifact_ref: String,
    /// `false` if an identical file was already present.
    pub written: bool,
}

/// Writes rendered fragments into a content-addressed directory.
///
/// The emitter remembers every hash it has written. A later block with the
/// same text reuses that file, so the `file:line` comment always names the
/// first occurrence and reruns leave the directory untouched.
#[derive(Debug)]
pub struct FragmentEmitter {
    out_dir: PathBuf,
    fragment_extension: String,
    artifact_extension: String,
    emitted: Mutex<HashMap<String, EmittedFragment>>,
}

impl FragmentEmitter {
    /// Creates an emitter writing `*.kt` units referenced as `*.js`.
    #[must_use]
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            fragment_extension: "kt".to_owned(),
            artifact_extension: "js".to_owned(),
            emitted: Mutex::default(),
        }
    }

    /// Same settings with nothing emitted yet, for a new extraction run.
    #[must_use]
    pub fn for_run(&self) -> Self {
        Self {
            out_dir: self.out_dir.clone(),
            fragment_extension: self.fragment_extension.clone(),
            artifact_extension: self.artifact_extension.clone(),
            emitted: Mutex::default(),
        }
    }

    /// Sets the extension of generated units.
    #[must_use]
    pub fn fragment_extension(mut self, extension: impl Into<String>) -> Self {
        self.fragment_extension = extension.into();
        self
    }

    /// Sets the extension of compiled artifacts.
    #[must_use]
    pub fn artifact_extension(mut self, extension: impl Into<String>) -> Self {
        self.artifact_extension = extension.into();
        self
    }

    /// Output directory.
    #[must_use]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Renders and writes `request`, leaving byte-identical files untouched.
    ///
    /// Two blocks with the same text share a file, rendered for whichever
    /// was emitted first. A hash collision between different texts is not
    /// detected.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Write`] if the directory or file cannot be
    /// written.
    pub fn emit(&self, request: &FragmentRequest<'_>) -> Result<EmittedFragment, CaptureError> {
        let hash = fragment_hash(request.text);
        let mut emitted = self.emitted.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(first) = emitted.get(&hash) {
            debug!("Fragment shared: {} ({})", first.path.display(), request.location);
            return Ok(EmittedFragment {
                written: false,
                ..first.clone()
            });
        }

        let path = self
            .out_dir
            .join(format!("{hash}.{}", self.fragment_extension));
        let rendered = request.render();

        fs::create_dir_all(&self.out_dir).map_err(|source| CaptureError::Write {
            path: self.out_dir.clone(),
            source,
        })?;

        let unchanged = fs::read(&path).is_ok_and(|existing| existing == rendered.as_bytes());
        if unchanged {
            debug!("Fragment unchanged: {}", path.display());
        } else {
            fs::write(&path, rendered.as_bytes()).map_err(|source| CaptureError::Write {
                path: path.clone(),
                source,
            })?;
            debug!("Fragment written: {}", path.display());
        }

        let fragment = EmittedFragment {
            artifact_ref: format!("{hash}.{}", self.artifact_extension),
            hash: hash.clone(),
            path,
            written: !unchanged,
        };
        emitted.insert(hash, fragment.clone());
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn converters(argument: &str, result: &str) -> RequestedConverters {
        RequestedConverters {
            argument: argument.into(),
            result: result.into(),
        }
    }

    #[test]
    fn renders_typed_entry_point() {
        let imports = vec!["p.ext.double".to_owned(), "p.ext.log".to_owned()];
        let types = vec!["kotlin.Int".to_owned(), "kotlin.String?".to_owned(), "kotlin.Int".to_owned()];
        let converters = converters("p.toJs", "p.fromJs");
        let request = FragmentRequest {
            text: "val x = a.double()\nx + b.orEmpty().length",
            imports: &imports,
            converters: &converters,
            parameter_types: &types,
            location: "Tests.kt:12",
        };

        insta::assert_snapshot!(request.render(), @r###"
        import p.ext.double
        import p.ext.log
        inline fun __caller(__arg1: kotlin.Int, __arg2: kotlin.String?, block: (kotlin.Int, kotlin.String?)->kotlin.Int): kotlin.Int = block(__arg1, __arg2)
        /* Tests.kt:12 */ @JsExport fun entrypoint(__arg1: kotlin.Int, __arg2: kotlin.String?) = p.fromJs(__caller(p.toJs(__arg1), p.toJs(__arg2)) {
        val x = a.double()
        x + b.orEmpty().length
        })
        "###);
    }

    #[test]
    fn renders_unit_block_without_imports_or_converters() {
        let converters = RequestedConverters::default();
        let request = FragmentRequest {
            text: "2 + 2",
            imports: &[],
            converters: &converters,
            parameter_types: &[],
            location: "src/A*B.kt:3",
        };
        assert_eq!(
            request.render(),
            "\ninline fun __caller(block: ()->Unit): Unit = block()\n\
             /* src_A_B.kt:3 */ @JsExport fun entrypoint() = (__caller() {\n2 + 2\n})"
        );
    }

    #[test]
    fn converters_apply_per_argument() {
        let types = vec!["kotlin.Int".to_owned(), "kotlin.Unit".to_owned()];
        let converters = converters("conv", "");
        let request = FragmentRequest {
            text: "it",
            imports: &[],
            converters: &converters,
            parameter_types: &types,
            location: "A.kt:1",
        };
        let rendered = request.render();
        assert!(rendered.contains("fun entrypoint(__arg1: kotlin.Int) = (__caller(conv(__arg1)) {"));
        assert!(rendered.contains("block: (kotlin.Int)->kotlin.Unit"));
    }

    #[test]
    fn second_emit_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let emitter = FragmentEmitter::new(dir.path().join("kjs"));
        let converters = RequestedConverters::default();
        let request = FragmentRequest {
            text: "2 + 2",
            imports: &[],
            converters: &converters,
            parameter_types: &[],
            location: "A.kt:1",
        };

        let first = emitter.emit(&request).unwrap();
        let written = fs::read_to_string(&first.path).unwrap();
        let second = emitter.emit(&request).unwrap();

        assert!(first.written);
        assert!(!second.written);
        assert_eq!(first, EmittedFragment { written: true, ..second.clone() });
        assert_eq!(fs::read_to_string(&second.path).unwrap(), written);
        assert_eq!(first.artifact_ref, format!("{}.js", first.hash));
        assert_eq!(
            first.path.file_name().unwrap().to_string_lossy(),
            format!("{}.kt", first.hash)
        );
    }

    #[test]
    fn identical_text_on_other_lines_shares_first_rendering() {
        let dir = TempDir::new().unwrap();
        let emitter = FragmentEmitter::new(dir.path());
        let converters = RequestedConverters::default();
        let request = |location| FragmentRequest {
            text: "2 + 2",
            imports: &[],
            converters: &converters,
            parameter_types: &[],
            location,
        };

        let first = emitter.emit(&request("A.kt:1")).unwrap();
        let second = emitter.emit(&request("A.kt:7")).unwrap();
        assert!(first.written);
        assert!(!second.written);
        assert_eq!(second.path, first.path);
        let content = fs::read_to_string(&first.path).unwrap();
        assert!(content.contains("/* A.kt:1 */"));

        let rerun = emitter.for_run();
        assert!(!rerun.emit(&request("A.kt:1")).unwrap().written);
        assert!(!rerun.emit(&request("A.kt:7")).unwrap().written);
        assert_eq!(fs::read_to_string(&first.path).unwrap(), content);
    }

    #[test]
    fn stale_content_is_overwritten() {
        let dir = TempDir::new().unwrap();
        let emitter = FragmentEmitter::new(dir.path())
            .fragment_extension("kts")
            .artifact_extension("mjs");
        let converters = RequestedConverters::default();
        let request = FragmentRequest {
            text: "1",
            imports: &[],
            converters: &converters,
            parameter_types: &[],
            location: "A.kt:1",
        };
        let path = dir.path().join(format!("{}.kts", fragment_hash("1")));
        fs::write(&path, "stale").unwrap();

        let emitted = emitter.emit(&request).unwrap();
        assert!(emitted.written);
        assert_eq!(emitted.path, path);
        assert!(emitted.artifact_ref.ends_with(".mjs"));
        assert_eq!(fs::read_to_string(&path).unwrap(), request.render());
    }
}
