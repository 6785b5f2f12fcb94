//! Integration test: the extractor driving a toy frontend end-to-end.
//!
//! Toy sources declare capturable interfaces with `interface Name` lines
//! and use them as `Name { ... }`. Declarations and uses live in different
//! files to exercise the shared symbol table.

use kotbridge_core::ir::{ClassInfo, ClassKind, Expr, Lambda, SamConversion, SuperType, TypeRef};
use kotbridge_core::{
    CaptureError, CaptureKind, ExtractError, Extractor, FileContext, Frontend, Marker,
    MarkerRegistry, SourceFile, Span, SymbolTable,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct Toy;

fn owner(name: &str, markers: &MarkerRegistry) -> ClassInfo {
    ClassInfo {
        fqn: format!("toy.{name}"),
        name: name.to_string(),
        kind: ClassKind::FunInterface,
        type_parameters: Vec::new(),
        annotations: Vec::new(),
        supertypes: vec![SuperType {
            ty: TypeRef::named(markers.fqn(Marker::Capturable)),
            marker: Some(Marker::Capturable),
            annotations: Vec::new(),
        }],
    }
}

impl Frontend for Toy {
    fn language_id(&self) -> &'static str {
        "toy"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["blk"]
    }

    fn collect_declarations(
        &self,
        file: &FileContext<'_>,
        symbols: &mut SymbolTable,
        markers: &MarkerRegistry,
    ) -> Result<(), CaptureError> {
        for line in file.content.lines() {
            if let Some(name) = line.strip_prefix("interface ") {
                symbols.insert_class(owner(name.trim(), markers));
            }
        }
        Ok(())
    }

    fn lower(
        &self,
        file: &FileContext<'_>,
        symbols: &SymbolTable,
        _: &MarkerRegistry,
    ) -> Result<SourceFile, CaptureError> {
        if file.content.contains("!!") {
            return Err(CaptureError::Parse {
                path: file.path.to_path_buf(),
                message: "unexpected `!!`".to_string(),
            });
        }

        let text = file.content;
        let mut statements = Vec::new();
        for (open, _) in text.match_indices('{') {
            let name = text[..open]
                .trim_end()
                .rsplit(char::is_whitespace)
                .next()
                .unwrap_or_default();
            let Some(info) = symbols.class(&format!("toy.{name}")) else {
                continue;
            };
            let Some(close) = text[open..].find('}') else {
                continue;
            };
            let span = Span::new(open, open + close + 1);
            statements.push(Expr::SamConversion(SamConversion {
                span: Some(span),
                type_operand: TypeRef::named(&info.fqn),
                owner: info.clone(),
                operand: Box::new(Expr::Lambda(Lambda {
                    span: Some(span),
                    body: Vec::new(),
                })),
            }));
        }

        Ok(SourceFile {
            package: Some("toy".to_string()),
            declarations: Vec::new(),
            statements,
        })
    }
}

fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn resolves_interfaces_declared_in_other_files() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "src/a_use.blk", "val x = Block {\r\n    2 + 2\r\n}\r\n");
    write(tmp.path(), "src/z_decl.blk", "interface Block\n");

    let report = Extractor::builder()
        .project_dir(tmp.path())
        .frontend(Toy)
        .build()
        .unwrap()
        .extract()
        .unwrap();

    assert_eq!(report.files_processed, 2);
    assert_eq!(report.files.len(), 1);
    let capture = report.captures().next().unwrap();
    assert_eq!(capture.kind, CaptureKind::Block);
    assert_eq!(capture.subject, "toy.Block");
    assert_eq!(capture.source.text, "2 + 2");
    assert_eq!(capture.source.location.path, "src/a_use.blk");
    assert_eq!(capture.source.location.from.line, 2);
    assert_eq!(capture.source.location.from.column, 4);
    assert_eq!(capture.encoded_location(), "src/a_use.blk\n20,2,4\n25,2,9");
    assert!(!capture.source.is_emitted());
}

#[test]
fn emits_fragments_and_skips_unchanged_ones() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "src/main.blk",
        "interface Block\nval x = Block { 1 }\nval y = Block { 1 }\n",
    );

    let extractor = Extractor::builder()
        .project_dir(tmp.path())
        .extracted_dir("out")
        .frontend(Toy)
        .build()
        .unwrap();
    assert_eq!(extractor.extracted_dir(), Some(tmp.path().join("out").as_path()));

    let first = extractor.extract().unwrap();
    assert_eq!(first.capture_count(), 2);
    assert_eq!(first.fragments_written, 1);
    assert_eq!(first.fragments_unchanged, 1);

    let refs: Vec<_> = first.captures().map(|c| c.source.artifact_ref.clone()).collect();
    assert_eq!(refs[0], refs[1]);
    assert!(tmp.path().join("out").join(refs[0].replace(".js", ".kt")).exists());

    let second = extractor.extract().unwrap();
    assert_eq!(second.fragments_written, 0);
    assert_eq!(second.fragments_unchanged, 2);
}

#[test]
fn frontend_errors_abort_extraction() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "src/bad.blk", "val x = y!!\n");

    let err = Extractor::builder()
        .project_dir(tmp.path())
        .frontend(Toy)
        .build()
        .unwrap()
        .extract()
        .unwrap_err();

    assert!(matches!(
        err,
        ExtractError::Capture(CaptureError::Parse { .. })
    ));
}

#[test]
fn excluded_and_foreign_files_are_ignored() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "src/gen/a.blk", "interface Block\nval x = Block { 1 }\n");
    write(tmp.path(), "src/b.txt", "interface Block\nval x = Block { 1 }\n");

    let report = Extractor::builder()
        .project_dir(tmp.path())
        .exclude("**/gen/**")
        .frontend(Toy)
        .build()
        .unwrap()
        .extract()
        .unwrap();

    assert_eq!(report.files_processed, 0);
    assert_eq!(report.capture_count(), 0);
}
