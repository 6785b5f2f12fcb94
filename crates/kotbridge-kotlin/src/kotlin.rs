//! Kotlin frontend using Tree-sitter.

use kotbridge_core::{
    CaptureError, FileContext, Frontend, MarkerRegistry, SourceFile, SymbolTable,
};
use tracing::debug;
use tree_sitter::{Language, Parser, Tree};

use crate::lower::Lowerer;
use crate::resolve::FileScope;

/// Lowers Kotlin sources (`.kt`, `.kts`) into the kotbridge IR.
///
/// Names are resolved through the file's imports, its package, enclosing
/// classes and the default Kotlin imports. Expression types are not
/// inferred: a lambda becomes a functional-interface conversion only when
/// it is passed to a known function parameter of such a type or to the
/// interface's own constructor.
pub struct KotlinFrontend {
    language: Language,
}

impl KotlinFrontend {
    /// Creates a new Kotlin frontend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_kotlin_ng::LANGUAGE.into(),
        }
    }

    fn parse(&self, file: &FileContext<'_>) -> Result<Tree, CaptureError> {
        let parse_error = |message: String| CaptureError::Parse {
            path: file.path.to_path_buf(),
            message,
        };

        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| parse_error(e.to_string()))?;
        let tree = parser
            .parse(file.content, None)
            .ok_or_else(|| parse_error("parser produced no tree".to_string()))?;

        if tree.root_node().has_error() {
            debug!("Syntax errors in {}, continuing", file.relative_path);
        }
        Ok(tree)
    }
}

impl Default for KotlinFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for KotlinFrontend {
    fn language_id(&self) -> &'static str {
        "kotlin"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["kt", "kts"]
    }

    fn collect_constants(
        &self,
        file: &FileContext<'_>,
        symbols: &mut SymbolTable,
        markers: &MarkerRegistry,
    ) -> Result<(), CaptureError> {
        let tree = self.parse(file)?;
        let root = tree.root_node();
        let scope = FileScope::new(&root, file.content);
        let constants = Lowerer::new(file.content, &scope, symbols, markers).constants(&root);

        debug!("Found {} constants in {}", constants.len(), file.relative_path);
        for (fqn, value) in constants {
            symbols.insert_constant(fqn, value);
        }
        Ok(())
    }

    fn collect_declarations(
        &self,
        file: &FileContext<'_>,
        symbols: &mut SymbolTable,
        markers: &MarkerRegistry,
    ) -> Result<(), CaptureError> {
        let tree = self.parse(file)?;
        let root = tree.root_node();
        let scope = FileScope::new(&root, file.content);
        let found = Lowerer::new(file.content, &scope, symbols, markers).declarations(&root);

        debug!(
            "Found {} classes and {} functions in {}",
            found.classes.len(),
            found.functions.len(),
            file.relative_path
        );
        for class in found.classes {
            symbols.insert_class(class);
        }
        for function in found.functions {
            symbols.insert_function(function);
        }
        Ok(())
    }

    fn lower(
        &self,
        file: &FileContext<'_>,
        symbols: &SymbolTable,
        markers: &MarkerRegistry,
    ) -> Result<SourceFile, CaptureError> {
        let tree = self.parse(file)?;
        let root = tree.root_node();
        let scope = FileScope::new(&root, file.content);
        Ok(Lowerer::new(file.content, &scope, symbols, markers).lower_file(&root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kotbridge_core::ir::{ClassKind, ConstValue, Declaration};
    use kotbridge_core::{CaptureKind, CaptureTransformer, Marker};
    use std::path::Path;

    const DEMO: &str = r#"package demo

import com.github.tarcv.kotbridge.Capturable
import com.github.tarcv.kotbridge.CaptureSource
import com.github.tarcv.kotbridge.Converters
import org.w3c.dom.asList

private const val SUFFIX = "Converter"

class Tests {
    @Converters(toJsConverter = "t" + 0 + "Js" + SUFFIX, fromJsConverter = "fr${0}mJs${SUFFIX}")
    fun interface Block<R> : Capturable<Block<R>> {
        fun invoke(): R
    }

    fun <R> execute(block: Block<R>): R = TODO()

    fun run() {
        execute {
            document.querySelectorAll("td").asList()
        }
    }

    @CaptureSource
    interface Captured {
        val answer get() = 42
    }
}
"#;

    struct Loaded {
        symbols: SymbolTable,
        markers: MarkerRegistry,
    }

    fn load(src: &str) -> Loaded {
        let frontend = KotlinFrontend::new();
        let markers = MarkerRegistry::default();
        let mut symbols = SymbolTable::new();
        let file = FileContext::new(Path::new("/p/src/Demo.kt"), src, Path::new("/p"));
        frontend
            .collect_constants(&file, &mut symbols, &markers)
            .unwrap();
        frontend
            .collect_declarations(&file, &mut symbols, &markers)
            .unwrap();
        Loaded { symbols, markers }
    }

    fn lower(src: &str) -> SourceFile {
        let loaded = load(src);
        let file = FileContext::new(Path::new("/p/src/Demo.kt"), src, Path::new("/p"));
        KotlinFrontend::new()
            .lower(&file, &loaded.symbols, &loaded.markers)
            .unwrap()
    }

    #[test]
    fn test_language() {
        let frontend = KotlinFrontend::default();
        assert_eq!(frontend.language_id(), "kotlin");
        assert!(frontend.handles("kt"));
        assert!(frontend.handles("kts"));
        assert!(!frontend.handles("java"));
    }

    #[test]
    fn test_collects_constants() {
        let loaded = load(DEMO);
        assert_eq!(
            loaded.symbols.constant("demo.SUFFIX"),
            Some(&ConstValue::String("Converter".to_string()))
        );
    }

    #[test]
    fn test_constants_referencing_later_constants() {
        let loaded = load(
            "object Names {\n    const val FULL = PREFIX + \"-\" + 2\n    const val PREFIX = \"ab\"\n}\n",
        );
        assert_eq!(
            loaded.symbols.constant("Names.FULL"),
            Some(&ConstValue::String("ab-2".to_string()))
        );
    }

    #[test]
    fn test_collects_fun_interface() {
        let loaded = load(DEMO);
        let block = loaded.symbols.class("demo.Tests.Block").unwrap();
        assert_eq!(block.kind, ClassKind::FunInterface);
        assert_eq!(block.type_parameters, vec!["R"]);
        assert!(block.is_capturable());
        assert_eq!(
            block.supertypes[0].ty.to_string(),
            "com.github.tarcv.kotbridge.Capturable<demo.Tests.Block<R>>"
        );

        let converters = &block.annotations[0];
        assert!(converters.is(Marker::Converters));
        assert_eq!(
            converters.argument("toJsConverter", 0),
            Some(&ConstValue::String("t0JsConverter".to_string()))
        );
        assert_eq!(
            converters.argument("fromJsConverter", 1),
            Some(&ConstValue::String("fr0mJsConverter".to_string()))
        );
    }

    #[test]
    fn test_collects_functions() {
        let loaded = load(DEMO);
        let execute = &loaded.symbols.functions("demo.Tests.execute")[0];
        assert_eq!(execute.type_parameters, vec!["R"]);
        assert_eq!(execute.parameters[0].to_string(), "demo.Tests.Block<R>");
        assert!(!execute.reference.extension_receiver);
    }

    #[test]
    fn test_extension_function() {
        let loaded = load("package demo\n\nfun <T> List<T>.second(): T = this[1]\n");
        let second = &loaded.symbols.functions("demo.second")[0];
        assert!(second.reference.extension_receiver);
        assert!(second.parameters.is_empty());
    }

    #[test]
    fn test_lowers_lambda_argument_to_sam_conversion() {
        let file = lower(DEMO);
        let tests = file
            .declarations
            .iter()
            .find_map(|d| match d {
                Declaration::Class(class) if class.info.name == "Tests" => Some(class),
                _ => None,
            })
            .expect("class Tests");
        assert_eq!(tests.info.fqn, "demo.Tests");
        assert!(matches!(file.declarations[0], Declaration::Property(_)));

        let conversions = conversions(DEMO, &file);
        assert_eq!(conversions.len(), 1);
        let (span_text, type_operand, _) = &conversions[0];
        assert!(span_text.starts_with('{'));
        assert!(span_text.contains("querySelectorAll"));
        assert_eq!(type_operand, "demo.Tests.Block<kotlin.Any?>");
    }

    /// Source text, type operand and capturability of every conversion.
    fn conversions(src: &str, file: &SourceFile) -> Vec<(String, String, bool)> {
        use kotbridge_core::ir::SamConversion;
        use kotbridge_core::visit::{self, Visit};

        struct Collector<'s> {
            src: &'s str,
            out: Vec<(String, String, bool)>,
        }
        impl<'ast> Visit<'ast> for Collector<'_> {
            fn visit_sam_conversion(&mut self, node: &'ast SamConversion) {
                let span = node.span.unwrap();
                self.out.push((
                    self.src[span.start..span.end].to_string(),
                    node.type_operand.to_string(),
                    node.owner.is_capturable(),
                ));
                visit::visit_sam_conversion(self, node);
            }
        }
        let mut collector = Collector {
            src,
            out: Vec::new(),
        };
        collector.visit_source_file(file);
        collector.out
    }

    #[test]
    fn test_capture_pass_over_kotlin() {
        let loaded = load(DEMO);
        let file = FileContext::new(Path::new("/p/src/Demo.kt"), DEMO, Path::new("/p"));
        let lowered = KotlinFrontend::new()
            .lower(&file, &loaded.symbols, &loaded.markers)
            .unwrap();
        let captures = CaptureTransformer::new(&file).run(&lowered).unwrap();

        assert_eq!(captures.len(), 2);
        let block = &captures[0];
        assert_eq!(block.kind, CaptureKind::Block);
        assert_eq!(
            block.source.text,
            "document.querySelectorAll(\"td\").asList()"
        );
        assert_eq!(block.imports, vec!["org.w3c.dom.asList"]);
        let converters = block.converters.as_ref().unwrap();
        assert_eq!(converters.argument, "t0JsConverter");
        assert_eq!(converters.result, "fr0mJsConverter");

        let declaration = &captures[1];
        assert_eq!(declaration.kind, CaptureKind::Declaration);
        assert!(declaration.source.text.starts_with("interface Captured {"));
        assert!(declaration.source.text.ends_with('}'));
    }

    #[test]
    fn test_sam_constructor() {
        let src = "package demo\n\nimport com.github.tarcv.kotbridge.Capturable\n\nfun interface Block<R> : Capturable<Block<R>> {\n    fun invoke(): R\n}\n\nval b = Block {\n    2 + 2\n}\n";
        let file = lower(src);
        let conversions = conversions(src, &file);
        assert_eq!(conversions.len(), 1);
        let (span_text, type_operand, capturable) = &conversions[0];
        assert_eq!(span_text, "{\n    2 + 2\n}");
        assert_eq!(type_operand, "demo.Block<kotlin.Any?>");
        assert!(capturable);
    }

    #[test]
    fn test_named_arguments_match_parameters_by_name() {
        let src = "package demo\n\nimport com.github.tarcv.kotbridge.Capturable\n\nfun interface Block<R> : Capturable<Block<R>> {\n    fun invoke(): R\n}\n\nfun <R> pair(first: () -> R, block: Block<R>): R = TODO()\n\nval a = pair(block = { 1 }, first = { 2 })\nval b = pair({ 3 }, { 4 })\n";
        let loaded = load(src);
        let pair = &loaded.symbols.functions("demo.pair")[0];
        assert_eq!(pair.parameter_names, vec!["first", "block"]);

        let file = lower(src);
        let conversions: Vec<_> = conversions(src, &file)
            .into_iter()
            .map(|(span_text, type_operand, _)| (span_text, type_operand))
            .collect();
        assert_eq!(
            conversions,
            vec![
                ("{ 1 }".to_string(), "demo.Block<kotlin.Any?>".to_string()),
                ("{ 4 }".to_string(), "demo.Block<kotlin.Any?>".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_capturable_interface_is_still_lowered() {
        let src = "fun interface Action {\n    fun run()\n}\n\nval a = Action { println() }\n";
        let file = lower(src);
        let conversions = conversions(src, &file);
        assert_eq!(conversions.len(), 1);
        assert_eq!(conversions[0].1, "Action");
        assert!(!conversions[0].2);
    }

    #[test]
    fn test_plain_lambdas_are_not_conversions() {
        let src = "fun main() {\n    listOf(1).forEach { println(it) }\n}\n";
        assert!(conversions(src, &lower(src)).is_empty());
    }
}
