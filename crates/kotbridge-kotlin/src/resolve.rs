//! Name resolution within one Kotlin file.

use std::collections::{HashMap, HashSet};

use kotbridge_core::ir::ConstValue;
use kotbridge_core::utils::qualify;
use kotbridge_core::{MarkerRegistry, SymbolTable};
use tree_sitter::Node;

use crate::syntax::{self, text};

/// Classes every Kotlin file sees without an import.
const DEFAULT_IMPORTS: &[(&str, &str)] = &[
    ("Any", "kotlin"),
    ("Array", "kotlin"),
    ("Boolean", "kotlin"),
    ("Byte", "kotlin"),
    ("Char", "kotlin"),
    ("CharSequence", "kotlin"),
    ("Comparable", "kotlin"),
    ("Double", "kotlin"),
    ("Enum", "kotlin"),
    ("Float", "kotlin"),
    ("Int", "kotlin"),
    ("Long", "kotlin"),
    ("Nothing", "kotlin"),
    ("Number", "kotlin"),
    ("Pair", "kotlin"),
    ("Short", "kotlin"),
    ("String", "kotlin"),
    ("Throwable", "kotlin"),
    ("Triple", "kotlin"),
    ("Unit", "kotlin"),
    ("Collection", "kotlin.collections"),
    ("Iterable", "kotlin.collections"),
    ("List", "kotlin.collections"),
    ("Map", "kotlin.collections"),
    ("MutableList", "kotlin.collections"),
    ("MutableMap", "kotlin.collections"),
    ("MutableSet", "kotlin.collections"),
    ("Set", "kotlin.collections"),
    ("Sequence", "kotlin.sequences"),
    ("Regex", "kotlin.text"),
];

/// Package, imports and local classes of one file.
#[derive(Debug, Default)]
pub(crate) struct FileScope {
    package: Option<String>,
    /// Simple name or alias to fully-qualified name.
    explicit: HashMap<String, String>,
    stars: Vec<String>,
    /// Classes declared anywhere in the file.
    local_classes: HashSet<String>,
}

impl FileScope {
    /// Reads the package header and imports of a parsed file.
    pub(crate) fn new(root: &Node<'_>, src: &str) -> Self {
        let mut scope = Self::default();
        scope.read_headers(root, src);
        scope.collect_local_classes(root, src, None);
        scope
    }

    pub(crate) fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    fn read_headers(&mut self, node: &Node<'_>, src: &str) {
        for child in syntax::named_children(node) {
            match child.kind() {
                "package_header" => {
                    self.package = syntax::child_of_kind(
                        &child,
                        &["qualified_identifier", "identifier", "simple_identifier"],
                    )
                    .map(|id| syntax::qualified_id(&id, src));
                }
                "import" | "import_header" => self.add_import(text(&child, src)),
                "import_list" => self.read_headers(&child, src),
                _ => {}
            }
        }
    }

    /// Registers one `import a.b.C`, `import a.b.*` or `import a.b.C as D`.
    pub(crate) fn add_import(&mut self, written: &str) {
        let written = written.trim().trim_end_matches(';');
        let Some(body) = written.strip_prefix("import") else {
            return;
        };
        let (path, alias) = match body.split_once(" as ") {
            Some((path, alias)) => (path, Some(alias.trim())),
            None => (body, None),
        };
        let path: String = path
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '`')
            .collect();
        if let Some(package) = path.strip_suffix(".*") {
            self.stars.push(package.to_string());
            return;
        }
        let name = alias.unwrap_or_else(|| kotbridge_core::utils::last_segment(&path));
        self.explicit.insert(name.to_string(), path);
    }

    fn collect_local_classes(&mut self, node: &Node<'_>, src: &str, outer: Option<&str>) {
        for child in syntax::named_children(node) {
            if matches!(
                child.kind(),
                "class_declaration" | "object_declaration" | "companion_object"
            ) {
                let Some(name) = declaration_name(&child, src) else {
                    continue;
                };
                let fqn = match outer {
                    Some(outer) => format!("{outer}.{name}"),
                    None => qualify(self.package.as_deref(), &name),
                };
                self.collect_local_classes(&child, src, Some(&fqn));
                self.local_classes.insert(fqn);
            } else if !syntax::is_declaration(&child) {
                self.collect_local_classes(&child, src, outer);
            }
        }
    }

    /// Fully-qualified name an explicit import gives `name`.
    pub(crate) fn imported(&self, name: &str) -> Option<&str> {
        self.explicit.get(name).map(String::as_str)
    }

    /// Resolves a simple or dotted name seen from inside `scopes`
    /// (outermost first). `exists` reports names declared elsewhere.
    pub(crate) fn resolve_name(
        &self,
        name: &str,
        scopes: &[String],
        exists: &dyn Fn(&str) -> bool,
    ) -> Option<String> {
        if let Some((first, rest)) = name.split_once('.') {
            return self
                .resolve_name(first, scopes, exists)
                .filter(|_| first.starts_with(char::is_uppercase))
                .map(|head| format!("{head}.{rest}"));
        }

        let known = |fqn: &str| self.local_classes.contains(fqn) || exists(fqn);
        for scope in scopes.iter().rev() {
            let candidate = format!("{scope}.{name}");
            if known(&candidate) {
                return Some(candidate);
            }
        }
        if let Some(fqn) = self.imported(name) {
            return Some(fqn.to_string());
        }
        let same_package = qualify(self.package.as_deref(), name);
        if known(&same_package) {
            return Some(same_package);
        }
        for star in &self.stars {
            let candidate = format!("{star}.{name}");
            if known(&candidate) {
                return Some(candidate);
            }
        }
        DEFAULT_IMPORTS
            .iter()
            .find(|(simple, _)| *simple == name)
            .map(|(simple, package)| format!("{package}.{simple}"))
    }

    /// Resolves a class name, falling back to the file's package.
    pub(crate) fn resolve_class(
        &self,
        name: &str,
        scopes: &[String],
        symbols: Option<&SymbolTable>,
        markers: &MarkerRegistry,
    ) -> String {
        let exists =
            |fqn: &str| markers.is_marker(fqn) || symbols.is_some_and(|s| s.has_class(fqn));
        self.resolve_name(name, scopes, &exists).unwrap_or_else(|| {
            if name.contains('.') {
                name.to_string()
            } else {
                qualify(self.package.as_deref(), name)
            }
        })
    }

    /// Candidate fully-qualified names for a callable or constant `name`,
    /// in lookup order.
    pub(crate) fn candidates(&self, name: &str, scopes: &[String]) -> Vec<String> {
        let mut out: Vec<String> = scopes
            .iter()
            .rev()
            .flat_map(|scope| [format!("{scope}.{name}"), format!("{scope}.Companion.{name}")])
            .collect();
        if let Some(fqn) = self.imported(name) {
            out.push(fqn.to_string());
        }
        out.push(qualify(self.package.as_deref(), name));
        out.extend(self.stars.iter().map(|star| format!("{star}.{name}")));
        out
    }

    /// Looks up a constant by simple or dotted name.
    pub(crate) fn lookup_constant(
        &self,
        name: &str,
        scopes: &[String],
        lookup: &dyn Fn(&str) -> Option<ConstValue>,
        symbols: &SymbolTable,
    ) -> Option<ConstValue> {
        if let Some((owner, member)) = name.rsplit_once('.') {
            let exists = |fqn: &str| symbols.has_class(fqn);
            let owner = self
                .resolve_name(owner, scopes, &exists)
                .unwrap_or_else(|| owner.to_string());
            return lookup(&format!("{owner}.{member}"))
                .or_else(|| lookup(&format!("{owner}.Companion.{member}")))
                .or_else(|| lookup(name));
        }
        self.candidates(name, scopes)
            .iter()
            .find_map(|fqn| lookup(fqn))
    }
}

/// Simple name of a class-like or callable declaration.
pub(crate) fn declaration_name(node: &Node<'_>, src: &str) -> Option<String> {
    let found = syntax::children(node)
        .into_iter()
        .find(syntax::is_identifier)
        .map(|id| text(&id, src).trim_matches('`').to_string());
    match found {
        None if node.kind() == "companion_object" => Some("Companion".to_string()),
        other => other,
    }
}
