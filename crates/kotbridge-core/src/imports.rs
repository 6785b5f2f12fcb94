//! Discovering the extension functions a captured block needs imported.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::ir::{Call, Expr};
use crate::visit::{self, Visit};

#[derive(Debug, Default)]
struct Entries {
    order: Vec<String>,
    seen: HashSet<String>,
}

/// Insertion-ordered set of import names, safe to share across threads.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct ImportSet {
    inner: Arc<Mutex<Entries>>,
}

impl ImportSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `fqn` unless already present. Returns `true` if it was new.
    pub fn insert(&self, fqn: &str) -> bool {
        let mut entries = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.seen.contains(fqn) {
            return false;
        }
        entries.seen.insert(fqn.to_owned());
        entries.order.push(fqn.to_owned());
        true
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .len()
    }

    /// Returns `true` if nothing was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names in first-seen order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .clone()
    }
}

/// Collects calls to extension functions, skipping opted-out ones.
#[derive(Debug, Default)]
pub struct ImportDiscoverer {
    imports: ImportSet,
}

impl ImportDiscoverer {
    /// Creates a discoverer writing into `imports`.
    #[must_use]
    pub fn new(imports: ImportSet) -> Self {
        Self { imports }
    }

    /// Collects the imports `expr` needs, in first-seen order.
    #[must_use]
    pub fn discover(expr: &Expr) -> Vec<String> {
        let mut discoverer = Self::default();
        discoverer.visit_expr(expr);
        discoverer.imports.to_vec()
    }
}

impl<'ast> Visit<'ast> for ImportDiscoverer {
    fn visit_call(&mut self, node: &'ast Call) {
        if let Some(callee) = &node.callee {
            if callee.extension_receiver && !callee.skips_import() {
                self.imports.insert(&callee.fqn);
            }
        }
        visit::visit_call(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Annotation, FunctionRef, Lambda, Node};
    use crate::markers::Marker;

    fn call(fqn: &str, extension: bool, no_import: bool, arguments: Vec<Expr>) -> Expr {
        let annotations = if no_import {
            vec![Annotation {
                name: "com.github.tarcv.kotbridge.KtJsNoImport".into(),
                marker: Some(Marker::NoImport),
                span: None,
                arguments: Vec::new(),
            }]
        } else {
            Vec::new()
        };
        Expr::Call(Call {
            span: None,
            callee: Some(FunctionRef {
                fqn: fqn.into(),
                extension_receiver: extension,
                annotations,
            }),
            receiver: None,
            arguments,
        })
    }

    #[test]
    fn collects_extensions_once_in_first_seen_order() {
        let block = Expr::Lambda(Lambda {
            span: None,
            body: vec![
                call("p.second", true, false, Vec::new()),
                call("p.first", true, false, vec![call("p.second", true, false, Vec::new())]),
                call("kotlin.io.println", false, false, Vec::new()),
                Expr::Node(Node {
                    span: None,
                    children: vec![call("p.first", true, false, Vec::new())],
                }),
            ],
        });
        assert_eq!(ImportDiscoverer::discover(&block), vec!["p.second", "p.first"]);
    }

    #[test]
    fn skips_opted_out_extensions() {
        let block = Expr::Lambda(Lambda {
            span: None,
            body: vec![
                call("p.hidden", true, true, Vec::new()),
                call("p.shown", true, false, Vec::new()),
            ],
        });
        assert_eq!(ImportDiscoverer::discover(&block), vec!["p.shown"]);
    }

    #[test]
    fn unresolved_calls_are_ignored() {
        let block = Expr::Call(Call {
            span: None,
            callee: None,
            receiver: None,
            arguments: vec![call("p.inner", true, false, Vec::new())],
        });
        assert_eq!(ImportDiscoverer::discover(&block), vec!["p.inner"]);
    }

    #[test]
    fn shared_set_tolerates_concurrent_inserts() {
        let set = ImportSet::new();
        std::thread::scope(|scope| {
            for worker in 0..8 {
                let set = set.clone();
                scope.spawn(move || {
                    for i in 0..100 {
                        set.insert(&format!("p.f{}", (i + worker) % 50));
                    }
                });
            }
        });
        assert_eq!(set.len(), 50);
        let names = set.to_vec();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }
}
