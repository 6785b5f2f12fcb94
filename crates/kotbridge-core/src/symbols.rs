//! Cross-file symbol table filled by frontends before lowering.

use std::collections::HashMap;

use crate::ir::{ClassInfo, ConstValue, FunctionRef, TypeRef};

/// A function known to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSymbol {
    /// What calls to this function resolve to.
    pub reference: FunctionRef,
    /// Parameter types in order.
    pub parameters: Vec<TypeRef>,
    /// Parameter names, parallel to `parameters`.
    pub parameter_names: Vec<String>,
    /// Names of declared type parameters.
    pub type_parameters: Vec<String>,
}

/// Declarations visible across all files of one extraction run.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    classes: HashMap<String, ClassInfo>,
    functions: HashMap<String, Vec<FunctionSymbol>>,
    constants: HashMap<String, ConstValue>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class. A later registration with the same name replaces
    /// the earlier one.
    pub fn insert_class(&mut self, info: ClassInfo) {
        self.classes.insert(info.fqn.clone(), info);
    }

    /// Registers a function overload.
    pub fn insert_function(&mut self, symbol: FunctionSymbol) {
        self.functions
            .entry(symbol.reference.fqn.clone())
            .or_default()
            .push(symbol);
    }

    /// Registers a compile-time constant.
    pub fn insert_constant(&mut self, fqn: impl Into<String>, value: ConstValue) {
        self.constants.insert(fqn.into(), value);
    }

    /// Returns a class as registered.
    #[must_use]
    pub fn class(&self, fqn: &str) -> Option<&ClassInfo> {
        self.classes.get(fqn)
    }

    /// Returns a class whose supertypes carry the annotations of their own
    /// declarations, where those are known.
    #[must_use]
    pub fn resolved_class(&self, fqn: &str) -> Option<ClassInfo> {
        let mut info = self.classes.get(fqn)?.clone();
        for supertype in &mut info.supertypes {
            if supertype.annotations.is_empty() {
                if let Some(declared) = self.classes.get(&supertype.ty.fqn) {
                    supertype.annotations.clone_from(&declared.annotations);
                }
            }
        }
        Some(info)
    }

    /// Returns every overload registered under `fqn`.
    #[must_use]
    pub fn functions(&self, fqn: &str) -> &[FunctionSymbol] {
        self.functions.get(fqn).map_or(&[], Vec::as_slice)
    }

    /// Returns a constant's value.
    #[must_use]
    pub fn constant(&self, fqn: &str) -> Option<&ConstValue> {
        self.constants.get(fqn)
    }

    /// Returns `true` if a class with this name is registered.
    #[must_use]
    pub fn has_class(&self, fqn: &str) -> bool {
        self.classes.contains_key(fqn)
    }

    /// Number of registered classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}
