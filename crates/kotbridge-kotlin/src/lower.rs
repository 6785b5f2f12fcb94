//! Lowering of Kotlin syntax trees into the kotbridge IR.

use std::collections::HashMap;

use kotbridge_core::ir::{
    Annotation, AnnotationArgument, Call, ClassDecl, ClassInfo, ClassKind, ConstValue,
    Declaration, Expr, FunctionDecl, FunctionRef, Lambda, Node as IrNode, PropertyDecl,
    SamConversion, SourceFile, SuperType, TypeRef,
};
use kotbridge_core::utils::qualify;
use kotbridge_core::{FunctionSymbol, MarkerRegistry, SymbolTable};
use tree_sitter::Node;

use crate::consts;
use crate::resolve::{declaration_name, FileScope};
use crate::syntax::{self, span, text};
use crate::types;

/// Kotlin annotation use-site targets, as in `@field:Foo`.
const USE_SITE_TARGETS: &[&str] = &[
    "file", "property", "field", "get", "set", "receiver", "param", "setparam", "delegate",
];

/// Child kinds of declarations that never contain expressions.
const HEADER_KINDS: &[&str] = &[
    "modifiers",
    "type_parameters",
    "type_constraints",
    "identifier",
    "simple_identifier",
    "type_identifier",
    "user_type",
    "nullable_type",
    "function_type",
    "parenthesized_type",
    "receiver_type",
    "type",
    "variable_declaration",
    "multi_variable_declaration",
    "delegation_specifiers",
    "delegation_specifier",
    "line_comment",
    "block_comment",
    "multiline_comment",
    "comment",
];

/// Classes and functions found by the declaration pass.
#[derive(Debug, Default)]
pub(crate) struct Declarations {
    pub classes: Vec<ClassInfo>,
    pub functions: Vec<FunctionSymbol>,
}

/// Walks one parsed file with its scope and the shared symbol table.
pub(crate) struct Lowerer<'a> {
    src: &'a str,
    file: &'a FileScope,
    symbols: &'a SymbolTable,
    markers: &'a MarkerRegistry,
    /// Enclosing classes, outermost first.
    scopes: Vec<String>,
    /// Type parameter names in scope.
    type_parameters: Vec<String>,
    /// Constants folded in this file but not yet in `symbols`.
    local_constants: HashMap<String, ConstValue>,
}

impl<'a> Lowerer<'a> {
    pub(crate) fn new(
        src: &'a str,
        file: &'a FileScope,
        symbols: &'a SymbolTable,
        markers: &'a MarkerRegistry,
    ) -> Self {
        Self {
            src,
            file,
            symbols,
            markers,
            scopes: Vec::new(),
            type_parameters: Vec::new(),
            local_constants: HashMap::new(),
        }
    }

    fn qualify_here(&self, name: &str) -> String {
        match self.scopes.last() {
            Some(outer) => format!("{outer}.{name}"),
            None => qualify(self.file.package(), name),
        }
    }

    fn resolve_type_name(&self, name: &str) -> String {
        if self.type_parameters.iter().any(|p| p == name) {
            return name.to_string();
        }
        self.file
            .resolve_class(name, &self.scopes, Some(self.symbols), self.markers)
    }

    fn parse_type(&self, written: &str) -> TypeRef {
        types::parse_type(written, &|name| self.resolve_type_name(name))
    }

    fn constant_value(&self, fqn: &str) -> Option<ConstValue> {
        self.local_constants
            .get(fqn)
            .or_else(|| self.symbols.constant(fqn))
            .cloned()
    }

    fn lookup_constant(&self, name: &str) -> Option<ConstValue> {
        self.file.lookup_constant(
            name,
            &self.scopes,
            &|fqn| self.constant_value(fqn),
            self.symbols,
        )
    }

    fn evaluate(&self, node: &Node<'_>) -> ConstValue {
        consts::evaluate(node, self.src, &|name| self.lookup_constant(name))
    }

    // Constants

    /// Folds every `const val` of the file. Constants may refer to each
    /// other in any order within the file.
    pub(crate) fn constants(&mut self, root: &Node<'_>) -> Vec<(String, ConstValue)> {
        let mut pending = Vec::new();
        self.const_declarations(root, &mut pending);
        self.scopes.clear();

        loop {
            let before = self.local_constants.len();
            for (fqn, node, scopes) in &pending {
                if self.local_constants.contains_key(fqn) {
                    continue;
                }
                self.scopes.clone_from(scopes);
                let value = self.evaluate(node);
                if value.is_constant() {
                    self.local_constants.insert(fqn.clone(), value);
                }
            }
            if self.local_constants.len() == before {
                break;
            }
        }
        self.scopes.clear();

        let mut values: Vec<_> = self.local_constants.drain().collect();
        values.sort_by(|a, b| a.0.cmp(&b.0));
        values
    }

    fn const_declarations<'t>(
        &mut self,
        node: &Node<'t>,
        out: &mut Vec<(String, Node<'t>, Vec<String>)>,
    ) {
        for child in syntax::named_children(node) {
            match child.kind() {
                "class_declaration" | "object_declaration" | "companion_object" => {
                    let Some(name) = declaration_name(&child, self.src) else {
                        continue;
                    };
                    let fqn = self.qualify_here(&name);
                    self.scopes.push(fqn);
                    self.const_declarations(&child, out);
                    self.scopes.pop();
                }
                "property_declaration" => {
                    let (words, _) = syntax::modifiers(&child, self.src);
                    if !words.iter().any(|w| w == "const") {
                        continue;
                    }
                    if let (Some(name), Some(init)) = (
                        property_name(&child, self.src),
                        property_initializer(&child),
                    ) {
                        out.push((self.qualify_here(&name), init, self.scopes.clone()));
                    }
                }
                "function_declaration" => {}
                _ => self.const_declarations(&child, out),
            }
        }
    }

    // Declarations

    /// Collects class headers and function signatures of the file.
    pub(crate) fn declarations(&mut self, root: &Node<'_>) -> Declarations {
        let mut out = Declarations::default();
        self.collect_declarations(root, &mut out);
        out
    }

    fn collect_declarations(&mut self, node: &Node<'_>, out: &mut Declarations) {
        for child in syntax::named_children(node) {
            match child.kind() {
                "class_declaration" | "object_declaration" | "companion_object" => {
                    let Some(info) = self.class_info(&child) else {
                        continue;
                    };
                    let marker = self.type_parameters.len();
                    self.scopes.push(info.fqn.clone());
                    self.type_parameters.extend(info.type_parameters.iter().cloned());
                    out.classes.push(info);
                    self.collect_declarations(&child, out);
                    self.type_parameters.truncate(marker);
                    self.scopes.pop();
                }
                "function_declaration" => {
                    let Some(header) = self.function_header(&child) else {
                        continue;
                    };
                    let marker = self.type_parameters.len();
                    self.type_parameters
                        .extend(header.type_parameters.iter().cloned());
                    out.functions.push(FunctionSymbol {
                        reference: FunctionRef {
                            fqn: header.fqn,
                            extension_receiver: header.receiver.is_some(),
                            annotations: header.annotations,
                        },
                        parameters: header.parameters,
                        parameter_names: header.parameter_names,
                        type_parameters: header.type_parameters,
                    });
                    self.collect_declarations(&child, out);
                    self.type_parameters.truncate(marker);
                }
                _ => self.collect_declarations(&child, out),
            }
        }
    }

    fn class_info(&mut self, node: &Node<'_>) -> Option<ClassInfo> {
        let name = declaration_name(node, self.src)?;
        let (words, annotation_nodes) = syntax::modifiers(node, self.src);
        let kind = match node.kind() {
            "object_declaration" => ClassKind::Object,
            "companion_object" => ClassKind::CompanionObject,
            _ if syntax::has_token(node, "interface") => {
                if syntax::has_token(node, "fun") || words.iter().any(|w| w == "fun") {
                    ClassKind::FunInterface
                } else {
                    ClassKind::Interface
                }
            }
            _ => ClassKind::Class,
        };
        let type_parameters = syntax::child_of_kind(node, &["type_parameters"])
            .map(|tp| types::parse_type_parameters(text(&tp, self.src)))
            .unwrap_or_default();
        let annotations = self.annotations(&annotation_nodes);

        let marker = self.type_parameters.len();
        self.type_parameters.extend(type_parameters.iter().cloned());
        let supertypes = supertype_nodes(node)
            .iter()
            .map(|s| {
                let ty = self.parse_type(supertype_text(text(s, self.src)));
                SuperType {
                    marker: self.markers.resolve(&ty.fqn),
                    ty,
                    annotations: Vec::new(),
                }
            })
            .collect();
        self.type_parameters.truncate(marker);

        Some(ClassInfo {
            fqn: self.qualify_here(&name),
            name,
            kind,
            type_parameters,
            annotations,
            supertypes,
        })
    }

    fn function_header(&mut self, node: &Node<'_>) -> Option<FunctionHeader> {
        let params = syntax::child_of_kind(node, &["function_value_parameters"])?;
        let keyword = syntax::children(node)
            .into_iter()
            .find(|c| c.kind() == "fun")?;
        let signature = self
            .src
            .get(keyword.end_byte()..params.start_byte())?
            .trim();

        let (type_parameters, signature) = match signature.strip_prefix('<') {
            Some(_) => {
                let close = closing_angle(signature)?;
                (
                    types::parse_type_parameters(&signature[..=close]),
                    signature[close + 1..].trim(),
                )
            }
            None => (
                syntax::child_of_kind(node, &["type_parameters"])
                    .map(|tp| types::parse_type_parameters(text(&tp, self.src)))
                    .unwrap_or_default(),
                signature,
            ),
        };
        let (receiver, name) = match last_top_level_dot(signature) {
            Some(dot) => (Some(&signature[..dot]), &signature[dot + 1..]),
            None => (None, signature),
        };
        let name = name.trim().trim_matches('`');
        if name.is_empty() {
            return None;
        }

        let marker = self.type_parameters.len();
        self.type_parameters.extend(type_parameters.iter().cloned());
        let receiver = receiver.map(|r| self.parse_type(r));
        let (parameter_names, parameters) = types::parameters(text(&params, self.src))
            .into_iter()
            .map(|(name, ty)| (name.to_string(), self.parse_type(ty.unwrap_or("Any"))))
            .unzip();
        self.type_parameters.truncate(marker);

        let (_, annotation_nodes) = syntax::modifiers(node, self.src);
        Some(FunctionHeader {
            fqn: self.qualify_here(name),
            name: name.to_string(),
            receiver,
            parameters,
            parameter_names,
            type_parameters,
            annotations: self.annotations(&annotation_nodes),
        })
    }

    fn annotations(&self, nodes: &[Node<'_>]) -> Vec<Annotation> {
        nodes.iter().map(|n| self.annotation(n)).collect()
    }

    fn annotation(&self, node: &Node<'_>) -> Annotation {
        let written = text(node, self.src).trim_start_matches('@');
        let written = match written.split_once(':') {
            Some((target, rest)) if USE_SITE_TARGETS.contains(&target.trim()) => rest.trim(),
            _ => written,
        };
        let end = written
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.' || c == '`'))
            .unwrap_or(written.len());
        let name: String = written[..end].chars().filter(|c| *c != '`').collect();
        let fqn = self.resolve_type_name(&name);

        let arguments = syntax::find_descendant(node, &["value_arguments"])
            .map(|args| {
                syntax::named_children(&args)
                    .iter()
                    .filter_map(value_argument)
                    .map(|(name, value)| AnnotationArgument {
                        name: name.map(|n| text(&n, self.src).trim().to_string()),
                        value: self.evaluate(&value),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Annotation {
            marker: self.markers.resolve(&fqn),
            name: fqn,
            span: Some(span(node)),
            arguments,
        }
    }

    // Lowering

    /// Lowers a whole file.
    pub(crate) fn lower_file(&mut self, root: &Node<'_>) -> SourceFile {
        let mut file = SourceFile {
            package: self.file.package().map(str::to_string),
            ..SourceFile::default()
        };
        for child in syntax::named_children(root) {
            match child.kind() {
                "package_header" | "import" | "import_header" | "import_list"
                | "file_annotation" | "shebang_line" => {}
                _ if syntax::is_declaration(&child) => {
                    if let Some(decl) = self.declaration(&child) {
                        file.declarations.push(decl);
                    }
                }
                _ => {
                    if let Some(expr) = self.expr(&child) {
                        file.statements.push(expr);
                    }
                }
            }
        }
        file
    }

    fn declaration(&mut self, node: &Node<'_>) -> Option<Declaration> {
        match node.kind() {
            "function_declaration" => self.function(node).map(Declaration::Function),
            "property_declaration" => self.property(node).map(Declaration::Property),
            _ => self.class(node).map(Declaration::Class),
        }
    }

    fn class(&mut self, node: &Node<'_>) -> Option<ClassDecl> {
        let info = self.class_info(node)?;
        let info = self
            .symbols
            .resolved_class(&info.fqn)
            .filter(|known| known.kind == info.kind)
            .unwrap_or(info);

        let marker = self.type_parameters.len();
        self.scopes.push(info.fqn.clone());
        self.type_parameters.extend(info.type_parameters.iter().cloned());

        let mut members = Vec::new();
        let mut initializers = Vec::new();
        for child in syntax::named_children(node) {
            match child.kind() {
                "class_body" | "enum_class_body" => {
                    self.class_body(&child, &mut members, &mut initializers);
                }
                kind if HEADER_KINDS.contains(&kind) => {}
                _ => initializers.extend(self.expr(&child)),
            }
        }

        self.type_parameters.truncate(marker);
        self.scopes.pop();
        Some(ClassDecl {
            info,
            span: Some(span(node)),
            members,
            initializers,
        })
    }

    fn class_body(
        &mut self,
        node: &Node<'_>,
        members: &mut Vec<Declaration>,
        initializers: &mut Vec<Expr>,
    ) {
        for child in syntax::named_children(node) {
            if syntax::is_declaration(&child) {
                members.extend(self.declaration(&child));
            } else if child.kind() == "class_member_declarations" {
                self.class_body(&child, members, initializers);
            } else {
                initializers.extend(self.expr(&child));
            }
        }
    }

    fn function(&mut self, node: &Node<'_>) -> Option<FunctionDecl> {
        let header = self.function_header(node)?;
        let marker = self.type_parameters.len();
        self.type_parameters
            .extend(header.type_parameters.iter().cloned());
        let body = self.body_of(node);
        self.type_parameters.truncate(marker);

        Some(FunctionDecl {
            name: header.name,
            fqn: header.fqn,
            annotations: header.annotations,
            extension_receiver: header.receiver,
            parameters: header.parameters,
            span: Some(span(node)),
            body,
        })
    }

    fn property(&mut self, node: &Node<'_>) -> Option<PropertyDecl> {
        let name = property_name(node, self.src)?;
        let (_, annotation_nodes) = syntax::modifiers(node, self.src);
        Some(PropertyDecl {
            fqn: self.qualify_here(&name),
            name,
            annotations: self.annotations(&annotation_nodes),
            span: Some(span(node)),
            body: self.body_of(node),
        })
    }

    /// Lowers every child of a declaration that may hold expressions.
    fn body_of(&mut self, node: &Node<'_>) -> Vec<Expr> {
        syntax::named_children(node)
            .iter()
            .filter(|c| !HEADER_KINDS.contains(&c.kind()))
            .filter_map(|c| self.expr(c))
            .collect()
    }

    fn children_of(&mut self, node: &Node<'_>) -> Vec<Expr> {
        syntax::named_children(node)
            .iter()
            .filter_map(|c| self.expr(c))
            .collect()
    }

    /// Lowers an expression or statement. Leaves carry nothing the capture
    /// pass looks at and are dropped.
    fn expr(&mut self, node: &Node<'_>) -> Option<Expr> {
        match node.kind() {
            "call_expression" => Some(self.call(node)),
            "lambda_literal" => Some(Expr::Lambda(self.lambda(node))),
            "annotated_lambda" => match syntax::find_descendant(node, &["lambda_literal"]) {
                Some(lambda) => Some(Expr::Lambda(self.lambda(&lambda))),
                None => Some(self.node(node)),
            },
            _ if syntax::is_declaration(node) => match self.declaration(node) {
                Some(decl) => Some(Expr::Declaration(Box::new(decl))),
                None => Some(self.node(node)),
            },
            _ if node.named_child_count() == 0 => None,
            _ => Some(self.node(node)),
        }
    }

    fn node(&mut self, node: &Node<'_>) -> Expr {
        Expr::Node(IrNode {
            span: Some(span(node)),
            children: self.children_of(node),
        })
    }

    fn lambda(&mut self, node: &Node<'_>) -> Lambda {
        let body = syntax::named_children(node)
            .iter()
            .filter(|c| c.kind() != "lambda_parameters")
            .filter_map(|c| self.expr(c))
            .collect();
        Lambda {
            span: Some(span(node)),
            body,
        }
    }

    fn call(&mut self, node: &Node<'_>) -> Expr {
        let parts = syntax::named_children(node);
        let Some((callee, rest)) = parts.split_first() else {
            return self.node(node);
        };
        let mut pieces = CallPieces::default();
        for part in rest {
            pieces.read(part);
        }

        let (name, receiver) = self.callee(callee);

        if receiver.is_none() {
            if let Some(sam) = name.as_deref().and_then(|n| self.sam_constructor(n, &pieces)) {
                return sam;
            }
        }

        let argument_count = pieces.values.len() + pieces.lambdas.len();
        let symbol = name
            .as_deref()
            .and_then(|n| self.resolve_function(n, argument_count));
        let callee_ref = symbol.as_ref().map(|s| s.reference.clone()).or_else(|| {
            let name = name.as_deref()?;
            self.file.imported(name).map(|fqn| FunctionRef {
                fqn: fqn.to_string(),
                extension_receiver: receiver.is_some(),
                annotations: Vec::new(),
            })
        });

        let receiver = receiver.and_then(|r| self.expr(&r)).map(Box::new);
        let mut arguments = Vec::with_capacity(argument_count);
        let src = self.src;
        let values = pieces.values.iter().enumerate().map(|(index, (name, value))| {
            let slot = match name {
                Some(name) => ArgumentSlot::Named(text(name, src).trim().trim_matches('`')),
                None => ArgumentSlot::Positional(index),
            };
            (value, slot)
        });
        let trailing = pieces.lambdas.iter().map(|l| (l, ArgumentSlot::Trailing));
        for (arg, slot) in values.chain(trailing) {
            let Some(lowered) = self.expr(arg) else {
                continue;
            };
            let parameter = symbol.as_ref().and_then(|s| {
                let index = match slot {
                    ArgumentSlot::Positional(index) => index,
                    ArgumentSlot::Named(name) => {
                        s.parameter_names.iter().position(|p| p == name)?
                    }
                    ArgumentSlot::Trailing => s.parameters.len().checked_sub(1)?,
                };
                s.parameters.get(index).map(|p| (p, s))
            });
            let lowered = match (lowered, parameter) {
                (Expr::Lambda(lambda), Some((parameter, symbol))) => {
                    self.sam_argument(lambda, parameter, &symbol.type_parameters)
                }
                (other, _) => other,
            };
            arguments.push(lowered);
        }

        Expr::Call(Call {
            span: Some(span(node)),
            callee: callee_ref,
            receiver,
            arguments,
        })
    }

    /// Splits a callee into its simple name and explicit receiver.
    fn callee<'t>(&self, callee: &Node<'t>) -> (Option<String>, Option<Node<'t>>) {
        if syntax::is_identifier(callee) {
            return (Some(text(callee, self.src).trim_matches('`').to_string()), None);
        }
        if callee.kind() != "navigation_expression" {
            return (None, Some(*callee));
        }
        let parts = syntax::named_children(callee);
        let name = parts.last().and_then(|last| {
            let id = if syntax::is_identifier(last) {
                Some(*last)
            } else if last.kind() == "navigation_suffix" {
                syntax::children(last).into_iter().find(syntax::is_identifier)
            } else {
                None
            };
            id.map(|id| text(&id, self.src).trim_matches('`').to_string())
        });
        let receiver = if parts.len() >= 2 { parts.first().copied() } else { None };
        (name, receiver)
    }

    fn resolve_function(&self, name: &str, argument_count: usize) -> Option<FunctionSymbol> {
        self.file
            .candidates(name, &self.scopes)
            .iter()
            .map(|fqn| self.symbols.functions(fqn))
            .find(|overloads| !overloads.is_empty())
            .and_then(|overloads| {
                overloads
                    .iter()
                    .find(|o| o.parameters.len() == argument_count)
                    .or_else(|| overloads.first())
            })
            .cloned()
    }

    /// `Iface { ... }` where `Iface` is a functional interface.
    fn sam_constructor(&mut self, name: &str, pieces: &CallPieces<'_>) -> Option<Expr> {
        let lambda = match (pieces.values.as_slice(), pieces.lambdas.as_slice()) {
            ([], [lambda]) => *lambda,
            ([(None, value)], []) if value.kind() == "lambda_literal" => *value,
            _ => return None,
        };
        if !name.starts_with(char::is_uppercase) {
            return None;
        }
        let fqn = self.resolve_type_name(name);
        let owner = self
            .symbols
            .resolved_class(&fqn)
            .filter(|c| c.kind == ClassKind::FunInterface)?;

        let arguments = match pieces.type_arguments {
            Some(args) => {
                let written = text(&args, self.src).trim();
                let inner = written
                    .strip_prefix('<')
                    .and_then(|w| w.strip_suffix('>'))
                    .unwrap_or(written);
                types::split_top_level(inner, ',')
                    .into_iter()
                    .map(|a| self.parse_type(a))
                    .collect()
            }
            None => owner.type_parameters.iter().map(|_| unknown_type()).collect(),
        };

        let operand = self.lambda(&lambda);
        Some(Expr::SamConversion(SamConversion {
            span: operand.span,
            type_operand: TypeRef::named(fqn).with_arguments(arguments),
            owner,
            operand: Box::new(Expr::Lambda(operand)),
        }))
    }

    /// A lambda passed where a functional interface is expected.
    fn sam_argument(
        &self,
        lambda: Lambda,
        parameter: &TypeRef,
        type_parameters: &[String],
    ) -> Expr {
        let owner = self
            .symbols
            .resolved_class(&parameter.fqn)
            .filter(|c| c.kind == ClassKind::FunInterface);
        match owner {
            Some(owner) => Expr::SamConversion(SamConversion {
                span: lambda.span,
                type_operand: erase(parameter, type_parameters),
                owner,
                operand: Box::new(Expr::Lambda(lambda)),
            }),
            None => Expr::Lambda(lambda),
        }
    }
}

struct FunctionHeader {
    name: String,
    fqn: String,
    receiver: Option<TypeRef>,
    parameters: Vec<TypeRef>,
    parameter_names: Vec<String>,
    type_parameters: Vec<String>,
    annotations: Vec<Annotation>,
}

/// Arguments of a call, in source order.
#[derive(Default)]
struct CallPieces<'t> {
    values: Vec<(Option<Node<'t>>, Node<'t>)>,
    lambdas: Vec<Node<'t>>,
    type_arguments: Option<Node<'t>>,
}

impl<'t> CallPieces<'t> {
    fn read(&mut self, part: &Node<'t>) {
        match part.kind() {
            "value_arguments" => {
                for arg in syntax::named_children(part) {
                    if let Some(argument) = value_argument(&arg) {
                        self.values.push(argument);
                    }
                }
            }
            "annotated_lambda" => {
                if let Some(lambda) = syntax::find_descendant(part, &["lambda_literal"]) {
                    self.lambdas.push(lambda);
                }
            }
            "lambda_literal" => self.lambdas.push(*part),
            "type_arguments" => self.type_arguments = Some(*part),
            "call_suffix" => {
                for child in syntax::named_children(part) {
                    self.read(&child);
                }
            }
            _ => {}
        }
    }
}

/// Where an argument lands in the callee's parameter list.
#[derive(Clone, Copy)]
enum ArgumentSlot<'a> {
    Positional(usize),
    Named(&'a str),
    Trailing,
}

/// Splits a `value_argument` into its parameter name and value.
fn value_argument<'t>(node: &Node<'t>) -> Option<(Option<Node<'t>>, Node<'t>)> {
    if node.kind() != "value_argument" {
        return Some((None, *node));
    }
    let parts = syntax::named_children(node);
    let value = *parts.last()?;
    let name = (parts.len() >= 2 && syntax::has_token(node, "="))
        .then(|| parts[0])
        .filter(syntax::is_identifier);
    Some((name, value))
}

fn property_name(node: &Node<'_>, src: &str) -> Option<String> {
    let declared = syntax::child_of_kind(node, &["variable_declaration"])
        .and_then(|d| syntax::children(&d).into_iter().find(syntax::is_identifier))
        .or_else(|| syntax::children(node).into_iter().find(syntax::is_identifier))?;
    Some(text(&declared, src).trim_matches('`').to_string())
}

fn property_initializer<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    let parts = syntax::children(node);
    let assign = parts.iter().position(|c| c.kind() == "=")?;
    parts[assign + 1..].iter().find(|c| c.is_named()).copied()
}

fn supertype_nodes<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut after_colon = false;
    for child in syntax::children(node) {
        match child.kind() {
            "delegation_specifiers" => out.extend(syntax::named_children(&child)),
            "delegation_specifier" => out.push(child),
            ":" => after_colon = true,
            "class_body" | "enum_class_body" | "type_constraints" => break,
            kind if after_colon && child.is_named() && !kind.contains("comment") => {
                out.push(child);
            }
            _ => {}
        }
    }
    out
}

/// The type part of `Base(args)` or `Iface by delegate`.
fn supertype_text(written: &str) -> &str {
    let written = written.split(" by ").next().unwrap_or(written);
    let mut depth = 0i32;
    for (i, c) in written.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            '(' if depth == 0 && i > 0 => return written[..i].trim(),
            _ => {}
        }
    }
    written.trim()
}

fn closing_angle(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn last_top_level_dot(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut found = None;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' => depth += 1,
            '>' | ')' => depth -= 1,
            '.' if depth == 0 => found = Some(i),
            _ => {}
        }
    }
    found
}

fn unknown_type() -> TypeRef {
    TypeRef::named("kotlin.Any").nullable()
}

/// Replaces the function's own type parameters, which are not inferred.
fn erase(ty: &TypeRef, type_parameters: &[String]) -> TypeRef {
    if type_parameters.contains(&ty.fqn) {
        return unknown_type();
    }
    TypeRef {
        fqn: ty.fqn.clone(),
        arguments: ty
            .arguments
            .iter()
            .map(|a| erase(a, type_parameters))
            .collect(),
        nullable: ty.nullable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supertype_text() {
        assert_eq!(supertype_text("Base(1, 2)"), "Base");
        assert_eq!(supertype_text("Capturable<Block<R>>"), "Capturable<Block<R>>");
        assert_eq!(supertype_text("Runnable by task"), "Runnable");
    }

    #[test]
    fn test_last_top_level_dot() {
        assert_eq!(last_top_level_dot("WebDriver.executeKtJs"), Some(9));
        assert_eq!(last_top_level_dot("Map<a.B, C>.get"), Some(11));
        assert_eq!(last_top_level_dot("run"), None);
    }

    #[test]
    fn test_erase_type_parameters() {
        let ty = TypeRef::named("demo.Block").with_arguments(vec![
            TypeRef::named("T"),
            TypeRef::named("kotlin.String"),
        ]);
        assert_eq!(
            erase(&ty, &["T".to_string()]).to_string(),
            "demo.Block<kotlin.Any?, kotlin.String>"
        );
    }
}
