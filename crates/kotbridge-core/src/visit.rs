//! Read-only traversal over the IR.
//!
//! Each `visit_*` method defaults to the free function of the same name,
//! which walks into the children. Override a method to observe a node and
//! call the free function to keep descending.

use crate::ir::{
    Call, ClassDecl, Declaration, Expr, FunctionDecl, Lambda, Node, PropertyDecl, SamConversion,
    SourceFile,
};

/// Visitor over borrowed IR nodes.
#[allow(missing_docs)]
pub trait Visit<'ast> {
    fn visit_source_file(&mut self, node: &'ast SourceFile) {
        visit_source_file(self, node);
    }

    fn visit_declaration(&mut self, node: &'ast Declaration) {
        visit_declaration(self, node);
    }

    fn visit_class(&mut self, node: &'ast ClassDecl) {
        visit_class(self, node);
    }

    fn visit_function(&mut self, node: &'ast FunctionDecl) {
        visit_function(self, node);
    }

    fn visit_property(&mut self, node: &'ast PropertyDecl) {
        visit_property(self, node);
    }

    fn visit_expr(&mut self, node: &'ast Expr) {
        visit_expr(self, node);
    }

    fn visit_call(&mut self, node: &'ast Call) {
        visit_call(self, node);
    }

    fn visit_sam_conversion(&mut self, node: &'ast SamConversion) {
        visit_sam_conversion(self, node);
    }

    fn visit_lambda(&mut self, node: &'ast Lambda) {
        visit_lambda(self, node);
    }

    fn visit_node(&mut self, node: &'ast Node) {
        visit_node(self, node);
    }
}

/// Walks top-level declarations, then top-level statements.
pub fn visit_source_file<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast SourceFile) {
    for decl in &node.declarations {
        v.visit_declaration(decl);
    }
    for stmt in &node.statements {
        v.visit_expr(stmt);
    }
}

/// Dispatches on the declaration kind.
pub fn visit_declaration<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast Declaration) {
    match node {
        Declaration::Class(c) => v.visit_class(c),
        Declaration::Function(f) => v.visit_function(f),
        Declaration::Property(p) => v.visit_property(p),
    }
}

/// Walks members, then initializers.
pub fn visit_class<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast ClassDecl) {
    for member in &node.members {
        v.visit_declaration(member);
    }
    for init in &node.initializers {
        v.visit_expr(init);
    }
}

#[allow(missing_docs)]
pub fn visit_function<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast FunctionDecl) {
    for expr in &node.body {
        v.visit_expr(expr);
    }
}

#[allow(missing_docs)]
pub fn visit_property<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast PropertyDecl) {
    for expr in &node.body {
        v.visit_expr(expr);
    }
}

/// Dispatches on the expression kind.
pub fn visit_expr<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast Expr) {
    match node {
        Expr::Call(c) => v.visit_call(c),
        Expr::SamConversion(s) => v.visit_sam_conversion(s),
        Expr::Lambda(l) => v.visit_lambda(l),
        Expr::Declaration(d) => v.visit_declaration(d),
        Expr::Node(n) => v.visit_node(n),
    }
}

/// Walks the receiver, then the arguments.
pub fn visit_call<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast Call) {
    if let Some(receiver) = &node.receiver {
        v.visit_expr(receiver);
    }
    for arg in &node.arguments {
        v.visit_expr(arg);
    }
}

#[allow(missing_docs)]
pub fn visit_sam_conversion<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast SamConversion) {
    v.visit_expr(&node.operand);
}

#[allow(missing_docs)]
pub fn visit_lambda<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast Lambda) {
    for expr in &node.body {
        v.visit_expr(expr);
    }
}

#[allow(missing_docs)]
pub fn visit_node<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, node: &'ast Node) {
    for child in &node.children {
        v.visit_expr(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Span;

    #[derive(Default)]
    struct LambdaCounter(usize);

    impl<'ast> Visit<'ast> for LambdaCounter {
        fn visit_lambda(&mut self, node: &'ast Lambda) {
            self.0 += 1;
            visit_lambda(self, node);
        }
    }

    fn lambda(body: Vec<Expr>) -> Expr {
        Expr::Lambda(Lambda {
            span: Some(Span::new(0, 1)),
            body,
        })
    }

    #[test]
    fn reaches_nested_lambdas() {
        let file = SourceFile {
            package: None,
            declarations: vec![Declaration::Function(FunctionDecl {
                name: "f".into(),
                fqn: "f".into(),
                annotations: Vec::new(),
                extension_receiver: None,
                parameters: Vec::new(),
                span: None,
                body: vec![Expr::Call(Call {
                    span: None,
                    callee: None,
                    receiver: Some(Box::new(lambda(Vec::new()))),
                    arguments: vec![lambda(vec![Expr::Node(Node {
                        span: None,
                        children: vec![lambda(Vec::new())],
                    })])],
                })],
            })],
            statements: vec![lambda(Vec::new())],
        };

        let mut counter = LambdaCounter::default();
        counter.visit_source_file(&file);
        assert_eq!(counter.0, 4);
    }
}
