//! Typed intermediate representation consumed by the capture pass.
//!
//! Frontends lower host-language source into these types. Only the parts
//! the capture pass reacts to are modelled precisely (annotations, class
//! headers, calls and lambda-to-interface conversions); everything else is
//! kept as an opaque [`Node`] so traversal still reaches nested captures.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::markers::Marker;

/// Byte range into newline-normalized file text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start.
    pub start: usize,
    /// Exclusive end.
    pub end: usize,
}

impl Span {
    /// Creates a span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` for zero-width spans.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Value of an annotation argument after constant evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstValue {
    /// String literal or string constant.
    String(String),
    /// Integer literal or constant.
    Int(i64),
    /// Boolean literal or constant.
    Bool(bool),
    /// `null`.
    Null,
    /// Anything the frontend could not fold to a constant.
    NonConstant {
        /// Source text of the expression.
        text: String,
        /// Where the expression was written.
        span: Option<Span>,
    },
}

impl ConstValue {
    /// Renders a constant as the string the host would produce for it.
    ///
    /// Returns `None` for `null` and for non-constant values.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null | Self::NonConstant { .. } => None,
        }
    }

    /// Returns `true` if the value is a compile-time constant.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        !matches!(self, Self::NonConstant { .. })
    }
}

/// One argument of an annotation use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationArgument {
    /// Parameter name for named arguments.
    pub name: Option<String>,
    /// Evaluated value.
    pub value: ConstValue,
}

/// An annotation applied to a declaration or a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Resolved fully-qualified name, or the written name if unresolved.
    pub name: String,
    /// Marker the annotation denotes, if any.
    pub marker: Option<Marker>,
    /// Where the annotation was written, including the `@`.
    pub span: Option<Span>,
    /// Arguments in source order.
    pub arguments: Vec<AnnotationArgument>,
}

impl Annotation {
    /// Returns `true` if this annotation is `marker`.
    #[must_use]
    pub fn is(&self, marker: Marker) -> bool {
        self.marker == Some(marker)
    }

    /// Looks up an argument by parameter name, falling back to its position
    /// among the unnamed arguments.
    #[must_use]
    pub fn argument(&self, name: &str, position: usize) -> Option<&ConstValue> {
        self.arguments
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .or_else(|| {
                self.arguments
                    .iter()
                    .filter(|a| a.name.is_none())
                    .nth(position)
            })
            .map(|a| &a.value)
    }
}

/// A reference to a type, as written after name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Fully-qualified name of the classifier.
    pub fqn: String,
    /// Type arguments.
    pub arguments: Vec<TypeRef>,
    /// Whether the type is marked nullable.
    pub nullable: bool,
}

impl TypeRef {
    /// A non-nullable type without arguments.
    #[must_use]
    pub fn named(fqn: impl Into<String>) -> Self {
        Self {
            fqn: fqn.into(),
            arguments: Vec::new(),
            nullable: false,
        }
    }

    /// Adds type arguments.
    #[must_use]
    pub fn with_arguments(mut self, arguments: Vec<TypeRef>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Marks the type nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqn)?;
        if !self.arguments.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

/// Kind of a class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassKind {
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `fun interface`
    FunInterface,
    /// `object`
    Object,
    /// `companion object`
    CompanionObject,
}

/// A direct supertype of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperType {
    /// The supertype as written.
    pub ty: TypeRef,
    /// Marker the supertype denotes, if any.
    pub marker: Option<Marker>,
    /// Annotations of the supertype's declaration.
    pub annotations: Vec<Annotation>,
}

/// Header information of a class-like declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// Fully-qualified name.
    pub fqn: String,
    /// Simple name.
    pub name: String,
    /// Declaration kind.
    pub kind: ClassKind,
    /// Names of declared type parameters.
    pub type_parameters: Vec<String>,
    /// Annotations on the declaration.
    pub annotations: Vec<Annotation>,
    /// Direct supertypes in declaration order.
    pub supertypes: Vec<SuperType>,
}

impl ClassInfo {
    /// Returns `true` if a direct supertype is the capturable marker.
    #[must_use]
    pub fn is_capturable(&self) -> bool {
        self.supertypes
            .iter()
            .any(|s| s.marker == Some(Marker::Capturable))
    }
}

/// The function a call resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    /// Fully-qualified name.
    pub fqn: String,
    /// Whether the function declares an extension receiver.
    pub extension_receiver: bool,
    /// Annotations on the function declaration.
    pub annotations: Vec<Annotation>,
}

impl FunctionRef {
    /// Returns `true` if the function is opted out of fragment imports.
    #[must_use]
    pub fn skips_import(&self) -> bool {
        self.annotations.iter().any(|a| a.is(Marker::NoImport))
    }
}

/// A class, interface or object declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    /// Header information.
    pub info: ClassInfo,
    /// Full span including annotations.
    pub span: Option<Span>,
    /// Member declarations.
    pub members: Vec<Declaration>,
    /// Initializer blocks and other member-level expressions.
    pub initializers: Vec<Expr>,
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    /// Simple name.
    pub name: String,
    /// Fully-qualified name.
    pub fqn: String,
    /// Annotations on the declaration.
    pub annotations: Vec<Annotation>,
    /// Extension receiver type, if any.
    pub extension_receiver: Option<TypeRef>,
    /// Parameter types in order.
    pub parameters: Vec<TypeRef>,
    /// Full span including annotations.
    pub span: Option<Span>,
    /// Body expressions.
    pub body: Vec<Expr>,
}

/// A property declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    /// Simple name.
    pub name: String,
    /// Fully-qualified name.
    pub fqn: String,
    /// Annotations on the declaration.
    pub annotations: Vec<Annotation>,
    /// Full span including annotations.
    pub span: Option<Span>,
    /// Initializer and accessor expressions.
    pub body: Vec<Expr>,
}

/// Any declaration the capture pass can visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// Class-like declaration.
    Class(ClassDecl),
    /// Function declaration.
    Function(FunctionDecl),
    /// Property declaration.
    Property(PropertyDecl),
}

impl Declaration {
    /// Annotations on the declaration.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        match self {
            Self::Class(c) => &c.info.annotations,
            Self::Function(f) => &f.annotations,
            Self::Property(p) => &p.annotations,
        }
    }

    /// Full span of the declaration.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Class(c) => c.span,
            Self::Function(f) => f.span,
            Self::Property(p) => p.span,
        }
    }

    /// Fully-qualified name of the declaration.
    #[must_use]
    pub fn fqn(&self) -> &str {
        match self {
            Self::Class(c) => &c.info.fqn,
            Self::Function(f) => &f.fqn,
            Self::Property(p) => &p.fqn,
        }
    }
}

/// A call expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Span of the whole call.
    pub span: Option<Span>,
    /// Resolved target, if the frontend could resolve it.
    pub callee: Option<FunctionRef>,
    /// Explicit receiver expression.
    pub receiver: Option<Box<Expr>>,
    /// Value arguments, including a trailing lambda.
    pub arguments: Vec<Expr>,
}

/// A lambda converted to a functional interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamConversion {
    /// Span of the converted expression.
    pub span: Option<Span>,
    /// Target interface type with its arguments.
    pub type_operand: TypeRef,
    /// Declaration of the target interface.
    pub owner: ClassInfo,
    /// Converted expression.
    pub operand: Box<Expr>,
}

/// A lambda literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lambda {
    /// Span including the braces.
    pub span: Option<Span>,
    /// Body expressions.
    pub body: Vec<Expr>,
}

/// Any other expression, kept for its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Span of the expression.
    pub span: Option<Span>,
    /// Nested expressions.
    pub children: Vec<Expr>,
}

/// Expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Function call.
    Call(Call),
    /// Lambda-to-interface conversion.
    SamConversion(SamConversion),
    /// Lambda literal.
    Lambda(Lambda),
    /// Local declaration.
    Declaration(Box<Declaration>),
    /// Opaque expression.
    Node(Node),
}

impl Expr {
    /// Span of the expression.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Call(c) => c.span,
            Self::SamConversion(s) => s.span,
            Self::Lambda(l) => l.span,
            Self::Declaration(d) => d.span(),
            Self::Node(n) => n.span,
        }
    }
}

/// One lowered source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    /// Package declared by the file.
    pub package: Option<String>,
    /// Top-level declarations.
    pub declarations: Vec<Declaration>,
    /// Top-level statements (scripts).
    pub statements: Vec<Expr>,
}
