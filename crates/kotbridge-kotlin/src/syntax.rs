//! Small helpers over tree-sitter nodes.

use kotbridge_core::Span;
use tree_sitter::Node;

/// Node kinds that introduce a declaration.
pub(crate) const DECLARATION_KINDS: &[&str] = &[
    "class_declaration",
    "object_declaration",
    "companion_object",
    "function_declaration",
    "property_declaration",
];

pub(crate) fn text<'a>(node: &Node<'_>, src: &'a str) -> &'a str {
    src.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

pub(crate) fn span(node: &Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

pub(crate) fn children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

pub(crate) fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

pub(crate) fn child_of_kind<'t>(node: &Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    children(node).into_iter().find(|c| kinds.contains(&c.kind()))
}

/// Depth-first search for the first descendant of one of `kinds`,
/// `node` included.
pub(crate) fn find_descendant<'t>(node: &Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    if kinds.contains(&node.kind()) {
        return Some(*node);
    }
    named_children(node)
        .iter()
        .find_map(|c| find_descendant(c, kinds))
}

pub(crate) fn is_identifier(node: &Node<'_>) -> bool {
    matches!(
        node.kind(),
        "identifier" | "simple_identifier" | "type_identifier"
    )
}

/// Returns `true` if `node` has a direct child token spelled `token`.
pub(crate) fn has_token(node: &Node<'_>, token: &str) -> bool {
    children(node).iter().any(|c| c.kind() == token)
}

pub(crate) fn is_declaration(node: &Node<'_>) -> bool {
    DECLARATION_KINDS.contains(&node.kind())
}

/// Dotted name of a `qualified_identifier`-like node, whitespace removed.
pub(crate) fn qualified_id(node: &Node<'_>, src: &str) -> String {
    text(node, src)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '`')
        .collect()
}

/// Returns the modifier words and annotation nodes of a declaration.
pub(crate) fn modifiers<'t>(node: &Node<'t>, src: &str) -> (Vec<String>, Vec<Node<'t>>) {
    let mut words = Vec::new();
    let mut annotations = Vec::new();
    if let Some(modifiers) = child_of_kind(node, &["modifiers"]) {
        collect_modifiers(&modifiers, src, &mut words, &mut annotations);
    }
    (words, annotations)
}

fn collect_modifiers<'t>(
    node: &Node<'t>,
    src: &str,
    words: &mut Vec<String>,
    annotations: &mut Vec<Node<'t>>,
) {
    for child in children(node) {
        if child.kind() == "annotation" {
            annotations.push(child);
        } else if child.named_child_count() == 0 {
            words.push(text(&child, src).trim().to_string());
        } else {
            collect_modifiers(&child, src, words, annotations);
        }
    }
}
