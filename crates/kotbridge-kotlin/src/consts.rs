//! Folding of compile-time constant expressions.

use kotbridge_core::ir::ConstValue;
use tree_sitter::Node;

use crate::syntax::{self, span, text};

/// Folds `node` to a constant. `lookup` resolves names of other constants.
pub(crate) fn evaluate(
    node: &Node<'_>,
    src: &str,
    lookup: &dyn Fn(&str) -> Option<ConstValue>,
) -> ConstValue {
    fold(node, src, lookup).unwrap_or_else(|| ConstValue::NonConstant {
        text: text(node, src).trim().to_string(),
        span: Some(span(node)),
    })
}

fn fold(
    node: &Node<'_>,
    src: &str,
    lookup: &dyn Fn(&str) -> Option<ConstValue>,
) -> Option<ConstValue> {
    let written = text(node, src).trim();
    match node.kind() {
        "string_literal" | "line_string_literal" | "multi_line_string_literal"
        | "multiline_string_literal" => fold_string(node, src, lookup),
        "character_literal" => unescape(written.trim_matches('\'')).map(ConstValue::String),
        "integer_literal" | "number_literal" | "long_literal" | "hex_literal" | "bin_literal"
        | "unsigned_literal" => parse_int(written).map(ConstValue::Int),
        "boolean_literal" => match written {
            "true" => Some(ConstValue::Bool(true)),
            "false" => Some(ConstValue::Bool(false)),
            _ => None,
        },
        "null" | "null_literal" => Some(ConstValue::Null),
        "identifier" | "simple_identifier" => match written {
            "true" => Some(ConstValue::Bool(true)),
            "false" => Some(ConstValue::Bool(false)),
            "null" => Some(ConstValue::Null),
            name => lookup(name.trim_matches('`')),
        },
        "navigation_expression" => {
            let name: String = written
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '`')
                .collect();
            lookup(&name)
        }
        "parenthesized_expression" => {
            let inner = syntax::named_children(node).into_iter().next()?;
            fold(&inner, src, lookup)
        }
        "binary_expression" | "additive_expression" | "multiplicative_expression" => {
            fold_binary(node, src, lookup)
        }
        "prefix_expression" | "unary_expression" => {
            let operand = syntax::named_children(node).into_iter().last()?;
            match (written.chars().next()?, fold(&operand, src, lookup)?) {
                ('-', ConstValue::Int(i)) => i.checked_neg().map(ConstValue::Int),
                ('+', ConstValue::Int(i)) => Some(ConstValue::Int(i)),
                ('!', ConstValue::Bool(b)) => Some(ConstValue::Bool(!b)),
                _ => None,
            }
        }
        _ => {
            // Wrapper nodes with a single expression inside.
            let inner = syntax::named_children(node);
            match inner.as_slice() {
                [only] if only.byte_range() == node.byte_range() => fold(only, src, lookup),
                _ => None,
            }
        }
    }
}

fn fold_binary(
    node: &Node<'_>,
    src: &str,
    lookup: &dyn Fn(&str) -> Option<ConstValue>,
) -> Option<ConstValue> {
    let (left, right) = match (
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
    ) {
        (Some(left), Some(right)) => (left, right),
        _ => match syntax::named_children(node).as_slice() {
            [left, right] => (*left, *right),
            _ => return None,
        },
    };
    let operator = src
        .get(left.end_byte()..right.start_byte())
        .map(str::trim)
        .unwrap_or_default();
    let left = fold(&left, src, lookup)?;
    let right = fold(&right, src, lookup)?;

    match (operator, left, right) {
        ("+", ConstValue::String(l), r) => Some(ConstValue::String(l + &display(&r)?)),
        ("+", l, ConstValue::String(r)) => Some(ConstValue::String(display(&l)? + &r)),
        ("+", ConstValue::Int(l), ConstValue::Int(r)) => l.checked_add(r).map(ConstValue::Int),
        ("-", ConstValue::Int(l), ConstValue::Int(r)) => l.checked_sub(r).map(ConstValue::Int),
        ("*", ConstValue::Int(l), ConstValue::Int(r)) => l.checked_mul(r).map(ConstValue::Int),
        ("/", ConstValue::Int(l), ConstValue::Int(r)) => l.checked_div(r).map(ConstValue::Int),
        ("%", ConstValue::Int(l), ConstValue::Int(r)) => l.checked_rem(r).map(ConstValue::Int),
        _ => None,
    }
}

/// String form of a constant inside a concatenation or template.
fn display(value: &ConstValue) -> Option<String> {
    match value {
        ConstValue::Null => Some("null".to_string()),
        other => other.as_text(),
    }
}

fn fold_string(
    node: &Node<'_>,
    src: &str,
    lookup: &dyn Fn(&str) -> Option<ConstValue>,
) -> Option<ConstValue> {
    let written = text(node, src);
    let raw = written.starts_with("\"\"\"");
    if node.named_child_count() == 0 {
        let quote = if raw { "\"\"\"" } else { "\"" };
        let inner = written
            .strip_prefix(quote)
            .and_then(|w| w.strip_suffix(quote))
            .unwrap_or(written);
        return if raw {
            Some(ConstValue::String(inner.to_string()))
        } else {
            unescape(inner).map(ConstValue::String)
        };
    }

    let mut out = String::new();
    for part in syntax::children(node) {
        let kind = part.kind();
        let part_text = text(&part, src);
        if !part.is_named() && matches!(kind, "\"" | "\"\"\"" | "$" | "${" | "}") {
            continue;
        }
        if kind.contains("interpolat") || kind.contains("template") {
            let value = match syntax::named_children(&part).into_iter().last() {
                Some(inner) => fold(&inner, src, lookup)?,
                None => {
                    let name = part_text.trim_start_matches('$');
                    let name = name.trim_start_matches('{').trim_end_matches('}').trim();
                    lookup(name)?
                }
            };
            out.push_str(&display(&value)?);
        } else if kind.contains("escape") {
            out.push_str(&unescape(part_text)?);
        } else if raw {
            out.push_str(part_text);
        } else {
            out.push_str(&unescape(part_text)?);
        }
    }
    Some(ConstValue::String(out))
}

fn unescape(written: &str) -> Option<String> {
    let mut out = String::with_capacity(written.len());
    let mut chars = written.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'u' => {
                let code: String = chars.by_ref().take(4).collect();
                out.push(char::from_u32(u32::from_str_radix(&code, 16).ok()?)?);
            }
            other => out.push(other),
        }
    }
    Some(out)
}

fn parse_int(written: &str) -> Option<i64> {
    let digits: String = written
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .trim_end_matches(['L', 'l', 'u', 'U'])
        .to_string();
    let lower = digits.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else {
        digits.parse().ok()
    }
}
