//! Parsing of Kotlin type and parameter text.
//!
//! Types are parsed from their source text rather than from grammar nodes,
//! so the same code serves supertypes, parameters and explicit type
//! arguments.

use kotbridge_core::ir::TypeRef;

/// Splits `text` on `separator` outside of brackets, parentheses and angle
/// brackets. Empty parts are dropped.
pub(crate) fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;
    let bytes = text.as_bytes();
    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '[' | '<' | '{' => depth += 1,
            '>' if i > 0 && bytes[i - 1] == b'-' => {}
            ')' | ']' | '>' | '}' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Byte index of the first top-level `->`.
fn find_arrow(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' | b'<' => depth += 1,
            b'-' if depth == 0 && bytes.get(i + 1) == Some(&b'>') => return Some(i),
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b')' | b']' | b'>' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Drops leading `@Annotation` and `@Annotation(...)` uses.
pub(crate) fn strip_annotations(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        let Some(rest) = text.strip_prefix('@') else {
            return text;
        };
        let name_len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.' || c == ':'))
            .unwrap_or(rest.len());
        let mut rest = &rest[name_len..];
        if rest.starts_with('(') {
            let close = matching_paren(rest).unwrap_or(rest.len() - 1);
            rest = &rest[close + 1..];
        }
        text = rest;
    }
}

fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
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

fn strip_word<'a>(text: &'a str, word: &str) -> &'a str {
    match text.strip_prefix(word) {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => text,
    }
}

/// Parses a type as written. `resolve` maps a written class name (possibly
/// dotted) to its fully-qualified name.
pub(crate) fn parse_type(text: &str, resolve: &dyn Fn(&str) -> String) -> TypeRef {
    let mut text = strip_annotations(text.trim());
    let mut nullable = false;
    while let Some(rest) = text.strip_suffix('?') {
        nullable = true;
        text = rest.trim_end();
    }

    let ty = if text == "*" {
        TypeRef::named("*")
    } else if let Some(arrow) = find_arrow(text) {
        parse_function_type(&text[..arrow], &text[arrow + 2..], resolve)
    } else if text.starts_with('(') && matching_paren(text) == Some(text.len() - 1) {
        let inner = parse_type(&text[1..text.len() - 1], resolve);
        nullable |= inner.nullable;
        TypeRef { nullable: false, ..inner }
    } else {
        parse_class_type(text, resolve)
    };

    if nullable {
        ty.nullable()
    } else {
        ty
    }
}

fn parse_class_type(text: &str, resolve: &dyn Fn(&str) -> String) -> TypeRef {
    let (name, arguments) = match text.find('<') {
        Some(open) if text.ends_with('>') => (&text[..open], &text[open + 1..text.len() - 1]),
        _ => (text, ""),
    };
    let name: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    let arguments = split_top_level(arguments, ',')
        .into_iter()
        .map(|arg| parse_type(strip_word(strip_word(arg, "out"), "in"), resolve))
        .collect();
    TypeRef::named(resolve(&name)).with_arguments(arguments)
}

fn parse_function_type(left: &str, ret: &str, resolve: &dyn Fn(&str) -> String) -> TypeRef {
    let left = strip_word(left.trim(), "suspend");
    let (receiver, params) = if left.starts_with('(') {
        (None, left)
    } else {
        match left.find(".(") {
            Some(dot) => (Some(&left[..dot]), &left[dot + 1..]),
            None => (None, left),
        }
    };
    let params = params
        .trim()
        .strip_prefix('(')
        .and_then(|p| p.strip_suffix(')'))
        .unwrap_or(params);

    let mut arguments: Vec<TypeRef> = receiver
        .into_iter()
        .map(|r| parse_type(r, resolve))
        .collect();
    arguments.extend(split_top_level(params, ',').into_iter().map(|param| {
        let param = match split_top_level(param, ':').as_slice() {
            [_, ty] => *ty,
            _ => param,
        };
        parse_type(param, resolve)
    }));
    let arity = arguments.len();
    arguments.push(parse_type(ret, resolve));
    TypeRef::named(format!("kotlin.Function{arity}")).with_arguments(arguments)
}

/// Names and declared types of `(a: A, vararg b: B = x)`, the type `None`
/// where a parameter has none, as in lambda parameter lists.
pub(crate) fn parameters(text: &str) -> Vec<(&str, Option<&str>)> {
    let text = text.trim();
    let text = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(text);
    split_top_level(text, ',')
        .into_iter()
        .map(|param| {
            let param = split_top_level(param, '=').first().copied().unwrap_or(param);
            let parts = split_top_level(strip_annotations(param), ':');
            let name = parts
                .first()
                .and_then(|declared| declared.split_whitespace().last())
                .unwrap_or_default()
                .trim_matches('`');
            (name, parts.get(1).copied())
        })
        .collect()
}

/// Names declared in a `<T, reified R : Any>` list.
pub(crate) fn parse_type_parameters(text: &str) -> Vec<String> {
    let text = text.trim();
    let text = text
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .unwrap_or(text);
    split_top_level(text, ',')
        .into_iter()
        .filter_map(|param| {
            let param = strip_annotations(param);
            param
                .split(|c: char| c.is_whitespace() || c == ':')
                .filter(|w| !w.is_empty())
                .find(|w| !matches!(*w, "reified" | "in" | "out"))
                .map(str::to_string)
        })
        .collect()
}
