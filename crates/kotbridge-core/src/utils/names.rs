//! Dotted-name utilities for fully-qualified host names.

/// Joins a package and a simple name.
///
/// # Example
///
/// ```ignore
/// assert_eq!(qualify(Some("com.example"), "Block"), "com.example.Block");
/// assert_eq!(qualify(None, "Block"), "Block");
/// ```
#[must_use]
pub fn qualify(package: Option<&str>, name: &str) -> String {
    match package {
        Some(package) if !package.is_empty() => format!("{package}.{name}"),
        _ => name.to_string(),
    }
}

/// Extracts the last segment from a dotted name.
#[must_use]
pub fn last_segment(fqn: &str) -> &str {
    fqn.rsplit('.').next().unwrap_or(fqn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify() {
        assert_eq!(qualify(Some("com.example"), "Block"), "com.example.Block");
        assert_eq!(qualify(Some(""), "Block"), "Block");
        assert_eq!(qualify(None, "Block"), "Block");
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("com.github.tarcv.kotbridge.Capturable"), "Capturable");
        assert_eq!(last_segment("Capturable"), "Capturable");
    }
}
