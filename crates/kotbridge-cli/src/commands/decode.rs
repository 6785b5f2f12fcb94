//! Decode command implementation.

use anyhow::{Context, Result};
use kotbridge::runtime::SourceLocation;

/// Runs the decode command.
pub fn run(encoded: &str) -> Result<()> {
    println!("{}", describe(encoded)?);
    Ok(())
}

/// Decodes `encoded` into a readable description. Literal `\n` escapes
/// stand for the newlines a shell argument cannot easily carry.
fn describe(encoded: &str) -> Result<String> {
    let encoded = encoded.replace("\\n", "\n");
    let location = SourceLocation::decode(&encoded)
        .with_context(|| format!("Invalid location: {encoded:?}"))?;

    Ok(format!(
        "{location}\n  path: {}\n  from: char {}, line {}, column {}\n  to:   char {}, line {}, column {}",
        location.path,
        location.from.char,
        location.from.line,
        location.from.column,
        location.to.char,
        location.to.line,
        location.to.column,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_escaped_location() {
        let text = describe("src/test/kotlin/CapturedLocationTests.kt\\n231,9,12\\n236,9,17").unwrap();
        assert_eq!(
            text.lines().next(),
            Some("src/test/kotlin/CapturedLocationTests.kt:9:12-9:17")
        );
        assert!(text.contains("from: char 231, line 9, column 12"));
    }

    #[test]
    fn accepts_real_newlines() {
        assert!(describe("a.kt\n0,1,0\n3,1,3").is_ok());
    }

    #[test]
    fn rejects_malformed_location() {
        let err = describe("a.kt\\n0,1").unwrap_err();
        assert!(err.to_string().starts_with("Invalid location"));
    }
}
