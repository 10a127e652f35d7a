//! Shell-safety helpers for the remote command runner.
//!
//! These are pure string functions so they can be unit-tested without an
//! actual shell, and so the remote transport crate can reuse them without a
//! dependency cycle.

use telemetry_metrics::{Error, Result};

/// Wrap `value` in single quotes for safe interpolation into a POSIX shell
/// command line, escaping embedded single quotes with the four-character
/// sequence `'\''` (end quote, escaped literal quote, new quote).
pub fn shell_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

/// Validate that `path` is a safe argument to a remote `cat`/`ls`-style
/// command: only `[A-Za-z0-9_/.-]`, and no `..` path-traversal segment.
///
/// This is deliberately conservative (no spaces, no globs) because it's used
/// to validate synthetic paths this crate itself builds (e.g.
/// `/sys/class/power_supply/{name}/capacity`), not arbitrary user input.
pub fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::parse("validate_path", "path is empty"));
    }
    if path.contains("..") {
        return Err(Error::parse(
            "validate_path",
            format!("path traversal segment in {path}"),
        ));
    }
    if !path
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '.' | '-'))
    {
        return Err(Error::parse(
            "validate_path",
            format!("disallowed character in {path}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_a_plain_string() {
        assert_eq!(shell_quote("hello"), "'hello'");
    }

    #[test]
    fn escapes_embedded_single_quotes() {
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
    }

    #[test]
    fn quotes_empty_string() {
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn matches_the_documented_test_vector() {
        assert_eq!(
            shell_quote("it's a 'test'"),
            "'it'\\''s a '\\''test'\\'''"
        );
    }

    #[test]
    fn accepts_well_formed_sysfs_path() {
        assert!(validate_path("/sys/class/power_supply/BAT0/capacity").is_ok());
    }

    #[test]
    fn rejects_path_traversal() {
        assert!(validate_path("/sys/../etc/passwd").is_err());
    }

    #[test]
    fn rejects_shell_metacharacters() {
        assert!(validate_path("/tmp/$(whoami)").is_err());
        assert!(validate_path("/tmp/a;rm -rf /").is_err());
    }

    #[test]
    fn rejects_empty_path() {
        assert!(validate_path("").is_err());
    }
}
