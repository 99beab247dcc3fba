//! Expectations that fail a scenario with [`ProbeError::Assertion`].

use std::fmt::Display;

use crate::result::{ProbeError, ProbeResult};

pub fn expect_true(what: &str, actual: bool) -> ProbeResult<()> {
    expect_eq(what, true, actual)
}

pub fn expect_false(what: &str, actual: bool) -> ProbeResult<()> {
    expect_eq(what, false, actual)
}

pub fn expect_eq<T: PartialEq + Display>(what: &str, expected: T, actual: T) -> ProbeResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ProbeError::assertion(what, expected, actual))
    }
}

pub fn expect_contains(what: &str, haystack: &str, needle: &str) -> ProbeResult<()> {
    if haystack.contains(needle) {
        Ok(())
    } else {
        Err(ProbeError::assertion(
            what,
            format!("text containing {needle:?}"),
            format!("{haystack:?}"),
        ))
    }
}

pub fn expect_starts_with(what: &str, text: &str, prefix: &str) -> ProbeResult<()> {
    if text.starts_with(prefix) {
        Ok(())
    } else {
        Err(ProbeError::assertion(
            what,
            format!("text starting with {prefix:?}"),
            format!("{text:?}"),
        ))
    }
}

/// Non-blank after trimming
pub fn expect_not_blank(what: &str, text: &str) -> ProbeResult<()> {
    if text.trim().is_empty() {
        Err(ProbeError::assertion(what, "non-empty text", format!("{text:?}")))
    } else {
        Ok(())
    }
}

pub fn expect_at_least(what: &str, minimum: usize, actual: usize) -> ProbeResult<()> {
    if actual >= minimum {
        Ok(())
    } else {
        Err(ProbeError::assertion(what, format!("at least {minimum}"), actual))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::result::FailureKind;

    #[test]
    fn test_passing_expectations() {
        assert!(expect_true("shown", true).is_ok());
        assert!(expect_false("hidden", false).is_ok());
        assert!(expect_eq("qty", 2, 2).is_ok());
        assert!(expect_contains("total", "$19.99", "19.99").is_ok());
        assert!(expect_starts_with("id", "GS-20260101-ABC123", "GS-").is_ok());
        assert!(expect_not_blank("subtitle", " x ").is_ok());
        assert!(expect_at_least("orders", 1, 3).is_ok());
    }

    #[test]
    fn test_failures_are_assertions() {
        let err = expect_eq("cart title", "Your cart", "Cart").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Assertion);
        assert!(err.to_string().contains("expected Your cart, got Cart"));

        let err = expect_contains("total", "$0.00", "19.99").unwrap_err();
        assert!(err.to_string().contains("\"19.99\""));
    }

    #[test]
    fn test_blank_text_fails() {
        assert!(expect_not_blank("price", "   ").is_err());
        assert!(expect_at_least("orders", 1, 0).is_err());
    }
}
