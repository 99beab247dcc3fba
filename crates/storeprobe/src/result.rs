//! Result and error types for Storeprobe.
//!
//! Every failure that leaves the core is one [`ProbeError`] variant, and every
//! variant classifies into exactly one [`FailureKind`]. The interaction engine
//! looks only at the kind when deciding whether to retry.

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Result type for Storeprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Closed classification of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// Locator matched nothing within the wait budget
    NotFound,
    /// Handle was invalidated by a re-render between resolution and use
    TransientStale,
    /// Element exists but could not receive the action at that instant
    TransientNotInteractable,
    /// A named condition never became true
    Timeout,
    /// Expected and actual values differ (scenario layer)
    Assertion,
    /// An identifier failed the selector fragment grammar
    InvalidSelector,
    /// Injected script failed or returned an unusable value
    Script,
    /// Anything the browser session reported that is not one of the above
    Session,
}

impl FailureKind {
    /// Whether this kind is caused by a race with rendering
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::TransientStale | Self::TransientNotInteractable)
    }

    /// Stable lowercase name used in reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::TransientStale => "stale",
            Self::TransientNotInteractable => "not_interactable",
            Self::Timeout => "timeout",
            Self::Assertion => "assertion",
            Self::InvalidSelector => "invalid_selector",
            Self::Script => "script",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FailureKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Locator matched nothing
    #[error("Element not found: {locator} (waited {waited_ms}ms)")]
    NotFound {
        /// Locator description
        locator: String,
        /// Time spent waiting before giving up
        waited_ms: u64,
    },

    /// Handle went stale
    #[error("Stale element: {locator}")]
    Stale {
        /// Locator description
        locator: String,
    },

    /// Element could not receive the action
    #[error("Element not interactable: {locator}: {reason}")]
    NotInteractable {
        /// Locator description
        locator: String,
        /// What the session reported
        reason: String,
    },

    /// Condition never became true
    #[error("Timed out after {ms}ms waiting for {condition}")]
    Timeout {
        /// Description of the unmet condition
        condition: String,
        /// Wait budget in milliseconds
        ms: u64,
    },

    /// Transient failures outlasted the attempt budget
    #[error(
        "{action} on {locator} failed after {attempts} attempts (last phase: {phase}): {source}"
    )]
    RetriesExhausted {
        /// Action name
        action: String,
        /// Locator description
        locator: String,
        /// Attempts made
        attempts: u32,
        /// Phase of the final attempt
        phase: String,
        /// Final underlying failure
        #[source]
        source: Box<ProbeError>,
    },

    /// Scenario expectation failed
    #[error("Assertion failed: {message} (expected {expected}, got {actual})")]
    Assertion {
        /// What was being checked
        message: String,
        /// Expected value
        expected: String,
        /// Actual value
        actual: String,
    },

    /// Identifier rejected by the selector fragment grammar
    #[error("Invalid selector fragment: {fragment:?}")]
    InvalidSelector {
        /// Offending fragment
        fragment: String,
    },

    /// Injected script failed
    #[error("Script error: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Navigation failed
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// Target URL
        url: String,
        /// Error message
        message: String,
    },

    /// Browser session failure with no better classification
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Browser could not be started
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Classify this error
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::Stale { .. } => FailureKind::TransientStale,
            Self::NotInteractable { .. } => FailureKind::TransientNotInteractable,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::RetriesExhausted { source, .. } => source.kind(),
            Self::Assertion { .. } => FailureKind::Assertion,
            Self::InvalidSelector { .. } => FailureKind::InvalidSelector,
            Self::Script { .. } | Self::Json(_) => FailureKind::Script,
            Self::Navigation { .. }
            | Self::Session { .. }
            | Self::BrowserLaunch { .. }
            | Self::Config { .. }
            | Self::Io(_)
            | Self::Yaml(_) => FailureKind::Session,
        }
    }

    /// Whether the failure is a rendering race
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }

    /// Build an assertion failure
    pub fn assertion(
        message: impl Into<String>,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        Self::Assertion {
            message: message.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Build a script failure
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// Build a session failure
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Build a configuration failure
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod classification_tests {
        use super::*;

        #[test]
        fn test_transient_kinds() {
            let stale = ProbeError::Stale {
                locator: "id=search".into(),
            };
            let blocked = ProbeError::NotInteractable {
                locator: "id=pay-btn".into(),
                reason: "overlapped".into(),
            };
            assert_eq!(stale.kind(), FailureKind::TransientStale);
            assert_eq!(blocked.kind(), FailureKind::TransientNotInteractable);
            assert!(stale.is_transient());
            assert!(blocked.is_transient());
        }

        #[test]
        fn test_fatal_kinds() {
            let missing = ProbeError::NotFound {
                locator: "id=empty".into(),
                waited_ms: 10,
            };
            let timeout = ProbeError::Timeout {
                condition: "url contains /payment.html".into(),
                ms: 5000,
            };
            assert_eq!(missing.kind(), FailureKind::NotFound);
            assert_eq!(timeout.kind(), FailureKind::Timeout);
            assert!(!missing.is_transient());
            assert!(!timeout.is_transient());
        }

        #[test]
        fn test_retries_exhausted_keeps_underlying_kind() {
            let err = ProbeError::RetriesExhausted {
                action: "click".into(),
                locator: "css=.cart-item".into(),
                attempts: 3,
                phase: "acting".into(),
                source: Box::new(ProbeError::Stale {
                    locator: "css=.cart-item".into(),
                }),
            };
            assert_eq!(err.kind(), FailureKind::TransientStale);
            assert!(err.to_string().contains("after 3 attempts"));
        }

        #[test]
        fn test_json_error_is_script_kind() {
            let err: ProbeError = serde_json::from_str::<u32>("nope").unwrap_err().into();
            assert_eq!(err.kind(), FailureKind::Script);
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn test_timeout_names_condition() {
            let err = ProbeError::Timeout {
                condition: "id=search clickable".into(),
                ms: 10_000,
            };
            assert_eq!(
                err.to_string(),
                "Timed out after 10000ms waiting for id=search clickable"
            );
        }

        #[test]
        fn test_assertion_helper() {
            let err = ProbeError::assertion("grand total", "19.99", "$0.00");
            assert_eq!(err.kind(), FailureKind::Assertion);
            assert!(err.to_string().contains("expected 19.99"));
        }

        #[test]
        fn test_failure_kind_names() {
            assert_eq!(FailureKind::TransientStale.to_string(), "stale");
            assert_eq!(FailureKind::NotFound.as_str(), "not_found");
        }

        #[test]
        fn test_failure_kind_serializes_as_name() {
            let json = serde_json::to_string(&FailureKind::TransientNotInteractable).unwrap();
            assert_eq!(json, "\"not_interactable\"");
        }
    }
}
