//! Locators: immutable descriptions of how to find elements.
//!
//! A [`Locator`] carries no behavior beyond identity and description. It is
//! resolved fresh against the live document on every attempt and never holds a
//! handle.
//!
//! Parameterized locators (the cart row for one game, say) only go through
//! [`Locator::scoped`], which takes a [`SafeId`]. Raw identifiers are never
//! spliced into selector text.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::result::{ProbeError, ProbeResult};

/// Longest identifier accepted by [`SafeId`]
pub const MAX_SAFE_ID_LEN: usize = 64;

/// Placeholder replaced by [`Locator::scoped`]
pub const ID_PLACEHOLDER: &str = "{id}";

/// How a locator matches elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Element `id` attribute
    Id,
    /// One class name
    ClassName,
    /// Full CSS selector
    Css,
}

impl Strategy {
    /// Prefix used by the `Display` form
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ClassName => "class",
            Self::Css => "css",
        }
    }
}

/// Immutable element locator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    strategy: Strategy,
    value: String,
}

impl Locator {
    /// Locate by element id
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::Id,
            value: value.into(),
        }
    }

    /// Locate by class name
    #[must_use]
    pub fn class_name(value: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::ClassName,
            value: value.into(),
        }
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::Css,
            value: value.into(),
        }
    }

    /// Build a CSS locator by substituting a validated id into `template`.
    ///
    /// Every `{id}` in the template is replaced. The template itself is
    /// trusted page-object text; only the id comes from the caller.
    #[must_use]
    pub fn scoped(template: &str, id: &SafeId) -> Self {
        Self::css(template.replace(ID_PLACEHOLDER, id.as_str()))
    }

    /// Matching strategy
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Raw locator value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Render as an equivalent CSS selector
    #[must_use]
    pub fn to_css(&self) -> String {
        match self.strategy {
            Strategy::Id => format!("#{}", css_escape_ident(&self.value)),
            Strategy::ClassName => format!(".{}", css_escape_ident(&self.value)),
            Strategy::Css => self.value.clone(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.prefix(), self.value)
    }
}

/// Identifier that is safe to interpolate into a selector.
///
/// Grammar: one to [`MAX_SAFE_ID_LEN`] characters from `[A-Za-z0-9-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SafeId(String);

impl SafeId {
    /// Validate an identifier
    pub fn parse(raw: impl AsRef<str>) -> ProbeResult<Self> {
        let raw = raw.as_ref();
        let valid = !raw.is_empty()
            && raw.len() <= MAX_SAFE_ID_LEN
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(ProbeError::InvalidSelector {
                fragment: raw.to_string(),
            })
        }
    }

    /// The validated text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SafeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SafeId {
    type Error = ProbeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SafeId> for String {
    fn from(value: SafeId) -> Self {
        value.0
    }
}

impl std::str::FromStr for SafeId {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Escape a CSS identifier (CSSOM `CSS.escape` rules for the ASCII range)
#[must_use]
pub fn css_escape_ident(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, c) in raw.chars().enumerate() {
        let leading_digit = i == 0 && c.is_ascii_digit();
        let dash_digit = i == 1 && c.is_ascii_digit() && raw.starts_with('-');
        if leading_digit || dash_digit {
            out.push_str(&format!("\\{:x} ", c as u32));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod locator_tests {
        use super::*;

        #[test]
        fn test_display_forms() {
            assert_eq!(Locator::id("search").to_string(), "id=search");
            assert_eq!(Locator::class_name("page-title").to_string(), "class=page-title");
            assert_eq!(Locator::css(".cart-item").to_string(), "css=.cart-item");
        }

        #[test]
        fn test_to_css() {
            assert_eq!(Locator::id("cart-list").to_css(), "#cart-list");
            assert_eq!(Locator::class_name("order-id").to_css(), ".order-id");
            assert_eq!(
                Locator::css("#order-items .order-item").to_css(),
                "#order-items .order-item"
            );
        }

        #[test]
        fn test_structural_equality() {
            assert_eq!(Locator::id("nav"), Locator::id("nav"));
            assert_ne!(Locator::id("nav"), Locator::class_name("nav"));
        }

        #[test]
        fn test_scoped_substitutes_every_placeholder() {
            let id = SafeId::parse("neon-drift").unwrap();
            let loc = Locator::scoped(".cart-item[data-id='{id}'] button[data-act='inc']", &id);
            assert_eq!(loc.strategy(), Strategy::Css);
            assert_eq!(
                loc.value(),
                ".cart-item[data-id='neon-drift'] button[data-act='inc']"
            );
        }
    }

    mod safe_id_tests {
        use super::*;

        #[test]
        fn test_accepts_catalog_ids() {
            for raw in ["neon-drift", "iron-legion", "cart-test-user", "A1"] {
                assert_eq!(SafeId::parse(raw).unwrap().as_str(), raw);
            }
        }

        #[test]
        fn test_rejects_injection() {
            for raw in ["", "x']", "a b", "neon_drift", "a\"", "é", "x']:not(*) ["] {
                let err = SafeId::parse(raw).unwrap_err();
                assert!(matches!(err, ProbeError::InvalidSelector { .. }), "{raw}");
            }
        }

        #[test]
        fn test_rejects_overlong() {
            let raw = "a".repeat(MAX_SAFE_ID_LEN + 1);
            assert!(SafeId::parse(raw).is_err());
            assert!(SafeId::parse("a".repeat(MAX_SAFE_ID_LEN)).is_ok());
        }

        #[test]
        fn test_serde_validates() {
            let ok: SafeId = serde_json::from_str("\"iron-legion\"").unwrap();
            assert_eq!(ok.as_str(), "iron-legion");
            assert!(serde_json::from_str::<SafeId>("\"bad id\"").is_err());
        }
    }

    mod escape_tests {
        use super::*;

        #[test]
        fn test_plain_ident_unchanged() {
            assert_eq!(css_escape_ident("games-grid"), "games-grid");
        }

        #[test]
        fn test_leading_digit_hex_escaped() {
            assert_eq!(css_escape_ident("1up"), "\\31 up");
        }

        #[test]
        fn test_punctuation_escaped() {
            assert_eq!(css_escape_ident("a.b"), "a\\.b");
            assert_eq!(css_escape_ident("x'y"), "x\\'y");
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_grammar_ids_always_accepted(raw in "[A-Za-z0-9-]{1,64}") {
                prop_assert!(SafeId::parse(&raw).is_ok());
            }

            #[test]
            fn prop_quote_or_bracket_always_rejected(
                head in "[a-z]{0,8}",
                bad in "['\"\\[\\] ]",
                tail in "[a-z]{0,8}",
            ) {
                let raw = format!("{head}{bad}{tail}");
                prop_assert!(SafeId::parse(&raw).is_err());
            }

            #[test]
            fn prop_scoped_never_leaves_placeholder(raw in "[a-z0-9-]{1,20}") {
                let id = SafeId::parse(&raw).unwrap();
                let loc = Locator::scoped("[data-id='{id}'] .count", &id);
                prop_assert!(!loc.value().contains(ID_PLACEHOLDER));
                prop_assert!(loc.value().contains(&raw));
            }
        }
    }
}
