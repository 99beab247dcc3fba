//! Application storage contract.
//!
//! The storefront persists everything in `localStorage` as JSON under a fixed
//! key vocabulary. [`StorageKeys`] derives those names from a configurable
//! prefix; the record types mirror the stored shapes (camelCase on the wire).

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_STORAGE_PREFIX;
use crate::locator::SafeId;

/// Per-user collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Cart lines
    Cart,
    /// Completed orders, newest first
    Orders,
    /// Marker left by the last successful checkout
    LastSuccess,
}

impl Collection {
    const fn stem(self) -> &'static str {
        match self {
            Self::Cart => "cart_v1_user_",
            Self::Orders => "orders_v1_user_",
            Self::LastSuccess => "last_success_v1_user_",
        }
    }
}

/// Key names under one prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    prefix: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_PREFIX)
    }
}

impl StorageKeys {
    /// Keys under `prefix`
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The prefix
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Signed-in identity
    #[must_use]
    pub fn session_key(&self) -> String {
        format!("{}session_v1", self.prefix)
    }

    /// Registered accounts
    #[must_use]
    pub fn users_key(&self) -> String {
        format!("{}users_v1", self.prefix)
    }

    /// Game catalog
    #[must_use]
    pub fn games_key(&self) -> String {
        format!("{}games_v1", self.prefix)
    }

    /// Key of `collection` for `user`
    #[must_use]
    pub fn user_key(&self, collection: Collection, user: &SafeId) -> String {
        self.user_key_raw(collection, user.as_str())
    }

    /// Key of `collection` for an id the application generated itself
    pub(crate) fn user_key_raw(&self, collection: Collection, user: &str) -> String {
        format!("{}{}{user}", self.prefix, collection.stem())
    }

    /// Cart of `user`
    #[must_use]
    pub fn cart_key(&self, user: &SafeId) -> String {
        self.user_key(Collection::Cart, user)
    }

    /// Orders of `user`
    #[must_use]
    pub fn orders_key(&self, user: &SafeId) -> String {
        self.user_key(Collection::Orders, user)
    }

    /// Last-success marker of `user`
    #[must_use]
    pub fn last_success_key(&self, user: &SafeId) -> String {
        self.user_key(Collection::LastSuccess, user)
    }
}

/// Signed-in identity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    /// User id
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Opaque token, set by the application's own login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// ISO-8601 login time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl SessionIdentity {
    /// Identity used by seeded scenarios
    #[must_use]
    pub fn test_user(user: &SafeId) -> Self {
        Self {
            user_id: user.as_str().to_string(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            token: None,
            created_at: None,
        }
    }
}

/// One cart line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Catalog id
    pub game_id: String,
    /// Quantity, 1..=99
    pub qty: u32,
    /// ISO-8601 time the line was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
}

impl CartLine {
    /// `qty` units of `game_id`
    #[must_use]
    pub fn new(game_id: impl Into<String>, qty: u32) -> Self {
        Self {
            game_id: game_id.into(),
            qty,
            added_at: None,
        }
    }
}

/// One purchased line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Catalog id
    pub game_id: String,
    /// Title at purchase time
    pub title: String,
    /// Unit price
    pub price: f64,
    /// Quantity
    pub qty: u32,
}

/// Payment summary kept with an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    /// Always `card`
    pub method: String,
    /// Last four card digits
    pub last4: String,
    /// Name on card
    pub cardholder: String,
    /// Billing city
    pub billing_city: String,
    /// Billing country
    pub billing_country: String,
}

/// A completed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// `GS-YYYYMMDD-XXXXXX`
    pub order_id: String,
    /// ISO-8601 purchase time
    pub created_at: String,
    /// Order total, two decimals
    pub total: f64,
    /// Purchased lines
    pub items: Vec<OrderLine>,
    /// Payment summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentSummary>,
}

/// Marker written by a successful checkout, consumed by the orders screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSuccess {
    /// Order id
    pub order_id: String,
    /// ISO-8601 purchase time
    pub created_at: String,
    /// Order total
    pub total: f64,
}
