//! Scenario Catalog
//!
//! Every end-to-end check of the storefront, grouped into suites. A scenario
//! is an async function over a [`ScenarioContext`]: it builds the page objects
//! it needs, seeds state, drives the flow and raises
//! [`ProbeError::Assertion`](crate::result::ProbeError::Assertion) through the
//! [`expect`] helpers when an observation is wrong.
//!
//! Scenarios assume the session already sits on their suite's start page;
//! [`ScenarioRunner`](crate::harness::ScenarioRunner) takes care of that.

pub mod expect;

mod cart;
mod flows;
mod home;
mod login;
mod orders;
mod payment;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::config::ProbeConfig;
use crate::locator::SafeId;
use crate::page_object::Route;
use crate::pages::{CartPage, GamePage, HomePage, LoginPage, OrdersPage, PaymentPage};
use crate::result::{ProbeError, ProbeResult};
use crate::seeder::StateSeeder;
use crate::session::BrowserSession;
use crate::storage::StorageKeys;

// =============================================================================
// SUITES
// =============================================================================

/// A group of scenarios sharing a start page and a test user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    Home,
    Cart,
    Payment,
    Orders,
    Login,
}

impl Suite {
    /// Every suite in catalog order
    pub const ALL: [Self; 5] = [
        Self::Home,
        Self::Cart,
        Self::Payment,
        Self::Orders,
        Self::Login,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Cart => "cart",
            Self::Payment => "payment",
            Self::Orders => "orders",
            Self::Login => "login",
        }
    }

    /// Page the session is on when each scenario starts
    #[must_use]
    pub const fn start_route(self) -> Route {
        match self {
            Self::Home | Self::Payment => Route::Index,
            Self::Cart => Route::Cart,
            Self::Orders => Route::Orders,
            Self::Login => Route::Login,
        }
    }

    /// Storefront user the suite seeds, if it signs in at all
    #[must_use]
    pub const fn user_id(self) -> Option<&'static str> {
        match self {
            Self::Cart => Some("cart-test-user"),
            Self::Payment => Some("payment-test-user"),
            Self::Orders => Some("orders-test-user"),
            Self::Home | Self::Login => None,
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Suite {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|suite| suite.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ProbeError::config(format!(
                    "unknown suite {s:?}, expected one of home, cart, payment, orders, login"
                ))
            })
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// What a running scenario has access to
#[derive(Debug)]
pub struct ScenarioContext<'s, S> {
    session: &'s S,
    config: &'s ProbeConfig,
    suite: Suite,
}

impl<'s, S: BrowserSession> ScenarioContext<'s, S> {
    #[must_use]
    pub const fn new(session: &'s S, config: &'s ProbeConfig, suite: Suite) -> Self {
        Self {
            session,
            config,
            suite,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &'s S {
        self.session
    }

    #[must_use]
    pub const fn config(&self) -> &'s ProbeConfig {
        self.config
    }

    #[must_use]
    pub const fn suite(&self) -> Suite {
        self.suite
    }

    /// The suite's test user
    pub fn user(&self) -> ProbeResult<SafeId> {
        let raw = self.suite.user_id().ok_or_else(|| {
            ProbeError::config(format!("suite {} has no test user", self.suite))
        })?;
        SafeId::parse(raw)
    }

    /// Seeder writing under the configured storage prefix
    #[must_use]
    pub fn seeder(&self) -> StateSeeder<'s, S> {
        StateSeeder::new(
            self.session,
            StorageKeys::new(self.config.storage_prefix.clone()),
        )
    }

    #[must_use]
    pub fn home(&self) -> HomePage<'s, S> {
        HomePage::new(self.session, self.config)
    }

    #[must_use]
    pub fn game(&self) -> GamePage<'s, S> {
        GamePage::new(self.session, self.config)
    }

    #[must_use]
    pub fn cart(&self) -> CartPage<'s, S> {
        CartPage::new(self.session, self.config)
    }

    #[must_use]
    pub fn payment(&self) -> PaymentPage<'s, S> {
        PaymentPage::new(self.session, self.config)
    }

    #[must_use]
    pub fn orders(&self) -> OrdersPage<'s, S> {
        OrdersPage::new(self.session, self.config)
    }

    #[must_use]
    pub fn login(&self) -> LoginPage<'s, S> {
        LoginPage::new(self.session, self.config)
    }
}

// =============================================================================
// CATALOG
// =============================================================================

macro_rules! scenario_catalog {
    ($($variant:ident => $suite:ident, $name:literal, $run:path;)+) => {
        /// One scenario of the catalog
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ScenarioId {
            $($variant,)+
        }

        impl ScenarioId {
            /// Every scenario in catalog order
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Stable snake_case name, `<suite>_<check>`
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            #[must_use]
            pub const fn suite(self) -> Suite {
                match self {
                    $(Self::$variant => Suite::$suite,)+
                }
            }

            /// Execute against a session already on the suite's start page
            pub async fn run<S: BrowserSession>(
                self,
                ctx: &ScenarioContext<'_, S>,
            ) -> ProbeResult<()> {
                match self {
                    $(Self::$variant => $run(ctx).await,)+
                }
            }
        }
    };
}

scenario_catalog! {
    HomeNavBarDisplayed => Home, "home_nav_bar_displayed", home::nav_bar_displayed;
    HomeTitle => Home, "home_title", home::title;
    HomeSearchBoxVisible => Home, "home_search_box_visible", home::search_box_visible;
    HomeSearchKeepsTypedValue => Home,
        "home_search_keeps_typed_value", home::search_keeps_typed_value;
    HomeResetClearsSearch => Home, "home_reset_clears_search", home::reset_clears_search;
    HomeGamesGridDisplayed => Home, "home_games_grid_displayed", home::games_grid_displayed;
    HomeToastContainerPresent => Home,
        "home_toast_container_present", home::toast_container_present;
    HomeUrlIsIndex => Home, "home_url_is_index", home::url_is_index;
    HomeSubtitleNotEmpty => Home, "home_subtitle_not_empty", home::subtitle_not_empty;
    HomeResetButtonVisible => Home, "home_reset_button_visible", home::reset_button_visible;
    HomeSearchBoxEnabled => Home, "home_search_box_enabled", home::search_box_enabled;
    HomeSearchInitiallyEmpty => Home, "home_search_initially_empty", home::search_initially_empty;
    HomeLastSearchWins => Home, "home_last_search_wins", home::last_search_wins;
    HomeUnknownSearchTerm => Home, "home_unknown_search_term", home::unknown_search_term;

    CartTitleAndList => Cart, "cart_title_and_list", cart::title_and_list;
    CartEmptyMessageShown => Cart, "cart_empty_message_shown", cart::empty_message_shown;
    CartFooterHiddenWhenEmpty => Cart,
        "cart_footer_hidden_when_empty", cart::footer_hidden_when_empty;
    CartSingleItem => Cart, "cart_single_item", cart::single_item;
    CartSingleItemTotal => Cart, "cart_single_item_total", cart::single_item_total;
    CartIncreaseQuantity => Cart, "cart_increase_quantity", cart::increase_quantity;
    CartDecreaseStopsAtOne => Cart, "cart_decrease_stops_at_one", cart::decrease_stops_at_one;
    CartRemoveEmptiesCart => Cart, "cart_remove_empties_cart", cart::remove_empties_cart;
    CartMultiItemTotal => Cart, "cart_multi_item_total", cart::multi_item_total;
    CartCheckoutOpensPayment => Cart, "cart_checkout_opens_payment", cart::checkout_opens_payment;
    CartFooterVisibleWithItems => Cart,
        "cart_footer_visible_with_items", cart::footer_visible_with_items;
    CartRemoveHidesFooter => Cart, "cart_remove_hides_footer", cart::remove_hides_footer;
    CartRemoveOneOfTwo => Cart, "cart_remove_one_of_two", cart::remove_one_of_two;

    PaymentTitleAndForm => Payment, "payment_title_and_form", payment::title_and_form;
    PaymentSummarySingleItem => Payment,
        "payment_summary_single_item", payment::summary_single_item;
    PaymentTotalSingleItem => Payment, "payment_total_single_item", payment::total_single_item;
    PaymentCardNumberFormatted => Payment,
        "payment_card_number_formatted", payment::card_number_formatted;
    PaymentExpiryFormatted => Payment, "payment_expiry_formatted", payment::expiry_formatted;
    PaymentCvvDigitsOnly => Payment, "payment_cvv_digits_only", payment::cvv_digits_only;
    PaymentRequiresCardholder => Payment,
        "payment_requires_cardholder", payment::requires_cardholder;
    PaymentRejectsCardNumber => Payment,
        "payment_rejects_card_number", payment::rejects_card_number;
    PaymentRejectsExpiredCard => Payment,
        "payment_rejects_expired_card", payment::rejects_expired_card;
    PaymentRejectsShortCvv => Payment, "payment_rejects_short_cvv", payment::rejects_short_cvv;
    PaymentRequiresCountry => Payment, "payment_requires_country", payment::requires_country;
    PaymentSuccessRedirects => Payment, "payment_success_redirects", payment::success_redirects;
    PaymentSummaryTwoItems => Payment, "payment_summary_two_items", payment::summary_two_items;
    PaymentTotalTwoItems => Payment, "payment_total_two_items", payment::total_two_items;
    PaymentEmptyCart => Payment, "payment_empty_cart", payment::empty_cart;

    OrdersTitle => Orders, "orders_title", orders::title;
    OrdersEmptyHistory => Orders, "orders_empty_history", orders::empty_history;
    OrdersHistoryRendered => Orders, "orders_history_rendered", orders::history_rendered;
    OrdersAtLeastOne => Orders, "orders_at_least_one", orders::at_least_one;
    OrdersIdPrefix => Orders, "orders_id_prefix", orders::id_prefix;
    OrdersMetaShowsPurchaseDate => Orders,
        "orders_meta_shows_purchase_date", orders::meta_shows_purchase_date;
    OrdersPriceShown => Orders, "orders_price_shown", orders::price_shown;
    OrdersLineItemsShown => Orders, "orders_line_items_shown", orders::line_items_shown;
    OrdersSuccessBanner => Orders, "orders_success_banner", orders::success_banner;
    OrdersPurchaseIsStored => Orders, "orders_purchase_is_stored", orders::purchase_is_stored;
    OrdersUrl => Orders, "orders_url", orders::url;
    OrdersStoredHistory => Orders, "orders_stored_history", orders::stored_history;
    OrdersNewPurchaseRendered => Orders,
        "orders_new_purchase_rendered", orders::new_purchase_rendered;

    LoginWindowTitle => Login, "login_window_title", login::window_title;
    LoginEmptySubmit => Login, "login_empty_submit", login::empty_submit;
    LoginInvalidEmail => Login, "login_invalid_email", login::invalid_email;
    LoginUnknownAccountShortPassword => Login,
        "login_unknown_account_short_password", login::unknown_account_short_password;
    LoginUnknownAccount => Login, "login_unknown_account", login::unknown_account;
    LoginEmailKeepsValue => Login, "login_email_keeps_value", login::email_keeps_value;
    LoginPasswordMasked => Login, "login_password_masked", login::password_masked;
    LoginSignupTab => Login, "login_signup_tab", login::signup_tab;
    LoginSubmitEnabled => Login, "login_submit_enabled", login::submit_enabled;
    LoginRepeatedFailures => Login, "login_repeated_failures", login::repeated_failures;
}

impl ScenarioId {
    /// Scenarios of `suite` (all when `None`) whose name contains `filter`
    #[must_use]
    pub fn select(suite: Option<Suite>, filter: Option<&str>) -> Vec<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|id| suite.map_or(true, |s| id.suite() == s))
            .filter(|id| filter.map_or(true, |f| id.name().contains(f)))
            .collect()
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioId {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.name() == s)
            .ok_or_else(|| ProbeError::config(format!("unknown scenario {s:?}")))
    }
}
