//! Page Object Model Support
//!
//! Every screen of the storefront is a page object: named, intention-revealing
//! operations over a private set of [`Locator`]s, all routed through the
//! [`InteractionEngine`]. Scenarios never see a selector.
//!
//! [`PageBase`] carries what every page needs (the engine and the base
//! address); [`PageObject`] ties a page to its [`Route`] and the landmark
//! element that proves it rendered.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::config::{join_url, ProbeConfig};
use crate::interaction::InteractionEngine;
use crate::locator::Locator;
use crate::result::ProbeResult;
use crate::session::BrowserSession;
use crate::wait::Condition;

/// Logical screens of the storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Catalog home
    Index,
    /// Single game detail
    Game,
    /// Cart
    Cart,
    /// Checkout form
    Payment,
    /// Purchase history
    Orders,
    /// Login and signup
    Login,
}

impl Route {
    /// Every route
    pub const ALL: [Self; 6] = [
        Self::Index,
        Self::Game,
        Self::Cart,
        Self::Payment,
        Self::Orders,
        Self::Login,
    ];

    /// Path below the base address
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Index => "/index.html",
            Self::Game => "/game.html",
            Self::Cart => "/cart.html",
            Self::Payment => "/payment.html",
            Self::Orders => "/orders.html",
            Self::Login => "/login.html",
        }
    }

    /// Short name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Index => "home",
            Self::Game => "game",
            Self::Cart => "cart",
            Self::Payment => "payment",
            Self::Orders => "orders",
            Self::Login => "login",
        }
    }

    /// Whether `url` points at this route, ignoring query and fragment.
    /// A bare origin counts as the index.
    #[must_use]
    pub fn matches(self, url: &str) -> bool {
        let without_query = url.split(['?', '#']).next().unwrap_or_default();
        let path = without_query
            .split_once("://")
            .map_or(without_query, |(_, rest)| {
                rest.find('/').map_or("", |i| &rest[i..])
            });
        if path.is_empty() || path == "/" {
            return self == Self::Index;
        }
        path.ends_with(self.path())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// State shared by every page object: the engine and the base address
#[derive(Debug)]
pub struct PageBase<'s, S> {
    engine: InteractionEngine<'s, S>,
    base_url: String,
}

impl<'s, S: BrowserSession> PageBase<'s, S> {
    /// Base bound to `session`, configured from `config`
    #[must_use]
    pub fn new(session: &'s S, config: &ProbeConfig) -> Self {
        Self {
            engine: InteractionEngine::from_config(session, config),
            base_url: config.base_url.clone(),
        }
    }

    /// The interaction engine
    #[must_use]
    pub const fn engine(&self) -> &InteractionEngine<'s, S> {
        &self.engine
    }

    /// Absolute address of `path`
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Navigate to `path` below the base address
    pub async fn open_path(&self, path: &str) -> ProbeResult<()> {
        let url = self.url_for(path);
        debug!(url = %url, "open");
        self.engine.session().navigate(&url).await
    }

    /// Reload the current document
    pub async fn reload(&self) -> ProbeResult<()> {
        self.engine.session().refresh().await
    }

    /// Current address
    pub async fn current_url(&self) -> ProbeResult<String> {
        self.engine.session().current_url().await
    }

    /// Window title
    pub async fn window_title(&self) -> ProbeResult<String> {
        self.engine.session().title().await
    }

    /// Wait for the URL to contain `fragment` within the flow budget
    pub async fn wait_for_url(&self, fragment: &str) -> ProbeResult<()> {
        self.engine
            .wait_until_url_contains(fragment, self.engine.timeouts().flow())
            .await
    }

    /// Poll the three-part visibility predicate until it holds
    pub async fn wait_until_visible(&self, locator: &Locator, budget: Duration) -> ProbeResult<()> {
        let description = format!("{locator} visible");
        self.engine
            .wait_until(&description, budget, || self.engine.is_visible(locator))
            .await
    }
}

/// A screen of the storefront
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Session the page drives
    type Session: BrowserSession;

    /// Route the page lives at
    fn route(&self) -> Route;

    /// Element whose presence proves the page rendered
    fn landmark(&self) -> Locator;

    /// Shared engine and address
    fn base(&self) -> &PageBase<'_, Self::Session>;

    /// Name for logs
    fn page_name(&self) -> &'static str {
        self.route().name()
    }

    /// Navigate to the page's route and wait for its landmark
    async fn open(&self) -> ProbeResult<()> {
        self.base().open_path(self.route().path()).await?;
        self.wait_until_loaded().await
    }

    /// Wait for the landmark within the interaction budget
    async fn wait_until_loaded(&self) -> ProbeResult<()> {
        let landmark = Condition::Present(self.landmark());
        self.base().engine().wait_for(&landmark).await?;
        debug!(page = self.page_name(), "page loaded");
        Ok(())
    }

    /// Current address
    async fn current_url(&self) -> ProbeResult<String> {
        self.base().current_url().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod route_tests {
        use super::*;

        #[test]
        fn test_paths() {
            assert_eq!(Route::Index.path(), "/index.html");
            assert_eq!(Route::Orders.to_string(), "/orders.html");
        }

        #[test]
        fn test_matches_ignores_query() {
            assert!(Route::Orders.matches("http://127.0.0.1:5501/orders.html?success=1"));
            assert!(Route::Game.matches("http://shop.test/game.html?id=neon-drift#top"));
            assert!(!Route::Cart.matches("http://shop.test/payment.html"));
        }

        #[test]
        fn test_bare_origin_is_index() {
            assert!(Route::Index.matches("http://127.0.0.1:5501"));
            assert!(Route::Index.matches("http://127.0.0.1:5501/"));
            assert!(!Route::Login.matches("http://127.0.0.1:5501/"));
        }

        #[test]
        fn test_each_route_matches_itself_only() {
            for route in Route::ALL {
                let url = format!("http://shop.test{}", route.path());
                for other in Route::ALL {
                    assert_eq!(other.matches(&url), other == route, "{other} vs {url}");
                }
            }
        }
    }
}
