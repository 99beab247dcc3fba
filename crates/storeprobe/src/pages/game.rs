//! Game detail screen.

use crate::config::ProbeConfig;
use crate::locator::{Locator, SafeId};
use crate::page_object::{PageBase, PageObject, Route};
use crate::result::ProbeResult;
use crate::session::BrowserSession;

/// Detail view of one catalog entry
#[derive(Debug)]
pub struct GamePage<'s, S> {
    base: PageBase<'s, S>,
    wrap: Locator,
    title: Locator,
    price: Locator,
    add_to_cart: Locator,
    not_found: Locator,
}

impl<'s, S: BrowserSession> GamePage<'s, S> {
    /// Page bound to `session`
    #[must_use]
    pub fn new(session: &'s S, config: &ProbeConfig) -> Self {
        Self {
            base: PageBase::new(session, config),
            wrap: Locator::id("game-wrap"),
            title: Locator::css("#game-wrap h1"),
            price: Locator::css("#game-wrap .price"),
            add_to_cart: Locator::id("add-to-cart"),
            not_found: Locator::id("not-found"),
        }
    }

    /// Navigate to the detail page of `game`
    pub async fn open_game(&self, game: &SafeId) -> ProbeResult<()> {
        self.base
            .open_path(&format!("{}?id={game}", Route::Game.path()))
            .await?;
        self.wait_until_loaded().await
    }

    /// Add the shown game to the signed-in user's cart
    pub async fn add_to_cart(&self) -> ProbeResult<()> {
        self.base.engine().click(&self.add_to_cart).await
    }

    pub async fn title_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.title).await
    }

    pub async fn price_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.price).await
    }

    /// Shown when the id matches no catalog entry
    pub async fn is_not_found_visible(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.not_found).await
    }
}

impl<'s, S: BrowserSession> PageObject for GamePage<'s, S> {
    type Session = S;

    fn route(&self) -> Route {
        Route::Game
    }

    fn landmark(&self) -> Locator {
        self.wrap.clone()
    }

    fn base(&self) -> &PageBase<'_, S> {
        &self.base
    }
}
