//! Catalog home screen.

use crate::config::ProbeConfig;
use crate::locator::Locator;
use crate::page_object::{PageBase, PageObject, Route};
use crate::result::ProbeResult;
use crate::session::BrowserSession;

use super::PAGE_TITLE_CLASS;

/// Home screen: navigation bar, search and the games grid
#[derive(Debug)]
pub struct HomePage<'s, S> {
    base: PageBase<'s, S>,
    nav_bar: Locator,
    title: Locator,
    subtitle: Locator,
    search_box: Locator,
    reset_button: Locator,
    games_grid: Locator,
    game_cards: Locator,
    empty_message: Locator,
    toast_container: Locator,
}

impl<'s, S: BrowserSession> HomePage<'s, S> {
    /// Page bound to `session`
    #[must_use]
    pub fn new(session: &'s S, config: &ProbeConfig) -> Self {
        Self {
            base: PageBase::new(session, config),
            nav_bar: Locator::id("nav"),
            title: Locator::class_name(PAGE_TITLE_CLASS),
            subtitle: Locator::class_name("page-subtitle"),
            search_box: Locator::id("search"),
            reset_button: Locator::id("reset-search"),
            games_grid: Locator::id("games-grid"),
            game_cards: Locator::css("#games-grid .game-card"),
            empty_message: Locator::id("empty"),
            toast_container: Locator::id("toasts"),
        }
    }

    pub async fn is_nav_bar_displayed(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.nav_bar).await
    }

    pub async fn page_title_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.title).await
    }

    pub async fn subtitle_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.subtitle).await
    }

    pub async fn is_search_box_displayed(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.search_box).await
    }

    pub async fn is_search_box_enabled(&self) -> ProbeResult<bool> {
        self.base.engine().is_enabled(&self.search_box).await
    }

    /// Replace the search text. The catalog filters after its own debounce.
    pub async fn search(&self, text: &str) -> ProbeResult<()> {
        self.base.engine().set_value(&self.search_box, text).await
    }

    /// Current search text, empty when unset
    pub async fn search_value(&self) -> ProbeResult<String> {
        Ok(self
            .base
            .engine()
            .read_attribute(&self.search_box, "value")
            .await?
            .unwrap_or_default())
    }

    pub async fn reset_search(&self) -> ProbeResult<()> {
        self.base.engine().click(&self.reset_button).await
    }

    pub async fn is_reset_button_displayed(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.reset_button).await
    }

    pub async fn is_games_grid_displayed(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.games_grid).await
    }

    /// Cards currently rendered in the grid
    pub async fn game_card_count(&self) -> ProbeResult<usize> {
        self.base.engine().count(&self.game_cards).await
    }

    /// Shown when a search matches nothing
    pub async fn is_empty_message_visible(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.empty_message).await
    }

    pub async fn is_toast_container_present(&self) -> ProbeResult<bool> {
        self.base.engine().is_present(&self.toast_container).await
    }
}

impl<'s, S: BrowserSession> PageObject for HomePage<'s, S> {
    type Session = S;

    fn route(&self) -> Route {
        Route::Index
    }

    fn landmark(&self) -> Locator {
        self.games_grid.clone()
    }

    fn base(&self) -> &PageBase<'_, S> {
        &self.base
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Timeouts;
    use crate::mock::{MockSession, Storefront};
    use std::time::Duration;

    fn config() -> ProbeConfig {
        ProbeConfig::default()
            .with_base_url("http://shop.test")
            .with_timeouts(Timeouts::default().compressed(1_000))
    }

    #[tokio::test]
    async fn test_open_and_read_heading() {
        let session = MockSession::new(Storefront::new());
        let config = config();
        let home = HomePage::new(&session, &config);
        home.open().await.unwrap();
        assert_eq!(home.page_title_text().await.unwrap(), "Featured games");
        assert!(home.is_nav_bar_displayed().await.unwrap());
        assert_eq!(home.game_card_count().await.unwrap(), 9);
        assert!(Route::Index.matches(&home.current_url().await.unwrap()));
    }

    #[tokio::test]
    async fn test_last_search_wins() {
        let session = MockSession::new(Storefront::new());
        let config = config();
        let home = HomePage::new(&session, &config);
        home.open().await.unwrap();
        home.search("Neon").await.unwrap();
        home.search("Iron").await.unwrap();
        assert_eq!(home.search_value().await.unwrap(), "Iron");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(home.game_card_count().await.unwrap(), 1);
        home.reset_search().await.unwrap();
        assert_eq!(home.search_value().await.unwrap(), "");
        assert_eq!(home.game_card_count().await.unwrap(), 9);
    }
}
