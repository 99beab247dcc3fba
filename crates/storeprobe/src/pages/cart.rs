//! Cart screen.
//!
//! Rows are addressed by catalog id through [`Locator::scoped`], so only
//! validated ids ever reach a selector.

use crate::config::ProbeConfig;
use crate::locator::{Locator, SafeId};
use crate::page_object::{PageBase, PageObject, Route};
use crate::result::{ProbeError, ProbeResult};
use crate::session::BrowserSession;

use super::PAGE_TITLE_CLASS;

const ROW: &str = ".cart-item[data-id='{id}']";
const ROW_COUNT: &str = ".cart-item[data-id='{id}'] .count";
const ROW_INC: &str = ".cart-item[data-id='{id}'] button[data-act='inc']";
const ROW_DEC: &str = ".cart-item[data-id='{id}'] button[data-act='dec']";
const ROW_REMOVE: &str = ".cart-item[data-id='{id}'] button[data-act='rm']";

/// The signed-in user's cart
#[derive(Debug)]
pub struct CartPage<'s, S> {
    base: PageBase<'s, S>,
    title: Locator,
    cart_list: Locator,
    cart_footer: Locator,
    empty_cart: Locator,
    grand_total: Locator,
    checkout: Locator,
    cart_items: Locator,
    message: Locator,
}

impl<'s, S: BrowserSession> CartPage<'s, S> {
    /// Page bound to `session`
    #[must_use]
    pub fn new(session: &'s S, config: &ProbeConfig) -> Self {
        Self {
            base: PageBase::new(session, config),
            title: Locator::class_name(PAGE_TITLE_CLASS),
            cart_list: Locator::id("cart-list"),
            cart_footer: Locator::id("cart-footer"),
            empty_cart: Locator::id("empty-cart"),
            grand_total: Locator::id("grand-total"),
            checkout: Locator::id("checkout"),
            cart_items: Locator::css(".cart-item"),
            message: Locator::id("cart-msg"),
        }
    }

    pub async fn reload(&self) -> ProbeResult<()> {
        self.base.reload().await?;
        self.wait_until_loaded().await
    }

    pub async fn page_title_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.title).await
    }

    pub async fn is_cart_list_displayed(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.cart_list).await
    }

    pub async fn is_cart_list_present(&self) -> ProbeResult<bool> {
        self.base.engine().is_present(&self.cart_list).await
    }

    pub async fn is_empty_cart_message_displayed(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.empty_cart).await
    }

    pub async fn is_footer_displayed(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.cart_footer).await
    }

    /// Rendered rows, 0 when the cart is empty
    pub async fn item_count(&self) -> ProbeResult<usize> {
        self.base.engine().count(&self.cart_items).await
    }

    pub async fn has_item(&self, game: &SafeId) -> ProbeResult<bool> {
        self.base
            .engine()
            .is_present(&Locator::scoped(ROW, game))
            .await
    }

    pub async fn grand_total_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.grand_total).await
    }

    /// Quantity shown on the row of `game`
    pub async fn quantity_of(&self, game: &SafeId) -> ProbeResult<u32> {
        let text = self
            .base
            .engine()
            .read_text(&Locator::scoped(ROW_COUNT, game))
            .await?;
        text.trim().parse().map_err(|_| {
            ProbeError::assertion(format!("quantity of {game} is not a number"), "integer", text)
        })
    }

    pub async fn increase(&self, game: &SafeId) -> ProbeResult<()> {
        self.base.engine().click(&Locator::scoped(ROW_INC, game)).await
    }

    pub async fn decrease(&self, game: &SafeId) -> ProbeResult<()> {
        self.base.engine().click(&Locator::scoped(ROW_DEC, game)).await
    }

    pub async fn remove(&self, game: &SafeId) -> ProbeResult<()> {
        self.base
            .engine()
            .click(&Locator::scoped(ROW_REMOVE, game))
            .await
    }

    pub async fn checkout(&self) -> ProbeResult<()> {
        self.base.engine().click(&self.checkout).await
    }

    /// Inline cart message, empty when hidden
    pub async fn message_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.message).await
    }
}

impl<'s, S: BrowserSession> PageObject for CartPage<'s, S> {
    type Session = S;

    fn route(&self) -> Route {
        Route::Cart
    }

    fn landmark(&self) -> Locator {
        self.cart_list.clone()
    }

    fn base(&self) -> &PageBase<'_, S> {
        &self.base
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_locators_embed_the_id() {
        let id = SafeId::parse("neon-drift").unwrap();
        assert_eq!(
            Locator::scoped(ROW_INC, &id).value(),
            ".cart-item[data-id='neon-drift'] button[data-act='inc']"
        );
        assert_eq!(
            Locator::scoped(ROW_COUNT, &id).to_css(),
            ".cart-item[data-id='neon-drift'] .count"
        );
    }
}
