//! Purchase history screen.

use crate::config::ProbeConfig;
use crate::locator::Locator;
use crate::page_object::{PageBase, PageObject, Route};
use crate::result::{ProbeError, ProbeResult};
use crate::session::BrowserSession;

use super::PAGE_TITLE_CLASS;

/// Order history with the post-checkout success banner
#[derive(Debug)]
pub struct OrdersPage<'s, S> {
    base: PageBase<'s, S>,
    title: Locator,
    no_orders: Locator,
    order_cards: Locator,
    first_order_id: Locator,
    first_order_meta: Locator,
    first_order_price: Locator,
    first_order_items: Locator,
    success_box: Locator,
    success_message: Locator,
}

impl<'s, S: BrowserSession> OrdersPage<'s, S> {
    /// Page bound to `session`
    #[must_use]
    pub fn new(session: &'s S, config: &ProbeConfig) -> Self {
        Self {
            base: PageBase::new(session, config),
            title: Locator::class_name(PAGE_TITLE_CLASS),
            no_orders: Locator::id("no-orders"),
            order_cards: Locator::css(".order"),
            first_order_id: Locator::css(".order .order-id"),
            first_order_meta: Locator::css(".order .order-meta"),
            first_order_price: Locator::css(".order .price"),
            first_order_items: Locator::css(".order:first-of-type .order-item"),
            success_box: Locator::id("orders-success"),
            success_message: Locator::id("orders-success-msg"),
        }
    }

    pub async fn page_title_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.title).await
    }

    pub async fn is_no_orders_message_displayed(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.no_orders).await
    }

    /// Order cards rendered, 0 when there are none
    pub async fn rendered_order_count(&self) -> ProbeResult<usize> {
        self.base.engine().count(&self.order_cards).await
    }

    /// Wait until at least `minimum` order cards are rendered
    pub async fn wait_for_rendered_orders(&self, minimum: usize) -> ProbeResult<()> {
        let engine = self.base.engine();
        let description = format!("at least {minimum} rendered orders");
        engine
            .wait_until(&description, engine.timeouts().flow(), || async {
                Ok::<_, ProbeError>(self.rendered_order_count().await? >= minimum)
            })
            .await
    }

    /// Id of the newest order
    pub async fn first_order_id_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.first_order_id).await
    }

    /// Purchase line of the newest order
    pub async fn first_order_meta_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.first_order_meta).await
    }

    /// Total of the newest order
    pub async fn first_order_price_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.first_order_price).await
    }

    /// Line items of the newest order
    pub async fn first_order_line_item_count(&self) -> ProbeResult<usize> {
        self.base.engine().count(&self.first_order_items).await
    }

    pub async fn is_success_box_displayed(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.success_box).await
    }

    pub async fn success_message_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.success_message).await
    }
}

impl<'s, S: BrowserSession> PageObject for OrdersPage<'s, S> {
    type Session = S;

    fn route(&self) -> Route {
        Route::Orders
    }

    fn landmark(&self) -> Locator {
        self.title.clone()
    }

    fn base(&self) -> &PageBase<'_, S> {
        &self.base
    }
}
