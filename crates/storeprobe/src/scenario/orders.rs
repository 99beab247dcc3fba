//! Order history scenarios for `orders-test-user`.

use super::expect::{
    expect_at_least, expect_contains, expect_eq, expect_false, expect_not_blank,
    expect_starts_with, expect_true,
};
use super::flows::{complete_purchase, ensure_rendered_order, IRON_LEGION, NEON_DRIFT};
use super::ScenarioContext;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::session::BrowserSession;

pub(super) async fn title<S: BrowserSession>(ctx: &ScenarioContext<'_, S>) -> ProbeResult<()> {
    let orders = ctx.orders();
    orders.wait_until_loaded().await?;
    let title = orders.page_title_text().await?;
    expect_eq("orders title", "Purchase history", title.trim())
}

pub(super) async fn empty_history<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let user = ctx.user()?;
    let seeder = ctx.seeder();
    seeder.log_in(&user).await?;
    seeder.clear_orders(&user).await?;
    seeder.clear_last_success(&user).await?;
    let orders = ctx.orders();
    orders.open().await?;
    expect_true(
        "no-orders message displayed",
        orders.is_no_orders_message_displayed().await?,
    )?;
    expect_eq("rendered orders", 0, orders.rendered_order_count().await?)
}

pub(super) async fn history_rendered<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    ensure_rendered_order(ctx).await?;
    let orders = ctx.orders();
    expect_false(
        "no-orders message displayed",
        orders.is_no_orders_message_displayed().await?,
    )?;
    expect_at_least("rendered orders", 1, orders.rendered_order_count().await?)
}

pub(super) async fn at_least_one<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    ensure_rendered_order(ctx).await?;
    expect_at_least("rendered orders", 1, ctx.orders().rendered_order_count().await?)
}

pub(super) async fn id_prefix<S: BrowserSession>(ctx: &ScenarioContext<'_, S>) -> ProbeResult<()> {
    ensure_rendered_order(ctx).await?;
    let id = ctx.orders().first_order_id_text().await?;
    expect_starts_with("first order id", id.trim(), "GS-")
}

pub(super) async fn meta_shows_purchase_date<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    ensure_rendered_order(ctx).await?;
    let meta = ctx.orders().first_order_meta_text().await?;
    expect_contains("first order meta", &meta, "Purchased:")
}

pub(super) async fn price_shown<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    ensure_rendered_order(ctx).await?;
    expect_not_blank("first order price", &ctx.orders().first_order_price_text().await?)
}

pub(super) async fn line_items_shown<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    ensure_rendered_order(ctx).await?;
    expect_at_least(
        "first order line items",
        1,
        ctx.orders().first_order_line_item_count().await?,
    )
}

pub(super) async fn success_banner<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    complete_purchase(ctx, NEON_DRIFT).await?;
    let orders = ctx.orders();
    orders.wait_until_loaded().await?;
    expect_contains("orders url", &orders.current_url().await?, "success=1")?;
    expect_true("success box displayed", orders.is_success_box_displayed().await?)?;
    let message = orders.success_message_text().await?;
    expect_contains("success message", &message, "Order GS-")
}

pub(super) async fn purchase_is_stored<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let user = ctx.user()?;
    let seeder = ctx.seeder();
    seeder.log_in(&user).await?;
    let before = seeder.stored_order_count(&user).await?;
    complete_purchase(ctx, NEON_DRIFT).await?;
    let after = seeder.stored_order_count(&user).await?;
    expect_eq("stored orders after purchase", before + 1, after)
}

pub(super) async fn url<S: BrowserSession>(ctx: &ScenarioContext<'_, S>) -> ProbeResult<()> {
    let url = ctx.orders().current_url().await?;
    expect_contains("orders url", &url, "/orders.html")
}

pub(super) async fn stored_history<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    ensure_rendered_order(ctx).await?;
    let user = ctx.user()?;
    let stored = ctx.seeder().stored_order_count(&user).await?;
    expect_at_least("stored orders", 1, stored)
}

pub(super) async fn new_purchase_rendered<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    ensure_rendered_order(ctx).await?;
    let orders = ctx.orders();
    let before = orders.rendered_order_count().await?;
    complete_purchase(ctx, IRON_LEGION).await?;
    orders.open().await?;
    orders.wait_for_rendered_orders(before + 1).await
}
