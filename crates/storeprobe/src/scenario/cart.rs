//! Cart page scenarios for `cart-test-user`.

use super::expect::{expect_contains, expect_eq, expect_false, expect_true};
use super::flows::{game, open_cart_with, open_empty_cart, IRON_LEGION, NEON_DRIFT};
use super::ScenarioContext;
use crate::page_object::{PageObject, Route};
use crate::result::ProbeResult;
use crate::session::BrowserSession;

pub(super) async fn title_and_list<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_empty_cart(ctx).await?;
    let cart = ctx.cart();
    let title = cart.page_title_text().await?;
    expect_eq("cart title", "Your cart", title.trim())?;
    expect_true("cart list present", cart.is_cart_list_present().await?)
}

pub(super) async fn empty_message_shown<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_empty_cart(ctx).await?;
    expect_true(
        "empty cart message displayed",
        ctx.cart().is_empty_cart_message_displayed().await?,
    )
}

pub(super) async fn footer_hidden_when_empty<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_empty_cart(ctx).await?;
    expect_false("footer displayed", ctx.cart().is_footer_displayed().await?)
}

pub(super) async fn single_item<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_cart_with(ctx, &[NEON_DRIFT]).await?;
    let cart = ctx.cart();
    expect_eq("cart rows", 1, cart.item_count().await?)?;
    expect_true("has neon-drift", cart.has_item(&game(NEON_DRIFT)?).await?)
}

pub(super) async fn single_item_total<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_cart_with(ctx, &[NEON_DRIFT]).await?;
    let total = ctx.cart().grand_total_text().await?;
    expect_contains("grand total", &total, "19.99")
}

pub(super) async fn increase_quantity<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_cart_with(ctx, &[NEON_DRIFT]).await?;
    let cart = ctx.cart();
    let neon = game(NEON_DRIFT)?;
    cart.increase(&neon).await?;
    expect_eq("neon-drift quantity", 2, cart.quantity_of(&neon).await?)
}

pub(super) async fn decrease_stops_at_one<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_cart_with(ctx, &[NEON_DRIFT]).await?;
    let cart = ctx.cart();
    let neon = game(NEON_DRIFT)?;
    cart.decrease(&neon).await?;
    expect_eq("neon-drift quantity", 1, cart.quantity_of(&neon).await?)
}

pub(super) async fn remove_empties_cart<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_cart_with(ctx, &[NEON_DRIFT]).await?;
    let cart = ctx.cart();
    cart.remove(&game(NEON_DRIFT)?).await?;
    expect_eq("cart rows", 0, cart.item_count().await?)?;
    expect_true(
        "empty cart message displayed",
        cart.is_empty_cart_message_displayed().await?,
    )
}

pub(super) async fn multi_item_total<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_cart_with(ctx, &[NEON_DRIFT, NEON_DRIFT, IRON_LEGION]).await?;
    let total = ctx.cart().grand_total_text().await?;
    expect_contains("grand total", &total, "69.97")
}

pub(super) async fn checkout_opens_payment<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_cart_with(ctx, &[NEON_DRIFT]).await?;
    let cart = ctx.cart();
    cart.checkout().await?;
    cart.base().wait_for_url(Route::Payment.path()).await
}

pub(super) async fn footer_visible_with_items<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_cart_with(ctx, &[NEON_DRIFT]).await?;
    expect_true("footer displayed", ctx.cart().is_footer_displayed().await?)
}

pub(super) async fn remove_hides_footer<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_cart_with(ctx, &[NEON_DRIFT]).await?;
    let cart = ctx.cart();
    cart.remove(&game(NEON_DRIFT)?).await?;
    expect_false("footer displayed", cart.is_footer_displayed().await?)
}

pub(super) async fn remove_one_of_two<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_cart_with(ctx, &[NEON_DRIFT, IRON_LEGION]).await?;
    let cart = ctx.cart();
    cart.remove(&game(NEON_DRIFT)?).await?;
    expect_eq("cart rows", 1, cart.item_count().await?)?;
    expect_true("has iron-legion", cart.has_item(&game(IRON_LEGION)?).await?)
}
