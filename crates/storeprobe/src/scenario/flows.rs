//! Multi-page setup shared by several suites.

use tracing::info;

use super::ScenarioContext;
use crate::locator::SafeId;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::session::BrowserSession;

pub(super) const NEON_DRIFT: &str = "neon-drift";
pub(super) const IRON_LEGION: &str = "iron-legion";

pub(super) fn game(raw: &str) -> ProbeResult<SafeId> {
    SafeId::parse(raw)
}

/// Sign in the suite user and empty their cart
pub(super) async fn sign_in_with_empty_cart<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let user = ctx.user()?;
    let seeder = ctx.seeder();
    seeder.log_in(&user).await?;
    seeder.clear_cart(&user).await
}

/// Add each game once, in order, through its detail page
pub(super) async fn add_games<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
    games: &[&str],
) -> ProbeResult<()> {
    let page = ctx.game();
    for raw in games {
        page.open_game(&game(raw)?).await?;
        page.add_to_cart().await?;
    }
    Ok(())
}

/// Empty cart, then the cart page
pub(super) async fn open_empty_cart<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    sign_in_with_empty_cart(ctx).await?;
    ctx.cart().open().await
}

/// Fresh cart holding `games`, then the cart page
pub(super) async fn open_cart_with<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
    games: &[&str],
) -> ProbeResult<()> {
    sign_in_with_empty_cart(ctx).await?;
    ctx.home().open().await?;
    add_games(ctx, games).await?;
    ctx.cart().open().await
}

/// Fresh cart holding `games`, then through the cart to the payment page
pub(super) async fn open_payment_with<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
    games: &[&str],
) -> ProbeResult<()> {
    sign_in_with_empty_cart(ctx).await?;
    ctx.home().open().await?;
    add_games(ctx, games).await?;
    ctx.payment().go_from_cart().await
}

/// Buy one game with valid details and wait for the order history redirect
pub(super) async fn complete_purchase<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
    raw_game: &str,
) -> ProbeResult<()> {
    open_payment_with(ctx, &[raw_game]).await?;
    let payment = ctx.payment();
    payment.fill_valid_details().await?;
    payment.pay_now().await?;
    payment.wait_for_orders_redirect().await?;
    info!(game = raw_game, "purchase completed");
    Ok(())
}

/// Sign in and make sure the order history page renders at least one order
pub(super) async fn ensure_rendered_order<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let user = ctx.user()?;
    let seeder = ctx.seeder();
    seeder.log_in(&user).await?;
    if seeder.stored_order_count(&user).await? == 0 {
        complete_purchase(ctx, NEON_DRIFT).await?;
    }
    let orders = ctx.orders();
    orders.open().await?;
    orders.wait_for_rendered_orders(1).await
}
