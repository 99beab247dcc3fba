//! Catalog home page scenarios. No user is signed in.

use super::expect::{expect_contains, expect_eq, expect_false, expect_not_blank, expect_true};
use super::ScenarioContext;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::session::BrowserSession;

pub(super) async fn nav_bar_displayed<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    expect_true("nav bar displayed", ctx.home().is_nav_bar_displayed().await?)
}

pub(super) async fn title<S: BrowserSession>(ctx: &ScenarioContext<'_, S>) -> ProbeResult<()> {
    let text = ctx.home().page_title_text().await?;
    expect_eq("home title", "Featured games", text.trim())
}

pub(super) async fn search_box_visible<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    expect_true("search box displayed", ctx.home().is_search_box_displayed().await?)
}

pub(super) async fn search_keeps_typed_value<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let home = ctx.home();
    home.search("Neon").await?;
    expect_eq("search value", "Neon", home.search_value().await?.as_str())
}

pub(super) async fn reset_clears_search<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let home = ctx.home();
    home.search("Iron").await?;
    home.reset_search().await?;
    expect_eq("search value after reset", "", home.search_value().await?.as_str())
}

pub(super) async fn games_grid_displayed<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    expect_true("games grid displayed", ctx.home().is_games_grid_displayed().await?)
}

pub(super) async fn toast_container_present<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    expect_true(
        "toast container present",
        ctx.home().is_toast_container_present().await?,
    )
}

pub(super) async fn url_is_index<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let url = ctx.home().current_url().await?;
    expect_contains("home url", &url, "/index.html")
}

pub(super) async fn subtitle_not_empty<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    expect_not_blank("home subtitle", &ctx.home().subtitle_text().await?)
}

pub(super) async fn reset_button_visible<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    expect_true("reset button displayed", ctx.home().is_reset_button_displayed().await?)
}

pub(super) async fn search_box_enabled<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    expect_true("search box enabled", ctx.home().is_search_box_enabled().await?)
}

pub(super) async fn search_initially_empty<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    expect_eq("initial search value", "", ctx.home().search_value().await?.as_str())
}

pub(super) async fn last_search_wins<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let home = ctx.home();
    home.search("Neon").await?;
    home.search("Iron").await?;
    expect_eq("search value", "Iron", home.search_value().await?.as_str())
}

/// The empty-state message is checked right after the search is typed, before
/// the catalog's debounced filter has run, so the expected observation is
/// "not visible" even though the term matches nothing. Once the filter runs
/// the message does appear.
pub(super) async fn unknown_search_term<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let home = ctx.home();
    home.search("this-game-does-not-exist-12345").await?;
    expect_false(
        "empty message visible immediately after search",
        home.is_empty_message_visible().await?,
    )
}
