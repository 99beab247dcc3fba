//! Login page scenarios. Credentials belong to no stored account.

use super::expect::{expect_contains, expect_eq, expect_true};
use super::ScenarioContext;
use crate::result::ProbeResult;
use crate::session::BrowserSession;

/// Enter `email` and `password`, submit and wait for the error message
async fn submit_and_wait<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
    email: &str,
    password: &str,
) -> ProbeResult<()> {
    let login = ctx.login();
    login.enter_email(email).await?;
    login.enter_password(password).await?;
    login.submit().await?;
    login.wait_for_error_message().await
}

pub(super) async fn window_title<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let title = ctx.login().window_title().await?;
    expect_contains("window title", &title, "Game Store")
}

pub(super) async fn empty_submit<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let login = ctx.login();
    login.submit().await?;
    login.wait_for_error_message().await
}

pub(super) async fn invalid_email<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    submit_and_wait(ctx, "abc", "password123").await?;
    let text = ctx.login().error_message_text().await?;
    expect_eq(
        "login message",
        "Please enter a valid email and password.",
        text.trim(),
    )
}

pub(super) async fn unknown_account_short_password<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    submit_and_wait(ctx, "test@gmail.com", "123").await?;
    expect_true(
        "error message displayed",
        ctx.login().is_error_message_displayed().await?,
    )
}

pub(super) async fn unknown_account<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    submit_and_wait(ctx, "user@test.com", "wrongpass").await?;
    expect_true(
        "error message displayed",
        ctx.login().is_error_message_displayed().await?,
    )
}

pub(super) async fn email_keeps_value<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let login = ctx.login();
    login.enter_email("hello@test.com").await?;
    expect_eq("email value", "hello@test.com", login.email_value().await?.as_str())
}

pub(super) async fn password_masked<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let kind = ctx.login().password_field_type().await?.unwrap_or_default();
    expect_eq("password field type", "password", kind.as_str())
}

pub(super) async fn signup_tab<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let login = ctx.login();
    login.open_signup_tab().await?;
    login.wait_for_signup_form().await?;
    expect_true("signup form displayed", login.is_signup_form_displayed().await?)
}

pub(super) async fn submit_enabled<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    expect_true("login button enabled", ctx.login().is_submit_enabled().await?)
}

pub(super) async fn repeated_failures<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    for _ in 0..3 {
        submit_and_wait(ctx, "wrong@test.com", "wrong1234").await?;
    }
    expect_true(
        "error message displayed",
        ctx.login().is_error_message_displayed().await?,
    )
}
