//! Payment page scenarios for `payment-test-user`.

use super::expect::{expect_contains, expect_eq, expect_false, expect_true};
use super::flows::{open_payment_with, sign_in_with_empty_cart, IRON_LEGION, NEON_DRIFT};
use super::ScenarioContext;
use crate::page_object::PageObject;
use crate::pages::PaymentDetails;
use crate::result::ProbeResult;
use crate::session::BrowserSession;

pub(super) async fn title_and_form<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_payment_with(ctx, &[NEON_DRIFT]).await?;
    let payment = ctx.payment();
    let title = payment.page_title_text().await?;
    expect_eq("payment title", "Payment", title.trim())?;
    expect_true("payment form displayed", payment.is_payment_form_displayed().await?)
}

pub(super) async fn summary_single_item<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_payment_with(ctx, &[NEON_DRIFT]).await?;
    expect_eq("summary lines", 1, ctx.payment().summary_item_count().await?)
}

pub(super) async fn total_single_item<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_payment_with(ctx, &[NEON_DRIFT]).await?;
    let total = ctx.payment().order_total_text().await?;
    expect_contains("order total", &total, "19.99")
}

pub(super) async fn card_number_formatted<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_payment_with(ctx, &[NEON_DRIFT]).await?;
    let payment = ctx.payment();
    payment.enter_card_number("4111111111111111").await?;
    let value = payment.card_number_value().await?;
    expect_eq("card number", "4111 1111 1111 1111", value.as_str())
}

pub(super) async fn expiry_formatted<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_payment_with(ctx, &[NEON_DRIFT]).await?;
    let payment = ctx.payment();
    payment.enter_expiry("1230").await?;
    expect_eq("expiry", "12/30", payment.expiry_value().await?.as_str())
}

pub(super) async fn cvv_digits_only<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_payment_with(ctx, &[NEON_DRIFT]).await?;
    let payment = ctx.payment();
    payment.enter_cvv("12a45").await?;
    expect_eq("cvv", "1245", payment.cvv_value().await?.as_str())
}

/// Fill the form with `details`, pay and return the validation message
async fn pay_with<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
    details: &PaymentDetails,
) -> ProbeResult<String> {
    open_payment_with(ctx, &[NEON_DRIFT]).await?;
    let payment = ctx.payment();
    payment.fill(details).await?;
    payment.pay_now().await?;
    payment.wait_for_pay_message().await
}

pub(super) async fn requires_cardholder<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let details = PaymentDetails {
        cardholder: String::new(),
        ..PaymentDetails::default()
    };
    let message = pay_with(ctx, &details).await?;
    expect_eq(
        "pay message",
        "Please enter the cardholder name.",
        message.trim(),
    )
}

pub(super) async fn rejects_card_number<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let details = PaymentDetails {
        card_number: "123456789012".to_string(),
        ..PaymentDetails::default()
    };
    let message = pay_with(ctx, &details).await?;
    expect_eq(
        "pay message",
        "Please enter a valid card number.",
        message.trim(),
    )
}

pub(super) async fn rejects_expired_card<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let details = PaymentDetails {
        expiry: "01/20".to_string(),
        ..PaymentDetails::default()
    };
    let message = pay_with(ctx, &details).await?;
    expect_eq(
        "pay message",
        "Please enter a valid expiry date (MM/YY).",
        message.trim(),
    )
}

pub(super) async fn rejects_short_cvv<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    let details = PaymentDetails {
        cvv: "12".to_string(),
        ..PaymentDetails::default()
    };
    let message = pay_with(ctx, &details).await?;
    expect_contains("pay message", &message, "valid CVV")
}

pub(super) async fn requires_country<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_payment_with(ctx, &[NEON_DRIFT]).await?;
    let payment = ctx.payment();
    payment
        .fill_without_country(&PaymentDetails::default())
        .await?;
    payment.pay_now().await?;
    let message = payment.wait_for_pay_message().await?;
    expect_eq("pay message", "Please select your country.", message.trim())
}

pub(super) async fn success_redirects<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_payment_with(ctx, &[NEON_DRIFT]).await?;
    let payment = ctx.payment();
    payment.fill_valid_details().await?;
    payment.pay_now().await?;
    payment.wait_for_orders_redirect().await
}

pub(super) async fn summary_two_items<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_payment_with(ctx, &[NEON_DRIFT, IRON_LEGION]).await?;
    expect_eq("summary lines", 2, ctx.payment().summary_item_count().await?)
}

pub(super) async fn total_two_items<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    open_payment_with(ctx, &[NEON_DRIFT, IRON_LEGION]).await?;
    let total = ctx.payment().order_total_text().await?;
    expect_contains("order total", &total, "49.98")
}

pub(super) async fn empty_cart<S: BrowserSession>(
    ctx: &ScenarioContext<'_, S>,
) -> ProbeResult<()> {
    sign_in_with_empty_cart(ctx).await?;
    let payment = ctx.payment();
    payment.open().await?;
    expect_true(
        "no-cart message displayed",
        payment.is_no_cart_message_displayed().await?,
    )?;
    expect_false("payment form displayed", payment.is_payment_form_displayed().await?)
}
