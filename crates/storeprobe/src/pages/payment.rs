//! Checkout screen.
//!
//! Every field is typed with native keystrokes and read back afterwards. The
//! application formats card number, expiry and CVV as they are typed, so those
//! fields are checked against the formatted value, which is also what the read
//! accessors return.

use crate::config::ProbeConfig;
use crate::locator::Locator;
use crate::page_object::{PageBase, PageObject, Route};
use crate::result::{ProbeError, ProbeResult};
use crate::session::BrowserSession;

use super::PAGE_TITLE_CLASS;

/// Longest card number the card field keeps
pub const MAX_CARD_DIGITS: usize = 19;

/// Longest CVV the CVV field keeps
pub const MAX_CVV_DIGITS: usize = 4;

fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Card field display: digits only, at most 19, in groups of four
#[must_use]
pub fn format_card_number(raw: &str) -> String {
    let digits: Vec<char> = digits(raw).chars().take(MAX_CARD_DIGITS).collect();
    digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Expiry field display: digits only, at most 4, `MM/YY` once past the month
#[must_use]
pub fn format_expiry(raw: &str) -> String {
    let digits: String = digits(raw).chars().take(4).collect();
    if digits.len() <= 2 {
        digits
    } else {
        format!("{}/{}", &digits[..2], &digits[2..])
    }
}

/// CVV field display: digits only, at most 4
#[must_use]
pub fn format_cvv(raw: &str) -> String {
    digits(raw).chars().take(MAX_CVV_DIGITS).collect()
}

/// A complete set of payment form values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub cardholder: String,
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
    pub billing_address: String,
    pub city: String,
    pub zip: String,
    /// Visible text of the country option
    pub country: String,
}

impl Default for PaymentDetails {
    /// Details the storefront accepts
    fn default() -> Self {
        Self {
            cardholder: "Alex Gamer".to_string(),
            card_number: "4111111111111111".to_string(),
            expiry: "12/30".to_string(),
            cvv: "123".to_string(),
            billing_address: "221B Baker Street".to_string(),
            city: "Hyderabad".to_string(),
            zip: "500001".to_string(),
            country: "India".to_string(),
        }
    }
}

/// Payment form and order summary
#[derive(Debug)]
pub struct PaymentPage<'s, S> {
    base: PageBase<'s, S>,
    title: Locator,
    payment_form: Locator,
    no_cart: Locator,
    cart_checkout: Locator,
    summary_items: Locator,
    order_total: Locator,
    pay_button: Locator,
    pay_message: Locator,
    card_name: Locator,
    card_number: Locator,
    expiry: Locator,
    cvv: Locator,
    billing: Locator,
    city: Locator,
    zip: Locator,
    country: Locator,
}

impl<'s, S: BrowserSession> PaymentPage<'s, S> {
    /// Page bound to `session`
    #[must_use]
    pub fn new(session: &'s S, config: &ProbeConfig) -> Self {
        Self {
            base: PageBase::new(session, config),
            title: Locator::class_name(PAGE_TITLE_CLASS),
            payment_form: Locator::id("payment-form"),
            no_cart: Locator::id("no-cart"),
            cart_checkout: Locator::id("checkout"),
            summary_items: Locator::css("#order-items .order-item"),
            order_total: Locator::id("order-total"),
            pay_button: Locator::id("pay-btn"),
            pay_message: Locator::id("pay-msg"),
            card_name: Locator::id("card-name"),
            card_number: Locator::id("card-number"),
            expiry: Locator::id("exp"),
            cvv: Locator::id("cvv"),
            billing: Locator::id("billing"),
            city: Locator::id("city"),
            zip: Locator::id("zip"),
            country: Locator::id("country"),
        }
    }

    /// Open the cart, check out and wait for the payment screen
    pub async fn go_from_cart(&self) -> ProbeResult<()> {
        self.base.open_path(Route::Cart.path()).await?;
        self.base.engine().click(&self.cart_checkout).await?;
        self.base.wait_for_url(Route::Payment.path()).await?;
        self.wait_until_loaded().await
    }

    pub async fn page_title_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.title).await
    }

    pub async fn is_payment_form_displayed(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.payment_form).await
    }

    pub async fn is_no_cart_message_displayed(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.no_cart).await
    }

    /// Lines in the order summary
    pub async fn summary_item_count(&self) -> ProbeResult<usize> {
        self.base.engine().count(&self.summary_items).await
    }

    pub async fn order_total_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.order_total).await
    }

    async fn value_of(&self, field: &Locator) -> ProbeResult<String> {
        Ok(self
            .base
            .engine()
            .read_attribute(field, "value")
            .await?
            .unwrap_or_default())
    }

    pub async fn enter_cardholder_name(&self, text: &str) -> ProbeResult<()> {
        self.base.engine().type_keys(&self.card_name, text).await
    }

    /// Type `text`; the field must end up showing it grouped in fours
    pub async fn enter_card_number(&self, text: &str) -> ProbeResult<()> {
        self.base
            .engine()
            .type_keys_expecting(&self.card_number, text, &format_card_number(text))
            .await
    }

    /// Card number as formatted by the page
    pub async fn card_number_value(&self) -> ProbeResult<String> {
        self.value_of(&self.card_number).await
    }

    /// Type `text`; the field must end up showing it as `MM/YY`
    pub async fn enter_expiry(&self, text: &str) -> ProbeResult<()> {
        self.base
            .engine()
            .type_keys_expecting(&self.expiry, text, &format_expiry(text))
            .await
    }

    pub async fn expiry_value(&self) -> ProbeResult<String> {
        self.value_of(&self.expiry).await
    }

    pub async fn enter_cvv(&self, text: &str) -> ProbeResult<()> {
        self.base
            .engine()
            .type_keys_expecting(&self.cvv, text, &format_cvv(text))
            .await
    }

    pub async fn cvv_value(&self) -> ProbeResult<String> {
        self.value_of(&self.cvv).await
    }

    pub async fn enter_billing_address(&self, text: &str) -> ProbeResult<()> {
        self.base.engine().type_keys(&self.billing, text).await
    }

    pub async fn enter_city(&self, text: &str) -> ProbeResult<()> {
        self.base.engine().type_keys(&self.city, text).await
    }

    pub async fn enter_zip(&self, text: &str) -> ProbeResult<()> {
        self.base.engine().type_keys(&self.zip, text).await
    }

    /// Choose the billing country by its visible text
    pub async fn select_country(&self, visible_text: &str) -> ProbeResult<()> {
        self.base
            .engine()
            .select_by_text(&self.country, visible_text)
            .await
    }

    /// Fill every field except the country
    pub async fn fill_without_country(&self, details: &PaymentDetails) -> ProbeResult<()> {
        self.enter_cardholder_name(&details.cardholder).await?;
        self.enter_card_number(&details.card_number).await?;
        self.enter_expiry(&details.expiry).await?;
        self.enter_cvv(&details.cvv).await?;
        self.enter_billing_address(&details.billing_address).await?;
        self.enter_city(&details.city).await?;
        self.enter_zip(&details.zip).await
    }

    /// Fill the whole form
    pub async fn fill(&self, details: &PaymentDetails) -> ProbeResult<()> {
        self.fill_without_country(details).await?;
        self.select_country(&details.country).await
    }

    /// Fill the whole form with details the storefront accepts
    pub async fn fill_valid_details(&self) -> ProbeResult<()> {
        self.fill(&PaymentDetails::default()).await
    }

    pub async fn pay_now(&self) -> ProbeResult<()> {
        self.base.engine().click(&self.pay_button).await
    }

    pub async fn is_pay_button_enabled(&self) -> ProbeResult<bool> {
        self.base.engine().is_enabled(&self.pay_button).await
    }

    /// Validation or status message, empty when hidden
    pub async fn pay_message(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.pay_message).await
    }

    /// Wait for a non-empty message within the flow budget and return it
    pub async fn wait_for_pay_message(&self) -> ProbeResult<String> {
        let engine = self.base.engine();
        engine
            .wait_until("payment message shown", engine.timeouts().flow(), || async {
                Ok::<_, ProbeError>(!self.pay_message().await?.trim().is_empty())
            })
            .await?;
        self.pay_message().await
    }

    /// Wait for the post-payment redirect to the order history
    pub async fn wait_for_orders_redirect(&self) -> ProbeResult<()> {
        let engine = self.base.engine();
        engine
            .wait_until_url_contains("/orders.html?success=1", engine.timeouts().redirect())
            .await
    }
}

impl<'s, S: BrowserSession> PageObject for PaymentPage<'s, S> {
    type Session = S;

    fn route(&self) -> Route {
        Route::Payment
    }

    fn landmark(&self) -> Locator {
        self.title.clone()
    }

    fn base(&self) -> &PageBase<'_, S> {
        &self.base
    }
}
