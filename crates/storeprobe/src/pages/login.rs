//! Login and signup screen.

use crate::config::ProbeConfig;
use crate::locator::Locator;
use crate::page_object::{PageBase, PageObject, Route};
use crate::result::ProbeResult;
use crate::session::BrowserSession;
use crate::wait::Condition;

/// Login form with the signup tab
#[derive(Debug)]
pub struct LoginPage<'s, S> {
    base: PageBase<'s, S>,
    email: Locator,
    password: Locator,
    submit: Locator,
    message: Locator,
    login_form: Locator,
    signup_tab: Locator,
    signup_form: Locator,
}

impl<'s, S: BrowserSession> LoginPage<'s, S> {
    /// Page bound to `session`
    #[must_use]
    pub fn new(session: &'s S, config: &ProbeConfig) -> Self {
        Self {
            base: PageBase::new(session, config),
            email: Locator::id("login-email"),
            password: Locator::id("login-password"),
            submit: Locator::css("#login-form button"),
            message: Locator::id("login-msg"),
            login_form: Locator::id("login-form"),
            signup_tab: Locator::id("tab-signup"),
            signup_form: Locator::id("signup-form"),
        }
    }

    pub async fn window_title(&self) -> ProbeResult<String> {
        self.base.window_title().await
    }

    /// Set the email field, verified by read-back
    pub async fn enter_email(&self, text: &str) -> ProbeResult<()> {
        self.base.engine().set_value(&self.email, text).await
    }

    /// Set the password field, verified by read-back
    pub async fn enter_password(&self, text: &str) -> ProbeResult<()> {
        self.base.engine().set_value(&self.password, text).await
    }

    pub async fn email_value(&self) -> ProbeResult<String> {
        Ok(self
            .base
            .engine()
            .read_attribute(&self.email, "value")
            .await?
            .unwrap_or_default())
    }

    /// `type` of the password input
    pub async fn password_field_type(&self) -> ProbeResult<Option<String>> {
        self.base
            .engine()
            .wait_for(&Condition::Visible(self.password.clone()))
            .await?;
        self.base.engine().read_attribute(&self.password, "type").await
    }

    pub async fn submit(&self) -> ProbeResult<()> {
        self.base.engine().click(&self.submit).await
    }

    /// Enabled once clickable
    pub async fn is_submit_enabled(&self) -> ProbeResult<bool> {
        self.base
            .engine()
            .wait_for(&Condition::Clickable(self.submit.clone()))
            .await?;
        self.base.engine().is_enabled(&self.submit).await
    }

    pub async fn open_signup_tab(&self) -> ProbeResult<()> {
        self.base.engine().click(&self.signup_tab).await
    }

    pub async fn is_signup_form_displayed(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.signup_form).await
    }

    /// Wait for the signup form within the interaction budget
    pub async fn wait_for_signup_form(&self) -> ProbeResult<()> {
        let engine = self.base.engine();
        self.base
            .wait_until_visible(&self.signup_form, engine.timeouts().interaction())
            .await
    }

    pub async fn is_error_message_displayed(&self) -> ProbeResult<bool> {
        self.base.engine().is_visible(&self.message).await
    }

    /// Wait for the error message within the interaction budget
    pub async fn wait_for_error_message(&self) -> ProbeResult<()> {
        let engine = self.base.engine();
        self.base
            .wait_until_visible(&self.message, engine.timeouts().interaction())
            .await
    }

    pub async fn error_message_text(&self) -> ProbeResult<String> {
        self.base.engine().read_text(&self.message).await
    }
}

impl<'s, S: BrowserSession> PageObject for LoginPage<'s, S> {
    type Session = S;

    fn route(&self) -> Route {
        Route::Login
    }

    fn landmark(&self) -> Locator {
        self.login_form.clone()
    }

    fn base(&self) -> &PageBase<'_, S> {
        &self.base
    }
}
