//! Resilient Interaction Engine
//!
//! Every DOM operation a page object performs is one [`Interaction`]: a
//! locator, an [`Action`], a [`Precondition`] that must hold before acting and
//! an optional [`Postcondition`] verified afterwards. The engine runs each
//! attempt through the phases of [`AttemptPhase`]:
//!
//! ```text
//! Resolving -> WaitingCondition -> Acting -> Verifying -> Succeeded
//!     ^                                            |
//!     +---------- RetryableFailed (attempts left) -+
//! ```
//!
//! Only the failure kinds in the [`RetryPolicy`] are retried, and only while
//! attempts remain. A wait that runs out of time (element never found,
//! condition never true) is fatal at once: retry exists to beat a race with
//! rendering, not to paper over an absent element.
//!
//! The engine keeps no state between calls. Handles are resolved at the start
//! of every attempt and dropped at its end.

use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::{ProbeConfig, Timeouts};
use crate::locator::Locator;
use crate::result::{FailureKind, ProbeError, ProbeResult};
use crate::scripts;
use crate::session::BrowserSession;
use crate::wait::{is_truthy, Condition, WaitOptions, WaitOutcome, Waiter};

// =============================================================================
// RETRY POLICY
// =============================================================================

/// Default attempts per interaction
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Attempt budget and the failure kinds worth another attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    retryable: BTreeSet<FailureKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl RetryPolicy {
    /// Retry the two transient kinds, up to `max_attempts` (at least 1)
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retryable: [
                FailureKind::TransientStale,
                FailureKind::TransientNotInteractable,
            ]
            .into_iter()
            .collect(),
        }
    }

    /// Replace the retryable set
    #[must_use]
    pub fn with_retryable(mut self, kinds: impl IntoIterator<Item = FailureKind>) -> Self {
        self.retryable = kinds.into_iter().collect();
        self
    }

    /// Attempt budget
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether a failure of `kind` earns another attempt
    #[must_use]
    pub fn is_retryable(&self, kind: FailureKind) -> bool {
        self.retryable.contains(&kind)
    }
}

// =============================================================================
// INTERACTIONS
// =============================================================================

/// What to do with the resolved element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Native click
    Click,
    /// Property assignment plus synthetic `input`/`change`
    SetValue(String),
    /// Clear, then native keystrokes
    TypeKeys(String),
    /// Choose a `<select>` option by its visible text
    SelectByText(String),
    /// Rendered text
    ReadText,
    /// Property or attribute
    ReadAttribute(String),
    /// Enabled state
    IsEnabled,
}

impl Action {
    /// Short name for logs and errors
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::SetValue(_) => "set_value",
            Self::TypeKeys(_) => "type_keys",
            Self::SelectByText(_) => "select_by_text",
            Self::ReadText => "read_text",
            Self::ReadAttribute(_) => "read_attribute",
            Self::IsEnabled => "is_enabled",
        }
    }
}

/// Must hold before acting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Element exists
    Present,
    /// Element is displayed and enabled
    Clickable,
}

/// Verified after acting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Postcondition {
    /// Nothing to verify
    None,
    /// Property or attribute equals a value
    AttributeEquals {
        /// Property or attribute name
        name: String,
        /// Expected value
        value: String,
    },
}

/// One engine call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    /// Target
    pub locator: Locator,
    /// What to do
    pub action: Action,
    /// Gate before acting
    pub precondition: Precondition,
    /// Check after acting
    pub postcondition: Postcondition,
}

impl Interaction {
    fn new(locator: &Locator, action: Action, precondition: Precondition) -> Self {
        Self {
            locator: locator.clone(),
            action,
            precondition,
            postcondition: Postcondition::None,
        }
    }

    /// Click once clickable
    #[must_use]
    pub fn click(locator: &Locator) -> Self {
        Self::new(locator, Action::Click, Precondition::Clickable)
    }

    /// Assign `text` and verify the `value` property reads it back
    #[must_use]
    pub fn set_value(locator: &Locator, text: &str) -> Self {
        Self::new(locator, Action::SetValue(text.to_string()), Precondition::Clickable)
            .with_postcondition(Postcondition::AttributeEquals {
                name: "value".to_string(),
                value: text.to_string(),
            })
    }

    /// Clear, type and verify the `value` property reads `text` back
    #[must_use]
    pub fn type_keys(locator: &Locator, text: &str) -> Self {
        Self::type_keys_expecting(locator, text, text)
    }

    /// Clear, type and verify the `value` property reads `displayed`. For
    /// fields whose input listeners reformat what is typed.
    #[must_use]
    pub fn type_keys_expecting(locator: &Locator, text: &str, displayed: &str) -> Self {
        Self::new(locator, Action::TypeKeys(text.to_string()), Precondition::Clickable)
            .with_postcondition(Postcondition::AttributeEquals {
                name: "value".to_string(),
                value: displayed.to_string(),
            })
    }

    /// Pick an option by visible text
    #[must_use]
    pub fn select_by_text(locator: &Locator, text: &str) -> Self {
        Self::new(
            locator,
            Action::SelectByText(text.to_string()),
            Precondition::Clickable,
        )
    }

    /// Read rendered text
    #[must_use]
    pub fn read_text(locator: &Locator) -> Self {
        Self::new(locator, Action::ReadText, Precondition::Present)
    }

    /// Read a property or attribute
    #[must_use]
    pub fn read_attribute(locator: &Locator, name: &str) -> Self {
        Self::new(
            locator,
            Action::ReadAttribute(name.to_string()),
            Precondition::Present,
        )
    }

    /// Read enabled state
    #[must_use]
    pub fn is_enabled(locator: &Locator) -> Self {
        Self::new(locator, Action::IsEnabled, Precondition::Present)
    }

    /// Replace the postcondition
    #[must_use]
    pub fn with_postcondition(mut self, postcondition: Postcondition) -> Self {
        self.postcondition = postcondition;
        self
    }
}

/// Phase an attempt was in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    /// Finding the element
    Resolving,
    /// Waiting for the precondition
    WaitingCondition,
    /// Performing the action
    Acting,
    /// Checking the postcondition
    Verifying,
}

impl AttemptPhase {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resolving => "resolving",
            Self::WaitingCondition => "waiting_condition",
            Self::Acting => "acting",
            Self::Verifying => "verifying",
        }
    }
}

impl fmt::Display for AttemptPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value produced by a successful interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Action with no result
    Done,
    /// Text read
    Text(String),
    /// Attribute read
    Attribute(Option<String>),
    /// Boolean read
    Flag(bool),
}

impl Outcome {
    /// Text, or empty for anything else
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) | Self::Attribute(Some(text)) => text,
            _ => String::new(),
        }
    }

    /// Attribute value, if this is one
    #[must_use]
    pub fn into_attribute(self) -> Option<String> {
        match self {
            Self::Attribute(value) => value,
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Flag, false for anything else
    #[must_use]
    pub const fn flag(&self) -> bool {
        matches!(self, Self::Flag(true))
    }
}

struct AttemptFailure {
    phase: AttemptPhase,
    error: ProbeError,
}

trait InPhase<T> {
    fn in_phase(self, phase: AttemptPhase) -> Result<T, AttemptFailure>;
}

impl<T> InPhase<T> for ProbeResult<T> {
    fn in_phase(self, phase: AttemptPhase) -> Result<T, AttemptFailure> {
        self.map_err(|error| AttemptFailure { phase, error })
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Runs interactions against one session
#[derive(Debug)]
pub struct InteractionEngine<'s, S> {
    session: &'s S,
    policy: RetryPolicy,
    timeouts: Timeouts,
}

impl<'s, S: BrowserSession> InteractionEngine<'s, S> {
    /// Engine with default policy and budgets
    #[must_use]
    pub fn new(session: &'s S) -> Self {
        Self {
            session,
            policy: RetryPolicy::default(),
            timeouts: Timeouts::default(),
        }
    }

    /// Engine configured from `config`
    #[must_use]
    pub fn from_config(session: &'s S, config: &ProbeConfig) -> Self {
        Self {
            session,
            policy: RetryPolicy::new(config.retry.max_attempts),
            timeouts: config.timeouts,
        }
    }

    /// Override the retry policy
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the wait budgets
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// The session
    #[must_use]
    pub const fn session(&self) -> &'s S {
        self.session
    }

    /// Wait budgets in effect
    #[must_use]
    pub const fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Retry policy in effect
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn options(&self, budget: Duration) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(budget.as_millis() as u64)
            .with_poll_interval(self.timeouts.poll_interval_ms)
    }

    /// Run `interaction` under the retry policy
    pub async fn perform(&self, interaction: &Interaction) -> ProbeResult<Outcome> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let failure = match self.attempt(interaction, attempt).await {
                Ok(outcome) => return Ok(outcome),
                Err(failure) => failure,
            };

            let kind = failure.error.kind();
            let wait_expired = matches!(
                failure.phase,
                AttemptPhase::Resolving | AttemptPhase::WaitingCondition | AttemptPhase::Verifying
            ) && matches!(kind, FailureKind::NotFound | FailureKind::Timeout);
            if wait_expired || !self.policy.is_retryable(kind) {
                debug!(
                    locator = %interaction.locator,
                    action = interaction.action.name(),
                    attempt,
                    phase = %failure.phase,
                    kind = %kind,
                    "interaction failed"
                );
                return Err(failure.error);
            }
            if attempt >= max_attempts {
                return Err(ProbeError::RetriesExhausted {
                    action: interaction.action.name().to_string(),
                    locator: interaction.locator.to_string(),
                    attempts: attempt,
                    phase: failure.phase.to_string(),
                    source: Box::new(failure.error),
                });
            }
            warn!(
                locator = %interaction.locator,
                action = interaction.action.name(),
                attempt,
                phase = %failure.phase,
                error = %failure.error,
                "transient failure, retrying"
            );
        }
    }

    async fn attempt(
        &self,
        interaction: &Interaction,
        attempt: u32,
    ) -> Result<Outcome, AttemptFailure> {
        let locator = &interaction.locator;
        let deadline = Instant::now() + self.timeouts.interaction();
        debug!(
            locator = %locator,
            action = interaction.action.name(),
            attempt,
            "interaction attempt"
        );

        let present = Condition::Present(locator.clone());
        let found = Waiter::new(self.session)
            .until(&present, &self.options(self.timeouts.interaction()))
            .await
            .in_phase(AttemptPhase::Resolving)?;
        let handle = match found.handle {
            Some(handle) => handle,
            None => self
                .session
                .find_element(locator)
                .await
                .in_phase(AttemptPhase::Resolving)?,
        };

        if interaction.precondition == Precondition::Clickable {
            self.wait_clickable(&handle, locator, deadline)
                .await
                .in_phase(AttemptPhase::WaitingCondition)?;
        }

        let outcome = self
            .act(&handle, interaction)
            .await
            .in_phase(AttemptPhase::Acting)?;

        if let Postcondition::AttributeEquals { name, value } = &interaction.postcondition {
            let condition = Condition::attribute_equals(locator.clone(), name, value);
            Waiter::new(self.session)
                .until(&condition, &self.options(self.timeouts.interaction()))
                .await
                .in_phase(AttemptPhase::Verifying)?;
        }
        Ok(outcome)
    }

    async fn wait_clickable(
        &self,
        handle: &S::Handle,
        locator: &Locator,
        deadline: Instant,
    ) -> ProbeResult<()> {
        loop {
            if self.session.is_displayed(handle).await?
                && self.session.is_enabled(handle).await?
            {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(ProbeError::Timeout {
                    condition: Condition::Clickable(locator.clone()).description(),
                    ms: self.timeouts.interaction_ms,
                });
            }
            tokio::time::sleep(self.timeouts.poll_interval().min(deadline - now)).await;
        }
    }

    async fn act(&self, handle: &S::Handle, interaction: &Interaction) -> ProbeResult<Outcome> {
        let session = self.session;
        match &interaction.action {
            Action::Click => session.click(handle).await.map(|()| Outcome::Done),
            Action::SetValue(text) => session
                .execute_on(handle, scripts::SET_VALUE, &[Value::from(text.as_str())])
                .await
                .map(|_| Outcome::Done),
            Action::TypeKeys(text) => {
                session.clear(handle).await?;
                session.send_keys(handle, text).await?;
                Ok(Outcome::Done)
            }
            Action::SelectByText(text) => {
                let picked = session
                    .execute_on(handle, scripts::SELECT_BY_TEXT, &[Value::from(text.as_str())])
                    .await?;
                if is_truthy(&picked) {
                    Ok(Outcome::Done)
                } else {
                    Err(ProbeError::NotFound {
                        locator: format!("{} option {text:?}", interaction.locator),
                        waited_ms: 0,
                    })
                }
            }
            Action::ReadText => session.text(handle).await.map(Outcome::Text),
            Action::ReadAttribute(name) => {
                session.attribute(handle, name).await.map(Outcome::Attribute)
            }
            Action::IsEnabled => session.is_enabled(handle).await.map(Outcome::Flag),
        }
    }

    // ===== CONVENIENCE OPERATIONS =====

    /// Click once clickable
    pub async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        self.perform(&Interaction::click(locator)).await.map(|_| ())
    }

    /// Direct-assignment set-value with read-back verification
    pub async fn set_value(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        self.perform(&Interaction::set_value(locator, text))
            .await
            .map(|_| ())
    }

    /// Clear and type with native keystrokes, then read the value back
    pub async fn type_keys(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        self.perform(&Interaction::type_keys(locator, text))
            .await
            .map(|_| ())
    }

    /// Clear and type, then expect the field to display `displayed`
    pub async fn type_keys_expecting(
        &self,
        locator: &Locator,
        text: &str,
        displayed: &str,
    ) -> ProbeResult<()> {
        self.perform(&Interaction::type_keys_expecting(locator, text, displayed))
            .await
            .map(|_| ())
    }

    /// Choose a `<select>` option by visible text
    pub async fn select_by_text(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        self.perform(&Interaction::select_by_text(locator, text))
            .await
            .map(|_| ())
    }

    /// Rendered text; `NotFound` when the element never appears
    pub async fn read_text(&self, locator: &Locator) -> ProbeResult<String> {
        self.perform(&Interaction::read_text(locator))
            .await
            .map(Outcome::into_text)
    }

    /// Property or attribute value
    pub async fn read_attribute(
        &self,
        locator: &Locator,
        name: &str,
    ) -> ProbeResult<Option<String>> {
        self.perform(&Interaction::read_attribute(locator, name))
            .await
            .map(Outcome::into_attribute)
    }

    /// Enabled state
    pub async fn is_enabled(&self, locator: &Locator) -> ProbeResult<bool> {
        self.perform(&Interaction::is_enabled(locator))
            .await
            .map(|o| o.flag())
    }

    async fn document_ready(&self) -> ProbeResult<()> {
        Waiter::new(self.session)
            .until(&Condition::document_ready(), &self.options(self.timeouts.flow()))
            .await
            .map(|_| ())
    }

    /// Present and computed `display`, `visibility` and `opacity` all say
    /// shown. Absent elements are simply not visible.
    pub async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool> {
        self.document_ready().await?;
        let shown = self
            .session
            .execute_script(scripts::IS_VISIBLE, &[Value::from(locator.to_css())])
            .await?;
        Ok(is_truthy(&shown))
    }

    /// Whether anything matches right now
    pub async fn is_present(&self, locator: &Locator) -> ProbeResult<bool> {
        Ok(self.count(locator).await? > 0)
    }

    /// Number of matches right now, 0 when absent
    pub async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        self.document_ready().await?;
        Ok(self.session.find_elements(locator).await?.len())
    }

    /// Wait for `condition` within the interaction budget
    pub async fn wait_for(&self, condition: &Condition) -> ProbeResult<WaitOutcome<S::Handle>> {
        self.wait_for_within(condition, self.timeouts.interaction())
            .await
    }

    /// Wait for `condition` within `budget`
    pub async fn wait_for_within(
        &self,
        condition: &Condition,
        budget: Duration,
    ) -> ProbeResult<WaitOutcome<S::Handle>> {
        Waiter::new(self.session)
            .until(condition, &self.options(budget))
            .await
    }

    /// Wait for the URL to contain `fragment`
    pub async fn wait_until_url_contains(
        &self,
        fragment: &str,
        budget: Duration,
    ) -> ProbeResult<()> {
        self.wait_for_within(&Condition::url_contains(fragment), budget)
            .await
            .map(|_| ())
    }

    /// Poll an arbitrary predicate within `budget`
    pub async fn wait_until<F, Fut>(
        &self,
        description: &str,
        budget: Duration,
        predicate: F,
    ) -> ProbeResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProbeResult<bool>>,
    {
        Waiter::new(self.session)
            .until_fn(description, &self.options(budget), predicate)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{DomEvent, EventKind, Fault, MockApp, MockSession, PageContext};

    /// A page whose button is disabled until a timer fires, an input that
    /// upper-cases what it receives and one that keeps two characters.
    #[derive(Debug, Default)]
    struct Form {
        clicks: u32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum FormTimer {
        Enable,
    }

    impl MockApp for Form {
        type Timer = FormTimer;

        fn load(&mut self, ctx: &mut PageContext<'_, FormTimer>) {
            let root = ctx.dom.root();
            let button = ctx.dom.el_text(root, "button", &[("id", "go"), ("type", "button")], "Go");
            ctx.dom.set_disabled(button, true);
            ctx.dom.el(root, "input", &[("id", "plain")]);
            ctx.dom.el(root, "input", &[("id", "shout")]);
            ctx.dom.el(root, "input", &[("id", "short")]);
            let faded = ctx.dom.el_text(root, "p", &[("id", "faded")], "ghost");
            ctx.dom.set_opacity(faded, "0");
            let drawer = ctx.dom.el(root, "div", &[("id", "drawer")]);
            ctx.dom.set_display(drawer, "none");
            ctx.dom.el_text(drawer, "button", &[("id", "tucked"), ("type", "button")], "Hidden");
            let select = ctx.dom.el(root, "select", &[("id", "pick")]);
            ctx.dom.el_text(select, "option", &[("value", "")], "Choose");
            ctx.dom.el_text(select, "option", &[("value", "b")], "Blue");
            ctx.schedule(Duration::from_millis(100), FormTimer::Enable);
        }

        fn on_event(&mut self, ctx: &mut PageContext<'_, FormTimer>, event: DomEvent) {
            let id = ctx.dom.attr(event.target, "id").map(str::to_string);
            match (event.kind, id.as_deref()) {
                (EventKind::Click, Some("go")) => self.clicks += 1,
                (EventKind::Input, Some("shout")) => {
                    let upper = ctx.dom.value(event.target).unwrap_or_default().to_uppercase();
                    ctx.dom.set_value(event.target, &upper);
                }
                (EventKind::Input, Some("short")) => {
                    let kept: String =
                        ctx.dom.value(event.target).unwrap_or_default().chars().take(2).collect();
                    ctx.dom.set_value(event.target, &kept);
                }
                _ => {}
            }
        }

        fn on_timer(&mut self, ctx: &mut PageContext<'_, FormTimer>, _timer: FormTimer) {
            if let Some(button) = ctx.dom.by_id("go") {
                ctx.dom.set_disabled(button, false);
            }
        }
    }

    async fn session() -> MockSession<Form> {
        let s = MockSession::new(Form::default());
        s.navigate("http://form.test/index.html").await.unwrap();
        s
    }

    fn quick() -> Timeouts {
        Timeouts::default().compressed(300)
    }

    mod policy_tests {
        use super::*;

        #[test]
        fn test_default_policy() {
            let policy = RetryPolicy::default();
            assert_eq!(policy.max_attempts(), 3);
            assert!(policy.is_retryable(FailureKind::TransientStale));
            assert!(policy.is_retryable(FailureKind::TransientNotInteractable));
            assert!(!policy.is_retryable(FailureKind::NotFound));
            assert!(!policy.is_retryable(FailureKind::Timeout));
        }

        #[test]
        fn test_zero_attempts_means_one() {
            assert_eq!(RetryPolicy::new(0).max_attempts(), 1);
        }

        #[test]
        fn test_interaction_builders() {
            let loc = Locator::id("search");
            let set = Interaction::set_value(&loc, "Neon");
            assert_eq!(set.precondition, Precondition::Clickable);
            assert_eq!(
                set.postcondition,
                Postcondition::AttributeEquals {
                    name: "value".to_string(),
                    value: "Neon".to_string()
                }
            );
            assert_eq!(Interaction::read_text(&loc).precondition, Precondition::Present);
            assert_eq!(
                Interaction::type_keys(&loc, "x").postcondition,
                Postcondition::AttributeEquals {
                    name: "value".to_string(),
                    value: "x".to_string()
                }
            );
            assert_eq!(Interaction::click(&loc).postcondition, Postcondition::None);
        }
    }

    mod engine_tests {
        use super::*;

        #[tokio::test]
        async fn test_click_waits_for_enabled() {
            let s = session().await;
            let engine = InteractionEngine::new(&s).with_timeouts(quick());
            engine.click(&Locator::id("go")).await.unwrap();
            assert_eq!(s.with_app(|app| app.clicks).unwrap(), 1);
        }

        #[tokio::test]
        async fn test_transient_click_failures_are_retried() {
            let s = session().await;
            tokio::time::sleep(Duration::from_millis(120)).await;
            s.fail_next_clicks(Fault::Stale, 2).unwrap();
            let engine = InteractionEngine::new(&s).with_timeouts(quick());
            engine.click(&Locator::id("go")).await.unwrap();
            assert_eq!(s.with_app(|app| app.clicks).unwrap(), 1);
        }

        #[tokio::test]
        async fn test_retries_exhausted_keeps_kind() {
            let s = session().await;
            tokio::time::sleep(Duration::from_millis(120)).await;
            s.fail_next_clicks(Fault::NotInteractable, 3).unwrap();
            let engine = InteractionEngine::new(&s).with_timeouts(quick());
            let err = engine.click(&Locator::id("go")).await.unwrap_err();
            match &err {
                ProbeError::RetriesExhausted { attempts, phase, .. } => {
                    assert_eq!(*attempts, 3);
                    assert_eq!(phase, "acting");
                }
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(err.kind(), FailureKind::TransientNotInteractable);
            assert_eq!(s.with_app(|app| app.clicks).unwrap(), 0);
        }

        #[tokio::test]
        async fn test_missing_element_is_not_retried() {
            let s = session().await;
            let engine =
                InteractionEngine::new(&s).with_timeouts(Timeouts::default().compressed(50));
            let err = engine.click(&Locator::id("absent")).await.unwrap_err();
            assert_eq!(err.kind(), FailureKind::NotFound);
            let finds = s
                .call_history()
                .unwrap()
                .iter()
                .filter(|c| c.starts_with("find_element:id=absent"))
                .count();
            assert!(finds >= 1);
            assert!(matches!(err, ProbeError::NotFound { .. }));
        }

        #[tokio::test]
        async fn test_never_clickable_times_out() {
            let s = session().await;
            let engine =
                InteractionEngine::new(&s).with_timeouts(Timeouts::default().compressed(10));
            let err = engine.click(&Locator::id("go")).await.unwrap_err();
            match err {
                ProbeError::Timeout { condition, .. } => assert_eq!(condition, "id=go clickable"),
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_set_value_reads_back() {
            let s = session().await;
            let engine = InteractionEngine::new(&s).with_timeouts(quick());
            engine.set_value(&Locator::id("plain"), "Neon").await.unwrap();
            engine.set_value(&Locator::id("plain"), "Iron").await.unwrap();
            assert_eq!(
                engine.read_attribute(&Locator::id("plain"), "value").await.unwrap().as_deref(),
                Some("Iron")
            );
        }

        #[tokio::test]
        async fn test_set_value_postcondition_sees_rewrites() {
            let s = session().await;
            let engine =
                InteractionEngine::new(&s).with_timeouts(Timeouts::default().compressed(30));
            let err = engine.set_value(&Locator::id("shout"), "abc").await.unwrap_err();
            assert_eq!(err.kind(), FailureKind::Timeout);
            engine.set_value(&Locator::id("shout"), "ABC").await.unwrap();
        }

        #[tokio::test]
        async fn test_type_keys_goes_through_listeners() {
            let s = session().await;
            let engine = InteractionEngine::new(&s).with_timeouts(quick());
            engine
                .type_keys_expecting(&Locator::id("shout"), "abc", "ABC")
                .await
                .unwrap();
            assert_eq!(
                engine
                    .read_attribute(&Locator::id("shout"), "value")
                    .await
                    .unwrap()
                    .as_deref(),
                Some("ABC")
            );
        }

        #[tokio::test]
        async fn test_type_keys_reads_back_plain_text() {
            let s = session().await;
            let engine = InteractionEngine::new(&s).with_timeouts(quick());
            engine.type_keys(&Locator::id("plain"), "Baker Street").await.unwrap();
            let err = engine
                .type_keys(&Locator::id("shout"), "abc")
                .await
                .unwrap_err();
            assert_eq!(err.kind(), FailureKind::Timeout);
        }

        #[tokio::test]
        async fn test_dropped_keystrokes_fail_the_entry() {
            let s = session().await;
            let engine =
                InteractionEngine::new(&s).with_timeouts(Timeouts::default().compressed(50));
            let err = engine
                .type_keys(&Locator::id("short"), "4111111111111111")
                .await
                .unwrap_err();
            match err {
                ProbeError::Timeout { condition, .. } => {
                    assert_eq!(condition, "id=short value == \"4111111111111111\"");
                }
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(
                engine
                    .read_attribute(&Locator::id("short"), "value")
                    .await
                    .unwrap()
                    .as_deref(),
                Some("41")
            );
        }

        #[tokio::test]
        async fn test_visibility_uses_computed_style() {
            let s = session().await;
            let engine = InteractionEngine::new(&s).with_timeouts(quick());
            assert!(engine.is_present(&Locator::id("faded")).await.unwrap());
            assert!(!engine.is_visible(&Locator::id("faded")).await.unwrap());
            assert!(engine.is_visible(&Locator::id("plain")).await.unwrap());
            assert!(!engine.is_visible(&Locator::id("absent")).await.unwrap());
        }

        #[tokio::test]
        async fn test_hidden_container_hides_descendants() {
            let s = session().await;
            let engine =
                InteractionEngine::new(&s).with_timeouts(Timeouts::default().compressed(30));
            let tucked = Locator::id("tucked");
            let handle = s.find_element(&tucked).await.unwrap();
            assert!(!engine.is_visible(&tucked).await.unwrap());
            assert!(!s.is_displayed(&handle).await.unwrap());
            assert_eq!(
                s.execute_on(&handle, scripts::ELEMENT_DISPLAYED, &[]).await.unwrap(),
                Value::Bool(false)
            );

            let err = engine.click(&tucked).await.unwrap_err();
            match err {
                ProbeError::Timeout { condition, .. } => {
                    assert_eq!(condition, "id=tucked clickable");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_counts_do_not_wait_for_absent_elements() {
            let s = session().await;
            let engine = InteractionEngine::new(&s);
            let start = Instant::now();
            assert_eq!(engine.count(&Locator::css(".nothing")).await.unwrap(), 0);
            assert!(!engine.is_present(&Locator::id("absent")).await.unwrap());
            assert!(start.elapsed() < Duration::from_secs(1));
        }

        #[tokio::test]
        async fn test_select_by_text() {
            let s = session().await;
            let engine = InteractionEngine::new(&s).with_timeouts(quick());
            engine.select_by_text(&Locator::id("pick"), "Blue").await.unwrap();
            assert_eq!(
                engine.read_attribute(&Locator::id("pick"), "value").await.unwrap().as_deref(),
                Some("b")
            );
            let err = engine
                .select_by_text(&Locator::id("pick"), "Green")
                .await
                .unwrap_err();
            assert_eq!(err.kind(), FailureKind::NotFound);
        }

        #[tokio::test]
        async fn test_read_text_of_missing_element_fails() {
            let s = session().await;
            let engine =
                InteractionEngine::new(&s).with_timeouts(Timeouts::default().compressed(20));
            let err = engine.read_text(&Locator::id("absent")).await.unwrap_err();
            assert!(matches!(err, ProbeError::NotFound { .. }));
        }

        #[tokio::test]
        async fn test_wait_until_url_contains() {
            let s = session().await;
            let engine = InteractionEngine::new(&s).with_timeouts(quick());
            engine
                .wait_until_url_contains("/index.html", Duration::from_millis(50))
                .await
                .unwrap();
            let err = engine
                .wait_until_url_contains("/orders.html", Duration::from_millis(20))
                .await
                .unwrap_err();
            assert!(err.to_string().contains("url contains \"/orders.html\""));
        }
    }
}
