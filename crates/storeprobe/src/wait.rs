//! Wait Mechanisms
//!
//! Explicit, per-call polling. A [`Condition`] names what must become true;
//! [`WaitOptions`] bounds how long and how often to look. Nothing here keeps
//! state between calls and every poll resolves its locator from scratch.
//!
//! Transient failures raised while a condition is evaluated (the element was
//! replaced halfway through a check) mean "not yet", so polling continues.
//! On timeout an element-bearing condition whose locator never matched
//! reports [`ProbeError::NotFound`]; everything else reports
//! [`ProbeError::Timeout`] naming the condition.

use serde_json::Value;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::session::BrowserSession;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for interaction waits (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// CONDITIONS
// =============================================================================

/// A predicate over browser session state
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// At least one element matches
    Present(Locator),
    /// First match is displayed
    Visible(Locator),
    /// First match is displayed and enabled
    Clickable(Locator),
    /// First match has `name` equal to `value`
    AttributeEquals {
        /// Target element
        locator: Locator,
        /// Property or attribute name
        name: String,
        /// Expected value
        value: String,
    },
    /// Current URL contains the fragment
    UrlContains(String),
    /// Script result is truthy
    ScriptTruthy {
        /// Script body from [`crate::scripts`]
        script: &'static str,
        /// Script arguments
        args: Vec<Value>,
        /// What the script checks, for error messages
        description: String,
    },
    /// At least `count` elements match
    CountAtLeast {
        /// Target elements
        locator: Locator,
        /// Minimum number of matches
        count: usize,
    },
}

impl Condition {
    /// Attribute equality condition
    #[must_use]
    pub fn attribute_equals(
        locator: Locator,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::AttributeEquals {
            locator,
            name: name.into(),
            value: value.into(),
        }
    }

    /// URL fragment condition
    #[must_use]
    pub fn url_contains(fragment: impl Into<String>) -> Self {
        Self::UrlContains(fragment.into())
    }

    /// Document finished loading
    #[must_use]
    pub fn document_ready() -> Self {
        Self::ScriptTruthy {
            script: crate::scripts::DOCUMENT_READY,
            args: Vec::new(),
            description: "document ready".to_string(),
        }
    }

    /// Human-readable description used in failures
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Present(l) => format!("{l} present"),
            Self::Visible(l) => format!("{l} visible"),
            Self::Clickable(l) => format!("{l} clickable"),
            Self::AttributeEquals {
                locator,
                name,
                value,
            } => format!("{locator} {name} == {value:?}"),
            Self::UrlContains(fragment) => format!("url contains {fragment:?}"),
            Self::ScriptTruthy { description, .. } => description.clone(),
            Self::CountAtLeast { locator, count } => format!("at least {count} of {locator}"),
        }
    }

    /// Locator the condition is about, if any
    #[must_use]
    pub const fn locator(&self) -> Option<&Locator> {
        match self {
            Self::Present(l) | Self::Visible(l) | Self::Clickable(l) => Some(l),
            Self::AttributeEquals { locator, .. } | Self::CountAtLeast { locator, .. } => {
                Some(locator)
            }
            Self::UrlContains(_) | Self::ScriptTruthy { .. } => None,
        }
    }
}

// =============================================================================
// WAIT OUTCOME
// =============================================================================

/// Result of a satisfied wait
#[derive(Debug)]
pub struct WaitOutcome<H> {
    /// Handle of the element that satisfied the condition, when there is one
    pub handle: Option<H>,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of polls made
    pub polls: u32,
}

/// JavaScript truthiness of a script result
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

enum Probe<H> {
    Met(Option<H>),
    Absent,
    Pending,
}

impl<H> Probe<H> {
    fn met_if(met: bool) -> Self {
        if met {
            Self::Met(None)
        } else {
            Self::Pending
        }
    }
}

// =============================================================================
// WAITER IMPLEMENTATION
// =============================================================================

/// Polls conditions against one session
#[derive(Debug)]
pub struct Waiter<'s, S> {
    session: &'s S,
}

impl<'s, S: BrowserSession> Waiter<'s, S> {
    /// Create a waiter bound to `session`
    #[must_use]
    pub const fn new(session: &'s S) -> Self {
        Self { session }
    }

    /// Poll until `condition` holds or the budget runs out
    pub async fn until(
        &self,
        condition: &Condition,
        options: &WaitOptions,
    ) -> ProbeResult<WaitOutcome<S::Handle>> {
        let start = Instant::now();
        let deadline = start + options.timeout();
        let mut polls = 0u32;
        let mut ever_found = false;

        loop {
            polls += 1;
            match self.probe(condition).await? {
                Probe::Met(handle) => {
                    let elapsed = start.elapsed();
                    debug!(
                        condition = %condition.description(),
                        polls,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "condition met"
                    );
                    return Ok(WaitOutcome {
                        handle,
                        elapsed,
                        polls,
                    });
                }
                Probe::Absent => {}
                Probe::Pending => ever_found = true,
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            tokio::time::sleep(options.poll_interval().min(deadline - now)).await;
        }

        let waited_ms = start.elapsed().as_millis() as u64;
        match condition.locator() {
            Some(locator) if !ever_found => Err(ProbeError::NotFound {
                locator: locator.to_string(),
                waited_ms,
            }),
            _ => Err(ProbeError::Timeout {
                condition: condition.description(),
                ms: options.timeout_ms,
            }),
        }
    }

    /// Poll an arbitrary async predicate.
    ///
    /// Transient errors from the predicate count as "not yet"; any other
    /// error ends the wait immediately.
    pub async fn until_fn<F, Fut>(
        &self,
        description: &str,
        options: &WaitOptions,
        mut predicate: F,
    ) -> ProbeResult<WaitOutcome<()>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProbeResult<bool>>,
    {
        let start = Instant::now();
        let deadline = start + options.timeout();
        let mut polls = 0u32;

        loop {
            polls += 1;
            match predicate().await {
                Ok(true) => {
                    debug!(condition = description, polls, "condition met");
                    return Ok(WaitOutcome {
                        handle: None,
                        elapsed: start.elapsed(),
                        polls,
                    });
                }
                Ok(false) => {}
                Err(e) if e.is_transient() => trace!(error = %e, "transient during wait"),
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(ProbeError::Timeout {
                    condition: description.to_string(),
                    ms: options.timeout_ms,
                });
            }
            tokio::time::sleep(options.poll_interval().min(deadline - now)).await;
        }
    }

    async fn probe(&self, condition: &Condition) -> ProbeResult<Probe<S::Handle>> {
        let result = match condition {
            Condition::UrlContains(fragment) => self
                .session
                .current_url()
                .await
                .map(|url| Probe::met_if(url.contains(fragment.as_str()))),
            Condition::ScriptTruthy { script, args, .. } => self
                .session
                .execute_script(script, args)
                .await
                .map(|value| Probe::met_if(is_truthy(&value))),
            Condition::CountAtLeast { locator, count } => {
                self.session
                    .find_elements(locator)
                    .await
                    .map(|found| match found.len() {
                        n if n >= *count => Probe::Met(None),
                        0 => Probe::Absent,
                        _ => Probe::Pending,
                    })
            }
            Condition::Present(locator) => {
                self.probe_element(locator, ElementCheck::Exists).await
            }
            Condition::Visible(locator) => {
                self.probe_element(locator, ElementCheck::Displayed).await
            }
            Condition::Clickable(locator) => {
                self.probe_element(locator, ElementCheck::Clickable).await
            }
            Condition::AttributeEquals {
                locator,
                name,
                value,
            } => {
                self.probe_element(locator, ElementCheck::Attribute { name, value })
                    .await
            }
        };

        match result {
            Err(e) if e.is_transient() => {
                trace!(error = %e, "transient during wait");
                Ok(Probe::Pending)
            }
            other => other,
        }
    }

    async fn probe_element(
        &self,
        locator: &Locator,
        check: ElementCheck<'_>,
    ) -> ProbeResult<Probe<S::Handle>> {
        let handle = match self.session.find_element(locator).await {
            Ok(handle) => handle,
            Err(ProbeError::NotFound { .. }) => return Ok(Probe::Absent),
            Err(e) => return Err(e),
        };
        let met = match check {
            ElementCheck::Exists => true,
            ElementCheck::Displayed => self.session.is_displayed(&handle).await?,
            ElementCheck::Clickable => {
                self.session.is_displayed(&handle).await?
                    && self.session.is_enabled(&handle).await?
            }
            ElementCheck::Attribute { name, value } => {
                self.session.attribute(&handle, name).await?.as_deref() == Some(value)
            }
        };
        Ok(if met {
            Probe::Met(Some(handle))
        } else {
            Probe::Pending
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum ElementCheck<'a> {
    Exists,
    Displayed,
    Clickable,
    Attribute { name: &'a str, value: &'a str },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{DomEvent, MockApp, MockSession, PageContext};
    use serde_json::json;
    use std::cell::Cell;

    /// Two list items, a hidden banner, and a note that appears after a delay
    #[derive(Debug, Default)]
    struct Slow;

    impl MockApp for Slow {
        type Timer = ();

        fn load(&mut self, ctx: &mut PageContext<'_, ()>) {
            let root = ctx.dom.root();
            ctx.dom.el_text(root, "li", &[("class", "row")], "a");
            ctx.dom.el_text(root, "li", &[("class", "row")], "b");
            let banner = ctx.dom.el(root, "div", &[("id", "banner")]);
            ctx.dom.set_display(banner, "none");
            ctx.schedule(Duration::from_millis(60), ());
        }

        fn on_event(&mut self, _ctx: &mut PageContext<'_, ()>, _event: DomEvent) {}

        fn on_timer(&mut self, ctx: &mut PageContext<'_, ()>, (): ()) {
            let root = ctx.dom.root();
            ctx.dom.el_text(root, "p", &[("id", "note"), ("data-state", "ready")], "hi");
        }
    }

    async fn session() -> MockSession<Slow> {
        let s = MockSession::new(Slow);
        s.navigate("http://slow.test/index.html").await.unwrap();
        s
    }

    fn short() -> WaitOptions {
        WaitOptions::new().with_timeout(300).with_poll_interval(10)
    }

    mod condition_tests {
        use super::*;

        #[test]
        fn test_descriptions() {
            assert_eq!(
                Condition::Visible(Locator::id("pay-msg")).description(),
                "id=pay-msg visible"
            );
            assert_eq!(
                Condition::url_contains("/payment.html").description(),
                "url contains \"/payment.html\""
            );
            assert_eq!(Condition::document_ready().description(), "document ready");
            let count = Condition::CountAtLeast {
                locator: Locator::css(".order"),
                count: 2,
            };
            assert_eq!(count.description(), "at least 2 of css=.order");
        }

        #[test]
        fn test_only_url_and_script_have_no_locator() {
            assert!(Condition::url_contains("x").locator().is_none());
            assert!(Condition::document_ready().locator().is_none());
            let loc = Locator::id("note");
            assert_eq!(Condition::Present(loc.clone()).locator(), Some(&loc));
        }

        #[test]
        fn test_truthiness() {
            assert!(!is_truthy(&Value::Null));
            assert!(!is_truthy(&json!(false)));
            assert!(!is_truthy(&json!(0)));
            assert!(!is_truthy(&json!("")));
            assert!(is_truthy(&json!("x")));
            assert!(is_truthy(&json!(1.5)));
            assert!(is_truthy(&json!([])));
        }

        #[test]
        fn test_default_options() {
            let options = WaitOptions::default();
            assert_eq!(options.timeout(), Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS));
            assert_eq!(options.poll_interval(), Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
        }
    }

    mod waiter_tests {
        use super::*;

        #[tokio::test]
        async fn test_present_waits_for_late_element() {
            let s = session().await;
            let outcome = Waiter::new(&s)
                .until(&Condition::Present(Locator::id("note")), &short())
                .await
                .unwrap();
            assert!(outcome.handle.is_some());
            assert!(outcome.polls > 1);
        }

        #[tokio::test]
        async fn test_attribute_after_render() {
            let s = session().await;
            let cond = Condition::attribute_equals(Locator::id("note"), "data-state", "ready");
            assert!(Waiter::new(&s).until(&cond, &short()).await.is_ok());
        }

        #[tokio::test]
        async fn test_never_matching_locator_is_not_found() {
            let s = session().await;
            let err = Waiter::new(&s)
                .until(&Condition::Present(Locator::id("nowhere")), &short())
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::NotFound { .. }), "{err}");
        }

        #[tokio::test]
        async fn test_hidden_element_times_out_naming_condition() {
            let s = session().await;
            let err = Waiter::new(&s)
                .until(&Condition::Visible(Locator::id("banner")), &short())
                .await
                .unwrap_err();
            match err {
                ProbeError::Timeout { condition, ms } => {
                    assert_eq!(condition, "id=banner visible");
                    assert_eq!(ms, 300);
                }
                other => panic!("unexpected {other}"),
            }
        }

        #[tokio::test]
        async fn test_count_at_least() {
            let s = session().await;
            let waiter = Waiter::new(&s);
            let two = Condition::CountAtLeast {
                locator: Locator::css(".row"),
                count: 2,
            };
            assert_eq!(waiter.until(&two, &short()).await.unwrap().polls, 1);
            let five = Condition::CountAtLeast {
                locator: Locator::css(".row"),
                count: 5,
            };
            let err = waiter.until(&five, &short()).await.unwrap_err();
            assert!(matches!(err, ProbeError::Timeout { .. }), "{err}");
        }

        #[tokio::test]
        async fn test_document_ready_first_poll() {
            let s = session().await;
            let outcome = Waiter::new(&s)
                .until(&Condition::document_ready(), &short())
                .await
                .unwrap();
            assert_eq!(outcome.polls, 1);
        }

        #[tokio::test]
        async fn test_until_fn_absorbs_transient_errors() {
            let s = session().await;
            let calls = Cell::new(0u32);
            let outcome = Waiter::new(&s)
                .until_fn("third call", &short(), || {
                    calls.set(calls.get() + 1);
                    let n = calls.get();
                    async move {
                        if n < 3 {
                            Err(ProbeError::Stale {
                                locator: "css=.row".into(),
                            })
                        } else {
                            Ok(true)
                        }
                    }
                })
                .await
                .unwrap();
            assert_eq!(outcome.polls, 3);
        }

        #[tokio::test]
        async fn test_until_fn_stops_on_fatal_error() {
            let s = session().await;
            let calls = Cell::new(0u32);
            let err = Waiter::new(&s)
                .until_fn("never", &short(), || {
                    calls.set(calls.get() + 1);
                    async { Err::<bool, _>(ProbeError::script("boom")) }
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), crate::result::FailureKind::Script);
            assert_eq!(calls.get(), 1);
        }

        #[tokio::test]
        async fn test_until_fn_times_out() {
            let s = session().await;
            let err = Waiter::new(&s)
                .until_fn("rendered orders", &short(), || async { Ok::<_, ProbeError>(false) })
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Timed out after 300ms waiting for rendered orders");
        }
    }
}
