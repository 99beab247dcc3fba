//! Offline browser session.
//!
//! [`MockSession`] implements [`BrowserSession`] over a [`MockDom`] and an
//! in-memory local storage. What the document contains and how it reacts to
//! events comes from a [`MockApp`]; [`Storefront`] is the one shipped with the
//! crate.
//!
//! Timers scheduled by the app run lazily: every session call first fires the
//! timers whose deadline has passed, in deadline order. A test that polls
//! therefore observes asynchronous re-renders and redirects the same way it
//! would against a real page.
//!
//! Faults can be injected with [`MockSession::fail_next_clicks`] to exercise
//! retry paths.

pub mod catalog;
pub mod checkout;
pub mod dom;
pub mod storefront;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::scripts;
use crate::session::BrowserSession;

pub use dom::{ComputedStyle, MockDom, NodeId, SelectorError};
pub use catalog::Game;
pub use storefront::{StoreTimer, Storefront, StorefrontTiming};

/// Redirect chains longer than this are treated as a loop
const MAX_REDIRECTS: usize = 8;

/// Timers fired per pump before giving up on a runaway app
const MAX_TIMERS_PER_PUMP: usize = 1_000;

/// DOM events delivered to the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// `input`
    Input,
    /// `change`
    Change,
    /// `click`
    Click,
    /// `submit` on a form
    Submit,
}

/// One delivered event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomEvent {
    /// Event type
    pub kind: EventKind,
    /// Target element
    pub target: NodeId,
}

/// In-memory `localStorage`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockStorage {
    items: BTreeMap<String, String>,
}

impl MockStorage {
    /// Raw value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    /// Store a raw value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.items.insert(key.into(), value.into());
    }

    /// Delete a key
    pub fn remove(&mut self, key: &str) {
        self.items.remove(key);
    }

    /// Parse a JSON value, `None` when absent or malformed
    #[must_use]
    pub fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|raw| serde_json::from_str(raw).ok())
    }

    /// Serialise and store a JSON value
    pub fn set_json<T: serde::Serialize>(&mut self, key: &str, value: &T) {
        if let Ok(raw) = serde_json::to_string(value) {
            self.set(key, raw);
        }
    }

    /// All keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct Scheduled<T> {
    due: Instant,
    seq: u64,
    timer: T,
}

/// What an app sees while handling a load, an event or a timer
pub struct PageContext<'a, T> {
    /// The live document
    pub dom: &'a mut MockDom,
    /// Origin storage, shared across navigations
    pub storage: &'a mut MockStorage,
    url: &'a str,
    title: &'a mut String,
    timers: &'a mut Vec<Scheduled<T>>,
    seq: &'a mut u64,
    navigation: &'a mut Option<String>,
    now: Instant,
}

impl<T> fmt::Debug for PageContext<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContext")
            .field("url", &self.url)
            .field("timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}

impl<T: PartialEq> PageContext<'_, T> {
    /// Current URL
    #[must_use]
    pub fn url(&self) -> &str {
        self.url
    }

    /// Path component, `/index.html` for a bare origin
    #[must_use]
    pub fn path(&self) -> &str {
        let after_scheme = self.url.split_once("://").map_or(self.url, |(_, rest)| rest);
        let path = after_scheme.find('/').map_or("/", |i| &after_scheme[i..]);
        let path = path.split(['?', '#']).next().unwrap_or("/");
        if path.is_empty() || path == "/" {
            "/index.html"
        } else {
            path
        }
    }

    /// First query parameter with that name
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.url.split_once('?')?.1;
        let query = query.split('#').next().unwrap_or("");
        query.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (k == name).then(|| v.to_string())
        })
    }

    /// Set `document.title`
    pub fn set_title(&mut self, title: impl Into<String>) {
        *self.title = title.into();
    }

    /// `setTimeout`, relative to the moment the current callback started
    pub fn schedule(&mut self, delay: Duration, timer: T) {
        *self.seq += 1;
        self.timers.push(Scheduled {
            due: self.now + delay,
            seq: *self.seq,
            timer,
        });
    }

    /// `clearTimeout` for every pending timer equal to `timer`
    pub fn cancel(&mut self, timer: &T) {
        self.timers.retain(|s| s.timer != *timer);
    }

    /// `location.href = target`, resolved against the current URL
    pub fn navigate(&mut self, target: &str) {
        *self.navigation = Some(resolve_url(self.url, target));
    }
}

/// Simulated application behind a [`MockSession`]
pub trait MockApp: Send + 'static {
    /// Timer payload
    type Timer: Clone + PartialEq + fmt::Debug + Send;

    /// Build the document for `page.url()`
    fn load(&mut self, page: &mut PageContext<'_, Self::Timer>);

    /// React to a DOM event
    fn on_event(&mut self, page: &mut PageContext<'_, Self::Timer>, event: DomEvent);

    /// A scheduled timer fired
    fn on_timer(&mut self, page: &mut PageContext<'_, Self::Timer>, timer: Self::Timer);
}

/// Resolve `target` the way a browser resolves a link from `base`
#[must_use]
pub fn resolve_url(base: &str, target: &str) -> String {
    if target.contains("://") {
        return target.to_string();
    }
    let (scheme, rest) = base.split_once("://").unwrap_or(("http", base));
    let host_end = rest.find('/').unwrap_or(rest.len());
    let origin = format!("{scheme}://{}", &rest[..host_end]);
    if let Some(absolute) = target.strip_prefix('/') {
        return format!("{origin}/{absolute}");
    }
    let path = rest[host_end..].split(['?', '#']).next().unwrap_or("");
    let dir = path.rfind('/').map_or("", |i| &path[..i]);
    let relative = target.strip_prefix("./").unwrap_or(target);
    format!("{origin}{dir}/{relative}")
}

/// Element handle of a [`MockSession`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockHandle {
    document: u64,
    node: NodeId,
    locator: String,
}

impl MockHandle {
    /// Node inside the document it was resolved from
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }
}

/// Injected failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Report the handle as stale
    Stale,
    /// Report the element as covered
    NotInteractable,
}

struct State<A: MockApp> {
    app: A,
    dom: MockDom,
    document: u64,
    url: String,
    title: String,
    storage: MockStorage,
    timers: Vec<Scheduled<A::Timer>>,
    seq: u64,
    click_faults: VecDeque<Fault>,
    history: Vec<String>,
}

impl<A: MockApp> State<A> {
    /// Run an app callback as if it started at `now`
    fn with_context<R>(
        &mut self,
        now: Instant,
        f: impl FnOnce(&mut A, &mut PageContext<'_, A::Timer>) -> R,
    ) -> (R, Option<String>) {
        let mut navigation = None;
        let url = self.url.clone();
        let mut ctx = PageContext {
            dom: &mut self.dom,
            storage: &mut self.storage,
            url: &url,
            title: &mut self.title,
            timers: &mut self.timers,
            seq: &mut self.seq,
            navigation: &mut navigation,
            now,
        };
        let out = f(&mut self.app, &mut ctx);
        (out, navigation)
    }

    fn load(&mut self, url: &str) -> ProbeResult<()> {
        self.load_at(url, Instant::now())
    }

    fn load_at(&mut self, url: &str, now: Instant) -> ProbeResult<()> {
        let mut target = url.to_string();
        for _ in 0..MAX_REDIRECTS {
            self.document += 1;
            self.dom = MockDom::new();
            self.title.clear();
            self.timers.clear();
            self.url.clone_from(&target);
            let ((), navigation) = self.with_context(now, |app, ctx| app.load(ctx));
            match navigation {
                Some(next) => target = next,
                None => return Ok(()),
            }
        }
        Err(ProbeError::Navigation {
            url: url.to_string(),
            message: "redirect loop".to_string(),
        })
    }

    fn follow(&mut self, navigation: Option<String>, now: Instant) -> ProbeResult<()> {
        match navigation {
            Some(next) => self.load_at(&next, now),
            None => Ok(()),
        }
    }

    fn pump(&mut self) -> ProbeResult<()> {
        for _ in 0..MAX_TIMERS_PER_PUMP {
            let now = Instant::now();
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, s)| s.due <= now)
                .min_by_key(|(_, s)| (s.due, s.seq))
                .map(|(i, _)| i);
            let Some(index) = next else {
                return Ok(());
            };
            // Callbacks scheduled from a timer are due relative to when it
            // should have fired, not to when the session noticed.
            let scheduled = self.timers.remove(index);
            let due = scheduled.due;
            let ((), navigation) =
                self.with_context(due, |app, ctx| app.on_timer(ctx, scheduled.timer));
            self.follow(navigation, due)?;
        }
        Err(ProbeError::session("mock app keeps scheduling due timers"))
    }

    fn dispatch(&mut self, kind: EventKind, target: NodeId) -> ProbeResult<bool> {
        let document = self.document;
        let now = Instant::now();
        let ((), navigation) =
            self.with_context(now, |app, ctx| app.on_event(ctx, DomEvent { kind, target }));
        let navigated = navigation.is_some();
        self.follow(navigation, now)?;
        Ok(navigated || self.document != document)
    }

    fn resolve(&self, handle: &MockHandle) -> ProbeResult<NodeId> {
        if handle.document == self.document && self.dom.is_attached(handle.node) {
            Ok(handle.node)
        } else {
            Err(ProbeError::Stale {
                locator: handle.locator.clone(),
            })
        }
    }

    fn query(&self, locator: &Locator) -> ProbeResult<Vec<NodeId>> {
        let css = locator.to_css();
        self.dom
            .query_all(&css)
            .map_err(|_| ProbeError::InvalidSelector { fragment: css })
    }

    fn handle(&self, node: NodeId, locator: &Locator) -> MockHandle {
        MockHandle {
            document: self.document,
            node,
            locator: locator.to_string(),
        }
    }

    fn require_interactable(&self, node: NodeId, handle: &MockHandle) -> ProbeResult<()> {
        if !self.dom.is_displayed(node) {
            return Err(ProbeError::NotInteractable {
                locator: handle.locator.clone(),
                reason: "element not visible".to_string(),
            });
        }
        if self.dom.is_disabled(node) {
            return Err(ProbeError::NotInteractable {
                locator: handle.locator.clone(),
                reason: "element disabled".to_string(),
            });
        }
        Ok(())
    }

    fn click(&mut self, node: NodeId) -> ProbeResult<()> {
        if self.dom.is_disabled(node) {
            return Ok(());
        }
        if self.dispatch(EventKind::Click, node)? {
            return Ok(());
        }
        if !self.dom.is_attached(node) {
            return Ok(());
        }
        let closest = |dom: &MockDom, selector: &str| dom.closest(node, selector).ok().flatten();
        if let Some(link) = closest(&self.dom, "a[href]") {
            if let Some(href) = self.dom.attr(link, "href").map(str::to_string) {
                let target = resolve_url(&self.url, &href);
                return self.load(&target);
            }
        }
        let is_submit = self.dom.tag(node) == "button"
            && self
                .dom
                .attr(node, "type")
                .map_or(true, |t| t.eq_ignore_ascii_case("submit"));
        if is_submit {
            if let Some(form) = closest(&self.dom, "form") {
                self.dispatch(EventKind::Submit, form)?;
            }
        }
        Ok(())
    }

    fn execute(&mut self, script: &str, args: &[Value]) -> ProbeResult<Value> {
        let arg = |i: usize| -> ProbeResult<&str> {
            args.get(i)
                .and_then(Value::as_str)
                .ok_or_else(|| ProbeError::script(format!("argument {i} must be a string")))
        };
        match script {
            s if s == scripts::DOCUMENT_READY => Ok(Value::Bool(true)),
            s if s == scripts::IS_VISIBLE => {
                let selector = arg(0)?;
                let node = self
                    .dom
                    .query(selector)
                    .map_err(|_| ProbeError::InvalidSelector {
                        fragment: selector.to_string(),
                    })?;
                Ok(Value::Bool(node.is_some_and(|n| self.dom.is_displayed(n))))
            }
            s if s == scripts::STORAGE_SET => {
                self.storage.set(arg(0)?, arg(1)?);
                Ok(Value::Null)
            }
            s if s == scripts::STORAGE_GET => Ok(self
                .storage
                .get(arg(0)?)
                .map_or(Value::Null, |raw| Value::String(raw.to_string()))),
            s if s == scripts::STORAGE_REMOVE => {
                self.storage.remove(arg(0)?);
                Ok(Value::Null)
            }
            _ => Err(ProbeError::script(format!(
                "mock session cannot run page script: {}",
                script.chars().take(48).collect::<String>()
            ))),
        }
    }

    fn execute_on(&mut self, node: NodeId, script: &str, args: &[Value]) -> ProbeResult<Value> {
        if script == scripts::ELEMENT_DISPLAYED {
            return Ok(Value::Bool(self.dom.is_displayed(node)));
        }
        let text = args
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| ProbeError::script("argument 1 must be a string"))?
            .to_string();
        match script {
            s if s == scripts::SET_VALUE => {
                self.dom.set_value(node, &text);
                self.dispatch(EventKind::Input, node)?;
                if self.dom.is_attached(node) {
                    self.dispatch(EventKind::Change, node)?;
                }
                Ok(Value::Null)
            }
            s if s == scripts::SELECT_BY_TEXT => {
                if self.dom.tag(node) != "select" {
                    return Err(ProbeError::script("element is not a <select>"));
                }
                let option = self
                    .dom
                    .children(node)
                    .iter()
                    .copied()
                    .find(|o| {
                        self.dom.tag(*o) == "option" && self.dom.text_content(*o).trim() == text
                    });
                let Some(option) = option else {
                    return Ok(Value::Bool(false));
                };
                let value = self
                    .dom
                    .attr(option, "value")
                    .map_or_else(|| self.dom.text_content(option), str::to_string);
                self.dom.set_value(node, &value);
                self.dispatch(EventKind::Input, node)?;
                if self.dom.is_attached(node) {
                    self.dispatch(EventKind::Change, node)?;
                }
                Ok(Value::Bool(true))
            }
            _ => Err(ProbeError::script(format!(
                "mock session cannot run element script: {}",
                script.chars().take(48).collect::<String>()
            ))),
        }
    }
}

/// In-process session driven by a [`MockApp`]
pub struct MockSession<A: MockApp> {
    state: Mutex<State<A>>,
}

impl<A: MockApp> fmt::Debug for MockSession<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSession").finish_non_exhaustive()
    }
}

impl<A: MockApp> MockSession<A> {
    /// New session on `about:blank`
    #[must_use]
    pub fn new(app: A) -> Self {
        Self {
            state: Mutex::new(State {
                app,
                dom: MockDom::new(),
                document: 0,
                url: "about:blank".to_string(),
                title: String::new(),
                storage: MockStorage::default(),
                timers: Vec::new(),
                seq: 0,
                click_faults: VecDeque::new(),
                history: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> ProbeResult<MutexGuard<'_, State<A>>> {
        self.state
            .lock()
            .map_err(|_| ProbeError::session("mock session state poisoned"))
    }

    fn enter(&self, call: String) -> ProbeResult<MutexGuard<'_, State<A>>> {
        let mut state = self.lock()?;
        state.history.push(call);
        state.pump()?;
        Ok(state)
    }

    /// Make the next `count` clicks fail with `fault`
    pub fn fail_next_clicks(&self, fault: Fault, count: usize) -> ProbeResult<()> {
        let mut state = self.lock()?;
        state.click_faults.extend(std::iter::repeat(fault).take(count));
        Ok(())
    }

    /// Every call made so far, as `method:argument`
    pub fn call_history(&self) -> ProbeResult<Vec<String>> {
        Ok(self.lock()?.history.clone())
    }

    /// Whether a call starting with `method` was made
    pub fn was_called(&self, method: &str) -> ProbeResult<bool> {
        Ok(self.lock()?.history.iter().any(|c| c.starts_with(method)))
    }

    /// Inspect the live document after firing due timers
    pub fn with_dom<R>(&self, f: impl FnOnce(&MockDom) -> R) -> ProbeResult<R> {
        let mut state = self.lock()?;
        state.pump()?;
        Ok(f(&state.dom))
    }

    /// Mutate the live document directly (test setup)
    pub fn with_dom_mut<R>(&self, f: impl FnOnce(&mut MockDom) -> R) -> ProbeResult<R> {
        let mut state = self.lock()?;
        Ok(f(&mut state.dom))
    }

    /// Snapshot of local storage
    pub fn storage(&self) -> ProbeResult<MockStorage> {
        let mut state = self.lock()?;
        state.pump()?;
        Ok(state.storage.clone())
    }

    /// Access the app
    pub fn with_app<R>(&self, f: impl FnOnce(&mut A) -> R) -> ProbeResult<R> {
        let mut state = self.lock()?;
        Ok(f(&mut state.app))
    }
}

#[async_trait]
impl<A: MockApp> BrowserSession for MockSession<A> {
    type Handle = MockHandle;

    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        let mut state = self.enter(format!("navigate:{url}"))?;
        state.load(url)
    }

    async fn refresh(&self) -> ProbeResult<()> {
        let mut state = self.enter("refresh".to_string())?;
        let url = state.url.clone();
        state.load(&url)
    }

    async fn find_element(&self, locator: &Locator) -> ProbeResult<MockHandle> {
        let state = self.enter(format!("find_element:{locator}"))?;
        let nodes = state.query(locator)?;
        nodes
            .first()
            .map(|n| state.handle(*n, locator))
            .ok_or_else(|| ProbeError::NotFound {
                locator: locator.to_string(),
                waited_ms: 0,
            })
    }

    async fn find_elements(&self, locator: &Locator) -> ProbeResult<Vec<MockHandle>> {
        let state = self.enter(format!("find_elements:{locator}"))?;
        let nodes = state.query(locator)?;
        Ok(nodes.iter().map(|n| state.handle(*n, locator)).collect())
    }

    async fn text(&self, handle: &MockHandle) -> ProbeResult<String> {
        let state = self.enter(format!("text:{}", handle.locator))?;
        let node = state.resolve(handle)?;
        Ok(state.dom.rendered_text(node))
    }

    async fn attribute(&self, handle: &MockHandle, name: &str) -> ProbeResult<Option<String>> {
        let state = self.enter(format!("attribute:{}:{name}", handle.locator))?;
        let node = state.resolve(handle)?;
        let dom = &state.dom;
        Ok(match name {
            "value" => dom
                .value(node)
                .or_else(|| dom.attr(node, "value"))
                .map(str::to_string),
            "disabled" => dom.is_disabled(node).then(|| "true".to_string()),
            "type" if dom.tag(node) == "input" => {
                Some(dom.attr(node, "type").unwrap_or("text").to_string())
            }
            _ => dom.attr(node, name).map(str::to_string),
        })
    }

    async fn is_displayed(&self, handle: &MockHandle) -> ProbeResult<bool> {
        let state = self.enter(format!("is_displayed:{}", handle.locator))?;
        let node = state.resolve(handle)?;
        Ok(state.dom.is_displayed(node))
    }

    async fn is_enabled(&self, handle: &MockHandle) -> ProbeResult<bool> {
        let state = self.enter(format!("is_enabled:{}", handle.locator))?;
        let node = state.resolve(handle)?;
        Ok(!state.dom.is_disabled(node))
    }

    async fn click(&self, handle: &MockHandle) -> ProbeResult<()> {
        let mut state = self.enter(format!("click:{}", handle.locator))?;
        if let Some(fault) = state.click_faults.pop_front() {
            return Err(match fault {
                Fault::Stale => ProbeError::Stale {
                    locator: handle.locator.clone(),
                },
                Fault::NotInteractable => ProbeError::NotInteractable {
                    locator: handle.locator.clone(),
                    reason: "another element would receive the click".to_string(),
                },
            });
        }
        let node = state.resolve(handle)?;
        if !state.dom.is_displayed(node) {
            return Err(ProbeError::NotInteractable {
                locator: handle.locator.clone(),
                reason: "element not visible".to_string(),
            });
        }
        state.click(node)
    }

    async fn clear(&self, handle: &MockHandle) -> ProbeResult<()> {
        let mut state = self.enter(format!("clear:{}", handle.locator))?;
        let node = state.resolve(handle)?;
        state.require_interactable(node, handle)?;
        state.dom.set_value(node, "");
        state.dispatch(EventKind::Input, node)?;
        if state.dom.is_attached(node) {
            state.dispatch(EventKind::Change, node)?;
        }
        Ok(())
    }

    async fn send_keys(&self, handle: &MockHandle, text: &str) -> ProbeResult<()> {
        let mut state = self.enter(format!("send_keys:{}:{text}", handle.locator))?;
        let node = state.resolve(handle)?;
        state.require_interactable(node, handle)?;
        for c in text.chars() {
            let node = state.resolve(handle)?;
            let mut value = state.dom.value(node).unwrap_or_default().to_string();
            value.push(c);
            state.dom.set_value(node, &value);
            state.dispatch(EventKind::Input, node)?;
        }
        Ok(())
    }

    async fn execute_script(&self, script: &str, args: &[Value]) -> ProbeResult<Value> {
        let mut state = self.enter(format!("execute_script:{}", args.len()))?;
        state.execute(script, args)
    }

    async fn execute_on(
        &self,
        handle: &MockHandle,
        script: &str,
        args: &[Value],
    ) -> ProbeResult<Value> {
        let mut state = self.enter(format!("execute_on:{}", handle.locator))?;
        let node = state.resolve(handle)?;
        state.execute_on(node, script, args)
    }

    async fn current_url(&self) -> ProbeResult<String> {
        let state = self.enter("current_url".to_string())?;
        Ok(state.url.clone())
    }

    async fn title(&self) -> ProbeResult<String> {
        let state = self.enter("title".to_string())?;
        Ok(state.title.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    /// Tiny app: a counter button re-rendered on every click, and a slow
    /// banner that appears after a timer.
    #[derive(Debug, Default)]
    struct CounterApp {
        clicks: u32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum CounterTimer {
        Banner,
    }

    impl CounterApp {
        fn render(&self, ctx: &mut PageContext<'_, CounterTimer>) {
            let host = ctx.dom.by_id("host").unwrap();
            ctx.dom.clear_children(host);
            let clicks = self.clicks.to_string();
            ctx.dom
                .el_text(host, "button", &[("id", "inc"), ("type", "button")], &clicks);
        }
    }

    impl MockApp for CounterApp {
        type Timer = CounterTimer;

        fn load(&mut self, ctx: &mut PageContext<'_, CounterTimer>) {
            if ctx.path() == "/old.html" {
                ctx.navigate("./new.html");
                return;
            }
            ctx.set_title("Counter");
            let root = ctx.dom.root();
            ctx.dom.el(root, "div", &[("id", "host")]);
            ctx.dom.el(root, "input", &[("id", "name")]);
            self.render(ctx);
            ctx.schedule(Duration::from_millis(30), CounterTimer::Banner);
        }

        fn on_event(&mut self, ctx: &mut PageContext<'_, CounterTimer>, event: DomEvent) {
            if event.kind == EventKind::Click && ctx.dom.attr(event.target, "id") == Some("inc") {
                self.clicks += 1;
                self.render(ctx);
            }
            if event.kind == EventKind::Input && ctx.dom.attr(event.target, "id") == Some("name") {
                let upper = ctx.dom.value(event.target).unwrap_or_default().to_uppercase();
                ctx.dom.set_value(event.target, &upper);
            }
        }

        fn on_timer(&mut self, ctx: &mut PageContext<'_, CounterTimer>, _timer: CounterTimer) {
            let root = ctx.dom.root();
            ctx.dom.el_text(root, "p", &[("id", "banner")], "ready");
        }
    }

    fn session() -> MockSession<CounterApp> {
        MockSession::new(CounterApp::default())
    }

    mod url_tests {
        use super::*;

        #[test]
        fn test_resolve_relative() {
            assert_eq!(
                resolve_url("http://h:1/cart.html", "./payment.html"),
                "http://h:1/payment.html"
            );
            assert_eq!(
                resolve_url("http://h:1/shop/cart.html?x=1", "./orders.html?success=1"),
                "http://h:1/shop/orders.html?success=1"
            );
            assert_eq!(resolve_url("http://h:1/a/b.html", "/c.html"), "http://h:1/c.html");
            assert_eq!(resolve_url("http://h:1/a.html", "https://x/y"), "https://x/y");
        }
    }

    mod session_tests {
        use super::*;

        #[tokio::test]
        async fn test_rerender_makes_handle_stale() {
            let s = session();
            s.navigate("http://shop.test/index.html").await.unwrap();
            let button = s.find_element(&Locator::id("inc")).await.unwrap();
            s.click(&button).await.unwrap();
            let err = s.click(&button).await.unwrap_err();
            assert!(matches!(err, ProbeError::Stale { .. }));

            let fresh = s.find_element(&Locator::id("inc")).await.unwrap();
            assert_eq!(s.text(&fresh).await.unwrap(), "1");
        }

        #[tokio::test]
        async fn test_navigation_invalidates_handles() {
            let s = session();
            s.navigate("http://shop.test/index.html").await.unwrap();
            let input = s.find_element(&Locator::id("name")).await.unwrap();
            s.refresh().await.unwrap();
            assert!(matches!(
                s.attribute(&input, "value").await.unwrap_err(),
                ProbeError::Stale { .. }
            ));
        }

        #[tokio::test]
        async fn test_not_found() {
            let s = session();
            s.navigate("http://shop.test/index.html").await.unwrap();
            let err = s.find_element(&Locator::id("missing")).await.unwrap_err();
            assert!(matches!(err, ProbeError::NotFound { .. }));
            assert!(s.find_elements(&Locator::id("missing")).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_timer_fires_lazily() {
            let s = session();
            s.navigate("http://shop.test/index.html").await.unwrap();
            assert!(s.find_elements(&Locator::id("banner")).await.unwrap().is_empty());
            tokio::time::sleep(Duration::from_millis(40)).await;
            assert_eq!(s.find_elements(&Locator::id("banner")).await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_send_keys_fires_input_per_key() {
            let s = session();
            s.navigate("http://shop.test/index.html").await.unwrap();
            let input = s.find_element(&Locator::id("name")).await.unwrap();
            s.send_keys(&input, "ab").await.unwrap();
            assert_eq!(s.attribute(&input, "value").await.unwrap().as_deref(), Some("AB"));
        }

        #[tokio::test]
        async fn test_set_value_script() {
            let s = session();
            s.navigate("http://shop.test/index.html").await.unwrap();
            let input = s.find_element(&Locator::id("name")).await.unwrap();
            s.execute_on(&input, scripts::SET_VALUE, &[Value::from("neon")])
                .await
                .unwrap();
            assert_eq!(s.attribute(&input, "value").await.unwrap().as_deref(), Some("NEON"));
        }

        #[tokio::test]
        async fn test_redirect_on_load() {
            let s = session();
            s.navigate("http://shop.test/old.html").await.unwrap();
            assert_eq!(s.current_url().await.unwrap(), "http://shop.test/new.html");
            assert_eq!(s.title().await.unwrap(), "Counter");
        }

        #[tokio::test]
        async fn test_storage_scripts() {
            let s = session();
            s.navigate("http://shop.test/index.html").await.unwrap();
            s.execute_script(scripts::STORAGE_SET, &[Value::from("k"), Value::from("[1]")])
                .await
                .unwrap();
            let got = s
                .execute_script(scripts::STORAGE_GET, &[Value::from("k")])
                .await
                .unwrap();
            assert_eq!(got, Value::from("[1]"));
            s.execute_script(scripts::STORAGE_REMOVE, &[Value::from("k")])
                .await
                .unwrap();
            let got = s
                .execute_script(scripts::STORAGE_GET, &[Value::from("k")])
                .await
                .unwrap();
            assert_eq!(got, Value::Null);
        }

        #[tokio::test]
        async fn test_unknown_script_rejected() {
            let s = session();
            let err = s.execute_script("return 1;", &[]).await.unwrap_err();
            assert!(matches!(err, ProbeError::Script { .. }));
        }

        #[tokio::test]
        async fn test_injected_click_faults() {
            let s = session();
            s.navigate("http://shop.test/index.html").await.unwrap();
            s.fail_next_clicks(Fault::NotInteractable, 1).unwrap();
            let button = s.find_element(&Locator::id("inc")).await.unwrap();
            assert!(matches!(
                s.click(&button).await.unwrap_err(),
                ProbeError::NotInteractable { .. }
            ));
            s.click(&button).await.unwrap();
            assert!(s.was_called("click:id=inc").unwrap());
        }
    }
}
