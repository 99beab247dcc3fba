//! Chromium session over the DevTools protocol.
//!
//! [`ChromiumSession`] launches one Chromium per session and drives a single
//! page through `chromiumoxide`. Element operations that the protocol does not
//! offer directly (visibility, enabled state, clearing, property reads) are
//! small functions called on the element's remote object.
//!
//! Protocol failures are mapped onto the failure taxonomy: a node that is gone
//! is [`ProbeError::Stale`], an element without a usable box is
//! [`ProbeError::NotInteractable`], everything unrecognised is
//! [`ProbeError::Session`].

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::js_protocol::runtime::{
    CallFunctionOnParams, EvaluateParams, ExceptionDetails, RemoteObject,
};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{BrowserOptions, ProbeConfig};
use crate::harness::SessionFactory;
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::scripts::ELEMENT_DISPLAYED;
use crate::session::BrowserSession;

const ELEMENT_ENABLED: &str = "return !arguments[0].disabled;";

const ELEMENT_CLEAR: &str = "arguments[0].value = '';\
arguments[0].dispatchEvent(new Event('input', { bubbles: true }));\
arguments[0].dispatchEvent(new Event('change', { bubbles: true }));\
return null;";

/// `arguments[1]`: name. Live property when the element has one, else the attribute.
const ELEMENT_PROPERTY: &str = "const el = arguments[0];\
const v = (arguments[1] in el) ? el[arguments[1]] : el.getAttribute(arguments[1]);\
return (v === null || v === undefined) ? null : String(v);";

/// Element resolved by a [`ChromiumSession`]
#[derive(Debug)]
pub struct ChromiumHandle {
    element: Element,
    locator: String,
}

/// Real Chromium session
#[derive(Debug)]
pub struct ChromiumSession {
    browser: Mutex<CdpBrowser>,
    page: CdpPage,
    handler: JoinHandle<()>,
}

impl ChromiumSession {
    /// Launch Chromium with `options` and open a blank page
    pub async fn launch(options: &BrowserOptions) -> ProbeResult<Self> {
        let mut builder =
            CdpConfig::builder().window_size(options.window_width, options.window_height);
        if !options.headless {
            builder = builder.with_head();
        }
        if !options.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = options.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|message| ProbeError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(config)
                .await
                .map_err(|e| ProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ProbeError::BrowserLaunch {
                message: e.to_string(),
            })?;
        debug!(headless = options.headless, "chromium launched");
        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
        })
    }

    async fn call_on(
        &self,
        handle: &ChromiumHandle,
        script: &str,
        args: &[Value],
    ) -> ProbeResult<Value> {
        let params = CallFunctionOnParams::builder()
            .function_declaration(element_function(script, args)?)
            .object_id(handle.element.remote_object_id.clone())
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(ProbeError::script)?;
        let response = self
            .page
            .execute(params)
            .await
            .map_err(|e| classify(&handle.locator, &e))?;
        returned(&response.result.result, response.result.exception_details.as_ref())
    }

    async fn call_bool(&self, handle: &ChromiumHandle, script: &str) -> ProbeResult<bool> {
        match self.call_on(handle, script, &[]).await? {
            Value::Bool(b) => Ok(b),
            other => Err(ProbeError::script(format!("expected a boolean, got {other}"))),
        }
    }
}

/// Value of a by-value evaluation, or the thrown exception as a script error
fn returned(result: &RemoteObject, exception: Option<&ExceptionDetails>) -> ProbeResult<Value> {
    if let Some(details) = exception {
        let message = details
            .exception
            .as_ref()
            .and_then(|e| e.description.clone())
            .unwrap_or_else(|| details.text.clone());
        return Err(ProbeError::script(message));
    }
    Ok(result.value.clone().unwrap_or(Value::Null))
}

/// Map a protocol failure for `locator` onto the taxonomy
fn classify(locator: &str, err: &CdpError) -> ProbeError {
    let message = err.to_string();
    let lower = message.to_lowercase();
    let gone = [
        "no node",
        "could not find node",
        "object with given id",
        "detached",
        "stale",
    ];
    let blocked = ["box model", "not visible", "not clickable", "could not compute"];
    if gone.iter().any(|needle| lower.contains(needle)) {
        ProbeError::Stale {
            locator: locator.to_string(),
        }
    } else if blocked.iter().any(|needle| lower.contains(needle)) {
        ProbeError::NotInteractable {
            locator: locator.to_string(),
            reason: message,
        }
    } else {
        ProbeError::session(format!("{locator}: {message}"))
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    type Handle = ChromiumHandle;

    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ProbeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn refresh(&self) -> ProbeResult<()> {
        self.page
            .reload()
            .await
            .map_err(|e| ProbeError::session(e.to_string()))?;
        Ok(())
    }

    async fn find_element(&self, locator: &Locator) -> ProbeResult<Self::Handle> {
        self.find_elements(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::NotFound {
                locator: locator.to_string(),
                waited_ms: 0,
            })
    }

    async fn find_elements(&self, locator: &Locator) -> ProbeResult<Vec<Self::Handle>> {
        let description = locator.to_string();
        match self.page.find_elements(locator.to_css()).await {
            Ok(elements) => Ok(elements
                .into_iter()
                .map(|element| ChromiumHandle {
                    element,
                    locator: description.clone(),
                })
                .collect()),
            // querySelectorAll answers with an error rather than an empty list
            // while the document is being replaced
            Err(e) if matches!(classify(&description, &e), ProbeError::Stale { .. }) => {
                Ok(Vec::new())
            }
            Err(e) => Err(classify(&description, &e)),
        }
    }

    async fn text(&self, handle: &Self::Handle) -> ProbeResult<String> {
        let text = handle
            .element
            .inner_text()
            .await
            .map_err(|e| classify(&handle.locator, &e))?;
        Ok(text.unwrap_or_default())
    }

    async fn attribute(&self, handle: &Self::Handle, name: &str) -> ProbeResult<Option<String>> {
        match self
            .call_on(handle, ELEMENT_PROPERTY, &[Value::String(name.to_string())])
            .await?
        {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Ok(Some(other.to_string())),
        }
    }

    async fn is_displayed(&self, handle: &Self::Handle) -> ProbeResult<bool> {
        self.call_bool(handle, ELEMENT_DISPLAYED).await
    }

    async fn is_enabled(&self, handle: &Self::Handle) -> ProbeResult<bool> {
        self.call_bool(handle, ELEMENT_ENABLED).await
    }

    async fn click(&self, handle: &Self::Handle) -> ProbeResult<()> {
        handle
            .element
            .click()
            .await
            .map_err(|e| classify(&handle.locator, &e))?;
        Ok(())
    }

    async fn clear(&self, handle: &Self::Handle) -> ProbeResult<()> {
        self.call_on(handle, ELEMENT_CLEAR, &[]).await?;
        Ok(())
    }

    async fn send_keys(&self, handle: &Self::Handle, text: &str) -> ProbeResult<()> {
        handle
            .element
            .focus()
            .await
            .map_err(|e| classify(&handle.locator, &e))?;
        handle
            .element
            .type_str(text)
            .await
            .map_err(|e| classify(&handle.locator, &e))?;
        Ok(())
    }

    async fn execute_script(&self, script: &str, args: &[Value]) -> ProbeResult<Value> {
        let expression = format!(
            "(function() {{ {script} }}).apply(null, {})",
            serde_json::to_string(args)?
        );
        let params = EvaluateParams::builder()
            .expression(expression)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(ProbeError::script)?;
        let response = self
            .page
            .execute(params)
            .await
            .map_err(|e| ProbeError::script(e.to_string()))?;
        returned(&response.result.result, response.result.exception_details.as_ref())
    }

    async fn execute_on(
        &self,
        handle: &Self::Handle,
        script: &str,
        args: &[Value],
    ) -> ProbeResult<Value> {
        self.call_on(handle, script, args).await
    }

    async fn current_url(&self) -> ProbeResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| ProbeError::session(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn title(&self) -> ProbeResult<String> {
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| ProbeError::session(e.to_string()))?;
        Ok(title.unwrap_or_default())
    }

    async fn close(&self) -> ProbeResult<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await;
        self.handler.abort();
        closed.map_err(|e| ProbeError::session(e.to_string()))?;
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "chromium did not exit cleanly");
        }
        Ok(())
    }
}

/// Function declaration run with the element as `this`; `arguments[0]` is the
/// element and the caller's arguments follow unchanged
fn element_function(script: &str, args: &[Value]) -> ProbeResult<String> {
    Ok(format!(
        "function() {{ return (function() {{ {script} }}).apply(null, [this, ...{}]); }}",
        serde_json::to_string(args)?
    ))
}

/// Launches a new Chromium for every scenario
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumFactory;

#[async_trait]
impl SessionFactory for ChromiumFactory {
    type Session = ChromiumSession;

    async fn open(&self, config: &ProbeConfig) -> ProbeResult<Self::Session> {
        ChromiumSession::launch(&config.browser).await
    }
}
