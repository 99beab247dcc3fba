//! BrowserSession - the capability surface the core drives.
//!
//! ```text
//! Scenario ─► Page Object ─► InteractionEngine ─► BrowserSession ─► browser
//!                 StateSeeder ─────────────────────────┘
//! ```
//!
//! # Implementations
//!
//! - `ChromiumSession` - real Chromium over CDP (feature `browser`)
//! - `MockSession` - in-process DOM driven by a simulated application
//!
//! Handles returned by a session are ephemeral. Callers resolve them, use them
//! for one attempt, and drop them. Any operation on a handle whose node was
//! replaced by a re-render fails with [`ProbeError::Stale`].
//!
//! There is no implicit wait. `find_element` answers immediately; waiting
//! belongs to [`crate::wait`].
//!
//! [`ProbeError::Stale`]: crate::result::ProbeError::Stale

use async_trait::async_trait;
use serde_json::Value;

use crate::locator::Locator;
use crate::result::ProbeResult;

/// Browser session capability
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Live, possibly-stale reference to one element
    type Handle: Send + Sync;

    /// Navigate to an absolute URL and wait for the load event
    async fn navigate(&self, url: &str) -> ProbeResult<()>;

    /// Reload the current document
    async fn refresh(&self) -> ProbeResult<()>;

    /// Resolve the first match, failing with `NotFound` when nothing matches
    async fn find_element(&self, locator: &Locator) -> ProbeResult<Self::Handle>;

    /// Resolve all matches in document order
    async fn find_elements(&self, locator: &Locator) -> ProbeResult<Vec<Self::Handle>>;

    /// Rendered text of the element
    async fn text(&self, handle: &Self::Handle) -> ProbeResult<String>;

    /// Live property of that name if it exists, otherwise the attribute
    async fn attribute(&self, handle: &Self::Handle, name: &str) -> ProbeResult<Option<String>>;

    /// Whether the element is rendered
    async fn is_displayed(&self, handle: &Self::Handle) -> ProbeResult<bool>;

    /// Whether the element accepts input
    async fn is_enabled(&self, handle: &Self::Handle) -> ProbeResult<bool>;

    /// Native click
    async fn click(&self, handle: &Self::Handle) -> ProbeResult<()>;

    /// Empty an input field
    async fn clear(&self, handle: &Self::Handle) -> ProbeResult<()>;

    /// Native keystroke emulation
    async fn send_keys(&self, handle: &Self::Handle, text: &str) -> ProbeResult<()>;

    /// Run a script body in page scope with `arguments[i]` bound to `args[i]`
    async fn execute_script(&self, script: &str, args: &[Value]) -> ProbeResult<Value>;

    /// Run a script body with `arguments[0]` bound to the element and the
    /// remaining `args` following it
    async fn execute_on(
        &self,
        handle: &Self::Handle,
        script: &str,
        args: &[Value],
    ) -> ProbeResult<Value>;

    /// Current document URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Current document title
    async fn title(&self) -> ProbeResult<String>;

    /// Release browser resources
    async fn close(&self) -> ProbeResult<()> {
        Ok(())
    }
}
