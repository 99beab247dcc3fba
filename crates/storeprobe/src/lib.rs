//! Storeprobe: Resilient Page-Object Harness for Storefront Verification
//!
//! End-to-end checks for a client-side game storefront. The core is a
//! resilient interaction engine: every action sent to the browser first
//! resolves its element, waits for an explicit condition, acts, optionally
//! verifies the effect, and absorbs the transient failures caused by the page
//! re-rendering underneath it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      STOREPROBE Architecture                     │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌─────────────┐   ┌──────────────┐   ┌─────────┐ │
//! │  │ Scenario │──►│ Page Object │──►│ Interaction  │──►│ Browser │ │
//! │  │ catalog  │   │ (per screen)│   │ Engine       │   │ Session │ │
//! │  └──────────┘   └─────────────┘   └──────────────┘   └─────────┘ │
//! │        │                                                  ▲      │
//! │        └────────────► State Seeder (localStorage) ────────┘      │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two sessions implement [`BrowserSession`]: `ChromiumSession` (feature
//! `browser`) and [`mock::MockSession`], which runs the simulated
//! [`mock::Storefront`] in process so the whole catalog can run offline.

#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

#[cfg(feature = "browser")]
#[allow(clippy::doc_markdown)]
mod browser;
mod config;
mod harness;
mod interaction;
mod locator;
mod page_object;
mod result;
mod seeder;
mod session;
mod storage;

/// One page object per storefront screen
pub mod pages;

/// The end-to-end scenario catalog
pub mod scenario;

/// Injected script vocabulary
pub mod scripts;

/// Explicit waits
pub mod wait;

/// Offline session and simulated storefront
pub mod mock;

#[cfg(feature = "browser")]
pub use browser::{ChromiumFactory, ChromiumHandle, ChromiumSession};
pub use config::{
    join_url, BrowserOptions, ProbeConfig, RetrySettings, Timeouts, DEFAULT_BASE_URL,
    DEFAULT_STORAGE_PREFIX,
};
pub use harness::{RunSummary, ScenarioReport, ScenarioRunner, SessionFactory, StorefrontFactory};
pub use interaction::{
    Action, AttemptPhase, Interaction, InteractionEngine, Outcome, Postcondition, Precondition,
    RetryPolicy, DEFAULT_MAX_ATTEMPTS,
};
pub use locator::{css_escape_ident, Locator, SafeId, Strategy, ID_PLACEHOLDER, MAX_SAFE_ID_LEN};
pub use page_object::{PageBase, PageObject, Route};
pub use result::{FailureKind, ProbeError, ProbeResult};
pub use scenario::{ScenarioContext, ScenarioId, Suite};
pub use seeder::StateSeeder;
pub use session::BrowserSession;
pub use storage::{
    CartLine, Collection, LastSuccess, Order, OrderLine, PaymentSummary, SessionIdentity,
    StorageKeys,
};
pub use wait::{Condition, WaitOptions, WaitOutcome, Waiter};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::pages::*;
    pub use super::scenario::expect::*;
    pub use super::*;
}
