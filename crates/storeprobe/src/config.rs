//! Harness configuration.
//!
//! Sources, lowest to highest precedence: [`ProbeConfig::default`], a YAML
//! file, the environment, then whatever the caller sets with the `with_*`
//! builders (the CLI maps its flags onto those).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::result::{ProbeError, ProbeResult};

/// Default storefront address
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5501";

/// Default prefix of every application storage key
pub const DEFAULT_STORAGE_PREFIX: &str = "gs_";

/// Wait budgets, all in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Waits tied to interactivity (presence, clickability, postconditions)
    pub interaction_ms: u64,
    /// Flow-level waits such as "URL now contains X"
    pub flow_ms: u64,
    /// Waits for the post-payment redirect
    pub redirect_ms: u64,
    /// Waits for a single element to exist before a text read
    pub presence_ms: u64,
    /// Interval between polls
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            interaction_ms: 10_000,
            flow_ms: 5_000,
            redirect_ms: 8_000,
            presence_ms: 10_000,
            poll_interval_ms: 50,
        }
    }
}

impl Timeouts {
    /// Interaction budget as Duration
    #[must_use]
    pub const fn interaction(&self) -> Duration {
        Duration::from_millis(self.interaction_ms)
    }

    /// Flow budget as Duration
    #[must_use]
    pub const fn flow(&self) -> Duration {
        Duration::from_millis(self.flow_ms)
    }

    /// Redirect budget as Duration
    #[must_use]
    pub const fn redirect(&self) -> Duration {
        Duration::from_millis(self.redirect_ms)
    }

    /// Presence budget as Duration
    #[must_use]
    pub const fn presence(&self) -> Duration {
        Duration::from_millis(self.presence_ms)
    }

    /// Poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Scale every budget down, for offline runs against the simulation
    #[must_use]
    pub const fn compressed(self, interaction_ms: u64) -> Self {
        Self {
            interaction_ms,
            flow_ms: interaction_ms,
            redirect_ms: interaction_ms,
            presence_ms: interaction_ms,
            poll_interval_ms: if self.poll_interval_ms > 10 {
                10
            } else {
                self.poll_interval_ms
            },
        }
    }
}

/// Retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts per interaction, at least 1
    pub max_attempts: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// Browser process options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserOptions {
    /// Run without a window
    pub headless: bool,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: 1920,
            window_height: 1080,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserOptions {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }
}

/// Complete harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Storefront base address
    pub base_url: String,
    /// Prefix of every application storage key
    pub storage_prefix: String,
    /// Wait budgets
    pub timeouts: Timeouts,
    /// Retry settings
    pub retry: RetrySettings,
    /// Browser options
    pub browser: BrowserOptions,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            timeouts: Timeouts::default(),
            retry: RetrySettings::default(),
            browser: BrowserOptions::default(),
        }
    }
}

impl ProbeConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document; missing fields keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        Ok(config)
    }

    /// Read a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Serialise to YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Defaults overlaid with the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Overlay environment values read through `lookup`.
    ///
    /// `STOREPROBE_BASE_URL` wins over `BASE_URL`. `CI=true` forces a
    /// headless, unsandboxed browser.
    #[must_use]
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("STOREPROBE_BASE_URL").or_else(|| lookup("BASE_URL")) {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }
        if let Some(prefix) = lookup("STOREPROBE_STORAGE_PREFIX") {
            self.storage_prefix = prefix;
        }
        if lookup("CI").is_some_and(|v| v.eq_ignore_ascii_case("true")) {
            self.browser.headless = true;
            self.browser.sandbox = false;
        }
        if let Some(path) = lookup("CHROMIUM_PATH") {
            self.browser.chromium_path = Some(path);
        }
        self
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set storage key prefix
    #[must_use]
    pub fn with_storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.storage_prefix = prefix.into();
        self
    }

    /// Set wait budgets
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set attempts per interaction
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry.max_attempts = max_attempts;
        self
    }

    /// Set browser options
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserOptions) -> Self {
        self.browser = browser;
        self
    }

    /// Reject configurations the harness cannot run with
    pub fn validate(&self) -> ProbeResult<()> {
        if self.retry.max_attempts == 0 {
            return Err(ProbeError::config("retry.max_attempts must be at least 1"));
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(ProbeError::config("timeouts.poll_interval_ms must be positive"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProbeError::config(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        Ok(())
    }

    /// Join the base URL and a path with exactly one `/`
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

/// `base` and `path` joined with exactly one `/`
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod default_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = ProbeConfig::default();
            assert_eq!(config.base_url, "http://127.0.0.1:5501");
            assert_eq!(config.storage_prefix, "gs_");
            assert_eq!(config.timeouts.interaction_ms, 10_000);
            assert_eq!(config.timeouts.flow_ms, 5_000);
            assert_eq!(config.timeouts.redirect_ms, 8_000);
            assert_eq!(config.retry.max_attempts, 3);
            assert_eq!(config.browser.window_width, 1920);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_url_for_single_slash() {
            let config = ProbeConfig::default().with_base_url("http://localhost:8080/");
            assert_eq!(config.url_for("/cart.html"), "http://localhost:8080/cart.html");
            assert_eq!(config.url_for("cart.html"), "http://localhost:8080/cart.html");
        }

        #[test]
        fn test_compressed_timeouts() {
            let t = Timeouts::default().compressed(500);
            assert_eq!(t.flow_ms, 500);
            assert_eq!(t.poll_interval_ms, 10);
        }
    }

    mod env_tests {
        use super::*;

        #[test]
        fn test_ci_forces_headless() {
            let config = ProbeConfig::default().with_env(env(&[("CI", "TRUE")]));
            assert!(config.browser.headless);
            assert!(!config.browser.sandbox);
        }

        #[test]
        fn test_ci_false_keeps_window() {
            let config = ProbeConfig::default().with_env(env(&[("CI", "false")]));
            assert!(!config.browser.headless);
        }

        #[test]
        fn test_base_url_precedence() {
            let config = ProbeConfig::default().with_env(env(&[
                ("BASE_URL", "http://a:1"),
                ("STOREPROBE_BASE_URL", "http://b:2"),
            ]));
            assert_eq!(config.base_url, "http://b:2");

            let config = ProbeConfig::default().with_env(env(&[("BASE_URL", "http://a:1")]));
            assert_eq!(config.base_url, "http://a:1");
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = ProbeConfig::from_yaml_str(
                "base_url: http://shop.test\ntimeouts:\n  flow_ms: 1234\n",
            )
            .unwrap();
            assert_eq!(config.base_url, "http://shop.test");
            assert_eq!(config.timeouts.flow_ms, 1234);
            assert_eq!(config.timeouts.interaction_ms, 10_000);
            assert_eq!(config.storage_prefix, "gs_");
        }

        #[test]
        fn test_yaml_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("storeprobe.yaml");
            std::fs::write(&path, "retry:\n  max_attempts: 5\n").unwrap();
            let config = ProbeConfig::from_yaml_file(&path).unwrap();
            assert_eq!(config.retry.max_attempts, 5);
        }

        #[test]
        fn test_to_yaml_parses_back() {
            let config = ProbeConfig::default().with_storage_prefix("qa_");
            let text = config.to_yaml().unwrap();
            assert_eq!(ProbeConfig::from_yaml_str(&text).unwrap(), config);
        }
    }

    mod validate_tests {
        use super::*;

        #[test]
        fn test_zero_attempts_rejected() {
            let err = ProbeConfig::default().with_max_attempts(0).validate().unwrap_err();
            assert!(matches!(err, ProbeError::Config { .. }));
        }

        #[test]
        fn test_scheme_required() {
            let err = ProbeConfig::default()
                .with_base_url("127.0.0.1:5501")
                .validate()
                .unwrap_err();
            assert!(err.to_string().contains("http://"));
        }

        #[test]
        fn test_zero_poll_rejected() {
            let mut config = ProbeConfig::default();
            config.timeouts.poll_interval_ms = 0;
            assert!(config.validate().is_err());
        }
    }
}
