//! Harness for running the scenario catalog.
//!
//! Every scenario gets a fresh session from a [`SessionFactory`], starts on
//! its suite's start page and is reported as one [`ScenarioReport`].

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::ProbeConfig;
use crate::mock::{MockSession, Storefront, StorefrontTiming};
use crate::result::{FailureKind, ProbeError, ProbeResult};
use crate::scenario::{ScenarioContext, ScenarioId, Suite};
use crate::session::BrowserSession;

/// Opens one isolated browser session per scenario
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Session type handed to scenarios
    type Session: BrowserSession;

    /// Open a fresh session configured from `config`
    async fn open(&self, config: &ProbeConfig) -> ProbeResult<Self::Session>;
}

/// Sessions over the simulated storefront
#[derive(Debug, Clone, Default)]
pub struct StorefrontFactory {
    timing: StorefrontTiming,
}

impl StorefrontFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `timing` for every storefront this factory creates
    #[must_use]
    pub const fn with_timing(mut self, timing: StorefrontTiming) -> Self {
        self.timing = timing;
        self
    }
}

#[async_trait]
impl SessionFactory for StorefrontFactory {
    type Session = MockSession<Storefront>;

    async fn open(&self, config: &ProbeConfig) -> ProbeResult<Self::Session> {
        let app = Storefront::new()
            .with_timing(self.timing)
            .with_storage_prefix(config.storage_prefix.clone());
        Ok(MockSession::new(app))
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    pub suite: Suite,
    pub passed: bool,
    /// Classification of the failure, if any
    pub failure_kind: Option<FailureKind>,
    /// Failure message, if any
    pub message: Option<String>,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl ScenarioReport {
    /// Passing report
    #[must_use]
    pub fn pass(id: ScenarioId) -> Self {
        Self {
            name: id.name().to_string(),
            suite: id.suite(),
            passed: true,
            failure_kind: None,
            message: None,
            duration: Duration::ZERO,
        }
    }

    /// Failing report carrying the error's kind and message
    #[must_use]
    pub fn fail(id: ScenarioId, error: &ProbeError) -> Self {
        Self {
            name: id.name().to_string(),
            suite: id.suite(),
            passed: false,
            failure_kind: Some(error.kind()),
            message: Some(error.to_string()),
            duration: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Reports of one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Reports in execution order
    pub reports: Vec<ScenarioReport>,
    /// Wall time of the whole run
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl RunSummary {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(|r| r.passed)
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.reports.iter().filter(|r| r.passed).count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.reports.iter().filter(|r| !r.passed).count()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioReport> {
        self.reports.iter().filter(|r| !r.passed).collect()
    }
}

/// Runs scenarios one after another, each in its own session
#[derive(Debug)]
pub struct ScenarioRunner<F> {
    factory: F,
    config: ProbeConfig,
    fail_fast: bool,
}

impl<F: SessionFactory> ScenarioRunner<F> {
    #[must_use]
    pub const fn new(factory: F, config: ProbeConfig) -> Self {
        Self {
            factory,
            config,
            fail_fast: false,
        }
    }

    /// Stop after the first failing scenario
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }

    async fn execute(&self, session: &F::Session, id: ScenarioId) -> ProbeResult<()> {
        let suite = id.suite();
        session
            .navigate(&self.config.url_for(suite.start_route().path()))
            .await?;
        let ctx = ScenarioContext::new(session, &self.config, suite);
        id.run(&ctx).await
    }

    /// Run one scenario in a fresh session
    pub async fn run_one(&self, id: ScenarioId) -> ScenarioReport {
        let start = Instant::now();
        info!(scenario = id.name(), suite = %id.suite(), "scenario started");
        let outcome = match self.factory.open(&self.config).await {
            Ok(session) => {
                let outcome = self.execute(&session, id).await;
                if let Err(err) = session.close().await {
                    warn!(scenario = id.name(), error = %err, "session close failed");
                }
                outcome
            }
            Err(err) => Err(err),
        };
        let report = match &outcome {
            Ok(()) => ScenarioReport::pass(id),
            Err(err) => ScenarioReport::fail(id, err),
        }
        .with_duration(start.elapsed());
        info!(
            scenario = id.name(),
            passed = report.passed,
            duration_ms = report.duration.as_millis() as u64,
            "scenario finished"
        );
        report
    }

    /// Run `ids` in order
    pub async fn run(&self, ids: &[ScenarioId]) -> RunSummary {
        self.run_with(ids, |_| {}).await
    }

    /// Run `ids` in order, handing each report to `on_report` as it completes
    pub async fn run_with(
        &self,
        ids: &[ScenarioId],
        mut on_report: impl FnMut(&ScenarioReport),
    ) -> RunSummary {
        let start = Instant::now();
        let mut reports = Vec::with_capacity(ids.len());
        for &id in ids {
            let report = self.run_one(id).await;
            on_report(&report);
            let failed = !report.passed;
            reports.push(report);
            if failed && self.fail_fast {
                break;
            }
        }
        RunSummary {
            reports,
            duration: start.elapsed(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Timeouts;

    fn runner() -> ScenarioRunner<StorefrontFactory> {
        let config = ProbeConfig::default()
            .with_base_url("http://shop.test")
            .with_timeouts(Timeouts::default().compressed(2_000));
        ScenarioRunner::new(
            StorefrontFactory::new().with_timing(StorefrontTiming::fast()),
            config,
        )
    }

    mod report_tests {
        use super::*;

        #[test]
        fn test_fail_report_carries_kind() {
            let err = ProbeError::assertion("cart rows", 1, 0);
            let report = ScenarioReport::fail(ScenarioId::CartSingleItem, &err);
            assert!(!report.passed);
            assert_eq!(report.failure_kind, Some(FailureKind::Assertion));
            assert_eq!(report.suite, Suite::Cart);
        }

        #[test]
        fn test_report_json_shape() {
            let report = ScenarioReport::pass(ScenarioId::HomeTitle)
                .with_duration(Duration::from_millis(42));
            let json = serde_json::to_value(&report).unwrap();
            assert_eq!(json["name"], "home_title");
            assert_eq!(json["suite"], "home");
            assert_eq!(json["duration_ms"], 42);
            assert!(json["failure_kind"].is_null());
        }

        #[test]
        fn test_summary_counts() {
            let err = ProbeError::session("gone");
            let summary = RunSummary {
                reports: vec![
                    ScenarioReport::pass(ScenarioId::HomeTitle),
                    ScenarioReport::fail(ScenarioId::HomeUrlIsIndex, &err),
                ],
                duration: Duration::ZERO,
            };
            assert_eq!(summary.total(), 2);
            assert_eq!(summary.passed_count(), 1);
            assert_eq!(summary.failed_count(), 1);
            assert!(!summary.all_passed());
            assert_eq!(summary.failures()[0].name, "home_url_is_index");
        }
    }

    mod runner_tests {
        use super::*;

        #[tokio::test]
        async fn test_runs_in_order_and_reports() {
            let ids = [ScenarioId::HomeTitle, ScenarioId::LoginWindowTitle];
            let mut seen = Vec::new();
            let summary = runner()
                .run_with(&ids, |r| seen.push(r.name.clone()))
                .await;
            assert!(summary.all_passed(), "{:?}", summary.failures());
            assert_eq!(seen, vec!["home_title", "login_window_title"]);
        }

        /// A session factory whose sessions fail to open
        struct Broken;

        #[async_trait]
        impl SessionFactory for Broken {
            type Session = MockSession<Storefront>;

            async fn open(&self, _config: &ProbeConfig) -> ProbeResult<Self::Session> {
                Err(ProbeError::BrowserLaunch {
                    message: "no chromium".into(),
                })
            }
        }

        #[tokio::test]
        async fn test_fail_fast_stops_after_first_failure() {
            let runner = ScenarioRunner::new(Broken, ProbeConfig::default()).with_fail_fast();
            let summary = runner
                .run(&[ScenarioId::HomeTitle, ScenarioId::HomeSubtitleNotEmpty])
                .await;
            assert_eq!(summary.total(), 1);
            assert_eq!(summary.reports[0].failure_kind, Some(FailureKind::Session));
        }

        #[tokio::test]
        async fn test_without_fail_fast_runs_everything() {
            let runner = ScenarioRunner::new(Broken, ProbeConfig::default());
            let summary = runner
                .run(&[ScenarioId::HomeTitle, ScenarioId::HomeSubtitleNotEmpty])
                .await;
            assert_eq!(summary.failed_count(), 2);
        }
    }
}
