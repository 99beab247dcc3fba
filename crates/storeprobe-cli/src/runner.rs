//! Scenario run orchestration

use storeprobe::{
    ProbeConfig, RunSummary, ScenarioId, ScenarioRunner, SessionFactory, StorefrontFactory, Suite,
};
use tracing::info;

use crate::error::{CliError, CliResult};
use crate::output::{render_json, OutputFormat, ProgressReporter};

/// What to run and how to report it
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub suite: Option<Suite>,
    pub filter: Option<String>,
    /// Use the simulated storefront instead of Chromium
    pub offline: bool,
    pub fail_fast: bool,
    pub format: OutputFormat,
}

/// Scenarios selected by `options`, in catalog order
pub fn select(options: &RunOptions) -> CliResult<Vec<ScenarioId>> {
    let ids = ScenarioId::select(options.suite, options.filter.as_deref());
    if ids.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "No scenarios match suite {} and filter {:?}",
            options.suite.map_or_else(|| "any".to_string(), |s| s.to_string()),
            options.filter.as_deref().unwrap_or("")
        )));
    }
    Ok(ids)
}

/// Drives a [`ScenarioRunner`] and prints its reports
#[derive(Debug)]
pub struct TestRunner {
    config: ProbeConfig,
    options: RunOptions,
    reporter: ProgressReporter,
}

impl TestRunner {
    #[must_use]
    pub const fn new(config: ProbeConfig, options: RunOptions, reporter: ProgressReporter) -> Self {
        Self {
            config,
            options,
            reporter,
        }
    }

    /// Run the selected scenarios; an error if any of them failed
    pub async fn run(&mut self) -> CliResult<RunSummary> {
        let ids = select(&self.options)?;
        info!(
            scenarios = ids.len(),
            offline = self.options.offline,
            base_url = %self.config.base_url,
            "run starting"
        );

        let summary = if self.options.offline {
            self.drive(StorefrontFactory::new(), &ids).await
        } else {
            self.run_live(&ids).await?
        };

        if self.options.format == OutputFormat::Json {
            println!("{}", render_json(&summary)?);
        } else {
            self.reporter.summary(&summary);
        }

        if summary.all_passed() {
            Ok(summary)
        } else {
            Err(CliError::test_execution(format!(
                "{} of {} scenarios failed",
                summary.failed_count(),
                summary.total()
            )))
        }
    }

    #[cfg(feature = "browser")]
    async fn run_live(&mut self, ids: &[ScenarioId]) -> CliResult<RunSummary> {
        Ok(self.drive(storeprobe::ChromiumFactory, ids).await)
    }

    #[cfg(not(feature = "browser"))]
    async fn run_live(&mut self, _ids: &[ScenarioId]) -> CliResult<RunSummary> {
        Err(CliError::config(
            "live runs need the `browser` feature; rebuild with it or pass --offline",
        ))
    }

    async fn drive<F: SessionFactory>(&mut self, factory: F, ids: &[ScenarioId]) -> RunSummary {
        let runner = ScenarioRunner::new(factory, self.config.clone());
        let runner = if self.options.fail_fast {
            runner.with_fail_fast()
        } else {
            runner
        };

        let text = self.options.format == OutputFormat::Text;
        if text {
            self.reporter.header(&format!(
                "Running {} scenarios against {}",
                ids.len(),
                if self.options.offline {
                    "the simulated storefront"
                } else {
                    self.config.base_url.as_str()
                }
            ));
            self.reporter.start_progress(ids.len() as u64, "scenarios");
        }
        let reporter = &self.reporter;
        let summary = runner
            .run_with(ids, |report| {
                if text {
                    reporter.record(report);
                }
            })
            .await;
        self.reporter.finish();
        summary
    }
}
