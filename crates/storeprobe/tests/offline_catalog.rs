//! Runs the whole scenario catalog against the simulated storefront.
//!
//! Each suite gets its own test so a regression points at the screen it
//! broke. Redirect and processing delays are shortened; the search debounce
//! keeps its real value because one home scenario observes it.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use storeprobe::mock::StorefrontTiming;
use storeprobe::prelude::*;

fn runner() -> ScenarioRunner<StorefrontFactory> {
    let config = ProbeConfig::default()
        .with_base_url("http://shop.test")
        .with_timeouts(Timeouts::default().compressed(2_000));
    ScenarioRunner::new(
        StorefrontFactory::new().with_timing(StorefrontTiming::fast()),
        config,
    )
}

async fn run_suite(suite: Suite) -> RunSummary {
    let ids = ScenarioId::select(Some(suite), None);
    assert!(!ids.is_empty(), "{suite} has no scenarios");
    runner().run(&ids).await
}

fn assert_clean(summary: &RunSummary) {
    let failures: Vec<String> = summary
        .failures()
        .iter()
        .map(|r| format!("{}: {}", r.name, r.message.as_deref().unwrap_or("")))
        .collect();
    assert!(failures.is_empty(), "failing scenarios:\n{}", failures.join("\n"));
}

// ============================================================================
// Per-suite runs
// ============================================================================

#[tokio::test]
async fn test_home_suite_passes_offline() {
    let summary = run_suite(Suite::Home).await;
    assert_clean(&summary);
    assert_eq!(summary.total(), 14);
}

#[tokio::test]
async fn test_cart_suite_passes_offline() {
    let summary = run_suite(Suite::Cart).await;
    assert_clean(&summary);
    assert_eq!(summary.total(), 13);
}

#[tokio::test]
async fn test_payment_suite_passes_offline() {
    let summary = run_suite(Suite::Payment).await;
    assert_clean(&summary);
    assert_eq!(summary.total(), 15);
}

#[tokio::test]
async fn test_orders_suite_passes_offline() {
    let summary = run_suite(Suite::Orders).await;
    assert_clean(&summary);
    assert_eq!(summary.total(), 13);
}

#[tokio::test]
async fn test_login_suite_passes_offline() {
    let summary = run_suite(Suite::Login).await;
    assert_clean(&summary);
    assert_eq!(summary.total(), 10);
}

// ============================================================================
// Selection and reporting
// ============================================================================

#[tokio::test]
async fn test_filtered_run_reports_in_catalog_order() {
    let ids = ScenarioId::select(None, Some("title"));
    let summary = runner().run(&ids).await;
    assert_clean(&summary);
    let names: Vec<&str> = summary.reports.iter().map(|r| r.name.as_str()).collect();
    let expected: Vec<&str> = ids.iter().map(|id| id.name()).collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn test_custom_storage_prefix_reaches_storefront() {
    let config = ProbeConfig::default()
        .with_base_url("http://shop.test")
        .with_storage_prefix("staging_")
        .with_timeouts(Timeouts::default().compressed(2_000));
    let runner = ScenarioRunner::new(
        StorefrontFactory::new().with_timing(StorefrontTiming::fast()),
        config,
    );
    let summary = runner.run(&[ScenarioId::CartSingleItem]).await;
    assert_clean(&summary);
}

#[tokio::test]
async fn test_summary_serializes_for_reports() {
    let summary = runner()
        .run(&[ScenarioId::HomeTitle, ScenarioId::LoginPasswordMasked])
        .await;
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["reports"].as_array().unwrap().len(), 2);
    assert_eq!(json["reports"][1]["suite"], "login");
    assert_eq!(json["reports"][1]["passed"], true);
    assert!(json["duration_ms"].is_u64());
}
