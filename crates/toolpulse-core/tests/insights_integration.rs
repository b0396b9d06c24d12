//! End-to-end: events on disk through aggregation to insight reports

use async_trait::async_trait;
use chrono::Duration;
use std::io::Write;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};
use toolpulse_core::insights::COLLECTING_DATA_TITLE;
use toolpulse_core::models::{today, DateWindow};
use toolpulse_core::tracker::{ErrorRatePoint, ProblematicTool, ToolErrorTrend};
use toolpulse_core::{
    Aggregator, AnalyticsConfig, AnalyticsEvent, ErrorCategory, ErrorTracker, EventStore,
    HealthStatus, InsightSeverity, InsightsConfig, InsightsGenerator, NoopErrorTracker,
};

async fn seeded_store(tmp: &TempDir, events: Vec<AnalyticsEvent>) -> Arc<EventStore> {
    let store = Arc::new(EventStore::new(AnalyticsConfig::with_data_dir(tmp.path())));
    let outcome = store.append_events(events).await;
    assert!(outcome.success, "seed failed: {:?}", outcome.error);
    store
}

fn on_day(tool: &str, days_ago: i64, index: usize, failed: bool, duration_ms: f64) -> AnalyticsEvent {
    let ts = format!(
        "{}T{:02}:{:02}:00.000Z",
        today() - Duration::days(days_ago),
        index / 60 % 24,
        index % 60
    );
    if failed {
        AnalyticsEvent::failure(tool, duration_ms, "s", ErrorCategory::Runtime).at(ts)
    } else {
        AnalyticsEvent::success(tool, duration_ms, "s").at(ts)
    }
}

/// Tracker returning fixed data, standing in for an upstream error pipeline
struct FixedTracker {
    trends: Vec<ToolErrorTrend>,
}

#[async_trait]
impl ErrorTracker for FixedTracker {
    async fn problematic_tools(&self, _window: DateWindow) -> Vec<ProblematicTool> {
        Vec::new()
    }

    async fn error_trends(&self, _window: DateWindow) -> Vec<ToolErrorTrend> {
        self.trends.clone()
    }
}

#[tokio::test]
async fn test_high_minimum_with_one_event_only_placeholder() {
    let tmp = TempDir::new().unwrap();
    let store = seeded_store(&tmp, vec![AnalyticsEvent::success("format_code", 5.0, "s")]).await;

    let generator = InsightsGenerator::new(
        Aggregator::new(store),
        Arc::new(NoopErrorTracker),
        InsightsConfig {
            min_invocations_for_insight: 100,
            ..InsightsConfig::default()
        },
    );

    let insights = generator.popularity_insights(None, None).await;
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].title, COLLECTING_DATA_TITLE);

    let report = generator.generate_report(None, None).await;
    assert_eq!(report.insights.len(), 1);
    assert_eq!(report.summary.info_count, 1);
}

#[tokio::test]
async fn test_report_ordering_and_counts() {
    let tmp = TempDir::new().unwrap();
    let mut events = Vec::new();
    // Healthy, popular, fast
    events.extend((0..40).map(|i| on_day("format_code", 0, i, false, 20.0)));
    // Critical error rate and slow
    events.extend((0..10).map(|i| on_day("generate_tests", 0, i, i % 2 == 0, 15_000.0)));
    // Growing usage: 2 then 8 events
    events.extend((0..2).map(|i| on_day("search_docs", 6, i, false, 100.0)));
    events.extend((0..8).map(|i| on_day("search_docs", 1, i, false, 100.0)));
    let store = seeded_store(&tmp, events).await;

    let generator =
        InsightsGenerator::with_store_tracker(Aggregator::new(store), InsightsConfig::default());
    let (report, summary) = generator.report_with_summary(None, None).await;

    let counts = report.summary;
    assert_eq!(
        counts.total_insights,
        counts.critical_count + counts.warning_count + counts.info_count
    );
    assert_eq!(counts.total_insights, report.insights.len());
    assert!(report
        .insights
        .windows(2)
        .all(|w| w[0].severity.rank() <= w[1].severity.rank()));

    let titles: Vec<&str> = report.insights.iter().map(|i| i.title.as_str()).collect();
    assert!(titles.contains(&"Critical Error Rate"));
    assert!(titles.contains(&"Slow Response Time"));
    assert!(titles.contains(&"Growing Tool Usage"));
    assert!(titles.contains(&"Most Popular Tool"));
    assert!(titles.contains(&"Unexplored Tools"));
    assert!(!titles.contains(&COLLECTING_DATA_TITLE));
    assert_eq!(report.insights[0].severity, InsightSeverity::Critical);

    assert_eq!(summary.health_status, HealthStatus::Critical);
    assert_eq!(summary.most_popular_tool.as_deref(), Some("format_code"));
    assert_eq!(summary.total_insights, counts.total_insights);
}

#[tokio::test]
async fn test_external_tracker_error_trend() {
    let tmp = TempDir::new().unwrap();
    let events = (0..10).map(|i| on_day("refactor_code", 0, i, false, 50.0)).collect();
    let store = seeded_store(&tmp, events).await;

    let point = |period: &str, error_rate: f64| ErrorRatePoint {
        period: period.to_string(),
        error_count: 2,
        total_count: 10,
        error_rate,
    };
    let tracker = FixedTracker {
        trends: vec![ToolErrorTrend {
            tool_name: "refactor_code".to_string(),
            periods: vec![point("2026-01-01", 0.0), point("2026-01-08", 45.0)],
        }],
    };

    let generator = InsightsGenerator::new(
        Aggregator::new(store),
        Arc::new(tracker),
        InsightsConfig::default(),
    );
    let insights = generator.trend_insights(None, None).await;

    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].title, "Increasing Error Trend");
    assert_eq!(insights[0].severity, InsightSeverity::Warning);
}

#[tokio::test]
async fn test_insight_thresholds_from_toml() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
retention_days = 30

[insights]
min_invocations_for_insight = 2
slow_response_threshold = 100.0
known_tools = ["format_code"]
"#
    )
    .unwrap();

    let tmp = TempDir::new().unwrap();
    let mut config = AnalyticsConfig::load(file.path()).unwrap();
    config.data_dir = tmp.path().to_path_buf();

    let store = Arc::new(EventStore::new(config.clone()));
    store
        .append_events((0..3).map(|i| on_day("format_code", 0, i, false, 350.0)).collect())
        .await;

    let generator =
        InsightsGenerator::with_store_tracker(Aggregator::new(store), config.insights);
    let insights = generator.performance_insights(None, None).await;

    // 350ms > 2 x 100ms
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].title, "Slow Response Time");

    let text = generator.text_report(None, None).await;
    assert!(text.contains("ANALYTICS INSIGHTS REPORT"));
    assert!(text.contains("Total Insights:"));
    assert!(!text.contains("Unexplored Tools"));
}
