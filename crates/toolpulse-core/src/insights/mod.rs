//! Rule-based insights over aggregated usage
//!
//! Four rule families (popularity, reliability, performance, trend) each turn a
//! [`UsageStats`] envelope, plus error data from an [`ErrorTracker`], into
//! zero or more [`AnalyticsInsight`]s. Rules are pure functions; the
//! [`InsightsGenerator`] only loads data for a window and assembles reports.
//!
//! Nothing here fails: missing or thin data yields a "Collecting Usage Data"
//! placeholder instead.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::aggregation::{compute_usage_stats, Aggregator, UsageStats, DEFAULT_WINDOW_DAYS};
use crate::error::ConfigError;
use crate::models::{DateWindow, TOOL_REGISTRY};
use crate::tracker::{
    ErrorSnapshot, ErrorTracker, ProblematicTool, StoreErrorTracker, ToolErrorTrend,
};

pub mod performance;
pub mod popularity;
pub mod reliability;
pub mod report;
pub mod trend;


pub use performance::performance_insights;
pub use popularity::popularity_insights;
pub use reliability::{reliability_insights, CRITICAL_ERROR_RATE, WARNING_ERROR_RATE};
pub use report::{build_report, format_insights, render_text, summarize_report, FormattedInsight};
pub use trend::trend_insights;

/// Title of the placeholder emitted when a scope has too little data
pub const COLLECTING_DATA_TITLE: &str = "Collecting Usage Data";

// ============================================================================
// Configuration
// ============================================================================

/// Thresholds for the insight rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// Below this many invocations a scope only gets the placeholder
    pub min_invocations_for_insight: usize,

    /// Average duration (ms) above which a tool is reported as slow
    pub slow_response_threshold: f64,

    /// Percent change that counts as growth/decline, and percentage points of
    /// error-rate rise that count as an increasing error trend
    pub trend_change_threshold: f64,

    /// Tool names expected to appear; unused ones are reported as unexplored
    pub known_tools: Vec<String>,

    /// Trailing window used when no start date is given
    pub window_days: u32,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            min_invocations_for_insight: 5,
            slow_response_threshold: 5000.0,
            trend_change_threshold: 20.0,
            known_tools: TOOL_REGISTRY.iter().map(|t| t.to_string()).collect(),
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl InsightsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.slow_response_threshold.is_finite() || self.slow_response_threshold <= 0.0 {
            return Err(ConfigError::Invalid {
                message: format!(
                    "insights.slow_response_threshold must be positive, got {}",
                    self.slow_response_threshold
                ),
            });
        }
        if !self.trend_change_threshold.is_finite() || self.trend_change_threshold < 0.0 {
            return Err(ConfigError::Invalid {
                message: format!(
                    "insights.trend_change_threshold must be non-negative, got {}",
                    self.trend_change_threshold
                ),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Insight types
// ============================================================================

/// How urgent an insight is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSeverity {
    Critical,
    Warning,
    Info,
}

impl InsightSeverity {
    /// Sort rank, most urgent first
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Warning => 1,
            Self::Info => 2,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Critical => "🚨",
            Self::Warning => "⚠️",
            Self::Info => "ℹ️",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for InsightSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule family that produced an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Popularity,
    Reliability,
    Performance,
    Trend,
}

impl InsightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Popularity => "popularity",
            Self::Reliability => "reliability",
            Self::Performance => "performance",
            Self::Trend => "trend",
        }
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generated finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsInsight {
    pub title: String,
    pub description: String,
    pub severity: InsightSeverity,
    pub category: InsightCategory,
    pub affected_tools: Vec<String>,
}

impl AnalyticsInsight {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: InsightSeverity,
        category: InsightCategory,
        affected_tools: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
            category,
            affected_tools,
        }
    }

    /// Info insight standing in for a scope with too few invocations
    pub fn collecting_data(category: InsightCategory, total: usize, minimum: usize) -> Self {
        Self::new(
            COLLECTING_DATA_TITLE,
            format!(
                "{} invocation(s) recorded so far; insights need at least {}.",
                total, minimum
            ),
            InsightSeverity::Info,
            category,
            Vec::new(),
        )
    }

    pub fn is_placeholder(&self) -> bool {
        self.title == COLLECTING_DATA_TITLE
    }
}

/// Insight counts per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityCounts {
    pub total_insights: usize,
    pub critical_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

/// Severity-ordered insights for a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReport {
    pub insights: Vec<AnalyticsInsight>,
    pub summary: SeverityCounts,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub generated_at: DateTime<Utc>,
}

/// Overall health derived from the most severe insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthStatus {
    Critical,
    NeedsAttention,
    Healthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::NeedsAttention => "needs-attention",
            Self::Healthy => "healthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-glance condensation of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsSummary {
    pub total_insights: usize,
    pub most_popular_tool: Option<String>,
    pub health_status: HealthStatus,
    pub one_liner: String,
}

// ============================================================================
// Generator
// ============================================================================

/// Builds insights and reports from the aggregation engine and an error tracker
#[derive(Clone)]
pub struct InsightsGenerator {
    aggregator: Aggregator,
    tracker: Arc<dyn ErrorTracker>,
    config: InsightsConfig,
}

impl fmt::Debug for InsightsGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightsGenerator")
            .field("aggregator", &self.aggregator)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl InsightsGenerator {
    pub fn new(
        aggregator: Aggregator,
        tracker: Arc<dyn ErrorTracker>,
        config: InsightsConfig,
    ) -> Self {
        Self {
            aggregator,
            tracker,
            config,
        }
    }

    /// Generator whose error data comes from the same store
    pub fn with_store_tracker(aggregator: Aggregator, config: InsightsConfig) -> Self {
        let tracker = Arc::new(StoreErrorTracker::new(aggregator.clone()));
        Self::new(aggregator, tracker, config)
    }

    pub fn config(&self) -> &InsightsConfig {
        &self.config
    }

    /// Window from optional bounds, defaulting to `window_days` back from today
    pub fn window(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> DateWindow {
        DateWindow::resolve(start, end, self.config.window_days)
    }

    pub async fn popularity_insights(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<AnalyticsInsight> {
        let stats = self.aggregator.usage_stats_in(self.window(start, end)).await;
        popularity_insights(&stats, &self.config)
    }

    pub async fn reliability_insights(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<AnalyticsInsight> {
        let window = self.window(start, end);
        let stats = self.aggregator.usage_stats_in(window).await;
        let problematic = self.tracker.problematic_tools(window).await;
        reliability_insights(&stats, &problematic, &self.config)
    }

    pub async fn performance_insights(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<AnalyticsInsight> {
        let stats = self.aggregator.usage_stats_in(self.window(start, end)).await;
        performance_insights(&stats, &self.config)
    }

    pub async fn trend_insights(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<AnalyticsInsight> {
        let window = self.window(start, end);
        let stats = self.aggregator.usage_stats_in(window).await;
        let error_trends = self.tracker.error_trends(window).await;
        trend_insights(&stats, &error_trends, &self.config)
    }

    /// All rule families over one shared window, most severe first
    pub async fn generate_report(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> InsightsReport {
        self.load(start, end).await.report(&self.config)
    }

    /// Health status and one-line description of the window
    pub async fn summary(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> InsightsSummary {
        self.report_with_summary(start, end).await.1
    }

    /// Report and its summary from a single load
    pub async fn report_with_summary(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> (InsightsReport, InsightsSummary) {
        let inputs = self.load(start, end).await;
        let report = inputs.report(&self.config);
        let summary = summarize_report(&report, &inputs.stats);
        (report, summary)
    }

    /// Plain-text rendering of the report and its summary
    pub async fn text_report(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
        let (report, summary) = self.report_with_summary(start, end).await;
        render_text(&report, &summary)
    }

    async fn load(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> RuleInputs {
        let window = self.window(start, end);
        // One read feeds every rule family
        let events = self.aggregator.load_events(window).await;
        let stats = compute_usage_stats(&events, window);
        let ErrorSnapshot {
            problematic,
            trends: error_trends,
        } = self.tracker.snapshot(window, &events).await;

        debug!(
            window = %window,
            invocations = stats.total_invocations,
            problematic = problematic.len(),
            error_trends = error_trends.len(),
            "Loaded insight inputs"
        );

        RuleInputs {
            stats,
            problematic,
            error_trends,
        }
    }
}

/// Everything the rule families read, loaded once per report
struct RuleInputs {
    stats: UsageStats,
    problematic: Vec<ProblematicTool>,
    error_trends: Vec<ToolErrorTrend>,
}

impl RuleInputs {
    fn report(&self, config: &InsightsConfig) -> InsightsReport {
        let mut insights = popularity_insights(&self.stats, config);
        insights.extend(reliability_insights(&self.stats, &self.problematic, config));
        insights.extend(performance_insights(&self.stats, config));
        insights.extend(trend_insights(&self.stats, &self.error_trends, config));
        build_report(insights, self.stats.window())
    }
}
