//! Error-trend source consulted by the insights generator
//!
//! The generator only sees the [`ErrorTracker`] trait. [`StoreErrorTracker`]
//! derives everything from the event store through the aggregation engine;
//! an embedding application with its own error pipeline can plug that in
//! instead.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregation::{
    compute_period_counts, compute_usage_stats, Aggregator, PeriodBucket, PeriodType,
    ToolPeriodCounts, UsageStats,
};
use crate::models::{AnalyticsEvent, DateWindow, ErrorCategory};

/// Error rate (0-100) at which the store-backed tracker reports a tool
pub const PROBLEMATIC_ERROR_RATE: f64 = 10.0;

/// A tool whose failures stand out in a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblematicTool {
    pub tool_name: String,
    pub error_count: usize,
    pub invocation_count: usize,
    /// 0-100
    pub error_rate: f64,
    pub most_common_category: Option<ErrorCategory>,
}

/// Error rate of one tool in one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRatePoint {
    pub period: String,
    pub error_count: usize,
    pub total_count: usize,
    /// 0-100
    pub error_rate: f64,
}

impl From<&PeriodBucket> for ErrorRatePoint {
    fn from(bucket: &PeriodBucket) -> Self {
        Self {
            period: bucket.period.clone(),
            error_count: bucket.error_count,
            total_count: bucket.total_count,
            error_rate: bucket.error_rate,
        }
    }
}

/// Per-period error rates of one tool, ascending by period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolErrorTrend {
    pub tool_name: String,
    pub periods: Vec<ErrorRatePoint>,
}

impl ToolErrorTrend {
    /// Latest minus earliest period error rate, in percentage points.
    /// `None` with fewer than two periods.
    pub fn rate_change(&self) -> Option<f64> {
        match (self.periods.first(), self.periods.last()) {
            (Some(first), Some(last)) if self.periods.len() >= 2 => {
                Some(last.error_rate - first.error_rate)
            }
            _ => None,
        }
    }
}

/// Both tracker views for one window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorSnapshot {
    pub problematic: Vec<ProblematicTool>,
    pub trends: Vec<ToolErrorTrend>,
}

/// Supplier of per-tool error data
#[async_trait]
pub trait ErrorTracker: Send + Sync {
    /// Tools whose failures warrant attention, worst first
    async fn problematic_tools(&self, window: DateWindow) -> Vec<ProblematicTool>;

    /// Per-tool error-rate series over the window
    async fn error_trends(&self, window: DateWindow) -> Vec<ToolErrorTrend>;

    /// Both views at once, given the events the caller already read for
    /// `window`. Trackers with their own data source ignore `events`.
    async fn snapshot(&self, window: DateWindow, _events: &[AnalyticsEvent]) -> ErrorSnapshot {
        ErrorSnapshot {
            problematic: self.problematic_tools(window).await,
            trends: self.error_trends(window).await,
        }
    }
}

/// Tracker backed by the aggregation engine's daily buckets
#[derive(Debug, Clone)]
pub struct StoreErrorTracker {
    aggregator: Aggregator,
}

impl StoreErrorTracker {
    pub fn new(aggregator: Aggregator) -> Self {
        Self { aggregator }
    }
}

#[async_trait]
impl ErrorTracker for StoreErrorTracker {
    async fn problematic_tools(&self, window: DateWindow) -> Vec<ProblematicTool> {
        let tools = problematic_from_stats(&self.aggregator.usage_stats_in(window).await);
        debug!(window = %window, count = tools.len(), "Problematic tools");
        tools
    }

    async fn error_trends(&self, window: DateWindow) -> Vec<ToolErrorTrend> {
        trends_from_counts(
            self.aggregator
                .period_counts_in(PeriodType::Daily, None, window)
                .await,
        )
    }

    async fn snapshot(&self, window: DateWindow, events: &[AnalyticsEvent]) -> ErrorSnapshot {
        ErrorSnapshot {
            problematic: problematic_from_stats(&compute_usage_stats(events, window)),
            trends: trends_from_counts(compute_period_counts(events, PeriodType::Daily, None)),
        }
    }
}

/// Tools at or above [`PROBLEMATIC_ERROR_RATE`] with at least one failure
pub fn problematic_from_stats(stats: &UsageStats) -> Vec<ProblematicTool> {
    let mut tools: Vec<ProblematicTool> = stats
        .tool_metrics
        .iter()
        .filter(|m| m.error_count > 0 && m.error_rate >= PROBLEMATIC_ERROR_RATE)
        .map(|m| ProblematicTool {
            tool_name: m.tool_name.clone(),
            error_count: m.error_count,
            invocation_count: m.invocation_count,
            error_rate: m.error_rate,
            most_common_category: m.most_common_error(),
        })
        .collect();
    tools.sort_by(|a, b| {
        b.error_rate
            .total_cmp(&a.error_rate)
            .then_with(|| a.tool_name.cmp(&b.tool_name))
    });
    tools
}

/// Error-rate series for every tool that failed at least once
pub fn trends_from_counts(counts: Vec<ToolPeriodCounts>) -> Vec<ToolErrorTrend> {
    counts
        .into_iter()
        .filter(|counts| counts.periods.iter().any(|p| p.error_count > 0))
        .map(|counts| ToolErrorTrend {
            periods: counts.periods.iter().map(ErrorRatePoint::from).collect(),
            tool_name: counts.tool_name,
        })
        .collect()
}

/// Tracker that never reports anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopErrorTracker;

#[async_trait]
impl ErrorTracker for NoopErrorTracker {
    async fn problematic_tools(&self, _window: DateWindow) -> Vec<ProblematicTool> {
        Vec::new()
    }

    async fn error_trends(&self, _window: DateWindow) -> Vec<ToolErrorTrend> {
        Vec::new()
    }
}
