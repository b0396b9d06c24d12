//! Aggregation engine
//!
//! Turns raw events into per-tool statistics, daily trends and period
//! buckets. Every query re-reads the store and recomputes from scratch; nothing
//! is cached, so results are never stale but cost is linear in the window.
//!
//! The arithmetic lives in pure functions over `&[AnalyticsEvent]`
//! ([`compute_usage_stats`], [`compute_usage_trends`], [`compute_period_counts`]);
//! [`Aggregator`] only resolves windows and loads events.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::{AnalyticsEvent, DateWindow};
use crate::store::EventStore;

pub mod metrics;
pub mod periods;
pub mod summary;
pub mod trends;


pub use metrics::{
    compute_usage_stats, percentile_95, rate_pct, ToolMetrics, UsageStats, ATTENTION_ERROR_RATE,
};
pub use periods::{compute_period_counts, PeriodBucket, PeriodType, ToolPeriodCounts};
pub use summary::{
    error_rates, popularity_ranking, response_times, summarize, AggregationSummary,
    ErrorRateEntry, PopularityEntry, ResponseTimeEntry,
};
pub use trends::{classify_trend, compute_usage_trends, Trend, TrendPoint, UsageTrend};

/// Trailing window used when a query gives no start date
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Read-only statistics over an [`EventStore`]
#[derive(Debug, Clone)]
pub struct Aggregator {
    store: Arc<EventStore>,
}

impl Aggregator {
    pub fn new(store: Arc<EventStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    /// Default 30-day trailing window with optional explicit bounds
    pub fn window(start: Option<NaiveDate>, end: Option<NaiveDate>) -> DateWindow {
        DateWindow::resolve(start, end, DEFAULT_WINDOW_DAYS)
    }

    /// Events in `window`; a failed read is logged and treated as no data
    pub async fn load_events(&self, window: DateWindow) -> Vec<AnalyticsEvent> {
        let outcome = self
            .store
            .read_events(Some(window.start), Some(window.end))
            .await;

        if !outcome.success {
            warn!(
                window = %window,
                error = outcome.error.as_deref().unwrap_or("unknown"),
                "Event read failed, aggregating an empty window"
            );
            return Vec::new();
        }

        debug!(window = %window, events = outcome.events.len(), "Loaded events for aggregation");
        outcome.events
    }

    /// Full usage envelope over `[start, end]`
    pub async fn usage_stats(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> UsageStats {
        self.usage_stats_in(Self::window(start, end)).await
    }

    /// Full usage envelope over an already resolved window
    pub async fn usage_stats_in(&self, window: DateWindow) -> UsageStats {
        let events = self.load_events(window).await;
        compute_usage_stats(&events, window)
    }

    /// Per-tool daily series with trend classification
    pub async fn usage_trends(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<UsageTrend> {
        let events = self.load_events(Self::window(start, end)).await;
        compute_usage_trends(&events)
    }

    /// Per-tool period buckets, optionally for a single tool
    pub async fn period_counts(
        &self,
        period_type: PeriodType,
        tool_name: Option<&str>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<ToolPeriodCounts> {
        self.period_counts_in(period_type, tool_name, Self::window(start, end))
            .await
    }

    pub async fn period_counts_in(
        &self,
        period_type: PeriodType,
        tool_name: Option<&str>,
        window: DateWindow,
    ) -> Vec<ToolPeriodCounts> {
        let events = self.load_events(window).await;
        compute_period_counts(&events, period_type, tool_name)
    }

    /// Headline summary (error rate as a 0-1 fraction)
    pub async fn summary(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AggregationSummary {
        summarize(&self.usage_stats(start, end).await)
    }

    /// Metrics for one tool, `None` if it has no events in the window
    pub async fn tool_metrics(
        &self,
        tool_name: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Option<ToolMetrics> {
        self.usage_stats(start, end)
            .await
            .tool_metrics
            .into_iter()
            .find(|m| m.tool_name == tool_name)
    }

    pub async fn popularity_ranking(
        &self,
        limit: Option<usize>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<PopularityEntry> {
        popularity_ranking(&self.usage_stats(start, end).await, limit)
    }

    pub async fn error_rates(
        &self,
        limit: Option<usize>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<ErrorRateEntry> {
        error_rates(&self.usage_stats(start, end).await, limit)
    }

    pub async fn response_times(
        &self,
        limit: Option<usize>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<ResponseTimeEntry> {
        response_times(&self.usage_stats(start, end).await, limit)
    }
}
