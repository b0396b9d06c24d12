//! toolpulse-core - local usage telemetry for developer tools
//!
//! Records tool invocations into date-partitioned JSON files, aggregates them
//! on demand and derives rule-based insights.
//!
//! ```no_run
//! use std::sync::Arc;
//! use toolpulse_core::{Aggregator, AnalyticsConfig, AnalyticsEvent, EventStore, InsightsGenerator};
//!
//! # async fn demo() {
//! let config = AnalyticsConfig::default();
//! let store = Arc::new(EventStore::new(config.clone()));
//! store.append_event(AnalyticsEvent::success("format_code", 42.0, "session-1")).await;
//!
//! let aggregator = Aggregator::new(store);
//! let stats = aggregator.usage_stats(None, None).await;
//! println!("{} invocations", stats.total_invocations);
//!
//! let insights = InsightsGenerator::with_store_tracker(aggregator, config.insights);
//! println!("{}", insights.text_report(None, None).await);
//! # }
//! ```

pub mod aggregation;
pub mod config;
pub mod error;
pub mod insights;
pub mod models;
pub mod store;
pub mod tracker;

pub use aggregation::{
    AggregationSummary, Aggregator, PeriodType, ToolMetrics, ToolPeriodCounts, Trend, UsageStats,
    UsageTrend,
};
pub use config::AnalyticsConfig;
pub use error::{ConfigError, StoreError};
pub use insights::{
    AnalyticsInsight, HealthStatus, InsightCategory, InsightSeverity, InsightsConfig,
    InsightsGenerator, InsightsReport, InsightsSummary,
};
pub use models::{AnalyticsEvent, DailyPartition, DateWindow, ErrorCategory};
pub use store::{
    AppendOutcome, CleanupOutcome, DeleteOutcome, EventStore, ReadOutcome, StorageInfo,
};
pub use tracker::{ErrorSnapshot, ErrorTracker, NoopErrorTracker, StoreErrorTracker};
