//! Performance rules: slow tools and the fastest one

use super::{AnalyticsInsight, InsightCategory, InsightSeverity, InsightsConfig};
use crate::aggregation::{ToolMetrics, UsageStats};

/// Multiple of the slow threshold at which a slow tool becomes a warning
pub const SLOW_WARNING_FACTOR: f64 = 2.0;

/// Performance insights for one window
///
/// Tools averaging above `slow_response_threshold` get "Slow Response Time"
/// (warning, above twice the threshold) or "Response Time Notice" (info).
/// "Fastest Tool" names the quickest tool once at least two qualify.
pub fn performance_insights(stats: &UsageStats, config: &InsightsConfig) -> Vec<AnalyticsInsight> {
    let minimum = config.min_invocations_for_insight;
    if stats.total_invocations < minimum {
        return vec![AnalyticsInsight::collecting_data(
            InsightCategory::Performance,
            stats.total_invocations,
            minimum,
        )];
    }

    let threshold = config.slow_response_threshold;
    let qualifying: Vec<&ToolMetrics> = stats
        .tool_metrics
        .iter()
        .filter(|m| m.invocation_count >= minimum)
        .collect();

    let mut slow: Vec<&ToolMetrics> = qualifying
        .iter()
        .copied()
        .filter(|m| m.avg_duration_ms > threshold)
        .collect();
    slow.sort_by(|a, b| b.avg_duration_ms.total_cmp(&a.avg_duration_ms));

    let mut insights: Vec<AnalyticsInsight> = slow
        .into_iter()
        .map(|m| {
            let (title, severity) = if m.avg_duration_ms > threshold * SLOW_WARNING_FACTOR {
                ("Slow Response Time", InsightSeverity::Warning)
            } else {
                ("Response Time Notice", InsightSeverity::Info)
            };
            AnalyticsInsight::new(
                title,
                format!(
                    "{} averages {:.0}ms (p95 {:.0}ms) against a {:.0}ms threshold.",
                    m.tool_name, m.avg_duration_ms, m.p95_duration_ms, threshold
                ),
                severity,
                InsightCategory::Performance,
                vec![m.tool_name.clone()],
            )
        })
        .collect();

    if qualifying.len() >= 2 {
        let fastest = qualifying.iter().min_by(|a, b| {
            a.avg_duration_ms
                .total_cmp(&b.avg_duration_ms)
                .then_with(|| a.tool_name.cmp(&b.tool_name))
        });
        if let Some(fastest) = fastest {
            insights.push(AnalyticsInsight::new(
                "Fastest Tool",
                format!(
                    "{} is the quickest tool at {:.0}ms on average.",
                    fastest.tool_name, fastest.avg_duration_ms
                ),
                InsightSeverity::Info,
                InsightCategory::Performance,
                vec![fastest.tool_name.clone()],
            ));
        }
    }

    insights
}
