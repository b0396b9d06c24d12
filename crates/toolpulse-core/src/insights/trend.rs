//! Trend rules: usage growth/decline and rising error rates

use super::{AnalyticsInsight, InsightCategory, InsightSeverity, InsightsConfig};
use crate::aggregation::UsageStats;
use crate::tracker::ToolErrorTrend;

/// Trend insights for one window
///
/// Usage series need at least two data points and a change beyond
/// `±trend_change_threshold` percent. An error trend needs at least two
/// periods and a rise of more than `trend_change_threshold` percentage points
/// from the earliest to the latest period.
pub fn trend_insights(
    stats: &UsageStats,
    error_trends: &[ToolErrorTrend],
    config: &InsightsConfig,
) -> Vec<AnalyticsInsight> {
    let minimum = config.min_invocations_for_insight;
    if stats.total_invocations < minimum {
        return vec![AnalyticsInsight::collecting_data(
            InsightCategory::Trend,
            stats.total_invocations,
            minimum,
        )];
    }

    let threshold = config.trend_change_threshold;
    let invocations = |tool: &str| stats.tool(tool).map_or(0, |m| m.invocation_count);
    let mut insights = Vec::new();

    for usage in &stats.trends {
        // Single-point series always read as 0% change or 100% growth
        if usage.data_points.len() < 2 || invocations(&usage.tool_name) < minimum {
            continue;
        }
        let change = usage.change_percentage;
        let title = if change > threshold {
            "Growing Tool Usage"
        } else if change < -threshold {
            "Declining Tool Usage"
        } else {
            continue;
        };
        insights.push(AnalyticsInsight::new(
            title,
            format!(
                "{} usage changed {:+.1}% across {} active days.",
                usage.tool_name,
                change,
                usage.data_points.len()
            ),
            InsightSeverity::Info,
            InsightCategory::Trend,
            vec![usage.tool_name.clone()],
        ));
    }

    for errors in error_trends {
        let volume = match stats.tool(&errors.tool_name) {
            Some(metrics) => metrics.invocation_count,
            None => errors.periods.iter().map(|p| p.total_count).sum(),
        };
        if volume < minimum {
            continue;
        }
        let Some(rise) = errors.rate_change().filter(|rise| *rise > threshold) else {
            continue;
        };
        let (Some(first), Some(last)) = (errors.periods.first(), errors.periods.last()) else {
            continue;
        };
        insights.push(AnalyticsInsight::new(
            "Increasing Error Trend",
            format!(
                "{} error rate rose from {:.1}% ({}) to {:.1}% ({}), up {:.1} points.",
                errors.tool_name, first.error_rate, first.period, last.error_rate, last.period, rise
            ),
            InsightSeverity::Warning,
            InsightCategory::Trend,
            vec![errors.tool_name.clone()],
        ));
    }

    insights
}
