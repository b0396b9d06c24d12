//! Popularity rules: leader, laggards, unused tools, concentration

use std::collections::HashSet;

use super::{AnalyticsInsight, InsightCategory, InsightSeverity, InsightsConfig};
use crate::aggregation::{rate_pct, UsageStats};

/// A tool is underutilized below this fraction of the average share
pub const UNDERUTILIZED_SHARE_RATIO: f64 = 0.25;

/// Underutilization is only reported while the leader holds this share (%)
pub const DOMINANT_SHARE_PCT: f64 = 50.0;

/// Share (%) of the top two tools that counts as concentrated usage
pub const CONCENTRATION_SHARE_PCT: f64 = 80.0;

/// Active tools needed before concentration is meaningful
pub const CONCENTRATION_MIN_TOOLS: usize = 3;

/// Popularity insights for one window
///
/// - "Most Popular Tool": the leader, when it meets the minimum
/// - "Underutilized Tool": share < 25% of the average share while the leader holds ≥ 50%
/// - "Unexplored Tools": known tools with no invocations
/// - "Concentrated Usage Pattern": top two tools hold ≥ 80% with ≥ 3 tools active
pub fn popularity_insights(stats: &UsageStats, config: &InsightsConfig) -> Vec<AnalyticsInsight> {
    let total = stats.total_invocations;
    if total < config.min_invocations_for_insight {
        return vec![AnalyticsInsight::collecting_data(
            InsightCategory::Popularity,
            total,
            config.min_invocations_for_insight,
        )];
    }

    let mut insights = Vec::new();
    let share = |count: usize| rate_pct(count, total);

    // 1. Leader
    let leader = stats.tool_metrics.first();
    if let Some(top) = leader.filter(|m| m.invocation_count >= config.min_invocations_for_insight) {
        insights.push(AnalyticsInsight::new(
            "Most Popular Tool",
            format!(
                "{} accounts for {:.1}% of invocations ({} of {}).",
                top.tool_name,
                share(top.invocation_count),
                top.invocation_count,
                total
            ),
            InsightSeverity::Info,
            InsightCategory::Popularity,
            vec![top.tool_name.clone()],
        ));
    }

    // 2. Laggards next to a dominant tool
    let active = stats.tool_metrics.len();
    if let Some(top) = leader.filter(|_| active >= 2) {
        let top_share = share(top.invocation_count);
        let average_share = 100.0 / active as f64;

        if top_share >= DOMINANT_SHARE_PCT {
            for metrics in stats.tool_metrics.iter().skip(1) {
                // Laggards are not held to the per-tool minimum
                let tool_share = share(metrics.invocation_count);
                if tool_share >= average_share * UNDERUTILIZED_SHARE_RATIO {
                    continue;
                }
                insights.push(AnalyticsInsight::new(
                    "Underutilized Tool",
                    format!(
                        "{} has {:.1}% of invocations against an average of {:.1}%, while {} holds {:.1}%.",
                        metrics.tool_name, tool_share, average_share, top.tool_name, top_share
                    ),
                    InsightSeverity::Info,
                    InsightCategory::Popularity,
                    vec![metrics.tool_name.clone()],
                ));
            }
        }
    }

    // 3. Known tools never used
    let used: HashSet<&str> = stats
        .tool_metrics
        .iter()
        .map(|m| m.tool_name.as_str())
        .collect();
    let unexplored: Vec<String> = config
        .known_tools
        .iter()
        .filter(|tool| !used.contains(tool.as_str()))
        .cloned()
        .collect();
    if !unexplored.is_empty() {
        insights.push(AnalyticsInsight::new(
            "Unexplored Tools",
            format!(
                "{} known tool(s) were not used in this period: {}.",
                unexplored.len(),
                unexplored.join(", ")
            ),
            InsightSeverity::Info,
            InsightCategory::Popularity,
            unexplored,
        ));
    }

    // 4. Concentration
    if active >= CONCENTRATION_MIN_TOOLS {
        let top_two: Vec<_> = stats.tool_metrics.iter().take(2).collect();
        let top_two_share = share(top_two.iter().map(|m| m.invocation_count).sum());
        if top_two_share >= CONCENTRATION_SHARE_PCT {
            insights.push(AnalyticsInsight::new(
                "Concentrated Usage Pattern",
                format!(
                    "{} and {} account for {:.1}% of invocations across {} active tools.",
                    top_two[0].tool_name, top_two[1].tool_name, top_two_share, active
                ),
                InsightSeverity::Info,
                InsightCategory::Popularity,
                top_two.iter().map(|m| m.tool_name.clone()).collect(),
            ));
        }
    }

    insights
}
