//! Reliability rules: per-tool error-rate bands

use std::collections::HashSet;

use super::{AnalyticsInsight, InsightCategory, InsightSeverity, InsightsConfig};
use crate::aggregation::UsageStats;
use crate::models::ErrorCategory;
use crate::tracker::ProblematicTool;

/// Error rate (0-100) at or above which a tool is critical
pub const CRITICAL_ERROR_RATE: f64 = 25.0;

/// Error rate (0-100) at or above which a tool needs a warning
pub const WARNING_ERROR_RATE: f64 = 10.0;

/// Band for an error rate; `None` below the warning band
fn classify(error_rate: f64) -> Option<InsightSeverity> {
    if error_rate >= CRITICAL_ERROR_RATE {
        Some(InsightSeverity::Critical)
    } else if error_rate >= WARNING_ERROR_RATE {
        Some(InsightSeverity::Warning)
    } else {
        None
    }
}

struct Offender<'a> {
    tool_name: &'a str,
    error_rate: f64,
    error_count: usize,
    invocation_count: usize,
    category: Option<ErrorCategory>,
    severity: InsightSeverity,
}

impl Offender<'_> {
    fn into_insight(self) -> AnalyticsInsight {
        let title = match self.severity {
            InsightSeverity::Critical => "Critical Error Rate",
            _ => "Elevated Error Rate",
        };
        let category = self.category.unwrap_or(ErrorCategory::Unknown);
        AnalyticsInsight::new(
            title,
            format!(
                "{} failed {:.1}% of invocations ({} of {}); most frequent error: {}.",
                self.tool_name, self.error_rate, self.error_count, self.invocation_count, category
            ),
            self.severity,
            InsightCategory::Reliability,
            vec![self.tool_name.to_string()],
        )
    }
}

/// Reliability insights for one window
///
/// Every tool with at least the minimum invocations is banded: ≥ 25% errors is
/// critical, ≥ 10% a warning. Tools the error tracker reports that have no
/// metrics in the window are banded the same way. When nothing qualifies a
/// single "Healthy Error Rates" insight is returned.
pub fn reliability_insights(
    stats: &UsageStats,
    problematic: &[ProblematicTool],
    config: &InsightsConfig,
) -> Vec<AnalyticsInsight> {
    let minimum = config.min_invocations_for_insight;
    if stats.total_invocations < minimum {
        return vec![AnalyticsInsight::collecting_data(
            InsightCategory::Reliability,
            stats.total_invocations,
            minimum,
        )];
    }

    let mut offenders: Vec<Offender> = stats
        .tool_metrics
        .iter()
        .filter(|m| m.invocation_count >= minimum)
        .filter_map(|m| {
            classify(m.error_rate).map(|severity| Offender {
                tool_name: &m.tool_name,
                error_rate: m.error_rate,
                error_count: m.error_count,
                invocation_count: m.invocation_count,
                category: m.most_common_error(),
                severity,
            })
        })
        .collect();

    let in_window: HashSet<&str> = stats
        .tool_metrics
        .iter()
        .map(|m| m.tool_name.as_str())
        .collect();
    offenders.extend(
        problematic
            .iter()
            .filter(|p| !in_window.contains(p.tool_name.as_str()))
            .filter(|p| p.invocation_count >= minimum)
            .filter_map(|p| {
                classify(p.error_rate).map(|severity| Offender {
                    tool_name: &p.tool_name,
                    error_rate: p.error_rate,
                    error_count: p.error_count,
                    invocation_count: p.invocation_count,
                    category: p.most_common_category,
                    severity,
                })
            }),
    );

    if offenders.is_empty() {
        return vec![AnalyticsInsight::new(
            "Healthy Error Rates",
            format!(
                "No tool with at least {} invocations is at or above {:.0}% errors (overall {:.1}%).",
                minimum, WARNING_ERROR_RATE, stats.overall_error_rate
            ),
            InsightSeverity::Info,
            InsightCategory::Reliability,
            Vec::new(),
        )];
    }

    offenders.sort_by(|a, b| {
        b.error_rate
            .total_cmp(&a.error_rate)
            .then_with(|| a.tool_name.cmp(b.tool_name))
    });
    offenders.into_iter().map(Offender::into_insight).collect()
}
