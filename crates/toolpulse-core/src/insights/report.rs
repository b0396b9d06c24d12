//! Report assembly, condensation and rendering

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::{
    AnalyticsInsight, HealthStatus, InsightCategory, InsightSeverity, InsightsReport,
    InsightsSummary, SeverityCounts,
};
use crate::aggregation::UsageStats;
use crate::models::DateWindow;

const RULE: &str = "============================================================";

/// Display shape of an insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedInsight {
    pub icon: String,
    pub title: String,
    pub description: String,
    pub severity: InsightSeverity,
    pub category: InsightCategory,
}

/// Wrap insights into a report
///
/// Repeated "Collecting Usage Data" placeholders collapse into the first one,
/// then insights are stably sorted by severity so rule order survives within a
/// severity.
pub fn build_report(insights: Vec<AnalyticsInsight>, window: DateWindow) -> InsightsReport {
    let mut seen_placeholder = false;
    let mut insights: Vec<AnalyticsInsight> = insights
        .into_iter()
        .filter(|insight| {
            if !insight.is_placeholder() {
                return true;
            }
            !std::mem::replace(&mut seen_placeholder, true)
        })
        .collect();
    insights.sort_by_key(|insight| insight.severity.rank());

    let summary = count_severities(&insights);
    InsightsReport {
        insights,
        summary,
        period_start: window.start,
        period_end: window.end,
        generated_at: Utc::now(),
    }
}

fn count_severities(insights: &[AnalyticsInsight]) -> SeverityCounts {
    let mut counts = SeverityCounts {
        total_insights: insights.len(),
        ..SeverityCounts::default()
    };
    for insight in insights {
        match insight.severity {
            InsightSeverity::Critical => counts.critical_count += 1,
            InsightSeverity::Warning => counts.warning_count += 1,
            InsightSeverity::Info => counts.info_count += 1,
        }
    }
    counts
}

/// Health status and one-liner for a report built from `stats`
pub fn summarize_report(report: &InsightsReport, stats: &UsageStats) -> InsightsSummary {
    let counts = &report.summary;
    let health_status = if counts.critical_count > 0 {
        HealthStatus::Critical
    } else if counts.warning_count > 0 {
        HealthStatus::NeedsAttention
    } else {
        HealthStatus::Healthy
    };
    let most_popular_tool = stats.popularity_ranking.first().cloned();

    let one_liner = if stats.is_empty() {
        format!(
            "No analytics data for {} to {}.",
            report.period_start, report.period_end
        )
    } else {
        let mut line = format!(
            "{} invocations across {} tools, {:.1}% errors",
            stats.total_invocations,
            stats.tool_metrics.len(),
            stats.overall_error_rate
        );
        if let Some(tool) = &most_popular_tool {
            let _ = write!(line, ", most used: {}", tool);
        }
        let _ = write!(
            line,
            ". {} critical, {} warning(s).",
            counts.critical_count, counts.warning_count
        );
        line
    };

    InsightsSummary {
        total_insights: counts.total_insights,
        most_popular_tool,
        health_status,
        one_liner,
    }
}

/// Project insights to their display shape, keeping order and count
pub fn format_insights(insights: &[AnalyticsInsight]) -> Vec<FormattedInsight> {
    insights
        .iter()
        .map(|insight| FormattedInsight {
            icon: insight.severity.icon().to_string(),
            title: insight.title.clone(),
            description: insight.description.clone(),
            severity: insight.severity,
            category: insight.category,
        })
        .collect()
}

/// Plain-text report
pub fn render_text(report: &InsightsReport, summary: &InsightsSummary) -> String {
    let mut out = String::new();
    let counts = &report.summary;

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "ANALYTICS INSIGHTS REPORT");
    let _ = writeln!(out, "Period: {} to {}", report.period_start, report.period_end);
    let _ = writeln!(
        out,
        "Generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out);

    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "  Health: {}", summary.health_status);
    let _ = writeln!(out, "  Total Insights: {}", counts.total_insights);
    let _ = writeln!(
        out,
        "  Critical: {}  Warning: {}  Info: {}",
        counts.critical_count, counts.warning_count, counts.info_count
    );
    if let Some(tool) = &summary.most_popular_tool {
        let _ = writeln!(out, "  Most Popular Tool: {}", tool);
    }
    let _ = writeln!(out, "  {}", summary.one_liner);
    let _ = writeln!(out);

    let _ = writeln!(out, "INSIGHTS");
    if report.insights.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for formatted in format_insights(&report.insights) {
        let _ = writeln!(
            out,
            "  {} [{}] {} ({})",
            formatted.icon,
            formatted.severity.as_str().to_uppercase(),
            formatted.title,
            formatted.category
        );
        let _ = writeln!(out, "     {}", formatted.description);
    }
    let _ = writeln!(out, "{}", RULE);

    out
}
