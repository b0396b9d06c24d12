//! Condensed views derived from [`UsageStats`]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::metrics::{rate_pct, ToolMetrics, UsageStats};

/// Headline numbers for a window
///
/// `overall_error_rate` here is a fraction (0-1), unlike the percentage
/// carried by [`UsageStats::overall_error_rate`]. Consumers rely on both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationSummary {
    pub total_invocations: usize,
    pub unique_tools: usize,
    pub unique_sessions: usize,
    /// Fraction of failed invocations, 0-1
    pub overall_error_rate: f64,
    /// Invocation-weighted mean duration
    pub overall_avg_duration_ms: f64,
    pub most_popular_tool: Option<String>,
    pub highest_error_rate_tool: Option<String>,
    pub slowest_tool: Option<String>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

/// Tool with its share of all invocations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularityEntry {
    pub tool_name: String,
    pub invocation_count: usize,
    /// Share of total invocations, 0-100
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRateEntry {
    pub tool_name: String,
    pub error_rate: f64,
    pub error_count: usize,
    pub invocation_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTimeEntry {
    pub tool_name: String,
    pub avg_duration_ms: f64,
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
    pub p95_duration_ms: f64,
}

/// Headline summary of a usage envelope
pub fn summarize(stats: &UsageStats) -> AggregationSummary {
    let highest_error_rate_tool = stats
        .tool_metrics
        .iter()
        .filter(|m| m.error_count > 0)
        .fold(None, |best: Option<&ToolMetrics>, m| match best {
            Some(b) if b.error_rate >= m.error_rate => Some(b),
            _ => Some(m),
        })
        .map(|m| m.tool_name.clone());

    let slowest_tool = stats
        .tool_metrics
        .iter()
        .filter(|m| m.invocation_count > 0)
        .fold(None, |best: Option<&ToolMetrics>, m| match best {
            Some(b) if b.avg_duration_ms >= m.avg_duration_ms => Some(b),
            _ => Some(m),
        })
        .map(|m| m.tool_name.clone());

    let weighted_duration: f64 = stats
        .tool_metrics
        .iter()
        .map(|m| m.avg_duration_ms * m.invocation_count as f64)
        .sum();
    let overall_avg_duration_ms = if stats.total_invocations == 0 {
        0.0
    } else {
        weighted_duration / stats.total_invocations as f64
    };

    AggregationSummary {
        total_invocations: stats.total_invocations,
        unique_tools: stats.tool_metrics.len(),
        unique_sessions: stats.unique_sessions,
        overall_error_rate: stats.overall_error_rate / 100.0,
        overall_avg_duration_ms,
        most_popular_tool: stats.popularity_ranking.first().cloned(),
        highest_error_rate_tool,
        slowest_tool,
        period_start: stats.period_start,
        period_end: stats.period_end,
    }
}

/// Tools by invocation count descending, with their share
pub fn popularity_ranking(stats: &UsageStats, limit: Option<usize>) -> Vec<PopularityEntry> {
    stats
        .tool_metrics
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|m| PopularityEntry {
            tool_name: m.tool_name.clone(),
            invocation_count: m.invocation_count,
            percentage: rate_pct(m.invocation_count, stats.total_invocations),
        })
        .collect()
}

/// Tools by error rate descending
pub fn error_rates(stats: &UsageStats, limit: Option<usize>) -> Vec<ErrorRateEntry> {
    let mut entries: Vec<ErrorRateEntry> = stats
        .tool_metrics
        .iter()
        .map(|m| ErrorRateEntry {
            tool_name: m.tool_name.clone(),
            error_rate: m.error_rate,
            error_count: m.error_count,
            invocation_count: m.invocation_count,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.error_rate
            .total_cmp(&a.error_rate)
            .then_with(|| a.tool_name.cmp(&b.tool_name))
    });
    entries.truncate(limit.unwrap_or(usize::MAX));
    entries
}

/// Tools by average duration descending
pub fn response_times(stats: &UsageStats, limit: Option<usize>) -> Vec<ResponseTimeEntry> {
    let mut entries: Vec<ResponseTimeEntry> = stats
        .tool_metrics
        .iter()
        .map(|m| ResponseTimeEntry {
            tool_name: m.tool_name.clone(),
            avg_duration_ms: m.avg_duration_ms,
            min_duration_ms: m.min_duration_ms,
            max_duration_ms: m.max_duration_ms,
            p95_duration_ms: m.p95_duration_ms,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.avg_duration_ms
            .total_cmp(&a.avg_duration_ms)
            .then_with(|| a.tool_name.cmp(&b.tool_name))
    });
    entries.truncate(limit.unwrap_or(usize::MAX));
    entries
}
