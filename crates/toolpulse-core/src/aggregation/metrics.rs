//! Per-tool metrics and the window-level usage envelope

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::trends::{compute_usage_trends, UsageTrend};
use crate::models::{AnalyticsEvent, DateWindow, ErrorCategory};

/// Error rate (0-100) above which a tool needs attention
pub const ATTENTION_ERROR_RATE: f64 = 10.0;

/// Summary of one tool over a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolMetrics {
    pub tool_name: String,
    pub invocation_count: usize,
    pub success_count: usize,
    pub error_count: usize,
    /// Percentage of failed invocations, 0-100
    pub error_rate: f64,
    pub avg_duration_ms: f64,
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
    pub p95_duration_ms: f64,
    /// Every category is present, zero when unseen
    pub errors_by_category: BTreeMap<ErrorCategory, usize>,
    pub first_seen: String,
    pub last_seen: String,
}

impl ToolMetrics {
    /// Category with the most failures; `None` when the tool never failed
    pub fn most_common_error(&self) -> Option<ErrorCategory> {
        self.errors_by_category
            .iter()
            .filter(|(_, count)| **count > 0)
            // max_by_key keeps the last max; reverse so ties go to the first category
            .rev()
            .max_by_key(|(_, count)| **count)
            .map(|(category, _)| *category)
    }
}

/// Usage envelope over a date window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_invocations: usize,
    pub success_count: usize,
    pub error_count: usize,
    /// Percentage of failed invocations, 0-100
    pub overall_error_rate: f64,
    /// Sorted by invocation count descending
    pub tool_metrics: Vec<ToolMetrics>,
    /// Tool names by invocation count descending
    pub popularity_ranking: Vec<String>,
    /// Tools with error rate above 10, worst first
    pub tools_needing_attention: Vec<String>,
    pub trends: Vec<UsageTrend>,
    pub unique_sessions: usize,
    pub avg_invocations_per_session: f64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub generated_at: DateTime<Utc>,
}

impl UsageStats {
    /// All-zero envelope for `window`
    pub fn empty(window: DateWindow) -> Self {
        Self {
            total_invocations: 0,
            success_count: 0,
            error_count: 0,
            overall_error_rate: 0.0,
            tool_metrics: Vec::new(),
            popularity_ranking: Vec::new(),
            tools_needing_attention: Vec::new(),
            trends: Vec::new(),
            unique_sessions: 0,
            avg_invocations_per_session: 0.0,
            period_start: window.start,
            period_end: window.end,
            generated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_invocations == 0
    }

    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.period_start, self.period_end)
    }

    pub fn tool(&self, tool_name: &str) -> Option<&ToolMetrics> {
        self.tool_metrics.iter().find(|m| m.tool_name == tool_name)
    }

    pub fn trend_for(&self, tool_name: &str) -> Option<&UsageTrend> {
        self.trends.iter().find(|t| t.tool_name == tool_name)
    }
}

/// Running totals for one tool
#[derive(Default)]
struct ToolAccumulator<'a> {
    success: usize,
    errors: usize,
    durations: Vec<f64>,
    categories: BTreeMap<ErrorCategory, usize>,
    first_seen: Option<&'a str>,
    last_seen: Option<&'a str>,
}

impl<'a> ToolAccumulator<'a> {
    fn record(&mut self, event: &'a AnalyticsEvent) {
        if event.success {
            self.success += 1;
        } else {
            self.errors += 1;
        }
        if let Some(category) = event.effective_category() {
            *self.categories.entry(category).or_insert(0) += 1;
        }
        self.durations.push(event.duration_ms);

        let ts = event.timestamp.as_str();
        if self.first_seen.is_none_or(|first| ts < first) {
            self.first_seen = Some(ts);
        }
        if self.last_seen.is_none_or(|last| ts > last) {
            self.last_seen = Some(ts);
        }
    }

    fn finish(mut self, tool_name: &str) -> ToolMetrics {
        let invocation_count = self.success + self.errors;
        self.durations.sort_by(f64::total_cmp);

        let avg_duration_ms = if self.durations.is_empty() {
            0.0
        } else {
            self.durations.iter().sum::<f64>() / self.durations.len() as f64
        };

        let mut errors_by_category: BTreeMap<ErrorCategory, usize> =
            ErrorCategory::ALL.iter().map(|c| (*c, 0)).collect();
        errors_by_category.extend(self.categories);

        ToolMetrics {
            tool_name: tool_name.to_string(),
            invocation_count,
            success_count: self.success,
            error_count: self.errors,
            error_rate: rate_pct(self.errors, invocation_count),
            avg_duration_ms,
            min_duration_ms: self.durations.first().copied().unwrap_or(0.0),
            max_duration_ms: self.durations.last().copied().unwrap_or(0.0),
            p95_duration_ms: percentile_95(&self.durations),
            errors_by_category,
            first_seen: self.first_seen.unwrap_or_default().to_string(),
            last_seen: self.last_seen.unwrap_or_default().to_string(),
        }
    }
}

/// `part / whole * 100`, zero for an empty whole
pub fn rate_pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// P95 of values already sorted ascending: index `ceil(n * 0.95) - 1`
pub fn percentile_95(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (sorted.len() as f64 * 0.95).ceil() as usize;
    let index = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[index]
}

/// Compute the usage envelope for events already restricted to `window`
pub fn compute_usage_stats(events: &[AnalyticsEvent], window: DateWindow) -> UsageStats {
    if events.is_empty() {
        return UsageStats::empty(window);
    }

    let mut tools: HashMap<&str, ToolAccumulator> = HashMap::new();
    let mut sessions: HashSet<&str> = HashSet::new();

    for event in events {
        tools
            .entry(event.tool_name.as_str())
            .or_default()
            .record(event);
        sessions.insert(event.session_id.as_str());
    }

    let mut tool_metrics: Vec<ToolMetrics> = tools
        .into_iter()
        .map(|(name, acc)| acc.finish(name))
        .collect();
    tool_metrics.sort_by(|a, b| {
        b.invocation_count
            .cmp(&a.invocation_count)
            .then_with(|| a.tool_name.cmp(&b.tool_name))
    });

    let total_invocations: usize = tool_metrics.iter().map(|m| m.invocation_count).sum();
    let success_count: usize = tool_metrics.iter().map(|m| m.success_count).sum();
    let error_count: usize = tool_metrics.iter().map(|m| m.error_count).sum();

    let popularity_ranking = tool_metrics.iter().map(|m| m.tool_name.clone()).collect();

    let mut attention: Vec<&ToolMetrics> = tool_metrics
        .iter()
        .filter(|m| m.error_rate > ATTENTION_ERROR_RATE)
        .collect();
    attention.sort_by(|a, b| {
        b.error_rate
            .total_cmp(&a.error_rate)
            .then_with(|| a.tool_name.cmp(&b.tool_name))
    });
    let tools_needing_attention = attention.iter().map(|m| m.tool_name.clone()).collect();

    let unique_sessions = sessions.len();
    let avg_invocations_per_session = if unique_sessions == 0 {
        0.0
    } else {
        total_invocations as f64 / unique_sessions as f64
    };

    UsageStats {
        total_invocations,
        success_count,
        error_count,
        overall_error_rate: rate_pct(error_count, total_invocations),
        tool_metrics,
        popularity_ranking,
        tools_needing_attention,
        trends: compute_usage_trends(events),
        unique_sessions,
        avg_invocations_per_session,
        period_start: window.start,
        period_end: window.end,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p95_of_twenty_values() {
        let values: Vec<f64> = (1..=20).map(|i| (i * 100) as f64).collect();
        // ceil(20 * 0.95) - 1 = 18 -> 1900
        assert_eq!(percentile_95(&values), 1900.0);
    }

    #[test]
    fn test_p95_small_inputs() {
        assert_eq!(percentile_95(&[]), 0.0);
        assert_eq!(percentile_95(&[7.0]), 7.0);
        assert_eq!(percentile_95(&[1.0, 2.0]), 2.0);
    }

    #[test]
    fn test_rate_pct_zero_guard() {
        assert_eq!(rate_pct(0, 0), 0.0);
        assert_eq!(rate_pct(1, 2), 50.0);
    }

    #[test]
    fn test_most_common_error_ties_pick_first_category() {
        let mut errors_by_category: BTreeMap<ErrorCategory, usize> =
            ErrorCategory::ALL.iter().map(|c| (*c, 0)).collect();
        errors_by_category.insert(ErrorCategory::Runtime, 2);
        errors_by_category.insert(ErrorCategory::Timeout, 2);

        let metrics = ToolMetrics {
            tool_name: "t".to_string(),
            invocation_count: 4,
            success_count: 0,
            error_count: 4,
            error_rate: 100.0,
            avg_duration_ms: 0.0,
            min_duration_ms: 0.0,
            max_duration_ms: 0.0,
            p95_duration_ms: 0.0,
            errors_by_category,
            first_seen: String::new(),
            last_seen: String::new(),
        };
        assert_eq!(metrics.most_common_error(), Some(ErrorCategory::Runtime));
    }
}
