//! Per-tool daily usage series and halves-comparison trend classification

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::AnalyticsEvent;

/// Change (in percent) beyond which a series counts as moving
pub const TREND_THRESHOLD_PCT: f64 = 10.0;

/// Coarse direction of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }

    /// Arrow for compact display
    pub fn arrow(&self) -> &'static str {
        match self {
            Self::Increasing => "↑",
            Self::Decreasing => "↓",
            Self::Stable => "→",
        }
    }
}

/// Invocations of one tool on one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: String,
    pub count: usize,
}

/// Daily series for one tool with its classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageTrend {
    pub tool_name: String,
    /// Ascending by date; only dates with at least one invocation
    pub data_points: Vec<TrendPoint>,
    pub trend: Trend,
    pub change_percentage: f64,
}

/// Classify a series by comparing the means of its two halves
///
/// The first half is `values[..n / 2]`, the second the rest. The change is
/// `(second - first) / first * 100`; a zero first mean yields 100 when the
/// second is positive and 0 otherwise. Fewer than two values is always stable.
pub fn classify_trend(values: &[f64]) -> (Trend, f64) {
    if values.len() < 2 {
        return (Trend::Stable, 0.0);
    }

    let mid = values.len() / 2;
    let first_mean = mean(&values[..mid]);
    let second_mean = mean(&values[mid..]);

    let change = if first_mean == 0.0 {
        if second_mean > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (second_mean - first_mean) / first_mean * 100.0
    };

    let trend = if change > TREND_THRESHOLD_PCT {
        Trend::Increasing
    } else if change < -TREND_THRESHOLD_PCT {
        Trend::Decreasing
    } else {
        Trend::Stable
    };

    (trend, change)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Bucket events by (tool, date) and classify each tool's series
///
/// Output is sorted by tool name.
pub fn compute_usage_trends(events: &[AnalyticsEvent]) -> Vec<UsageTrend> {
    let mut by_tool: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();

    for event in events {
        let Some(date) = event.date_key() else {
            continue;
        };
        *by_tool
            .entry(event.tool_name.as_str())
            .or_default()
            .entry(date)
            .or_insert(0) += 1;
    }

    by_tool
        .into_iter()
        .map(|(tool, dates)| {
            let data_points: Vec<TrendPoint> = dates
                .into_iter()
                .map(|(date, count)| TrendPoint {
                    date: date.to_string(),
                    count,
                })
                .collect();
            let counts: Vec<f64> = data_points.iter().map(|p| p.count as f64).collect();
            let (trend, change_percentage) = classify_trend(&counts);

            UsageTrend {
                tool_name: tool.to_string(),
                data_points,
                trend,
                change_percentage,
            }
        })
        .collect()
}
