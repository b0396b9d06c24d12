//! Daily / weekly / monthly bucketing per tool

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::metrics::rate_pct;
use super::trends::{classify_trend, Trend};
use crate::models::AnalyticsEvent;

/// Bucket granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Daily,
    Weekly,
    Monthly,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Bucket key for `date`
    ///
    /// - daily: `YYYY-MM-DD`
    /// - weekly: ISO week `YYYY-Www` (the week belongs to the year of its Thursday)
    /// - monthly: `YYYY-MM`
    pub fn key(&self, date: NaiveDate) -> String {
        match self {
            Self::Daily => date.format("%Y-%m-%d").to_string(),
            Self::Weekly => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Monthly => date.format("%Y-%m").to_string(),
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            other => Err(format!(
                "unknown period '{}' (expected daily, weekly or monthly)",
                other
            )),
        }
    }
}

/// Counts for one tool in one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodBucket {
    pub period: String,
    pub total_count: usize,
    pub success_count: usize,
    pub error_count: usize,
    /// Percentage of failed invocations in the period, 0-100
    pub error_rate: f64,
    pub avg_duration_ms: f64,
}

/// Time-bucketed series for one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPeriodCounts {
    pub tool_name: String,
    pub period_type: PeriodType,
    /// Sorted by period key
    pub periods: Vec<PeriodBucket>,
    /// Classification of the `total_count` series
    pub trend: Trend,
    pub change_percentage: f64,
}

#[derive(Default)]
struct BucketAccumulator {
    total: usize,
    success: usize,
    errors: usize,
    duration_sum: f64,
}

/// Bucket events per tool per period; `tool_filter` restricts to one tool
///
/// Output is sorted by tool name.
pub fn compute_period_counts(
    events: &[AnalyticsEvent],
    period_type: PeriodType,
    tool_filter: Option<&str>,
) -> Vec<ToolPeriodCounts> {
    let mut by_tool: BTreeMap<&str, BTreeMap<String, BucketAccumulator>> = BTreeMap::new();

    for event in events {
        if tool_filter.is_some_and(|tool| tool != event.tool_name) {
            continue;
        }
        let Some(date) = event
            .date_key()
            .and_then(|key| NaiveDate::parse_from_str(key, "%Y-%m-%d").ok())
        else {
            continue;
        };

        let bucket = by_tool
            .entry(event.tool_name.as_str())
            .or_default()
            .entry(period_type.key(date))
            .or_default();
        bucket.total += 1;
        if event.success {
            bucket.success += 1;
        } else {
            bucket.errors += 1;
        }
        bucket.duration_sum += event.duration_ms;
    }

    by_tool
        .into_iter()
        .map(|(tool, buckets)| {
            let periods: Vec<PeriodBucket> = buckets
                .into_iter()
                .map(|(period, acc)| PeriodBucket {
                    period,
                    total_count: acc.total,
                    success_count: acc.success,
                    error_count: acc.errors,
                    error_rate: rate_pct(acc.errors, acc.total),
                    avg_duration_ms: if acc.total == 0 {
                        0.0
                    } else {
                        acc.duration_sum / acc.total as f64
                    },
                })
                .collect();

            let totals: Vec<f64> = periods.iter().map(|p| p.total_count as f64).collect();
            let (trend, change_percentage) = classify_trend(&totals);

            ToolPeriodCounts {
                tool_name: tool.to_string(),
                period_type,
                periods,
                trend,
                change_percentage,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_daily_and_monthly_keys() {
        assert_eq!(PeriodType::Daily.key(date("2026-07-04")), "2026-07-04");
        assert_eq!(PeriodType::Monthly.key(date("2026-07-04")), "2026-07");
    }

    #[test]
    fn test_weekly_key_uses_thursday_year() {
        // 2021-01-01 is a Friday: its Thursday is 2020-12-31, ISO week 53 of 2020
        assert_eq!(PeriodType::Weekly.key(date("2021-01-01")), "2020-W53");
        // 2024-12-30 is a Monday whose Thursday is 2025-01-02
        assert_eq!(PeriodType::Weekly.key(date("2024-12-30")), "2025-W01");
        assert_eq!(PeriodType::Weekly.key(date("2026-03-12")), "2026-W11");
    }

    #[test]
    fn test_period_type_parsing() {
        assert_eq!("weekly".parse::<PeriodType>(), Ok(PeriodType::Weekly));
        assert_eq!("Month".parse::<PeriodType>(), Ok(PeriodType::Monthly));
        assert!("hourly".parse::<PeriodType>().is_err());
    }

    #[test]
    fn test_buckets_and_filter() {
        let events = vec![
            AnalyticsEvent::success("a", 100.0, "s").at("2026-03-02T10:00:00.000Z"),
            AnalyticsEvent::success("a", 300.0, "s").at("2026-03-03T10:00:00.000Z"),
            AnalyticsEvent::failure("a", 50.0, "s", crate::models::ErrorCategory::Runtime)
                .at("2026-03-10T10:00:00.000Z"),
            AnalyticsEvent::success("b", 10.0, "s").at("2026-03-02T10:00:00.000Z"),
        ];

        let weekly = compute_period_counts(&events, PeriodType::Weekly, None);
        assert_eq!(weekly.len(), 2);
        let a = &weekly[0];
        assert_eq!(a.tool_name, "a");
        assert_eq!(a.periods.len(), 2);
        assert_eq!(a.periods[0].period, "2026-W10");
        assert_eq!(a.periods[0].total_count, 2);
        assert_eq!(a.periods[0].avg_duration_ms, 200.0);
        assert_eq!(a.periods[1].error_count, 1);
        assert_eq!(a.periods[1].error_rate, 100.0);
        assert_eq!(a.trend, Trend::Decreasing);

        let only_b = compute_period_counts(&events, PeriodType::Monthly, Some("b"));
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].periods[0].period, "2026-03");
        assert_eq!(only_b[0].trend, Trend::Stable);
    }
}
